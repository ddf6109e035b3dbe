//! The refresh/exit loop around the weather panel.

use std::io::Write;

use anyhow::Result;
use weather_core::WeatherService;

use crate::render;

const CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Choice {
    Refresh,
    Exit,
}

pub fn parse_choice(input: &str) -> Option<Choice> {
    match input.trim() {
        "1" => Some(Choice::Refresh),
        "2" => Some(Choice::Exit),
        _ => None,
    }
}

/// How the loop ended. The caller decides what that means for the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Quit,
    /// The prompt was interrupted (Ctrl-C, Esc, closed stdin).
    Cancelled,
}

pub struct Menu<'a, W> {
    service: &'a WeatherService,
    out: W,
    clear_screen: bool,
}

impl<'a, W: Write> Menu<'a, W> {
    pub fn new(service: &'a WeatherService, out: W, clear_screen: bool) -> Self {
        Self {
            service,
            out,
            clear_screen,
        }
    }

    /// Show the panel and handle choices until the user leaves.
    ///
    /// `read_choice` returns `None` when input is no longer available.
    /// Lookup errors are not caught here; they end the loop.
    pub async fn run<R>(&mut self, mut read_choice: R) -> Result<Outcome>
    where
        R: FnMut() -> Result<Option<String>>,
    {
        loop {
            self.show().await?;

            loop {
                let Some(input) = read_choice()? else {
                    return Ok(Outcome::Cancelled);
                };

                match parse_choice(&input) {
                    Some(Choice::Refresh) => {
                        writeln!(self.out, "\nUpdating data...\n")?;
                        break;
                    }
                    Some(Choice::Exit) => {
                        writeln!(self.out, "\nExiting the program...\n")?;
                        return Ok(Outcome::Quit);
                    }
                    None => {
                        writeln!(self.out, "\nInvalid choice. Please select a valid option.\n")?;
                    }
                }
            }
        }
    }

    async fn show(&mut self) -> Result<()> {
        if self.clear_screen {
            write!(self.out, "{CLEAR_SCREEN}")?;
        }
        writeln!(self.out, "Loading...")?;
        self.out.flush()?;

        let weather = self.service.current().await?;

        if self.clear_screen {
            write!(self.out, "{CLEAR_SCREEN}")?;
        }
        writeln!(self.out, "{}", render::weather_panel(&weather))?;
        writeln!(self.out, "{}", render::menu_panel())?;
        self.out.flush()?;
        Ok(())
    }
}
