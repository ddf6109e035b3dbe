use chrono::{DateTime, Local, TimeZone, Utc};
use weather_core::Weather;

const WIDTH: usize = 44;

/// Whole degrees; `-0` is shown as `0`.
fn degrees(value: f64) -> String {
    format!("{:.0}°C", value.round() + 0.0)
}

/// Sunrise/sunset in the given zone, `HH:MM`.
fn clock<Tz: TimeZone>(at: DateTime<Utc>, tz: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    at.with_timezone(tz).format("%H:%M").to_string()
}

/// Render the weather panel using the machine's local time zone.
pub fn weather_panel(weather: &Weather) -> String {
    weather_panel_in(weather, &Local)
}

pub fn weather_panel_in<Tz: TimeZone>(weather: &Weather, tz: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    let details = &weather.details;
    let mut lines = vec![
        format!("Temperature:   {}", degrees(weather.temperature)),
        format!("Conditions:    {}", weather.weather_type),
    ];

    if let Some(desc) = &details.description {
        lines.push(format!("Description:   {desc}"));
    }
    if let Some(feels) = details.feels_like {
        lines.push(format!("Feels like:    {}", degrees(feels)));
    }
    if let (Some(min), Some(max)) = (details.temp_min, details.temp_max) {
        lines.push(format!("Min / max:     {} / {}", degrees(min), degrees(max)));
    }
    if let Some(speed) = details.wind_speed_mps {
        match &details.wind_direction {
            Some(dir) => lines.push(format!("Wind:          {speed:.1} m/s, {dir}")),
            None => lines.push(format!("Wind:          {speed:.1} m/s")),
        }
    }
    if let Some(humidity) = details.humidity_pct {
        lines.push(format!("Humidity:      {humidity}%"));
    }
    if let Some(pressure) = details.pressure_hpa {
        lines.push(format!("Pressure:      {pressure} hPa"));
    }
    if let Some(visibility) = details.visibility_km {
        lines.push(format!("Visibility:    {visibility:.1} km"));
    }
    if let Some(clouds) = details.clouds_pct {
        lines.push(format!("Cloudiness:    {clouds}%"));
    }

    lines.push(format!("Sunrise:       {}", clock(weather.sunrise, tz)));
    lines.push(format!("Sunset:        {}", clock(weather.sunset, tz)));

    framed(&format!("Weather in {}", weather.city), &lines)
}

pub fn menu_panel() -> String {
    framed("Menu", &["[1] Refresh data  [2] Exit".to_string()])
}

fn framed(title: &str, lines: &[String]) -> String {
    let inner = lines
        .iter()
        .map(|l| l.chars().count())
        .chain(std::iter::once(title.chars().count() + 2))
        .max()
        .unwrap_or(0)
        .max(WIDTH);

    let mut out = String::new();
    let title = format!(" {title} ");
    let pad = inner + 2 - title.chars().count();
    let (left, right) = (pad / 2, pad - pad / 2);
    out.push_str(&format!("╭{}{title}{}╮\n", "─".repeat(left), "─".repeat(right)));
    for line in lines {
        let fill = inner - line.chars().count();
        out.push_str(&format!("│ {line}{} │\n", " ".repeat(fill)));
    }
    out.push_str(&format!("╰{}╯", "─".repeat(inner + 2)));
    out
}
