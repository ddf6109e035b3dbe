use std::{sync::Arc, time::Duration};

use serde_json::{Value, json};
use weather_core::{
    Coordinates, HttpTransport, IpLocationResolver, LocationResolver, LookupError,
    OpenWeatherResolver, ReqwestTransport, RetryPolicy, WeatherResolver, WeatherService,
    WeatherType,
};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path, query_param},
};

const FIXTURE: &str = include_str!("fixtures/openweather_success_response.json");

fn transport() -> Arc<dyn HttpTransport> {
    Arc::new(ReqwestTransport::new(Duration::from_secs(5)).unwrap())
}

fn locator(server: &MockServer, attempts: u32) -> IpLocationResolver {
    IpLocationResolver::new(
        format!("{}/json/", server.uri()),
        RetryPolicy::new(attempts, Duration::ZERO),
        transport(),
    )
}

fn resolver(server: &MockServer) -> OpenWeatherResolver {
    OpenWeatherResolver::new(
        format!(
            "{}/data/2.5/weather?lat={{latitude}}&lon={{longitude}}&appid=TEST_KEY&units=metric",
            server.uri()
        ),
        RetryPolicy::once(),
        transport(),
    )
}

async fn mount_location(server: &MockServer, body: Value) {
    Mock::given(method("GET"))
        .and(path("/json/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

#[tokio::test]
async fn resolves_location_then_weather() {
    let server = MockServer::start().await;
    mount_location(&server, json!({"status": "success", "lat": 40.7128, "lon": -74.006})).await;

    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .and(query_param("lat", "40.7128"))
        .and(query_param("lon", "-74.006"))
        .and(query_param("appid", "TEST_KEY"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(FIXTURE, "application/json"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let service = WeatherService::new(Box::new(locator(&server, 3)), Box::new(resolver(&server)));
    let weather = service.current().await.unwrap();

    assert_eq!(weather.temperature, 23.0);
    assert_eq!(weather.weather_type, WeatherType::Clear);
    assert_eq!(weather.sunrise.timestamp(), 1596242400);
    assert_eq!(weather.sunset.timestamp(), 1596292800);
    assert_eq!(weather.city, "New York");
}

#[tokio::test]
async fn string_coordinates_are_coerced() {
    let server = MockServer::start().await;
    mount_location(&server, json!({"lat": "48.8566", "lon": "2.3522"})).await;

    let coords = locator(&server, 1).resolve().await.unwrap();
    assert_eq!(coords, Coordinates::new(48.8566, 2.3522));
}

#[tokio::test]
async fn location_server_error_is_retried_then_reported() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/json/"))
        .respond_with(ResponseTemplate::new(500))
        .expect(3)
        .mount(&server)
        .await;

    let err = locator(&server, 3).resolve().await.unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("after 3 attempts"), "{msg}");
    assert!(msg.contains("http status 500"), "{msg}");
}

#[tokio::test]
async fn unreachable_location_service_is_a_transport_failure() {
    let locator = IpLocationResolver::new(
        "http://127.0.0.1:1/json/",
        RetryPolicy::new(2, Duration::ZERO),
        transport(),
    );

    let err = locator.resolve().await.unwrap_err();
    assert!(err.to_string().contains("transport failure"));
}

#[tokio::test]
async fn weather_not_found_names_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"cod": "404"})))
        .expect(1)
        .mount(&server)
        .await;

    let err = resolver(&server).resolve(Coordinates::new(0.0, 0.0)).await.unwrap_err();
    assert!(err.to_string().contains("http status 404"));
}

#[tokio::test]
async fn malformed_weather_body_is_reported() {
    let server = MockServer::start().await;
    mount_location(&server, json!({"lat": 1.0, "lon": 2.0})).await;
    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{\"main\": "))
        .mount(&server)
        .await;

    let service = WeatherService::new(Box::new(locator(&server, 1)), Box::new(resolver(&server)));
    let err = service.current().await.unwrap_err();

    assert!(matches!(err, LookupError::Weather(_)));
    assert!(err.to_string().contains("invalid json"));
}
