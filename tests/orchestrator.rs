//! End-to-end runs against mock forecast and device servers.

use std::time::Duration;

use rainylight::{Orchestrator, RunSettings, ERROR_COLOR};
use rainylight_core::{ColorPolicy, Credentials};
use rainylight_switchbot::{DeviceClient, RemoteCommandError, Rgb};
use rainylight_weather::{ForecastReader, RainLevel};
use wiremock::matchers::{body_partial_json, header_exists, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const DEVICE_ID: &str = "6055F92FCFD2";
const CITY_CODE: &str = "130010";
const COMMANDS_PATH: &str = "/v1.1/devices/6055F92FCFD2/commands";

fn forecast_body(t12_18: &str, t18_24: &str) -> serde_json::Value {
    serde_json::json!({
        "title": "東京都 東京 の天気",
        "forecasts": [
            {
                "date": "2024-06-01",
                "dateLabel": "今日",
                "telop": "曇時々雨",
                "chanceOfRain": {"T00_06": "--%", "T06_12": "--%", "T12_18": t12_18, "T18_24": t18_24}
            }
        ]
    })
}

fn ack() -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(serde_json::json!({
        "statusCode": 100,
        "body": {},
        "message": "success"
    }))
}

async fn forecast_server(response: ResponseTemplate) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("/api/forecast/city/{}", CITY_CODE)))
        .respond_with(response)
        .mount(&server)
        .await;
    server
}

async fn device_server() -> MockServer {
    MockServer::start().await
}

async fn accept_all_commands(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path(COMMANDS_PATH))
        .and(header_exists("sign"))
        .respond_with(ack())
        .mount(server)
        .await;
}

fn orchestrator(forecast: &MockServer, devices: &MockServer, policy: ColorPolicy) -> Orchestrator {
    let timeout = Duration::from_secs(5);
    Orchestrator::from_parts(
        ForecastReader::with_base_url(&forecast.uri(), timeout).unwrap(),
        DeviceClient::with_base_url(
            Credentials::new("test_token", "test_secret"),
            &devices.uri(),
            timeout,
        )
        .unwrap(),
        RunSettings {
            device_id: DEVICE_ID.to_string(),
            city_code: CITY_CODE.to_string(),
            color_policy: policy,
            brightness: 100,
        },
    )
}

/// Bodies of the command requests the device server saw, in arrival order
async fn sent_commands(server: &MockServer) -> Vec<serde_json::Value> {
    server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .filter(|r| r.url.path() == COMMANDS_PATH)
        .map(|r| serde_json::from_slice(&r.body).unwrap())
        .collect()
}

fn command(name: &str, parameter: &str) -> serde_json::Value {
    serde_json::json!({"command": name, "parameter": parameter, "commandType": "command"})
}

#[tokio::test]
async fn test_run_sends_three_commands_in_order() {
    let forecast = forecast_server(
        ResponseTemplate::new(200).set_body_json(forecast_body("20%", "65%")),
    )
    .await;
    let devices = device_server().await;
    accept_all_commands(&devices).await;

    let report = orchestrator(&forecast, &devices, ColorPolicy::Banded)
        .run()
        .await;

    assert_eq!(report.rain, RainLevel::Percent(65));
    assert_eq!(report.color.color, Rgb::new(0, 127, 255));
    assert!(report.all_commands_ok());

    assert_eq!(
        sent_commands(&devices).await,
        vec![
            command("setBrightness", "100"),
            command("setColor", "0:127:255"),
            command("turnOn", "default"),
        ]
    );
}

#[tokio::test]
async fn test_forecast_failure_still_sends_fallback_color() {
    let forecast =
        forecast_server(ResponseTemplate::new(500).set_body_string("internal error")).await;
    let devices = device_server().await;
    accept_all_commands(&devices).await;

    let report = orchestrator(&forecast, &devices, ColorPolicy::Banded)
        .run()
        .await;

    assert_eq!(report.rain, RainLevel::Unknown);
    assert_eq!(report.color.color, ERROR_COLOR);

    let sent = sent_commands(&devices).await;
    assert_eq!(sent.len(), 3);
    assert_eq!(sent[1], command("setColor", "255:0:0"));
}

#[tokio::test]
async fn test_malformed_forecast_uses_fallback_color() {
    let forecast = forecast_server(
        ResponseTemplate::new(200).set_body_json(serde_json::json!({"forecasts": []})),
    )
    .await;
    let devices = device_server().await;
    accept_all_commands(&devices).await;

    let report = orchestrator(&forecast, &devices, ColorPolicy::Banded)
        .run()
        .await;

    assert_eq!(report.rain, RainLevel::Unknown);
    assert_eq!(sent_commands(&devices).await.len(), 3);
}

#[tokio::test]
async fn test_exact_policy_hit_and_miss() {
    let devices = device_server().await;
    accept_all_commands(&devices).await;

    let hit = forecast_server(ResponseTemplate::new(200).set_body_json(forecast_body("20%", "10%")))
        .await;
    let report = orchestrator(&hit, &devices, ColorPolicy::Exact).run().await;
    assert_eq!(report.color.color, Rgb::new(190, 200, 0));

    let miss = forecast_server(ResponseTemplate::new(200).set_body_json(forecast_body("25%", "0%")))
        .await;
    let report = orchestrator(&miss, &devices, ColorPolicy::Exact).run().await;
    assert_eq!(report.rain, RainLevel::Percent(25));
    assert_eq!(report.color.color, ERROR_COLOR);
}

#[tokio::test]
async fn test_banded_policy_for_non_multiple_of_ten() {
    let forecast = forecast_server(
        ResponseTemplate::new(200).set_body_json(forecast_body("25%", "0%")),
    )
    .await;
    let devices = device_server().await;
    accept_all_commands(&devices).await;

    let report = orchestrator(&forecast, &devices, ColorPolicy::Banded)
        .run()
        .await;

    assert_eq!(report.color.color, Rgb::new(127, 255, 0));
}

#[tokio::test]
async fn test_failed_command_does_not_stop_sequence() {
    let forecast = forecast_server(
        ResponseTemplate::new(200).set_body_json(forecast_body("0%", "0%")),
    )
    .await;
    let devices = device_server().await;

    Mock::given(method("POST"))
        .and(path(COMMANDS_PATH))
        .and(body_partial_json(serde_json::json!({"command": "setColor"})))
        .respond_with(ResponseTemplate::new(500).set_body_string("color failed"))
        .with_priority(1)
        .mount(&devices)
        .await;
    accept_all_commands(&devices).await;

    let report = orchestrator(&forecast, &devices, ColorPolicy::Banded)
        .run()
        .await;

    assert!(!report.all_commands_ok());
    assert!(report.steps[0].is_ok());
    assert!(matches!(
        report.steps[1].outcome,
        Err(RemoteCommandError::Rejected { status: 500, .. })
    ));
    assert!(report.steps[2].is_ok());
    assert_eq!(report.failed_steps().count(), 1);
    assert_eq!(sent_commands(&devices).await.len(), 3);
}

#[tokio::test]
async fn test_provider_refusal_is_a_failed_step() {
    let forecast = forecast_server(
        ResponseTemplate::new(200).set_body_json(forecast_body("0%", "0%")),
    )
    .await;
    let devices = device_server().await;

    Mock::given(method("POST"))
        .and(path(COMMANDS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "statusCode": 161,
            "body": {},
            "message": "device offline"
        })))
        .mount(&devices)
        .await;

    let report = orchestrator(&forecast, &devices, ColorPolicy::Banded)
        .run()
        .await;

    assert_eq!(report.failed_steps().count(), 3);
    assert!(report
        .steps
        .iter()
        .all(|s| matches!(s.outcome, Err(RemoteCommandError::Refused { status_code: 161, .. }))));
}

#[tokio::test]
async fn test_unreachable_device_cloud_reports_every_step() {
    let forecast = forecast_server(
        ResponseTemplate::new(200).set_body_json(forecast_body("40%", "0%")),
    )
    .await;

    let orchestrator = Orchestrator::from_parts(
        ForecastReader::with_base_url(&forecast.uri(), Duration::from_secs(5)).unwrap(),
        DeviceClient::with_base_url(
            Credentials::new("t", "s"),
            "http://127.0.0.1:9",
            Duration::from_secs(2),
        )
        .unwrap(),
        RunSettings {
            device_id: DEVICE_ID.to_string(),
            city_code: CITY_CODE.to_string(),
            color_policy: ColorPolicy::Banded,
            brightness: 100,
        },
    );

    let report = orchestrator.run().await;

    assert_eq!(report.rain, RainLevel::Percent(40));
    assert!(report
        .steps
        .iter()
        .all(|s| matches!(s.outcome, Err(RemoteCommandError::Transport(_)))));
}

#[tokio::test]
async fn test_two_runs_send_identical_triplets() {
    let forecast = forecast_server(
        ResponseTemplate::new(200).set_body_json(forecast_body("50%", "30%")),
    )
    .await;
    let devices = device_server().await;
    accept_all_commands(&devices).await;

    let orchestrator = orchestrator(&forecast, &devices, ColorPolicy::Banded);
    let first = orchestrator.run().await;
    let second = orchestrator.run().await;

    assert_eq!(first.color, second.color);

    let sent = sent_commands(&devices).await;
    assert_eq!(sent.len(), 6);
    assert_eq!(sent[..3], sent[3..]);
}

#[tokio::test]
async fn test_plan_is_fixed_order_regardless_of_rain() {
    let forecast = forecast_server(ResponseTemplate::new(500)).await;
    let devices = device_server().await;
    let orchestrator = orchestrator(&forecast, &devices, ColorPolicy::Banded);

    for rain in [RainLevel::Percent(0), RainLevel::Percent(100), RainLevel::Unknown] {
        let (_, commands) = orchestrator.plan(rain);
        let names: Vec<&str> = commands.iter().map(|c| c.command.as_str()).collect();
        assert_eq!(names, ["setBrightness", "setColor", "turnOn"]);
        assert!(commands.iter().all(|c| c.device_id == DEVICE_ID));
    }
}
