use serde::{Deserialize, Serialize};

use crate::error::RemoteCommandError;

/// `statusCode` the API reports for a successful call.
pub const STATUS_SUCCESS: i64 = 100;

/// Response envelope shared by every v1.1 endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ApiEnvelope<T> {
    pub status_code: i64,
    #[serde(default)]
    pub message: String,
    pub body: Option<T>,
}

/// A physical device registered to the account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Device {
    pub device_id: String,
    #[serde(default)]
    pub device_name: String,
    pub device_type: Option<String>,
    pub enable_cloud_service: Option<bool>,
    pub hub_device_id: Option<String>,
    /// Type-specific fields
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// A virtual infrared remote learned by a hub.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InfraredRemote {
    pub device_id: String,
    #[serde(default)]
    pub device_name: String,
    pub remote_type: Option<String>,
    pub hub_device_id: Option<String>,
}

/// Body of `GET /v1.1/devices`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceList {
    #[serde(default)]
    pub device_list: Vec<Device>,
    #[serde(default)]
    pub infrared_remote_list: Vec<InfraredRemote>,
}

/// Body of `GET /v1.1/devices/{id}/status`.
///
/// Fields reported by color bulbs and strip lights are typed; anything else
/// stays in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceStatus {
    pub device_id: Option<String>,
    pub device_type: Option<String>,
    pub hub_device_id: Option<String>,
    /// "on" or "off"
    pub power: Option<String>,
    pub brightness: Option<u32>,
    /// "R:G:B"
    pub color: Option<String>,
    pub color_temperature: Option<u32>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl DeviceStatus {
    pub fn is_on(&self) -> bool {
        self.power.as_deref() == Some("on")
    }
}

/// An RGB triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
}

impl Rgb {
    pub const fn new(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }

    /// `setColor` parameter form, e.g. `"255:127:0"`.
    pub fn parameter(&self) -> String {
        format!("{}:{}:{}", self.red, self.green, self.blue)
    }
}

impl std::fmt::Display for Rgb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {}, {})", self.red, self.green, self.blue)
    }
}

/// One command for one device. The id goes in the URL, the rest in the body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceCommand {
    #[serde(skip)]
    pub device_id: String,
    pub command: String,
    pub parameter: String,
    pub command_type: String,
}

impl DeviceCommand {
    pub const DEFAULT_PARAMETER: &'static str = "default";
    pub const DEFAULT_COMMAND_TYPE: &'static str = "command";

    /// A standard command with the default parameter.
    pub fn new(device_id: impl Into<String>, command: impl Into<String>) -> Self {
        Self {
            device_id: device_id.into(),
            command: command.into(),
            parameter: Self::DEFAULT_PARAMETER.to_string(),
            command_type: Self::DEFAULT_COMMAND_TYPE.to_string(),
        }
    }

    pub fn with_parameter(mut self, parameter: impl Into<String>) -> Self {
        self.parameter = parameter.into();
        self
    }

    pub fn with_command_type(mut self, command_type: impl Into<String>) -> Self {
        self.command_type = command_type.into();
        self
    }

    pub fn set_brightness(device_id: impl Into<String>, brightness: u8) -> Self {
        Self::new(device_id, "setBrightness").with_parameter(brightness.to_string())
    }

    pub fn set_color(device_id: impl Into<String>, color: Rgb) -> Self {
        Self::new(device_id, "setColor").with_parameter(color.parameter())
    }

    pub fn turn_on(device_id: impl Into<String>) -> Self {
        Self::new(device_id, "turnOn")
    }

    /// JSON body as sent on the wire.
    pub fn body(&self) -> serde_json::Value {
        serde_json::json!({
            "command": self.command,
            "parameter": self.parameter,
            "commandType": self.command_type,
        })
    }
}

/// Status and body of a command response, whatever the status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

impl RawResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Interpret the response as an acknowledgment.
    ///
    /// Non-2xx is a rejection. A 2xx whose JSON body carries a `statusCode`
    /// other than 100 is a refusal. A 2xx body that is not JSON is accepted.
    pub fn into_ack(self) -> Result<CommandAck, RemoteCommandError> {
        if !self.is_success() {
            return Err(RemoteCommandError::Rejected {
                status: self.status,
                body: self.body,
            });
        }

        let envelope: Option<ApiEnvelope<serde_json::Value>> =
            serde_json::from_str(&self.body).ok();

        match envelope {
            Some(env) if env.status_code != STATUS_SUCCESS => Err(RemoteCommandError::Refused {
                status_code: env.status_code,
                message: env.message,
            }),
            Some(env) => Ok(CommandAck {
                status: self.status,
                status_code: Some(env.status_code),
                message: Some(env.message),
                body: self.body,
            }),
            None => Ok(CommandAck {
                status: self.status,
                status_code: None,
                message: None,
                body: self.body,
            }),
        }
    }
}

/// A command the API accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandAck {
    pub status: u16,
    pub status_code: Option<i64>,
    pub message: Option<String>,
    pub body: String,
}
