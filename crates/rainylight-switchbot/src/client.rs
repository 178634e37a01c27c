//! SwitchBot v1.1 device API client.

use std::time::Duration;

use rainylight_core::{Credentials, HttpConfig, SwitchBotConfig};
use reqwest::Client;
use tracing::instrument;

use crate::error::SwitchBotError;
use crate::sign::SignedRequestHeaders;
use crate::types::*;

/// Signed client for one account.
///
/// Holds nothing beyond the credentials and the HTTP plumbing; each call is
/// signed afresh.
#[derive(Debug, Clone)]
pub struct DeviceClient {
    client: Client,
    credentials: Credentials,
    base_url: String,
}

impl DeviceClient {
    pub fn new(config: &SwitchBotConfig, http: &HttpConfig) -> Result<Self, SwitchBotError> {
        Self::with_base_url(config.credentials.clone(), &config.api_base_url, http.timeout())
    }

    pub fn with_base_url(
        credentials: Credentials,
        base_url: &str,
        timeout: Duration,
    ) -> Result<Self, SwitchBotError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            credentials,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Sign now with a fresh nonce and attach the headers.
    fn signed(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        let nonce = uuid::Uuid::new_v4().to_string();
        SignedRequestHeaders::new(&self.credentials, &nonce).apply(req)
    }

    /// `{base}/v1.1/devices/{id}/{leaf}` with the id as one encoded segment.
    fn device_url(&self, device_id: &str, leaf: &str) -> Result<String, SwitchBotError> {
        // Encoding leaves dot segments alone, and the URL parser would resolve them
        if matches!(device_id, "" | "." | "..") {
            return Err(SwitchBotError::Request(format!(
                "Invalid device id: {:?}",
                device_id
            )));
        }
        Ok(format!(
            "{}/v1.1/devices/{}/{}",
            self.base_url,
            urlencoding::encode(device_id),
            leaf
        ))
    }

    /// List physical devices.
    #[instrument(skip(self), level = "info")]
    pub async fn list_devices(&self) -> Result<Vec<Device>, SwitchBotError> {
        let list = self.list_all_devices().await?;
        tracing::info!("Found {} devices", list.device_list.len());
        Ok(list.device_list)
    }

    /// List physical devices and infrared remotes.
    #[instrument(skip(self), level = "debug")]
    pub async fn list_all_devices(&self) -> Result<DeviceList, SwitchBotError> {
        let url = format!("{}/v1.1/devices", self.base_url);

        let response = self.signed(self.client.get(&url)).send().await?;

        self.handle_response(response).await
    }

    /// Read the current status of one device.
    #[instrument(skip(self), level = "info")]
    pub async fn get_device_status(&self, device_id: &str) -> Result<DeviceStatus, SwitchBotError> {
        let url = self.device_url(device_id, "status")?;

        let response = self.signed(self.client.get(&url)).send().await?;

        self.handle_response(response).await
    }

    /// Post one command.
    ///
    /// Returns whatever the server answered; only a transport failure is an
    /// `Err`, so a caller running a sequence decides how to treat rejections.
    #[instrument(skip(self), level = "info")]
    pub async fn post_command(&self, command: &DeviceCommand) -> Result<RawResponse, SwitchBotError> {
        let url = self.device_url(&command.device_id, "commands")?;

        tracing::info!("Post command: {}", command.body());

        let response = self
            .signed(self.client.post(&url))
            .json(command)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Command {} not delivered: {}", command.command, e);
                SwitchBotError::Network(e)
            })?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| {
            tracing::error!(
                "Command {} response ({}) unreadable: {}",
                command.command,
                status,
                e
            );
            SwitchBotError::Network(e)
        })?;

        if (200..300).contains(&status) {
            tracing::info!("Response ({}): {}", status, body);
        } else {
            tracing::warn!("Response ({}): {}", status, body);
        }

        Ok(RawResponse { status, body })
    }

    /// Unwrap the `{statusCode, message, body}` envelope of a read endpoint.
    async fn handle_response<T: serde::de::DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, SwitchBotError> {
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!("SwitchBot API returned {}: {}", status, body);
            return Err(SwitchBotError::RemoteApi {
                status: status.as_u16(),
                body,
            });
        }

        let envelope: ApiEnvelope<T> = response
            .json()
            .await
            .map_err(|e| SwitchBotError::Parse(format!("JSON parse error: {}", e)))?;

        if envelope.status_code != STATUS_SUCCESS {
            return Err(SwitchBotError::ApiStatus {
                status_code: envelope.status_code,
                message: envelope.message,
            });
        }

        envelope
            .body
            .ok_or_else(|| SwitchBotError::Parse("Response has no body".to_string()))
    }
}
