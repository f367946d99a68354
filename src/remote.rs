use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response};

use crate::error::RemoteError;
use crate::session::SessionConfig;
use crate::workout::SessionSnapshot;

/// The workout server as seen by the controller.
#[async_trait]
pub trait WorkoutRemote {
    /// `PUT /workout`
    async fn start(&self, config: &SessionConfig) -> Result<(), RemoteError>;
    /// `GET /workout`
    async fn fetch(&self) -> Result<SessionSnapshot, RemoteError>;
    /// `POST /workout`
    async fn stop(&self) -> Result<(), RemoteError>;
    /// `POST /calibration`
    async fn recalibrate(&self) -> Result<(), RemoteError>;
}

#[derive(Debug, Clone)]
pub struct HttpWorkoutRemote {
    client: Client,
    base_url: String,
}

impl HttpWorkoutRemote {
    /// `timeout` applies to every request, including the deliberately slow
    /// stop call.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, RemoteError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(RemoteError::Transport)?;
        Ok(Self::with_client(client, base_url))
    }

    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

fn ensure_success(response: Response) -> Result<Response, RemoteError> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(RemoteError::Status(status))
    }
}

#[async_trait]
impl WorkoutRemote for HttpWorkoutRemote {
    async fn start(&self, config: &SessionConfig) -> Result<(), RemoteError> {
        let response = self
            .client
            .put(self.url("/workout"))
            .json(config)
            .send()
            .await?;
        ensure_success(response)?;
        Ok(())
    }

    async fn fetch(&self) -> Result<SessionSnapshot, RemoteError> {
        let response = self.client.get(self.url("/workout")).send().await?;
        let snapshot = ensure_success(response)?.json::<SessionSnapshot>().await?;
        Ok(snapshot)
    }

    async fn stop(&self) -> Result<(), RemoteError> {
        let response = self.client.post(self.url("/workout")).send().await?;
        ensure_success(response)?;
        Ok(())
    }

    async fn recalibrate(&self) -> Result<(), RemoteError> {
        let response = self.client.post(self.url("/calibration")).send().await?;
        ensure_success(response)?;
        Ok(())
    }
}
