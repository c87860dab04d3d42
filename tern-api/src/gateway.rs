use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tern_core::gateway::{ConfirmationGateway, GatewayError};

#[derive(Serialize)]
struct Question<'a> {
    prompt: &'a str,
}

#[derive(Deserialize)]
struct Answer {
    answer: bool,
}

/// Asks the configured confirmation endpoint a yes/no question and waits for
/// the typed answer. Transport failures and timeouts surface as
/// `GatewayError`; the booking workflow treats those as a decline.
pub struct HttpConfirmationGateway {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpConfirmationGateway {
    pub fn new(endpoint: String, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client, endpoint })
    }
}

#[async_trait]
impl ConfirmationGateway for HttpConfirmationGateway {
    async fn ask_yes_no(&self, prompt: &str) -> Result<bool, GatewayError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&Question { prompt })
            .send()
            .await
            .map_err(|e| GatewayError::Unavailable(e.to_string()))?
            .error_for_status()
            .map_err(|e| GatewayError::Unavailable(e.to_string()))?;

        let answer: Answer = response
            .json()
            .await
            .map_err(|e| GatewayError::Unavailable(e.to_string()))?;

        Ok(answer.answer)
    }
}
