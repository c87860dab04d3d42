use async_trait::async_trait;

#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("confirmation gateway unavailable: {0}")]
    Unavailable(String),
}

/// External collaborator that puts a yes/no question to the caller and
/// returns the typed answer. The booking workflow blocks on this and treats
/// any failure the same as an explicit "no".
#[async_trait]
pub trait ConfirmationGateway: Send + Sync {
    async fn ask_yes_no(&self, prompt: &str) -> Result<bool, GatewayError>;
}
