use super::mercado_pago::read_preference;
use crate::domain::checkout::{CheckoutRequest, PreferenceResponse};
use crate::domain::ports::CheckoutGateway;
use crate::error::Result;
use async_trait::async_trait;
use tracing::debug;

/// Path the relay backend serves preference creation on.
pub const RELAY_PREFERENCES_PATH: &str = "/api/checkout/preferences";

/// Creates preferences through the relay backend, which holds the provider
/// credential. Sends no credential of its own.
#[derive(Debug, Clone)]
pub struct RelayGateway {
    client: reqwest::Client,
    base_url: String,
}

impl RelayGateway {
    pub fn new(base_url: &str) -> Result<Self> {
        let client = reqwest::Client::builder().build()?;
        Ok(Self::with_client(client, base_url))
    }

    pub fn with_client(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl CheckoutGateway for RelayGateway {
    async fn create_preference(&self, request: &CheckoutRequest) -> Result<PreferenceResponse> {
        let url = format!("{}{RELAY_PREFERENCES_PATH}", self.base_url);
        debug!(%url, "relaying checkout preference");

        let response = self.client.post(&url).json(request).send().await?;
        read_preference(response).await
    }
}
