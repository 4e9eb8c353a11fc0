use crate::domain::checkout::{CheckoutRequest, PreferenceResponse};
use crate::domain::ports::CheckoutGateway;
use crate::error::{CheckoutError, Result};
use async_trait::async_trait;
use serde_json::Value;
use std::fmt;
use tracing::debug;

pub const DEFAULT_API_BASE: &str = "https://api.mercadopago.com";
const PREFERENCES_PATH: &str = "/checkout/preferences";

/// Creates checkout preferences directly against the Mercado Pago REST API.
///
/// Holds the bearer access token, so it belongs in a trusted process (the
/// relay backend or a local CLI), never in code shipped to a browser.
#[derive(Clone)]
pub struct MercadoPagoGateway {
    client: reqwest::Client,
    api_base: String,
    access_token: String,
}

impl MercadoPagoGateway {
    /// Creates a gateway for the public API. No request timeout is applied.
    pub fn new(access_token: impl Into<String>) -> Result<Self> {
        Self::with_api_base(DEFAULT_API_BASE, access_token)
    }

    pub fn with_api_base(api_base: &str, access_token: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder().build()?;
        Ok(Self::with_client(client, api_base, access_token))
    }

    pub fn with_client(
        client: reqwest::Client,
        api_base: &str,
        access_token: impl Into<String>,
    ) -> Self {
        Self {
            client,
            api_base: api_base.trim_end_matches('/').to_string(),
            access_token: access_token.into(),
        }
    }
}

impl fmt::Debug for MercadoPagoGateway {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MercadoPagoGateway")
            .field("api_base", &self.api_base)
            .field("access_token", &"<redacted>")
            .finish()
    }
}

#[async_trait]
impl CheckoutGateway for MercadoPagoGateway {
    async fn create_preference(&self, request: &CheckoutRequest) -> Result<PreferenceResponse> {
        let url = format!("{}{PREFERENCES_PATH}", self.api_base);
        debug!(%url, "posting checkout preference");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.access_token)
            .json(request)
            .send()
            .await?;

        read_preference(response).await
    }
}

/// Decodes a preference-creation response, turning non-success statuses into
/// [`CheckoutError::Provider`].
pub(crate) async fn read_preference(response: reqwest::Response) -> Result<PreferenceResponse> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        debug!(status = status.as_u16(), %body, "provider error body");
        return Err(CheckoutError::Provider {
            status: status.as_u16(),
            message: provider_error_message(status.as_u16(), &body),
        });
    }

    Ok(response.json::<PreferenceResponse>().await?)
}

/// Builds a readable message from a provider error body.
///
/// Uses `message`, or `Erro HTTP: <status>` when it is missing, and appends
/// the `description` (else `message`) of every entry of an array-valued
/// `cause` as ` - first, second`.
pub fn provider_error_message(status: u16, body: &str) -> String {
    let body: Value = serde_json::from_str(body).unwrap_or(Value::Null);

    let mut message = non_empty_str(body.get("message"))
        .map(str::to_string)
        .unwrap_or_else(|| format!("Erro HTTP: {status}"));

    if let Some(Value::Array(causes)) = body.get("cause") {
        let details: Vec<&str> = causes
            .iter()
            .filter_map(|cause| {
                non_empty_str(cause.get("description")).or_else(|| non_empty_str(cause.get("message")))
            })
            .collect();
        if !details.is_empty() {
            message.push_str(" - ");
            message.push_str(&details.join(", "));
        }
    }

    message
}

fn non_empty_str(value: Option<&Value>) -> Option<&str> {
    value.and_then(Value::as_str).filter(|s| !s.is_empty())
}
