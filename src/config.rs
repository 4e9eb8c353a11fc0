use crate::domain::ports::CheckoutGatewayRef;
use crate::error::{CheckoutError, Result};
use crate::infrastructure::mercado_pago::{DEFAULT_API_BASE, MercadoPagoGateway};
use crate::infrastructure::relay::RelayGateway;
use clap::Args;
use std::net::SocketAddr;
use std::sync::Arc;

/// Credentials and endpoint for talking to the provider directly.
#[derive(Args, Clone)]
pub struct ProviderConfig {
    /// Mercado Pago access token (bearer credential)
    #[arg(long, env = "MP_ACCESS_TOKEN", hide_env_values = true)]
    pub access_token: Option<String>,

    /// Base URL of the Mercado Pago API
    #[arg(long, env = "MP_API_BASE", default_value = DEFAULT_API_BASE)]
    pub api_base: String,
}

impl ProviderConfig {
    pub fn gateway(&self) -> Result<MercadoPagoGateway> {
        let token = self
            .access_token
            .as_deref()
            .filter(|token| !token.trim().is_empty())
            .ok_or_else(|| {
                CheckoutError::Config(
                    "an access token is required (--access-token or MP_ACCESS_TOKEN)".to_string(),
                )
            })?;
        MercadoPagoGateway::with_api_base(&self.api_base, token)
    }
}

/// Where checkout preferences get created: through a relay backend when one
/// is configured, otherwise directly with the provider.
#[derive(Args, Clone)]
pub struct GatewayConfig {
    /// Base URL of a relay backend that holds the provider credential
    #[arg(long, env = "CHECKOUT_RELAY_URL")]
    pub relay_url: Option<String>,

    #[command(flatten)]
    pub provider: ProviderConfig,
}

impl GatewayConfig {
    pub fn gateway(&self) -> Result<CheckoutGatewayRef> {
        match &self.relay_url {
            Some(relay_url) => Ok(Arc::new(RelayGateway::new(relay_url)?)),
            None => Ok(Arc::new(self.provider.gateway()?)),
        }
    }
}

#[derive(Args, Clone)]
pub struct ServeConfig {
    /// Address the relay backend listens on
    #[arg(long, env = "LISTEN_ADDR", default_value = "127.0.0.1:8080")]
    pub listen: SocketAddr,

    #[command(flatten)]
    pub provider: ProviderConfig,
}
