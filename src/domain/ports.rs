use super::checkout::{CheckoutRequest, PreferenceResponse};
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// Creates hosted checkout sessions with the payment provider.
#[async_trait]
pub trait CheckoutGateway: Send + Sync {
    async fn create_preference(&self, request: &CheckoutRequest) -> Result<PreferenceResponse>;
}

/// The browser page hosting the checkout flow.
pub trait Page: Send + Sync {
    /// Full current URL, including any query string.
    fn location(&self) -> String;
    /// Rewrites the current history entry without navigating.
    fn replace_location(&self, url: &str);
    /// Leaves the page for `url`.
    fn navigate(&self, url: &str);
}

pub type CheckoutGatewayRef = Arc<dyn CheckoutGateway>;
pub type PageRef = Arc<dyn Page>;
