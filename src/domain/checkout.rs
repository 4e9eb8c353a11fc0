use super::input::{Amount, PayerEmail, ValidatedInput};
use crate::error::{CheckoutError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use url::Url;

const ITEM_ID: &str = "item_001";
const ITEM_TITLE: &str = "Produto";
const ITEM_DESCRIPTION: &str = "Pagamento de teste";
const CURRENCY_ID: &str = "BRL";
const LOCAL_HOSTS: [&str; 2] = ["localhost", "127.0.0.1"];

#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct LineItem {
    pub id: String,
    pub title: String,
    pub description: String,
    pub quantity: u32,
    pub currency_id: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub unit_price: rust_decimal::Decimal,
}

impl LineItem {
    /// The single fixed product sold at the validated price.
    pub fn single(amount: Amount) -> Self {
        Self {
            id: ITEM_ID.to_string(),
            title: ITEM_TITLE.to_string(),
            description: ITEM_DESCRIPTION.to_string(),
            quantity: 1,
            currency_id: CURRENCY_ID.to_string(),
            unit_price: amount.value(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone)]
pub struct Payer {
    pub email: String,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone)]
pub struct BackUrls {
    pub success: String,
    pub failure: String,
    pub pending: String,
}

impl BackUrls {
    fn all(url: &str) -> Self {
        Self {
            success: url.to_string(),
            failure: url.to_string(),
            pending: url.to_string(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum AutoReturn {
    Approved,
}

/// Body of a preference-creation call.
///
/// `external_reference` is derived from the issue time in milliseconds and is
/// not unique across submissions made within the same millisecond.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct CheckoutRequest {
    pub items: Vec<LineItem>,
    pub payer: Payer,
    pub back_urls: BackUrls,
    pub external_reference: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_return: Option<AutoReturn>,
}

impl CheckoutRequest {
    /// Builds the request for `input`, sending the payer back to `page_url`.
    ///
    /// Fails with [`CheckoutError::InvalidCallbackUrl`] when the page URL is
    /// not an absolute `http`/`https` URL.
    pub fn build(input: &ValidatedInput, page_url: &str, issued_at: DateTime<Utc>) -> Result<Self> {
        let callback = callback_base(page_url);
        let parsed = Url::parse(callback).map_err(|_| CheckoutError::InvalidCallbackUrl)?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(CheckoutError::InvalidCallbackUrl);
        }

        // The provider rejects auto_return paired with a back URL it cannot reach.
        let auto_return = (!is_local_host(&parsed)).then_some(AutoReturn::Approved);

        Ok(Self {
            items: vec![LineItem::single(input.amount)],
            payer: payer(&input.payer_email),
            back_urls: BackUrls::all(callback),
            external_reference: format!("ext_ref_{}", issued_at.timestamp_millis()),
            auto_return,
        })
    }
}

fn payer(email: &PayerEmail) -> Payer {
    Payer {
        email: email.as_str().to_string(),
    }
}

/// Everything before the first `?`.
pub fn callback_base(page_url: &str) -> &str {
    page_url
        .split_once('?')
        .map_or(page_url, |(base, _query)| base)
}

pub fn is_local_host(url: &Url) -> bool {
    url.host_str()
        .is_some_and(|host| LOCAL_HOSTS.contains(&host))
}

/// Success body of a preference-creation call. Unknown fields are ignored.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Default)]
pub struct PreferenceResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub init_point: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sandbox_init_point: Option<String>,
}

impl PreferenceResponse {
    /// The production checkout URL, or the sandbox one when it is absent.
    pub fn checkout_url(&self) -> Result<&str> {
        self.init_point
            .as_deref()
            .filter(|url| !url.is_empty())
            .or_else(|| self.sandbox_init_point.as_deref().filter(|url| !url.is_empty()))
            .ok_or(CheckoutError::MissingCheckoutUrl)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::input::validate;
    use chrono::TimeZone;

    fn input() -> ValidatedInput {
        validate("49.90", "buyer@example.com").unwrap()
    }

    fn issued_at() -> DateTime<Utc> {
        Utc.timestamp_millis_opt(1_700_000_000_123).unwrap()
    }

    #[test]
    fn test_build_public_origin() {
        let request = CheckoutRequest::build(
            &input(),
            "https://shop.example.com/pay?status=approved&payment_id=1",
            issued_at(),
        )
        .unwrap();

        assert_eq!(request.back_urls.success, "https://shop.example.com/pay");
        assert_eq!(request.back_urls.failure, "https://shop.example.com/pay");
        assert_eq!(request.back_urls.pending, "https://shop.example.com/pay");
        assert_eq!(request.auto_return, Some(AutoReturn::Approved));
        assert_eq!(request.external_reference, "ext_ref_1700000000123");
        assert_eq!(request.payer.email, "buyer@example.com");
        assert_eq!(request.items.len(), 1);
        assert_eq!(request.items[0].quantity, 1);
        assert_eq!(request.items[0].currency_id, "BRL");
    }

    #[test]
    fn test_build_local_origin_omits_auto_return() {
        for page in ["http://localhost:5173/", "http://127.0.0.1:8080/checkout"] {
            let request = CheckoutRequest::build(&input(), page, issued_at()).unwrap();
            assert_eq!(request.auto_return, None, "{page}");
        }
    }

    #[test]
    fn test_host_named_like_localhost_is_not_local() {
        let request =
            CheckoutRequest::build(&input(), "https://localhost.example.com/", issued_at()).unwrap();
        assert_eq!(request.auto_return, Some(AutoReturn::Approved));
    }

    #[test]
    fn test_build_rejects_non_web_origins() {
        for page in ["file:///tmp/index.html", "about:blank", "", "/relative/path"] {
            let err = CheckoutRequest::build(&input(), page, issued_at()).unwrap_err();
            assert!(
                matches!(err, CheckoutError::InvalidCallbackUrl),
                "{page:?} gave {err:?}"
            );
        }
    }

    #[test]
    fn test_wire_format() {
        let request =
            CheckoutRequest::build(&input(), "http://localhost:5173/", issued_at()).unwrap();
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "items": [{
                    "id": "item_001",
                    "title": "Produto",
                    "description": "Pagamento de teste",
                    "quantity": 1,
                    "currency_id": "BRL",
                    "unit_price": 49.9,
                }],
                "payer": {"email": "buyer@example.com"},
                "back_urls": {
                    "success": "http://localhost:5173/",
                    "failure": "http://localhost:5173/",
                    "pending": "http://localhost:5173/",
                },
                "external_reference": "ext_ref_1700000000123",
            })
        );
    }

    #[test]
    fn test_checkout_url_preference() {
        let both = PreferenceResponse {
            id: Some("pref-1".to_string()),
            init_point: Some("https://mp/init".to_string()),
            sandbox_init_point: Some("https://mp/sandbox".to_string()),
        };
        assert_eq!(both.checkout_url().unwrap(), "https://mp/init");

        let sandbox_only = PreferenceResponse {
            sandbox_init_point: Some("https://mp/sandbox".to_string()),
            ..Default::default()
        };
        assert_eq!(sandbox_only.checkout_url().unwrap(), "https://mp/sandbox");

        assert!(matches!(
            PreferenceResponse::default().checkout_url(),
            Err(CheckoutError::MissingCheckoutUrl)
        ));
    }
}
