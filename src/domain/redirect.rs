use super::payment::PaymentResult;
use url::Url;

/// Outcome parameters the provider appends to the callback URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReturnParameters {
    pub status: String,
    pub payment_id: String,
}

impl ReturnParameters {
    /// Reads `status` and `payment_id` from the query of `page_url`.
    ///
    /// Returns `None` unless both are present and non-empty, which is the
    /// normal case for a visit that is not a provider return.
    pub fn from_page_url(page_url: &str) -> Option<Self> {
        let url = Url::parse(page_url).ok()?;
        let mut status = None;
        let mut payment_id = None;
        for (key, value) in url.query_pairs() {
            match key.as_ref() {
                "status" if status.is_none() => status = Some(value.into_owned()),
                "payment_id" if payment_id.is_none() => payment_id = Some(value.into_owned()),
                _ => {}
            }
        }

        Some(Self {
            status: status.filter(|s| !s.is_empty())?,
            payment_id: payment_id.filter(|s| !s.is_empty())?,
        })
    }

    pub fn into_result(self) -> PaymentResult {
        PaymentResult::from_provider_outcome(&self.status, &self.payment_id)
    }
}

/// `page_url` with its query and fragment removed, as written back to history
/// once the return parameters have been consumed.
pub fn strip_query(page_url: &str) -> Option<String> {
    let mut url = Url::parse(page_url).ok()?;
    url.set_query(None);
    url.set_fragment(None);
    Some(url.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::payment::PaymentStatus;

    #[test]
    fn test_parse_return_parameters() {
        let params = ReturnParameters::from_page_url(
            "https://shop.example.com/?collection_id=1&status=approved&payment_id=123&x=y",
        )
        .unwrap();
        assert_eq!(params.status, "approved");
        assert_eq!(params.payment_id, "123");

        let result = params.into_result();
        assert_eq!(result.status, PaymentStatus::Success);
        assert_eq!(result.payment_id.as_deref(), Some("123"));
    }

    #[test]
    fn test_missing_or_empty_parameters_are_ignored() {
        for page in [
            "https://shop.example.com/",
            "https://shop.example.com/?status=approved",
            "https://shop.example.com/?payment_id=123",
            "https://shop.example.com/?status=&payment_id=123",
            "https://shop.example.com/?status=approved&payment_id=",
            "not a url",
        ] {
            assert_eq!(ReturnParameters::from_page_url(page), None, "{page}");
        }
    }

    #[test]
    fn test_first_occurrence_wins() {
        let params = ReturnParameters::from_page_url(
            "http://localhost/?status=pending&status=approved&payment_id=9",
        )
        .unwrap();
        assert_eq!(params.status, "pending");
    }

    #[test]
    fn test_strip_query() {
        assert_eq!(
            strip_query("https://shop.example.com/pay?status=approved&payment_id=1#top").unwrap(),
            "https://shop.example.com/pay"
        );
        assert_eq!(
            strip_query("http://localhost:5173/").unwrap(),
            "http://localhost:5173/"
        );
    }
}
