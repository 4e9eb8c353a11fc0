use serde::{Deserialize, Serialize};
use std::fmt;

pub const PROCESSING_MESSAGE: &str = "Criando preferência de pagamento...";
pub const APPROVED_MESSAGE: &str = "✅ Pagamento AUTORIZADO com sucesso!";
pub const PENDING_MESSAGE: &str = "⏳ Pagamento PENDENTE de aprovação.";
pub const REJECTED_MESSAGE: &str = "❌ Pagamento NÃO AUTORIZADO.";

/// Lifecycle position of a payment as shown to the user.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy, Default)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    #[default]
    Idle,
    Processing,
    Success,
    Error,
    Pending,
}

impl PaymentStatus {
    /// `success`, `error` and `pending` end a payment attempt.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Success | Self::Error | Self::Pending)
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Idle => "idle",
            Self::Processing => "processing",
            Self::Success => "success",
            Self::Error => "error",
            Self::Pending => "pending",
        };
        f.write_str(s)
    }
}

/// What the user sees about the current payment attempt.
///
/// `payment_id` and `status_detail` only come from a completed provider round
/// trip, so the constructors for `idle` and `processing` never set them.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct PaymentResult {
    pub status: PaymentStatus,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_detail: Option<String>,
}

impl PaymentResult {
    pub fn idle() -> Self {
        Self::default()
    }

    pub fn processing() -> Self {
        Self {
            status: PaymentStatus::Processing,
            message: PROCESSING_MESSAGE.to_string(),
            payment_id: None,
            status_detail: None,
        }
    }

    /// A locally detected failure with no provider identifiers attached.
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            status: PaymentStatus::Error,
            message: message.into(),
            payment_id: None,
            status_detail: None,
        }
    }

    /// Maps the provider's outcome token from a return redirect.
    pub fn from_provider_outcome(status: &str, payment_id: &str) -> Self {
        let (kind, message) = match status {
            "approved" => (PaymentStatus::Success, APPROVED_MESSAGE),
            "pending" => (PaymentStatus::Pending, PENDING_MESSAGE),
            _ => (PaymentStatus::Error, REJECTED_MESSAGE),
        };
        Self {
            status: kind,
            message: message.to_string(),
            payment_id: Some(payment_id.to_string()),
            status_detail: Some(status.to_string()),
        }
    }
}

impl fmt::Display for PaymentResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.status, self.message)?;
        if let Some(payment_id) = &self.payment_id {
            write!(f, "\nID do Pagamento: {payment_id}")?;
        }
        if let Some(detail) = &self.status_detail {
            write!(f, "\nStatus: {detail}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_outcome_mapping() {
        let approved = PaymentResult::from_provider_outcome("approved", "123");
        assert_eq!(approved.status, PaymentStatus::Success);
        assert_eq!(approved.message, APPROVED_MESSAGE);
        assert_eq!(approved.payment_id.as_deref(), Some("123"));
        assert_eq!(approved.status_detail.as_deref(), Some("approved"));

        let pending = PaymentResult::from_provider_outcome("pending", "456");
        assert_eq!(pending.status, PaymentStatus::Pending);
        assert_eq!(pending.message, PENDING_MESSAGE);

        let rejected = PaymentResult::from_provider_outcome("in_process", "789");
        assert_eq!(rejected.status, PaymentStatus::Error);
        assert_eq!(rejected.message, REJECTED_MESSAGE);
        assert_eq!(rejected.status_detail.as_deref(), Some("in_process"));
    }

    #[test]
    fn test_local_results_carry_no_provider_ids() {
        for result in [
            PaymentResult::idle(),
            PaymentResult::processing(),
            PaymentResult::failure("❌ boom"),
        ] {
            assert!(result.payment_id.is_none());
            assert!(result.status_detail.is_none());
        }
    }

    #[test]
    fn test_serializes_camel_case_and_skips_empty_ids() {
        let json = serde_json::to_value(PaymentResult::idle()).unwrap();
        assert_eq!(json, serde_json::json!({"status": "idle", "message": ""}));

        let json =
            serde_json::to_value(PaymentResult::from_provider_outcome("approved", "1")).unwrap();
        assert_eq!(json["paymentId"], "1");
        assert_eq!(json["statusDetail"], "approved");
    }

    #[test]
    fn test_terminal_statuses() {
        assert!(!PaymentStatus::Idle.is_terminal());
        assert!(!PaymentStatus::Processing.is_terminal());
        assert!(PaymentStatus::Success.is_terminal());
        assert!(PaymentStatus::Error.is_terminal());
        assert!(PaymentStatus::Pending.is_terminal());
    }
}
