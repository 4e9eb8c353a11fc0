use thiserror::Error;

/// Fallback shown when a failure carries no readable message of its own.
pub const GENERIC_FAILURE_MESSAGE: &str = "Erro ao criar preferência de pagamento.";

/// Local input errors, raised before any network activity.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Informe um valor válido para pagamento.")]
    InvalidAmount,
    #[error("Informe um email válido.")]
    InvalidEmail,
}

/// Events the payment state machine refuses to apply.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransitionError {
    #[error("a submission is already in flight")]
    SubmissionInFlight,
    #[error("the payment already settled; reset before submitting again")]
    AlreadySettled,
    #[error("cannot reset while a submission is processing")]
    ResetWhileProcessing,
    #[error("completion for submission {received} does not match the one in flight")]
    StaleCompletion { received: u64 },
}

#[derive(Error, Debug)]
pub enum CheckoutError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("URL inválida para retorno do pagamento")]
    InvalidCallbackUrl,
    #[error(transparent)]
    Transport(#[from] reqwest::Error),
    #[error("{message}")]
    Provider { status: u16, message: String },
    #[error("URL de checkout não encontrada na resposta")]
    MissingCheckoutUrl,
    #[error(transparent)]
    Transition(#[from] TransitionError),
    #[error("configuration error: {0}")]
    Config(String),
    #[error("checkout session is no longer running")]
    SessionClosed,
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CheckoutError {
    /// Human-readable reason for the failed submission.
    ///
    /// Prefers the error's own message, then the message of its source, then
    /// [`GENERIC_FAILURE_MESSAGE`].
    pub fn reason(&self) -> String {
        let direct = self.to_string();
        if !direct.trim().is_empty() {
            return direct;
        }
        std::error::Error::source(self)
            .map(|source| source.to_string())
            .filter(|message| !message.trim().is_empty())
            .unwrap_or_else(|| GENERIC_FAILURE_MESSAGE.to_string())
    }
}

pub type Result<T> = std::result::Result<T, CheckoutError>;
