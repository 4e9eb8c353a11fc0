use crate::domain::payment::{PaymentResult, PaymentStatus};
use crate::domain::redirect::ReturnParameters;
use crate::error::{TransitionError, ValidationError};
use std::fmt;

/// Prefix for failures raised while creating a checkout session.
pub const FAILURE_PREFIX: &str = "❌ ";

/// Identifies one gateway call. Completions carrying any other token are stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct SubmissionToken(u64);

impl SubmissionToken {
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }

    pub fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for SubmissionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PaymentState {
    #[default]
    Idle,
    /// A gateway call is in flight, or it succeeded and the page is leaving
    /// for `redirect`.
    Processing {
        token: SubmissionToken,
        redirect: Option<String>,
    },
    /// `success`, `error` or `pending`.
    Settled(PaymentResult),
}

impl PaymentState {
    pub fn status(&self) -> PaymentStatus {
        match self {
            Self::Idle => PaymentStatus::Idle,
            Self::Processing { .. } => PaymentStatus::Processing,
            Self::Settled(result) => result.status,
        }
    }

    pub fn result(&self) -> PaymentResult {
        match self {
            Self::Idle => PaymentResult::idle(),
            Self::Processing { .. } => PaymentResult::processing(),
            Self::Settled(result) => result.clone(),
        }
    }

    pub fn redirect(&self) -> Option<&str> {
        match self {
            Self::Processing { redirect, .. } => redirect.as_deref(),
            _ => None,
        }
    }

    /// New submissions are only accepted from `idle`. Terminal states need a
    /// reset first.
    pub fn can_submit(&self) -> bool {
        self.status() == PaymentStatus::Idle
    }

    pub fn can_reset(&self) -> bool {
        self.status() != PaymentStatus::Processing
    }

    fn submission_precondition(&self) -> Result<(), TransitionError> {
        if self.can_submit() {
            Ok(())
        } else if self.status().is_terminal() {
            Err(TransitionError::AlreadySettled)
        } else {
            Err(TransitionError::SubmissionInFlight)
        }
    }

    fn awaiting(&self, received: SubmissionToken) -> Result<(), TransitionError> {
        match self {
            Self::Processing {
                token,
                redirect: None,
            } if *token == received => Ok(()),
            _ => Err(TransitionError::StaleCompletion {
                received: received.value(),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// Form input failed validation; nothing was sent.
    Rejected(ValidationError),
    /// A gateway call tagged with the token has started.
    Submitted(SubmissionToken),
    /// The gateway returned a checkout URL and the page is navigating to it.
    Redirected { token: SubmissionToken, url: String },
    /// The submission failed after entering `processing`.
    Failed { token: SubmissionToken, reason: String },
    /// The page loaded with provider outcome parameters.
    Returned(ReturnParameters),
    Reset,
}

/// Applies `event` to `state`.
///
/// Returns the next state, or the reason the event is not allowed from the
/// current one. Never performs side effects.
pub fn transition(state: &PaymentState, event: Event) -> Result<PaymentState, TransitionError> {
    match event {
        Event::Rejected(err) => {
            state.submission_precondition()?;
            Ok(PaymentState::Settled(PaymentResult::failure(err.to_string())))
        }
        Event::Submitted(token) => {
            state.submission_precondition()?;
            Ok(PaymentState::Processing {
                token,
                redirect: None,
            })
        }
        Event::Redirected { token, url } => {
            state.awaiting(token)?;
            Ok(PaymentState::Processing {
                token,
                redirect: Some(url),
            })
        }
        Event::Failed { token, reason } => {
            state.awaiting(token)?;
            Ok(PaymentState::Settled(PaymentResult::failure(format!(
                "{FAILURE_PREFIX}{reason}"
            ))))
        }
        Event::Returned(params) => match state {
            PaymentState::Processing { redirect: None, .. } => {
                Err(TransitionError::SubmissionInFlight)
            }
            _ => Ok(PaymentState::Settled(params.into_result())),
        },
        Event::Reset => {
            if state.can_reset() {
                Ok(PaymentState::Idle)
            } else {
                Err(TransitionError::ResetWhileProcessing)
            }
        }
    }
}
