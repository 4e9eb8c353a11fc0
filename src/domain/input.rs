use crate::error::ValidationError;
use rust_decimal::Decimal;
use std::str::FromStr;

/// Characters a plain or scientific decimal literal may contain.
fn is_numeric_literal(s: &str) -> bool {
    !s.is_empty()
        && s
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '.' | '+' | '-' | 'e' | 'E'))
}

/// A strictly positive amount to charge.
///
/// Wraps `rust_decimal::Decimal` so a non-positive price can never reach a
/// checkout request.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Amount(Decimal);

impl Amount {
    pub fn new(value: Decimal) -> Result<Self, ValidationError> {
        if value > Decimal::ZERO {
            Ok(Self(value))
        } else {
            Err(ValidationError::InvalidAmount)
        }
    }

    pub fn value(&self) -> Decimal {
        self.0
    }
}

impl FromStr for Amount {
    type Err = ValidationError;

    /// Accepts plain and scientific notation, ignoring surrounding whitespace.
    /// Digit separators and thousands commas are not numbers.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if !is_numeric_literal(trimmed) {
            return Err(ValidationError::InvalidAmount);
        }
        let value = Decimal::from_str(trimmed)
            .or_else(|_| Decimal::from_scientific(trimmed))
            .map_err(|_| ValidationError::InvalidAmount)?;
        Self::new(value)
    }
}

/// Payer email. Only checked for the presence of an `@`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PayerEmail(String);

impl PayerEmail {
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        if value.contains('@') {
            Ok(Self(value))
        } else {
            Err(ValidationError::InvalidEmail)
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Form input that passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedInput {
    pub amount: Amount,
    pub payer_email: PayerEmail,
}

/// Validates raw form fields. The amount is checked before the email.
pub fn validate(amount: &str, payer_email: &str) -> Result<ValidatedInput, ValidationError> {
    let amount = amount.parse::<Amount>()?;
    let payer_email = PayerEmail::new(payer_email)?;
    Ok(ValidatedInput {
        amount,
        payer_email,
    })
}
