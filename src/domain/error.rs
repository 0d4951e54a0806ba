//! Domain errors

use rust_decimal::Decimal;
use thiserror::Error;

/// Reasons a tariff record cannot be turned into a billable [`Tariff`].
///
/// None of these escape [`compute_total`]; they exist so that decoding can be
/// tested on its own and so the dispatcher has something to log.
///
/// [`Tariff`]: crate::domain::Tariff
/// [`compute_total`]: crate::application::compute_total
#[derive(Debug, Error)]
pub enum TariffError {
    #[error("Tariff kind is missing")]
    MissingKind,

    #[error("Unknown tariff kind: {0}")]
    UnknownKind(String),

    #[error("Missing field for {kind} tariff: {field}")]
    MissingField {
        kind: &'static str,
        field: &'static str,
    },

    #[error("Unknown billing frequency: {0}")]
    UnknownFrequency(String),

    #[error("Malformed tariff payload: {0}")]
    MalformedPayload(#[from] serde_json::Error),

    #[error("Tiered tariff has no tiers")]
    EmptyTiers,

    #[error("Schedule must have 7 day lists, got {0}")]
    WrongDayCount(usize),

    #[error("Invalid time of day: {0:?}")]
    InvalidTime(String),
}

/// Errors raised while splitting an amount across payment methods
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SettlementError {
    #[error("No payment method selected")]
    NoPaymentMethod,

    #[error("Cash amount was not entered")]
    MissingCash,

    #[error("Cash received {received} does not cover {amount}")]
    InsufficientCash { received: Decimal, amount: Decimal },

    #[error("Unknown payment method: {0}")]
    UnknownMethod(String),
}

/// Result type for tariff decoding
pub type TariffResult<T> = Result<T, TariffError>;
