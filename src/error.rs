//! Exporter error types.
use alloy::{
    primitives::utils::UnitsError,
    transports::{RpcError, TransportErrorKind},
};
use std::num::ParseFloatError;
use thiserror::Error;

/// Errors returned by an upstream [`LendingSource`](crate::source::LendingSource).
#[derive(Debug, Error)]
pub enum SourceError {
    /// An error occurred talking to RPC.
    #[error(transparent)]
    Rpc(#[from] RpcError<TransportErrorKind>),
    /// A contract call reverted or could not be decoded.
    #[error(transparent)]
    Contract(#[from] alloy::contract::Error),
    /// A request to a third party HTTP API failed.
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    /// The upstream returned a field this exporter cannot represent.
    #[error("invalid {field}: {reason}")]
    InvalidField {
        /// The offending field.
        field: &'static str,
        /// Why the value was rejected.
        reason: String,
    },
    /// The upstream has no data for the request.
    #[error("{0} is unavailable")]
    Unavailable(String),
}

impl SourceError {
    /// Creates a [`SourceError::InvalidField`].
    pub fn invalid_field(field: &'static str, reason: impl ToString) -> Self {
        Self::InvalidField { field, reason: reason.to_string() }
    }
}

/// Errors raised while turning raw fixed-point values into metric samples.
#[derive(Debug, Error)]
pub enum ConversionError {
    /// The value could not be formatted with the requested decimals.
    #[error(transparent)]
    Units(#[from] UnitsError),
    /// The formatted value is not a valid float.
    #[error(transparent)]
    Parse(#[from] ParseFloatError),
    /// An intermediate product does not fit in 256 bits.
    #[error("fixed point product overflowed")]
    Overflow,
}

/// Errors of a single refresh task.
///
/// These never leave the task that produced them: they are logged at the spawn site and the
/// affected samples keep their previous value.
#[derive(Debug, Error)]
pub enum RefreshError {
    /// The upstream call failed.
    #[error(transparent)]
    Source(#[from] SourceError),
    /// A raw value could not be converted.
    #[error(transparent)]
    Conversion(#[from] ConversionError),
}
