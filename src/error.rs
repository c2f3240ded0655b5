//! Error types for interest calculation and rate book loading

use rust_decimal::Decimal;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for calculation and optimization operations
pub type Result<T> = std::result::Result<T, CalcError>;

/// Failures of the calculation boundary.
///
/// Every variant is a local, synchronous failure: a failed request yields no
/// breakdown or plan at all, never a partial one.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CalcError {
    /// Principal is negative or could not be read as a number
    #[error("invalid principal: {value}")]
    InvalidPrincipal { value: String },

    /// Bank name not present in the rate book
    #[error("unknown bank: {name}")]
    UnknownBank { name: String },

    /// Optimizer was given an empty bank selection
    #[error("no banks available for optimization")]
    NoBanksAvailable,

    /// Negative salary or card spend in the activity profile
    #[error("invalid activity profile: {field} must be non-negative, got {value}")]
    InvalidProfile { field: &'static str, value: Decimal },
}

impl CalcError {
    /// Create an invalid principal error from a numeric amount
    pub fn invalid_principal(amount: Decimal) -> Self {
        Self::InvalidPrincipal {
            value: amount.to_string(),
        }
    }

    /// Create an invalid principal error from unparseable input text
    pub fn unparseable_principal(text: impl Into<String>) -> Self {
        Self::InvalidPrincipal { value: text.into() }
    }

    /// Create an unknown bank error
    pub fn unknown_bank(name: impl Into<String>) -> Self {
        Self::UnknownBank { name: name.into() }
    }
}

/// Failures while loading CSV inputs or validating a rate book
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("{file} row {row}: {message}")]
    Parse {
        file: &'static str,
        row: usize,
        message: String,
    },

    #[error("bank {bank}: {message}")]
    InvalidProduct { bank: String, message: String },

    #[error("bank {0} is defined more than once")]
    DuplicateBank(String),
}

impl LoadError {
    /// Create a product validation error
    pub fn invalid_product(bank: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidProduct {
            bank: bank.into(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_error_kinds_are_distinguishable() {
        let negative = CalcError::invalid_principal(dec!(-5));
        assert_eq!(negative.to_string(), "invalid principal: -5");
        assert_ne!(negative, CalcError::NoBanksAvailable);
        assert!(matches!(
            CalcError::unknown_bank("DBS Multiplier"),
            CalcError::UnknownBank { ref name } if name == "DBS Multiplier"
        ));
    }

    #[test]
    fn test_profile_error_message() {
        let err = CalcError::InvalidProfile {
            field: "monthly_salary",
            value: dec!(-1),
        };
        assert_eq!(
            err.to_string(),
            "invalid activity profile: monthly_salary must be non-negative, got -1"
        );
    }
}
