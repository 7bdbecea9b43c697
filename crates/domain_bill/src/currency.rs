//! Supported currencies
//!
//! The billing domain supports exactly two currencies. The enum is closed on
//! purpose: currency arrives from callers and from storage as text, and both
//! boundaries must reject anything outside this set.

use core_kernel::ValidationError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Currency of a bill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    Usd,
    Gel,
}

impl Currency {
    /// Returns the ISO 4217 code.
    pub fn code(&self) -> &'static str {
        match self {
            Currency::Usd => "USD",
            Currency::Gel => "GEL",
        }
    }

    /// Parses a currency code, rejecting anything outside the supported set.
    pub fn from_code(code: &str) -> Result<Self, ValidationError> {
        match code {
            "USD" => Ok(Currency::Usd),
            "GEL" => Ok(Currency::Gel),
            other => Err(ValidationError::InvalidCurrency(other.to_string())),
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Currency {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_code(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_supported_codes() {
        assert_eq!(Currency::from_code("USD").unwrap(), Currency::Usd);
        assert_eq!(Currency::from_code("GEL").unwrap(), Currency::Gel);
    }

    #[test]
    fn rejects_unsupported_codes() {
        for code in ["EUR", "usd", "", "US"] {
            assert!(matches!(
                Currency::from_code(code),
                Err(ValidationError::InvalidCurrency(_))
            ));
        }
    }

    #[test]
    fn serializes_as_the_iso_code() {
        assert_eq!(serde_json::to_value(Currency::Usd).unwrap(), "USD");
        assert_eq!(
            serde_json::from_value::<Currency>(serde_json::json!("GEL")).unwrap(),
            Currency::Gel
        );
    }
}
