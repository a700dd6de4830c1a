use serde::{Deserialize, Serialize};
use std::fmt;

/// ISO 4217-style currency code.
///
/// # Examples
///
/// ```
/// use equity_research::core::currency::CurrencyCode;
///
/// let eur = CurrencyCode::new("EUR");
/// let usd = CurrencyCode::new("USD");
/// assert_ne!(eur, usd);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CurrencyCode(String);

impl CurrencyCode {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for CurrencyCode {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// A quoted exchange rate direction: 1 unit of `base` = rate units of `quote`.
///
/// The overlay simulator holds its notional in `base` and reports every
/// value in `quote` (EUR/USD by default).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CurrencyPair {
    pub base: CurrencyCode,
    pub quote: CurrencyCode,
}

impl CurrencyPair {
    pub fn new(base: CurrencyCode, quote: CurrencyCode) -> Self {
        Self { base, quote }
    }

    /// The EUR/USD pair the overlay tool is quoted in.
    pub fn eur_usd() -> Self {
        Self::new(CurrencyCode::new("EUR"), CurrencyCode::new("USD"))
    }
}

impl Default for CurrencyPair {
    fn default() -> Self {
        Self::eur_usd()
    }
}

impl fmt::Display for CurrencyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.base, self.quote)
    }
}
