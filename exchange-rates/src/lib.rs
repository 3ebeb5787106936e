//! Exchange Rates Library with Macro-Based Currency Metadata
//!
//! Rates are expressed as "units of that currency per 1 USD", so every
//! conversion pivots through USD:
//!
//! ```text
//! converted = amount / rate(from) * rate(to)
//! ```
//!
//! The built-in currencies are declared once with `define_currencies!`,
//! which generates the `CurrencyCode` constants and the metadata table used
//! for symbols and fraction digits.
//!
//! # Example
//! ```
//! use exchange_rates::{CurrencyCode, ExchangeRateTable};
//!
//! let table = ExchangeRateTable::default();
//! let usd = table.convert(100.0, &CurrencyCode::KWD, &CurrencyCode::USD);
//! assert!((usd - 322.58).abs() < 0.01);
//! ```

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

// ─────────────────────────────────────────────────────────────────────────────
// Errors
// ─────────────────────────────────────────────────────────────────────────────

/// Error type for exchange rate operations.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ExchangeError {
    #[error("Unsupported currency: {0:?}")]
    UnsupportedCurrency(String),

    #[error("Invalid rate for {code}: {rate} (must be positive and finite)")]
    InvalidRate { code: CurrencyCode, rate: f64 },

    #[error("Invalid rate override {0:?}, expected CODE=RATE")]
    InvalidOverride(String),

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),
}

// ─────────────────────────────────────────────────────────────────────────────
// Currency Code
// ─────────────────────────────────────────────────────────────────────────────

/// Upper-case currency code such as `KWD` or `USD`.
///
/// Codes outside the built-in set are allowed; they simply have no metadata
/// and convert at the USD fallback rate unless a table provides one.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CurrencyCode(Cow<'static, str>);

impl CurrencyCode {
    /// Parses a code, trimming whitespace and upper-casing it.
    pub fn new(code: impl AsRef<str>) -> Result<Self, ExchangeError> {
        let normalized = code.as_ref().trim().to_uppercase();
        if normalized.is_empty() || !normalized.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(ExchangeError::UnsupportedCurrency(code.as_ref().to_string()));
        }
        if let Some(info) = CurrencyInfo::lookup(&normalized) {
            return Ok(Self(Cow::Borrowed(info.code)));
        }
        Ok(Self(Cow::Owned(normalized)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Metadata for built-in currencies.
    pub fn info(&self) -> Option<&'static CurrencyInfo> {
        CurrencyInfo::lookup(self.as_str())
    }

    /// Display symbol; unknown currencies use their code.
    pub fn symbol(&self) -> &str {
        self.info().map(|i| i.symbol).unwrap_or_else(|| self.as_str())
    }

    /// Digits shown after the decimal point; unknown currencies use 2.
    pub fn fraction_digits(&self) -> usize {
        self.info().map(|i| i.fraction_digits).unwrap_or(2)
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CurrencyCode({})", self.0)
    }
}

impl FromStr for CurrencyCode {
    type Err = ExchangeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for CurrencyCode {
    type Error = ExchangeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<CurrencyCode> for String {
    fn from(code: CurrencyCode) -> Self {
        code.0.into_owned()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Built-in Currency Metadata
// ─────────────────────────────────────────────────────────────────────────────

/// Static metadata for a built-in currency.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CurrencyInfo {
    pub code: &'static str,
    pub symbol: &'static str,
    pub fraction_digits: usize,
    /// Default units of this currency per 1 USD.
    pub per_usd: f64,
}

impl CurrencyInfo {
    pub fn lookup(code: &str) -> Option<&'static CurrencyInfo> {
        BUILTIN_CURRENCIES.iter().find(|info| info.code == code)
    }
}

/// Defines the built-in currencies.
///
/// # Syntax
/// ```ignore
/// define_currencies! {
///     NAME => ("CODE", "SYMBOL", fraction_digits, units_per_usd),
/// }
/// ```
macro_rules! define_currencies {
    (
        $(
            $name:ident => ($code:literal, $symbol:literal, $digits:expr, $per_usd:expr)
        ),* $(,)?
    ) => {
        impl CurrencyCode {
            $(
                pub const $name: CurrencyCode = CurrencyCode(Cow::Borrowed($code));
            )*
        }

        /// Metadata and default rates for every built-in currency.
        pub static BUILTIN_CURRENCIES: &[CurrencyInfo] = &[
            $(
                CurrencyInfo {
                    code: $code,
                    symbol: $symbol,
                    fraction_digits: $digits,
                    per_usd: $per_usd,
                }
            ),*
        ];
    };
}

// ─────────────────────────────────────────────────────────────────────────────
// CURRENCY DEFINITIONS
// ─────────────────────────────────────────────────────────────────────────────

define_currencies! {
    USD => ("USD", "$", 2, 1.0),
    KWD => ("KWD", "KD ", 3, 0.31),
    EUR => ("EUR", "€", 2, 0.92),
    GBP => ("GBP", "£", 2, 0.79),
    INR => ("INR", "₹", 2, 83.12),
    AED => ("AED", "AED ", 2, 3.6725),
    SAR => ("SAR", "SAR ", 2, 3.75),
}

// ─────────────────────────────────────────────────────────────────────────────
// Exchange Rate Table
// ─────────────────────────────────────────────────────────────────────────────

/// Immutable mapping of currency code to units-per-USD.
///
/// USD is always present at 1.0. Lookups for codes not in the table fall
/// back to 1.0, so an unknown currency behaves like USD.
#[derive(Debug, Clone, PartialEq)]
pub struct ExchangeRateTable {
    rates: BTreeMap<CurrencyCode, f64>,
}

impl ExchangeRateTable {
    /// Table containing only USD.
    pub fn usd_only() -> Self {
        let mut rates = BTreeMap::new();
        rates.insert(CurrencyCode::USD, 1.0);
        Self { rates }
    }

    /// Builds a table from explicit pairs. USD is forced to 1.0.
    pub fn from_pairs<I>(pairs: I) -> Result<Self, ExchangeError>
    where
        I: IntoIterator<Item = (CurrencyCode, f64)>,
    {
        pairs
            .into_iter()
            .try_fold(Self::usd_only(), |table, (code, rate)| table.with_rate(code, rate))
    }

    /// Returns a copy with `code` set to `rate`.
    pub fn with_rate(mut self, code: CurrencyCode, rate: f64) -> Result<Self, ExchangeError> {
        if code == CurrencyCode::USD {
            return Ok(self);
        }
        if !rate.is_finite() || rate <= 0.0 {
            return Err(ExchangeError::InvalidRate { code, rate });
        }
        self.rates.insert(code, rate);
        Ok(self)
    }

    /// Applies `CODE=RATE` overrides separated by commas, e.g. `KWD=0.307,EUR=0.9`.
    pub fn apply_overrides(self, overrides: &str) -> Result<Self, ExchangeError> {
        overrides.split(',')
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .try_fold(self, |table, entry| {
                let (code, rate) = entry
                    .split_once('=')
                    .ok_or_else(|| ExchangeError::InvalidOverride(entry.to_string()))?;
                let code = CurrencyCode::new(code)?;
                let rate: f64 = rate
                    .trim()
                    .parse()
                    .map_err(|_| ExchangeError::InvalidOverride(entry.to_string()))?;
                table.with_rate(code, rate)
            })
    }

    /// Units of `code` per USD, or 1.0 when the code is unknown.
    pub fn rate(&self, code: &CurrencyCode) -> f64 {
        self.rates.get(code).copied().unwrap_or(1.0)
    }

    pub fn contains(&self, code: &CurrencyCode) -> bool {
        self.rates.contains_key(code)
    }

    pub fn codes(&self) -> impl Iterator<Item = &CurrencyCode> {
        self.rates.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&CurrencyCode, f64)> {
        self.rates.iter().map(|(code, rate)| (code, *rate))
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }

    /// Converts `amount` from one currency to another through USD.
    pub fn convert(&self, amount: f64, from: &CurrencyCode, to: &CurrencyCode) -> f64 {
        convert_currency(self, amount, from, to)
    }
}

impl Default for ExchangeRateTable {
    /// The built-in rates.
    fn default() -> Self {
        let rates = BUILTIN_CURRENCIES
            .iter()
            .map(|info| (CurrencyCode(Cow::Borrowed(info.code)), info.per_usd))
            .collect();
        Self { rates }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Currency Conversion
// ─────────────────────────────────────────────────────────────────────────────

/// Pivot conversion: `amount / rate(from) * rate(to)`.
///
/// Same-currency conversions still run the arithmetic.
pub fn convert_currency(
    table: &ExchangeRateTable,
    amount: f64,
    from: &CurrencyCode,
    to: &CurrencyCode,
) -> f64 {
    amount / table.rate(from) * table.rate(to)
}

/// How many units of `to` one unit of `from` buys.
pub fn get_rate(table: &ExchangeRateTable, from: &CurrencyCode, to: &CurrencyCode) -> f64 {
    convert_currency(table, 1.0, from, to)
}

/// Rates from `base` to every currency in the table.
pub fn get_all_rates(table: &ExchangeRateTable, base: &CurrencyCode) -> BTreeMap<CurrencyCode, f64> {
    table
        .codes()
        .map(|code| (code.clone(), get_rate(table, base, code)))
        .collect()
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
