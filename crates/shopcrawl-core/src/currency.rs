//! Static currency → USD multiplier table.
//!
//! The rate file is a flat JSON object, e.g. `{"EUR": 1.08, "INR": 0.012}`.
//! It is loaded once per run and shared read-only between sites. Loading
//! never fails: a missing or malformed file yields an empty table, and every
//! lookup against an empty table returns `1.0`.

use std::collections::HashMap;
use std::path::Path;

use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;

use crate::products::round_price;

#[derive(Debug, Clone, Default)]
pub struct RateTable {
    rates: HashMap<String, f64>,
}

impl RateTable {
    /// Builds a table from `(code, multiplier)` pairs. Codes are stored
    /// upper-cased; non-finite or non-positive multipliers are dropped.
    #[must_use]
    pub fn from_rates<I, S>(rates: I) -> Self
    where
        I: IntoIterator<Item = (S, f64)>,
        S: AsRef<str>,
    {
        let rates = rates
            .into_iter()
            .filter_map(|(code, rate)| {
                let code = code.as_ref().trim().to_ascii_uppercase();
                if code.is_empty() || !rate.is_finite() || rate <= 0.0 {
                    tracing::warn!(code = %code, rate, "ignoring unusable exchange rate");
                    return None;
                }
                Some((code, rate))
            })
            .collect();
        Self { rates }
    }

    /// Loads the rate file at `path`. Never fails; see the module docs.
    #[must_use]
    pub fn load(path: &Path) -> Self {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "exchange rate file unavailable; all rates default to 1.0"
                );
                return Self::default();
            }
        };
        Self::parse(&content).unwrap_or_else(|e| {
            tracing::error!(
                path = %path.display(),
                error = %e,
                "exchange rate file is malformed; all rates default to 1.0"
            );
            Self::default()
        })
    }

    /// Parses the JSON rate document.
    ///
    /// # Errors
    ///
    /// Returns the `serde_json` error if `content` is not an object of numbers.
    pub fn parse(content: &str) -> Result<Self, serde_json::Error> {
        let raw: HashMap<String, f64> = serde_json::from_str(content)?;
        let table = Self::from_rates(raw);
        tracing::info!(currencies = table.len(), "loaded exchange rates");
        Ok(table)
    }

    /// Multiplier converting `code` to USD; `1.0` when the code is unknown.
    #[must_use]
    pub fn rate_for(&self, code: &str) -> f64 {
        self.rates
            .get(&code.trim().to_ascii_uppercase())
            .copied()
            .unwrap_or(1.0)
    }

    /// [`Self::rate_for`] as a `Decimal`.
    #[must_use]
    pub fn multiplier(&self, code: &str) -> Decimal {
        Decimal::from_f64(self.rate_for(code)).unwrap_or(Decimal::ONE)
    }

    /// Converts `price` in `code` to USD, rounded to cents.
    #[must_use]
    pub fn convert(&self, price: Decimal, code: &str) -> Decimal {
        let converted = price
            .checked_mul(self.multiplier(code))
            .unwrap_or(Decimal::ZERO);
        round_price(converted)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rates.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }
}
