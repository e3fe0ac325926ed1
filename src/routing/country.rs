//! Country identifiers and routing table entries.

use crate::types::GatewayKind;
use keshvar::Alpha2;
use std::fmt::{self, Display, Formatter};

/// Result of country detection: a known ISO country or an explicit unknown.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CountryCode {
    Known(Alpha2),
    Unknown,
}

// `Alpha2` is a fieldless enum with total `PartialEq`, but keshvar does not derive `Eq`.
impl Eq for CountryCode {}

impl CountryCode {
    /// The ISO code, if known.
    pub fn alpha2(&self) -> Option<Alpha2> {
        match self {
            CountryCode::Known(alpha2) => Some(*alpha2),
            CountryCode::Unknown => None,
        }
    }

    pub fn is_known(&self) -> bool {
        matches!(self, CountryCode::Known(_))
    }
}

impl From<Alpha2> for CountryCode {
    fn from(alpha2: Alpha2) -> Self {
        CountryCode::Known(alpha2)
    }
}

impl Display for CountryCode {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            CountryCode::Known(alpha2) => f.write_str(&alpha2.to_string()),
            CountryCode::Unknown => f.write_str("UNKNOWN"),
        }
    }
}

/// Static routing data for one country.
#[derive(Debug, Clone, PartialEq)]
pub struct CountryInfo {
    pub code: Alpha2,
    /// ISO short name, e.g. `"Angola"`.
    pub name: String,
    /// International prefix including `+`, e.g. `"+244"`.
    pub phone_prefix: String,
    pub preferred_gateway: GatewayKind,
    pub cost_multiplier: f64,
}

impl CountryInfo {
    /// Entry named after the country's ISO short name.
    pub fn new(
        code: Alpha2,
        phone_prefix: &str,
        preferred_gateway: GatewayKind,
        cost_multiplier: f64,
    ) -> Self {
        let digits = phone_prefix.trim().trim_start_matches('+');
        Self {
            code,
            name: code.to_country().iso_short_name().to_string(),
            phone_prefix: format!("+{digits}"),
            preferred_gateway,
            cost_multiplier,
        }
    }

    /// Prefix digits without the `+`.
    pub fn prefix_digits(&self) -> &str {
        self.phone_prefix.trim_start_matches('+')
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_country_info_normalizes_prefix() {
        let info = CountryInfo::new(Alpha2::AO, "244", GatewayKind::BulkGate, 1.0);
        assert_eq!(info.phone_prefix, "+244");
        assert_eq!(info.prefix_digits(), "244");
        assert_eq!(info.name, "Angola");
    }

    #[test]
    fn test_country_code_display() {
        assert_eq!(CountryCode::Known(Alpha2::PT).to_string(), "PT");
        assert_eq!(CountryCode::Unknown.to_string(), "UNKNOWN");
        assert_eq!(CountryCode::Unknown.alpha2(), None);
    }
}
