//! Phone number to country to gateway lookups.

use super::country::{CountryCode, CountryInfo};
use crate::types::GatewayKind;
use crate::utils::phone::normalize_phone;
use keshvar::Alpha2;
use once_cell::sync::Lazy;
use serde::Serialize;
use std::collections::BTreeMap;
use std::ops::RangeInclusive;

/// Built-in table, see [`RoutingTable::palop`].
static PALOP_TABLE: Lazy<RoutingTable> = Lazy::new(RoutingTable::palop);

/// Detect the country of `phone` using the built-in table.
///
/// ```
/// use sms_dispatch::routing::{CountryCode, detect_country_from_phone};
/// use keshvar::Alpha2;
///
/// assert_eq!(detect_country_from_phone("+244 923 456 789"), CountryCode::Known(Alpha2::AO));
/// assert_eq!(detect_country_from_phone("12345"), CountryCode::Unknown);
/// ```
pub fn detect_country_from_phone(phone: &str) -> CountryCode {
    PALOP_TABLE.detect_country_from_phone(phone)
}

/// Digit heuristic for numbers written without an international prefix.
#[derive(Debug, Clone)]
struct LocalRule {
    prefix: String,
    lengths: RangeInclusive<usize>,
    country: Alpha2,
}

impl LocalRule {
    fn matches(&self, digits: &str) -> bool {
        digits.starts_with(&self.prefix) && self.lengths.contains(&digits.len())
    }
}

/// Static country routing table.
///
/// Built once and never mutated. International numbers are matched against
/// registered prefixes longest first; numbers without a prefix go through the
/// table's local digit rules in registration order.
#[derive(Debug, Clone)]
pub struct RoutingTable {
    /// Sorted by prefix length, longest first.
    countries: Vec<CountryInfo>,
    local_rules: Vec<LocalRule>,
    home_country: Alpha2,
    default_gateway: GatewayKind,
}

impl Default for RoutingTable {
    fn default() -> Self {
        Self::palop()
    }
}

impl RoutingTable {
    /// Create a builder for a custom table.
    pub fn builder(home_country: Alpha2) -> RoutingTableBuilder {
        RoutingTableBuilder::new(home_country)
    }

    /// Angola-centred table covering the Portuguese-speaking African
    /// countries, Portugal, Brazil and a few long-haul destinations.
    ///
    /// Angola prefers BulkGate; everything else, including unknown numbers,
    /// goes to BulkSMS.
    pub fn palop() -> Self {
        Self::builder(Alpha2::AO)
            .default_gateway(GatewayKind::BulkSms)
            .country(Alpha2::AO, "+244", GatewayKind::BulkGate, 1.0)
            .country(Alpha2::MZ, "+258", GatewayKind::BulkSms, 1.2)
            .country(Alpha2::CV, "+238", GatewayKind::BulkSms, 1.3)
            .country(Alpha2::GW, "+245", GatewayKind::BulkSms, 1.4)
            .country(Alpha2::ST, "+239", GatewayKind::BulkSms, 1.4)
            .country(Alpha2::GQ, "+240", GatewayKind::BulkSms, 1.4)
            .country(Alpha2::PT, "+351", GatewayKind::BulkSms, 1.1)
            .country(Alpha2::BR, "+55", GatewayKind::BulkSms, 1.2)
            .country(Alpha2::US, "+1", GatewayKind::BulkSms, 1.5)
            .country(Alpha2::JM, "+1876", GatewayKind::BulkSms, 1.8)
            .local_rule("244", 12..=12, Alpha2::AO)
            .local_rule("9", 9..=9, Alpha2::AO)
            .local_rule("258", 0..=usize::MAX, Alpha2::MZ)
            .local_rule("238", 0..=usize::MAX, Alpha2::CV)
            .local_rule("245", 0..=usize::MAX, Alpha2::GW)
            .local_rule("239", 0..=usize::MAX, Alpha2::ST)
            .local_rule("351", 0..=usize::MAX, Alpha2::PT)
            .local_rule("55", 12..=13, Alpha2::BR)
            .build()
    }

    pub fn home_country(&self) -> Alpha2 {
        self.home_country
    }

    /// Gateway used for unknown or unlisted countries.
    pub fn default_gateway(&self) -> GatewayKind {
        self.default_gateway
    }

    /// All registered countries.
    pub fn countries(&self) -> &[CountryInfo] {
        &self.countries
    }

    pub fn country_info(&self, code: CountryCode) -> Option<&CountryInfo> {
        let alpha2 = code.alpha2()?;
        self.countries.iter().find(|info| info.code == alpha2)
    }

    /// Detect the destination country of a phone number.
    ///
    /// Spaces, dashes, dots and parentheses are ignored and a leading `00` is
    /// read as `+`. Anything that matches neither a registered prefix nor a
    /// local rule is [`CountryCode::Unknown`].
    pub fn detect_country_from_phone(&self, phone: &str) -> CountryCode {
        let normalized = normalize_phone(phone);
        let (digits, international) = match normalized.strip_prefix('+') {
            Some(rest) => (rest, true),
            None => match normalized.strip_prefix("00") {
                Some(rest) => (rest, true),
                None => (normalized.as_str(), false),
            },
        };

        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return CountryCode::Unknown;
        }

        if international {
            self.countries
                .iter()
                .find(|info| digits.starts_with(info.prefix_digits()))
                .map_or(CountryCode::Unknown, |info| CountryCode::Known(info.code))
        } else {
            self.local_rules
                .iter()
                .find(|rule| rule.matches(digits))
                .map_or(CountryCode::Unknown, |rule| CountryCode::Known(rule.country))
        }
    }

    /// Preferred gateway for a country, or the table default.
    pub fn preferred_gateway(&self, code: CountryCode) -> GatewayKind {
        self.country_info(code)
            .map_or(self.default_gateway, |info| info.preferred_gateway)
    }

    /// Cost multiplier for a country, `1.0` when unlisted.
    pub fn cost_multiplier(&self, code: CountryCode) -> f64 {
        self.country_info(code)
            .map_or(1.0, |info| info.cost_multiplier)
    }

    /// Preferred gateway for a phone number.
    pub fn gateway_for_phone(&self, phone: &str) -> GatewayKind {
        self.preferred_gateway(self.detect_country_from_phone(phone))
    }

    /// Partition numbers by preferred gateway in one pass.
    pub fn route_batch<S: AsRef<str>>(&self, numbers: &[S]) -> BatchRoute {
        let mut route = BatchRoute::default();

        for number in numbers {
            let number = number.as_ref();
            let code = self.detect_country_from_phone(number);
            let gateway = self.preferred_gateway(code);

            route
                .buckets
                .entry(gateway)
                .or_default()
                .push(number.to_string());
            *route.summary.per_gateway.entry(gateway).or_default() += 1;
            route.summary.total += 1;
            if code == CountryCode::Known(self.home_country) {
                route.summary.home_country += 1;
            }
        }

        route.summary.international = route.summary.total - route.summary.home_country;
        route
    }
}

/// Builder for a [`RoutingTable`].
#[derive(Debug, Clone)]
pub struct RoutingTableBuilder {
    countries: Vec<CountryInfo>,
    local_rules: Vec<LocalRule>,
    home_country: Alpha2,
    default_gateway: GatewayKind,
}

impl RoutingTableBuilder {
    pub fn new(home_country: Alpha2) -> Self {
        Self {
            countries: Vec::new(),
            local_rules: Vec::new(),
            home_country,
            default_gateway: GatewayKind::BulkSms,
        }
    }

    /// Gateway for countries not in the table.
    pub fn default_gateway(mut self, gateway: GatewayKind) -> Self {
        self.default_gateway = gateway;
        self
    }

    /// Register a country. A later entry for the same code replaces the
    /// earlier one.
    pub fn country(
        mut self,
        code: Alpha2,
        phone_prefix: &str,
        preferred_gateway: GatewayKind,
        cost_multiplier: f64,
    ) -> Self {
        self.countries.retain(|info| info.code != code);
        self.countries.push(CountryInfo::new(
            code,
            phone_prefix,
            preferred_gateway,
            cost_multiplier,
        ));
        self
    }

    /// Add a heuristic for numbers without an international prefix: digits
    /// starting with `prefix` whose total length is within `lengths`.
    pub fn local_rule(mut self, prefix: &str, lengths: RangeInclusive<usize>, country: Alpha2) -> Self {
        self.local_rules.push(LocalRule {
            prefix: prefix.to_string(),
            lengths,
            country,
        });
        self
    }

    pub fn build(mut self) -> RoutingTable {
        // Stable sort keeps registration order among equal-length prefixes.
        self.countries
            .sort_by_key(|info| std::cmp::Reverse(info.prefix_digits().len()));

        RoutingTable {
            countries: self.countries,
            local_rules: self.local_rules,
            home_country: self.home_country,
            default_gateway: self.default_gateway,
        }
    }
}

/// Numbers partitioned by gateway, with reporting counts.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchRoute {
    pub buckets: BTreeMap<GatewayKind, Vec<String>>,
    pub summary: BatchSummary,
}

impl BatchRoute {
    /// Numbers routed to `gateway`, in input order.
    pub fn bucket(&self, gateway: GatewayKind) -> &[String] {
        self.buckets
            .get(&gateway)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchSummary {
    pub total: usize,
    pub per_gateway: BTreeMap<GatewayKind, usize>,
    pub home_country: usize,
    /// Everything not in the home country, unknown numbers included.
    pub international: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_international_prefixes() {
        let table = RoutingTable::palop();
        let cases = [
            ("+244923456789", Alpha2::AO),
            ("+258841234567", Alpha2::MZ),
            ("+2389912345", Alpha2::CV),
            ("+245955123456", Alpha2::GW),
            ("+2399912345", Alpha2::ST),
            ("+351911222333", Alpha2::PT),
            ("+5511987654321", Alpha2::BR),
            ("+12025550123", Alpha2::US),
        ];
        for (phone, expected) in cases {
            assert_eq!(
                table.detect_country_from_phone(phone),
                CountryCode::Known(expected),
                "{phone}"
            );
        }
    }

    #[test]
    fn test_longest_prefix_wins() {
        let table = RoutingTable::palop();
        assert_eq!(
            table.detect_country_from_phone("+1 876 555 0123"),
            CountryCode::Known(Alpha2::JM)
        );
        assert_eq!(
            table.detect_country_from_phone("+1 202 555 0123"),
            CountryCode::Known(Alpha2::US)
        );
    }

    #[test]
    fn test_separators_and_double_zero() {
        let table = RoutingTable::palop();
        assert_eq!(
            table.detect_country_from_phone("(+244) 923-456.789"),
            CountryCode::Known(Alpha2::AO)
        );
        assert_eq!(
            table.detect_country_from_phone("00351 911 222 333"),
            CountryCode::Known(Alpha2::PT)
        );
    }

    #[test]
    fn test_local_heuristics() {
        let table = RoutingTable::palop();
        assert_eq!(table.detect_country_from_phone("244923456789"), CountryCode::Known(Alpha2::AO));
        assert_eq!(table.detect_country_from_phone("923456789"), CountryCode::Known(Alpha2::AO));
        assert_eq!(table.detect_country_from_phone("258841234567"), CountryCode::Known(Alpha2::MZ));
        assert_eq!(table.detect_country_from_phone("351911222333"), CountryCode::Known(Alpha2::PT));
        assert_eq!(table.detect_country_from_phone("5511987654321"), CountryCode::Known(Alpha2::BR));
        // Wrong lengths for the Angola and Brazil rules.
        assert_eq!(table.detect_country_from_phone("92345678"), CountryCode::Unknown);
        assert_eq!(table.detect_country_from_phone("551198765"), CountryCode::Unknown);
    }

    #[test]
    fn test_unknown_inputs() {
        let table = RoutingTable::palop();
        assert_eq!(table.detect_country_from_phone(""), CountryCode::Unknown);
        assert_eq!(table.detect_country_from_phone("+"), CountryCode::Unknown);
        assert_eq!(table.detect_country_from_phone("+999123456"), CountryCode::Unknown);
        assert_eq!(table.detect_country_from_phone("abc"), CountryCode::Unknown);
        assert_eq!(table.detect_country_from_phone("+44 20 7946 0958"), CountryCode::Unknown);
    }

    #[test]
    fn test_lookups_and_defaults() {
        let table = RoutingTable::palop();
        assert_eq!(table.preferred_gateway(Alpha2::AO.into()), GatewayKind::BulkGate);
        assert_eq!(table.preferred_gateway(Alpha2::PT.into()), GatewayKind::BulkSms);
        assert_eq!(table.preferred_gateway(CountryCode::Unknown), GatewayKind::BulkSms);
        assert_eq!(table.preferred_gateway(Alpha2::FR.into()), GatewayKind::BulkSms);
        assert_eq!(table.cost_multiplier(Alpha2::AO.into()), 1.0);
        assert_eq!(table.cost_multiplier(Alpha2::CV.into()), 1.3);
        assert_eq!(table.cost_multiplier(CountryCode::Unknown), 1.0);
    }

    #[test]
    fn test_route_batch() {
        let table = RoutingTable::palop();
        let numbers = [
            "+244923456789",
            "+351911222333",
            "923000111",
            "+999000",
            "+258841234567",
        ];
        let route = table.route_batch(&numbers);

        assert_eq!(
            route.bucket(GatewayKind::BulkGate),
            ["+244923456789".to_string(), "923000111".to_string()]
        );
        assert_eq!(route.bucket(GatewayKind::BulkSms).len(), 3);
        assert!(route.bucket(GatewayKind::Routee).is_empty());
        assert_eq!(route.summary.total, 5);
        assert_eq!(route.summary.home_country, 2);
        assert_eq!(route.summary.international, 3);
        assert_eq!(route.summary.per_gateway.get(&GatewayKind::BulkSms), Some(&3));
    }

    #[test]
    fn test_custom_table() {
        let table = RoutingTable::builder(Alpha2::KE)
            .default_gateway(GatewayKind::Routee)
            .country(Alpha2::KE, "+254", GatewayKind::AfricasTalking, 1.0)
            .local_rule("07", 10..=10, Alpha2::KE)
            .build();

        assert_eq!(table.gateway_for_phone("0711000000"), GatewayKind::AfricasTalking);
        assert_eq!(table.gateway_for_phone("+351911222333"), GatewayKind::Routee);
        assert_eq!(table.home_country(), Alpha2::KE);
    }

    #[test]
    fn test_free_function_uses_builtin_table() {
        assert_eq!(
            detect_country_from_phone("+351911222333"),
            CountryCode::Known(Alpha2::PT)
        );
    }
}
