//! Destination-country routing.
//!
//! Pure lookups, no I/O: a phone number is mapped to an ISO country, and the
//! country to its preferred gateway and cost multiplier.

mod country;
mod table;

pub use country::{CountryCode, CountryInfo};
pub use table::{
    BatchRoute, BatchSummary, RoutingTable, RoutingTableBuilder, detect_country_from_phone,
};
