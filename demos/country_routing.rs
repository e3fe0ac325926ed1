//! Country routing example.
//!
//! Shows country detection, gateway preference and batch partitioning with
//! the built-in table and a custom one. Makes no network calls.
//!
//! # Running
//!
//! ```bash
//! cargo run --example country_routing
//! ```

use keshvar::Alpha2;
use sms_dispatch::GatewayKind;
use sms_dispatch::routing::RoutingTable;

fn main() {
    let table = RoutingTable::palop();

    println!("Built-in table (home country {}):", table.home_country().to_string());
    for info in table.countries() {
        println!(
            "  {:<6} {:<32} {:<10} x{:.1}",
            info.phone_prefix, info.name, info.preferred_gateway, info.cost_multiplier
        );
    }

    let numbers = [
        "+244 923 456 789",
        "923456789",
        "00351 911 222 333",
        "+55 11 98765-4321",
        "+1 876 555 0123",
        "+81 3 1234 5678",
    ];

    println!("\nDetection:");
    for number in numbers {
        let code = table.detect_country_from_phone(number);
        println!(
            "  {number:<20} -> {:<8} via {} (x{:.1})",
            code.to_string(),
            table.preferred_gateway(code),
            table.cost_multiplier(code)
        );
    }

    let route = table.route_batch(&numbers);
    println!("\nBatch summary: {:#?}", route.summary);

    // Kenya-centred table that sends local traffic through Africa's Talking
    let kenya = RoutingTable::builder(Alpha2::KE)
        .default_gateway(GatewayKind::Routee)
        .country(Alpha2::KE, "+254", GatewayKind::AfricasTalking, 1.0)
        .country(Alpha2::UG, "+256", GatewayKind::AfricasTalking, 1.2)
        .local_rule("07", 10..=10, Alpha2::KE)
        .build();

    println!("\nCustom table:");
    for number in ["0711000000", "+256 700 000 000", "+351911222333"] {
        println!("  {number:<18} -> {}", kenya.gateway_for_phone(number));
    }
}
