//! Behavior of the bill identifier across its conversion surface.

use core_kernel::BillId;

#[test]
fn generate_embeds_customer_and_prefix() {
    let id = BillId::generate("acme");
    assert!(id.as_str().starts_with("bill-acme-"));
    // Suffix is the generation timestamp in nanoseconds.
    let suffix = id.as_str().rsplit('-').next().unwrap();
    assert!(suffix.parse::<i64>().is_ok());
}

#[test]
fn display_matches_the_inner_string() {
    let id = BillId::from_string("bill-acme-42");
    assert_eq!(id.to_string(), "bill-acme-42");
    assert_eq!(format!("{id}"), id.as_str());
}

#[test]
fn conversions_round_trip() {
    let id = BillId::from("bill-acme-42");
    let back: String = id.clone().into();
    assert_eq!(back, "bill-acme-42");
    assert_eq!(BillId::from(back), id);
}

#[test]
fn serde_treats_the_id_as_a_bare_string() {
    let id = BillId::from_string("bill-acme-42");
    let json = serde_json::to_string(&id).unwrap();
    assert_eq!(json, "\"bill-acme-42\"");
    let parsed: BillId = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, id);
}
