//! Property-Based Test Generators
//!
//! Proptest strategies and fake-data helpers for generating random test
//! data that maintains domain invariants.

use domain_debt::{CustomerDetails, LineItem};
use fake::faker::address::en::CityName;
use fake::faker::company::en::CompanyName;
use fake::faker::name::en::Name;
use fake::faker::phone_number::en::PhoneNumber;
use fake::Fake;
use ledger_kernel::Money;
use proptest::prelude::*;

/// Strategy for positive amounts in minor units
pub fn positive_amount_minor_strategy() -> impl Strategy<Value = i64> {
    1i64..1_000_000_00i64
}

/// Strategy for non-negative amounts in minor units
pub fn amount_minor_strategy() -> impl Strategy<Value = i64> {
    0i64..1_000_000_00i64
}

/// Strategy for positive Money values
pub fn positive_money_strategy() -> impl Strategy<Value = Money> {
    positive_amount_minor_strategy().prop_map(Money::from_minor)
}

/// Strategy for non-negative Money values
pub fn money_strategy() -> impl Strategy<Value = Money> {
    amount_minor_strategy().prop_map(Money::from_minor)
}

/// Strategy for valid line item quantities
pub fn quantity_strategy() -> impl Strategy<Value = u32> {
    1u32..100u32
}

/// Strategy for a valid (quantity, unit price) pair
pub fn priced_quantity_strategy() -> impl Strategy<Value = (u32, Money)> {
    (quantity_strategy(), positive_money_strategy())
}

/// Strategy for a non-empty set of active line items
pub fn line_items_strategy() -> impl Strategy<Value = Vec<LineItem>> {
    proptest::collection::vec(priced_quantity_strategy(), 1..6).prop_map(|pairs| {
        pairs
            .into_iter()
            .enumerate()
            .map(|(i, (quantity, unit_price))| {
                LineItem::new(None, format!("item-{i}"), quantity, unit_price)
                    .expect("strategy yields valid items")
            })
            .collect()
    })
}

/// Randomized but realistic customer details
pub fn fake_customer_details() -> CustomerDetails {
    CustomerDetails {
        name: CompanyName().fake(),
        real_name: Some(Name().fake()),
        phone: Some(PhoneNumber().fake()),
        location: Some(CityName().fake()),
        remarks: None,
    }
}
