mod amount;
mod bill;
mod bill_item;
mod customer;

use serde::de::DeserializeOwned;

pub use amount::{format_currency, Amount};
pub use bill::{generate_bill_number, Bill, BillDraft, BillId, BillStatus, NewBill};
pub use bill_item::{BillItem, BillItemDraft, NewBillItem};
pub use customer::{Customer, CustomerDraft, CustomerId};

/// A record type served as a collection by the API.
pub trait Resource: DeserializeOwned + Send {
    /// Collection path relative to the API base, with trailing slash.
    const COLLECTION: &'static str;
}
