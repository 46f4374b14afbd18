use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use super::{Amount, BillItem, BillItemDraft, CustomerId, Resource};
use crate::error::{ApiError, ApiResult};

pub type BillId = i64;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BillStatus {
    #[default]
    Pending,
    Paid,
    Overdue,
    Cancelled,
    #[serde(other)]
    Unknown,
}

impl fmt::Display for BillStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            BillStatus::Pending => "PENDING",
            BillStatus::Paid => "PAID",
            BillStatus::Overdue => "OVERDUE",
            BillStatus::Cancelled => "CANCELLED",
            BillStatus::Unknown => "UNKNOWN",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bill {
    pub id: BillId,
    pub customer: CustomerId,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub customer_name: String,
    pub bill_number: String,
    pub bill_date: NaiveDate,
    pub due_date: NaiveDate,
    #[serde(default)]
    pub total_amount: Amount,
    #[serde(default)]
    pub status: BillStatus,
    #[serde(default)]
    pub items: Vec<BillItem>,
}

fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

impl Resource for Bill {
    const COLLECTION: &'static str = "bills/";
}

/// Form state for a bill that has not been saved yet.
#[derive(Debug, Clone, PartialEq)]
pub struct BillDraft {
    pub customer: Option<CustomerId>,
    pub bill_date: Option<NaiveDate>,
    pub due_date: Option<NaiveDate>,
    pub items: Vec<BillItemDraft>,
}

impl Default for BillDraft {
    fn default() -> Self {
        Self {
            customer: None,
            bill_date: None,
            due_date: None,
            items: vec![BillItemDraft::default()],
        }
    }
}

impl BillDraft {
    /// Labels of required fields that are still blank. Only presence is
    /// checked; amounts and date order are left to the server.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.customer.is_none() {
            missing.push("customer");
        }
        if self.bill_date.is_none() {
            missing.push("bill date");
        }
        if self.due_date.is_none() {
            missing.push("due date");
        }
        if self
            .items
            .iter()
            .any(|item| item.description.trim().is_empty())
        {
            missing.push("item description");
        }
        missing
    }

    /// Sum of the line previews, for display in the form only.
    pub fn preview_total(&self) -> f64 {
        self.items
            .iter()
            .map(BillItemDraft::line_total)
            .fold(0.0, |total, line| total + line)
    }

    /// Build the `POST bills/` body. New bills always start as pending.
    pub fn to_request(&self, bill_number: String) -> ApiResult<NewBill> {
        match (self.customer, self.bill_date, self.due_date) {
            (Some(customer), Some(bill_date), Some(due_date)) if self.missing_fields().is_empty() => {
                Ok(NewBill {
                    customer,
                    bill_date,
                    due_date,
                    items: self.items.clone(),
                    bill_number,
                    status: BillStatus::Pending,
                })
            }
            _ => Err(ApiError::InvalidDraft(self.missing_fields().join(", "))),
        }
    }
}

/// Request body for `POST bills/`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewBill {
    pub customer: CustomerId,
    pub bill_date: NaiveDate,
    pub due_date: NaiveDate,
    pub items: Vec<BillItemDraft>,
    pub bill_number: String,
    pub status: BillStatus,
}

/// `BILL-<unix millis>-<4 hex>`. The random tail makes collisions between
/// submissions in the same millisecond unlikely but not impossible.
pub fn generate_bill_number(now: DateTime<Utc>) -> String {
    let tail = uuid::Uuid::new_v4().simple().to_string();
    format!("BILL-{}-{}", now.timestamp_millis(), &tail[..4])
}
