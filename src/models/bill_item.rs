use serde::{Deserialize, Serialize};

use super::{Amount, BillId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BillItem {
    #[serde(default)]
    pub id: Option<i64>,
    pub description: String,
    pub quantity: Amount,
    pub unit_price: Amount,
    #[serde(default)]
    pub total_price: Amount,
    pub bill: BillId,
}

/// One line of a bill that is still being drafted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BillItemDraft {
    pub description: String,
    pub quantity: f64,
    pub unit_price: f64,
}

impl Default for BillItemDraft {
    fn default() -> Self {
        Self {
            description: String::new(),
            quantity: 1.0,
            unit_price: 0.0,
        }
    }
}

impl BillItemDraft {
    /// Preview of the line total shown in the form. The server computes the
    /// stored value.
    pub fn line_total(&self) -> f64 {
        self.quantity * self.unit_price
    }

    pub fn for_bill(&self, bill: BillId) -> NewBillItem<'_> {
        NewBillItem {
            description: &self.description,
            quantity: self.quantity,
            unit_price: self.unit_price,
            bill,
        }
    }
}

/// Request body for `POST bill-items/`.
#[derive(Debug, Clone, Serialize)]
pub struct NewBillItem<'a> {
    pub description: &'a str,
    pub quantity: f64,
    pub unit_price: f64,
    pub bill: BillId,
}

#[cfg(test)]
mod tests {
    #![allow(clippy::float_cmp)]
    use super::*;

    #[test]
    fn test_item_body_carries_bill_id() {
        let draft = BillItemDraft {
            description: "Consulting".to_string(),
            quantity: 2.0,
            unit_price: 50.0,
        };
        let body = serde_json::to_value(draft.for_bill(41)).unwrap();
        assert_eq!(
            body,
            serde_json::json!({
                "description": "Consulting",
                "quantity": 2.0,
                "unit_price": 50.0,
                "bill": 41
            })
        );
        assert_eq!(draft.line_total(), 100.0);
    }

    #[test]
    fn test_bill_item_reads_decimal_strings() {
        let item: BillItem = serde_json::from_str(
            r#"{"id": 1, "description": "Hosting", "quantity": 3,
                "unit_price": "9.99", "total_price": "29.97", "bill": 5}"#,
        )
        .unwrap();
        assert_eq!(item.unit_price.as_str(), "9.99");
        assert_eq!(item.quantity.parse(), Some(3.0));
        assert_eq!(item.bill, 5);
    }
}
