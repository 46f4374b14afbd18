use serde::{Deserialize, Serialize};

use super::Resource;
use crate::error::{ApiError, ApiResult};

pub type CustomerId = i64;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub id: CustomerId,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
}

impl Resource for Customer {
    const COLLECTION: &'static str = "customers/";
}

/// Form state for a customer that has not been saved yet.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CustomerDraft {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
}

impl CustomerDraft {
    /// Labels of required fields that are still blank.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.name.trim().is_empty() {
            missing.push("name");
        }
        if self.email.trim().is_empty() {
            missing.push("email");
        }
        missing
    }

    pub fn validate(&self) -> ApiResult<()> {
        let missing = self.missing_fields();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(ApiError::InvalidDraft(missing.join(", ")))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_name_and_email_are_required() {
        let draft = CustomerDraft {
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            ..Default::default()
        };
        assert!(draft.validate().is_ok());

        let blank = CustomerDraft {
            name: "  ".to_string(),
            ..Default::default()
        };
        assert_eq!(blank.missing_fields(), vec!["name", "email"]);
    }

    #[test]
    fn test_customer_tolerates_null_optional_fields() {
        let customer: Customer = serde_json::from_str(
            r#"{"id": 3, "name": "Ada", "email": "ada@example.com", "phone": null}"#,
        )
        .unwrap();
        assert_eq!(customer.id, 3);
        assert_eq!(customer.phone, None);
        assert_eq!(customer.address, None);
    }
}
