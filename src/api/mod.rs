mod client;
mod credentials;

use serde::de::DeserializeOwned;
use serde_json::Value;

pub use client::{HttpResourceClient, Method, ResourceClient};
pub use credentials::{CredentialProvider, StaticCredential, TokenStore, TOKEN_KEY};

use crate::error::{ApiError, ApiResult};
use crate::models::{Bill, BillId, BillItem, Customer, CustomerDraft, NewBill, NewBillItem, Resource};

const BILL_ITEMS: &str = "bill-items/";

/// Typed access to the billing endpoints on top of a `ResourceClient`.
pub struct BillingApi<C> {
    client: C,
}

impl<C: ResourceClient> BillingApi<C> {
    pub fn new(client: C) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    /// Fetch a whole collection in server order.
    pub async fn list<T: Resource>(&self) -> ApiResult<Vec<T>> {
        let body = self.client.send(Method::Get, T::COLLECTION, None).await?;
        decode(body)
    }

    pub async fn create_customer(&self, draft: &CustomerDraft) -> ApiResult<Customer> {
        let body = serde_json::to_value(draft)?;
        let created = self
            .client
            .send(Method::Post, Customer::COLLECTION, Some(body))
            .await?;
        decode(created)
    }

    /// `POST bills/`, returning the body undecoded. Once the server has
    /// accepted the bill the caller must be able to find its id even when the
    /// rest of the body does not decode.
    pub async fn post_bill(&self, bill: &NewBill) -> ApiResult<Value> {
        let body = serde_json::to_value(bill)?;
        self.client
            .send(Method::Post, Bill::COLLECTION, Some(body))
            .await
    }

    pub async fn create_bill_item(&self, item: NewBillItem<'_>) -> ApiResult<BillItem> {
        let body = serde_json::to_value(&item)?;
        let created = self.client.send(Method::Post, BILL_ITEMS, Some(body)).await?;
        decode(created)
    }

    pub async fn delete_bill(&self, id: BillId) -> ApiResult<()> {
        let path = format!("{}{}/", Bill::COLLECTION, id);
        self.client.send(Method::Delete, &path, None).await?;
        Ok(())
    }
}

fn decode<T: DeserializeOwned>(body: Value) -> ApiResult<T> {
    serde_json::from_value(body).map_err(|e| ApiError::MalformedResponse(e.to_string()))
}
