use futures::future::join_all;
use serde::Deserialize;
use serde_json::Value;
use tracing::{error, info, warn};

use crate::api::{BillingApi, ResourceClient};
use crate::error::{ApiError, ApiResult, Compensation};
use crate::models::{Bill, BillDraft, BillId, Customer, CustomerDraft};

/// Validate the draft and POST it as a new customer.
pub async fn create_customer<C: ResourceClient>(
    api: &BillingApi<C>,
    draft: &CustomerDraft,
) -> ApiResult<Customer> {
    draft.validate()?;
    let customer = api
        .create_customer(draft)
        .await
        .inspect_err(|e| error!(error = %e, "failed to create customer"))?;
    info!(id = customer.id, name = %customer.name, "customer created");
    Ok(customer)
}

/// Create a bill and then its items.
///
/// Items are only sent once the bill exists, all at the same time, each
/// carrying the new bill id. If any item fails the bill is deleted again and
/// `PartialWriteFailure` reports how many items were lost and whether the
/// delete went through.
pub async fn create_bill<C: ResourceClient>(
    api: &BillingApi<C>,
    draft: &BillDraft,
    bill_number: String,
) -> ApiResult<Bill> {
    let request = draft.to_request(bill_number)?;
    let created = api
        .post_bill(&request)
        .await
        .inspect_err(|e| error!(error = %e, "failed to create bill"))?;

    let bill = match Bill::deserialize(&created) {
        Ok(bill) => bill,
        Err(err) => {
            // Accepted but unreadable: without its id the bill cannot be removed.
            let Some(bill_id) = created.get("id").and_then(Value::as_i64) else {
                error!(error = %err, "created bill has no readable id");
                return Err(ApiError::MalformedResponse(err.to_string()));
            };
            error!(bill_id, error = %err, "created bill could not be decoded");
            let attempted = request.items.len();
            let compensation = roll_back(api, bill_id).await;
            warn!(bill_id, %compensation, "bill written without items");
            return Err(ApiError::PartialWriteFailure {
                bill_id,
                failed: attempted,
                attempted,
                compensation,
            });
        }
    };
    info!(id = bill.id, bill_number = %bill.bill_number, "bill created");

    let results = join_all(
        request
            .items
            .iter()
            .map(|item| api.create_bill_item(item.for_bill(bill.id))),
    )
    .await;

    let attempted = results.len();
    let mut failed = 0;
    for err in results.iter().filter_map(|result| result.as_ref().err()) {
        error!(bill_id = bill.id, error = %err, "failed to create bill item");
        failed += 1;
    }
    if failed == 0 {
        info!(bill_id = bill.id, items = attempted, "bill items created");
        return Ok(bill);
    }

    let compensation = roll_back(api, bill.id).await;
    warn!(bill_id = bill.id, failed, attempted, %compensation, "partial bill write");
    Err(ApiError::PartialWriteFailure {
        bill_id: bill.id,
        failed,
        attempted,
        compensation,
    })
}

async fn roll_back<C: ResourceClient>(api: &BillingApi<C>, bill_id: BillId) -> Compensation {
    match api.delete_bill(bill_id).await {
        Ok(()) => Compensation::RolledBack,
        Err(err) => {
            error!(bill_id, error = %err, "failed to roll back bill");
            Compensation::Orphaned
        }
    }
}
