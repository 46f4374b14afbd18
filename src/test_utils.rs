//! In-memory stand-in for the billing API used by unit tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use serde_json::{json, Value};
use tokio::sync::Notify;

use crate::api::{Method, ResourceClient};
use crate::error::{ApiError, ApiResult};

#[derive(Debug, Clone)]
pub struct Call {
    pub method: Method,
    pub path: String,
    pub body: Option<Value>,
}

type Rule = Box<dyn Fn(&Call) -> Option<u16> + Send + Sync>;
type Tamper = Box<dyn Fn(&mut Value) + Send + Sync>;

#[derive(Default)]
struct FakeState {
    customers: Vec<Value>,
    bills: Vec<Value>,
    items: Vec<Value>,
    next_id: i64,
    calls: Vec<Call>,
}

/// Records every call and behaves like the billing API: ids are assigned on
/// create and bill totals follow their items.
#[derive(Default)]
pub struct FakeServer {
    state: Mutex<FakeState>,
    rules: Vec<Rule>,
    overrides: HashMap<String, Value>,
    tampers: HashMap<String, Tamper>,
    gate: Option<Arc<Notify>>,
}

impl FakeServer {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(FakeState {
                next_id: 100,
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    pub fn with_customers(self, customers: Vec<Value>) -> Self {
        self.state.lock().unwrap().customers = customers;
        self
    }

    pub fn with_bills(self, bills: Vec<Value>) -> Self {
        self.state.lock().unwrap().bills = bills;
        self
    }

    /// Answer matching calls with the given HTTP status.
    pub fn reject_when(mut self, rule: impl Fn(&Call) -> Option<u16> + Send + Sync + 'static) -> Self {
        self.rules.push(Box::new(rule));
        self
    }

    /// Return `body` verbatim for `GET path`.
    pub fn respond_with(mut self, path: &str, body: Value) -> Self {
        self.overrides.insert(path.to_string(), body);
        self
    }

    /// Store `POST path` normally but change the body sent back.
    pub fn tamper_created(mut self, path: &str, tamper: impl Fn(&mut Value) + Send + Sync + 'static) -> Self {
        self.tampers.insert(path.to_string(), Box::new(tamper));
        self
    }

    /// Hold every request until the gate is notified.
    pub fn gated(mut self, gate: Arc<Notify>) -> Self {
        self.gate = Some(gate);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn calls_to(&self, method: Method, path: &str) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|call| call.method == method && call.path == path)
            .collect()
    }

    pub fn customers(&self) -> Vec<Value> {
        self.state.lock().unwrap().customers.clone()
    }

    pub fn bills(&self) -> Vec<Value> {
        self.state.lock().unwrap().bills.clone()
    }

    pub fn add_customer(&self, customer: Value) {
        self.state.lock().unwrap().customers.push(customer);
    }

    fn handle(&self, call: &Call) -> ApiResult<Value> {
        let mut state = self.state.lock().unwrap();
        let body = call.body.clone().unwrap_or(Value::Null);

        match (call.method, call.path.as_str()) {
            (Method::Get, "customers/") => Ok(Value::Array(state.customers.clone())),
            (Method::Get, "bills/") => Ok(Value::Array(state.bills.clone())),
            (Method::Post, "customers/") => {
                state.next_id += 1;
                let mut customer = body;
                customer["id"] = json!(state.next_id);
                state.customers.push(customer.clone());
                Ok(customer)
            }
            (Method::Post, "bills/") => {
                state.next_id += 1;
                let customer_name = state
                    .customers
                    .iter()
                    .find(|c| c["id"] == body["customer"])
                    .map(|c| c["name"].clone())
                    .unwrap_or_else(|| json!(""));
                let mut bill = body;
                bill["id"] = json!(state.next_id);
                bill["customer_name"] = customer_name;
                bill["total_amount"] = json!("0.00");
                bill["items"] = json!([]);
                state.bills.push(bill.clone());
                Ok(bill)
            }
            (Method::Post, "bill-items/") => {
                state.next_id += 1;
                let total = body["quantity"].as_f64().unwrap_or(0.0)
                    * body["unit_price"].as_f64().unwrap_or(0.0);
                let mut item = body;
                item["id"] = json!(state.next_id);
                item["total_price"] = json!(format!("{:.2}", total));
                let bill_id = item["bill"].clone();
                state.items.push(item.clone());

                let bill_total: f64 = state
                    .items
                    .iter()
                    .filter(|i| i["bill"] == bill_id)
                    .filter_map(|i| i["total_price"].as_str()?.parse::<f64>().ok())
                    .fold(0.0, |total, price| total + price);
                if let Some(bill) = state.bills.iter_mut().find(|b| b["id"] == bill_id) {
                    bill["total_amount"] = json!(format!("{:.2}", bill_total));
                    if let Some(items) = bill["items"].as_array_mut() {
                        items.push(item.clone());
                    }
                }
                Ok(item)
            }
            (Method::Delete, path) if path.starts_with("bills/") => {
                let id: i64 = path
                    .trim_start_matches("bills/")
                    .trim_end_matches('/')
                    .parse()
                    .map_err(|_| not_found())?;
                let before = state.bills.len();
                state.bills.retain(|b| b["id"] != json!(id));
                if state.bills.len() == before {
                    return Err(not_found());
                }
                state.items.retain(|i| i["bill"] != json!(id));
                Ok(Value::Null)
            }
            _ => Err(not_found()),
        }
    }
}

fn not_found() -> ApiError {
    ApiError::ServerRejected {
        status: 404,
        detail: "Not found.".to_string(),
    }
}

impl ResourceClient for FakeServer {
    async fn send(&self, method: Method, path: &str, body: Option<Value>) -> ApiResult<Value> {
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }

        let call = Call {
            method,
            path: path.to_string(),
            body,
        };
        self.state.lock().unwrap().calls.push(call.clone());

        if let Some(status) = self.rules.iter().find_map(|rule| rule(&call)) {
            return Err(ApiError::ServerRejected {
                status,
                detail: "rejected by test".to_string(),
            });
        }
        if method == Method::Get {
            if let Some(body) = self.overrides.get(path) {
                return Ok(body.clone());
            }
        }
        let mut response = self.handle(&call)?;
        if method == Method::Post {
            if let Some(tamper) = self.tampers.get(path) {
                tamper(&mut response);
            }
        }
        Ok(response)
    }
}

pub fn customer_json(id: i64, name: &str) -> Value {
    json!({
        "id": id,
        "name": name,
        "email": format!("{}@example.com", name.to_lowercase()),
        "phone": "555-0100",
        "address": "1 Main St"
    })
}

pub fn bill_json(id: i64, customer: i64, total_amount: &str) -> Value {
    json!({
        "id": id,
        "customer": customer,
        "customer_name": format!("Customer {}", customer),
        "bill_number": format!("BILL-{}", id),
        "bill_date": "2026-01-01",
        "due_date": "2026-01-31",
        "total_amount": total_amount,
        "status": "PENDING",
        "items": []
    })
}
