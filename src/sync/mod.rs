//! Keeping view state in step with the server.
//!
//! Every view owns its collections as [`ListSync`] values that are fetched on
//! mount and replaced wholesale on each reload. Creates go through
//! [`create_customer`] / [`create_bill`] and are followed by a reload. All
//! loads are tied to the view's [`ViewScope`].

mod create;
mod list;
mod scope;
mod summary;

pub use create::{create_bill, create_customer};
pub use list::{ListSync, LoadOutcome, SyncState};
pub use scope::{ScopeToken, ViewScope};
pub use summary::{Summary, SummaryStats};
