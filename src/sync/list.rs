use tracing::{debug, error, info};

use super::scope::ScopeToken;
use crate::api::{BillingApi, ResourceClient};
use crate::models::Resource;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    /// Nothing fetched yet.
    Empty,
    /// Holds the result of the last successful fetch.
    Loaded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The local collection now mirrors the server; carries its length.
    Replaced(usize),
    /// The fetch failed and the previous collection was kept.
    Failed,
    /// The view closed before the fetch finished.
    Discarded,
}

/// Local copy of a remote collection, refreshed only by full reloads.
#[derive(Debug)]
pub struct ListSync<T> {
    items: Vec<T>,
    state: SyncState,
    last_error: Option<String>,
}

impl<T> Default for ListSync<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            state: SyncState::Empty,
            last_error: None,
        }
    }
}

impl<T: Resource> ListSync<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn state(&self) -> SyncState {
        self.state
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Nothing to show yet and nothing went wrong.
    pub fn is_pending(&self) -> bool {
        self.state == SyncState::Empty && self.last_error.is_none()
    }

    /// Fetch the collection and replace the local copy with it.
    ///
    /// On failure the local copy is left untouched and the error is kept for
    /// display. If `token`'s scope closes first, nothing is changed.
    pub async fn load<C: ResourceClient>(
        &mut self,
        api: &BillingApi<C>,
        token: &mut ScopeToken,
    ) -> LoadOutcome {
        let collection = T::COLLECTION;
        let result = match token.run(api.list::<T>()).await {
            Some(result) if !token.is_cancelled() => result,
            _ => {
                debug!(collection, "view closed before load finished, discarding");
                return LoadOutcome::Discarded;
            }
        };

        match result {
            Ok(items) => {
                info!(collection, count = items.len(), "collection loaded");
                self.items = items;
                self.state = SyncState::Loaded;
                self.last_error = None;
                LoadOutcome::Replaced(self.items.len())
            }
            Err(err) => {
                error!(collection, error = %err, "failed to load collection");
                self.last_error = Some(err.to_string());
                LoadOutcome::Failed
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Bill, Customer};
    use crate::sync::ViewScope;
    use crate::test_utils::{bill_json, customer_json, FakeServer};
    use std::sync::Arc;
    use tokio::sync::Notify;

    #[tokio::test]
    async fn test_load_mirrors_server_sequence() {
        let api = BillingApi::new(FakeServer::new().with_customers(vec![
            customer_json(3, "Cy"),
            customer_json(1, "Ada"),
            customer_json(2, "Bo"),
        ]));
        let scope = ViewScope::new();
        let mut list = ListSync::<Customer>::new();
        assert_eq!(list.state(), SyncState::Empty);
        assert!(list.is_pending());

        let outcome = list.load(&api, &mut scope.token()).await;

        assert_eq!(outcome, LoadOutcome::Replaced(3));
        assert_eq!(list.state(), SyncState::Loaded);
        let ids: Vec<i64> = list.items().iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![3, 1, 2]);
    }

    #[tokio::test]
    async fn test_reload_with_unchanged_server_is_idempotent() {
        let api = BillingApi::new(
            FakeServer::new().with_bills(vec![bill_json(1, 1, "10.00"), bill_json(2, 1, "5")]),
        );
        let scope = ViewScope::new();
        let mut list = ListSync::<Bill>::new();

        list.load(&api, &mut scope.token()).await;
        let first = list.items().to_vec();
        list.load(&api, &mut scope.token()).await;

        assert_eq!(list.items(), first.as_slice());
    }

    #[tokio::test]
    async fn test_reload_replaces_instead_of_merging() {
        let api = BillingApi::new(FakeServer::new().with_customers(vec![customer_json(1, "Ada")]));
        let scope = ViewScope::new();
        let mut list = ListSync::<Customer>::new();
        list.load(&api, &mut scope.token()).await;

        api.client().add_customer(customer_json(2, "Bo"));
        list.load(&api, &mut scope.token()).await;

        assert_eq!(list.items().len(), 2);
    }

    #[tokio::test]
    async fn test_failed_load_keeps_previous_collection() {
        let api = BillingApi::new(
            FakeServer::new()
                .with_customers(vec![customer_json(1, "Ada")])
                .reject_when(|call| (call.path == "customers/" && call.body.is_none()).then_some(500)),
        );
        let scope = ViewScope::new();
        let mut list = ListSync::<Customer>::new();

        let outcome = list.load(&api, &mut scope.token()).await;

        assert_eq!(outcome, LoadOutcome::Failed);
        assert_eq!(list.state(), SyncState::Empty);
        assert!(list.items().is_empty());
        assert!(list.last_error().unwrap().contains("500"));
        assert!(!list.is_pending());
    }

    #[tokio::test]
    async fn test_malformed_body_leaves_loaded_list_intact() {
        let good = BillingApi::new(FakeServer::new().with_customers(vec![customer_json(1, "Ada")]));
        let bad = BillingApi::new(
            FakeServer::new().respond_with("customers/", serde_json::json!("oops")),
        );
        let scope = ViewScope::new();
        let mut list = ListSync::<Customer>::new();

        list.load(&good, &mut scope.token()).await;
        let outcome = list.load(&bad, &mut scope.token()).await;

        assert_eq!(outcome, LoadOutcome::Failed);
        assert_eq!(list.state(), SyncState::Loaded);
        assert_eq!(list.items().len(), 1);
        assert!(list.last_error().unwrap().starts_with("Malformed response"));
    }

    #[tokio::test]
    async fn test_load_after_view_closed_is_discarded() {
        let gate = Arc::new(Notify::new());
        let api = BillingApi::new(
            FakeServer::new()
                .with_customers(vec![customer_json(1, "Ada")])
                .gated(Arc::clone(&gate)),
        );
        let scope = ViewScope::new();
        let mut token = scope.token();
        let mut list = ListSync::<Customer>::new();

        let (outcome, ()) = tokio::join!(list.load(&api, &mut token), async {
            scope.close();
            gate.notify_one();
        });

        assert_eq!(outcome, LoadOutcome::Discarded);
        assert_eq!(list.state(), SyncState::Empty);
        assert!(list.items().is_empty());
    }
}
