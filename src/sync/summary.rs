use tracing::warn;

use super::list::{ListSync, LoadOutcome};
use super::scope::ViewScope;
use crate::api::{BillingApi, ResourceClient};
use crate::models::{format_currency, Bill, Customer};

/// Figures shown on the summary view.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SummaryStats {
    pub customer_count: usize,
    pub bill_count: usize,
    pub revenue: f64,
}

impl SummaryStats {
    /// Derive the figures from loaded collections. Amounts that do not parse
    /// are counted as zero.
    pub fn compute(customers: &[Customer], bills: &[Bill]) -> Self {
        let revenue = bills
            .iter()
            .map(|bill| {
                bill.total_amount.parse().unwrap_or_else(|| {
                    warn!(
                        bill_id = bill.id,
                        total_amount = bill.total_amount.as_str(),
                        "unparseable bill amount counted as zero"
                    );
                    0.0
                })
            })
            .fold(0.0, |total, amount| total + amount);

        Self {
            customer_count: customers.len(),
            bill_count: bills.len(),
            revenue,
        }
    }

    pub fn revenue_display(&self) -> String {
        format_currency(self.revenue)
    }
}

/// Customers and bills loaded side by side for the summary view.
#[derive(Debug, Default)]
pub struct Summary {
    pub customers: ListSync<Customer>,
    pub bills: ListSync<Bill>,
}

impl Summary {
    /// Load both collections concurrently. Each one succeeds or fails on its
    /// own.
    pub async fn load<C: ResourceClient>(
        &mut self,
        api: &BillingApi<C>,
        scope: &ViewScope,
    ) -> (LoadOutcome, LoadOutcome) {
        let mut customers_token = scope.token();
        let mut bills_token = scope.token();
        tokio::join!(
            self.customers.load(api, &mut customers_token),
            self.bills.load(api, &mut bills_token),
        )
    }

    pub fn stats(&self) -> SummaryStats {
        SummaryStats::compute(self.customers.items(), self.bills.items())
    }

    pub fn errors(&self) -> Vec<&str> {
        [self.customers.last_error(), self.bills.last_error()]
            .into_iter()
            .flatten()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::test_utils::{bill_json, customer_json, FakeServer};

    fn bills(amounts: &[&str]) -> Vec<Bill> {
        amounts
            .iter()
            .enumerate()
            .map(|(i, amount)| serde_json::from_value(bill_json(i as i64 + 1, 1, amount)).unwrap())
            .collect()
    }

    #[test]
    fn test_revenue_sums_decimal_strings() {
        let stats = SummaryStats::compute(&[], &bills(&["10.00", "20.5"]));
        assert_eq!(stats.revenue_display(), "$30.50");
        assert_eq!(stats.bill_count, 2);
    }

    #[test]
    fn test_empty_collections_give_zeroes() {
        let stats = SummaryStats::compute(&[], &[]);
        assert_eq!(stats.customer_count, 0);
        assert_eq!(stats.bill_count, 0);
        assert!(stats.revenue.is_sign_positive());
        assert_eq!(stats.revenue_display(), "$0.00");
    }

    #[test]
    fn test_malformed_amount_counts_as_zero() {
        let stats = SummaryStats::compute(&[], &bills(&["12.50", "twelve", ""]));
        assert_eq!(stats.revenue, 12.5);
        assert_eq!(stats.bill_count, 3);
        assert_eq!(stats.revenue_display(), "$12.50");
    }

    #[tokio::test]
    async fn test_summary_loads_both_collections() {
        let api = BillingApi::new(
            FakeServer::new()
                .with_customers(vec![customer_json(1, "Ada"), customer_json(2, "Bo")])
                .with_bills(vec![bill_json(1, 1, "10.00"), bill_json(2, 2, "20.5")]),
        );
        let scope = ViewScope::new();
        let mut summary = Summary::default();

        summary.load(&api, &scope).await;

        let stats = summary.stats();
        assert_eq!(stats.customer_count, 2);
        assert_eq!(stats.bill_count, 2);
        assert_eq!(stats.revenue_display(), "$30.50");
        assert!(summary.errors().is_empty());
    }

    #[tokio::test]
    async fn test_one_failed_collection_does_not_block_the_other() {
        let api = BillingApi::new(
            FakeServer::new()
                .with_customers(vec![customer_json(1, "Ada")])
                .with_bills(vec![bill_json(1, 1, "10.00")])
                .reject_when(|call| (call.path == "bills/").then_some(502)),
        );
        let scope = ViewScope::new();
        let mut summary = Summary::default();

        let (customers, bills) = summary.load(&api, &scope).await;

        assert_eq!(customers, LoadOutcome::Replaced(1));
        assert_eq!(bills, LoadOutcome::Failed);
        assert_eq!(summary.stats().bill_count, 0);
        assert_eq!(summary.errors().len(), 1);
    }
}
