//! # Statistics Aggregator
//!
//! Dashboard figures, recomputed on every request from the invoice list.
//! Nothing is cached.
//!
//! ```text
//! GET /invoices?page=1 ──┐
//! GET /invoices?page=2 ──┼──► Vec<Invoice> ──► stats::compute(now in UTC+7, period)
//! ...                  ──┘
//! ```

use std::sync::Arc;

use chrono::{DateTime, FixedOffset, Utc};
use tracing::debug;

use shopfront_client::{InvoiceBackend, InvoiceQuery};
use shopfront_core::stats::{self, store_offset, DashboardStats, StatsPeriod};
use shopfront_core::Invoice;

use crate::error::ApiResult;

/// Page size used when walking the invoice list.
const FETCH_PAGE_SIZE: u32 = 100;

/// Upper bound on pages walked, in case the backend's page count never ends.
const MAX_PAGES: u32 = 1_000;

pub struct StatsAggregator {
    backend: Arc<dyn InvoiceBackend>,
}

impl StatsAggregator {
    pub fn new(backend: Arc<dyn InvoiceBackend>) -> Self {
        StatsAggregator { backend }
    }

    /// Dashboard figures as of now, in store time.
    pub async fn dashboard(&self, period: StatsPeriod) -> ApiResult<DashboardStats> {
        self.dashboard_at(Utc::now().with_timezone(&store_offset()), period)
            .await
    }

    /// Dashboard figures relative to `now`.
    pub async fn dashboard_at(
        &self,
        now: DateTime<FixedOffset>,
        period: StatsPeriod,
    ) -> ApiResult<DashboardStats> {
        let invoices = self.all_invoices().await?;
        debug!(count = invoices.len(), %period, "Computing dashboard statistics");
        Ok(stats::compute(&invoices, now, period))
    }

    async fn all_invoices(&self) -> ApiResult<Vec<Invoice>> {
        let mut query = InvoiceQuery {
            limit: FETCH_PAGE_SIZE,
            ..Default::default()
        };
        let mut invoices = Vec::new();

        loop {
            let page = self.backend.invoices(&query).await?;
            let has_next = page.has_next() && !page.data.is_empty();
            invoices.extend(page.data);

            if !has_next || query.page >= MAX_PAGES {
                break;
            }
            query.page += 1;
        }
        Ok(invoices)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{fixed_now, invoice_product, FakeBackend};
    use shopfront_client::ports::MockInvoiceBackend;
    use shopfront_client::{ClientError, Page};
    use shopfront_core::{
        CreatedType, CustomerInfo, Financials, InvoiceStatus, Money, PaymentMethod, PaymentStatus,
    };

    fn invoice(id: &str, amount: i64, payment: PaymentStatus, status: InvoiceStatus) -> Invoice {
        let products = vec![invoice_product("P1", amount, 1, 0, 0)];
        Invoice {
            id: id.to_string(),
            order_id: None,
            customer: CustomerInfo {
                name: "Khách".to_string(),
                phone: "0900000000".to_string(),
                address: "Hà Nội".to_string(),
                email: None,
            },
            financials: Financials::compute(&products),
            products,
            payment_method: PaymentMethod::Cod,
            payment_status: payment,
            status,
            created_type: CreatedType::Manual,
            logs: Vec::new(),
            created_at: fixed_now(),
            updated_at: fixed_now(),
        }
    }

    #[tokio::test]
    async fn test_dashboard_walks_every_page() {
        let backend = Arc::new(FakeBackend::new());
        for i in 0..150 {
            backend
                .insert_invoice(invoice(
                    &format!("INV-{}", i),
                    10_000,
                    PaymentStatus::Paid,
                    InvoiceStatus::Active,
                ))
                .await;
        }
        backend
            .insert_invoice(invoice(
                "INV-X",
                999_000,
                PaymentStatus::Paid,
                InvoiceStatus::Cancelled,
            ))
            .await;

        let stats = StatsAggregator::new(backend.clone())
            .dashboard_at(fixed_now().with_timezone(&store_offset()), StatsPeriod::All)
            .await
            .unwrap();

        assert_eq!(backend.call_count("invoices").await, 2);
        assert_eq!(stats.status_counts.total, 151);
        assert_eq!(stats.status_counts.cancelled, 1);
        assert_eq!(stats.monthly_revenue, Money::from_dong(1_500_000));
        assert_eq!(stats.yearly_revenue, Money::from_dong(1_500_000));
    }

    #[tokio::test]
    async fn test_outstanding_and_refunded() {
        let backend = Arc::new(FakeBackend::new());
        backend
            .insert_invoice(invoice("A", 200_000, PaymentStatus::Unpaid, InvoiceStatus::Active))
            .await;
        backend
            .insert_invoice(invoice("B", 50_000, PaymentStatus::Refunded, InvoiceStatus::Active))
            .await;

        let aggregator = StatsAggregator::new(backend);
        let now = fixed_now().with_timezone(&store_offset());
        let stats = aggregator.dashboard_at(now, StatsPeriod::All).await.unwrap();

        assert_eq!(stats.outstanding_amount, Money::from_dong(200_000));
        assert_eq!(stats.outstanding_count, 1);
        assert_eq!(stats.refunded_amount, Money::from_dong(50_000));
        assert_eq!(stats.refunded_count, 1);

        // A year later the same invoices fall outside the yearly period.
        let later = now + chrono::Duration::days(400);
        let stats = aggregator.dashboard_at(later, StatsPeriod::Year).await.unwrap();
        assert_eq!(stats.outstanding_count, 0);
        assert_eq!(stats.refunded_count, 0);
        let stats = aggregator.dashboard_at(later, StatsPeriod::All).await.unwrap();
        assert_eq!(stats.outstanding_count, 1);
    }

    #[tokio::test]
    async fn test_backend_failure_is_reported() {
        let mut backend = MockInvoiceBackend::new();
        backend.expect_invoices().times(1).returning(|_| {
            Err(ClientError::Timeout {
                endpoint: "/invoices".to_string(),
            })
        });

        assert!(StatsAggregator::new(Arc::new(backend))
            .dashboard(StatsPeriod::All)
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_endless_page_count_stops_on_empty_page() {
        let mut backend = MockInvoiceBackend::new();
        backend.expect_invoices().times(1).returning(|query| {
            Ok(Page {
                data: Vec::new(),
                page: query.page,
                total_pages: u32::MAX,
                total: 0,
            })
        });

        let stats = StatsAggregator::new(Arc::new(backend))
            .dashboard(StatsPeriod::Month)
            .await
            .unwrap();
        assert_eq!(stats.status_counts.total, 0);
    }
}
