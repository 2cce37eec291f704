//! # Invoice Manager
//!
//! Staff-side invoice lifecycle on top of the invoice rules in
//! `shopfront_core::invoice`.
//!
//! ## Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  derive_from_order ──┐                                                 │
//! │  (approved order)    │        update (recompute financials,            │
//! │                      ▼        append "updated" log)                    │
//! │  create_manual ──► ┌────────┐ ◄───────┐                                 │
//! │                    │ Active │ ────────┘                                 │
//! │                    └───┬────┘                                           │
//! │                        │ cancel(reason)                                 │
//! │                        ▼                                                │
//! │                    ┌───────────┐  update / cancel ──► CONFLICT,        │
//! │                    │ Cancelled │  nothing appended, nothing sent       │
//! │                    └───────────┘                                        │
//! │                                                                         │
//! │  export_snapshot: read-only, any status                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every mutation first fetches the stored invoice and applies the rule
//! locally, so a state conflict is reported without writing anything.

use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use shopfront_client::{InvoiceBackend, InvoiceQuery, Page};
use shopfront_core::invoice;
use shopfront_core::{
    Actor, CustomerInfo, Invoice, InvoicePatch, InvoiceProduct, Order, PaymentMethod,
    PaymentStatus,
};

use crate::error::{ApiError, ApiResult};
use crate::services::export::{self, ExportFormat};

pub struct InvoiceManager {
    backend: Arc<dyn InvoiceBackend>,
}

impl InvoiceManager {
    pub fn new(backend: Arc<dyn InvoiceBackend>) -> Self {
        InvoiceManager { backend }
    }

    // =========================================================================
    // Creation
    // =========================================================================

    /// Creates the automatic invoice for an order.
    pub async fn derive_from_order(&self, order: &Order, actor: &Actor) -> ApiResult<Invoice> {
        let new_invoice = invoice::derive_from_order(order, actor, Utc::now())?;
        let created = self.backend.create_invoice(&new_invoice).await?;
        info!(
            invoice_id = %created.id,
            order_id = %order.id,
            amount = created.financials.final_amount.dong(),
            "Invoice derived from order"
        );
        Ok(created)
    }

    /// Creates a staff-entered invoice with no order behind it.
    pub async fn create_manual(
        &self,
        customer: CustomerInfo,
        products: Vec<InvoiceProduct>,
        payment_method: PaymentMethod,
        payment_status: PaymentStatus,
        actor: &Actor,
    ) -> ApiResult<Invoice> {
        let new_invoice = invoice::new_manual(
            customer,
            products,
            payment_method,
            payment_status,
            actor,
            Utc::now(),
        )?;
        let created = self.backend.create_invoice(&new_invoice).await?;
        info!(
            invoice_id = %created.id,
            amount = created.financials.final_amount.dong(),
            "Manual invoice created"
        );
        Ok(created)
    }

    // =========================================================================
    // Mutation
    // =========================================================================

    /// Applies staff edits to an active invoice.
    pub async fn update(
        &self,
        invoice_id: &str,
        patch: InvoicePatch,
        actor: &Actor,
    ) -> ApiResult<Invoice> {
        if patch.is_empty() {
            return Err(ApiError::validation("Nothing to update"));
        }

        let mut current = self.backend.invoice(invoice_id).await?;
        invoice::apply_patch(&mut current, patch, actor, Utc::now())?;

        let saved = self.backend.update_invoice(&current).await?;
        info!(%invoice_id, by = actor.display_name(), "Invoice updated");
        Ok(saved)
    }

    /// Cancels an active invoice with a mandatory reason.
    ///
    /// A second cancel fails with `CONFLICT` before any request is sent.
    pub async fn cancel(&self, invoice_id: &str, reason: &str, actor: &Actor) -> ApiResult<Invoice> {
        let mut current = self.backend.invoice(invoice_id).await?;
        invoice::cancel(&mut current, reason, actor, Utc::now())?;

        let saved = self
            .backend
            .cancel_invoice(invoice_id, reason.trim(), actor.display_name())
            .await?;
        info!(%invoice_id, by = actor.display_name(), "Invoice cancelled");
        Ok(saved)
    }

    // =========================================================================
    // Reads
    // =========================================================================

    pub async fn invoice(&self, invoice_id: &str) -> ApiResult<Invoice> {
        Ok(self.backend.invoice(invoice_id).await?)
    }

    pub async fn invoices(&self, query: &InvoiceQuery) -> ApiResult<Page<Invoice>> {
        Ok(self.backend.invoices(query).await?)
    }

    /// Renders the invoice as stored. Never mutates it.
    pub fn export_snapshot(&self, invoice: &Invoice, format: ExportFormat) -> ApiResult<Vec<u8>> {
        Ok(export::render(invoice, format)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::testing::{customer_info, fixed_now, invoice_product, FakeBackend};
    use shopfront_client::ports::MockInvoiceBackend;
    use shopfront_client::ClientError;
    use shopfront_core::{
        CreatedType, InvoiceStatus, LogAction, Money, OrderLine, OrderStatus,
    };

    fn staff() -> Actor {
        Actor::staff("Kế Toán")
    }

    fn manager(backend: &Arc<FakeBackend>) -> InvoiceManager {
        InvoiceManager::new(backend.clone())
    }

    fn approved_order() -> Order {
        Order {
            id: "ORD-7".to_string(),
            customer_id: "C1".to_string(),
            placed_at: fixed_now(),
            status: OrderStatus::Approved,
            recipient_name: "Trần Thị B".to_string(),
            phone: "0912345678".to_string(),
            delivery_address: "12 Lê Lợi, Phường Bến Nghé, Quận 1, TP. Hồ Chí Minh".to_string(),
            note: None,
            payment_method: PaymentMethod::Cod,
            shipping_fee: Money::zero(),
            total_amount: Money::from_dong(250_000),
            items: vec![OrderLine {
                product_id: "P1".to_string(),
                product_name: "Áo sơ mi".to_string(),
                image: "p1.jpg".to_string(),
                color: "Trắng".to_string(),
                size: "L".to_string(),
                unit_price: Money::from_dong(125_000),
                quantity: 2,
            }],
        }
    }

    async fn manual_invoice(manager: &InvoiceManager) -> Invoice {
        manager
            .create_manual(
                customer_info(),
                vec![invoice_product("P1", 100_000, 2, 10_000, 5_000)],
                PaymentMethod::Cash,
                PaymentStatus::Unpaid,
                &staff(),
            )
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_derive_from_order() {
        let backend = Arc::new(FakeBackend::new());
        let created = manager(&backend)
            .derive_from_order(&approved_order(), &staff())
            .await
            .unwrap();

        assert_eq!(created.order_id.as_deref(), Some("ORD-7"));
        assert_eq!(created.created_type, CreatedType::Auto);
        assert_eq!(created.payment_status, PaymentStatus::Unpaid);
        assert_eq!(created.status, InvoiceStatus::Active);
        assert_eq!(created.payment_method, PaymentMethod::Cod);
        assert_eq!(created.financials.final_amount, Money::from_dong(250_000));
        assert_eq!(created.logs.len(), 1);
        assert_eq!(created.logs[0].action, LogAction::Created);
        assert_eq!(created.logs[0].performed_by, "Kế Toán");
    }

    #[tokio::test]
    async fn test_create_manual_validates_before_sending() {
        let mut backend = MockInvoiceBackend::new();
        backend.expect_create_invoice().never();
        let manager = InvoiceManager::new(Arc::new(backend));

        let mut customer = customer_info();
        customer.phone = String::new();
        let err = manager
            .create_manual(
                customer,
                vec![invoice_product("P1", 100_000, 1, 0, 0)],
                PaymentMethod::Cash,
                PaymentStatus::Paid,
                &staff(),
            )
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);

        let err = manager
            .create_manual(
                customer_info(),
                vec![invoice_product("P1", 0, 1, 0, 0)],
                PaymentMethod::Cash,
                PaymentStatus::Paid,
                &staff(),
            )
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
    }

    #[tokio::test]
    async fn test_update_recomputes_financials_and_logs() {
        let backend = Arc::new(FakeBackend::new());
        let manager = manager(&backend);
        let created = manual_invoice(&manager).await;

        let patch = InvoicePatch {
            products: Some(vec![
                invoice_product("P1", 100_000, 3, 10_000, 5_000),
                invoice_product("P2", 50_000, 1, 0, 0),
            ]),
            payment_status: Some(PaymentStatus::Paid),
            ..Default::default()
        };
        let updated = manager.update(&created.id, patch, &staff()).await.unwrap();

        assert_eq!(updated.financials.subtotal, Money::from_dong(350_000));
        assert_eq!(updated.financials.total_tax, Money::from_dong(30_000));
        assert_eq!(updated.financials.total_discount, Money::from_dong(15_000));
        assert_eq!(updated.financials.final_amount, Money::from_dong(365_000));
        assert!(updated.financials.is_balanced());
        assert_eq!(updated.payment_status, PaymentStatus::Paid);
        assert_eq!(updated.logs.last().unwrap().action, LogAction::Updated);

        // Recomputing stored products gives the stored figures.
        let stored = backend.stored_invoice(&created.id).await.unwrap();
        assert_eq!(
            shopfront_core::Financials::compute(&stored.products),
            stored.financials
        );
    }

    #[tokio::test]
    async fn test_empty_patch_rejected() {
        let backend = Arc::new(FakeBackend::new());
        let manager = manager(&backend);
        let created = manual_invoice(&manager).await;

        let err = manager
            .update(&created.id, InvoicePatch::default(), &staff())
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
    }

    #[tokio::test]
    async fn test_cancel_twice_conflicts_without_new_log() {
        let backend = Arc::new(FakeBackend::new());
        let manager = manager(&backend);
        let created = manual_invoice(&manager).await;

        let cancelled = manager
            .cancel(&created.id, "Khách đổi ý", &staff())
            .await
            .unwrap();
        assert_eq!(cancelled.status, InvoiceStatus::Cancelled);
        assert_eq!(cancelled.logs.len(), 2);
        assert_eq!(cancelled.logs[1].note, "Khách đổi ý");

        let err = manager
            .cancel(&created.id, "Hủy lần nữa", &staff())
            .await
            .unwrap_err();
        assert!(err.is_conflict());

        let stored = backend.stored_invoice(&created.id).await.unwrap();
        assert_eq!(stored.logs.len(), 2);
        assert_eq!(backend.call_count("cancelInvoice").await, 1);
    }

    #[tokio::test]
    async fn test_cancelled_invoice_is_frozen() {
        let backend = Arc::new(FakeBackend::new());
        let manager = manager(&backend);
        let created = manual_invoice(&manager).await;
        manager.cancel(&created.id, "Sai thông tin", &staff()).await.unwrap();
        let frozen = backend.stored_invoice(&created.id).await.unwrap();

        let patch = InvoicePatch {
            payment_status: Some(PaymentStatus::Paid),
            ..Default::default()
        };
        let err = manager.update(&created.id, patch, &staff()).await.unwrap_err();

        assert!(err.is_conflict());
        assert_eq!(backend.stored_invoice(&created.id).await.unwrap(), frozen);
        assert_eq!(backend.call_count("updateInvoice").await, 0);
    }

    #[tokio::test]
    async fn test_cancel_requires_reason_and_staff() {
        let backend = Arc::new(FakeBackend::new());
        let manager = manager(&backend);
        let created = manual_invoice(&manager).await;

        let err = manager.cancel(&created.id, "  ", &staff()).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);

        let err = manager
            .cancel(&created.id, "Lý do", &Actor::customer("C1"))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::Forbidden);
        assert_eq!(backend.call_count("cancelInvoice").await, 0);
    }

    #[tokio::test]
    async fn test_missing_invoice_is_not_found() {
        let mut backend = MockInvoiceBackend::new();
        backend.expect_invoice().returning(|_| {
            Err(ClientError::Backend {
                endpoint: "/invoices/INV-404".to_string(),
                status: 404,
                message: None,
            })
        });
        let manager = InvoiceManager::new(Arc::new(backend));

        let err = manager.invoice("INV-404").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn test_export_does_not_mutate() {
        let backend = Arc::new(FakeBackend::new());
        let manager = manager(&backend);
        let created = manual_invoice(&manager).await;
        let before = created.clone();

        let bytes = manager
            .export_snapshot(&created, ExportFormat::Spreadsheet)
            .unwrap();

        assert!(!bytes.is_empty());
        assert_eq!(created, before);
    }
}
