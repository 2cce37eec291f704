//! # Services
//!
//! One service per component; each depends only on the ports it needs.
//!
//! | Service                      | Ports                              |
//! |------------------------------|------------------------------------|
//! | [`OrderLifecycleController`] | OrderBackend, PaymentGateway, cart |
//! | [`InvoiceManager`]           | InvoiceBackend                     |
//! | [`StatsAggregator`]          | InvoiceBackend                     |
//!
//! The cart itself lives in [`crate::state::CartStore`].

pub mod export;
pub mod invoice;
pub mod order;
pub mod stats;

pub use export::ExportFormat;
pub use invoice::InvoiceManager;
pub use order::{OrderLifecycleController, Placement};
pub use stats::StatsAggregator;
