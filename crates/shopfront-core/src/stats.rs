//! # Statistics Module
//!
//! Dashboard rollups computed from the invoice list on every request.
//!
//! ## What Counts as Revenue
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  invoice.status = Cancelled        → excluded from every amount         │
//! │  payment_status = Paid   / Unpaid  → revenue (final_amount)             │
//! │  payment_status = Refunded         → refunded_amount only               │
//! │  payment_status = unknown label    → counted, never summed              │
//! │                                                                         │
//! │  Status counts include every invoice, cancelled ones too.              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Months are calendar months in the store's local time (UTC+7), taken
//! from `created_at`.
//!
//! ## Period
//! Monthly, yearly and trailing-month revenue are always anchored on `now`.
//! The [`StatsPeriod`] scopes the remaining figures (revenue by method,
//! outstanding, refunded and status counts) to invoices created in the
//! current month, the current year, or all time.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, FixedOffset, Offset, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::Money;
use crate::types::{Invoice, InvoiceStatus, PaymentMethod, PaymentStatus};

/// Vietnam has no daylight saving; the offset is fixed.
pub const STORE_UTC_OFFSET_SECS: i32 = 7 * 3600;

/// Number of calendar months in the revenue chart, current month included.
pub const TRAILING_MONTHS: usize = 12;

/// The store's local offset.
pub fn store_offset() -> FixedOffset {
    FixedOffset::east_opt(STORE_UTC_OFFSET_SECS).unwrap_or_else(|| Utc.fix())
}

// =============================================================================
// Period
// =============================================================================

/// Which invoices the period-scoped figures cover.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum StatsPeriod {
    Month,
    Year,
    #[default]
    All,
}

impl StatsPeriod {
    pub fn as_str(&self) -> &'static str {
        match self {
            StatsPeriod::Month => "month",
            StatsPeriod::Year => "year",
            StatsPeriod::All => "all",
        }
    }

    /// Whether `created` (store time) falls in this period as of `now`.
    fn contains(&self, created: DateTime<FixedOffset>, now: DateTime<FixedOffset>) -> bool {
        match self {
            StatsPeriod::Month => created.year() == now.year() && created.month() == now.month(),
            StatsPeriod::Year => created.year() == now.year(),
            StatsPeriod::All => true,
        }
    }
}

impl fmt::Display for StatsPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StatsPeriod {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "month" => Ok(StatsPeriod::Month),
            "year" => Ok(StatsPeriod::Year),
            "all" => Ok(StatsPeriod::All),
            other => Err(ValidationError::InvalidFormat {
                field: "period".to_string(),
                reason: format!("expected month, year or all, got '{}'", other),
            }),
        }
    }
}

// =============================================================================
// Output Types
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct MonthBucket {
    pub year: i32,
    /// 1..=12
    pub month: u32,
    pub paid: Money,
    pub unpaid: Money,
}

impl MonthBucket {
    pub fn total(&self) -> Money {
        self.paid + self.unpaid
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct MethodRevenue {
    pub method: PaymentMethod,
    pub amount: Money,
    pub count: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct StatusCounts {
    pub total: usize,
    pub active: usize,
    pub cancelled: usize,
    pub paid: usize,
    pub unpaid: usize,
    pub refunded: usize,
    /// Invoices with an unrecognised status or payment label.
    pub unknown: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub period: StatsPeriod,
    pub monthly_revenue: Money,
    pub yearly_revenue: Money,
    /// Oldest month first, ending with the current month.
    pub trailing_months: Vec<MonthBucket>,
    pub revenue_by_method: Vec<MethodRevenue>,
    pub outstanding_amount: Money,
    pub outstanding_count: usize,
    pub refunded_amount: Money,
    pub refunded_count: usize,
    pub status_counts: StatusCounts,
}

// =============================================================================
// Computation
// =============================================================================

const METHODS: [PaymentMethod; 4] = [
    PaymentMethod::Cod,
    PaymentMethod::BankTransfer,
    PaymentMethod::Cash,
    PaymentMethod::VnPay,
];

/// Months since year 0, so consecutive months differ by one.
fn month_index(year: i32, month: u32) -> i64 {
    i64::from(year) * 12 + i64::from(month) - 1
}

/// Computes every dashboard figure relative to `now`, scoping the
/// period figures to `period`.
pub fn compute(
    invoices: &[Invoice],
    now: DateTime<FixedOffset>,
    period: StatsPeriod,
) -> DashboardStats {
    let offset = *now.offset();
    let current = month_index(now.year(), now.month());

    let mut trailing_months: Vec<MonthBucket> = (0..TRAILING_MONTHS as i64)
        .rev()
        .map(|back| {
            let index = current - back;
            MonthBucket {
                year: index.div_euclid(12) as i32,
                month: index.rem_euclid(12) as u32 + 1,
                paid: Money::zero(),
                unpaid: Money::zero(),
            }
        })
        .collect();
    let mut revenue_by_method: Vec<MethodRevenue> = METHODS
        .iter()
        .map(|&method| MethodRevenue {
            method,
            amount: Money::zero(),
            count: 0,
        })
        .collect();

    let mut stats = DashboardStats {
        period,
        monthly_revenue: Money::zero(),
        yearly_revenue: Money::zero(),
        trailing_months: Vec::new(),
        revenue_by_method: Vec::new(),
        outstanding_amount: Money::zero(),
        outstanding_count: 0,
        refunded_amount: Money::zero(),
        refunded_count: 0,
        status_counts: StatusCounts::default(),
    };

    for invoice in invoices {
        let created = invoice.created_at.with_timezone(&offset);
        let in_period = period.contains(created, now);

        if in_period {
            count_statuses(&mut stats.status_counts, invoice);
        }
        if invoice.status == InvoiceStatus::Cancelled {
            continue;
        }

        let amount = invoice.financials.final_amount;
        let paid = match invoice.payment_status {
            PaymentStatus::Paid => true,
            PaymentStatus::Unpaid => {
                if in_period {
                    stats.outstanding_amount += amount;
                    stats.outstanding_count += 1;
                }
                false
            }
            PaymentStatus::Refunded => {
                if in_period {
                    stats.refunded_amount += amount;
                    stats.refunded_count += 1;
                }
                continue;
            }
            PaymentStatus::Unknown(_) => continue,
        };

        let index = month_index(created.year(), created.month());
        if index == current {
            stats.monthly_revenue += amount;
        }
        if created.year() == now.year() {
            stats.yearly_revenue += amount;
        }
        if let Some(bucket) = trailing_months
            .iter_mut()
            .find(|b| month_index(b.year, b.month) == index)
        {
            if paid {
                bucket.paid += amount;
            } else {
                bucket.unpaid += amount;
            }
        }
        if !in_period {
            continue;
        }
        if let Some(entry) = revenue_by_method
            .iter_mut()
            .find(|m| m.method == invoice.payment_method)
        {
            entry.amount += amount;
            entry.count += 1;
        }
    }

    stats.trailing_months = trailing_months;
    stats.revenue_by_method = revenue_by_method;
    stats
}

fn count_statuses(counts: &mut StatusCounts, invoice: &Invoice) {
    counts.total += 1;
    let mut unknown = false;
    match invoice.status {
        InvoiceStatus::Active => counts.active += 1,
        InvoiceStatus::Cancelled => counts.cancelled += 1,
        InvoiceStatus::Unknown(_) => unknown = true,
    }
    match invoice.payment_status {
        PaymentStatus::Paid => counts.paid += 1,
        PaymentStatus::Unpaid => counts.unpaid += 1,
        PaymentStatus::Refunded => counts.refunded += 1,
        PaymentStatus::Unknown(_) => unknown = true,
    }
    if unknown {
        counts.unknown += 1;
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
