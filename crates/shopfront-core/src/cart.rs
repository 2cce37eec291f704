//! # Cart Module
//!
//! The pre-checkout cart as a plain value: merge, clamp and recovery rules.
//!
//! ## Cart Operations
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Cart Operations                                 │
//! │                                                                         │
//! │  add_line(line) ─────────► same (id, color, size)? qty += line.qty      │
//! │                            otherwise push  (merged qty ≤ 999)           │
//! │                                                                         │
//! │  remove(key) ────────────► retain lines without key (absent = no-op)    │
//! │                                                                         │
//! │  adjust_quantity(key, d) ► qty = clamp(qty + d, 1, 999) (never removes) │
//! │                                                                         │
//! │  remove_ordered(lines) ──► qty -= ordered qty, line gone at 0           │
//! │                            (lines added after checkout began survive)  │
//! │                                                                         │
//! │  restore(blob) ──────────► invalid JSON     → empty cart, `corrupt`     │
//! │                            invalid entries  → dropped, listed           │
//! │                                                                         │
//! │  INVARIANT: at most one line per key, every quantity in 1..=999        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! This module has no I/O. Persistence and change notification live in the
//! application's `CartStore`, which also logs what [`Restored`] reports.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::Money;
use crate::order::shipping_fee;
use crate::types::{CartLine, CartLineKey};
use crate::validation::{validate_cart_line, validate_quantity};
use crate::MAX_ITEM_QUANTITY;

// =============================================================================
// Cart
// =============================================================================

/// An ordered list of cart lines, unique by [`CartLineKey`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    pub fn new() -> Self {
        Cart::default()
    }

    /// Builds a cart from lines, validating and merging each in order.
    pub fn from_lines(lines: impl IntoIterator<Item = CartLine>) -> Result<Self, ValidationError> {
        let mut cart = Cart::new();
        for line in lines {
            cart.add_line(line)?;
        }
        Ok(cart)
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn into_lines(self) -> Vec<CartLine> {
        self.lines
    }

    /// Adds a line, merging quantity into an existing line with the same key.
    ///
    /// The incoming line's name/price/image do not overwrite the stored line.
    /// A merge that would exceed [`MAX_ITEM_QUANTITY`] is rejected and leaves
    /// the cart unchanged.
    pub fn add_line(&mut self, line: CartLine) -> Result<(), ValidationError> {
        validate_cart_line(&line)?;

        let key = line.key();
        match self.lines.iter_mut().find(|l| l.has_key(&key)) {
            Some(existing) => {
                let merged = existing.quantity.saturating_add(line.quantity);
                validate_quantity(merged)?;
                existing.quantity = merged;
            }
            None => self.lines.push(line),
        }
        Ok(())
    }

    /// Removes the line with this key. Returns false if nothing matched.
    pub fn remove(&mut self, key: &CartLineKey) -> bool {
        let before = self.lines.len();
        self.lines.retain(|l| !l.has_key(key));
        self.lines.len() != before
    }

    /// Applies `delta` to a line's quantity, clamped to `1..=MAX_ITEM_QUANTITY`.
    ///
    /// Returns false if no line has this key.
    pub fn adjust_quantity(&mut self, key: &CartLineKey, delta: i64) -> bool {
        match self.lines.iter_mut().find(|l| l.has_key(key)) {
            Some(line) => {
                line.quantity = line
                    .quantity
                    .saturating_add(delta)
                    .clamp(1, MAX_ITEM_QUANTITY);
                true
            }
            None => false,
        }
    }

    /// Takes checked-out lines out of the cart.
    ///
    /// Each ordered line reduces the matching line by its quantity, removing
    /// it once nothing is left. Lines the order did not contain are kept.
    /// Returns true if anything changed.
    pub fn remove_ordered(&mut self, ordered: &[CartLine]) -> bool {
        let mut changed = false;
        for line in ordered {
            let key = line.key();
            if let Some(existing) = self.lines.iter_mut().find(|l| l.has_key(&key)) {
                existing.quantity = existing.quantity.saturating_sub(line.quantity);
                changed = true;
            }
        }
        self.lines.retain(|l| l.quantity > 0);
        changed
    }

    pub fn get(&self, key: &CartLineKey) -> Option<&CartLine> {
        self.lines.iter().find(|l| l.has_key(key))
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Number of distinct lines.
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    pub fn total_quantity(&self) -> i64 {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    /// Σ(unit price × quantity).
    pub fn subtotal(&self) -> Money {
        self.lines.iter().map(CartLine::line_total).sum()
    }

    /// Serialises to the persisted JSON array.
    pub fn to_blob(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.lines)
    }

    /// Rebuilds a cart from a persisted blob without ever failing.
    ///
    /// ## Recovery Rules
    /// - Not JSON, or not an array: empty cart, `corrupt` set
    /// - `null`: empty cart, nothing reported
    /// - An entry that does not decode or fails validation: dropped
    /// - Duplicate keys in the blob: merged
    pub fn restore(blob: &str) -> Restored {
        let value: serde_json::Value = match serde_json::from_str(blob) {
            Ok(value) => value,
            Err(e) => return Restored::corrupt(e.to_string()),
        };

        match value {
            serde_json::Value::Null => Restored::default(),
            serde_json::Value::Array(entries) => Cart::from_entries(entries),
            other => Restored::corrupt(format!("expected an array, found {}", json_kind(&other))),
        }
    }

    /// Builds a cart from loosely typed entries, e.g. the server cart.
    ///
    /// Entries that do not decode or fail validation are dropped and listed;
    /// the rest merge in order.
    pub fn from_entries(entries: Vec<serde_json::Value>) -> Restored {
        let mut restored = Restored::default();
        for (index, entry) in entries.into_iter().enumerate() {
            let added = serde_json::from_value::<CartLine>(entry)
                .map_err(|e| e.to_string())
                .and_then(|line| restored.cart.add_line(line).map_err(|e| e.to_string()));

            if let Err(reason) = added {
                restored.dropped.push(DroppedLine { index, reason });
            }
        }
        restored
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

// =============================================================================
// Restore Outcome
// =============================================================================

/// A persisted entry that was discarded during [`Cart::restore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DroppedLine {
    /// Position in the persisted array.
    pub index: usize,
    pub reason: String,
}

/// Result of [`Cart::restore`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Restored {
    pub cart: Cart,
    pub dropped: Vec<DroppedLine>,
    /// Parse failure of the whole blob; the cart was reset to empty.
    pub corrupt: Option<String>,
}

impl Restored {
    fn corrupt(reason: String) -> Self {
        Restored {
            cart: Cart::new(),
            dropped: Vec::new(),
            corrupt: Some(reason),
        }
    }

    /// True when the blob needs rewriting to match the recovered cart.
    pub fn needs_rewrite(&self) -> bool {
        self.corrupt.is_some() || !self.dropped.is_empty()
    }
}

// =============================================================================
// Totals
// =============================================================================

/// Cart summary shown next to the cart and at checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CartTotals {
    pub line_count: usize,
    pub total_quantity: i64,
    pub subtotal: Money,
    pub shipping_fee: Money,
    pub total: Money,
}

impl From<&Cart> for CartTotals {
    fn from(cart: &Cart) -> Self {
        let subtotal = cart.subtotal();
        // Nothing to ship yet.
        let shipping_fee = if cart.is_empty() {
            Money::zero()
        } else {
            shipping_fee(subtotal)
        };
        CartTotals {
            line_count: cart.line_count(),
            total_quantity: cart.total_quantity(),
            subtotal,
            shipping_fee,
            total: subtotal + shipping_fee,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
