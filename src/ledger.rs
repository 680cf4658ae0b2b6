// 📒 Ledger - in-memory state of one commodity
//
// Owns the DateKey → entry map, the override map and LastEnteredPrice.
// Pure state: no I/O here, the engine decides when to persist.

use crate::model::{DateKey, LedgerEntry};
use crate::price::{resolve, PriceOverrides};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq)]
pub struct Ledger<E> {
    entries: BTreeMap<DateKey, E>,
    overrides: PriceOverrides,
    last_entered_price: f64,
}

impl<E: LedgerEntry> Ledger<E> {
    /// Empty ledger seeded with the commodity default price
    pub fn new() -> Self {
        Self::with_state(BTreeMap::new(), PriceOverrides::new(), E::COMMODITY.default_price())
    }

    pub fn with_state(
        entries: BTreeMap<DateKey, E>,
        overrides: PriceOverrides,
        last_entered_price: f64,
    ) -> Self {
        Ledger {
            entries,
            overrides,
            last_entered_price,
        }
    }

    pub fn entries(&self) -> &BTreeMap<DateKey, E> {
        &self.entries
    }

    pub fn overrides(&self) -> &PriceOverrides {
        &self.overrides
    }

    pub fn last_entered_price(&self) -> f64 {
        self.last_entered_price
    }

    pub fn entry(&self, date: &DateKey) -> Option<&E> {
        self.entries.get(date)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Effective unit price for `date` right now
    pub fn resolve_price(&self, date: &DateKey) -> f64 {
        resolve(date, &self.overrides, self.last_entered_price)
    }

    /// Insert or replace the entry for `date`; returns false when the new
    /// entry is deep-equal to the one already there
    pub fn upsert(&mut self, date: DateKey, entry: E) -> bool {
        if self.entries.get(&date) == Some(&entry) {
            return false;
        }
        self.entries.insert(date, entry);
        true
    }

    /// Record an explicit price for `date`; it also becomes the rolling default
    pub fn set_override(&mut self, date: DateKey, price: f64) {
        self.overrides.insert(date, price);
        self.last_entered_price = price;
    }

    /// Days that carry an entry, in calendar order
    pub fn marked_dates(&self) -> Vec<DateKey> {
        self.entries.keys().copied().collect()
    }
}

impl<E: LedgerEntry> Default for Ledger<E> {
    fn default() -> Self {
        Self::new()
    }
}
