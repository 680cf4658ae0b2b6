// 📊 Summary Calculator
//
// Totals are folded from the current ledger on every call, never cached.
// The per-entry price comes from LedgerEntry::unit_price, so milk picks up
// the current rolling default while water keeps its snapshot.

use crate::ledger::Ledger;
use crate::model::{Commodity, DateKey, LedgerEntry, CURRENCY_LABEL};
use serde::Serialize;

/// Aggregate quantity and spend
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Summary {
    pub total_quantity: f64,
    pub total_cost: f64,
}

/// One row of the record list
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyLine {
    /// 1-based position in calendar order
    pub index: usize,
    pub date: DateKey,
    pub quantity: f64,
    pub unit_price: f64,
    pub cost: f64,
}

impl DailyLine {
    /// "1. 2024-07-01: 2 Liters × Rs. 140 = Rs. 280"
    pub fn describe(&self, commodity: Commodity) -> String {
        format!(
            "{}. {}: {} {} × {} {} = {} {:.0}",
            self.index,
            self.date,
            self.quantity,
            commodity.unit_label(),
            CURRENCY_LABEL,
            self.unit_price,
            CURRENCY_LABEL,
            self.cost
        )
    }
}

/// Totals over every entry of the ledger
pub fn summarize<E: LedgerEntry>(ledger: &Ledger<E>) -> Summary {
    fold(ledger, |_| true)
}

/// Totals restricted to entries dated in `year`-`month`
pub fn summarize_month<E: LedgerEntry>(ledger: &Ledger<E>, year: i32, month: u32) -> Summary {
    fold(ledger, |date| date.in_month(year, month))
}

/// Per-day quantity, price and cost in calendar order
pub fn daily_breakdown<E: LedgerEntry>(ledger: &Ledger<E>) -> Vec<DailyLine> {
    ledger
        .entries()
        .iter()
        .enumerate()
        .map(|(i, (date, entry))| {
            let unit_price = entry.unit_price(date, ledger.overrides(), ledger.last_entered_price());
            DailyLine {
                index: i + 1,
                date: *date,
                quantity: entry.quantity(),
                unit_price,
                cost: entry.quantity() * unit_price,
            }
        })
        .collect()
}

fn fold<E: LedgerEntry>(ledger: &Ledger<E>, include: impl Fn(&DateKey) -> bool) -> Summary {
    ledger
        .entries()
        .iter()
        .filter(|(date, _)| include(date))
        .fold(Summary::default(), |acc, (date, entry)| {
            let price = entry.unit_price(date, ledger.overrides(), ledger.last_entered_price());
            Summary {
                total_quantity: acc.total_quantity + entry.quantity(),
                total_cost: acc.total_cost + entry.quantity() * price,
            }
        })
}
