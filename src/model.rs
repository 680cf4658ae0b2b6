// 📅 Ledger data model
//
// DateKey identifies one day. Each commodity has its own entry shape:
// - Milk stores the quantity only; its price is resolved whenever it is needed
// - Water snapshots the resolved price into the entry at write time
//
// The asymmetry is observable in historical totals and is kept on purpose.

use crate::price::{resolve, PriceOverrides};
use chrono::{Datelike, NaiveDate};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Currency label shown next to every cost
pub const CURRENCY_LABEL: &str = "Rs.";

// ============================================================================
// DATE KEY
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid date {0:?}, expected YYYY-MM-DD")]
pub struct InvalidDateKey(pub String);

/// Calendar day, serialized as `YYYY-MM-DD`
///
/// Parsing accepts unpadded months/days (`2024-7-1`); output is always
/// zero-padded so keys written by different callers collide correctly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DateKey(NaiveDate);

impl DateKey {
    pub fn new(date: NaiveDate) -> Self {
        DateKey(date)
    }

    pub fn from_ymd(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day).map(DateKey)
    }

    /// Parse calendar text; empty or malformed text means "no date"
    pub fn parse_opt(text: &str) -> Option<Self> {
        text.parse().ok()
    }

    pub fn date(&self) -> NaiveDate {
        self.0
    }

    pub fn year(&self) -> i32 {
        self.0.year()
    }

    pub fn month(&self) -> u32 {
        self.0.month()
    }

    pub fn day(&self) -> u32 {
        self.0.day()
    }

    pub fn in_month(&self, year: i32, month: u32) -> bool {
        self.year() == year && self.month() == month
    }
}

impl fmt::Display for DateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

impl FromStr for DateKey {
    type Err = InvalidDateKey;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
            .map(DateKey)
            .map_err(|_| InvalidDateKey(s.to_string()))
    }
}

impl TryFrom<String> for DateKey {
    type Error = InvalidDateKey;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<DateKey> for String {
    fn from(key: DateKey) -> Self {
        key.to_string()
    }
}

// ============================================================================
// COMMODITY
// ============================================================================

/// Storage keys of one commodity's namespace
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StorageKeys {
    /// Map DateKey → entry
    pub entries: &'static str,
    /// Map DateKey → explicit price
    pub overrides: &'static str,
    /// Rolling last-entered price
    pub last_price: &'static str,
}

impl StorageKeys {
    pub fn all(&self) -> [&'static str; 3] {
        [self.entries, self.overrides, self.last_price]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Commodity {
    Milk,
    Water,
}

impl Commodity {
    pub const ALL: [Commodity; 2] = [Commodity::Milk, Commodity::Water];

    pub fn name(&self) -> &'static str {
        match self {
            Commodity::Milk => "milk",
            Commodity::Water => "water",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Commodity::Milk => "Milk",
            Commodity::Water => "Water",
        }
    }

    /// Quantity unit used in listings
    pub fn unit_label(&self) -> &'static str {
        match self {
            Commodity::Milk => "Liters",
            Commodity::Water => "Cans",
        }
    }

    /// Seed for LastEnteredPrice when nothing was ever persisted
    pub fn default_price(&self) -> f64 {
        match self {
            Commodity::Milk => 140.0,
            Commodity::Water => 40.0,
        }
    }

    pub fn storage_keys(&self) -> StorageKeys {
        match self {
            Commodity::Milk => StorageKeys {
                entries: "milkData",
                overrides: "costPerDay",
                last_price: "lastEnteredCostMilk",
            },
            Commodity::Water => StorageKeys {
                entries: "waterData",
                overrides: "waterCostPerDay",
                last_price: "lastEnteredCost",
            },
        }
    }

    /// Prompt shown when an amount cannot be recorded
    pub fn amount_prompt(&self) -> String {
        format!("Please select a date and enter the {} amount", self.name())
    }
}

impl fmt::Display for Commodity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown commodity {0:?} (expected milk or water)")]
pub struct UnknownCommodity(pub String);

impl FromStr for Commodity {
    type Err = UnknownCommodity;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "milk" => Ok(Commodity::Milk),
            "water" => Ok(Commodity::Water),
            _ => Err(UnknownCommodity(s.to_string())),
        }
    }
}

// ============================================================================
// ENTRIES
// ============================================================================

/// Behavior that differs between the milk and water ledgers
pub trait LedgerEntry: Clone + PartialEq + fmt::Debug + Serialize + DeserializeOwned {
    const COMMODITY: Commodity;

    /// Skip the save when an upsert leaves the entry deep-equal
    const SKIP_UNCHANGED_SAVE: bool;

    /// Build the entry written by `record_amount`
    fn record(amount: f64, resolved_price: f64) -> Self;

    fn quantity(&self) -> f64;

    /// Unit price that applies to this entry when summarizing
    fn unit_price(&self, date: &DateKey, overrides: &PriceOverrides, last_entered_price: f64) -> f64;

    /// Repair a loaded entry so numeric fields are finite and non-negative.
    /// None drops the entry.
    fn coerce(self, fallback_price: f64) -> Option<Self>;
}

fn is_valid_number(value: f64) -> bool {
    value.is_finite() && value >= 0.0
}

/// Milk: quantity only, persisted as a bare number
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MilkEntry {
    pub amount_liters: f64,
}

impl LedgerEntry for MilkEntry {
    const COMMODITY: Commodity = Commodity::Milk;
    const SKIP_UNCHANGED_SAVE: bool = true;

    fn record(amount: f64, _resolved_price: f64) -> Self {
        MilkEntry {
            amount_liters: amount,
        }
    }

    fn quantity(&self) -> f64 {
        self.amount_liters
    }

    fn unit_price(&self, date: &DateKey, overrides: &PriceOverrides, last_entered_price: f64) -> f64 {
        resolve(date, overrides, last_entered_price)
    }

    fn coerce(self, _fallback_price: f64) -> Option<Self> {
        is_valid_number(self.amount_liters).then_some(self)
    }
}

/// Water: quantity plus the price captured when it was recorded
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WaterEntry {
    #[serde(rename = "amount", deserialize_with = "number_or_null")]
    pub amount_units: f64,

    #[serde(rename = "price", deserialize_with = "number_or_null")]
    pub unit_price: f64,
}

/// Stored `null` (a NaN written by earlier app versions) reads back as NaN,
/// so `coerce` can repair or drop it
fn number_or_null<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(f64::NAN))
}

impl LedgerEntry for WaterEntry {
    const COMMODITY: Commodity = Commodity::Water;
    const SKIP_UNCHANGED_SAVE: bool = false;

    fn record(amount: f64, resolved_price: f64) -> Self {
        WaterEntry {
            amount_units: amount,
            unit_price: resolved_price,
        }
    }

    fn quantity(&self) -> f64 {
        self.amount_units
    }

    fn unit_price(&self, _date: &DateKey, _overrides: &PriceOverrides, _last_entered_price: f64) -> f64 {
        self.unit_price
    }

    fn coerce(mut self, fallback_price: f64) -> Option<Self> {
        if !is_valid_number(self.amount_units) {
            return None;
        }
        if !is_valid_number(self.unit_price) {
            self.unit_price = fallback_price;
        }
        Some(self)
    }
}
