// MilkTrack - Core Library
// Daily milk/water consumption ledgers with per-day prices and monthly totals.
// Exposes all modules for use in CLI, API server, and tests

pub mod config;
pub mod engine;
pub mod error;
pub mod ledger;
pub mod model;
pub mod price;
pub mod repository;
pub mod store;
pub mod summary;

// Re-export commonly used types
pub use config::{init_logging, Config};
pub use engine::{
    CommodityLedger, EngineState, LedgerEngine, Ledgers, MilkEngine, PriceInput, RecordOutcome,
    WaterEngine,
};
pub use error::{InputError, LedgerError, StoreError};
pub use ledger::Ledger;
pub use model::{
    Commodity, DateKey, InvalidDateKey, LedgerEntry, MilkEntry, StorageKeys, UnknownCommodity,
    WaterEntry, CURRENCY_LABEL,
};
pub use price::{format_price, parse_decimal, resolve, PriceOverrides};
pub use repository::LedgerRepository;
pub use store::{MemoryStore, PersistentStore, SqliteStore};
pub use summary::{daily_breakdown, summarize, summarize_month, DailyLine, Summary};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
