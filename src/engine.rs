// ⚙️ Ledger Engine - lifecycle + user operations for one commodity
//
// Lifecycle: Uninitialized → Hydrating → Ready (terminal).
// Every successful mutation is followed by a save; save failures are logged
// and the in-memory ledger stays authoritative until the next save succeeds.

use crate::error::{InputError, LedgerResult};
use crate::ledger::Ledger;
use crate::model::{Commodity, DateKey, LedgerEntry, MilkEntry, WaterEntry};
use crate::price::{format_price, parse_decimal, PriceOverrides};
use crate::repository::LedgerRepository;
use crate::store::PersistentStore;
use crate::summary::{daily_breakdown, summarize, summarize_month, DailyLine, Summary};
use std::collections::BTreeMap;
use tracing::{debug, error, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    Uninitialized,
    Hydrating,
    Ready,
}

/// Result of a committed amount
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordOutcome {
    /// Entry inserted or changed
    Recorded,
    /// Entry was already deep-equal to the new one
    Unchanged,
}

/// Result of a price keystroke
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PriceInput {
    /// Parsed and stored as the override for the date
    Committed(f64),
    /// Only the display buffer changed
    Buffered,
}

pub struct LedgerEngine<E, S> {
    repository: LedgerRepository<E, S>,
    ledger: Ledger<E>,
    state: EngineState,
    selected_date: Option<DateKey>,
    amount_input: String,
    cost_input: String,
    prompt: Option<String>,
    failed_saves: usize,
}

pub type MilkEngine<S> = LedgerEngine<MilkEntry, S>;
pub type WaterEngine<S> = LedgerEngine<WaterEntry, S>;

impl<E: LedgerEntry, S: PersistentStore> LedgerEngine<E, S> {
    /// Engine over `store`, not yet hydrated
    pub fn new(store: S) -> Self {
        Self::with_repository(LedgerRepository::new(store))
    }

    pub fn with_repository(repository: LedgerRepository<E, S>) -> Self {
        LedgerEngine {
            repository,
            ledger: Ledger::new(),
            state: EngineState::Uninitialized,
            selected_date: None,
            amount_input: String::new(),
            cost_input: String::new(),
            prompt: None,
            failed_saves: 0,
        }
    }

    /// Build and hydrate in one step
    pub fn open(store: S) -> Self {
        let mut engine = Self::new(store);
        engine.hydrate();
        engine
    }

    pub fn commodity(&self) -> Commodity {
        E::COMMODITY
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn is_ready(&self) -> bool {
        self.state == EngineState::Ready
    }

    // ========================================================================
    // LIFECYCLE
    // ========================================================================

    /// Load persisted state once. Later calls are ignored.
    pub fn hydrate(&mut self) {
        if self.state != EngineState::Uninitialized {
            debug!(commodity = %E::COMMODITY, state = ?self.state, "hydrate ignored");
            return;
        }

        self.state = EngineState::Hydrating;
        self.ledger = self.repository.load();
        if let Some(date) = self.selected_date {
            self.cost_input = self.display_price(&date);
        }
        self.state = EngineState::Ready;

        info!(
            commodity = %E::COMMODITY,
            entries = self.ledger.entries().len(),
            "ledger ready"
        );
    }

    // ========================================================================
    // OPERATIONS
    // ========================================================================

    /// Make `date` the active day; the cost input shows its effective price
    pub fn select_date(&mut self, date: DateKey) {
        self.selected_date = Some(date);
        self.cost_input = self.display_price(&date);
    }

    pub fn selected_date(&self) -> Option<DateKey> {
        self.selected_date
    }

    /// Replace the amount typing buffer
    pub fn set_amount_input(&mut self, text: &str) {
        self.amount_input = text.to_string();
    }

    pub fn amount_input(&self) -> &str {
        &self.amount_input
    }

    /// Commit an amount for `date`.
    ///
    /// A missing date or non-numeric text aborts with the commodity prompt
    /// and leaves the ledger untouched.
    pub fn record_amount(
        &mut self,
        date: Option<DateKey>,
        raw_amount: &str,
    ) -> Result<RecordOutcome, InputError> {
        if !self.is_ready() {
            debug!(commodity = %E::COMMODITY, "record_amount before ready");
            return Err(InputError::NotReady);
        }

        let date = date.ok_or_else(|| self.reject(InputError::MissingDate))?;
        let amount = parse_decimal(raw_amount).map_err(|err| self.reject(err))?;

        let entry = E::record(amount, self.ledger.resolve_price(&date));
        let changed = self.ledger.upsert(date, entry);

        self.amount_input.clear();
        self.prompt = None;

        if changed || !E::SKIP_UNCHANGED_SAVE {
            self.persist();
        }

        Ok(if changed {
            RecordOutcome::Recorded
        } else {
            RecordOutcome::Unchanged
        })
    }

    /// Commit the amount buffer for the selected date
    pub fn submit_amount(&mut self) -> Result<RecordOutcome, InputError> {
        let raw = self.amount_input.clone();
        self.record_amount(self.selected_date, &raw)
    }

    /// Handle price text for `date`.
    ///
    /// Parseable text becomes the override for that date and the new rolling
    /// default. Anything else (empty, ".", "abc") only updates the buffer.
    pub fn set_price_override(
        &mut self,
        date: Option<DateKey>,
        raw_price: &str,
    ) -> Result<PriceInput, InputError> {
        if !self.is_ready() {
            debug!(commodity = %E::COMMODITY, "set_price_override before ready");
            return Err(InputError::NotReady);
        }

        self.cost_input = raw_price.to_string();

        let Some(date) = date else {
            return Ok(PriceInput::Buffered);
        };

        match parse_decimal(raw_price) {
            Ok(price) => {
                self.ledger.set_override(date, price);
                self.persist();
                Ok(PriceInput::Committed(price))
            }
            Err(_) => Ok(PriceInput::Buffered),
        }
    }

    /// Price keystroke for the selected date
    pub fn type_price(&mut self, raw_price: &str) -> Result<PriceInput, InputError> {
        self.set_price_override(self.selected_date, raw_price)
    }

    // ========================================================================
    // DISPLAY SURFACE (read-only)
    // ========================================================================

    pub fn ledger(&self) -> &Ledger<E> {
        &self.ledger
    }

    pub fn entries(&self) -> &BTreeMap<DateKey, E> {
        self.ledger.entries()
    }

    pub fn overrides(&self) -> &PriceOverrides {
        self.ledger.overrides()
    }

    pub fn last_entered_price(&self) -> f64 {
        self.ledger.last_entered_price()
    }

    pub fn cost_input(&self) -> &str {
        &self.cost_input
    }

    /// Last user-visible prompt, cleared by the next successful record
    pub fn prompt(&self) -> Option<&str> {
        self.prompt.as_deref()
    }

    /// Number of saves that failed since start
    pub fn failed_saves(&self) -> usize {
        self.failed_saves
    }

    pub fn summary(&self) -> Summary {
        summarize(&self.ledger)
    }

    pub fn month_summary(&self, year: i32, month: u32) -> Summary {
        summarize_month(&self.ledger, year, month)
    }

    pub fn daily_lines(&self) -> Vec<DailyLine> {
        daily_breakdown(&self.ledger)
    }

    pub fn marked_dates(&self) -> Vec<DateKey> {
        self.ledger.marked_dates()
    }

    pub fn repository(&self) -> &LedgerRepository<E, S> {
        &self.repository
    }

    // ========================================================================
    // INTERNALS
    // ========================================================================

    fn display_price(&self, date: &DateKey) -> String {
        format_price(self.ledger.resolve_price(date))
    }

    fn reject(&mut self, err: InputError) -> InputError {
        debug!(commodity = %E::COMMODITY, error = %err, "amount rejected");
        self.prompt = Some(E::COMMODITY.amount_prompt());
        err
    }

    fn persist(&mut self) {
        if let Err(err) = self.repository.save(&self.ledger) {
            self.failed_saves += 1;
            error!(
                commodity = %E::COMMODITY,
                error = %err,
                "failed to save ledger, keeping in-memory state"
            );
        }
    }
}

// ============================================================================
// COMMODITY-AGNOSTIC VIEW
// ============================================================================

/// Object-safe face of an engine, so surfaces can switch commodity at runtime
pub trait CommodityLedger {
    fn commodity(&self) -> Commodity;
    fn is_ready(&self) -> bool;
    fn select_date(&mut self, date: DateKey);
    fn selected_date(&self) -> Option<DateKey>;
    fn set_amount_input(&mut self, text: &str);
    fn amount_input(&self) -> &str;
    fn record_amount(&mut self, date: Option<DateKey>, raw_amount: &str) -> Result<RecordOutcome, InputError>;
    fn submit_amount(&mut self) -> Result<RecordOutcome, InputError>;
    fn set_price_override(&mut self, date: Option<DateKey>, raw_price: &str) -> Result<PriceInput, InputError>;
    fn type_price(&mut self, raw_price: &str) -> Result<PriceInput, InputError>;
    fn cost_input(&self) -> &str;
    fn prompt(&self) -> Option<&str>;
    fn overrides(&self) -> &PriceOverrides;
    fn last_entered_price(&self) -> f64;
    fn failed_saves(&self) -> usize;
    fn summary(&self) -> Summary;
    fn month_summary(&self, year: i32, month: u32) -> Summary;
    fn daily_lines(&self) -> Vec<DailyLine>;
    fn marked_dates(&self) -> Vec<DateKey>;
    /// Remove this commodity's keys from the store (memory is untouched)
    fn wipe_storage(&self) -> LedgerResult<()>;
}

impl<E: LedgerEntry, S: PersistentStore> CommodityLedger for LedgerEngine<E, S> {
    fn commodity(&self) -> Commodity {
        E::COMMODITY
    }

    fn is_ready(&self) -> bool {
        LedgerEngine::is_ready(self)
    }

    fn select_date(&mut self, date: DateKey) {
        LedgerEngine::select_date(self, date)
    }

    fn selected_date(&self) -> Option<DateKey> {
        LedgerEngine::selected_date(self)
    }

    fn set_amount_input(&mut self, text: &str) {
        LedgerEngine::set_amount_input(self, text)
    }

    fn amount_input(&self) -> &str {
        LedgerEngine::amount_input(self)
    }

    fn record_amount(&mut self, date: Option<DateKey>, raw_amount: &str) -> Result<RecordOutcome, InputError> {
        LedgerEngine::record_amount(self, date, raw_amount)
    }

    fn submit_amount(&mut self) -> Result<RecordOutcome, InputError> {
        LedgerEngine::submit_amount(self)
    }

    fn set_price_override(&mut self, date: Option<DateKey>, raw_price: &str) -> Result<PriceInput, InputError> {
        LedgerEngine::set_price_override(self, date, raw_price)
    }

    fn type_price(&mut self, raw_price: &str) -> Result<PriceInput, InputError> {
        LedgerEngine::type_price(self, raw_price)
    }

    fn cost_input(&self) -> &str {
        LedgerEngine::cost_input(self)
    }

    fn prompt(&self) -> Option<&str> {
        LedgerEngine::prompt(self)
    }

    fn overrides(&self) -> &PriceOverrides {
        LedgerEngine::overrides(self)
    }

    fn last_entered_price(&self) -> f64 {
        LedgerEngine::last_entered_price(self)
    }

    fn failed_saves(&self) -> usize {
        LedgerEngine::failed_saves(self)
    }

    fn summary(&self) -> Summary {
        LedgerEngine::summary(self)
    }

    fn month_summary(&self, year: i32, month: u32) -> Summary {
        LedgerEngine::month_summary(self, year, month)
    }

    fn daily_lines(&self) -> Vec<DailyLine> {
        LedgerEngine::daily_lines(self)
    }

    fn marked_dates(&self) -> Vec<DateKey> {
        LedgerEngine::marked_dates(self)
    }

    fn wipe_storage(&self) -> LedgerResult<()> {
        self.repository.wipe()
    }
}

// ============================================================================
// BOTH COMMODITIES
// ============================================================================

/// The milk and water engines side by side, sharing one store
pub struct Ledgers<S> {
    pub milk: MilkEngine<S>,
    pub water: WaterEngine<S>,
}

impl<S: PersistentStore + Clone> Ledgers<S> {
    /// Open and hydrate both engines over clones of `store`
    pub fn open(store: S) -> Self {
        Ledgers {
            milk: MilkEngine::open(store.clone()),
            water: WaterEngine::open(store),
        }
    }
}

impl<S: PersistentStore> Ledgers<S> {
    pub fn get(&self, commodity: Commodity) -> &dyn CommodityLedger {
        match commodity {
            Commodity::Milk => &self.milk,
            Commodity::Water => &self.water,
        }
    }

    pub fn get_mut(&mut self, commodity: Commodity) -> &mut dyn CommodityLedger {
        match commodity {
            Commodity::Milk => &mut self.milk,
            Commodity::Water => &mut self.water,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use crate::store::{MemoryStore, StoreResult};
    use std::cell::Cell;
    use std::sync::Arc;

    fn day(s: &str) -> DateKey {
        s.parse().unwrap()
    }

    /// Memory store that counts writes and can be told to fail them
    #[derive(Default)]
    struct ProbeStore {
        inner: MemoryStore,
        writes: Cell<usize>,
        fail_writes: Cell<bool>,
    }

    impl PersistentStore for ProbeStore {
        fn get(&self, key: &str) -> StoreResult<Option<String>> {
            self.inner.get(key)
        }

        fn set(&self, key: &str, value: &str) -> StoreResult<()> {
            if self.fail_writes.get() {
                return Err(StoreError::Unavailable("write refused".to_string()));
            }
            self.writes.set(self.writes.get() + 1);
            self.inner.set(key, value)
        }

        fn remove(&self, key: &str) -> StoreResult<()> {
            self.inner.remove(key)
        }
    }

    fn milk_engine() -> (MilkEngine<Arc<ProbeStore>>, Arc<ProbeStore>) {
        let store = Arc::new(ProbeStore::default());
        (MilkEngine::open(Arc::clone(&store)), store)
    }

    fn water_engine() -> (WaterEngine<Arc<ProbeStore>>, Arc<ProbeStore>) {
        let store = Arc::new(ProbeStore::default());
        (WaterEngine::open(Arc::clone(&store)), store)
    }

    #[test]
    fn test_lifecycle_states() {
        let mut engine = MilkEngine::new(MemoryStore::new());
        assert_eq!(engine.state(), EngineState::Uninitialized);

        assert_eq!(
            engine.record_amount(Some(day("2024-07-01")), "2"),
            Err(InputError::NotReady)
        );
        assert!(engine.entries().is_empty(), "no mutation before ready");

        engine.hydrate();
        assert_eq!(engine.state(), EngineState::Ready);

        engine.record_amount(Some(day("2024-07-01")), "2").unwrap();
        engine.hydrate();
        assert_eq!(engine.entries().len(), 1, "second hydrate does not reload");
    }

    #[test]
    fn test_milk_scenario_default_price() {
        let (mut engine, _) = milk_engine();

        let outcome = engine.record_amount(Some(day("2024-07-01")), "2").unwrap();
        assert_eq!(outcome, RecordOutcome::Recorded);

        let summary = engine.summary();
        assert_eq!(summary.total_quantity, 2.0);
        assert_eq!(summary.total_cost, 280.0);
    }

    #[test]
    fn test_milk_repeat_record_is_idempotent() {
        let (mut engine, store) = milk_engine();

        engine.record_amount(Some(day("2024-07-01")), "2").unwrap();
        let writes_after_first = store.writes.get();
        assert_eq!(writes_after_first, 3, "one save writes three keys");

        let outcome = engine.record_amount(Some(day("2024-07-01")), "2").unwrap();
        assert_eq!(outcome, RecordOutcome::Unchanged);
        assert_eq!(engine.summary().total_quantity, 2.0, "no double counting");
        assert_eq!(store.writes.get(), writes_after_first, "unchanged milk entry is not saved");
    }

    #[test]
    fn test_water_saves_even_when_unchanged() {
        let (mut engine, store) = water_engine();

        engine.record_amount(Some(day("2024-07-01")), "3").unwrap();
        let outcome = engine.record_amount(Some(day("2024-07-01")), "3").unwrap();

        assert_eq!(outcome, RecordOutcome::Unchanged);
        assert_eq!(store.writes.get(), 6, "water persists every record");
        assert_eq!(engine.summary().total_quantity, 3.0);
    }

    #[test]
    fn test_water_snapshot_survives_override() {
        let (mut engine, _) = water_engine();

        engine.record_amount(Some(day("2024-07-01")), "3").unwrap();
        assert_eq!(engine.entries()[&day("2024-07-01")].unit_price, 40.0);

        let input = engine.set_price_override(Some(day("2024-07-01")), "50").unwrap();
        assert_eq!(input, PriceInput::Committed(50.0));

        assert_eq!(engine.summary().total_cost, 120.0, "3 × 40, not 3 × 50");
    }

    #[test]
    fn test_water_record_after_override_snapshots_new_price() {
        let (mut engine, _) = water_engine();

        engine.set_price_override(Some(day("2024-07-01")), "45").unwrap();
        engine.record_amount(Some(day("2024-07-02")), "2").unwrap();

        assert_eq!(
            engine.entries()[&day("2024-07-02")].unit_price,
            45.0,
            "rolling default applies to later days"
        );
    }

    #[test]
    fn test_milk_price_follows_rolling_default() {
        let (mut engine, _) = milk_engine();

        engine.record_amount(Some(day("2024-07-01")), "2").unwrap();
        engine.record_amount(Some(day("2024-07-02")), "1").unwrap();
        engine.set_price_override(Some(day("2024-07-02")), "150").unwrap();

        engine.set_price_override(Some(day("2024-07-05")), "160").unwrap();

        // 07-01 has no override: follows the latest rolling default (160)
        // 07-02 keeps its explicit 150
        assert_eq!(engine.summary().total_cost, 2.0 * 160.0 + 150.0);
    }

    #[test]
    fn test_record_without_date_prompts() {
        let (mut engine, store) = milk_engine();
        engine.set_amount_input("2");

        let err = engine.submit_amount().unwrap_err();
        assert_eq!(err, InputError::MissingDate);
        assert_eq!(
            engine.prompt(),
            Some("Please select a date and enter the milk amount")
        );
        assert!(engine.entries().is_empty());
        assert_eq!(engine.amount_input(), "2", "buffer kept on failure");
        assert_eq!(store.writes.get(), 0);
    }

    #[test]
    fn test_record_non_numeric_prompts() {
        let (mut engine, _) = water_engine();

        let err = engine.record_amount(Some(day("2024-07-01")), "abc").unwrap_err();
        assert!(matches!(err, InputError::InvalidNumber { .. }));
        assert_eq!(
            engine.prompt(),
            Some("Please select a date and enter the water amount")
        );
        assert!(engine.entries().is_empty());

        engine.record_amount(Some(day("2024-07-01")), "1").unwrap();
        assert_eq!(engine.prompt(), None, "success clears the prompt");
    }

    #[test]
    fn test_submit_clears_amount_buffer() {
        let (mut engine, _) = milk_engine();
        engine.select_date(day("2024-07-03"));
        engine.set_amount_input("1.5");

        engine.submit_amount().unwrap();

        assert_eq!(engine.amount_input(), "");
        assert_eq!(engine.entries()[&day("2024-07-03")].amount_liters, 1.5);
    }

    #[test]
    fn test_partial_price_input_is_buffered() {
        let (mut engine, store) = milk_engine();
        engine.select_date(day("2024-07-01"));

        assert_eq!(engine.type_price("").unwrap(), PriceInput::Buffered);
        assert_eq!(engine.cost_input(), "");
        assert!(engine.overrides().is_empty());
        assert_eq!(engine.last_entered_price(), 140.0);
        assert_eq!(store.writes.get(), 0, "nothing persisted for partial input");

        assert_eq!(engine.type_price("1").unwrap(), PriceInput::Committed(1.0));
        assert_eq!(engine.type_price("15").unwrap(), PriceInput::Committed(15.0));
        assert_eq!(engine.type_price("150").unwrap(), PriceInput::Committed(150.0));
        assert_eq!(engine.overrides()[&day("2024-07-01")], 150.0);
        assert_eq!(engine.last_entered_price(), 150.0);
    }

    #[test]
    fn test_price_without_selected_date_is_buffered() {
        let (mut engine, _) = water_engine();

        assert_eq!(engine.type_price("55").unwrap(), PriceInput::Buffered);
        assert_eq!(engine.cost_input(), "55");
        assert_eq!(engine.last_entered_price(), 40.0);
    }

    #[test]
    fn test_record_does_not_touch_last_price() {
        let (mut engine, _) = milk_engine();
        engine.record_amount(Some(day("2024-07-01")), "2").unwrap();
        assert_eq!(engine.last_entered_price(), 140.0);
        assert!(engine.overrides().is_empty());
    }

    #[test]
    fn test_select_date_shows_effective_price() {
        let (mut engine, _) = water_engine();

        engine.select_date(day("2024-07-01"));
        assert_eq!(engine.cost_input(), "40");

        engine.type_price("42.5").unwrap();
        engine.select_date(day("2024-07-09"));
        assert_eq!(engine.cost_input(), "42.5", "rolling default for unset day");

        engine.set_price_override(Some(day("2024-07-09")), "44").unwrap();
        engine.select_date(day("2024-07-01"));
        assert_eq!(engine.cost_input(), "42.5", "explicit override for that day");
    }

    #[test]
    fn test_state_survives_restart() {
        let store = Arc::new(MemoryStore::new());

        {
            let mut engine = WaterEngine::open(Arc::clone(&store));
            engine.set_price_override(Some(day("2024-07-01")), "45").unwrap();
            engine.record_amount(Some(day("2024-07-01")), "2").unwrap();
        }

        let engine = WaterEngine::open(Arc::clone(&store));
        assert_eq!(engine.last_entered_price(), 45.0);
        assert_eq!(engine.summary().total_cost, 90.0);
    }

    #[test]
    fn test_legacy_null_values_do_not_erase_history() {
        let store = Arc::new(MemoryStore::new());
        store
            .set("milkData", r#"{"2024-07-01":2,"2024-07-02":null,"2024-07-03":1.5}"#)
            .unwrap();
        store
            .set("costPerDay", r#"{"2024-07-01":150,"2024-07-05":null}"#)
            .unwrap();

        let mut engine = MilkEngine::open(Arc::clone(&store));
        assert_eq!(engine.entries().len(), 2);
        assert_eq!(engine.overrides().len(), 1);

        engine.record_amount(Some(day("2024-07-10")), "1").unwrap();

        let restarted = MilkEngine::open(store);
        assert_eq!(restarted.entries().len(), 3, "valid days kept across the save");
        assert_eq!(restarted.overrides().get(&day("2024-07-01")), Some(&150.0));
    }

    #[test]
    fn test_failed_save_keeps_memory_state() {
        let (mut engine, store) = milk_engine();
        store.fail_writes.set(true);

        let outcome = engine.record_amount(Some(day("2024-07-01")), "2");
        assert_eq!(outcome, Ok(RecordOutcome::Recorded), "user is never blocked");
        assert_eq!(engine.failed_saves(), 1);
        assert_eq!(engine.summary().total_quantity, 2.0);

        // Next save carries the full current state
        store.fail_writes.set(false);
        engine.record_amount(Some(day("2024-07-02")), "1").unwrap();
        let reloaded = LedgerRepository::<MilkEntry, _>::new(Arc::clone(&store)).load();
        assert_eq!(reloaded.entries().len(), 2);
    }

    #[test]
    fn test_ledgers_keep_namespaces_apart() {
        let store = Arc::new(MemoryStore::new());
        let mut ledgers = Ledgers::open(Arc::clone(&store));

        ledgers.milk.record_amount(Some(day("2024-07-01")), "2").unwrap();
        ledgers.water.record_amount(Some(day("2024-07-01")), "3").unwrap();
        ledgers.water.set_price_override(Some(day("2024-07-02")), "50").unwrap();

        assert_eq!(ledgers.milk.last_entered_price(), 140.0);
        assert_eq!(ledgers.milk.summary().total_cost, 280.0);
        assert_eq!(ledgers.water.summary().total_cost, 120.0);
        assert_eq!(store.len(), 6);
    }

    #[test]
    fn test_dynamic_view_dispatch() {
        let mut ledgers = Ledgers::open(Arc::new(MemoryStore::new()));

        for commodity in Commodity::ALL {
            let view = ledgers.get_mut(commodity);
            view.select_date(day("2024-07-01"));
            view.set_amount_input("2");
            view.submit_amount().unwrap();
        }

        assert_eq!(ledgers.get(Commodity::Milk).summary().total_cost, 280.0);
        assert_eq!(ledgers.get(Commodity::Water).summary().total_cost, 80.0);

        ledgers.get(Commodity::Milk).wipe_storage().unwrap();
        let reopened = Ledgers::open(Arc::clone(ledgers.milk.repository().store()));
        assert!(reopened.milk.entries().is_empty());
        assert_eq!(reopened.water.entries().len(), 1);
    }
}
