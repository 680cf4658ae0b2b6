// 💾 Ledger Repository - moves a Ledger in and out of a PersistentStore
//
// Three keys per commodity namespace:
//   entries    → JSON object DateKey → entry
//   overrides  → JSON object DateKey → price
//   last price → bare numeric text ("140")
//
// Loading never fails: unreadable or malformed keys count as absent,
// and a bad value inside a map drops only that day.
// Saving always attempts all three keys and reports the first failure.

use crate::error::{LedgerError, LedgerResult};
use crate::ledger::Ledger;
use crate::model::{DateKey, LedgerEntry, StorageKeys};
use crate::price::{format_price, PriceOverrides};
use crate::store::PersistentStore;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::marker::PhantomData;
use tracing::{debug, warn};

pub struct LedgerRepository<E, S> {
    store: S,
    keys: StorageKeys,
    _entry: PhantomData<E>,
}

impl<E: LedgerEntry, S: PersistentStore> LedgerRepository<E, S> {
    /// Repository over the commodity's standard namespace
    pub fn new(store: S) -> Self {
        Self::with_keys(store, E::COMMODITY.storage_keys())
    }

    pub fn with_keys(store: S, keys: StorageKeys) -> Self {
        LedgerRepository {
            store,
            keys,
            _entry: PhantomData,
        }
    }

    pub fn keys(&self) -> StorageKeys {
        self.keys
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    // ========================================================================
    // LOAD
    // ========================================================================

    /// Read the namespace; absent or unreadable keys fall back to empty maps
    /// and the commodity default price
    pub fn load(&self) -> Ledger<E> {
        let default_price = E::COMMODITY.default_price();

        let last_entered_price = match self.read_key::<f64>(self.keys.last_price) {
            Some(price) if price.is_finite() && price >= 0.0 => price,
            Some(price) => {
                warn!(key = self.keys.last_price, price, "invalid last entered price, using default");
                default_price
            }
            None => default_price,
        };

        let overrides: PriceOverrides = self
            .read_map::<f64>(self.keys.overrides)
            .into_iter()
            .filter(|(date, price)| {
                let keep = price.is_finite() && *price >= 0.0;
                if !keep {
                    warn!(key = self.keys.overrides, %date, price, "dropping invalid price override");
                }
                keep
            })
            .collect();

        let entries: BTreeMap<DateKey, E> = self
            .read_map::<E>(self.keys.entries)
            .into_iter()
            .filter_map(|(date, entry)| match entry.clone().coerce(last_entered_price) {
                Some(coerced) => {
                    if coerced != entry {
                        warn!(key = self.keys.entries, %date, "repaired entry price");
                    }
                    Some((date, coerced))
                }
                None => {
                    warn!(key = self.keys.entries, %date, "dropping entry with invalid amount");
                    None
                }
            })
            .collect();

        debug!(
            namespace = E::COMMODITY.name(),
            entries = entries.len(),
            overrides = overrides.len(),
            last_entered_price,
            "ledger loaded"
        );

        Ledger::with_state(entries, overrides, last_entered_price)
    }

    /// Date-keyed object read one value at a time, so a single bad day
    /// (e.g. `null` from an earlier app version) drops only that day
    fn read_map<T: DeserializeOwned>(&self, key: &str) -> BTreeMap<DateKey, T> {
        self.read_key::<BTreeMap<String, Value>>(key)
            .unwrap_or_default()
            .into_iter()
            .filter_map(|(raw_date, value)| {
                let Some(date) = DateKey::parse_opt(&raw_date) else {
                    warn!(key, date = %raw_date, "dropping value with invalid date");
                    return None;
                };
                match serde_json::from_value::<T>(value) {
                    Ok(parsed) => Some((date, parsed)),
                    Err(err) => {
                        warn!(key, %date, error = %err, "dropping unreadable value");
                        None
                    }
                }
            })
            .collect()
    }

    fn read_key<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        match self.try_read_key(key) {
            Ok(value) => value,
            Err(err) => {
                warn!(error = %err, "treating key as absent");
                None
            }
        }
    }

    fn try_read_key<T: DeserializeOwned>(&self, key: &str) -> LedgerResult<Option<T>> {
        let raw = self
            .store
            .get(key)
            .map_err(|source| LedgerError::StorageRead {
                key: key.to_string(),
                source,
            })?;

        match raw {
            None => Ok(None),
            Some(text) => serde_json::from_str(&text)
                .map(Some)
                .map_err(|source| LedgerError::Deserialization {
                    key: key.to_string(),
                    source,
                }),
        }
    }

    // ========================================================================
    // SAVE
    // ========================================================================

    /// Write all three keys. Every key is attempted even if an earlier one
    /// fails; the first failure is returned.
    pub fn save(&self, ledger: &Ledger<E>) -> LedgerResult<()> {
        let entries = to_json(self.keys.entries, ledger.entries())?;
        let overrides = to_json(self.keys.overrides, ledger.overrides())?;
        let last_price = format_price(ledger.last_entered_price());

        let mut first_error = None;
        for (key, value) in [
            (self.keys.entries, entries),
            (self.keys.overrides, overrides),
            (self.keys.last_price, last_price),
        ] {
            if let Err(source) = self.store.set(key, &value) {
                first_error.get_or_insert(LedgerError::StorageWrite {
                    key: key.to_string(),
                    source,
                });
            }
        }

        match first_error {
            Some(err) => Err(err),
            None => {
                debug!(namespace = E::COMMODITY.name(), "ledger saved");
                Ok(())
            }
        }
    }

    /// Remove every key of the namespace (external storage reset)
    pub fn wipe(&self) -> LedgerResult<()> {
        for key in self.keys.all() {
            self.store
                .remove(key)
                .map_err(|source| LedgerError::StorageWrite {
                    key: key.to_string(),
                    source,
                })?;
        }
        Ok(())
    }
}

fn to_json<T: Serialize + ?Sized>(key: &str, value: &T) -> LedgerResult<String> {
    serde_json::to_string(value).map_err(|source| LedgerError::Serialization {
        key: key.to_string(),
        source,
    })
}
