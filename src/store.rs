//! Load/save boundary for the ledger
//!
//! The engine functions never touch a store; callers load a snapshot, run engine
//! operations on it, and save the result back.

use log::debug;
use std::cell::RefCell;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::ledger::Ledger;

pub trait LedgerStore {
    /// `None` when nothing has been saved yet
    fn load(&self) -> Result<Option<Ledger>>;
    fn save(&self, ledger: &Ledger) -> Result<()>;
}

/// Ledger kept as a single pretty-printed JSON document
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl LedgerStore for JsonFileStore {
    fn load(&self) -> Result<Option<Ledger>> {
        if !self.path.exists() {
            debug!("no ledger at {}", self.path.display());
            return Ok(None);
        }
        let data = fs::read_to_string(&self.path)?;
        if data.trim().is_empty() {
            return Ok(None);
        }
        Ok(Some(serde_json::from_str(&data)?))
    }

    fn save(&self, ledger: &Ledger) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let data = serde_json::to_string_pretty(ledger)?;

        // Write beside the target, then swap in
        let tmp = self.path.with_extension("json.tmp");
        let mut file = File::create(&tmp)?;
        file.write_all(data.as_bytes())?;
        file.flush()?;
        fs::rename(&tmp, &self.path)?;

        debug!(
            "saved ledger to {} ({} bills, {} loans, {} transactions)",
            self.path.display(),
            ledger.bills.len(),
            ledger.loans.len(),
            ledger.transactions.len()
        );
        Ok(())
    }
}

/// In-process store
#[derive(Debug, Default)]
pub struct MemoryStore {
    ledger: RefCell<Option<Ledger>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ledger(ledger: Ledger) -> Self {
        Self {
            ledger: RefCell::new(Some(ledger)),
        }
    }
}

impl LedgerStore for MemoryStore {
    fn load(&self) -> Result<Option<Ledger>> {
        Ok(self.ledger.borrow().clone())
    }

    fn save(&self, ledger: &Ledger) -> Result<()> {
        *self.ledger.borrow_mut() = Some(ledger.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::{FixedClock, SequentialIds};
    use crate::ledger::{Bill, Loan, MonthKey};
    use crate::payments::set_paid_for_month;
    use tempfile::tempdir;

    fn sample() -> Ledger {
        let ids = SequentialIds::new("id");
        let clock = FixedClock::ymd(2024, 5, 2).unwrap();
        let mut ledger = Ledger::with_balance(1_250.0);
        let rent = ledger.add_bill(Bill::new("Rent", 900.0, 1, "housing"), &ids);
        ledger
            .add_loan(Loan::revolving("Card", 5_000.0, 1_200.0, 60.0, 18.0, 3.0, 20), &ids)
            .unwrap();
        let month = MonthKey::new(2024, 5).unwrap();
        set_paid_for_month(ledger.bill_mut(&rent).unwrap(), month, true, &clock);
        ledger
    }

    #[test]
    fn test_json_store_round_trip() {
        let dir = tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("nested").join("ledger.json"));

        assert!(store.load().unwrap().is_none());

        let ledger = sample();
        store.save(&ledger).unwrap();
        let loaded = store.load().unwrap().unwrap();

        assert_eq!(loaded.balance, ledger.balance);
        assert_eq!(loaded.bills.len(), 2);
        assert!(loaded.loans[0].is_revolving());
        let month = MonthKey::new(2024, 5).unwrap();
        assert!(loaded.bills[0].history_entry(month).unwrap().paid);

        let raw = fs::read_to_string(store.path()).unwrap();
        assert!(raw.contains("\"paymentHistory\""));
        assert!(raw.contains("\"2024-05\""));
        assert!(raw.contains("\"revolving\""));
    }

    #[test]
    fn test_json_store_rejects_garbage() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("ledger.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(JsonFileStore::new(path).load().is_err());
    }

    #[test]
    fn test_memory_store() {
        let store = MemoryStore::new();
        assert!(store.load().unwrap().is_none());
        store.save(&sample()).unwrap();
        assert_eq!(store.load().unwrap().unwrap().balance, 1_250.0);
    }
}
