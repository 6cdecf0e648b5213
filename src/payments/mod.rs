//! Payment ledger tracker: month-keyed paid/unpaid state for recurring bills

mod tracker;

pub use tracker::{derive_legacy_flag, is_paid_for_month, migrate_legacy_data, set_paid_for_month};

pub(crate) use tracker::write_entry;
