//! Per-month paid/unpaid tracking for recurring bills
//!
//! The month-keyed history is authoritative. The legacy `paid` flag is a cache of
//! the current month's entry, recomputed by [`derive_legacy_flag`] after every
//! write and consulted only for the current month.

use log::info;

use crate::clock::Clock;
use crate::ledger::{Bill, Ledger, MonthKey, PaymentRecord};

/// Whether `bill` is paid for `month`
///
/// Months without a history entry are unpaid. The legacy flag is read only for
/// the current month of a bill that has no history at all (unmigrated data);
/// once any month is recorded the flag may be a stale cache of an earlier month.
pub fn is_paid_for_month(bill: &Bill, month: MonthKey, clock: &dyn Clock) -> bool {
    match bill.history_entry(month) {
        Some(entry) => entry.paid,
        None => month == clock.current_month() && bill.payment_history.is_empty() && bill.paid,
    }
}

/// Record `bill` as paid or unpaid for `month`, overwriting any earlier entry
pub fn set_paid_for_month(bill: &mut Bill, month: MonthKey, paid: bool, clock: &dyn Clock) {
    let record = PaymentRecord {
        paid,
        paid_date: paid.then(|| clock.today()),
        principal_applied: None,
    };
    write_entry(bill, month, record, clock);
}

/// Legacy flag value implied by the history for `current`
///
/// A bill without history keeps whatever flag it was stored with. Once any month
/// is recorded the flag mirrors the current month's entry, and is false when the
/// current month has none.
pub fn derive_legacy_flag(bill: &Bill, current: MonthKey) -> bool {
    if bill.payment_history.is_empty() {
        return bill.paid;
    }
    bill.history_entry(current).map(|entry| entry.paid).unwrap_or(false)
}

/// Upgrade bills that only carry the legacy flag
///
/// Each bill with `paid == true` and no history gets a current-month entry.
/// Already-migrated bills are untouched, so repeated runs change nothing.
/// Returns the number of bills migrated.
pub fn migrate_legacy_data(ledger: &mut Ledger, clock: &dyn Clock) -> usize {
    let current = clock.current_month();
    let mut migrated = 0;

    for bill in ledger.bills.iter_mut() {
        if seed_legacy_entry(bill, clock) {
            migrated += 1;
        }
    }

    if migrated > 0 {
        info!("migrated {} legacy bill payment flag(s) into {}", migrated, current);
    }
    migrated
}

/// Turn a legacy-only `paid` flag into a current-month history entry
fn seed_legacy_entry(bill: &mut Bill, clock: &dyn Clock) -> bool {
    if !bill.paid || !bill.payment_history.is_empty() {
        return false;
    }
    let record = PaymentRecord {
        paid: true,
        paid_date: Some(clock.today()),
        principal_applied: None,
    };
    bill.payment_history.insert(clock.current_month(), record);
    true
}

/// Insert `record` for `month` and re-derive the legacy flag
///
/// An unmigrated paid flag is seeded into history first, so writing some other
/// month never drops the current month's payment.
pub(crate) fn write_entry(bill: &mut Bill, month: MonthKey, record: PaymentRecord, clock: &dyn Clock) {
    seed_legacy_entry(bill, clock);
    bill.payment_history.insert(month, record);
    bill.paid = derive_legacy_flag(bill, clock.current_month());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;

    fn month(year: i32, month: u32) -> MonthKey {
        MonthKey::new(year, month).unwrap()
    }

    #[test]
    fn test_unrecorded_month_is_unpaid() {
        let clock = FixedClock::ymd(2024, 3, 10).unwrap();
        let bill = Bill::new("Rent", 800.0, 1, "housing");
        assert!(!is_paid_for_month(&bill, month(2024, 3), &clock));
        assert!(!is_paid_for_month(&bill, month(2024, 1), &clock));
    }

    #[test]
    fn test_month_isolation() {
        let clock = FixedClock::ymd(2024, 1, 15).unwrap();
        let mut bill = Bill::new("Rent", 800.0, 1, "housing");

        set_paid_for_month(&mut bill, month(2024, 1), true, &clock);
        assert!(is_paid_for_month(&bill, month(2024, 1), &clock));
        assert!(!is_paid_for_month(&bill, month(2024, 2), &clock));
        assert!(!is_paid_for_month(&bill, month(2023, 12), &clock));

        // A month later the January payment must not leak into February either
        let february = FixedClock::ymd(2024, 2, 3).unwrap();
        assert!(!is_paid_for_month(&bill, month(2024, 2), &february));
        assert!(is_paid_for_month(&bill, month(2024, 1), &february));
    }

    #[test]
    fn test_legacy_flag_only_for_current_month() {
        let clock = FixedClock::ymd(2024, 5, 20).unwrap();
        let mut bill = Bill::new("Phone", 30.0, 20, "utility");
        bill.paid = true;

        assert!(is_paid_for_month(&bill, month(2024, 5), &clock));
        assert!(!is_paid_for_month(&bill, month(2024, 4), &clock));
        assert!(!is_paid_for_month(&bill, month(2024, 6), &clock));
    }

    #[test]
    fn test_set_paid_mirrors_current_month_into_flag() {
        let clock = FixedClock::ymd(2024, 5, 20).unwrap();
        let mut bill = Bill::new("Phone", 30.0, 20, "utility");

        set_paid_for_month(&mut bill, month(2024, 5), true, &clock);
        assert!(bill.paid);
        let entry = bill.history_entry(month(2024, 5)).unwrap();
        assert_eq!(entry.paid_date, Some(clock.today()));

        // Writing another month leaves the current-month flag alone
        set_paid_for_month(&mut bill, month(2024, 4), false, &clock);
        assert!(bill.paid);

        set_paid_for_month(&mut bill, month(2024, 5), false, &clock);
        assert!(!bill.paid);
        assert!(bill.history_entry(month(2024, 5)).unwrap().paid_date.is_none());
        assert!(!is_paid_for_month(&bill, month(2024, 5), &clock));
    }

    #[test]
    fn test_past_month_write_keeps_legacy_current_payment() {
        let clock = FixedClock::ymd(2024, 5, 20).unwrap();
        let mut bill = Bill::new("Gym", 25.0, 1, "health");
        bill.paid = true;

        set_paid_for_month(&mut bill, month(2024, 4), true, &clock);
        assert!(bill.paid);
        assert!(is_paid_for_month(&bill, month(2024, 5), &clock));
        assert!(is_paid_for_month(&bill, month(2024, 4), &clock));
        assert_eq!(bill.payment_history.len(), 2);
        assert_eq!(bill.history_entry(month(2024, 5)).unwrap().paid_date, Some(clock.today()));
    }

    #[test]
    fn test_legacy_unpaid_current_month_overwrites_seed() {
        let clock = FixedClock::ymd(2024, 5, 20).unwrap();
        let mut bill = Bill::new("Gym", 25.0, 1, "health");
        bill.paid = true;

        set_paid_for_month(&mut bill, month(2024, 5), false, &clock);
        assert!(!bill.paid);
        assert_eq!(bill.payment_history.len(), 1);
        assert!(!is_paid_for_month(&bill, month(2024, 5), &clock));
    }

    #[test]
    fn test_stale_flag_does_not_carry_into_next_month() {
        let january = FixedClock::ymd(2024, 1, 15).unwrap();
        let mut bill = Bill::new("Rent", 800.0, 1, "housing");
        set_paid_for_month(&mut bill, month(2024, 1), true, &january);
        assert!(bill.paid);

        // Stored flag still reflects January when read in February
        let february = FixedClock::ymd(2024, 2, 3).unwrap();
        assert!(!is_paid_for_month(&bill, month(2024, 2), &february));
        assert!(!derive_legacy_flag(&bill, february.current_month()));
    }

    #[test]
    fn test_migration_creates_current_month_entry() {
        let clock = FixedClock::ymd(2024, 7, 2).unwrap();
        let mut ledger = Ledger::default();
        let mut paid = Bill::new("Rent", 800.0, 1, "housing");
        paid.paid = true;
        ledger.bills.push(paid);
        ledger.bills.push(Bill::new("Power", 60.0, 15, "utility"));

        assert_eq!(migrate_legacy_data(&mut ledger, &clock), 1);

        let rent = &ledger.bills[0];
        assert!(rent.paid);
        assert_eq!(rent.payment_history.len(), 1);
        assert!(rent.history_entry(month(2024, 7)).unwrap().paid);
        assert!(ledger.bills[1].payment_history.is_empty());
    }

    #[test]
    fn test_migration_is_idempotent() {
        let clock = FixedClock::ymd(2024, 7, 2).unwrap();
        let mut ledger = Ledger::default();
        let mut a = Bill::new("Rent", 800.0, 1, "housing");
        a.paid = true;
        let mut b = Bill::new("Car", 300.0, 10, "loan");
        b.paid = true;
        set_paid_for_month(&mut b, month(2024, 6), true, &clock);
        ledger.bills.push(a);
        ledger.bills.push(b);

        migrate_legacy_data(&mut ledger, &clock);
        let once = ledger.clone();

        let later = FixedClock::ymd(2024, 9, 1).unwrap();
        assert_eq!(migrate_legacy_data(&mut ledger, &later), 0);
        assert_eq!(ledger, once);
    }
}
