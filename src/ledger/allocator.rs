//! Distributes a payment across a debt account's line items.

use crate::ledger::error::{LedgerError, Result};
use crate::models::debt::LoanItem;

/// Outcome of applying a payment to an ordered set of line items.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settlement {
    /// Items that still carry a balance, in their original order.
    pub items: Vec<LoanItem>,
    /// Sum of the surviving items' outstanding amounts.
    pub total_cents: i64,
    /// Overpayment left after every item settled. The account does not keep
    /// it as credit; callers may show it to the user.
    pub unapplied_cents: i64,
}

/// Walk the items in the given order, paying each off until the payment is
/// exhausted. Items whose outstanding amount reaches exactly zero are
/// dropped from the result; the total is recomputed from the survivors.
///
/// Rejects non-positive payments with `InvalidAmount` before touching
/// anything. Either fully succeeds or fully rejects.
pub fn allocate_payment(items: &[LoanItem], payment_cents: i64) -> Result<Settlement> {
    if payment_cents <= 0 {
        return Err(LedgerError::InvalidAmount);
    }

    let mut remaining = payment_cents;
    let mut updated = items.to_vec();

    for item in updated.iter_mut() {
        if remaining <= 0 {
            break;
        }
        if remaining >= item.outstanding_cents {
            remaining -= item.outstanding_cents;
            item.outstanding_cents = 0;
        } else {
            item.outstanding_cents -= remaining;
            remaining = 0;
        }
    }

    updated.retain(|item| item.outstanding_cents > 0);
    let total_cents = updated.iter().map(|item| item.outstanding_cents).sum();

    Ok(Settlement {
        items: updated,
        total_cents,
        unapplied_cents: remaining,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(item_id: i64, outstanding_cents: i64) -> LoanItem {
        LoanItem {
            item_id,
            name: format!("product-{item_id}"),
            unit_price_cents: outstanding_cents,
            quantity: 1,
            outstanding_cents,
            loan_date: "2026-08-01".to_string(),
        }
    }

    #[test]
    fn partial_payment_walks_items_in_order() {
        // 40 against [30, 20, 50]: first settles, second drops to 10,
        // third untouched.
        let items = vec![item(1, 3000), item(2, 2000), item(3, 5000)];

        let settlement = allocate_payment(&items, 4000).unwrap();

        assert_eq!(settlement.items.len(), 2);
        assert_eq!(settlement.items[0].item_id, 2);
        assert_eq!(settlement.items[0].outstanding_cents, 1000);
        assert_eq!(settlement.items[1].item_id, 3);
        assert_eq!(settlement.items[1].outstanding_cents, 5000);
        assert_eq!(settlement.total_cents, 6000);
        assert_eq!(settlement.unapplied_cents, 0);
    }

    #[test]
    fn overpayment_settles_everything_and_reports_excess() {
        let items = vec![item(1, 3000), item(2, 2000), item(3, 5000)];

        let settlement = allocate_payment(&items, 15000).unwrap();

        assert!(settlement.items.is_empty());
        assert_eq!(settlement.total_cents, 0);
        assert_eq!(settlement.unapplied_cents, 5000);
    }

    #[test]
    fn exact_payment_clears_the_account() {
        let items = vec![item(1, 3000), item(2, 2000)];

        let settlement = allocate_payment(&items, 5000).unwrap();

        assert!(settlement.items.is_empty());
        assert_eq!(settlement.total_cents, 0);
        assert_eq!(settlement.unapplied_cents, 0);
    }

    #[test]
    fn payment_below_total_leaves_exact_remainder() {
        let items = vec![item(1, 3000), item(2, 2000), item(3, 5000)];
        let total: i64 = items.iter().map(|i| i.outstanding_cents).sum();

        for payment in [1, 999, 2500, 7499, total - 1] {
            let settlement = allocate_payment(&items, payment).unwrap();
            assert_eq!(settlement.total_cents, total - payment);
            let sum: i64 = settlement.items.iter().map(|i| i.outstanding_cents).sum();
            assert_eq!(sum, settlement.total_cents);
            assert_eq!(settlement.unapplied_cents, 0);
        }
    }

    #[test]
    fn settled_items_are_not_kept_as_zero_balance_records() {
        let items = vec![item(1, 100), item(2, 200)];

        let settlement = allocate_payment(&items, 100).unwrap();

        assert_eq!(settlement.items.len(), 1);
        assert_eq!(settlement.items[0].item_id, 2);
    }

    #[test]
    fn non_positive_payments_are_rejected_without_output() {
        let items = vec![item(1, 3000)];

        for payment in [0, -1, -5000] {
            let err = allocate_payment(&items, payment).unwrap_err();
            assert!(matches!(err, LedgerError::InvalidAmount));
        }
    }

    #[test]
    fn payment_against_empty_account_is_all_excess() {
        let settlement = allocate_payment(&[], 500).unwrap();
        assert!(settlement.items.is_empty());
        assert_eq!(settlement.total_cents, 0);
        assert_eq!(settlement.unapplied_cents, 500);
    }
}
