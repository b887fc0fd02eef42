//! In-memory edit operations on a debt account. Persistence is the store's
//! job; every function here either fully applies or returns the account
//! untouched.

use crate::ledger::allocator::{allocate_payment, Settlement};
use crate::ledger::error::{LedgerError, Result};
use crate::models::debt::{DebtAccount, LoanItem};

/// Oldest loan first; item id breaks ties between same-day loans.
pub fn sort_items(items: &mut [LoanItem]) {
    items.sort_by(|a, b| {
        a.loan_date
            .cmp(&b.loan_date)
            .then(a.item_id.cmp(&b.item_id))
    });
}

pub fn recompute_total(items: &[LoanItem]) -> i64 {
    items.iter().map(|item| item.outstanding_cents).sum()
}

/// Append a new line item. Outstanding starts at the full price.
pub fn add_item(account: &mut DebtAccount, mut item: LoanItem) {
    item.outstanding_cents = item.gross_cents();
    account.items.push(item);
    sort_items(&mut account.items);
    account.total_cents = recompute_total(&account.items);
}

/// Replace a line item's name, quantity, and unit price. The outstanding
/// amount is recomputed from scratch as quantity x price, which discards
/// any prior partial payment on that item.
pub fn edit_item(
    account: &mut DebtAccount,
    item_id: i64,
    name: &str,
    quantity: i64,
    unit_price_cents: i64,
) -> Result<()> {
    if quantity <= 0 {
        return Err(LedgerError::InvalidQuantity);
    }
    if unit_price_cents < 0 {
        return Err(LedgerError::InvalidAmount);
    }

    let item = account
        .items
        .iter_mut()
        .find(|item| item.item_id == item_id)
        .ok_or(LedgerError::UnknownLineItem(item_id))?;

    if !name.trim().is_empty() {
        item.name = name.trim().to_string();
    }
    item.quantity = quantity;
    item.unit_price_cents = unit_price_cents;
    item.outstanding_cents = item.gross_cents();

    sort_items(&mut account.items);
    account.total_cents = recompute_total(&account.items);
    Ok(())
}

/// Remove a line item by id and recompute the total over the remainder.
pub fn remove_item(account: &mut DebtAccount, item_id: i64) -> Result<()> {
    let before = account.items.len();
    account.items.retain(|item| item.item_id != item_id);
    if account.items.len() == before {
        return Err(LedgerError::UnknownLineItem(item_id));
    }
    account.total_cents = recompute_total(&account.items);
    Ok(())
}

/// Apply a payment across the account's items (oldest first) and install
/// the surviving set and recomputed total.
pub fn settle(account: &mut DebtAccount, payment_cents: i64) -> Result<Settlement> {
    let mut ordered = account.items.clone();
    sort_items(&mut ordered);
    let settlement = allocate_payment(&ordered, payment_cents)?;
    account.items = settlement.items.clone();
    account.total_cents = settlement.total_cents;
    Ok(settlement)
}
