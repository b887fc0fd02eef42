use crate::commands::db;
use crate::ledger::account;
use crate::ledger::error::{LedgerError, Result};
use crate::ledger::money;
use crate::models::debt::{DebtAccount, DebtSummary, LoanItem};
use tauri::Emitter;

/// Attempts per mutation before a version conflict is surfaced to the user.
const WRITE_ATTEMPTS: u32 = 3;

#[tauri::command]
pub async fn list_debt_accounts(shop_path: String) -> std::result::Result<Vec<DebtSummary>, String> {
    list_debt_accounts_internal(&shop_path).map_err(|e| e.to_string())
}

pub fn list_debt_accounts_internal(shop_path: &str) -> Result<Vec<DebtSummary>> {
    let conn = db::get_db_connection(shop_path)?;
    Ok(db::load_debt_summaries(&conn)?)
}

#[tauri::command]
pub async fn create_debt_account(
    shop_path: String,
    debtor_name: String,
    app: tauri::AppHandle,
) -> std::result::Result<DebtAccount, String> {
    let account = create_debt_account_internal(&shop_path, &debtor_name).map_err(|e| e.to_string())?;
    let _ = app.emit("debts_changed", serde_json::json!({ "id": &account.id }));
    Ok(account)
}

pub fn create_debt_account_internal(shop_path: &str, debtor_name: &str) -> Result<DebtAccount> {
    let name = debtor_name.trim();
    if name.is_empty() {
        return Err(LedgerError::EmptyDebtorName);
    }

    let conn = db::get_db_connection(shop_path)?;
    let account = db::insert_debt_account(&conn, name)?;
    log::info!("created debt account {} for {name}", account.id);
    Ok(account)
}

#[tauri::command]
pub async fn get_debt_account(
    shop_path: String,
    debt_id: String,
) -> std::result::Result<DebtAccount, String> {
    get_debt_account_internal(&shop_path, &debt_id).map_err(|e| e.to_string())
}

pub fn get_debt_account_internal(shop_path: &str, debt_id: &str) -> Result<DebtAccount> {
    let conn = db::get_db_connection(shop_path)?;
    db::load_debt_account(&conn, debt_id)?
        .ok_or_else(|| LedgerError::UnknownAccount(debt_id.to_string()))
}

#[tauri::command]
pub async fn add_loan_item(
    shop_path: String,
    debt_id: String,
    product_id: String,
    quantity: String,
    app: tauri::AppHandle,
) -> std::result::Result<DebtAccount, String> {
    let account = add_loan_item_internal(&shop_path, &debt_id, &product_id, &quantity)
        .map_err(|e| e.to_string())?;
    let _ = app.emit("debts_changed", serde_json::json!({ "id": debt_id }));
    Ok(account)
}

pub fn add_loan_item_internal(
    shop_path: &str,
    debt_id: &str,
    product_id: &str,
    quantity: &str,
) -> Result<DebtAccount> {
    let quantity = money::parse_quantity(quantity)?;

    let conn = db::get_db_connection(shop_path)?;
    let product = db::load_catalog_product(&conn, product_id)?
        .ok_or_else(|| LedgerError::UnknownProduct(product_id.to_string()))?;

    mutate_account(&conn, debt_id, |account| {
        let item = LoanItem {
            item_id: next_item_id(&account.items),
            name: product.name.clone(),
            unit_price_cents: product.price_cents,
            quantity,
            outstanding_cents: quantity * product.price_cents,
            loan_date: chrono::Utc::now().date_naive().to_string(),
        };
        account::add_item(account, item);
        Ok(())
    })
}

#[tauri::command]
pub async fn apply_payment(
    shop_path: String,
    debt_id: String,
    amount: String,
    app: tauri::AppHandle,
) -> std::result::Result<DebtAccount, String> {
    let account =
        apply_payment_internal(&shop_path, &debt_id, &amount).map_err(|e| e.to_string())?;
    let _ = app.emit("debts_changed", serde_json::json!({ "id": debt_id }));
    Ok(account)
}

pub fn apply_payment_internal(shop_path: &str, debt_id: &str, amount: &str) -> Result<DebtAccount> {
    let payment_cents = money::parse_payment(amount)?;

    let conn = db::get_db_connection(shop_path)?;
    mutate_account(&conn, debt_id, |account| {
        let settlement = account::settle(account, payment_cents)?;
        if settlement.unapplied_cents > 0 {
            log::info!(
                "payment overshot debt account {debt_id} by {}",
                money::format_cents(settlement.unapplied_cents)
            );
        }
        Ok(())
    })
}

#[tauri::command]
pub async fn edit_loan_item(
    shop_path: String,
    debt_id: String,
    item_id: i64,
    name: String,
    quantity: String,
    unit_price: String,
    app: tauri::AppHandle,
) -> std::result::Result<DebtAccount, String> {
    let account = edit_loan_item_internal(&shop_path, &debt_id, item_id, &name, &quantity, &unit_price)
        .map_err(|e| e.to_string())?;
    let _ = app.emit("debts_changed", serde_json::json!({ "id": debt_id }));
    Ok(account)
}

pub fn edit_loan_item_internal(
    shop_path: &str,
    debt_id: &str,
    item_id: i64,
    name: &str,
    quantity: &str,
    unit_price: &str,
) -> Result<DebtAccount> {
    let quantity = money::parse_quantity(quantity)?;
    let unit_price_cents = money::parse_amount(unit_price)?;

    let conn = db::get_db_connection(shop_path)?;
    mutate_account(&conn, debt_id, |account| {
        account::edit_item(account, item_id, name, quantity, unit_price_cents)
    })
}

#[tauri::command]
pub async fn delete_loan_item(
    shop_path: String,
    debt_id: String,
    item_id: i64,
    app: tauri::AppHandle,
) -> std::result::Result<DebtAccount, String> {
    let account =
        delete_loan_item_internal(&shop_path, &debt_id, item_id).map_err(|e| e.to_string())?;
    let _ = app.emit("debts_changed", serde_json::json!({ "id": debt_id }));
    Ok(account)
}

pub fn delete_loan_item_internal(shop_path: &str, debt_id: &str, item_id: i64) -> Result<DebtAccount> {
    let conn = db::get_db_connection(shop_path)?;
    mutate_account(&conn, debt_id, |account| account::remove_item(account, item_id))
}

/// Read-modify-write with optimistic concurrency: load the account, apply
/// the mutation, write back conditioned on the version stamp. On a stale
/// stamp the whole cycle re-runs against a fresh snapshot.
fn mutate_account<F>(conn: &rusqlite::Connection, debt_id: &str, mut apply: F) -> Result<DebtAccount>
where
    F: FnMut(&mut DebtAccount) -> Result<()>,
{
    for attempt in 0..WRITE_ATTEMPTS {
        let mut account = db::load_debt_account(conn, debt_id)?
            .ok_or_else(|| LedgerError::UnknownAccount(debt_id.to_string()))?;

        apply(&mut account)?;

        if db::store_debt_account_if_version(conn, &account)? {
            account.version += 1;
            return Ok(account);
        }

        log::warn!(
            "version conflict on debt account {debt_id}, attempt {}",
            attempt + 1
        );
    }

    Err(LedgerError::WriteConflict)
}

/// Item ids are epoch milliseconds at creation time; same-millisecond
/// additions within one account bump until unique.
fn next_item_id(items: &[LoanItem]) -> i64 {
    let mut candidate = chrono::Utc::now().timestamp_millis();
    while items.iter().any(|item| item.item_id == candidate) {
        candidate += 1;
    }
    candidate
}
