use crate::commands::db;
use crate::commands::settings;
use crate::ledger::error::LedgerError;
use crate::ledger::money;
use std::fs;
use std::path::{Path, PathBuf};

/// Render a debt account as a standalone HTML statement under
/// `.fiado/exports/` and return the written path. Sharing/printing the
/// file is the frontend's job.
#[tauri::command]
pub async fn export_debt_statement(
    shop_path: String,
    debt_id: String,
) -> Result<String, String> {
    export_debt_statement_internal(&shop_path, &debt_id)
}

pub fn export_debt_statement_internal(shop_path: &str, debt_id: &str) -> Result<String, String> {
    let conn = db::get_db_connection(shop_path).map_err(|e| format!("DB error: {e}"))?;
    let account = db::load_debt_account(&conn, debt_id)
        .map_err(|e| format!("DB error: {e}"))?
        .ok_or_else(|| LedgerError::UnknownAccount(debt_id.to_string()).to_string())?;

    let settings = settings::load_settings_from_disk(shop_path)?;
    let symbol = settings
        .get("currencySymbol")
        .and_then(|v| v.as_str())
        .unwrap_or("$")
        .to_string();
    let footer = settings
        .get("receiptFooter")
        .and_then(|v| v.as_str())
        .unwrap_or("")
        .to_string();

    let html = render_statement(&account, &symbol, &footer);

    let exports_dir = exports_dir(shop_path);
    fs::create_dir_all(&exports_dir)
        .map_err(|e| format!("Failed to create exports directory: {e}"))?;

    let out_path = exports_dir.join(format!("statement-{debt_id}.html"));
    fs::write(&out_path, html).map_err(|e| format!("Failed to write statement: {e}"))?;

    log::info!("exported statement for debt account {debt_id}");
    Ok(out_path.to_string_lossy().to_string())
}

fn exports_dir(shop_path: &str) -> PathBuf {
    Path::new(shop_path).join(".fiado").join("exports")
}

fn render_statement(
    account: &crate::models::debt::DebtAccount,
    symbol: &str,
    footer: &str,
) -> String {
    let rows: String = account
        .items
        .iter()
        .map(|item| {
            format!(
                "        <tr><td>{}</td><td>{}</td><td>{}{}</td><td>{}{}</td><td>{}</td></tr>\n",
                escape_html(&item.name),
                item.quantity,
                symbol,
                money::format_cents(item.unit_price_cents),
                symbol,
                money::format_cents(item.outstanding_cents),
                item.loan_date,
            )
        })
        .collect();

    format!(
        "<!DOCTYPE html>\n\
         <html>\n\
         <body>\n\
           <h1>Debt statement</h1>\n\
           <h2>{}</h2>\n\
           <h3>Total: {}{}</h3>\n\
           <h4>Borrowed products:</h4>\n\
           <table>\n\
             <tr><th>Product</th><th>Qty</th><th>Unit price</th><th>Outstanding</th><th>Date</th></tr>\n\
{}\
           </table>\n\
           <p>{}</p>\n\
         </body>\n\
         </html>\n",
        escape_html(&account.debtor_name),
        symbol,
        money::format_cents(account.total_cents),
        rows,
        escape_html(footer),
    )
}

fn escape_html(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
