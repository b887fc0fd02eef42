use crate::ledger::account::sort_items;
use crate::ledger::money;
use crate::models::debt::{DebtAccount, DebtSummary, LoanItem};
use crate::models::order::{OrderDraft, OrderLine, OrderLineDraft, SupplierOrder, WantedDraft, WantedItem};
use crate::models::product::{CatalogProduct, ProductDraft};
use rusqlite::{params, Connection, OptionalExtension, Result};
use tauri::Emitter;

const DB_SCHEMA_VERSION: i64 = 3;

pub fn initialize_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "PRAGMA foreign_keys = ON;
         PRAGMA journal_mode = WAL;
         PRAGMA synchronous = NORMAL;",
    )?;

    let mut version: i64 = conn.pragma_query_value(None, "user_version", |row| row.get(0))?;

    if version < 1 {
        apply_migration_1(conn)?;
        version = 1;
        conn.pragma_update(None, "user_version", version)?;
    }

    if version < 2 {
        apply_migration_2(conn)?;
        version = 2;
        conn.pragma_update(None, "user_version", version)?;
    }

    if version < 3 {
        apply_migration_3(conn)?;
        version = 3;
        conn.pragma_update(None, "user_version", version)?;
    }

    if version > DB_SCHEMA_VERSION {
        // Future schema; do not fail reads/writes for forward-compatible changes.
        conn.pragma_update(None, "user_version", version)?;
    }

    Ok(())
}

fn apply_migration_1(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS products (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            price_cents INTEGER NOT NULL DEFAULT 0,
            image_url TEXT,
            created_at INTEGER NOT NULL
        );

        CREATE TABLE IF NOT EXISTS debts (
            id TEXT PRIMARY KEY,
            debtor_name TEXT NOT NULL,
            total_cents INTEGER NOT NULL DEFAULT 0,
            created_at INTEGER NOT NULL
        );

        CREATE TABLE IF NOT EXISTS debt_items (
            debt_id TEXT NOT NULL REFERENCES debts(id) ON DELETE CASCADE,
            item_id INTEGER NOT NULL,
            name TEXT NOT NULL,
            unit_price_cents INTEGER NOT NULL DEFAULT 0,
            quantity INTEGER NOT NULL DEFAULT 1,
            outstanding_cents INTEGER NOT NULL DEFAULT 0,
            loan_date TEXT NOT NULL,
            PRIMARY KEY (debt_id, item_id)
        );

        CREATE TABLE IF NOT EXISTS orders (
            id TEXT PRIMARY KEY,
            supplier TEXT NOT NULL,
            order_date TEXT NOT NULL,
            delivered INTEGER NOT NULL DEFAULT 0,
            created_at INTEGER NOT NULL
        );

        CREATE TABLE IF NOT EXISTS order_lines (
            id TEXT PRIMARY KEY,
            order_id TEXT NOT NULL REFERENCES orders(id) ON DELETE CASCADE,
            name TEXT NOT NULL,
            unit_price_cents INTEGER NOT NULL DEFAULT 0,
            quantity INTEGER NOT NULL DEFAULT 1
        );
        ",
    )
}

fn apply_migration_2(conn: &Connection) -> Result<()> {
    // V2 adds the optimistic-concurrency stamp on debt accounts.
    add_column_if_missing(conn, "debts", "version INTEGER NOT NULL DEFAULT 0")?;
    add_column_if_missing(conn, "debts", "updated_at INTEGER NOT NULL DEFAULT 0")?;

    conn.execute(
        "UPDATE debts SET updated_at = created_at WHERE updated_at = 0",
        [],
    )?;

    Ok(())
}

fn apply_migration_3(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS wanted_items (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            quantity INTEGER NOT NULL DEFAULT 1,
            created_at INTEGER NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_debt_items_debt_id ON debt_items(debt_id);
        CREATE INDEX IF NOT EXISTS idx_order_lines_order_id ON order_lines(order_id);
        CREATE INDEX IF NOT EXISTS idx_debts_debtor_name ON debts(debtor_name);
        ",
    )
}

fn add_column_if_missing(conn: &Connection, table: &str, column_def: &str) -> Result<()> {
    let column_name = column_def
        .split_whitespace()
        .next()
        .unwrap_or(column_def)
        .to_string();

    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table})"))?;
    let exists = stmt
        .query_map([], |row| row.get::<_, String>(1))?
        .filter_map(|res| res.ok())
        .any(|name| name == column_name);

    if !exists {
        conn.execute(&format!("ALTER TABLE {table} ADD COLUMN {column_def}"), [])?;
    }

    Ok(())
}

pub fn get_db_connection(shop_path: &str) -> Result<Connection> {
    let db_path = format!("{shop_path}/.fiado/ledger.db");
    let conn = Connection::open(db_path)?;
    initialize_schema(&conn)?;
    Ok(conn)
}

// ---------------------------------------------------------------------------
// Debt accounts

pub fn insert_debt_account(conn: &Connection, debtor_name: &str) -> Result<DebtAccount> {
    let id = uuid::Uuid::new_v4().to_string();
    let now = chrono::Utc::now().timestamp();

    conn.execute(
        "INSERT INTO debts (id, debtor_name, total_cents, version, created_at, updated_at) VALUES (?1, ?2, 0, 0, ?3, ?3)",
        params![&id, debtor_name, now],
    )?;

    Ok(DebtAccount {
        id,
        debtor_name: debtor_name.to_string(),
        total_cents: 0,
        version: 0,
        items: Vec::new(),
    })
}

pub fn load_debt_summaries(conn: &Connection) -> Result<Vec<DebtSummary>> {
    let mut stmt = conn.prepare(
        "SELECT id, debtor_name, total_cents FROM debts ORDER BY debtor_name COLLATE NOCASE ASC",
    )?;

    let summaries = stmt
        .query_map([], |row| {
            Ok(DebtSummary {
                id: row.get(0)?,
                debtor_name: row.get(1)?,
                total_cents: row.get(2)?,
            })
        })?
        .filter_map(|r| r.ok())
        .collect();

    Ok(summaries)
}

pub fn load_debt_account(conn: &Connection, debt_id: &str) -> Result<Option<DebtAccount>> {
    let header = conn
        .query_row(
            "SELECT id, debtor_name, total_cents, version FROM debts WHERE id = ?1",
            params![debt_id],
            |row| {
                Ok(DebtAccount {
                    id: row.get(0)?,
                    debtor_name: row.get(1)?,
                    total_cents: row.get(2)?,
                    version: row.get(3)?,
                    items: Vec::new(),
                })
            },
        )
        .optional()?;

    let Some(mut account) = header else {
        return Ok(None);
    };

    let mut stmt = conn.prepare(
        "SELECT item_id, name, unit_price_cents, quantity, outstanding_cents, loan_date FROM debt_items WHERE debt_id = ?1",
    )?;
    account.items = stmt
        .query_map(params![debt_id], |row| {
            Ok(LoanItem {
                item_id: row.get(0)?,
                name: row.get(1)?,
                unit_price_cents: row.get(2)?,
                quantity: row.get(3)?,
                outstanding_cents: row.get(4)?,
                loan_date: row.get(5)?,
            })
        })?
        .filter_map(|r| r.ok())
        .collect();

    sort_items(&mut account.items);
    Ok(Some(account))
}

/// Write a whole-account snapshot, but only if nobody wrote since the
/// caller's read: the UPDATE is conditioned on the snapshot's version stamp
/// and bumps it. Returns false (nothing written) on a version mismatch.
pub fn store_debt_account_if_version(conn: &Connection, account: &DebtAccount) -> Result<bool> {
    let now = chrono::Utc::now().timestamp();
    let tx = conn.unchecked_transaction()?;

    let affected = tx.execute(
        "UPDATE debts SET debtor_name = ?2, total_cents = ?3, version = ?4, updated_at = ?5 WHERE id = ?1 AND version = ?6",
        params![
            &account.id,
            &account.debtor_name,
            account.total_cents,
            account.version + 1,
            now,
            account.version,
        ],
    )?;

    if affected == 0 {
        log::warn!(
            "stale write on debt account {} (version {})",
            account.id,
            account.version
        );
        return Ok(false);
    }

    tx.execute("DELETE FROM debt_items WHERE debt_id = ?1", params![&account.id])?;
    for item in &account.items {
        tx.execute(
            "INSERT INTO debt_items (debt_id, item_id, name, unit_price_cents, quantity, outstanding_cents, loan_date) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                &account.id,
                item.item_id,
                &item.name,
                item.unit_price_cents,
                item.quantity,
                item.outstanding_cents,
                &item.loan_date,
            ],
        )?;
    }

    tx.commit()?;
    Ok(true)
}

pub fn count_debt_accounts(conn: &Connection) -> Result<usize> {
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM debts", [], |row| row.get(0))?;
    Ok(count as usize)
}

pub fn count_products(conn: &Connection) -> Result<usize> {
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM products", [], |row| row.get(0))?;
    Ok(count as usize)
}

pub fn count_pending_orders(conn: &Connection) -> Result<usize> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM orders WHERE delivered = 0",
        [],
        |row| row.get(0),
    )?;
    Ok(count as usize)
}

// ---------------------------------------------------------------------------
// Product catalog

pub fn load_catalog_product(conn: &Connection, id: &str) -> Result<Option<CatalogProduct>> {
    conn.query_row(
        "SELECT id, name, price_cents, image_url, created_at FROM products WHERE id = ?1",
        params![id],
        |row| {
            Ok(CatalogProduct {
                id: row.get(0)?,
                name: row.get(1)?,
                price_cents: row.get(2)?,
                image_url: row.get(3)?,
                created_at: row.get(4)?,
            })
        },
    )
    .optional()
}

fn load_products(conn: &Connection) -> Result<Vec<CatalogProduct>> {
    let mut stmt = conn.prepare(
        "SELECT id, name, price_cents, image_url, created_at FROM products ORDER BY name COLLATE NOCASE ASC",
    )?;

    let products = stmt
        .query_map([], |row| {
            Ok(CatalogProduct {
                id: row.get(0)?,
                name: row.get(1)?,
                price_cents: row.get(2)?,
                image_url: row.get(3)?,
                created_at: row.get(4)?,
            })
        })?
        .filter_map(|r| r.ok())
        .collect();

    Ok(products)
}

#[tauri::command]
pub async fn product_crud(
    shop_path: String,
    operation: String,
    item: Option<ProductDraft>,
    id: Option<String>,
    app: tauri::AppHandle,
) -> std::result::Result<serde_json::Value, String> {
    let result = product_crud_internal(&shop_path, &operation, item, id)?;
    if matches!(operation.as_str(), "create" | "update" | "delete") {
        let _ = app.emit("products_changed", serde_json::json!({ "operation": operation }));
    }
    Ok(result)
}

pub fn product_crud_internal(
    shop_path: &str,
    operation: &str,
    item: Option<ProductDraft>,
    id: Option<String>,
) -> std::result::Result<serde_json::Value, String> {
    let conn = get_db_connection(shop_path).map_err(|e| format!("DB error: {e}"))?;

    match operation {
        "create" => {
            let draft = item.ok_or("Item required for create")?;
            if draft.name.trim().is_empty() {
                return Err("Product name is required".to_string());
            }
            let price_cents = money::parse_amount(&draft.price).map_err(|e| e.to_string())?;

            let product = CatalogProduct {
                id: uuid::Uuid::new_v4().to_string(),
                name: draft.name.trim().to_string(),
                price_cents,
                image_url: draft.image_url,
                created_at: chrono::Utc::now().timestamp(),
            };

            conn.execute(
                "INSERT INTO products (id, name, price_cents, image_url, created_at) VALUES (?1, ?2, ?3, ?4, ?5)",
                params![&product.id, &product.name, product.price_cents, product.image_url.as_deref(), product.created_at],
            )
            .map_err(|e| format!("Insert error: {e}"))?;
            Ok(serde_json::json!({"status": "created", "id": product.id}))
        }
        "update" => {
            let draft = item.ok_or("Item required for update")?;
            let id = draft.id.clone().ok_or("Item id required for update")?;
            if draft.name.trim().is_empty() {
                return Err("Product name is required".to_string());
            }
            let price_cents = money::parse_amount(&draft.price).map_err(|e| e.to_string())?;

            let affected = conn
                .execute(
                    "UPDATE products SET name = ?2, price_cents = ?3, image_url = ?4 WHERE id = ?1",
                    params![&id, draft.name.trim(), price_cents, draft.image_url.as_deref()],
                )
                .map_err(|e| format!("Update error: {e}"))?;
            if affected == 0 {
                return Err(format!("Unknown product: {id}"));
            }
            Ok(serde_json::json!({"status": "updated", "id": id}))
        }
        "read" => {
            let id = id.ok_or("ID required for read")?;
            let product = load_catalog_product(&conn, &id).map_err(|e| format!("Read error: {e}"))?;
            Ok(serde_json::to_value(product).unwrap_or(serde_json::Value::Null))
        }
        "list" => {
            let products = load_products(&conn).map_err(|e| format!("Query error: {e}"))?;
            Ok(serde_json::to_value(products).unwrap_or_default())
        }
        "delete" => {
            let id = id.ok_or("ID required for delete")?;
            conn.execute("DELETE FROM products WHERE id = ?1", params![id])
                .map_err(|e| format!("Delete error: {e}"))?;
            Ok(serde_json::json!({"status": "deleted"}))
        }
        _ => Err(format!("Unknown operation: {operation}")),
    }
}

// ---------------------------------------------------------------------------
// Supplier orders

fn load_order_lines(conn: &Connection, order_id: &str) -> Result<Vec<OrderLine>> {
    let mut stmt = conn.prepare(
        "SELECT id, name, unit_price_cents, quantity FROM order_lines WHERE order_id = ?1",
    )?;
    let lines = stmt
        .query_map(params![order_id], |row| {
            Ok(OrderLine {
                id: row.get(0)?,
                name: row.get(1)?,
                unit_price_cents: row.get(2)?,
                quantity: row.get(3)?,
            })
        })?
        .filter_map(|r| r.ok())
        .collect();
    Ok(lines)
}

fn load_order(conn: &Connection, id: &str) -> Result<Option<SupplierOrder>> {
    let header = conn
        .query_row(
            "SELECT id, supplier, order_date, delivered, created_at FROM orders WHERE id = ?1",
            params![id],
            |row| {
                Ok(SupplierOrder {
                    id: row.get(0)?,
                    supplier: row.get(1)?,
                    order_date: row.get(2)?,
                    delivered: row.get::<_, i64>(3)? != 0,
                    lines: Vec::new(),
                    created_at: row.get(4)?,
                })
            },
        )
        .optional()?;

    let Some(mut order) = header else {
        return Ok(None);
    };
    order.lines = load_order_lines(conn, id)?;
    Ok(Some(order))
}

fn parse_order_lines(drafts: Vec<OrderLineDraft>) -> std::result::Result<Vec<OrderLine>, String> {
    let mut lines = Vec::with_capacity(drafts.len());
    for draft in drafts {
        if draft.name.trim().is_empty() {
            return Err("Order line name is required".to_string());
        }
        let unit_price_cents = money::parse_amount(&draft.unit_price).map_err(|e| e.to_string())?;
        let quantity = money::parse_quantity(&draft.quantity).map_err(|e| e.to_string())?;
        lines.push(OrderLine {
            id: draft.id.unwrap_or_else(|| uuid::Uuid::new_v4().to_string()),
            name: draft.name.trim().to_string(),
            unit_price_cents,
            quantity,
        });
    }
    Ok(lines)
}

fn replace_order_lines(conn: &Connection, order_id: &str, lines: &[OrderLine]) -> Result<()> {
    conn.execute("DELETE FROM order_lines WHERE order_id = ?1", params![order_id])?;
    for line in lines {
        conn.execute(
            "INSERT INTO order_lines (id, order_id, name, unit_price_cents, quantity) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![&line.id, order_id, &line.name, line.unit_price_cents, line.quantity],
        )?;
    }
    Ok(())
}

#[tauri::command]
pub async fn order_crud(
    shop_path: String,
    operation: String,
    item: Option<OrderDraft>,
    id: Option<String>,
    app: tauri::AppHandle,
) -> std::result::Result<serde_json::Value, String> {
    let result = order_crud_internal(&shop_path, &operation, item, id)?;
    if matches!(operation.as_str(), "create" | "update" | "delete") {
        let _ = app.emit("orders_changed", serde_json::json!({ "operation": operation }));
    }
    Ok(result)
}

pub fn order_crud_internal(
    shop_path: &str,
    operation: &str,
    item: Option<OrderDraft>,
    id: Option<String>,
) -> std::result::Result<serde_json::Value, String> {
    let conn = get_db_connection(shop_path).map_err(|e| format!("DB error: {e}"))?;

    match operation {
        "create" => {
            let draft = item.ok_or("Item required for create")?;
            if draft.supplier.trim().is_empty() {
                return Err("Supplier name is required".to_string());
            }
            let lines = parse_order_lines(draft.lines)?;

            let order = SupplierOrder {
                id: uuid::Uuid::new_v4().to_string(),
                supplier: draft.supplier.trim().to_string(),
                order_date: if draft.order_date.trim().is_empty() {
                    chrono::Utc::now().date_naive().to_string()
                } else {
                    draft.order_date.trim().to_string()
                },
                delivered: draft.delivered,
                lines,
                created_at: chrono::Utc::now().timestamp(),
            };

            let tx = conn.unchecked_transaction().map_err(|e| format!("DB error: {e}"))?;
            tx.execute(
                "INSERT INTO orders (id, supplier, order_date, delivered, created_at) VALUES (?1, ?2, ?3, ?4, ?5)",
                params![&order.id, &order.supplier, &order.order_date, order.delivered as i64, order.created_at],
            )
            .map_err(|e| format!("Insert error: {e}"))?;
            replace_order_lines(&tx, &order.id, &order.lines)
                .map_err(|e| format!("Insert error: {e}"))?;
            tx.commit().map_err(|e| format!("DB error: {e}"))?;

            Ok(serde_json::json!({"status": "created", "id": order.id}))
        }
        "update" => {
            let draft = item.ok_or("Item required for update")?;
            let id = draft.id.clone().ok_or("Item id required for update")?;
            if draft.supplier.trim().is_empty() {
                return Err("Supplier name is required".to_string());
            }
            let lines = parse_order_lines(draft.lines)?;

            let tx = conn.unchecked_transaction().map_err(|e| format!("DB error: {e}"))?;
            let affected = tx
                .execute(
                    "UPDATE orders SET supplier = ?2, order_date = ?3, delivered = ?4 WHERE id = ?1",
                    params![&id, draft.supplier.trim(), draft.order_date.trim(), draft.delivered as i64],
                )
                .map_err(|e| format!("Update error: {e}"))?;
            if affected == 0 {
                return Err(format!("Unknown order: {id}"));
            }
            replace_order_lines(&tx, &id, &lines).map_err(|e| format!("Update error: {e}"))?;
            tx.commit().map_err(|e| format!("DB error: {e}"))?;

            Ok(serde_json::json!({"status": "updated", "id": id}))
        }
        "read" => {
            let id = id.ok_or("ID required for read")?;
            let order = load_order(&conn, &id).map_err(|e| format!("Read error: {e}"))?;
            Ok(serde_json::to_value(order).unwrap_or(serde_json::Value::Null))
        }
        "list" => {
            let mut stmt = conn
                .prepare("SELECT id FROM orders ORDER BY created_at DESC")
                .map_err(|e| format!("Query error: {e}"))?;
            let ids: Vec<String> = stmt
                .query_map([], |row| row.get::<_, String>(0))
                .map_err(|e| format!("Query error: {e}"))?
                .filter_map(|r| r.ok())
                .collect();

            let mut orders = Vec::with_capacity(ids.len());
            for order_id in ids {
                if let Some(order) =
                    load_order(&conn, &order_id).map_err(|e| format!("Read error: {e}"))?
                {
                    orders.push(order);
                }
            }
            Ok(serde_json::to_value(orders).unwrap_or_default())
        }
        "delete" => {
            let id = id.ok_or("ID required for delete")?;
            conn.execute("DELETE FROM orders WHERE id = ?1", params![id])
                .map_err(|e| format!("Delete error: {e}"))?;
            Ok(serde_json::json!({"status": "deleted"}))
        }
        _ => Err(format!("Unknown operation: {operation}")),
    }
}

#[tauri::command]
pub async fn set_order_delivered(
    shop_path: String,
    id: String,
    delivered: bool,
    app: tauri::AppHandle,
) -> std::result::Result<serde_json::Value, String> {
    let result = set_order_delivered_internal(&shop_path, &id, delivered)?;
    let _ = app.emit(
        "orders_changed",
        serde_json::json!({ "operation": "delivered", "id": id }),
    );
    Ok(result)
}

pub fn set_order_delivered_internal(
    shop_path: &str,
    id: &str,
    delivered: bool,
) -> std::result::Result<serde_json::Value, String> {
    let conn = get_db_connection(shop_path).map_err(|e| format!("DB error: {e}"))?;

    let affected = conn
        .execute(
            "UPDATE orders SET delivered = ?2 WHERE id = ?1",
            params![id, delivered as i64],
        )
        .map_err(|e| format!("Update error: {e}"))?;
    if affected == 0 {
        return Err(format!("Unknown order: {id}"));
    }

    Ok(serde_json::json!({"status": "updated", "id": id, "delivered": delivered}))
}

// ---------------------------------------------------------------------------
// Wanted products (shopping list)

#[tauri::command]
pub async fn wanted_crud(
    shop_path: String,
    operation: String,
    item: Option<WantedDraft>,
    id: Option<String>,
    app: tauri::AppHandle,
) -> std::result::Result<serde_json::Value, String> {
    let result = wanted_crud_internal(&shop_path, &operation, item, id)?;
    if matches!(operation.as_str(), "add" | "remove") {
        let _ = app.emit("orders_changed", serde_json::json!({ "operation": operation }));
    }
    Ok(result)
}

pub fn wanted_crud_internal(
    shop_path: &str,
    operation: &str,
    item: Option<WantedDraft>,
    id: Option<String>,
) -> std::result::Result<serde_json::Value, String> {
    let conn = get_db_connection(shop_path).map_err(|e| format!("DB error: {e}"))?;

    match operation {
        "list" => {
            let mut stmt = conn
                .prepare("SELECT id, name, quantity, created_at FROM wanted_items ORDER BY created_at ASC")
                .map_err(|e| format!("Query error: {e}"))?;
            let items: Vec<WantedItem> = stmt
                .query_map([], |row| {
                    Ok(WantedItem {
                        id: row.get(0)?,
                        name: row.get(1)?,
                        quantity: row.get(2)?,
                        created_at: row.get(3)?,
                    })
                })
                .map_err(|e| format!("Query error: {e}"))?
                .filter_map(|r| r.ok())
                .collect();
            Ok(serde_json::to_value(items).unwrap_or_default())
        }
        "add" => {
            let draft = item.ok_or("Item required for add")?;
            if draft.name.trim().is_empty() {
                return Err("Product name is required".to_string());
            }
            let quantity = money::parse_quantity(&draft.quantity).map_err(|e| e.to_string())?;

            let wanted = WantedItem {
                id: uuid::Uuid::new_v4().to_string(),
                name: draft.name.trim().to_string(),
                quantity,
                created_at: chrono::Utc::now().timestamp(),
            };
            conn.execute(
                "INSERT INTO wanted_items (id, name, quantity, created_at) VALUES (?1, ?2, ?3, ?4)",
                params![&wanted.id, &wanted.name, wanted.quantity, wanted.created_at],
            )
            .map_err(|e| format!("Insert error: {e}"))?;
            Ok(serde_json::json!({"status": "added", "id": wanted.id}))
        }
        "remove" => {
            let id = id.ok_or("ID required for remove")?;
            conn.execute("DELETE FROM wanted_items WHERE id = ?1", params![id])
                .map_err(|e| format!("Delete error: {e}"))?;
            Ok(serde_json::json!({"status": "removed"}))
        }
        _ => Err(format!("Unknown operation: {operation}")),
    }
}
