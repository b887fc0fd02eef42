use crate::models::shop::ShopMeta;
use std::fs;
use std::path::Path;

#[tauri::command]
pub async fn open_shop(path: String) -> Result<ShopMeta, String> {
    open_shop_internal(&path)
}

pub fn open_shop_internal(path: &str) -> Result<ShopMeta, String> {
    let shop_path = Path::new(path);

    if !shop_path.exists() {
        return Err("PATH_NOT_FOUND: Directory does not exist".to_string());
    }

    // Create the .fiado data directory
    let fiado_dir = shop_path.join(".fiado");
    fs::create_dir_all(&fiado_dir)
        .map_err(|e| format!("INIT_FAILED: Could not create .fiado directory: {}", e))?;

    // Initialize the SQLite ledger with migrations.
    let conn = crate::commands::db::get_db_connection(path)
        .map_err(|e| format!("INIT_FAILED: Could not initialize ledger database: {}", e))?;

    // Initialize settings file with defaults/migrations.
    crate::commands::settings::load_settings_from_disk(path)
        .map_err(|e| format!("INIT_FAILED: Could not initialize settings: {}", e))?;

    let shop_name = shop_path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "unknown".to_string());

    let product_count = crate::commands::db::count_products(&conn)
        .map_err(|e| format!("DB error: {e}"))?;
    let debtor_count = crate::commands::db::count_debt_accounts(&conn)
        .map_err(|e| format!("DB error: {e}"))?;
    let pending_order_count = crate::commands::db::count_pending_orders(&conn)
        .map_err(|e| format!("DB error: {e}"))?;

    Ok(ShopMeta {
        path: path.to_string(),
        shop_name,
        product_count,
        debtor_count,
        pending_order_count,
    })
}
