use serde_json::{json, Map, Value};
use std::fs;
use std::path::{Path, PathBuf};

const SETTINGS_SCHEMA_VERSION: i64 = 2;

#[tauri::command]
pub async fn get_settings(shop_path: String) -> Result<Value, String> {
    load_settings_from_disk(&shop_path)
}

#[tauri::command]
pub async fn save_settings(shop_path: String, settings: Value) -> Result<Value, String> {
    save_settings_to_disk(&shop_path, settings)
}

pub fn load_settings_from_disk(shop_path: &str) -> Result<Value, String> {
    let path = settings_path(shop_path);
    ensure_fiado_dir(shop_path)?;

    let original = if path.exists() {
        let raw = fs::read_to_string(&path)
            .map_err(|e| format!("Failed to read settings.json: {e}"))?;
        serde_json::from_str::<Value>(&raw).unwrap_or_else(|_| json!({}))
    } else {
        json!({})
    };

    let migrated = migrate_settings(original.clone());
    if migrated != original || !path.exists() {
        write_settings_file(&path, &migrated)?;
    }

    Ok(migrated)
}

pub fn save_settings_to_disk(shop_path: &str, settings: Value) -> Result<Value, String> {
    let path = settings_path(shop_path);
    ensure_fiado_dir(shop_path)?;

    let mut merged = load_settings_from_disk(shop_path).unwrap_or_else(|_| default_settings());
    merge_settings(&mut merged, &settings);

    let migrated = migrate_settings(merged);
    write_settings_file(&path, &migrated)?;
    Ok(migrated)
}

fn settings_path(shop_path: &str) -> PathBuf {
    Path::new(shop_path).join(".fiado").join("settings.json")
}

fn ensure_fiado_dir(shop_path: &str) -> Result<(), String> {
    let dir = Path::new(shop_path).join(".fiado");
    fs::create_dir_all(&dir).map_err(|e| format!("Failed to create .fiado directory: {e}"))
}

fn write_settings_file(path: &Path, settings: &Value) -> Result<(), String> {
    let raw = serde_json::to_string_pretty(settings)
        .map_err(|e| format!("Failed to serialize settings: {e}"))?;
    fs::write(path, raw).map_err(|e| format!("Failed to write settings.json: {e}"))
}

fn migrate_settings(input: Value) -> Value {
    let defaults = default_settings();
    let mut out = match input {
        Value::Object(map) => Value::Object(map),
        _ => Value::Object(Map::new()),
    };

    let version = out
        .get("schema_version")
        .and_then(Value::as_i64)
        .unwrap_or(0);

    if version < 1 {
        // V0 stored a single "currency" string; carry it into the symbol key.
        migrate_legacy_currency(&mut out);
    }

    deep_merge_defaults(&mut out, &defaults);

    if version < 2 {
        // V2 introduces receipt/export keys with explicit defaults.
        ensure_key(&mut out, "currencyCode", json!("MXN"));
        ensure_key(&mut out, "receiptFooter", json!("Gracias por su compra"));
    }

    sanitize_settings(&mut out);
    if let Some(obj) = out.as_object_mut() {
        obj.insert("schema_version".to_string(), json!(SETTINGS_SCHEMA_VERSION));
    }

    out
}

fn default_settings() -> Value {
    json!({
        "schema_version": SETTINGS_SCHEMA_VERSION,
        "currencySymbol": "$",
        "currencyCode": "MXN",
        "dateFormat": "iso",
        "defaultQuantity": 1,
        "notificationsEnabled": true,
        "receiptFooter": "Gracias por su compra"
    })
}

fn deep_merge_defaults(target: &mut Value, defaults: &Value) {
    let (Some(target_obj), Some(default_obj)) = (target.as_object_mut(), defaults.as_object())
    else {
        return;
    };

    for (key, default_value) in default_obj {
        match target_obj.get_mut(key) {
            Some(existing) => {
                if existing.is_object() && default_value.is_object() {
                    deep_merge_defaults(existing, default_value);
                }
            }
            None => {
                target_obj.insert(key.clone(), default_value.clone());
            }
        }
    }
}

fn ensure_key(target: &mut Value, key: &str, value: Value) {
    if let Some(obj) = target.as_object_mut() {
        obj.entry(key.to_string()).or_insert(value);
    }
}

fn merge_settings(target: &mut Value, incoming: &Value) {
    match (target, incoming) {
        (Value::Object(target_obj), Value::Object(incoming_obj)) => {
            for (key, value) in incoming_obj {
                if let Some(existing) = target_obj.get_mut(key) {
                    merge_settings(existing, value);
                } else {
                    target_obj.insert(key.clone(), value.clone());
                }
            }
        }
        (target_slot, incoming_value) => {
            *target_slot = incoming_value.clone();
        }
    }
}

fn migrate_legacy_currency(settings: &mut Value) {
    let Some(obj) = settings.as_object_mut() else {
        return;
    };

    if let Some(legacy) = obj.remove("currency").and_then(|v| v.as_str().map(String::from)) {
        obj.entry("currencySymbol".to_string())
            .or_insert_with(|| json!(legacy));
    }
}

fn sanitize_settings(settings: &mut Value) {
    let Some(obj) = settings.as_object_mut() else {
        return;
    };

    clamp_u64(obj, "defaultQuantity", 1, 999, 1);

    sanitize_enum(obj, "dateFormat", &["iso", "latam"], "iso");

    ensure_bool(obj, "notificationsEnabled", true);

    ensure_nonempty_string(obj, "currencySymbol", "$");
    ensure_nonempty_string(obj, "currencyCode", "MXN");

    // The footer may legitimately be blank; only coerce the type.
    if !obj.get("receiptFooter").map(Value::is_string).unwrap_or(false) {
        obj.insert("receiptFooter".to_string(), json!("Gracias por su compra"));
    }
}

fn clamp_u64(map: &mut Map<String, Value>, key: &str, min: u64, max: u64, default: u64) {
    let raw = map.get(key).and_then(Value::as_u64).unwrap_or(default);
    map.insert(key.to_string(), json!(raw.clamp(min, max)));
}

fn sanitize_enum(map: &mut Map<String, Value>, key: &str, allowed: &[&str], default: &str) {
    let valid = map
        .get(key)
        .and_then(Value::as_str)
        .filter(|value| allowed.contains(value))
        .unwrap_or(default);
    map.insert(key.to_string(), json!(valid));
}

fn ensure_bool(map: &mut Map<String, Value>, key: &str, default: bool) {
    let value = map.get(key).and_then(Value::as_bool).unwrap_or(default);
    map.insert(key.to_string(), json!(value));
}

fn ensure_nonempty_string(map: &mut Map<String, Value>, key: &str, default: &str) {
    let value = map
        .get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
        .unwrap_or(default)
        .to_string();
    map.insert(key.to_string(), json!(value));
}
