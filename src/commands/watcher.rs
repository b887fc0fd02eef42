use notify::RecursiveMode;
use notify_debouncer_mini::new_debouncer;
use std::path::Path;
use std::time::Duration;
use tauri::Emitter;

/// Watch the shop's `.fiado` directory and tell the frontend when another
/// process touches the ledger, so open screens can re-query.
#[tauri::command]
pub async fn start_ledger_watcher(
    shop_path: String,
    app: tauri::AppHandle,
) -> Result<(), String> {
    let watch_dir = Path::new(&shop_path).join(".fiado");
    if !watch_dir.exists() {
        return Err("PATH_NOT_FOUND: Shop has not been opened yet".to_string());
    }

    let app_handle = app.clone();
    let (tx, rx) = std::sync::mpsc::channel();

    let mut debouncer = new_debouncer(Duration::from_millis(500), move |res| {
        let _ = tx.send(res);
    })
    .map_err(|e| format!("Watcher init error: {}", e))?;

    debouncer
        .watcher()
        .watch(&watch_dir, RecursiveMode::NonRecursive)
        .map_err(|e| format!("Watch error: {}", e))?;

    // Forward debounced batches until the channel closes.
    std::thread::spawn(move || {
        let _debouncer = debouncer; // Keep watcher alive
        for res in rx {
            match res {
                Ok(events) => {
                    let ledger_touched = events.iter().any(|event| {
                        event
                            .path
                            .file_name()
                            .map(|name| name.to_string_lossy().starts_with("ledger.db"))
                            .unwrap_or(false)
                    });
                    if ledger_touched {
                        let _ = app_handle.emit("ledger_changed", serde_json::json!({}));
                    }
                }
                Err(e) => {
                    log::warn!("ledger watcher error: {e:?}");
                }
            }
        }
    });

    Ok(())
}
