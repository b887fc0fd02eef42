pub mod commands;
pub mod ledger;
pub mod models;

use commands::{
    db::{order_crud, product_crud, set_order_delivered, wanted_crud},
    debts::{
        add_loan_item, apply_payment, create_debt_account, delete_loan_item, edit_loan_item,
        get_debt_account, list_debt_accounts,
    },
    export::export_debt_statement,
    settings::{get_settings, save_settings},
    shop::open_shop,
    watcher::start_ledger_watcher,
};

#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    let _ = env_logger::try_init();

    tauri::Builder::default()
        .plugin(tauri_plugin_opener::init())
        .plugin(tauri_plugin_dialog::init())
        .invoke_handler(tauri::generate_handler![
            open_shop,
            list_debt_accounts,
            create_debt_account,
            get_debt_account,
            add_loan_item,
            apply_payment,
            edit_loan_item,
            delete_loan_item,
            product_crud,
            order_crud,
            set_order_delivered,
            wanted_crud,
            get_settings,
            save_settings,
            export_debt_statement,
            start_ledger_watcher,
        ])
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}
