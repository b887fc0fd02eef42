use fiado_lib::commands::db::{
    order_crud_internal, product_crud_internal, set_order_delivered_internal, wanted_crud_internal,
};
use fiado_lib::commands::debts::{
    add_loan_item_internal, apply_payment_internal, create_debt_account_internal,
    delete_loan_item_internal, edit_loan_item_internal, get_debt_account_internal,
    list_debt_accounts_internal,
};
use fiado_lib::commands::export::export_debt_statement_internal;
use fiado_lib::commands::settings::{get_settings, save_settings};
use fiado_lib::commands::shop::open_shop_internal;
use fiado_lib::models::order::{OrderDraft, OrderLineDraft, WantedDraft};
use fiado_lib::models::product::ProductDraft;
use serde_json::json;
use std::fs;
use tempfile::TempDir;

fn create_shop() -> (TempDir, String) {
    let temp_dir = tempfile::tempdir().expect("create temp dir");
    let shop_path = temp_dir.path().to_string_lossy().to_string();
    open_shop_internal(&shop_path).expect("open shop");
    (temp_dir, shop_path)
}

fn create_product(shop_path: &str, name: &str, price: &str) -> String {
    let created = product_crud_internal(
        shop_path,
        "create",
        Some(ProductDraft {
            id: None,
            name: name.to_string(),
            price: price.to_string(),
            image_url: None,
        }),
        None,
    )
    .expect("create product");
    created["id"].as_str().expect("product id").to_string()
}

#[tokio::test]
async fn open_shop_returns_expected_metadata_contract() {
    let (_tmp, shop_path) = create_shop();

    create_product(&shop_path, "Milk", "18.00");
    create_debt_account_internal(&shop_path, "Maria").expect("create account");

    let meta = open_shop_internal(&shop_path).expect("reopen shop");

    assert_eq!(meta.path, shop_path);
    assert!(!meta.shop_name.is_empty());
    assert_eq!(meta.product_count, 1);
    assert_eq!(meta.debtor_count, 1);
    assert_eq!(meta.pending_order_count, 0);
}

#[tokio::test]
async fn open_shop_rejects_missing_directory() {
    let err = open_shop_internal("/definitely/not/a/real/path").unwrap_err();
    assert!(err.starts_with("PATH_NOT_FOUND"));
}

#[tokio::test]
async fn settings_commands_round_trip_and_merge_partial_updates() {
    let (_tmp, shop_path) = create_shop();

    let initial = get_settings(shop_path.clone()).await.expect("load settings");
    assert_eq!(initial["currencySymbol"], json!("$"));

    let saved = save_settings(
        shop_path.clone(),
        json!({
            "currencySymbol": "Bs",
            "defaultQuantity": 2,
            "notificationsEnabled": false
        }),
    )
    .await
    .expect("save settings");

    assert_eq!(saved["currencySymbol"], json!("Bs"));
    assert_eq!(saved["defaultQuantity"], json!(2));
    assert_eq!(saved["notificationsEnabled"], json!(false));
    assert_eq!(saved["dateFormat"], initial["dateFormat"]);
}

#[tokio::test]
async fn product_commands_support_full_crud_contract() {
    let (_tmp, shop_path) = create_shop();

    let id = create_product(&shop_path, "Rice", "25.50");

    let read = product_crud_internal(&shop_path, "read", None, Some(id.clone()))
        .expect("read product");
    assert_eq!(read["name"], json!("Rice"));
    assert_eq!(read["price_cents"], json!(2550));

    let updated = product_crud_internal(
        &shop_path,
        "update",
        Some(ProductDraft {
            id: Some(id.clone()),
            name: "Rice 1kg".to_string(),
            price: "27".to_string(),
            image_url: Some("https://img.example/rice.jpg".to_string()),
        }),
        None,
    )
    .expect("update product");
    assert_eq!(updated["status"], json!("updated"));

    let listed = product_crud_internal(&shop_path, "list", None, None).expect("list products");
    let products = listed.as_array().expect("product list array");
    assert_eq!(products.len(), 1);
    assert_eq!(products[0]["price_cents"], json!(2700));
    assert_eq!(products[0]["image_url"], json!("https://img.example/rice.jpg"));

    let deleted = product_crud_internal(&shop_path, "delete", None, Some(id))
        .expect("delete product");
    assert_eq!(deleted["status"], json!("deleted"));

    let listed = product_crud_internal(&shop_path, "list", None, None).expect("list products");
    assert!(listed.as_array().expect("product list array").is_empty());
}

#[tokio::test]
async fn product_create_rejects_bad_input() {
    let (_tmp, shop_path) = create_shop();

    let blank_name = product_crud_internal(
        &shop_path,
        "create",
        Some(ProductDraft {
            id: None,
            name: "  ".to_string(),
            price: "10".to_string(),
            image_url: None,
        }),
        None,
    );
    assert!(blank_name.is_err());

    let bad_price = product_crud_internal(
        &shop_path,
        "create",
        Some(ProductDraft {
            id: None,
            name: "Milk".to_string(),
            price: "cheap".to_string(),
            image_url: None,
        }),
        None,
    );
    assert!(bad_price.unwrap_err().contains("Invalid amount"));
}

#[tokio::test]
async fn debt_payment_walks_items_oldest_first() {
    let (_tmp, shop_path) = create_shop();

    let soap = create_product(&shop_path, "Soap", "30.00");
    let sugar = create_product(&shop_path, "Sugar", "20.00");
    let oil = create_product(&shop_path, "Oil", "50.00");

    let account = create_debt_account_internal(&shop_path, "Maria").expect("create account");
    assert_eq!(account.total_cents, 0);
    assert!(account.items.is_empty());

    add_loan_item_internal(&shop_path, &account.id, &soap, "1").expect("loan soap");
    add_loan_item_internal(&shop_path, &account.id, &sugar, "1").expect("loan sugar");
    let loaded = add_loan_item_internal(&shop_path, &account.id, &oil, "1").expect("loan oil");
    assert_eq!(loaded.total_cents, 10000);
    assert_eq!(loaded.items.len(), 3);

    // 40 against [30, 20, 50]: soap settles, sugar drops to 10, oil untouched.
    let paid = apply_payment_internal(&shop_path, &account.id, "40.00").expect("apply payment");
    assert_eq!(paid.total_cents, 6000);
    assert_eq!(paid.items.len(), 2);
    assert_eq!(paid.items[0].name, "Sugar");
    assert_eq!(paid.items[0].outstanding_cents, 1000);
    assert_eq!(paid.items[1].name, "Oil");
    assert_eq!(paid.items[1].outstanding_cents, 5000);

    // Overpay the rest: everything settles, excess is discarded.
    let cleared = apply_payment_internal(&shop_path, &account.id, "150.00").expect("overpay");
    assert_eq!(cleared.total_cents, 0);
    assert!(cleared.items.is_empty());

    let summaries = list_debt_accounts_internal(&shop_path).expect("list accounts");
    assert_eq!(summaries.len(), 1);
    assert_eq!(summaries[0].total_cents, 0);
}

#[tokio::test]
async fn invalid_payments_leave_the_account_untouched() {
    let (_tmp, shop_path) = create_shop();

    let soap = create_product(&shop_path, "Soap", "30.00");
    let account = create_debt_account_internal(&shop_path, "Pedro").expect("create account");
    add_loan_item_internal(&shop_path, &account.id, &soap, "2").expect("loan soap");

    let before = get_debt_account_internal(&shop_path, &account.id).expect("load account");

    for amount in ["", "0", "-5", "abc", "1.2.3"] {
        let err = apply_payment_internal(&shop_path, &account.id, amount).unwrap_err();
        assert!(
            err.to_string().contains("Invalid amount"),
            "unexpected error for {amount:?}: {err}"
        );
    }

    let after = get_debt_account_internal(&shop_path, &account.id).expect("reload account");
    assert_eq!(after, before);
}

#[tokio::test]
async fn edit_and_delete_loan_items_recompute_totals() {
    let (_tmp, shop_path) = create_shop();

    let soap = create_product(&shop_path, "Soap", "30.00");
    let sugar = create_product(&shop_path, "Sugar", "20.00");

    let account = create_debt_account_internal(&shop_path, "Lucia").expect("create account");
    let with_soap = add_loan_item_internal(&shop_path, &account.id, &soap, "1").expect("loan soap");
    let soap_item = with_soap.items[0].item_id;
    add_loan_item_internal(&shop_path, &account.id, &sugar, "1").expect("loan sugar");

    // Partially pay, then edit the paid item: the edit recomputes its
    // outstanding from quantity x price, discarding the partial payment.
    apply_payment_internal(&shop_path, &account.id, "10.00").expect("partial payment");
    let edited = edit_loan_item_internal(&shop_path, &account.id, soap_item, "Soap", "1", "30.00")
        .expect("edit item");
    assert_eq!(edited.total_cents, 5000);

    let removed = delete_loan_item_internal(&shop_path, &account.id, soap_item).expect("delete item");
    assert_eq!(removed.items.len(), 1);
    assert_eq!(removed.total_cents, 2000);

    // Unknown ids error without changing anything; the empty account case
    // degrades the same way.
    let err = delete_loan_item_internal(&shop_path, &account.id, soap_item).unwrap_err();
    assert!(err.to_string().contains("not part of this account"));
    let still = get_debt_account_internal(&shop_path, &account.id).expect("reload account");
    assert_eq!(still.items.len(), 1);
}

#[tokio::test]
async fn create_debt_account_rejects_blank_names() {
    let (_tmp, shop_path) = create_shop();
    let err = create_debt_account_internal(&shop_path, "   ").unwrap_err();
    assert!(err.to_string().contains("Debtor name"));
    assert!(list_debt_accounts_internal(&shop_path)
        .expect("list accounts")
        .is_empty());
}

#[tokio::test]
async fn order_commands_support_crud_and_delivery_toggle() {
    let (_tmp, shop_path) = create_shop();

    let created = order_crud_internal(
        &shop_path,
        "create",
        Some(OrderDraft {
            id: None,
            supplier: "Distribuidora Norte".to_string(),
            order_date: "2026-08-06".to_string(),
            delivered: false,
            lines: vec![
                OrderLineDraft {
                    id: None,
                    name: "Flour".to_string(),
                    unit_price: "12.00".to_string(),
                    quantity: "10".to_string(),
                },
                OrderLineDraft {
                    id: None,
                    name: "Salt".to_string(),
                    unit_price: "4.50".to_string(),
                    quantity: "5".to_string(),
                },
            ],
        }),
        None,
    )
    .expect("create order");
    let order_id = created["id"].as_str().expect("order id").to_string();

    let read = order_crud_internal(&shop_path, "read", None, Some(order_id.clone()))
        .expect("read order");
    assert_eq!(read["supplier"], json!("Distribuidora Norte"));
    assert_eq!(read["delivered"], json!(false));
    assert_eq!(read["lines"].as_array().expect("lines").len(), 2);

    let toggled = set_order_delivered_internal(&shop_path, &order_id, true).expect("toggle order");
    assert_eq!(toggled["delivered"], json!(true));

    let meta = open_shop_internal(&shop_path).expect("reopen shop");
    assert_eq!(meta.pending_order_count, 0);

    // Updating replaces the whole line set.
    let updated = order_crud_internal(
        &shop_path,
        "update",
        Some(OrderDraft {
            id: Some(order_id.clone()),
            supplier: "Distribuidora Norte".to_string(),
            order_date: "2026-08-06".to_string(),
            delivered: true,
            lines: vec![OrderLineDraft {
                id: None,
                name: "Flour".to_string(),
                unit_price: "11.00".to_string(),
                quantity: "8".to_string(),
            }],
        }),
        None,
    )
    .expect("update order");
    assert_eq!(updated["status"], json!("updated"));

    let read = order_crud_internal(&shop_path, "read", None, Some(order_id.clone()))
        .expect("reread order");
    let lines = read["lines"].as_array().expect("lines");
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0]["unit_price_cents"], json!(1100));

    let deleted = order_crud_internal(&shop_path, "delete", None, Some(order_id))
        .expect("delete order");
    assert_eq!(deleted["status"], json!("deleted"));
    let listed = order_crud_internal(&shop_path, "list", None, None).expect("list orders");
    assert!(listed.as_array().expect("order list").is_empty());
}

#[tokio::test]
async fn wanted_commands_add_list_and_remove_items() {
    let (_tmp, shop_path) = create_shop();

    let added = wanted_crud_internal(
        &shop_path,
        "add",
        Some(WantedDraft {
            name: "Coffee".to_string(),
            quantity: "3".to_string(),
        }),
        None,
    )
    .expect("add wanted item");
    let id = added["id"].as_str().expect("wanted id").to_string();

    let listed = wanted_crud_internal(&shop_path, "list", None, None).expect("list wanted");
    let items = listed.as_array().expect("wanted array");
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["name"], json!("Coffee"));
    assert_eq!(items[0]["quantity"], json!(3));

    let removed = wanted_crud_internal(&shop_path, "remove", None, Some(id))
        .expect("remove wanted item");
    assert_eq!(removed["status"], json!("removed"));

    let listed = wanted_crud_internal(&shop_path, "list", None, None).expect("list wanted");
    assert!(listed.as_array().expect("wanted array").is_empty());
}

#[tokio::test]
async fn export_writes_an_html_statement_for_the_account() {
    let (_tmp, shop_path) = create_shop();

    let soap = create_product(&shop_path, "Soap", "30.00");
    let account = create_debt_account_internal(&shop_path, "Maria").expect("create account");
    add_loan_item_internal(&shop_path, &account.id, &soap, "2").expect("loan soap");

    let out_path = export_debt_statement_internal(&shop_path, &account.id).expect("export");

    let html = fs::read_to_string(&out_path).expect("read statement");
    assert!(html.contains("Maria"));
    assert!(html.contains("Soap"));
    assert!(html.contains("$60.00"));
}
