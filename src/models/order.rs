use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderLine {
    pub id: String,
    pub name: String,
    pub unit_price_cents: i64,
    pub quantity: i64,
}

/// A supplier order ("pedido"). Updates replace the whole line set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupplierOrder {
    pub id: String,
    pub supplier: String,
    pub order_date: String, // ISO YYYY-MM-DD
    pub delivered: bool,
    pub lines: Vec<OrderLine>,
    pub created_at: i64,
}

/// Shopping-list entry: a product the shop wants to restock.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WantedItem {
    pub id: String,
    pub name: String,
    pub quantity: i64,
    pub created_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderLineDraft {
    pub id: Option<String>,
    pub name: String,
    pub unit_price: String,
    pub quantity: String,
}

/// What the order form submits; amounts arrive as typed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderDraft {
    pub id: Option<String>,
    pub supplier: String,
    #[serde(default)]
    pub order_date: String,
    #[serde(default)]
    pub delivered: bool,
    #[serde(default)]
    pub lines: Vec<OrderLineDraft>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WantedDraft {
    pub name: String,
    pub quantity: String,
}
