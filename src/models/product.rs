use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogProduct {
    pub id: String,
    pub name: String,
    pub price_cents: i64,
    pub image_url: Option<String>, // opaque hosted-image URL; upload happens outside this crate
    pub created_at: i64,
}

/// What the product form submits. The price arrives as the user typed it
/// and is parsed to cents on the Rust side.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductDraft {
    pub id: Option<String>,
    pub name: String,
    pub price: String,
    pub image_url: Option<String>,
}
