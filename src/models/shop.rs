use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShopMeta {
    pub path: String,
    pub shop_name: String,
    pub product_count: usize,
    pub debtor_count: usize,
    pub pending_order_count: usize,
}
