use crate::error::SnapshotError;
use crate::repository::SnapshotRepository;
use core_types::{Order, OrderLineItem, Product, Seller};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// The flat tables of a data export, one JSON array per record type.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotData {
    #[serde(default)]
    pub orders: Vec<Order>,
    #[serde(default)]
    pub line_items: Vec<OrderLineItem>,
    #[serde(default)]
    pub products: Vec<Product>,
    #[serde(default)]
    pub sellers: Vec<Seller>,
}

/// Reads and parses a snapshot file into a ready-to-query repository.
pub fn load(path: &Path) -> Result<SnapshotRepository, SnapshotError> {
    let raw = std::fs::read_to_string(path).map_err(|source| SnapshotError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let data: SnapshotData = serde_json::from_str(&raw)?;

    tracing::info!(
        path = %path.display(),
        orders = data.orders.len(),
        line_items = data.line_items.len(),
        products = data.products.len(),
        sellers = data.sellers.len(),
        "Snapshot loaded."
    );

    Ok(SnapshotRepository::new(data))
}
