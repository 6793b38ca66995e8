use crate::enums::ApprovalStatus;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// An order header as stored by the data layer. Read-only to the analytics core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: i64,
    pub date: DateTime<Utc>,
    pub payment_completed: bool,
    pub buyer_id: i64,
}

/// A single line of an order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLineItem {
    pub id: i64,
    pub order_id: i64,
    pub product_id: i64,
    pub unit_price: Decimal,
    /// Always at least 1.
    pub quantity: u32,
    /// Extra charge on the line; `None` counts as zero.
    #[serde(default)]
    pub surcharge: Option<Decimal>,
    pub approval_status: ApprovalStatus,
}

impl OrderLineItem {
    /// `unit_price * quantity + surcharge`, unrounded.
    pub fn line_total(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity) + self.surcharge.unwrap_or(Decimal::ZERO)
    }
}

/// Product projection. `stock_quantity` is the level recorded at creation and
/// is never decremented in storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: i64,
    pub title: String,
    pub category: String,
    pub seller_id: i64,
    pub stock_quantity: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Seller {
    pub id: i64,
    pub name: String,
}

/// A line item joined with the projections it references. `None` means the
/// reference did not resolve in the snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawLineItem {
    #[serde(flatten)]
    pub item: OrderLineItem,
    pub product: Option<Product>,
    pub seller: Option<Seller>,
}

/// An order with its nested line items, exactly as fetched for one request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawOrder {
    #[serde(flatten)]
    pub order: Order,
    pub items: Vec<RawLineItem>,
}

/// A line item that counts toward analytics: approved, on a paid order, with
/// a resolved product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedItem {
    pub line_item_id: i64,
    pub product_id: i64,
    pub product_title: String,
    pub category: String,
    pub seller_id: i64,
    /// `None` when the seller projection did not resolve.
    pub seller_name: Option<String>,
    pub unit_price: Decimal,
    pub quantity: u32,
    pub surcharge: Decimal,
    /// `unit_price * quantity + surcharge`, unrounded.
    pub line_total: Decimal,
}

/// A paid order reduced to its contributing line items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedOrder {
    pub id: i64,
    pub date: DateTime<Utc>,
    pub buyer_id: i64,
    /// Never empty.
    pub items: Vec<NormalizedItem>,
    /// Sum of `line_total` over `items`, unrounded.
    pub approved_total: Decimal,
}

impl NormalizedOrder {
    pub fn items_sold(&self) -> u64 {
        self.items.iter().map(|i| u64::from(i.quantity)).sum()
    }
}
