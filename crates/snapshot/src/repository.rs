use crate::error::SnapshotError;
use crate::loader::SnapshotData;
use chrono::{DateTime, Utc};
use core_types::{Order, OrderLineItem, Product, RawLineItem, RawOrder, ReportScope, Seller};
use std::collections::HashMap;

/// The `SnapshotRepository` answers the scoped queries the report builders
/// need. It owns one immutable, internally consistent export, so every pass
/// over it during a request sees the same records.
#[derive(Debug, Clone, Default)]
pub struct SnapshotRepository {
    /// Sorted by date, then id.
    orders: Vec<Order>,
    items_by_order: HashMap<i64, Vec<OrderLineItem>>,
    products: HashMap<i64, Product>,
    sellers: HashMap<i64, Seller>,
}

impl SnapshotRepository {
    pub fn new(data: SnapshotData) -> Self {
        let mut orders = data.orders;
        orders.sort_by(|a, b| a.date.cmp(&b.date).then(a.id.cmp(&b.id)));

        let mut items_by_order: HashMap<i64, Vec<OrderLineItem>> = HashMap::new();
        for item in data.line_items {
            items_by_order.entry(item.order_id).or_default().push(item);
        }
        for items in items_by_order.values_mut() {
            items.sort_by_key(|i| i.id);
        }

        Self {
            orders,
            items_by_order,
            products: data.products.into_iter().map(|p| (p.id, p)).collect(),
            sellers: data.sellers.into_iter().map(|s| (s.id, s)).collect(),
        }
    }

    /// Fetches every order dated within `[start, end]` together with its
    /// in-scope line items and their product/seller projections.
    ///
    /// Orders that carry no in-scope line item are omitted. Items whose
    /// product does not resolve are still returned (with `product: None`)
    /// for the admin and product scopes; the normalizer drops them.
    pub fn orders_for_scope(
        &self,
        scope: ReportScope,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Vec<RawOrder> {
        if start > end {
            return Vec::new();
        }

        let orders: Vec<RawOrder> = self
            .orders
            .iter()
            .filter(|o| o.date >= start && o.date <= end)
            .filter_map(|o| self.join_order(o, |item, product| in_scope(scope, item, product)))
            .collect();

        tracing::debug!(?scope, %start, %end, orders = orders.len(), "Fetched orders for scope.");
        orders
    }

    /// Fetches the full order history of one product, regardless of date.
    pub fn product_order_history(&self, product_id: i64) -> Vec<RawOrder> {
        self.orders
            .iter()
            .filter_map(|o| self.join_order(o, |item, _| item.product_id == product_id))
            .collect()
    }

    pub fn product(&self, id: i64) -> Result<Product, SnapshotError> {
        self.products
            .get(&id)
            .cloned()
            .ok_or(SnapshotError::NotFound { entity: "Product", id })
    }

    pub fn seller(&self, id: i64) -> Result<Seller, SnapshotError> {
        self.sellers
            .get(&id)
            .cloned()
            .ok_or(SnapshotError::NotFound { entity: "Seller", id })
    }

    /// Ids of every product owned by the seller, ascending.
    pub fn product_ids_for_seller(&self, seller_id: i64) -> Vec<i64> {
        let mut ids: Vec<i64> = self
            .products
            .values()
            .filter(|p| p.seller_id == seller_id)
            .map(|p| p.id)
            .collect();
        ids.sort_unstable();
        ids
    }

    fn join_order<F>(&self, order: &Order, keep: F) -> Option<RawOrder>
    where
        F: Fn(&OrderLineItem, Option<&Product>) -> bool,
    {
        let items: Vec<RawLineItem> = self
            .items_by_order
            .get(&order.id)?
            .iter()
            .filter_map(|item| {
                let product = self.products.get(&item.product_id);
                if !keep(item, product) {
                    return None;
                }
                let seller = product.and_then(|p| self.sellers.get(&p.seller_id)).cloned();
                Some(RawLineItem {
                    item: item.clone(),
                    product: product.cloned(),
                    seller,
                })
            })
            .collect();

        if items.is_empty() {
            return None;
        }
        Some(RawOrder {
            order: order.clone(),
            items,
        })
    }
}

fn in_scope(scope: ReportScope, item: &OrderLineItem, product: Option<&Product>) -> bool {
    match scope {
        ReportScope::Admin => true,
        ReportScope::Seller(seller_id) => product.is_some_and(|p| p.seller_id == seller_id),
        ReportScope::Product(product_id) => item.product_id == product_id,
    }
}
