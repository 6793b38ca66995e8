//! Group-by / sum / sort / top-N over normalized line items.

use core_types::{NormalizedItem, NormalizedOrder, round_money};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// Size of the product leaderboard in the order analytics report.
pub const TOP_PRODUCTS_LIMIT: usize = 10;
/// Size of the seller leaderboard in the order analytics report.
pub const TOP_SELLERS_LIMIT: usize = 10;
/// Size of the product leaderboard on a seller's dashboard.
pub const DASHBOARD_TOP_PRODUCTS_LIMIT: usize = 5;

/// One row of a leaderboard.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedEntity<K> {
    pub id: K,
    pub name: String,
    pub total_quantity: u64,
    pub total_revenue: Decimal,
    /// Distinct orders containing at least one item with this key.
    pub order_count: usize,
}

#[derive(Debug)]
struct Tally {
    name: String,
    quantity: u64,
    revenue: Decimal,
    order_count: usize,
}

/// The ranking engine. Stateless; one instance can serve any number of reports.
#[derive(Debug, Default, Clone, Copy)]
pub struct RankingEngine;

impl RankingEngine {
    pub fn new() -> Self {
        Self
    }

    /// Groups every line item by `key_fn`, sums quantity and revenue, counts
    /// distinct orders per key, and sorts by revenue descending.
    ///
    /// Items for which `key_fn` returns `None` are skipped. Equal revenue is
    /// ordered by ascending key. The display name is taken from the first
    /// item seen for a key. Revenue is rounded only on the way out.
    pub fn rank<K, KF, NF>(
        &self,
        orders: &[NormalizedOrder],
        key_fn: KF,
        name_fn: NF,
        limit: Option<usize>,
    ) -> Vec<RankedEntity<K>>
    where
        K: Ord + Clone,
        KF: Fn(&NormalizedItem) -> Option<K>,
        NF: Fn(&NormalizedItem) -> String,
    {
        let mut tallies: BTreeMap<K, Tally> = BTreeMap::new();

        for order in orders {
            let mut seen_in_order: BTreeSet<K> = BTreeSet::new();
            for item in &order.items {
                let Some(key) = key_fn(item) else {
                    continue;
                };
                let tally = tallies.entry(key.clone()).or_insert_with(|| Tally {
                    name: name_fn(item),
                    quantity: 0,
                    revenue: Decimal::ZERO,
                    order_count: 0,
                });
                tally.quantity += u64::from(item.quantity);
                tally.revenue += item.line_total;
                if seen_in_order.insert(key) {
                    tally.order_count += 1;
                }
            }
        }

        let mut ranked: Vec<(K, Tally)> = tallies.into_iter().collect();
        ranked.sort_by(|(key_a, a), (key_b, b)| {
            b.revenue.cmp(&a.revenue).then_with(|| key_a.cmp(key_b))
        });
        if let Some(limit) = limit {
            ranked.truncate(limit);
        }

        ranked
            .into_iter()
            .map(|(id, tally)| RankedEntity {
                id,
                name: tally.name,
                total_quantity: tally.quantity,
                total_revenue: round_money(tally.revenue),
                order_count: tally.order_count,
            })
            .collect()
    }

    /// Best-selling products by revenue, at most `limit` rows.
    pub fn top_products(&self, orders: &[NormalizedOrder], limit: usize) -> Vec<RankedEntity<i64>> {
        self.rank(
            orders,
            |item| Some(item.product_id),
            |item| item.product_title.clone(),
            Some(limit),
        )
    }

    /// Best-selling sellers by revenue. Items whose seller did not resolve are left out.
    pub fn top_sellers(&self, orders: &[NormalizedOrder], limit: usize) -> Vec<RankedEntity<i64>> {
        self.rank(
            orders,
            |item| item.seller_name.as_ref().map(|_| item.seller_id),
            |item| item.seller_name.clone().unwrap_or_default(),
            Some(limit),
        )
    }

    /// Revenue per category, every category included.
    pub fn category_breakdown(&self, orders: &[NormalizedOrder]) -> Vec<RankedEntity<String>> {
        let breakdown = self.rank(
            orders,
            |item| Some(item.category.clone()),
            |item| item.category.clone(),
            None,
        );
        tracing::debug!(categories = breakdown.len(), "Category breakdown computed.");
        breakdown
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use rust_decimal_macros::dec;

    fn item(product_id: i64, seller_id: i64, category: &str, line_total: Decimal, quantity: u32) -> NormalizedItem {
        NormalizedItem {
            line_item_id: product_id * 100,
            product_id,
            product_title: format!("Product {product_id}"),
            category: category.to_string(),
            seller_id,
            seller_name: Some(format!("Seller {seller_id}")),
            unit_price: line_total / Decimal::from(quantity),
            quantity,
            surcharge: Decimal::ZERO,
            line_total,
        }
    }

    fn order(id: i64, items: Vec<NormalizedItem>) -> NormalizedOrder {
        let approved_total = items.iter().map(|i| i.line_total).sum();
        NormalizedOrder {
            id,
            date: Utc.with_ymd_and_hms(2024, 2, 1, 10, 0, 0).unwrap(),
            buyer_id: 1,
            items,
            approved_total,
        }
    }

    #[test]
    fn equal_revenue_is_ordered_by_ascending_key() {
        let orders = vec![
            order(1, vec![item(30, 1, "A", dec!(50), 1)]),
            order(2, vec![item(10, 1, "A", dec!(50), 1)]),
            order(3, vec![item(20, 1, "A", dec!(50), 1), item(40, 1, "A", dec!(80), 2)]),
        ];

        let engine = RankingEngine::new();
        for _ in 0..5 {
            let ids: Vec<i64> = engine.top_products(&orders, 10).iter().map(|r| r.id).collect();
            assert_eq!(ids, vec![40, 10, 20, 30]);
        }
    }

    #[test]
    fn order_count_counts_distinct_orders_per_key() {
        let orders = vec![
            order(1, vec![item(1, 7, "A", dec!(10), 1), item(2, 7, "B", dec!(20), 2)]),
            order(2, vec![item(3, 7, "A", dec!(5), 1)]),
            order(3, vec![item(4, 8, "A", dec!(1), 1)]),
        ];

        let sellers = RankingEngine::new().top_sellers(&orders, 10);
        assert_eq!(sellers[0].id, 7);
        assert_eq!(sellers[0].order_count, 2);
        assert_eq!(sellers[0].total_quantity, 4);
        assert_eq!(sellers[0].total_revenue, dec!(35));
        assert_eq!(sellers[1].order_count, 1);
    }

    #[test]
    fn unresolved_sellers_are_left_out() {
        let mut orphan = item(5, 9, "A", dec!(500), 1);
        orphan.seller_name = None;
        let orders = vec![order(1, vec![orphan, item(6, 2, "A", dec!(1), 1)])];

        let sellers = RankingEngine::new().top_sellers(&orders, 10);
        assert_eq!(sellers.len(), 1);
        assert_eq!(sellers[0].id, 2);
    }

    #[test]
    fn limit_truncates_after_sorting() {
        let orders: Vec<NormalizedOrder> = (1..=12)
            .map(|id| order(id, vec![item(id, 1, "A", Decimal::from(id), 1)]))
            .collect();

        let engine = RankingEngine::new();
        let top = engine.top_products(&orders, TOP_PRODUCTS_LIMIT);
        assert_eq!(top.len(), 10);
        assert_eq!(top.first().unwrap().id, 12);
        assert_eq!(top.last().unwrap().id, 3);
        assert_eq!(engine.top_products(&orders, DASHBOARD_TOP_PRODUCTS_LIMIT).len(), 5);
    }

    #[test]
    fn category_breakdown_is_unbounded_and_rounded_once() {
        let orders: Vec<NormalizedOrder> = (1..=12)
            .map(|id| order(id, vec![item(id, 1, &format!("C{id:02}"), dec!(0.004), 1)]))
            .chain(std::iter::once(order(
                99,
                vec![item(99, 1, "C01", dec!(0.004), 1), item(98, 1, "C01", dec!(0.004), 1)],
            )))
            .collect();

        let breakdown = RankingEngine::new().category_breakdown(&orders);
        assert_eq!(breakdown.len(), 12);
        assert_eq!(breakdown[0].id, "C01");
        assert_eq!(breakdown[0].total_revenue, dec!(0.01));
        assert_eq!(breakdown[0].order_count, 2);
    }

    #[test]
    fn empty_input_ranks_nothing() {
        assert!(RankingEngine::new().top_products(&[], 10).is_empty());
        assert!(RankingEngine::new().category_breakdown(&[]).is_empty());
    }
}
