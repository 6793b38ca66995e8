use core_types::{NormalizedItem, NormalizedOrder, RawLineItem, RawOrder};
use rust_decimal::Decimal;

/// Reduces raw orders to the subset that counts toward analytics.
///
/// An order survives only when it is paid and keeps at least one approved
/// line item whose product resolved. Unresolved products are a data-quality
/// gap, not an error: the item is skipped silently.
pub fn normalize(raw_orders: &[RawOrder]) -> Vec<NormalizedOrder> {
    let mut unresolved = 0usize;

    let normalized: Vec<NormalizedOrder> = raw_orders
        .iter()
        .filter(|raw| raw.order.payment_completed)
        .filter_map(|raw| {
            let items: Vec<NormalizedItem> = raw
                .items
                .iter()
                .filter(|line| line.item.approval_status.is_approved())
                .filter_map(|line| {
                    let item = normalize_item(line);
                    if item.is_none() {
                        unresolved += 1;
                    }
                    item
                })
                .collect();

            if items.is_empty() {
                return None;
            }
            let approved_total = items.iter().map(|i| i.line_total).sum();
            Some(NormalizedOrder {
                id: raw.order.id,
                date: raw.order.date,
                buyer_id: raw.order.buyer_id,
                items,
                approved_total,
            })
        })
        .collect();

    if unresolved > 0 {
        tracing::warn!(unresolved, "Skipped approved line items with no product.");
    }
    tracing::debug!(
        raw = raw_orders.len(),
        normalized = normalized.len(),
        "Normalized orders."
    );
    normalized
}

fn normalize_item(line: &RawLineItem) -> Option<NormalizedItem> {
    let product = line.product.as_ref()?;
    Some(NormalizedItem {
        line_item_id: line.item.id,
        product_id: product.id,
        product_title: product.title.clone(),
        category: product.category.clone(),
        seller_id: product.seller_id,
        seller_name: line.seller.as_ref().map(|s| s.name.clone()),
        unit_price: line.item.unit_price,
        quantity: line.item.quantity,
        surcharge: line.item.surcharge.unwrap_or(Decimal::ZERO),
        line_total: line.item.line_total(),
    })
}


#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;
    use core_types::ApprovalStatus::{Approved, Pending, Rejected};
    use rust_decimal_macros::dec;

    #[test]
    fn keeps_only_approved_resolved_items_on_paid_orders() {
        let mut with_surcharge = line(1, Some(product(10, 1, "A")), dec!(12.50), 2, Approved);
        with_surcharge.item.surcharge = Some(dec!(3.10));

        let raw = vec![raw_order(
            1,
            "2024-02-01T10:00:00Z",
            true,
            vec![
                with_surcharge,
                line(2, Some(product(11, 1, "A")), dec!(99), 1, Pending),
                line(3, Some(product(12, 1, "A")), dec!(99), 1, Rejected),
                line(4, None, dec!(99), 1, Approved),
            ],
        )];

        let orders = normalize(&raw);
        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].items.len(), 1);
        assert_eq!(orders[0].items[0].surcharge, dec!(3.10));
        assert_eq!(orders[0].approved_total, dec!(28.10));
    }

    #[test]
    fn unpaid_orders_are_excluded_entirely() {
        let raw = vec![raw_order(
            1,
            "2024-02-01T10:00:00Z",
            false,
            vec![line(1, Some(product(10, 1, "A")), dec!(5), 1, Approved)],
        )];
        assert!(normalize(&raw).is_empty());
    }

    #[test]
    fn orders_without_surviving_items_are_dropped_not_zeroed() {
        let raw = vec![
            raw_order(
                1,
                "2024-02-01T10:00:00Z",
                true,
                vec![line(1, Some(product(10, 1, "A")), dec!(5), 1, Pending)],
            ),
            raw_order(2, "2024-02-01T11:00:00Z", true, vec![line(2, None, dec!(5), 1, Approved)]),
            raw_order(
                3,
                "2024-02-01T12:00:00Z",
                true,
                vec![line(3, Some(product(10, 1, "A")), dec!(5), 1, Approved)],
            ),
        ];

        let orders = normalize(&raw);
        assert_eq!(orders.iter().map(|o| o.id).collect::<Vec<_>>(), vec![3]);
    }
}
