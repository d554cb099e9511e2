//! Explosion stage: one [`ExplodedRow`] per product per transaction.

use crate::catalog::CategoryMap;
use crate::models::{EnrichedTransaction, ExplodedRow, Season};

/// Flatten the product lists, attaching category and season.
///
/// Output order is transaction order, then product order within each list.
/// Transactions with an empty list contribute no rows.
pub fn explode(transactions: &[EnrichedTransaction], categories: &CategoryMap) -> Vec<ExplodedRow> {
    let total: usize = transactions.iter().map(|t| t.products.len()).sum();
    let mut rows = Vec::with_capacity(total);

    for (idx, t) in transactions.iter().enumerate() {
        let season = Season::from_month(t.month);
        for product in &t.products {
            rows.push(ExplodedRow {
                transaction: idx,
                date: t.date,
                year: t.year,
                product: product.clone(),
                product_category: categories.category_of(product).map(String::from),
                season,
                promotion: t.promotion.clone(),
                customer_category: t.customer_category.clone(),
                store_type: t.store_type.clone(),
                payment_method: t.payment_method.clone(),
                total_cost: t.total_cost,
                total_items: t.total_items,
                sales: t.sales,
                profit: t.profit,
                profit_margin: t.profit_margin,
            });
        }
    }

    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RawTransaction;
    use crate::transform::enrich::enrich;

    fn enriched(date: &str, product: &str) -> EnrichedTransaction {
        let raw = RawTransaction {
            date: date.into(),
            total_cost: 10.0,
            total_items: 2,
            product: product.into(),
            promotion: Some("BOGO".into()),
            customer_category: "Teenager".into(),
            store_type: "Convenience Store".into(),
            payment_method: "Mobile Payment".into(),
        };
        enrich(&[raw]).unwrap().remove(0)
    }

    #[test]
    fn test_row_count_matches_list_length() {
        let map = CategoryMap::default();
        let txs = vec![
            enriched("2024-01-05", "['Milk', 'Soap', 'Iron']"),
            enriched("2024-02-05", "[]"),
            enriched("2024-03-05", "['Rice']"),
        ];
        let rows = explode(&txs, &map);

        assert_eq!(rows.len(), 4);
        assert_eq!(rows.iter().filter(|r| r.transaction == 0).count(), 3);
        assert_eq!(rows.iter().filter(|r| r.transaction == 1).count(), 0);
        assert_eq!(rows[3].transaction, 2);
    }

    #[test]
    fn test_non_product_fields_duplicated() {
        let map = CategoryMap::default();
        let txs = vec![enriched("2024-07-05", "['Milk', 'Soap']")];
        let rows = explode(&txs, &map);

        assert_eq!(rows[0].product, "Milk");
        assert_eq!(rows[1].product, "Soap");
        for row in &rows {
            assert_eq!(row.sales, txs[0].sales);
            assert_eq!(row.profit, txs[0].profit);
            assert_eq!(row.promotion, "BOGO");
            assert_eq!(row.customer_category, "Teenager");
            assert_eq!(row.store_type, "Convenience Store");
            assert_eq!(row.payment_method, "Mobile Payment");
            assert_eq!(row.date, txs[0].date);
            assert_eq!(row.season, Season::Summer);
        }
    }

    #[test]
    fn test_category_lookup_and_unmapped() {
        let map = CategoryMap::default();
        let rows = explode(&[enriched("2024-12-24", "['Soap', 'Ice Cream']")], &map);

        assert_eq!(rows[0].product_category.as_deref(), Some("Personal Care"));
        assert_eq!(rows[1].product_category, None);
        assert_eq!(rows[1].season, Season::Winter);
    }

    #[test]
    fn test_season_ignores_year() {
        let map = CategoryMap::default();
        let rows = explode(
            &[enriched("2019-10-01", "['Milk']"), enriched("2025-10-31", "['Milk']")],
            &map,
        );
        assert_eq!(rows[0].season, Season::Fall);
        assert_eq!(rows[1].season, Season::Fall);
    }
}
