use crate::domain::model::{
    ItemType, PriceEntry, PriceScheduleItem, PriceScheduleRow, TerritoryPrices,
};
use std::collections::HashMap;
use std::fmt;

/// An item whose dated entries overlap inside one territory.
///
/// Conflicting items are reported and never submitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleConflict {
    pub item: PriceScheduleItem,
    pub territory: String,
    pub first_row: usize,
    pub second_row: usize,
}

impl fmt::Display for ScheduleConflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "OverlappingDateRanges: rows {} and {} overlap in {}",
            self.first_row, self.second_row, self.territory
        )
    }
}

#[derive(Debug, Default)]
pub struct GroupedSchedules {
    pub items: Vec<PriceScheduleItem>,
    pub conflicts: Vec<ScheduleConflict>,
}

pub fn group_rows(rows: Vec<PriceScheduleRow>) -> GroupedSchedules {
    let mut items: Vec<PriceScheduleItem> = Vec::new();
    let mut index: HashMap<(String, ItemType), usize> = HashMap::new();

    for row in rows {
        let key = (row.item_id.clone(), row.item_type);
        let position = *index.entry(key).or_insert_with(|| {
            items.push(PriceScheduleItem {
                memo: row.memo.clone(),
                item_id: row.item_id.clone(),
                item_type: row.item_type,
                territory_prices: Vec::new(),
            });
            items.len() - 1
        });
        let item = &mut items[position];

        let entry = PriceEntry {
            row: row.row,
            price_point: row.price_point,
            start_date: row.start_date,
            end_date: row.end_date,
        };

        match item
            .territory_prices
            .iter_mut()
            .find(|t| t.territory == row.territory)
        {
            Some(territory) => add_entry(&item.item_id, territory, entry),
            None => item.territory_prices.push(TerritoryPrices {
                territory: row.territory,
                entries: vec![entry],
            }),
        }
    }

    let mut grouped = GroupedSchedules::default();
    for mut item in items {
        for territory in &mut item.territory_prices {
            // None 排在最前面（目前的基本價格）
            territory.entries.sort_by_key(|e| e.start_date);
        }
        match find_overlap(&item) {
            Some((territory, first_row, second_row)) => {
                tracing::warn!(
                    "⚠️ {} {} has overlapping prices in {} (rows {} and {})",
                    item.item_type,
                    item.item_id,
                    territory,
                    first_row,
                    second_row
                );
                grouped.conflicts.push(ScheduleConflict {
                    item,
                    territory,
                    first_row,
                    second_row,
                });
            }
            None => grouped.items.push(item),
        }
    }

    tracing::info!(
        "🧩 Grouped into {} price schedules ({} rejected)",
        grouped.items.len(),
        grouped.conflicts.len()
    );
    grouped
}

/// Later rows replace earlier rows with the same start date.
fn add_entry(item_id: &str, territory: &mut TerritoryPrices, entry: PriceEntry) {
    match territory
        .entries
        .iter_mut()
        .find(|e| e.start_date == entry.start_date)
    {
        Some(existing) => {
            tracing::warn!(
                "⚠️ Row {} overrides row {} for {} in {} (same start date {})",
                entry.row,
                existing.row,
                item_id,
                territory.territory,
                entry
                    .start_date
                    .map(|d| d.to_string())
                    .unwrap_or_else(|| "null".to_string())
            );
            *existing = entry;
        }
        None => territory.entries.push(entry),
    }
}

fn find_overlap(item: &PriceScheduleItem) -> Option<(String, usize, usize)> {
    for territory in &item.territory_prices {
        for pair in territory.entries.windows(2) {
            let (current, next) = (&pair[0], &pair[1]);
            if let (Some(end), Some(next_start)) = (current.end_date, next.start_date) {
                if next_start < end {
                    return Some((territory.territory.clone(), current.row, next.row));
                }
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{PriceAmount, PricePointSource};
    use chrono::NaiveDate;

    fn date(value: &str) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()
    }

    fn row(
        row: usize,
        item_id: &str,
        item_type: ItemType,
        territory: &str,
        price: &str,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> PriceScheduleRow {
        let amount = PriceAmount::parse(price).unwrap();
        PriceScheduleRow {
            row,
            memo: format!("memo {}", item_id),
            item_id: item_id.to_string(),
            item_type,
            territory: territory.to_string(),
            price: Some(amount.clone()),
            start_date: start,
            end_date: end,
            price_point: PricePointSource::FromPrice(amount),
        }
    }

    #[test]
    fn test_same_item_groups_into_one_schedule() {
        let rows = vec![
            row(1, "1", ItemType::App, "USA", "0.99", None, None),
            row(2, "1", ItemType::App, "JPN", "120", None, None),
            row(3, "2", ItemType::App, "USA", "1.99", None, None),
            row(4, "1", ItemType::App, "DEU", "0.99", None, None),
        ];

        let grouped = group_rows(rows);

        assert!(grouped.conflicts.is_empty());
        assert_eq!(grouped.items.len(), 2);
        let first = &grouped.items[0];
        assert_eq!(first.item_id, "1");
        let territories: Vec<&str> = first
            .territory_prices
            .iter()
            .map(|t| t.territory.as_str())
            .collect();
        assert_eq!(territories, vec!["USA", "JPN", "DEU"]);
        assert_eq!(grouped.items[1].item_id, "2");
    }

    #[test]
    fn test_same_id_different_type_are_separate_items() {
        let rows = vec![
            row(1, "1", ItemType::App, "USA", "0.99", None, None),
            row(2, "1", ItemType::InAppPurchase, "USA", "0.99", None, None),
        ];

        let grouped = group_rows(rows);

        assert_eq!(grouped.items.len(), 2);
        assert_eq!(grouped.items[0].item_type, ItemType::App);
        assert_eq!(grouped.items[1].item_type, ItemType::InAppPurchase);
    }

    #[test]
    fn test_null_start_sorts_first() {
        let rows = vec![
            row(1, "1", ItemType::App, "USA", "1.99", date("2024-03-01"), None),
            row(2, "1", ItemType::App, "USA", "0.99", None, None),
        ];

        let grouped = group_rows(rows);

        assert_eq!(grouped.items.len(), 1);
        let usa = grouped.items[0].territory("USA").unwrap();
        assert_eq!(usa.entries.len(), 2);
        assert_eq!(usa.entries[0].start_date, None);
        assert_eq!(usa.entries[0].row, 2);
        assert_eq!(usa.entries[1].start_date, date("2024-03-01"));
    }

    #[test]
    fn test_later_row_with_same_start_wins() {
        let rows = vec![
            row(1, "1", ItemType::App, "USA", "0.99", None, None),
            row(2, "1", ItemType::App, "USA", "1.99", None, None),
        ];

        let grouped = group_rows(rows);

        let usa = grouped.items[0].territory("USA").unwrap();
        assert_eq!(usa.entries.len(), 1);
        assert_eq!(usa.entries[0].row, 2);
        assert_eq!(
            usa.entries[0].price_point,
            PricePointSource::FromPrice(PriceAmount::parse("1.99").unwrap())
        );
    }

    #[test]
    fn test_later_row_with_same_dated_start_wins() {
        let rows = vec![
            row(1, "1", ItemType::App, "USA", "0.99", None, None),
            row(2, "1", ItemType::App, "USA", "1.99", date("2024-03-01"), None),
            row(3, "1", ItemType::App, "USA", "2.99", date("2024-03-01"), None),
        ];

        let grouped = group_rows(rows);

        assert!(grouped.conflicts.is_empty());
        let usa = grouped.items[0].territory("USA").unwrap();
        assert_eq!(usa.entries.len(), 2);
        assert_eq!(usa.entries[0].row, 1);
        assert_eq!(usa.entries[1].row, 3);
        assert_eq!(usa.entries[1].start_date, date("2024-03-01"));
        assert_eq!(
            usa.entries[1].price_point,
            PricePointSource::FromPrice(PriceAmount::parse("2.99").unwrap())
        );
    }

    #[test]
    fn test_overlapping_ranges_reject_the_item() {
        let rows = vec![
            row(
                1,
                "1",
                ItemType::App,
                "USA",
                "0.99",
                date("2024-01-01"),
                date("2024-03-01"),
            ),
            row(2, "1", ItemType::App, "USA", "1.99", date("2024-02-01"), None),
            row(3, "2", ItemType::App, "USA", "1.99", None, None),
        ];

        let grouped = group_rows(rows);

        assert_eq!(grouped.items.len(), 1);
        assert_eq!(grouped.items[0].item_id, "2");
        assert_eq!(grouped.conflicts.len(), 1);
        let conflict = &grouped.conflicts[0];
        assert_eq!(conflict.item.item_id, "1");
        assert_eq!((conflict.first_row, conflict.second_row), (1, 2));
        assert_eq!(
            conflict.to_string(),
            "OverlappingDateRanges: rows 1 and 2 overlap in USA"
        );
    }

    #[test]
    fn test_adjacent_ranges_do_not_overlap() {
        let rows = vec![
            row(1, "1", ItemType::App, "USA", "0.99", None, date("2024-03-01")),
            row(
                2,
                "1",
                ItemType::App,
                "USA",
                "1.99",
                date("2024-03-01"),
                date("2024-04-01"),
            ),
            row(3, "1", ItemType::App, "USA", "0.99", date("2024-04-01"), None),
        ];

        let grouped = group_rows(rows);

        assert!(grouped.conflicts.is_empty());
        assert_eq!(grouped.items[0].entry_count(), 3);
    }
}
