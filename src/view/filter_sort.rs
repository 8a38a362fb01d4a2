use std::cmp::Ordering;

use crate::models::{SortDirection, SortField, SortSpec, Trade, TradeFilters};

/// Exact symbol match when a symbol is selected, identity otherwise
pub fn filter_trades(trades: &[Trade], filters: &TradeFilters) -> Vec<Trade> {
    let symbol = filters.symbol.trim();
    if symbol.is_empty() {
        return trades.to_vec();
    }
    trades.iter().filter(|t| t.symbol == symbol).cloned().collect()
}

fn compare_by_field(a: &Trade, b: &Trade, field: SortField) -> Ordering {
    match field {
        SortField::Timestamp => a.timestamp_millis().cmp(&b.timestamp_millis()),
        SortField::Amount => a.amount.total_cmp(&b.amount),
        SortField::Price => a.price.total_cmp(&b.price),
        SortField::TotalValue => a.total_value.total_cmp(&b.total_value),
        SortField::Symbol => compare_text(&a.symbol, &b.symbol),
        SortField::Type => compare_text(a.trade_type.as_str(), b.trade_type.as_str()),
        SortField::Status => compare_text(a.status.as_str(), b.status.as_str()),
    }
}

fn compare_text(a: &str, b: &str) -> Ordering {
    a.to_lowercase().cmp(&b.to_lowercase())
}

/// Stable sort into a new vector; equal keys keep their input order in both directions
pub fn sort_trades(trades: &[Trade], sort: &SortSpec) -> Vec<Trade> {
    let mut sorted = trades.to_vec();
    sorted.sort_by(|a, b| {
        let ordering = compare_by_field(a, b, sort.field);
        match sort.direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    });
    sorted
}

pub fn filter_and_sort(trades: &[Trade], filters: &TradeFilters, sort: &SortSpec) -> Vec<Trade> {
    sort_trades(&filter_trades(trades, filters), sort)
}
