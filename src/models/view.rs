use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::trade::Trade;
use crate::error::DashboardError;

pub const DEFAULT_TRADE_LIMIT: u32 = 50;
pub const MAX_TRADE_LIMIT: u32 = 1000;

/// Clamp a requested history size into the range the backend accepts
pub fn clamp_limit(limit: u32) -> u32 {
    if limit == 0 {
        DEFAULT_TRADE_LIMIT
    } else {
        limit.min(MAX_TRADE_LIMIT)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeFilters {
    /// Empty string means "all symbols"
    pub symbol: String,
    pub limit: u32,
}

impl Default for TradeFilters {
    fn default() -> Self {
        Self {
            symbol: String::new(),
            limit: DEFAULT_TRADE_LIMIT,
        }
    }
}

/// Columns the trade table may be sorted by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    Timestamp,
    Symbol,
    Type,
    Amount,
    Price,
    TotalValue,
    Status,
}

impl SortField {
    pub const ALL: [SortField; 7] = [
        SortField::Timestamp,
        SortField::Symbol,
        SortField::Type,
        SortField::Amount,
        SortField::Price,
        SortField::TotalValue,
        SortField::Status,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SortField::Timestamp => "timestamp",
            SortField::Symbol => "symbol",
            SortField::Type => "type",
            SortField::Amount => "amount",
            SortField::Price => "price",
            SortField::TotalValue => "total_value",
            SortField::Status => "status",
        }
    }
}

impl fmt::Display for SortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortField {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        SortField::ALL
            .into_iter()
            .find(|field| field.as_str() == wanted)
            .ok_or_else(|| DashboardError::Validation(format!("Cannot sort by '{}'", s.trim())))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn flipped(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec {
    pub field: SortField,
    pub direction: SortDirection,
}

impl Default for SortSpec {
    fn default() -> Self {
        Self {
            field: SortField::Timestamp,
            direction: SortDirection::Desc,
        }
    }
}

impl SortSpec {
    pub fn new(field: SortField, direction: SortDirection) -> Self {
        Self { field, direction }
    }

    /// Clicking the active column flips direction, a new column starts descending
    pub fn toggle(&mut self, field: SortField) {
        if self.field == field {
            self.direction = self.direction.flipped();
        } else {
            self.field = field;
            self.direction = SortDirection::Desc;
        }
    }
}

/// Everything the trade table renders from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ViewState {
    pub filters: TradeFilters,
    pub sort: SortSpec,
    pub trades: Vec<Trade>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct SymbolAggregate {
    pub symbol: String,
    pub total_volume: f64,
    pub total_trades: u64,
    pub buy_trades: u64,
    pub sell_trades: u64,
}
