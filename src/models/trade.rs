use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use super::de::{coerce_f64, lenient_string, lenient_string_value};
use crate::utils::time::parse_timestamp;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TradeType {
    #[default]
    Buy,
    Sell,
}

impl TradeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TradeType::Buy => "buy",
            TradeType::Sell => "sell",
        }
    }

    pub fn parse(raw: &str) -> Self {
        if raw.trim().eq_ignore_ascii_case("sell") {
            TradeType::Sell
        } else {
            TradeType::Buy
        }
    }
}

// Anything that is not "sell" is treated as a buy, same as the backend.
impl<'de> Deserialize<'de> for TradeType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = lenient_string(deserializer)?;
        Ok(TradeType::parse(&raw))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TradeStatus {
    Completed,
    Pending,
    Failed,
    Cancelled,
    #[default]
    Unknown,
}

impl TradeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TradeStatus::Completed => "completed",
            TradeStatus::Pending => "pending",
            TradeStatus::Failed => "failed",
            TradeStatus::Cancelled => "cancelled",
            TradeStatus::Unknown => "unknown",
        }
    }

    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "completed" => TradeStatus::Completed,
            "pending" => TradeStatus::Pending,
            "failed" => TradeStatus::Failed,
            "cancelled" | "canceled" => TradeStatus::Cancelled,
            _ => TradeStatus::Unknown,
        }
    }
}

impl<'de> Deserialize<'de> for TradeStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = lenient_string(deserializer)?;
        Ok(TradeStatus::parse(&raw))
    }
}

/// One executed trade as returned by `/api/trade-history`.
///
/// Lives only for one refresh cycle; the whole list is replaced on the next
/// successful cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Default)]
pub struct Trade {
    pub id: String,
    pub symbol: String,
    #[serde(rename = "type")]
    pub trade_type: TradeType,
    pub amount: f64,
    pub price: f64,
    pub total_value: f64,
    pub fees: f64,
    pub status: TradeStatus,
    pub exchange: String,
    /// Raw ISO-8601 timestamp as sent by the backend
    pub timestamp: String,
}

/// First non-null value among `keys`, in order
fn field<'a>(record: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter().filter_map(|key| record.get(*key)).find(|value| !value.is_null())
}

impl Trade {
    /// Build a trade from a raw record, preferring canonical keys over the
    /// backend's `trade_*` column names when both are present
    pub fn from_record(record: &Map<String, Value>) -> Self {
        let text = |keys: &[&str]| field(record, keys).map(lenient_string_value).unwrap_or_default();
        let number = |keys: &[&str]| field(record, keys).map(coerce_f64).unwrap_or(0.0);

        Self {
            id: text(&["id", "trade_id"]),
            symbol: text(&["symbol"]),
            trade_type: TradeType::parse(&text(&["type", "trade_type"])),
            amount: number(&["amount"]),
            price: number(&["price"]),
            total_value: number(&["total_value"]),
            fees: number(&["fees"]),
            status: TradeStatus::parse(&text(&["status"])),
            exchange: text(&["exchange"]),
            timestamp: text(&["timestamp", "trade_timestamp"]),
        }
    }

    pub fn parsed_timestamp(&self) -> Option<DateTime<Utc>> {
        parse_timestamp(&self.timestamp)
    }

    /// Epoch milliseconds, 0 when the timestamp cannot be parsed
    pub fn timestamp_millis(&self) -> i64 {
        self.parsed_timestamp().map(|ts| ts.timestamp_millis()).unwrap_or(0)
    }
}

impl<'de> Deserialize<'de> for Trade {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let record = Map::<String, Value>::deserialize(deserializer)?;
        Ok(Trade::from_record(&record))
    }
}

/// Result of a trade-history read
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct TradeHistory {
    pub trades: Vec<Trade>,
    pub count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_backend_record() {
        let trade: Trade = serde_json::from_value(json!({
            "trade_id": "TRADE_001",
            "symbol": "BTC/USD",
            "trade_type": "sell",
            "amount": 0.1,
            "price": "65000.00",
            "total_value": 6500.0,
            "fees": 19.5,
            "status": "completed",
            "exchange": "binance",
            "trade_timestamp": "2025-01-05T10:00:00"
        }))
        .unwrap();

        assert_eq!(trade.id, "TRADE_001");
        assert_eq!(trade.trade_type, TradeType::Sell);
        assert_eq!(trade.price, 65000.0);
        assert_eq!(trade.status, TradeStatus::Completed);
        assert!(trade.parsed_timestamp().is_some());
    }

    #[test]
    fn test_missing_fields_default() {
        let trade: Trade = serde_json::from_value(json!({"symbol": "ETH/USD", "status": "weird"})).unwrap();
        assert_eq!(trade.trade_type, TradeType::Buy);
        assert_eq!(trade.status, TradeStatus::Unknown);
        assert_eq!(trade.amount, 0.0);
        assert_eq!(trade.timestamp_millis(), 0);
    }

    #[test]
    fn test_canonical_and_backend_names_together() {
        let trades: Vec<Trade> = serde_json::from_value(json!([
            {"id": "T1", "trade_id": "legacy-1", "symbol": "BTC/USD"},
            {"id": "T2", "type": "sell", "trade_type": "buy"},
            {"id": "T3", "timestamp": "2025-01-05T10:00:00", "trade_timestamp": "2020-01-01"},
            {"id": null, "trade_id": "T4", "trade_type": "sell"}
        ]))
        .unwrap();

        assert_eq!(trades.len(), 4);
        assert_eq!(trades[0].id, "T1");
        assert_eq!(trades[1].trade_type, TradeType::Sell);
        assert_eq!(trades[2].timestamp, "2025-01-05T10:00:00");
        assert_eq!(trades[3].id, "T4");
        assert_eq!(trades[3].trade_type, TradeType::Sell);
    }

    #[test]
    fn test_serialized_trade_decodes_again() {
        let trade = Trade {
            id: "t9".to_string(),
            trade_type: TradeType::Sell,
            amount: 1.5,
            status: TradeStatus::Pending,
            ..Default::default()
        };
        let decoded: Trade = serde_json::from_value(serde_json::to_value(&trade).unwrap()).unwrap();
        assert_eq!(decoded, trade);
    }

    #[test]
    fn test_serializes_canonical_names() {
        let trade = Trade {
            id: "t1".to_string(),
            trade_type: TradeType::Sell,
            ..Default::default()
        };
        let value = serde_json::to_value(&trade).unwrap();
        assert_eq!(value["type"], "sell");
        assert_eq!(value["status"], "unknown");
    }
}
