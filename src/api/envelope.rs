//! Backend response envelopes: `{"status": ..., "data": ..., "message": ...}`.
//!
//! Response evaluation and payload extraction are kept free of I/O so every
//! branch can be exercised without a server.

use serde::de::DeserializeOwned;
use serde_json::Value;

use super::error::ApiError;
use crate::models::{AccountSummary, ChartData, ChartSeriesPoint, Trade, TradeHistory, TradingStats};
use crate::models::de::{coerce_f64, lenient_string_value};

const MAX_BODY_IN_ERROR: usize = 200;

fn envelope_message(body: &Value) -> Option<String> {
    ["message", "details", "error"]
        .iter()
        .filter_map(|key| body.get(*key))
        .find_map(|v| v.as_str().map(str::to_string).filter(|s| !s.is_empty()))
}

fn truncated(body: &str) -> String {
    let mut end = body.len().min(MAX_BODY_IN_ERROR);
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    body[..end].to_string()
}

/// Turn an HTTP status and raw body into the decoded envelope or an `ApiError`.
///
/// `status: "error"` wins over the HTTP code; a non-2xx response without such an
/// envelope is an `HttpError`.
pub fn evaluate_response(http_status: u16, body: &str) -> Result<Value, ApiError> {
    let parsed = serde_json::from_str::<Value>(body);
    let success = (200..300).contains(&http_status);

    if let Ok(envelope) = &parsed {
        if envelope.get("status").and_then(Value::as_str) == Some("error") {
            let message = envelope_message(envelope).unwrap_or_else(|| "Backend reported an error".to_string());
            return Err(ApiError::ApiLogicError(message));
        }
    }

    if !success {
        let message = parsed
            .as_ref()
            .ok()
            .and_then(envelope_message)
            .unwrap_or_else(|| match body.trim() {
                "" => "empty response".to_string(),
                text => truncated(text),
            });
        return Err(ApiError::HttpError {
            status: http_status,
            message,
        });
    }

    parsed.map_err(|e| ApiError::ParseError(format!("{} - Body: {}", e, truncated(body))))
}

fn data(envelope: &Value) -> Option<&Value> {
    envelope.get("data").filter(|v| !v.is_null())
}

fn decode_object<T: DeserializeOwned + Default>(value: Option<&Value>, what: &str) -> T {
    match value {
        Some(v @ Value::Object(_)) => serde_json::from_value(v.clone()).unwrap_or_else(|e| {
            log::warn!("Malformed {} payload, using empty value: {}", what, e);
            T::default()
        }),
        Some(other) => {
            log::warn!("Expected {} object, got {}", what, other);
            T::default()
        }
        None => T::default(),
    }
}

pub fn parse_trading_stats(envelope: &Value) -> TradingStats {
    decode_object(data(envelope), "trading stats")
}

pub fn parse_account_summary(envelope: &Value) -> AccountSummary {
    decode_object(data(envelope), "account summary")
}

/// Decode `data: [Trade]`; records that fail to decode are skipped
pub fn parse_trade_history(envelope: &Value) -> TradeHistory {
    let trades: Vec<Trade> = data(envelope)
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|item| match item.as_object() {
                    Some(record) => Some(Trade::from_record(record)),
                    None => {
                        log::warn!("Skipping malformed trade record: {}", item);
                        None
                    }
                })
                .collect()
        })
        .unwrap_or_default();

    let count = envelope
        .get("count")
        .and_then(Value::as_u64)
        .map(|c| c as usize)
        .unwrap_or(trades.len());

    TradeHistory { trades, count }
}

fn parse_series(container: Option<&Value>, key: &str, value_key: &str) -> Vec<ChartSeriesPoint> {
    container
        .and_then(|c| c.get(key))
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter(|item| item.is_object())
                .map(|item| ChartSeriesPoint {
                    date: item.get("date").map(lenient_string_value).unwrap_or_default(),
                    value: item.get(value_key).map(coerce_f64).unwrap_or(0.0),
                })
                .collect()
        })
        .unwrap_or_default()
}

pub fn parse_chart_data(envelope: &Value) -> ChartData {
    let container = data(envelope);
    ChartData {
        volume_data: parse_series(container, "volume_data", "volume"),
        pnl_data: parse_series(container, "pnl_data", "pnl"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use crate::models::TradeType;

    #[test]
    fn test_error_envelope_with_http_200() {
        let body = r#"{"status": "error", "message": "Trading service not initialized"}"#;
        assert_eq!(
            evaluate_response(200, body),
            Err(ApiError::ApiLogicError("Trading service not initialized".to_string()))
        );
    }

    #[test]
    fn test_error_envelope_with_http_500() {
        let body = r#"{"status": "error", "message": "Failed to fetch trading statistics", "details": "boom"}"#;
        assert_eq!(
            evaluate_response(500, body),
            Err(ApiError::ApiLogicError("Failed to fetch trading statistics".to_string()))
        );
    }

    #[test]
    fn test_http_error_without_envelope() {
        match evaluate_response(502, "<html>Bad Gateway</html>") {
            Err(ApiError::HttpError { status, message }) => {
                assert_eq!(status, 502);
                assert!(message.contains("Bad Gateway"));
            }
            other => panic!("unexpected result: {:?}", other),
        }
        assert!(matches!(evaluate_response(404, ""), Err(ApiError::HttpError { status: 404, .. })));
    }

    #[test]
    fn test_success_body_not_json() {
        assert!(matches!(evaluate_response(200, "ok"), Err(ApiError::ParseError(_))));
    }

    #[test]
    fn test_missing_data_gives_empty_containers() {
        let envelope = json!({"status": "success"});
        assert!(parse_trade_history(&envelope).trades.is_empty());
        assert_eq!(parse_trade_history(&envelope).count, 0);
        assert_eq!(parse_chart_data(&envelope), ChartData::default());
        assert_eq!(parse_trading_stats(&envelope), TradingStats::default());
        assert_eq!(parse_account_summary(&json!({"status": "success", "data": "oops"})), AccountSummary::default());
    }

    #[test]
    fn test_trade_history() {
        let envelope = json!({
            "status": "success",
            "data": [
                {"trade_id": "T1", "symbol": "BTC/USD", "trade_type": "buy", "total_value": 6500.0},
                "not a trade",
                {"trade_id": "T2", "symbol": "ETH/USD", "trade_type": "sell", "total_value": "3300"}
            ],
            "count": 3
        });
        let history = parse_trade_history(&envelope);
        assert_eq!(history.trades.len(), 2);
        assert_eq!(history.count, 3);
        assert_eq!(history.trades[1].total_value, 3300.0);
    }

    #[test]
    fn test_trade_history_with_both_key_styles() {
        let envelope = json!({
            "status": "success",
            "data": [
                {"id": "T1", "trade_id": "T1", "type": "buy", "trade_type": "buy", "timestamp": "2025-01-05T10:00:00"},
                {"id": "T2", "trade_id": "old", "type": "sell", "trade_type": "buy"},
                {"id": "T3", "trade_id": "T3", "trade_timestamp": "2025-01-04T09:00:00", "timestamp": "2025-01-04T10:00:00"}
            ]
        });
        let history = parse_trade_history(&envelope);
        assert_eq!(history.trades.len(), 3);
        assert_eq!(history.count, 3);
        assert_eq!(history.trades[1].id, "T2");
        assert_eq!(history.trades[1].trade_type, TradeType::Sell);
        assert_eq!(history.trades[2].timestamp, "2025-01-04T10:00:00");
    }

    #[test]
    fn test_chart_data() {
        let envelope = json!({
            "status": "success",
            "data": {
                "volume_data": [{"date": "2025-01-02", "volume": 100.5}, {"date": "2025-01-01"}],
                "pnl_data": [{"date": "2025-01-01", "pnl": "-12.5"}, 42]
            }
        });
        let chart = parse_chart_data(&envelope);
        assert_eq!(chart.volume_data.len(), 2);
        assert_eq!(chart.volume_data[1].value, 0.0);
        assert_eq!(chart.pnl_data, vec![ChartSeriesPoint::new("2025-01-01", -12.5)]);
    }
}
