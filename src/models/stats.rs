use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::de::{lenient_f64, lenient_u64};

/// Share of traded volume booked as profit by the backend's P&L approximation
const ESTIMATED_MARGIN: f64 = 0.01;

/// Aggregates computed by the backend, read-only on this side
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct TradingStats {
    #[serde(default, deserialize_with = "lenient_u64")]
    pub total_trades: u64,
    #[serde(default, deserialize_with = "lenient_u64")]
    pub buy_trades: u64,
    #[serde(default, deserialize_with = "lenient_u64")]
    pub sell_trades: u64,
    /// Percentage, 0-100
    #[serde(default, deserialize_with = "lenient_f64")]
    pub success_rate: f64,
    #[serde(default, deserialize_with = "lenient_u64")]
    pub completed_trades: u64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub total_volume: f64,
}

impl TradingStats {
    /// Placeholder "Total P&L" figure: volume x success rate x 1%.
    ///
    /// Not derived from entry/exit deltas; kept as the documented approximation
    /// until the backend reports realised P&L.
    pub fn estimated_pnl(&self) -> f64 {
        self.total_volume * (self.success_rate / 100.0) * ESTIMATED_MARGIN
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct AccountSummary {
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub perp_account_value: f64,
    #[serde(default)]
    pub spot_balances: Vec<Value>,
    /// Any other fields the backend sends, kept verbatim
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_estimated_pnl() {
        let stats = TradingStats {
            total_volume: 10_000.0,
            success_rate: 50.0,
            ..Default::default()
        };
        assert!((stats.estimated_pnl() - 50.0).abs() < 1e-9);
        assert_eq!(TradingStats::default().estimated_pnl(), 0.0);
    }

    #[test]
    fn test_account_value_from_string() {
        let account: AccountSummary = serde_json::from_value(json!({
            "address": "0xabc",
            "perp_account_value": "1520.75",
            "spot_balances": [{"coin": "USDC", "total": "10"}],
            "withdrawable": "12"
        }))
        .unwrap();
        assert_eq!(account.perp_account_value, 1520.75);
        assert_eq!(account.spot_balances.len(), 1);
        assert_eq!(account.extra["withdrawable"], "12");
    }
}
