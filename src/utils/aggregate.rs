use std::collections::{BTreeMap, BTreeSet};

use crate::models::{SymbolAggregate, Trade, TradeType};

/// Bucket for trades that arrive without a symbol
pub const UNKNOWN_SYMBOL: &str = "UNKNOWN";

/// Sorted, de-duplicated symbols present in `trades` (empty symbols skipped)
pub fn extract_symbols(trades: &[Trade]) -> Vec<String> {
    trades
        .iter()
        .map(|t| t.symbol.trim())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Per-symbol volume and buy/sell counts, rebuilt from scratch in one pass
pub fn group_trades_by_symbol(trades: &[Trade]) -> Vec<SymbolAggregate> {
    let mut groups: BTreeMap<String, SymbolAggregate> = BTreeMap::new();

    for trade in trades {
        let symbol = match trade.symbol.trim() {
            "" => UNKNOWN_SYMBOL,
            s => s,
        };

        let entry = groups.entry(symbol.to_string()).or_insert_with(|| SymbolAggregate {
            symbol: symbol.to_string(),
            ..Default::default()
        });

        entry.total_trades += 1;
        entry.total_volume += trade.total_value;
        match trade.trade_type {
            TradeType::Buy => entry.buy_trades += 1,
            TradeType::Sell => entry.sell_trades += 1,
        }
    }

    groups.into_values().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trade(symbol: &str, trade_type: TradeType, total_value: f64) -> Trade {
        Trade {
            symbol: symbol.to_string(),
            trade_type,
            total_value,
            ..Default::default()
        }
    }

    #[test]
    fn test_extract_symbols() {
        let trades = vec![
            trade("ETH", TradeType::Buy, 1.0),
            trade("BTC", TradeType::Buy, 1.0),
            trade("BTC", TradeType::Sell, 1.0),
        ];
        assert_eq!(extract_symbols(&trades), vec!["BTC".to_string(), "ETH".to_string()]);
        assert!(extract_symbols(&[trade("", TradeType::Buy, 0.0)]).is_empty());
    }

    #[test]
    fn test_group_by_symbol() {
        let trades = vec![
            trade("BTC/USD", TradeType::Buy, 6500.0),
            trade("ETH/USD", TradeType::Buy, 6000.0),
            trade("BTC/USD", TradeType::Sell, 3300.0),
            trade("ETH/USD", TradeType::Sell, 2500.0),
            trade("BTC/USD", TradeType::Buy, 1000.0),
        ];

        let groups = group_trades_by_symbol(&trades);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups.iter().map(|g| g.total_trades).sum::<u64>(), 5);

        let btc = &groups[0];
        assert_eq!(btc.symbol, "BTC/USD");
        assert_eq!(btc.total_volume, 10_800.0);
        assert_eq!((btc.buy_trades, btc.sell_trades), (2, 1));

        let eth = &groups[1];
        assert_eq!(eth.total_volume, 8_500.0);
        assert_eq!((eth.buy_trades, eth.sell_trades), (1, 1));
    }

    #[test]
    fn test_missing_symbol_bucket() {
        let groups = group_trades_by_symbol(&[trade("  ", TradeType::Sell, 10.0)]);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].symbol, UNKNOWN_SYMBOL);
        assert_eq!(groups[0].sell_trades, 1);
    }
}
