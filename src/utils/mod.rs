pub mod aggregate;
pub mod format;
pub mod time;

pub use aggregate::{extract_symbols, group_trades_by_symbol};
pub use format::{format_amount, format_currency, format_date, format_number, format_percentage, format_relative_time};
pub use time::parse_timestamp;
