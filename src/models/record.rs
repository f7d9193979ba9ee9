use chrono::NaiveDate;

/// 页面表格中的一行，数值仍为本地格式文本（逗号作小数点）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRow {
    pub label: String,
    pub price_text: String,
    pub change_text: String,
}

impl RawRow {
    pub fn new(label: &str, price_text: &str, change_text: &str) -> Self {
        Self {
            label: label.to_string(),
            price_text: price_text.to_string(),
            change_text: change_text.to_string(),
        }
    }
}

/// One normalized index constituent for a trading day.
///
/// `price` and `change_pct` are always finite, `symbol` is never empty and
/// every record produced by a single run carries that run's `trade_date`.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub symbol: String,
    pub price: f64,
    pub change_pct: f64,
    pub trade_date: NaiveDate,
}
