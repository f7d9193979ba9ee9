use crate::errors::{DataHubError, Result};
use crate::models::record::{RawRow, Record};
use chrono::NaiveDate;
use log::debug;

/// Parse a locale-formatted decimal such as `"12,50"` or `"-1,25"`.
///
/// Only the decimal comma is converted; the result must be finite.
pub fn parse_locale_decimal(text: &str) -> Option<f64> {
    let value = text.trim().replace(',', ".").parse::<f64>().ok()?;
    value.is_finite().then_some(value)
}

fn parse_field(text: &str, field: &str, index: usize, label: &str) -> Result<f64> {
    parse_locale_decimal(text).ok_or_else(|| {
        DataHubError::FormatError(format!(
            "row {} ({}): {} {:?} is not a valid number",
            index, label, field, text
        ))
    })
}

/// 将原始行转换为带交易日期的记录
///
/// 任一行失败即整体失败，不做逐行恢复。
pub fn normalize(rows: &[RawRow], run_date: NaiveDate) -> Result<Vec<Record>> {
    let mut records = Vec::with_capacity(rows.len());

    for (index, row) in rows.iter().enumerate() {
        let symbol = row.label.trim();
        if symbol.is_empty() {
            return Err(DataHubError::FormatError(format!("row {}: empty symbol", index)));
        }

        let price = parse_field(&row.price_text, "price", index, symbol)?;
        let change_pct = parse_field(&row.change_text, "change", index, symbol)?;

        records.push(Record {
            symbol: symbol.to_string(),
            price,
            change_pct,
            trade_date: run_date,
        });
    }

    debug!("Normalized {} rows for {}", records.len(), run_date);
    Ok(records)
}
