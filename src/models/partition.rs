use chrono::{NaiveDate, Utc};
use chrono_tz::Tz;
use std::fmt;

const RAW_FILE_NAME: &str = "dados.parquet";

/// 按交易日划分的存储分区
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Partition {
    pub date: NaiveDate,
}

impl Partition {
    pub fn new(date: NaiveDate) -> Self {
        Self { date }
    }

    /// 交易所时区下的"今天"
    pub fn today(tz: Tz) -> Self {
        Self::new(Utc::now().with_timezone(&tz).date_naive())
    }

    /// Date string used in every storage path, `YYYY-MM-DD`.
    pub fn date_key(&self) -> String {
        self.date.format("%Y-%m-%d").to_string()
    }

    /// `raw/{YYYY-MM-DD}/dados.parquet`
    pub fn raw_key(&self) -> String {
        format!("raw/{}/{}", self.date_key(), RAW_FILE_NAME)
    }

    /// Prefix reserved for the bulk-transform job; never written here.
    pub fn refined_prefix(&self) -> String {
        format!("refined/{}/", self.date_key())
    }

    pub fn idempotency_key(&self) -> String {
        self.date_key()
    }
}

impl fmt::Display for Partition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.date_key())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_key_for_execution_date() {
        let partition = Partition::new(NaiveDate::from_ymd_opt(2024, 3, 15).unwrap());
        assert_eq!(partition.raw_key(), "raw/2024-03-15/dados.parquet");
        assert_eq!(partition.refined_prefix(), "refined/2024-03-15/");
        assert_eq!(partition.idempotency_key(), "2024-03-15");
        assert_eq!(partition.to_string(), "2024-03-15");
    }

    #[test]
    fn single_digit_months_are_zero_padded() {
        let partition = Partition::new(NaiveDate::from_ymd_opt(2025, 1, 2).unwrap());
        assert_eq!(partition.raw_key(), "raw/2025-01-02/dados.parquet");
    }

    #[test]
    fn today_follows_the_exchange_timezone() {
        let tz = chrono_tz::America::Sao_Paulo;
        let expected = Utc::now().with_timezone(&tz).date_naive();
        let partition = Partition::today(tz);
        // 跨越午夜时允许相差一天
        let diff = (partition.date - expected).num_days().abs();
        assert!(diff <= 1);
    }
}
