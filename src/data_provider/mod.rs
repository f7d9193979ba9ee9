use chrono::NaiveDate;
use log::info;

use crate::errors::Result;
use crate::models::partition::Partition;
use crate::models::record::Record;
use crate::storage::BlobStore;
use crate::util::parquet_utils;
use std::collections::HashMap;

/// 已存储原始分区的只读访问
pub struct PartitionProvider {
    partition: Partition,
    data: Vec<Record>,
    // 索引用于快速查找
    symbol_index: HashMap<String, usize>,
}

impl PartitionProvider {
    /// 从对象存储加载指定日期的原始分区
    pub async fn load<S>(store: &S, date: NaiveDate) -> Result<Self>
    where
        S: BlobStore + Send + Sync + ?Sized,
    {
        let partition = Partition::new(date);
        let key = partition.raw_key();
        info!("Loading partition {} from {}", partition, store.describe(&key));

        let blob = store.get(&key).await?;
        let data = parquet_utils::decode(&blob)?;
        info!("Loaded {} records for {}", data.len(), partition);

        Ok(Self::new_with_data(partition, data))
    }

    pub fn new_with_data(partition: Partition, data: Vec<Record>) -> Self {
        let mut provider = Self {
            partition,
            data,
            symbol_index: HashMap::new(),
        };
        provider.rebuild_indices();
        provider
    }

    pub fn partition(&self) -> &Partition {
        &self.partition
    }

    pub fn records(&self) -> &[Record] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn get_record_by_symbol(&self, symbol: &str) -> Option<&Record> {
        self.symbol_index.get(symbol).map(|&idx| &self.data[idx])
    }

    /// 按代码子串过滤，保持页面顺序
    pub fn filter_by_symbol(&self, pattern: &str) -> Vec<&Record> {
        let pattern = pattern.to_uppercase();
        self.data
            .iter()
            .filter(|r| r.symbol.to_uppercase().contains(&pattern))
            .collect()
    }

    fn rebuild_indices(&mut self) {
        self.symbol_index.clear();
        for (i, record) in self.data.iter().enumerate() {
            // 重复代码保留第一次出现的位置
            self.symbol_index.entry(record.symbol.clone()).or_insert(i);
        }
    }
}
