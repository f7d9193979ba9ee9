use chrono::NaiveDate;
use crate::errors::{Result, DataHubError};

// 1970-01-01 距公元元年的天数
const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

// 日期转换工具
pub fn naive_date_to_days(date: NaiveDate) -> i32 {
    use chrono::Datelike;
    date.num_days_from_ce() - UNIX_EPOCH_DAYS_FROM_CE
}

pub fn days_to_naive_date(days: i32) -> Result<NaiveDate> {
    days.checked_add(UNIX_EPOCH_DAYS_FROM_CE)
        .and_then(NaiveDate::from_num_days_from_ce_opt)
        .ok_or_else(|| DataHubError::ArrowError(format!("Date32 value out of range: {}", days)))
}

pub fn parse_partition_date(date_str: &str) -> Result<NaiveDate> {
    Ok(NaiveDate::parse_from_str(date_str, "%Y-%m-%d")?)
}

// Parquet 列式编码工具
pub mod parquet_utils {
    use super::*;
    use crate::models::record::Record;
    use arrow::array::{ArrayRef, StringBuilder};
    use arrow_schema::{DataType, Field, Schema, SchemaRef};
    use arrow::record_batch::RecordBatch;
    use arrow_array::{Array, Date32Array, Float64Array, StringArray};
    use bytes::Bytes;
    use log::info;
    use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
    use parquet::arrow::ArrowWriter;
    use parquet::basic::Compression;
    use parquet::file::properties::WriterProperties;
    use std::sync::Arc;

    /// Fixed schema of the raw partition file.
    pub fn record_schema() -> SchemaRef {
        Arc::new(Schema::new(vec![
            Field::new("symbol", DataType::Utf8, false),
            Field::new("price", DataType::Float64, false),
            Field::new("change_pct", DataType::Float64, false),
            Field::new("trade_date", DataType::Date32, false),
        ]))
    }

    // 将记录转换为Arrow记录批次
    pub fn records_to_record_batch(records: &[Record]) -> Result<RecordBatch> {
        let mut symbol_builder = StringBuilder::new();
        let mut price_values = Vec::with_capacity(records.len());
        let mut change_values = Vec::with_capacity(records.len());
        let mut date_values = Vec::with_capacity(records.len());

        for record in records {
            symbol_builder.append_value(&record.symbol);
            price_values.push(record.price);
            change_values.push(record.change_pct);
            date_values.push(naive_date_to_days(record.trade_date));
        }

        let columns: Vec<ArrayRef> = vec![
            Arc::new(symbol_builder.finish()),
            Arc::new(Float64Array::from(price_values)),
            Arc::new(Float64Array::from(change_values)),
            Arc::new(Date32Array::from(date_values)),
        ];

        RecordBatch::try_new(record_schema(), columns)
            .map_err(|e| DataHubError::ArrowError(e.to_string()))
    }

    /// 编码为 Snappy 压缩的 Parquet 文件内容
    pub fn encode(records: &[Record]) -> Result<Vec<u8>> {
        let batch = records_to_record_batch(records)?;
        let props = WriterProperties::builder()
            .set_compression(Compression::SNAPPY)
            .build();

        let mut buffer = Vec::new();
        let mut writer = ArrowWriter::try_new(&mut buffer, batch.schema(), Some(props))?;
        writer.write(&batch)?;
        writer.close()?;

        info!("Encoded {} records into {} bytes of parquet", records.len(), buffer.len());
        Ok(buffer)
    }

    fn column<'a, T: 'static>(batch: &'a RecordBatch, name: &str) -> Result<&'a T> {
        batch
            .column_by_name(name)
            .and_then(|a| a.as_any().downcast_ref::<T>())
            .ok_or_else(|| DataHubError::ArrowError(format!("Failed to downcast {} column", name)))
    }

    // 从内存中读取Parquet数据
    pub fn decode(data: &[u8]) -> Result<Vec<Record>> {
        let reader = ParquetRecordBatchReaderBuilder::try_new(Bytes::copy_from_slice(data))?.build()?;

        let mut result = Vec::new();
        for batch in reader {
            let batch = batch.map_err(|e| DataHubError::ArrowError(e.to_string()))?;

            let symbol_array = column::<StringArray>(&batch, "symbol")?;
            let price_array = column::<Float64Array>(&batch, "price")?;
            let change_array = column::<Float64Array>(&batch, "change_pct")?;
            let date_array = column::<Date32Array>(&batch, "trade_date")?;

            for i in 0..batch.num_rows() {
                if symbol_array.is_null(i) || price_array.is_null(i) || change_array.is_null(i) || date_array.is_null(i) {
                    return Err(DataHubError::ArrowError(format!("Unexpected null in row {}", i)));
                }
                result.push(Record {
                    symbol: symbol_array.value(i).to_string(),
                    price: price_array.value(i),
                    change_pct: change_array.value(i),
                    trade_date: days_to_naive_date(date_array.value(i))?,
                });
            }
        }

        Ok(result)
    }
}
