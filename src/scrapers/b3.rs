use crate::config::Config;
use crate::errors::{DataHubError, Result};
use crate::models::record::RawRow;
use crate::scrapers::base::IndexScraper;
use async_trait::async_trait;
use log::{debug, info, warn};
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};
use thiserror::Error;

/// 表格行的形状问题，只用于决定跳过，不会中断抓取
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RowShapeError {
    #[error("row has {found} cell(s), at least 2 required")]
    TooFewCells { found: usize },
}

/// B3 指数成分表抓取器
pub struct B3Scraper {
    client: Client,
    source_url: String,
}

impl B3Scraper {
    pub fn new(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .user_agent("Mozilla/5.0 (compatible; B3DataHub/1.0)")
            .timeout(config.request_timeout)
            .build()
            .map_err(DataHubError::RequestError)?;

        Ok(Self {
            client,
            source_url: config.source_url.clone(),
        })
    }

    async fn fetch_page(&self) -> Result<String> {
        let response = self
            .client
            .get(&self.source_url)
            .send()
            .await
            .map_err(|e| DataHubError::FetchError(format!("GET {} failed: {}", self.source_url, e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DataHubError::FetchError(format!(
                "GET {} returned {}",
                self.source_url, status
            )));
        }

        response
            .text()
            .await
            .map_err(|e| DataHubError::FetchError(format!("Reading body of {} failed: {}", self.source_url, e)))
    }
}

#[async_trait]
impl IndexScraper for B3Scraper {
    fn source_name(&self) -> &str {
        "B3"
    }

    async fn fetch_rows(&self) -> Result<Vec<RawRow>> {
        info!("获取 B3 指数页面: {}", self.source_url);
        let body = self.fetch_page().await?;
        debug!("成功获取响应，{} 字节", body.len());

        let rows = parse_index_table(&body)?;
        info!("解析到 {} 行指数成分", rows.len());
        Ok(rows)
    }
}

fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| DataHubError::ParseError(format!("Invalid selector {}: {:?}", css, e)))
}

fn cell_texts(row: ElementRef<'_>, td: &Selector) -> Vec<String> {
    row.select(td)
        .map(|cell| cell.text().collect::<String>().trim().to_string())
        .collect()
}

/// Decide whether a data row is usable.
///
/// Rows with two or more cells are kept in position order (name, price,
/// change). A missing change cell becomes an empty string, which the
/// normalizer rejects instead of the extractor silently inventing a value.
pub fn classify_row(cells: &[String]) -> std::result::Result<RawRow, RowShapeError> {
    if cells.len() < 2 {
        return Err(RowShapeError::TooFewCells { found: cells.len() });
    }

    Ok(RawRow {
        label: cells[0].clone(),
        price_text: cells[1].clone(),
        change_text: cells.get(2).cloned().unwrap_or_default(),
    })
}

/// 解析页面中的第一个 `<table>`，跳过表头行
pub fn parse_index_table(html: &str) -> Result<Vec<RawRow>> {
    let document = Html::parse_document(html);
    let table_selector = selector("table")?;
    let tr_selector = selector("tr")?;
    let td_selector = selector("td")?;

    let table = document
        .select(&table_selector)
        .next()
        .ok_or_else(|| DataHubError::ParseError("No <table> element in response".to_string()))?;

    let mut rows = Vec::new();
    for (index, tr) in table.select(&tr_selector).enumerate().skip(1) {
        let cells = cell_texts(tr, &td_selector);
        match classify_row(&cells) {
            Ok(row) => rows.push(row),
            Err(e) => warn!("跳过表格第 {} 行: {}", index, e),
        }
    }

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(body_rows: &str) -> String {
        format!(
            "<html><body><h1>IBOV</h1><table>\
             <tr><th>Código</th><th>Preço</th><th>Var. (%)</th></tr>{}\
             </table></body></html>",
            body_rows
        )
    }

    #[test]
    fn extracts_data_rows_in_page_order() {
        let html = page(
            "<tr><td> PETR4 </td><td>38,12</td><td>1,05</td></tr>\
             <tr><td>VALE3</td><td>61,40</td><td>-0,87</td></tr>",
        );
        let rows = parse_index_table(&html).unwrap();
        assert_eq!(
            rows,
            vec![
                RawRow::new("PETR4", "38,12", "1,05"),
                RawRow::new("VALE3", "61,40", "-0,87"),
            ]
        );
    }

    #[test]
    fn rows_with_fewer_than_two_cells_are_skipped() {
        let html = page(
            "<tr><td>PETR4</td><td>38,12</td><td>1,05</td></tr>\
             <tr><td colspan=\"3\">Quantidade teórica total</td></tr>\
             <tr></tr>\
             <tr><td>ITUB4</td><td>abc</td><td>?</td></tr>",
        );
        let rows = parse_index_table(&html).unwrap();
        // 内容不合法的行照样保留，交给 normalizer 校验
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].price_text, "abc");
    }

    #[test]
    fn two_cell_row_gets_empty_change() {
        let html = page("<tr><td>BBAS3</td><td>27,10</td></tr>");
        let rows = parse_index_table(&html).unwrap();
        assert_eq!(rows, vec![RawRow::new("BBAS3", "27,10", "")]);
    }

    #[test]
    fn header_only_table_yields_no_rows() {
        let rows = parse_index_table(&page("")).unwrap();
        assert!(rows.is_empty());
    }

    #[test]
    fn missing_table_is_a_parse_error() {
        let err = parse_index_table("<html><body><p>Em manutenção</p></body></html>").unwrap_err();
        assert!(matches!(err, DataHubError::ParseError(_)));
    }

    #[test]
    fn only_the_first_table_is_read() {
        let html = "<table><tr><th>h</th></tr><tr><td>A</td><td>1,0</td><td>2,0</td></tr></table>\
                    <table><tr><th>h</th></tr><tr><td>B</td><td>3,0</td><td>4,0</td></tr></table>";
        let rows = parse_index_table(html).unwrap();
        assert_eq!(rows, vec![RawRow::new("A", "1,0", "2,0")]);
    }

    #[test]
    fn classify_row_reports_cell_count() {
        assert_eq!(
            classify_row(&["only".to_string()]),
            Err(RowShapeError::TooFewCells { found: 1 })
        );
        assert_eq!(classify_row(&[]), Err(RowShapeError::TooFewCells { found: 0 }));
    }
}
