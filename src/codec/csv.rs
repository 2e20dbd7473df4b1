//! CSV codec
//!
//! Written documents carry a small preamble before the items:
//!
//! ```text
//! Shopping List: Groceries
//! Created,2024-03-01 12:30:00
//! Exported,2024-03-02 21:00:00
//! Item,Price,Quantity,Total
//! Milk,50.0,2,100.0
//! Total,,,100.0
//! ```
//!
//! On read, row 0 is always treated as a header. When the `Item,Price` label
//! row is present further down, items start right after it. Columns map to
//! name, price and quantity; anything past the third column is ignored.

use chrono::{DateTime, Utc};
use tracing::debug;

use super::{
    first_item_row, format_timestamp, is_total_row, COLUMN_LABELS, TITLE_PREFIX, TOTAL_LABEL,
};
use crate::error::{ShoplistError, ShoplistResult};
use crate::models::{parse_price, parse_quantity, total_of, Item, ListMetadata};

/// Parse a CSV document into items
pub fn parse(bytes: &[u8]) -> ShoplistResult<Vec<Item>> {
    let mut reader = ::csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(bytes);

    let mut records = Vec::new();
    for (row, result) in reader.records().enumerate() {
        match result {
            Ok(record) => records.push(record),
            Err(e) => debug!(row, error = %e, "Skipping unreadable CSV row"),
        }
    }

    let cell = |record: &::csv::StringRecord, index: usize| -> String {
        record.get(index).unwrap_or_default().to_string()
    };

    let start = first_item_row(
        records
            .iter()
            .map(|r| (r.get(0).unwrap_or_default(), r.get(1).unwrap_or_default())),
    );

    let items = records
        .iter()
        .skip(start)
        .filter(|record| {
            let name = record.get(0).unwrap_or_default().trim();
            let price = record.get(1).unwrap_or_default();
            !name.is_empty() && !is_total_row(name, price.trim().is_empty())
        })
        .zip(0..)
        .map(|(record, id)| {
            Item::new(
                id,
                cell(record, 0).trim(),
                parse_quantity(&cell(record, 2)),
                parse_price(&cell(record, 1)),
            )
        })
        .collect();

    Ok(items)
}

/// Serialize items as a CSV document
pub fn serialize(
    items: &[Item],
    list: &ListMetadata,
    exported_at: DateTime<Utc>,
) -> ShoplistResult<Vec<u8>> {
    let mut writer = ::csv::WriterBuilder::new()
        .flexible(true)
        .from_writer(Vec::new());

    let write_err = |e: ::csv::Error| ShoplistError::Export(format!("CSV: {}", e));

    writer
        .write_record([format!("{}{}", TITLE_PREFIX, list.name)])
        .map_err(write_err)?;
    writer
        .write_record(["Created".to_string(), format_timestamp(list.created_at)])
        .map_err(write_err)?;
    writer
        .write_record(["Exported".to_string(), format_timestamp(exported_at)])
        .map_err(write_err)?;
    writer.write_record(COLUMN_LABELS).map_err(write_err)?;

    for item in items {
        writer
            .write_record([
                item.name.clone(),
                item.unit_price.to_string(),
                item.quantity.to_string(),
                item.line_total().to_string(),
            ])
            .map_err(write_err)?;
    }

    writer
        .write_record([
            TOTAL_LABEL.to_string(),
            String::new(),
            String::new(),
            total_of(items).to_string(),
        ])
        .map_err(write_err)?;

    writer
        .into_inner()
        .map_err(|e| ShoplistError::Export(format!("CSV: {}", e)))
}
