//! Spreadsheet (`.xlsx`) codec
//!
//! One sheet named "Shopping List" with the same row layout as the CSV codec.
//! Price, quantity and totals are numeric cells. Reading uses the first
//! sheet of the workbook whatever its name.

use std::io::Cursor;

use calamine::{Data, Reader, Xlsx};
use chrono::{DateTime, Utc};
use rust_xlsxwriter::Workbook;

use super::{
    first_item_row, format_timestamp, is_total_row, COLUMN_LABELS, TITLE_PREFIX, TOTAL_LABEL,
};
use crate::error::{ShoplistError, ShoplistResult};
use crate::models::{parse_price, parse_quantity, total_of, Item, ListMetadata, Money};

/// Name of the sheet written by [`serialize`]
pub const SHEET_NAME: &str = "Shopping List";

fn cell_text(cell: Option<&Data>) -> String {
    cell.map(|c| c.to_string()).unwrap_or_default()
}

fn cell_is_empty(cell: Option<&Data>) -> bool {
    match cell {
        None | Some(Data::Empty) => true,
        Some(Data::String(s)) => s.trim().is_empty(),
        Some(_) => false,
    }
}

fn cell_price(cell: Option<&Data>) -> Money {
    match cell {
        Some(Data::Float(f)) => Money::from_f64(*f),
        Some(Data::Int(i)) => Money::new(*i, 0),
        Some(Data::String(s)) => parse_price(s),
        _ => Money::zero(),
    }
}

fn cell_quantity(cell: Option<&Data>) -> i64 {
    match cell {
        // Fractional quantities truncate toward zero
        Some(Data::Float(f)) => *f as i64,
        Some(Data::Int(i)) => *i,
        Some(Data::String(s)) => parse_quantity(s),
        _ => 0,
    }
}

/// Parse the first sheet of a workbook into items
pub fn parse(bytes: &[u8]) -> ShoplistResult<Vec<Item>> {
    let mut workbook = Xlsx::new(Cursor::new(bytes))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| ShoplistError::Parse("Workbook has no sheets".into()))??;

    let rows: Vec<&[Data]> = range.rows().collect();

    let labels: Vec<(String, String)> = rows
        .iter()
        .map(|row| (cell_text(row.first()), cell_text(row.get(1))))
        .collect();
    let start = first_item_row(labels.iter().map(|(n, p)| (n.as_str(), p.as_str())));

    let items = rows
        .iter()
        .skip(start)
        .filter_map(|row| {
            let name = cell_text(row.first()).trim().to_string();
            if name.is_empty() || is_total_row(&name, cell_is_empty(row.get(1))) {
                return None;
            }
            Some((name, row))
        })
        .zip(0..)
        .map(|((name, row), id)| {
            Item::new(
                id,
                name,
                cell_quantity(row.get(2)),
                cell_price(row.get(1)),
            )
        })
        .collect();

    Ok(items)
}

/// Serialize items as a single-sheet workbook
pub fn serialize(
    items: &[Item],
    list: &ListMetadata,
    exported_at: DateTime<Utc>,
) -> ShoplistResult<Vec<u8>> {
    let mut workbook = Workbook::new();

    {
        let sheet = workbook.add_worksheet();
        sheet.set_name(SHEET_NAME)?;

        sheet.write_string(0, 0, format!("{}{}", TITLE_PREFIX, list.name))?;
        sheet.write_string(1, 0, "Created")?;
        sheet.write_string(1, 1, format_timestamp(list.created_at))?;
        sheet.write_string(2, 0, "Exported")?;
        sheet.write_string(2, 1, format_timestamp(exported_at))?;

        for (col, label) in (0u16..).zip(COLUMN_LABELS) {
            sheet.write_string(3, col, label)?;
        }

        let mut row = 4u32;
        for item in items {
            sheet.write_string(row, 0, &item.name)?;
            sheet.write_number(row, 1, item.unit_price.to_f64())?;
            sheet.write_number(row, 2, item.quantity as f64)?;
            sheet.write_number(row, 3, item.line_total().to_f64())?;
            row += 1;
        }

        sheet.write_string(row, 0, TOTAL_LABEL)?;
        sheet.write_number(row, 3, total_of(items).to_f64())?;
    }

    Ok(workbook.save_to_buffer()?)
}
