//! Plain text codec
//!
//! Two dialects are read:
//!
//! * **Standard**: one item per line as `name: price: quantity`, fields split
//!   on the colon-space pattern. Lines without that pattern are not items.
//! * **Legacy**: a `Shopping List` banner, then item lines fenced by dashed
//!   separator lines, then a total and a last-edited line. A single pass
//!   flips an "inside item rows" flag on each separator and only reads
//!   colon-delimited lines while the flag is set.
//!
//! Only the standard dialect is written. The writer keeps the metadata lines
//! free of the colon-space pattern so they never read back as items.

use chrono::{DateTime, Utc};

use super::{format_timestamp, is_column_label_row};
use crate::models::{parse_price, parse_quantity, total_of, Item, ListMetadata};

/// Banner text that marks the legacy dialect
pub(crate) const BANNER: &str = "Shopping List";

/// Field separator of the standard dialect
const FIELD_SEPARATOR: &str = ": ";

/// Whether `line` is a dashed separator line (three or more dashes only)
pub(crate) fn is_separator_line(line: &str) -> bool {
    let line = line.trim();
    line.len() >= 3 && line.chars().all(|c| c == '-')
}

/// Raw fields of one item line, before numeric parsing
struct Fields<'a> {
    name: &'a str,
    price: &'a str,
    quantity: &'a str,
}

/// Number items `0..n` in the order their lines appear
fn into_items<'a>(rows: impl IntoIterator<Item = Fields<'a>>) -> Vec<Item> {
    rows.into_iter()
        .zip(0..)
        .map(|(fields, id)| {
            Item::new(
                id,
                fields.name,
                parse_quantity(fields.quantity),
                parse_price(fields.price),
            )
        })
        .collect()
}

fn split_standard(line: &str) -> Option<Fields<'_>> {
    if !line.contains(FIELD_SEPARATOR) {
        return None;
    }

    let mut parts = line.split(FIELD_SEPARATOR);
    let name = parts.next().unwrap_or_default().trim();
    let price = parts.next().unwrap_or_default();
    let quantity = parts.next().unwrap_or_default();

    if name.is_empty() || is_column_label_row(name, price) {
        return None;
    }

    Some(Fields {
        name,
        price,
        quantity,
    })
}

/// Parse the standard dialect
pub fn parse_standard(bytes: &[u8]) -> Vec<Item> {
    let text = String::from_utf8_lossy(bytes);
    into_items(text.lines().filter_map(split_standard))
}

/// Parse the legacy dialect
///
/// Files saved by the old app put an `Item: Price: Quantity` label line
/// between two separators before the items. The label line is not an item,
/// and the separator right after it does not close the block.
pub fn parse_legacy(bytes: &[u8]) -> Vec<Item> {
    let text = String::from_utf8_lossy(bytes);

    let mut rows = Vec::new();
    let mut inside_items = false;
    let mut after_label = false;

    for line in text.lines() {
        if is_separator_line(line) {
            if !after_label {
                inside_items = !inside_items;
            }
            after_label = false;
            continue;
        }
        after_label = false;

        if !inside_items || !line.contains(':') {
            continue;
        }

        let mut parts = line.split(':');
        let name = parts.next().unwrap_or_default().trim();
        let (Some(price), Some(quantity)) = (parts.next(), parts.next()) else {
            continue;
        };

        if is_column_label_row(name, price) {
            after_label = true;
            continue;
        }
        if name.is_empty() {
            continue;
        }

        rows.push(Fields {
            name,
            price,
            quantity,
        });
    }

    into_items(rows)
}

/// Make a value safe to embed in a standard-dialect line
fn text_field(value: &str) -> String {
    let mut value = value.replace(['\r', '\n'], " ");
    while value.contains(FIELD_SEPARATOR) {
        value = value.replace(FIELD_SEPARATOR, ":");
    }
    value
}

/// Serialize items in the standard dialect
pub fn serialize(items: &[Item], list: &ListMetadata, exported_at: DateTime<Utc>) -> Vec<u8> {
    let mut out = String::new();

    out.push_str(&format!("# {}\n", text_field(&list.name)));
    out.push_str(&format!("# Created {}\n", format_timestamp(list.created_at)));
    out.push_str(&format!("# Exported {}\n", format_timestamp(exported_at)));
    out.push('\n');

    for item in items {
        out.push_str(&format!(
            "{}: {}: {}: {}\n",
            text_field(&item.name),
            item.unit_price,
            item.quantity,
            item.line_total()
        ));
    }

    out.push('\n');
    out.push_str(&format!("# Total {}\n", total_of(items)));

    out.into_bytes()
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{exported_at, sample_items, sample_list};
    use super::*;
    use crate::models::Money;

    #[test]
    fn test_parse_standard() {
        let items = parse_standard(b"Milk: 50.0: 2\n\nno separator here\nBread: 40: 1\n");
        assert_eq!(items.len(), 2);
        assert_eq!(items[0], Item::new(0, "Milk", 2, Money::new(50, 0)));
        assert_eq!(items[1], Item::new(1, "Bread", 1, Money::new(40, 0)));
    }

    #[test]
    fn test_malformed_price_defaults_to_zero() {
        let items = parse_standard(b"Milk: abc: 3\n");
        assert_eq!(items, vec![Item::new(0, "Milk", 3, Money::zero())]);
    }

    #[test]
    fn test_missing_fields_default_to_zero() {
        let items = parse_standard(b"Eggs: 12\n");
        assert_eq!(items, vec![Item::new(0, "Eggs", 0, Money::new(12, 0))]);
    }

    #[test]
    fn test_standard_skips_label_and_nameless_lines() {
        let items = parse_standard(b"Item: Price: Quantity\n: 5: 1\nTea: 3: 1\r\n");
        assert_eq!(items, vec![Item::new(0, "Tea", 1, Money::new(3, 0))]);
    }

    #[test]
    fn test_parse_legacy() {
        let content = "Shopping List\n\
                       -----------------------------\n\
                       Milk: 50.0: 2\n\
                       Bread: 40.0: 1\n\
                       not an item\n\
                       -----------------------------\n\
                       Total: Kshs. 140.0\n\
                       Last edited: 2024-01-01 10:00:00\n";

        let items = parse_legacy(content.as_bytes());
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].name, "Milk");
        assert_eq!(items[1], Item::new(1, "Bread", 1, Money::new(40, 0)));
    }

    #[test]
    fn test_legacy_lines_outside_block_are_ignored() {
        let content = "Shopping List\nStray: 1: 1\n---\nTea: 3: 1\n---\nAfter: 2: 2\n";
        let items = parse_legacy(content.as_bytes());
        assert_eq!(items, vec![Item::new(0, "Tea", 1, Money::new(3, 0))]);
    }

    #[test]
    fn test_legacy_reopens_on_third_separator() {
        let content = "Shopping List\n---\nA: 1: 1\n---\nB: 2: 2\n---\nC: 3: 3\n";
        let names: Vec<_> = parse_legacy(content.as_bytes())
            .into_iter()
            .map(|i| i.name)
            .collect();
        assert_eq!(names, vec!["A", "C"]);
    }

    #[test]
    fn test_legacy_old_app_layout() {
        let content = "Shopping List\n\
                       -----------------------------\n\
                       Item: Price: Quantity\n\
                       -----------------------------\n\
                       Milk: 50.0: 2\n\
                       Bread: 40.0: 1\n\
                       -----------------------------\n\
                       Total: Kshs. 140.0\n\
                       \n\
                       Last edited: 2024-01-01 10:00:00\n";

        let items = parse_legacy(content.as_bytes());
        let names: Vec<_> = items.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["Milk", "Bread"]);
    }

    #[test]
    fn test_serialize_layout() {
        let bytes = serialize(&sample_items(), &sample_list(), exported_at());
        let text = String::from_utf8(bytes).unwrap();
        let lines: Vec<_> = text.lines().collect();

        assert_eq!(lines[0], "# Groceries");
        assert!(lines[1].starts_with("# Created "));
        assert!(lines[2].starts_with("# Exported "));
        assert_eq!(lines[3], "");
        assert_eq!(lines[4], "Milk: 50.0: 2: 100.0");
        assert_eq!(lines[5], "Bread: 40.0: 1: 40.0");
        assert_eq!(lines[6], "");
        assert_eq!(lines[7], "# Total 140.0");
    }

    #[test]
    fn test_total_is_recomputed_not_copied() {
        let list = sample_list();
        assert_eq!(list.total_amount, Money::new(999, 0));

        let text = String::from_utf8(serialize(&sample_items(), &list, exported_at())).unwrap();
        assert!(text.contains("# Total 140.0"));
        assert!(!text.contains("999"));
    }

    #[test]
    fn test_round_trip_renumbers_ids() {
        let items = vec![
            Item::new(4, "Milk", 2, Money::parse("50.0").unwrap()),
            Item::new(9, "Rice: basmati", 1, Money::parse("120.5").unwrap()),
        ];
        let bytes = serialize(&items, &sample_list(), exported_at());
        let parsed = parse_standard(&bytes);

        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0], Item::new(0, "Milk", 2, Money::new(50, 0)));
        assert_eq!(parsed[1].id, 1);
        assert_eq!(parsed[1].name, "Rice:basmati");
        assert_eq!(parsed[1].unit_price, Money::new(1205, 1));
    }

    #[test]
    fn test_written_files_sniff_as_standard() {
        let mut list = sample_list();
        list.name = "Shopping List ---".into();
        let bytes = serialize(&sample_items(), &list, exported_at());
        assert_eq!(
            crate::codec::detect("x.txt", &bytes),
            Some(crate::codec::FormatKind::PlainTextStandard)
        );
    }
}
