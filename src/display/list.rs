//! List display formatting
//!
//! Formats the registry and an open list for terminal output.

use chrono::{DateTime, Local, Utc};
use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::models::{Item, ListMetadata, WorkingSet};

#[derive(Tabled)]
struct ListRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Total")]
    total: String,
    #[tabled(rename = "Last Modified")]
    last_modified: String,
    #[tabled(rename = "Created")]
    created: String,
}

#[derive(Tabled)]
struct ItemRow {
    #[tabled(rename = "ID")]
    id: u32,
    #[tabled(rename = "Item")]
    name: String,
    #[tabled(rename = "Price")]
    price: String,
    #[tabled(rename = "Qty")]
    quantity: i64,
    #[tabled(rename = "Total")]
    total: String,
}

fn local_time(at: DateTime<Utc>) -> String {
    at.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string()
}

/// Format the registry as a table
pub fn format_list_table(lists: &[ListMetadata], currency: &str) -> String {
    if lists.is_empty() {
        return "No shopping lists found.\n".to_string();
    }

    let rows = lists.iter().map(|list| ListRow {
        id: list.id.to_string(),
        name: list.name.clone(),
        total: list.total_amount.format_with_symbol(currency),
        last_modified: local_time(list.last_modified_at),
        created: local_time(list.created_at),
    });

    let mut output = Table::new(rows).with(Style::rounded()).to_string();
    output.push('\n');
    output
}

/// Format the items of a list as a table
pub fn format_item_table(items: &[Item], currency: &str) -> String {
    if items.is_empty() {
        return "No items yet.\n".to_string();
    }

    let rows = items.iter().map(|item| ItemRow {
        id: item.id,
        name: item.name.clone(),
        price: item.unit_price.format_with_symbol(currency),
        quantity: item.quantity,
        total: item.line_total().format_with_symbol(currency),
    });

    let mut output = Table::new(rows).with(Style::rounded()).to_string();
    output.push('\n');
    output
}

/// Format an open list: heading, items and grand total
pub fn format_list_details(list: &ListMetadata, working: &WorkingSet, currency: &str) -> String {
    let mut output = String::new();

    output.push_str(&format!("{}\n", list.name));
    output.push_str(&format!("  ID:       {}\n", list.id));
    output.push_str(&format!("  File:     {}\n", list.storage_path.display()));
    output.push_str(&format!("  Created:  {}\n", local_time(list.created_at)));
    output.push_str(&format!("  Modified: {}\n", local_time(list.last_modified_at)));
    output.push('\n');

    output.push_str(&format_item_table(&working.items, currency));
    output.push_str(&format!(
        "\nTotal: {}\n",
        working.total().format_with_symbol(currency)
    ));

    output
}
