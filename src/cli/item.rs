//! Item CLI commands
//!
//! Each command opens the list, applies one edit (which saves the list) and
//! closes it again.

use clap::Subcommand;

use super::open_list;
use crate::error::{ShoplistError, ShoplistResult};
use crate::models::{parse_price, parse_quantity, ItemId};
use crate::services::ListStore;

/// Item subcommands
#[derive(Subcommand)]
pub enum ItemCommands {
    /// Add an item to a list
    Add {
        /// List name, ID or file name
        list: String,
        /// Item name
        name: String,
        /// Quantity (non-numeric input counts as 0)
        quantity: String,
        /// Unit price, e.g. "50" or "49.99" (non-numeric input counts as 0)
        price: String,
    },
    /// Remove an item from a list
    Remove {
        /// List name, ID or file name
        list: String,
        /// Item ID as shown by `show`
        item_id: ItemId,
    },
    /// Edit an item
    Update {
        /// List name, ID or file name
        list: String,
        /// Item ID as shown by `show`
        item_id: ItemId,
        /// New name
        #[arg(short, long)]
        name: Option<String>,
        /// New quantity
        #[arg(short, long)]
        quantity: Option<String>,
        /// New unit price
        #[arg(short, long)]
        price: Option<String>,
    },
}

/// Handle an item command
pub async fn handle_item_command(
    store: &ListStore,
    currency: &str,
    cmd: ItemCommands,
) -> ShoplistResult<()> {
    match cmd {
        ItemCommands::Add {
            list,
            name,
            quantity,
            price,
        } => {
            let (meta, _) = open_list(store, &list).await?;
            let added = store.add_item_raw(&name, &quantity, &price).await;
            let working = store.working_set();
            store.close().await?;
            let item = added?;

            println!(
                "Added {} x {} @ {} to '{}' (item {})",
                item.quantity,
                item.name,
                item.unit_price.format_with_symbol(currency),
                meta.name,
                item.id
            );
            if let Some(working) = working {
                println!("  List total: {}", working.total().format_with_symbol(currency));
            }
        }

        ItemCommands::Remove { list, item_id } => {
            let (meta, _) = open_list(store, &list).await?;
            let removed = store.remove_item(item_id).await;
            store.close().await?;
            let item = removed?;

            println!("Removed {} from '{}'", item.name, meta.name);
        }

        ItemCommands::Update {
            list,
            item_id,
            name,
            quantity,
            price,
        } => {
            if name.is_none() && quantity.is_none() && price.is_none() {
                println!("No changes specified. Use --name, --quantity or --price.");
                return Ok(());
            }

            let (meta, working) = open_list(store, &list).await?;
            let mut item = working
                .items
                .iter()
                .find(|item| item.id == item_id)
                .cloned()
                .ok_or_else(|| ShoplistError::item_not_found(item_id.to_string()))?;

            if let Some(name) = name {
                item.name = name.trim().to_string();
            }
            if let Some(quantity) = quantity {
                item.quantity = parse_quantity(&quantity);
            }
            if let Some(price) = price {
                item.unit_price = parse_price(&price);
            }

            let updated = store.update_item(item).await;
            store.close().await?;
            let item = updated?;

            println!(
                "Updated item {} in '{}': {} x {} @ {}",
                item.id,
                meta.name,
                item.quantity,
                item.name,
                item.unit_price.format_with_symbol(currency)
            );
        }
    }

    Ok(())
}
