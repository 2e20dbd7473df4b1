//! List CLI commands
//!
//! Implements CLI commands for creating, showing, deleting, importing and
//! exporting lists, and for the registry order.

use std::path::PathBuf;

use clap::Subcommand;

use super::{open_list, resolve_list};
use crate::codec::ExportFormat;
use crate::config::{Settings, ShoplistPaths};
use crate::display::{format_list_details, format_list_table};
use crate::error::{ShoplistError, ShoplistResult};
use crate::models::SortOrder;
use crate::services::ListStore;

/// List subcommands
#[derive(Subcommand)]
pub enum ListCommands {
    /// Show all saved lists
    Lists {
        /// Order for this listing (last-modified, created, total)
        #[arg(short, long)]
        sort: Option<String>,
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Create a new, empty list
    New {
        /// List name (defaults to a timestamped name)
        name: Option<String>,
    },
    /// Show the items of a list
    Show {
        /// List name, ID or file name
        list: String,
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Delete a list and its file
    Delete {
        /// List name, ID or file name
        list: String,
    },
    /// Export a list to the export directory
    Export {
        /// List name, ID or file name
        list: String,
        /// Output format (txt, csv, xlsx)
        #[arg(short, long, default_value = "txt")]
        format: String,
    },
    /// Import a .txt, .csv or .xlsx file as a new list
    Import {
        /// Path to the file
        file: PathBuf,
    },
    /// Set the default order of the list overview
    Sort {
        /// Sort order (last-modified, created, total)
        order: String,
    },
}

fn parse_sort_order(s: &str) -> ShoplistResult<SortOrder> {
    SortOrder::parse(s).ok_or_else(|| {
        ShoplistError::Validation(format!(
            "Invalid sort order: '{}'. Valid orders: last-modified, created, total",
            s
        ))
    })
}

/// Handle a list command
pub async fn handle_list_command(
    store: &ListStore,
    paths: &ShoplistPaths,
    settings: &mut Settings,
    cmd: ListCommands,
) -> ShoplistResult<()> {
    let currency = settings.currency_symbol.clone();

    match cmd {
        ListCommands::Lists { sort, json } => {
            if let Some(sort) = sort {
                store.change_sort_order(parse_sort_order(&sort)?).await;
            }

            let lists = store.lists();
            if json {
                println!("{}", serde_json::to_string_pretty(&lists)?);
            } else {
                print!("{}", format_list_table(&lists, &currency));
            }
        }

        ListCommands::New { name } => {
            let list = store.create_new_list(name.as_deref()).await?;
            store.close().await?;

            println!("Created list: {}", list.name);
            println!("  File: {}", list.storage_path.display());
            println!("  ID: {}", list.id);
        }

        ListCommands::Show { list, json } => {
            let (meta, working) = open_list(store, &list).await?;
            store.stop_auto_save().await;

            if json {
                let details = serde_json::json!({
                    "list": meta,
                    "items": working.items,
                    "total": working.total(),
                });
                println!("{}", serde_json::to_string_pretty(&details)?);
            } else {
                print!("{}", format_list_details(&meta, &working, &currency));
            }
        }

        ListCommands::Delete { list } => {
            let found = resolve_list(store, &list).await?;
            let deleted = store.delete_list(found.id).await?;
            println!("Deleted list: {}", deleted.name);
        }

        ListCommands::Export { list, format } => {
            let format = ExportFormat::parse(&format).ok_or_else(|| {
                ShoplistError::Validation(format!(
                    "Invalid export format: '{}'. Valid formats: txt, csv, xlsx",
                    format
                ))
            })?;

            let (meta, _) = open_list(store, &list).await?;
            let exported = store.export(format).await;
            store.stop_auto_save().await;

            match exported? {
                Some(path) => println!("Exported '{}' to {}", meta.name, path.display()),
                None => println!("Nothing to export: '{}' has no items.", meta.name),
            }
        }

        ListCommands::Import { file } => {
            let list = store.import_file(&file).await?;
            store.close().await?;

            println!("Imported list: {}", list.name);
            println!("  Total: {}", list.total_amount.format_with_symbol(&currency));
            println!("  File: {}", list.storage_path.display());
        }

        ListCommands::Sort { order } => {
            let order = parse_sort_order(&order)?;
            settings.sort_order = order;
            settings.save(paths)?;
            store.change_sort_order(order).await;

            println!("Lists are now sorted by {}.", order);
        }
    }

    Ok(())
}
