//! CLI command handlers
//!
//! This module contains the implementation of CLI commands,
//! bridging the clap argument parsing with the list store.

pub mod item;
pub mod list;

pub use item::{handle_item_command, ItemCommands};
pub use list::{handle_list_command, ListCommands};

use crate::error::{ShoplistError, ShoplistResult};
use crate::models::{ListMetadata, WorkingSet};
use crate::services::ListStore;

/// Look up a list by ID, name or file name
pub(crate) async fn resolve_list(store: &ListStore, identifier: &str) -> ShoplistResult<ListMetadata> {
    store
        .find(identifier)
        .await
        .ok_or_else(|| ShoplistError::list_not_found(identifier))
}

/// Resolve a list and make it the open working set
pub(crate) async fn open_list(
    store: &ListStore,
    identifier: &str,
) -> ShoplistResult<(ListMetadata, WorkingSet)> {
    let meta = resolve_list(store, identifier).await?;
    let working = store.load_list(meta.id).await?;
    Ok((meta, working))
}
