//! shoplist - persistence and format engine for shopping lists
//!
//! Keeps a directory of shopping lists, one file per list, in plain text,
//! CSV or spreadsheet form. One list at a time is open for editing; every
//! edit is written back immediately and a background task re-saves the open
//! list periodically.
//!
//! # Architecture
//!
//! - `config`: Storage root and user settings
//! - `error`: Custom error types
//! - `models`: Items, money, list metadata and the working set
//! - `codec`: Format detection and the text, CSV and spreadsheet codecs
//! - `storage`: Atomic file writes and the list registry
//! - `services`: The list store and the auto-save task
//! - `display`: Terminal tables
//! - `cli`: Command handlers for the `shoplist` binary
//!
//! # Example
//!
//! ```rust,ignore
//! use shoplist::config::{ShoplistPaths, Settings};
//! use shoplist::services::ListStore;
//!
//! let paths = ShoplistPaths::new()?;
//! let settings = Settings::load_or_create(&paths)?;
//! let store = ListStore::open(&paths, &settings).await?;
//! store.create_new_list(Some("Groceries")).await?;
//! store.add_item_raw("Milk", "2", "50").await?;
//! store.close().await?;
//! ```

pub mod cli;
pub mod codec;
pub mod config;
pub mod display;
pub mod error;
pub mod models;
pub mod services;
pub mod storage;

pub use error::{ShoplistError, ShoplistResult};
