//! Display formatting for terminal output
//!
//! Provides table formatting for the list registry and for open lists.

pub mod list;

pub use list::{format_item_table, format_list_details, format_list_table};
