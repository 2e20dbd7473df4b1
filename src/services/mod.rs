//! Service layer for shoplist
//!
//! The list store is the single entry point for opening, editing, saving
//! and exporting lists. It runs blocking file work on tokio's blocking pool
//! and keeps a background auto-save task for the open list.

pub mod autosave;
pub mod list_store;

pub use autosave::AutoSave;
pub use list_store::ListStore;
