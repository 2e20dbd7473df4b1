//! Configuration module for shoplist
//!
//! This module provides configuration management including:
//! - Storage root and directory resolution
//! - User settings persistence

pub mod paths;
pub mod settings;

pub use paths::ShoplistPaths;
pub use settings::Settings;
