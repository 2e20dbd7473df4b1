//! Storage layer for shoplist
//!
//! Atomic whole-file writes and the registry of list files kept in the
//! lists directory.

pub mod file_io;
pub mod registry;

pub use file_io::{read_bytes, remove_file_if_exists, write_atomic, write_json_atomic};
pub use registry::{allocate_path, display_name, remove_list_file, scan_directory, ListRegistry};
