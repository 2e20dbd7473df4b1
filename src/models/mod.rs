//! Core data models for shoplist
//!
//! Line items, list metadata and the working set, plus the `Money` type and
//! the lenient numeric parsers every codec relies on.

pub mod ids;
pub mod item;
pub mod list;
pub mod money;

pub use ids::ListId;
pub use item::{parse_price, parse_quantity, total_of, Item, ItemId, ItemValidationError};
pub use list::{ListMetadata, SortOrder, WorkingSet};
pub use money::{Money, MoneyParseError};
