//! Line item model
//!
//! An item is one row of a shopping list. Numeric fields coming from files or
//! user entry go through [`parse_quantity`] and [`parse_price`], which never
//! fail: anything that is not a number becomes zero and the item is kept.

use serde::{Deserialize, Serialize};

use super::money::Money;

/// Identifier of an item, unique within one working set only
pub type ItemId = u32;

/// A purchasable line item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    /// Position-derived id, reassigned whenever a list is read from disk
    pub id: ItemId,
    /// Display name
    pub name: String,
    /// Number of units
    pub quantity: i64,
    /// Price of a single unit
    pub unit_price: Money,
}

impl Item {
    /// Create a new item
    pub fn new(id: ItemId, name: impl Into<String>, quantity: i64, unit_price: Money) -> Self {
        Self {
            id,
            name: name.into(),
            quantity,
            unit_price,
        }
    }

    /// `quantity * unit_price`, always derived
    pub fn line_total(&self) -> Money {
        self.unit_price.times(self.quantity)
    }

    /// Validate an item entered by a user
    ///
    /// Items read by a codec skip this check on purpose.
    pub fn validate(&self) -> Result<(), ItemValidationError> {
        if self.name.trim().is_empty() {
            return Err(ItemValidationError::EmptyName);
        }

        if self.quantity < 0 {
            return Err(ItemValidationError::NegativeQuantity(self.quantity));
        }

        if self.unit_price.is_negative() {
            return Err(ItemValidationError::NegativePrice(self.unit_price));
        }

        Ok(())
    }
}

/// Parse a quantity field, defaulting to 0 on non-numeric input
pub fn parse_quantity(raw: &str) -> i64 {
    raw.trim().parse().unwrap_or(0)
}

/// Parse a price field, defaulting to 0 on non-numeric input
pub fn parse_price(raw: &str) -> Money {
    Money::parse(raw).unwrap_or_default()
}

/// Sum of line totals
pub fn total_of(items: &[Item]) -> Money {
    items.iter().map(Item::line_total).sum()
}

/// Validation errors for items
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ItemValidationError {
    #[error("Item name cannot be empty")]
    EmptyName,
    #[error("Quantity cannot be negative: {0}")]
    NegativeQuantity(i64),
    #[error("Price cannot be negative: {0}")]
    NegativePrice(Money),
}
