//! Persistence hand-off for imported budget items.

use std::collections::HashMap;

use sitebudget_shared::{AppError, AppResult};
use sitebudget_shared::types::LocationId;

use super::types::BudgetLineItem;

/// Receives imported items for a location.
///
/// Implementations create items whose line item number is new to the
/// location and update those that already exist.
pub trait BudgetItemStore {
    /// Creates or updates `items` for `location_id`, returning how many were written.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store rejects the write.
    fn save_location_items(
        &mut self,
        location_id: LocationId,
        items: &[BudgetLineItem],
    ) -> AppResult<usize>;

    /// Loads one stored item by line item number.
    ///
    /// # Errors
    ///
    /// Returns `AppError::LocationNotFound` or `AppError::LineItemNotFound`
    /// when nothing matches.
    fn load_item(&self, location_id: LocationId, number: &str) -> AppResult<BudgetLineItem>;
}

/// In-process store keyed by location.
#[derive(Debug, Default)]
pub struct InMemoryBudgetItemStore {
    locations: HashMap<LocationId, Vec<BudgetLineItem>>,
}

impl InMemoryBudgetItemStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Items stored for a location, in insertion order.
    #[must_use]
    pub fn items_for(&self, location_id: LocationId) -> &[BudgetLineItem] {
        self.locations
            .get(&location_id)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}

impl BudgetItemStore for InMemoryBudgetItemStore {
    fn save_location_items(
        &mut self,
        location_id: LocationId,
        items: &[BudgetLineItem],
    ) -> AppResult<usize> {
        let stored = self.locations.entry(location_id).or_default();
        for item in items {
            match stored
                .iter_mut()
                .find(|existing| existing.line_item_number == item.line_item_number)
            {
                Some(existing) => *existing = item.clone(),
                None => stored.push(item.clone()),
            }
        }
        Ok(items.len())
    }

    fn load_item(&self, location_id: LocationId, number: &str) -> AppResult<BudgetLineItem> {
        let items = self
            .locations
            .get(&location_id)
            .ok_or(AppError::LocationNotFound(location_id))?;
        let number = number.trim();
        items
            .iter()
            .find(|item| item.line_item_number == number)
            .cloned()
            .ok_or_else(|| AppError::LineItemNotFound {
                location_id,
                number: number.to_string(),
            })
    }
}
