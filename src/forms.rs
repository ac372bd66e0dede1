//! Form Validators
//!
//! Gate new lists and new items before they reach the controller.
//! A failed check means nothing is submitted.

use crate::models::{NewItem, NewList, MISCELLANEOUS};

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("list name is required")]
    EmptyListName,
    #[error("item name is required")]
    EmptyItemName,
    #[error("localized item name is required")]
    EmptyLocalizedName,
}

/// Check the create-list form and build the trimmed request.
pub fn validate_list_form(name: &str, destination: &str) -> Result<NewList, ValidationError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ValidationError::EmptyListName);
    }
    let destination = destination.trim();
    Ok(NewList {
        name: name.to_string(),
        destination: (!destination.is_empty()).then(|| destination.to_string()),
    })
}

/// Check the add-item form and build the trimmed request.
///
/// A blank category falls back to the miscellaneous bucket.
pub fn validate_item_form(
    name: &str,
    name_ar: &str,
    category: &str,
    notes: &str,
) -> Result<NewItem, ValidationError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ValidationError::EmptyItemName);
    }
    let name_ar = name_ar.trim();
    if name_ar.is_empty() {
        return Err(ValidationError::EmptyLocalizedName);
    }
    let category = match category.trim() {
        "" => MISCELLANEOUS,
        c => c,
    };
    Ok(NewItem {
        name: name.to_string(),
        name_ar: name_ar.to_string(),
        category: category.to_string(),
        notes: notes.trim().to_string(),
    })
}
