//! Cursor-paged list types.
//!
//! List endpoints return `{ "data": [...], "meta": { ... } }` where the
//! meta object carries an opaque cursor for the next page boundary and a
//! has-more flag. The meta key names vary between endpoints, so they are
//! configurable.

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};

/// Query parameters for a list endpoint, snapshotted for change detection.
///
/// A `BTreeMap` keeps the snapshot order-independent so structural
/// equality between two snapshots is meaningful.
pub type PageParams = BTreeMap<String, String>;

/// Names of the cursor and has-more fields inside the response meta.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageMetaKeys {
    /// Meta field holding the next-page cursor.
    pub cursor: String,
    /// Meta field holding the has-more flag.
    pub has_more: String,
}

impl PageMetaKeys {
    /// Creates custom meta key names.
    #[must_use]
    pub fn new(cursor: impl Into<String>, has_more: impl Into<String>) -> Self {
        Self {
            cursor: cursor.into(),
            has_more: has_more.into(),
        }
    }
}

impl Default for PageMetaKeys {
    fn default() -> Self {
        Self::new("next_cursor", "has_next_page")
    }
}

/// One page of a cursor-paginated listing.
///
/// When `has_more` is false the cursor is stale and must be ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CursorPage<T> {
    /// Items of this page, in server order.
    pub items: Vec<T>,
    /// Opaque pointer to the next page boundary.
    pub next_cursor: Option<String>,
    /// Whether another page exists after this one.
    pub has_more: bool,
}

impl<T: DeserializeOwned> CursorPage<T> {
    /// Decodes a page from a raw list-endpoint body.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidBody` when `data` is missing or not an
    /// array, and `DomainError::InvalidPageMeta` when the meta object is
    /// malformed. A missing meta object means a final, single page.
    pub fn from_json(value: &serde_json::Value, keys: &PageMetaKeys) -> DomainResult<Self> {
        let items = value
            .get("data")
            .ok_or_else(|| DomainError::InvalidBody("missing `data` field".to_string()))?;
        let items: Vec<T> = serde_json::from_value(items.clone())
            .map_err(|e| DomainError::InvalidBody(format!("bad `data` items: {e}")))?;

        let Some(meta) = value.get("meta") else {
            return Ok(Self {
                items,
                next_cursor: None,
                has_more: false,
            });
        };
        let meta = meta
            .as_object()
            .ok_or_else(|| DomainError::InvalidPageMeta("`meta` is not an object".to_string()))?;

        let next_cursor = match meta.get(&keys.cursor) {
            None | Some(serde_json::Value::Null) => None,
            Some(serde_json::Value::String(s)) => Some(s.clone()),
            Some(other) => {
                return Err(DomainError::InvalidPageMeta(format!(
                    "cursor `{}` is not a string: {other}",
                    keys.cursor
                )));
            }
        };
        let has_more = meta
            .get(&keys.has_more)
            .and_then(serde_json::Value::as_bool)
            .unwrap_or(false);

        Ok(Self {
            items,
            next_cursor,
            has_more,
        })
    }
}
