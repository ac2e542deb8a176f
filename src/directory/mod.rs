//! Directory service access.
//!
//! The hierarchy walker only needs three read operations, captured by the
//! [`Directory`] trait. [`graph::GraphDirectory`] implements it over the
//! Microsoft Graph REST API; tests use the in-memory directory.

pub mod graph;
#[cfg(test)]
pub mod memory;

pub use graph::{GraphConfig, GraphDirectory};

use crate::models::Entity;
use async_trait::async_trait;
use thiserror::Error;

/// Errors raised while talking to the directory service.
#[derive(Error, Debug)]
pub enum DirectoryError {
    /// Transport failure (connect, timeout, TLS, body read).
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The service answered with a non-success status.
    #[error("directory API error {status}: {message}")]
    Api { status: u16, message: String },

    /// The token endpoint refused the credentials.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// A response body did not have the expected shape.
    #[error("unexpected response payload: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("invalid request URL: {0}")]
    InvalidUrl(String),
}

/// Which attributes to ask the service for.
///
/// Identifier, display name and principal name are always requested; the
/// hire-date attribute key is schema specific and supplied by configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeSelector {
    hire_date_attribute: String,
}

impl AttributeSelector {
    pub fn new(hire_date_attribute: impl Into<String>) -> Self {
        Self {
            hire_date_attribute: hire_date_attribute.into(),
        }
    }

    pub fn hire_date_attribute(&self) -> &str {
        &self.hire_date_attribute
    }

    /// Attribute names in request order.
    pub fn fields(&self) -> Vec<&str> {
        vec![
            "id",
            "displayName",
            "userPrincipalName",
            self.hire_date_attribute.as_str(),
        ]
    }

    /// Comma-separated form used by `$select`.
    pub fn to_select(&self) -> String {
        self.fields().join(",")
    }
}

/// One page of a paged listing.
#[derive(Debug, Clone, Default)]
pub struct Page {
    pub items: Vec<Entity>,
    /// Continuation handed back by the service; `None` on the last page.
    pub next_link: Option<String>,
}

impl Page {
    pub fn has_more(&self) -> bool {
        self.next_link.is_some()
    }
}

/// Read-only view of a directory service.
#[async_trait]
pub trait Directory: Send + Sync {
    /// Looks an entity up by its principal name. `Ok(None)` when it does not exist.
    async fn get_entity_by_principal_name(
        &self,
        name: &str,
        select: &AttributeSelector,
    ) -> Result<Option<Entity>, DirectoryError>;

    /// First page of the entities reporting directly to `entity_id`.
    async fn get_direct_reports(
        &self,
        entity_id: &str,
        select: &AttributeSelector,
        page_size: u32,
    ) -> Result<Page, DirectoryError>;

    /// Follows the continuation of `page`. `Ok(None)` once there are no more pages.
    async fn get_next_page(
        &self,
        page: &Page,
        select: &AttributeSelector,
    ) -> Result<Option<Page>, DirectoryError>;
}
