//! In-memory directory for tests.
//!
//! Holds a fixed set of entities and a manager → reports relation, pages
//! listings by a configurable size, records every call, and can be told
//! to fail when a given entity's reports are requested.

use super::{AttributeSelector, Directory, DirectoryError, Page};
use crate::models::Entity;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

/// A call observed by [`MemoryDirectory`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Lookup(String),
    Reports(String),
    NextPage { manager: String, offset: usize },
}

#[derive(Default)]
pub struct MemoryDirectory {
    entities: HashMap<String, Entity>,
    reports: HashMap<String, Vec<String>>,
    /// Overrides the requested page size when set.
    page_size: Option<usize>,
    fail_on: Option<String>,
    calls: Mutex<Vec<Call>>,
}

impl MemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entity(mut self, entity: Entity) -> Self {
        self.entities.insert(entity.id.clone(), entity);
        self
    }

    /// Adds `report` under `manager`. The same report may appear under several managers.
    pub fn with_report(mut self, manager: &str, report: &str) -> Self {
        self.reports
            .entry(manager.to_string())
            .or_default()
            .push(report.to_string());
        self
    }

    pub fn with_page_size(mut self, size: usize) -> Self {
        self.page_size = Some(size);
        self
    }

    /// Any listing request for `id`'s reports fails with a 503.
    pub fn failing_on(mut self, id: &str) -> Self {
        self.fail_on = Some(id.to_string());
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn check_failure(&self, manager: &str) -> Result<(), DirectoryError> {
        if self.fail_on.as_deref() == Some(manager) {
            return Err(DirectoryError::Api {
                status: 503,
                message: format!("service unavailable while listing {}", manager),
            });
        }
        Ok(())
    }

    /// The slice of `manager`'s reports starting at `offset`.
    fn page(&self, manager: &str, offset: usize, size: usize) -> Page {
        let ids = self.reports.get(manager).map(Vec::as_slice).unwrap_or(&[]);
        let end = (offset + size).min(ids.len());
        let items = ids[offset.min(end)..end]
            .iter()
            .filter_map(|id| self.entities.get(id).cloned())
            .collect();
        let next_link = (end < ids.len()).then(|| format!("{}|{}|{}", manager, end, size));
        Page { items, next_link }
    }
}

#[async_trait]
impl Directory for MemoryDirectory {
    async fn get_entity_by_principal_name(
        &self,
        name: &str,
        _select: &AttributeSelector,
    ) -> Result<Option<Entity>, DirectoryError> {
        self.record(Call::Lookup(name.to_string()));
        Ok(self
            .entities
            .values()
            .find(|e| e.principal_name == name)
            .cloned())
    }

    async fn get_direct_reports(
        &self,
        entity_id: &str,
        _select: &AttributeSelector,
        page_size: u32,
    ) -> Result<Page, DirectoryError> {
        self.record(Call::Reports(entity_id.to_string()));
        self.check_failure(entity_id)?;
        let size = self.page_size.unwrap_or(page_size as usize).max(1);
        Ok(self.page(entity_id, 0, size))
    }

    async fn get_next_page(
        &self,
        page: &Page,
        _select: &AttributeSelector,
    ) -> Result<Option<Page>, DirectoryError> {
        let Some(ref link) = page.next_link else {
            return Ok(None);
        };

        let parts: Vec<&str> = link.split('|').collect();
        let [manager, offset, size] = parts.as_slice() else {
            return Err(DirectoryError::InvalidUrl(link.clone()));
        };
        let offset: usize = offset
            .parse()
            .map_err(|_| DirectoryError::InvalidUrl(link.clone()))?;
        let size: usize = size
            .parse()
            .map_err(|_| DirectoryError::InvalidUrl(link.clone()))?;

        self.record(Call::NextPage {
            manager: manager.to_string(),
            offset,
        });
        self.check_failure(manager)?;
        Ok(Some(self.page(manager, offset, size)))
    }
}
