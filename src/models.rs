//! Data models for the tenure report.
//!
//! This module contains the directory records produced by the hierarchy
//! walk and the per-entity tenure results derived from them.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// A directory record for one person.
#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    /// Opaque identifier assigned by the directory service.
    pub id: String,
    /// Human-readable name.
    pub display_name: String,
    /// Sign-in name (e.g. `first.last@company.com`).
    pub principal_name: String,
    /// Raw hire-date attribute value, if the service returned one.
    pub hire_date_raw: Option<String>,
}

impl Entity {
    /// Creates an entity without a hire date.
    pub fn new(
        id: impl Into<String>,
        display_name: impl Into<String>,
        principal_name: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            principal_name: principal_name.into(),
            hire_date_raw: None,
        }
    }

    /// Sets the raw hire-date attribute.
    #[cfg(test)]
    pub fn with_hire_date(mut self, raw: impl Into<String>) -> Self {
        self.hire_date_raw = Some(raw.into());
        self
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.display_name, self.principal_name)
    }
}

/// Everyone reachable from a root, in discovery order.
///
/// The root is always element 0 and no id appears twice.
#[derive(Debug, Clone)]
pub struct HierarchySet {
    entities: Vec<Entity>,
    seen: HashSet<String>,
}

impl HierarchySet {
    /// Starts a set containing only the root.
    pub fn new(root: Entity) -> Self {
        let mut seen = HashSet::new();
        seen.insert(root.id.clone());
        Self {
            entities: vec![root],
            seen,
        }
    }

    /// Appends an entity unless its id has already been seen.
    ///
    /// Returns `true` when the entity was newly added.
    pub fn insert(&mut self, entity: Entity) -> bool {
        if !self.seen.insert(entity.id.clone()) {
            return false;
        }
        self.entities.push(entity);
        true
    }

    /// The entity the walk started from.
    pub fn root(&self) -> &Entity {
        &self.entities[0]
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Entity> {
        self.entities.iter()
    }

    /// Ids in discovery order.
    #[cfg(test)]
    pub fn ids(&self) -> Vec<&str> {
        self.entities.iter().map(|e| e.id.as_str()).collect()
    }
}

/// Tenure figures for an entity with a usable hire date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TenureRecord {
    pub hire_date: NaiveDate,
    /// Weekdays in `[hire_date, as_of]`, both ends included.
    pub working_days: u64,
    /// Whole days since hire divided by 365.25. Negative for future hires.
    pub elapsed_years: f64,
}

/// What the aggregator could make of an entity's hire date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TenureOutcome {
    /// Hire date parsed; figures computed and counted in the totals.
    Computed(TenureRecord),
    /// Attribute present but not a recognizable date.
    InvalidFormat { raw: String },
    /// Attribute absent.
    Missing,
}

/// One line of the report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityTenure {
    pub id: String,
    pub display_name: String,
    pub principal_name: String,
    pub tenure: TenureOutcome,
}

/// Totals across the whole hierarchy.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TenureSummary {
    /// Number of entities in the hierarchy, manager included.
    pub total_entities: usize,
    pub with_hire_date: usize,
    pub invalid_format: usize,
    pub missing: usize,
    pub total_working_days: u64,
    pub total_elapsed_years: f64,
}

/// The aggregated result of one run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TenureReport {
    /// Principal name of the root of the hierarchy.
    pub manager: String,
    /// The date tenure is measured up to.
    pub as_of: NaiveDate,
    /// Per-entity results in hierarchy order.
    pub entries: Vec<EntityTenure>,
    pub summary: TenureSummary,
}
