//! Tenure aggregation over a walked hierarchy.

use super::hire_date::parse_hire_date;
use super::workdays::{elapsed_years, working_days};
use crate::models::{
    Entity, EntityTenure, HierarchySet, TenureOutcome, TenureRecord, TenureReport, TenureSummary,
};
use chrono::NaiveDate;
use tracing::debug;

/// Works out the tenure outcome of a single entity as of `as_of`.
pub fn tenure_of(entity: &Entity, as_of: NaiveDate) -> TenureOutcome {
    let Some(ref raw) = entity.hire_date_raw else {
        return TenureOutcome::Missing;
    };

    match parse_hire_date(raw) {
        Some(hire_date) => TenureOutcome::Computed(TenureRecord {
            hire_date,
            working_days: working_days(hire_date, as_of),
            elapsed_years: elapsed_years(hire_date, as_of),
        }),
        None => {
            debug!("Unparseable hire date {:?} for {}", raw, entity);
            TenureOutcome::InvalidFormat { raw: raw.clone() }
        }
    }
}

/// Computes per-entity tenure and totals, in hierarchy order.
///
/// Only entities with a parseable hire date count toward the totals.
pub fn aggregate(set: &HierarchySet, as_of: NaiveDate) -> TenureReport {
    let mut summary = TenureSummary {
        total_entities: set.len(),
        ..TenureSummary::default()
    };

    let entries: Vec<EntityTenure> = set
        .iter()
        .map(|entity| {
            let tenure = tenure_of(entity, as_of);
            match tenure {
                TenureOutcome::Computed(ref record) => {
                    summary.with_hire_date += 1;
                    summary.total_working_days += record.working_days;
                    summary.total_elapsed_years += record.elapsed_years;
                }
                TenureOutcome::InvalidFormat { .. } => summary.invalid_format += 1,
                TenureOutcome::Missing => summary.missing += 1,
            }

            EntityTenure {
                id: entity.id.clone(),
                display_name: entity.display_name.clone(),
                principal_name: entity.principal_name.clone(),
                tenure,
            }
        })
        .collect();

    TenureReport {
        manager: set.root().principal_name.clone(),
        as_of,
        entries,
        summary,
    }
}
