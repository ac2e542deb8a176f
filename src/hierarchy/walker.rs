//! Breadth-first traversal of the reporting hierarchy.
//!
//! Starting from one root, every direct-reports listing is read to the end
//! (all pages) before the next queued entity is expanded. Each id is
//! enqueued at most once, so the walk terminates even if someone is
//! reachable through two managers.

use crate::directory::{AttributeSelector, Directory, DirectoryError};
use crate::models::{Entity, HierarchySet};
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::VecDeque;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

/// Largest `$top` the Graph `directReports` listing accepts.
pub const MAX_PAGE_SIZE: u32 = 999;

/// Fatal traversal errors. Any of these aborts the run with no partial result.
#[derive(Error, Debug)]
pub enum WalkError {
    #[error("manager with principal name '{0}' not found")]
    RootNotFound(String),

    #[error(transparent)]
    Directory(#[from] DirectoryError),
}

/// Options for a walk.
#[derive(Debug, Clone)]
pub struct WalkOptions {
    /// Requested page size for direct-reports listings.
    pub page_size: u32,
    /// Show a spinner with the running count.
    pub show_progress: bool,
}

impl Default for WalkOptions {
    fn default() -> Self {
        Self {
            page_size: MAX_PAGE_SIZE,
            show_progress: false,
        }
    }
}

/// Walks a [`Directory`] from a root entity.
pub struct HierarchyWalker<'a, D: Directory + ?Sized> {
    directory: &'a D,
    select: AttributeSelector,
    options: WalkOptions,
}

impl<'a, D: Directory + ?Sized> HierarchyWalker<'a, D> {
    pub fn new(directory: &'a D, select: AttributeSelector, options: WalkOptions) -> Self {
        Self {
            directory,
            select,
            options,
        }
    }

    /// Resolves the root entity from its principal name.
    pub async fn resolve_root(&self, principal_name: &str) -> Result<Entity, WalkError> {
        debug!("Looking up root {}", principal_name);
        self.directory
            .get_entity_by_principal_name(principal_name, &self.select)
            .await?
            .ok_or_else(|| WalkError::RootNotFound(principal_name.to_string()))
    }

    /// Resolves `principal_name` and walks everything beneath it.
    pub async fn walk_principal(&self, principal_name: &str) -> Result<HierarchySet, WalkError> {
        let root = self.resolve_root(principal_name).await?;
        self.walk(root).await
    }

    /// Collects `root` and everyone transitively reporting to it.
    pub async fn walk(&self, root: Entity) -> Result<HierarchySet, WalkError> {
        info!("Walking reporting hierarchy under {}", root);

        let progress = self.progress_bar();
        let mut queue = VecDeque::from([root.id.clone()]);
        let mut set = HierarchySet::new(root);

        let result = self.expand(&mut queue, &mut set, progress.as_ref()).await;

        if let Some(pb) = progress {
            pb.finish_and_clear();
        }
        result?;

        info!("Found {} entities (including root)", set.len());
        Ok(set)
    }

    async fn expand(
        &self,
        queue: &mut VecDeque<String>,
        set: &mut HierarchySet,
        progress: Option<&ProgressBar>,
    ) -> Result<(), WalkError> {
        while let Some(current) = queue.pop_front() {
            let mut page = self
                .directory
                .get_direct_reports(&current, &self.select, self.options.page_size)
                .await?;
            let mut pages = 1;

            loop {
                for entity in page.items.drain(..) {
                    let id = entity.id.clone();
                    if set.insert(entity) {
                        queue.push_back(id);
                    } else {
                        debug!("Already seen {}, skipping", id);
                    }
                }

                if let Some(pb) = progress {
                    pb.set_message(format!("{} found, {} queued", set.len(), queue.len()));
                }

                if !page.has_more() {
                    break;
                }
                match self.directory.get_next_page(&page, &self.select).await? {
                    Some(next) => {
                        page = next;
                        pages += 1;
                    }
                    None => break,
                }
            }

            debug!("Expanded {} ({} page(s))", current, pages);
        }

        Ok(())
    }

    fn progress_bar(&self) -> Option<ProgressBar> {
        if !self.options.show_progress {
            return None;
        }

        let pb = ProgressBar::new_spinner();
        if let Ok(style) =
            ProgressStyle::default_spinner().template("{spinner:.green} [{elapsed_precise}] {msg}")
        {
            pb.set_style(style);
        }
        pb.enable_steady_tick(Duration::from_millis(100));
        pb.set_message("walking hierarchy...");
        Some(pb)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::memory::{Call, MemoryDirectory};

    fn person(id: &str) -> Entity {
        Entity::new(id, id.to_uppercase(), format!("{}@corp.com", id))
    }

    fn select() -> AttributeSelector {
        AttributeSelector::new("employeeHireDate")
    }

    /// M → {A, B}, A → {C}
    fn small_org() -> MemoryDirectory {
        MemoryDirectory::new()
            .with_entity(person("m"))
            .with_entity(person("a"))
            .with_entity(person("b"))
            .with_entity(person("c"))
            .with_report("m", "a")
            .with_report("m", "b")
            .with_report("a", "c")
    }

    #[tokio::test]
    async fn test_breadth_first_order() {
        let directory = small_org();
        let walker = HierarchyWalker::new(&directory, select(), WalkOptions::default());

        let set = walker.walk_principal("m@corp.com").await.unwrap();

        assert_eq!(set.ids(), vec!["m", "a", "b", "c"]);
        assert_eq!(set.len(), 4);
    }

    #[tokio::test]
    async fn test_root_without_reports() {
        let directory = MemoryDirectory::new().with_entity(person("solo"));
        let walker = HierarchyWalker::new(&directory, select(), WalkOptions::default());

        let set = walker.walk_principal("solo@corp.com").await.unwrap();

        assert_eq!(set.len(), 1);
        assert_eq!(set.root().id, "solo");
    }

    #[tokio::test]
    async fn test_root_not_found() {
        let directory = small_org();
        let walker = HierarchyWalker::new(&directory, select(), WalkOptions::default());

        let err = walker.walk_principal("ghost@corp.com").await.unwrap_err();

        assert!(matches!(err, WalkError::RootNotFound(ref name) if name == "ghost@corp.com"));
        assert_eq!(directory.calls(), vec![Call::Lookup("ghost@corp.com".to_string())]);
    }

    #[tokio::test]
    async fn test_person_reachable_twice_appears_once() {
        // D reports to both A and B; A also lists the root as a report.
        let directory = MemoryDirectory::new()
            .with_entity(person("m"))
            .with_entity(person("a"))
            .with_entity(person("b"))
            .with_entity(person("d"))
            .with_report("m", "a")
            .with_report("m", "b")
            .with_report("a", "d")
            .with_report("b", "d")
            .with_report("a", "m");
        let walker = HierarchyWalker::new(&directory, select(), WalkOptions::default());

        let set = walker.walk_principal("m@corp.com").await.unwrap();

        assert_eq!(set.ids(), vec!["m", "a", "b", "d"]);
        let reports_calls = directory
            .calls()
            .into_iter()
            .filter(|c| matches!(c, Call::Reports(_)))
            .count();
        assert_eq!(reports_calls, 4);
    }

    #[tokio::test]
    async fn test_all_pages_read_before_next_node() {
        let mut directory = MemoryDirectory::new()
            .with_entity(person("m"))
            .with_entity(person("x"));
        for i in 0..5 {
            let id = format!("r{}", i);
            directory = directory.with_entity(person(&id)).with_report("m", &id);
        }
        let directory = directory.with_report("r0", "x").with_page_size(2);
        let walker = HierarchyWalker::new(&directory, select(), WalkOptions::default());

        let set = walker.walk_principal("m@corp.com").await.unwrap();

        assert_eq!(set.ids(), vec!["m", "r0", "r1", "r2", "r3", "r4", "x"]);

        let calls = directory.calls();
        assert_eq!(
            &calls[..5],
            &[
                Call::Lookup("m@corp.com".to_string()),
                Call::Reports("m".to_string()),
                Call::NextPage {
                    manager: "m".to_string(),
                    offset: 2
                },
                Call::NextPage {
                    manager: "m".to_string(),
                    offset: 4
                },
                Call::Reports("r0".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_repeated_walks_are_identical() {
        let directory = small_org().with_page_size(1);
        let walker = HierarchyWalker::new(&directory, select(), WalkOptions::default());

        let first = walker.walk_principal("m@corp.com").await.unwrap();
        let second = walker.walk_principal("m@corp.com").await.unwrap();

        assert_eq!(first.ids(), second.ids());
    }

    #[tokio::test]
    async fn test_service_failure_aborts_walk() {
        let directory = small_org().failing_on("a");
        let walker = HierarchyWalker::new(&directory, select(), WalkOptions::default());

        let err = walker.walk_principal("m@corp.com").await.unwrap_err();

        match err {
            WalkError::Directory(DirectoryError::Api { status, .. }) => assert_eq!(status, 503),
            other => panic!("unexpected error: {:?}", other),
        }
        // Nothing after the failing call is requested.
        assert_eq!(directory.calls().last(), Some(&Call::Reports("a".to_string())));
    }

    #[tokio::test]
    async fn test_walk_from_resolved_root() {
        let directory = small_org();
        let walker = HierarchyWalker::new(&directory, select(), WalkOptions::default());

        let root = walker.resolve_root("a@corp.com").await.unwrap();
        let set = walker.walk(root).await.unwrap();

        assert_eq!(set.ids(), vec!["a", "c"]);
    }
}
