use std::collections::HashMap;

use serde::Serialize;

use crate::error::StoreError;
use crate::model::Artifact;
use crate::store::{FileStore, ListQuery};

/// Two listed files with the same name. Under the last-page-wins rule the
/// later one is kept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NameCollision {
    pub name: String,
    pub kept_id: String,
    pub dropped_id: String,
}

/// Name → file snapshot of the staging folder for one run.
///
/// Duplicate names follow `LastPageWins`: an entry inserted later replaces
/// the earlier one and the replacement is recorded as a [`NameCollision`].
#[derive(Debug, Clone, Default)]
pub struct InventoryMap {
    by_name: HashMap<String, Artifact>,
    collisions: Vec<NameCollision>,
    pages: u32,
}

impl InventoryMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, artifact: Artifact) {
        let name = artifact.name.clone();
        let kept_id = artifact.id.clone();
        if let Some(dropped) = self.by_name.insert(name.clone(), artifact) {
            if dropped.id != kept_id {
                self.collisions.push(NameCollision {
                    name,
                    kept_id,
                    dropped_id: dropped.id,
                });
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&Artifact> {
        self.by_name.get(name)
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }

    pub fn collisions(&self) -> &[NameCollision] {
        &self.collisions
    }

    /// Listing pages merged into this map.
    pub fn pages(&self) -> u32 {
        self.pages
    }

    /// Files sorted by name.
    pub fn sorted(&self) -> Vec<&Artifact> {
        let mut files: Vec<&Artifact> = self.by_name.values().collect();
        files.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
        files
    }
}

impl FromIterator<Artifact> for InventoryMap {
    fn from_iter<T: IntoIterator<Item = Artifact>>(iter: T) -> Self {
        let mut map = Self::new();
        for artifact in iter {
            map.insert(artifact);
        }
        map
    }
}

/// List every non-trashed file directly inside `folder_id`, all pages,
/// before returning. Any listing failure aborts the whole index.
pub fn build_inventory<S: FileStore>(store: &S, folder_id: &str) -> Result<InventoryMap, StoreError> {
    let mut map = InventoryMap::new();

    for page in store.pages(ListQuery::children_of(folder_id)) {
        let page = page?;
        map.pages += 1;
        log::debug!("page {}: {} files", map.pages, page.files.len());
        for file in page.files {
            map.insert(file);
        }
    }

    for c in &map.collisions {
        log::warn!(
            "duplicate file name '{}' in staging folder: keeping {}, ignoring {}",
            c.name,
            c.kept_id,
            c.dropped_id
        );
    }

    Ok(map)
}
