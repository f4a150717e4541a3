//! Seams to the two external stores.
//!
//! The engine only ever talks to a sheet through [`RecordStore`] and to a
//! folder tree through [`FileStore`]; `filer-google` implements both over
//! HTTP and [`crate::memory`] implements both in memory for tests.

use crate::config::Column;
use crate::error::StoreError;
use crate::model::{Artifact, CellValue};

// ---------------------------------------------------------------------------
// Record store
// ---------------------------------------------------------------------------

pub trait RecordStore {
    /// Every row of `sheet` from row 1 down to the last used row, header
    /// rows included. A missing sheet is `StoreError::SheetNotFound`.
    fn read_rows(&self, sheet: &str) -> Result<Vec<Vec<CellValue>>, StoreError>;

    /// Overwrite a single cell. `row` is the 1-based sheet row.
    fn write_cell(
        &mut self,
        sheet: &str,
        row: usize,
        column: Column,
        value: &str,
    ) -> Result<(), StoreError>;
}

// ---------------------------------------------------------------------------
// File store
// ---------------------------------------------------------------------------

/// Listing filter: direct children of `parent`, trashed files excluded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    pub parent: String,
}

impl ListQuery {
    pub fn children_of(parent: impl Into<String>) -> Self {
        Self { parent: parent.into() }
    }
}

/// One page of a listing. `next_page_token` absent (or empty) ends the
/// sequence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListPage {
    pub files: Vec<Artifact>,
    pub next_page_token: Option<String>,
}

pub trait FileStore {
    fn list_page(&self, query: &ListQuery, page_token: Option<&str>) -> Result<ListPage, StoreError>;

    /// Change a file's parent set, across shared drives.
    fn move_file(
        &mut self,
        file_id: &str,
        add_parents: &[String],
        remove_parents: &[String],
    ) -> Result<(), StoreError>;

    /// Lazily walk every page of `query`, starting from the first page.
    fn pages(&self, query: ListQuery) -> Pages<'_, Self>
    where
        Self: Sized,
    {
        Pages::new(self, query)
    }
}

// ---------------------------------------------------------------------------
// Pages
// ---------------------------------------------------------------------------

/// Page-fetch sequence. Each `next()` issues one `list_page` call carrying
/// the previous page's token; the sequence ends after a page without a
/// token or after the first error.
pub struct Pages<'a, S: FileStore + ?Sized> {
    store: &'a S,
    query: ListQuery,
    token: Option<String>,
    done: bool,
    fetched: u32,
}

impl<'a, S: FileStore + ?Sized> Pages<'a, S> {
    pub fn new(store: &'a S, query: ListQuery) -> Self {
        Self {
            store,
            query,
            token: None,
            done: false,
            fetched: 0,
        }
    }

    /// Pages fetched so far.
    pub fn fetched(&self) -> u32 {
        self.fetched
    }
}

impl<'a, S: FileStore + ?Sized> Iterator for Pages<'a, S> {
    type Item = Result<ListPage, StoreError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let page = match self.store.list_page(&self.query, self.token.as_deref()) {
            Ok(page) => page,
            Err(e) => {
                self.done = true;
                return Some(Err(e));
            }
        };
        self.fetched += 1;

        match page.next_page_token.as_deref().filter(|t| !t.is_empty()) {
            Some(next) if self.token.as_deref() == Some(next) => {
                self.done = true;
                return Some(Err(StoreError::PaginationStuck {
                    token: next.to_string(),
                }));
            }
            Some(next) => self.token = Some(next.to_string()),
            None => self.done = true,
        }

        Some(Ok(page))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryFileStore;

    #[test]
    fn pages_follow_tokens_until_absent() {
        let mut store = MemoryFileStore::new().with_page_size(2);
        for i in 0..5 {
            store.add(Artifact::new(format!("id{i}"), format!("f{i}.pdf"), ["STAGING"]));
        }

        let pages: Vec<ListPage> = store
            .pages(ListQuery::children_of("STAGING"))
            .collect::<Result<_, _>>()
            .unwrap();

        assert_eq!(pages.len(), 3);
        assert_eq!(pages[0].files.len(), 2);
        assert_eq!(pages[2].files.len(), 1);
        assert!(pages[2].next_page_token.is_none());
        assert_eq!(store.list_calls(), 3);
    }

    #[test]
    fn pages_restart_from_the_first_page() {
        let mut store = MemoryFileStore::new().with_page_size(1);
        store.add(Artifact::new("a", "a.pdf", ["S"]));
        store.add(Artifact::new("b", "b.pdf", ["S"]));

        let first: usize = store.pages(ListQuery::children_of("S")).count();
        let second: usize = store.pages(ListQuery::children_of("S")).count();
        assert_eq!(first, 2);
        assert_eq!(second, 2);
    }

    struct StuckStore;

    impl FileStore for StuckStore {
        fn list_page(&self, _: &ListQuery, _: Option<&str>) -> Result<ListPage, StoreError> {
            Ok(ListPage {
                files: vec![],
                next_page_token: Some("same".into()),
            })
        }

        fn move_file(&mut self, _: &str, _: &[String], _: &[String]) -> Result<(), StoreError> {
            Ok(())
        }
    }

    #[test]
    fn repeated_token_stops_with_error() {
        let results: Vec<_> = StuckStore.pages(ListQuery::children_of("S")).collect();
        assert_eq!(results.len(), 2);
        assert!(results[0].is_ok());
        assert_eq!(
            results[1],
            Err(StoreError::PaginationStuck {
                token: "same".into()
            })
        );
    }

    #[test]
    fn empty_token_ends_sequence() {
        struct EmptyToken;
        impl FileStore for EmptyToken {
            fn list_page(&self, _: &ListQuery, _: Option<&str>) -> Result<ListPage, StoreError> {
                Ok(ListPage {
                    files: vec![Artifact::new("x", "x.pdf", ["S"])],
                    next_page_token: Some(String::new()),
                })
            }
            fn move_file(&mut self, _: &str, _: &[String], _: &[String]) -> Result<(), StoreError> {
                Ok(())
            }
        }
        assert_eq!(EmptyToken.pages(ListQuery::children_of("S")).count(), 1);
    }
}
