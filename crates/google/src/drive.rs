//! Drive v3 file store.
//!
//! API: GET   https://www.googleapis.com/drive/v3/files
//!      PATCH https://www.googleapis.com/drive/v3/files/{fileId}
//! Auth: Bearer token (OAuth access token with a `drive` scope)
//! Pagination: token-based (`nextPageToken` → `pageToken`)
//! Shared drives: `supportsAllDrives` + `includeItemsFromAllDrives`

use filer_recon::{Artifact, FileStore, ListPage, ListQuery, StoreError};
use serde::Deserialize;

use crate::client::{endpoint, ApiClient};

pub const DRIVE_API_BASE: &str = "https://www.googleapis.com";
const PAGE_SIZE: u32 = 1000;
const LIST_FIELDS: &str = "nextPageToken, files(id, name, parents)";

// ── Wire types ──────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FileList {
    #[serde(default)]
    next_page_token: Option<String>,
    #[serde(default)]
    files: Vec<DriveFile>,
}

#[derive(Debug, Deserialize)]
struct DriveFile {
    id: String,
    name: String,
    #[serde(default)]
    parents: Vec<String>,
}

impl From<DriveFile> for Artifact {
    fn from(f: DriveFile) -> Self {
        Artifact::new(f.id, f.name, f.parents)
    }
}

/// `'<folder>' in parents and trashed = false`, with quotes escaped.
pub fn children_query(query: &ListQuery) -> String {
    let folder = query.parent.replace('\\', "\\\\").replace('\'', "\\'");
    format!("'{folder}' in parents and trashed = false")
}

// ── Drive client ────────────────────────────────────────────────────

pub struct DriveClient {
    client: ApiClient,
    base_url: String,
}

impl DriveClient {
    pub fn new(token: String) -> Result<Self, StoreError> {
        Self::with_base_url(token, DRIVE_API_BASE.to_string())
    }

    pub fn with_base_url(token: String, base_url: String) -> Result<Self, StoreError> {
        Ok(Self {
            client: ApiClient::new("Drive", token)?,
            base_url,
        })
    }
}

impl FileStore for DriveClient {
    fn list_page(&self, query: &ListQuery, page_token: Option<&str>) -> Result<ListPage, StoreError> {
        let url = endpoint(&self.base_url, &["drive", "v3", "files"])?;
        let q = children_query(query);
        let page_size = PAGE_SIZE.to_string();

        let mut req = self.client.http().get(url).query(&[
            ("q", q.as_str()),
            ("fields", LIST_FIELDS),
            ("pageSize", page_size.as_str()),
            ("supportsAllDrives", "true"),
            ("includeItemsFromAllDrives", "true"),
        ]);
        if let Some(token) = page_token {
            req = req.query(&[("pageToken", token)]);
        }

        let list: FileList = self.client.send(req)?;
        log::debug!(
            "drive list: {} files, next page: {}",
            list.files.len(),
            list.next_page_token.is_some()
        );

        Ok(ListPage {
            files: list.files.into_iter().map(Artifact::from).collect(),
            next_page_token: list.next_page_token,
        })
    }

    fn move_file(
        &mut self,
        file_id: &str,
        add_parents: &[String],
        remove_parents: &[String],
    ) -> Result<(), StoreError> {
        let url = endpoint(&self.base_url, &["drive", "v3", "files", file_id])?;
        let add = add_parents.join(",");
        let remove = remove_parents.join(",");

        let mut req = self
            .client
            .http()
            .patch(url)
            .query(&[
                ("addParents", add.as_str()),
                ("supportsAllDrives", "true"),
                ("fields", "id, parents"),
            ])
            .json(&serde_json::json!({}));
        if !remove.is_empty() {
            req = req.query(&[("removeParents", remove.as_str())]);
        }

        let _: serde_json::Value = self.client.send(req)?;
        log::debug!("drive move: {file_id} +[{add}] -[{remove}]");
        Ok(())
    }
}

// ── Tests ───────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use filer_recon::build_inventory;
    use httpmock::prelude::*;

    const Q: &str = "'STAGING' in parents and trashed = false";

    fn file(id: &str, name: &str) -> serde_json::Value {
        serde_json::json!({ "id": id, "name": name, "parents": ["STAGING"] })
    }

    fn client(server: &MockServer) -> DriveClient {
        DriveClient::with_base_url("ya29.test".into(), server.base_url()).unwrap()
    }

    #[test]
    fn query_escapes_quotes() {
        assert_eq!(children_query(&ListQuery::children_of("STAGING")), Q);
        assert_eq!(
            children_query(&ListQuery::children_of("a'b")),
            "'a\\'b' in parents and trashed = false"
        );
    }

    // ── Test: Pagination across 3 pages ─────────────────────────────

    #[test]
    fn test_pagination_three_pages() {
        let server = MockServer::start();

        let page1 = server.mock(|when, then| {
            when.method(GET)
                .path("/drive/v3/files")
                .query_param("q", Q)
                .query_param("supportsAllDrives", "true")
                .query_param("includeItemsFromAllDrives", "true")
                .query_param_missing("pageToken")
                .header("authorization", "Bearer ya29.test");
            then.status(200)
                .header("content-type", "application/json")
                .json_body(serde_json::json!({
                    "nextPageToken": "A",
                    "files": [file("id1", "Invoice_1.pdf"), file("id2", "Invoice_2.pdf")]
                }));
        });

        let page2 = server.mock(|when, then| {
            when.method(GET)
                .path("/drive/v3/files")
                .query_param("pageToken", "A");
            then.status(200)
                .header("content-type", "application/json")
                .json_body(serde_json::json!({
                    "nextPageToken": "B",
                    "files": [file("id3", "Invoice_3.pdf")]
                }));
        });

        let page3 = server.mock(|when, then| {
            when.method(GET)
                .path("/drive/v3/files")
                .query_param("pageToken", "B");
            then.status(200)
                .header("content-type", "application/json")
                .json_body(serde_json::json!({
                    "files": [file("id4", "Invoice_4.pdf")]
                }));
        });

        let drive = client(&server);
        let map = build_inventory(&drive, "STAGING").unwrap();

        page1.assert();
        page2.assert();
        page3.assert();
        assert_eq!(map.len(), 4);
        assert_eq!(map.pages(), 3);
        assert_eq!(map.get("Invoice_3.pdf").unwrap().id, "id3");
        assert!(map.get("Invoice_4.pdf").unwrap().parents.contains("STAGING"));
    }

    // ── Test: Empty folder omits files ──────────────────────────────

    #[test]
    fn test_missing_files_field_is_empty_page() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/drive/v3/files");
            then.status(200).json_body(serde_json::json!({}));
        });

        let page = client(&server)
            .list_page(&ListQuery::children_of("STAGING"), None)
            .unwrap();
        assert!(page.files.is_empty());
        assert!(page.next_page_token.is_none());
    }

    // ── Test: Auth failure ──────────────────────────────────────────

    #[test]
    fn test_auth_failure() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/drive/v3/files");
            then.status(401).json_body(serde_json::json!({
                "error": { "code": 401, "message": "Request had invalid authentication credentials." }
            }));
        });

        let err = client(&server)
            .list_page(&ListQuery::children_of("STAGING"), None)
            .unwrap_err();

        // No retries.
        mock.assert_calls(1);
        assert_eq!(
            err,
            StoreError::Auth("Request had invalid authentication credentials.".into())
        );
    }

    // ── Test: Move ──────────────────────────────────────────────────

    #[test]
    fn test_move_sends_comma_joined_parents() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(PATCH)
                .path("/drive/v3/files/abc123")
                .query_param("addParents", "FOLDER_X")
                .query_param("removeParents", "INBOX,STAGING")
                .query_param("supportsAllDrives", "true");
            then.status(200).json_body(serde_json::json!({
                "id": "abc123", "parents": ["FOLDER_X"]
            }));
        });

        let mut drive = client(&server);
        drive
            .move_file(
                "abc123",
                &["FOLDER_X".to_string()],
                &["INBOX".to_string(), "STAGING".to_string()],
            )
            .unwrap();
        mock.assert();
    }

    #[test]
    fn test_move_without_removals_omits_param() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(PATCH)
                .path("/drive/v3/files/abc123")
                .query_param("addParents", "FOLDER_X")
                .query_param_missing("removeParents");
            then.status(200).json_body(serde_json::json!({ "id": "abc123" }));
        });

        client(&server)
            .move_file("abc123", &["FOLDER_X".to_string()], &[])
            .unwrap();
        mock.assert();
    }

    #[test]
    fn test_move_not_found() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(PATCH).path("/drive/v3/files/gone");
            then.status(404).json_body(serde_json::json!({
                "error": { "code": 404, "message": "File not found: gone." }
            }));
        });

        let err = client(&server)
            .move_file("gone", &["FOLDER_X".to_string()], &["STAGING".to_string()])
            .unwrap_err();
        assert_eq!(err.to_string(), "not found: File not found: gone.");
    }

    // ── Test: Malformed body ────────────────────────────────────────

    #[test]
    fn test_malformed_json() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/drive/v3/files");
            then.status(200).body("<html>oops</html>");
        });

        let err = client(&server)
            .list_page(&ListQuery::children_of("STAGING"), None)
            .unwrap_err();
        assert!(matches!(err, StoreError::Parse(ref m) if m.contains("<html>oops</html>")));
    }
}
