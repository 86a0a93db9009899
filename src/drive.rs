use std::path::Path;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::info;

/// Metadata for one object in a Drive folder, as returned by the files
/// listing. `created_time` is the server's RFC 3339 timestamp, e.g.
/// `2024-03-10T02:00:00.000000Z`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriveFile {
    pub id: String,
    pub name: String,
    pub created_time: String,
}

/// Narrow capability surface of the remote storage client — exactly what
/// the rotation and upload steps consume. Credential acquisition and
/// refresh are external concerns.
#[async_trait]
pub trait DriveFiles: Send + Sync {
    /// List the objects whose parent is `folder_id`.
    async fn list_children(&self, folder_id: &str) -> Result<Vec<DriveFile>>;

    /// Remove one object by id.
    async fn delete_file(&self, file_id: &str) -> Result<()>;

    /// Upload a local file into `folder_id` and return the new object id.
    async fn upload(&self, folder_id: &str, name: &str, path: &Path) -> Result<String>;
}

const API_BASE: &str = "https://www.googleapis.com/drive/v3";
const UPLOAD_BASE: &str = "https://www.googleapis.com/upload/drive/v3";

/// Authenticated Google Drive v3 REST client.
///
/// Holds one bearer token for the lifetime of the run; all calls block the
/// run until they return (the run is strictly sequential).
pub struct DriveClient {
    http: reqwest::Client,
    token: String,
}

impl std::fmt::Debug for DriveClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DriveClient").finish_non_exhaustive()
    }
}

impl DriveClient {
    pub fn new(http: reqwest::Client, token: impl Into<String>) -> Self {
        Self { http, token: token.into() }
    }
}

#[async_trait]
impl DriveFiles for DriveClient {
    async fn list_children(&self, folder_id: &str) -> Result<Vec<DriveFile>> {
        #[derive(Deserialize)]
        struct FileList {
            #[serde(default)]
            files: Vec<DriveFile>,
        }

        let query = format!("'{folder_id}' in parents");
        let list: FileList = self
            .http
            .get(format!("{API_BASE}/files"))
            .bearer_auth(&self.token)
            .query(&[("q", query.as_str()), ("fields", "files(id, name, createdTime)")])
            .send()
            .await
            .context("listing Drive folder")?
            .error_for_status()
            .context("listing Drive folder")?
            .json()
            .await
            .context("decoding Drive file list")?;
        Ok(list.files)
    }

    async fn delete_file(&self, file_id: &str) -> Result<()> {
        self.http
            .delete(format!("{API_BASE}/files/{file_id}"))
            .bearer_auth(&self.token)
            .send()
            .await
            .with_context(|| format!("deleting Drive file {file_id}"))?
            .error_for_status()
            .with_context(|| format!("deleting Drive file {file_id}"))?;
        Ok(())
    }

    async fn upload(&self, folder_id: &str, name: &str, path: &Path) -> Result<String> {
        // Resumable upload: metadata POST returns a session URI in the
        // Location header, then the bytes go in a single PUT against it.
        let metadata = serde_json::json!({ "name": name, "parents": [folder_id] });
        let response = self
            .http
            .post(format!("{UPLOAD_BASE}/files?uploadType=resumable"))
            .bearer_auth(&self.token)
            .json(&metadata)
            .send()
            .await
            .context("starting resumable upload")?
            .error_for_status()
            .context("starting resumable upload")?;
        let session = response
            .headers()
            .get(reqwest::header::LOCATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| anyhow::anyhow!("resumable upload session missing Location header"))?
            .to_string();

        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("reading archive {}", path.display()))?;

        #[derive(Deserialize)]
        struct Uploaded {
            id: String,
        }

        let uploaded: Uploaded = self
            .http
            .put(&session)
            .bearer_auth(&self.token)
            .body(bytes)
            .send()
            .await
            .context("uploading archive bytes")?
            .error_for_status()
            .context("uploading archive bytes")?
            .json()
            .await
            .context("decoding upload response")?;

        info!(file_id = %uploaded.id, name, "uploaded archive to Drive");
        Ok(uploaded.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drive_file_decodes_the_listing_shape() -> Result<()> {
        let file: DriveFile = serde_json::from_str(
            r#"{"id": "abc123", "name": "site_2024-03-10.zip", "createdTime": "2024-03-10T02:00:00.000000Z"}"#,
        )?;
        assert_eq!(file.id, "abc123");
        assert_eq!(file.name, "site_2024-03-10.zip");
        assert_eq!(file.created_time, "2024-03-10T02:00:00.000000Z");
        Ok(())
    }
}
