//! Google Drive content provider client.

use async_trait::async_trait;
use bytes::Bytes;
use serde::Deserialize;

use super::{ContentProvider, ProviderError, ProviderItem};

const FOLDER_MIME: &str = "application/vnd.google-apps.folder";
const ITEM_FIELDS: &str = "id,name,mimeType";

#[derive(Debug, Deserialize)]
struct DriveFile {
    id: String,
    name: String,
    #[serde(rename = "mimeType")]
    mime_type: String,
}

#[derive(Debug, Deserialize)]
struct DriveFileList {
    #[serde(default)]
    files: Vec<DriveFile>,
}

impl From<DriveFile> for ProviderItem {
    fn from(file: DriveFile) -> Self {
        let is_folder = file.mime_type == FOLDER_MIME;
        ProviderItem {
            id: file.id,
            name: file.name,
            mime_type: file.mime_type,
            is_folder,
        }
    }
}

/// Drive API v3 client authenticated with a static API key.
#[derive(Clone)]
pub struct DriveClient {
    http: reqwest::Client,
    api_base: String,
    api_key: String,
}

impl DriveClient {
    pub fn new(api_base: String, api_key: String) -> Self {
        DriveClient {
            http: reqwest::Client::new(),
            api_base: api_base.trim_end_matches('/').to_string(),
            api_key,
        }
    }

    fn map_status(status: reqwest::StatusCode, id: &str) -> Option<ProviderError> {
        if status == reqwest::StatusCode::NOT_FOUND {
            return Some(ProviderError::NotFound(id.to_string()));
        }
        if status == reqwest::StatusCode::UNAUTHORIZED
            || status == reqwest::StatusCode::FORBIDDEN
        {
            return Some(ProviderError::Unauthorized);
        }
        if !status.is_success() {
            return Some(ProviderError::Request(format!("HTTP {}", status.as_u16())));
        }
        None
    }
}

#[async_trait]
impl ContentProvider for DriveClient {
    async fn item_metadata(&self, id: &str) -> Result<ProviderItem, ProviderError> {
        let url = format!("{}/files/{}", self.api_base, id);
        let response = self
            .http
            .get(&url)
            .query(&[("fields", ITEM_FIELDS), ("key", self.api_key.as_str())])
            .send()
            .await
            .map_err(|e| ProviderError::Request(e.to_string()))?;

        if let Some(err) = Self::map_status(response.status(), id) {
            return Err(err);
        }

        let file: DriveFile = response
            .json()
            .await
            .map_err(|e| ProviderError::Malformed(e.to_string()))?;

        Ok(file.into())
    }

    async fn list_children(&self, folder_id: &str) -> Result<Vec<ProviderItem>, ProviderError> {
        let url = format!("{}/files", self.api_base);
        let query = format!("'{}' in parents and trashed = false", folder_id);
        let fields = format!("files({})", ITEM_FIELDS);

        let response = self
            .http
            .get(&url)
            .query(&[
                ("q", query.as_str()),
                ("fields", fields.as_str()),
                ("pageSize", "1000"),
                ("key", self.api_key.as_str()),
            ])
            .send()
            .await
            .map_err(|e| ProviderError::Request(e.to_string()))?;

        if let Some(err) = Self::map_status(response.status(), folder_id) {
            return Err(err);
        }

        let listing: DriveFileList = response
            .json()
            .await
            .map_err(|e| ProviderError::Malformed(e.to_string()))?;

        Ok(listing.files.into_iter().map(ProviderItem::from).collect())
    }

    async fn download(&self, id: &str) -> Result<Bytes, ProviderError> {
        let url = format!("{}/files/{}", self.api_base, id);
        let response = self
            .http
            .get(&url)
            .query(&[("alt", "media"), ("key", self.api_key.as_str())])
            .send()
            .await
            .map_err(|e| ProviderError::Request(e.to_string()))?;

        if let Some(err) = Self::map_status(response.status(), id) {
            return Err(err);
        }

        response
            .bytes()
            .await
            .map_err(|e| ProviderError::Request(e.to_string()))
    }
}
