//! Firebase Storage backend over its REST (v0) API.
//!
//! - `GET  /v0/b/{bucket}/o?delimiter=/&prefix=...` lists one level
//! - `GET  /v0/b/{bucket}/o/{path}?alt=media` downloads an object
//! - `DELETE /v0/b/{bucket}/o/{path}` deletes it
//!
//! The object path is a single, fully percent-encoded URL segment.

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Deserialize;
use tracing::debug;

use super::ObjectStore;
use crate::models::RemoteObject;
use crate::{Error, Result};

pub const DEFAULT_API_URL: &str = "https://firebasestorage.googleapis.com";

/// One page of a listing response.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListPage {
    // ---
    #[serde(default)]
    prefixes: Vec<String>,
    #[serde(default)]
    items: Vec<ListedItem>,
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ListedItem {
    /// Full object path, e.g. `daily/Sun Nov 6 07:49:04 2022.csv`.
    name: String,
}

#[derive(Debug, Clone)]
pub struct FirebaseStore {
    client: Client,
    /// `{api}/v0/b/{bucket}/o`
    objects_url: Url,
}

impl FirebaseStore {
    // ---
    pub fn new(api_url: &str, bucket: &str) -> Result<Self> {
        // ---
        let mut objects_url = Url::parse(api_url)
            .map_err(|e| Error::Config(format!("invalid storage API URL '{api_url}': {e}")))?;

        objects_url
            .path_segments_mut()
            .map_err(|_| Error::Config(format!("storage API URL '{api_url}' cannot be a base")))?
            .pop_if_empty()
            .extend(["v0", "b", bucket, "o"]);

        Ok(FirebaseStore {
            client: Client::new(),
            objects_url,
        })
    }

    fn object_url(&self, full_path: &str) -> Url {
        // ---
        let mut url = self.objects_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.push(full_path);
        }
        url
    }

    /// Walk every page of a one-level listing under `prefix`.
    async fn list(&self, prefix: &str) -> Result<ListPage> {
        // ---
        let mut all = ListPage::default();
        let mut page_token: Option<String> = None;

        loop {
            let mut request = self
                .client
                .get(self.objects_url.clone())
                .query(&[("delimiter", "/"), ("prefix", prefix)]);
            if let Some(token) = &page_token {
                request = request.query(&[("pageToken", token.as_str())]);
            }

            let page: ListPage = request.send().await?.error_for_status()?.json().await?;
            debug!(
                "Listed '{}': {} prefixes, {} items, next page: {}",
                prefix,
                page.prefixes.len(),
                page.items.len(),
                page.next_page_token.is_some()
            );

            all.prefixes.extend(page.prefixes);
            all.items.extend(page.items);

            page_token = page.next_page_token;
            if page_token.is_none() {
                break;
            }
        }

        Ok(all)
    }
}

#[async_trait]
impl ObjectStore for FirebaseStore {
    // ---
    async fn list_prefixes(&self) -> Result<Vec<String>> {
        // ---
        let page = self.list("").await?;
        Ok(page
            .prefixes
            .into_iter()
            .map(|p| p.trim_end_matches('/').to_string())
            .collect())
    }

    async fn list_items(&self, prefix: &str) -> Result<Vec<RemoteObject>> {
        // ---
        let page = self.list(&format!("{prefix}/")).await?;
        Ok(page
            .items
            .into_iter()
            .map(|item| RemoteObject::from_full_path(item.name))
            .collect())
    }

    async fn read(&self, object: &RemoteObject) -> Result<Vec<u8>> {
        // ---
        let bytes = self
            .client
            .get(self.object_url(&object.full_path))
            .query(&[("alt", "media")])
            .send()
            .await?
            .error_for_status()?
            .bytes()
            .await?;

        Ok(bytes.to_vec())
    }

    async fn delete(&self, object: &RemoteObject) -> Result<()> {
        // ---
        self.client
            .delete(self.object_url(&object.full_path))
            .send()
            .await?
            .error_for_status()?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;

    #[test]
    fn test_objects_url() {
        // ---
        let store = FirebaseStore::new("https://example.test/", "air-quality.appspot.com").unwrap();
        assert_eq!(
            store.objects_url.as_str(),
            "https://example.test/v0/b/air-quality.appspot.com/o"
        );
    }

    #[test]
    fn test_object_path_is_one_segment() {
        // ---
        let store = FirebaseStore::new("https://example.test", "bucket").unwrap();
        let url = store.object_url("daily/Sun Nov 6 07:49:04 2022.csv");

        assert_eq!(
            url.as_str(),
            "https://example.test/v0/b/bucket/o/daily%2FSun%20Nov%206%2007:49:04%202022.csv"
        );
    }

    #[test]
    fn test_invalid_api_url() {
        // ---
        assert!(matches!(
            FirebaseStore::new("not a url", "bucket"),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_list_page_decoding() {
        // ---
        let page: ListPage = serde_json::from_str(
            r#"{"prefixes":["daily/"],"items":[{"name":"daily/a.csv","bucket":"b"}],"nextPageToken":"t1"}"#,
        )
        .unwrap();
        assert_eq!(page.prefixes, vec!["daily/"]);
        assert_eq!(page.items[0].name, "daily/a.csv");
        assert_eq!(page.next_page_token.as_deref(), Some("t1"));

        let empty: ListPage = serde_json::from_str("{}").unwrap();
        assert!(empty.items.is_empty() && empty.next_page_token.is_none());
    }
}
