//! HTTP object store (S3-compatible)
//!
//! Archives live under `<base_url>/<prefix><name>`. Existence uses `HEAD`,
//! reads use `GET`, and namespace listing uses `ListObjectsV2`
//! (`?list-type=2&prefix=...`) with continuation tokens.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{Client, StatusCode};
use tracing::{debug, instrument};
use url::Url;
use windscope_core::{ArchiveName, ArchiveStore, StoreError, StoreResult};

use crate::config::HttpConfig;

/// Default connection timeout
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Upper bound on listing pages, guards against a server that never
/// clears `IsTruncated`
const MAX_LIST_PAGES: usize = 1_000;

/// Archive store backed by an S3-compatible bucket
#[derive(Debug, Clone)]
pub struct HttpArchiveStore {
    client: Client,
    base_url: Url,
    prefix: String,
}

impl HttpArchiveStore {
    pub fn new(config: &HttpConfig) -> StoreResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(DEFAULT_CONNECT_TIMEOUT)
            .build()
            .map_err(|e| StoreError::InvalidConfig(e.to_string()))?;

        let mut base = config.base_url.trim_end_matches('/').to_string();
        base.push('/');
        let base_url = Url::parse(&base)
            .map_err(|e| StoreError::InvalidConfig(format!("{}: {}", config.base_url, e)))?;

        Ok(Self {
            client,
            base_url,
            prefix: config.prefix.trim_start_matches('/').to_string(),
        })
    }

    fn key_of(&self, name: &ArchiveName) -> String {
        format!("{}{}", self.prefix, name.as_str())
    }

    fn object_url(&self, name: &ArchiveName) -> StoreResult<Url> {
        self.base_url
            .join(&self.key_of(name))
            .map_err(|e| StoreError::Http(format!("invalid object URL for {}: {}", name, e)))
    }
}

#[async_trait]
impl ArchiveStore for HttpArchiveStore {
    fn describe(&self) -> String {
        format!("http:{}{}", self.base_url, self.prefix)
    }

    #[instrument(skip(self), fields(archive = %name))]
    async fn exists(&self, name: &ArchiveName) -> StoreResult<bool> {
        let url = self.object_url(name)?;
        let response = self.client.head(url).send().await.map_err(http_error)?;

        match response.status() {
            s if s.is_success() => Ok(true),
            StatusCode::NOT_FOUND | StatusCode::FORBIDDEN => Ok(false),
            s => Err(StoreError::Http(format!("HEAD {} returned {}", name, s))),
        }
    }

    #[instrument(skip(self), fields(archive = %name))]
    async fn read_all(&self, name: &ArchiveName) -> StoreResult<Bytes> {
        let url = self.object_url(name)?;
        let response = self.client.get(url).send().await.map_err(http_error)?;

        match response.status() {
            s if s.is_success() => response.bytes().await.map_err(http_error),
            StatusCode::NOT_FOUND => Err(StoreError::NotFound(name.to_string())),
            s => Err(StoreError::Http(format!("GET {} returned {}", name, s))),
        }
    }

    #[instrument(skip(self))]
    async fn list(&self, namespace: &str) -> StoreResult<Vec<ArchiveName>> {
        let namespace = namespace.trim_matches('/');
        let key_prefix = format!("{}{}/", self.prefix, namespace);
        let mut names = Vec::new();
        let mut token: Option<String> = None;

        for _ in 0..MAX_LIST_PAGES {
            let mut url = self.base_url.clone();
            {
                let mut query = url.query_pairs_mut();
                query.append_pair("list-type", "2");
                query.append_pair("prefix", &key_prefix);
                if let Some(ref t) = token {
                    query.append_pair("continuation-token", t);
                }
            }

            let response = self.client.get(url).send().await.map_err(http_error)?;
            if !response.status().is_success() {
                return Err(StoreError::Http(format!(
                    "ListObjectsV2 {} returned {}",
                    key_prefix,
                    response.status()
                )));
            }
            let body = response.text().await.map_err(http_error)?;
            let page = parse_listing(&body)?;

            for key in page.keys {
                let Some(file) = key.strip_prefix(&key_prefix) else {
                    continue;
                };
                if file.is_empty() || file.contains('/') {
                    continue;
                }
                names.push(ArchiveName::join(namespace, file));
            }

            match page.next_token {
                Some(next) if page.truncated => token = Some(next),
                _ => {
                    names.sort();
                    debug!(namespace = %namespace, count = names.len(), "Listed namespace");
                    return Ok(names);
                }
            }
        }

        Err(StoreError::MalformedListing(format!(
            "listing of {} exceeded {} pages",
            key_prefix, MAX_LIST_PAGES
        )))
    }
}

fn http_error(e: reqwest::Error) -> StoreError {
    StoreError::Http(e.to_string())
}

/// One page of a `ListObjectsV2` response
#[derive(Debug, Default, PartialEq)]
struct ListingPage {
    keys: Vec<String>,
    truncated: bool,
    next_token: Option<String>,
}

/// Parse a `ListBucketResult` document (namespace-agnostic)
fn parse_listing(xml: &str) -> StoreResult<ListingPage> {
    let doc =
        roxmltree::Document::parse(xml).map_err(|e| StoreError::MalformedListing(e.to_string()))?;
    let root = doc.root_element();
    if root.tag_name().name() != "ListBucketResult" {
        return Err(StoreError::MalformedListing(format!(
            "unexpected root element <{}>",
            root.tag_name().name()
        )));
    }

    let keys = root
        .children()
        .filter(|c| c.is_element() && c.tag_name().name() == "Contents")
        .filter_map(|c| child_text(c, "Key"))
        .collect();

    Ok(ListingPage {
        keys,
        truncated: child_text(root, "IsTruncated").as_deref() == Some("true"),
        next_token: child_text(root, "NextContinuationToken"),
    })
}

fn child_text(node: roxmltree::Node<'_, '_>, name: &str) -> Option<String> {
    node.children()
        .find(|c| c.is_element() && c.tag_name().name() == name)
        .and_then(|c| c.text())
        .map(|t| t.trim().to_string())
}
