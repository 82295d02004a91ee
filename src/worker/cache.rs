use crate::error::NetworkError;
use crate::ports::Fetcher;
use crate::types::worker::{CachedResponse, Destination, RequestKey, ResourceRequest};

use super::rules::{self, CachePolicy, ClassificationRule, Generation};
use super::storage::CacheStorage;

use axum::http::Method;
use futures::future::try_join_all;
use std::sync::Arc;
use thiserror::Error;
use url::Url;

pub const DEFAULT_PRECACHE: &[&str] = &[
    "/",
    "/static/js/bundle.js",
    "/static/css/main.css",
    "/manifest.json",
];

#[derive(Debug, Error)]
pub enum CacheError {
    #[error(transparent)]
    NetworkUnavailable(#[from] NetworkError),

    #[error("precache of {url} failed: {reason}")]
    Install { url: String, reason: String },

    #[error("invalid resource url: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

/// Deployment tag; every deployment gets its own pair of generations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheVersion {
    pub prefix: String,
    pub tag: String,
}

impl CacheVersion {
    pub fn new(prefix: impl Into<String>, tag: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            tag: tag.into(),
        }
    }

    pub fn static_generation(&self) -> String {
        format!("{}-pwa-{}", self.prefix, self.tag)
    }

    pub fn api_generation(&self) -> String {
        format!("{}-api-{}", self.prefix, self.tag)
    }

    fn generation(&self, generation: Generation) -> String {
        match generation {
            Generation::Static => self.static_generation(),
            Generation::Api => self.api_generation(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseSource {
    Cache,
    Network,
    OfflineFallback,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchOutcome {
    pub response: CachedResponse,
    pub source: ResponseSource,
}

impl FetchOutcome {
    fn new(response: CachedResponse, source: ResponseSource) -> Self {
        Self { response, source }
    }
}

pub struct CacheStrategyEngine<F> {
    fetcher: F,
    storage: Arc<CacheStorage>,
    origin: Url,
    version: CacheVersion,
    rules: Vec<ClassificationRule>,
    precache: Vec<String>,
    offline_root: String,
}

impl<F: Fetcher> CacheStrategyEngine<F> {
    pub fn new(fetcher: F, storage: Arc<CacheStorage>, origin: Url, version: CacheVersion) -> Self {
        Self {
            fetcher,
            storage,
            origin,
            version,
            rules: rules::default_rules(),
            precache: DEFAULT_PRECACHE.iter().map(|path| path.to_string()).collect(),
            offline_root: "/".to_string(),
        }
    }

    pub fn with_rules(mut self, rules: Vec<ClassificationRule>) -> Self {
        self.rules = rules;
        self
    }

    pub fn with_precache<I, P>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<String>,
    {
        self.precache = paths.into_iter().map(Into::into).collect();
        self
    }

    pub fn version(&self) -> &CacheVersion {
        &self.version
    }

    pub fn storage(&self) -> &Arc<CacheStorage> {
        &self.storage
    }

    /// Fetches the whole precache manifest and stores it only if every entry
    /// came back 2xx.
    pub async fn install(&self) -> Result<usize, CacheError> {
        let requests = self
            .precache
            .iter()
            .map(|path| {
                let url = self.origin.join(path)?;
                let destination = if url.path() == "/" {
                    Destination::Document
                } else {
                    Destination::Empty
                };
                Ok(ResourceRequest::get(url, destination))
            })
            .collect::<Result<Vec<_>, CacheError>>()?;

        let fetched = try_join_all(requests.iter().map(|request| async move {
            let response = self.fetcher.fetch(request).await.map_err(|err| CacheError::Install {
                url: request.url.to_string(),
                reason: err.to_string(),
            })?;
            if !response.is_success() {
                return Err(CacheError::Install {
                    url: request.url.to_string(),
                    reason: format!("status {}", response.status),
                });
            }
            Ok((request.key(), response))
        }))
        .await?;

        let generation = self.version.static_generation();
        self.storage.open(&generation);
        let count = fetched.len();
        for (key, response) in fetched {
            self.storage.put(&generation, key, response);
        }
        tracing::info!(generation = %generation, count, "precached app shell");
        Ok(count)
    }

    /// Deletes every generation not belonging to this version; returns the
    /// names removed.
    pub fn activate(&self) -> Vec<String> {
        let keep = [self.version.static_generation(), self.version.api_generation()];
        let mut deleted = Vec::new();
        for name in self.storage.generations() {
            if keep.contains(&name) {
                continue;
            }
            if self.storage.delete(&name) {
                tracing::info!(generation = %name, "deleting old cache");
                deleted.push(name);
            }
        }
        deleted
    }

    pub async fn handle(&self, request: &ResourceRequest) -> Result<FetchOutcome, CacheError> {
        if request.method != Method::GET {
            let response = self.fetcher.fetch(request).await?;
            return Ok(FetchOutcome::new(response, ResponseSource::Network));
        }

        match rules::classify(&self.rules, request) {
            Some(CachePolicy::CacheFirst(generation)) => self.cache_first(request, generation).await,
            Some(CachePolicy::NetworkFirst(generation)) => {
                self.network_first(request, generation).await
            }
            None => {
                let response = self.fetcher.fetch(request).await?;
                Ok(FetchOutcome::new(response, ResponseSource::Network))
            }
        }
    }

    async fn cache_first(
        &self,
        request: &ResourceRequest,
        generation: Generation,
    ) -> Result<FetchOutcome, CacheError> {
        let generation = self.version.generation(generation);
        let key = request.key();
        if let Some(cached) = self.storage.lookup(&generation, &key) {
            tracing::debug!(url = %request.url, "serving from cache");
            return Ok(FetchOutcome::new(cached, ResponseSource::Cache));
        }

        match self.fetcher.fetch(request).await {
            Ok(response) => {
                if response.is_success() {
                    self.storage.put(&generation, key, response.clone());
                }
                Ok(FetchOutcome::new(response, ResponseSource::Network))
            }
            Err(err) => {
                tracing::warn!(url = %request.url, "fetch failed: {err}");
                if !request.is_navigation() {
                    return Err(CacheError::NetworkUnavailable(err));
                }
                match self.offline_root(&generation)? {
                    Some(offline) => Ok(FetchOutcome::new(offline, ResponseSource::OfflineFallback)),
                    None => Err(CacheError::NetworkUnavailable(err)),
                }
            }
        }
    }

    async fn network_first(
        &self,
        request: &ResourceRequest,
        generation: Generation,
    ) -> Result<FetchOutcome, CacheError> {
        let generation = self.version.generation(generation);
        let key = request.key();
        match self.fetcher.fetch(request).await {
            Ok(response) => {
                if response.is_success() {
                    self.storage.put(&generation, key, response.clone());
                }
                Ok(FetchOutcome::new(response, ResponseSource::Network))
            }
            Err(err) => match self.storage.lookup(&generation, &key) {
                Some(cached) => {
                    tracing::debug!(url = %request.url, "network failed, serving cached copy");
                    Ok(FetchOutcome::new(cached, ResponseSource::Cache))
                }
                None => Err(CacheError::NetworkUnavailable(err)),
            },
        }
    }

    fn offline_root(&self, generation: &str) -> Result<Option<CachedResponse>, CacheError> {
        let key = RequestKey {
            method: Method::GET,
            url: self.origin.join(&self.offline_root)?.to_string(),
        };
        Ok(self.storage.lookup(generation, &key))
    }
}
