use std::time::Duration;

use async_trait::async_trait;
use mangashelf_lib::{LIB_VERSION, error::Error, error::Result};

use crate::query::Query;

/// Transport to the upstream API: one GET returning the decoded JSON body.
#[async_trait]
pub trait Upstream: Send + Sync {
    async fn get(&self, path: &str, query: &Query) -> Result<serde_json::Value>;
}

#[derive(Debug, Clone)]
pub struct HttpUpstream {
    client: reqwest::Client,
    base_url: String,
}

impl HttpUpstream {
    pub fn new(base_url: &str) -> Result<Self> {
        Self::with_timeout(base_url, None)
    }

    pub fn with_timeout(base_url: &str, timeout: Option<Duration>) -> Result<Self> {
        let mut builder =
            reqwest::Client::builder().user_agent(format!("mangashelf/{LIB_VERSION}"));
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| Error::transport(base_url, e))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl Upstream for HttpUpstream {
    async fn get(&self, path: &str, query: &Query) -> Result<serde_json::Value> {
        let url = format!("{}{}", self.base_url, path);
        debug!("request => GET {url} {:?}", query.pairs());

        let response = self
            .client
            .get(&url)
            .query(query.pairs())
            .send()
            .await
            .and_then(|res| res.error_for_status())
            .map_err(|e| Error::transport(path, e))?;

        debug!("response ok => {}", response.status());

        response
            .json::<serde_json::Value>()
            .await
            .map_err(|e| Error::unexpected_shape(path, e))
    }
}
