use std::path::{Path, PathBuf};

use log::debug;

use crate::feed::{FeedError, PriceList};

/// Where a supplier's price list lives. The source reference (url or filename) is recorded on the shop row at
/// ingestion time so the listing can be refreshed later.
#[derive(Debug, Clone)]
pub enum FeedSource {
    File(PathBuf),
    Url(String),
}

impl FeedSource {
    pub fn file<P: AsRef<Path>>(path: P) -> Self {
        Self::File(path.as_ref().to_path_buf())
    }

    pub fn url<S: Into<String>>(url: S) -> Self {
        Self::Url(url.into())
    }

    pub fn url_ref(&self) -> Option<&str> {
        match self {
            Self::Url(u) => Some(u.as_str()),
            Self::File(_) => None,
        }
    }

    pub fn filename(&self) -> Option<String> {
        match self {
            Self::File(p) => Some(p.display().to_string()),
            Self::Url(_) => None,
        }
    }

    /// Loads and parses the price list. Transport and IO failures surface as [`FeedError::SourceUnavailable`];
    /// document problems as [`FeedError::Validation`]. `.json` sources go through the JSON parser, everything else
    /// is treated as YAML.
    pub async fn load(&self) -> Result<PriceList, FeedError> {
        let raw = match self {
            Self::File(path) => {
                debug!("📦️ Loading price list from file {}", path.display());
                tokio::fs::read(path).await.map_err(|e| {
                    FeedError::SourceUnavailable(format!("cannot read {}: {e}", path.display()))
                })?
            },
            Self::Url(url) => {
                debug!("📦️ Fetching price list from {url}");
                let parsed = reqwest::Url::parse(url)
                    .map_err(|e| FeedError::SourceUnavailable(format!("invalid url {url}: {e}")))?;
                let response = reqwest::get(parsed)
                    .await
                    .and_then(|r| r.error_for_status())
                    .map_err(|e| FeedError::SourceUnavailable(format!("fetching {url}: {e}")))?;
                response
                    .bytes()
                    .await
                    .map_err(|e| FeedError::SourceUnavailable(format!("reading body of {url}: {e}")))?
                    .to_vec()
            },
        };
        let list = if self.is_json() { PriceList::from_json(&raw)? } else { PriceList::from_slice(&raw)? };
        list.validate()?;
        Ok(list)
    }

    fn is_json(&self) -> bool {
        match self {
            Self::File(p) => p.extension().is_some_and(|e| e.eq_ignore_ascii_case("json")),
            Self::Url(u) => u.split('?').next().is_some_and(|u| u.to_ascii_lowercase().ends_with(".json")),
        }
    }
}

impl std::fmt::Display for FeedSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::File(p) => write!(f, "file {}", p.display()),
            Self::Url(u) => write!(f, "url {u}"),
        }
    }
}

#[cfg(test)]
mod test {
    use super::FeedSource;
    use crate::feed::FeedError;

    #[tokio::test]
    async fn missing_file_is_source_unavailable() {
        let src = FeedSource::file("/definitely/not/here.yaml");
        let err = src.load().await.unwrap_err();
        assert!(matches!(err, FeedError::SourceUnavailable(_)));
    }

    #[tokio::test]
    async fn malformed_url_is_source_unavailable() {
        let src = FeedSource::url("not a url at all");
        let err = src.load().await.unwrap_err();
        assert!(matches!(err, FeedError::SourceUnavailable(_)));
    }
}
