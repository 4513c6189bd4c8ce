// ─── Update Checker ───
// Looks up the latest published release through an ordered list of API
// mirrors and compares it with the running version. Also resolves a reachable
// content mirror for download links.

use std::cmp::Ordering;

use chrono::DateTime;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::version::{compare_versions, strip_prefix};
use crate::core::error::{HelperError, HelperResult};

/// Fixed endpoints for release lookups and download mirrors.
#[derive(Debug, Clone)]
pub struct UpdateConfig {
    pub owner: String,
    pub repo: String,
    /// Release API bases, most preferred first.
    pub api_mirrors: Vec<String>,
    /// Content hosts, the primary host first.
    pub content_mirrors: Vec<String>,
}

impl Default for UpdateConfig {
    fn default() -> Self {
        Self {
            owner: "XgzK".into(),
            repo: "intellijapp".into(),
            api_mirrors: vec!["https://api.github.com".into()],
            content_mirrors: vec![
                "https://github.com".into(),
                "https://2git.xyz".into(),
                "https://lgithub.xyz".into(),
            ],
        }
    }
}

impl UpdateConfig {
    pub fn primary_host(&self) -> Option<&str> {
        self.content_mirrors.first().map(String::as_str)
    }

    fn latest_release_url(&self, api_base: &str) -> String {
        format!(
            "{}/repos/{}/{}/releases/latest",
            api_base.trim_end_matches('/'),
            self.owner,
            self.repo
        )
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AssetInfo {
    pub name: String,
    pub download_url: String,
    pub size: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReleaseInfo {
    /// Tag with any leading `v` removed.
    pub version: String,
    pub published_at: String,
    pub html_url: String,
    pub body: String,
    pub assets: Vec<AssetInfo>,
}

impl ReleaseInfo {
    /// `YYYY-MM-DD` of the publish timestamp, or the raw value if unparsable.
    pub fn published_date(&self) -> String {
        DateTime::parse_from_rfc3339(&self.published_at)
            .map(|date| date.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|_| self.published_at.clone())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct UpdateCheckResult {
    pub has_update: bool,
    pub current_version: String,
    pub release: Option<ReleaseInfo>,
}

/// Release object as returned by the hosting API.
#[derive(Debug, Deserialize)]
struct ApiRelease {
    tag_name: String,
    #[serde(default)]
    published_at: Option<String>,
    #[serde(default)]
    html_url: String,
    #[serde(default)]
    body: Option<String>,
    #[serde(default)]
    assets: Vec<ApiAsset>,
}

#[derive(Debug, Deserialize)]
struct ApiAsset {
    name: String,
    browser_download_url: String,
    #[serde(default)]
    size: u64,
}

impl From<ApiRelease> for ReleaseInfo {
    fn from(raw: ApiRelease) -> Self {
        Self {
            version: strip_prefix(&raw.tag_name).to_string(),
            published_at: raw.published_at.unwrap_or_default(),
            html_url: raw.html_url,
            body: raw.body.unwrap_or_default(),
            assets: raw
                .assets
                .into_iter()
                .map(|a| AssetInfo {
                    name: a.name,
                    download_url: a.browser_download_url,
                    size: a.size,
                })
                .collect(),
        }
    }
}

pub struct UpdateChecker {
    client: Client,
    config: UpdateConfig,
}

impl UpdateChecker {
    pub fn new(client: Client, config: UpdateConfig) -> Self {
        Self { client, config }
    }

    /// Compare the latest release against `current_version`.
    pub async fn check_for_update(&self, current_version: &str) -> HelperResult<UpdateCheckResult> {
        info!("Checking for updates (current version {})", current_version);

        let release = self.fetch_latest_release().await?;
        let has_update = release
            .as_ref()
            .map(|r| compare_versions(&r.version, current_version) == Ordering::Greater)
            .unwrap_or(false);

        match &release {
            Some(r) => info!(
                "Update check finished: latest {}, has_update={}",
                r.version, has_update
            ),
            None => info!("No release has been published yet"),
        }

        Ok(UpdateCheckResult {
            has_update,
            current_version: current_version.to_string(),
            release,
        })
    }

    /// Latest release from the first mirror that answers.
    ///
    /// `Ok(None)` means the API answered 404: nothing published, and no other
    /// mirror is asked.
    pub async fn fetch_latest_release(&self) -> HelperResult<Option<ReleaseInfo>> {
        let mut last_error = None;

        for (attempt, api_base) in self.config.api_mirrors.iter().enumerate() {
            let url = self.config.latest_release_url(api_base);
            debug!("Trying release API {} (attempt {})", api_base, attempt + 1);

            match self.fetch_from_api(&url).await {
                Ok(release) => {
                    info!("Release lookup succeeded via {}", api_base);
                    return Ok(release);
                }
                Err(e) => {
                    warn!("Release API {} failed, trying next mirror: {}", api_base, e);
                    last_error = Some(e);
                }
            }
        }

        let last = last_error
            .unwrap_or_else(|| HelperError::Settings("no release API mirrors configured".into()));
        Err(HelperError::AllMirrorsFailed {
            last: Box::new(last),
        })
    }

    async fn fetch_from_api(&self, url: &str) -> HelperResult<Option<ReleaseInfo>> {
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(HelperError::ApiStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let raw: ApiRelease = response.json().await?;
        let release = ReleaseInfo::from(raw);
        debug!("Parsed release {}", release.version);
        Ok(Some(release))
    }

    /// First content mirror answering a HEAD with 200, else the primary host.
    pub async fn resolve_accessible_mirror(&self) -> String {
        for mirror in &self.config.content_mirrors {
            debug!("Probing mirror {}", mirror);
            match self.client.head(mirror).send().await {
                Ok(response) if response.status() == StatusCode::OK => {
                    info!("Using mirror {}", mirror);
                    return mirror.clone();
                }
                Ok(response) => debug!("Mirror {} answered {}", mirror, response.status()),
                Err(e) => debug!("Mirror {} unreachable: {}", mirror, e),
            }
        }

        warn!("No mirror reachable, falling back to the primary host");
        self.config
            .primary_host()
            .map(str::to_string)
            .unwrap_or_default()
    }

    /// Rewrite a primary-host URL onto the reachable mirror. Other URLs are
    /// returned untouched and trigger no probing.
    pub async fn convert_to_accessible_url(&self, url: &str) -> String {
        let Some(primary) = self.config.primary_host() else {
            return url.to_string();
        };
        if !url.starts_with(primary) {
            return url.to_string();
        }

        let mirror = self.resolve_accessible_mirror().await;
        if mirror == primary {
            return url.to_string();
        }

        let converted = url.replacen(primary, &mirror, 1);
        info!("Rewrote {} -> {}", url, converted);
        converted
    }
}
