//! Offline asset cache and push-notification policy
//!
//! Fetching, storage and display stay with the host platform. This module only
//! decides which assets are precached, which responses are stored, what to
//! serve when the network is gone and what a severe-weather push notification
//! looks like.

use serde::{Deserialize, Serialize};

/// Name of the cache the current build writes to
pub const CACHE_NAME: &str = "storm-chase-v1";

/// Assets eligible for precaching
pub const STATIC_ASSETS: &[&str] = &[
    "/",
    "/static/manifest.json",
    "/static/mobile-styles.css",
    "/static/gps-tracker.js",
    "https://cdnjs.cloudflare.com/ajax/libs/leaflet/1.7.1/leaflet.css",
    "https://cdnjs.cloudflare.com/ajax/libs/leaflet/1.7.1/leaflet.js",
];

/// Body of the response served for non-navigation requests while offline
pub const OFFLINE_BODY: &str = "Offline - Storm Chase Dashboard";

const OFFLINE_PAGE: &str = "/";

const NOTIFICATION_ICON: &str = "/static/icon-192x192.png";
const NOTIFICATION_TAG: &str = "weather-alert";
const NOTIFICATION_VIBRATION_MS: [u64; 3] = [200, 100, 200];

/// Cache naming and eviction rules
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachePolicy {
    cache_name: String,
    assets: Vec<String>,
}

impl CachePolicy {
    pub fn new(cache_name: impl Into<String>, assets: &[&str]) -> Self {
        Self {
            cache_name: cache_name.into(),
            assets: assets.iter().map(|a| a.to_string()).collect(),
        }
    }

    pub fn cache_name(&self) -> &str {
        &self.cache_name
    }

    /// Same-origin assets to fetch at install time. Cross-origin entries
    /// are cached lazily on first successful fetch instead.
    pub fn precache_list(&self) -> Vec<&str> {
        self.assets
            .iter()
            .map(String::as_str)
            .filter(|url| !url.starts_with("https:"))
            .collect()
    }

    /// Caches to delete on activation: everything but the current one
    pub fn caches_to_evict<'a, I>(&self, existing: I) -> Vec<&'a str>
    where
        I: IntoIterator<Item = &'a str>,
    {
        existing
            .into_iter()
            .filter(|name| *name != self.cache_name)
            .collect()
    }

    /// Only http(s) requests go through the cache
    pub fn intercepts(&self, url: &str) -> bool {
        url.starts_with("http")
    }

    /// Whether a network response may be written to the cache.
    /// Errors, redirects and cross-origin responses pass through uncached.
    pub fn should_store(&self, status: u16, kind: ResponseKind) -> bool {
        status == 200 && kind == ResponseKind::Basic
    }

    /// What to serve when the network fetch failed and nothing was cached
    pub fn offline_fallback(&self, mode: RequestMode) -> OfflineFallback {
        match mode {
            RequestMode::Navigate => OfflineFallback::CachedPage(OFFLINE_PAGE),
            _ => OfflineFallback::Unavailable {
                status: 503,
                status_text: "Service Unavailable",
                body: OFFLINE_BODY,
            },
        }
    }
}

/// Response type as reported by the platform fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseKind {
    Basic,
    Cors,
    Opaque,
    Error,
}

/// Request mode as reported by the platform fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RequestMode {
    Navigate,
    SameOrigin,
    NoCors,
    Cors,
}

/// Offline answer for a failed fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OfflineFallback {
    /// Serve this cached page instead
    CachedPage(&'static str),
    Unavailable {
        status: u16,
        status_text: &'static str,
        body: &'static str,
    },
}

impl Default for CachePolicy {
    fn default() -> Self {
        Self::new(CACHE_NAME, STATIC_ASSETS)
    }
}

/// Push payload as delivered by the alert service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushPayload {
    pub title: String,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationAction {
    pub action: String,
    pub title: String,
}

/// Notification handed to the platform for display
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationOptions {
    pub title: String,
    pub body: String,
    pub icon: String,
    pub badge: String,
    pub vibrate: Vec<u64>,
    pub tag: String,
    pub actions: Vec<NotificationAction>,
}

impl NotificationOptions {
    pub fn weather_alert(payload: PushPayload) -> Self {
        Self {
            title: payload.title,
            body: payload.body,
            icon: NOTIFICATION_ICON.to_string(),
            badge: NOTIFICATION_ICON.to_string(),
            vibrate: NOTIFICATION_VIBRATION_MS.to_vec(),
            tag: NOTIFICATION_TAG.to_string(),
            actions: vec![
                NotificationAction {
                    action: "view".to_string(),
                    title: "View Dashboard".to_string(),
                },
                NotificationAction {
                    action: "dismiss".to_string(),
                    title: "Dismiss".to_string(),
                },
            ],
        }
    }
}

/// Whether a notification click should open the dashboard.
/// A plain click (no action) counts as "view".
pub fn opens_dashboard(action: Option<&str>) -> bool {
    matches!(action, None | Some("view") | Some(""))
}
