//! Windowing Backend
//!
//! The host side that actually owns external windows. The controller only
//! talks to it through [`WindowingBackend`]; the desktop build plugs in a
//! Tauri implementation, tests plug in scripted ones.

use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use std::fmt;

const LABEL_PREFIX: &str = "external-";

/// Host window address, always `external-<page id>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WindowLabel(String);

impl WindowLabel {
    pub fn for_page(page_id: &str) -> Self {
        Self(format!("{LABEL_PREFIX}{page_id}"))
    }

    /// Page id this label addresses, if it follows the convention.
    pub fn page_id(&self) -> Option<&str> {
        Self::parse_page_id(&self.0)
    }

    pub fn parse_page_id(label: &str) -> Option<&str> {
        label
            .strip_prefix(LABEL_PREFIX)
            .filter(|id| !id.is_empty())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WindowLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WindowSize {
    pub width: f64,
    pub height: f64,
}

impl Default for WindowSize {
    fn default() -> Self {
        Self {
            width: 1000.0,
            height: 700.0,
        }
    }
}

/// Everything the host needs to create a page window
#[derive(Debug, Clone, PartialEq)]
pub struct WindowRequest {
    pub label: WindowLabel,
    pub url: String,
    pub title: String,
    pub size: WindowSize,
}

/// Failures come back as the host's message, unchanged.
pub trait WindowingBackend: Send + Sync + 'static {
    fn create_window(&self, request: WindowRequest) -> BoxFuture<'_, Result<(), String>>;

    fn close_window(&self, label: WindowLabel) -> BoxFuture<'_, Result<(), String>>;

    fn focus_window(&self, label: WindowLabel) -> BoxFuture<'_, Result<(), String>>;
}
