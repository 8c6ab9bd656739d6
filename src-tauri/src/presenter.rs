//! Status indicator text and color for a page.

use serde::Serialize;

use crate::pages::{Page, PageMode, PageStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusColor {
    Amber,
    Green,
    Red,
    Blue,
    Gray,
}

impl StatusColor {
    pub fn hex(self) -> &'static str {
        match self {
            StatusColor::Amber => "#ff9800",
            StatusColor::Green => "#4caf50",
            StatusColor::Red => "#f44336",
            StatusColor::Blue => "#2196f3",
            StatusColor::Gray => "#9e9e9e",
        }
    }

    /// Keyed by status label so values coming from the frontend that we do
    /// not recognise still get a color.
    pub fn for_label(status: &str) -> Self {
        match status {
            "loading" => StatusColor::Amber,
            "ready" => StatusColor::Green,
            "error" => StatusColor::Red,
            "external" => StatusColor::Blue,
            _ => StatusColor::Gray,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusIndicator {
    pub tooltip: &'static str,
    pub color: StatusColor,
}

pub fn describe(status: PageStatus, mode: PageMode) -> StatusIndicator {
    let tooltip = match (mode, status) {
        (PageMode::External, PageStatus::Loading) => "Loading...",
        (PageMode::External, PageStatus::External) => "Opened in a separate window",
        (PageMode::External, PageStatus::Ready) => "Ready to open",
        (PageMode::Embedded, PageStatus::Loading) => "Loading frame...",
        (PageMode::Embedded, PageStatus::Ready) => "Ready",
        (_, PageStatus::Error) | (PageMode::Embedded, PageStatus::External) => "Error",
    };
    StatusIndicator {
        tooltip,
        color: StatusColor::for_label(status.as_str()),
    }
}

/// Tooltip for a concrete page; an error message replaces the generic one.
pub fn tooltip_for(page: &Page) -> String {
    let indicator = describe(page.status, page.mode);
    match (&page.error, page.status) {
        (Some(message), PageStatus::Error) if !message.is_empty() => message.clone(),
        _ => indicator.tooltip.to_string(),
    }
}

/// Read model handed to rendering callers
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageView {
    #[serde(flatten)]
    pub page: Page,
    pub tooltip: String,
    pub color: &'static str,
}

impl From<Page> for PageView {
    fn from(page: Page) -> Self {
        let tooltip = tooltip_for(&page);
        let color = StatusColor::for_label(page.status.as_str()).hex();
        Self {
            page,
            tooltip,
            color,
        }
    }
}
