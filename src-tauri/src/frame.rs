//! Load reports from embedded content frames.

use std::sync::Arc;

use crate::error::{Result, ShellError};
use crate::pages::{Page, PageMode, PageRegistry, PageStatus, PageUpdate};

const DEFAULT_LOAD_ERROR: &str = "Failed to load frame";

pub struct FrameReporter {
    registry: Arc<PageRegistry>,
}

impl FrameReporter {
    pub fn new(registry: Arc<PageRegistry>) -> Self {
        Self { registry }
    }

    pub fn loaded(&self, id: &str) -> Result<Page> {
        self.embedded(id)?;
        tracing::debug!(target: "frame", id, "frame loaded");
        self.registry.update(id, PageUpdate::to(PageStatus::Ready))
    }

    pub fn failed(&self, id: &str, message: impl Into<String>) -> Result<Page> {
        self.embedded(id)?;
        let mut message = message.into();
        if message.trim().is_empty() {
            message = DEFAULT_LOAD_ERROR.to_string();
        }
        tracing::warn!(target: "frame", id, %message, "frame failed to load");
        self.registry.update(id, PageUpdate::failed(message))
    }

    // external pages belong to the window controller
    fn embedded(&self, id: &str) -> Result<()> {
        match self.registry.get(id)?.mode {
            PageMode::Embedded => Ok(()),
            PageMode::External => Err(ShellError::NotEmbedded(id.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reporter() -> FrameReporter {
        let registry = PageRegistry::new(vec![
            Page::new("google", "Google", "https://google.com", PageMode::Embedded),
            Page::new("telegram", "Telegram", "https://web.telegram.org", PageMode::External),
        ])
        .unwrap();
        FrameReporter::new(Arc::new(registry))
    }

    #[test]
    fn test_load_then_failure() {
        let frames = reporter();

        let page = frames.loaded("google").unwrap();
        assert_eq!(page.status, PageStatus::Ready);
        assert_eq!(page.error, None);

        let page = frames.failed("google", "blocked").unwrap();
        assert_eq!(page.status, PageStatus::Error);
        assert_eq!(page.error.as_deref(), Some("blocked"));
    }

    #[test]
    fn test_reload_clears_previous_error() {
        let frames = reporter();
        frames.failed("google", "blocked").unwrap();
        assert_eq!(frames.loaded("google").unwrap().error, None);
    }

    #[test]
    fn test_blank_message_gets_default() {
        let page = reporter().failed("google", " ").unwrap();
        assert_eq!(page.error.as_deref(), Some(DEFAULT_LOAD_ERROR));
    }

    #[test]
    fn test_external_pages_are_not_touched() {
        let frames = reporter();
        assert_eq!(
            frames.loaded("telegram"),
            Err(ShellError::NotEmbedded("telegram".into()))
        );
        assert_eq!(frames.failed("missing", "x"), Err(ShellError::NotFound("missing".into())));
        assert_eq!(frames.registry.get("telegram").unwrap().status, PageStatus::Ready);
    }
}
