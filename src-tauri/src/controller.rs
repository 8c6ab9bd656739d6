//! Window Lifecycle Controller
//!
//! Drives external-mode pages through their window lifecycle:
//!
//! ```text
//! ready --open--> loading --create ok--> external --close ok--> ready
//!                    |                      |
//!                    +--create failed--> error <--close failed--+
//!                                          |
//!                                        retry --> loading
//! ```
//!
//! Focus never changes a page's status. Every backend command runs under a
//! deadline and at most one command per page is in flight at a time.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use futures::future::BoxFuture;

use crate::backend::{WindowLabel, WindowRequest, WindowSize, WindowingBackend};
use crate::error::{Result, ShellError};
use crate::pages::{Page, PageMode, PageRegistry, PageStatus, PageUpdate};

const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControllerSettings {
    pub window: WindowSize,
    pub command_timeout: Duration,
}

impl Default for ControllerSettings {
    fn default() -> Self {
        Self {
            window: WindowSize::default(),
            command_timeout: DEFAULT_COMMAND_TIMEOUT,
        }
    }
}

pub struct WindowController<B> {
    registry: Arc<PageRegistry>,
    backend: Arc<B>,
    settings: ControllerSettings,
    in_flight: Mutex<HashMap<String, Command>>,
}

/// Window command currently running for a page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Open,
    Close,
    Focus,
}

/// Marks a page as busy until dropped.
struct InFlight<'a> {
    pages: &'a Mutex<HashMap<String, Command>>,
    id: String,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        lock(self.pages).remove(&self.id);
    }
}

impl<B: WindowingBackend> WindowController<B> {
    pub fn new(registry: Arc<PageRegistry>, backend: Arc<B>, settings: ControllerSettings) -> Self {
        Self {
            registry,
            backend,
            settings,
            in_flight: Mutex::new(HashMap::new()),
        }
    }

    pub fn registry(&self) -> &Arc<PageRegistry> {
        &self.registry
    }

    pub fn settings(&self) -> ControllerSettings {
        self.settings
    }

    /// Open the page's host window. Accepted from `ready` and `error`.
    pub async fn open(&self, id: &str) -> Result<PageStatus> {
        let guard = self.begin(id, Command::Open)?;
        let page = self.external_page(id)?;
        if !matches!(page.status, PageStatus::Ready | PageStatus::Error) {
            return Err(invalid(&page, "open"));
        }
        self.launch(page, guard).await
    }

    /// Manual retry after a failure; same command as `open`, no backoff.
    pub async fn retry(&self, id: &str) -> Result<PageStatus> {
        let guard = self.begin(id, Command::Open)?;
        let page = self.external_page(id)?;
        if page.status != PageStatus::Error {
            return Err(invalid(&page, "retry"));
        }
        tracing::info!(target: "window", id, previous = ?page.error, "retrying");
        self.launch(page, guard).await
    }

    pub async fn close(&self, id: &str) -> Result<PageStatus> {
        let _guard = self.begin(id, Command::Close)?;
        let page = self.external_page(id)?;
        if page.status != PageStatus::External {
            return Err(invalid(&page, "close"));
        }

        let label = WindowLabel::for_page(id);
        tracing::info!(target: "window", id, %label, "closing window");

        let update = match self.deadline(self.backend.close_window(label.clone())).await {
            Ok(()) => PageUpdate::to(PageStatus::Ready),
            Err(message) => {
                // the host window may still be open at this point
                tracing::warn!(target: "window", id, %label, %message, "close failed");
                PageUpdate::failed(or_default(message, "Failed to close window"))
            }
        };
        Ok(self.registry.update(id, update)?.status)
    }

    /// Bring the page's window to the front. Failures are only logged.
    pub async fn focus(&self, id: &str) -> Result<PageStatus> {
        let _guard = self.begin(id, Command::Focus)?;
        self.external_page(id)?;

        let label = WindowLabel::for_page(id);
        if let Err(message) = self.deadline(self.backend.focus_window(label.clone())).await {
            tracing::warn!(target: "window", id, %label, %message, "focus failed");
        }
        Ok(self.registry.get(id)?.status)
    }

    /// The host reports that a window went away on its own (e.g. the user
    /// closed it from the title bar). Pages showing `external` fall back to
    /// `ready`; anything else is left as is.
    pub fn host_window_destroyed(&self, label: &str) -> Result<Option<PageStatus>> {
        let Some(id) = WindowLabel::parse_page_id(label) else {
            return Ok(None);
        };
        // a close we issued ourselves settles the status when it resolves
        if lock(&self.in_flight).get(id) == Some(&Command::Close) {
            return Ok(None);
        }

        let page = self.registry.get(id)?;
        if page.mode != PageMode::External || page.status != PageStatus::External {
            return Ok(None);
        }
        tracing::info!(target: "window", id, label, "host window destroyed");
        Ok(Some(self.registry.update(id, PageUpdate::to(PageStatus::Ready))?.status))
    }

    async fn launch(&self, page: Page, _guard: InFlight<'_>) -> Result<PageStatus> {
        self.registry.update(&page.id, PageUpdate::to(PageStatus::Loading))?;

        let request = WindowRequest {
            label: WindowLabel::for_page(&page.id),
            url: page.url,
            title: page.title,
            size: self.settings.window,
        };
        tracing::info!(
            target: "window",
            id = %page.id,
            label = %request.label,
            url = %request.url,
            "creating window"
        );

        let update = match self.deadline(self.backend.create_window(request)).await {
            Ok(()) => PageUpdate::to(PageStatus::External),
            Err(message) => {
                tracing::warn!(target: "window", id = %page.id, %message, "create failed");
                PageUpdate::failed(or_default(message, "Failed to create window"))
            }
        };
        Ok(self.registry.update(&page.id, update)?.status)
    }

    async fn deadline(&self, command: BoxFuture<'_, Result<(), String>>) -> Result<(), String> {
        let limit = self.settings.command_timeout;
        match tokio::time::timeout(limit, command).await {
            Ok(result) => result,
            Err(_) => Err(format!("Window command timed out after {}s", limit.as_secs_f32())),
        }
    }

    fn begin(&self, id: &str, command: Command) -> Result<InFlight<'_>> {
        let mut in_flight = lock(&self.in_flight);
        if let Some(running) = in_flight.get(id) {
            tracing::debug!(target: "window", id, ?running, ?command, "rejected, command in flight");
            return Err(ShellError::Busy(id.to_string()));
        }
        in_flight.insert(id.to_string(), command);
        drop(in_flight);
        Ok(InFlight {
            pages: &self.in_flight,
            id: id.to_string(),
        })
    }

    fn external_page(&self, id: &str) -> Result<Page> {
        let page = self.registry.get(id)?;
        if page.mode != PageMode::External {
            return Err(ShellError::NotExternal(page.id));
        }
        Ok(page)
    }
}

fn invalid(page: &Page, action: &'static str) -> ShellError {
    ShellError::InvalidTransition {
        id: page.id.clone(),
        action,
        status: page.status,
    }
}

fn or_default(message: String, fallback: &str) -> String {
    if message.trim().is_empty() {
        fallback.to_string()
    } else {
        message
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
