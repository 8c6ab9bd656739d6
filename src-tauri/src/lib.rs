//! All-in-Poster
//!
//! Keeps a fixed set of pages, each shown either in an embedded frame or in
//! its own host window, and reconciles host window commands back into page
//! status that the UI can render.

pub mod backend;
pub mod config;
pub mod controller;
pub mod error;
pub mod frame;
pub mod logging;
pub mod pages;
pub mod presenter;

#[cfg(feature = "desktop")]
pub mod desktop;

pub use backend::{WindowLabel, WindowRequest, WindowSize, WindowingBackend};
pub use config::{ConfigError, PageSpec, ShellConfig};
pub use controller::{ControllerSettings, WindowController};
pub use error::ShellError;
pub use frame::FrameReporter;
pub use pages::{Page, PageMode, PageObserver, PageRegistry, PageStatus, PageUpdate, SubscriptionId};
pub use presenter::{describe, PageView, StatusColor, StatusIndicator};
