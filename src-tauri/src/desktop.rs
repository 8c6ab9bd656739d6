//! Tauri host: webview windows for external pages and the invoke commands
//! the frontend talks to.

use anyhow::Context;
use futures::future::{BoxFuture, FutureExt};
use std::sync::Arc;
use tauri::{AppHandle, Emitter, Manager, State, WebviewUrl, WebviewWindowBuilder, WindowEvent};

use crate::backend::{WindowLabel, WindowRequest, WindowingBackend};
use crate::config::ShellConfig;
use crate::controller::WindowController;
use crate::frame::FrameReporter;
use crate::logging;
use crate::pages::{Page, PageRegistry, PageStatus};
use crate::presenter::PageView;

const MAIN_WINDOW: &str = "main";
const PAGE_UPDATED_EVENT: &str = "page:updated";

pub struct TauriBackend {
    app: AppHandle,
}

impl TauriBackend {
    pub fn new(app: AppHandle) -> Self {
        Self { app }
    }
}

impl WindowingBackend for TauriBackend {
    fn create_window(&self, request: WindowRequest) -> BoxFuture<'_, Result<(), String>> {
        async move {
            // left over from a failed close: reuse it instead of clashing on the label
            if let Some(window) = self.app.get_webview_window(request.label.as_str()) {
                window
                    .show()
                    .map_err(|e| format!("Failed to show window: {e}"))?;
                return window
                    .set_focus()
                    .map_err(|e| format!("Failed to focus window: {e}"));
            }

            let url = request
                .url
                .parse::<tauri::Url>()
                .map_err(|e| format!("Invalid URL: {e}"))?;

            let mut builder =
                WebviewWindowBuilder::new(&self.app, request.label.as_str(), WebviewUrl::External(url))
                    .title(&request.title)
                    .inner_size(request.size.width, request.size.height)
                    .resizable(true)
                    .decorations(true)
                    .center();
            if let Some(main) = self.app.get_webview_window(MAIN_WINDOW) {
                builder = builder
                    .parent(&main)
                    .map_err(|e| format!("Failed to attach window: {e}"))?;
            }
            builder
                .build()
                .map_err(|e| format!("Failed to create window: {e}"))?;
            Ok(())
        }
        .boxed()
    }

    fn close_window(&self, label: WindowLabel) -> BoxFuture<'_, Result<(), String>> {
        async move {
            if let Some(window) = self.app.get_webview_window(label.as_str()) {
                window
                    .close()
                    .map_err(|e| format!("Failed to close window: {e}"))?;
            }
            Ok(())
        }
        .boxed()
    }

    fn focus_window(&self, label: WindowLabel) -> BoxFuture<'_, Result<(), String>> {
        async move {
            if let Some(window) = self.app.get_webview_window(label.as_str()) {
                window
                    .set_focus()
                    .map_err(|e| format!("Failed to focus window: {e}"))?;
            }
            Ok(())
        }
        .boxed()
    }
}

struct ShellState {
    controller: Arc<WindowController<TauriBackend>>,
    frames: FrameReporter,
}

#[tauri::command]
fn list_pages(state: State<'_, ShellState>) -> Vec<PageView> {
    state
        .controller
        .registry()
        .list()
        .into_iter()
        .map(PageView::from)
        .collect()
}

#[tauri::command]
async fn open_page(id: String, state: State<'_, ShellState>) -> Result<PageStatus, String> {
    state.controller.open(&id).await.map_err(|e| e.to_string())
}

#[tauri::command]
async fn retry_page(id: String, state: State<'_, ShellState>) -> Result<PageStatus, String> {
    state.controller.retry(&id).await.map_err(|e| e.to_string())
}

#[tauri::command]
async fn close_page(id: String, state: State<'_, ShellState>) -> Result<PageStatus, String> {
    state.controller.close(&id).await.map_err(|e| e.to_string())
}

#[tauri::command]
async fn focus_page(id: String, state: State<'_, ShellState>) -> Result<PageStatus, String> {
    state.controller.focus(&id).await.map_err(|e| e.to_string())
}

#[tauri::command]
fn frame_loaded(id: String, state: State<'_, ShellState>) -> Result<PageView, String> {
    state
        .frames
        .loaded(&id)
        .map(PageView::from)
        .map_err(|e| e.to_string())
}

#[tauri::command]
fn frame_failed(id: String, message: String, state: State<'_, ShellState>) -> Result<PageView, String> {
    state
        .frames
        .failed(&id, message)
        .map(PageView::from)
        .map_err(|e| e.to_string())
}

#[tauri::command]
fn debug_log(message: String) {
    tracing::info!(target: "frontend", "{message}");
}

fn on_window_destroyed(window: &tauri::Window, event: &WindowEvent) {
    if !matches!(event, WindowEvent::Destroyed) {
        return;
    }
    let Some(state) = window.try_state::<ShellState>() else {
        return;
    };
    if let Err(e) = state.controller.host_window_destroyed(window.label()) {
        tracing::warn!(target: "desktop", label = window.label(), error = %e, "untracked window destroyed");
    }
}

pub fn run() -> anyhow::Result<()> {
    logging::init();

    let config = ShellConfig::load().context("failed to load shell config")?;
    let registry = Arc::new(PageRegistry::new(config.pages())?);
    let settings = config.controller_settings();

    tauri::Builder::default()
        .setup(move |app| {
            let handle = app.handle().clone();

            let emitter = handle.clone();
            registry.subscribe(move |page: &Page| {
                if let Err(e) = emitter.emit(PAGE_UPDATED_EVENT, PageView::from(page.clone())) {
                    tracing::warn!(target: "desktop", id = %page.id, error = %e, "failed to emit page update");
                }
            });

            let backend = Arc::new(TauriBackend::new(handle));
            let controller = Arc::new(WindowController::new(registry.clone(), backend, settings));
            app.manage(ShellState {
                controller,
                frames: FrameReporter::new(registry.clone()),
            });

            tracing::info!(target: "desktop", pages = registry.list().len(), "shell ready");
            Ok(())
        })
        .on_window_event(on_window_destroyed)
        .invoke_handler(tauri::generate_handler![
            list_pages,
            open_page,
            retry_page,
            close_page,
            focus_page,
            frame_loaded,
            frame_failed,
            debug_log,
        ])
        .run(tauri::generate_context!())
        .context("error while running tauri application")
}
