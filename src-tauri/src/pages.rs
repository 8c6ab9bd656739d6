//! Page Registry
//!
//! Owns the fixed set of pages the shell presents. Pages are created once at
//! startup; afterwards only `status` and `error` change, and only through
//! [`PageRegistry::update`]. Every successful update is pushed to the
//! subscribed observers before `update` returns.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::error::{Result, ShellError};

/// How a page is rendered
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum PageMode {
    /// Inline content frame
    #[serde(alias = "iframe")]
    Embedded,
    /// Host-managed window
    External,
}

/// Lifecycle phase of a page
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum PageStatus {
    Loading,
    Ready,
    External,
    Error,
}

impl PageStatus {
    pub const ALL: [PageStatus; 4] = [
        PageStatus::Loading,
        PageStatus::Ready,
        PageStatus::External,
        PageStatus::Error,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            PageStatus::Loading => "loading",
            PageStatus::Ready => "ready",
            PageStatus::External => "external",
            PageStatus::Error => "error",
        }
    }
}

impl fmt::Display for PageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    pub id: String,
    pub title: String,
    pub url: String,
    pub mode: PageMode,
    pub status: PageStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Page {
    /// External pages wait at `ready` until the user asks for a window;
    /// embedded frames start loading right away.
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        url: impl Into<String>,
        mode: PageMode,
    ) -> Self {
        let status = match mode {
            PageMode::Embedded => PageStatus::Loading,
            PageMode::External => PageStatus::Ready,
        };
        Self {
            id: id.into(),
            title: title.into(),
            url: url.into(),
            mode,
            status,
            error: None,
        }
    }
}

/// Partial page update. `None` leaves a field untouched; for `error`,
/// `Some(None)` clears the message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageUpdate {
    pub status: Option<PageStatus>,
    pub error: Option<Option<String>>,
}

impl PageUpdate {
    /// Move to `status` and drop any previous error message.
    pub fn to(status: PageStatus) -> Self {
        Self {
            status: Some(status),
            error: Some(None),
        }
    }

    /// Move to `error` with the given message.
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            status: Some(PageStatus::Error),
            error: Some(Some(message.into())),
        }
    }

    fn apply(self, page: &mut Page) {
        if let Some(status) = self.status {
            page.status = status;
        }
        if let Some(error) = self.error {
            page.error = error;
        }
    }
}

/// Receives every merged page after a successful update.
///
/// Called with no registry lock held, so implementations may read the
/// registry and change subscriptions. Updates are delivered one at a time;
/// calling `update` from inside a callback deadlocks.
pub trait PageObserver: Send + Sync {
    fn page_updated(&self, page: &Page);
}

impl<F> PageObserver for F
where
    F: Fn(&Page) + Send + Sync,
{
    fn page_updated(&self, page: &Page) {
        self(page);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

pub struct PageRegistry {
    // serializes update + notify so observers see updates in apply order
    dispatch: Mutex<()>,
    pages: RwLock<Vec<Page>>,
    observers: Mutex<Vec<(SubscriptionId, Arc<dyn PageObserver>)>>,
    next_subscription: AtomicU64,
}

impl PageRegistry {
    pub fn new(pages: Vec<Page>) -> Result<Self> {
        let mut seen = HashSet::new();
        for page in &pages {
            if !seen.insert(page.id.as_str()) {
                return Err(ShellError::DuplicatePage(page.id.clone()));
            }
        }
        tracing::debug!(target: "pages", count = pages.len(), "registry created");

        Ok(Self {
            dispatch: Mutex::new(()),
            pages: RwLock::new(pages),
            observers: Mutex::new(Vec::new()),
            next_subscription: AtomicU64::new(1),
        })
    }

    /// All pages in creation order
    pub fn list(&self) -> Vec<Page> {
        read(&self.pages).clone()
    }

    pub fn get(&self, id: &str) -> Result<Page> {
        read(&self.pages)
            .iter()
            .find(|p| p.id == id)
            .cloned()
            .ok_or_else(|| ShellError::NotFound(id.to_string()))
    }

    /// Merge `changes` into page `id` and notify observers with the result.
    ///
    /// Domain rules are not checked here; callers own the state machine.
    pub fn update(&self, id: &str, changes: PageUpdate) -> Result<Page> {
        let _dispatch = lock(&self.dispatch);

        let snapshot = {
            let mut pages = write(&self.pages);
            let page = pages
                .iter_mut()
                .find(|p| p.id == id)
                .ok_or_else(|| ShellError::NotFound(id.to_string()))?;
            changes.apply(page);
            page.clone()
        };
        let observers: Vec<Arc<dyn PageObserver>> = lock(&self.observers)
            .iter()
            .map(|(_, observer)| observer.clone())
            .collect();

        tracing::debug!(
            target: "pages",
            id = %snapshot.id,
            status = %snapshot.status,
            error = ?snapshot.error,
            "page updated"
        );
        for observer in &observers {
            observer.page_updated(&snapshot);
        }

        Ok(snapshot)
    }

    pub fn subscribe(&self, observer: impl PageObserver + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription.fetch_add(1, Ordering::Relaxed));
        lock(&self.observers).push((id, Arc::new(observer)));
        id
    }

    /// Returns false if the subscription was already gone.
    pub fn unsubscribe(&self, subscription: SubscriptionId) -> bool {
        let mut observers = lock(&self.observers);
        let before = observers.len();
        observers.retain(|(id, _)| *id != subscription);
        observers.len() != before
    }
}

// a panicking observer must not take the whole registry down with it
fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> PageRegistry {
        PageRegistry::new(vec![
            Page::new("x", "X (Twitter)", "https://x.com", PageMode::External),
            Page::new("example", "Example", "https://example.com", PageMode::Embedded),
        ])
        .unwrap()
    }

    #[test]
    fn test_initial_status_follows_mode() {
        let registry = registry();
        assert_eq!(registry.get("x").unwrap().status, PageStatus::Ready);
        assert_eq!(registry.get("example").unwrap().status, PageStatus::Loading);
    }

    #[test]
    fn test_list_keeps_creation_order() {
        let ids: Vec<String> = registry().list().into_iter().map(|p| p.id).collect();
        assert_eq!(ids, vec!["x", "example"]);
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let result = PageRegistry::new(vec![
            Page::new("x", "A", "https://a.com", PageMode::External),
            Page::new("x", "B", "https://b.com", PageMode::Embedded),
        ]);
        assert_eq!(result.err(), Some(ShellError::DuplicatePage("x".into())));
    }

    #[test]
    fn test_missing_page_is_not_found() {
        let registry = registry();
        assert_eq!(registry.get("nope"), Err(ShellError::NotFound("nope".into())));
        assert_eq!(
            registry.update("nope", PageUpdate::to(PageStatus::Ready)),
            Err(ShellError::NotFound("nope".into()))
        );
    }

    #[test]
    fn test_update_preserves_unspecified_fields() {
        let registry = registry();
        registry.update("x", PageUpdate::failed("boom")).unwrap();

        let only_status = PageUpdate {
            status: Some(PageStatus::Loading),
            error: None,
        };
        let page = registry.update("x", only_status).unwrap();
        assert_eq!(page.status, PageStatus::Loading);
        assert_eq!(page.error.as_deref(), Some("boom"));
        assert_eq!(page.title, "X (Twitter)");
        assert_eq!(page.url, "https://x.com");
        assert_eq!(page.mode, PageMode::External);

        let page = registry.update("x", PageUpdate::default()).unwrap();
        assert_eq!(page.status, PageStatus::Loading);
    }

    #[test]
    fn test_status_change_clears_error() {
        let registry = registry();
        registry.update("x", PageUpdate::failed("boom")).unwrap();
        let page = registry.update("x", PageUpdate::to(PageStatus::Ready)).unwrap();
        assert_eq!(page.error, None);
    }

    #[test]
    fn test_observers_see_merged_page_in_order() {
        let registry = registry();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        registry.subscribe(move |page: &Page| {
            sink.lock().unwrap().push((page.id.clone(), page.status, page.error.clone()));
        });

        registry.update("x", PageUpdate::to(PageStatus::Loading)).unwrap();
        registry.update("x", PageUpdate::failed("timeout")).unwrap();

        assert_eq!(
            *seen.lock().unwrap(),
            vec![
                ("x".to_string(), PageStatus::Loading, None),
                ("x".to_string(), PageStatus::Error, Some("timeout".to_string())),
            ]
        );
    }

    #[test]
    fn test_observer_can_read_registry() {
        let registry = Arc::new(registry());
        let reader = registry.clone();
        let seen = Arc::new(Mutex::new(None));
        let sink = seen.clone();
        registry.subscribe(move |page: &Page| {
            *sink.lock().unwrap() = reader.get(&page.id).ok().map(|p| p.status);
        });

        registry.update("x", PageUpdate::to(PageStatus::External)).unwrap();
        assert_eq!(*seen.lock().unwrap(), Some(PageStatus::External));
    }

    #[test]
    fn test_concurrent_updates_with_reading_observer() {
        use std::sync::mpsc;
        use std::time::Duration;

        let registry = Arc::new(registry());
        let reader = registry.clone();
        registry.subscribe(move |page: &Page| {
            std::thread::sleep(Duration::from_millis(50));
            assert!(reader.get(&page.id).is_ok());
            assert_eq!(reader.list().len(), 2);
        });

        let (tx, rx) = mpsc::channel();
        let mut workers = Vec::new();
        for (id, delay) in [("x", 0), ("example", 20)] {
            let registry = registry.clone();
            let tx = tx.clone();
            workers.push(std::thread::spawn(move || {
                std::thread::sleep(Duration::from_millis(delay));
                let result = registry.update(id, PageUpdate::to(PageStatus::Ready));
                tx.send(result.map(|p| p.id)).unwrap();
            }));
        }

        let mut done: Vec<String> = (0..2)
            .map(|_| rx.recv_timeout(Duration::from_secs(3)).unwrap().unwrap())
            .collect();
        done.sort();
        assert_eq!(done, vec!["example", "x"]);
        for worker in workers {
            worker.join().unwrap();
        }
    }

    #[test]
    fn test_observer_can_subscribe_from_callback() {
        let registry = Arc::new(registry());
        let inner = registry.clone();
        let count = Arc::new(AtomicU64::new(0));
        let counter = count.clone();
        registry.subscribe(move |_: &Page| {
            let counter = counter.clone();
            inner.subscribe(move |_: &Page| {
                counter.fetch_add(1, Ordering::SeqCst);
            });
        });

        registry.update("x", PageUpdate::to(PageStatus::Loading)).unwrap();
        registry.update("x", PageUpdate::to(PageStatus::Ready)).unwrap();
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_unsubscribe_stops_notifications() {
        let registry = registry();
        let count = Arc::new(AtomicU64::new(0));
        let counter = count.clone();
        let id = registry.subscribe(move |_: &Page| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        registry.update("x", PageUpdate::to(PageStatus::Loading)).unwrap();
        assert!(registry.unsubscribe(id));
        assert!(!registry.unsubscribe(id));
        registry.update("x", PageUpdate::to(PageStatus::Ready)).unwrap();

        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_mode_accepts_legacy_iframe_name() {
        let mode: PageMode = serde_json::from_str("\"iframe\"").unwrap();
        assert_eq!(mode, PageMode::Embedded);
        assert_eq!(serde_json::to_string(&PageMode::Embedded).unwrap(), "\"embedded\"");
    }
}
