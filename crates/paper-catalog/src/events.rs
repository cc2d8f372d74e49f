//! UI signals: navigation, notifications, list invalidation.
//!
//! Components never act on the host directly; they emit a [`UiEvent`] and the
//! host (CLI, TUI, tests) decides what to do with it.

use tokio::sync::broadcast::{self, error::TryRecvError};

use crate::routes::Route;

/// Severity of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    /// Operation completed.
    Success,
    /// Informational.
    Info,
    /// Operation failed; the view kept its previous state.
    Error,
}

/// A transient user-facing message (toast).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    /// Severity.
    pub level: NotificationLevel,
    /// Message text.
    pub message: String,
}

/// List views that can be told to refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListKind {
    /// Papers list.
    Papers,
    /// Authors list.
    Authors,
    /// Journals table.
    Journals,
}

impl ListKind {
    /// Route of the list view.
    #[must_use]
    pub const fn route(self) -> Route {
        match self {
            Self::Papers => Route::Papers,
            Self::Authors => Route::Authors,
            Self::Journals => Route::Journals,
        }
    }
}

/// A signal for the host shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEvent {
    /// Move to another route.
    Navigate(Route),
    /// Show a notification.
    Notify(Notification),
    /// Data behind a list view changed; refresh it when shown.
    ListInvalidated(ListKind),
}

/// Broadcast bus for [`UiEvent`]s.
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<UiEvent>,
}

impl EventBus {
    /// Create a bus that buffers up to `capacity` events per subscriber.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Subscribe to events emitted from now on.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<UiEvent> {
        self.tx.subscribe()
    }

    /// Emit an event. Events with no subscriber are dropped.
    pub fn emit(&self, event: UiEvent) {
        if self.tx.send(event).is_err() {
            tracing::trace!("UI event dropped, no subscribers");
        }
    }

    /// Request navigation.
    pub fn navigate(&self, route: Route) {
        tracing::debug!(route = %route, "Navigation requested");
        self.emit(UiEvent::Navigate(route));
    }

    /// Emit a success notification.
    pub fn success(&self, message: impl Into<String>) {
        self.notify(NotificationLevel::Success, message);
    }

    /// Emit an informational notification.
    pub fn info(&self, message: impl Into<String>) {
        self.notify(NotificationLevel::Info, message);
    }

    /// Emit an error notification.
    pub fn error(&self, message: impl Into<String>) {
        self.notify(NotificationLevel::Error, message);
    }

    /// Mark a list view stale.
    pub fn invalidate(&self, list: ListKind) {
        self.emit(UiEvent::ListInvalidated(list));
    }

    fn notify(&self, level: NotificationLevel, message: impl Into<String>) {
        self.emit(UiEvent::Notify(Notification { level, message: message.into() }));
    }
}

/// Take every event already buffered for `receiver` without waiting.
///
/// A receiver that fell behind loses the overwritten events but keeps reading
/// the ones still buffered.
pub fn drain_pending(receiver: &mut broadcast::Receiver<UiEvent>) -> Vec<UiEvent> {
    let mut events = Vec::new();
    loop {
        match receiver.try_recv() {
            Ok(event) => events.push(event),
            Err(TryRecvError::Lagged(skipped)) => tracing::warn!(skipped, "Event receiver lagged"),
            Err(TryRecvError::Empty | TryRecvError::Closed) => return events,
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(64)
    }
}
