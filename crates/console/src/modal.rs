//! Process-wide modal dialog.
//!
//! At most one dialog is open. Showing a new one replaces the pending dialog
//! and drops its callbacks without running them.

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use tracing::debug;

pub type ModalCallback = Box<dyn FnOnce() + Send + 'static>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ModalKind {
    Info,
    Success,
    Error,
    Confirm,
}

pub struct ModalConfig {
    title: String,
    message: String,
    kind: ModalKind,
    confirm_text: Option<String>,
    cancel_text: Option<String>,
    on_confirm: Option<ModalCallback>,
    on_cancel: Option<ModalCallback>,
}

impl ModalConfig {
    pub fn new(kind: ModalKind, title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
            kind,
            confirm_text: None,
            cancel_text: None,
            on_confirm: None,
            on_cancel: None,
        }
    }

    pub fn info(title: impl Into<String>, message: impl Into<String>) -> Self { Self::new(ModalKind::Info, title, message) }

    pub fn success(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ModalKind::Success, title, message)
    }

    pub fn error(title: impl Into<String>, message: impl Into<String>) -> Self { Self::new(ModalKind::Error, title, message) }

    pub fn confirm(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ModalKind::Confirm, title, message)
    }

    pub fn confirm_text(mut self, text: impl Into<String>) -> Self {
        self.confirm_text = Some(text.into());
        self
    }

    pub fn cancel_text(mut self, text: impl Into<String>) -> Self {
        self.cancel_text = Some(text.into());
        self
    }

    pub fn on_confirm(mut self, f: impl FnOnce() + Send + 'static) -> Self {
        self.on_confirm = Some(Box::new(f));
        self
    }

    pub fn on_cancel(mut self, f: impl FnOnce() + Send + 'static) -> Self {
        self.on_cancel = Some(Box::new(f));
        self
    }
}

/// What a front end needs to draw the open dialog.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModalView {
    pub title: String,
    pub message: String,
    pub kind: ModalKind,
    pub confirm_text: String,
    pub cancel_text: String,
    pub hide_cancel_button: bool,
}

struct OpenModal {
    view: ModalView,
    on_confirm: Option<ModalCallback>,
    on_cancel: Option<ModalCallback>,
}

#[derive(Clone, Default)]
pub struct ModalBroadcaster {
    slot: Arc<Mutex<Option<OpenModal>>>,
}

impl fmt::Debug for ModalBroadcaster {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModalBroadcaster").field("current", &self.current()).finish()
    }
}

impl ModalBroadcaster {
    pub fn new() -> Self { Self::default() }

    pub fn show(&self, config: ModalConfig) {
        let confirm_text = config.confirm_text.unwrap_or_else(|| {
            if config.kind == ModalKind::Confirm { "Confirm".into() } else { "OK".into() }
        });
        let view = ModalView {
            title: config.title,
            message: config.message,
            kind: config.kind,
            confirm_text,
            cancel_text: config.cancel_text.unwrap_or_else(|| "Cancel".into()),
            hide_cancel_button: config.kind != ModalKind::Confirm,
        };
        debug!(kind = ?view.kind, title = %view.title, "modal opened");
        let replaced = self
            .lock()
            .replace(OpenModal { view, on_confirm: config.on_confirm, on_cancel: config.on_cancel });
        if replaced.is_some() {
            debug!("pending modal replaced");
        }
    }

    pub fn current(&self) -> Option<ModalView> { self.lock().as_ref().map(|m| m.view.clone()) }

    pub fn is_open(&self) -> bool { self.lock().is_some() }

    /// Runs the confirm callback and closes. Returns `false` when nothing was open.
    pub fn confirm(&self) -> bool {
        // Taken before invoking so the callback may open another dialog.
        let Some(open) = self.lock().take() else { return false };
        if let Some(cb) = open.on_confirm {
            cb();
        }
        true
    }

    pub fn cancel(&self) -> bool {
        let Some(open) = self.lock().take() else { return false };
        if let Some(cb) = open.on_cancel {
            cb();
        }
        true
    }

    /// Dismissal without a button, e.g. a click outside the dialog.
    pub fn close(&self) -> bool { self.cancel() }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<OpenModal>> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counter() -> (Arc<AtomicUsize>, impl FnOnce() + Send + 'static) {
        let n = Arc::new(AtomicUsize::new(0));
        let c = n.clone();
        (n, move || {
            c.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[test]
    fn default_labels_depend_on_kind() {
        let modal = ModalBroadcaster::new();
        modal.show(ModalConfig::confirm("Delete", "Sure?"));
        let view = modal.current().unwrap();
        assert_eq!(view.confirm_text, "Confirm");
        assert_eq!(view.cancel_text, "Cancel");
        assert!(!view.hide_cancel_button);

        modal.show(ModalConfig::error("Error", "boom"));
        let view = modal.current().unwrap();
        assert_eq!(view.confirm_text, "OK");
        assert!(view.hide_cancel_button);
    }

    #[test]
    fn confirm_runs_callback_once_and_closes() {
        let modal = ModalBroadcaster::new();
        let (hits, cb) = counter();
        modal.show(ModalConfig::confirm("Delete", "Sure?").on_confirm(cb));
        assert!(modal.confirm());
        assert!(!modal.is_open());
        assert!(!modal.confirm());
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn close_runs_cancel_callback() {
        let modal = ModalBroadcaster::new();
        let (confirmed, on_confirm) = counter();
        let (cancelled, on_cancel) = counter();
        modal.show(ModalConfig::confirm("Delete", "Sure?").on_confirm(on_confirm).on_cancel(on_cancel));
        assert!(modal.close());
        assert_eq!(confirmed.load(Ordering::SeqCst), 0);
        assert_eq!(cancelled.load(Ordering::SeqCst), 1);
        assert!(!modal.cancel());
    }

    #[test]
    fn replaced_dialog_callbacks_never_run() {
        let modal = ModalBroadcaster::new();
        let (first, cb) = counter();
        modal.show(ModalConfig::confirm("First", "?").on_confirm(cb));
        modal.show(ModalConfig::info("Second", "!").confirm_text("Got it"));
        assert_eq!(modal.current().unwrap().confirm_text, "Got it");
        modal.confirm();
        assert_eq!(first.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn callback_may_open_follow_up_dialog() {
        let modal = ModalBroadcaster::new();
        let inner = modal.clone();
        modal.show(ModalConfig::confirm("Delete", "?").on_confirm(move || {
            inner.show(ModalConfig::success("Done", "deleted"));
        }));
        modal.confirm();
        assert_eq!(modal.current().map(|v| v.kind), Some(ModalKind::Success));
    }
}
