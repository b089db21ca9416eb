use std::sync::{Arc, Mutex, PoisonError};

use tracing::{debug, info, warn};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ToastId(u64);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ToastKind {
    Loading,
    Success,
    Error,
    Info,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Toast {
    pub id: ToastId,
    pub kind: ToastKind,
    pub message: String,
}

#[derive(Default)]
struct ToastState {
    next_id: u64,
    toasts: Vec<Toast>,
}

/// Transient notifications. A toast can be replaced in place by passing its id back.
#[derive(Clone, Default)]
pub struct Toaster {
    state: Arc<Mutex<ToastState>>,
}

impl Toaster {
    pub fn new() -> Self { Self::default() }

    pub fn loading(&self, message: impl Into<String>, replace: Option<ToastId>) -> ToastId {
        self.push(ToastKind::Loading, message.into(), replace)
    }

    pub fn success(&self, message: impl Into<String>, replace: Option<ToastId>) -> ToastId {
        self.push(ToastKind::Success, message.into(), replace)
    }

    pub fn error(&self, message: impl Into<String>, replace: Option<ToastId>) -> ToastId {
        self.push(ToastKind::Error, message.into(), replace)
    }

    pub fn info(&self, message: impl Into<String>) -> ToastId {
        self.push(ToastKind::Info, message.into(), None)
    }

    pub fn dismiss(&self, id: ToastId) {
        self.lock().toasts.retain(|t| t.id != id);
    }

    /// Toasts still on screen, oldest first.
    pub fn current(&self) -> Vec<Toast> { self.lock().toasts.clone() }

    pub fn last(&self) -> Option<Toast> { self.lock().toasts.last().cloned() }

    fn push(&self, kind: ToastKind, message: String, replace: Option<ToastId>) -> ToastId {
        match kind {
            ToastKind::Loading => debug!(toast = %message, "toast"),
            ToastKind::Success | ToastKind::Info => info!(toast = %message, "toast"),
            ToastKind::Error => warn!(toast = %message, "toast"),
        }
        let mut state = self.lock();
        if let Some(id) = replace {
            if let Some(slot) = state.toasts.iter_mut().find(|t| t.id == id) {
                slot.kind = kind;
                slot.message = message;
                return id;
            }
        }
        state.next_id += 1;
        let id = ToastId(state.next_id);
        state.toasts.push(Toast { id, kind, message });
        id
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ToastState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replacing_keeps_id_and_position() {
        let toaster = Toaster::new();
        let first = toaster.info("hello");
        let loading = toaster.loading("Deleting...", None);
        let done = toaster.success("done", Some(loading));
        assert_eq!(done, loading);

        let current = toaster.current();
        assert_eq!(current.len(), 2);
        assert_eq!(current[0].id, first);
        assert_eq!(current[1].kind, ToastKind::Success);
        assert_eq!(current[1].message, "done");
    }

    #[test]
    fn replacing_unknown_id_allocates_new_toast() {
        let toaster = Toaster::new();
        let id = toaster.loading("x", None);
        toaster.dismiss(id);
        let other = toaster.error("boom", Some(id));
        assert_ne!(other, id);
        assert_eq!(toaster.last().map(|t| t.kind), Some(ToastKind::Error));
    }
}
