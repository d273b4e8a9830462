//! Deferred cleanup tied to a lexical scope.
//!
//! A [`ScopeGuard`] owns one cleanup action and runs it exactly once when the
//! guard is dropped, whether the scope ends normally or through an early `?`
//! return. Guards declared in the same scope drop in reverse declaration
//! order, so releases happen LIFO relative to acquisitions.

use std::io;
use std::path::Path;

#[must_use = "a guard dropped immediately runs its action immediately"]
pub struct ScopeGuard<F: FnOnce()> {
    action: Option<F>,
}

impl<F: FnOnce()> ScopeGuard<F> {
    pub fn new(action: F) -> Self {
        Self {
            action: Some(action),
        }
    }
}

impl<F: FnOnce()> Drop for ScopeGuard<F> {
    fn drop(&mut self) {
        if let Some(action) = self.action.take() {
            action();
        }
    }
}

pub fn defer<F: FnOnce()>(action: F) -> ScopeGuard<F> {
    ScopeGuard::new(action)
}

/// Unlink `path` if it is still there. Never fails: cleanup runs on error
/// paths, so anything other than "already gone" is only logged.
pub fn remove_if_exists(path: &Path) {
    match std::fs::remove_file(path) {
        Ok(()) => log::debug!("removed {}", path.display()),
        Err(err) if err.kind() == io::ErrorKind::NotFound => {}
        Err(err) => log::warn!("failed to remove {}: {err}", path.display()),
    }
}
