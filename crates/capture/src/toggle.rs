//! Capture enable flag and scoped suspension
//!
//! Capture for a type is active iff the type is enabled and no suspension
//! scope is open. Suspension nests: each [`SuspendGuard`] bumps a depth
//! counter and releases it on drop, including during unwinding, so an inner
//! scope ending never re-enables capture while an outer one is still open.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// Enable flag plus suspension depth for one subject type
#[derive(Debug)]
pub struct CaptureToggle {
    enabled: AtomicBool,
    suspended: AtomicUsize,
}

impl Default for CaptureToggle {
    fn default() -> Self {
        Self::new()
    }
}

impl CaptureToggle {
    /// Enabled, not suspended
    pub fn new() -> Self {
        Self {
            enabled: AtomicBool::new(true),
            suspended: AtomicUsize::new(0),
        }
    }

    /// Turn capture on
    pub fn enable(&self) {
        self.enabled.store(true, Ordering::SeqCst);
    }

    /// Turn capture off until `enable` is called
    pub fn disable(&self) {
        self.enabled.store(false, Ordering::SeqCst);
    }

    /// Whether the enable flag is set (ignores open suspensions)
    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    /// Number of open suspension scopes
    pub fn suspension_depth(&self) -> usize {
        self.suspended.load(Ordering::SeqCst)
    }

    /// Whether a mutation right now would be captured
    pub fn is_active(&self) -> bool {
        self.is_enabled() && self.suspension_depth() == 0
    }

    /// Open a suspension scope that ends when the guard drops
    pub fn suspend(&self) -> SuspendGuard<'_> {
        self.suspended.fetch_add(1, Ordering::SeqCst);
        SuspendGuard { toggle: self }
    }

    /// Run `f` with capture suspended
    pub fn without<R>(&self, f: impl FnOnce() -> R) -> R {
        let _guard = self.suspend();
        f()
    }
}

/// Open suspension scope
#[must_use = "capture resumes as soon as the guard is dropped"]
#[derive(Debug)]
pub struct SuspendGuard<'a> {
    toggle: &'a CaptureToggle,
}

impl Drop for SuspendGuard<'_> {
    fn drop(&mut self) {
        self.toggle.suspended.fetch_sub(1, Ordering::SeqCst);
    }
}
