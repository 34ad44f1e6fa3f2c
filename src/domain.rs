//! Per-request "current domain" context.
//!
//! URL helpers called without an explicit host need to know which host the
//! in-flight request matched. [`Engine::handle`](crate::engine::Engine::handle)
//! sets this slot for the duration of pipeline + handler execution and clears
//! it on every exit path, including a panic unwinding through handler or
//! plugin code, via the `Drop` impl on [`DomainGuard`], the same discipline
//! this crate's dispatch seam already applies to its span guard.

use std::cell::RefCell;

/// The request's matched host, and (if matched via a wildcard host) the
/// subdomain portion that was stripped to find it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainContext {
    pub host: String,
    pub subdomain: Option<String>,
    pub locale: Option<String>,
}

thread_local! {
    static CURRENT_DOMAIN: RefCell<Option<DomainContext>> = const { RefCell::new(None) };
}

/// RAII guard installed at the top of request dispatch. Clears the slot when
/// dropped, whether that's on normal return or during unwinding.
pub struct DomainGuard {
    _private: (),
}

impl DomainGuard {
    /// Install `ctx` as the current domain for this task and return a guard
    /// that clears it again on drop.
    #[must_use]
    pub fn enter(ctx: DomainContext) -> Self {
        CURRENT_DOMAIN.with(|slot| *slot.borrow_mut() = Some(ctx));
        DomainGuard { _private: () }
    }
}

impl Drop for DomainGuard {
    fn drop(&mut self) {
        CURRENT_DOMAIN.with(|slot| *slot.borrow_mut() = None);
    }
}

/// Read the current request's matched host, if any. Returns `None` outside
/// of an active [`DomainGuard`] scope (e.g. called from a background task).
pub fn current_domain() -> Option<DomainContext> {
    CURRENT_DOMAIN.with(|slot| slot.borrow().clone())
}
