//! Scoped floating-point session
//!
//! The privileged environments this tool targets do not guarantee that
//! floating-point register state survives arbitrary execution, so every
//! float-touching step (parsing, offset conversion, formatting) runs inside
//! an explicitly acquired session. The session is an RAII token: acquired
//! before the first floating-point instruction, released in `Drop` on every
//! exit path, never nested, never held across a call that can block.
//!
//! Functions that execute floating-point instructions take `&FpSession` so
//! calling them outside a session is a type error rather than a runtime
//! hazard.

use std::cell::Cell;
use std::marker::PhantomData;

thread_local! {
    static FP_ACTIVE: Cell<bool> = const { Cell::new(false) };
}

/// Token proving a floating-point session is active on this thread
///
/// `!Send`/`!Sync`: the session is bound to the thread that acquired it.
pub struct FpSession {
    _thread_bound: PhantomData<*const ()>,
}

impl FpSession {
    /// Open a floating-point session on the current thread
    ///
    /// Sessions must not nest; a nested acquire is a caller bug and trips a
    /// debug assertion.
    pub fn acquire() -> Self {
        FP_ACTIVE.with(|active| {
            debug_assert!(!active.get(), "floating-point sessions must not nest");
            active.set(true);
        });
        tracing::trace!("Floating-point session acquired");
        FpSession {
            _thread_bound: PhantomData,
        }
    }
}

impl Drop for FpSession {
    fn drop(&mut self) {
        FP_ACTIVE.with(|active| active.set(false));
        tracing::trace!("Floating-point session released");
    }
}
