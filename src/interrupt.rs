//! Deferred delivery of SIGINT during critical sections.
//!
//! [`DelayedInterrupt`] is a scoped guard that keeps a keyboard interrupt from
//! aborting a critical section (an instrument write that must not be torn, a
//! file finalisation, etc.). The first SIGINT received while the guard is
//! armed is captured and replayed against the restored handler when the guard
//! drops; a second SIGINT aborts immediately with the default behaviour.
//!
//! The guard arms only on the primary thread and only when the default SIGINT
//! disposition is active; anywhere else it is a silent no-op, so entering a
//! protected section can never fail. The process-wide handler slot is saved on
//! entry and restored unconditionally on drop, whichever way the section
//! exits.
//!
//! Inspired by
//! <https://stackoverflow.com/questions/842557/how-to-prevent-a-block-of-code-from-being-interrupted-by-keyboardinterrupt-in-py>

// Raw sigaction is the only way to save and restore the process handler slot.
#![allow(unsafe_code)]

use log::{debug, info};
use std::mem::MaybeUninit;
use std::sync::atomic::{AtomicI32, Ordering};

/// Signal number captured while a guard was armed; 0 when none is pending.
static PENDING_SIGNAL: AtomicI32 = AtomicI32::new(0);

const DEFER_MSG: &[u8] =
    b"Received SIGINT, will interrupt at the first suitable time. Send a second SIGINT to interrupt immediately.\n";
const FORCE_MSG: &[u8] = b"Second SIGINT received, interrupting immediately.\n";

/// Async-signal-safe write to stderr. Only `write(2)` is legal inside a
/// signal handler; the log facade is not.
fn write_stderr(msg: &[u8]) {
    unsafe {
        let _ = libc::write(libc::STDERR_FILENO, msg.as_ptr().cast(), msg.len());
    }
}

/// First-SIGINT handler: capture the signal and swap in the forceful handler
/// so the next SIGINT aborts immediately.
extern "C" fn deferring_handler(sig: libc::c_int) {
    PENDING_SIGNAL.store(sig, Ordering::SeqCst);
    write_stderr(DEFER_MSG);
    let forceful: extern "C" fn(libc::c_int) = forceful_handler;
    unsafe {
        libc::signal(sig, forceful as libc::sighandler_t);
    }
}

/// Second-SIGINT handler: restore the default disposition and re-raise, which
/// terminates the process the way an unhandled SIGINT would.
extern "C" fn forceful_handler(sig: libc::c_int) {
    write_stderr(FORCE_MSG);
    unsafe {
        libc::signal(sig, libc::SIG_DFL);
        libc::raise(sig);
    }
}

fn current_sigint_action() -> Option<libc::sigaction> {
    let mut current = MaybeUninit::<libc::sigaction>::uninit();
    let rc = unsafe { libc::sigaction(libc::SIGINT, std::ptr::null(), current.as_mut_ptr()) };
    (rc == 0).then(|| unsafe { current.assume_init() })
}

fn is_default_action(action: &libc::sigaction) -> bool {
    action.sa_sigaction == libc::SIG_DFL
}

fn install_deferring_handler() -> Option<libc::sigaction> {
    let mut action: libc::sigaction = unsafe { std::mem::zeroed() };
    let handler: extern "C" fn(libc::c_int) = deferring_handler;
    action.sa_sigaction = handler as libc::sighandler_t;
    action.sa_flags = libc::SA_RESTART;
    unsafe {
        libc::sigemptyset(&mut action.sa_mask);
    }
    let mut old = MaybeUninit::<libc::sigaction>::uninit();
    let rc = unsafe { libc::sigaction(libc::SIGINT, &action, old.as_mut_ptr()) };
    (rc == 0).then(|| unsafe { old.assume_init() })
}

/// The process's initial thread, the only one permitted to take over the
/// process-wide handler slot. The runtime names it "main".
fn on_primary_thread() -> bool {
    std::thread::current().name() == Some("main")
}

/// Scoped guard deferring SIGINT delivery until it is dropped.
///
/// # Example
///
/// ```no_run
/// use rf_instruments::interrupt::DelayedInterrupt;
///
/// {
///     let _guard = DelayedInterrupt::new();
///     // Ctrl-C here is captured, not delivered.
/// }
/// // ...and replayed here, once the handler slot is restored.
/// ```
pub struct DelayedInterrupt {
    saved: Option<libc::sigaction>,
}

impl DelayedInterrupt {
    /// Enter the protected section.
    ///
    /// Arms only on the primary thread with the default SIGINT disposition
    /// active; otherwise this is a no-op and default signal behaviour is left
    /// fully intact. Never fails.
    pub fn new() -> Self {
        let default_active = current_sigint_action()
            .as_ref()
            .is_some_and(is_default_action);
        if !default_active {
            return Self { saved: None };
        }
        if !on_primary_thread() {
            debug!("not on the primary thread, cannot intercept interrupts");
            return Self { saved: None };
        }
        PENDING_SIGNAL.store(0, Ordering::SeqCst);
        Self {
            saved: install_deferring_handler(),
        }
    }

    /// Whether this guard actually took over the handler slot.
    pub fn is_armed(&self) -> bool {
        self.saved.is_some()
    }
}

impl Default for DelayedInterrupt {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for DelayedInterrupt {
    fn drop(&mut self) {
        let Some(saved) = self.saved.take() else {
            return;
        };
        unsafe {
            libc::sigaction(libc::SIGINT, &saved, std::ptr::null_mut());
        }
        let pending = PENDING_SIGNAL.swap(0, Ordering::SeqCst);
        if pending != 0 {
            info!("replaying deferred SIGINT against the restored handler");
            unsafe {
                libc::raise(pending);
            }
        }
    }
}

/// Run `f` with SIGINT delivery deferred until it returns.
pub fn uninterruptible<R>(f: impl FnOnce() -> R) -> R {
    let _guard = DelayedInterrupt::new();
    f()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    // Arming paths need the main thread and a default disposition, which the
    // test harness does not provide in-process; those paths are covered by
    // the child-process tests in tests/interrupt_guard.rs.

    #[test]
    #[serial]
    fn test_off_primary_thread_is_noop() {
        let handle = std::thread::spawn(|| {
            let guard = DelayedInterrupt::new();
            guard.is_armed()
        });
        assert!(!handle.join().unwrap());
        // Disposition untouched.
        let action = current_sigint_action().unwrap();
        assert!(is_default_action(&action));
    }

    #[test]
    #[serial]
    fn test_query_reports_default_disposition() {
        let action = current_sigint_action().unwrap();
        assert!(is_default_action(&action));
    }

    #[test]
    #[serial]
    fn test_uninterruptible_returns_closure_value() {
        let value = uninterruptible(|| 42);
        assert_eq!(value, 42);
    }
}
