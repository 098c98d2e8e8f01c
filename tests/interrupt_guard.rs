//! Integration tests for the deferred-interrupt guard.
//!
//! Arming the guard requires the primary thread and the default SIGINT
//! disposition, and replaying a deferred SIGINT against the default handler
//! terminates the process. The tests that exercise those paths therefore run
//! in a child process: each `child_*` test is `#[ignore]`d and re-invoked by
//! its parent test through the test binary itself with `--test-threads=1`,
//! which runs the test on the child's main thread. The parent asserts on the
//! child's output and exit status.

#![cfg(unix)]

use rf_instruments::interrupt::{uninterruptible, DelayedInterrupt};
use serial_test::serial;
use std::io::Write;
use std::mem::MaybeUninit;
use std::os::unix::process::ExitStatusExt;
use std::process::{Command, Output};
use std::sync::atomic::{AtomicBool, Ordering};

const CHILD_ENV: &str = "INTERRUPT_GUARD_CHILD";

fn in_child() -> bool {
    std::env::var_os(CHILD_ENV).is_some()
}

fn run_child(test_name: &str) -> Output {
    Command::new(std::env::current_exe().unwrap())
        .args([
            test_name,
            "--exact",
            "--ignored",
            "--nocapture",
            "--test-threads=1",
        ])
        .env(CHILD_ENV, "1")
        .output()
        .unwrap()
}

fn raise_sigint() {
    unsafe {
        libc::raise(libc::SIGINT);
    }
}

fn sigint_disposition_is_default() -> bool {
    let mut action = MaybeUninit::<libc::sigaction>::uninit();
    let rc = unsafe { libc::sigaction(libc::SIGINT, std::ptr::null(), action.as_mut_ptr()) };
    assert_eq!(rc, 0);
    unsafe { action.assume_init() }.sa_sigaction == libc::SIG_DFL
}

fn emit(marker: &str) {
    println!("{}", marker);
    std::io::stdout().flush().unwrap();
}

// ---------------------------------------------------------------------------
// Child-process test bodies (run via run_child, skipped otherwise)
// ---------------------------------------------------------------------------

#[test]
#[ignore]
fn child_defers_single_interrupt() {
    if !in_child() {
        return;
    }
    {
        let guard = DelayedInterrupt::new();
        assert!(guard.is_armed());
        raise_sigint();
        // The interrupt was captured, not delivered; the section continues.
        emit("MARKER section complete");
    }
    // The guard's drop replays the captured SIGINT against the restored
    // default handler, so this line is never reached.
    emit("MARKER after replay");
}

#[test]
#[ignore]
fn child_second_interrupt_aborts() {
    if !in_child() {
        return;
    }
    let guard = DelayedInterrupt::new();
    assert!(guard.is_armed());
    raise_sigint();
    emit("MARKER first deferred");
    raise_sigint();
    emit("MARKER survived second");
}

#[test]
#[ignore]
fn child_restores_handler_without_signal() {
    if !in_child() {
        return;
    }
    assert!(sigint_disposition_is_default());
    let guard = DelayedInterrupt::new();
    assert!(guard.is_armed());
    assert!(!sigint_disposition_is_default());
    drop(guard);
    assert!(sigint_disposition_is_default());
    emit("MARKER handler restored");
}

#[test]
#[ignore]
fn child_declines_when_custom_handler_installed() {
    if !in_child() {
        return;
    }
    static CUSTOM_HIT: AtomicBool = AtomicBool::new(false);
    extern "C" fn recording_handler(_sig: libc::c_int) {
        CUSTOM_HIT.store(true, Ordering::SeqCst);
    }

    let handler: extern "C" fn(libc::c_int) = recording_handler;
    unsafe {
        libc::signal(libc::SIGINT, handler as libc::sighandler_t);
    }

    let guard = DelayedInterrupt::new();
    assert!(!guard.is_armed());

    // With the guard declined, an interrupt is delivered straight to the
    // installed handler.
    raise_sigint();
    assert!(CUSTOM_HIT.load(Ordering::SeqCst));

    drop(guard);
    unsafe {
        libc::signal(libc::SIGINT, libc::SIG_DFL);
    }
    emit("MARKER custom handler intact");
}

// ---------------------------------------------------------------------------
// Parent tests
// ---------------------------------------------------------------------------

#[test]
#[serial]
fn test_single_interrupt_deferred_then_replayed_once() {
    let output = run_child("child_defers_single_interrupt");
    let stdout = String::from_utf8_lossy(&output.stdout);

    // The section completed despite the interrupt...
    assert!(stdout.contains("MARKER section complete"), "{}", stdout);
    // ...and the replayed SIGINT terminated the child on exit, exactly once.
    assert!(!stdout.contains("MARKER after replay"), "{}", stdout);
    assert_eq!(output.status.signal(), Some(libc::SIGINT));
}

#[test]
#[serial]
fn test_second_interrupt_aborts_immediately() {
    let output = run_child("child_second_interrupt_aborts");
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(stdout.contains("MARKER first deferred"), "{}", stdout);
    assert!(!stdout.contains("MARKER survived second"), "{}", stdout);
    assert_eq!(output.status.signal(), Some(libc::SIGINT));
}

#[test]
#[serial]
fn test_handler_restored_after_clean_exit() {
    let output = run_child("child_restores_handler_without_signal");
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(stdout.contains("MARKER handler restored"), "{}", stdout);
    assert!(output.status.success(), "{:?}", output.status);
}

#[test]
#[serial]
fn test_custom_handler_left_untouched() {
    let output = run_child("child_declines_when_custom_handler_installed");
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(stdout.contains("MARKER custom handler intact"), "{}", stdout);
    assert!(output.status.success(), "{:?}", output.status);
}

#[test]
#[serial]
fn test_off_primary_thread_leaves_default_behaviour() {
    // Runs in-process: a guard entered off the primary thread never arms and
    // never touches the process disposition.
    let handle = std::thread::spawn(|| {
        let guard = DelayedInterrupt::new();
        guard.is_armed()
    });
    assert!(!handle.join().unwrap());
    assert!(sigint_disposition_is_default());
}

#[test]
#[serial]
fn test_uninterruptible_passes_through_result() {
    assert_eq!(uninterruptible(|| "done"), "done");
}
