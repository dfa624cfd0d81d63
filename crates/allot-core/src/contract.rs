//! Debug-mode contract checks for programmer errors.
//!
//! Contract violations (dereferencing an empty handle, tearing down an
//! arena with live objects, asking a heap for a share) are not recoverable
//! conditions, so they are not reported through `Result`. In debug builds
//! each violation writes a diagnostic line to stderr and bumps a per-thread
//! counter that tests can observe. Release builds compile the checks away
//! entirely and execution continues either way.
//!
//! The [`contract!`](crate::contract!) macro only evaluates its predicate
//! in debug builds.

use std::fmt;

#[cfg(debug_assertions)]
thread_local! {
    static VIOLATIONS: std::cell::Cell<usize> = const { std::cell::Cell::new(0) };
}

/// Check a contract in debug builds.
///
/// ```
/// let live = 0usize;
/// allot_core::contract!(live == 0, "{live} objects still live");
/// ```
#[macro_export]
macro_rules! contract {
    ($cond:expr, $($arg:tt)+) => {
        if cfg!(debug_assertions) && !($cond) {
            $crate::contract::violation(format_args!($($arg)+));
        }
    };
}

/// Report a contract violation.
///
/// Debug builds log `allot: contract violated: <msg>` and count it.
/// Release builds do nothing.
#[cfg_attr(not(debug_assertions), allow(unused_variables))]
pub fn violation(msg: fmt::Arguments<'_>) {
    #[cfg(debug_assertions)]
    {
        VIOLATIONS.with(|v| v.set(v.get() + 1));
        eprintln!("allot: contract violated: {msg}");
    }
}

/// Report a violation that cannot be continued past soundly, then panic.
///
/// Used where carrying on would mean fabricating a reference to nothing
/// (e.g. dereferencing an empty handle).
pub fn fatal(msg: fmt::Arguments<'_>) -> ! {
    violation(msg);
    panic!("allot: {msg}");
}

/// Number of violations reported on this thread (always 0 in release).
pub fn violations() -> usize {
    #[cfg(debug_assertions)]
    {
        VIOLATIONS.with(|v| v.get())
    }
    #[cfg(not(debug_assertions))]
    {
        0
    }
}
