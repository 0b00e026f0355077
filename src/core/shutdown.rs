//! Cooperative Stop Coordination
//!
//! Consumers block inside broker calls on a single thread, so stopping is
//! cooperative: a [`StopSignal`] is a shared flag that consumers check at
//! their next decision point (next delivery, idle tick, poll iteration or
//! round-robin turn). Signal handlers only ever flip the flag.

use once_cell::sync::OnceCell;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

/// Shared, cloneable stop request flag
#[derive(Debug, Clone, Default)]
pub struct StopSignal {
    requested: Arc<AtomicBool>,
}

impl StopSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request a stop; observed at the holder's next decision point
    pub fn request(&self) {
        // Release pairs with the Acquire in is_requested
        self.requested.store(true, Ordering::Release);
    }

    pub fn is_requested(&self) -> bool {
        self.requested.load(Ordering::Acquire)
    }

    /// Clear a previous request so the holder can run again
    pub fn reset(&self) {
        self.requested.store(false, Ordering::Release);
    }

    /// True when both handles share one flag
    pub fn same_as(&self, other: &StopSignal) -> bool {
        Arc::ptr_eq(&self.requested, &other.requested)
    }
}

static PROCESS_STOP: OnceCell<StopSignal> = OnceCell::new();
static SIGNAL_COUNT: AtomicUsize = AtomicUsize::new(0);

#[cfg(unix)]
extern "C" fn on_signal(_signal: libc::c_int) {
    // only atomics here, this runs in signal context
    let previous = SIGNAL_COUNT.fetch_add(1, Ordering::AcqRel);
    if let Some(stop) = PROCESS_STOP.get() {
        stop.request();
    }
    if previous >= 1 {
        // Second signal received; forcing immediate exit
        unsafe { libc::_exit(130) };
    }
}

/// Route SIGINT, SIGTERM, SIGHUP and SIGQUIT into `stop`
///
/// The first signal requests a cooperative stop, a second one exits the
/// process immediately. Only the first registered signal is ever wired up.
pub fn install_signal_handlers(stop: &StopSignal) {
    if PROCESS_STOP.set(stop.clone()).is_err() {
        return;
    }

    #[cfg(unix)]
    unsafe {
        libc::signal(libc::SIGPIPE, libc::SIG_DFL);
        let handler = on_signal as extern "C" fn(libc::c_int) as libc::sighandler_t;
        for signal in [libc::SIGINT, libc::SIGTERM, libc::SIGHUP, libc::SIGQUIT] {
            libc::signal(signal, handler);
        }
    }
}
