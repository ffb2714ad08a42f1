//! Optional error-tracking integration.
//!
//! The tracker is a process-wide optional singleton with explicit
//! init/teardown. When no tracker has been installed, [`capture`] falls back
//! to a null object, so call sites never need to check for presence and a
//! missing integration can never break a request.

use std::sync::{Arc, RwLock};

/// External error-tracking sink (e.g., a hosted error tracker).
pub trait ErrorReporter: Send + Sync {
    /// Record an error with a short human-readable context label.
    fn capture(&self, context: &str, error: &(dyn std::error::Error + 'static));

    /// Flush buffered events before shutdown. Default: nothing to flush.
    fn flush(&self) {}
}

/// Null object used when no reporter is installed.
struct NoopReporter;

impl ErrorReporter for NoopReporter {
    fn capture(&self, _context: &str, _error: &(dyn std::error::Error + 'static)) {}
}

/// Reporter that forwards captures to the tracing pipeline. Useful as a
/// default sink when no external tracker is configured but captures should
/// still be visible in logs.
pub struct TracingReporter;

impl ErrorReporter for TracingReporter {
    fn capture(&self, context: &str, error: &(dyn std::error::Error + 'static)) {
        tracing::error!(context = %context, error = %error, "Captured error");
    }
}

static REPORTER: RwLock<Option<Arc<dyn ErrorReporter>>> = RwLock::new(None);

/// Install the process-wide reporter. Replaces any previous one.
pub fn init(reporter: Arc<dyn ErrorReporter>) {
    if let Ok(mut guard) = REPORTER.write() {
        *guard = Some(reporter);
    }
}

/// Flush and remove the installed reporter.
pub fn shutdown() {
    if let Ok(mut guard) = REPORTER.write() {
        if let Some(reporter) = guard.take() {
            reporter.flush();
        }
    }
}

/// Report an error to the installed tracker, if any. Always safe to call;
/// reporting is best-effort and never propagates failures.
pub fn capture(context: &str, error: &(dyn std::error::Error + 'static)) {
    let reporter: Arc<dyn ErrorReporter> = match REPORTER.read() {
        Ok(guard) => guard.clone().unwrap_or_else(|| Arc::new(NoopReporter)),
        Err(_) => Arc::new(NoopReporter),
    };
    reporter.capture(context, error);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingReporter(Arc<AtomicUsize>);

    impl ErrorReporter for CountingReporter {
        fn capture(&self, _context: &str, _error: &(dyn std::error::Error + 'static)) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    // Single test because the reporter is process-wide state; parallel
    // tests would race on init/shutdown.
    #[test]
    fn reporter_lifecycle() {
        let err = std::io::Error::new(std::io::ErrorKind::Other, "boom");

        // No reporter installed: capture is a no-op, never a panic.
        capture("test", &err);

        let count = Arc::new(AtomicUsize::new(0));
        init(Arc::new(CountingReporter(count.clone())));
        capture("test", &err);
        assert_eq!(count.load(Ordering::SeqCst), 1);

        // Teardown removes the reporter; later captures go nowhere.
        shutdown();
        capture("test", &err);
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }
}
