use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

static COUNTER: AtomicU64 = AtomicU64::new(0);

/// Allocate a session identifier for a newly opened conversation view.
///
/// Purely local: no server round trip, cannot fail. Uniqueness is
/// best-effort — nanosecond wall clock plus a process-local counter for
/// same-instant calls — which is the accepted contract for session ids.
pub fn allocate_session_id() -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    let n = COUNTER.fetch_add(1, Ordering::Relaxed);
    format!("sess-{nanos}-{n}")
}
