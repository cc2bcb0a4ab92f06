//! Runtime-configurable globals.
//!
//! Values are initialized from environment variables on first access and can
//! be overridden at runtime via setter functions.
//!
//! - `BASALT_DISPLAY_ROWS`: number of leading values shown when a column is
//!   formatted with `Display`. Default: 10.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Once;

const DEFAULT_DISPLAY_ROWS: usize = 10;

static DISPLAY_ROWS: AtomicUsize = AtomicUsize::new(DEFAULT_DISPLAY_ROWS);

static INIT: Once = Once::new();

/// Ensure environment variable overrides are applied (idempotent).
fn ensure_init() {
    INIT.call_once(|| {
        if let Ok(val) = std::env::var("BASALT_DISPLAY_ROWS") {
            if let Ok(n) = val.trim().parse::<usize>() {
                DISPLAY_ROWS.store(n, Ordering::Relaxed);
            }
        }
    });
}

/// Number of leading values shown by `Column`'s `Display` implementation.
pub fn display_rows() -> usize {
    ensure_init();
    DISPLAY_ROWS.load(Ordering::Relaxed)
}

/// Override the display row count at runtime.
pub fn set_display_rows(n: usize) {
    ensure_init();
    DISPLAY_ROWS.store(n, Ordering::Relaxed);
}
