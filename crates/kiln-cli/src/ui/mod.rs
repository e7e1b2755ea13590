//! Terminal output for status lines and build summaries.
//!
//! Everything here writes to stderr so stdout stays clean for `kiln plan`.

mod format;
mod messages;

pub use format::{format_duration, format_size, print_build_summary, SummaryRow};
pub use messages::{error, info, success, warning};

use std::sync::atomic::{AtomicBool, Ordering};

static COLORS: AtomicBool = AtomicBool::new(true);

/// Decide once whether status lines are colored.
pub fn init_colors(no_color: bool) {
    COLORS.store(!no_color && crate::logger::should_use_colors(), Ordering::Relaxed);
}

pub(crate) fn colors_enabled() -> bool {
    COLORS.load(Ordering::Relaxed)
}
