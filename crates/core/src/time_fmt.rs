// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Human-readable elapsed-time formatting, used by the dashboard and CLI.

/// Format a millisecond duration as `"Ns"`, `"Nm"`, `"Nh"`, or `"Nd"`,
/// picking the coarsest unit that keeps the value at least 1.
pub fn format_elapsed_ms(elapsed_ms: i64) -> String {
    let elapsed_ms = elapsed_ms.max(0);
    let secs = elapsed_ms / 1000;
    if secs < 60 {
        return format!("{secs}s");
    }
    let mins = secs / 60;
    if mins < 60 {
        return format!("{mins}m");
    }
    let hours = mins / 60;
    if hours < 24 {
        return format!("{hours}h");
    }
    let days = hours / 24;
    format!("{days}d")
}

#[cfg(test)]
#[path = "time_fmt_tests.rs"]
mod tests;
