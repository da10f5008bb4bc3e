//! Output formatting and progress indicators
//!
//! This module provides utilities for displaying progress spinners and
//! formatted messages to the user.

use indicatif::{ProgressBar, ProgressStyle};

/// Create a spinner for a build phase of unknown duration
pub fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .tick_chars("◴◷◶◵◆")
            .template("{spinner:.yellow} {msg} [{elapsed}]")
            .expect("Invalid spinner template"),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(120));
    pb
}

/// Prefixes for final status lines
pub mod status {
    /// Printed when a phase or the whole build succeeds
    pub const SUCCESS: &str = "✓";

    /// Printed when the build aborts
    pub const ERROR: &str = "✗";
}
