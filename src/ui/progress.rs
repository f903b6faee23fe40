use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::time::Duration;

pub struct ProgressManager {
    multi_progress: MultiProgress,
    enabled: bool,
}

impl ProgressManager {
    pub fn new(enabled: bool) -> Self {
        Self {
            multi_progress: MultiProgress::new(),
            enabled,
        }
    }

    pub fn create_spinner(&self, message: &str) -> ProgressBar {
        if !self.enabled {
            return ProgressBar::hidden();
        }

        let pb = self.multi_progress.add(ProgressBar::new_spinner());
        pb.enable_steady_tick(Duration::from_millis(100));
        pb.set_style(
            ProgressStyle::with_template("{spinner:.green} {msg} ({elapsed})")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
        );
        pb.set_message(message.to_string());
        pb
    }

    pub fn clear(&self) {
        if self.enabled {
            self.multi_progress.clear().ok();
        }
    }
}

/// Spinner for one step of a conversion (read, extract, write).
pub struct OperationProgress {
    progress_bar: ProgressBar,
    operation_name: String,
    start_time: std::time::Instant,
}

impl OperationProgress {
    pub fn new(progress_manager: &ProgressManager, operation_name: &str) -> Self {
        Self {
            progress_bar: progress_manager.create_spinner(operation_name),
            operation_name: operation_name.to_string(),
            start_time: std::time::Instant::now(),
        }
    }

    pub fn finish_with_message(&self, message: &str) {
        let final_message = format!(
            "{}: {} ({})",
            self.operation_name,
            message,
            format_duration(self.start_time.elapsed())
        );
        self.progress_bar.finish_with_message(final_message);
    }

    pub fn finish_error(&self, error: &str) {
        self.progress_bar
            .abandon_with_message(format!("{}: failed: {}", self.operation_name, error));
    }
}

pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    if secs >= 60 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else if secs > 0 {
        format!("{}s", secs)
    } else {
        format!("{}ms", duration.as_millis())
    }
}
