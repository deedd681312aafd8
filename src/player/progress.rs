//! Mapping playback position to the progress bar and time labels.
//!
//! Everything here is a pure function of `(current_time, duration)`.

/// Format seconds as `m:ss`. Unknown, negative or non-finite input is `0:00`.
pub fn format_time(seconds: f64) -> String {
    if !seconds.is_finite() || seconds <= 0.0 {
        return "0:00".to_string();
    }
    let total = seconds.floor() as u64;
    format!("{}:{:02}", total / 60, total % 60)
}

/// Like `format_time`, but for catalogue entries where a missing length is
/// worth saying out loud.
pub fn format_duration(seconds: Option<f64>) -> String {
    match seconds {
        Some(s) if s.is_finite() && s > 0.0 => format_time(s),
        _ => "Unknown".to_string(),
    }
}

/// Percentage of the track played, in `[0, 100]`; 0 while duration is unknown.
pub fn progress_percent(current_time: f64, duration: f64) -> f64 {
    if !(duration > 0.0) || !current_time.is_finite() {
        return 0.0;
    }
    (current_time / duration * 100.0).clamp(0.0, 100.0)
}

/// What the progress widget draws.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressView {
    pub fill_percent: f64,
    /// Offset of the drag handle from the left edge, in percent.
    pub handle_percent: f64,
    pub elapsed: String,
    pub total: String,
}

impl ProgressView {
    pub fn project(current_time: f64, duration: f64) -> Self {
        let percent = progress_percent(current_time, duration);
        Self {
            fill_percent: percent,
            handle_percent: percent,
            elapsed: format_time(current_time),
            total: format_time(duration),
        }
    }

    pub fn ratio(&self) -> f64 {
        self.fill_percent / 100.0
    }
}
