use chrono::{DateTime, Utc};

#[must_use]
pub fn format_datetime(value: DateTime<Utc>) -> String {
    value.format("%Y-%m-%d %H:%M UTC").to_string()
}

/// `MM:SS`, or `H:MM:SS` from one hour up.
#[must_use]
pub fn format_countdown(seconds: u32) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;
    if hours > 0 {
        format!("{hours}:{minutes:02}:{secs:02}")
    } else {
        format!("{minutes:02}:{secs:02}")
    }
}

#[must_use]
pub fn format_duration(seconds: u32) -> String {
    let minutes = seconds / 60;
    let secs = seconds % 60;
    if minutes == 0 {
        format!("{secs}s")
    } else {
        format!("{minutes}m {secs:02}s")
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimerTone {
    Calm,
    Low,
    Critical,
}

impl TimerTone {
    /// Critical in the last minute, low in the last fifth of the budget.
    #[must_use]
    pub fn of(remaining: u32, budget: u32) -> Self {
        if remaining <= 60 {
            Self::Critical
        } else if u64::from(remaining) * 5 <= u64::from(budget) {
            Self::Low
        } else {
            Self::Calm
        }
    }

    #[must_use]
    pub fn class(self) -> &'static str {
        match self {
            Self::Calm => "timer",
            Self::Low => "timer timer-low",
            Self::Critical => "timer timer-critical",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assess_core::time::fixed_now;

    #[test]
    fn countdown_pads_minutes_and_seconds() {
        assert_eq!(format_countdown(0), "00:00");
        assert_eq!(format_countdown(65), "01:05");
        assert_eq!(format_countdown(1800), "30:00");
        assert_eq!(format_countdown(3725), "1:02:05");
    }

    #[test]
    fn durations_drop_empty_minutes() {
        assert_eq!(format_duration(4), "4s");
        assert_eq!(format_duration(245), "4m 05s");
    }

    #[test]
    fn tone_tightens_near_the_end() {
        assert_eq!(TimerTone::of(1500, 1800), TimerTone::Calm);
        assert_eq!(TimerTone::of(360, 1800), TimerTone::Low);
        assert_eq!(TimerTone::of(60, 1800), TimerTone::Critical);
        assert_eq!(TimerTone::of(9, 10), TimerTone::Critical);
    }

    #[test]
    fn datetime_is_minute_precision() {
        assert_eq!(format_datetime(fixed_now()), "2023-11-14 22:13 UTC");
    }
}
