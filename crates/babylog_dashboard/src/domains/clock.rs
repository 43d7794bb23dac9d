//! Time-of-day parsing for log cells.

use chrono::{NaiveTime, Timelike};

/// Parse `HH:MM` or `HH:MM:SS` into a time of day.
///
/// Absent, empty or malformed input yields `None`; this never fails. Each
/// component is one or two ASCII digits and must be in clock range, so
/// `25:99` is unknown rather than wrapped.
pub fn parse_clock(raw: Option<&str>) -> Option<NaiveTime> {
    let s = raw?.trim();
    if s.is_empty() || !s.contains(':') {
        return None;
    }

    let parts: Vec<&str> = s.split(':').collect();
    let (h, m, sec) = match parts.as_slice() {
        [h, m] => (*h, *m, "0"),
        [h, m, sec] => (*h, *m, *sec),
        _ => return None,
    };

    NaiveTime::from_hms_opt(component(h)?, component(m)?, component(sec)?)
}

fn component(s: &str) -> Option<u32> {
    if s.is_empty() || s.len() > 2 || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

/// `HH:MM`, as shown in hover labels.
pub fn format_clock(t: NaiveTime) -> String {
    format!("{:02}:{:02}", t.hour(), t.minute())
}
