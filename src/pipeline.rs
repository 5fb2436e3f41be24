// Port Schedule Monitor - Filter / Sort Pipeline
// Line filter, proximity-to-now ordering and date segments

use crate::schedule::ScheduleEntry;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::Serialize;
use std::collections::BTreeSet;

/// Line shown first and selected by default when the data has it
pub const DEFAULT_PINNED_LINE: &str = "이엔에스마린";

// ============================================================================
// LINE FILTER
// ============================================================================

/// LineFilter - selected shipping lines. Empty means "all lines".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LineFilter {
    selected: BTreeSet<String>,
}

impl LineFilter {
    /// No filter, every line passes
    pub fn all() -> Self {
        Self::default()
    }

    pub fn from_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            selected: lines.into_iter().map(Into::into).collect(),
        }
    }

    /// Starting filter for a freshly loaded list: just the pinned line if
    /// any entry carries it, otherwise everything.
    pub fn initial(entries: &[ScheduleEntry], pinned: &str) -> Self {
        if entries.iter().any(|entry| entry.line == pinned) {
            Self::from_lines([pinned])
        } else {
            Self::all()
        }
    }

    pub fn is_all(&self) -> bool {
        self.selected.is_empty()
    }

    pub fn contains(&self, line: &str) -> bool {
        self.selected.contains(line)
    }

    pub fn toggle(&mut self, line: &str) {
        if !self.selected.remove(line) {
            self.selected.insert(line.to_string());
        }
    }

    pub fn clear(&mut self) {
        self.selected.clear();
    }

    pub fn matches(&self, entry: &ScheduleEntry) -> bool {
        self.is_all() || self.selected.contains(&entry.line)
    }

    pub fn selected(&self) -> impl Iterator<Item = &str> {
        self.selected.iter().map(String::as_str)
    }
}

/// Distinct lines in the data, pinned line first, the rest sorted
/// ignoring case
pub fn unique_lines(entries: &[ScheduleEntry], pinned: &str) -> Vec<String> {
    let distinct: BTreeSet<&str> = entries.iter().map(|entry| entry.line.as_str()).collect();

    let mut rest: Vec<&str> = distinct.iter().copied().filter(|line| *line != pinned).collect();
    rest.sort_by_cached_key(|line| (line.to_lowercase(), *line));

    let mut lines: Vec<String> = Vec::with_capacity(distinct.len());
    if distinct.contains(pinned) {
        lines.push(pinned.to_string());
    }
    lines.extend(rest.into_iter().map(str::to_string));
    lines
}

// ============================================================================
// ORDERING
// ============================================================================

const DATE_FORMATS: [&str; 1] = ["%Y-%m-%d"];
const TIME_FORMATS: [&str; 2] = ["%H:%M", "%H:%M:%S"];

/// The entry's date and time as one local timestamp
pub fn scheduled_at(entry: &ScheduleEntry) -> Option<NaiveDateTime> {
    let date_text = entry.date.trim();
    let time_text = entry.time.trim();

    let date = DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(date_text, fmt).ok())?;
    let time = TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveTime::parse_from_str(time_text, fmt).ok())?;

    Some(date.and_time(time))
}

/// Sort key: distance to `now` in milliseconds. Unreadable timestamps
/// go after every readable one.
fn proximity_key(entry: &ScheduleEntry, now: NaiveDateTime) -> (bool, u64) {
    match scheduled_at(entry) {
        Some(at) => (false, (at - now).num_milliseconds().unsigned_abs()),
        None => (true, 0),
    }
}

/// Stable sort, nearest to `now` (past or future) first
pub fn sort_by_proximity(entries: &mut [&ScheduleEntry], now: NaiveDateTime) {
    entries.sort_by_cached_key(|entry| proximity_key(entry, now));
}

/// Filter then order by proximity to `now`
pub fn visible<'a>(
    entries: &'a [ScheduleEntry],
    filter: &LineFilter,
    now: NaiveDateTime,
) -> Vec<&'a ScheduleEntry> {
    let mut shown: Vec<&ScheduleEntry> = entries.iter().filter(|entry| filter.matches(entry)).collect();
    sort_by_proximity(&mut shown, now);
    shown
}

// ============================================================================
// DATE SEGMENTS
// ============================================================================

/// Run of consecutive entries sharing a date, headed by that date
#[derive(Debug, Clone, PartialEq)]
pub struct DateSegment<'a> {
    pub date: &'a str,
    pub entries: Vec<&'a ScheduleEntry>,
}

/// Split an already-sorted list wherever the date differs from the
/// previous entry. Proximity order is not chronological, so the same
/// date can head more than one segment.
pub fn group_by_date<'a>(sorted: &[&'a ScheduleEntry]) -> Vec<DateSegment<'a>> {
    let mut segments: Vec<DateSegment<'a>> = Vec::new();

    for &entry in sorted {
        match segments.last_mut() {
            Some(segment) if segment.date == entry.date => segment.entries.push(entry),
            _ => segments.push(DateSegment {
                date: entry.date.as_str(),
                entries: vec![entry],
            }),
        }
    }

    segments
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::transform_record;
    use serde_json::json;

    fn entry(date: &str, no: u32, time: &str, line: &str) -> ScheduleEntry {
        transform_record(0, &json!({
            "date": date,
            "no": no.to_string(),
            "time": time,
            "line": line,
        }))
    }

    fn at(date: &str, time: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(&format!("{} {}", date, time), "%Y-%m-%d %H:%M").unwrap()
    }

    #[test]
    fn test_empty_filter_passes_everything() {
        let entries = vec![entry("2026-10-17", 1, "10:00", "A"), entry("2026-10-17", 2, "11:00", "B")];
        let now = at("2026-10-17", "10:00");

        let shown = visible(&entries, &LineFilter::all(), now);
        assert_eq!(shown.len(), 2);
    }

    #[test]
    fn test_line_filter_keeps_members_only() {
        let entries = vec![
            entry("2026-10-17", 1, "10:00", "A"),
            entry("2026-10-17", 2, "11:00", "B"),
            entry("2026-10-17", 3, "12:00", "A"),
        ];
        let now = at("2026-10-17", "10:00");

        let shown = visible(&entries, &LineFilter::from_lines(["A"]), now);
        assert_eq!(shown.len(), 2);
        assert!(shown.iter().all(|e| e.line == "A"));
    }

    #[test]
    fn test_toggle_adds_and_removes() {
        let mut filter = LineFilter::all();
        filter.toggle("A");
        filter.toggle("B");
        assert!(filter.contains("A") && filter.contains("B"));

        filter.toggle("A");
        assert!(!filter.contains("A"));
        assert!(!filter.is_all());

        filter.clear();
        assert!(filter.is_all());
    }

    #[test]
    fn test_sort_by_absolute_distance() {
        // now = 12:00; entries at -2h, +1h, +5h
        let entries = vec![
            entry("2026-10-17", 1, "10:00", "A"),
            entry("2026-10-17", 2, "13:00", "A"),
            entry("2026-10-17", 3, "17:00", "A"),
        ];
        let now = at("2026-10-17", "12:00");

        let shown = visible(&entries, &LineFilter::all(), now);
        let times: Vec<&str> = shown.iter().map(|e| e.time.as_str()).collect();
        assert_eq!(times, vec!["13:00", "10:00", "17:00"]);
    }

    #[test]
    fn test_sort_is_stable_and_unparseable_last() {
        let entries = vec![
            entry("", 1, "", "A"),
            entry("2026-10-17", 2, "11:00", "A"),
            entry("2026-10-17", 3, "13:00", "A"),
            entry("2026-10-17", 4, "later", "A"),
        ];
        let now = at("2026-10-17", "12:00");

        let shown = visible(&entries, &LineFilter::all(), now);
        let nos: Vec<i64> = shown.iter().map(|e| e.no).collect();
        assert_eq!(nos, vec![2, 3, 1, 4]);
    }

    #[test]
    fn test_seconds_in_time_parse() {
        let e = entry("2026-10-17", 1, "08:15:30", "A");
        let parsed = scheduled_at(&e).unwrap();
        assert_eq!(parsed.format("%H:%M:%S").to_string(), "08:15:30");
    }

    #[test]
    fn test_initial_filter_pins_line() {
        let with_pinned = vec![entry("2026-10-17", 1, "10:00", "B"), entry("2026-10-17", 2, "10:00", DEFAULT_PINNED_LINE)];
        let without = vec![entry("2026-10-17", 1, "10:00", "B")];

        let pinned = LineFilter::initial(&with_pinned, DEFAULT_PINNED_LINE);
        assert_eq!(pinned.selected().collect::<Vec<_>>(), vec![DEFAULT_PINNED_LINE]);

        assert!(LineFilter::initial(&without, DEFAULT_PINNED_LINE).is_all());
        assert!(LineFilter::initial(&[], DEFAULT_PINNED_LINE).is_all());
    }

    #[test]
    fn test_unique_lines_pinned_first() {
        let entries = vec![
            entry("2026-10-17", 1, "10:00", "흥아"),
            entry("2026-10-17", 2, "10:00", DEFAULT_PINNED_LINE),
            entry("2026-10-17", 3, "10:00", "KMTC"),
            entry("2026-10-17", 4, "10:00", "흥아"),
        ];

        let lines = unique_lines(&entries, DEFAULT_PINNED_LINE);
        assert_eq!(lines, vec![DEFAULT_PINNED_LINE.to_string(), "KMTC".to_string(), "흥아".to_string()]);

        let no_pinned = unique_lines(&entries[..1], DEFAULT_PINNED_LINE);
        assert_eq!(no_pinned, vec!["흥아".to_string()]);
    }

    #[test]
    fn test_unique_lines_ignore_case() {
        let entries = vec![
            entry("2026-10-17", 1, "10:00", "KMTC"),
            entry("2026-10-17", 2, "10:00", "hmm"),
            entry("2026-10-17", 3, "10:00", "Evergreen"),
        ];

        let lines = unique_lines(&entries, DEFAULT_PINNED_LINE);
        assert_eq!(lines, vec!["Evergreen".to_string(), "hmm".to_string(), "KMTC".to_string()]);
    }

    #[test]
    fn test_date_segments_follow_sorted_order() {
        // now sits at midnight, so the two days interleave by distance
        let entries = vec![
            entry("2026-10-17", 1, "23:30", "A"),
            entry("2026-10-18", 1, "00:10", "A"),
            entry("2026-10-17", 2, "22:00", "A"),
            entry("2026-10-18", 2, "03:00", "A"),
        ];
        let now = at("2026-10-18", "00:00");

        let shown = visible(&entries, &LineFilter::all(), now);
        let segments = group_by_date(&shown);

        let headers: Vec<&str> = segments.iter().map(|s| s.date).collect();
        assert_eq!(headers, vec!["2026-10-18", "2026-10-17", "2026-10-18"]);
        assert_eq!(segments[0].entries.len(), 1);
        assert_eq!(segments[1].entries.len(), 2);
        assert_eq!(segments[2].entries.len(), 1);
    }

    #[test]
    fn test_no_segments_for_empty_list() {
        assert!(group_by_date(&[]).is_empty());
    }
}
