// Port Schedule Monitor - Card View Model
// Display-ready shape of a ScheduleEntry, shared by the TUI and web UI

use crate::pipeline::DateSegment;
use crate::schedule::{Navigation, ScheduleEntry};
use crate::terminals::terminal_name;
use serde::Serialize;

/// Ship names longer than this are cut on the collapsed card
pub const SHIP_NAME_WIDTH: usize = 24;

/// Label / value row of the expanded detail panel
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DetailField {
    pub label: &'static str,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CardView {
    pub id: String,
    pub date: String,
    pub time: String,
    pub navigation: Navigation,
    pub badge: &'static str,
    pub terminal: String,
    pub quarantine: bool,
    pub special: bool,
    pub ship_name: String,
    pub ship_name_short: String,
    pub details: Vec<DetailField>,
}

impl CardView {
    pub fn from_entry(entry: &ScheduleEntry) -> Self {
        Self {
            id: entry.id.clone(),
            date: entry.date.clone(),
            time: entry.time.clone(),
            navigation: entry.navigation,
            badge: entry.navigation.label(),
            terminal: terminal_label(entry),
            quarantine: entry.quarantine,
            special: entry.is_special,
            ship_name: entry.ship_name.clone(),
            ship_name_short: truncate(&entry.ship_name, SHIP_NAME_WIDTH),
            details: detail_fields(entry),
        }
    }
}

/// Cards under one date header
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SegmentView {
    pub date: String,
    pub cards: Vec<CardView>,
}

impl SegmentView {
    pub fn from_segment(segment: &DateSegment<'_>) -> Self {
        Self {
            date: segment.date.to_string(),
            cards: segment.entries.iter().map(|entry| CardView::from_entry(entry)).collect(),
        }
    }
}

/// Where the vessel is headed (arrival), leaving from (departure), or
/// both for a shift
pub fn terminal_label(entry: &ScheduleEntry) -> String {
    match entry.navigation {
        Navigation::Arrival => terminal_name(&entry.to).to_string(),
        Navigation::Departure => terminal_name(&entry.from).to_string(),
        Navigation::Shift => format!("{} → {}", terminal_name(&entry.from), terminal_name(&entry.to)),
    }
}

pub fn detail_fields(entry: &ScheduleEntry) -> Vec<DetailField> {
    let mut fields = vec![
        DetailField { label: "대리점", value: entry.agent.clone() },
        DetailField { label: "GRT/LOA", value: format!("{} ton / {}m", entry.grt, entry.loa) },
        DetailField { label: "Draft", value: format!("{}m", entry.draft) },
        DetailField { label: "접안", value: entry.side.clone() },
        DetailField { label: "Pilot", value: entry.pilot.clone() },
        DetailField { label: "Call Sign", value: entry.call_sign.clone() },
        DetailField { label: "IMO", value: entry.imo.clone() },
        DetailField { label: "예선", value: entry.tugs.clone() },
        DetailField { label: "라인", value: entry.line.clone() },
    ];

    let remarks = [
        ("RMK(지원팀)", &entry.team_note),
        ("RMK(대리점)", &entry.agent_note),
        ("RMK", &entry.note),
    ];
    for (label, note) in remarks {
        if let Some(value) = note {
            fields.push(DetailField { label, value: value.clone() });
        }
    }

    fields
}

/// Cut to `max_chars` characters, marking the cut with "..."
pub fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_chars.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
