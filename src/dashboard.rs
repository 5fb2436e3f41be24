// Port Schedule Monitor - Dashboard Session
// Feed data plus the viewer's line filter, expanded cards and pending alert

use crate::pipeline::{self, DateSegment, LineFilter};
use crate::schedule::ScheduleEntry;
use crate::store::{Applied, FeedStore, FeedUpdate};
use chrono::NaiveDateTime;
use std::collections::HashSet;

/// Shown when the schedule can't be loaded
pub const SCHEDULE_FETCH_ALERT: &str = "데이터를 불러오는데 실패했습니다.\n\n\
스케줄 API 주소(PORT_SCHEDULE_SCHEDULE_URL)와 네트워크 연결을 확인한 뒤\n\
새로고침(r) 해주세요.\n\n\
API가 JSON 배열을 200 상태로 돌려주는지 확인하세요.";

pub struct Dashboard {
    feed: FeedStore,
    pinned_line: String,
    filter: LineFilter,
    expanded: HashSet<String>,
    alert: Option<&'static str>,
}

impl Dashboard {
    pub fn new(pinned_line: impl Into<String>) -> Self {
        Self {
            feed: FeedStore::new(),
            pinned_line: pinned_line.into(),
            filter: LineFilter::all(),
            expanded: HashSet::new(),
            alert: None,
        }
    }

    pub fn feed(&self) -> &FeedStore {
        &self.feed
    }

    pub fn feed_mut(&mut self) -> &mut FeedStore {
        &mut self.feed
    }

    pub fn pinned_line(&self) -> &str {
        &self.pinned_line
    }

    /// Apply a fetch result. A fresh schedule rebuilds the card list, so
    /// the filter goes back to its default and every card collapses.
    pub fn apply(&mut self, update: FeedUpdate) -> Applied {
        let applied = self.feed.apply(update);

        match &applied {
            Applied::ScheduleReplaced(_) => {
                self.filter = LineFilter::initial(self.feed.entries(), &self.pinned_line);
                self.expanded.clear();
            }
            Applied::ScheduleFailed(_) => self.alert = Some(SCHEDULE_FETCH_ALERT),
            Applied::RosterReplaced | Applied::RosterFailed(_) | Applied::Stale => {}
        }

        applied
    }

    // ------------------------------------------------------------------------
    // Line filter
    // ------------------------------------------------------------------------

    pub fn filter(&self) -> &LineFilter {
        &self.filter
    }

    pub fn lines(&self) -> Vec<String> {
        pipeline::unique_lines(self.feed.entries(), &self.pinned_line)
    }

    pub fn toggle_line(&mut self, line: &str) {
        self.filter.toggle(line);
    }

    pub fn show_all_lines(&mut self) {
        self.filter.clear();
    }

    // ------------------------------------------------------------------------
    // Cards
    // ------------------------------------------------------------------------

    pub fn visible(&self, now: NaiveDateTime) -> Vec<&ScheduleEntry> {
        pipeline::visible(self.feed.entries(), &self.filter, now)
    }

    pub fn segments(&self, now: NaiveDateTime) -> Vec<DateSegment<'_>> {
        pipeline::group_by_date(&self.visible(now))
    }

    pub fn toggle_expanded(&mut self, id: &str) {
        if !self.expanded.remove(id) {
            self.expanded.insert(id.to_string());
        }
    }

    pub fn is_expanded(&self, id: &str) -> bool {
        self.expanded.contains(id)
    }

    // ------------------------------------------------------------------------
    // Alert
    // ------------------------------------------------------------------------

    pub fn alert(&self) -> Option<&'static str> {
        self.alert
    }

    pub fn dismiss_alert(&mut self) {
        self.alert = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FetchError;
    use crate::pipeline::DEFAULT_PINNED_LINE;
    use crate::schedule::transform_records;
    use serde_json::json;

    fn schedule() -> Vec<ScheduleEntry> {
        transform_records(&[
            json!({"date": "2026-10-17", "no": "1", "time": "10:00", "line": "KMTC"}),
            json!({"date": "2026-10-17", "no": "2", "time": "11:00", "line": DEFAULT_PINNED_LINE}),
            json!({"date": "2026-10-17", "no": "3", "time": "12:00", "line": "흥아"}),
        ])
    }

    fn loaded() -> Dashboard {
        let mut dashboard = Dashboard::new(DEFAULT_PINNED_LINE);
        let ticket = dashboard.feed_mut().begin_schedule_fetch();
        dashboard.apply(FeedUpdate::Schedule { ticket, result: Ok(schedule()) });
        dashboard
    }

    fn now() -> NaiveDateTime {
        NaiveDateTime::parse_from_str("2026-10-17 10:30", "%Y-%m-%d %H:%M").unwrap()
    }

    #[test]
    fn test_load_selects_pinned_line() {
        let dashboard = loaded();
        let shown = dashboard.visible(now());

        assert_eq!(shown.len(), 1);
        assert_eq!(shown[0].line, DEFAULT_PINNED_LINE);
        assert_eq!(dashboard.lines()[0], DEFAULT_PINNED_LINE);
    }

    #[test]
    fn test_show_all_and_toggle() {
        let mut dashboard = loaded();
        dashboard.show_all_lines();
        assert_eq!(dashboard.visible(now()).len(), 3);

        dashboard.toggle_line("KMTC");
        dashboard.toggle_line("흥아");
        assert_eq!(dashboard.visible(now()).len(), 2);
    }

    #[test]
    fn test_reload_resets_filter_and_expansion() {
        let mut dashboard = loaded();
        dashboard.show_all_lines();
        dashboard.toggle_expanded("2026-10-17-1");
        assert!(dashboard.is_expanded("2026-10-17-1"));

        let ticket = dashboard.feed_mut().begin_schedule_fetch();
        dashboard.apply(FeedUpdate::Schedule { ticket, result: Ok(schedule()) });

        assert!(!dashboard.is_expanded("2026-10-17-1"));
        assert!(dashboard.filter().contains(DEFAULT_PINNED_LINE));
    }

    #[test]
    fn test_failure_raises_alert_and_keeps_cards() {
        let mut dashboard = loaded();
        let ticket = dashboard.feed_mut().begin_schedule_fetch();
        let error = FetchError::Status(reqwest::StatusCode::BAD_GATEWAY);
        dashboard.apply(FeedUpdate::Schedule { ticket, result: Err(error) });

        assert_eq!(dashboard.alert(), Some(SCHEDULE_FETCH_ALERT));
        assert_eq!(dashboard.visible(now()).len(), 1);
        assert!(!dashboard.feed().is_loading());

        dashboard.dismiss_alert();
        assert!(dashboard.alert().is_none());
    }

    #[test]
    fn test_roster_failure_raises_no_alert() {
        let mut dashboard = loaded();
        let ticket = dashboard.feed_mut().begin_roster_fetch();
        let error = FetchError::Status(reqwest::StatusCode::INTERNAL_SERVER_ERROR);
        dashboard.apply(FeedUpdate::Roster { ticket, result: Err(error) });

        assert!(dashboard.alert().is_none());
        assert_eq!(dashboard.visible(now()).len(), 1);
    }

    #[test]
    fn test_toggle_expanded_twice_collapses() {
        let mut dashboard = loaded();
        dashboard.toggle_expanded("2026-10-17-2");
        dashboard.toggle_expanded("2026-10-17-2");
        assert!(!dashboard.is_expanded("2026-10-17-2"));
    }
}
