// Port Schedule Monitor - Feed Store
// Current schedule list and roster, replaced wholesale by fetch results

use crate::error::FetchError;
use crate::roster::RosterSnapshot;
use crate::schedule::ScheduleEntry;
use chrono::{DateTime, Local};
use tracing::{info, warn};

/// Hands out tickets for in-flight requests so only the latest one is
/// allowed to land.
#[derive(Debug, Default, Clone)]
pub struct RequestSequencer {
    issued: u64,
}

impl RequestSequencer {
    pub fn issue(&mut self) -> u64 {
        self.issued += 1;
        self.issued
    }

    pub fn is_current(&self, ticket: u64) -> bool {
        ticket == self.issued
    }

    pub fn latest(&self) -> u64 {
        self.issued
    }
}

/// Result of a fetch, tagged with the ticket it was issued under
#[derive(Debug)]
pub enum FeedUpdate {
    Schedule {
        ticket: u64,
        result: Result<Vec<ScheduleEntry>, FetchError>,
    },
    Roster {
        ticket: u64,
        result: Result<RosterSnapshot, FetchError>,
    },
}

/// What applying an update did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Applied {
    ScheduleReplaced(usize),
    ScheduleFailed(String),
    RosterReplaced,
    RosterFailed(String),
    Stale,
}

#[derive(Debug, Default)]
pub struct FeedStore {
    entries: Vec<ScheduleEntry>,
    roster: Option<RosterSnapshot>,
    schedule_requests: RequestSequencer,
    roster_requests: RequestSequencer,
    loading: bool,
    roster_loading: bool,
    updated_at: Option<DateTime<Local>>,
    last_error: Option<String>,
}

impl FeedStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[ScheduleEntry] {
        &self.entries
    }

    pub fn roster(&self) -> Option<&RosterSnapshot> {
        self.roster.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// True while the latest roster request has not landed
    pub fn is_roster_loading(&self) -> bool {
        self.roster_loading
    }

    pub fn updated_at(&self) -> Option<DateTime<Local>> {
        self.updated_at
    }

    /// Error from the most recent schedule fetch, cleared by the next success
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn begin_schedule_fetch(&mut self) -> u64 {
        self.loading = true;
        self.schedule_requests.issue()
    }

    pub fn begin_roster_fetch(&mut self) -> u64 {
        self.roster_loading = true;
        self.roster_requests.issue()
    }

    pub fn apply(&mut self, update: FeedUpdate) -> Applied {
        match update {
            FeedUpdate::Schedule { ticket, result } => {
                if !self.schedule_requests.is_current(ticket) {
                    info!(ticket, latest = self.schedule_requests.latest(), "discarding stale schedule response");
                    return Applied::Stale;
                }
                self.loading = false;

                match result {
                    Ok(entries) => {
                        let count = entries.len();
                        self.entries = entries;
                        self.updated_at = Some(Local::now());
                        self.last_error = None;
                        info!(entries = count, "schedule replaced");
                        Applied::ScheduleReplaced(count)
                    }
                    Err(e) => {
                        warn!(error = ?e, "failed to fetch schedule");
                        let message = e.to_string();
                        self.last_error = Some(message.clone());
                        Applied::ScheduleFailed(message)
                    }
                }
            }
            FeedUpdate::Roster { ticket, result } => {
                if !self.roster_requests.is_current(ticket) {
                    return Applied::Stale;
                }
                self.roster_loading = false;

                match result {
                    Ok(roster) => {
                        self.roster = Some(roster);
                        Applied::RosterReplaced
                    }
                    Err(e) => {
                        warn!(error = ?e, "failed to fetch roster");
                        Applied::RosterFailed(e.to_string())
                    }
                }
            }
        }
    }
}
