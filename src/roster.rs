// Port Schedule Monitor - Daily Roster
// Worker roster as returned by the roster API, display only

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Worker {
    pub name: String,
}

/// RosterSnapshot - one day's roster, mapped field for field from the API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterSnapshot {
    pub date: String,
    pub weekday: String,
    #[serde(default)]
    pub ens_count: u32,
    #[serde(default)]
    pub ens_workers: Vec<Worker>,
    #[serde(default)]
    pub west_count: u32,
    #[serde(default)]
    pub west_workers: Vec<Worker>,
}

/// A named team with its headcount and members in roster order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkerGroup<'a> {
    pub label: &'static str,
    pub count: u32,
    pub names: Vec<&'a str>,
}

impl WorkerGroup<'_> {
    /// "홍길동, 김철수"
    pub fn joined(&self) -> String {
        self.names.join(", ")
    }
}

impl RosterSnapshot {
    /// "2026-10-17 (토)"
    pub fn heading(&self) -> String {
        format!("{} ({})", self.date, self.weekday)
    }

    pub fn groups(&self) -> [WorkerGroup<'_>; 2] {
        [
            WorkerGroup {
                label: "ENS",
                count: self.ens_count,
                names: self.ens_workers.iter().map(|w| w.name.as_str()).collect(),
            },
            WorkerGroup {
                label: "웨스턴",
                count: self.west_count,
                names: self.west_workers.iter().map(|w| w.name.as_str()).collect(),
            },
        ]
    }
}
