// Port Schedule Monitor - Core Library
// Exposes all modules for use in the TUI, the web server, and tests

pub mod client;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod pipeline;
pub mod roster;
pub mod schedule;
pub mod store;
pub mod terminals;
pub mod view;

// Re-export commonly used types
pub use client::ScheduleClient;
pub use config::{load_settings, Settings};
pub use dashboard::{Dashboard, SCHEDULE_FETCH_ALERT};
pub use error::{ConfigError, FetchError};
pub use pipeline::{
    group_by_date, scheduled_at, unique_lines, visible,
    DateSegment, LineFilter, DEFAULT_PINNED_LINE,
};
pub use roster::{RosterSnapshot, Worker, WorkerGroup};
pub use schedule::{transform_record, transform_records, Navigation, ScheduleEntry};
pub use store::{Applied, FeedStore, FeedUpdate, RequestSequencer};
pub use terminals::{terminal_name, TerminalLink, TERMINAL_LINKS};
pub use view::{CardView, DetailField, SegmentView};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
