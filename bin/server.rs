// Port Schedule Monitor - Web Server
// JSON API over the in-memory feed plus the browser dashboard

use anyhow::{Context, Result};
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Json},
    routing::{get, post},
    Router,
};
use chrono::{DateTime, Local, NaiveDateTime};
use parking_lot::RwLock;
use port_schedule::terminals::{terminal_table, TERMINAL_LINKS};
use port_schedule::{
    group_by_date, load_settings, unique_lines, visible, FeedStore, FeedUpdate, LineFilter,
    RosterSnapshot, ScheduleClient, SegmentView, TerminalLink, SCHEDULE_FETCH_ALERT,
};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Shared application state
#[derive(Clone)]
struct AppState {
    feed: Arc<RwLock<FeedStore>>,
    client: ScheduleClient,
    pinned_line: Arc<str>,
}

/// API Response wrapper
#[derive(Serialize)]
struct ApiResponse<T> {
    success: bool,
    data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<T> ApiResponse<T> {
    fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
            error: None,
        }
    }
}

/// Query for /api/schedule, read as raw pairs so each `lines` value is
/// one line name verbatim. No `lines` pair means the default filter;
/// only empty `lines=` values mean every line.
struct ScheduleQuery {
    lines: Option<Vec<String>>,
}

impl ScheduleQuery {
    fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        let mut lines: Option<Vec<String>> = None;
        for (key, value) in pairs {
            if key == "lines" {
                let selected = lines.get_or_insert_with(Vec::new);
                if !value.is_empty() {
                    selected.push(value);
                }
            }
        }
        Self { lines }
    }

    fn filter(&self, feed: &FeedStore, pinned_line: &str) -> LineFilter {
        match &self.lines {
            None => LineFilter::initial(feed.entries(), pinned_line),
            Some(lines) => LineFilter::from_lines(lines.iter().map(String::as_str)),
        }
    }
}

/// Schedule response
#[derive(Serialize)]
struct ScheduleResponse {
    lines: Vec<String>,
    filter: Vec<String>,
    total: usize,
    visible: usize,
    segments: Vec<SegmentView>,
    loading: bool,
    updated_at: Option<DateTime<Local>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    alert: Option<&'static str>,
}

/// Terminal reference response
#[derive(Serialize)]
struct TerminalsResponse {
    links: Vec<TerminalLink>,
    berths: Vec<BerthName>,
}

/// Roster response; `loading` stays true until the latest roster
/// request has landed
#[derive(Serialize)]
struct RosterResponse {
    roster: Option<RosterSnapshot>,
    loading: bool,
}

#[derive(Serialize)]
struct BerthName {
    code: &'static str,
    name: &'static str,
}

#[derive(Serialize)]
struct RefreshResponse {
    schedule_ticket: u64,
    roster_ticket: u64,
}

fn build_schedule(feed: &FeedStore, filter: &LineFilter, pinned_line: &str, now: NaiveDateTime) -> ScheduleResponse {
    let shown = visible(feed.entries(), filter, now);
    let segments = group_by_date(&shown)
        .iter()
        .map(SegmentView::from_segment)
        .collect();

    ScheduleResponse {
        lines: unique_lines(feed.entries(), pinned_line),
        filter: filter.selected().map(str::to_string).collect(),
        total: feed.entries().len(),
        visible: shown.len(),
        segments,
        loading: feed.is_loading(),
        updated_at: feed.updated_at(),
        alert: feed.last_error().map(|_| SCHEDULE_FETCH_ALERT),
    }
}

// ============================================================================
// Refresh
// ============================================================================

/// Issue both fetches. Each lands on its own; a schedule response that
/// has been overtaken by a newer refresh is dropped by the store.
fn spawn_refresh(state: &AppState) -> RefreshResponse {
    let schedule_ticket = state.feed.write().begin_schedule_fetch();
    let roster_ticket = state.feed.write().begin_roster_fetch();

    let schedule_state = state.clone();
    tokio::spawn(async move {
        let result = schedule_state.client.fetch_schedule().await;
        schedule_state
            .feed
            .write()
            .apply(FeedUpdate::Schedule { ticket: schedule_ticket, result });
    });

    let roster_state = state.clone();
    tokio::spawn(async move {
        let result = roster_state.client.fetch_roster().await;
        roster_state
            .feed
            .write()
            .apply(FeedUpdate::Roster { ticket: roster_ticket, result });
    });

    RefreshResponse {
        schedule_ticket,
        roster_ticket,
    }
}

// ============================================================================
// API Handlers
// ============================================================================

/// GET /api/health - Health check
async fn health_check() -> impl IntoResponse {
    Json(ApiResponse::ok("OK"))
}

/// GET /api/schedule - Visible cards grouped by date
async fn get_schedule(
    State(state): State<AppState>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> impl IntoResponse {
    let query = ScheduleQuery::from_pairs(pairs);
    let feed = state.feed.read();
    let filter = query.filter(&feed, &state.pinned_line);
    let response = build_schedule(&feed, &filter, &state.pinned_line, Local::now().naive_local());

    let mut body = ApiResponse::ok(response);
    body.error = feed.last_error().map(str::to_string);
    Json(body)
}

/// GET /api/lines - Lines present in the current schedule
async fn get_lines(State(state): State<AppState>) -> impl IntoResponse {
    let feed = state.feed.read();
    Json(ApiResponse::ok(unique_lines(feed.entries(), &state.pinned_line)))
}

/// GET /api/roster - Today's roster, null until one has loaded
async fn get_roster(State(state): State<AppState>) -> impl IntoResponse {
    let feed = state.feed.read();
    Json(ApiResponse::ok(RosterResponse {
        roster: feed.roster().cloned(),
        loading: feed.is_roster_loading(),
    }))
}

/// GET /api/terminals - Terminal info sites and berth names
async fn get_terminals() -> impl IntoResponse {
    let berths = terminal_table()
        .iter()
        .map(|&(code, name)| BerthName { code, name })
        .collect();

    Json(ApiResponse::ok(TerminalsResponse {
        links: TERMINAL_LINKS.to_vec(),
        berths,
    }))
}

/// POST /api/refresh - Re-fetch schedule and roster
async fn refresh(State(state): State<AppState>) -> impl IntoResponse {
    let tickets = spawn_refresh(&state);
    info!(schedule_ticket = tickets.schedule_ticket, "refresh requested");
    (StatusCode::ACCEPTED, Json(ApiResponse::ok(tickets)))
}

/// GET / - Serve index.html
async fn serve_index() -> impl IntoResponse {
    Html(include_str!("../web/index.html"))
}

fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/health", get(health_check))
        .route("/schedule", get(get_schedule))
        .route("/lines", get(get_lines))
        .route("/roster", get(get_roster))
        .route("/terminals", get(get_terminals))
        .route("/refresh", post(refresh))
        .with_state(state);

    Router::new()
        .route("/", get(serve_index))
        .nest("/api", api_routes)
        .layer(CorsLayer::permissive())
}

// ============================================================================
// Main Server
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .compact()
        .with_file(true)
        .with_line_number(true)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    println!("🌐 Port Schedule Monitor - Web Server");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    let settings = load_settings().context("configuration could not be initialized")?;

    let state = AppState {
        feed: Arc::new(RwLock::new(FeedStore::new())),
        client: ScheduleClient::from_settings(&settings),
        pinned_line: Arc::from(settings.pinned_line.as_str()),
    };

    // Initial load, same as pressing refresh
    spawn_refresh(&state);

    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&settings.bind_addr)
        .await
        .with_context(|| format!("failed to bind to {}", settings.bind_addr))?;

    println!("\n🚀 Server running on http://{}", settings.bind_addr);
    println!("   API: http://{}/api/schedule", settings.bind_addr);
    println!("   UI:  http://{}", settings.bind_addr);
    println!("\n   Press Ctrl+C to stop\n");

    if let Err(e) = axum::serve(listener, app).await {
        error!(error = ?e, "server stopped");
        return Err(e.into());
    }

    Ok(())
}
