use anyhow::Result;
use chrono::{Local, NaiveDateTime};
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use port_schedule::terminals::{ais_link, terminal_sites};
use port_schedule::{
    CardView, Dashboard, FeedUpdate, Navigation, ScheduleClient, ScheduleEntry,
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, List, ListItem, ListState, Paragraph, Row, Table, Wrap},
    Frame, Terminal,
};
use std::io;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tracing::debug;

const TITLE: &str = "이엔에스마린 도선 모니터링";
const SUBTITLE: &str = "부산신항 실시간 스케줄";
const PAGE_STEP: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Panel {
    Schedule,
    Terminals,
}

impl Panel {
    pub fn next(&self) -> Self {
        match self {
            Panel::Schedule => Panel::Terminals,
            Panel::Terminals => Panel::Schedule,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            Panel::Schedule => "Schedule",
            Panel::Terminals => "Terminals",
        }
    }
}

pub struct App {
    pub dashboard: Dashboard,
    client: ScheduleClient,
    runtime: Handle,
    updates_tx: UnboundedSender<FeedUpdate>,
    updates_rx: UnboundedReceiver<FeedUpdate>,
    pub selected: usize,
    pub line_cursor: usize,
    pub current_panel: Panel,
    pub show_roster: bool,
}

impl App {
    pub fn new(dashboard: Dashboard, client: ScheduleClient, runtime: Handle) -> Self {
        let (updates_tx, updates_rx) = unbounded_channel();

        Self {
            dashboard,
            client,
            runtime,
            updates_tx,
            updates_rx,
            selected: 0,
            line_cursor: 0,
            current_panel: Panel::Schedule,
            show_roster: false,
        }
    }

    /// Fire off both fetches; results come back through the update channel
    pub fn refresh(&mut self) {
        let ticket = self.dashboard.feed_mut().begin_schedule_fetch();
        let client = self.client.clone();
        let tx = self.updates_tx.clone();
        self.runtime.spawn(async move {
            let result = client.fetch_schedule().await;
            let _ = tx.send(FeedUpdate::Schedule { ticket, result });
        });

        let ticket = self.dashboard.feed_mut().begin_roster_fetch();
        let client = self.client.clone();
        let tx = self.updates_tx.clone();
        self.runtime.spawn(async move {
            let result = client.fetch_roster().await;
            let _ = tx.send(FeedUpdate::Roster { ticket, result });
        });
    }

    /// Apply whatever fetch results have arrived since the last frame
    pub fn drain_updates(&mut self) {
        while let Ok(update) = self.updates_rx.try_recv() {
            let applied = self.dashboard.apply(update);
            debug!(?applied, "applied feed update");
        }
        self.clamp_selection(Self::now());
    }

    fn now() -> NaiveDateTime {
        Local::now().naive_local()
    }

    fn visible_len(&self, now: NaiveDateTime) -> usize {
        self.dashboard.visible(now).len()
    }

    fn clamp_selection(&mut self, now: NaiveDateTime) {
        let len = self.visible_len(now);
        if self.selected >= len {
            self.selected = len.saturating_sub(1);
        }
        let lines = self.dashboard.lines().len();
        if self.line_cursor > lines {
            self.line_cursor = lines;
        }
    }

    pub fn selected_entry(&self, now: NaiveDateTime) -> Option<&ScheduleEntry> {
        self.dashboard.visible(now).get(self.selected).copied()
    }

    pub fn toggle_selected(&mut self) {
        let now = Self::now();
        if let Some(id) = self.selected_entry(now).map(|entry| entry.id.clone()) {
            self.dashboard.toggle_expanded(&id);
        }
    }

    // Line filter bar: cursor 0 is "전체 라인", cursor n is the nth line

    pub fn line_cursor_left(&mut self) {
        self.line_cursor = self.line_cursor.saturating_sub(1);
    }

    pub fn line_cursor_right(&mut self) {
        if self.line_cursor < self.dashboard.lines().len() {
            self.line_cursor += 1;
        }
    }

    pub fn toggle_line_at_cursor(&mut self) {
        if self.line_cursor == 0 {
            self.dashboard.show_all_lines();
        } else if let Some(line) = self.dashboard.lines().get(self.line_cursor - 1) {
            self.dashboard.toggle_line(line);
        }
        self.selected = 0;
    }

    pub fn show_all_lines(&mut self) {
        self.dashboard.show_all_lines();
        self.line_cursor = 0;
        self.selected = 0;
    }

    pub fn next(&mut self) {
        let len = self.visible_len(Self::now());
        if len == 0 {
            return;
        }
        self.selected = if self.selected >= len - 1 { 0 } else { self.selected + 1 };
    }

    pub fn previous(&mut self) {
        let len = self.visible_len(Self::now());
        if len == 0 {
            return;
        }
        self.selected = if self.selected == 0 { len - 1 } else { self.selected - 1 };
    }

    pub fn page_down(&mut self) {
        let len = self.visible_len(Self::now());
        if len == 0 {
            return;
        }
        self.selected = (self.selected + PAGE_STEP).min(len - 1);
    }

    pub fn page_up(&mut self) {
        self.selected = self.selected.saturating_sub(PAGE_STEP);
    }

    pub fn end(&mut self) {
        self.selected = self.visible_len(Self::now()).saturating_sub(1);
    }
}

pub fn run_ui(app: &mut App) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run the app
    let res = run_app(&mut terminal, app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        println!("Error: {:?}", err);
    }

    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
) -> io::Result<()> {
    app.refresh();

    loop {
        app.drain_updates();
        terminal.draw(|f| ui(f, app))?;

        if !event::poll(Duration::from_millis(250))? {
            continue;
        }

        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }

        // The alert is modal: nothing else reacts until it is dismissed
        if app.dashboard.alert().is_some() {
            match key.code {
                KeyCode::Enter | KeyCode::Esc | KeyCode::Char(' ') => app.dashboard.dismiss_alert(),
                KeyCode::Char('q') => return Ok(()),
                _ => {}
            }
            continue;
        }

        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => return Ok(()),
            KeyCode::Tab => app.current_panel = app.current_panel.next(),
            KeyCode::Char('r') => app.refresh(),
            KeyCode::Char('w') => app.show_roster = !app.show_roster,
            KeyCode::Char('a') => app.show_all_lines(),
            KeyCode::Left | KeyCode::Char('h') => app.line_cursor_left(),
            KeyCode::Right | KeyCode::Char('l') => app.line_cursor_right(),
            KeyCode::Char(' ') => app.toggle_line_at_cursor(),
            KeyCode::Enter => app.toggle_selected(),
            KeyCode::Down | KeyCode::Char('j') => app.next(),
            KeyCode::Up | KeyCode::Char('k') => app.previous(),
            KeyCode::PageDown => app.page_down(),
            KeyCode::PageUp => app.page_up(),
            KeyCode::Home => app.selected = 0,
            KeyCode::End => app.end(),
            _ => {}
        }
    }
}

fn ui(f: &mut Frame, app: &App) {
    let now = App::now();
    let header_height = header_lines(app) as u16 + 2;

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(header_height), // Title, status, roster
            Constraint::Length(3),             // Line filter bar
            Constraint::Min(0),                // Cards or terminal links
            Constraint::Length(3),             // Status bar
        ])
        .split(f.size());

    render_header(f, chunks[0], app);
    render_line_filter(f, chunks[1], app);

    match app.current_panel {
        Panel::Schedule => render_cards(f, chunks[2], app, now),
        Panel::Terminals => render_terminals(f, chunks[2]),
    }

    render_status_bar(f, chunks[3], app, now);

    if let Some(message) = app.dashboard.alert() {
        render_alert(f, message);
    }
}

fn header_lines(app: &App) -> usize {
    match app.dashboard.feed().roster() {
        Some(_) if app.show_roster => 4,
        Some(_) => 2,
        None => 1,
    }
}

fn render_header(f: &mut Frame, area: Rect, app: &App) {
    let feed = app.dashboard.feed();

    let status = if feed.is_loading() {
        Span::styled("⟳ 불러오는 중...", Style::default().fg(Color::Yellow))
    } else {
        match feed.updated_at() {
            Some(at) => Span::styled(
                format!("업데이트 {}", at.format("%H:%M:%S")),
                Style::default().fg(Color::Green),
            ),
            None => Span::styled("데이터 없음", Style::default().fg(Color::DarkGray)),
        }
    };

    let mut lines = vec![Line::from(vec![
        Span::styled(TITLE, Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)),
        Span::raw("  "),
        Span::styled(SUBTITLE, Style::default().fg(Color::DarkGray)),
        Span::raw("  |  "),
        status,
        Span::raw("  |  "),
        Span::styled(ais_link().name, Style::default().fg(Color::White).bg(Color::Red)),
    ])];

    if let Some(roster) = feed.roster() {
        let arrow = if app.show_roster { "▲" } else { "▼" };
        lines.push(Line::from(vec![
            Span::styled(roster.heading(), Style::default().add_modifier(Modifier::BOLD)),
            Span::raw("  "),
            Span::styled(format!("오늘 근무자명단 {}", arrow), Style::default().fg(Color::DarkGray)),
        ]));

        if app.show_roster {
            let colors = [Color::Cyan, Color::Magenta];
            for (group, color) in roster.groups().iter().zip(colors) {
                lines.push(Line::from(vec![
                    Span::styled(group.label, Style::default().fg(color).add_modifier(Modifier::BOLD)),
                    Span::raw(format!(" ({}명) : {}", group.count, group.joined())),
                ]));
            }
        }
    }

    let header = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(Color::Cyan)));

    f.render_widget(header, area);
}

fn render_line_filter(f: &mut Frame, area: Rect, app: &App) {
    let filter = app.dashboard.filter();

    let button = |label: String, active: bool, at_cursor: bool| {
        let mut style = if active {
            Style::default().fg(Color::Black).bg(Color::Yellow).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Gray)
        };
        if at_cursor {
            style = style.add_modifier(Modifier::UNDERLINED);
        }
        Span::styled(format!(" {} ", label), style)
    };

    let mut spans = vec![button("전체 라인".to_string(), filter.is_all(), app.line_cursor == 0)];
    for (i, line) in app.dashboard.lines().into_iter().enumerate() {
        spans.push(Span::raw(" "));
        let active = filter.contains(&line);
        spans.push(button(line, active, app.line_cursor == i + 1));
    }

    let bar = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White))
            .title(" Lines "),
    );

    f.render_widget(bar, area);
}

fn card_colors(navigation: Navigation) -> (Color, Color) {
    // (card background, badge background)
    match navigation {
        Navigation::Arrival => (Color::Rgb(255, 228, 204), Color::Rgb(249, 115, 22)),
        Navigation::Departure => (Color::Rgb(207, 232, 252), Color::Rgb(14, 165, 233)),
        Navigation::Shift => (Color::Rgb(200, 247, 197), Color::Rgb(139, 201, 133)),
    }
}

fn card_item(card: &CardView, expanded: bool) -> ListItem<'static> {
    let (card_bg, badge_bg) = card_colors(card.navigation);
    let base = Style::default().fg(Color::Black).bg(card_bg);

    let mut spans = vec![
        Span::styled(format!("🕒 {} ", card.time), base.add_modifier(Modifier::BOLD)),
        Span::styled(format!(" {} ", card.badge), Style::default().fg(Color::White).bg(badge_bg)),
        Span::styled(format!(" {} ", card.terminal), base),
    ];
    if card.quarantine {
        spans.push(Span::styled(" 검역 ", Style::default().fg(Color::Black).bg(Color::LightYellow)));
        spans.push(Span::styled(" ", base));
    }
    if card.special {
        spans.push(Span::styled("@ ", base.fg(Color::Red).add_modifier(Modifier::BOLD)));
    }
    spans.push(Span::styled(card.ship_name_short.clone(), base.add_modifier(Modifier::BOLD)));
    spans.push(Span::styled(if expanded { "  ▲" } else { "  ▼" }, base.fg(Color::DarkGray)));

    let mut lines = vec![Line::from(spans)];
    if expanded {
        lines.push(Line::from(Span::styled("  ─────────────────────────────────────", base)));
        for field in &card.details {
            lines.push(Line::from(vec![
                Span::styled(format!("  {}: ", field.label), base.fg(Color::DarkGray)),
                Span::styled(field.value.clone(), base.add_modifier(Modifier::BOLD)),
            ]));
        }
    }

    ListItem::new(lines).style(base)
}

fn separator_item(date: &str) -> ListItem<'static> {
    ListItem::new(Line::from(Span::styled(
        format!(" {} ", date),
        Style::default().fg(Color::White).bg(Color::Blue).add_modifier(Modifier::BOLD),
    )))
}

fn render_cards(f: &mut Frame, area: Rect, app: &App, now: NaiveDateTime) {
    let segments = app.dashboard.segments(now);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::White))
        .title(" Schedule ");

    if segments.is_empty() {
        let message = if app.dashboard.feed().is_loading() {
            "데이터를 불러오는 중..."
        } else {
            "검색 결과가 없습니다."
        };
        let empty = Paragraph::new(Line::from(Span::styled(message, Style::default().fg(Color::DarkGray))))
            .block(block);
        f.render_widget(empty, area);
        return;
    }

    // Date headers sit between cards, so the list position of the
    // selected card is offset by every header above it
    let mut items = Vec::new();
    let mut selected_item = None;
    let mut card_index = 0;
    for segment in &segments {
        items.push(separator_item(segment.date));
        for entry in &segment.entries {
            if card_index == app.selected {
                selected_item = Some(items.len());
            }
            let card = CardView::from_entry(entry);
            items.push(card_item(&card, app.dashboard.is_expanded(&card.id)));
            card_index += 1;
        }
    }

    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol("→ ");

    let mut state = ListState::default();
    state.select(selected_item);
    f.render_stateful_widget(list, area, &mut state);
}

fn render_terminals(f: &mut Frame, area: Rect) {
    let header_cells = ["Terminal", "Schedule"]
        .iter()
        .map(|h| {
            Cell::from(*h).style(
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            )
        });

    let header = Row::new(header_cells)
        .style(Style::default().bg(Color::DarkGray))
        .height(1);

    let rows = terminal_sites().iter().chain(std::iter::once(ais_link())).map(|link| {
        Row::new(vec![
            Cell::from(link.name),
            Cell::from(link.url).style(Style::default().fg(Color::Cyan)),
        ])
        .height(1)
    });

    let table = Table::new(rows, [Constraint::Length(12), Constraint::Min(20)])
        .header(header)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::White))
                .title(" Terminal Info "),
        );

    f.render_widget(table, area);
}

fn render_status_bar(f: &mut Frame, area: Rect, app: &App, now: NaiveDateTime) {
    let total = app.dashboard.visible(now).len();
    let selected = if total == 0 { 0 } else { app.selected + 1 };

    let mut status_spans = vec![
        Span::styled(
            format!(" {} {}/{} ", app.current_panel.title(), selected, total),
            Style::default().fg(Color::Cyan),
        ),
    ];

    let keys = [
        ("Enter", "Details"),
        ("Space", "Line"),
        ("←/→", "Lines"),
        ("a", "All"),
        ("r", "Refresh"),
        ("w", "Roster"),
        ("Tab", "Panel"),
    ];
    for (key, action) in keys {
        status_spans.push(Span::raw(" | "));
        status_spans.push(Span::styled(key, Style::default().fg(Color::Yellow)));
        status_spans.push(Span::raw(format!(" {}", action)));
    }
    status_spans.push(Span::raw(" | "));
    status_spans.push(Span::styled("q", Style::default().fg(Color::Red)));
    status_spans.push(Span::raw(" Quit"));

    let status_bar = Paragraph::new(Line::from(status_spans)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White)),
    );

    f.render_widget(status_bar, area);
}

fn render_alert(f: &mut Frame, message: &str) {
    let area = centered_rect(60, 40, f.size());

    let mut lines: Vec<Line> = message.lines().map(|l| Line::from(l.to_string())).collect();
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "Press Enter to close",
        Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
    )));

    let alert = Paragraph::new(lines).wrap(Wrap { trim: false }).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Red))
            .title(" 오류 "),
    );

    f.render_widget(Clear, area);
    f.render_widget(alert, area);
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}
