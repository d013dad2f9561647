//! TUI rendering functions

use super::app::TuiApp;
use crate::config::Theme;
use crate::dashboard::{
    drawer::{pretty_body, StatusClass},
    Dashboard, Drawer, Editor, EditorField, MappingDrawer, RequestDrawer, Tab,
};
use chrono::{Local, TimeZone};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, TableState, Tabs, Wrap},
    Frame,
};
use serde_json::Value;
use stubdeck_common::constants::ANY_URL;
use stubdeck_common::StubMapping;

/// Colours for one theme
struct Palette {
    fg: Color,
    bg: Color,
    muted: Color,
    accent: Color,
    highlight: Color,
    ok: Color,
    warn: Color,
    error: Color,
    info: Color,
}

impl Palette {
    fn of(theme: Theme) -> Self {
        match theme {
            Theme::Dark => Palette {
                fg: Color::White,
                bg: Color::Reset,
                muted: Color::DarkGray,
                accent: Color::Cyan,
                highlight: Color::Rgb(40, 40, 60),
                ok: Color::Green,
                warn: Color::Yellow,
                error: Color::Red,
                info: Color::Blue,
            },
            Theme::Light => Palette {
                fg: Color::Black,
                bg: Color::White,
                muted: Color::Gray,
                accent: Color::Blue,
                highlight: Color::Rgb(215, 225, 245),
                ok: Color::Rgb(0, 120, 0),
                warn: Color::Rgb(160, 100, 0),
                error: Color::Rgb(180, 0, 0),
                info: Color::Rgb(0, 90, 160),
            },
        }
    }

    fn muted(&self) -> Style {
        Style::default().fg(self.muted)
    }

    fn key(&self) -> Style {
        Style::default().fg(self.accent)
    }

    fn status(&self, status: u16) -> Style {
        let color = match StatusClass::of(status) {
            StatusClass::Success => self.ok,
            StatusClass::Redirect => self.info,
            StatusClass::ClientError => self.warn,
            StatusClass::ServerError => self.error,
            StatusClass::Other => self.fg,
        };
        Style::default().fg(color)
    }

    fn method(&self, method: &str) -> Style {
        let color = match method {
            "GET" => self.ok,
            "POST" => self.warn,
            "PUT" => self.info,
            "PATCH" => Color::Magenta,
            "DELETE" => self.error,
            "HEAD" => self.accent,
            _ => self.fg,
        };
        Style::default().fg(color)
    }
}

/// Draw the TUI
pub fn draw(frame: &mut Frame, app: &TuiApp) {
    let dashboard = &app.dashboard;
    let p = Palette::of(dashboard.theme);
    let area = frame.area();

    frame.render_widget(
        Block::default().style(Style::default().bg(p.bg).fg(p.fg)),
        area,
    );

    if !dashboard.is_configured() {
        draw_unconfigured(frame, &p, area);
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Title + instances
            Constraint::Length(1), // Tabs
            Constraint::Length(1), // Search + counters
            Constraint::Length(1), // Banner
            Constraint::Min(3),    // Table
            Constraint::Length(1), // Footer
        ])
        .split(area);

    draw_header(frame, dashboard, &p, chunks[0]);
    draw_tabs(frame, dashboard, &p, chunks[1]);
    draw_search_line(frame, app, &p, chunks[2]);
    draw_banner(frame, dashboard, &p, chunks[3]);
    match dashboard.tab {
        Tab::Requests => draw_requests_table(frame, dashboard, &p, chunks[4]),
        Tab::Mappings => draw_mappings_table(frame, dashboard, &p, chunks[4]),
    }
    draw_footer(frame, app, &p, chunks[5]);

    if let Some(drawer) = &dashboard.drawer {
        let drawer_area = right_panel(chunks[4].union(chunks[5]));
        match drawer {
            Drawer::Request(d) => draw_request_drawer(frame, d, &p, drawer_area),
            Drawer::Mapping(d) => draw_mapping_drawer(frame, d, &p, drawer_area),
        }
    }

    if let Some(editor) = &dashboard.editor {
        draw_editor(frame, editor, &p, centered(area, 80, 90));
    }
}

/// Configuration prompt shown when no instance is configured
fn draw_unconfigured(frame: &mut Frame, p: &Palette, area: Rect) {
    let lines = vec![
        Line::from(Span::styled(
            "No mock-server instances configured",
            Style::default().fg(p.warn).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("Set ", p.muted()),
            Span::styled(crate::config::URLS_ENV, p.key()),
            Span::styled(" (or pass ", p.muted()),
            Span::styled("--urls", p.key()),
            Span::styled(") to a comma-separated list of base URLs, e.g.", p.muted()),
        ]),
        Line::from(Span::styled(
            "  http://localhost:8080,http://localhost:8081",
            Style::default().fg(p.fg),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("q", p.key()),
            Span::styled(" Quit", p.muted()),
        ]),
    ];
    let block = Block::default()
        .title(" Stubdeck ")
        .borders(Borders::ALL)
        .border_style(p.muted());
    frame.render_widget(
        Paragraph::new(lines).block(block).wrap(Wrap { trim: false }),
        centered(area, 70, 40),
    );
}

/// Title, instance switcher and theme indicator
fn draw_header(frame: &mut Frame, dashboard: &Dashboard, p: &Palette, area: Rect) {
    let mut spans = vec![
        Span::styled(
            " STUBDECK ",
            Style::default().fg(p.accent).add_modifier(Modifier::BOLD),
        ),
        Span::styled("│ ", p.muted()),
    ];
    for (index, instance) in dashboard.instances.iter().enumerate() {
        let style = if index == dashboard.active {
            Style::default()
                .fg(p.fg)
                .bg(p.highlight)
                .add_modifier(Modifier::BOLD)
        } else {
            p.muted()
        };
        spans.push(Span::styled(
            format!(" {} {} ", index + 1, instance.label),
            style,
        ));
    }
    spans.push(Span::styled(
        format!("  theme: {}", dashboard.theme.as_str()),
        p.muted(),
    ));
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn draw_tabs(frame: &mut Frame, dashboard: &Dashboard, p: &Palette, area: Rect) {
    let selected = match dashboard.tab {
        Tab::Requests => 0,
        Tab::Mappings => 1,
    };
    let tabs = Tabs::new(vec![Tab::Requests.as_str(), Tab::Mappings.as_str()])
        .select(selected)
        .style(p.muted())
        .highlight_style(Style::default().fg(p.accent).add_modifier(Modifier::BOLD))
        .divider("│");
    frame.render_widget(tabs, area);
}

/// Search line with counters and the "last updated" clock
fn draw_search_line(frame: &mut Frame, app: &TuiApp, p: &Palette, area: Rect) {
    let dashboard = &app.dashboard;
    let (search, counter, updated) = match dashboard.tab {
        Tab::Requests => {
            let panel = &dashboard.requests;
            (
                panel.search.as_str(),
                requests_counter(dashboard),
                panel.last_updated,
            )
        }
        Tab::Mappings => {
            let panel = &dashboard.mappings;
            let counter = if panel.search.is_empty() {
                format!("{} mappings", panel.mappings.len())
            } else {
                format!("{} of {} mappings", panel.filtered().len(), panel.mappings.len())
            };
            (panel.search.as_str(), counter, panel.last_updated)
        }
    };

    let search_style = if app.search_active {
        Style::default().fg(p.fg).add_modifier(Modifier::UNDERLINED)
    } else {
        Style::default().fg(p.fg)
    };
    let mut spans = vec![
        Span::styled(" / ", p.key()),
        Span::styled(
            if search.is_empty() && !app.search_active {
                "search method or URL".to_string()
            } else {
                search.to_string()
            },
            if search.is_empty() && !app.search_active {
                p.muted()
            } else {
                search_style
            },
        ),
        Span::styled("  │ ", p.muted()),
        Span::styled(counter, Style::default().fg(p.fg)),
    ];
    if dashboard.tab == Tab::Requests {
        spans.push(Span::styled(
            format!("  │ limit {}", dashboard.requests.limit),
            p.muted(),
        ));
    }
    if let Some(updated) = updated {
        spans.push(Span::styled(
            format!("  │ Updated {}", updated.format("%H:%M:%S")),
            p.muted(),
        ));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// "N requests", "F of N requests" and the search scope hint
fn requests_counter(dashboard: &Dashboard) -> String {
    let panel = &dashboard.requests;
    let loaded = panel.records.len();
    let mut text = if panel.search.is_empty() {
        format!("{} requests", loaded)
    } else {
        format!("{} of {} requests", panel.filtered().len(), loaded)
    };
    if panel.can_widen() {
        text.push_str(&format!(
            "  (Searching {} of {} requests, a: search all)",
            loaded, panel.total
        ));
    } else if panel.search_all && !panel.search.is_empty() {
        text.push_str(&format!("  (Searching all {} requests)", panel.total));
    }
    text
}

/// Single-line error or success banner
fn draw_banner(frame: &mut Frame, dashboard: &Dashboard, p: &Palette, area: Rect) {
    let (text, color) = match dashboard.tab {
        Tab::Requests => match &dashboard.requests.error {
            Some(error) => (error.clone(), p.error),
            None => (String::new(), p.fg),
        },
        Tab::Mappings => {
            let panel = &dashboard.mappings;
            if let Some(prompt) = &panel.import_prompt {
                (format!("Import file: {}_", prompt), p.accent)
            } else if panel.confirm_bulk_delete {
                (
                    format!("Delete {} selected mapping(s)? y/n", panel.selected.len()),
                    p.warn,
                )
            } else if panel.bulk_deleting {
                ("Deleting...".to_string(), p.warn)
            } else if panel.importing {
                ("Importing...".to_string(), p.accent)
            } else if let Some(error) = &panel.import_error {
                (error.clone(), p.error)
            } else if let Some(error) = &panel.error {
                (error.clone(), p.error)
            } else if let Some(notice) = &panel.notice {
                (notice.clone(), p.ok)
            } else if panel.loading {
                ("Loading...".to_string(), p.muted)
            } else {
                (String::new(), p.fg)
            }
        }
    };
    frame.render_widget(
        Paragraph::new(Span::styled(format!(" {}", text), Style::default().fg(color))),
        area,
    );
}

fn draw_requests_table(frame: &mut Frame, dashboard: &Dashboard, p: &Palette, area: Rect) {
    let panel = &dashboard.requests;
    let records = panel.filtered();

    let header = Row::new(vec!["Time", "Method", "URL", "Status", "Matched"])
        .style(p.muted().add_modifier(Modifier::BOLD));

    let rows: Vec<Row> = records
        .iter()
        .map(|record| {
            let matched = if record.was_matched {
                Span::styled("yes", Style::default().fg(p.ok))
            } else {
                Span::styled("NO MATCH", Style::default().fg(p.error))
            };
            let row = Row::new(vec![
                Cell::from(format_logged_date(record.request.logged_date)),
                Cell::from(record.request.method.clone()).style(p.method(&record.request.method)),
                Cell::from(record.request.url.clone()),
                Cell::from(record.response_definition.status.to_string())
                    .style(p.status(record.response_definition.status)),
                Cell::from(matched),
            ]);
            if record.was_matched {
                row
            } else {
                row.style(Style::default().add_modifier(Modifier::ITALIC))
            }
        })
        .collect();

    let empty = records.is_empty();
    let table = Table::new(
        rows,
        [
            Constraint::Length(9),
            Constraint::Length(8),
            Constraint::Min(10),
            Constraint::Length(6),
            Constraint::Length(9),
        ],
    )
    .header(header)
    .block(
        Block::default()
            .title(" Requests ")
            .borders(Borders::ALL)
            .border_style(p.muted()),
    )
    .row_highlight_style(Style::default().bg(p.highlight));

    let mut state = TableState::default();
    if !empty {
        state.select(Some(panel.cursor));
    }
    frame.render_stateful_widget(table, area, &mut state);
}

fn draw_mappings_table(frame: &mut Frame, dashboard: &Dashboard, p: &Palette, area: Rect) {
    let panel = &dashboard.mappings;
    let mappings = panel.filtered();

    let header = Row::new(vec![
        Cell::from(panel.check_state().glyph()),
        Cell::from("Method"),
        Cell::from("URL"),
        Cell::from("Status"),
        Cell::from("Name"),
    ])
    .style(p.muted().add_modifier(Modifier::BOLD));

    let rows: Vec<Row> = mappings
        .iter()
        .map(|mapping| {
            let checked = if panel.selected.contains(&mapping.id) {
                "[x]"
            } else {
                "[ ]"
            };
            let last = if panel.confirming_delete.as_deref() == Some(mapping.id.as_str()) {
                Span::styled("Delete? y/n", Style::default().fg(p.warn))
            } else if panel.deleting.as_deref() == Some(mapping.id.as_str()) {
                Span::styled("Deleting...", Style::default().fg(p.warn))
            } else {
                Span::styled(mapping.name().unwrap_or("").to_string(), p.muted())
            };
            Row::new(vec![
                Cell::from(checked),
                Cell::from(mapping.method_label().to_string())
                    .style(p.method(mapping.method_label())),
                Cell::from(list_url(mapping)),
                Cell::from(mapping.response.status.to_string())
                    .style(p.status(mapping.response.status)),
                Cell::from(last),
            ])
        })
        .collect();

    let empty = mappings.is_empty();
    let table = Table::new(
        rows,
        [
            Constraint::Length(4),
            Constraint::Length(8),
            Constraint::Min(10),
            Constraint::Length(6),
            Constraint::Length(20),
        ],
    )
    .header(header)
    .block(
        Block::default()
            .title(format!(" Mappings ({} selected) ", panel.selected.len()))
            .borders(Borders::ALL)
            .border_style(p.muted()),
    )
    .row_highlight_style(Style::default().bg(p.highlight));

    let mut state = TableState::default();
    if !empty {
        state.select(Some(panel.cursor));
    }
    frame.render_stateful_widget(table, area, &mut state);
}

/// URL column text; pattern matchers are marked with `~`
fn list_url(mapping: &StubMapping) -> String {
    if mapping.is_pattern() {
        format!("~ {}", mapping.url_label())
    } else {
        mapping.url_label().to_string()
    }
}

fn draw_request_drawer(frame: &mut Frame, drawer: &RequestDrawer, p: &Palette, area: Rect) {
    let record = &drawer.record;
    let request = &record.request;
    let response = &record.response_definition;

    let mut lines = vec![
        Line::from(vec![
            Span::styled(request.method.clone(), p.method(&request.method).add_modifier(Modifier::BOLD)),
            Span::raw(" "),
            Span::styled(request.url.clone(), Style::default().fg(p.fg)),
        ]),
    ];
    if !request.absolute_url.is_empty() {
        lines.push(Line::from(Span::styled(request.absolute_url.clone(), p.muted())));
    }
    lines.push(field_line(p, "Logged", format_logged_date_long(request.logged_date)));
    lines.push(match record.matched_stub_id() {
        Some(id) => Line::from(vec![
            Span::styled("Matched   ", p.muted()),
            Span::styled("MATCHED ", Style::default().fg(p.ok)),
            Span::styled(id.to_string(), p.key()),
        ]),
        None => Line::from(vec![
            Span::styled("Matched   ", p.muted()),
            Span::styled("UNMATCHED", Style::default().fg(p.error)),
        ]),
    });

    section(&mut lines, p, "Request headers");
    let headers = request.header_pairs();
    if headers.is_empty() {
        lines.push(Line::from(Span::styled("(none)", p.muted())));
    }
    for (key, value) in headers {
        lines.push(Line::from(vec![
            Span::styled(format!("{}: ", key), p.muted()),
            Span::raw(value),
        ]));
    }

    section(&mut lines, p, "Request body");
    push_body(&mut lines, p, request.body.as_deref());

    section(&mut lines, p, "Response");
    lines.push(Line::from(vec![
        Span::styled("Status    ", p.muted()),
        Span::styled(response.status.to_string(), p.status(response.status)),
    ]));
    push_body(&mut lines, p, response.body.as_deref());

    let hints = if record.matched_stub_id().is_some() {
        " m matched stub  Esc close "
    } else {
        " s create stub  Esc close "
    };
    render_drawer(frame, p, area, " Request ", hints, lines, drawer.scroll);
}

fn draw_mapping_drawer(frame: &mut Frame, drawer: &MappingDrawer, p: &Palette, area: Rect) {
    let mapping = &drawer.mapping;
    let request = &mapping.request;
    let response = &mapping.response;

    let mut lines = Vec::new();
    if drawer.back.is_some() {
        lines.push(Line::from(vec![
            Span::styled("b", p.key()),
            Span::styled(" Back to request", p.muted()),
        ]));
    }
    if let Some(name) = mapping.name() {
        lines.push(Line::from(Span::styled(
            name.to_string(),
            Style::default().fg(p.fg).add_modifier(Modifier::BOLD),
        )));
    }
    lines.push(field_line(p, "Method", mapping.method_label().to_string()));
    match &request.url {
        Some(url) => lines.push(field_line(p, url.kind().detail_label(), url.value().to_string())),
        None => lines.push(field_line(p, "URL", ANY_URL.to_string())),
    }
    if let Some(priority) = mapping.priority {
        lines.push(field_line(p, "Priority", priority.to_string()));
    }

    if let Some(query) = request.query_parameters() {
        section(&mut lines, p, "Query parameters");
        push_json(&mut lines, &Value::Object(query.clone()));
    }
    if !request.body_patterns.is_empty() {
        section(&mut lines, p, "Body patterns");
        let patterns: Vec<Value> = request
            .body_patterns
            .iter()
            .cloned()
            .map(Value::Object)
            .collect();
        push_json(&mut lines, &Value::Array(patterns));
    }
    if let Some(headers) = request.header_matchers() {
        section(&mut lines, p, "Header matchers");
        push_json(&mut lines, &Value::Object(headers.clone()));
    }

    section(&mut lines, p, "Response");
    let mut status = vec![
        Span::styled("Status    ", p.muted()),
        Span::styled(response.status.to_string(), p.status(response.status)),
    ];
    if response.has_response_templating() {
        status.push(Span::styled("  templated", Style::default().fg(p.info)));
    }
    lines.push(Line::from(status));
    if let Some(delay) = response.fixed_delay_milliseconds {
        lines.push(field_line(p, "Delay", format!("{} ms", delay)));
    }
    for (key, value) in response.header_pairs() {
        lines.push(Line::from(vec![
            Span::styled(format!("{}: ", key), p.muted()),
            Span::raw(value),
        ]));
    }
    push_body(&mut lines, p, response.body.as_deref());

    section(&mut lines, p, "Identity");
    lines.push(field_line(p, "Id", mapping.id.clone()));
    if let Some(uuid) = mapping.uuid.as_ref().filter(|uuid| **uuid != mapping.id) {
        lines.push(field_line(p, "UUID", uuid.clone()));
    }

    if drawer.confirm_delete {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "Delete this mapping? y/n",
            Style::default().fg(p.warn).add_modifier(Modifier::BOLD),
        )));
    } else if drawer.deleting {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled("Deleting...", Style::default().fg(p.warn))));
    }
    if let Some(error) = &drawer.delete_error {
        lines.push(Line::from(Span::styled(error.clone(), Style::default().fg(p.error))));
    }

    render_drawer(
        frame,
        p,
        area,
        " Mapping ",
        " e edit  x export  d delete  Esc close ",
        lines,
        drawer.scroll,
    );
}

fn render_drawer(
    frame: &mut Frame,
    p: &Palette,
    area: Rect,
    title: &str,
    hints: &str,
    lines: Vec<Line<'static>>,
    scroll: u16,
) {
    let block = Block::default()
        .title(title.to_string())
        .title_bottom(Line::from(Span::styled(hints.to_string(), p.muted())))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(p.accent))
        .style(Style::default().bg(p.bg).fg(p.fg));
    frame.render_widget(Clear, area);
    frame.render_widget(
        Paragraph::new(lines)
            .block(block)
            .wrap(Wrap { trim: false })
            .scroll((scroll, 0)),
        area,
    );
}

fn draw_editor(frame: &mut Frame, editor: &Editor, p: &Palette, area: Rect) {
    let focused = editor.focused();
    let draft = &editor.draft;
    let mut lines: Vec<Line<'static>> = Vec::new();

    let mut push = |field: EditorField, label: &str, value: String| {
        lines.push(form_line(p, field == focused, label, value, field.is_text()));
    };

    push(EditorField::Method, "Method", draft.method.clone());
    push(
        EditorField::UrlMatch,
        "URL match",
        draft.url_match.choice_label().to_string(),
    );
    push(EditorField::UrlValue, "URL", draft.url_value.clone());
    for (idx, pattern) in draft.body_patterns.iter().enumerate() {
        push(
            EditorField::PatternOperator(idx),
            "Body op",
            pattern.operator.as_str().to_string(),
        );
        let value = if pattern.value.is_empty() && EditorField::PatternValue(idx) != focused {
            pattern.operator.placeholder().to_string()
        } else {
            pattern.value.clone()
        };
        push(EditorField::PatternValue(idx), "  value", value);
    }
    push(EditorField::AddPattern, "", "+ body pattern".to_string());
    push(EditorField::Status, "Status", draft.status.clone());
    push(
        EditorField::Templating,
        "Templating",
        if draft.response_templating { "[x]" } else { "[ ]" }.to_string(),
    );
    push(EditorField::Body, "Body", draft.body.clone());
    for (idx, header) in draft.response_headers.iter().enumerate() {
        push(EditorField::HeaderKey(idx), "Header", header.key.clone());
        push(EditorField::HeaderValue(idx), "  value", header.value.clone());
    }
    push(EditorField::AddHeader, "", "+ response header".to_string());
    push(EditorField::Delay, "Delay ms", draft.delay.clone());
    push(EditorField::Priority, "Priority", draft.priority.clone());
    let submit_style = if editor.can_submit() {
        format!("[ {} ]", editor.submit_label())
    } else {
        format!("( {} )", editor.submit_label())
    };
    push(EditorField::Submit, "", submit_style);

    if !draft.preserved_body_patterns.is_empty() {
        lines.push(Line::from(Span::styled(
            format!(
                "{} other body pattern(s) kept as-is",
                draft.preserved_body_patterns.len()
            ),
            p.muted(),
        )));
    }
    if let Some(error) = &editor.error {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            error.clone(),
            Style::default().fg(p.error),
        )));
    }

    // Keep the focused row in view
    let focus_row = lines
        .iter()
        .position(|line| line.style.add_modifier.contains(Modifier::REVERSED))
        .unwrap_or(0) as u16;
    let visible = area.height.saturating_sub(2);
    let scroll = focus_row.saturating_sub(visible.saturating_sub(3));

    let block = Block::default()
        .title(format!(" {} ", editor.title()))
        .title_bottom(Line::from(Span::styled(
            " Tab/Shift-Tab move  Space/←/→ choose  Ctrl+S save  Ctrl+D remove row  Esc close ",
            p.muted(),
        )))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(p.accent))
        .style(Style::default().bg(p.bg).fg(p.fg));
    frame.render_widget(Clear, area);
    frame.render_widget(
        Paragraph::new(lines).block(block).scroll((scroll, 0)),
        area,
    );
}

/// One editor row; the focused row is reversed
fn form_line(p: &Palette, focused: bool, label: &str, value: String, text: bool) -> Line<'static> {
    let shown = if focused && text {
        format!("{}_", value.replace('\n', "⏎"))
    } else {
        value.replace('\n', "⏎")
    };
    let line = Line::from(vec![
        Span::styled(format!("{:<11}", label), p.muted()),
        Span::styled(shown, Style::default().fg(p.fg)),
    ]);
    if focused {
        line.style(Style::default().add_modifier(Modifier::REVERSED))
    } else {
        line
    }
}

fn draw_footer(frame: &mut Frame, app: &TuiApp, p: &Palette, area: Rect) {
    let hints: &[(&str, &str)] = if app.search_active {
        &[("Enter/Esc", "Done")]
    } else {
        match app.dashboard.tab {
            Tab::Requests => &[
                ("Tab", "Mappings"),
                ("[ ]", "Instance"),
                ("/", "Search"),
                ("a", "Search all"),
                ("l", "Limit"),
                ("Enter", "Details"),
                ("t", "Theme"),
                ("q", "Quit"),
            ],
            Tab::Mappings => &[
                ("Tab", "Requests"),
                ("/", "Search"),
                ("Space", "Select"),
                ("A", "All"),
                ("n", "New"),
                ("c", "Clone"),
                ("d", "Delete"),
                ("D", "Delete selected"),
                ("e", "Export"),
                ("i", "Import"),
                ("r", "Refresh"),
                ("q", "Quit"),
            ],
        }
    };

    let mut spans = Vec::new();
    for (key, label) in hints {
        spans.push(Span::styled(format!(" {}", key), p.key()));
        spans.push(Span::styled(format!(" {} ", label), p.muted()));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn section(lines: &mut Vec<Line<'static>>, p: &Palette, title: &str) {
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        title.to_string(),
        Style::default().fg(p.accent).add_modifier(Modifier::BOLD),
    )));
}

fn field_line(p: &Palette, label: &str, value: String) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("{:<10}", label), p.muted()),
        Span::raw(value),
    ])
}

fn push_body(lines: &mut Vec<Line<'static>>, p: &Palette, body: Option<&str>) {
    match body.filter(|b| !b.is_empty()) {
        Some(body) => lines.extend(pretty_body(body).lines().map(|l| Line::from(l.to_string()))),
        None => lines.push(Line::from(Span::styled("(empty)", p.muted()))),
    }
}

fn push_json(lines: &mut Vec<Line<'static>>, value: &Value) {
    let text = serde_json::to_string_pretty(value).unwrap_or_default();
    lines.extend(text.lines().map(|l| Line::from(l.to_string())));
}

/// Right-hand drawer area
fn right_panel(area: Rect) -> Rect {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(35), Constraint::Percentage(65)])
        .split(area);
    chunks[1]
}

/// Centered rect using percentages of `area`
fn centered(area: Rect, percent_x: u16, percent_y: u16) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}

/// Format a journal timestamp for the table
fn format_logged_date(millis: Option<i64>) -> String {
    millis
        .and_then(|ms| Local.timestamp_millis_opt(ms).single())
        .map(|t| t.format("%H:%M:%S").to_string())
        .unwrap_or_else(|| "-".to_string())
}

fn format_logged_date_long(millis: Option<i64>) -> String {
    millis
        .and_then(|ms| Local.timestamp_millis_opt(ms).single())
        .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| "-".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_list_url_marks_patterns() {
        let pattern: StubMapping = serde_json::from_value(json!({
            "request": { "urlPathPattern": "/users/.*" },
            "response": { "status": 200 }
        }))
        .unwrap();
        let any: StubMapping =
            serde_json::from_value(json!({ "request": {}, "response": { "status": 200 } }))
                .unwrap();

        assert_eq!(list_url(&pattern), "~ /users/.*");
        assert_eq!(list_url(&any), "(any)");
    }

    #[test]
    fn test_format_logged_date_missing() {
        assert_eq!(format_logged_date(None), "-");
        assert_ne!(format_logged_date(Some(1_700_000_000_000)), "-");
    }

    #[test]
    fn test_form_line_marks_focus() {
        let p = Palette::of(Theme::Dark);
        let line = form_line(&p, true, "URL", "/a".to_string(), true);
        assert!(line.style.add_modifier.contains(Modifier::REVERSED));
        assert_eq!(line.spans[1].content, "/a_");
    }
}
