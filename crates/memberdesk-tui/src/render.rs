// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use memberdesk_app::{
    AccountStatus, AppState, CALENDAR_CELLS, CalendarDay, DateField, DateRange,
    EMPTY_RESULT_MESSAGE, FilterControl, Member, MultiField, Overlay, Preset, SelectorKind,
    VerificationStatus, WEEKDAY_HEADER, calendar_grid, format_month,
};
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table};
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::{Date, Duration, OffsetDateTime, UtcOffset};

use crate::{DatePane, ViewData, enum_choice_labels};

const COLUMNS: [&str; 9] = [
    "Name",
    "Verification Status",
    "Balance",
    "Email address",
    "Mobile number",
    "Domain",
    "Date Registered",
    "Status",
    "Date and Time Last Active",
];
const DAY_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[month repr:short] [day], [year]");
const TIME_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[hour repr:12]:[minute] [period]");
const LOADING_MESSAGE: &str = "Loading members...";

pub(crate) fn render(frame: &mut ratatui::Frame<'_>, state: &AppState, view_data: &ViewData) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(3),
        ])
        .split(frame.area());

    let filter_bar = Paragraph::new(filter_bar_line(state, view_data))
        .block(Block::default().title("filters").borders(Borders::ALL));
    frame.render_widget(filter_bar, layout[0]);

    render_table(frame, layout[1], view_data);

    let footer = Paragraph::new(footer_text(state, view_data))
        .style(Style::default().fg(Color::Yellow))
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(footer, layout[2]);

    match state.overlay {
        Some(Overlay::Help) => {
            let area = centered_rect(70, 60, frame.area());
            frame.render_widget(Clear, area);
            let help = Paragraph::new(help_overlay_text())
                .block(Block::default().title("help").borders(Borders::ALL));
            frame.render_widget(help, area);
        }
        Some(Overlay::Selector(control)) => {
            let (width, height) = match control.selector() {
                SelectorKind::Dates(_) => (72, 60),
                SelectorKind::Multi(_) => (50, 60),
                SelectorKind::Verification | SelectorKind::Status => (36, 40),
            };
            let area = centered_rect(width, height, frame.area());
            frame.render_widget(Clear, area);
            let body = Paragraph::new(selector_overlay_text(control, view_data)).block(
                Block::default()
                    .title(control.label())
                    .borders(Borders::ALL)
                    .style(Style::default().fg(Color::Cyan)),
            );
            frame.render_widget(body, area);
        }
        None => {}
    }
}

fn filter_bar_line(state: &AppState, view_data: &ViewData) -> Line<'static> {
    let mut spans = Vec::with_capacity(FilterControl::ALL.len() * 2);
    for (index, control) in FilterControl::ALL.iter().copied().enumerate() {
        if index > 0 {
            spans.push(Span::raw(" | "));
        }
        let text = control_display_text(control, view_data);
        let active = control_is_active(control, view_data);
        let mut style = if active {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default().fg(Color::Gray)
        };
        if control == state.focus {
            style = style.fg(Color::Black).bg(Color::Cyan).add_modifier(Modifier::BOLD);
        }
        spans.push(Span::styled(text, style));
    }
    Line::from(spans)
}

fn control_display_text(control: FilterControl, view_data: &ViewData) -> String {
    let filters = view_data.members.filters();
    match control.selector() {
        SelectorKind::Multi(field) => view_data.selectors.multi(field).display_text(),
        SelectorKind::Verification => filters
            .verification_status
            .map_or(control.label(), VerificationStatus::label)
            .to_owned(),
        SelectorKind::Status => filters
            .status
            .map_or(control.label(), AccountStatus::label)
            .to_owned(),
        SelectorKind::Dates(field) => view_data.selectors.dates(field).display_text(),
    }
}

fn control_is_active(control: FilterControl, view_data: &ViewData) -> bool {
    let filters = view_data.members.filters();
    match control.selector() {
        SelectorKind::Multi(field) => !filters.values(field).is_empty(),
        SelectorKind::Verification => filters.verification_status.is_some(),
        SelectorKind::Status => filters.status.is_some(),
        SelectorKind::Dates(field) => !filters.dates(field).is_empty(),
    }
}

fn render_table(frame: &mut ratatui::Frame<'_>, area: Rect, view_data: &ViewData) {
    let block = Block::default().title("members").borders(Borders::ALL);
    if let Some(message) = table_message(view_data) {
        let body = Paragraph::new(message)
            .style(Style::default().fg(Color::Gray))
            .block(block);
        frame.render_widget(body, area);
        return;
    }

    let offset = view_data.members.offset();
    let header = Row::new(COLUMNS.iter().map(|label| {
        Cell::from(*label).style(
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )
    }));

    let rows = view_data
        .members
        .rows()
        .iter()
        .enumerate()
        .map(|(index, member)| {
            let row = Row::new(
                member_cells(member, offset)
                    .into_iter()
                    .enumerate()
                    .map(|(column, text)| Cell::from(text).style(cell_style(member, column))),
            );
            if index == view_data.selected_row {
                row.style(Style::default().bg(Color::DarkGray))
            } else {
                row
            }
        });

    let widths = [
        Constraint::Length(18),
        Constraint::Length(19),
        Constraint::Length(9),
        Constraint::Min(24),
        Constraint::Length(14),
        Constraint::Length(14),
        Constraint::Length(15),
        Constraint::Length(11),
        Constraint::Length(25),
    ];
    let table = Table::new(rows, widths)
        .header(header)
        .column_spacing(1)
        .block(block);
    frame.render_widget(table, area);
}

fn table_message(view_data: &ViewData) -> Option<String> {
    let members = &view_data.members;
    if let Some(error) = members.error_message() {
        return Some(format!("{error}\npress r to retry"));
    }
    if members.is_loading() && members.rows().is_empty() {
        return Some(LOADING_MESSAGE.to_owned());
    }
    if members.is_empty_result() {
        return Some(EMPTY_RESULT_MESSAGE.to_owned());
    }
    None
}

fn member_cells(member: &Member, offset: UtcOffset) -> [String; 9] {
    [
        member.name.clone(),
        member.verification_status.label().to_owned(),
        group_thousands(member.deposits_count),
        member.email_address.clone(),
        member.mobile_number.clone(),
        member.domain.clone(),
        format_registered(member.date_time_created, offset),
        member.status.label().to_owned(),
        format_last_active(member.date_time_last_active, offset),
    ]
}

fn cell_style(member: &Member, column: usize) -> Style {
    match column {
        0 => Style::default().fg(Color::Yellow),
        1 => Style::default().fg(match member.verification_status {
            VerificationStatus::Verified => Color::Green,
            VerificationStatus::Unverified => Color::Red,
            VerificationStatus::Pending => Color::LightYellow,
        }),
        7 => Style::default().fg(match member.status {
            AccountStatus::Active => Color::Green,
            AccountStatus::Blacklisted => Color::Red,
            AccountStatus::Suspended => Color::DarkGray,
        }),
        _ => Style::default().fg(Color::Gray),
    }
}

fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, ch) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

fn in_offset(instant: OffsetDateTime, offset: UtcOffset) -> Option<OffsetDateTime> {
    OffsetDateTime::from_unix_timestamp(instant.unix_timestamp())
        .ok()?
        .checked_add(Duration::seconds(i64::from(offset.whole_seconds())))
        .map(|shifted| shifted.replace_offset(offset))
}

fn format_registered(instant: OffsetDateTime, offset: UtcOffset) -> String {
    in_offset(instant, offset)
        .and_then(|local| local.format(DAY_FORMAT).ok())
        .unwrap_or_default()
}

fn format_last_active(instant: OffsetDateTime, offset: UtcOffset) -> String {
    let Some(local) = in_offset(instant, offset) else {
        return String::new();
    };
    match (local.format(DAY_FORMAT), local.format(TIME_FORMAT)) {
        (Ok(day), Ok(time)) => format!("{day} {time}"),
        _ => String::new(),
    }
}

fn footer_text(state: &AppState, view_data: &ViewData) -> String {
    let pagination = view_data.members.pagination().state();
    let mut parts = vec![
        format!("Page {}", pagination.current_page),
        pagination.page_size.label(),
    ];
    if view_data.members.is_loading() {
        parts.push("loading".to_owned());
    }
    if let Some(status) = &state.status_line {
        parts.push(status.clone());
    }
    if state.overlay.is_none() {
        let next = if pagination.can_go_next() { "n next" } else { "n -" };
        let previous = if pagination.can_go_previous() {
            "p prev"
        } else {
            "p -"
        };
        parts.push(format!(
            "tab filter | enter open | {previous} | {next} | s size | x clear | ? help | q quit"
        ));
    }
    parts.join(" | ")
}

fn selector_overlay_text(control: FilterControl, view_data: &ViewData) -> String {
    match control.selector() {
        SelectorKind::Multi(field) => multi_select_overlay_text(view_data, field),
        SelectorKind::Verification | SelectorKind::Status => {
            enum_picker_overlay_text(view_data, control)
        }
        SelectorKind::Dates(field) => date_picker_overlay_text(view_data, field),
    }
}

fn multi_select_overlay_text(view_data: &ViewData, field: MultiField) -> String {
    let select = view_data.selectors.multi(field);
    let search = if select.search().is_empty() {
        select.search_placeholder().to_owned()
    } else {
        format!("{}_", select.search())
    };
    let mut lines = vec![format!("search: {search}"), String::new()];
    let visible = select.visible();
    if visible.is_empty() {
        lines.push("No results found.".to_owned());
    }
    for (index, value) in visible.iter().enumerate() {
        let pointer = if index == select.cursor() { ">" } else { " " };
        let mark = if select.is_selected(value) { "[x]" } else { "[ ]" };
        lines.push(format!("{pointer} {mark} {value}"));
    }
    lines.push(String::new());
    lines.push(format!("selected: {}", select.display_text()));
    lines.push("type search | up/down move | enter toggle | del clear | esc close".to_owned());
    lines.join("\n")
}

fn enum_picker_overlay_text(view_data: &ViewData, control: FilterControl) -> String {
    let mut lines: Vec<String> = enum_choice_labels(view_data, control)
        .into_iter()
        .enumerate()
        .map(|(index, label)| {
            let pointer = if index == view_data.enum_cursor { ">" } else { " " };
            format!("{pointer} {label}")
        })
        .collect();
    lines.push(String::new());
    lines.push("up/down move | enter select | esc close".to_owned());
    lines.join("\n")
}

fn date_picker_overlay_text(view_data: &ViewData, field: DateField) -> String {
    let selector = view_data.selectors.dates(field);
    let picker = &view_data.date_picker;
    let draft = selector.draft();

    let mut lines = Vec::new();
    let presets_marker = if picker.pane == DatePane::Presets { "*" } else { " " };
    lines.push(format!("{presets_marker} presets"));
    for (index, preset) in Preset::ALL.iter().enumerate() {
        let pointer = if picker.pane == DatePane::Presets && index == picker.preset_cursor {
            ">"
        } else {
            " "
        };
        lines.push(format!("  {pointer} {}", preset.label()));
    }
    lines.push(String::new());

    let calendar_marker = if picker.pane == DatePane::Calendar { "*" } else { " " };
    let [left, right] = selector.months();
    lines.push(format!(
        "{calendar_marker} {:<30}{}",
        format_month(left),
        format_month(right)
    ));
    let header: String = WEEKDAY_HEADER.iter().map(|day| format!(" {day} ")).collect();
    lines.push(format!("  {header:<30}{header}"));

    let left_grid = calendar_grid(left);
    let right_grid = calendar_grid(right);
    for week in 0..CALENDAR_CELLS / 7 {
        lines.push(format!(
            "  {:<30}{}",
            week_row(&left_grid, week, view_data, &draft),
            week_row(&right_grid, week, view_data, &draft)
        ));
    }

    lines.push(String::new());
    lines.push(format!("selection: {}", selector.display_text()));
    lines.push(
        "tab pane | up/down or h/j/k/l move | enter pick | [/] month | a apply | c clear | esc cancel"
            .to_owned(),
    );
    lines.join("\n")
}

fn week_row(grid: &[CalendarDay], week: usize, view_data: &ViewData, draft: &DateRange) -> String {
    grid.iter()
        .skip(week * 7)
        .take(7)
        .map(|cell| {
            if cell.in_month {
                day_cell(cell.date, view_data, draft)
            } else {
                "    ".to_owned()
            }
        })
        .collect()
}

/// Four columns per day: `[dd]` cursor, `*dd*` endpoint, `-dd-` inside the
/// range, `(dd)` today.
fn day_cell(day: Date, view_data: &ViewData, draft: &DateRange) -> String {
    let picker = &view_data.date_picker;
    let (open, close) = if picker.pane == DatePane::Calendar && picker.day_cursor == day {
        ('[', ']')
    } else if draft.start == Some(day) || draft.end == Some(day) {
        ('*', '*')
    } else if draft.contains(day) {
        ('-', '-')
    } else if day == view_data.today {
        ('(', ')')
    } else {
        (' ', ' ')
    };
    format!("{open}{:>2}{close}", day.day())
}

fn help_overlay_text() -> String {
    [
        "global: ctrl+q/ctrl+c quit | q quit | ? help",
        "filters: tab/shift+tab or left/right focus | enter open selector | x clear all",
        "table: j/k row | n/pgdn next page | p/pgup previous page | s page size | r retry",
        "multi select: type search | up/down move | enter toggle | del clear | esc close",
        "status pickers: up/down move | enter select | esc close",
        "date range: tab presets/calendar | h/j/k/l move | enter pick | [/] month | a apply | c clear | esc cancel",
    ]
    .join("\n")
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
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
        .split(popup_layout[1])[1]
}
