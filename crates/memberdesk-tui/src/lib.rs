// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

mod render;

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use crossterm::{execute, terminal};
use memberdesk_app::{
    AccountStatus, AppCommand, AppState, DateField, DateRange, DateRangeSelector, Debounce,
    FetchOutcome, FetchPlan, FilterControl, FilterOptions, FilterUpdate, MembersPage, MembersView,
    MultiField, MultiSelect, Overlay, PageSize, Preset, QueryVariables, RequestToken,
    SelectorKind, VerificationStatus, shift_months,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use std::io;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::{Duration, Instant};
use time::{Date, UtcOffset};

use crate::render::render;

pub trait AppRuntime {
    fn load_members(&mut self, variables: &QueryVariables) -> Result<MembersPage>;
    fn load_filter_options(&mut self) -> Result<FilterOptions>;
    fn spawn_members_fetch(&mut self, plan: FetchPlan, tx: Sender<InternalEvent>) -> Result<()> {
        let result = self
            .load_members(&plan.variables)
            .map_err(|error| format!("{error:#}"));
        tx.send(InternalEvent::MembersLoaded {
            token: plan.token,
            result,
        })
        .map_err(|_| anyhow::anyhow!("members event channel closed"))?;
        Ok(())
    }
    fn spawn_filter_options(&mut self, tx: Sender<InternalEvent>) -> Result<()> {
        let result = self
            .load_filter_options()
            .map_err(|error| format!("{error:#}"));
        tx.send(InternalEvent::FilterOptionsLoaded(result))
            .map_err(|_| anyhow::anyhow!("filter options event channel closed"))?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InternalEvent {
    ClearStatus {
        token: u64,
    },
    MembersLoaded {
        token: RequestToken,
        result: Result<MembersPage, String>,
    },
    FilterOptionsLoaded(Result<FilterOptions, String>),
    FilterChanged(FilterUpdate),
}

/// Startup settings for the members screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UiOptions {
    pub page_size: PageSize,
    pub debounce: Duration,
    pub today: Date,
    pub offset: UtcOffset,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum DatePane {
    #[default]
    Presets,
    Calendar,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct DatePickerUiState {
    pane: DatePane,
    preset_cursor: usize,
    day_cursor: Date,
}

struct Selectors {
    names: MultiSelect,
    emails: MultiSelect,
    mobiles: MultiSelect,
    domains: MultiSelect,
    registered: DateRangeSelector,
    last_active: DateRangeSelector,
}

impl Selectors {
    fn new(today: Date, offset: UtcOffset, tx: &Sender<InternalEvent>) -> Self {
        Self {
            names: multi_select(FilterControl::Name, MultiField::Names, tx),
            emails: multi_select(FilterControl::EmailAddress, MultiField::Emails, tx),
            mobiles: multi_select(FilterControl::MobileNumber, MultiField::Mobiles, tx),
            domains: multi_select(FilterControl::Domain, MultiField::Domains, tx),
            registered: date_selector(
                FilterControl::DateRegistered,
                DateField::Registered,
                today,
                offset,
                tx,
            ),
            last_active: date_selector(
                FilterControl::DateLastActive,
                DateField::LastActive,
                today,
                offset,
                tx,
            ),
        }
    }

    fn multi(&self, field: MultiField) -> &MultiSelect {
        match field {
            MultiField::Names => &self.names,
            MultiField::Emails => &self.emails,
            MultiField::Mobiles => &self.mobiles,
            MultiField::Domains => &self.domains,
        }
    }

    fn multi_mut(&mut self, field: MultiField) -> &mut MultiSelect {
        match field {
            MultiField::Names => &mut self.names,
            MultiField::Emails => &mut self.emails,
            MultiField::Mobiles => &mut self.mobiles,
            MultiField::Domains => &mut self.domains,
        }
    }

    fn dates(&self, field: DateField) -> &DateRangeSelector {
        match field {
            DateField::Registered => &self.registered,
            DateField::LastActive => &self.last_active,
        }
    }

    fn dates_mut(&mut self, field: DateField) -> &mut DateRangeSelector {
        match field {
            DateField::Registered => &mut self.registered,
            DateField::LastActive => &mut self.last_active,
        }
    }

    fn set_options(&mut self, options: &FilterOptions) {
        self.names.set_candidates(options.names.clone());
        self.emails.set_candidates(options.email_addresses.clone());
        self.mobiles.set_candidates(options.mobile_numbers.clone());
        self.domains.set_candidates(options.domains.clone());
    }

    fn clear_all(&mut self) {
        for field in [
            MultiField::Names,
            MultiField::Emails,
            MultiField::Mobiles,
            MultiField::Domains,
        ] {
            self.multi_mut(field).clear();
        }
        self.registered.clear();
        self.last_active.clear();
    }
}

fn multi_select(control: FilterControl, field: MultiField, tx: &Sender<InternalEvent>) -> MultiSelect {
    let mut select =
        MultiSelect::new(control.label()).with_search_placeholder(control.search_placeholder());
    let sender = tx.clone();
    select.on_change(move |values: &[String]| {
        let _ = sender.send(InternalEvent::FilterChanged(FilterUpdate::Values(
            field,
            values.to_vec(),
        )));
    });
    select
}

fn date_selector(
    control: FilterControl,
    field: DateField,
    today: Date,
    offset: UtcOffset,
    tx: &Sender<InternalEvent>,
) -> DateRangeSelector {
    let mut selector = DateRangeSelector::new(control.label(), today, offset);
    let sender = tx.clone();
    selector.on_range(move |start, end| {
        let _ = sender.send(InternalEvent::FilterChanged(FilterUpdate::Dates(
            field,
            DateRange::new(start, end),
        )));
    });
    selector.on_iso_range(move |start, end| {
        tracing::debug!(
            ?field,
            start = start.as_deref().unwrap_or("-"),
            end = end.as_deref().unwrap_or("-"),
            "date range applied"
        );
    });
    selector
}

struct ViewData {
    members: MembersView,
    selectors: Selectors,
    enum_cursor: usize,
    date_picker: DatePickerUiState,
    debounce: Debounce,
    selected_row: usize,
    status_token: u64,
    today: Date,
}

impl ViewData {
    fn new(options: UiOptions, tx: &Sender<InternalEvent>) -> Self {
        Self {
            members: MembersView::new(options.page_size, options.offset),
            selectors: Selectors::new(options.today, options.offset, tx),
            enum_cursor: 0,
            date_picker: DatePickerUiState {
                pane: DatePane::Presets,
                preset_cursor: 0,
                day_cursor: options.today,
            },
            debounce: Debounce::new(options.debounce),
            selected_row: 0,
            status_token: 0,
            today: options.today,
        }
    }
}

pub fn run_app<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    options: UiOptions,
) -> Result<()> {
    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, terminal::EnterAlternateScreen).context("enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("create terminal")?;

    let (internal_tx, internal_rx) = mpsc::channel();
    let mut view_data = ViewData::new(options, &internal_tx);
    start_initial_load(state, runtime, &mut view_data, &internal_tx);

    let mut result = Ok(());
    loop {
        process_internal_events(state, &mut view_data, &internal_tx, &internal_rx);
        flush_debounced_filters(state, runtime, &mut view_data, &internal_tx, Instant::now());

        if let Err(error) = terminal.draw(|frame| render(frame, state, &view_data)) {
            result = Err(error).context("draw frame");
            break;
        }

        let has_event = event::poll(Duration::from_millis(120)).context("poll event")?;
        if has_event {
            match event::read().context("read event")? {
                Event::Key(key) => {
                    if handle_key_event(state, runtime, &mut view_data, &internal_tx, key) {
                        break;
                    }
                }
                Event::Resize(_, _) => {}
                _ => {}
            }
        }
    }

    disable_raw_mode().context("disable raw mode")?;
    execute!(io::stdout(), terminal::LeaveAlternateScreen).context("leave alternate screen")?;
    result
}

fn start_initial_load<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
) {
    if let Err(error) = runtime.spawn_filter_options(internal_tx.clone()) {
        tracing::warn!("filter options request failed to start: {error:#}");
    }
    let plan = view_data.members.reset();
    start_fetch(state, runtime, view_data, internal_tx, plan);
}

fn start_fetch<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    plan: FetchPlan,
) {
    tracing::debug!(
        token = plan.token.get(),
        first = plan.variables.first,
        after = plan.variables.after.as_deref().unwrap_or("-"),
        "requesting members page"
    );
    let token = plan.token;
    if let Err(error) = runtime.spawn_members_fetch(plan, internal_tx.clone()) {
        view_data.members.complete(token, Err(error));
        emit_status(state, view_data, internal_tx, "members request failed to start");
    }
}

fn process_internal_events(
    state: &mut AppState,
    view_data: &mut ViewData,
    tx: &Sender<InternalEvent>,
    rx: &Receiver<InternalEvent>,
) {
    while let Ok(event) = rx.try_recv() {
        match event {
            InternalEvent::ClearStatus { token } if token == view_data.status_token => {
                state.dispatch(AppCommand::ClearStatus);
            }
            InternalEvent::ClearStatus { .. } => {}
            InternalEvent::MembersLoaded { token, result } => {
                let outcome = view_data
                    .members
                    .complete(token, result.map_err(anyhow::Error::msg));
                match outcome {
                    FetchOutcome::Applied => {
                        let rows = view_data.members.rows().len();
                        view_data.selected_row = view_data.selected_row.min(rows.saturating_sub(1));
                    }
                    FetchOutcome::Failed => {
                        view_data.selected_row = 0;
                        emit_status(state, view_data, tx, "members fetch failed; press r to retry");
                    }
                    FetchOutcome::Stale => {}
                }
            }
            InternalEvent::FilterOptionsLoaded(Ok(options)) => {
                view_data.selectors.set_options(&options);
                view_data.members.set_options(options);
            }
            InternalEvent::FilterOptionsLoaded(Err(error)) => {
                tracing::warn!("filter options unavailable: {error}");
                emit_status(state, view_data, tx, "filter options unavailable");
            }
            InternalEvent::FilterChanged(update) => {
                if view_data.members.update_filters(update) {
                    view_data.debounce.mark(Instant::now());
                }
            }
        }
    }
}

/// Runs the pending page-one reload once filter edits have settled.
fn flush_debounced_filters<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    now: Instant,
) {
    if !view_data.debounce.fire(now) {
        return;
    }
    let Some(plan) = view_data.members.flush_filters() else {
        tracing::debug!("filter edits cancelled out, keeping current page");
        return;
    };
    view_data.selected_row = 0;
    start_fetch(state, runtime, view_data, internal_tx, plan);
}

fn schedule_status_clear(internal_tx: &Sender<InternalEvent>, token: u64) {
    let sender = internal_tx.clone();
    thread::spawn(move || {
        thread::sleep(Duration::from_secs(4));
        let _ = sender.send(InternalEvent::ClearStatus { token });
    });
}

fn emit_status(
    state: &mut AppState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    message: impl Into<String>,
) {
    state.dispatch(AppCommand::SetStatus(message.into()));
    view_data.status_token = view_data.status_token.saturating_add(1);
    schedule_status_clear(internal_tx, view_data.status_token);
}

fn handle_key_event<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) -> bool {
    if matches!(key.code, KeyCode::Char('q') | KeyCode::Char('c'))
        && key.modifiers.contains(KeyModifiers::CONTROL)
    {
        return true;
    }

    match state.overlay {
        Some(Overlay::Help) => {
            if matches!(key.code, KeyCode::Esc | KeyCode::Char('?')) {
                state.dispatch(AppCommand::ToggleHelp);
            }
            return false;
        }
        Some(Overlay::Selector(control)) => {
            match control.selector() {
                SelectorKind::Multi(field) => handle_multi_select_key(state, view_data, field, key),
                SelectorKind::Verification | SelectorKind::Status => {
                    handle_enum_picker_key(state, view_data, control, key);
                }
                SelectorKind::Dates(field) => handle_date_picker_key(state, view_data, field, key),
            }
            return false;
        }
        None => {}
    }

    match key.code {
        KeyCode::Char('q') => return true,
        KeyCode::Char('?') => {
            state.dispatch(AppCommand::ToggleHelp);
        }
        KeyCode::Tab | KeyCode::Right => {
            state.dispatch(AppCommand::FocusNext);
        }
        KeyCode::BackTab | KeyCode::Left => {
            state.dispatch(AppCommand::FocusPrev);
        }
        KeyCode::Enter => open_selector(state, view_data),
        KeyCode::Down | KeyCode::Char('j') => {
            let rows = view_data.members.rows().len();
            if rows > 0 {
                view_data.selected_row = (view_data.selected_row + 1).min(rows - 1);
            }
        }
        KeyCode::Up | KeyCode::Char('k') => {
            view_data.selected_row = view_data.selected_row.saturating_sub(1);
        }
        KeyCode::Char('n') | KeyCode::PageDown => {
            if view_data.members.is_loading() {
                emit_status(state, view_data, internal_tx, "page load in progress");
            } else if let Some(plan) = view_data.members.next_page() {
                view_data.selected_row = 0;
                start_fetch(state, runtime, view_data, internal_tx, plan);
            } else {
                emit_status(state, view_data, internal_tx, "no next page");
            }
        }
        KeyCode::Char('p') | KeyCode::PageUp => {
            if view_data.members.is_loading() {
                emit_status(state, view_data, internal_tx, "page load in progress");
            } else if let Some(plan) = view_data.members.previous_page() {
                view_data.selected_row = 0;
                start_fetch(state, runtime, view_data, internal_tx, plan);
            } else {
                emit_status(state, view_data, internal_tx, "already on first page");
            }
        }
        KeyCode::Char('r') => {
            let plan = view_data.members.retry();
            start_fetch(state, runtime, view_data, internal_tx, plan);
        }
        KeyCode::Char('s') => {
            let next = view_data.members.pagination().state().page_size.cycle();
            if let Some(plan) = view_data.members.set_page_size(next) {
                view_data.selected_row = 0;
                emit_status(state, view_data, internal_tx, next.label());
                start_fetch(state, runtime, view_data, internal_tx, plan);
            }
        }
        KeyCode::Char('x') => {
            view_data.selectors.clear_all();
            view_data.debounce.cancel();
            if let Some(plan) = view_data.members.clear_filters() {
                view_data.selected_row = 0;
                emit_status(state, view_data, internal_tx, "filters cleared");
                start_fetch(state, runtime, view_data, internal_tx, plan);
            }
        }
        _ => {}
    }
    false
}

fn open_selector(state: &mut AppState, view_data: &mut ViewData) {
    let control = state.focus;
    match control.selector() {
        SelectorKind::Multi(_) => {}
        SelectorKind::Verification => {
            let current = view_data.members.filters().verification_status;
            view_data.enum_cursor = verification_choices(view_data)
                .iter()
                .position(|choice| *choice == current)
                .unwrap_or(0);
        }
        SelectorKind::Status => {
            let current = view_data.members.filters().status;
            view_data.enum_cursor = status_choices(view_data)
                .iter()
                .position(|choice| *choice == current)
                .unwrap_or(0);
        }
        SelectorKind::Dates(field) => {
            let selector = view_data.selectors.dates(field);
            let [first, _] = selector.months();
            let cursor = selector
                .draft()
                .start
                .filter(|day| is_visible_day(selector, *day))
                .or_else(|| Some(view_data.today).filter(|day| is_visible_day(selector, *day)))
                .unwrap_or(first);
            view_data.date_picker = DatePickerUiState {
                pane: DatePane::Presets,
                preset_cursor: 0,
                day_cursor: cursor,
            };
        }
    }
    state.dispatch(AppCommand::OpenSelector);
}

fn handle_multi_select_key(
    state: &mut AppState,
    view_data: &mut ViewData,
    field: MultiField,
    key: KeyEvent,
) {
    let select = view_data.selectors.multi_mut(field);
    match key.code {
        KeyCode::Esc => {
            state.dispatch(AppCommand::CloseOverlay);
        }
        KeyCode::Enter => {
            select.toggle_at_cursor();
        }
        KeyCode::Delete => select.clear(),
        KeyCode::Up => select.move_cursor(-1),
        KeyCode::Down => select.move_cursor(1),
        KeyCode::Backspace => select.pop_search(),
        KeyCode::Char(ch) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            select.push_search(ch);
        }
        _ => {}
    }
}

fn verification_choices(view_data: &ViewData) -> Vec<Option<VerificationStatus>> {
    let available = &view_data.members.options().verification_statuses;
    let values: &[VerificationStatus] = if available.is_empty() {
        &VerificationStatus::ALL
    } else {
        available
    };
    std::iter::once(None)
        .chain(values.iter().copied().map(Some))
        .collect()
}

fn status_choices(view_data: &ViewData) -> Vec<Option<AccountStatus>> {
    let available = &view_data.members.options().statuses;
    let values: &[AccountStatus] = if available.is_empty() {
        &AccountStatus::ALL
    } else {
        available
    };
    std::iter::once(None)
        .chain(values.iter().copied().map(Some))
        .collect()
}

fn enum_choice_labels(view_data: &ViewData, control: FilterControl) -> Vec<&'static str> {
    match control.selector() {
        SelectorKind::Verification => verification_choices(view_data)
            .into_iter()
            .map(|choice| choice.map_or("All", VerificationStatus::label))
            .collect(),
        SelectorKind::Status => status_choices(view_data)
            .into_iter()
            .map(|choice| choice.map_or("All", AccountStatus::label))
            .collect(),
        SelectorKind::Multi(_) | SelectorKind::Dates(_) => Vec::new(),
    }
}

fn handle_enum_picker_key(
    state: &mut AppState,
    view_data: &mut ViewData,
    control: FilterControl,
    key: KeyEvent,
) {
    let len = enum_choice_labels(view_data, control).len();
    match key.code {
        KeyCode::Esc => {
            state.dispatch(AppCommand::CloseOverlay);
        }
        KeyCode::Up | KeyCode::Char('k') => {
            view_data.enum_cursor = view_data.enum_cursor.saturating_sub(1);
        }
        KeyCode::Down | KeyCode::Char('j') => {
            view_data.enum_cursor = (view_data.enum_cursor + 1).min(len.saturating_sub(1));
        }
        KeyCode::Enter => {
            let update = match control.selector() {
                SelectorKind::Verification => verification_choices(view_data)
                    .get(view_data.enum_cursor)
                    .copied()
                    .map(FilterUpdate::VerificationStatus),
                SelectorKind::Status => status_choices(view_data)
                    .get(view_data.enum_cursor)
                    .copied()
                    .map(FilterUpdate::Status),
                SelectorKind::Multi(_) | SelectorKind::Dates(_) => None,
            };
            if let Some(update) = update
                && view_data.members.update_filters(update)
            {
                view_data.debounce.mark(Instant::now());
            }
            state.dispatch(AppCommand::CloseOverlay);
        }
        _ => {}
    }
}

fn handle_date_picker_key(
    state: &mut AppState,
    view_data: &mut ViewData,
    field: DateField,
    key: KeyEvent,
) {
    let today = view_data.today;
    let picker = &mut view_data.date_picker;
    let selector = view_data.selectors.dates_mut(field);

    match key.code {
        KeyCode::Esc => {
            selector.cancel();
            state.dispatch(AppCommand::CloseOverlay);
            return;
        }
        KeyCode::Char('a') => {
            selector.apply();
            state.dispatch(AppCommand::CloseOverlay);
            return;
        }
        KeyCode::Char('c') => {
            selector.clear();
            state.dispatch(AppCommand::CloseOverlay);
            return;
        }
        KeyCode::Tab => {
            picker.pane = match picker.pane {
                DatePane::Presets => DatePane::Calendar,
                DatePane::Calendar => DatePane::Presets,
            };
            return;
        }
        KeyCode::Char('[') => {
            selector.navigate(-1);
            picker.day_cursor = selector.anchor();
            return;
        }
        KeyCode::Char(']') => {
            selector.navigate(1);
            picker.day_cursor = selector.anchor();
            return;
        }
        _ => {}
    }

    match picker.pane {
        DatePane::Presets => match key.code {
            KeyCode::Up | KeyCode::Char('k') => {
                picker.preset_cursor = picker.preset_cursor.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                picker.preset_cursor = (picker.preset_cursor + 1).min(Preset::ALL.len() - 1);
            }
            KeyCode::Enter => {
                if let Some(preset) = Preset::ALL.get(picker.preset_cursor).copied() {
                    selector.choose_preset(preset, today);
                    if let Some(start) = selector.draft().start {
                        picker.day_cursor = start;
                    }
                }
            }
            _ => {}
        },
        DatePane::Calendar => {
            let delta = match key.code {
                KeyCode::Left | KeyCode::Char('h') => Some(-1),
                KeyCode::Right | KeyCode::Char('l') => Some(1),
                KeyCode::Up | KeyCode::Char('k') => Some(-7),
                KeyCode::Down | KeyCode::Char('j') => Some(7),
                _ => None,
            };
            if let Some(delta) = delta {
                if let Some(day) = picker
                    .day_cursor
                    .checked_add(time::Duration::days(delta))
                {
                    picker.day_cursor = day;
                    keep_day_visible(selector, day);
                }
                return;
            }
            if key.code == KeyCode::Enter && is_visible_day(selector, picker.day_cursor) {
                selector.click_day(picker.day_cursor);
            }
        }
    }
}

fn is_visible_day(selector: &DateRangeSelector, day: Date) -> bool {
    let [first, second] = selector.months();
    let after_last = shift_months(second, 1);
    day >= first && after_last.is_none_or(|end| day < end)
}

fn keep_day_visible(selector: &mut DateRangeSelector, day: Date) {
    let [first, _] = selector.months();
    if day < first {
        selector.navigate(-1);
    } else if !is_visible_day(selector, day) {
        selector.navigate(1);
    }
}

#[cfg(test)]
mod tests {
    use super::{
        AppRuntime, DatePane, InternalEvent, UiOptions, ViewData, flush_debounced_filters,
        handle_key_event, process_internal_events, start_initial_load,
    };
    use anyhow::anyhow;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use memberdesk_app::{
        AccountStatus, AppState, FETCH_FAILED_MESSAGE, FilterControl, FilterOptions, MembersPage,
        Overlay, PageInfo, PageSize, QueryVariables, RequestToken,
    };
    use memberdesk_testkit::{MemberFaker, fixture_date};
    use serde_json::json;
    use std::collections::VecDeque;
    use std::sync::mpsc;
    use std::time::{Duration, Instant};
    use time::UtcOffset;

    #[derive(Debug, Default)]
    struct TestRuntime {
        requests: Vec<QueryVariables>,
        responses: VecDeque<anyhow::Result<MembersPage>>,
        options: FilterOptions,
        fail_options: bool,
    }

    impl TestRuntime {
        fn with_pages(pages: Vec<MembersPage>) -> Self {
            Self {
                responses: pages.into_iter().map(Ok).collect(),
                ..Self::default()
            }
        }
    }

    impl AppRuntime for TestRuntime {
        fn load_members(&mut self, variables: &QueryVariables) -> anyhow::Result<MembersPage> {
            self.requests.push(variables.clone());
            self.responses
                .pop_front()
                .unwrap_or_else(|| Ok(MembersPage::default()))
        }

        fn load_filter_options(&mut self) -> anyhow::Result<FilterOptions> {
            if self.fail_options {
                return Err(anyhow!("options endpoint down"));
            }
            Ok(self.options.clone())
        }
    }

    fn page(count: usize, has_next_page: bool, end_cursor: Option<&str>) -> MembersPage {
        MembersPage {
            members: MemberFaker::new(count as u64 + 1).members(count),
            page_info: PageInfo {
                has_next_page,
                end_cursor: end_cursor.map(str::to_owned),
            },
        }
    }

    fn options() -> UiOptions {
        UiOptions {
            page_size: PageSize::Ten,
            debounce: Duration::from_millis(300),
            today: fixture_date(),
            offset: UtcOffset::UTC,
        }
    }

    struct Harness {
        state: AppState,
        runtime: TestRuntime,
        view_data: ViewData,
        tx: mpsc::Sender<InternalEvent>,
        rx: mpsc::Receiver<InternalEvent>,
    }

    impl Harness {
        fn start(runtime: TestRuntime) -> Self {
            let (tx, rx) = mpsc::channel();
            let mut harness = Self {
                state: AppState::default(),
                runtime,
                view_data: ViewData::new(options(), &tx),
                tx,
                rx,
            };
            start_initial_load(
                &mut harness.state,
                &mut harness.runtime,
                &mut harness.view_data,
                &harness.tx,
            );
            harness.pump();
            harness
        }

        fn pump(&mut self) {
            process_internal_events(&mut self.state, &mut self.view_data, &self.tx, &self.rx);
        }

        fn press(&mut self, code: KeyCode) -> bool {
            let quit = handle_key_event(
                &mut self.state,
                &mut self.runtime,
                &mut self.view_data,
                &self.tx,
                KeyEvent::new(code, KeyModifiers::NONE),
            );
            self.pump();
            quit
        }

        fn type_text(&mut self, text: &str) {
            for ch in text.chars() {
                self.press(KeyCode::Char(ch));
            }
        }

        fn settle(&mut self) {
            flush_debounced_filters(
                &mut self.state,
                &mut self.runtime,
                &mut self.view_data,
                &self.tx,
                Instant::now() + Duration::from_secs(1),
            );
            self.pump();
        }

        fn focus(&mut self, control: FilterControl) {
            while self.state.focus != control {
                self.press(KeyCode::Tab);
            }
        }

        fn last_request(&self) -> serde_json::Value {
            let variables = self.runtime.requests.last().expect("a request was made");
            serde_json::to_value(variables).expect("variables serialize")
        }
    }

    #[test]
    fn initial_load_fetches_first_page_with_empty_filter() {
        let harness = Harness::start(TestRuntime::with_pages(vec![page(3, false, None)]));
        assert_eq!(harness.runtime.requests.len(), 1);
        assert_eq!(
            harness.last_request(),
            json!({"first": 10, "after": null, "filter": {}})
        );
        assert_eq!(harness.view_data.members.rows().len(), 3);
    }

    #[test]
    fn next_and_previous_follow_cursor_history() {
        let mut harness = Harness::start(TestRuntime::with_pages(vec![
            page(2, true, Some("c1")),
            page(2, true, Some("c2")),
            page(2, true, Some("c3")),
            page(2, true, Some("c2")),
        ]));

        harness.press(KeyCode::Char('n'));
        assert_eq!(harness.last_request()["after"], "c1");
        harness.press(KeyCode::Char('n'));
        assert_eq!(harness.last_request()["after"], "c2");
        assert_eq!(
            harness.view_data.members.pagination().state().current_page,
            3
        );

        harness.press(KeyCode::Char('p'));
        assert_eq!(harness.last_request()["after"], "c1");
        assert_eq!(
            harness.view_data.members.pagination().state().current_page,
            2
        );

        harness.press(KeyCode::Char('p'));
        assert_eq!(harness.last_request()["after"], serde_json::Value::Null);
        assert_eq!(harness.runtime.requests.len(), 5);
    }

    #[test]
    fn next_without_more_pages_reports_status() {
        let mut harness = Harness::start(TestRuntime::with_pages(vec![page(1, false, None)]));
        harness.press(KeyCode::Char('n'));
        assert_eq!(harness.runtime.requests.len(), 1);
        assert_eq!(harness.state.status_line.as_deref(), Some("no next page"));
    }

    #[test]
    fn multi_select_changes_are_debounced_into_one_reset() {
        let mut runtime = TestRuntime::with_pages(vec![page(2, true, Some("c1"))]);
        runtime.options = FilterOptions {
            domains: vec![
                "a.test".to_owned(),
                "b.test".to_owned(),
                "c.test".to_owned(),
            ],
            ..FilterOptions::default()
        };
        let mut harness = Harness::start(runtime);
        harness.press(KeyCode::Char('n'));
        assert_eq!(
            harness.view_data.members.pagination().state().current_page,
            2
        );

        harness.focus(FilterControl::Domain);
        harness.press(KeyCode::Enter);
        assert_eq!(
            harness.state.overlay,
            Some(Overlay::Selector(FilterControl::Domain))
        );
        harness.press(KeyCode::Enter);
        harness.press(KeyCode::Down);
        harness.press(KeyCode::Enter);
        harness.press(KeyCode::Esc);
        assert_eq!(harness.state.overlay, None);
        assert_eq!(harness.runtime.requests.len(), 2, "no fetch before settling");

        harness.settle();
        assert_eq!(harness.runtime.requests.len(), 3);
        assert_eq!(
            harness.last_request(),
            json!({
                "first": 10,
                "after": null,
                "filter": {"domain": {"in": ["a.test", "b.test"]}},
            })
        );
        let state = harness.view_data.members.pagination().state();
        assert_eq!(state.current_page, 1);
        assert!(state.cursor_history.is_empty());

        harness.settle();
        assert_eq!(harness.runtime.requests.len(), 3);
    }

    fn domain_runtime(pages: Vec<MembersPage>) -> TestRuntime {
        let mut runtime = TestRuntime::with_pages(pages);
        runtime.options = FilterOptions {
            domains: vec!["a.test".to_owned(), "b.test".to_owned()],
            ..FilterOptions::default()
        };
        runtime
    }

    #[test]
    fn paging_before_settle_keeps_cursor_with_its_filter() {
        let mut harness = Harness::start(domain_runtime(vec![
            page(2, true, Some("c1")),
            page(2, true, Some("c2")),
        ]));

        harness.focus(FilterControl::Domain);
        harness.press(KeyCode::Enter);
        harness.press(KeyCode::Enter);
        harness.press(KeyCode::Esc);
        harness.press(KeyCode::Char('n'));

        let paged = harness.last_request();
        assert_eq!(paged["after"], "c1");
        assert_eq!(paged["filter"], json!({}));

        harness.settle();
        let filtered = harness.last_request();
        assert_eq!(filtered["after"], serde_json::Value::Null);
        assert_eq!(filtered["filter"], json!({"domain": {"equal": "a.test"}}));
        for request in &harness.runtime.requests {
            let value = serde_json::to_value(request).expect("variables serialize");
            assert!(
                !(value["after"] == "c1" && value["filter"] != json!({})),
                "cursor from the unfiltered set sent with a filter: {value}"
            );
        }
        assert_eq!(
            harness.view_data.members.pagination().state().current_page,
            1
        );
    }

    #[test]
    fn toggling_a_value_on_and_off_keeps_the_current_page() {
        let mut harness = Harness::start(domain_runtime(vec![page(2, true, Some("c1"))]));
        harness.press(KeyCode::Char('n'));
        assert_eq!(harness.runtime.requests.len(), 2);

        harness.focus(FilterControl::Domain);
        harness.press(KeyCode::Enter);
        harness.press(KeyCode::Enter);
        harness.press(KeyCode::Enter);
        harness.press(KeyCode::Esc);
        harness.settle();

        assert_eq!(harness.runtime.requests.len(), 2);
        assert_eq!(
            harness.view_data.members.pagination().state().current_page,
            2
        );
    }

    #[test]
    fn multi_select_search_filters_candidates() {
        let mut runtime = TestRuntime::default();
        runtime.options = FilterOptions {
            names: vec!["Ada Hill".to_owned(), "Bob Reed".to_owned()],
            ..FilterOptions::default()
        };
        let mut harness = Harness::start(runtime);

        harness.press(KeyCode::Enter);
        harness.type_text("reed");
        harness.press(KeyCode::Enter);
        harness.press(KeyCode::Esc);
        harness.settle();

        assert_eq!(
            harness.last_request()["filter"],
            json!({"name": {"equal": "Bob Reed"}})
        );
    }

    #[test]
    fn status_picker_selects_single_value() {
        let mut harness = Harness::start(TestRuntime::default());
        harness.focus(FilterControl::Status);
        harness.press(KeyCode::Enter);
        harness.press(KeyCode::Down);
        harness.press(KeyCode::Down);
        harness.press(KeyCode::Enter);
        assert_eq!(harness.state.overlay, None);
        assert_eq!(
            harness.view_data.members.filters().status,
            Some(AccountStatus::Blacklisted)
        );

        harness.settle();
        assert_eq!(
            harness.last_request()["filter"],
            json!({"status": {"equal": "BLACKLISTED"}})
        );
    }

    #[test]
    fn date_preset_applies_on_apply_only() {
        let mut harness = Harness::start(TestRuntime::default());
        harness.focus(FilterControl::DateRegistered);
        harness.press(KeyCode::Enter);
        assert_eq!(harness.view_data.date_picker.pane, DatePane::Presets);

        harness.press(KeyCode::Enter);
        harness.settle();
        assert_eq!(harness.runtime.requests.len(), 1, "draft must not fetch");

        harness.press(KeyCode::Char('a'));
        harness.settle();
        assert_eq!(
            harness.last_request()["filter"],
            json!({"dateTimeCreated": {
                "greaterThanOrEqual": "2026-10-21T00:00:00Z",
                "lesserThanOrEqual": "2026-10-21T00:00:00Z",
            }})
        );
    }

    #[test]
    fn calendar_clicks_build_range_and_escape_cancels() {
        let mut harness = Harness::start(TestRuntime::default());
        harness.focus(FilterControl::DateLastActive);
        harness.press(KeyCode::Enter);
        harness.press(KeyCode::Tab);
        assert_eq!(harness.view_data.date_picker.pane, DatePane::Calendar);

        harness.press(KeyCode::Enter);
        harness.press(KeyCode::Char('h'));
        harness.press(KeyCode::Char('h'));
        harness.press(KeyCode::Enter);
        harness.press(KeyCode::Esc);
        harness.settle();
        assert_eq!(harness.runtime.requests.len(), 1);
        assert!(harness.view_data.members.filters().is_empty());

        harness.press(KeyCode::Enter);
        harness.press(KeyCode::Tab);
        harness.press(KeyCode::Enter);
        harness.press(KeyCode::Char('j'));
        harness.press(KeyCode::Enter);
        harness.press(KeyCode::Char('a'));
        harness.settle();
        assert_eq!(
            harness.last_request()["filter"],
            json!({"dateTimeLastActive": {
                "greaterThanOrEqual": "2026-10-21T00:00:00Z",
                "lesserThanOrEqual": "2026-10-28T00:00:00Z",
            }})
        );
    }

    #[test]
    fn failure_shows_error_and_retry_reuses_cursor() {
        let mut runtime = TestRuntime::with_pages(vec![page(2, true, Some("c1"))]);
        runtime.responses.push_back(Err(anyhow!("503 upstream")));
        let mut harness = Harness::start(runtime);

        harness.press(KeyCode::Char('n'));
        assert_eq!(
            harness.view_data.members.error_message(),
            Some(FETCH_FAILED_MESSAGE)
        );

        harness.press(KeyCode::Char('r'));
        assert_eq!(harness.last_request()["after"], "c1");
        assert_eq!(harness.view_data.members.error_message(), None);
    }

    #[test]
    fn page_size_key_cycles_and_resets() {
        let mut harness = Harness::start(TestRuntime::with_pages(vec![page(2, true, Some("c1"))]));
        harness.press(KeyCode::Char('n'));
        harness.press(KeyCode::Char('s'));
        assert_eq!(harness.last_request()["first"], 25);
        assert_eq!(harness.last_request()["after"], serde_json::Value::Null);
        assert_eq!(harness.state.status_line.as_deref(), Some("25 Entries"));
    }

    #[test]
    fn clear_key_resets_filters_immediately() {
        let mut harness = Harness::start(TestRuntime::default());
        harness.focus(FilterControl::VerificationStatus);
        harness.press(KeyCode::Enter);
        harness.press(KeyCode::Down);
        harness.press(KeyCode::Enter);
        harness.settle();
        assert_eq!(harness.runtime.requests.len(), 2);

        harness.press(KeyCode::Char('x'));
        assert_eq!(harness.runtime.requests.len(), 3);
        assert_eq!(harness.last_request()["filter"], json!({}));
        harness.settle();
        assert_eq!(harness.runtime.requests.len(), 3);
    }

    #[test]
    fn stale_members_events_are_ignored() {
        let mut harness = Harness::start(TestRuntime::with_pages(vec![page(4, false, None)]));
        harness
            .tx
            .send(InternalEvent::MembersLoaded {
                token: RequestToken::new(0),
                result: Ok(MembersPage::default()),
            })
            .expect("channel open");
        harness.pump();
        assert_eq!(harness.view_data.members.rows().len(), 4);
    }

    #[test]
    fn filter_options_failure_keeps_table_working() {
        let runtime = TestRuntime {
            fail_options: true,
            ..TestRuntime::with_pages(vec![page(2, false, None)])
        };
        let harness = Harness::start(runtime);
        assert_eq!(harness.view_data.members.rows().len(), 2);
        assert!(harness.view_data.selectors.names.candidates().is_empty());
        assert_eq!(
            harness.state.status_line.as_deref(),
            Some("filter options unavailable")
        );
    }

    #[test]
    fn help_toggles_and_blocks_other_keys() {
        let mut harness = Harness::start(TestRuntime::default());
        harness.press(KeyCode::Char('?'));
        assert_eq!(harness.state.overlay, Some(Overlay::Help));
        assert!(!harness.press(KeyCode::Char('q')));
        harness.press(KeyCode::Esc);
        assert_eq!(harness.state.overlay, None);
        assert!(harness.press(KeyCode::Char('q')));
    }

    #[test]
    fn ctrl_c_quits_from_any_overlay() {
        let mut harness = Harness::start(TestRuntime::default());
        harness.press(KeyCode::Enter);
        let quit = handle_key_event(
            &mut harness.state,
            &mut harness.runtime,
            &mut harness.view_data,
            &harness.tx,
            KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL),
        );
        assert!(quit);
    }
}
