// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::fmt;
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{Date, Duration, Month, UtcOffset};

use crate::query::local_midnight;

pub const CALENDAR_CELLS: usize = 42;
pub const WEEKDAY_HEADER: [&str; 7] = ["Mo", "Tu", "We", "Th", "Fr", "Sa", "Su"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DateRange {
    pub start: Option<Date>,
    pub end: Option<Date>,
}

impl DateRange {
    pub const EMPTY: Self = Self {
        start: None,
        end: None,
    };

    pub const fn new(start: Option<Date>, end: Option<Date>) -> Self {
        Self { start, end }
    }

    pub const fn day(day: Date) -> Self {
        Self {
            start: Some(day),
            end: Some(day),
        }
    }

    pub const fn is_empty(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }

    pub const fn is_complete(&self) -> bool {
        self.start.is_some() && self.end.is_some()
    }

    pub fn contains(&self, day: Date) -> bool {
        match (self.start, self.end) {
            (Some(start), Some(end)) => start <= day && day <= end,
            _ => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Preset {
    Today,
    Yesterday,
    ThisWeek,
    LastWeek,
    ThisMonth,
    LastMonth,
    ThisYear,
    LastYear,
    AllTime,
}

impl Preset {
    pub const ALL: [Self; 9] = [
        Self::Today,
        Self::Yesterday,
        Self::ThisWeek,
        Self::LastWeek,
        Self::ThisMonth,
        Self::LastMonth,
        Self::ThisYear,
        Self::LastYear,
        Self::AllTime,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            Self::Today => "Today",
            Self::Yesterday => "Yesterday",
            Self::ThisWeek => "This week",
            Self::LastWeek => "Last week",
            Self::ThisMonth => "This month",
            Self::LastMonth => "Last month",
            Self::ThisYear => "This year",
            Self::LastYear => "Last year",
            Self::AllTime => "All time",
        }
    }

    /// Resolves the preset against `today` (a local calendar day).
    pub fn resolve(self, today: Date) -> DateRange {
        match self {
            Self::Today => DateRange::day(today),
            Self::Yesterday => today
                .previous_day()
                .map(DateRange::day)
                .unwrap_or(DateRange::EMPTY),
            Self::ThisWeek => week_of(today),
            Self::LastWeek => today
                .checked_sub(Duration::days(7))
                .map(week_of)
                .unwrap_or(DateRange::EMPTY),
            Self::ThisMonth => month_of(today.year(), today.month()),
            Self::LastMonth => {
                let month = today.month().previous();
                let year = if month == Month::December {
                    today.year() - 1
                } else {
                    today.year()
                };
                month_of(year, month)
            }
            Self::ThisYear => year_of(today.year()),
            Self::LastYear => year_of(today.year() - 1),
            Self::AllTime => DateRange::EMPTY,
        }
    }
}

fn week_of(day: Date) -> DateRange {
    let back = i64::from(day.weekday().number_days_from_monday());
    let monday = day.checked_sub(Duration::days(back));
    let sunday = monday.and_then(|monday| monday.checked_add(Duration::days(6)));
    DateRange::new(monday, sunday)
}

fn month_of(year: i32, month: Month) -> DateRange {
    DateRange::new(
        Date::from_calendar_date(year, month, 1).ok(),
        last_day_of_month(year, month),
    )
}

fn year_of(year: i32) -> DateRange {
    DateRange::new(
        Date::from_calendar_date(year, Month::January, 1).ok(),
        Date::from_calendar_date(year, Month::December, 31).ok(),
    )
}

pub fn first_of_month(day: Date) -> Date {
    day.replace_day(1).unwrap_or(day)
}

pub fn last_day_of_month(year: i32, month: Month) -> Option<Date> {
    let (next_year, next_month) = if month == Month::December {
        (year + 1, Month::January)
    } else {
        (year, month.next())
    };

    Date::from_calendar_date(next_year, next_month, 1)
        .ok()?
        .previous_day()
}

pub fn shift_months(anchor: Date, months: i32) -> Option<Date> {
    let base_month = i32::from(anchor.month() as u8);
    let total_month = base_month - 1 + months;
    let year = anchor.year() + total_month.div_euclid(12);
    let month_number = (total_month.rem_euclid(12) + 1) as u8;
    let month = Month::try_from(month_number).ok()?;
    Date::from_calendar_date(year, month, 1).ok()
}

pub fn format_day(day: Date) -> String {
    day.format(&format_description!(
        "[month repr:short] [day padding:none], [year]"
    ))
    .unwrap_or_else(|_| day.to_string())
}

pub fn format_month(anchor: Date) -> String {
    anchor
        .format(&format_description!("[month repr:long] [year]"))
        .unwrap_or_else(|_| anchor.to_string())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalendarDay {
    pub date: Date,
    pub in_month: bool,
}

/// Six Monday-first weeks covering the month of `anchor`, padded with
/// trailing and leading days of the neighbouring months.
pub fn calendar_grid(anchor: Date) -> Vec<CalendarDay> {
    let first = first_of_month(anchor);
    let lead = i64::from(first.weekday().number_days_from_monday());
    let Some(grid_start) = first.checked_sub(Duration::days(lead)) else {
        return Vec::new();
    };

    (0..CALENDAR_CELLS as i64)
        .filter_map(|offset| grid_start.checked_add(Duration::days(offset)))
        .map(|date| CalendarDay {
            date,
            in_month: date.month() == first.month() && date.year() == first.year(),
        })
        .collect()
}

/// Progress of a manual calendar selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionPhase {
    Empty,
    PartialStart(Date),
    Complete(Date, Date),
}

pub fn selection_phase(range: &DateRange) -> SelectionPhase {
    match (range.start, range.end) {
        (Some(start), Some(end)) => SelectionPhase::Complete(start, end),
        (Some(start), None) => SelectionPhase::PartialStart(start),
        _ => SelectionPhase::Empty,
    }
}

/// Applies one calendar click to a draft range.
pub fn click_range(draft: &DateRange, day: Date) -> DateRange {
    match selection_phase(draft) {
        SelectionPhase::PartialStart(start) if day < start => DateRange::new(Some(day), Some(start)),
        SelectionPhase::PartialStart(start) => DateRange::new(Some(start), Some(day)),
        SelectionPhase::Empty | SelectionPhase::Complete(_, _) => DateRange::new(Some(day), None),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeLabel {
    Placeholder,
    Preset(Preset),
    Custom,
}

type RangeListener = Box<dyn FnMut(Option<Date>, Option<Date>)>;
type IsoRangeListener = Box<dyn FnMut(Option<String>, Option<String>)>;

/// Preset-or-calendar range picker with a draft that only becomes visible
/// to listeners on apply or clear.
pub struct DateRangeSelector {
    placeholder: String,
    committed: DateRange,
    committed_label: RangeLabel,
    draft: DateRange,
    label: RangeLabel,
    anchor: Date,
    offset: UtcOffset,
    on_range: Option<RangeListener>,
    on_iso_range: Option<IsoRangeListener>,
}

impl fmt::Debug for DateRangeSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DateRangeSelector")
            .field("placeholder", &self.placeholder)
            .field("committed", &self.committed)
            .field("draft", &self.draft)
            .field("label", &self.label)
            .field("anchor", &self.anchor)
            .field("offset", &self.offset)
            .finish_non_exhaustive()
    }
}

impl DateRangeSelector {
    pub fn new(placeholder: impl Into<String>, today: Date, offset: UtcOffset) -> Self {
        Self {
            placeholder: placeholder.into(),
            committed: DateRange::EMPTY,
            committed_label: RangeLabel::Placeholder,
            draft: DateRange::EMPTY,
            label: RangeLabel::Placeholder,
            anchor: first_of_month(today),
            offset,
            on_range: None,
            on_iso_range: None,
        }
    }

    /// Shows a preset name on the trigger before anything is committed.
    pub fn with_default_preset(mut self, preset: Preset) -> Self {
        self.label = RangeLabel::Preset(preset);
        self.committed_label = self.label;
        self
    }

    pub fn on_range(&mut self, listener: impl FnMut(Option<Date>, Option<Date>) + 'static) {
        self.on_range = Some(Box::new(listener));
    }

    pub fn on_iso_range(
        &mut self,
        listener: impl FnMut(Option<String>, Option<String>) + 'static,
    ) {
        self.on_iso_range = Some(Box::new(listener));
    }

    pub fn placeholder(&self) -> &str {
        &self.placeholder
    }

    pub fn committed(&self) -> DateRange {
        self.committed
    }

    pub fn draft(&self) -> DateRange {
        self.draft
    }

    pub fn label(&self) -> RangeLabel {
        self.label
    }

    pub fn anchor(&self) -> Date {
        self.anchor
    }

    /// The two adjacent months shown side by side.
    pub fn months(&self) -> [Date; 2] {
        let next = shift_months(self.anchor, 1).unwrap_or(self.anchor);
        [self.anchor, next]
    }

    pub fn choose_preset(&mut self, preset: Preset, today: Date) {
        self.label = RangeLabel::Preset(preset);
        self.draft = preset.resolve(today);
        if let Some(start) = self.draft.start {
            self.anchor = first_of_month(start);
        }
    }

    pub fn click_day(&mut self, day: Date) {
        self.label = RangeLabel::Custom;
        self.draft = click_range(&self.draft, day);
    }

    pub fn navigate(&mut self, months: i32) {
        if let Some(anchor) = shift_months(self.anchor, months) {
            self.anchor = anchor;
        }
    }

    pub fn apply(&mut self) -> DateRange {
        self.committed = self.draft;
        self.committed_label = self.label;
        self.emit();
        self.committed
    }

    pub fn clear(&mut self) -> DateRange {
        self.draft = DateRange::EMPTY;
        self.committed = DateRange::EMPTY;
        self.label = RangeLabel::Preset(Preset::AllTime);
        self.committed_label = self.label;
        self.emit();
        self.committed
    }

    pub fn cancel(&mut self) {
        self.draft = self.committed;
        self.label = self.committed_label;
    }

    pub fn has_selection(&self) -> bool {
        !self.committed.is_empty() || self.label != RangeLabel::Placeholder
    }

    pub fn display_text(&self) -> String {
        if self.label == RangeLabel::Custom {
            match selection_phase(&self.draft) {
                SelectionPhase::Complete(start, end) => {
                    return format!("{} - {}", format_day(start), format_day(end));
                }
                SelectionPhase::PartialStart(start) => {
                    return format!("{} - Select end date", format_day(start));
                }
                SelectionPhase::Empty => {}
            }
        }

        if let (Some(start), Some(end)) = (self.committed.start, self.committed.end) {
            return format!("{} - {}", format_day(start), format_day(end));
        }

        match self.label {
            RangeLabel::Preset(preset) => preset.label().to_owned(),
            RangeLabel::Placeholder | RangeLabel::Custom => self.placeholder.clone(),
        }
    }

    fn emit(&mut self) {
        let DateRange { start, end } = self.committed;
        if let Some(listener) = self.on_range.as_mut() {
            listener(start, end);
        }
        if let Some(listener) = self.on_iso_range.as_mut() {
            let offset = self.offset;
            listener(
                start.and_then(|day| iso_instant(day, offset)),
                end.and_then(|day| iso_instant(day, offset)),
            );
        }
    }
}

fn iso_instant(day: Date, offset: UtcOffset) -> Option<String> {
    local_midnight(day, offset)?.format(&Rfc3339).ok()
}
