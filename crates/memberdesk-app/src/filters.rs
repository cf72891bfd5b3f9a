// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::date_range::DateRange;
use crate::model::{AccountStatus, VerificationStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MultiField {
    Names,
    Emails,
    Mobiles,
    Domains,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DateField {
    Registered,
    LastActive,
}

/// One field replacement, as produced by a selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterUpdate {
    VerificationStatus(Option<VerificationStatus>),
    Status(Option<AccountStatus>),
    Values(MultiField, Vec<String>),
    Dates(DateField, DateRange),
}

/// Current filter selections. Every field is either empty or a non-empty
/// constraint.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FilterState {
    pub verification_status: Option<VerificationStatus>,
    pub status: Option<AccountStatus>,
    pub names: Vec<String>,
    pub emails: Vec<String>,
    pub mobiles: Vec<String>,
    pub domains: Vec<String>,
    pub date_registered: DateRange,
    pub date_last_active: DateRange,
}

impl FilterState {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn values(&self, field: MultiField) -> &[String] {
        match field {
            MultiField::Names => &self.names,
            MultiField::Emails => &self.emails,
            MultiField::Mobiles => &self.mobiles,
            MultiField::Domains => &self.domains,
        }
    }

    pub fn dates(&self, field: DateField) -> DateRange {
        match field {
            DateField::Registered => self.date_registered,
            DateField::LastActive => self.date_last_active,
        }
    }

    pub fn set_verification_status(&mut self, value: Option<VerificationStatus>) -> bool {
        replace(&mut self.verification_status, value)
    }

    pub fn set_status(&mut self, value: Option<AccountStatus>) -> bool {
        replace(&mut self.status, value)
    }

    /// Stores the selection in order with duplicates and blanks dropped.
    pub fn set_values(&mut self, field: MultiField, values: Vec<String>) -> bool {
        let normalized = dedup_preserving_order(values);
        let slot = match field {
            MultiField::Names => &mut self.names,
            MultiField::Emails => &mut self.emails,
            MultiField::Mobiles => &mut self.mobiles,
            MultiField::Domains => &mut self.domains,
        };
        replace(slot, normalized)
    }

    pub fn set_dates(&mut self, field: DateField, range: DateRange) -> bool {
        let slot = match field {
            DateField::Registered => &mut self.date_registered,
            DateField::LastActive => &mut self.date_last_active,
        };
        replace(slot, range)
    }

    pub fn apply(&mut self, update: FilterUpdate) -> bool {
        match update {
            FilterUpdate::VerificationStatus(value) => self.set_verification_status(value),
            FilterUpdate::Status(value) => self.set_status(value),
            FilterUpdate::Values(field, values) => self.set_values(field, values),
            FilterUpdate::Dates(field, range) => self.set_dates(field, range),
        }
    }

    pub fn clear(&mut self) -> bool {
        replace(self, Self::default())
    }
}

fn replace<T: PartialEq>(slot: &mut T, value: T) -> bool {
    if *slot == value {
        return false;
    }
    *slot = value;
    true
}

fn dedup_preserving_order(values: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(values.len());
    for value in values {
        if value.trim().is_empty() || out.contains(&value) {
            continue;
        }
        out.push(value);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::{DateField, FilterState, FilterUpdate, MultiField};
    use crate::date_range::DateRange;
    use crate::model::{AccountStatus, VerificationStatus};
    use time::macros::date;

    #[test]
    fn setters_report_whether_value_changed() {
        let mut filters = FilterState::default();
        assert!(filters.is_empty());

        assert!(filters.set_status(Some(AccountStatus::Active)));
        assert!(!filters.set_status(Some(AccountStatus::Active)));
        assert!(filters.set_verification_status(Some(VerificationStatus::Verified)));
        assert!(!filters.is_empty());

        let range = DateRange::day(date!(2026 - 10 - 19));
        assert!(filters.set_dates(DateField::LastActive, range));
        assert!(!filters.set_dates(DateField::LastActive, range));
        assert_eq!(filters.dates(DateField::LastActive), range);
        assert!(filters.dates(DateField::Registered).is_empty());
    }

    #[test]
    fn multi_values_keep_selection_order_without_duplicates() {
        let mut filters = FilterState::default();
        let changed = filters.set_values(
            MultiField::Domains,
            vec![
                "b.com".to_owned(),
                "a.com".to_owned(),
                "b.com".to_owned(),
                " ".to_owned(),
            ],
        );
        assert!(changed);
        assert_eq!(filters.values(MultiField::Domains), ["b.com", "a.com"]);
        assert!(!filters.set_values(
            MultiField::Domains,
            vec!["b.com".to_owned(), "a.com".to_owned()]
        ));
    }

    #[test]
    fn updates_route_to_the_matching_field() {
        let mut filters = FilterState::default();
        assert!(filters.apply(FilterUpdate::Values(
            MultiField::Names,
            vec!["ada".to_owned()]
        )));
        assert!(filters.apply(FilterUpdate::Status(Some(AccountStatus::Blacklisted))));
        assert_eq!(filters.names, vec!["ada".to_owned()]);
        assert_eq!(filters.status, Some(AccountStatus::Blacklisted));
        assert!(filters.emails.is_empty());
    }

    #[test]
    fn clear_empties_every_field_once() {
        let mut filters = FilterState {
            mobiles: vec!["+1555".to_owned()],
            date_registered: DateRange::new(Some(date!(2026 - 01 - 01)), None),
            ..FilterState::default()
        };
        assert!(filters.clear());
        assert!(filters.is_empty());
        assert!(!filters.clear());
    }
}
