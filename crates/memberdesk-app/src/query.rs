// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use time::{Date, OffsetDateTime, UtcOffset};

use crate::date_range::DateRange;
use crate::filters::FilterState;
use crate::model::PageSize;

/// One compiled filter field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Constraint {
    Absent,
    Equality(String),
    Membership(Vec<String>),
    Range {
        lower: Option<OffsetDateTime>,
        upper: Option<OffsetDateTime>,
    },
}

impl Constraint {
    pub fn from_values(values: &[String]) -> Self {
        match values {
            [] => Self::Absent,
            [single] => Self::Equality(single.clone()),
            many => Self::Membership(many.to_vec()),
        }
    }

    pub fn from_enum(value: Option<&'static str>) -> Self {
        value.map_or(Self::Absent, |value| Self::Equality(value.to_owned()))
    }

    pub fn from_range(range: &DateRange, offset: UtcOffset) -> Self {
        let lower = range.start.and_then(|day| local_midnight(day, offset));
        let upper = range.end.and_then(|day| local_midnight(day, offset));
        if lower.is_none() && upper.is_none() {
            return Self::Absent;
        }
        Self::Range { lower, upper }
    }

    pub const fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }
}

impl Serialize for Constraint {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        match self {
            Self::Absent => {}
            Self::Equality(value) => map.serialize_entry("equal", value)?,
            Self::Membership(values) => map.serialize_entry("in", values)?,
            Self::Range { lower, upper } => {
                if let Some(lower) = lower {
                    map.serialize_entry("greaterThanOrEqual", &Rfc3339Instant(*lower))?;
                }
                if let Some(upper) = upper {
                    map.serialize_entry("lesserThanOrEqual", &Rfc3339Instant(*upper))?;
                }
            }
        }
        map.end()
    }
}

struct Rfc3339Instant(OffsetDateTime);

impl Serialize for Rfc3339Instant {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        time::serde::rfc3339::serialize(&self.0, serializer)
    }
}

/// Local midnight of `day` at `offset`, as a UTC instant.
pub fn local_midnight(day: Date, offset: UtcOffset) -> Option<OffsetDateTime> {
    let local = day.midnight().assume_offset(offset);
    OffsetDateTime::from_unix_timestamp(local.unix_timestamp()).ok()
}

/// The `filter` argument of the members query. Absent fields are skipped, so
/// an empty filter serializes to `{}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberFilter {
    #[serde(skip_serializing_if = "Constraint::is_absent")]
    pub verification_status: Constraint,
    #[serde(skip_serializing_if = "Constraint::is_absent")]
    pub status: Constraint,
    #[serde(skip_serializing_if = "Constraint::is_absent")]
    pub name: Constraint,
    #[serde(skip_serializing_if = "Constraint::is_absent")]
    pub email_address: Constraint,
    #[serde(skip_serializing_if = "Constraint::is_absent")]
    pub mobile_number: Constraint,
    #[serde(skip_serializing_if = "Constraint::is_absent")]
    pub domain: Constraint,
    #[serde(skip_serializing_if = "Constraint::is_absent")]
    pub date_time_created: Constraint,
    #[serde(skip_serializing_if = "Constraint::is_absent")]
    pub date_time_last_active: Constraint,
}

impl Default for MemberFilter {
    fn default() -> Self {
        Self {
            verification_status: Constraint::Absent,
            status: Constraint::Absent,
            name: Constraint::Absent,
            email_address: Constraint::Absent,
            mobile_number: Constraint::Absent,
            domain: Constraint::Absent,
            date_time_created: Constraint::Absent,
            date_time_last_active: Constraint::Absent,
        }
    }
}

impl MemberFilter {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueryVariables {
    pub first: u32,
    pub after: Option<String>,
    pub filter: MemberFilter,
}

pub fn compile_filter(filters: &FilterState, offset: UtcOffset) -> MemberFilter {
    MemberFilter {
        verification_status: Constraint::from_enum(
            filters.verification_status.map(|value| value.as_str()),
        ),
        status: Constraint::from_enum(filters.status.map(|value| value.as_str())),
        name: Constraint::from_values(&filters.names),
        email_address: Constraint::from_values(&filters.emails),
        mobile_number: Constraint::from_values(&filters.mobiles),
        domain: Constraint::from_values(&filters.domains),
        date_time_created: Constraint::from_range(&filters.date_registered, offset),
        date_time_last_active: Constraint::from_range(&filters.date_last_active, offset),
    }
}

pub fn compile(
    filters: &FilterState,
    cursor: Option<&str>,
    page_size: PageSize,
    offset: UtcOffset,
) -> QueryVariables {
    QueryVariables {
        first: page_size.get(),
        after: cursor.map(str::to_owned),
        filter: compile_filter(filters, offset),
    }
}

#[cfg(test)]
mod tests {
    use super::{Constraint, compile};
    use crate::date_range::DateRange;
    use crate::filters::FilterState;
    use crate::model::{AccountStatus, PageSize, VerificationStatus};
    use serde_json::json;
    use time::UtcOffset;
    use time::macros::{date, offset};

    fn to_json(filters: &FilterState, cursor: Option<&str>) -> serde_json::Value {
        let variables = compile(filters, cursor, PageSize::Ten, UtcOffset::UTC);
        serde_json::to_value(variables).expect("variables serialize")
    }

    #[test]
    fn empty_filter_compiles_to_empty_object_and_null_cursor() {
        let value = to_json(&FilterState::default(), None);
        assert_eq!(value, json!({"first": 10, "after": null, "filter": {}}));
    }

    #[test]
    fn singleton_values_compile_to_equality() {
        let filters = FilterState {
            names: vec!["ada".to_owned()],
            ..FilterState::default()
        };
        let value = to_json(&filters, None);
        assert_eq!(value["filter"], json!({"name": {"equal": "ada"}}));
    }

    #[test]
    fn multiple_values_compile_to_membership() {
        let filters = FilterState {
            domains: vec!["b.com".to_owned(), "a.com".to_owned()],
            emails: vec!["x@a.com".to_owned(), "y@b.com".to_owned(), "z@c.com".to_owned()],
            ..FilterState::default()
        };
        let value = to_json(&filters, Some("abc"));
        assert_eq!(value["after"], json!("abc"));
        assert_eq!(
            value["filter"],
            json!({
                "emailAddress": {"in": ["x@a.com", "y@b.com", "z@c.com"]},
                "domain": {"in": ["b.com", "a.com"]},
            })
        );
    }

    #[test]
    fn enum_fields_compile_to_uppercase_equality() {
        let filters = FilterState {
            verification_status: Some(VerificationStatus::Pending),
            status: Some(AccountStatus::Suspended),
            ..FilterState::default()
        };
        let value = to_json(&filters, None);
        assert_eq!(
            value["filter"],
            json!({
                "verificationStatus": {"equal": "PENDING"},
                "status": {"equal": "SUSPENDED"},
            })
        );
    }

    #[test]
    fn start_only_range_has_only_lower_bound() {
        let filters = FilterState {
            date_registered: DateRange::new(Some(date!(2026 - 10 - 05)), None),
            ..FilterState::default()
        };
        let value = to_json(&filters, None);
        assert_eq!(
            value["filter"],
            json!({"dateTimeCreated": {"greaterThanOrEqual": "2026-10-05T00:00:00Z"}})
        );
    }

    #[test]
    fn end_only_range_has_only_upper_bound() {
        let filters = FilterState {
            date_last_active: DateRange::new(None, Some(date!(2026 - 10 - 09))),
            ..FilterState::default()
        };
        let value = to_json(&filters, None);
        assert_eq!(
            value["filter"],
            json!({"dateTimeLastActive": {"lesserThanOrEqual": "2026-10-09T00:00:00Z"}})
        );
    }

    #[test]
    fn range_bounds_use_local_midnight_in_utc() {
        let filters = FilterState {
            date_registered: DateRange::new(
                Some(date!(2026 - 10 - 05)),
                Some(date!(2026 - 10 - 09)),
            ),
            ..FilterState::default()
        };
        let variables = compile(&filters, None, PageSize::Fifty, offset!(+2));
        let value = serde_json::to_value(variables).expect("variables serialize");
        assert_eq!(value["first"], json!(50));
        assert_eq!(
            value["filter"]["dateTimeCreated"],
            json!({
                "greaterThanOrEqual": "2026-10-04T22:00:00Z",
                "lesserThanOrEqual": "2026-10-08T22:00:00Z",
            })
        );
    }

    #[test]
    fn unset_range_is_absent() {
        assert_eq!(
            Constraint::from_range(&DateRange::EMPTY, UtcOffset::UTC),
            Constraint::Absent
        );
    }
}
