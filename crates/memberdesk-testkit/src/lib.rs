// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use memberdesk_app::{AccountStatus, Member, MemberId, MemberSummary, VerificationStatus};
use serde_json::{Value, json};
use std::path::PathBuf;
use time::{Date, Duration, Month, OffsetDateTime, Time};

const REFERENCE_YEAR: i32 = 2026;

const FIRST_NAMES: [&str; 16] = [
    "Avery", "Jordan", "Taylor", "Riley", "Morgan", "Casey", "Alex", "Quinn", "Parker", "Drew",
    "Kai", "Elliot", "Robin", "Cameron", "Hayden", "Rowan",
];
const LAST_NAMES: [&str; 18] = [
    "Walker", "Martin", "Hill", "Evans", "Lopez", "Gray", "Ward", "Young", "Diaz", "Reed",
    "Campbell", "Turner", "Flores", "Bennett", "Price", "Morris", "Foster", "Brooks",
];
const DOMAINS: [&str; 8] = [
    "example.com",
    "example.org",
    "mail.test",
    "members.test",
    "inbox.example",
    "post.example",
    "corp.test",
    "club.example",
];
const MOBILE_PREFIXES: [&str; 6] = ["+1555", "+4420", "+6391", "+6129", "+3361", "+8190"];

#[derive(Debug, Clone)]
struct DeterministicRng {
    state: u64,
}

impl DeterministicRng {
    fn new(seed: u64) -> Self {
        let mut state = seed ^ 0x9E37_79B9_7F4A_7C15;
        if state == 0 {
            state = 0xA409_3822_299F_31D0;
        }
        Self { state }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self
            .state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);

        let mut x = self.state;
        x ^= x >> 13;
        x ^= x << 7;
        x ^= x >> 17;
        x
    }

    fn int_n(&mut self, n: usize) -> usize {
        if n <= 1 {
            return 0;
        }
        (self.next_u64() % (n as u64)) as usize
    }
}

/// Seeded generator of plausible member records.
#[derive(Debug, Clone)]
pub struct MemberFaker {
    rng: DeterministicRng,
    issued: u64,
}

impl MemberFaker {
    pub fn new(seed: u64) -> Self {
        let normalized = if seed == 0 { 1 } else { seed };
        Self {
            rng: DeterministicRng::new(normalized),
            issued: 0,
        }
    }

    pub fn int_n(&mut self, n: usize) -> usize {
        self.rng.int_n(n)
    }

    pub fn member(&mut self) -> Member {
        self.issued += 1;
        let first = self.pick(&FIRST_NAMES);
        let last = self.pick(&LAST_NAMES);
        let domain = self.pick(&DOMAINS);
        let prefix = self.pick(&MOBILE_PREFIXES);
        let created = self.date_in_year(REFERENCE_YEAR - 1);
        let active_offset = self.int_range_i64(0, 300);

        Member {
            id: MemberId::new(format!("member-{:04}", self.issued)),
            name: format!("{first} {last}"),
            verification_status: VerificationStatus::ALL
                [self.rng.int_n(VerificationStatus::ALL.len())],
            deposits_count: self.int_range_i64(0, 250_000) as u64,
            email_address: format!(
                "{}.{}{}@{domain}",
                first.to_lowercase(),
                last.to_lowercase(),
                self.issued
            ),
            mobile_number: format!("{prefix}{:07}", self.int_range_i64(0, 9_999_999)),
            domain: domain.to_owned(),
            date_time_created: created,
            date_time_last_active: created + Duration::days(active_offset),
            status: AccountStatus::ALL[self.rng.int_n(AccountStatus::ALL.len())],
        }
    }

    pub fn members(&mut self, count: usize) -> Vec<Member> {
        (0..count).map(|_| self.member()).collect()
    }

    pub fn date_in_year(&mut self, year: i32) -> OffsetDateTime {
        let start = midnight_utc(year, Month::January, 1);
        let end =
            midnight_utc(year, Month::December, 31) + Duration::days(1) - Duration::seconds(1);
        self.random_datetime_between(start, end)
    }

    fn pick<'a>(&mut self, items: &'a [&'a str]) -> &'a str {
        items[self.rng.int_n(items.len())]
    }

    fn int_range_i64(&mut self, min: i64, max: i64) -> i64 {
        if max <= min {
            return min;
        }
        let span = max - min + 1;
        min + (self.rng.next_u64() % (span as u64)) as i64
    }

    fn random_datetime_between(
        &mut self,
        start: OffsetDateTime,
        end: OffsetDateTime,
    ) -> OffsetDateTime {
        let start_ts = start.unix_timestamp();
        let end_ts = end.unix_timestamp();
        if end_ts <= start_ts {
            return start;
        }
        let span = (end_ts - start_ts) as u64;
        let offset = self.rng.next_u64() % (span + 1);
        OffsetDateTime::from_unix_timestamp(start_ts + offset as i64).expect("valid unix timestamp")
    }
}

/// Body of a successful members query.
pub fn members_response(members: &[Member], has_next_page: bool, end_cursor: Option<&str>) -> Value {
    let edges: Vec<Value> = members
        .iter()
        .map(|member| json!({ "node": serde_json::to_value(member).expect("member serializes") }))
        .collect();
    json!({
        "data": {
            "members": {
                "edges": edges,
                "pageInfo": {
                    "hasNextPage": has_next_page,
                    "endCursor": end_cursor,
                },
            },
        },
    })
}

/// Body of the filter-options query, which carries no timestamps.
pub fn filter_options_response(members: &[Member]) -> Value {
    let edges: Vec<Value> = members
        .iter()
        .map(|member| {
            let summary = MemberSummary::from(member);
            json!({ "node": serde_json::to_value(summary).expect("summary serializes") })
        })
        .collect();
    json!({ "data": { "members": { "edges": edges } } })
}

pub fn graphql_errors_response(messages: &[&str]) -> Value {
    let errors: Vec<Value> = messages
        .iter()
        .map(|message| json!({ "message": message }))
        .collect();
    json!({ "data": null, "errors": errors })
}

pub fn temp_config_path() -> Result<(tempfile::TempDir, PathBuf)> {
    let dir = tempfile::tempdir().context("create temp dir")?;
    let path = dir.path().join("config.toml");
    Ok((dir, path))
}

pub fn fixture_datetime() -> &'static str {
    "2026-02-19T12:34:56Z"
}

pub fn fixture_date() -> Date {
    Date::from_calendar_date(REFERENCE_YEAR, Month::October, 21).expect("valid calendar date")
}

fn midnight_utc(year: i32, month: Month, day: u8) -> OffsetDateTime {
    let date = Date::from_calendar_date(year, month, day).expect("valid calendar date");
    let midnight = Time::from_hms(0, 0, 0).expect("valid midnight");
    date.with_time(midnight).assume_utc()
}

#[cfg(test)]
mod tests {
    use super::{
        MemberFaker, filter_options_response, graphql_errors_response, members_response,
    };
    use std::collections::BTreeSet;

    #[test]
    fn new_deterministic_seed() {
        let mut left = MemberFaker::new(42);
        let mut right = MemberFaker::new(42);
        assert_eq!(left.members(5), right.members(5));
    }

    #[test]
    fn member_fields_are_populated() {
        let mut faker = MemberFaker::new(7);
        let member = faker.member();

        assert_eq!(member.id.as_str(), "member-0001");
        assert!(member.name.contains(' '));
        assert!(member.email_address.ends_with(&member.domain));
        assert!(member.mobile_number.starts_with('+'));
        assert!(member.date_time_last_active >= member.date_time_created);
    }

    #[test]
    fn ids_are_unique() {
        let mut faker = MemberFaker::new(3);
        let ids: BTreeSet<String> = faker
            .members(50)
            .into_iter()
            .map(|member| member.id.as_str().to_owned())
            .collect();
        assert_eq!(ids.len(), 50);
    }

    #[test]
    fn variety_across_seeds() {
        let mut names = BTreeSet::new();
        for seed in 0_u64..20_u64 {
            let mut faker = MemberFaker::new(seed);
            names.insert(faker.member().name);
        }
        assert!(names.len() >= 10, "got {}", names.len());
    }

    #[test]
    fn response_builders_match_api_shape() {
        let members = MemberFaker::new(1).members(2);

        let page = members_response(&members, true, Some("cursor-2"));
        assert_eq!(page["data"]["members"]["edges"].as_array().map(Vec::len), Some(2));
        assert_eq!(page["data"]["members"]["pageInfo"]["endCursor"], "cursor-2");
        assert!(page["data"]["members"]["edges"][0]["node"]["dateTimeCreated"].is_string());

        let options = filter_options_response(&members);
        assert!(options["data"]["members"]["edges"][0]["node"]["dateTimeCreated"].is_null());

        let errors = graphql_errors_response(&["denied"]);
        assert_eq!(errors["errors"][0]["message"], "denied");
    }

    #[test]
    fn int_n() {
        let mut faker = MemberFaker::new(42);
        for _ in 0..100 {
            assert!(faker.int_n(5) < 5);
        }
    }
}
