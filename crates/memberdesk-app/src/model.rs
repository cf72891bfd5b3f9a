// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use time::OffsetDateTime;

use crate::ids::MemberId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum VerificationStatus {
    Verified,
    Unverified,
    Pending,
}

impl VerificationStatus {
    pub const ALL: [Self; 3] = [Self::Verified, Self::Unverified, Self::Pending];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Verified => "VERIFIED",
            Self::Unverified => "UNVERIFIED",
            Self::Pending => "PENDING",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Verified => "Verified",
            Self::Unverified => "Unverified",
            Self::Pending => "Pending",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_uppercase().as_str() {
            "VERIFIED" => Some(Self::Verified),
            "UNVERIFIED" => Some(Self::Unverified),
            "PENDING" => Some(Self::Pending),
            _ => None,
        }
    }
}

impl TryFrom<String> for VerificationStatus {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value).ok_or_else(|| format!("unknown verification status {value:?}"))
    }
}

impl From<VerificationStatus> for String {
    fn from(value: VerificationStatus) -> Self {
        value.as_str().to_owned()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum AccountStatus {
    Active,
    Blacklisted,
    Suspended,
}

impl AccountStatus {
    pub const ALL: [Self; 3] = [Self::Active, Self::Blacklisted, Self::Suspended];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "ACTIVE",
            Self::Blacklisted => "BLACKLISTED",
            Self::Suspended => "SUSPENDED",
        }
    }

    /// Suspended accounts are shown to operators as "Disabled".
    pub const fn label(self) -> &'static str {
        match self {
            Self::Active => "Active",
            Self::Blacklisted => "Blacklisted",
            Self::Suspended => "Disabled",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_uppercase().as_str() {
            "ACTIVE" => Some(Self::Active),
            "BLACKLISTED" => Some(Self::Blacklisted),
            "SUSPENDED" => Some(Self::Suspended),
            _ => None,
        }
    }
}

impl TryFrom<String> for AccountStatus {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value).ok_or_else(|| format!("unknown account status {value:?}"))
    }
}

impl From<AccountStatus> for String {
    fn from(value: AccountStatus) -> Self {
        value.as_str().to_owned()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    pub id: MemberId,
    pub name: String,
    pub verification_status: VerificationStatus,
    pub deposits_count: u64,
    pub email_address: String,
    pub mobile_number: String,
    pub domain: String,
    #[serde(with = "time::serde::rfc3339")]
    pub date_time_created: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub date_time_last_active: OffsetDateTime,
    pub status: AccountStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub has_next_page: bool,
    pub end_cursor: Option<String>,
}

/// One page of members as returned by the listing query.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MembersPage {
    pub members: Vec<Member>,
    pub page_info: PageInfo,
}

/// The subset of member fields the filter-options sample carries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberSummary {
    pub id: MemberId,
    #[serde(default)]
    pub name: String,
    pub verification_status: VerificationStatus,
    #[serde(default)]
    pub email_address: String,
    #[serde(default)]
    pub mobile_number: String,
    #[serde(default)]
    pub domain: String,
    pub status: AccountStatus,
}

impl From<&Member> for MemberSummary {
    fn from(member: &Member) -> Self {
        Self {
            id: member.id.clone(),
            name: member.name.clone(),
            verification_status: member.verification_status,
            email_address: member.email_address.clone(),
            mobile_number: member.mobile_number.clone(),
            domain: member.domain.clone(),
            status: member.status,
        }
    }
}

/// Candidate values for the filter selectors, derived from a member sample.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FilterOptions {
    pub names: Vec<String>,
    pub email_addresses: Vec<String>,
    pub mobile_numbers: Vec<String>,
    pub domains: Vec<String>,
    pub verification_statuses: Vec<VerificationStatus>,
    pub statuses: Vec<AccountStatus>,
}

impl FilterOptions {
    pub fn from_members(members: &[Member]) -> Self {
        let summaries: Vec<MemberSummary> = members.iter().map(MemberSummary::from).collect();
        Self::from_summaries(&summaries)
    }

    pub fn from_summaries(members: &[MemberSummary]) -> Self {
        Self {
            names: distinct_sorted(members.iter().map(|member| member.name.as_str())),
            email_addresses: distinct_sorted(
                members.iter().map(|member| member.email_address.as_str()),
            ),
            mobile_numbers: distinct_sorted(
                members.iter().map(|member| member.mobile_number.as_str()),
            ),
            domains: distinct_sorted(members.iter().map(|member| member.domain.as_str())),
            verification_statuses: members
                .iter()
                .map(|member| member.verification_status)
                .collect::<BTreeSet<_>>()
                .into_iter()
                .collect(),
            statuses: members
                .iter()
                .map(|member| member.status)
                .collect::<BTreeSet<_>>()
                .into_iter()
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
            && self.email_addresses.is_empty()
            && self.mobile_numbers.is_empty()
            && self.domains.is_empty()
            && self.verification_statuses.is_empty()
            && self.statuses.is_empty()
    }
}

fn distinct_sorted<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    values
        .filter(|value| !value.is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_owned)
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PageSize {
    #[default]
    Ten,
    TwentyFive,
    Fifty,
}

impl PageSize {
    pub const ALL: [Self; 3] = [Self::Ten, Self::TwentyFive, Self::Fifty];

    pub const fn get(self) -> u32 {
        match self {
            Self::Ten => 10,
            Self::TwentyFive => 25,
            Self::Fifty => 50,
        }
    }

    pub fn parse(value: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|size| size.get() == value)
    }

    pub fn cycle(self) -> Self {
        match self {
            Self::Ten => Self::TwentyFive,
            Self::TwentyFive => Self::Fifty,
            Self::Fifty => Self::Ten,
        }
    }

    pub fn label(self) -> String {
        format!("{} Entries", self.get())
    }
}

/// Filter controls in the order they appear in the filter bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FilterControl {
    Name,
    VerificationStatus,
    EmailAddress,
    MobileNumber,
    Domain,
    DateRegistered,
    Status,
    DateLastActive,
}

impl FilterControl {
    pub const ALL: [Self; 8] = [
        Self::Name,
        Self::VerificationStatus,
        Self::EmailAddress,
        Self::MobileNumber,
        Self::Domain,
        Self::DateRegistered,
        Self::Status,
        Self::DateLastActive,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            Self::Name => "Name",
            Self::VerificationStatus => "Verification Status",
            Self::EmailAddress => "Email Address",
            Self::MobileNumber => "Mobile Number",
            Self::Domain => "Domain",
            Self::DateRegistered => "Date Registered",
            Self::Status => "Status",
            Self::DateLastActive => "Date & Time Last Active",
        }
    }

    pub const fn search_placeholder(self) -> &'static str {
        match self {
            Self::Name => "Search Username",
            Self::EmailAddress => "Search Email",
            Self::MobileNumber => "Search Mobile",
            Self::Domain => "Search Domain",
            _ => "Search...",
        }
    }
}
