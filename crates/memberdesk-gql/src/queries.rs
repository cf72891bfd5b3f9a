// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

/// Paged members listing; `filter` is a `MemberFilterInput`.
pub const MEMBERS_QUERY: &str = r#"
query ($first: Int, $after: Cursor, $filter: MemberFilterInput) {
  members(first: $first, after: $after, filter: $filter) {
    edges {
      node {
        id
        ... on Member {
          name
          verificationStatus
          depositsCount
          emailAddress
          mobileNumber
          domain
          dateTimeCreated
          dateTimeLastActive
          status
        }
      }
    }
    pageInfo {
      hasNextPage
      endCursor
    }
  }
}
"#;

/// Upper bound on the member sample the filter candidates are drawn from.
pub const FILTER_OPTIONS_SAMPLE: u32 = 1000;

pub const FILTER_OPTIONS_QUERY: &str = r#"
query {
  members(first: 1000) {
    edges {
      node {
        id
        ... on Member {
          name
          verificationStatus
          emailAddress
          mobileNumber
          domain
          status
        }
      }
    }
  }
}
"#;

#[cfg(test)]
mod tests {
    use super::{FILTER_OPTIONS_QUERY, FILTER_OPTIONS_SAMPLE, MEMBERS_QUERY};

    #[test]
    fn members_query_declares_paging_variables() {
        for needle in ["$first: Int", "$after: Cursor", "$filter: MemberFilterInput"] {
            assert!(MEMBERS_QUERY.contains(needle), "missing {needle}");
        }
        assert!(MEMBERS_QUERY.contains("endCursor"));
    }

    #[test]
    fn filter_options_query_uses_sample_size() {
        assert!(FILTER_OPTIONS_QUERY.contains(&format!("first: {FILTER_OPTIONS_SAMPLE}")));
        assert!(!FILTER_OPTIONS_QUERY.contains("dateTimeCreated"));
    }
}
