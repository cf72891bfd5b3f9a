// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

mod queries;

pub use queries::{FILTER_OPTIONS_QUERY, FILTER_OPTIONS_SAMPLE, MEMBERS_QUERY};

use anyhow::{Context, Result, anyhow, bail};
use memberdesk_app::{FilterOptions, Member, MemberSummary, MembersPage, PageInfo, QueryVariables};
use reqwest::StatusCode;
use reqwest::blocking::Client as HttpClient;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use url::Url;

/// Blocking GraphQL client bound to one endpoint and bearer token.
#[derive(Clone)]
pub struct Client {
    endpoint: Url,
    token: String,
    timeout: Duration,
    http: HttpClient,
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("endpoint", &self.endpoint.as_str())
            .field("token", &if self.has_token() { "<redacted>" } else { "<none>" })
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl Client {
    pub fn new(endpoint: &str, token: &str, timeout: Duration) -> Result<Self> {
        let endpoint = endpoint.trim();
        if endpoint.is_empty() {
            bail!("api.endpoint must not be empty");
        }
        let endpoint =
            Url::parse(endpoint).with_context(|| format!("parse api.endpoint {endpoint:?}"))?;
        if !matches!(endpoint.scheme(), "http" | "https") {
            bail!(
                "api.endpoint must use http or https, got {:?}",
                endpoint.scheme()
            );
        }

        let http = HttpClient::builder()
            .timeout(timeout)
            .build()
            .context("build HTTP client")?;

        Ok(Self {
            endpoint,
            token: token.trim().to_owned(),
            timeout,
            http,
        })
    }

    pub fn endpoint(&self) -> &str {
        self.endpoint.as_str()
    }

    pub fn has_token(&self) -> bool {
        !self.token.is_empty()
    }

    /// POSTs one operation and decodes its `data` payload.
    pub fn execute<T, V>(&self, query: &str, variables: &V) -> Result<T>
    where
        T: DeserializeOwned,
        V: Serialize + ?Sized,
    {
        let mut request = self
            .http
            .post(self.endpoint.clone())
            .json(&GraphqlRequest { query, variables });
        if self.has_token() {
            request = request.bearer_auth(&self.token);
        }

        tracing::debug!(endpoint = %self.endpoint, "sending GraphQL request");
        let response = request
            .send()
            .map_err(|error| connection_error(self.endpoint.as_str(), error))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(clean_error_response(status, &body));
        }

        let envelope: GraphqlResponse<T> = response.json().context("decode GraphQL response")?;
        if let Some(message) = joined_messages(envelope.errors.as_deref()) {
            bail!("GraphQL error: {message}");
        }
        envelope
            .data
            .ok_or_else(|| anyhow!("GraphQL response carried no data"))
    }

    pub fn fetch_members(&self, variables: &QueryVariables) -> Result<MembersPage> {
        let data: MembersData<serde_json::Value, PageInfo> = self
            .execute(MEMBERS_QUERY, variables)
            .context("fetch members")?;
        let members = data
            .members
            .edges
            .into_iter()
            .filter_map(|edge| decode_member(edge.node))
            .collect();
        Ok(MembersPage {
            members,
            page_info: data.members.page_info,
        })
    }

    pub fn fetch_filter_options(&self) -> Result<FilterOptions> {
        let data: MembersData<MemberSummary, Option<PageInfo>> = self
            .execute(FILTER_OPTIONS_QUERY, &serde_json::json!({}))
            .context("fetch filter options")?;
        let sample: Vec<MemberSummary> =
            data.members.edges.into_iter().map(|edge| edge.node).collect();
        tracing::debug!(sample = sample.len(), "filter options sample loaded");
        Ok(FilterOptions::from_summaries(&sample))
    }
}

/// Malformed rows are dropped so one bad record does not hide the page.
fn decode_member(node: serde_json::Value) -> Option<Member> {
    let id = node
        .get("id")
        .and_then(serde_json::Value::as_str)
        .unwrap_or("?")
        .to_owned();
    match serde_json::from_value(node) {
        Ok(member) => Some(member),
        Err(error) => {
            tracing::warn!(member = %id, %error, "skipping member row that failed to decode");
            None
        }
    }
}

#[derive(Debug, Serialize)]
struct GraphqlRequest<'a, V: ?Sized> {
    query: &'a str,
    variables: &'a V,
}

#[derive(Debug, Deserialize)]
struct GraphqlResponse<T> {
    data: Option<T>,
    #[serde(default)]
    errors: Option<Vec<GraphqlError>>,
}

#[derive(Debug, Deserialize)]
struct GraphqlError {
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "N: Deserialize<'de>, P: Deserialize<'de> + Default"))]
struct MembersData<N, P> {
    members: Connection<N, P>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Connection<N, P> {
    edges: Vec<Edge<N>>,
    #[serde(default)]
    page_info: P,
}

#[derive(Debug, Deserialize)]
struct Edge<N> {
    node: N,
}

#[derive(Debug, Deserialize)]
struct ErrorsEnvelope {
    errors: Option<Vec<GraphqlError>>,
}

fn joined_messages(errors: Option<&[GraphqlError]>) -> Option<String> {
    let messages: Vec<&str> = errors?
        .iter()
        .map(|error| error.message.trim())
        .filter(|message| !message.is_empty())
        .collect();
    if messages.is_empty() {
        return None;
    }
    Some(messages.join("; "))
}

fn connection_error(endpoint: &str, error: reqwest::Error) -> anyhow::Error {
    anyhow!(
        "cannot reach {} -- check api.endpoint and your network ({})",
        endpoint,
        error
    )
}

fn clean_error_response(status: StatusCode, body: &str) -> anyhow::Error {
    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return anyhow!(
            "server rejected credentials ({}) -- set api.token or MEMBERDESK_API_TOKEN",
            status.as_u16()
        );
    }

    if let Ok(parsed) = serde_json::from_str::<ErrorsEnvelope>(body)
        && let Some(message) = joined_messages(parsed.errors.as_deref())
    {
        return anyhow!("server error ({}): {}", status.as_u16(), message);
    }

    if body.len() < 100 && !body.contains('{') {
        return anyhow!("server error ({}): {}", status.as_u16(), body.trim());
    }

    anyhow!("server returned {}", status.as_u16())
}
