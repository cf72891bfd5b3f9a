// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::Result;
use time::UtcOffset;

use crate::filters::{FilterState, FilterUpdate};
use crate::ids::RequestToken;
use crate::model::{FilterOptions, Member, MembersPage, PageSize};
use crate::pagination::{FetchOutcome, FetchRequest, FetchStatus, PaginationController};
use crate::query::{QueryVariables, compile};

pub const FETCH_FAILED_MESSAGE: &str =
    "Failed to fetch members. Please check your GraphQL endpoint and authentication.";
pub const EMPTY_RESULT_MESSAGE: &str = "No members found.";

/// A members fetch ready to hand to the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchPlan {
    pub token: RequestToken,
    pub variables: QueryVariables,
}

/// Filter state, pagination and the rows on screen for the members table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MembersView {
    filters: FilterState,
    fetched: FilterState,
    pagination: PaginationController,
    rows: Vec<Member>,
    options: FilterOptions,
    offset: UtcOffset,
    loaded_once: bool,
}

impl MembersView {
    pub fn new(page_size: PageSize, offset: UtcOffset) -> Self {
        Self {
            filters: FilterState::default(),
            fetched: FilterState::default(),
            pagination: PaginationController::new(page_size),
            rows: Vec::new(),
            options: FilterOptions::default(),
            offset,
            loaded_once: false,
        }
    }

    pub fn filters(&self) -> &FilterState {
        &self.filters
    }

    pub fn pagination(&self) -> &PaginationController {
        &self.pagination
    }

    pub fn rows(&self) -> &[Member] {
        &self.rows
    }

    pub fn options(&self) -> &FilterOptions {
        &self.options
    }

    pub fn offset(&self) -> UtcOffset {
        self.offset
    }

    pub fn set_options(&mut self, options: FilterOptions) {
        self.options = options;
    }

    pub fn is_loading(&self) -> bool {
        self.pagination.is_loading()
    }

    pub fn error_message(&self) -> Option<&str> {
        match self.pagination.status() {
            FetchStatus::Failed(message) => Some(message),
            FetchStatus::Idle | FetchStatus::Loading => None,
        }
    }

    /// True once a successful load came back with no rows.
    pub fn is_empty_result(&self) -> bool {
        self.loaded_once
            && self.rows.is_empty()
            && *self.pagination.status() == FetchStatus::Idle
    }

    /// True when edited filters differ from the ones the rows were fetched
    /// with.
    pub fn has_pending_filters(&self) -> bool {
        self.filters != self.fetched
    }

    /// Back to page one with the current filters.
    pub fn reset(&mut self) -> FetchPlan {
        self.fetched = self.filters.clone();
        let request = self.pagination.reset();
        self.plan(request)
    }

    /// Resets only when the edited filters differ from the fetched ones.
    pub fn flush_filters(&mut self) -> Option<FetchPlan> {
        if !self.has_pending_filters() {
            return None;
        }
        Some(self.reset())
    }

    /// Replaces one filter field and resets only if the result differs from
    /// what is on screen.
    pub fn apply_filter(&mut self, update: FilterUpdate) -> Option<FetchPlan> {
        self.filters.apply(update);
        self.flush_filters()
    }

    /// Replaces one filter field without fetching. Paging keeps using the
    /// fetched filters until `flush_filters` or `reset` runs.
    pub fn update_filters(&mut self, update: FilterUpdate) -> bool {
        self.filters.apply(update)
    }

    pub fn clear_filters(&mut self) -> Option<FetchPlan> {
        self.filters.clear();
        self.flush_filters()
    }

    pub fn next_page(&mut self) -> Option<FetchPlan> {
        let request = self.pagination.next()?;
        Some(self.plan(request))
    }

    pub fn previous_page(&mut self) -> Option<FetchPlan> {
        let request = self.pagination.previous()?;
        Some(self.plan(request))
    }

    pub fn retry(&mut self) -> FetchPlan {
        let request = self.pagination.retry();
        self.plan(request)
    }

    pub fn set_page_size(&mut self, page_size: PageSize) -> Option<FetchPlan> {
        let request = self.pagination.set_page_size(page_size)?;
        Some(self.plan(request))
    }

    pub fn complete(&mut self, token: RequestToken, result: Result<MembersPage>) -> FetchOutcome {
        let outcome = match &result {
            Ok(page) => self.pagination.complete(token, Ok(&page.page_info)),
            Err(_) => self.pagination.complete(token, Err(FETCH_FAILED_MESSAGE)),
        };

        match (outcome, result) {
            (FetchOutcome::Applied, Ok(page)) => {
                tracing::debug!(
                    token = token.get(),
                    rows = page.members.len(),
                    page = self.pagination.state().current_page,
                    "members page loaded"
                );
                self.rows = page.members;
                self.loaded_once = true;
            }
            (FetchOutcome::Failed, Err(error)) => {
                tracing::warn!(token = token.get(), "members fetch failed: {error:#}");
                self.rows.clear();
            }
            _ => {}
        }
        outcome
    }

    fn plan(&self, request: FetchRequest) -> FetchPlan {
        FetchPlan {
            token: request.token,
            variables: compile(
                &self.fetched,
                request.cursor.as_deref(),
                request.page_size,
                self.offset,
            ),
        }
    }
}
