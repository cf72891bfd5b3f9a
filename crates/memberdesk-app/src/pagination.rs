// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::ids::RequestToken;
use crate::model::{PageInfo, PageSize};

/// Cursor bookkeeping. `cursor_history[i]` is the `after` cursor that
/// fetches page `i + 2`, so page `n > 1` has `n - 1` history entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaginationState {
    pub current_page: u32,
    pub page_size: PageSize,
    pub has_next_page: bool,
    pub end_cursor: Option<String>,
    pub cursor_history: Vec<String>,
}

impl Default for PaginationState {
    fn default() -> Self {
        Self::first_page(PageSize::default())
    }
}

impl PaginationState {
    pub fn first_page(page_size: PageSize) -> Self {
        Self {
            current_page: 1,
            page_size,
            has_next_page: false,
            end_cursor: None,
            cursor_history: Vec::new(),
        }
    }

    /// The `after` cursor that loads the current page.
    pub fn current_cursor(&self) -> Option<&str> {
        if self.current_page <= 1 {
            return None;
        }
        self.cursor_history.last().map(String::as_str)
    }

    pub fn can_go_next(&self) -> bool {
        self.has_next_page && self.end_cursor.is_some()
    }

    pub fn can_go_previous(&self) -> bool {
        self.current_page > 1
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FetchStatus {
    #[default]
    Idle,
    Loading,
    Failed(String),
}

/// A fetch the caller must execute and report back with `complete`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub token: RequestToken,
    pub cursor: Option<String>,
    pub page_size: PageSize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    Applied,
    Failed,
    Stale,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PaginationController {
    state: PaginationState,
    status: FetchStatus,
    latest: RequestToken,
}

impl PaginationController {
    pub fn new(page_size: PageSize) -> Self {
        Self {
            state: PaginationState::first_page(page_size),
            status: FetchStatus::Idle,
            latest: RequestToken::default(),
        }
    }

    pub fn state(&self) -> &PaginationState {
        &self.state
    }

    pub fn status(&self) -> &FetchStatus {
        &self.status
    }

    pub fn is_loading(&self) -> bool {
        self.status == FetchStatus::Loading
    }

    pub fn reset(&mut self) -> FetchRequest {
        self.state = PaginationState::first_page(self.state.page_size);
        self.issue(None)
    }

    pub fn next(&mut self) -> Option<FetchRequest> {
        if self.is_loading() || !self.state.can_go_next() {
            return None;
        }
        let cursor = self.state.end_cursor.clone()?;
        self.state.cursor_history.push(cursor.clone());
        self.state.current_page += 1;
        Some(self.issue(Some(cursor)))
    }

    pub fn previous(&mut self) -> Option<FetchRequest> {
        if self.is_loading() || !self.state.can_go_previous() {
            return None;
        }
        self.state.cursor_history.pop();
        self.state.current_page -= 1;
        let cursor = self.state.current_cursor().map(str::to_owned);
        Some(self.issue(cursor))
    }

    /// Re-issues the fetch for the page already on screen.
    pub fn retry(&mut self) -> FetchRequest {
        let cursor = self.state.current_cursor().map(str::to_owned);
        self.issue(cursor)
    }

    pub fn set_page_size(&mut self, page_size: PageSize) -> Option<FetchRequest> {
        if self.state.page_size == page_size {
            return None;
        }
        self.state.page_size = page_size;
        Some(self.reset())
    }

    pub fn complete(&mut self, token: RequestToken, result: Result<&PageInfo, &str>) -> FetchOutcome {
        if token != self.latest {
            tracing::debug!(
                token = token.get(),
                latest = self.latest.get(),
                "dropping stale members response"
            );
            return FetchOutcome::Stale;
        }

        match result {
            Ok(page_info) => {
                self.state.has_next_page = page_info.has_next_page;
                self.state.end_cursor = page_info.end_cursor.clone();
                self.status = FetchStatus::Idle;
                FetchOutcome::Applied
            }
            Err(message) => {
                self.state.has_next_page = false;
                self.status = FetchStatus::Failed(message.to_owned());
                FetchOutcome::Failed
            }
        }
    }

    fn issue(&mut self, cursor: Option<String>) -> FetchRequest {
        self.latest = self.latest.next();
        self.status = FetchStatus::Loading;
        FetchRequest {
            token: self.latest,
            cursor,
            page_size: self.state.page_size,
        }
    }
}
