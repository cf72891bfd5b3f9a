// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use memberdesk_app::{FetchPlan, FilterOptions, MembersPage, QueryVariables};
use memberdesk_gql::Client;
use memberdesk_tui::InternalEvent;
use std::sync::mpsc::Sender;
use std::thread;

/// Runs GraphQL fetches on worker threads and reports back to the UI loop.
#[derive(Debug, Clone)]
pub struct GqlRuntime {
    client: Client,
}

impl GqlRuntime {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

impl memberdesk_tui::AppRuntime for GqlRuntime {
    fn load_members(&mut self, variables: &QueryVariables) -> Result<MembersPage> {
        self.client.fetch_members(variables)
    }

    fn load_filter_options(&mut self) -> Result<FilterOptions> {
        self.client.fetch_filter_options()
    }

    fn spawn_members_fetch(&mut self, plan: FetchPlan, tx: Sender<InternalEvent>) -> Result<()> {
        let client = self.client.clone();
        thread::Builder::new()
            .name(format!("members-fetch-{}", plan.token.get()))
            .spawn(move || {
                let result = client
                    .fetch_members(&plan.variables)
                    .map_err(|error| format!("{error:#}"));
                let _ = tx.send(InternalEvent::MembersLoaded {
                    token: plan.token,
                    result,
                });
            })
            .context("spawn members fetch thread")?;
        Ok(())
    }

    fn spawn_filter_options(&mut self, tx: Sender<InternalEvent>) -> Result<()> {
        let client = self.client.clone();
        thread::Builder::new()
            .name("filter-options".to_owned())
            .spawn(move || {
                let result = client
                    .fetch_filter_options()
                    .map_err(|error| format!("{error:#}"));
                let _ = tx.send(InternalEvent::FilterOptionsLoaded(result));
            })
            .context("spawn filter options thread")?;
        Ok(())
    }
}
