// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

mod config;
mod logging;
mod runtime;

use anyhow::{Context, Result};
use config::Config;
use memberdesk_app::AppState;
use memberdesk_tui::UiOptions;
use runtime::GqlRuntime;
use std::env;
use std::path::PathBuf;
use time::{OffsetDateTime, UtcOffset};

fn main() {
    if let Err(error) = run() {
        eprintln!("{error:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    // The local offset must be read before any thread is spawned.
    let offset = UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC);
    let today = OffsetDateTime::now_local()
        .unwrap_or_else(|_| OffsetDateTime::now_utc())
        .date();

    let options = parse_cli_args(env::args().skip(1), Config::default_path()?)?;
    if options.show_help {
        print_help();
        return Ok(());
    }

    if options.print_config_path {
        println!("{}", options.config_path.display());
        return Ok(());
    }

    if options.print_example {
        print!("{}", Config::example_config(&options.config_path));
        return Ok(());
    }

    let config = Config::load(&options.config_path).with_context(|| {
        format!(
            "load config {}; run `memberdesk --print-example-config` to generate a template",
            options.config_path.display()
        )
    })?;

    let client = memberdesk_gql::Client::new(
        &config.api_endpoint()?,
        &config.api_token(),
        config.api_timeout()?,
    )
    .with_context(|| {
        format!(
            "invalid [api] config in {}; fix endpoint/timeout values",
            options.config_path.display()
        )
    })?;
    let ui_options = UiOptions {
        page_size: config.page_size(),
        debounce: config.debounce()?,
        today,
        offset,
    };
    if options.check_only {
        println!(
            "config ok: endpoint {} ({}), page size {}",
            client.endpoint(),
            if client.has_token() {
                "token set"
            } else {
                "no token"
            },
            ui_options.page_size.get()
        );
        return Ok(());
    }

    logging::init(&config.log_level(), &config.log_path()?)?;
    tracing::info!(
        endpoint = client.endpoint(),
        authenticated = client.has_token(),
        page_size = ui_options.page_size.get(),
        "starting members browser"
    );

    let mut state = AppState::default();
    let mut runtime = GqlRuntime::new(client);
    memberdesk_tui::run_app(&mut state, &mut runtime, ui_options)
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct CliOptions {
    config_path: PathBuf,
    print_config_path: bool,
    print_example: bool,
    check_only: bool,
    show_help: bool,
}

fn parse_cli_args<I, S>(args: I, default_config_path: PathBuf) -> Result<CliOptions>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut options = CliOptions {
        config_path: default_config_path,
        print_config_path: false,
        print_example: false,
        check_only: false,
        show_help: false,
    };

    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        match arg.as_ref() {
            "--config" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow::anyhow!("--config requires a file path"))?;
                options.config_path = PathBuf::from(value.as_ref());
            }
            "--print-config-path" => {
                options.print_config_path = true;
            }
            "--print-example-config" => {
                options.print_example = true;
            }
            "--check" => {
                options.check_only = true;
            }
            "--help" | "-h" => {
                options.show_help = true;
            }
            unknown => {
                return Err(anyhow::anyhow!(
                    "unknown argument {unknown:?}; run with --help to see supported options"
                ));
            }
        }
    }

    Ok(options)
}

fn print_help() {
    println!("memberdesk: browse and filter members from a GraphQL API");
    println!("  --config <path>          Use a specific config path");
    println!("  --print-config-path      Print resolved config path");
    println!("  --print-example-config   Print a config template");
    println!("  --check                  Validate config and exit");
    println!("  --help                   Show this help");
    println!();
    println!("environment:");
    println!("  {}   Config file path", config::CONFIG_PATH_ENV);
    println!("  {}     Bearer token for the API", config::TOKEN_ENV);
    println!("  {}      GraphQL endpoint", config::ENDPOINT_ENV);
    println!("  {}           Log filter (for example debug)", config::LOG_ENV);
}
