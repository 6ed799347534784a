//! Local relay runs.

use std::io::Write;

use anyhow::{bail, Context as _, Result};
use chrono::{DateTime, Utc};
use relay_sdk::relay_cache::{InMemoryCache, ResponseCache};
use relay_sdk::relay_core::{RelayConfig, RequestContext};
use relay_sdk::relay_data::HttpOriginClient;
use relay_sdk::{Relay, RelayResponse};
use serde::Serialize;

use super::GetArgs;
use crate::context::Context;
use crate::output::{cache_badge, format_bytes, status_badge};

#[derive(Serialize)]
struct Attempt {
    attempt: u32,
    status: u16,
    cache_status: String,
    bytes: usize,
    total_duration_us: u64,
}

#[derive(Serialize)]
struct Report {
    attempts: Vec<Attempt>,
    #[serde(skip_serializing_if = "Option::is_none")]
    headers: Option<Vec<(String, String)>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stored_at: Option<String>,
    body: String,
}

/// Run the get command.
pub async fn run(args: GetArgs, ctx: &Context) -> Result<()> {
    if args.repeat == 0 {
        bail!("--repeat must be at least 1");
    }

    let config = cli_relay_config(&ctx.config, ctx.output.is_verbose());
    config.validate()?;

    let origin = HttpOriginClient::new(&config.origin)?;
    let relay = Relay::new(config, InMemoryCache::new(), origin).with_workload("relay-cli");
    let url = inbound_url(&args.host, &args.path);

    let mut attempts = Vec::new();
    let mut last: Option<RelayResponse> = None;
    let mut stored_at = None;

    for attempt in 1..=args.repeat {
        let mut request = RequestContext::parse("GET", &url)
            .with_context(|| format!("Invalid relay host or path: {}", args.host))?;

        let spinner = ctx.output.spinner(&format!("Request {}/{}", attempt, args.repeat));
        let outcome = relay.handle(&mut request).await;
        spinner.finish_and_clear();

        tracing::debug!(metrics = %outcome.metrics.to_json(), "relay finished");

        if !ctx.output.is_json() {
            ctx.output.kv(
                &format!("#{}", attempt),
                &format!(
                    "{} {} {} ({:.2}ms)",
                    status_badge(outcome.response.status.as_u16()),
                    cache_badge(&outcome.cache_status.to_string()),
                    format_bytes(outcome.response.body.len() as u64),
                    outcome.metrics.total_duration_us as f64 / 1000.0
                ),
            );
        }

        attempts.push(Attempt {
            attempt,
            status: outcome.response.status.as_u16(),
            cache_status: outcome.cache_status.to_string(),
            bytes: outcome.response.body.len(),
            total_duration_us: outcome.metrics.total_duration_us,
        });

        if args.include {
            let key = relay.cache_key(&request);
            if let Ok(Some(entry)) = relay.cache().get(&key).await {
                stored_at = format_timestamp(entry.stored_at);
            }
        }
        last = Some(outcome.response);
    }

    let Some(response) = last else {
        bail!("no request was sent");
    };

    let headers: Vec<(String, String)> = response
        .headers
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

    if ctx.output.is_json() {
        ctx.output.json(&Report {
            attempts,
            headers: args.include.then_some(headers),
            stored_at,
            body: response.body_text(),
        });
    } else {
        if args.include {
            ctx.output.header("Headers");
            for (name, value) in &headers {
                ctx.output.kv(name, value);
            }
            if let Some(stored_at) = &stored_at {
                ctx.output.kv("cached at", stored_at);
            }
            println!();
        }
        let mut stdout = std::io::stdout();
        stdout
            .write_all(&response.body)
            .context("Failed to write response body")?;
        stdout.flush()?;
    }

    if !response.status.is_success() {
        bail!("relay answered {}", response.status);
    }

    Ok(())
}

/// Relay configuration tuned for terminal use.
fn cli_relay_config(base: &RelayConfig, verbose: bool) -> RelayConfig {
    let mut config = base.clone();
    config.logging.format = "human".to_string();
    if !verbose {
        config.logging.level = "error".to_string();
    }
    config
}

/// Absolute inbound URL for a relay path.
fn inbound_url(host: &str, path: &str) -> String {
    format!(
        "{}/{}",
        host.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

fn format_timestamp(secs: u64) -> Option<String> {
    let secs = i64::try_from(secs).ok()?;
    DateTime::<Utc>::from_timestamp(secs, 0).map(|t| t.to_rfc3339())
}
