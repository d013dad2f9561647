//! `stubdeck requests`

use crate::admin::{AdminClient, RequestScope};
use anyhow::{Context, Result};
use chrono::{Local, TimeZone};
use console::style;
use stubdeck_common::filter_requests;

/// Fetch the request log once and print the filtered entries
pub async fn list(client: &AdminClient, scope: RequestScope, search: Option<&str>) -> Result<()> {
    let envelope = client
        .list_requests(scope)
        .await
        .context("Failed to fetch the request log")?;
    let query = search.unwrap_or("");
    let records = filter_requests(&envelope.requests, query);

    if records.is_empty() {
        println!("No requests.");
    } else {
        println!(
            "{:<10} {:<8} {:<50} {:<7} {}",
            "TIME", "METHOD", "URL", "STATUS", "MATCHED"
        );
        println!("{}", "-".repeat(86));
    }

    for record in &records {
        let time = record
            .request
            .logged_date
            .and_then(|ms| Local.timestamp_millis_opt(ms).single())
            .map(|t| t.format("%H:%M:%S").to_string())
            .unwrap_or_else(|| "-".to_string());
        let matched = match record.matched_stub_id() {
            Some(id) => style(super::truncate(id, 12)).green(),
            None => style("NO MATCH".to_string()).red(),
        };
        println!(
            "{:<10} {:<8} {:<50} {:<7} {}",
            time,
            record.request.method,
            super::truncate(&record.request.url, 50),
            record.response_definition.status,
            matched
        );
    }

    println!();
    if query.is_empty() {
        println!("{} of {} requests", envelope.requests.len(), envelope.meta.total);
    } else {
        println!(
            "{} matching, searched {} of {} requests",
            records.len(),
            envelope.requests.len(),
            envelope.meta.total
        );
        if scope != RequestScope::All && envelope.meta.total > envelope.requests.len() {
            println!("{}", style("Pass --all to search the whole log.").dim());
        }
    }
    Ok(())
}
