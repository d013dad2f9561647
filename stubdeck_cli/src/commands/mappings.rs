//! `stubdeck mappings`, `export`, `import` and `delete`

use super::truncate;
use crate::admin::AdminClient;
use crate::commands::ui::write_export;
use anyhow::{Context, Result};
use console::style;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use stubdeck_common::interchange::{bulk_export_file_name, single_export_file_name};
use stubdeck_common::{filter_mappings, ImportDocument, MappingsDocument, StubMapping};

/// Fetch the stub list once and print the filtered mappings
pub async fn list(client: &AdminClient, search: Option<&str>) -> Result<()> {
    let envelope = client
        .list_mappings()
        .await
        .context("Failed to fetch mappings")?;
    let mappings = filter_mappings(&envelope.mappings, search.unwrap_or(""));

    if mappings.is_empty() {
        println!("No mappings.");
        return Ok(());
    }

    println!(
        "{:<38} {:<8} {:<40} {:<6} {}",
        "ID", "METHOD", "URL", "STATUS", "NAME"
    );
    println!("{}", "-".repeat(100));
    for mapping in &mappings {
        println!(
            "{:<38} {:<8} {:<40} {:<6} {}",
            mapping.id,
            mapping.method_label(),
            truncate(&list_url(mapping), 40),
            mapping.response.status,
            style(mapping.name().unwrap_or("")).dim()
        );
    }
    println!();
    println!("{} of {} mappings", mappings.len(), envelope.mappings.len());
    Ok(())
}

fn list_url(mapping: &StubMapping) -> String {
    if mapping.is_pattern() {
        format!("~ {}", mapping.url_label())
    } else {
        mapping.url_label().to_string()
    }
}

/// Export all mappings, or only `ids`, to a `{"mappings": [...]}` file
pub async fn export(client: &AdminClient, ids: &[String], out: Option<PathBuf>) -> Result<()> {
    let envelope = client
        .list_mappings()
        .await
        .context("Failed to fetch mappings")?;

    let mappings: Vec<StubMapping> = if ids.is_empty() {
        envelope.mappings
    } else {
        let wanted: HashSet<&str> = ids.iter().map(String::as_str).collect();
        let found: Vec<StubMapping> = envelope
            .mappings
            .into_iter()
            .filter(|m| wanted.contains(m.id.as_str()))
            .collect();
        let missing: Vec<&str> = ids
            .iter()
            .map(String::as_str)
            .filter(|id| !found.iter().any(|m| m.id == *id))
            .collect();
        if !missing.is_empty() {
            anyhow::bail!("Mapping(s) not found: {}", missing.join(", "));
        }
        found
    };

    let path = out.unwrap_or_else(|| PathBuf::from(export_file_name(&mappings)));
    let path = write_export(&path, &MappingsDocument::new(mappings)).await?;
    cliclack::log::success(format!("Exported to {}", style(path.display()).green()))?;
    Ok(())
}

/// `mapping-{id}.json` for a single mapping, `mappings-{timestamp}.json` otherwise
fn export_file_name(mappings: &[StubMapping]) -> String {
    match mappings {
        [single] => single_export_file_name(&single.id),
        _ => bulk_export_file_name(chrono::Utc::now().timestamp_millis()),
    }
}

/// Import a `{"mappings": [...]}` file
pub async fn import(client: &AdminClient, file: &Path) -> Result<()> {
    let text = tokio::fs::read_to_string(file)
        .await
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let document = ImportDocument::parse(&text)?;

    let existing = client
        .list_mappings()
        .await
        .context("Failed to fetch mappings")?;
    let known: HashSet<String> = existing.mappings.into_iter().map(|m| m.id).collect();
    let summary = document.classify(&known);

    client
        .import_mappings(document.as_json())
        .await
        .context("Import failed")?;
    cliclack::log::success(summary.to_string())?;
    Ok(())
}

/// Delete mappings concurrently, reporting each failure
pub async fn delete(client: &AdminClient, ids: &[String], yes: bool) -> Result<()> {
    if ids.is_empty() {
        anyhow::bail!("No mapping ids given");
    }

    if !yes {
        let confirmed = cliclack::confirm(format!("Delete {} mapping(s)?", ids.len()))
            .initial_value(false)
            .interact()?;
        if !confirmed {
            println!("Delete cancelled.");
            return Ok(());
        }
    }

    let results = client.delete_mappings(ids).await;
    let mut failed = 0;
    for (id, result) in &results {
        match result {
            Ok(()) => println!("  {} {}", style("deleted").green(), id),
            Err(e) => {
                failed += 1;
                println!("  {} {} ({})", style("failed").red(), id, e);
            }
        }
    }

    if failed > 0 {
        anyhow::bail!("Failed to delete {} mapping(s).", failed);
    }
    cliclack::log::success(format!("Deleted {} mapping(s)", results.len()))?;
    Ok(())
}
