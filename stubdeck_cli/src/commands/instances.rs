//! `stubdeck instances`

use anyhow::Result;
use console::style;
use stubdeck_common::Instance;

/// Print the parsed instance registry
pub fn list(instances: &[Instance], active: usize) -> Result<()> {
    if instances.is_empty() {
        println!("No instances configured.");
        println!();
        println!(
            "Set {} (or pass --urls) to a comma-separated list of base URLs.",
            style(crate::config::URLS_ENV).cyan()
        );
        return Ok(());
    }

    println!("{:<4} {:<30} {}", "ID", "LABEL", "URL");
    println!("{}", "-".repeat(70));
    for (index, instance) in instances.iter().enumerate() {
        let marker = if index == active { "*" } else { " " };
        println!(
            "{:<4} {:<30} {} {}",
            instance.id,
            instance.label,
            style(&instance.url).cyan(),
            style(marker).green().bold()
        );
    }
    Ok(())
}
