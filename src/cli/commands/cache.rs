//! Cache command - inspect and clean the artifact cache

use crate::cache::{format_bytes, CacheState, CacheStore, EntryInfo};
use crate::cli::args::{CacheAction, CacheArgs, OutputFormat};
use crate::error::StepResult;
use crate::ui::{self, UiContext};
use console::style;

/// Execute the cache command
pub async fn execute(args: CacheArgs, store: &CacheStore) -> StepResult<()> {
    match args.action {
        CacheAction::List { format } => list_entries(store, format),
        CacheAction::Key { identity } => {
            println!("{}", store.entry(&identity).dir().display());
            Ok(())
        }
        CacheAction::Path => {
            println!("{}", store.config().root().display());
            Ok(())
        }
        CacheAction::Clear { incomplete, yes } => clear_entries(store, incomplete, yes).await,
    }
}

/// List all cache entries
fn list_entries(store: &CacheStore, format: OutputFormat) -> StepResult<()> {
    let entries = store.list()?;

    if entries.is_empty() {
        match format {
            OutputFormat::Json => println!("[]"),
            OutputFormat::Plain => {}
            OutputFormat::Table => println!("No cache entries found."),
        }
        return Ok(());
    }

    match format {
        OutputFormat::Table => print_entry_table(&entries),
        OutputFormat::Json => print_entry_json(&entries)?,
        OutputFormat::Plain => print_entry_plain(&entries),
    }

    Ok(())
}

fn print_entry_table(entries: &[EntryInfo]) {
    println!(
        "{:<66} {:<12} {:<10} {:<20}",
        "KEY", "STATE", "SIZE", "MODIFIED"
    );
    println!("{}", "-".repeat(110));

    let mut total = 0;
    for info in entries {
        let state_display = match info.state {
            CacheState::Complete => style("complete").green().to_string(),
            CacheState::Incomplete => style("incomplete").yellow().to_string(),
            CacheState::Missing => style("missing").dim().to_string(),
        };
        total += info.size_bytes;

        println!(
            "{:<66} {:<12} {:<10} {:<20}",
            info.entry.key(),
            state_display,
            format_bytes(info.size_bytes),
            info.modified_at.format("%Y-%m-%d %H:%M")
        );
    }

    println!();
    println!(
        "Total: {} entr{} ({})",
        entries.len(),
        if entries.len() == 1 { "y" } else { "ies" },
        format_bytes(total)
    );
}

fn print_entry_json(entries: &[EntryInfo]) -> StepResult<()> {
    #[derive(serde::Serialize)]
    struct EntryJson {
        key: String,
        path: String,
        state: CacheState,
        size_bytes: u64,
        modified_at: String,
    }

    let json_entries: Vec<EntryJson> = entries
        .iter()
        .map(|info| EntryJson {
            key: info.entry.key().to_string(),
            path: info.entry.dir().display().to_string(),
            state: info.state,
            size_bytes: info.size_bytes,
            modified_at: info.modified_at.to_rfc3339(),
        })
        .collect();

    println!("{}", serde_json::to_string_pretty(&json_entries)?);
    Ok(())
}

fn print_entry_plain(entries: &[EntryInfo]) {
    for info in entries {
        println!("{}", info.entry.dir().display());
    }
}

/// Remove entries not held by another process
async fn clear_entries(store: &CacheStore, incomplete_only: bool, yes: bool) -> StepResult<()> {
    let ctx = UiContext::detect().with_auto_yes(yes);

    let candidates = store
        .list()?
        .into_iter()
        .filter(|info| !incomplete_only || info.state != CacheState::Complete)
        .count();

    if candidates == 0 {
        ui::step_info(&ctx, "No cache entries to clear");
        return Ok(());
    }

    let prompt = format!(
        "Remove {} cache entr{}?",
        candidates,
        if candidates == 1 { "y" } else { "ies" }
    );
    if !ui::confirm(&ctx, &prompt, false).await? {
        ui::step_warn_hint(&ctx, "Aborted", "Pass --yes to clear without prompting");
        return Ok(());
    }

    let summary = store.clear(incomplete_only)?;
    ui::step_ok(
        &ctx,
        &format!(
            "Removed {} cache entr{}",
            summary.removed,
            if summary.removed == 1 { "y" } else { "ies" }
        ),
    );
    if summary.in_use > 0 {
        ui::step_info(
            &ctx,
            &format!("Skipped {} in use by another process", summary.in_use),
        );
    }

    Ok(())
}
