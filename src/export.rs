use crate::activity::overview;
use crate::cli::CommonArgs;
use crate::contrib::output::output_json;
use crate::model::{ExportOutput, SCHEMA_VERSION};
use crate::source::{load_snapshot, Snapshot};
use anyhow::Context;
use chrono::Utc;
use console::style;

pub fn prepare_export(snapshot: &Snapshot, common: &CommonArgs) -> ExportOutput {
    ExportOutput {
        version: SCHEMA_VERSION,
        generated_at: Utc::now(),
        login: snapshot.login.clone(),
        year: common.year_filter(),
        profile: snapshot.profile.clone(),
        repositories: snapshot.fetches.clone(),
    }
}

pub async fn exec(common: CommonArgs, json: bool, ndjson: bool) -> anyhow::Result<()> {
    let snapshot = load_snapshot(&common, !(json || ndjson))
        .await
        .context("Failed to load repository activity")?;
    let export = prepare_export(&snapshot, &common);

    if json {
        output_json(&export)?;
    } else if ndjson {
        output_ndjson(&export)?;
    } else {
        output_summary(&export)?;
    }

    Ok(())
}

fn output_ndjson(export: &ExportOutput) -> anyhow::Result<()> {
    for fetch in &export.repositories {
        println!("{}", serde_json::to_string(fetch)?);
    }
    Ok(())
}

fn output_summary(export: &ExportOutput) -> anyhow::Result<()> {
    println!("{}", style("Export Summary").bold());
    println!("{}", "─".repeat(50));

    let repositories: Vec<_> = export
        .repositories
        .iter()
        .cloned()
        .map(|fetch| fetch.into_repository())
        .collect();
    let totals = overview(&repositories);
    let failed: Vec<_> = export.repositories.iter().filter(|f| f.is_failed()).collect();

    if let Some(login) = &export.login {
        println!("User: {}", style(login).bold());
    }
    println!("Year: {}", export.year);
    println!("Repositories: {}", style(totals.repos_count).cyan());
    println!("Commits: {}", style(totals.total_commits).green());
    println!("Pull requests: {}", style(totals.total_prs).cyan());
    println!("Stars: {}", style(totals.total_stars).yellow());

    if !failed.is_empty() {
        println!("\n{}", style(format!("Failed fetches: {}", failed.len())).red());
        for fetch in failed {
            let name = if fetch.repo.full_name.is_empty() {
                &fetch.repo.name
            } else {
                &fetch.repo.full_name
            };
            println!(
                "  {} {}",
                name,
                style(fetch.error.as_deref().unwrap_or_default()).dim()
            );
        }
    }

    println!("\nUse --json or --ndjson flags to export the raw data.");
    Ok(())
}
