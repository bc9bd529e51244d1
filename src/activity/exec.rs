use super::{
    labelled_months, language_evolution, language_stats, monthly_code_activity, monthly_contributions, overview,
    repository_insights,
};
use crate::cli::CommonArgs;
use crate::contrib::output::output_json;
use crate::model::{ActivityOutput, InsightMetric, InsightsOutput, LanguagesOutput, SCHEMA_VERSION};
use crate::source::load_snapshot;
use anyhow::Context;
use chrono::{Datelike, Utc};
use console::style;

pub async fn exec_activity(common: CommonArgs, json: bool) -> anyhow::Result<()> {
    let year = common.year_filter();
    let code_year = year.year().unwrap_or_else(|| common.today().year());

    let snapshot = load_snapshot(&common, !json)
        .await
        .context("Failed to load repository activity")?;
    let repositories = snapshot.repositories();

    let output = ActivityOutput {
        version: SCHEMA_VERSION,
        generated_at: Utc::now(),
        login: snapshot.login.clone(),
        year,
        overview: overview(&repositories),
        monthly_contributions: monthly_contributions(&repositories),
        monthly_code_activity: labelled_months(&monthly_code_activity(&repositories, code_year)),
    };

    if json {
        return output_json(&output);
    }

    println!("{}", style("Activity Overview").bold());
    println!("{}", "─".repeat(50));
    let o = &output.overview;
    println!("Repositories: {}", style(o.repos_count).cyan());
    println!("Languages: {}", style(o.languages_count).cyan());
    println!("Stars: {}", style(o.total_stars).yellow());
    println!("Forks: {}", style(o.total_forks).yellow());
    println!("Pull requests: {}", style(o.total_prs).cyan());
    println!("Commits: {}", style(o.total_commits).green());
    if snapshot.failures() > 0 {
        println!(
            "{}",
            style(format!("{} repositories could not be fetched", snapshot.failures())).red()
        );
    }

    println!("\n{}", style("Monthly Contributions").bold());
    let max = output.monthly_contributions.values().copied().max().unwrap_or(1).max(1);
    for (month, count) in &output.monthly_contributions {
        let bar = "█".repeat(((*count as f64 / max as f64) * 30.0).ceil() as usize);
        println!("{month} {:>5} {}", count, style(bar).green());
    }

    println!("\n{}", style(format!("Code Created in {code_year} (repository size, KB)")).bold());
    for bucket in &output.monthly_code_activity {
        println!("{} {:>8}", bucket.month, bucket.size);
    }

    Ok(())
}

pub async fn exec_languages(common: CommonArgs, json: bool) -> anyhow::Result<()> {
    let snapshot = load_snapshot(&common, !json)
        .await
        .context("Failed to load repository activity")?;
    let repositories = snapshot.repositories();

    let output = LanguagesOutput {
        version: SCHEMA_VERSION,
        generated_at: Utc::now(),
        login: snapshot.login.clone(),
        languages: language_stats(&repositories),
        evolution: language_evolution(&repositories),
    };

    if json {
        return output_json(&output);
    }

    println!(
        "{:<24} {:>12} {:>8}",
        style("Language").bold(),
        style("Bytes").bold(),
        style("Share").bold()
    );
    println!("{}", "─".repeat(46));
    for share in output.languages.iter().take(20) {
        println!("{:<24} {:>12} {:>7.1}%", share.language, share.bytes, share.percentage);
    }
    if output.languages.len() > 20 {
        println!("\n... and {} more languages", output.languages.len() - 20);
    }

    if !output.evolution.is_empty() {
        println!("\n{}", style("Primary Language by Creation Year").bold());
        for (year, languages) in &output.evolution {
            let mut ranked: Vec<_> = languages.iter().collect();
            ranked.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));
            let line = ranked
                .iter()
                .map(|(lang, count)| format!("{lang} ({count})"))
                .collect::<Vec<_>>()
                .join(", ");
            println!("{year}: {line}");
        }
    }

    Ok(())
}

fn format_metric(metric: InsightMetric, value: u64) -> String {
    match metric {
        InsightMetric::Size => format!("{:.1} MB", value as f64 / 1024.0),
        InsightMetric::Loc => format!("{:.1}k", value as f64 / 1000.0),
        InsightMetric::Stars | InsightMetric::Forks => value.to_string(),
    }
}

pub async fn exec_repos(
    common: CommonArgs,
    metric: InsightMetric,
    filter: Option<String>,
    ascending: bool,
    json: bool,
) -> anyhow::Result<()> {
    let snapshot = load_snapshot(&common, !json)
        .await
        .context("Failed to load repository activity")?;
    let repositories = snapshot.repositories();

    let output = InsightsOutput {
        version: SCHEMA_VERSION,
        generated_at: Utc::now(),
        login: snapshot.login.clone(),
        metric,
        repositories: repository_insights(&repositories, metric, filter.as_deref(), ascending),
        filter,
        ascending,
    };

    if json {
        return output_json(&output);
    }

    println!("{}", style(format!("Repositories by {metric}")).bold());
    println!("{}", "─".repeat(60));
    if output.repositories.is_empty() {
        println!("No repositories match.");
        return Ok(());
    }

    let max = output.repositories.iter().map(|r| r.value).max().unwrap_or(1).max(1);
    for insight in &output.repositories {
        let bar = "█".repeat(((insight.value as f64 / max as f64) * 24.0).ceil() as usize);
        println!(
            "{:<28} {:>12} {}",
            insight.name,
            format_metric(metric, insight.value),
            style(bar).cyan()
        );
    }

    Ok(())
}
