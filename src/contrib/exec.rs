use super::{build_calendar_grid, build_contribution_map, compute_streaks, heat_cells, month_labels};
use super::output::{output_calendar, output_json, output_ndjson, output_streaks};
use crate::cli::CommonArgs;
use crate::model::{CalendarOutput, StreaksOutput, SCHEMA_VERSION};
use crate::source::load_snapshot;
use anyhow::Context;
use chrono::Utc;

pub async fn exec(common: CommonArgs, json: bool, ndjson: bool) -> anyhow::Result<()> {
    let today = common.today();
    let year = common.year_filter();

    let snapshot = load_snapshot(&common, !(json || ndjson))
        .await
        .context("Failed to load repository activity")?;
    let repositories = snapshot.repositories();

    let map = build_contribution_map(&repositories, year);
    let stats = compute_streaks(&map, today);
    let grid = build_calendar_grid(year, today);
    tracing::debug!(
        days = map.len(),
        weeks = grid.weeks.len(),
        total = stats.total_commits,
        "built contribution calendar"
    );

    let output = CalendarOutput {
        version: SCHEMA_VERSION,
        generated_at: Utc::now(),
        login: snapshot.login.clone(),
        year,
        today,
        stats,
        months: month_labels(&grid),
        weeks: heat_cells(&grid, &map),
    };

    if json {
        output_json(&output)?;
    } else if ndjson {
        output_ndjson(&output)?;
    } else {
        output_calendar(&output)?;
    }

    Ok(())
}

pub async fn exec_streaks(common: CommonArgs, json: bool) -> anyhow::Result<()> {
    let today = common.today();
    let year = common.year_filter();

    let snapshot = load_snapshot(&common, !json)
        .await
        .context("Failed to load repository activity")?;

    let contributions = build_contribution_map(&snapshot.repositories(), year);
    let stats = compute_streaks(&contributions, today);

    let output = StreaksOutput {
        version: SCHEMA_VERSION,
        generated_at: Utc::now(),
        login: snapshot.login.clone(),
        year,
        today,
        stats,
        contributions,
    };

    if json {
        output_json(&output)?;
    } else {
        output_streaks(&output)?;
    }

    Ok(())
}
