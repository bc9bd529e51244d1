use crate::model::{CalendarOutput, HeatCell, StreaksOutput};
use anyhow::Result;
use console::style;

const WEEKDAYS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

pub fn output_json<T: serde::Serialize>(output: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(output)?);
    Ok(())
}

pub fn output_ndjson(calendar: &CalendarOutput) -> Result<()> {
    for cell in calendar.weeks.iter().flat_map(|week| week.iter().flatten()) {
        println!("{}", serde_json::to_string(cell)?);
    }
    Ok(())
}

fn level_glyph(cell: &HeatCell) -> String {
    match cell.level {
        0 => style("·").dim().to_string(),
        1 => style("■").color256(22).to_string(),
        2 => style("■").color256(28).to_string(),
        3 => style("■").color256(34).to_string(),
        _ => style("■").color256(77).to_string(),
    }
}

fn month_row(calendar: &CalendarOutput) -> String {
    let width = calendar.weeks.len() * 2;
    let mut row = vec![' '; width];
    let mut free_from = 0;
    for label in &calendar.months {
        let at = label.week_index * 2;
        if at < free_from || at + label.month.len() > width {
            continue;
        }
        for (i, ch) in label.month.chars().enumerate() {
            row[at + i] = ch;
        }
        free_from = at + label.month.len() + 1;
    }
    row.into_iter().collect()
}

pub fn output_calendar(calendar: &CalendarOutput) -> Result<()> {
    let title = match &calendar.login {
        Some(login) => format!("Contribution Calendar {} ({login})", calendar.year),
        None => format!("Contribution Calendar {}", calendar.year),
    };
    println!("{}", style(title).bold());
    println!("{}", "─".repeat(50));
    print_stats_line(calendar.stats.total_commits, calendar.stats.current_streak, calendar.stats.longest_streak);
    println!();

    if calendar.weeks.is_empty() {
        println!("No days to display");
        return Ok(());
    }

    println!("    {}", style(month_row(calendar)).dim());
    for (weekday, name) in WEEKDAYS.iter().enumerate() {
        let mut line = String::new();
        for week in &calendar.weeks {
            match &week[weekday] {
                Some(cell) => line.push_str(&level_glyph(cell)),
                None => line.push(' '),
            }
            line.push(' ');
        }
        println!("{} {}", style(name).dim(), line.trim_end());
    }

    println!("\n{}", style("Legend").bold());
    println!(
        "  Less {} {} {} {} {} More",
        style("·").dim(),
        style("■").color256(22),
        style("■").color256(28),
        style("■").color256(34),
        style("■").color256(77)
    );
    Ok(())
}

pub fn output_streaks(streaks: &StreaksOutput) -> Result<()> {
    println!("{}", style(format!("Streaks {} (as of {})", streaks.year, streaks.today)).bold());
    println!("{}", "─".repeat(50));
    print_stats_line(streaks.stats.total_commits, streaks.stats.current_streak, streaks.stats.longest_streak);
    println!("Active days: {}", style(streaks.contributions.active_days().count()).cyan());
    Ok(())
}

fn print_stats_line(total: u64, current: u32, longest: u32) {
    println!(
        "Total commits: {}  Current streak: {} days  Longest streak: {} days",
        style(total).cyan(),
        style(current).green(),
        style(longest).yellow()
    );
}
