use crate::model::{ContributionMap, StreakStats};
use chrono::NaiveDate;

pub fn compute_streaks(map: &ContributionMap, today: NaiveDate) -> StreakStats {
    StreakStats {
        current_streak: current_streak(map, today),
        longest_streak: longest_streak(map),
        total_commits: map.total(),
    }
}

/// Consecutive active days ending at `today`. Zero when `today` itself has no
/// contributions.
fn current_streak(map: &ContributionMap, today: NaiveDate) -> u32 {
    let mut streak = 0;
    let mut day = Some(today);

    while let Some(d) = day {
        if map.get(d) == 0 {
            break;
        }
        streak += 1;
        day = d.pred_opt();
    }

    streak
}

fn longest_streak(map: &ContributionMap) -> u32 {
    let mut longest = 0;
    let mut run = 0;
    let mut prev: Option<NaiveDate> = None;

    for day in map.active_days() {
        run = match prev.and_then(|p| p.succ_opt()) {
            Some(next) if next == day => run + 1,
            _ => 1,
        };
        longest = longest.max(run);
        prev = Some(day);
    }

    longest
}
