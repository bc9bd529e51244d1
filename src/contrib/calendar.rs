use crate::model::{CalendarGrid, ContributionMap, HeatCell, MonthLabel, YearFilter};
use chrono::{Datelike, Days, NaiveDate};

/// Heatmap intensity for a day's contribution count.
pub fn level_of(count: u64) -> u8 {
    match count {
        0 => 0,
        1..=3 => 1,
        4..=6 => 2,
        7..=9 => 3,
        _ => 4,
    }
}

/// Week rows for the calendar of the filtered year.
///
/// Rows start on the Sunday on or before January 1st. The current year stops
/// at `today`; `All` renders `today`'s year. Slots outside the range are
/// `None`, and rows without any in-range day are not emitted.
pub fn build_calendar_grid(year_filter: YearFilter, today: NaiveDate) -> CalendarGrid {
    let year = year_filter.year().unwrap_or_else(|| today.year());
    let mut grid = CalendarGrid {
        year,
        weeks: Vec::new(),
    };

    let (Some(jan_first), Some(dec_last)) = (
        NaiveDate::from_ymd_opt(year, 1, 1),
        NaiveDate::from_ymd_opt(year, 12, 31),
    ) else {
        return grid;
    };
    let end = if year == today.year() { today } else { dec_last };

    let lead = jan_first.weekday().num_days_from_sunday() as u64;
    let Some(mut week_start) = jan_first.checked_sub_days(Days::new(lead)) else {
        return grid;
    };

    while week_start <= end {
        let mut week = [None; 7];
        for (offset, slot) in week.iter_mut().enumerate() {
            if let Some(date) = week_start.checked_add_days(Days::new(offset as u64)) {
                if date.year() == year && date <= end {
                    *slot = Some(date);
                }
            }
        }
        if week.iter().any(Option::is_some) {
            grid.weeks.push(week);
        }
        match week_start.checked_add_days(Days::new(7)) {
            Some(next) => week_start = next,
            None => break,
        }
    }

    grid
}

/// Month names anchored to the first week whose Sunday falls in that month.
pub fn month_labels(grid: &CalendarGrid) -> Vec<MonthLabel> {
    let mut labels = Vec::new();
    let mut current = None;

    for (week_index, week) in grid.weeks.iter().enumerate() {
        if let Some(sunday) = week[0] {
            if current != Some(sunday.month()) {
                labels.push(MonthLabel {
                    month: sunday.format("%b").to_string(),
                    week_index,
                });
                current = Some(sunday.month());
            }
        }
    }

    labels
}

pub fn heat_cells(grid: &CalendarGrid, map: &ContributionMap) -> Vec<[Option<HeatCell>; 7]> {
    grid.weeks
        .iter()
        .map(|week| {
            week.map(|slot| {
                slot.map(|date| {
                    let count = map.get(date);
                    HeatCell {
                        date,
                        count,
                        level: level_of(count),
                    }
                })
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Weekday;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn level_thresholds() {
        assert_eq!(level_of(0), 0);
        assert_eq!(level_of(1), 1);
        assert_eq!(level_of(3), 1);
        assert_eq!(level_of(4), 2);
        assert_eq!(level_of(6), 2);
        assert_eq!(level_of(7), 3);
        assert_eq!(level_of(9), 3);
        assert_eq!(level_of(10), 4);
        assert_eq!(level_of(u64::MAX), 4);
    }

    #[test]
    fn current_year_truncates_at_today() {
        let today = day(2024, 6, 15);
        let grid = build_calendar_grid(YearFilter::Year(2024), today);

        assert!(grid.weeks.iter().all(|w| w.len() == 7));
        assert!(grid.days().all(|d| d <= today));
        assert_eq!(grid.days().last(), Some(today));
        assert_eq!(grid.days().next(), Some(day(2024, 1, 1)));
        assert_eq!(grid.days().count(), 167);
    }

    #[test]
    fn first_row_is_padded_to_sunday() {
        // 2024-01-01 is a Monday.
        let grid = build_calendar_grid(YearFilter::Year(2024), day(2024, 6, 15));
        assert_eq!(grid.weeks[0][0], None);
        assert_eq!(grid.weeks[0][1], Some(day(2024, 1, 1)));
        for week in &grid.weeks {
            for (index, slot) in week.iter().enumerate() {
                if let Some(date) = slot {
                    assert_eq!(date.weekday().num_days_from_sunday() as usize, index);
                }
            }
        }
    }

    #[test]
    fn past_year_covers_whole_year() {
        let grid = build_calendar_grid(YearFilter::Year(2023), day(2024, 6, 15));
        assert_eq!(grid.days().count(), 365);
        assert_eq!(grid.days().last(), Some(day(2023, 12, 31)));
        // 2023-01-01 is a Sunday, so no leading padding.
        assert_eq!(grid.weeks[0][0], Some(day(2023, 1, 1)));
        assert_eq!(grid.weeks.len(), 53);
        let last = grid.weeks.last().unwrap();
        assert_eq!(last[0], Some(day(2023, 12, 31)));
        assert!(last[1..].iter().all(Option::is_none));
    }

    #[test]
    fn all_renders_todays_year() {
        let today = day(2025, 3, 2);
        let grid = build_calendar_grid(YearFilter::All, today);
        assert_eq!(grid.year, 2025);
        assert_eq!(grid.days().last(), Some(today));
        assert_eq!(today.weekday(), Weekday::Sun);
        assert_eq!(grid.weeks.last().unwrap()[0], Some(today));
    }

    #[test]
    fn future_year_is_not_truncated() {
        let grid = build_calendar_grid(YearFilter::Year(2030), day(2024, 6, 15));
        assert_eq!(grid.days().count(), 365);
    }

    #[test]
    fn month_labels_follow_sundays() {
        let grid = build_calendar_grid(YearFilter::Year(2023), day(2024, 1, 1));
        let labels = month_labels(&grid);
        assert_eq!(labels.len(), 12);
        assert_eq!(labels[0].month, "Jan");
        assert_eq!(labels[0].week_index, 0);
        // First Sunday of February 2023 is the 5th, in the sixth row.
        assert_eq!(labels[1].month, "Feb");
        assert_eq!(labels[1].week_index, 5);
    }

    #[test]
    fn heat_cells_carry_counts_and_levels() {
        let grid = build_calendar_grid(YearFilter::Year(2024), day(2024, 1, 6));
        let map: ContributionMap = [(day(2024, 1, 2), 5), (day(2023, 12, 31), 50)]
            .into_iter()
            .collect();
        let cells = heat_cells(&grid, &map);
        assert_eq!(cells.len(), 1);
        assert_eq!(cells[0][0], None);
        assert_eq!(
            cells[0][2],
            Some(HeatCell {
                date: day(2024, 1, 2),
                count: 5,
                level: 2
            })
        );
        assert_eq!(cells[0][1].map(|c| c.level), Some(0));
    }
}
