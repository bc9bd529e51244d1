use crate::model::{MonthlyCode, Repository};
use crate::util::{day_key, month_key};
use chrono::Datelike;
use std::collections::BTreeMap;

const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Commit counts per `YYYY-MM`, across every dated record.
pub fn monthly_contributions(repositories: &[Repository]) -> BTreeMap<String, u64> {
    let mut months = BTreeMap::new();
    for record in repositories.iter().flat_map(|repo| repo.commits.records()) {
        if let Some(month) = record.date.as_deref().and_then(month_key) {
            let total = months.entry(month).or_insert(0u64);
            *total = total.saturating_add(record.count);
        }
    }
    months
}

/// Repository size created per month of `year`.
pub fn monthly_code_activity(repositories: &[Repository], year: i32) -> [u64; 12] {
    let mut buckets = [0u64; 12];
    for repo in repositories {
        let Some(created) = repo.created_at.as_deref().and_then(day_key) else {
            continue;
        };
        if created.year() == year {
            let bucket = &mut buckets[created.month0() as usize];
            *bucket = bucket.saturating_add(repo.size);
        }
    }
    buckets
}

pub fn labelled_months(buckets: &[u64; 12]) -> Vec<MonthlyCode> {
    MONTHS
        .iter()
        .zip(buckets)
        .map(|(month, size)| MonthlyCode {
            month: month.to_string(),
            size: *size,
        })
        .collect()
}
