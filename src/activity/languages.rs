use crate::model::{LanguageShare, Repository};
use crate::util::{day_key, saturating_sum};
use chrono::Datelike;
use std::collections::BTreeMap;

pub fn language_bytes(repositories: &[Repository]) -> BTreeMap<String, u64> {
    let mut totals = BTreeMap::new();
    for (language, bytes) in repositories.iter().flat_map(|repo| &repo.languages) {
        let total = totals.entry(language.clone()).or_insert(0u64);
        *total = total.saturating_add(*bytes);
    }
    totals
}

/// Byte totals per language with their share of all bytes, largest first.
pub fn language_stats(repositories: &[Repository]) -> Vec<LanguageShare> {
    let totals = language_bytes(repositories);
    let grand_total = saturating_sum(totals.values().copied());

    let mut shares: Vec<LanguageShare> = totals
        .into_iter()
        .map(|(language, bytes)| LanguageShare {
            percentage: if grand_total > 0 {
                bytes as f64 / grand_total as f64 * 100.0
            } else {
                0.0
            },
            language,
            bytes,
        })
        .collect();

    shares.sort_by(|a, b| b.bytes.cmp(&a.bytes).then_with(|| a.language.cmp(&b.language)));
    shares
}

pub fn top_language(shares: &[LanguageShare]) -> &str {
    shares
        .first()
        .map(|share| share.language.as_str())
        .unwrap_or("Unknown")
}

/// Repositories per primary language, keyed by creation year.
pub fn language_evolution(repositories: &[Repository]) -> BTreeMap<i32, BTreeMap<String, u64>> {
    let mut evolution: BTreeMap<i32, BTreeMap<String, u64>> = BTreeMap::new();
    for repo in repositories {
        let (Some(language), Some(created)) = (
            repo.language.as_deref().filter(|l| !l.is_empty()),
            repo.created_at.as_deref().and_then(day_key),
        ) else {
            continue;
        };
        *evolution
            .entry(created.year())
            .or_default()
            .entry(language.to_string())
            .or_insert(0) += 1;
    }
    evolution
}

#[cfg(test)]
mod tests {
    use super::*;

    fn repo(languages: &[(&str, u64)]) -> Repository {
        Repository {
            languages: languages.iter().map(|(l, b)| (l.to_string(), *b)).collect(),
            ..Default::default()
        }
    }

    #[test]
    fn shares_are_sorted_and_sum_to_hundred() {
        let repos = vec![
            repo(&[("Rust", 600), ("Shell", 100)]),
            repo(&[("TypeScript", 300)]),
            repo(&[]),
        ];
        let shares = language_stats(&repos);
        let names: Vec<_> = shares.iter().map(|s| s.language.as_str()).collect();
        assert_eq!(names, vec!["Rust", "TypeScript", "Shell"]);
        assert!((shares[0].percentage - 60.0).abs() < 1e-9);
        let sum: f64 = shares.iter().map(|s| s.percentage).sum();
        assert!((sum - 100.0).abs() < 1e-9);
        assert_eq!(top_language(&shares), "Rust");
    }

    #[test]
    fn no_bytes_means_zero_percent_and_unknown_top() {
        let shares = language_stats(&[repo(&[("Go", 0)])]);
        assert_eq!(shares[0].percentage, 0.0);
        assert_eq!(top_language(&[]), "Unknown");
    }

    #[test]
    fn evolution_counts_primary_language_by_year() {
        let make = |lang: Option<&str>, created: Option<&str>| Repository {
            language: lang.map(str::to_string),
            created_at: created.map(str::to_string),
            ..Default::default()
        };
        let repos = vec![
            make(Some("Rust"), Some("2021-05-01T00:00:00Z")),
            make(Some("Rust"), Some("2021-09-01T00:00:00Z")),
            make(Some("Go"), Some("2022-01-01T00:00:00Z")),
            make(None, Some("2022-01-01T00:00:00Z")),
            make(Some("C"), Some("garbage")),
        ];
        let evolution = language_evolution(&repos);
        assert_eq!(evolution[&2021]["Rust"], 2);
        assert_eq!(evolution[&2022]["Go"], 1);
        assert_eq!(evolution.len(), 2);
    }
}
