//! Offline metrics for recommendation lists.
//!
//! Every function takes one ranked list of movie ids per test user. Empty
//! inputs score zero instead of producing NaN.

use std::collections::{HashMap, HashSet};

/// Fraction of the catalog that appears in at least one list
pub fn coverage(recommendations: &HashMap<String, Vec<String>>, catalog: &[String]) -> f64 {
    let catalog: HashSet<&String> = catalog.iter().collect();
    if catalog.is_empty() {
        return 0.0;
    }

    let covered: HashSet<&String> = recommendations
        .values()
        .flatten()
        .filter(|id| catalog.contains(id))
        .collect();

    covered.len() as f64 / catalog.len() as f64
}

/// One minus the mean pairwise Jaccard similarity between users' lists
///
/// Needs at least two lists; otherwise zero.
pub fn diversity(recommendations: &HashMap<String, Vec<String>>) -> f64 {
    let sets: Vec<HashSet<&String>> = recommendations
        .values()
        .map(|recs| recs.iter().collect())
        .collect();

    if sets.len() < 2 {
        return 0.0;
    }

    let mut total = 0.0;
    let mut pairs = 0usize;
    for (i, a) in sets.iter().enumerate() {
        for b in &sets[i + 1..] {
            total += jaccard(a, b);
            pairs += 1;
        }
    }

    1.0 - total / pairs as f64
}

fn jaccard(a: &HashSet<&String>, b: &HashSet<&String>) -> f64 {
    let union = a.union(b).count();
    if union == 0 {
        return 0.0;
    }
    a.intersection(b).count() as f64 / union as f64
}

/// Mean self-information `-log2(p)` of recommended items
///
/// `popularity` must already be normalised to (0, 1]. Items with unknown or
/// zero popularity are skipped.
pub fn novelty(
    recommendations: &HashMap<String, Vec<String>>,
    popularity: &HashMap<String, f64>,
) -> f64 {
    let information: Vec<f64> = recommendations
        .values()
        .flatten()
        .filter_map(|id| popularity.get(id).copied())
        .filter(|p| *p > 0.0)
        .map(|p| -p.log2())
        .collect();

    mean(&information)
}

/// Mean precision and recall of each user's list against their liked items
///
/// Users without liked items or without recommendations are left out.
pub fn precision_recall(
    recommendations: &HashMap<String, Vec<String>>,
    relevant: &HashMap<String, HashSet<String>>,
) -> (f64, f64) {
    let mut precisions = Vec::new();
    let mut recalls = Vec::new();

    for (user_id, recs) in recommendations {
        let Some(actual) = relevant.get(user_id).filter(|items| !items.is_empty()) else {
            continue;
        };

        let recommended: HashSet<&String> = recs.iter().collect();
        if recommended.is_empty() {
            continue;
        }

        let hits = recommended.iter().filter(|id| actual.contains(**id)).count() as f64;
        precisions.push(hits / recommended.len() as f64);
        recalls.push(hits / actual.len() as f64);
    }

    (mean(&precisions), mean(&recalls))
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}
