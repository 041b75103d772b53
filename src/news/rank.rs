use std::collections::HashSet;

use super::model::NormalizedArticle;

/// Newest first, one entry per link, at most `max` entries.
///
/// The sort is stable, so articles sharing a timestamp keep their input
/// order and reruns over the same input give the same output.
pub fn rank_and_cap(mut articles: Vec<NormalizedArticle>, max: usize) -> Vec<NormalizedArticle> {
    articles.sort_by(|a, b| b.pub_date.cmp(&a.pub_date));

    let mut seen = HashSet::new();
    articles.retain(|a| a.link.is_empty() || seen.insert(a.link.clone()));
    articles.truncate(max);
    articles
}
