use super::scorer::CandidateScore;

/// Keep candidates scoring strictly above `threshold`, best first, at most
/// `max_results` of them. Ties keep their incoming order.
pub fn apply(scored: Vec<CandidateScore>, threshold: f64, max_results: usize) -> Vec<CandidateScore> {
    let mut kept: Vec<CandidateScore> = scored
        .into_iter()
        .filter(|c| c.score > threshold)
        .collect();

    // stable
    kept.sort_by(|a, b| b.score.total_cmp(&a.score));
    kept.truncate(max_results);
    kept
}
