//! Fuzzy filename matching for quick-open lookup.

use super::FileEntry;

/// Separators that split a filename into words for prefix matching.
const WORD_SEPARATORS: &[char] = &['-', '_', ' ', '.'];

/// Ranks file entries against a query string.
///
/// This struct is stateless and provides methods as associated functions.
/// Matching is case-insensitive throughout.
pub struct FuzzyMatcher;

impl FuzzyMatcher {
    /// Returns the entries that score above zero, best first.
    ///
    /// An empty query is the identity: the input list comes back unchanged
    /// and unscored. The sort is stable, so equal scores keep their input
    /// order.
    pub fn search(query: &str, files: &[FileEntry]) -> Vec<FileEntry> {
        if query.is_empty() {
            return files.to_vec();
        }

        let query = query.to_lowercase();
        let mut scored: Vec<(f64, &FileEntry)> = files
            .iter()
            .filter_map(|entry| {
                let score = Self::score(&query, entry);
                (score > 0.0).then_some((score, entry))
            })
            .collect();

        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
        scored.into_iter().map(|(_, entry)| entry.clone()).collect()
    }

    /// Additive tiered score; `query` must already be lowercased.
    ///
    /// Tiers escalate only while the score is still zero: filename
    /// substring, then relative-path substring, then word-prefix matching,
    /// then an edit-distance fallback for near-misses. A filename that
    /// contains the query doubles the total at the end; this intentionally
    /// stacks on top of the tier-one substring bonus.
    fn score(query: &str, entry: &FileEntry) -> f64 {
        let name = entry.name.to_lowercase();
        let path = entry.relative_path.to_lowercase();
        let mut score = 0.0;

        if name.contains(query) {
            score += 10.0;
            if name.starts_with(query) {
                score += 5.0;
            }
            if name == query || name == format!("{query}.md") {
                score += 10.0;
            }
        } else if path.contains(query) {
            score += 3.0;
        } else {
            for word in query.split(' ').filter(|w| !w.is_empty()) {
                let matched = name
                    .split(WORD_SEPARATORS)
                    .any(|part| !part.is_empty() && part.starts_with(word));
                if matched {
                    score += 2.0;
                }
            }

            if score == 0.0 {
                score += Self::edit_distance_score(query, &name);
            }
        }

        if name.contains(query) {
            score *= 2.0;
        }
        score
    }

    /// Levenshtein fallback against the extension-stripped filename.
    ///
    /// Distances beyond `max(1, 0.2 * query length)` score zero; anything
    /// closer scores between 0.1 and 1.0, nearer misses scoring higher.
    fn edit_distance_score(query: &str, name: &str) -> f64 {
        let stem = name.rsplit_once('.').map(|(stem, _)| stem).unwrap_or(name);
        let query_len = query.chars().count();
        let max_distance = ((query_len as f64) * 0.2).floor().max(1.0) as usize;

        let distance = levenshtein(query, stem);
        if distance <= max_distance {
            (1.0 - distance as f64 / query_len as f64).max(0.1)
        } else {
            0.0
        }
    }
}

/// Classic dynamic-programming Levenshtein distance with unit costs.
///
/// Storage is two rolling rows over the shorter input, O(min(m, n)) space.
pub fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let (short, long) = if a.len() <= b.len() { (&a, &b) } else { (&b, &a) };
    let mut previous: Vec<usize> = (0..=short.len()).collect();
    let mut current = vec![0usize; short.len() + 1];

    for (i, &long_char) in long.iter().enumerate() {
        current[0] = i + 1;
        for (j, &short_char) in short.iter().enumerate() {
            let substitution = previous[j] + usize::from(long_char != short_char);
            let deletion = previous[j + 1] + 1;
            let insertion = current[j] + 1;
            current[j + 1] = substitution.min(deletion).min(insertion);
        }
        std::mem::swap(&mut previous, &mut current);
    }

    previous[short.len()]
}
