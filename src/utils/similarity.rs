use std::collections::HashSet;

/// Trigrams of every word in `text`, lower-cased. Words are padded with two
/// leading and one trailing blank, so short words still yield trigrams.
fn trigrams(text: &str) -> HashSet<String> {
    let mut set = HashSet::new();

    for word in text
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
    {
        let padded: Vec<char> = format!("  {} ", word.to_lowercase()).chars().collect();
        for window in padded.windows(3) {
            set.insert(window.iter().collect());
        }
    }

    set
}

/// Jaccard similarity of the trigram sets of `a` and `b`, in `0.0..=1.0`.
pub fn trigram_similarity(a: &str, b: &str) -> f64 {
    let left = trigrams(a);
    let right = trigrams(b);

    if left.is_empty() || right.is_empty() {
        return 0.0;
    }

    let shared = left.intersection(&right).count();
    let union = left.len() + right.len() - shared;

    shared as f64 / union as f64
}
