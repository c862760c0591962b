//! Fuzzy string matching for "did you mean" hints, and id slug checks.

/// Find the closest match using Levenshtein distance. Returns None if best
/// distance exceeds half the candidate length (too dissimilar).
pub(crate) fn fuzzy_match<'a>(input: &str, candidates: &[&'a str]) -> Option<&'a str> {
    let input_lower = input.to_lowercase();
    let mut best: Option<(&str, usize)> = None;

    for &candidate in candidates {
        let dist = levenshtein(&input_lower, &candidate.to_lowercase());
        match best {
            None => best = Some((candidate, dist)),
            Some((_, best_dist)) if dist < best_dist => best = Some((candidate, dist)),
            _ => {}
        }
    }

    best.and_then(|(name, dist)| {
        // Only suggest if edit distance is reasonable (≤ half the longer string)
        let max_len = input.len().max(name.len());
        if dist <= max_len / 2 {
            Some(name)
        } else {
            None
        }
    })
}

/// Levenshtein edit distance between two strings.
pub(crate) fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let m = a.len();
    let n = b.len();

    let mut prev = (0..=n).collect::<Vec<_>>();
    let mut curr = vec![0; n + 1];

    for i in 1..=m {
        curr[0] = i;
        for j in 1..=n {
            let cost = if a[i - 1] == b[j - 1] { 0 } else { 1 };
            curr[j] = (prev[j] + 1)
                .min(curr[j - 1] + 1)
                .min(prev[j - 1] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[n]
}

/// Item ids double as file names: lowercase ASCII letters and digits,
/// separated by single `-` or `_`.
pub(crate) fn is_slug(s: &str) -> bool {
    if s.is_empty() {
        return false;
    }
    let mut prev_was_sep = true;
    for ch in s.chars() {
        if ch == '-' || ch == '_' {
            if prev_was_sep {
                return false;
            }
            prev_was_sep = true;
        } else if ch.is_ascii_lowercase() || ch.is_ascii_digit() {
            prev_was_sep = false;
        } else {
            return false;
        }
    }
    !prev_was_sep
}

/// Best-effort slug for a suggestion: lowercase, runs of anything else
/// collapsed to one `-`.
pub(crate) fn slugify(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        if ch.is_ascii_alphanumeric() {
            out.push(ch.to_ascii_lowercase());
        } else if !out.is_empty() && !out.ends_with('-') {
            out.push('-');
        }
    }
    while out.ends_with('-') {
        out.pop();
    }
    out
}
