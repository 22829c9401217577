use std::cmp::Ordering;

/// Case-insensitive substring test without allocating lowercase copies
/// of short haystacks repeatedly.
pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    if needle.is_empty() {
        return true;
    }
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Case-insensitive string comparison with a case-sensitive tiebreak
/// so ordering stays total and deterministic.
pub fn cmp_ignore_case(a: &str, b: &str) -> Ordering {
    let folded = a
        .chars()
        .flat_map(|c| c.to_lowercase())
        .cmp(b.chars().flat_map(|c| c.to_lowercase()));
    folded.then_with(|| a.cmp(b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_ignore_case() {
        assert!(contains_ignore_case("Vinayaga Transport", "transport"));
        assert!(contains_ignore_case("Vinayaga Transport", ""));
        assert!(!contains_ignore_case("Salem", "madurai"));
    }

    #[test]
    fn test_cmp_ignore_case() {
        assert_eq!(cmp_ignore_case("acme", "ACME Ltd"), Ordering::Less);
        assert_eq!(cmp_ignore_case("Beta", "alpha"), Ordering::Greater);
        // Equal ignoring case still orders deterministically
        assert_ne!(cmp_ignore_case("Acme", "acme"), Ordering::Equal);
    }

}
