use std::collections::BTreeSet;

/// Number of discordant pairs between two rank vectors.
///
/// `r1[i]` is the rank given to item `i`. A pair `(i, j)` is discordant when the
/// two vectors order it differently.
pub fn kendall_tau_inversions(r1: &[f64], r2: &[f64]) -> usize {
    debug_assert_eq!(r1.len(), r2.len());
    let n = r1.len().min(r2.len());
    let mut inversions = 0;
    for i in 0..n {
        for j in 0..i {
            if (r1[i] < r1[j]) ^ (r2[i] < r2[j]) {
                inversions += 1;
            }
        }
    }
    inversions
}

/// Kendall-tau distance normalized to [0, 1] by `n(n-1)/2`.
///
/// Vectors shorter than 2 have no pairs and are at distance 0.
pub fn kendall_tau_distance(r1: &[f64], r2: &[f64]) -> f64 {
    let n = r1.len().min(r2.len());
    if n < 2 {
        return 0.0;
    }
    let pairs = (n * (n - 1) / 2) as f64;
    kendall_tau_inversions(r1, r2) as f64 / pairs
}

/// Jaccard distance `1 - |A∩B| / |A∪B|`; `None` when both sets are empty.
pub fn jaccard_distance(a: &BTreeSet<&str>, b: &BTreeSet<&str>) -> Option<f64> {
    let union = a.union(b).count();
    if union == 0 {
        return None;
    }
    let inter = a.intersection(b).count();
    Some(1.0 - inter as f64 / union as f64)
}

/// 0 when the sets share at least one element, 1 otherwise.
#[inline]
pub fn disjoint_penalty(a: &BTreeSet<&str>, b: &BTreeSet<&str>) -> f64 {
    if a.is_disjoint(b) {
        1.0
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set<'a>(items: &[&'a str]) -> BTreeSet<&'a str> {
        items.iter().copied().collect()
    }

    #[test]
    fn test_kendall_identical_is_zero() {
        let r = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(kendall_tau_distance(&r, &r), 0.0);
    }

    #[test]
    fn test_kendall_reverse_is_one() {
        let r = [1.0, 2.0, 3.0, 4.0];
        let rev = [4.0, 3.0, 2.0, 1.0];
        assert_eq!(kendall_tau_inversions(&r, &rev), 6);
        assert_eq!(kendall_tau_distance(&r, &rev), 1.0);
    }

    #[test]
    fn test_kendall_single_swap() {
        let r = [1.0, 2.0, 3.0];
        let swapped = [2.0, 1.0, 3.0];
        assert!((kendall_tau_distance(&r, &swapped) - 1.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_jaccard() {
        assert_eq!(jaccard_distance(&set(&["a", "b"]), &set(&["a", "b"])), Some(0.0));
        assert_eq!(jaccard_distance(&set(&["a"]), &set(&["b"])), Some(1.0));
        assert_eq!(jaccard_distance(&set(&["a", "b"]), &set(&["b", "c"])), Some(1.0 - 1.0 / 3.0));
        assert_eq!(jaccard_distance(&set(&[]), &set(&[])), None);
    }

    #[test]
    fn test_disjoint_penalty() {
        assert_eq!(disjoint_penalty(&set(&["EN"]), &set(&["FR", "EN"])), 0.0);
        assert_eq!(disjoint_penalty(&set(&["EN"]), &set(&["FR"])), 1.0);
    }
}
