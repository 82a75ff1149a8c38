/// Fraction of positions where `predicted` matches `truth`.
///
/// Returns `0.0` for empty input. Extra trailing entries in the longer slice are ignored.
pub fn accuracy(truth: &[i64], predicted: &[i64]) -> f64 {
    let n = truth.len().min(predicted.len());
    if n == 0 {
        return 0.0;
    }
    let correct = truth
        .iter()
        .zip(predicted)
        .filter(|(t, p)| t == p)
        .count();
    correct as f64 / n as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_matches() {
        assert_eq!(accuracy(&[0, 1, 1, 0], &[0, 1, 0, 0]), 0.75);
        assert_eq!(accuracy(&[2, 2], &[2, 2]), 1.0);
    }

    #[test]
    fn empty_is_zero() {
        assert_eq!(accuracy(&[], &[]), 0.0);
    }
}
