use rand::Rng;

/// Shuffles `items` in place with a backward Fisher–Yates pass.
///
/// Every permutation is equally likely given a uniform `rng`.
pub fn shuffle<T, R: Rng + ?Sized>(items: &mut [T], rng: &mut R) {
    for i in (1..items.len()).rev() {
        let j = rng.random_range(0..=i);
        items.swap(i, j);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_shuffle_is_permutation() {
        let mut rng = StdRng::seed_from_u64(7);
        for len in 0..12 {
            let original: Vec<usize> = (0..len).collect();
            let mut shuffled = original.clone();
            shuffle(&mut shuffled, &mut rng);

            assert_eq!(shuffled.len(), original.len());
            let mut sorted = shuffled.clone();
            sorted.sort_unstable();
            assert_eq!(sorted, original);
        }
    }

    #[test]
    fn test_shuffle_keeps_duplicates() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut items = vec!["a", "a", "b", "c"];
        shuffle(&mut items, &mut rng);
        items.sort_unstable();
        assert_eq!(items, vec!["a", "a", "b", "c"]);
    }

    #[test]
    fn test_shuffle_positions_roughly_uniform() {
        const TRIALS: usize = 40_000;
        let mut rng = StdRng::seed_from_u64(42);
        // counts[item][position]
        let mut counts = [[0usize; 4]; 4];

        for _ in 0..TRIALS {
            let mut items = [0usize, 1, 2, 3];
            shuffle(&mut items, &mut rng);
            for (position, item) in items.iter().enumerate() {
                counts[*item][position] += 1;
            }
        }

        let expected = TRIALS / 4;
        let tolerance = expected / 10;
        for row in counts {
            for count in row {
                assert!(
                    count.abs_diff(expected) < tolerance,
                    "count {} too far from {}",
                    count,
                    expected
                );
            }
        }
    }
}
