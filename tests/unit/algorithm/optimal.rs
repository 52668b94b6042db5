//! Tests for the exact assignment solver

#[cfg(test)]
mod tests {
    use ndarray::{Array2, array};
    use photomosaic::MosaicError;
    use photomosaic::algorithm::costs::CostMatrix;
    use photomosaic::algorithm::optimal::solve_optimal;
    use photomosaic::algorithm::solver::CancellationToken;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn solve(costs: &CostMatrix) -> photomosaic::Result<Vec<usize>> {
        solve_optimal(costs, &CancellationToken::new(), &mut |_, _| {})
    }

    fn total(costs: &CostMatrix, tiles: &[usize]) -> f64 {
        tiles
            .iter()
            .enumerate()
            .map(|(cell, &tile)| costs.get(cell, tile))
            .sum()
    }

    #[allow(clippy::indexing_slicing)]
    fn brute_force(costs: &CostMatrix, cell: usize, used: &mut Vec<bool>) -> f64 {
        if cell == costs.cells() {
            return 0.0;
        }
        let mut best = f64::INFINITY;
        for tile in 0..costs.tiles() {
            if used[tile] {
                continue;
            }
            used[tile] = true;
            let cost = costs.get(cell, tile) + brute_force(costs, cell + 1, used);
            used[tile] = false;
            best = best.min(cost);
        }
        best
    }

    // Tests a small square problem reaches its known optimum
    // Verified by taking each row's minimum independently
    #[test]
    fn test_known_optimum() {
        let costs = CostMatrix::from_array(array![[4.0, 1.0, 3.0], [2.0, 0.0, 5.0], [3.0, 2.0, 2.0]]);
        let tiles = solve(&costs).unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(tiles, vec![1, 0, 2]);
        assert!((total(&costs, &tiles) - 5.0).abs() < 1e-12);
    }

    // Tests random rectangular problems match exhaustive search
    // Verified by returning the greedy row minimum
    #[test]
    fn test_matches_brute_force() {
        let mut rng = StdRng::seed_from_u64(7);
        for (cells, tiles) in [(4, 4), (5, 7), (3, 6), (6, 6)] {
            let values = Array2::from_shape_fn((cells, tiles), |_| rng.random_range(0.0..100.0));
            let costs = CostMatrix::from_array(values);
            let assignment = solve(&costs).unwrap_or_else(|e| panic!("{e}"));

            assert_eq!(assignment.len(), cells);
            let mut seen = assignment.clone();
            seen.sort_unstable();
            seen.dedup();
            assert_eq!(seen.len(), cells, "tiles must be distinct");

            let expected = brute_force(&costs, 0, &mut vec![false; tiles]);
            assert!((total(&costs, &assignment) - expected).abs() < 1e-9);
        }
    }

    // Tests fewer tiles than cells is rejected and no cells is trivial
    // Verified by padding missing tiles with infinite costs
    #[test]
    fn test_shape_errors() {
        let short = CostMatrix::from_array(Array2::zeros((3, 2)));
        assert!(matches!(
            solve(&short),
            Err(MosaicError::InsufficientTiles { tiles: 2, cells: 3 })
        ));

        let empty = CostMatrix::from_array(Array2::zeros((0, 4)));
        assert_eq!(solve(&empty).ok(), Some(Vec::new()));
    }

    // Tests a token set after the first row stops the solve with the rows matched so far
    // Verified by checking the token only before the first row
    #[test]
    fn test_cancelled_between_rows() {
        let costs = CostMatrix::from_array(Array2::from_shape_fn((5, 8), |(c, t)| {
            ((c * 3 + t * 7) % 11) as f64
        }));
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        let mut rows_seen = Vec::new();

        let result = solve_optimal(&costs, &cancel, &mut |row, rows| {
            rows_seen.push((row, rows));
            trigger.cancel();
        });

        assert!(matches!(
            result,
            Err(MosaicError::Cancelled {
                assigned: 1,
                cells: 5
            })
        ));
        assert_eq!(rows_seen, vec![(1, 5)]);
    }

    // Tests every matched row is reported in order
    // Verified by reporting only the final row
    #[test]
    fn test_reports_rows() {
        let costs = CostMatrix::from_array(Array2::from_shape_fn((4, 4), |(c, t)| (c + t) as f64));
        let mut rows_seen = Vec::new();
        let result = solve_optimal(&costs, &CancellationToken::new(), &mut |row, _| {
            rows_seen.push(row);
        });
        assert!(result.is_ok());
        assert_eq!(rows_seen, vec![1, 2, 3, 4]);
    }
}
