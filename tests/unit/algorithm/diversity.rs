//! Tests for the neighborhood reuse penalty

#[cfg(test)]
mod tests {
    use photomosaic::algorithm::diversity::{DiversityModel, grid_distance};

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    // Tests the penalty fades linearly with distance and stops at the radius
    // Verified by dividing by the radius instead of radius + 1
    #[test]
    fn test_penalty_linear_falloff() {
        let mut model = DiversityModel::new(2.0, 10.0, 1.0);
        model.record([2, 2], 0);

        assert!(close(model.penalty([2, 2], 0), 10.0));
        assert!(close(model.penalty([2, 3], 0), 10.0 * 2.0 / 3.0));
        assert!(close(model.penalty([2, 4], 0), 10.0 / 3.0));
        assert!(close(model.penalty([2, 5], 0), 0.0));
        assert!(close(model.penalty([2, 2], 1), 0.0));
    }

    // Tests repeated placements add up without decay
    // Verified by keeping only the nearest placement
    #[test]
    fn test_penalty_accumulates() {
        let mut model = DiversityModel::new(1.0, 4.0, 1.0);
        model.record([0, 0], 3);
        model.record([0, 2], 3);
        // Both placements are one cell away
        assert!(close(model.penalty([0, 1], 3), 4.0));
    }

    // Tests older placements weigh less by the recency decay
    // Verified by applying the decay to the newest placement
    #[test]
    fn test_penalty_recency_decay() {
        let mut model = DiversityModel::new(2.0, 10.0, 0.5);
        model.record([0, 0], 0);
        model.record([9, 9], 0);

        assert!(close(model.penalty([0, 0], 0), 5.0));
        assert!(close(model.penalty([9, 9], 0), 10.0));
        assert!(model.decays());
    }

    // Tests a zero radius or weight disables the penalty
    // Verified by treating a zero radius as covering the cell itself
    #[test]
    fn test_penalty_disabled() {
        let mut zero_radius = DiversityModel::new(0.0, 10.0, 1.0);
        zero_radius.record([1, 1], 0);
        assert!(close(zero_radius.penalty([1, 1], 0), 0.0));
        assert!(!zero_radius.is_active());

        let clamped = DiversityModel::new(-3.0, -1.0, 7.0);
        assert!(close(clamped.radius(), 0.0));
        assert!(close(clamped.weight(), 0.0));
        assert!(close(clamped.recency_decay(), 1.0));
        assert!(!DiversityModel::default().is_active());
    }

    // Tests neighborhoods are clipped to the grid and listed row-major
    // Verified by using a square window instead of the radius
    #[test]
    fn test_cells_within() {
        let diagonal = DiversityModel::new(1.5, 1.0, 1.0);
        assert_eq!(
            diagonal.cells_within([0, 0], (3, 3)),
            vec![[0, 0], [0, 1], [1, 0], [1, 1]]
        );

        let cross = DiversityModel::new(1.0, 1.0, 1.0);
        assert_eq!(
            cross.cells_within([1, 1], (3, 3)),
            vec![[0, 1], [1, 0], [1, 1], [1, 2], [2, 1]]
        );
        assert!(cross.cells_within([5, 0], (3, 3)).is_empty());
    }

    // Tests reset forgets every placement
    // Verified by clearing only the penalty weight
    #[test]
    fn test_reset() {
        let mut model = DiversityModel::new(2.0, 1.0, 1.0);
        model.record([0, 0], 1);
        model.record([1, 1], 1);
        assert_eq!(model.placements(1), &[[0, 0], [1, 1]]);

        model.reset();
        assert!(model.placements(1).is_empty());
        assert!(close(model.penalty([0, 0], 1), 0.0));
    }

    // Tests grid distance is Euclidean in cell units
    // Verified by using Manhattan distance
    #[test]
    fn test_grid_distance() {
        assert!(close(grid_distance([0, 0], [3, 4]), 5.0));
        assert!(close(grid_distance([4, 7], [4, 7]), 0.0));
        assert!(close(grid_distance([2, 0], [0, 2]), 8.0_f64.sqrt()));
    }
}
