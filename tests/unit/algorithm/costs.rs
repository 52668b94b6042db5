//! Tests for the cell-by-tile cost matrix

#[cfg(test)]
mod tests {
    use ndarray::array;
    use photomosaic::algorithm::costs::CostMatrix;
    use photomosaic::analysis::metric::ColorMetric;
    use photomosaic::analysis::signature::ColorSignature;

    // Tests entries are the metric distance of each cell and tile pair
    // Verified by transposing the matrix
    #[test]
    fn test_compute_values() {
        let cells = [
            ColorSignature::uniform([0.0, 0.0, 0.0]),
            ColorSignature::uniform([255.0, 0.0, 0.0]),
        ];
        let tiles = [
            ColorSignature::uniform([0.0, 0.0, 0.0]),
            ColorSignature::uniform([3.0, 4.0, 0.0]),
            ColorSignature::uniform([255.0, 0.0, 0.0]),
        ];
        let costs = CostMatrix::compute(&cells, &tiles, ColorMetric::Euclidean)
            .unwrap_or_else(|e| panic!("{e}"));

        assert_eq!((costs.cells(), costs.tiles()), (2, 3));
        assert!(costs.get(0, 0).abs() < 1e-12);
        assert!((costs.get(0, 1) - 5.0).abs() < 1e-12);
        assert!((costs.get(0, 2) - 255.0).abs() < 1e-12);
        assert!(costs.get(1, 2).abs() < 1e-12);
        assert!(costs.get(1, 0) > costs.get(1, 1));
    }

    // Tests lookups outside the matrix cost infinity
    // Verified by returning zero for missing entries
    #[test]
    fn test_out_of_range() {
        let costs = CostMatrix::from_array(array![[1.0, 2.0], [3.0, 4.0]]);
        assert!(costs.get(2, 0).is_infinite());
        assert!(costs.get(0, 2).is_infinite());
        assert!((costs.get(1, 0) - 3.0).abs() < 1e-12);
        assert_eq!(costs.as_array().dim(), (2, 2));
    }

    // Tests empty inputs produce an empty matrix
    // Verified by failing on zero-length shapes
    #[test]
    fn test_empty() {
        let tiles = [ColorSignature::uniform([1.0, 2.0, 3.0])];
        let costs = CostMatrix::compute(&[], &tiles, ColorMetric::Redmean)
            .unwrap_or_else(|e| panic!("{e}"));
        assert_eq!((costs.cells(), costs.tiles()), (0, 1));
    }
}
