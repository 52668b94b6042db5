//! Exact minimum-cost assignment (Hungarian method)
//!
//! Used when every tile may be placed at most once and no penalty couples
//! the cells, in which case the color-distance matrix alone defines the
//! objective and the global optimum is affordable for moderate grids.

use crate::algorithm::costs::CostMatrix;
use crate::algorithm::solver::CancellationToken;
use crate::io::error::{MosaicError, Result};

/// Assign each cell a distinct tile minimizing the total cost
///
/// Returns one tile index per cell. Runs in `O(cells^2 * tiles)`, one
/// row per cell; `cancel` is checked before each row and `on_row` receives
/// (rows matched, cells) after it.
///
/// # Errors
///
/// Returns:
/// - `InsufficientTiles` if there are fewer tiles than cells
/// - `Cancelled` with the number of matched rows if `cancel` is set
#[allow(clippy::indexing_slicing)] // all indices are bounded by the matrix shape
pub fn solve_optimal(
    costs: &CostMatrix,
    cancel: &CancellationToken,
    on_row: &mut dyn FnMut(usize, usize),
) -> Result<Vec<usize>> {
    let n = costs.cells();
    let m = costs.tiles();
    if n == 0 {
        return Ok(Vec::new());
    }
    if m < n {
        return Err(MosaicError::InsufficientTiles { tiles: m, cells: n });
    }

    // Potentials and matching use 1-based rows/columns; index 0 is a sentinel
    let mut u = vec![0.0_f64; n + 1];
    let mut v = vec![0.0_f64; m + 1];
    let mut matched_row = vec![0_usize; m + 1];
    let mut way = vec![0_usize; m + 1];

    for row in 1..=n {
        if cancel.is_cancelled() {
            return Err(MosaicError::Cancelled {
                assigned: row - 1,
                cells: n,
            });
        }
        matched_row[0] = row;
        let mut col0 = 0;
        let mut min_v = vec![f64::INFINITY; m + 1];
        let mut used = vec![false; m + 1];

        loop {
            used[col0] = true;
            let row0 = matched_row[col0];
            let mut delta = f64::INFINITY;
            let mut col1 = 0;

            for col in 1..=m {
                if used[col] {
                    continue;
                }
                let reduced = costs.get(row0 - 1, col - 1) - u[row0] - v[col];
                if reduced < min_v[col] {
                    min_v[col] = reduced;
                    way[col] = col0;
                }
                if min_v[col] < delta {
                    delta = min_v[col];
                    col1 = col;
                }
            }

            for col in 0..=m {
                if used[col] {
                    u[matched_row[col]] += delta;
                    v[col] -= delta;
                } else {
                    min_v[col] -= delta;
                }
            }

            col0 = col1;
            if matched_row[col0] == 0 {
                break;
            }
        }

        // Augment along the alternating path
        loop {
            let col1 = way[col0];
            matched_row[col0] = matched_row[col1];
            col0 = col1;
            if col0 == 0 {
                break;
            }
        }
        on_row(row, n);
    }

    let mut assignment = vec![0_usize; n];
    for col in 1..=m {
        let row = matched_row[col];
        if row > 0 {
            assignment[row - 1] = col - 1;
        }
    }
    Ok(assignment)
}
