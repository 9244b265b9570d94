//! Minimum-cost bipartite assignment.
//!
//! Dense Hungarian algorithm in the shortest-augmenting-path formulation
//! with dual potentials, O(n²m) for an n×m matrix. Problem sizes here are
//! tens to low hundreds of corrosion features per survey, so a dense solver
//! is comfortable.

use nalgebra::DMatrix;

/// Solve the minimum-total-cost one-to-one assignment over a rectangular
/// cost matrix.
///
/// Returns `(row, column)` pairs sorted by row; every row and column appears
/// at most once. On a rectangular matrix the smaller side is matched
/// completely and the surplus rows/columns of the larger side stay
/// unmatched. Fully deterministic: ties are broken by the lowest index.
pub fn solve_assignment(costs: &DMatrix<f64>) -> Vec<(usize, usize)> {
    let (rows, cols) = costs.shape();
    if rows == 0 || cols == 0 {
        return Vec::new();
    }

    let mut pairs = if rows <= cols {
        solve_rows_le_cols(costs)
    } else {
        let mut flipped = solve_rows_le_cols(&costs.transpose());
        for pair in &mut flipped {
            *pair = (pair.1, pair.0);
        }
        flipped
    };
    pairs.sort_unstable_by_key(|&(r, _)| r);
    pairs
}

/// Augmenting-path Hungarian for `nrows <= ncols`.
///
/// Classic potentials formulation: rows and columns are 1-based internally
/// with index 0 as the virtual free slot.
fn solve_rows_le_cols(costs: &DMatrix<f64>) -> Vec<(usize, usize)> {
    let n = costs.nrows();
    let m = costs.ncols();
    debug_assert!(n <= m);

    let mut u = vec![0.0f64; n + 1];
    let mut v = vec![0.0f64; m + 1];
    // col_match[j] = row currently assigned to column j (0 = unassigned).
    let mut col_match = vec![0usize; m + 1];
    let mut way = vec![0usize; m + 1];

    for i in 1..=n {
        col_match[0] = i;
        let mut j0 = 0usize;
        let mut min_to = vec![f64::INFINITY; m + 1];
        let mut used = vec![false; m + 1];

        loop {
            used[j0] = true;
            let i0 = col_match[j0];
            let mut delta = f64::INFINITY;
            let mut j1 = 0usize;
            for j in 1..=m {
                if used[j] {
                    continue;
                }
                let reduced = costs[(i0 - 1, j - 1)] - u[i0] - v[j];
                if reduced < min_to[j] {
                    min_to[j] = reduced;
                    way[j] = j0;
                }
                if min_to[j] < delta {
                    delta = min_to[j];
                    j1 = j;
                }
            }
            for j in 0..=m {
                if used[j] {
                    u[col_match[j]] += delta;
                    v[j] -= delta;
                } else {
                    min_to[j] -= delta;
                }
            }
            j0 = j1;
            if col_match[j0] == 0 {
                break;
            }
        }

        // Walk the alternating path back, flipping assignments.
        loop {
            let j1 = way[j0];
            col_match[j0] = col_match[j1];
            j0 = j1;
            if j0 == 0 {
                break;
            }
        }
    }

    let mut pairs = Vec::with_capacity(n);
    for j in 1..=m {
        if col_match[j] != 0 {
            pairs.push((col_match[j] - 1, j - 1));
        }
    }
    pairs
}
