//! Explicit five-point update rule for the heat equation.
//!
//! Each step computes, for every updatable interior cell:
//! ```text
//! next[i][j] = cur[i][j] + dt * alpha *
//!     ( (cur[i+1][j] + cur[i-1][j] - 2 cur[i][j]) / dx^2
//!     + (cur[i][j+1] + cur[i][j-1] - 2 cur[i][j]) / dy^2 )
//! ```
//! Reads come only from `cur` and writes go only to `next` (Jacobi
//! style), so the result does not depend on traversal order.

use std::ops::Range;

pub use ember_core::StencilCoefficients;

use crate::local::LocalGrid;

/// New value of cell `(i, j)` from the current buffer.
///
/// `i` must have both vertical neighbours in the buffer
/// (`1..=rows_owned`, using the halo rows at the ends) and `j` must be an
/// interior column (`1..cols - 1`).
#[inline]
pub fn update_cell(current: &LocalGrid, i: usize, j: usize, c: &StencilCoefficients) -> f64 {
    let cols = current.cols();
    let data = current.as_slice();
    let idx = i * cols + j;
    let centre = data[idx];
    let vertical = (data[idx + cols] + data[idx - cols] - 2.0 * centre) / (c.dx * c.dx);
    let horizontal = (data[idx + 1] + data[idx - 1] - 2.0 * centre) / (c.dy * c.dy);
    centre + c.dt * c.diffusivity * (vertical + horizontal)
}

/// Apply [`update_cell`] to every interior column of the local rows in
/// `rows`, writing into `next`.
///
/// Edge columns and rows outside `rows` are left untouched in `next`.
/// Both buffers must have the same shape.
pub fn sweep(current: &LocalGrid, next: &mut LocalGrid, rows: Range<usize>, c: &StencilCoefficients) {
    debug_assert_eq!(current.shape(), next.shape());
    debug_assert!(rows.start >= 1 && rows.end <= current.rows_owned() + 1);
    let cols = current.cols();
    if cols < 3 {
        return;
    }
    for i in rows {
        let out = next.row_mut(i);
        for (j, cell) in out.iter_mut().enumerate().take(cols - 1).skip(1) {
            *cell = update_cell(current, i, j, c);
        }
    }
}
