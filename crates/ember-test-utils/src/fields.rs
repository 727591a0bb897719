//! Deterministic initial fields.
//!
//! Every field here is a function of the global position only, so runs
//! with different worker counts start from the same state.

use ember_grid::InitialCondition;
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

/// `0.5 * row + 0.25 * col`.
pub fn ramp() -> InitialCondition {
    InitialCondition::custom(|row, col| 0.5 * row as f64 + 0.25 * col as f64)
}

/// Cold domain at 0 with a square of 100 in the middle of a `size`-wide
/// domain.
pub fn hot_square(size: usize) -> InitialCondition {
    let lo = size / 4;
    let hi = size - size / 4;
    InitialCondition::custom(move |row, col| {
        if (lo..hi).contains(&row) && (lo..hi).contains(&col) {
            100.0
        } else {
            0.0
        }
    })
}

/// Uniform values in `[0, 1)` for a `size`-wide domain, drawn once from a
/// seeded generator and looked up by position.
pub fn noise(size: usize, seed: u64) -> InitialCondition {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let table: Vec<f64> = (0..size * size).map(|_| rng.random::<f64>()).collect();
    InitialCondition::custom(move |row, col| table[row * size + col])
}

#[cfg(test)]
mod tests {
    use super::*;
    use ember_core::WorkerId;

    #[test]
    fn noise_is_seeded_and_in_range() {
        let a = noise(8, 42);
        let b = noise(8, 42);
        let c = noise(8, 43);
        let at = |f: &InitialCondition, r, k| f.value(WorkerId(0), 8, r, k);
        let mut differs = false;
        for r in 0..8 {
            for k in 0..8 {
                let v = at(&a, r, k);
                assert!((0.0..1.0).contains(&v));
                assert_eq!(v.to_bits(), at(&b, r, k).to_bits());
                differs |= v != at(&c, r, k);
            }
        }
        assert!(differs);
    }
}
