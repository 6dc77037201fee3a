//! Single-octave gradient noise on the integer lattice.

use super::{PERMUTATION_SIZE, PermutationTable};
use ::noise::NoiseFn;

/// Single-octave gradient noise evaluated with a given permutation table.
#[derive(Clone, Copy, Debug)]
pub struct LatticeNoise<'a> {
    table: &'a PermutationTable,
}

impl<'a> LatticeNoise<'a> {
    pub fn new(table: &'a PermutationTable) -> Self {
        Self { table }
    }
}

impl NoiseFn<f64, 3> for LatticeNoise<'_> {
    fn get(&self, point: [f64; 3]) -> f64 {
        lattice_noise(self.table, point[0], point[1], point[2])
    }
}

/// Evaluates improved gradient noise at the given point. The result lies
/// approximately in `[-1, 1]` and is exactly zero at every integer lattice
/// point. The lattice repeats with a period of 256 along each axis.
pub fn lattice_noise(table: &PermutationTable, x: f64, y: f64, z: f64) -> f64 {
    let floor_x = x.floor();
    let floor_y = y.floor();
    let floor_z = z.floor();

    let cell_x = wrap_lattice_coord(floor_x);
    let cell_y = wrap_lattice_coord(floor_y);
    let cell_z = wrap_lattice_coord(floor_z);

    let x = x - floor_x;
    let y = y - floor_y;
    let z = z - floor_z;

    let u = fade(x);
    let v = fade(y);
    let w = fade(z);

    let a = table.hash(cell_x) + cell_y;
    let aa = table.hash(a) + cell_z;
    let ab = table.hash(a + 1) + cell_z;
    let b = table.hash(cell_x + 1) + cell_y;
    let ba = table.hash(b) + cell_z;
    let bb = table.hash(b + 1) + cell_z;

    let lower_z = lerp(
        v,
        lerp(
            u,
            grad(table.hash(aa), x, y, z),
            grad(table.hash(ba), x - 1.0, y, z),
        ),
        lerp(
            u,
            grad(table.hash(ab), x, y - 1.0, z),
            grad(table.hash(bb), x - 1.0, y - 1.0, z),
        ),
    );

    let upper_z = lerp(
        v,
        lerp(
            u,
            grad(table.hash(aa + 1), x, y, z - 1.0),
            grad(table.hash(ba + 1), x - 1.0, y, z - 1.0),
        ),
        lerp(
            u,
            grad(table.hash(ab + 1), x, y - 1.0, z - 1.0),
            grad(table.hash(bb + 1), x - 1.0, y - 1.0, z - 1.0),
        ),
    );

    lerp(w, lower_z, upper_z)
}

#[inline]
fn wrap_lattice_coord(floored_coord: f64) -> usize {
    ((floored_coord as i64) & (PERMUTATION_SIZE as i64 - 1)) as usize
}

/// Quintic ease curve `6t^5 - 15t^4 + 10t^3`, with zero first and second
/// derivatives at 0 and 1.
#[inline]
pub(super) fn fade(t: f64) -> f64 {
    t * t * t * (t * (t * 6.0 - 15.0) + 10.0)
}

#[inline]
pub(super) fn lerp(t: f64, a: f64, b: f64) -> f64 {
    a + t * (b - a)
}

/// Dot product of the offset `(x, y, z)` with one of the 12 cube edge
/// directions, selected by the low four bits of the hash.
#[inline]
pub(super) fn grad(hash: usize, x: f64, y: f64, z: f64) -> f64 {
    let h = hash & 15;
    let u = if h < 8 { x } else { y };
    let v = if h < 4 {
        y
    } else if h == 12 || h == 14 {
        x
    } else {
        z
    };
    (if h & 1 == 0 { u } else { -u }) + (if h & 2 == 0 { v } else { -v })
}

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_abs_diff_eq;
    use proptest::prelude::*;

    fn reference_noise(x: f64, y: f64, z: f64) -> f64 {
        lattice_noise(PermutationTable::reference(), x, y, z)
    }

    #[test]
    fn fade_has_fixed_endpoints_and_midpoint() {
        assert_eq!(fade(0.0), 0.0);
        assert_eq!(fade(1.0), 1.0);
        assert_eq!(fade(0.5), 0.5);
    }

    #[test]
    fn grad_selects_expected_edge_directions() {
        let (x, y, z) = (1.0, 10.0, 100.0);
        assert_eq!(grad(0, x, y, z), x + y);
        assert_eq!(grad(1, x, y, z), -x + y);
        assert_eq!(grad(2, x, y, z), x - y);
        assert_eq!(grad(3, x, y, z), -x - y);
        assert_eq!(grad(4, x, y, z), x + z);
        assert_eq!(grad(7, x, y, z), -x - z);
        assert_eq!(grad(8, x, y, z), y + z);
        assert_eq!(grad(11, x, y, z), -y - z);
        assert_eq!(grad(12, x, y, z), y + x);
        assert_eq!(grad(13, x, y, z), -y + z);
        assert_eq!(grad(14, x, y, z), y - x);
        assert_eq!(grad(15, x, y, z), -y - z);
    }

    #[test]
    fn grad_only_uses_low_four_bits_of_hash() {
        assert_eq!(grad(16 + 5, 1.0, 2.0, 3.0), grad(5, 1.0, 2.0, 3.0));
        assert_eq!(grad(255, 1.0, 2.0, 3.0), grad(15, 1.0, 2.0, 3.0));
    }

    #[test]
    fn noise_at_cell_center_matches_reference_value() {
        assert_eq!(reference_noise(0.5, 0.5, 0.5), -0.25);
    }

    #[test]
    fn noise_at_arbitrary_point_matches_reference_value() {
        assert_abs_diff_eq!(
            reference_noise(3.7, 1.2, -0.4),
            0.373_352_111_613_132_64,
            epsilon = 1e-12
        );
    }

    #[test]
    fn noise_repeats_with_period_256() {
        assert_abs_diff_eq!(
            reference_noise(3.7, 1.2, -0.4),
            reference_noise(3.7 + 256.0, 1.2, -0.4 - 256.0),
            epsilon = 1e-9
        );
    }

    #[test]
    fn noise_function_adapter_evaluates_lattice_noise() {
        let noise = LatticeNoise::new(PermutationTable::reference());
        assert_eq!(noise.get([0.5, 0.5, 0.5]), -0.25);
    }

    proptest! {
        #[test]
        fn noise_vanishes_at_integer_lattice_points(
            x in -10_000_i32..10_000,
            y in -10_000_i32..10_000,
            z in -10_000_i32..10_000,
        ) {
            let value = reference_noise(f64::from(x), f64::from(y), f64::from(z));
            prop_assert_eq!(value, 0.0);
        }

        #[test]
        fn noise_is_bounded(
            x in -1000.0..1000.0_f64,
            y in -1000.0..1000.0_f64,
            z in -1000.0..1000.0_f64,
        ) {
            let value = reference_noise(x, y, z);
            prop_assert!(value.abs() <= 1.0);
        }

        #[test]
        fn noise_with_shuffled_table_vanishes_at_lattice_points(
            seed in any::<u64>(),
            x in -100_i32..100,
        ) {
            let table = PermutationTable::shuffled(seed);
            prop_assert_eq!(lattice_noise(&table, f64::from(x), 3.0, -7.0), 0.0);
        }
    }
}
