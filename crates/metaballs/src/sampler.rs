//! Scalar field sampling.
//!
//! Each sample of the lattice receives the sum of all source contributions
//! at its position. A source only reaches samples inside its falloff radius,
//! so the sampler walks the axis-aligned box around each source instead of
//! the whole lattice. With the `parallel` feature, z-slabs are filled on the
//! rayon pool; every sample still accumulates sources in list order, so both
//! paths produce identical fields.

use crate::source::{Falloff, FieldSource};
use glam::Vec3;
use liquid_metal_core::{Lattice, ScalarField};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Lattice box reached by one source.
struct Footprint {
    center: Vec3,
    strength: f32,
    inv_r2: f32,
    color: Vec3,
    i: (usize, usize),
    j: (usize, usize),
    k: (usize, usize),
}

impl Footprint {
    fn new(source: &FieldSource, lattice: &Lattice) -> Option<Self> {
        let r = source.subtract_radius;
        if !source.position.is_finite() || !source.strength.is_finite() || !(r > 0.0) {
            return None;
        }
        let c = source.position;
        Some(Self {
            center: c,
            strength: source.strength,
            inv_r2: 1.0 / (r * r),
            color: source.color.to_linear(),
            i: lattice.index_range(c.x, r)?,
            j: lattice.index_range(c.y, r)?,
            k: lattice.index_range(c.z, r)?,
        })
    }
}

/// Samples `sources` onto a fresh field.
pub fn sample(
    sources: &[FieldSource],
    lattice: Lattice,
    falloff: Falloff,
    with_colors: bool,
) -> ScalarField {
    let mut field = ScalarField::new(lattice, with_colors);
    sample_into(&mut field, sources, falloff);
    field
}

/// Overwrites `field` with the contributions of `sources`, reusing its buffers.
///
/// Sources with a non-finite position are skipped.
pub fn sample_into(field: &mut ScalarField, sources: &[FieldSource], falloff: Falloff) {
    field.clear();
    let (lattice, values, colors) = field.buffers_mut();
    let lattice = *lattice;
    let footprints: Vec<Footprint> = sources
        .iter()
        .filter_map(|s| Footprint::new(s, &lattice))
        .collect();
    if footprints.is_empty() {
        return;
    }
    let slab = lattice.slab_len();

    #[cfg(feature = "parallel")]
    match colors {
        Some(colors) => values
            .par_chunks_mut(slab)
            .zip(colors.par_chunks_mut(slab))
            .enumerate()
            .for_each(|(k, (v, c))| fill_slab(&lattice, k, v, Some(c), &footprints, falloff)),
        None => values
            .par_chunks_mut(slab)
            .enumerate()
            .for_each(|(k, v)| fill_slab(&lattice, k, v, None, &footprints, falloff)),
    };

    #[cfg(not(feature = "parallel"))]
    match colors {
        Some(colors) => values
            .chunks_mut(slab)
            .zip(colors.chunks_mut(slab))
            .enumerate()
            .for_each(|(k, (v, c))| fill_slab(&lattice, k, v, Some(c), &footprints, falloff)),
        None => values
            .chunks_mut(slab)
            .enumerate()
            .for_each(|(k, v)| fill_slab(&lattice, k, v, None, &footprints, falloff)),
    };
}

/// Accumulates every footprint that reaches slab `k`.
fn fill_slab(
    lattice: &Lattice,
    k: usize,
    values: &mut [f32],
    mut colors: Option<&mut [Vec3]>,
    footprints: &[Footprint],
    falloff: Falloff,
) {
    let res = lattice.resolution();
    let z = lattice.coord(k);
    for fp in footprints.iter().filter(|fp| fp.k.0 <= k && k <= fp.k.1) {
        let dz = z - fp.center.z;
        for j in fp.j.0..=fp.j.1 {
            let dy = lattice.coord(j) - fp.center.y;
            let row = j * res;
            for i in fp.i.0..=fp.i.1 {
                let dx = lattice.coord(i) - fp.center.x;
                let t2 = (dx * dx + dy * dy + dz * dz) * fp.inv_r2;
                let w = fp.strength * falloff.shape(t2);
                if w > 0.0 {
                    values[row + i] += w;
                    if let Some(colors) = colors.as_deref_mut() {
                        colors[row + i] += fp.color * w;
                    }
                }
            }
        }
    }
}
