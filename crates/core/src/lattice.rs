//! Three-dimensional sampling lattice and the scalar field stored on it.
//!
//! A [`Lattice`] describes `resolution^3` samples placed at cell centers of
//! the cube `[-bounds, bounds]^3`. A [`ScalarField`] stores one `f32` value per
//! sample (x fastest, then y, then z) and, when colors are enabled, the
//! contribution-weighted sum of source colors at the same sample.

use crate::error::EngineError;
use glam::Vec3;

/// Sample geometry of the field: resolution per axis and half-extent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Lattice {
    resolution: usize,
    bounds: f32,
}

impl Lattice {
    /// Creates a lattice of `resolution` samples per axis spanning `[-bounds, bounds]`.
    ///
    /// Returns `EngineError::InvalidDimensions` if `resolution < 2` or the total
    /// sample count overflows `usize`, and `EngineError::InvalidConfig` for a
    /// non-positive or non-finite `bounds`.
    pub fn new(resolution: usize, bounds: f32) -> Result<Self, EngineError> {
        if resolution < 2 {
            return Err(EngineError::InvalidDimensions);
        }
        resolution
            .checked_mul(resolution)
            .and_then(|n| n.checked_mul(resolution))
            .ok_or(EngineError::InvalidDimensions)?;
        if !bounds.is_finite() || bounds <= 0.0 {
            return Err(EngineError::InvalidConfig(format!(
                "bounds must be positive and finite, got {bounds}"
            )));
        }
        Ok(Self { resolution, bounds })
    }

    /// Samples per axis.
    pub fn resolution(&self) -> usize {
        self.resolution
    }

    /// Half-extent of the sampled cube.
    pub fn bounds(&self) -> f32 {
        self.bounds
    }

    /// Distance between neighbouring samples.
    pub fn spacing(&self) -> f32 {
        2.0 * self.bounds / self.resolution as f32
    }

    /// Total number of samples.
    pub fn sample_count(&self) -> usize {
        self.resolution * self.resolution * self.resolution
    }

    /// Samples in one z-slab.
    pub fn slab_len(&self) -> usize {
        self.resolution * self.resolution
    }

    /// Flat index of sample `(i, j, k)`.
    pub fn index(&self, i: usize, j: usize, k: usize) -> usize {
        (k * self.resolution + j) * self.resolution + i
    }

    /// World coordinate of sample `i` along any axis.
    pub fn coord(&self, i: usize) -> f32 {
        -self.bounds + (i as f32 + 0.5) * self.spacing()
    }

    /// World position of sample `(i, j, k)`.
    pub fn position(&self, i: usize, j: usize, k: usize) -> Vec3 {
        Vec3::new(self.coord(i), self.coord(j), self.coord(k))
    }

    /// Inclusive range of sample indices whose coordinate lies within
    /// `radius` of `center` along one axis, or `None` if no sample does.
    pub fn index_range(&self, center: f32, radius: f32) -> Option<(usize, usize)> {
        if !center.is_finite() || !radius.is_finite() {
            return None;
        }
        let h = self.spacing();
        let lo = ((center - radius + self.bounds) / h - 0.5).ceil().max(0.0);
        let hi = ((center + radius + self.bounds) / h - 0.5)
            .floor()
            .min((self.resolution - 1) as f32);
        if lo > hi {
            return None;
        }
        Some((lo as usize, hi as usize))
    }
}

/// Scalar values (and optional weighted colors) sampled on a [`Lattice`].
#[derive(Debug, Clone, PartialEq)]
pub struct ScalarField {
    lattice: Lattice,
    values: Vec<f32>,
    colors: Vec<Vec3>,
}

impl ScalarField {
    /// Creates a zero-filled field. When `with_colors` is set the field also
    /// carries a weighted color channel.
    pub fn new(lattice: Lattice, with_colors: bool) -> Self {
        let n = lattice.sample_count();
        Self {
            lattice,
            values: vec![0.0; n],
            colors: if with_colors {
                vec![Vec3::ZERO; n]
            } else {
                Vec::new()
            },
        }
    }

    /// Creates a field from pre-computed values (no color channel).
    ///
    /// Returns `EngineError::DimensionMismatch` if `values.len()` is not
    /// `resolution^3`.
    pub fn from_values(lattice: Lattice, values: Vec<f32>) -> Result<Self, EngineError> {
        if values.len() != lattice.sample_count() {
            return Err(EngineError::DimensionMismatch {
                lhs: lattice.sample_count(),
                rhs: values.len(),
            });
        }
        Ok(Self {
            lattice,
            values,
            colors: Vec::new(),
        })
    }

    pub fn lattice(&self) -> &Lattice {
        &self.lattice
    }

    pub fn resolution(&self) -> usize {
        self.lattice.resolution
    }

    /// Read-only access to the raw sample values.
    pub fn values(&self) -> &[f32] {
        &self.values
    }

    /// Whether a color channel is carried.
    pub fn has_colors(&self) -> bool {
        !self.colors.is_empty()
    }

    /// Weighted color sums, if the color channel is enabled.
    pub fn colors(&self) -> Option<&[Vec3]> {
        if self.colors.is_empty() {
            None
        } else {
            Some(&self.colors)
        }
    }

    /// Splits the field into its lattice and mutable value/color buffers.
    ///
    /// Samplers write through these; the color slice is `None` when the
    /// channel is disabled.
    pub fn buffers_mut(&mut self) -> (&Lattice, &mut [f32], Option<&mut [Vec3]>) {
        let colors = if self.colors.is_empty() {
            None
        } else {
            Some(self.colors.as_mut_slice())
        };
        (&self.lattice, &mut self.values, colors)
    }

    /// Zeroes all values and colors, keeping the allocation.
    pub fn clear(&mut self) {
        self.values.fill(0.0);
        self.colors.fill(Vec3::ZERO);
    }

    /// Value at sample `(i, j, k)`.
    pub fn get(&self, i: usize, j: usize, k: usize) -> f32 {
        self.values[self.lattice.index(i, j, k)]
    }

    /// Contribution-weighted average source color (linear RGB) at a sample.
    ///
    /// Returns `None` when colors are disabled or nothing contributes there.
    pub fn color_at(&self, i: usize, j: usize, k: usize) -> Option<Vec3> {
        if self.colors.is_empty() {
            return None;
        }
        let idx = self.lattice.index(i, j, k);
        let weight = self.values[idx];
        if weight > 0.0 {
            Some(self.colors[idx] / weight)
        } else {
            None
        }
    }

    /// Field gradient at a sample by central differences, one-sided at the
    /// lattice faces.
    pub fn gradient(&self, i: usize, j: usize, k: usize) -> Vec3 {
        let last = self.lattice.resolution - 1;
        let h = self.lattice.spacing();
        let diff = |lo: usize, hi: usize, a: f32, b: f32| (b - a) / ((hi - lo) as f32 * h);

        let (i0, i1) = (i.saturating_sub(1), (i + 1).min(last));
        let (j0, j1) = (j.saturating_sub(1), (j + 1).min(last));
        let (k0, k1) = (k.saturating_sub(1), (k + 1).min(last));

        Vec3::new(
            diff(i0, i1, self.get(i0, j, k), self.get(i1, j, k)),
            diff(j0, j1, self.get(i, j0, k), self.get(i, j1, k)),
            diff(k0, k1, self.get(i, j, k0), self.get(i, j, k1)),
        )
    }

    /// Largest sample value (0 for an empty field).
    pub fn max_value(&self) -> f32 {
        self.values.iter().copied().fold(0.0, f32::max)
    }
}
