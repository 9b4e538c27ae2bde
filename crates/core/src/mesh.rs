//! Indexed triangle mesh handed to the renderer every frame.
//!
//! Vertices carry a position and a normal, plus optional linear-RGB colors and
//! UVs when those channels are enabled. The mesh also records whether the
//! extractor stopped early because of the triangle budget.

use glam::{Vec2, Vec3};
use std::collections::HashMap;

/// Indexed triangle mesh with optional color and UV channels.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    positions: Vec<Vec3>,
    normals: Vec<Vec3>,
    colors: Option<Vec<Vec3>>,
    uvs: Option<Vec<Vec2>>,
    triangles: Vec<[u32; 3]>,
    truncated: bool,
}

impl Mesh {
    /// Creates an empty mesh with the requested optional channels.
    pub fn new(with_colors: bool, with_uvs: bool) -> Self {
        Self {
            colors: with_colors.then(Vec::new),
            uvs: with_uvs.then(Vec::new),
            ..Self::default()
        }
    }

    /// Appends a vertex and returns its index.
    ///
    /// A `None` color or UV on an enabled channel is stored as white / zero;
    /// values for disabled channels are ignored.
    pub fn push_vertex(
        &mut self,
        position: Vec3,
        normal: Vec3,
        color: Option<Vec3>,
        uv: Option<Vec2>,
    ) -> u32 {
        let index = self.positions.len() as u32;
        self.positions.push(position);
        self.normals.push(normal);
        if let Some(colors) = self.colors.as_mut() {
            colors.push(color.unwrap_or(Vec3::ONE));
        }
        if let Some(uvs) = self.uvs.as_mut() {
            uvs.push(uv.unwrap_or(Vec2::ZERO));
        }
        index
    }

    /// Appends a triangle of existing vertex indices.
    pub fn push_triangle(&mut self, triangle: [u32; 3]) {
        debug_assert!(triangle.iter().all(|&i| (i as usize) < self.positions.len()));
        self.triangles.push(triangle);
    }

    /// Overwrites the normal of vertex `index`.
    pub fn set_normal(&mut self, index: u32, normal: Vec3) {
        self.normals[index as usize] = normal;
    }

    /// Flags the mesh as cut short by the triangle budget.
    pub fn mark_truncated(&mut self) {
        self.truncated = true;
    }

    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    pub fn normals(&self) -> &[Vec3] {
        &self.normals
    }

    /// Per-vertex linear RGB colors, if the channel is enabled.
    pub fn colors(&self) -> Option<&[Vec3]> {
        self.colors.as_deref()
    }

    /// Per-vertex UVs, if the channel is enabled.
    pub fn uvs(&self) -> Option<&[Vec2]> {
        self.uvs.as_deref()
    }

    pub fn triangles(&self) -> &[[u32; 3]] {
        &self.triangles
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    /// Whether emission stopped at the triangle budget.
    pub fn is_truncated(&self) -> bool {
        self.truncated
    }

    /// Corner positions of triangle `t`.
    pub fn triangle_positions(&self, t: usize) -> [Vec3; 3] {
        let [a, b, c] = self.triangles[t];
        [
            self.positions[a as usize],
            self.positions[b as usize],
            self.positions[c as usize],
        ]
    }

    /// Area of triangle `t`.
    pub fn triangle_area(&self, t: usize) -> f32 {
        let [a, b, c] = self.triangle_positions(t);
        0.5 * (b - a).cross(c - a).length()
    }

    /// Axis-aligned bounds of all vertices, or `None` for an empty mesh.
    pub fn bounding_box(&self) -> Option<(Vec3, Vec3)> {
        let first = *self.positions.first()?;
        Some(
            self.positions
                .iter()
                .fold((first, first), |(lo, hi), &p| (lo.min(p), hi.max(p))),
        )
    }

    /// Number of edge-connected triangle islands.
    pub fn component_count(&self) -> usize {
        let mut parent: Vec<usize> = (0..self.positions.len()).collect();
        fn find(parent: &mut [usize], mut x: usize) -> usize {
            while parent[x] != x {
                parent[x] = parent[parent[x]];
                x = parent[x];
            }
            x
        }
        for &[a, b, c] in &self.triangles {
            for (u, v) in [(a, b), (b, c)] {
                let ru = find(&mut parent, u as usize);
                let rv = find(&mut parent, v as usize);
                if ru != rv {
                    parent[ru] = rv;
                }
            }
        }
        let mut roots: Vec<usize> = self
            .triangles
            .iter()
            .map(|t| find(&mut parent, t[0] as usize))
            .collect();
        roots.sort_unstable();
        roots.dedup();
        roots.len()
    }

    /// Number of undirected edges not shared by exactly two triangles.
    ///
    /// Zero for a closed surface.
    pub fn open_edge_count(&self) -> usize {
        let mut uses: HashMap<(u32, u32), u32> = HashMap::new();
        for &[a, b, c] in &self.triangles {
            for (u, v) in [(a, b), (b, c), (c, a)] {
                *uses.entry((u.min(v), u.max(v))).or_insert(0) += 1;
            }
        }
        uses.values().filter(|&&n| n != 2).count()
    }

    /// Whether every directed edge appears at most once, i.e. neighbouring
    /// triangles agree on winding.
    pub fn is_consistently_oriented(&self) -> bool {
        let mut seen = HashMap::new();
        self.triangles.iter().all(|&[a, b, c]| {
            [(a, b), (b, c), (c, a)]
                .into_iter()
                .all(|edge| seen.insert(edge, ()).is_none())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Unit tetrahedron with outward winding.
    fn tetrahedron() -> Mesh {
        let mut mesh = Mesh::new(false, false);
        let p = [
            Vec3::ZERO,
            Vec3::X,
            Vec3::Y,
            Vec3::Z,
        ];
        for v in p {
            mesh.push_vertex(v, Vec3::ZERO, None, None);
        }
        for t in [[0, 2, 1], [0, 1, 3], [0, 3, 2], [1, 2, 3]] {
            mesh.push_triangle(t);
        }
        mesh
    }

    #[test]
    fn new_mesh_is_empty_with_requested_channels() {
        let mesh = Mesh::new(true, false);
        assert!(mesh.is_empty());
        assert_eq!(mesh.colors().map(<[Vec3]>::len), Some(0));
        assert!(mesh.uvs().is_none());
        assert!(!mesh.is_truncated());
    }

    #[test]
    fn push_vertex_fills_enabled_channels_with_defaults() {
        let mut mesh = Mesh::new(true, true);
        let i = mesh.push_vertex(Vec3::ONE, Vec3::Z, None, None);
        assert_eq!(i, 0);
        assert_eq!(mesh.colors().unwrap()[0], Vec3::ONE);
        assert_eq!(mesh.uvs().unwrap()[0], Vec2::ZERO);
    }

    #[test]
    fn push_vertex_ignores_disabled_channels() {
        let mut mesh = Mesh::new(false, false);
        mesh.push_vertex(Vec3::ONE, Vec3::Z, Some(Vec3::X), Some(Vec2::ONE));
        assert!(mesh.colors().is_none());
        assert!(mesh.uvs().is_none());
        assert_eq!(mesh.vertex_count(), 1);
    }

    #[test]
    fn tetrahedron_is_closed_and_oriented() {
        let mesh = tetrahedron();
        assert_eq!(mesh.triangle_count(), 4);
        assert_eq!(mesh.open_edge_count(), 0);
        assert!(mesh.is_consistently_oriented());
        assert_eq!(mesh.component_count(), 1);
    }

    #[test]
    fn flipped_triangle_breaks_orientation() {
        let mut mesh = tetrahedron();
        mesh.triangles[0] = [0, 1, 2];
        assert!(!mesh.is_consistently_oriented());
        assert_eq!(mesh.open_edge_count(), 0);
    }

    #[test]
    fn missing_face_opens_three_edges() {
        let mut mesh = tetrahedron();
        mesh.triangles.pop();
        assert_eq!(mesh.open_edge_count(), 3);
    }

    #[test]
    fn separate_islands_are_counted() {
        let mut mesh = tetrahedron();
        let offset = mesh.vertex_count() as u32;
        for v in [Vec3::splat(5.0), Vec3::new(6.0, 5.0, 5.0), Vec3::new(5.0, 6.0, 5.0)] {
            mesh.push_vertex(v, Vec3::ZERO, None, None);
        }
        mesh.push_triangle([offset, offset + 1, offset + 2]);
        assert_eq!(mesh.component_count(), 2);
    }

    #[test]
    fn triangle_area_and_bounds() {
        let mesh = tetrahedron();
        assert!((mesh.triangle_area(0) - 0.5).abs() < 1e-6);
        assert_eq!(mesh.bounding_box(), Some((Vec3::ZERO, Vec3::ONE)));
        assert_eq!(Mesh::default().bounding_box(), None);
    }

    #[test]
    fn set_normal_and_truncation_flag() {
        let mut mesh = tetrahedron();
        mesh.set_normal(2, Vec3::Y);
        assert_eq!(mesh.normals()[2], Vec3::Y);
        mesh.mark_truncated();
        assert!(mesh.is_truncated());
    }
}
