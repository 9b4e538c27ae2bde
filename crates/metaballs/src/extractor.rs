//! Isosurface extraction by marching cubes.
//!
//! Cells are visited in z, y, x order. A sample is inside when its value is
//! strictly greater than the threshold. Vertices sit on lattice edges and are
//! shared by every cell touching that edge, so the mesh is indexed and closed
//! wherever the surface stays inside the lattice.

use crate::cases::{case_table, CORNER_OFFSETS, EDGE_CORNERS};
use glam::{Vec2, Vec3};
use liquid_metal_core::{Mesh, ScalarField};
use std::collections::HashMap;

/// Extraction settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExtractOptions {
    pub threshold: f32,
    /// Hard cap on emitted triangles.
    pub max_poly_count: usize,
    /// Emit planar UVs `((x + b) / 2b, (z + b) / 2b)`.
    pub enable_uvs: bool,
}

impl ExtractOptions {
    pub fn new(threshold: f32, max_poly_count: usize) -> Self {
        Self {
            threshold,
            max_poly_count,
            enable_uvs: false,
        }
    }

    pub fn with_uvs(mut self, enable: bool) -> Self {
        self.enable_uvs = enable;
        self
    }
}

/// Extracts the `threshold` level set of `field`.
pub fn extract(field: &ScalarField, threshold: f32, max_poly_count: usize) -> Mesh {
    extract_with(field, &ExtractOptions::new(threshold, max_poly_count))
}

/// Extracts the level set described by `options`.
///
/// Stops once `max_poly_count` triangles have been emitted and another one is
/// pending, marking the mesh truncated. Zero-area triangles are dropped before
/// they create vertices or count against the cap.
pub fn extract_with(field: &ScalarField, options: &ExtractOptions) -> Mesh {
    let mut builder = MeshBuilder {
        field,
        threshold: options.threshold,
        enable_uvs: options.enable_uvs,
        mesh: Mesh::new(field.has_colors(), options.enable_uvs),
        edge_vertices: HashMap::new(),
    };
    let res = field.resolution();
    let table = case_table();

    'cells: for k in 0..res - 1 {
        for j in 0..res - 1 {
            for i in 0..res - 1 {
                let mut case = 0u8;
                for (c, [dx, dy, dz]) in CORNER_OFFSETS.iter().enumerate() {
                    if field.get(i + dx, j + dy, k + dz) > options.threshold {
                        case |= 1 << c;
                    }
                }
                for triangle in table.triangles(case) {
                    let Some(edges) = builder.surviving_edges(i, j, k, *triangle) else {
                        continue;
                    };
                    if builder.mesh.triangle_count() >= options.max_poly_count {
                        builder.mesh.mark_truncated();
                        break 'cells;
                    }
                    builder.emit(edges);
                }
            }
        }
    }

    let mut mesh = builder.mesh;
    repair_flat_normals(&mut mesh);
    mesh
}

type Sample = (usize, usize, usize);

/// A lattice edge crossed by the surface, lower sample first.
#[derive(Debug, Clone, Copy)]
struct CellEdge {
    a: Sample,
    b: Sample,
    axis: usize,
}

struct MeshBuilder<'a> {
    field: &'a ScalarField,
    threshold: f32,
    enable_uvs: bool,
    mesh: Mesh,
    /// Keyed by the flat index of the edge's lower sample and its axis.
    edge_vertices: HashMap<(usize, usize), u32>,
}

impl MeshBuilder<'_> {
    /// The triangle's edges, or `None` if its vertices would span no area.
    fn surviving_edges(
        &self,
        i: usize,
        j: usize,
        k: usize,
        triangle: [u8; 3],
    ) -> Option<[CellEdge; 3]> {
        let edges = triangle.map(|edge| cell_edge(i, j, k, edge as usize));
        let [a, b, c] = edges.map(|e| self.crossing(e).1);
        ((b - a).cross(c - a).length_squared() > 0.0).then_some(edges)
    }

    fn emit(&mut self, edges: [CellEdge; 3]) {
        let ids = edges.map(|e| self.edge_vertex(e));
        self.mesh.push_triangle(ids);
    }

    fn edge_vertex(&mut self, edge: CellEdge) -> u32 {
        let a = edge.a;
        let key = (self.field.lattice().index(a.0, a.1, a.2), edge.axis);
        if let Some(&id) = self.edge_vertices.get(&key) {
            return id;
        }
        let id = self.new_vertex(edge);
        self.edge_vertices.insert(key, id);
        id
    }

    /// Interpolation parameter and position of the level crossing on `edge`.
    fn crossing(&self, CellEdge { a, b, .. }: CellEdge) -> (f32, Vec3) {
        let field = self.field;
        let lattice = field.lattice();
        let va = field.get(a.0, a.1, a.2);
        let vb = field.get(b.0, b.1, b.2);
        let t = ((self.threshold - va) / (vb - va)).clamp(0.0, 1.0);

        let pa = lattice.position(a.0, a.1, a.2);
        let pb = lattice.position(b.0, b.1, b.2);
        (t, pa.lerp(pb, t))
    }

    fn new_vertex(&mut self, edge: CellEdge) -> u32 {
        let field = self.field;
        let lattice = field.lattice();
        let CellEdge { a, b, .. } = edge;
        let (t, position) = self.crossing(edge);

        let gradient = field
            .gradient(a.0, a.1, a.2)
            .lerp(field.gradient(b.0, b.1, b.2), t);
        let normal = (-gradient).normalize_or_zero();

        let color = match (field.color_at(a.0, a.1, a.2), field.color_at(b.0, b.1, b.2)) {
            (Some(x), Some(y)) => Some(x.lerp(y, t)),
            (Some(x), None) | (None, Some(x)) => Some(x),
            (None, None) => None,
        };

        let uv = self.enable_uvs.then(|| {
            let span = 2.0 * lattice.bounds();
            Vec2::new(
                (position.x + lattice.bounds()) / span,
                (position.z + lattice.bounds()) / span,
            )
        });

        self.mesh.push_vertex(position, normal, color, uv)
    }
}

fn cell_edge(i: usize, j: usize, k: usize, edge: usize) -> CellEdge {
    let [ca, cb] = EDGE_CORNERS[edge];
    let corner = |c: usize| -> Sample {
        let [dx, dy, dz] = CORNER_OFFSETS[c];
        (i + dx, j + dy, k + dz)
    };
    CellEdge {
        a: corner(ca),
        b: corner(cb),
        axis: edge / 4,
    }
}

/// Gives vertices whose field gradient vanished the area-weighted normal of
/// their triangles.
fn repair_flat_normals(mesh: &mut Mesh) {
    let flat: Vec<bool> = mesh.normals().iter().map(|n| *n == Vec3::ZERO).collect();
    if !flat.contains(&true) {
        return;
    }
    let mut sums = vec![Vec3::ZERO; mesh.vertex_count()];
    for t in 0..mesh.triangle_count() {
        let [a, b, c] = mesh.triangle_positions(t);
        let face = (b - a).cross(c - a);
        for id in mesh.triangles()[t] {
            sums[id as usize] += face;
        }
    }
    for (id, sum) in sums.into_iter().enumerate() {
        if flat[id] {
            mesh.set_normal(id as u32, sum.normalize_or_zero());
        }
    }
}
