//! Marching-cubes case table.
//!
//! Rather than carrying the classic 256-entry literal, the table is derived
//! once from cube topology. On every cube face the crossing edges are paired
//! into segments (ambiguous faces always separate the inside corners), each
//! segment is oriented so the inside lies on its right when the face is seen
//! from outside the cube, and the segments are chained into closed loops that
//! are fan-triangulated. Because neighbouring cells share faces and make the
//! same face decision, the resulting surface is closed and consistently
//! wound with outward-facing triangles.
//!
//! Corner `c` sits at offset `(c & 1, (c >> 1) & 1, (c >> 2) & 1)`.

use glam::Vec3;
use std::sync::OnceLock;

/// Lattice offset of each cube corner.
pub const CORNER_OFFSETS: [[usize; 3]; 8] = [
    [0, 0, 0],
    [1, 0, 0],
    [0, 1, 0],
    [1, 1, 0],
    [0, 0, 1],
    [1, 0, 1],
    [0, 1, 1],
    [1, 1, 1],
];

/// Corner pairs of the twelve cube edges, lower corner first.
///
/// Edges `0..4` run along x, `4..8` along y and `8..12` along z.
pub const EDGE_CORNERS: [[usize; 2]; 12] = [
    [0, 1],
    [2, 3],
    [4, 5],
    [6, 7],
    [0, 2],
    [1, 3],
    [4, 6],
    [5, 7],
    [0, 4],
    [1, 5],
    [2, 6],
    [3, 7],
];

/// One cube face: corners in cyclic order, the edge from corner `k` to
/// corner `k + 1` at `edges[k]`, and the outward normal.
struct Face {
    corners: [usize; 4],
    edges: [usize; 4],
    normal: Vec3,
}

const FACES: [Face; 6] = [
    Face {
        corners: [0, 2, 6, 4],
        edges: [4, 10, 6, 8],
        normal: Vec3::NEG_X,
    },
    Face {
        corners: [1, 3, 7, 5],
        edges: [5, 11, 7, 9],
        normal: Vec3::X,
    },
    Face {
        corners: [0, 1, 5, 4],
        edges: [0, 9, 2, 8],
        normal: Vec3::NEG_Y,
    },
    Face {
        corners: [2, 3, 7, 6],
        edges: [1, 11, 3, 10],
        normal: Vec3::Y,
    },
    Face {
        corners: [0, 1, 3, 2],
        edges: [0, 5, 1, 4],
        normal: Vec3::NEG_Z,
    },
    Face {
        corners: [4, 5, 7, 6],
        edges: [2, 7, 3, 6],
        normal: Vec3::Z,
    },
];

/// Axis (0 = x, 1 = y, 2 = z) an edge runs along.
pub fn edge_axis(edge: usize) -> usize {
    edge / 4
}

/// Triangles for all 256 corner configurations.
pub struct CaseTable {
    cases: Vec<Vec<[u8; 3]>>,
}

impl CaseTable {
    fn build() -> Self {
        Self {
            cases: (0..=255u8)
                .map(|case| {
                    edge_loops(case)
                        .iter()
                        .flat_map(|lp| fan(lp))
                        .collect()
                })
                .collect(),
        }
    }

    /// Edge-index triangles for a case. Bit `c` of `case` is set when corner
    /// `c` is inside the surface.
    pub fn triangles(&self, case: u8) -> &[[u8; 3]] {
        &self.cases[case as usize]
    }
}

/// Shared table, built on first use.
pub fn case_table() -> &'static CaseTable {
    static TABLE: OnceLock<CaseTable> = OnceLock::new();
    TABLE.get_or_init(CaseTable::build)
}

fn corner_position(corner: usize) -> Vec3 {
    let [x, y, z] = CORNER_OFFSETS[corner];
    Vec3::new(x as f32, y as f32, z as f32)
}

fn edge_midpoint(edge: usize) -> Vec3 {
    let [a, b] = EDGE_CORNERS[edge];
    (corner_position(a) + corner_position(b)) * 0.5
}

/// Successor of each crossing edge around the surface, per face segment.
fn edge_successors(case: u8) -> [Option<usize>; 12] {
    let inside = |corner: usize| (case >> corner) & 1 == 1;
    let mut next = [None; 12];

    for face in &FACES {
        let ring = face.corners;
        let crossing: Vec<usize> = (0..4)
            .filter(|&k| inside(ring[k]) != inside(ring[(k + 1) % 4]))
            .collect();
        let pairs = match crossing.as_slice() {
            &[a, b] => vec![(a, b)],
            // Ambiguous face: cut off each inside corner on its own.
            &[_, _, _, _] if inside(ring[1]) => vec![(0, 1), (2, 3)],
            &[_, _, _, _] => vec![(1, 2), (3, 0)],
            _ => Vec::new(),
        };

        for (ka, kb) in pairs {
            let reference = if (ka + 1) % 4 == kb {
                ring[kb]
            } else if (kb + 1) % 4 == ka {
                ring[ka]
            } else {
                ring[(ka + 1) % 4]
            };
            let (ea, eb) = (face.edges[ka], face.edges[kb]);
            let pa = edge_midpoint(ea);
            let pb = edge_midpoint(eb);
            let side = face.normal.cross(pb - pa).dot(corner_position(reference) - pa);
            let (from, to) = if (side > 0.0) == inside(reference) {
                (eb, ea)
            } else {
                (ea, eb)
            };
            next[from] = Some(to);
        }
    }
    next
}

/// Closed loops of crossing edges for a case.
fn edge_loops(case: u8) -> Vec<Vec<u8>> {
    let next = edge_successors(case);
    let mut visited = [false; 12];
    let mut loops = Vec::new();
    for start in 0..12 {
        if visited[start] || next[start].is_none() {
            continue;
        }
        visited[start] = true;
        let mut lp = vec![start as u8];
        let mut edge = start;
        while let Some(n) = next[edge] {
            if n == start || visited[n] {
                break;
            }
            visited[n] = true;
            lp.push(n as u8);
            edge = n;
        }
        loops.push(lp);
    }
    loops
}

fn shares_face(a: u8, b: u8) -> bool {
    let (a, b) = (a as usize, b as usize);
    FACES
        .iter()
        .any(|f| f.edges.contains(&a) && f.edges.contains(&b))
}

/// Fan-triangulates a loop, starting from a vertex whose diagonals all cut
/// through the cell. A diagonal lying in a face could coincide with one
/// from the neighbouring cell.
fn fan(lp: &[u8]) -> Vec<[u8; 3]> {
    let n = lp.len();
    if n < 3 {
        return Vec::new();
    }
    let start = (0..n)
        .find(|&s| (2..n - 1).all(|i| !shares_face(lp[s], lp[(s + i) % n])))
        .unwrap_or(0);
    let at = |i: usize| lp[(start + i) % n];
    (1..n - 1).map(|i| [at(0), at(i), at(i + 1)]).collect()
}
