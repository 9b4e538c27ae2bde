//! Wavefront OBJ export of a frame's mesh.

use liquid_metal_core::error::EngineError;
use liquid_metal_core::Mesh;
use std::io::Write;

/// Writes positions, normals, optional UVs and faces as OBJ text.
///
/// Vertex colors are appended to `v` lines as linear RGB, the common
/// extension understood by most mesh viewers.
pub fn write_obj<W: Write>(mesh: &Mesh, mut out: W) -> Result<(), EngineError> {
    let io = |e: std::io::Error| EngineError::Io(e.to_string());

    writeln!(
        out,
        "# liquid-metal mesh: {} vertices, {} triangles",
        mesh.vertex_count(),
        mesh.triangle_count()
    )
    .map_err(io)?;

    for (i, p) in mesh.positions().iter().enumerate() {
        let line = match mesh.colors() {
            Some(colors) => {
                let c = colors[i];
                writeln!(out, "v {} {} {} {} {} {}", p.x, p.y, p.z, c.x, c.y, c.z)
            }
            None => writeln!(out, "v {} {} {}", p.x, p.y, p.z),
        };
        line.map_err(io)?;
    }
    for n in mesh.normals() {
        writeln!(out, "vn {} {} {}", n.x, n.y, n.z).map_err(io)?;
    }
    if let Some(uvs) = mesh.uvs() {
        for uv in uvs {
            writeln!(out, "vt {} {}", uv.x, uv.y).map_err(io)?;
        }
    }

    let textured = mesh.uvs().is_some();
    for &[a, b, c] in mesh.triangles() {
        let (a, b, c) = (a + 1, b + 1, c + 1);
        let line = if textured {
            writeln!(out, "f {a}/{a}/{a} {b}/{b}/{b} {c}/{c}/{c}")
        } else {
            writeln!(out, "f {a}//{a} {b}//{b} {c}//{c}")
        };
        line.map_err(io)?;
    }
    out.flush().map_err(io)
}
