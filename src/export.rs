use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// Write a mesh as plain text, one `v x y z` line per vertex and one
/// 1-based `f i j k` line per triangle. The homogeneous w component is
/// not written. Output is byte-identical for identical input.
pub fn write_obj<W: Write>(
    out: &mut W,
    vertices: &[[f32; 4]],
    triangles: &[[u32; 3]],
) -> io::Result<()> {
    for v in vertices {
        writeln!(out, "v {} {} {}", v[0], v[1], v[2])?;
    }
    for t in triangles {
        writeln!(out, "f {} {} {}", t[0] + 1, t[1] + 1, t[2] + 1)?;
    }
    Ok(())
}

pub fn save_obj<P: AsRef<Path>>(
    path: P,
    vertices: &[[f32; 4]],
    triangles: &[[u32; 3]],
) -> io::Result<()> {
    let mut out = BufWriter::new(File::create(path)?);
    write_obj(&mut out, vertices, triangles)?;
    out.flush()
}
