//! Wavefront OBJ output.
use std::io::Write;

use eyre_pretty::Result;
use gesurf::vertex::Primitive;

use crate::capture::Mesh;

/// Writes every mesh as its own object. Indices in OBJ files are 1-based and global to the file.
pub fn write(mut out: impl Write, meshes: &[Mesh]) -> Result<()> {
    let mut offset = 1;
    for (i, mesh) in meshes.iter().enumerate() {
        writeln!(out, "o surface{i}")?;

        for vertex in &mesh.vertices {
            let [x, y, z] = vertex.position.to_array();
            let color = vertex.color;
            writeln!(
                out,
                "v {x} {y} {z} {} {} {}",
                color.r as f32 / 255.0,
                color.g as f32 / 255.0,
                color.b as f32 / 255.0
            )?;
        }

        for vertex in &mesh.vertices {
            writeln!(out, "vt {} {}", vertex.uv.x, vertex.uv.y)?;
        }

        for vertex in &mesh.vertices {
            let [x, y, z] = vertex.normal.to_array();
            writeln!(out, "vn {x} {y} {z}")?;
        }

        let index = |i: u16| i as usize + offset;
        match mesh.primitive {
            Primitive::Triangles => {
                for tri in mesh.indices.chunks_exact(3) {
                    let [a, b, c] = [index(tri[0]), index(tri[1]), index(tri[2])];
                    writeln!(out, "f {a}/{a}/{a} {b}/{b}/{b} {c}/{c}/{c}")?;
                }
            }
            Primitive::Lines => {
                for line in mesh.indices.chunks_exact(2) {
                    writeln!(out, "l {} {}", index(line[0]), index(line[1]))?;
                }
            }
            Primitive::Points => {
                for &point in &mesh.indices {
                    writeln!(out, "p {}", index(point))?;
                }
            }
        }

        offset += mesh.vertices.len();
    }

    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;
    use gesurf::vertex::SimpleVertex;

    fn mesh(primitive: Primitive, indices: Vec<u16>) -> Mesh {
        Mesh {
            vertices: vec![SimpleVertex::default(); 4],
            indices,
            primitive,
        }
    }

    #[test]
    fn indices_are_global() {
        let meshes = [
            mesh(Primitive::Triangles, vec![0, 2, 1, 1, 2, 3]),
            mesh(Primitive::Lines, vec![0, 2, 1, 3]),
        ];

        let mut out = vec![];
        write(&mut out, &meshes).unwrap();
        let text = String::from_utf8(out).unwrap();

        let faces: Vec<_> = text.lines().filter(|l| l.starts_with("f ")).collect();
        assert_eq!(faces, ["f 1/1/1 3/3/3 2/2/2", "f 2/2/2 3/3/3 4/4/4"]);

        let lines: Vec<_> = text.lines().filter(|l| l.starts_with("l ")).collect();
        assert_eq!(lines, ["l 5 7", "l 6 8"]);

        assert_eq!(text.lines().filter(|l| l.starts_with("v ")).count(), 8);
    }
}
