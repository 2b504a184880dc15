use std::{io, path::Path};

use glam::Vec3;

/// Stable index of a mesh inside [`crate::scene::Scene`]'s mesh arena.
/// Object instances hold a handle, never a copy of the geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MeshHandle(pub(crate) usize);

/// A triangle: three vertex indices plus three independently addressed
/// normal indices, any of which may be absent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Face {
    pub vertices: [usize; 3],
    pub normals: [Option<usize>; 3],
}

/// Immutable triangle mesh. Built once by the OBJ loader, then only read.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    pub vertices: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    pub faces: Vec<Face>,
}

impl Mesh {
    pub fn load(path: impl AsRef<Path>) -> io::Result<Mesh> {
        Ok(Mesh::parse(&std::fs::read_to_string(path)?))
    }

    /// Parse the OBJ subset used by scene meshes: `v x y z`, `vn x y z` and
    /// `f` lines with plain vertex indices or `vertex//normal` pairs.
    ///
    /// Malformed coordinate tokens read as 0.0 and the vertex is kept, so
    /// that face indices further down the file stay aligned. Faces with
    /// fewer than 3 indices, or with indices that are not positive
    /// integers, are dropped.
    pub fn parse(text: &str) -> Mesh {
        let mut mesh = Mesh::default();

        for line in text.lines() {
            let mut tokens = line.split_whitespace();
            match tokens.next() {
                Some("v") => mesh.vertices.push(read_vec3(&mut tokens)),
                Some("vn") => mesh.normals.push(read_vec3(&mut tokens)),
                Some("f") => {
                    let corners: Vec<_> = tokens.take(3).map(parse_face_token).collect();
                    if corners.len() < 3 {
                        continue;
                    }
                    if let (Some(a), Some(b), Some(c)) = (corners[0], corners[1], corners[2]) {
                        mesh.faces.push(Face {
                            vertices: [a.0, b.0, c.0],
                            normals: [a.1, b.1, c.1],
                        });
                    }
                }
                _ => {}
            }
        }

        mesh
    }
}

fn read_vec3<'a>(tokens: &mut impl Iterator<Item = &'a str>) -> Vec3 {
    let mut next = || tokens.next().and_then(|t| t.parse().ok()).unwrap_or(0.0);
    let (x, y, z) = (next(), next(), next());
    Vec3::new(x, y, z)
}

/// `7` -> vertex 6, no normal; `7//3` -> vertex 6, normal 2. OBJ indices are
/// 1-based; anything else invalidates the whole face.
fn parse_face_token(token: &str) -> Option<(usize, Option<usize>)> {
    let to_index = |t: &str| t.parse::<usize>().ok().filter(|&i| i > 0).map(|i| i - 1);

    match token.split_once("//") {
        Some((v, n)) => Some((to_index(v)?, Some(to_index(n)?))),
        None => Some((to_index(token)?, None)),
    }
}
