use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use glam::{Vec2, Vec3};

/// De-indexed mesh attributes in draw order, one entry per face corner
#[derive(Debug, Clone, Default)]
pub struct MeshData {
    pub positions: Vec<Vec3>,
    pub uvs: Vec<Vec2>,
    pub normals: Vec<Vec3>,
}

impl MeshData {
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// The hard-coded 12-triangle unit cube with its Blender-generated UV
    /// layout, used whenever no OBJ file is supplied.
    pub fn unit_cube() -> Self {
        const POSITIONS: [[f32; 3]; 36] = [
            [-1.0, -1.0, -1.0],
            [-1.0, -1.0, 1.0],
            [-1.0, 1.0, 1.0],
            [1.0, 1.0, -1.0],
            [-1.0, -1.0, -1.0],
            [-1.0, 1.0, -1.0],
            [1.0, -1.0, 1.0],
            [-1.0, -1.0, -1.0],
            [1.0, -1.0, -1.0],
            [1.0, 1.0, -1.0],
            [1.0, -1.0, -1.0],
            [-1.0, -1.0, -1.0],
            [-1.0, -1.0, -1.0],
            [-1.0, 1.0, 1.0],
            [-1.0, 1.0, -1.0],
            [1.0, -1.0, 1.0],
            [-1.0, -1.0, 1.0],
            [-1.0, -1.0, -1.0],
            [-1.0, 1.0, 1.0],
            [-1.0, -1.0, 1.0],
            [1.0, -1.0, 1.0],
            [1.0, 1.0, 1.0],
            [1.0, -1.0, -1.0],
            [1.0, 1.0, -1.0],
            [1.0, -1.0, -1.0],
            [1.0, 1.0, 1.0],
            [1.0, -1.0, 1.0],
            [1.0, 1.0, 1.0],
            [1.0, 1.0, -1.0],
            [-1.0, 1.0, -1.0],
            [1.0, 1.0, 1.0],
            [-1.0, 1.0, -1.0],
            [-1.0, 1.0, 1.0],
            [1.0, 1.0, 1.0],
            [-1.0, 1.0, 1.0],
            [1.0, -1.0, 1.0],
        ];
        const UVS: [[f32; 2]; 36] = [
            [0.000059, 1.0 - 0.000004],
            [0.000103, 1.0 - 0.336048],
            [0.335973, 1.0 - 0.335903],
            [1.000023, 1.0 - 0.000013],
            [0.667979, 1.0 - 0.335851],
            [0.999958, 1.0 - 0.336064],
            [0.667979, 1.0 - 0.335851],
            [0.336024, 1.0 - 0.671877],
            [0.667969, 1.0 - 0.671889],
            [1.000023, 1.0 - 0.000013],
            [0.668104, 1.0 - 0.000013],
            [0.667979, 1.0 - 0.335851],
            [0.000059, 1.0 - 0.000004],
            [0.335973, 1.0 - 0.335903],
            [0.336098, 1.0 - 0.000071],
            [0.667979, 1.0 - 0.335851],
            [0.335973, 1.0 - 0.335903],
            [0.336024, 1.0 - 0.671877],
            [1.000004, 1.0 - 0.671847],
            [0.999958, 1.0 - 0.336064],
            [0.667979, 1.0 - 0.335851],
            [0.668104, 1.0 - 0.000013],
            [0.335973, 1.0 - 0.335903],
            [0.667979, 1.0 - 0.335851],
            [0.335973, 1.0 - 0.335903],
            [0.668104, 1.0 - 0.000013],
            [0.336098, 1.0 - 0.000071],
            [0.000103, 1.0 - 0.336048],
            [0.000004, 1.0 - 0.671870],
            [0.336024, 1.0 - 0.671877],
            [0.000103, 1.0 - 0.336048],
            [0.336024, 1.0 - 0.671877],
            [0.335973, 1.0 - 0.335903],
            [0.667969, 1.0 - 0.671889],
            [1.000004, 1.0 - 0.671847],
            [0.667979, 1.0 - 0.335851],
        ];

        let positions: Vec<Vec3> = POSITIONS.iter().copied().map(Vec3::from_array).collect();
        let uvs = UVS.iter().copied().map(Vec2::from_array).collect();

        // Flat normals from each triangle's winding
        let normals = positions
            .chunks_exact(3)
            .flat_map(|tri| {
                let n = (tri[1] - tri[0]).cross(tri[2] - tri[0]).normalize_or_zero();
                [n, n, n]
            })
            .collect();

        Self {
            positions,
            uvs,
            normals,
        }
    }
}

/// Load a Wavefront OBJ file into de-indexed attribute arrays
pub fn load_obj(path: &Path) -> Result<MeshData> {
    let source = fs::read_to_string(path)
        .with_context(|| format!("failed to read OBJ file {}", path.display()))?;
    parse_obj(&source).with_context(|| format!("failed to parse OBJ file {}", path.display()))
}

/// Parse the OBJ subset the viewer understands: `v`, `vt`, `vn`, and
/// triangular `f v/vt/vn` faces with 1-based indices. Comments, material
/// statements, and smoothing groups are skipped.
pub fn parse_obj(source: &str) -> Result<MeshData> {
    let mut temp_positions: Vec<Vec3> = Vec::new();
    let mut temp_uvs: Vec<Vec2> = Vec::new();
    let mut temp_normals: Vec<Vec3> = Vec::new();
    let mut mesh = MeshData::default();

    for (line_number, line) in source.lines().enumerate() {
        let mut words = line.split_whitespace();
        match words.next() {
            Some("v") => {
                let [x, y, z]: [f32; 3] = parse_floats(&mut words)
                    .with_context(|| format!("bad vertex on line {}", line_number + 1))?;
                temp_positions.push(Vec3::new(x, y, z));
            }
            Some("vt") => {
                let [u, v]: [f32; 2] = parse_floats(&mut words)
                    .with_context(|| format!("bad UV on line {}", line_number + 1))?;
                temp_uvs.push(Vec2::new(u, v));
            }
            Some("vn") => {
                let [x, y, z]: [f32; 3] = parse_floats(&mut words)
                    .with_context(|| format!("bad normal on line {}", line_number + 1))?;
                temp_normals.push(Vec3::new(x, y, z));
            }
            Some("f") => {
                let corners: Vec<&str> = words.collect();
                if corners.len() != 3 {
                    bail!(
                        "face on line {} has {} corners, only triangles are supported",
                        line_number + 1,
                        corners.len()
                    );
                }
                for corner in corners {
                    let (vi, ti, ni) = parse_face_corner(corner)
                        .with_context(|| format!("bad face on line {}", line_number + 1))?;
                    mesh.positions.push(fetch(&temp_positions, vi, "vertex")?);
                    mesh.uvs.push(fetch(&temp_uvs, ti, "UV")?);
                    mesh.normals.push(fetch(&temp_normals, ni, "normal")?);
                }
            }
            // Comments, mtllib/usemtl, smoothing groups, object names
            _ => {}
        }
    }

    Ok(mesh)
}

fn parse_floats<'a, const N: usize>(
    words: &mut impl Iterator<Item = &'a str>,
) -> Result<[f32; N]> {
    let mut out = [0.0; N];
    for slot in out.iter_mut() {
        let word = words.next().context("missing component")?;
        *slot = word
            .parse()
            .with_context(|| format!("invalid number {:?}", word))?;
    }
    Ok(out)
}

/// Parse one `v/vt/vn` triplet into 1-based indices
fn parse_face_corner(corner: &str) -> Result<(usize, usize, usize)> {
    let mut parts = corner.split('/');
    let v = parts.next().context("missing vertex index")?;
    let t = parts.next().context("missing UV index")?;
    let n = parts.next().context("missing normal index")?;

    Ok((
        v.parse().with_context(|| format!("invalid index {:?}", v))?,
        t.parse().with_context(|| format!("invalid index {:?}", t))?,
        n.parse().with_context(|| format!("invalid index {:?}", n))?,
    ))
}

fn fetch<T: Copy>(items: &[T], one_based: usize, what: &str) -> Result<T> {
    one_based
        .checked_sub(1)
        .and_then(|i| items.get(i))
        .copied()
        .with_context(|| format!("{} index {} out of range", what, one_based))
}

#[cfg(test)]
mod tests {
    use super::*;

    const TRIANGLE_OBJ: &str = "\
# a single triangle
mtllib cube.mtl
v 0.0 0.0 0.0
v 1.0 0.0 0.0
v 0.0 1.0 0.0
vt 0.0 0.0
vt 1.0 0.0
vt 0.0 1.0
vn 0.0 0.0 1.0
usemtl Material
s off
f 1/1/1 2/2/1 3/3/1
";

    #[test]
    fn parses_a_triangle() {
        let mesh = parse_obj(TRIANGLE_OBJ).unwrap();
        assert_eq!(mesh.vertex_count(), 3);
        assert_eq!(mesh.positions[1], Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(mesh.uvs[2], Vec2::new(0.0, 1.0));
        assert_eq!(mesh.normals[0], Vec3::new(0.0, 0.0, 1.0));
    }

    #[test]
    fn indices_are_one_based() {
        let mesh = parse_obj(TRIANGLE_OBJ).unwrap();
        assert_eq!(mesh.positions[0], Vec3::ZERO);
    }

    #[test]
    fn rejects_out_of_range_index() {
        let source = "v 0 0 0\nvt 0 0\nvn 0 0 1\nf 1/1/1 2/1/1 1/1/1\n";
        assert!(parse_obj(source).is_err());
    }

    #[test]
    fn rejects_non_triangle_face() {
        let source = "v 0 0 0\nvt 0 0\nvn 0 0 1\nf 1/1/1 1/1/1 1/1/1 1/1/1\n";
        assert!(parse_obj(source).is_err());
    }

    #[test]
    fn rejects_malformed_corner() {
        let source = "v 0 0 0\nvt 0 0\nvn 0 0 1\nf 1 1 1\n";
        assert!(parse_obj(source).is_err());
    }

    #[test]
    fn skips_unknown_statements() {
        let mesh = parse_obj("o thing\ng group\n# nothing\n").unwrap();
        assert_eq!(mesh.vertex_count(), 0);
    }

    #[test]
    fn unit_cube_has_twelve_triangles() {
        let cube = MeshData::unit_cube();
        assert_eq!(cube.vertex_count(), 36);
        assert_eq!(cube.uvs.len(), 36);
        assert_eq!(cube.normals.len(), 36);
        for n in &cube.normals {
            assert!((n.length() - 1.0).abs() < 1e-5);
        }
    }
}
