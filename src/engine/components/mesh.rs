use glam::{ Mat4, Vec3 };

use crate::engine::utils::math::Aabb;

// CPU-side triangle list for one glTF primitive
#[derive(Clone, Debug, PartialEq)]
pub struct Mesh {
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub indices: Vec<u32>,
    pub material: usize,
}

impl Mesh {
    pub fn new(positions: Vec<[f32; 3]>, normals: Option<Vec<[f32; 3]>>, indices: Option<Vec<u32>>, material: usize) -> Self {
        let indices = indices.unwrap_or_else(|| (0..positions.len() as u32).collect());
        let normals = match normals {
            Some(normals) if normals.len() == positions.len() => normals,
            _ => compute_vertex_normals(&positions, &indices),
        };
        Self { positions, normals, indices, material }
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn index_count(&self) -> usize {
        self.indices.len()
    }

    pub fn is_valid(&self) -> bool {
        self.index_count() > 0 && self.vertex_count() > 0
    }

    /// Bounds of the mesh after applying `world`
    pub fn world_bounds(&self, world: Mat4) -> Option<Aabb> {
        Aabb::from_points(self.positions.iter().map(|p| world.transform_point3(Vec3::from_array(*p))))
    }
}

/// Area-weighted smooth normals from an indexed triangle list
pub fn compute_vertex_normals(positions: &[[f32; 3]], indices: &[u32]) -> Vec<[f32; 3]> {
    let mut accum = vec![Vec3::ZERO; positions.len()];

    for tri in indices.chunks_exact(3) {
        let [a, b, c] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
        if a >= positions.len() || b >= positions.len() || c >= positions.len() {
            continue;
        }
        let pa = Vec3::from_array(positions[a]);
        let pb = Vec3::from_array(positions[b]);
        let pc = Vec3::from_array(positions[c]);
        let face = (pb - pa).cross(pc - pa);
        accum[a] += face;
        accum[b] += face;
        accum[c] += face;
    }

    accum.into_iter().map(|n| n.normalize_or(Vec3::Y).to_array()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_normals_are_computed_facing_out_of_the_triangle() {
        let mesh = Mesh::new(vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]], None, None, 0);
        assert_eq!(mesh.indices, vec![0, 1, 2]);
        for n in &mesh.normals {
            assert!(Vec3::from_array(*n).abs_diff_eq(Vec3::Z, 1e-6));
        }
    }

    #[test]
    fn world_bounds_follow_the_transform() {
        let mesh = Mesh::new(vec![[-1.0, -1.0, -1.0], [1.0, 1.0, 1.0]], None, Some(vec![]), 0);
        let bounds = mesh.world_bounds(Mat4::from_scale(Vec3::splat(0.5))).unwrap();
        assert_eq!(bounds.min, Vec3::splat(-0.5));
        assert_eq!(bounds.max, Vec3::splat(0.5));
    }
}
