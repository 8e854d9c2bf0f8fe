use glam::{ Mat4, Quat, Vec2, Vec3 };

use crate::engine::config::CameraConfig;
use crate::engine::utils::math::{ look_rotation, perspective, unproject, Ray };

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub position: Vec3,
    /// Identity looks down -Z with +Y up
    pub rotation: Quat,
    pub fov_y: f32,
    pub near: f32,
    pub far: f32,
    pub aspect_ratio: f32,
}

impl Camera {
    pub fn new(position: Vec3, fov_y_degrees: f32) -> Self {
        Self {
            position,
            rotation: Quat::IDENTITY,
            fov_y: fov_y_degrees.to_radians(),
            near: 0.1,
            far: 2000.0,
            aspect_ratio: 1.0,
        }
    }

    /// Placed per `config` and aimed at the origin
    pub fn from_config(config: &CameraConfig) -> Self {
        let mut camera = Self::new(config.position(), config.fov_degrees);
        camera.look_at(Vec3::ZERO);
        camera
    }

    /// Turn so -Z points at `target`
    pub fn look_at(&mut self, target: Vec3) {
        let away = self.position + (self.position - target);
        self.rotation = look_rotation(self.position, away);
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.aspect_ratio = width as f32 / height as f32;
        }
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::from_rotation_translation(self.rotation, self.position).inverse()
    }

    pub fn projection_matrix(&self) -> Mat4 {
        perspective(self.fov_y, self.aspect_ratio, self.near, self.far)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// Ray from the camera through a point halfway into the depth range at `ndc`
    pub fn ray_through(&self, ndc: Vec2) -> Ray {
        let point = unproject(ndc.extend(0.5), self.view_matrix(), self.projection_matrix());
        Ray::new(self.position, point - self.position)
    }

    /// World point `distance` units along the ray through `ndc`
    pub fn point_along(&self, ndc: Vec2, distance: f32) -> Vec3 {
        self.ray_through(ndc).at(distance)
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(Vec3::new(0.0, 0.0, 5.0), 50.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn center_ray_looks_down_negative_z() {
        let camera = Camera::new(Vec3::new(0.0, 0.5, 5.0), 40.0);
        let ray = camera.ray_through(Vec2::ZERO);
        assert!(ray.direction.abs_diff_eq(Vec3::NEG_Z, 1e-4));
        assert!(camera.point_along(Vec2::ZERO, 10.0).abs_diff_eq(Vec3::new(0.0, 0.5, -5.0), 1e-3));
    }

    #[test]
    fn configured_camera_aims_at_the_origin() {
        let config = CameraConfig { position: [0.0, 0.5, 5.0], fov_degrees: 40.0 };
        let camera = Camera::from_config(&config);
        let ray = camera.ray_through(Vec2::ZERO);
        assert!(ray.direction.abs_diff_eq(-config.position().normalize(), 1e-4));
    }

    #[test]
    fn right_edge_ray_leans_right() {
        let mut camera = Camera::default();
        camera.resize(1600, 900);
        let ray = camera.ray_through(Vec2::new(1.0, 0.0));
        assert!(ray.direction.x > 0.0);
        assert!(ray.direction.z < 0.0);
    }
}
