use glam::Vec3;

use crate::engine::utils::math::{ hsl_to_rgb, rgb_to_hsl };

#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    pub name: String,
    pub base_color: Vec3,
    pub opacity: f32,
    /// Drawn with blending and without depth writes while set
    pub transparent: bool,
    pub metallic_factor: f32,
    pub roughness_factor: f32,
    pub double_sided: bool,
    pub flat_shading: bool,
    pub emissive: Vec3,
    pub emissive_intensity: f32,
}

impl Material {
    pub fn new(name: impl Into<String>, base_color: Vec3) -> Self {
        Self {
            name: name.into(),
            base_color,
            opacity: 1.0,
            transparent: false,
            metallic_factor: 0.0,
            roughness_factor: 0.5,
            double_sided: false,
            flat_shading: false,
            emissive: Vec3::ZERO,
            emissive_intensity: 1.0,
        }
    }

    /// Scale saturation and lightness of the base colour, each clamped to its cap
    pub fn adjust_hsl(&mut self, saturation: f32, saturation_cap: f32, lightness: f32, lightness_cap: f32) {
        let hsl = rgb_to_hsl(self.base_color);
        let adjusted = Vec3::new(
            hsl.x,
            (hsl.y * saturation).min(saturation_cap),
            (hsl.z * lightness).min(lightness_cap),
        );
        self.base_color = hsl_to_rgb(adjusted);
    }

    /// Back faces are hidden unless the material is double sided
    pub fn culls_back_faces(&self) -> bool {
        !self.double_sided
    }

    /// Premultiplied emissive term the shader adds to the lit colour
    pub fn emissive_term(&self) -> Vec3 {
        self.emissive * self.emissive_intensity
    }
}

impl Default for Material {
    fn default() -> Self {
        Self::new("default", Vec3::ONE)
    }
}
