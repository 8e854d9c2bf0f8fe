use std::f32::consts::PI;

use glam::{ Quat, Vec3 };

use crate::engine::components::{ Camera, Material, NodeId, SceneGraph, Transform };
use crate::engine::config::TntConfig;
use crate::engine::loaders::LoadedScene;
use crate::engine::systems::PointerSample;
use crate::engine::utils::input_utils::window_to_ndc;
use crate::engine::utils::math::lerp;

const RED_GLOW: Vec3 = Vec3::new(1.0, 0.2, 0.2);
const WARM_GLOW: Vec3 = Vec3::new(1.0, 0.667, 0.4);

/// Matte, slightly punchier colours, and a faint glow on the red and orange parts
pub fn enhance_tnt_material(material: &mut Material) {
    material.roughness_factor = 0.85;
    material.metallic_factor = 0.0;
    material.adjust_hsl(1.15, 1.0, 1.15, 0.95);

    let c = material.base_color;
    if c.x > 0.5 && c.y < 0.3 {
        material.emissive = RED_GLOW;
        material.emissive_intensity = 0.08;
    }
    if c.x > 0.5 && c.y > 0.3 && c.z < 0.3 {
        material.emissive = WARM_GLOW;
        material.emissive_intensity = 0.05;
    }
}

/// How white the TNT flashes at `progress` through the fuse; blinks faster as it burns down
pub fn fuse_flash(progress: f32) -> f32 {
    let progress = progress.clamp(0.0, 1.0);
    let blink = (progress * progress * 12.0 * PI).sin().max(0.0);
    blink * progress * 0.8
}

/// The clickable block shown before the portfolio is revealed
pub struct TntWidget {
    graph: SceneGraph,
    root: NodeId,
    camera: Camera,
    base_scale: f32,
    fuse_swell: f32,
    base_colors: Vec<(usize, Vec3)>,
    hovered: bool,
    fuse_progress: f32,
}

impl TntWidget {
    pub fn mount(loaded: LoadedScene, config: &TntConfig) -> Self {
        let LoadedScene { mut graph, scene_root } = loaded;

        let mut base_colors = Vec::new();
        for index in graph.materials_under(scene_root) {
            let material = &mut graph.materials[index];
            enhance_tnt_material(material);
            base_colors.push((index, material.base_color));
        }

        let mut group = Transform::identity();
        group.set_uniform_scale(config.base_scale);
        group.rotation = Quat::from_rotation_y(config.yaw);
        let root = graph.wrap_in_group(scene_root, "TntGroup", group);

        log::info!("[TNT] Mounted with {} materials", base_colors.len());

        Self {
            graph,
            root,
            camera: Camera::from_config(&config.camera),
            base_scale: config.base_scale,
            fuse_swell: config.fuse_swell,
            base_colors,
            hovered: false,
            fuse_progress: 0.0,
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.camera.resize(width, height);
    }

    /// Whether the cursor is over the block's world-space bounds
    pub fn hit_test(&self, pointer: &PointerSample) -> bool {
        let ndc = window_to_ndc(pointer.x, pointer.y, pointer.width, pointer.height);
        let ray = self.camera.ray_through(ndc);
        self.graph
            .world_bounds(self.root)
            .and_then(|bounds| bounds.intersect_ray(&ray))
            .is_some()
    }

    /// Returns true when the hover state flipped
    pub fn set_hovered(&mut self, hovered: bool) -> bool {
        if self.hovered == hovered {
            return false;
        }
        self.hovered = hovered;
        log::debug!("[TNT] Hover {}", if hovered { "on" } else { "off" });
        true
    }

    pub fn hovered(&self) -> bool {
        self.hovered
    }

    /// Swell and flash for `progress` in [0, 1] through the fuse
    pub fn apply_fuse(&mut self, progress: f32) {
        let progress = progress.clamp(0.0, 1.0);
        self.fuse_progress = progress;

        let scale = self.base_scale * lerp(1.0, self.fuse_swell, progress);
        self.graph.transform_mut(self.root).set_uniform_scale(scale);

        let flash = fuse_flash(progress);
        for (index, base) in &self.base_colors {
            self.graph.materials[*index].base_color = base.lerp(Vec3::ONE, flash);
        }
    }

    pub fn fuse_progress(&self) -> f32 {
        self.fuse_progress
    }

    pub fn graph(&self) -> &SceneGraph {
        &self.graph
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }
}
