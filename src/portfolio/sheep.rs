use glam::Vec2;
use rand::rngs::StdRng;

use super::animator::{ animate_frame, AnimatedModel, AnimatorState, Frame };
use super::classifier::build_rig;
use crate::engine::components::{ Camera, Material, NodeId, SceneGraph, Transform };
use crate::engine::config::SheepConfig;
use crate::engine::loaders::LoadedScene;
use crate::engine::systems::PointerSample;
use crate::engine::utils::input_utils::window_to_mirrored_ndc;

/// Flat-shaded, matte and a little more saturated than authored
pub fn prepare_sheep_material(material: &mut Material) {
    material.flat_shading = true;
    material.roughness_factor = 0.9;
    material.metallic_factor = 0.0;
    material.adjust_hsl(1.8, 1.0, 1.08, 1.0);
}

/// The revealed page's companion: a sheep that follows the cursor
pub struct SheepWidget {
    graph: SceneGraph,
    model: AnimatedModel,
    state: AnimatorState,
    camera: Camera,
    cursor: Vec2,
    mounted_at: f32,
    config: SheepConfig,
    rng: StdRng,
}

impl SheepWidget {
    pub fn mount(loaded: LoadedScene, config: &SheepConfig, now: f32, mut rng: StdRng) -> Self {
        let LoadedScene { mut graph, scene_root } = loaded;

        for index in graph.materials_under(scene_root) {
            prepare_sheep_material(&mut graph.materials[index]);
        }

        let rig = build_rig(&graph, scene_root, &mut rng);
        let mut group = Transform::identity();
        group.set_uniform_scale(config.base_scale);
        let root = graph.wrap_in_group(scene_root, "SheepGroup", group);

        let state = AnimatorState::new(config, &mut rng);
        log::info!("[SHEEP] Mounted at {:.2}s", now);

        Self {
            graph,
            model: AnimatedModel { root, rig },
            state,
            camera: Camera::from_config(&config.camera),
            cursor: Vec2::from_array(config.initial_cursor),
            mounted_at: now,
            config: config.clone(),
            rng,
        }
    }

    pub fn pointer_moved(&mut self, pointer: &PointerSample) {
        self.cursor = window_to_mirrored_ndc(pointer.x, pointer.y, pointer.width, pointer.height);
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.camera.resize(width, height);
    }

    pub fn update(&mut self, now: f32) {
        let frame = Frame {
            time: now - self.mounted_at,
            cursor: self.cursor,
            camera: &self.camera,
        };
        self.state = animate_frame(self.state, &mut self.graph, &self.model, &frame, &self.config, &mut self.rng);
    }

    pub fn graph(&self) -> &SceneGraph {
        &self.graph
    }

    pub fn root(&self) -> NodeId {
        self.model.root
    }

    pub fn model(&self) -> &AnimatedModel {
        &self.model
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn cursor(&self) -> Vec2 {
        self.cursor
    }

    pub fn state(&self) -> &AnimatorState {
        &self.state
    }
}
