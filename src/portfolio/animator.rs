use std::f32::consts::PI;

use glam::{ Quat, Vec2 };
use rand::Rng;

use super::classifier::RigInfo;
use crate::engine::components::{ Camera, NodeId, SceneGraph };
use crate::engine::config::SheepConfig;
use crate::engine::utils::math::{ ease_in_out_cubic, ease_in_out_quad, look_rotation, with_euler_angle, EulerAxis };

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SpecialAnimation {
    #[default]
    None,
    Hop,
    Wiggle,
}

/// State carried from one frame to the next
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimatorState {
    pub special: SpecialAnimation,
    pub special_started_at: f32,
    pub special_duration: f32,
    pub last_special_at: f32,
    /// Quiet time required before the next flourish, drawn at each trigger
    pub next_interval: f32,
    pub entrance_started_at: Option<f32>,
    pub entrance_complete: bool,
}

impl AnimatorState {
    pub fn new<R: Rng>(config: &SheepConfig, rng: &mut R) -> Self {
        Self {
            special: SpecialAnimation::None,
            special_started_at: 0.0,
            special_duration: config.special_duration,
            last_special_at: 0.0,
            next_interval: draw_interval(config, rng),
            entrance_started_at: None,
            entrance_complete: false,
        }
    }
}

/// The nodes of one mounted model that the animator writes to
#[derive(Debug, Clone, PartialEq)]
pub struct AnimatedModel {
    /// Group wrapping the imported scene; carries scale, bob, roll and body turn
    pub root: NodeId,
    pub rig: RigInfo<NodeId>,
}

/// Per-frame inputs from the host
#[derive(Debug, Clone, Copy)]
pub struct Frame<'a> {
    /// Seconds since the widget mounted
    pub time: f32,
    /// Cursor in normalised device coordinates
    pub cursor: Vec2,
    pub camera: &'a Camera,
}

fn draw_interval<R: Rng>(config: &SheepConfig, rng: &mut R) -> f32 {
    config.special_interval_min + rng.random::<f32>() * config.special_interval_jitter
}

/// Vertical offset and roll a flourish contributes at `progress` in [0, 1)
pub fn special_offsets(kind: SpecialAnimation, progress: f32, config: &SheepConfig) -> (f32, f32) {
    match kind {
        SpecialAnimation::None => (0.0, 0.0),
        SpecialAnimation::Hop => ((progress * PI).sin() * config.hop_height, 0.0),
        SpecialAnimation::Wiggle => {
            let damping = 1.0 - ease_in_out_quad(progress);
            (0.0, (progress * PI * 3.0).sin() * config.wiggle_amplitude * damping)
        }
    }
}

/// Whether a flourish `elapsed` seconds old has run its `duration`.
///
/// `elapsed` comes from subtracting two clock readings near `now`, so it may
/// land up to half an ulp of `now` short of the true value.
fn special_finished(elapsed: f32, duration: f32, now: f32) -> bool {
    elapsed >= duration - f32::EPSILON * now.abs().max(1.0)
}

/// Advance one frame: entrance, flourishes, idle motion, then cursor tracking.
///
/// Takes the previous state and returns the next one; all scene changes are
/// written into `graph`.
pub fn animate_frame<R: Rng>(
    mut state: AnimatorState,
    graph: &mut SceneGraph,
    model: &AnimatedModel,
    frame: &Frame,
    config: &SheepConfig,
    rng: &mut R
) -> AnimatorState {
    let time = frame.time;

    if !state.entrance_complete {
        let started = *state.entrance_started_at.get_or_insert(time);
        run_entrance(&mut state, graph, model.root, time - started, config);
    }

    if state.entrance_complete {
        if state.special == SpecialAnimation::None && time - state.last_special_at > state.next_interval {
            state.special = if rng.random_bool(0.5) { SpecialAnimation::Hop } else { SpecialAnimation::Wiggle };
            state.special_started_at = time;
            state.special_duration = config.special_duration;
            state.last_special_at = time;
            state.next_interval = draw_interval(config, rng);
            log::debug!("[SHEEP] Special animation {:?} at {:.2}s", state.special, time);
        }

        let (mut bob, mut roll) = (0.0, 0.0);
        if state.special != SpecialAnimation::None {
            let elapsed = time - state.special_started_at;
            if special_finished(elapsed, state.special_duration, time) {
                state.special = SpecialAnimation::None;
            } else {
                (bob, roll) = special_offsets(state.special, elapsed / state.special_duration, config);
            }
        }

        let root = graph.transform_mut(model.root);
        root.translation.y = (time * config.idle_bob_speed).sin() * config.idle_bob_amplitude + bob;
        root.rotation = with_euler_angle(root.rotation, EulerAxis::Z, roll);

        for (leg, offset) in model.rig.classification.legs.iter().zip(&model.rig.leg_offsets) {
            let transform = graph.transform_mut(*leg);
            transform.rotation = with_euler_angle(transform.rotation, EulerAxis::X, offset.swing(time));
        }
    }

    track_cursor(graph, model, frame, config);
    state
}

fn run_entrance(state: &mut AnimatorState, graph: &mut SceneGraph, root: NodeId, elapsed: f32, config: &SheepConfig) {
    let progress = if config.entrance_duration > 0.0 {
        (elapsed / config.entrance_duration).min(1.0)
    } else {
        1.0
    };
    let eased = ease_in_out_cubic(progress);
    let min = config.entrance_min_scale;
    graph.transform_mut(root).set_uniform_scale(config.base_scale * (min + (1.0 - min) * eased));

    let complete = progress >= 1.0;
    for index in graph.materials_under(root) {
        let material = &mut graph.materials[index];
        material.opacity = if complete { 1.0 } else { eased };
        material.transparent = !complete;
    }

    if complete {
        graph.transform_mut(root).set_uniform_scale(config.base_scale);
        state.entrance_complete = true;
        log::debug!("[SHEEP] Entrance complete");
    }
}

fn forward_fix(config: &SheepConfig) -> Quat {
    if config.model_faces_positive_z { Quat::from_rotation_y(PI) } else { Quat::IDENTITY }
}

fn track_cursor(graph: &mut SceneGraph, model: &AnimatedModel, frame: &Frame, config: &SheepConfig) {
    let target = frame.camera.point_along(frame.cursor, config.look_distance);
    let fix = forward_fix(config);

    // Body turns slowly
    let root_position = graph.world_position(model.root);
    let look = look_rotation(root_position, target) * fix;
    let root = graph.transform_mut(model.root);
    root.rotation = root.rotation.slerp(look, config.body_blend);

    // Head turns further and faster, in its parent's frame
    let Some(head) = model.rig.head_rig.filter(|head| *head != model.root) else {
        return;
    };
    let head_position = graph.world_position(head);
    let look = look_rotation(head_position, target) * fix;
    let desired = match graph.node(head).parent {
        Some(parent) => graph.world_rotation(parent).inverse() * look,
        None => look,
    };
    let transform = graph.transform_mut(head);
    transform.rotation = transform.rotation.slerp(desired, config.head_blend);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::components::{ Material, Mesh, Transform };
    use crate::portfolio::classifier::build_rig;
    use glam::Vec3;
    use pretty_assertions::assert_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use test_case::test_case;

    struct Fixture {
        graph: SceneGraph,
        model: AnimatedModel,
        camera: Camera,
        config: SheepConfig,
        rng: StdRng,
    }

    impl Fixture {
        fn frame(&mut self, state: AnimatorState, time: f32, cursor: Vec2) -> AnimatorState {
            let frame = Frame { time, cursor, camera: &self.camera };
            animate_frame(state, &mut self.graph, &self.model, &frame, &self.config, &mut self.rng)
        }
    }

    // Group -> Scene -> Body -> Neck -> (Head, Ear) ; Body -> Leg
    fn fixture() -> Fixture {
        let mut graph = SceneGraph::new();
        graph.materials.push(Material::new("wool", Vec3::ONE));
        let scene = graph.add_node("Scene", None, Transform::identity());
        let body = graph.add_node("Body", Some(scene), Transform::identity());
        let neck = graph.add_node("Neck", Some(body), Transform::new(0.0, 0.5, 0.5));
        let head = graph.add_node("Head", Some(neck), Transform::identity());
        graph.add_node("Ear", Some(neck), Transform::identity());
        graph.add_node("Leg", Some(body), Transform::new(0.0, -0.5, 0.0));
        graph.attach_mesh(head, Mesh::new(vec![[0.0; 3], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]], None, None, 0));

        let mut rng = StdRng::seed_from_u64(42);
        let rig = build_rig(&graph, scene, &mut rng);
        let root = graph.wrap_in_group(scene, "SheepGroup", Transform::identity());

        Fixture {
            graph,
            model: AnimatedModel { root, rig },
            camera: Camera::new(Vec3::new(0.0, 0.0, 5.0), 35.0),
            config: SheepConfig::default(),
            rng,
        }
    }

    #[test]
    fn entrance_starts_small_and_invisible() {
        let mut f = fixture();
        let state = AnimatorState::new(&f.config, &mut f.rng);
        let state = f.frame(state, 3.0, Vec2::ZERO);

        assert_eq!(state.entrance_started_at, Some(3.0));
        assert!(!state.entrance_complete);
        assert!((f.graph.node(f.model.root).transform.scale.x - 0.2).abs() < 1e-6);
        assert_eq!(f.graph.materials[0].opacity, 0.0);
        assert!(f.graph.materials[0].transparent);
    }

    #[test]
    fn entrance_ends_at_full_scale_and_opaque() {
        let mut f = fixture();
        let state = AnimatorState::new(&f.config, &mut f.rng);
        let state = f.frame(state, 0.0, Vec2::ZERO);
        let state = f.frame(state, 0.4, Vec2::ZERO);
        assert!((f.graph.materials[0].opacity - 0.5).abs() < 1e-6);

        let state = f.frame(state, 0.8, Vec2::ZERO);
        assert!(state.entrance_complete);
        assert_eq!(f.graph.node(f.model.root).transform.scale, Vec3::splat(0.4));
        assert_eq!(f.graph.materials[0].opacity, 1.0);
        assert!(!f.graph.materials[0].transparent);
    }

    #[test]
    fn idle_motion_waits_for_the_entrance() {
        let mut f = fixture();
        let state = AnimatorState::new(&f.config, &mut f.rng);
        f.frame(state, 0.5, Vec2::ZERO);
        assert_eq!(f.graph.node(f.model.root).transform.translation.y, 0.0);
    }

    #[test]
    fn special_runs_for_its_duration_and_never_overlaps() {
        let mut f = fixture();
        let mut state = AnimatorState::new(&f.config, &mut f.rng);
        state.entrance_complete = true;
        state.next_interval = 8.5;

        let state = f.frame(state, 8.0, Vec2::ZERO);
        assert_eq!(state.special, SpecialAnimation::None);

        let state = f.frame(state, 9.0, Vec2::ZERO);
        assert_ne!(state.special, SpecialAnimation::None);
        assert_eq!(state.special_started_at, 9.0);
        let kind = state.special;

        // Long overdue, but the running flourish blocks another trigger
        let mut blocked = state;
        blocked.next_interval = 0.0;
        let blocked = f.frame(blocked, 9.5, Vec2::ZERO);
        assert_eq!(blocked.special, kind);
        assert_eq!(blocked.special_started_at, 9.0);

        let state = f.frame(state, 9.625, Vec2::ZERO);
        assert_eq!(state.special, SpecialAnimation::None);
        assert_eq!(state.last_special_at, 9.0);
    }

    #[test_case(9.0 ; "early")]
    #[test_case(15.4185 ; "past fifteen seconds")]
    #[test_case(15.5281 ; "later past fifteen seconds")]
    #[test_case(63.25 ; "after a minute")]
    #[test_case(1234.5 ; "long session")]
    fn special_ends_exactly_at_its_duration(start: f32) {
        let mut f = fixture();
        let mut state = AnimatorState::new(&f.config, &mut f.rng);
        state.entrance_complete = true;
        state.special = SpecialAnimation::Hop;
        state.special_started_at = start;
        state.last_special_at = start;
        state.next_interval = 100.0;

        let running = f.frame(state, start + 0.59, Vec2::ZERO);
        assert_eq!(running.special, SpecialAnimation::Hop);

        let done = f.frame(state, start + 0.6, Vec2::ZERO);
        assert_eq!(done.special, SpecialAnimation::None);
    }

    #[test]
    fn interval_is_redrawn_in_range_after_each_trigger() {
        let mut f = fixture();
        let mut state = AnimatorState::new(&f.config, &mut f.rng);
        assert!((8.0..=10.0).contains(&state.next_interval));
        state.entrance_complete = true;
        state.next_interval = 1.0;

        let state = f.frame(state, 2.0, Vec2::ZERO);
        assert!((8.0..=10.0).contains(&state.next_interval));
    }

    #[test]
    fn hop_peaks_mid_flourish_and_wiggle_decays() {
        let config = SheepConfig::default();
        let (bob, roll) = special_offsets(SpecialAnimation::Hop, 0.5, &config);
        assert!((bob - 0.15).abs() < 1e-6);
        assert_eq!(roll, 0.0);

        let (_, early) = special_offsets(SpecialAnimation::Wiggle, 1.0 / 6.0, &config);
        let (_, late) = special_offsets(SpecialAnimation::Wiggle, 5.0 / 6.0, &config);
        assert!(early.abs() > late.abs());
        assert!((early - 0.15 * (1.0 - ease_in_out_quad(1.0 / 6.0))).abs() < 1e-5);
    }

    #[test]
    fn head_turns_more_than_body() {
        let mut f = fixture();
        let mut state = AnimatorState::new(&f.config, &mut f.rng);
        state.entrance_complete = true;
        state.next_interval = 100.0;
        let head = f.model.rig.head_rig.unwrap();

        let root_before = f.graph.node(f.model.root).transform.rotation;
        let head_before = f.graph.node(head).transform.rotation;
        f.frame(state, 1.0, Vec2::new(0.9, 0.4));
        let root_change = f.graph.node(f.model.root).transform.rotation.angle_between(root_before);
        let head_change = f.graph.node(head).transform.rotation.angle_between(head_before);

        assert!(root_change > 0.0);
        assert!(root_change < head_change, "root {} head {}", root_change, head_change);
    }

    #[test]
    fn legs_swing_after_the_entrance() {
        let mut f = fixture();
        let mut state = AnimatorState::new(&f.config, &mut f.rng);
        state.entrance_complete = true;
        state.next_interval = 100.0;
        let leg = f.model.rig.classification.legs[0];
        let offset = f.model.rig.leg_offsets[0];

        f.frame(state, 2.0, Vec2::ZERO);
        let (x, _, _) = f.graph.node(leg).transform.rotation.to_euler(glam::EulerRot::XYZ);
        assert!((x - offset.swing(2.0)).abs() < 1e-4);
    }

    #[test]
    fn model_without_rig_still_tracks_the_cursor() {
        let mut graph = SceneGraph::new();
        let scene = graph.add_node("Scene", None, Transform::identity());
        graph.add_node("Blob", Some(scene), Transform::identity());
        let mut rng = StdRng::seed_from_u64(3);
        let rig = build_rig(&graph, scene, &mut rng);
        assert_eq!(rig.head_rig, None);
        let root = graph.wrap_in_group(scene, "Group", Transform::identity());

        let config = SheepConfig::default();
        let camera = Camera::new(Vec3::new(0.0, 0.0, 5.0), 35.0);
        let model = AnimatedModel { root, rig };
        let mut state = AnimatorState::new(&config, &mut rng);
        for step in 0..60 {
            let frame = Frame { time: step as f32 / 60.0, cursor: Vec2::new(-0.5, 0.0), camera: &camera };
            state = animate_frame(state, &mut graph, &model, &frame, &config, &mut rng);
        }
        assert!(state.entrance_complete);
        assert_ne!(graph.node(root).transform.rotation, Quat::IDENTITY);
    }
}
