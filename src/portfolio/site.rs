use std::sync::Arc;

use rand::rngs::StdRng;
use rand::{ Rng, SeedableRng };

use super::phase::{ Phase, PhaseController };
use super::sheep::SheepWidget;
use super::tnt::TntWidget;
use crate::engine::components::{ Camera, NodeId, SceneGraph };
use crate::engine::config::SiteConfig;
use crate::engine::managers::{ Assets, AssetsManager };
use crate::engine::systems::{ EventSystem, EventType, PointerState, SubscriptionId };

/// What the renderer needs to draw one mounted widget
#[derive(Clone, Copy)]
pub struct WidgetView<'a> {
    pub asset: Assets,
    pub graph: &'a SceneGraph,
    pub root: NodeId,
    pub camera: &'a Camera,
}

/// The page: phase flag plus whichever 3D widget that phase shows.
///
/// Initial and transitioning show the TNT; revealed shows the sheep. A widget
/// whose model failed to load is simply absent.
pub struct PortfolioSite {
    config: SiteConfig,
    phase: PhaseController,
    assets: AssetsManager,
    events: Arc<EventSystem>,
    pointer: Arc<PointerState>,
    subscriptions: Vec<SubscriptionId>,
    tnt: Option<TntWidget>,
    sheep: Option<SheepWidget>,
    viewport: (u32, u32),
    rng: StdRng,
    torn_down: bool,
}

impl PortfolioSite {
    pub fn new(config: SiteConfig, mut assets: AssetsManager, events: Arc<EventSystem>, rng: StdRng) -> Self {
        let pointer = Arc::new(PointerState::new());
        let subscriptions = vec![
            events.subscribe(EventType::PointerMove, pointer.clone()),
            events.subscribe(EventType::PointerPress, pointer.clone())
        ];

        let tnt = assets.get_scene_copy(Assets::Tnt).map(|scene| TntWidget::mount(scene, &config.tnt));
        // Warm the cache so the reveal does not stall on disk
        assets.preload(Assets::Sheep);

        Self {
            phase: PhaseController::new(config.phase.fuse_delay),
            config,
            assets,
            events,
            pointer,
            subscriptions,
            tnt,
            sheep: None,
            viewport: (1, 1),
            rng,
            torn_down: false,
        }
    }

    /// Seeded from `seed`, or from the OS when absent
    pub fn rng_from_seed(seed: Option<u64>) -> StdRng {
        match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase.phase()
    }

    pub fn tnt_hovered(&self) -> bool {
        self.tnt.as_ref().is_some_and(|tnt| tnt.hovered())
    }

    pub fn fuse_progress(&self, now: f32) -> f32 {
        self.phase.transition_progress(now)
    }

    pub fn tnt(&self) -> Option<&TntWidget> {
        self.tnt.as_ref()
    }

    pub fn sheep(&self) -> Option<&SheepWidget> {
        self.sheep.as_ref()
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        if self.viewport == (width, height) {
            return;
        }
        self.viewport = (width, height);
        if let Some(tnt) = self.tnt.as_mut() {
            tnt.resize(width, height);
        }
        if let Some(sheep) = self.sheep.as_mut() {
            sheep.resize(width, height);
        }
    }

    /// The page's only click target: starts the fuse from the initial phase
    pub fn trigger(&mut self, now: f32) -> bool {
        if self.torn_down {
            return false;
        }
        self.phase.trigger(now)
    }

    /// Advance one frame at `now` seconds on the host clock
    pub fn frame(&mut self, now: f32) {
        if self.torn_down {
            return;
        }

        self.handle_pointer(now);

        if self.phase.poll(now) {
            self.reveal(now);
        }

        match self.phase.phase() {
            Phase::Initial => {}
            Phase::Transitioning => {
                let progress = self.phase.transition_progress(now);
                if let Some(tnt) = self.tnt.as_mut() {
                    tnt.apply_fuse(progress);
                }
            }
            Phase::Revealed => {
                if let Some(sheep) = self.sheep.as_mut() {
                    sheep.update(now);
                }
            }
        }
    }

    fn handle_pointer(&mut self, now: f32) {
        let latest = self.pointer.latest();
        let presses = self.pointer.take_presses();

        match self.phase.phase() {
            Phase::Initial => {
                let Some(tnt) = self.tnt.as_mut() else {
                    return;
                };
                if let Some(pointer) = latest {
                    tnt.set_hovered(tnt.hit_test(&pointer));
                }
                if presses.iter().any(|press| tnt.hit_test(press)) {
                    tnt.set_hovered(false);
                    self.phase.trigger(now);
                }
            }
            Phase::Transitioning => {
                if let Some(tnt) = self.tnt.as_mut() {
                    tnt.set_hovered(false);
                }
            }
            Phase::Revealed => {
                if let (Some(sheep), Some(pointer)) = (self.sheep.as_mut(), latest) {
                    sheep.pointer_moved(&pointer);
                }
            }
        }
    }

    fn reveal(&mut self, now: f32) {
        if self.tnt.take().is_some() {
            log::info!("[TNT] Unmounted");
        }
        let seed: u64 = self.rng.random();
        self.sheep = self.assets
            .get_scene_copy(Assets::Sheep)
            .map(|scene| SheepWidget::mount(scene, &self.config.sheep, now, StdRng::seed_from_u64(seed)));

        if let Some(sheep) = self.sheep.as_mut() {
            sheep.resize(self.viewport.0, self.viewport.1);
            if let Some(pointer) = self.pointer.latest() {
                sheep.pointer_moved(&pointer);
            }
        }
    }

    /// Mounted widgets in draw order
    pub fn visible_widgets(&self) -> Vec<WidgetView<'_>> {
        let mut views = Vec::new();
        if let Some(tnt) = &self.tnt {
            views.push(WidgetView { asset: Assets::Tnt, graph: tnt.graph(), root: tnt.root(), camera: tnt.camera() });
        }
        if let Some(sheep) = &self.sheep {
            views.push(WidgetView { asset: Assets::Sheep, graph: sheep.graph(), root: sheep.root(), camera: sheep.camera() });
        }
        views
    }

    /// Stop listening for input and drop the pending reveal. Idempotent.
    pub fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        self.torn_down = true;
        self.phase.teardown();
        for id in self.subscriptions.drain(..) {
            self.events.unsubscribe(id);
        }
        self.tnt = None;
        self.sheep = None;
        log::info!("[PHASE] Site torn down in {:?}", self.phase.phase());
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }
}

impl Drop for PortfolioSite {
    fn drop(&mut self) {
        self.teardown();
    }
}
