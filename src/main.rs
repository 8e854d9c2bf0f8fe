//! Portfolio host: Slint page shell over an OpenGL underlay
//!
//! - Slint UI (intro overlay, portfolio sections)
//! - OpenGL scene rendering beneath the UI (TNT, then the sheep)
//! - Raw winit pointer events forwarded to the event system

use slint::{ ComponentHandle, GraphicsAPI, RenderingState };
use slint::winit_030::{ winit, WinitWindowAccessor, WinitWindowEventResult };
use winit::event::{ ElementState, MouseButton, WindowEvent };
use std::cell::{ Cell, RefCell };
use std::collections::HashMap;
use std::rc::Rc;
use std::sync::Arc;
use std::time::Instant;

use tnt_portfolio::engine::config::SiteConfig;
use tnt_portfolio::engine::managers::{ Assets, AssetsManager };
use tnt_portfolio::engine::rendering::{ GpuScene, SceneRenderer };
use tnt_portfolio::engine::systems::{ Event, EventSystem, PointerSample };
use tnt_portfolio::portfolio::PortfolioSite;

slint::include_modules!();

/// Everything that lives exactly as long as the GL context
struct Underlay {
    renderer: SceneRenderer,
    uploaded: HashMap<Assets, GpuScene>,
    site: PortfolioSite,
}

impl Underlay {
    fn render(&mut self, width: u32, height: u32, now: f32) {
        self.site.resize(width, height);
        self.site.frame(now);

        let views = self.site.visible_widgets();

        // Release GPU copies of widgets that are gone
        let stale: Vec<Assets> = self.uploaded
            .keys()
            .filter(|asset| !views.iter().any(|view| view.asset == **asset))
            .copied()
            .collect();
        for asset in stale {
            if let Some(scene) = self.uploaded.remove(&asset) {
                log::info!("[UNDERLAY] Releasing {:?}", asset);
                self.renderer.release(scene);
            }
        }

        for view in &views {
            if self.uploaded.contains_key(&view.asset) {
                continue;
            }
            match self.renderer.upload(view.graph) {
                Ok(scene) => {
                    self.uploaded.insert(view.asset, scene);
                }
                Err(e) => log::warn!("[UNDERLAY] Could not upload {:?}: {}", view.asset, e),
            }
        }

        self.renderer.begin_frame(width, height);
        for view in &views {
            if let Some(scene) = self.uploaded.get(&view.asset) {
                self.renderer.draw(scene, view.graph, view.root, view.camera);
            }
        }
        self.renderer.end_frame();
    }

    fn teardown(mut self) {
        self.site.teardown();
        for (_, scene) in self.uploaded.drain() {
            self.renderer.release(scene);
        }
    }
}

fn create_glow_context(get_proc_address: &dyn Fn(&std::ffi::CStr) -> *const std::ffi::c_void) -> glow::Context {
    unsafe {
        glow::Context::from_loader_function_cstr(|s| get_proc_address(s))
    }
}

fn load_config() -> SiteConfig {
    let path = SiteConfig::default_path();
    match SiteConfig::load(&path) {
        Ok(config) => config,
        Err(e) => {
            log::warn!("[CONFIG] {} is invalid, using defaults: {}", path.display(), e);
            SiteConfig::default()
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("[HYBRID] Starting portfolio with Slint + OpenGL integration");

    let config = SiteConfig::install(load_config());

    slint::platform::set_platform(Box::new(i_slint_backend_winit::Backend::new()?))?;

    let ui_app = PortfolioWindow::new()?;
    let events = Arc::new(EventSystem::new());

    // Forward raw pointer input before Slint sees it
    let events_for_input = events.clone();
    let last_cursor = Cell::new(None::<(f64, f64)>);
    ui_app.window().on_winit_window_event(move |slint_window, event| {
        let size = slint_window.size();
        let sample = |(x, y): (f64, f64)| PointerSample {
            x,
            y,
            width: size.width as f64,
            height: size.height as f64,
        };
        match event {
            WindowEvent::CursorMoved { position, .. } => {
                last_cursor.set(Some((position.x, position.y)));
                events_for_input.notify(Event::pointer_move(sample((position.x, position.y))));
            }
            WindowEvent::MouseInput { state: ElementState::Pressed, button: MouseButton::Left, .. } => {
                if let Some(position) = last_cursor.get() {
                    events_for_input.notify(Event::pointer_press(sample(position)));
                }
            }
            _ => {}
        }
        WinitWindowEventResult::Propagate
    });

    let underlay = Rc::new(RefCell::new(None::<Underlay>));
    let start_time = Rc::new(Cell::new(None::<Instant>));

    let underlay_for_rendering = underlay.clone();
    let start_time_for_rendering = start_time.clone();
    let ui_app_weak_for_rendering = ui_app.as_weak();

    ui_app.window().set_rendering_notifier(move |state, graphics_api| {
        match state {
            RenderingState::RenderingSetup => {
                log::info!("[UNDERLAY] OpenGL rendering setup");
                let GraphicsAPI::NativeOpenGL { get_proc_address } = graphics_api else {
                    log::warn!("[UNDERLAY] Non-OpenGL graphics API, 3D widgets disabled");
                    return;
                };

                let gl = create_glow_context(get_proc_address);
                match SceneRenderer::new(gl) {
                    Ok(renderer) => {
                        let assets = AssetsManager::new(config.assets.clone());
                        let rng = PortfolioSite::rng_from_seed(config.seed);
                        let site = PortfolioSite::new(config.clone(), assets, events.clone(), rng);
                        *underlay_for_rendering.borrow_mut() = Some(Underlay {
                            renderer,
                            uploaded: HashMap::new(),
                            site,
                        });
                        start_time_for_rendering.set(Some(Instant::now()));
                        log::info!("[UNDERLAY] Scene renderer initialized");
                    }
                    Err(e) => log::error!("[UNDERLAY] Failed to create scene renderer: {}", e),
                }
            }
            RenderingState::BeforeRendering => {
                let Some(start) = start_time_for_rendering.get() else {
                    return;
                };
                let Some(app) = ui_app_weak_for_rendering.upgrade() else {
                    return;
                };
                let size = app.window().size();
                if let Some(underlay) = underlay_for_rendering.borrow_mut().as_mut() {
                    underlay.render(size.width, size.height, start.elapsed().as_secs_f32());
                }
            }
            RenderingState::RenderingTeardown => {
                log::info!("[UNDERLAY] OpenGL rendering teardown");
                if let Some(underlay) = underlay_for_rendering.borrow_mut().take() {
                    underlay.teardown();
                }
                start_time_for_rendering.set(None);
            }
            _ => {}
        }
    })?;

    // Redraw every frame and mirror page state into the UI
    let animation_timer = slint::Timer::default();
    let ui_app_weak_for_animation = ui_app.as_weak();
    animation_timer.start(slint::TimerMode::Repeated, std::time::Duration::from_millis(16), move || {
        let Some(app) = ui_app_weak_for_animation.upgrade() else {
            return;
        };
        if let (Some(underlay), Some(start)) = (underlay.borrow().as_ref(), start_time.get()) {
            let now = start.elapsed().as_secs_f32();
            let page = app.global::<PageState>();
            page.set_phase(underlay.site.phase().as_index());
            page.set_tnt_hovered(underlay.site.tnt_hovered());
            page.set_fuse_progress(underlay.site.fuse_progress(now));
        }
        app.window().request_redraw();
    });

    log::info!("[HYBRID] Starting Slint event loop");
    ui_app.run()?;

    Ok(())
}
