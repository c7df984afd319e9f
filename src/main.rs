//! Lever Reels entry point
//!
//! Handles platform-specific initialization and runs the frame loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{HtmlCanvasElement, KeyboardEvent, PointerEvent};

    use glam::Vec2;
    use lever_reels::renderer::SdfRenderState;
    use lever_reels::sim::{MachineEvent, SlotMachine};
    use lever_reels::{InputMode, Settings, StageLayout};

    /// Game instance holding all state
    struct Game {
        machine: SlotMachine,
        layout: StageLayout,
        settings: Settings,
        render_state: Option<SdfRenderState>,
    }

    impl Game {
        fn new(seed: u64, settings: Settings, layout: StageLayout) -> Self {
            let machine = SlotMachine::new(seed, settings.tuning.clone(), layout.slot_geometry());
            Self {
                machine,
                layout,
                settings,
                render_state: None,
            }
        }

        /// Pointer went down on the canvas (CSS px)
        fn pointer_down(&mut self, x: f32, y: f32, now: f64) {
            match self.layout.input_mode {
                InputMode::Lever => {
                    let handle_y = self.machine.lever().handle_y as f32;
                    if self.layout.lever_hit(Vec2::new(x, y), handle_y) {
                        self.machine.lever_press(now);
                    }
                }
                InputMode::Stage => {
                    self.machine.stage_tap(now);
                }
            }
        }

        fn pointer_up(&mut self, now: f64) {
            self.machine.lever_release(now);
        }

        /// Advance the machine to `now` and react to what happened
        fn update(&mut self, now: f64) {
            for event in self.machine.tick(now) {
                match event {
                    MachineEvent::ReelStopped { reel } => log::debug!("Reel {} stopped", reel),
                    MachineEvent::LeverReleased(release) => {
                        log::debug!("Lever released: {:?}", release)
                    }
                    MachineEvent::SpinStarted { .. } | MachineEvent::SpinFinished => {}
                }
            }
        }

        /// Render the current frame
        fn render(&mut self) {
            if let Some(ref mut render_state) = self.render_state {
                match render_state.render(&self.machine, &self.layout, &self.settings) {
                    Ok(_) => {}
                    Err(wgpu::SurfaceError::Lost) => {
                        let (w, h) = render_state.size;
                        let dpr = web_sys::window().map_or(1.0, |w| w.device_pixel_ratio());
                        render_state.resize(w, h, dpr as f32);
                    }
                    Err(wgpu::SurfaceError::OutOfMemory) => {
                        log::error!("Out of memory!");
                    }
                    Err(e) => log::warn!("Render error: {:?}", e),
                }
            }
        }

        /// Viewport changed size (CSS px)
        fn resize(&mut self, client_w: f32, client_h: f32, width: u32, height: u32, dpr: f32) {
            self.layout = StageLayout::new(client_w, client_h, self.machine.reels().len());
            self.machine.relayout(self.layout.slot_geometry());
            if let Some(ref mut render_state) = self.render_state {
                render_state.resize(width, height, dpr);
            }
            log::debug!("Resized to {}x{} ({:?})", client_w, client_h, self.layout.input_mode);
        }
    }

    /// Milliseconds on the same clock as requestAnimationFrame
    fn now() -> f64 {
        web_sys::window()
            .and_then(|w| w.performance())
            .map_or_else(js_sys::Date::now, |p| p.now())
    }

    /// `?seed=<u64>` from the page URL
    fn seed_from_query() -> Option<u64> {
        let search = web_sys::window()?.location().search().ok()?;
        search
            .trim_start_matches('?')
            .split('&')
            .filter_map(|pair| pair.split_once('='))
            .find(|(key, _)| *key == "seed")
            .and_then(|(_, value)| value.parse().ok())
    }

    /// Size the canvas backing store to its CSS box; returns (css w, css h, px w, px h, dpr)
    fn fit_canvas(canvas: &HtmlCanvasElement) -> (f32, f32, u32, u32, f32) {
        let dpr = web_sys::window().map_or(1.0, |w| w.device_pixel_ratio());
        let client_w = canvas.client_width();
        let client_h = canvas.client_height();
        let width = (client_w as f64 * dpr) as u32;
        let height = (client_h as f64 * dpr) as u32;
        canvas.set_width(width);
        canvas.set_height(height);
        (client_w as f32, client_h as f32, width, height, dpr as f32)
    }

    pub async fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Lever Reels starting...");

        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");

        // Hide loading indicator
        if let Some(loading) = document.get_element_by_id("loading") {
            let _ = loading.set_attribute("class", "hidden");
        }

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .expect("no canvas")
            .dyn_into()
            .expect("not a canvas");

        let (client_w, client_h, width, height, dpr) = fit_canvas(&canvas);

        let settings = Settings::load();
        let seed = seed_from_query()
            .or(settings.seed)
            .unwrap_or_else(|| js_sys::Date::now() as u64);
        let layout = StageLayout::new(client_w, client_h, settings.tuning.reel_count);
        let game = Rc::new(RefCell::new(Game::new(seed, settings, layout)));

        log::info!(
            "Machine initialized with seed: {} ({:?} input)",
            seed,
            layout.input_mode
        );

        // Initialize WebGPU
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::BROWSER_WEBGPU,
            ..Default::default()
        });

        let surface = instance
            .create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone()))
            .expect("Failed to create surface");

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .expect("Failed to get adapter");

        log::info!("Using adapter: {:?}", adapter.get_info().name);

        match SdfRenderState::new(surface, &adapter, width, height, dpr).await {
            Ok(render_state) => game.borrow_mut().render_state = Some(render_state),
            Err(e) => log::error!("Failed to create device: {}", e),
        }

        setup_input_handlers(&canvas, game.clone());
        setup_resize(&canvas, game.clone());

        // Start frame loop
        request_animation_frame(game);

        log::info!("Lever Reels running!");
    }

    fn setup_input_handlers(canvas: &HtmlCanvasElement, game: Rc<RefCell<Game>>) {
        let window = web_sys::window().unwrap();

        // Pointer down on the canvas: lever grab or stage tap
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: PointerEvent| {
                event.prevent_default();
                let x = event.offset_x() as f32;
                let y = event.offset_y() as f32;
                game.borrow_mut().pointer_down(x, y, now());
            });
            let _ = canvas
                .add_event_listener_with_callback("pointerdown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Pointer up anywhere releases the lever
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: PointerEvent| {
                game.borrow_mut().pointer_up(now());
            });
            let _ = window
                .add_event_listener_with_callback("pointerup", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Space holds the lever like a pointer
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                if event.key() != " " {
                    return;
                }
                event.prevent_default();
                if event.repeat() {
                    return;
                }
                let mut g = game.borrow_mut();
                match g.layout.input_mode {
                    InputMode::Lever => {
                        g.machine.lever_press(now());
                    }
                    InputMode::Stage => {
                        g.machine.stage_tap(now());
                    }
                }
            });
            let _ = window
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                if event.key() == " " {
                    event.prevent_default();
                    game.borrow_mut().pointer_up(now());
                }
            });
            let _ = window
                .add_event_listener_with_callback("keyup", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_resize(canvas: &HtmlCanvasElement, game: Rc<RefCell<Game>>) {
        let window = web_sys::window().unwrap();
        let canvas = canvas.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            let (client_w, client_h, width, height, dpr) = fit_canvas(&canvas);
            game.borrow_mut()
                .resize(client_w, client_h, width, height, dpr);
        });
        let _ = window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let window = web_sys::window().unwrap();
        let closure = Closure::once(move |time: f64| {
            game_loop(game, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, time: f64) {
        {
            let mut g = game.borrow_mut();
            g.update(time);
            g.render();
        }

        request_animation_frame(game);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    wasm_game::run().await;
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Lever Reels (native) starting...");
    log::info!("Native mode has no window - run with `trunk serve` for the web version");

    println!("\nRunning headless spin...");
    headless_spin();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// Pull the lever for 1.5s and let the reels run out at 60 fps
#[cfg(not(target_arch = "wasm32"))]
fn headless_spin() {
    use lever_reels::sim::{LeverState, MachineEvent, SlotMachine};
    use lever_reels::{Settings, StageLayout};

    const FRAME_MS: f64 = 1000.0 / 60.0;

    let settings = Settings::load();
    let layout = StageLayout::new(1280.0, 720.0, settings.tuning.reel_count);
    let mut machine = SlotMachine::new(
        settings.seed.unwrap_or(42),
        settings.tuning.clone(),
        layout.slot_geometry(),
    );

    let mut now = 0.0;
    machine.lever_press(now);
    while now < 1500.0 {
        now += FRAME_MS;
        machine.tick(now);
    }
    machine.lever_release(now);

    let mut frames = 0u32;
    loop {
        now += FRAME_MS;
        frames += 1;
        for event in machine.tick(now) {
            match event {
                MachineEvent::SpinStarted {
                    duration,
                    speed_multiplier,
                } => println!("  spin: duration x{duration:.2}, speed x{speed_multiplier:.2}"),
                MachineEvent::ReelStopped { reel } => println!("  reel {reel} stopped"),
                MachineEvent::SpinFinished => println!("  all reels stopped"),
                MachineEvent::LeverReleased(release) => println!("  lever: {release:?}"),
            }
        }
        if !machine.is_running() && machine.lever().state == LeverState::Idle {
            break;
        }
    }

    for (i, reel) in machine.reels().iter().enumerate() {
        let symbols: Vec<usize> = reel.slots.iter().map(|s| s.symbol).collect();
        println!("  reel {i}: position {} symbols {:?}", reel.position, symbols);
    }
    println!(
        "✓ Spin finished after {frames} frames (seed {})",
        machine.seed()
    );
}
