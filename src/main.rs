//! Cosmic Runner entry point
//!
//! Web: browser shell around the simulation (animation-frame loop, input
//! wiring, DOM HUD and overlays, canvas-2D drawing, remote contact lookup).
//! Native: headless demo that plays one run on autopilot and logs it.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use wasm_bindgen_futures::JsFuture;
    use web_sys::{
        CanvasRenderingContext2d, Document, HtmlCanvasElement, HtmlElement, KeyboardEvent,
        MouseEvent, TouchEvent,
    };

    use cosmic_runner::consts::*;
    use cosmic_runner::contact::{
        ContactHandle, EnvSource, GoalAction, REMOTE_CONFIG_PATH, RemoteConfigSource,
        goal_actions, resolve_contact,
    };
    use cosmic_runner::sim::{GameEvent, GameSession, PlatformKind, StoryScript, TickInput, tick};
    use cosmic_runner::view::{AppearanceStage, Snapshot};
    use cosmic_runner::{Lives, Tuning, Viewport};

    const BACKGROUND: &str = "#0b0d2a";
    const GROUND_COLOR: &str = "#3b2f6b";
    const FLOATING_COLOR: &str = "#6a5acd";
    const GOAL_COLOR: &str = "#ffd166";
    const SPIKE_COLOR: &str = "#ff4d6d";
    const RAMP_COLOR: &str = "#06d6a0";
    const ACTOR_EARLY_COLOR: &str = "#7bdff2";
    const ACTOR_LATE_COLOR: &str = "#f7aef8";

    /// Game instance holding all state
    struct Game {
        session: GameSession,
        ctx: CanvasRenderingContext2d,
        accumulator: f32,
        last_time: f64,
        input: TickInput,
        contact: Option<ContactHandle>,
        /// Tab hidden or window blurred: the loop keeps running but does not tick
        suspended: bool,
    }

    impl Game {
        /// Run simulation ticks
        fn update(&mut self, dt: f32) {
            if self.suspended {
                self.accumulator = 0.0;
                return;
            }
            let dt = dt.min(0.1);
            self.accumulator += dt;

            let mut substeps = 0;
            while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
                let input = self.input.clone();
                tick(&mut self.session, &input);
                self.accumulator -= SIM_DT;
                substeps += 1;

                // Requests are one-shot; autopilot is a mode
                self.input = TickInput {
                    autopilot: self.input.autopilot,
                    ..Default::default()
                };
            }

            for event in self.session.drain_events() {
                self.handle_event(event);
            }
        }

        /// Effect requests from the sim become DOM overlays
        fn handle_event(&self, event: GameEvent) {
            let Some(document) = current_document() else {
                return;
            };
            match event {
                GameEvent::RunStarted { seed, run } => {
                    log::info!("Run {} started with seed {}", run, seed);
                    for id in ["start-screen", "message-modal", "goal-screen", "game-over"] {
                        set_visible(&document, id, false);
                    }
                    set_visible(&document, "hud", true);
                }
                GameEvent::ShowStory { text, is_final, .. } => {
                    let label = if is_final { "Finish" } else { "Continue" };
                    show_message(&document, &text, label);
                }
                GameEvent::ShowFailMessage { text } => {
                    show_message(&document, &text, "Try again");
                }
                GameEvent::Respawned { .. } => set_visible(&document, "message-modal", false),
                GameEvent::GoalReached { score } => {
                    set_text(&document, "#goal-score", &score.to_string());
                    self.show_goal_actions(&document);
                    set_visible(&document, "goal-screen", true);
                }
                GameEvent::OutOfLives => {
                    set_visible(&document, "message-modal", false);
                    set_text(&document, "#final-score", &self.session.score().to_string());
                    set_visible(&document, "game-over", true);
                }
                GameEvent::Jumped { .. }
                | GameEvent::Landed { .. }
                | GameEvent::Boosted { .. }
                | GameEvent::Died { .. } => log::debug!("Effect: {:?}", event),
            }
        }

        fn show_goal_actions(&self, document: &Document) {
            let actions = goal_actions(self.contact.as_ref());
            let contact_url = actions.iter().find_map(|a| match a {
                GoalAction::Contact { url } => Some(url.as_str()),
                GoalAction::PlayAgain => None,
            });
            match contact_url {
                Some(url) => {
                    if let Some(btn) = document.get_element_by_id("contact-btn") {
                        let _ = btn.set_attribute("href", url);
                    }
                    set_visible(document, "contact-btn", true);
                }
                None => set_visible(document, "contact-btn", false),
            }
        }

        /// Draw the current frame
        fn render(&self) {
            let snap = self.session.snapshot();
            let ctx = &self.ctx;
            let (w, h) = (snap.viewport.width as f64, snap.viewport.height as f64);

            ctx.set_global_alpha(1.0);
            ctx.set_fill_style_str(BACKGROUND);
            ctx.fill_rect(0.0, 0.0, w, h);

            for platform in &snap.platforms {
                let color = match platform.kind {
                    PlatformKind::Ground => GROUND_COLOR,
                    PlatformKind::Floating => FLOATING_COLOR,
                    PlatformKind::Goal => GOAL_COLOR,
                };
                ctx.set_fill_style_str(color);
                ctx.fill_rect(
                    snap.to_screen_x(platform.rect.x) as f64,
                    platform.rect.y as f64,
                    platform.rect.w as f64,
                    platform.rect.h as f64,
                );
            }

            ctx.set_fill_style_str(SPIKE_COLOR);
            for spike in &snap.spikes {
                let x = snap.to_screen_x(spike.rect.x) as f64;
                triangle(ctx, x, spike.rect.bottom() as f64, spike.rect.w as f64, spike.rect.h as f64);
            }

            ctx.set_fill_style_str(RAMP_COLOR);
            for ramp in &snap.ramps {
                let x = snap.to_screen_x(ramp.rect.x) as f64;
                let bottom = ramp.rect.bottom() as f64;
                ctx.begin_path();
                ctx.move_to(x, bottom);
                ctx.line_to(x + ramp.rect.w as f64, bottom);
                ctx.line_to(x + ramp.rect.w as f64, ramp.rect.y as f64);
                ctx.close_path();
                ctx.fill();
            }

            self.render_actor(&snap);
        }

        fn render_actor(&self, snap: &Snapshot) {
            let ctx = &self.ctx;
            let color = match snap.appearance {
                AppearanceStage::Early => ACTOR_EARLY_COLOR,
                AppearanceStage::Late => ACTOR_LATE_COLOR,
            };
            let size = snap.actor_size as f64;
            ctx.set_fill_style_str(color);

            for point in &snap.trail {
                ctx.set_global_alpha(point.alpha as f64 * 0.5);
                let scale = point.alpha as f64;
                let trail_size = size * 0.6 * scale;
                ctx.fill_rect(
                    snap.to_screen_x(point.pos.x) as f64 + (size - trail_size) / 2.0,
                    point.pos.y as f64 + (size - trail_size) / 2.0,
                    trail_size,
                    trail_size,
                );
            }

            ctx.set_global_alpha(1.0);
            ctx.fill_rect(
                snap.to_screen_x(snap.actor_pos.x) as f64,
                snap.actor_pos.y as f64,
                size,
                size,
            );
        }

        /// Update HUD elements in DOM
        fn update_hud(&self) {
            let Some(document) = current_document() else {
                return;
            };

            set_text(&document, "#hud-score .hud-value", &self.session.score().to_string());

            let progress = self.session.progress();
            set_text(
                &document,
                "#hud-progress .hud-value",
                &format!("{:.0}%", progress),
            );
            if let Some(fill) = document
                .get_element_by_id("progress-fill")
                .and_then(|el| el.dyn_into::<HtmlElement>().ok())
            {
                let _ = fill.style().set_property("width", &format!("{:.1}%", progress));
            }

            let lives = match self.session.lives() {
                Lives::Unlimited => "∞".to_string(),
                Lives::Limited(n) => n.to_string(),
            };
            set_text(&document, "#hud-lives .hud-value", &lives);
        }

        fn resize(&mut self, canvas: &HtmlCanvasElement) {
            let width = canvas.client_width().max(1) as u32;
            let height = canvas.client_height().max(1) as u32;
            canvas.set_width(width);
            canvas.set_height(height);
            self.session
                .resize(Viewport::new(width as f32, height as f32));
        }
    }

    fn current_document() -> Option<Document> {
        web_sys::window()?.document()
    }

    fn set_visible(document: &Document, id: &str, visible: bool) {
        if let Some(el) = document.get_element_by_id(id) {
            let _ = el.set_attribute("class", if visible { "" } else { "hidden" });
        }
    }

    fn set_text(document: &Document, selector: &str, text: &str) {
        if let Some(el) = document.query_selector(selector).ok().flatten() {
            el.set_text_content(Some(text));
        }
    }

    fn show_message(document: &Document, text: &str, button_label: &str) {
        if let Some(el) = document.get_element_by_id("message-text") {
            el.set_text_content(Some(text));
        }
        if let Some(el) = document.get_element_by_id("message-btn") {
            el.set_text_content(Some(button_label));
        }
        set_visible(document, "message-modal", true);
    }

    fn triangle(ctx: &CanvasRenderingContext2d, x: f64, bottom: f64, w: f64, h: f64) {
        ctx.begin_path();
        ctx.move_to(x, bottom);
        ctx.line_to(x + w / 2.0, bottom - h);
        ctx.line_to(x + w, bottom);
        ctx.close_path();
        ctx.fill();
    }

    async fn fetch_text(url: &str) -> Result<String, String> {
        let window = web_sys::window().ok_or_else(|| "no window".to_string())?;
        let response = JsFuture::from(window.fetch_with_str(url))
            .await
            .map_err(|e| format!("{:?}", e))?;
        let response: web_sys::Response = response
            .dyn_into()
            .map_err(|_| "fetch did not return a Response".to_string())?;
        if !response.ok() {
            return Err(format!("HTTP {}", response.status()));
        }
        let text = response.text().map_err(|e| format!("{:?}", e))?;
        JsFuture::from(text)
            .await
            .map_err(|e| format!("{:?}", e))?
            .as_string()
            .ok_or_else(|| "response body is not text".to_string())
    }

    /// Contact handle: environment first (empty in the browser), then the remote config
    ///
    /// No override file here: a browser page has no local filesystem to read it from.
    async fn lookup_contact() -> Option<ContactHandle> {
        let remote = match fetch_text(REMOTE_CONFIG_PATH).await {
            Ok(body) => RemoteConfigSource::from_body(body),
            Err(reason) => RemoteConfigSource::failed(reason),
        };
        resolve_contact(&[&EnvSource::default(), &remote])
    }

    pub async fn run() {
        console_error_panic_hook::set_once();
        if let Err(e) = console_log::init_with_level(log::Level::Info) {
            web_sys::console::error_1(&format!("Failed to init logger: {}", e).into());
        }

        log::info!("Cosmic Runner starting...");

        let Some(document) = current_document() else {
            log::error!("No document; cannot start");
            return;
        };

        set_visible(&document, "loading", false);

        let Some(canvas) = document
            .get_element_by_id("canvas")
            .and_then(|el| el.dyn_into::<HtmlCanvasElement>().ok())
        else {
            log::error!("No #canvas element");
            return;
        };
        let Some(ctx) = canvas
            .get_context("2d")
            .ok()
            .flatten()
            .and_then(|c| c.dyn_into::<CanvasRenderingContext2d>().ok())
        else {
            log::error!("Canvas 2D context unavailable");
            return;
        };

        let seed = js_sys::Date::now() as u64;
        let viewport = Viewport::new(
            canvas.client_width().max(1) as f32,
            canvas.client_height().max(1) as f32,
        );
        let session = GameSession::new(seed, Tuning::load(), StoryScript::default(), viewport);
        let game = Rc::new(RefCell::new(Game {
            session,
            ctx,
            accumulator: 0.0,
            last_time: 0.0,
            input: TickInput::default(),
            contact: None,
            suspended: false,
        }));
        game.borrow_mut().resize(&canvas);

        log::info!("Game initialized with seed: {}", seed);

        setup_input_handlers(&canvas, game.clone());
        setup_buttons(&document, game.clone());
        setup_auto_suspend(game.clone());
        setup_resize(canvas.clone(), game.clone());

        set_visible(&document, "start-screen", true);

        request_animation_frame(game.clone());

        log::info!("Cosmic Runner running!");

        // Resolved after the loop is up; the goal screen reads it whenever it appears
        let contact = lookup_contact().await;
        game.borrow_mut().contact = contact;
    }

    fn setup_input_handlers(canvas: &HtmlCanvasElement, game: Rc<RefCell<Game>>) {
        // Mouse click - jump
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                game.borrow_mut().input.jump = true;
            });
            let _ = canvas
                .add_event_listener_with_callback("mousedown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Touch start - jump
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                event.prevent_default();
                game.borrow_mut().input.jump = true;
            });
            let _ = canvas
                .add_event_listener_with_callback("touchstart", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Keyboard
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
            let mut g = game.borrow_mut();
            match event.key().as_str() {
                " " | "ArrowUp" => {
                    event.prevent_default();
                    g.input.jump = true;
                }
                "Enter" => {
                    g.input.start = true;
                    g.input.dismiss = true;
                    g.input.respawn = true;
                }
                "a" | "A" => {
                    g.input.autopilot = !g.input.autopilot;
                    log::info!("Autopilot: {}", g.input.autopilot);
                }
                _ => {}
            }
        });
        let _ =
            window.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn on_click<F>(document: &Document, id: &str, mut handler: F)
    where
        F: FnMut() + 'static,
    {
        if let Some(btn) = document.get_element_by_id(id) {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| handler());
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_buttons(document: &Document, game: Rc<RefCell<Game>>) {
        for id in ["start-btn", "play-again-btn", "restart-btn"] {
            let game = game.clone();
            on_click(document, id, move || {
                game.borrow_mut().input.start = true;
            });
        }

        // One modal serves both story beats and fail messages; the sim honours
        // whichever request fits its current pause
        let game = game.clone();
        on_click(document, "message-btn", move || {
            let mut g = game.borrow_mut();
            g.input.dismiss = true;
            g.input.respawn = true;
            if let Some(document) = current_document() {
                set_visible(&document, "message-modal", false);
            }
        });
    }

    fn setup_auto_suspend(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let Some(document) = window.document() else {
            return;
        };

        // Visibility change (tab switch, minimize)
        {
            let game = game.clone();
            let document_clone = document.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                let hidden = document_clone.visibility_state() == web_sys::VisibilityState::Hidden;
                game.borrow_mut().suspended = hidden;
                log::info!("Visibility changed, suspended: {}", hidden);
            });
            let _ = document.add_event_listener_with_callback(
                "visibilitychange",
                closure.as_ref().unchecked_ref(),
            );
            closure.forget();
        }

        // Window blur / focus
        for (name, suspended) in [("blur", true), ("focus", false)] {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
                game.borrow_mut().suspended = suspended;
            });
            let _ = window.add_event_listener_with_callback(name, closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_resize(canvas: HtmlCanvasElement, game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            game.borrow_mut().resize(&canvas);
        });
        let _ = window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |time: f64| {
            game_loop(game, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, time: f64) {
        {
            let mut g = game.borrow_mut();

            // Calculate delta time
            let dt = if g.last_time > 0.0 {
                ((time - g.last_time) / 1000.0) as f32
            } else {
                SIM_DT
            };
            g.last_time = time;

            g.update(dt);
            g.render();
            g.update_hud();
        }

        request_animation_frame(game);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    wasm_game::run().await;
}

/// Upper bound on demo length (frames)
#[cfg(not(target_arch = "wasm32"))]
const DEMO_MAX_TICKS: u64 = 120_000;

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use cosmic_runner::contact::{EnvSource, GoalAction, OverrideFileSource};
    use cosmic_runner::sim::{
        GameEvent, GameSession, PauseReason, RunPhase, StoryScript, TickInput, tick,
    };
    use cosmic_runner::{Tuning, Viewport, goal_actions, resolve_contact};

    env_logger::init();

    let seed = std::env::args()
        .nth(1)
        .and_then(|arg| arg.parse::<u64>().ok())
        .unwrap_or(42);
    log::info!("Cosmic Runner (native) starting headless autopilot run, seed {}", seed);

    // No remote source: the config endpoint is served next to the web build,
    // so a headless run only has the environment and a local override file
    let contact = resolve_contact(&[
        &EnvSource::default(),
        &OverrideFileSource::new("contact.json"),
    ]);

    let mut session = GameSession::new(seed, Tuning::load(), StoryScript::default(), Viewport::default());
    let mut input = TickInput {
        start: true,
        autopilot: true,
        ..Default::default()
    };

    let mut deaths = 0u32;
    let mut ticks = 0u64;
    while ticks < DEMO_MAX_TICKS {
        tick(&mut session, &input);
        input.start = false;
        ticks += 1;

        for event in session.drain_events() {
            match event {
                GameEvent::ShowStory { index, text, .. } => {
                    log::info!("Story {}: {}", index, text.replace('\n', " "));
                }
                GameEvent::Died { cause, pos } => {
                    deaths += 1;
                    log::info!("Died ({:?}) at x={:.0}", cause, pos.x);
                }
                GameEvent::ShowFailMessage { text } => log::info!("{}", text.replace('\n', " ")),
                other => log::debug!("{:?}", other),
            }
        }

        if matches!(
            session.phase(),
            RunPhase::Paused(PauseReason::GoalReached | PauseReason::OutOfLives)
        ) {
            break;
        }
    }

    log::info!(
        "Run ended after {} ticks: phase {:?}, score {}, progress {:.1}%, deaths {}",
        ticks,
        session.phase(),
        session.score(),
        session.progress(),
        deaths
    );
    for action in goal_actions(contact.as_ref()) {
        match action {
            GoalAction::Contact { url } => log::info!("Goal action: contact {}", url),
            GoalAction::PlayAgain => log::info!("Goal action: play again"),
        }
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}
