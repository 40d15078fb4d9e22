use kindle_engine::core::{App, AppControl, FrameCtx, WindowCtx};
use kindle_engine::input::{
    InputEvent, InputFrame, Key, MouseButton, MouseButtonState, PointerButtonEvent,
    PointerMoveEvent,
};
use kindle_engine::paint::Color;
use kindle_engine::render::overlay::OverlayRenderer;
use kindle_engine::window::CursorIcon;

use kindle_fire::flame::focus_point;
use kindle_fire::{
    AtlasImage, FireFrame, FireRenderer, Features, OrbitCamera, ParticleTable, SimClock, Stage,
};

use crate::config::DemoConfig;
use crate::toggle::{ToggleButton, UNAVAILABLE_LABEL, toggle_label};

/// The fire demo: input → camera/clock → renderer.
pub struct FireApp {
    config: DemoConfig,
    stage: Stage,
    features: Features,

    /// User toggle; only takes effect when the stage supports billboarding.
    billboarding: bool,
    camera: OrbitCamera,
    clock: SimClock,

    button: ToggleButton,
    /// Last pointer position of a drag that began outside the button.
    drag_anchor: Option<(f32, f32)>,

    renderer: FireRenderer,
    overlay: OverlayRenderer,
    clear: Color,

    shown_title: String,
    shown_cursor: CursorIcon,
}

impl FireApp {
    pub fn new(config: DemoConfig, table: ParticleTable, atlas: AtlasImage) -> Self {
        let stage = config.stage;
        let camera = OrbitCamera::new(focus_point(&config.flames));
        let clock = SimClock::new(config.warmup);
        let clear = Color::from_straight_array(config.clear_color);

        Self {
            stage,
            features: stage.features(),
            billboarding: true,
            camera,
            clock,
            button: ToggleButton::default(),
            drag_anchor: None,
            renderer: FireRenderer::new(table, atlas),
            overlay: OverlayRenderer::new(),
            clear,
            shown_title: String::new(),
            shown_cursor: CursorIcon::Default,
            config,
        }
    }

    /// Whether particles are currently drawn camera-facing.
    pub fn billboard_active(&self) -> bool {
        self.features.billboarding && self.billboarding
    }

    pub fn title(&self) -> String {
        let label = if self.features.billboarding {
            toggle_label(self.billboarding)
        } else {
            UNAVAILABLE_LABEL
        };
        let mut title = format!("{label} [{}]", self.stage);
        if self.clock.is_paused() {
            title.push_str(" (paused)");
        }
        title
    }

    pub fn set_stage(&mut self, stage: Stage) {
        if stage == self.stage {
            return;
        }
        self.stage = stage;
        self.features = stage.features();
        if !self.features.camera_control {
            self.camera.reset();
            self.drag_anchor = None;
        }
        log::info!("stage: {stage} {:?}", self.features);
    }

    pub fn toggle_billboarding(&mut self) {
        if !self.features.billboarding {
            log::debug!("billboarding is not part of the {} stage", self.stage);
            return;
        }
        self.billboarding = !self.billboarding;
        log::info!("billboarding {}", if self.billboarding { "on" } else { "off" });
    }

    pub fn reset(&mut self) {
        self.camera.reset();
        self.clock.reset();
    }

    /// Applies this frame's input. Does not touch the GPU.
    ///
    /// Events are replayed in arrival order, so only motion between a press
    /// and its release turns the camera.
    pub fn handle_input(&mut self, frame: &InputFrame) -> AppControl {
        for ev in &frame.events {
            if self.button.handle_event(ev) {
                self.toggle_billboarding();
            }

            match ev {
                InputEvent::PointerButton(PointerButtonEvent {
                    button: MouseButton::Left,
                    state,
                    x,
                    y,
                    ..
                }) => {
                    let outside = !self.button.contains(*x, *y);
                    self.drag_anchor = (*state == MouseButtonState::Pressed && outside).then_some((*x, *y));
                }
                InputEvent::PointerMoved(PointerMoveEvent { x, y }) => self.drag_to(*x, *y),
                InputEvent::Focused(false) => self.drag_anchor = None,
                _ => {}
            }
        }

        if frame.key_pressed(Key::Escape) {
            return AppControl::Exit;
        }
        if frame.key_pressed(Key::B) {
            self.toggle_billboarding();
        }
        if frame.key_pressed(Key::Space) {
            let paused = self.clock.toggle_pause();
            log::info!("simulation {}", if paused { "paused" } else { "resumed" });
        }
        if frame.key_pressed(Key::R) {
            self.reset();
        }

        let stage_keys = [Key::Digit1, Key::Digit2, Key::Digit3, Key::Digit4, Key::Digit5];
        for (key, stage) in stage_keys.into_iter().zip(Stage::ALL) {
            if frame.key_pressed(key) {
                self.set_stage(stage);
            }
        }

        AppControl::Continue
    }

    fn drag_to(&mut self, x: f32, y: f32) {
        let Some((ax, ay)) = self.drag_anchor else { return };
        if self.features.camera_control {
            self.camera.drag(x - ax, y - ay);
        }
        self.drag_anchor = Some((x, y));
    }

    fn sync_window(&mut self, window: &WindowCtx<'_>) {
        let title = self.title();
        if title != self.shown_title {
            window.set_title(&title);
            self.shown_title = title;
        }

        let cursor = if self.button.is_hovered() && self.features.billboarding {
            CursorIcon::Pointer
        } else {
            CursorIcon::Default
        };
        if cursor != self.shown_cursor {
            window.set_cursor(cursor);
            self.shown_cursor = cursor;
        }
    }
}

impl App for FireApp {
    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl {
        if self.handle_input(ctx.input_frame) == AppControl::Exit {
            return AppControl::Exit;
        }

        self.clock.advance(ctx.time.dt);
        self.sync_window(&ctx.window);

        let aspect = ctx.viewport().aspect();
        let frame = FireFrame {
            billboard: self.billboard_active(),
            atlas_animation: self.features.atlas_animation,
            acceleration: self.features.acceleration_vector(self.config.acceleration),
            ..FireFrame::new(
                self.camera.view(),
                self.camera.projection(aspect),
                self.clock.seconds(),
                &self.config.flames,
            )
        };
        let quads = self.button.quads(self.billboarding, self.features.billboarding);

        let (renderer, overlay) = (&mut self.renderer, &mut self.overlay);
        ctx.render(self.clear, |rctx, target| {
            renderer.draw(rctx, target, &frame);
            overlay.render(rctx, target, &quads);
        })
    }
}
