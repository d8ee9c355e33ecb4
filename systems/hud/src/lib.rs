#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Heads-up display controllers: score line, win/die popups and the FPS
//! readout.

use std::time::Duration;

use crossing_core::{Colour, ControllerKind, EventName, GameEvent};
use crossing_engine::{dispatch, Bindings, Bound, Context, Controller, EngineError, Signal};
use crossing_world::{EntityId, EntitySpec, Scope, TextStyle};
use glam::Vec2;
use tracing::debug;

const HUD_Z: i32 = 10;
const POPUP_Z: i32 = 20;
const HUD_FONT_SIZE: f32 = 20.0;
const POPUP_FONT_SIZE: f32 = 48.0;

fn set_text(ctx: &mut Context, id: Option<EntityId>, content: String) {
    if let Some(entity) = id.and_then(|id| ctx.objects.get_mut(id)) {
        entity.set_text(content);
    }
}

/// Score, level and lives line at the top of the screen.
#[derive(Debug)]
pub struct ScoreText {
    scope: Scope,
    bindings: Bindings<ScoreText>,
    text: Option<EntityId>,
}

impl ScoreText {
    /// Creates the controller.
    #[must_use]
    pub fn new() -> Self {
        Self {
            scope: Scope::new(),
            bindings: Bindings::new().on(EventName::SessionChanged, Self::on_session_changed),
            text: None,
        }
    }

    /// Entity holding the score line.
    #[must_use]
    pub const fn text(&self) -> Option<EntityId> {
        self.text
    }

    fn on_session_changed(
        &mut self,
        signal: &Signal,
        ctx: &mut Context,
    ) -> Result<(), EngineError> {
        if let Some(GameEvent::SessionChanged {
            level,
            score,
            lives,
        }) = signal.event()
        {
            set_text(ctx, self.text, score_line(*level, *score, *lives));
        }
        Ok(())
    }
}

impl Default for ScoreText {
    fn default() -> Self {
        Self::new()
    }
}

/// Text shown by [`ScoreText`].
#[must_use]
pub fn score_line(level: u32, score: u32, lives: u32) -> String {
    format!("Score {score}   Level {level}   Lives {lives}")
}

impl Bound for ScoreText {
    fn bindings(&self) -> &Bindings<Self> {
        &self.bindings
    }
}

impl Controller for ScoreText {
    fn kind(&self) -> ControllerKind {
        ControllerKind::ScoreText
    }

    fn scope(&self) -> &Scope {
        &self.scope
    }

    fn scope_mut(&mut self) -> &mut Scope {
        &mut self.scope
    }

    fn create(&mut self, ctx: &mut Context) -> Result<(), EngineError> {
        let style = TextStyle::new(String::new(), HUD_FONT_SIZE, Colour::YELLOW);
        let spec = EntitySpec::text(Vec2::new(6.0, 6.0), style).with_z(HUD_Z);
        self.text = Some(self.scope.create(&mut ctx.objects, spec));
        Ok(())
    }

    fn dispatch(&mut self, signal: &Signal, ctx: &mut Context) -> Result<bool, EngineError> {
        dispatch(self, signal, ctx)
    }
}

/// Banner shown for a moment after the player wins or dies. Player input is
/// frozen while it is visible.
#[derive(Debug)]
pub struct Popup {
    scope: Scope,
    bindings: Bindings<Popup>,
    duration: Duration,
    remaining: Option<Duration>,
    text: Option<EntityId>,
}

impl Popup {
    /// How long the banner stays up by default.
    pub const DEFAULT_DURATION: Duration = Duration::from_millis(1500);

    /// Creates a popup that stays up for `duration`.
    #[must_use]
    pub fn new(duration: Duration) -> Self {
        Self {
            scope: Scope::new(),
            bindings: Bindings::new()
                .on(EventName::Win, Self::on_win)
                .on(EventName::Die, Self::on_die),
            duration,
            remaining: None,
            text: None,
        }
    }

    /// Whether the banner is currently shown.
    #[must_use]
    pub const fn is_showing(&self) -> bool {
        self.remaining.is_some()
    }

    fn on_win(&mut self, _signal: &Signal, ctx: &mut Context) -> Result<(), EngineError> {
        self.show(ctx, "Crossed!", Colour::GREEN);
        Ok(())
    }

    fn on_die(&mut self, _signal: &Signal, ctx: &mut Context) -> Result<(), EngineError> {
        self.show(ctx, "Splat!", Colour::RED);
        Ok(())
    }

    fn show(&mut self, ctx: &mut Context, message: &str, colour: Colour) {
        let Some(id) = self.text else {
            return;
        };
        let Some(entity) = ctx.objects.get_mut(id) else {
            return;
        };
        let style = TextStyle::new(message, POPUP_FONT_SIZE, colour);
        let x = ((ctx.board.width() - style.estimated_width()) / 2.0).max(0.0);
        entity.set_text(message);
        entity.set_position(Vec2::new(x, entity.position().y));
        entity.set_visible(true);

        if self.remaining.is_none() {
            ctx.post(GameEvent::DisableMovement);
        }
        self.remaining = Some(self.duration);
        debug!(message, "popup shown");
    }
}

impl Default for Popup {
    fn default() -> Self {
        Self::new(Self::DEFAULT_DURATION)
    }
}

impl Bound for Popup {
    fn bindings(&self) -> &Bindings<Self> {
        &self.bindings
    }
}

impl Controller for Popup {
    fn kind(&self) -> ControllerKind {
        ControllerKind::Popup
    }

    fn scope(&self) -> &Scope {
        &self.scope
    }

    fn scope_mut(&mut self) -> &mut Scope {
        &mut self.scope
    }

    fn create(&mut self, ctx: &mut Context) -> Result<(), EngineError> {
        let y = ctx.board.height() / 2.0 - POPUP_FONT_SIZE / 2.0;
        let style = TextStyle::new(String::new(), POPUP_FONT_SIZE, Colour::WHITE);
        let spec = EntitySpec::text(Vec2::new(0.0, y), style)
            .with_z(POPUP_Z)
            .hidden();
        self.text = Some(self.scope.create(&mut ctx.objects, spec));
        Ok(())
    }

    fn dispatch(&mut self, signal: &Signal, ctx: &mut Context) -> Result<bool, EngineError> {
        dispatch(self, signal, ctx)
    }

    fn update(&mut self, ctx: &mut Context) -> Result<(), EngineError> {
        let Some(remaining) = self.remaining else {
            return Ok(());
        };
        let remaining = remaining.saturating_sub(ctx.clock.dt());
        if !remaining.is_zero() {
            self.remaining = Some(remaining);
            return Ok(());
        }

        self.remaining = None;
        if let Some(entity) = self.text.and_then(|id| ctx.objects.get_mut(id)) {
            entity.set_visible(false);
        }
        ctx.post(GameEvent::EnableMovement);
        Ok(())
    }
}

/// Frames-per-second readout in the top-right corner.
#[derive(Debug)]
pub struct FpsCounter {
    scope: Scope,
    bindings: Bindings<FpsCounter>,
    text: Option<EntityId>,
    shown: Option<u32>,
}

impl FpsCounter {
    /// Creates the controller.
    #[must_use]
    pub fn new() -> Self {
        Self {
            scope: Scope::new(),
            bindings: Bindings::new(),
            text: None,
            shown: None,
        }
    }
}

impl Default for FpsCounter {
    fn default() -> Self {
        Self::new()
    }
}

impl Bound for FpsCounter {
    fn bindings(&self) -> &Bindings<Self> {
        &self.bindings
    }
}

impl Controller for FpsCounter {
    fn kind(&self) -> ControllerKind {
        ControllerKind::FpsCounter
    }

    fn scope(&self) -> &Scope {
        &self.scope
    }

    fn scope_mut(&mut self) -> &mut Scope {
        &mut self.scope
    }

    fn create(&mut self, ctx: &mut Context) -> Result<(), EngineError> {
        let x = ctx.board.width() - 4.0 * HUD_FONT_SIZE;
        let style = TextStyle::new("0 FPS", HUD_FONT_SIZE, Colour::WHITE);
        let spec = EntitySpec::text(Vec2::new(x, 6.0), style).with_z(HUD_Z);
        self.text = Some(self.scope.create(&mut ctx.objects, spec));
        Ok(())
    }

    fn dispatch(&mut self, signal: &Signal, ctx: &mut Context) -> Result<bool, EngineError> {
        dispatch(self, signal, ctx)
    }

    fn update(&mut self, ctx: &mut Context) -> Result<(), EngineError> {
        let fps = ctx.clock.fps().round() as u32;
        if self.shown != Some(fps) {
            self.shown = Some(fps);
            set_text(ctx, self.text, format!("{fps} FPS"));
        }
        Ok(())
    }
}
