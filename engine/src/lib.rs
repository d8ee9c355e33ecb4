#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Frame-stepped engine driving the Crossing controllers.
//!
//! The engine owns a [`Context`] (global entity registry, event bus, clock
//! and board) and the controllers of the active [`Phase`]. Each call to
//! [`Engine::frame`] advances the clock, routes key presses and posted events
//! through the controllers' binding tables, applies requested phase changes,
//! ticks the controllers and returns the visible entities as a [`Frame`].

mod bus;
mod clock;
mod controller;
mod phase;

use std::{error::Error as StdError, time::Duration};

use crossing_core::{
    Board, ControllerKind, GameEvent, ImageKey, Key, Phase, PhaseMessage, Transition,
};
use crossing_world::{Drawable, EntityId, Objects, RegistryError};
use glam::Vec2;
use thiserror::Error;
use tracing::{debug, info};

pub use bus::EventBus;
pub use clock::Clock;
pub use controller::{
    dispatch, Bindings, Bound, Context, Controller, ControllerFactory, Handler, PhaseRequest,
    Signal,
};
pub use phase::PhaseTable;

/// Failures that abort the frame loop.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A controller broke the registry's ownership rules.
    #[error(transparent)]
    Registry(#[from] RegistryError),
    /// A phase was requested that the phase table does not describe.
    #[error("phase {0:?} is not registered in the phase table")]
    UnknownPhase(Phase),
    /// The controller factory cannot build the requested kind.
    #[error("no controller can be built for {0:?}")]
    UnknownController(ControllerKind),
    /// A controller failed while handling a signal or ticking.
    #[error("controller {kind:?} failed")]
    Controller {
        /// Controller that failed.
        kind: ControllerKind,
        /// Underlying failure.
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },
}

impl EngineError {
    /// Wraps a controller-specific failure.
    pub fn controller(
        kind: ControllerKind,
        source: impl Into<Box<dyn StdError + Send + Sync>>,
    ) -> Self {
        Self::Controller {
            kind,
            source: source.into(),
        }
    }
}

/// Engine construction parameters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EngineConfig {
    initial_phase: Phase,
    board: Board,
    debug_keys: bool,
    max_frame: Duration,
}

impl EngineConfig {
    /// Creates a configuration.
    #[must_use]
    pub const fn new(
        initial_phase: Phase,
        board: Board,
        debug_keys: bool,
        max_frame: Duration,
    ) -> Self {
        Self {
            initial_phase,
            board,
            debug_keys,
            max_frame,
        }
    }

    /// Phase entered when the engine starts.
    #[must_use]
    pub const fn initial_phase(&self) -> Phase {
        self.initial_phase
    }

    /// Board geometry shared with every controller.
    #[must_use]
    pub const fn board(&self) -> Board {
        self.board
    }

    /// Whether the debug keys are active.
    #[must_use]
    pub const fn debug_keys(&self) -> bool {
        self.debug_keys
    }

    /// Longest frame the clock will simulate in one step.
    #[must_use]
    pub const fn max_frame(&self) -> Duration {
        self.max_frame
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new(Phase::Menu, Board::default(), false, Duration::from_millis(50))
    }
}

/// A visible entity ready to be drawn.
#[derive(Clone, Debug, PartialEq)]
pub struct FrameSprite {
    /// Entity the sprite was taken from.
    pub id: EntityId,
    /// Top-left corner in screen pixels.
    pub position: Vec2,
    /// What to draw.
    pub drawable: Drawable,
    /// Draw-order index.
    pub z: i32,
}

/// Output of a single engine step.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Frame {
    /// Background image drawn below everything else.
    pub background: Option<ImageKey>,
    /// Foreground entities in draw order.
    pub sprites: Vec<FrameSprite>,
    /// The backend should toggle fullscreen.
    pub toggle_fullscreen: bool,
    /// The engine stopped and will produce no more frames.
    pub finished: bool,
}

/// Owns the controllers of the active phase and steps them frame by frame.
pub struct Engine<F> {
    table: PhaseTable,
    factory: F,
    ctx: Context,
    phase: Phase,
    controllers: Vec<Box<dyn Controller>>,
    debug_keys: bool,
    running: bool,
}

impl<F> Engine<F>
where
    F: ControllerFactory,
{
    /// Creates the engine and enters the configured initial phase.
    pub fn new(config: EngineConfig, table: PhaseTable, factory: F) -> Result<Self, EngineError> {
        let mut engine = Self {
            table,
            factory,
            ctx: Context::new(config.board(), Clock::new(config.max_frame())),
            phase: config.initial_phase(),
            controllers: Vec::new(),
            debug_keys: config.debug_keys(),
            running: true,
        };
        engine.setup_phase(config.initial_phase(), Transition::Hard, PhaseMessage::new())?;
        Ok(engine)
    }

    /// Active phase.
    #[must_use]
    pub const fn phase(&self) -> Phase {
        self.phase
    }

    /// Returns `false` once the engine has been stopped.
    #[must_use]
    pub const fn is_running(&self) -> bool {
        self.running
    }

    /// Global entity registry.
    #[must_use]
    pub fn objects(&self) -> &Objects {
        &self.ctx.objects
    }

    /// Shared controller context.
    #[must_use]
    pub fn context(&self) -> &Context {
        &self.ctx
    }

    /// Active controllers in dispatch order.
    #[must_use]
    pub fn controllers(&self) -> &[Box<dyn Controller>] {
        &self.controllers
    }

    /// Posts an event from outside the controllers.
    pub fn post(&mut self, event: GameEvent) {
        self.ctx.post(event);
    }

    /// Advances the game by `dt`, feeding the key presses observed since the
    /// previous frame.
    pub fn frame(&mut self, dt: Duration, keys: &[Key]) -> Result<Frame, EngineError> {
        if !self.running {
            return Ok(Frame {
                finished: true,
                ..Frame::default()
            });
        }

        self.ctx.clock.advance(dt);

        // Only events queued before this frame are delivered; anything posted
        // by key or event handlers below waits for the next frame.
        let pending = self.ctx.bus.drain();

        for key in keys {
            if self.handle_global_key(*key) {
                continue;
            }
            self.dispatch(&Signal::Key(*key))?;
        }

        for event in pending {
            self.dispatch(&Signal::Event(event))?;
        }

        for request in self.ctx.take_phase_requests() {
            self.setup_phase(request.phase, request.transition, request.message)?;
        }

        for controller in &mut self.controllers {
            controller.tick(&mut self.ctx)?;
        }

        self.ctx.objects.sort_by_draw_order();
        let sprites = self
            .ctx
            .objects
            .iter()
            .filter(|entity| entity.is_visible())
            .map(|entity| FrameSprite {
                id: entity.id(),
                position: entity.position(),
                drawable: entity.draw(),
                z: entity.z(),
            })
            .collect();

        let mut frame = Frame {
            background: self.ctx.background().cloned(),
            sprites,
            toggle_fullscreen: self.ctx.take_fullscreen_toggle(),
            finished: false,
        };

        if self.ctx.stop_requested() {
            self.shutdown()?;
            frame.finished = true;
        }

        Ok(frame)
    }

    fn handle_global_key(&mut self, key: Key) -> bool {
        match key {
            Key::Escape => {
                self.ctx.request_stop();
                true
            }
            Key::F12 => {
                self.ctx.toggle_fullscreen();
                true
            }
            Key::Char(c) if self.debug_keys => {
                match c {
                    'n' => self.ctx.post(GameEvent::Win),
                    'm' => self.ctx.post(GameEvent::Die),
                    'o' => self.log_objects(),
                    'c' => self.log_controllers(),
                    _ => {}
                }
                false
            }
            _ => false,
        }
    }

    fn dispatch(&mut self, signal: &Signal) -> Result<(), EngineError> {
        let mut handled = 0_usize;
        for controller in &mut self.controllers {
            if controller.dispatch(signal, &mut self.ctx)? {
                handled += 1;
            }
        }
        debug!(signal = ?signal, handled, "signal dispatched");
        Ok(())
    }

    fn setup_phase(
        &mut self,
        phase: Phase,
        transition: Transition,
        mut message: PhaseMessage,
    ) -> Result<(), EngineError> {
        let kinds = self.table.controllers(phase)?.to_vec();
        message.phase = Some(phase);

        let mut kept = Vec::new();
        for mut controller in std::mem::take(&mut self.controllers) {
            if transition == Transition::Soft && kinds.contains(&controller.kind()) {
                kept.push(controller);
            } else {
                debug!(kind = ?controller.kind(), "controller destroyed");
                controller.destroy(&mut self.ctx)?;
            }
        }

        let mut active = Vec::with_capacity(kinds.len());
        for kind in kinds {
            if let Some(index) = kept.iter().position(|controller| controller.kind() == kind) {
                active.push(kept.swap_remove(index));
                continue;
            }
            let mut controller = self.factory.build(kind, &message)?;
            controller.create(&mut self.ctx)?;
            debug!(kind = ?kind, "controller created");
            active.push(controller);
        }

        info!(from = ?self.phase, to = ?phase, transition = ?transition, "phase changed");
        self.controllers = active;
        self.phase = phase;
        Ok(())
    }

    fn shutdown(&mut self) -> Result<(), EngineError> {
        for mut controller in std::mem::take(&mut self.controllers) {
            controller.destroy(&mut self.ctx)?;
        }
        self.running = false;
        info!(
            frames = self.ctx.clock.frame_count(),
            remaining = self.ctx.objects.len(),
            "engine stopped"
        );
        Ok(())
    }

    fn log_objects(&self) {
        for entity in self.ctx.objects.iter() {
            info!(
                id = entity.id().get(),
                kind = ?entity.kind(),
                x = entity.position().x,
                y = entity.position().y,
                visible = entity.is_visible(),
                "live object"
            );
        }
    }

    fn log_controllers(&self) {
        for controller in &self.controllers {
            info!(kind = ?controller.kind(), owned = controller.scope().len(), "active controller");
        }
    }
}
