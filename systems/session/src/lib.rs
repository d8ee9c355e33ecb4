#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Session bookkeeping: level, score and lives.
//!
//! The session is the only owner of these numbers. Every change is published
//! as [`GameEvent::SessionChanged`] so the HUD and the traffic never read the
//! session directly.

use crossing_core::{ControllerKind, EventName, GameEvent, Phase, PhaseMessage, Transition};
use crossing_engine::{dispatch, Bindings, Bound, Context, Controller, EngineError, Signal};
use crossing_world::Scope;
use tracing::info;

/// Scoring and lives configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config {
    lives: u32,
    win_bonus: u32,
    hop_points: u32,
}

impl Config {
    /// Lives at the start of a game.
    pub const DEFAULT_LIVES: u32 = 3;
    /// Points for reaching the goal on level one.
    pub const DEFAULT_WIN_BONUS: u32 = 100;
    /// Points for reaching a new row.
    pub const DEFAULT_HOP_POINTS: u32 = 10;

    /// Creates a new configuration.
    #[must_use]
    pub const fn new(lives: u32, win_bonus: u32, hop_points: u32) -> Self {
        Self {
            lives,
            win_bonus,
            hop_points,
        }
    }

    /// Lives at the start of a game.
    #[must_use]
    pub const fn lives(&self) -> u32 {
        self.lives
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(
            Self::DEFAULT_LIVES,
            Self::DEFAULT_WIN_BONUS,
            Self::DEFAULT_HOP_POINTS,
        )
    }
}

/// Controller tracking the running game.
#[derive(Debug)]
pub struct Session {
    scope: Scope,
    bindings: Bindings<Session>,
    config: Config,
    level: u32,
    score: u32,
    lives: u32,
    finished: bool,
}

impl Session {
    /// Starts a session on level one with the configured lives.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            scope: Scope::new(),
            bindings: Bindings::new()
                .on(EventName::Win, Self::on_win)
                .on(EventName::Die, Self::on_die)
                .on(EventName::Hop, Self::on_hop),
            config,
            level: 1,
            score: 0,
            lives: config.lives(),
            finished: false,
        }
    }

    /// Current level, starting at one.
    #[must_use]
    pub const fn level(&self) -> u32 {
        self.level
    }

    /// Current score.
    #[must_use]
    pub const fn score(&self) -> u32 {
        self.score
    }

    /// Remaining lives.
    #[must_use]
    pub const fn lives(&self) -> u32 {
        self.lives
    }

    /// Whether the game-over phase was already requested.
    #[must_use]
    pub const fn is_finished(&self) -> bool {
        self.finished
    }

    fn on_win(&mut self, _signal: &Signal, ctx: &mut Context) -> Result<(), EngineError> {
        if self.finished {
            return Ok(());
        }
        let bonus = self.config.win_bonus.saturating_mul(self.level);
        self.score = self.score.saturating_add(bonus);
        self.level = self.level.saturating_add(1);
        info!(level = self.level, score = self.score, "level cleared");
        self.publish(ctx);
        ctx.post(GameEvent::Reset);
        Ok(())
    }

    fn on_die(&mut self, _signal: &Signal, ctx: &mut Context) -> Result<(), EngineError> {
        if self.finished {
            return Ok(());
        }
        self.lives = self.lives.saturating_sub(1);
        self.publish(ctx);

        if self.lives > 0 {
            ctx.post(GameEvent::Reset);
            return Ok(());
        }

        self.finished = true;
        info!(score = self.score, level = self.level, "game over");
        ctx.request_phase(
            Phase::GameOver,
            Transition::Soft,
            PhaseMessage::new()
                .with_score(self.score)
                .with_level(self.level),
        );
        Ok(())
    }

    fn on_hop(&mut self, signal: &Signal, ctx: &mut Context) -> Result<(), EngineError> {
        if self.finished {
            return Ok(());
        }
        if let Some(GameEvent::Hop { progress: true, .. }) = signal.event() {
            self.score = self.score.saturating_add(self.config.hop_points);
            self.publish(ctx);
        }
        Ok(())
    }

    fn publish(&self, ctx: &mut Context) {
        ctx.post(GameEvent::SessionChanged {
            level: self.level,
            score: self.score,
            lives: self.lives,
        });
    }
}

impl Bound for Session {
    fn bindings(&self) -> &Bindings<Self> {
        &self.bindings
    }
}

impl Controller for Session {
    fn kind(&self) -> ControllerKind {
        ControllerKind::Session
    }

    fn scope(&self) -> &Scope {
        &self.scope
    }

    fn scope_mut(&mut self) -> &mut Scope {
        &mut self.scope
    }

    fn create(&mut self, ctx: &mut Context) -> Result<(), EngineError> {
        self.publish(ctx);
        Ok(())
    }

    fn dispatch(&mut self, signal: &Signal, ctx: &mut Context) -> Result<bool, EngineError> {
        dispatch(self, signal, ctx)
    }
}
