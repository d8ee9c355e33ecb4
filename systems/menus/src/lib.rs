#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Screens around the game: title menu, game-over banner, high-score name
//! entry and the scoreboard.

use crossing_core::{
    Colour, ControllerKind, ImageKey, Key, Phase, PhaseMessage, Transition, Trigger, GAME_TITLE,
};
use crossing_engine::{dispatch, Bindings, Bound, Context, Controller, EngineError, Signal};
use crossing_highscores::{HighScore, HighScoreTable};
use crossing_world::{EntityId, EntitySpec, Scope, TextStyle};
use glam::Vec2;
use tracing::debug;

/// Background image of the title screen.
pub const MENU_IMAGE: &str = "menu";
/// Longest name accepted by the high-score entry.
pub const MAX_NAME_LENGTH: usize = 12;

const TEXT_Z: i32 = 10;
const TITLE_FONT_SIZE: f32 = 28.0;
const BODY_FONT_SIZE: f32 = 20.0;
const ANONYMOUS: &str = "anonymous";

fn spawn_line(
    scope: &mut Scope,
    ctx: &mut Context,
    y: f32,
    content: impl Into<String>,
    font_size: f32,
    colour: Colour,
) -> EntityId {
    let style = TextStyle::new(content, font_size, colour);
    let spec = EntitySpec::centred_text(y, ctx.board.width(), style).with_z(TEXT_Z);
    scope.create(&mut ctx.objects, spec)
}

/// Title screen.
#[derive(Debug)]
pub struct Menu {
    scope: Scope,
    bindings: Bindings<Menu>,
}

impl Menu {
    /// Creates the controller.
    #[must_use]
    pub fn new() -> Self {
        Self {
            scope: Scope::new(),
            bindings: Bindings::new()
                .on(Key::Enter, Self::on_start)
                .on(Key::Char('h'), Self::on_scores),
        }
    }

    fn on_start(&mut self, _signal: &Signal, ctx: &mut Context) -> Result<(), EngineError> {
        ctx.request_phase(Phase::Game, Transition::Hard, PhaseMessage::new());
        Ok(())
    }

    fn on_scores(&mut self, _signal: &Signal, ctx: &mut Context) -> Result<(), EngineError> {
        ctx.request_phase(Phase::HighScores, Transition::Soft, PhaseMessage::new());
        Ok(())
    }
}

impl Default for Menu {
    fn default() -> Self {
        Self::new()
    }
}

impl Bound for Menu {
    fn bindings(&self) -> &Bindings<Self> {
        &self.bindings
    }
}

impl Controller for Menu {
    fn kind(&self) -> ControllerKind {
        ControllerKind::Menu
    }

    fn scope(&self) -> &Scope {
        &self.scope
    }

    fn scope_mut(&mut self) -> &mut Scope {
        &mut self.scope
    }

    fn create(&mut self, ctx: &mut Context) -> Result<(), EngineError> {
        ctx.set_background(Some(ImageKey::from(MENU_IMAGE)));
        let middle = ctx.board.height() / 2.0;
        let _ = spawn_line(
            &mut self.scope,
            ctx,
            middle - 3.0 * TITLE_FONT_SIZE,
            GAME_TITLE,
            TITLE_FONT_SIZE,
            Colour::YELLOW,
        );
        let _ = spawn_line(
            &mut self.scope,
            ctx,
            middle,
            "Press Enter to play",
            BODY_FONT_SIZE,
            Colour::WHITE,
        );
        let _ = spawn_line(
            &mut self.scope,
            ctx,
            middle + 2.0 * BODY_FONT_SIZE,
            "H for high scores, Esc to quit",
            BODY_FONT_SIZE,
            Colour::WHITE,
        );
        Ok(())
    }

    fn dispatch(&mut self, signal: &Signal, ctx: &mut Context) -> Result<bool, EngineError> {
        dispatch(self, signal, ctx)
    }

    fn destroy(&mut self, ctx: &mut Context) -> Result<(), EngineError> {
        ctx.set_background(None);
        let _ = self.scope.purge(&mut ctx.objects, None)?;
        Ok(())
    }
}

/// Final score banner.
#[derive(Debug)]
pub struct GameOver {
    scope: Scope,
    bindings: Bindings<GameOver>,
    score: u32,
    level: u32,
}

impl GameOver {
    /// Creates the banner for the score carried in `message`.
    #[must_use]
    pub fn new(message: &PhaseMessage) -> Self {
        Self {
            scope: Scope::new(),
            bindings: Bindings::new(),
            score: message.score.unwrap_or_default(),
            level: message.level.unwrap_or(1),
        }
    }

    /// Final score.
    #[must_use]
    pub const fn score(&self) -> u32 {
        self.score
    }
}

impl Bound for GameOver {
    fn bindings(&self) -> &Bindings<Self> {
        &self.bindings
    }
}

impl Controller for GameOver {
    fn kind(&self) -> ControllerKind {
        ControllerKind::GameOver
    }

    fn scope(&self) -> &Scope {
        &self.scope
    }

    fn scope_mut(&mut self) -> &mut Scope {
        &mut self.scope
    }

    fn create(&mut self, ctx: &mut Context) -> Result<(), EngineError> {
        let middle = ctx.board.height() / 2.0;
        let _ = spawn_line(
            &mut self.scope,
            ctx,
            middle - 4.0 * TITLE_FONT_SIZE,
            "Game Over",
            TITLE_FONT_SIZE * 1.5,
            Colour::RED,
        );
        let _ = spawn_line(
            &mut self.scope,
            ctx,
            middle - 2.0 * TITLE_FONT_SIZE,
            format!("Score {}  Level {}", self.score, self.level),
            TITLE_FONT_SIZE,
            Colour::YELLOW,
        );
        Ok(())
    }

    fn dispatch(&mut self, signal: &Signal, ctx: &mut Context) -> Result<bool, EngineError> {
        dispatch(self, signal, ctx)
    }
}

/// Collects a name and records the final score.
#[derive(Debug)]
pub struct HighScoreEntry {
    scope: Scope,
    bindings: Bindings<HighScoreEntry>,
    table: HighScoreTable,
    score: u32,
    name: String,
    field: Option<EntityId>,
    saved: bool,
}

impl HighScoreEntry {
    /// Creates the entry for the score carried in `message`.
    #[must_use]
    pub fn new(table: HighScoreTable, message: &PhaseMessage) -> Self {
        Self {
            scope: Scope::new(),
            bindings: Bindings::new()
                .on(Trigger::Text, Self::on_text)
                .on(Key::Backspace, Self::on_backspace)
                .on(Key::Enter, Self::on_submit),
            table,
            score: message.score.unwrap_or_default(),
            name: String::new(),
            field: None,
            saved: false,
        }
    }

    /// Name typed so far.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    fn on_text(&mut self, signal: &Signal, ctx: &mut Context) -> Result<(), EngineError> {
        let Some(Key::Char(c)) = signal.key() else {
            return Ok(());
        };
        if self.saved || c.is_control() || self.name.chars().count() >= MAX_NAME_LENGTH {
            return Ok(());
        }
        self.name.push(c);
        self.refresh(ctx);
        Ok(())
    }

    fn on_backspace(&mut self, _signal: &Signal, ctx: &mut Context) -> Result<(), EngineError> {
        if self.saved {
            return Ok(());
        }
        let _ = self.name.pop();
        self.refresh(ctx);
        Ok(())
    }

    fn on_submit(&mut self, _signal: &Signal, ctx: &mut Context) -> Result<(), EngineError> {
        if self.saved {
            return Ok(());
        }
        let name = if self.name.trim().is_empty() {
            ANONYMOUS
        } else {
            self.name.as_str()
        };
        let entry = HighScore::new(name, self.score);
        self.table
            .append(&entry)
            .map_err(|error| EngineError::controller(ControllerKind::HighScoreEntry, error))?;
        self.saved = true;
        ctx.request_phase(
            Phase::HighScores,
            Transition::Soft,
            PhaseMessage::new().with_score(self.score),
        );
        Ok(())
    }

    fn refresh(&self, ctx: &mut Context) {
        let content = format!("Name: {}_", self.name);
        if let Some(entity) = self.field.and_then(|id| ctx.objects.get_mut(id)) {
            entity.set_text(content);
        }
    }
}

impl Bound for HighScoreEntry {
    fn bindings(&self) -> &Bindings<Self> {
        &self.bindings
    }
}

impl Controller for HighScoreEntry {
    fn kind(&self) -> ControllerKind {
        ControllerKind::HighScoreEntry
    }

    fn scope(&self) -> &Scope {
        &self.scope
    }

    fn scope_mut(&mut self) -> &mut Scope {
        &mut self.scope
    }

    fn create(&mut self, ctx: &mut Context) -> Result<(), EngineError> {
        let middle = ctx.board.height() / 2.0;
        let _ = spawn_line(
            &mut self.scope,
            ctx,
            middle,
            "Type your name, Enter to save",
            BODY_FONT_SIZE,
            Colour::WHITE,
        );
        let style = TextStyle::new("Name: _", BODY_FONT_SIZE, Colour::YELLOW);
        let x = ctx.board.width() / 4.0;
        let spec = EntitySpec::text(Vec2::new(x, middle + 2.0 * BODY_FONT_SIZE), style)
            .with_z(TEXT_Z);
        self.field = Some(self.scope.create(&mut ctx.objects, spec));
        Ok(())
    }

    fn dispatch(&mut self, signal: &Signal, ctx: &mut Context) -> Result<bool, EngineError> {
        dispatch(self, signal, ctx)
    }
}

/// The ten best recorded scores.
#[derive(Debug)]
pub struct Scoreboard {
    scope: Scope,
    bindings: Bindings<Scoreboard>,
    table: HighScoreTable,
    scores: Vec<HighScore>,
}

impl Scoreboard {
    /// Creates the controller; the file is read by [`Controller::create`].
    #[must_use]
    pub fn new(table: HighScoreTable) -> Self {
        Self {
            scope: Scope::new(),
            bindings: Bindings::new().on(Key::Enter, Self::on_back),
            table,
            scores: Vec::new(),
        }
    }

    /// Scores currently listed.
    #[must_use]
    pub fn scores(&self) -> &[HighScore] {
        &self.scores
    }

    fn on_back(&mut self, _signal: &Signal, ctx: &mut Context) -> Result<(), EngineError> {
        ctx.request_phase(Phase::Menu, Transition::Soft, PhaseMessage::new());
        Ok(())
    }
}

impl Bound for Scoreboard {
    fn bindings(&self) -> &Bindings<Self> {
        &self.bindings
    }
}

impl Controller for Scoreboard {
    fn kind(&self) -> ControllerKind {
        ControllerKind::Scoreboard
    }

    fn scope(&self) -> &Scope {
        &self.scope
    }

    fn scope_mut(&mut self) -> &mut Scope {
        &mut self.scope
    }

    fn create(&mut self, ctx: &mut Context) -> Result<(), EngineError> {
        self.scores = self
            .table
            .top()
            .map_err(|error| EngineError::controller(ControllerKind::Scoreboard, error))?;

        let mut y = ctx.board.top_margin() + TITLE_FONT_SIZE;
        let _ = spawn_line(
            &mut self.scope,
            ctx,
            y,
            "High Scores",
            TITLE_FONT_SIZE,
            Colour::YELLOW,
        );
        y += 2.0 * TITLE_FONT_SIZE;

        if self.scores.is_empty() {
            let _ = spawn_line(
                &mut self.scope,
                ctx,
                y,
                "No scores yet",
                BODY_FONT_SIZE,
                Colour::WHITE,
            );
        }
        for (rank, entry) in self.scores.iter().enumerate() {
            let line = format!("{:>2}. {:<12} {:>6}", rank + 1, entry.name(), entry.score());
            let _ = spawn_line(&mut self.scope, ctx, y, line, BODY_FONT_SIZE, Colour::WHITE);
            y += BODY_FONT_SIZE * 1.2;
        }

        debug!(
            rows = self.scores.len(),
            path = %self.table.path().display(),
            "scoreboard loaded"
        );
        Ok(())
    }

    fn dispatch(&mut self, signal: &Signal, ctx: &mut Context) -> Result<bool, EngineError> {
        dispatch(self, signal, ctx)
    }
}
