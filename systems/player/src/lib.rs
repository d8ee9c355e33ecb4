#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Player-controlled chicken.
//!
//! The chicken hops one cell per key press and never leaves the board. It
//! checks for collisions once per frame after its entities were ticked: the
//! goal strip ends the attempt with [`GameEvent::Win`], anything else that is
//! collidable with [`GameEvent::Die`]. Once either event is posted the
//! controller ignores input and collisions until the board is reset.

use crossing_core::{
    CellCoord, Colour, ControllerKind, Direction, EventName, GameEvent, ImageKey, Key,
};
use crossing_engine::{dispatch, Bindings, Bound, Context, Controller, EngineError, Signal};
use crossing_world::{EntityId, EntityKind, EntitySpec, Scope};
use glam::Vec2;
use tracing::debug;

/// Image key of the chicken sprite.
pub const PLAYER_IMAGE: &str = "chicken";

const PLAYER_Z: i32 = 5;

/// Controller for the player's chicken.
#[derive(Debug)]
pub struct Player {
    scope: Scope,
    bindings: Bindings<Player>,
    entity: Option<EntityId>,
    cell: CellCoord,
    best_row: u32,
    frozen: bool,
    awaiting_reset: bool,
}

impl Player {
    /// Creates the controller; the chicken is spawned by [`Controller::create`].
    #[must_use]
    pub fn new() -> Self {
        Self {
            scope: Scope::new(),
            bindings: Bindings::new()
                .on(Key::Up, Self::on_move)
                .on(Key::Down, Self::on_move)
                .on(Key::Left, Self::on_move)
                .on(Key::Right, Self::on_move)
                .on(Key::Char('w'), Self::on_move)
                .on(Key::Char('a'), Self::on_move)
                .on(Key::Char('s'), Self::on_move)
                .on(Key::Char('d'), Self::on_move)
                .on(Key::Char('W'), Self::on_move)
                .on(Key::Char('A'), Self::on_move)
                .on(Key::Char('S'), Self::on_move)
                .on(Key::Char('D'), Self::on_move)
                .on(EventName::Reset, Self::on_reset)
                .on(EventName::DisableMovement, Self::on_disable)
                .on(EventName::EnableMovement, Self::on_enable),
            entity: None,
            cell: CellCoord::new(0, 0),
            best_row: 0,
            frozen: false,
            awaiting_reset: false,
        }
    }

    /// Cell currently occupied by the chicken.
    #[must_use]
    pub const fn cell(&self) -> CellCoord {
        self.cell
    }

    /// Entity drawn for the chicken, once created.
    #[must_use]
    pub const fn entity(&self) -> Option<EntityId> {
        self.entity
    }

    /// Whether input is currently ignored.
    #[must_use]
    pub const fn is_frozen(&self) -> bool {
        self.frozen || self.awaiting_reset
    }

    fn on_move(&mut self, signal: &Signal, ctx: &mut Context) -> Result<(), EngineError> {
        if self.is_frozen() {
            return Ok(());
        }
        let Some(direction) = signal.key().and_then(direction_for) else {
            return Ok(());
        };
        let Some(next) = ctx.board.neighbour(self.cell, direction) else {
            return Ok(());
        };

        self.place(ctx, next);
        let progress = next.row() > self.best_row;
        if progress {
            self.best_row = next.row();
        }
        ctx.post(GameEvent::Hop {
            direction,
            progress,
        });
        Ok(())
    }

    fn on_reset(&mut self, _signal: &Signal, ctx: &mut Context) -> Result<(), EngineError> {
        let start = ctx.board.start_cell();
        self.place(ctx, start);
        self.best_row = start.row();
        self.awaiting_reset = false;
        Ok(())
    }

    fn on_disable(&mut self, _signal: &Signal, _ctx: &mut Context) -> Result<(), EngineError> {
        self.frozen = true;
        Ok(())
    }

    fn on_enable(&mut self, _signal: &Signal, _ctx: &mut Context) -> Result<(), EngineError> {
        self.frozen = false;
        Ok(())
    }

    fn place(&mut self, ctx: &mut Context, cell: CellCoord) {
        self.cell = cell;
        let origin = ctx.board.cell_origin(cell);
        if let Some(entity) = self.entity.and_then(|id| ctx.objects.get_mut(id)) {
            entity.set_position(origin);
        }
    }
}

impl Default for Player {
    fn default() -> Self {
        Self::new()
    }
}

impl Bound for Player {
    fn bindings(&self) -> &Bindings<Self> {
        &self.bindings
    }
}

impl Controller for Player {
    fn kind(&self) -> ControllerKind {
        ControllerKind::Player
    }

    fn scope(&self) -> &Scope {
        &self.scope
    }

    fn scope_mut(&mut self) -> &mut Scope {
        &mut self.scope
    }

    fn create(&mut self, ctx: &mut Context) -> Result<(), EngineError> {
        let start = ctx.board.start_cell();
        let spec = EntitySpec::new(
            EntityKind::Player,
            ctx.board.cell_origin(start),
            Vec2::splat(ctx.board.cell_length()),
        )
        .with_image(ImageKey::from(PLAYER_IMAGE))
        .with_placeholder(Colour::WHITE)
        .with_z(PLAYER_Z)
        .collidable();
        self.entity = Some(self.scope.create(&mut ctx.objects, spec));
        self.cell = start;
        self.best_row = start.row();
        Ok(())
    }

    fn dispatch(&mut self, signal: &Signal, ctx: &mut Context) -> Result<bool, EngineError> {
        dispatch(self, signal, ctx)
    }

    fn update(&mut self, ctx: &mut Context) -> Result<(), EngineError> {
        if self.awaiting_reset {
            return Ok(());
        }
        let Some(id) = self.entity else {
            return Ok(());
        };
        let Some(hit) = ctx.objects.collision(id) else {
            return Ok(());
        };

        let event = match hit.kind() {
            EntityKind::Goal => GameEvent::Win,
            EntityKind::Vehicle => GameEvent::Die,
            _ => return Ok(()),
        };
        debug!(hit = hit.id().get(), kind = ?hit.kind(), "player collided");
        ctx.post(event);
        self.awaiting_reset = true;
        Ok(())
    }
}

fn direction_for(key: Key) -> Option<Direction> {
    match key {
        Key::Up => Some(Direction::Up),
        Key::Down => Some(Direction::Down),
        Key::Left => Some(Direction::Left),
        Key::Right => Some(Direction::Right),
        Key::Char(c) => match c.to_ascii_lowercase() {
            'w' => Some(Direction::Up),
            's' => Some(Direction::Down),
            'a' => Some(Direction::Left),
            'd' => Some(Direction::Right),
            _ => None,
        },
        _ => None,
    }
}
