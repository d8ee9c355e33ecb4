#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Level controller: the goal strip and the lanes of wrapping traffic.
//!
//! Lanes are described by a static [`LaneSpec`] table. Every time the board
//! is reset the vehicles are purged and regenerated: each lane draws one
//! delay per vehicle from its range and accumulates them, so vehicles in a
//! lane queue up behind each other off screen and drive in one after the
//! other. Odd rows drive right, even rows drive left.

use crossing_core::{Board, Colour, ControllerKind, EventName, GameEvent, ImageKey};
use crossing_engine::{dispatch, Bindings, Bound, Context, Controller, EngineError, Signal};
use crossing_world::{EntityId, EntityKind, EntitySpec, Scope, Wrap};
use glam::Vec2;
use rand::{seq::SliceRandom, Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::debug;

/// Background image drawn behind the road.
pub const ROAD_IMAGE: &str = "road";
/// Image of the goal strip.
pub const GOAL_IMAGE: &str = "goal";

const GOAL_Z: i32 = 0;
const VEHICLE_Z: i32 = 1;

/// One lane of traffic.
#[derive(Clone, Debug, PartialEq)]
pub struct LaneSpec {
    row: u32,
    count: u32,
    delay: (u32, u32),
    speed: f32,
    images: Vec<ImageKey>,
    width: f32,
}

impl LaneSpec {
    /// Describes a lane on `row` holding `count` vehicles of `width` pixels.
    ///
    /// `delay` is the inclusive range each vehicle adds to the accumulated
    /// spawn delay, `speed` multiplies the configured base speed and one of
    /// `images` is picked per vehicle.
    #[must_use]
    pub fn new(
        row: u32,
        count: u32,
        delay: (u32, u32),
        speed: f32,
        images: Vec<ImageKey>,
        width: f32,
    ) -> Self {
        let (low, high) = delay;
        Self {
            row,
            count,
            delay: (low.min(high), low.max(high)),
            speed,
            images,
            width,
        }
    }

    /// Board row of the lane.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Number of vehicles in the lane.
    #[must_use]
    pub const fn count(&self) -> u32 {
        self.count
    }

    /// Inclusive delay range added per vehicle.
    #[must_use]
    pub const fn delay(&self) -> (u32, u32) {
        self.delay
    }

    /// Multiplier applied to the base speed.
    #[must_use]
    pub const fn speed(&self) -> f32 {
        self.speed
    }

    /// Candidate vehicle images.
    #[must_use]
    pub fn images(&self) -> &[ImageKey] {
        &self.images
    }

    /// Vehicle width in pixels.
    #[must_use]
    pub const fn width(&self) -> f32 {
        self.width
    }

    /// Whether vehicles enter from the left edge and drive right.
    #[must_use]
    pub const fn drives_right(&self) -> bool {
        self.row % 2 == 1
    }
}

/// Lanes used by the default level: ten rows of traffic between the start
/// row and the goal strip, with a quiet verge in the middle.
#[must_use]
pub fn standard_lanes() -> Vec<LaneSpec> {
    let cars = || vec![ImageKey::from("car_red"), ImageKey::from("car_blue")];
    let trucks = || vec![ImageKey::from("truck")];
    vec![
        LaneSpec::new(1, 3, (2, 5), 1.0, cars(), 32.0),
        LaneSpec::new(2, 2, (3, 6), 0.8, trucks(), 64.0),
        LaneSpec::new(3, 4, (1, 3), 1.3, cars(), 32.0),
        LaneSpec::new(4, 3, (2, 4), 1.1, cars(), 32.0),
        LaneSpec::new(5, 2, (3, 5), 0.7, trucks(), 64.0),
        LaneSpec::new(7, 3, (2, 5), 1.5, cars(), 32.0),
        LaneSpec::new(8, 2, (4, 6), 0.9, trucks(), 64.0),
        LaneSpec::new(9, 4, (1, 4), 1.2, cars(), 32.0),
        LaneSpec::new(10, 3, (2, 3), 1.6, cars(), 32.0),
    ]
}

/// Configuration for the level controller.
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    seed: u64,
    base_speed: f32,
    spacing: f32,
    level_speedup: f32,
    lanes: Vec<LaneSpec>,
}

impl Config {
    /// Base vehicle speed in pixels per second.
    pub const DEFAULT_BASE_SPEED: f32 = 60.0;
    /// Pixels between vehicles per unit of accumulated delay.
    pub const DEFAULT_SPACING: f32 = 64.0;
    /// Fractional speed increase per level above the first.
    pub const DEFAULT_LEVEL_SPEEDUP: f32 = 0.1;

    /// Creates a configuration with the default speeds.
    #[must_use]
    pub fn new(seed: u64, lanes: Vec<LaneSpec>) -> Self {
        Self {
            seed,
            base_speed: Self::DEFAULT_BASE_SPEED,
            spacing: Self::DEFAULT_SPACING,
            level_speedup: Self::DEFAULT_LEVEL_SPEEDUP,
            lanes,
        }
    }

    /// Overrides the base speed and the per-level speed-up.
    #[must_use]
    pub fn with_speeds(mut self, base_speed: f32, level_speedup: f32) -> Self {
        self.base_speed = base_speed;
        self.level_speedup = level_speedup;
        self
    }

    /// Seed of the vehicle generator.
    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }

    /// Lane table.
    #[must_use]
    pub fn lanes(&self) -> &[LaneSpec] {
        &self.lanes
    }

    /// Speed of a vehicle in `lane` at `level`, in pixels per second.
    #[must_use]
    pub fn lane_speed(&self, lane: &LaneSpec, level: u32) -> f32 {
        let level_factor = 1.0 + self.level_speedup * level.saturating_sub(1) as f32;
        self.base_speed * lane.speed() * level_factor
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(0, standard_lanes())
    }
}

/// Draws the accumulated spawn delay of every vehicle in `lane`.
///
/// Each vehicle adds a value from the lane's inclusive delay range to the
/// running total, so with a positive minimum the delays strictly increase.
pub fn lane_delays<R: Rng>(rng: &mut R, lane: &LaneSpec) -> Vec<u32> {
    let (low, high) = lane.delay();
    let mut total = 0_u32;
    (0..lane.count())
        .map(|_| {
            total = total.saturating_add(rng.gen_range(low..=high));
            total
        })
        .collect()
}

/// Where a vehicle starts and how it moves.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Placement {
    /// Top-left corner, off screen.
    pub position: Vec2,
    /// Horizontal velocity in pixels per second.
    pub velocity: Vec2,
}

/// Starting position and velocity of a vehicle with accumulated `delay`.
#[must_use]
pub fn place_vehicle(
    board: &Board,
    config: &Config,
    lane: &LaneSpec,
    delay: u32,
    level: u32,
) -> Placement {
    let speed = config.lane_speed(lane, level);
    let offset = delay as f32 * config.spacing;
    let y = board.row_top(lane.row());
    if lane.drives_right() {
        Placement {
            position: Vec2::new(-lane.width() - offset, y),
            velocity: Vec2::new(speed, 0.0),
        }
    } else {
        Placement {
            position: Vec2::new(board.width() + lane.width() + offset, y),
            velocity: Vec2::new(-speed, 0.0),
        }
    }
}

/// Wrap shared by every vehicle of a lane with the given accumulated delays.
///
/// The off-screen gap covers the longest start offset, so the whole queue
/// recirculates with its original spacing.
#[must_use]
pub fn lane_wrap(board: &Board, config: &Config, delays: &[u32]) -> Wrap {
    let longest = delays.iter().copied().max().unwrap_or(0);
    Wrap::within(board.width()).with_gap(longest as f32 * config.spacing)
}

/// Controller owning the goal strip and the traffic.
#[derive(Debug)]
pub struct Level {
    scope: Scope,
    bindings: Bindings<Level>,
    config: Config,
    rng: ChaCha8Rng,
    level: u32,
    goal: Option<EntityId>,
}

impl Level {
    /// Creates the controller; entities are spawned by [`Controller::create`].
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            scope: Scope::new(),
            bindings: Bindings::new()
                .on(EventName::Reset, Self::on_reset)
                .on(EventName::SessionChanged, Self::on_session_changed),
            rng: ChaCha8Rng::seed_from_u64(config.seed()),
            config,
            level: 1,
            goal: None,
        }
    }

    /// Level the traffic speed is currently scaled for.
    #[must_use]
    pub const fn level(&self) -> u32 {
        self.level
    }

    /// The goal strip entity, once created.
    #[must_use]
    pub const fn goal(&self) -> Option<EntityId> {
        self.goal
    }

    fn on_reset(&mut self, _signal: &Signal, ctx: &mut Context) -> Result<(), EngineError> {
        self.spawn_traffic(ctx)
    }

    fn on_session_changed(
        &mut self,
        signal: &Signal,
        _ctx: &mut Context,
    ) -> Result<(), EngineError> {
        if let Some(GameEvent::SessionChanged { level, .. }) = signal.event() {
            self.level = (*level).max(1);
        }
        Ok(())
    }

    fn spawn_traffic(&mut self, ctx: &mut Context) -> Result<(), EngineError> {
        let removed = self
            .scope
            .purge(&mut ctx.objects, Some(EntityKind::Vehicle))?;

        let mut spawned = 0_usize;
        for lane in self.config.lanes() {
            let size = Vec2::new(lane.width(), ctx.board.cell_length());
            let delays = lane_delays(&mut self.rng, lane);
            let wrap = lane_wrap(&ctx.board, &self.config, &delays);
            for delay in delays {
                let placement = place_vehicle(&ctx.board, &self.config, lane, delay, self.level);
                let mut spec = EntitySpec::new(EntityKind::Vehicle, placement.position, size)
                    .with_velocity(placement.velocity)
                    .wrapping(wrap)
                    .with_placeholder(Colour::RED)
                    .with_z(VEHICLE_Z)
                    .collidable();
                if let Some(image) = lane.images().choose(&mut self.rng) {
                    spec = spec.with_image(image.clone());
                }
                let _ = self.scope.create(&mut ctx.objects, spec);
                spawned += 1;
            }
        }

        debug!(removed, spawned, level = self.level, "traffic regenerated");
        Ok(())
    }
}

impl Bound for Level {
    fn bindings(&self) -> &Bindings<Self> {
        &self.bindings
    }
}

impl Controller for Level {
    fn kind(&self) -> ControllerKind {
        ControllerKind::Level
    }

    fn scope(&self) -> &Scope {
        &self.scope
    }

    fn scope_mut(&mut self) -> &mut Scope {
        &mut self.scope
    }

    fn create(&mut self, ctx: &mut Context) -> Result<(), EngineError> {
        ctx.set_background(Some(ImageKey::from(ROAD_IMAGE)));
        let board = ctx.board;
        let goal = EntitySpec::new(
            EntityKind::Goal,
            Vec2::new(0.0, board.row_top(board.goal_row())),
            Vec2::new(board.width(), board.cell_length()),
        )
        .with_image(ImageKey::from(GOAL_IMAGE))
        .with_placeholder(Colour::GREEN)
        .with_z(GOAL_Z)
        .collidable();
        self.goal = Some(self.scope.create(&mut ctx.objects, goal));
        self.spawn_traffic(ctx)
    }

    fn dispatch(&mut self, signal: &Signal, ctx: &mut Context) -> Result<bool, EngineError> {
        dispatch(self, signal, ctx)
    }

    fn destroy(&mut self, ctx: &mut Context) -> Result<(), EngineError> {
        ctx.set_background(None);
        let _ = self.scope.purge(&mut ctx.objects, None)?;
        self.goal = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reversed_delay_range_is_normalised() {
        let lane = LaneSpec::new(1, 2, (5, 2), 1.0, Vec::new(), 32.0);

        assert_eq!(lane.delay(), (2, 5));
    }

    #[test]
    fn speed_grows_with_level() {
        let config = Config::default();
        let lane = LaneSpec::new(1, 1, (1, 1), 2.0, Vec::new(), 32.0);

        assert!((config.lane_speed(&lane, 1) - 120.0).abs() < 1e-4);
        assert!((config.lane_speed(&lane, 3) - 144.0).abs() < 1e-4);
    }

    #[test]
    fn standard_lanes_stay_between_start_and_goal() {
        let board = Board::default();

        for lane in standard_lanes() {
            assert!(lane.row() > 0);
            assert!(lane.row() < board.goal_row());
        }
    }
}
