#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Crossing game.
//!
//! This crate defines the vocabulary that connects the entity world, the
//! engine loop, the controllers and the adapters. Adapters feed [`Key`]
//! presses into the engine, controllers react to them through binding tables
//! keyed by [`Trigger`], and cross-controller effects travel as
//! [`GameEvent`] values posted to the engine's event bus. Game phases are
//! described by [`Phase`] and the [`ControllerKind`] values that make them up.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Title shown by the window and the main menu.
pub const GAME_TITLE: &str = "Why Did The Chicken Cross The Road?";

/// Top-level game phases. Exactly one phase is active at a time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    /// Title screen.
    Menu,
    /// Active play.
    Game,
    /// Final score display and name entry.
    GameOver,
    /// High-score table.
    HighScores,
}

/// Identifies a controller type so phases can be described declaratively.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ControllerKind {
    /// Title screen controller.
    Menu,
    /// Session bookkeeping: level, score and lives.
    Session,
    /// Player-controlled chicken.
    Player,
    /// Traffic lanes and goal strip.
    Level,
    /// Score, level and lives text.
    ScoreText,
    /// Transient win/die banners.
    Popup,
    /// Frames-per-second readout.
    FpsCounter,
    /// Final score banner.
    GameOver,
    /// Name entry that records a high score.
    HighScoreEntry,
    /// High-score table.
    Scoreboard,
}

/// How aggressively a phase change replaces running controllers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Transition {
    /// Keep controllers whose kind appears in both phases.
    Soft,
    /// Destroy every controller and create the destination set from scratch.
    Hard,
}

/// Payload handed to controllers created by a phase change.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseMessage {
    /// Phase that was requested, filled in by the engine.
    pub phase: Option<Phase>,
    /// Final score carried over from the previous phase, if any.
    pub score: Option<u32>,
    /// Level reached in the previous phase, if any.
    pub level: Option<u32>,
}

impl PhaseMessage {
    /// Creates an empty message.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            phase: None,
            score: None,
            level: None,
        }
    }

    /// Attaches a score to the message.
    #[must_use]
    pub const fn with_score(mut self, score: u32) -> Self {
        self.score = Some(score);
        self
    }

    /// Attaches a level to the message.
    #[must_use]
    pub const fn with_level(mut self, level: u32) -> Self {
        self.level = Some(level);
        self
    }
}

/// Cardinal hop directions available to the player.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Toward the goal row.
    Up,
    /// Toward the start row.
    Down,
    /// Toward decreasing columns.
    Left,
    /// Toward increasing columns.
    Right,
}

impl Direction {
    /// Column and row deltas for a single hop. Rows count upward from the
    /// start row.
    #[must_use]
    pub const fn offset(self) -> (i32, i32) {
        match self {
            Self::Up => (0, 1),
            Self::Down => (0, -1),
            Self::Left => (-1, 0),
            Self::Right => (1, 0),
        }
    }
}

/// Keyboard input understood by the engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Key {
    /// Up arrow.
    Up,
    /// Down arrow.
    Down,
    /// Left arrow.
    Left,
    /// Right arrow.
    Right,
    /// Return / Enter.
    Enter,
    /// Escape, globally bound to quitting.
    Escape,
    /// Backspace.
    Backspace,
    /// F12, globally bound to fullscreen toggling.
    F12,
    /// A printable character, as typed.
    Char(char),
}

/// Names of the events that can travel over the event bus.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventName {
    /// See [`GameEvent::Win`].
    Win,
    /// See [`GameEvent::Die`].
    Die,
    /// See [`GameEvent::Hop`].
    Hop,
    /// See [`GameEvent::Reset`].
    Reset,
    /// See [`GameEvent::SessionChanged`].
    SessionChanged,
    /// See [`GameEvent::DisableMovement`].
    DisableMovement,
    /// See [`GameEvent::EnableMovement`].
    EnableMovement,
}

/// Events posted by controllers and delivered on the next dispatch pass.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    /// The player touched the goal.
    Win,
    /// The player touched an obstacle.
    Die,
    /// The player hopped one cell.
    Hop {
        /// Direction of the hop.
        direction: Direction,
        /// Whether the hop reached a new maximum row for the current attempt.
        progress: bool,
    },
    /// Soft reset of the board after a win or a lost life.
    Reset,
    /// Session state changed.
    SessionChanged {
        /// Current level, starting at one.
        level: u32,
        /// Current score.
        score: u32,
        /// Remaining lives.
        lives: u32,
    },
    /// Freeze player input.
    DisableMovement,
    /// Unfreeze player input.
    EnableMovement,
}

impl GameEvent {
    /// Name used to look the event up in binding tables.
    #[must_use]
    pub const fn name(&self) -> EventName {
        match self {
            Self::Win => EventName::Win,
            Self::Die => EventName::Die,
            Self::Hop { .. } => EventName::Hop,
            Self::Reset => EventName::Reset,
            Self::SessionChanged { .. } => EventName::SessionChanged,
            Self::DisableMovement => EventName::DisableMovement,
            Self::EnableMovement => EventName::EnableMovement,
        }
    }
}

/// Anything a controller can bind a handler to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Trigger {
    /// A specific key press.
    Key(Key),
    /// Any printable character.
    Text,
    /// A named event drained from the bus.
    Event(EventName),
}

impl From<Key> for Trigger {
    fn from(key: Key) -> Self {
        Self::Key(key)
    }
}

impl From<EventName> for Trigger {
    fn from(name: EventName) -> Self {
        Self::Event(name)
    }
}

/// Axis-aligned rectangle in screen pixels, origin at the top-left.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct Rect {
    /// Left edge.
    pub x: f32,
    /// Top edge.
    pub y: f32,
    /// Width.
    pub width: f32,
    /// Height.
    pub height: f32,
}

impl Rect {
    /// Creates a rectangle from its top-left corner and dimensions.
    #[must_use]
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Creates a rectangle anchored at `position` with the provided size.
    #[must_use]
    pub fn from_position_and_size(position: Vec2, size: Vec2) -> Self {
        Self::new(position.x, position.y, size.x, size.y)
    }

    /// Left edge.
    #[must_use]
    pub const fn left(&self) -> f32 {
        self.x
    }

    /// Right edge.
    #[must_use]
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    /// Top edge.
    #[must_use]
    pub const fn top(&self) -> f32 {
        self.y
    }

    /// Bottom edge.
    #[must_use]
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Overlapping region of two rectangles, if it has non-zero area.
    ///
    /// Rectangles that merely share an edge or a corner do not intersect.
    #[must_use]
    pub fn intersection(&self, other: &Rect) -> Option<Rect> {
        let left = self.left().max(other.left());
        let right = self.right().min(other.right());
        let top = self.top().max(other.top());
        let bottom = self.bottom().min(other.bottom());

        if right > left && bottom > top {
            Some(Rect::new(left, top, right - left, bottom - top))
        } else {
            None
        }
    }

    /// Returns `true` when the rectangles overlap with non-zero area.
    #[must_use]
    pub fn intersects(&self, other: &Rect) -> bool {
        self.intersection(other).is_some()
    }
}

/// RGBA colour with byte channels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Colour {
    red: u8,
    green: u8,
    blue: u8,
    alpha: u8,
}

impl Colour {
    /// Opaque black.
    pub const BLACK: Colour = Colour::from_rgb(0, 0, 0);
    /// Opaque white.
    pub const WHITE: Colour = Colour::from_rgb(255, 255, 255);
    /// Opaque red.
    pub const RED: Colour = Colour::from_rgb(255, 0, 0);
    /// Opaque green.
    pub const GREEN: Colour = Colour::from_rgb(0, 255, 0);
    /// Opaque blue.
    pub const BLUE: Colour = Colour::from_rgb(0, 0, 255);
    /// Opaque yellow, the default placeholder colour.
    pub const YELLOW: Colour = Colour::from_rgb(255, 255, 0);

    /// Creates an opaque colour from byte RGB components.
    #[must_use]
    pub const fn from_rgb(red: u8, green: u8, blue: u8) -> Self {
        Self::from_rgba(red, green, blue, 255)
    }

    /// Creates a colour from byte RGBA components.
    #[must_use]
    pub const fn from_rgba(red: u8, green: u8, blue: u8, alpha: u8) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Red component.
    #[must_use]
    pub const fn red(&self) -> u8 {
        self.red
    }

    /// Green component.
    #[must_use]
    pub const fn green(&self) -> u8 {
        self.green
    }

    /// Blue component.
    #[must_use]
    pub const fn blue(&self) -> u8 {
        self.blue
    }

    /// Alpha component.
    #[must_use]
    pub const fn alpha(&self) -> u8 {
        self.alpha
    }
}

/// Key of an image asset, resolved by the rendering adapter's manifest.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ImageKey(String);

impl ImageKey {
    /// Creates a new image key.
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Borrowed key text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ImageKey {
    fn from(key: &str) -> Self {
        Self::new(key)
    }
}

/// Location of a board cell. Rows count upward from the start row.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellCoord {
    column: u32,
    row: u32,
}

impl CellCoord {
    /// Creates a new cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row, zero being the start row.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }
}

/// Geometry of the playing field.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Board {
    columns: u32,
    rows: u32,
    cell_length: f32,
    top_margin: f32,
}

impl Board {
    /// Default number of columns.
    pub const DEFAULT_COLUMNS: u32 = 15;
    /// Default number of rows, including the start and goal rows.
    pub const DEFAULT_ROWS: u32 = 12;
    /// Default cell edge length in pixels.
    pub const DEFAULT_CELL_LENGTH: f32 = 32.0;
    /// Default space reserved above the board for the HUD.
    pub const DEFAULT_TOP_MARGIN: f32 = 32.0;

    /// Creates a board description.
    #[must_use]
    pub const fn new(columns: u32, rows: u32, cell_length: f32, top_margin: f32) -> Self {
        Self {
            columns,
            rows,
            cell_length,
            top_margin,
        }
    }

    /// Number of columns.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of rows.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Edge length of a single cell in pixels.
    #[must_use]
    pub const fn cell_length(&self) -> f32 {
        self.cell_length
    }

    /// Space reserved above the board.
    #[must_use]
    pub const fn top_margin(&self) -> f32 {
        self.top_margin
    }

    /// Screen width in pixels.
    #[must_use]
    pub fn width(&self) -> f32 {
        self.columns as f32 * self.cell_length
    }

    /// Screen height in pixels, including the top margin.
    #[must_use]
    pub fn height(&self) -> f32 {
        self.top_margin + self.rows as f32 * self.cell_length
    }

    /// Row holding the goal strip.
    #[must_use]
    pub const fn goal_row(&self) -> u32 {
        self.rows.saturating_sub(1)
    }

    /// Cell the player starts from: the middle of the bottom row.
    #[must_use]
    pub const fn start_cell(&self) -> CellCoord {
        CellCoord::new(self.columns / 2, 0)
    }

    /// Returns `true` when the cell lies on the board.
    #[must_use]
    pub const fn contains(&self, cell: CellCoord) -> bool {
        cell.column() < self.columns && cell.row() < self.rows
    }

    /// Neighbouring cell in the provided direction, if it lies on the board.
    #[must_use]
    pub fn neighbour(&self, cell: CellCoord, direction: Direction) -> Option<CellCoord> {
        let (column_delta, row_delta) = direction.offset();
        let column = cell.column().checked_add_signed(column_delta)?;
        let row = cell.row().checked_add_signed(row_delta)?;
        let next = CellCoord::new(column, row);
        self.contains(next).then_some(next)
    }

    /// Screen-space y coordinate of the top of the provided row.
    #[must_use]
    pub fn row_top(&self, row: u32) -> f32 {
        let from_top = self.rows.saturating_sub(1).saturating_sub(row);
        self.top_margin + from_top as f32 * self.cell_length
    }

    /// Screen-space top-left corner of the provided cell.
    #[must_use]
    pub fn cell_origin(&self, cell: CellCoord) -> Vec2 {
        Vec2::new(
            cell.column() as f32 * self.cell_length,
            self.row_top(cell.row()),
        )
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new(
            Self::DEFAULT_COLUMNS,
            Self::DEFAULT_ROWS,
            Self::DEFAULT_CELL_LENGTH,
            Self::DEFAULT_TOP_MARGIN,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn touching_rectangles_do_not_intersect() {
        let left = Rect::new(0.0, 0.0, 32.0, 32.0);
        let right = Rect::new(32.0, 0.0, 32.0, 32.0);
        let below = Rect::new(0.0, 32.0, 32.0, 32.0);

        assert!(!left.intersects(&right));
        assert!(!left.intersects(&below));
    }

    #[test]
    fn overlapping_rectangles_report_overlap_region() {
        let first = Rect::new(0.0, 0.0, 32.0, 32.0);
        let second = Rect::new(16.0, 8.0, 32.0, 32.0);

        assert_eq!(
            first.intersection(&second),
            Some(Rect::new(16.0, 8.0, 16.0, 24.0))
        );
        assert_eq!(first.intersection(&second), second.intersection(&first));
    }

    #[test]
    fn neighbour_is_clamped_to_board() {
        let board = Board::new(3, 4, 32.0, 0.0);

        assert_eq!(board.neighbour(CellCoord::new(0, 0), Direction::Left), None);
        assert_eq!(board.neighbour(CellCoord::new(0, 0), Direction::Down), None);
        assert_eq!(board.neighbour(CellCoord::new(1, 3), Direction::Up), None);
        assert_eq!(board.neighbour(CellCoord::new(2, 1), Direction::Right), None);
        assert_eq!(
            board.neighbour(CellCoord::new(1, 1), Direction::Up),
            Some(CellCoord::new(1, 2))
        );
    }

    #[test]
    fn rows_are_counted_upward_from_the_start_row() {
        let board = Board::new(5, 4, 10.0, 20.0);

        assert_eq!(board.row_top(0), 50.0);
        assert_eq!(board.row_top(3), 20.0);
        assert_eq!(board.cell_origin(CellCoord::new(2, 1)), Vec2::new(20.0, 40.0));
        assert_eq!(board.height(), 60.0);
    }

    #[test]
    fn event_names_match_variants() {
        let hop = GameEvent::Hop {
            direction: Direction::Up,
            progress: true,
        };
        assert_eq!(hop.name(), EventName::Hop);
        assert_eq!(GameEvent::Reset.name(), EventName::Reset);
        assert_eq!(Trigger::from(EventName::Win), Trigger::Event(EventName::Win));
    }

    #[test]
    fn phase_message_round_trips_through_toml() {
        let message = PhaseMessage {
            phase: Some(Phase::GameOver),
            ..PhaseMessage::new().with_score(420).with_level(3)
        };
        let text = toml::to_string(&message).expect("serialize");
        let restored: PhaseMessage = toml::from_str(&text).expect("deserialize");
        assert_eq!(restored, message);
    }

    #[test]
    fn game_events_round_trip_through_toml() {
        #[derive(Debug, PartialEq, Serialize, Deserialize)]
        struct Carrier {
            event: GameEvent,
        }

        let events = [
            GameEvent::Win,
            GameEvent::Hop {
                direction: Direction::Left,
                progress: true,
            },
            GameEvent::SessionChanged {
                level: 2,
                score: 150,
                lives: 1,
            },
        ];
        for event in events {
            let carrier = Carrier { event };
            let text = toml::to_string(&carrier).expect("serialize");
            let restored: Carrier = toml::from_str(&text).expect("deserialize");
            assert_eq!(restored, carrier);
        }
    }
}
