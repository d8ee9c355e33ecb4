//! Entity model built from optional capability components.

use std::time::Duration;

use crossing_core::{Colour, ImageKey, Rect};
use glam::Vec2;

/// Unique identifier assigned to an entity by the registry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(u64);

impl EntityId {
    /// Creates an identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u64 {
        self.0
    }
}

/// Role an entity plays on the board, used by collision handling and purge filters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EntityKind {
    /// The player-controlled chicken.
    Player,
    /// Traffic that kills the player on contact.
    Vehicle,
    /// Strip that wins the level on contact.
    Goal,
    /// On-screen text.
    Text,
    /// Purely visual element.
    Decoration,
}

/// Velocity component for movable entities, in pixels per second.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct Motion {
    velocity: Vec2,
}

impl Motion {
    /// Creates a motion component with the provided velocity.
    #[must_use]
    pub const fn new(velocity: Vec2) -> Self {
        Self { velocity }
    }

    /// Current velocity.
    #[must_use]
    pub const fn velocity(&self) -> Vec2 {
        self.velocity
    }
}

/// Horizontal wrap-around component.
///
/// Once the entity's rectangle has fully left `0.0..span` in its direction of
/// travel, it moves back by one cycle: the span, its own width and an
/// optional off-screen gap. Distance travelled past the edge is kept, so
/// entities sharing a velocity and a cycle keep their spacing forever.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Wrap {
    span: f32,
    gap: f32,
}

impl Wrap {
    /// Wraps within a visible width of `span` pixels.
    #[must_use]
    pub const fn within(span: f32) -> Self {
        Self { span, gap: 0.0 }
    }

    /// Adds `gap` pixels of off-screen travel to every cycle.
    #[must_use]
    pub const fn with_gap(self, gap: f32) -> Self {
        Self { gap, ..self }
    }

    /// Visible width the entity wraps around.
    #[must_use]
    pub const fn span(&self) -> f32 {
        self.span
    }

    /// Off-screen travel added to every cycle.
    #[must_use]
    pub const fn gap(&self) -> f32 {
        self.gap
    }

    /// Distance between two consecutive appearances of an entity `width`
    /// pixels wide.
    #[must_use]
    pub fn cycle(&self, width: f32) -> f32 {
        self.span + width + self.gap.max(0.0)
    }
}

/// Text content rendered in place of an image.
#[derive(Clone, Debug, PartialEq)]
pub struct TextStyle {
    /// Text to display.
    pub content: String,
    /// Font size in pixels.
    pub font_size: f32,
    /// Text colour.
    pub colour: Colour,
}

impl TextStyle {
    /// Creates a text style.
    #[must_use]
    pub fn new(content: impl Into<String>, font_size: f32, colour: Colour) -> Self {
        Self {
            content: content.into(),
            font_size,
            colour,
        }
    }

    /// Rough rendered width, assuming glyphs half as wide as they are tall.
    #[must_use]
    pub fn estimated_width(&self) -> f32 {
        self.content.chars().count() as f32 * self.font_size * 0.5
    }
}

/// Visual configuration resolved when the entity is constructed.
#[derive(Clone, Debug, PartialEq)]
pub struct Appearance {
    /// Image drawn for the entity, if any.
    pub image: Option<ImageKey>,
    /// Colour of the rectangle drawn when no image is available.
    pub placeholder: Colour,
    /// Text drawn instead of an image, if any.
    pub text: Option<TextStyle>,
}

impl Default for Appearance {
    fn default() -> Self {
        Self {
            image: None,
            placeholder: Colour::YELLOW,
            text: None,
        }
    }
}

/// Renderable description of an entity.
#[derive(Clone, Debug, PartialEq)]
pub enum Drawable {
    /// Image lookup, with the colour to fall back to if the asset is absent.
    Image {
        /// Image to draw.
        key: ImageKey,
        /// Size the image is stretched to.
        size: Vec2,
        /// Placeholder colour used by adapters that cannot resolve the image.
        fallback: Colour,
    },
    /// Solid rectangle sized to the entity.
    Placeholder {
        /// Fill colour.
        colour: Colour,
        /// Rectangle size.
        size: Vec2,
    },
    /// Text run.
    Text(TextStyle),
}

/// Blueprint consumed by [`crate::Scope::create`].
#[derive(Clone, Debug, PartialEq)]
pub struct EntitySpec {
    kind: EntityKind,
    position: Vec2,
    size: Vec2,
    z: i32,
    visible: bool,
    appearance: Appearance,
    motion: Option<Motion>,
    collidable: bool,
    wrap: Option<Wrap>,
}

impl EntitySpec {
    /// Starts a blueprint for a static, visible, non-collidable entity.
    #[must_use]
    pub fn new(kind: EntityKind, position: Vec2, size: Vec2) -> Self {
        Self {
            kind,
            position,
            size,
            z: 0,
            visible: true,
            appearance: Appearance::default(),
            motion: None,
            collidable: false,
            wrap: None,
        }
    }

    /// Starts a blueprint for a text entity.
    #[must_use]
    pub fn text(position: Vec2, style: TextStyle) -> Self {
        let size = Vec2::new(0.0, style.font_size);
        Self::new(EntityKind::Text, position, size).with_text(style)
    }

    /// Starts a text blueprint horizontally centred within `span` pixels.
    #[must_use]
    pub fn centred_text(y: f32, span: f32, style: TextStyle) -> Self {
        let x = ((span - style.estimated_width()) / 2.0).max(0.0);
        Self::text(Vec2::new(x, y), style)
    }

    /// Sets the draw-order index. Higher values are drawn later.
    #[must_use]
    pub fn with_z(mut self, z: i32) -> Self {
        self.z = z;
        self
    }

    /// Adds a motion component.
    #[must_use]
    pub fn with_velocity(mut self, velocity: Vec2) -> Self {
        self.motion = Some(Motion::new(velocity));
        self
    }

    /// Makes the entity visible to collision checks.
    #[must_use]
    pub fn collidable(mut self) -> Self {
        self.collidable = true;
        self
    }

    /// Adds a wrap-around component.
    #[must_use]
    pub fn wrapping(mut self, wrap: Wrap) -> Self {
        self.wrap = Some(wrap);
        self
    }

    /// Configures the image drawn for the entity.
    #[must_use]
    pub fn with_image(mut self, image: ImageKey) -> Self {
        self.appearance.image = Some(image);
        self
    }

    /// Configures the placeholder colour.
    #[must_use]
    pub fn with_placeholder(mut self, colour: Colour) -> Self {
        self.appearance.placeholder = colour;
        self
    }

    /// Configures text content.
    #[must_use]
    pub fn with_text(mut self, style: TextStyle) -> Self {
        self.appearance.text = Some(style);
        self
    }

    /// Starts the entity hidden.
    #[must_use]
    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    pub(crate) fn build(self, id: EntityId) -> Entity {
        let image = self.appearance.image.clone();
        let mut entity = Entity {
            id,
            kind: self.kind,
            position: self.position,
            size: self.size,
            rect: Rect::default(),
            visible: self.visible,
            z: self.z,
            appearance: self.appearance,
            image,
            motion: self.motion,
            collidable: self.collidable,
            wrap: self.wrap,
        };
        entity.refresh_rect();
        entity
    }
}

/// Positioned, drawable thing living in the registry.
#[derive(Clone, Debug, PartialEq)]
pub struct Entity {
    id: EntityId,
    kind: EntityKind,
    position: Vec2,
    size: Vec2,
    rect: Rect,
    visible: bool,
    z: i32,
    appearance: Appearance,
    image: Option<ImageKey>,
    motion: Option<Motion>,
    collidable: bool,
    wrap: Option<Wrap>,
}

impl Entity {
    /// Identifier assigned by the registry.
    #[must_use]
    pub const fn id(&self) -> EntityId {
        self.id
    }

    /// Role of the entity.
    #[must_use]
    pub const fn kind(&self) -> EntityKind {
        self.kind
    }

    /// Top-left corner in screen pixels.
    #[must_use]
    pub const fn position(&self) -> Vec2 {
        self.position
    }

    /// Moves the entity. The bounding rectangle follows on the next tick.
    pub fn set_position(&mut self, position: Vec2) {
        self.position = position;
    }

    /// Dimensions in pixels.
    #[must_use]
    pub const fn size(&self) -> Vec2 {
        self.size
    }

    /// Bounding rectangle as of the last tick.
    #[must_use]
    pub const fn rect(&self) -> Rect {
        self.rect
    }

    /// Velocity, zero for static entities.
    #[must_use]
    pub fn velocity(&self) -> Vec2 {
        self.motion.map_or(Vec2::ZERO, |motion| motion.velocity())
    }

    /// Whether the entity is drawn.
    #[must_use]
    pub const fn is_visible(&self) -> bool {
        self.visible
    }

    /// Shows or hides the entity.
    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    /// Draw-order index.
    #[must_use]
    pub const fn z(&self) -> i32 {
        self.z
    }

    /// Whether collision checks consider this entity.
    #[must_use]
    pub const fn is_collidable(&self) -> bool {
        self.collidable
    }

    /// Replaces the text content of a text entity. Other entities are unaffected.
    pub fn set_text(&mut self, content: impl Into<String>) {
        if let Some(style) = self.appearance.text.as_mut() {
            style.content = content.into();
        }
    }

    /// Current text content, if the entity displays text.
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        self.appearance
            .text
            .as_ref()
            .map(|style| style.content.as_str())
    }

    /// Advances the entity by one frame.
    ///
    /// The bounding rectangle is recomputed from the current position first,
    /// wrap-around is applied against that rectangle, and only then does the
    /// position advance by `velocity * dt`.
    pub fn tick(&mut self, dt: Duration) {
        self.refresh_rect();

        if let Some(wrap) = self.wrap {
            self.apply_wrap(wrap);
        }

        if let Some(motion) = self.motion {
            self.position += motion.velocity() * dt.as_secs_f32();
        }
    }

    /// Renderable description. Never fails: entities without an image or
    /// text degrade to a placeholder rectangle.
    #[must_use]
    pub fn draw(&self) -> Drawable {
        if let Some(text) = &self.appearance.text {
            return Drawable::Text(text.clone());
        }

        match &self.image {
            Some(key) => Drawable::Image {
                key: key.clone(),
                size: self.size,
                fallback: self.appearance.placeholder,
            },
            None => Drawable::Placeholder {
                colour: self.appearance.placeholder,
                size: self.size,
            },
        }
    }

    /// Teardown hook run by the registry right before removal.
    pub(crate) fn teardown(&mut self) {
        self.image = None;
        self.visible = false;
    }

    fn refresh_rect(&mut self) {
        self.rect = Rect::from_position_and_size(self.position, self.size);
    }

    fn apply_wrap(&mut self, wrap: Wrap) {
        let direction = self.velocity().x;
        let cycle = wrap.cycle(self.size.x);

        if direction > 0.0 && self.rect.left() >= wrap.span() {
            self.position.x -= cycle;
        } else if direction < 0.0 && self.rect.right() <= 0.0 {
            self.position.x += cycle;
        } else {
            return;
        }

        self.refresh_rect();
    }
}
