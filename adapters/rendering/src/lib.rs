#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for the crossing adapters.
//!
//! The engine produces a [`Frame`] per step. Backends receive it as a
//! [`Scene`], a flattened list of draw commands in screen pixels before
//! scaling, and report pressed keys back through [`FrameInput`].

use anyhow::Result as AnyResult;
use crossing_core::{Colour, ImageKey, Key};
use crossing_engine::Frame;
use crossing_world::Drawable;
use glam::Vec2;
use std::{error::Error, fmt, time::Duration};

/// Linear RGBA colour handed to backends.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red, 0.0 to 1.0.
    pub red: f32,
    /// Green, 0.0 to 1.0.
    pub green: f32,
    /// Blue, 0.0 to 1.0.
    pub blue: f32,
    /// Opacity, 0.0 (transparent) to 1.0.
    pub alpha: f32,
}

impl Color {
    /// Colour from unit-range channels.
    #[must_use]
    pub const fn new(red: f32, green: f32, blue: f32, alpha: f32) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Opaque colour from 0-255 channels.
    #[must_use]
    pub const fn from_rgb_u8(red: u8, green: u8, blue: u8) -> Self {
        Self::from_rgba_u8(red, green, blue, u8::MAX)
    }

    /// Creates a color from byte RGBA values.
    #[must_use]
    pub const fn from_rgba_u8(red: u8, green: u8, blue: u8, alpha: u8) -> Self {
        Self {
            red: red as f32 / 255.0,
            green: green as f32 / 255.0,
            blue: blue as f32 / 255.0,
            alpha: alpha as f32 / 255.0,
        }
    }
}

impl From<Colour> for Color {
    fn from(colour: Colour) -> Self {
        Self::from_rgba_u8(colour.red(), colour.green(), colour.blue(), colour.alpha())
    }
}

/// Input snapshot gathered by adapters before stepping the engine.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct FrameInput {
    /// Keys pressed since the previous frame, in press order.
    pub keys: Vec<Key>,
}

impl FrameInput {
    /// Wraps the keys pressed this frame.
    #[must_use]
    pub fn new(keys: Vec<Key>) -> Self {
        Self { keys }
    }
}

/// What a scene sprite looks like.
#[derive(Clone, Debug, PartialEq)]
pub enum SpriteVisual {
    /// Named image stretched to `size`. Backends without the image fill a
    /// rectangle with `fallback` instead.
    Image {
        /// Image to draw.
        key: ImageKey,
        /// Size in unscaled pixels.
        size: Vec2,
        /// Fill used when the image is unavailable.
        fallback: Color,
    },
    /// Solid rectangle.
    Rect {
        /// Size in unscaled pixels.
        size: Vec2,
        /// Fill colour.
        color: Color,
    },
    /// Text whose top-left corner sits at the sprite position.
    Text {
        /// Text to draw.
        content: String,
        /// Font size in unscaled pixels.
        font_size: f32,
        /// Text colour.
        color: Color,
    },
}

impl From<Drawable> for SpriteVisual {
    fn from(drawable: Drawable) -> Self {
        match drawable {
            Drawable::Image {
                key,
                size,
                fallback,
            } => Self::Image {
                key,
                size,
                fallback: fallback.into(),
            },
            Drawable::Placeholder { colour, size } => Self::Rect {
                size,
                color: colour.into(),
            },
            Drawable::Text(style) => Self::Text {
                content: style.content,
                font_size: style.font_size,
                color: style.colour.into(),
            },
        }
    }
}

/// Sprite placed in the scene.
#[derive(Clone, Debug, PartialEq)]
pub struct SceneSprite {
    /// Top-left corner in unscaled pixels.
    pub position: Vec2,
    /// Visual representation.
    pub visual: SpriteVisual,
}

impl SceneSprite {
    /// Creates a new sprite descriptor.
    #[must_use]
    pub const fn new(position: Vec2, visual: SpriteVisual) -> Self {
        Self { position, visual }
    }
}

/// Everything a backend draws for one frame.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct Scene {
    /// Image stretched over the whole window, drawn first.
    pub background: Option<ImageKey>,
    /// Sprites in draw order.
    pub sprites: Vec<SceneSprite>,
    /// The backend should flip between windowed and fullscreen.
    pub toggle_fullscreen: bool,
    /// The game has stopped and the backend should close the window.
    pub finished: bool,
}

impl Scene {
    /// Flattens an engine frame into draw commands.
    #[must_use]
    pub fn from_frame(frame: Frame) -> Self {
        let Frame {
            background,
            sprites,
            toggle_fullscreen,
            finished,
        } = frame;
        Self {
            background,
            sprites: sprites
                .into_iter()
                .map(|sprite| SceneSprite::new(sprite.position, sprite.drawable.into()))
                .collect(),
            toggle_fullscreen,
            finished,
        }
    }

    /// Reports whether any sprite or the background names an image.
    #[must_use]
    pub fn requests_images(&self) -> bool {
        self.background.is_some()
            || self
                .sprites
                .iter()
                .any(|sprite| matches!(sprite.visual, SpriteVisual::Image { .. }))
    }
}

/// Window settings plus the first scene to show.
#[derive(Clone, Debug, PartialEq)]
pub struct Presentation {
    /// Window title.
    pub window_title: String,
    /// Fill behind the background layer.
    pub clear_color: Color,
    /// Size of the playing field in unscaled pixels.
    pub logical_size: Vec2,
    /// Factor applied to every coordinate when drawing.
    pub scale: f32,
    /// Scene content displayed before the first update.
    pub scene: Scene,
}

impl Presentation {
    /// Constructs a new presentation descriptor drawn at scale 1.
    #[must_use]
    pub fn new<T>(window_title: T, clear_color: Color, logical_size: Vec2, scene: Scene) -> Self
    where
        T: Into<String>,
    {
        Self {
            window_title: window_title.into(),
            clear_color,
            logical_size,
            scale: 1.0,
            scene,
        }
    }

    /// Draws everything `scale` times larger.
    pub fn with_scale(mut self, scale: f32) -> Result<Self, RenderingError> {
        if !scale.is_finite() || scale <= 0.0 {
            return Err(RenderingError::InvalidScale { scale });
        }
        self.scale = scale;
        Ok(self)
    }

    /// Window size in physical pixels.
    #[must_use]
    pub fn window_size(&self) -> (i32, i32) {
        let size = (self.logical_size * self.scale).round();
        (size.x as i32, size.y as i32)
    }
}

/// Rendering backend capable of presenting crossing scenes.
pub trait RenderingBackend {
    /// Runs the rendering backend until the scene reports it is finished or
    /// the window is closed.
    ///
    /// The provided `update_scene` closure receives the frame delta and the
    /// keys pressed since the previous call, and replaces the scene before it
    /// is rendered. An error returned by the closure stops the backend and is
    /// returned from `run`.
    fn run<F>(self, presentation: Presentation, update_scene: F) -> AnyResult<()>
    where
        F: FnMut(Duration, FrameInput, &mut Scene) -> AnyResult<()> + 'static;
}

/// Invalid presentation settings.
#[derive(Debug, PartialEq)]
pub enum RenderingError {
    /// Scale must be a positive finite number.
    InvalidScale {
        /// Provided scale that failed validation.
        scale: f32,
    },
}

impl fmt::Display for RenderingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidScale { scale } => {
                write!(f, "scale must be positive and finite (received {scale})")
            }
        }
    }
}

impl Error for RenderingError {}

#[cfg(test)]
mod tests {
    use super::*;
    use crossing_engine::FrameSprite;
    use crossing_world::{EntityId, TextStyle};

    #[test]
    fn colour_bytes_map_to_unit_channels() {
        let color = Color::from(Colour::from_rgba(255, 0, 51, 0));

        assert_eq!(color, Color::new(1.0, 0.0, 0.2, 0.0));
    }

    #[test]
    fn frame_flattens_into_scene_sprites() {
        let frame = Frame {
            background: Some(ImageKey::new("road")),
            sprites: vec![
                FrameSprite {
                    id: EntityId::new(1),
                    position: Vec2::new(4.0, 8.0),
                    drawable: Drawable::Placeholder {
                        colour: Colour::GREEN,
                        size: Vec2::splat(32.0),
                    },
                    z: 0,
                },
                FrameSprite {
                    id: EntityId::new(2),
                    position: Vec2::ZERO,
                    drawable: Drawable::Text(TextStyle::new("hi", 20.0, Colour::WHITE)),
                    z: 10,
                },
            ],
            toggle_fullscreen: true,
            finished: false,
        };

        let scene = Scene::from_frame(frame);

        assert!(scene.requests_images());
        assert!(scene.toggle_fullscreen);
        assert_eq!(
            scene.sprites,
            vec![
                SceneSprite::new(
                    Vec2::new(4.0, 8.0),
                    SpriteVisual::Rect {
                        size: Vec2::splat(32.0),
                        color: Color::new(0.0, 1.0, 0.0, 1.0),
                    },
                ),
                SceneSprite::new(
                    Vec2::ZERO,
                    SpriteVisual::Text {
                        content: "hi".to_owned(),
                        font_size: 20.0,
                        color: Color::new(1.0, 1.0, 1.0, 1.0),
                    },
                ),
            ]
        );
    }

    #[test]
    fn empty_scene_requests_no_images() {
        assert!(!Scene::default().requests_images());
    }

    #[test]
    fn window_size_follows_scale() {
        let presentation = Presentation::new(
            "crossing",
            Color::from_rgb_u8(0, 0, 0),
            Vec2::new(480.0, 416.0),
            Scene::default(),
        )
        .with_scale(1.5)
        .expect("valid scale");

        assert_eq!(presentation.window_size(), (720, 624));
    }

    #[test]
    fn non_positive_scale_is_rejected() {
        let presentation = Presentation::new(
            "crossing",
            Color::from_rgb_u8(0, 0, 0),
            Vec2::ONE,
            Scene::default(),
        );

        assert_eq!(
            presentation.clone().with_scale(0.0),
            Err(RenderingError::InvalidScale { scale: 0.0 })
        );
        assert!(presentation.with_scale(f32::NAN).is_err());
    }
}
