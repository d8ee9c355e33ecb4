#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Macroquad-backed rendering adapter for the crossing game.
//!
//! Macroquad's optional audio stack depends on native ALSA development
//! libraries, which are unavailable in the containerised CI environment.
//! To keep `cargo test` usable everywhere we depend on macroquad without its
//! default `audio` feature.
//!
//! Images are resolved through a TOML manifest loaded once the window has a
//! graphics context. Keys missing from the manifest are drawn as their
//! placeholder colour.

mod images;

use anyhow::{Context, Result};
use crossing_core::{ImageKey, Key};
use crossing_rendering::{Color, FrameInput, Presentation, RenderingBackend, Scene, SpriteVisual};
use glam::Vec2;
use macroquad::{
    color::WHITE,
    input::{get_char_pressed, is_key_pressed, KeyCode},
    math::Vec2 as MacroquadVec2,
    texture::{draw_texture_ex, DrawTextureParams, Texture2D},
};
use std::{
    collections::{HashSet, VecDeque},
    fmt,
    path::PathBuf,
    sync::mpsc,
    time::{Duration, Instant},
};
use tracing::{info, warn};

use self::images::ImageAtlas;

/// Physical keys forwarded to the engine, in the order they are polled.
const TRACKED_KEYS: [KeyCode; 9] = [
    KeyCode::Up,
    KeyCode::Down,
    KeyCode::Left,
    KeyCode::Right,
    KeyCode::Enter,
    KeyCode::KpEnter,
    KeyCode::Escape,
    KeyCode::Backspace,
    KeyCode::F12,
];

/// Baseline offset for text, as a fraction of the font size.
const TEXT_ASCENT: f32 = 0.8;

fn key_from_code(code: KeyCode) -> Option<Key> {
    match code {
        KeyCode::Up => Some(Key::Up),
        KeyCode::Down => Some(Key::Down),
        KeyCode::Left => Some(Key::Left),
        KeyCode::Right => Some(Key::Right),
        KeyCode::Enter | KeyCode::KpEnter => Some(Key::Enter),
        KeyCode::Escape => Some(Key::Escape),
        KeyCode::Backspace => Some(Key::Backspace),
        KeyCode::F12 => Some(Key::F12),
        _ => None,
    }
}

/// Typed characters become [`Key::Char`]; control characters already arrive
/// as key codes.
fn key_from_char(character: char) -> Option<Key> {
    if character.is_control() {
        None
    } else {
        Some(Key::Char(character))
    }
}

/// Keys pressed since the previous frame.
fn poll_keys() -> Vec<Key> {
    let mut keys: Vec<Key> = TRACKED_KEYS
        .iter()
        .copied()
        .filter(|code| is_key_pressed(*code))
        .filter_map(key_from_code)
        .collect();
    keys.dedup();
    while let Some(character) = get_char_pressed() {
        keys.extend(key_from_char(character));
    }
    keys
}

/// Rendering backend implemented on top of macroquad.
#[derive(Debug)]
pub struct MacroquadBackend {
    swap_interval: Option<i32>,
    show_fps: bool,
    manifest_path: Option<PathBuf>,
    load_images: bool,
}

impl Default for MacroquadBackend {
    fn default() -> Self {
        Self {
            swap_interval: None,
            show_fps: false,
            manifest_path: None,
            load_images: true,
        }
    }
}

impl MacroquadBackend {
    /// Backend with the platform's default swap interval and image loading on.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Swap interval requested from the platform; `None` keeps its default.
    #[must_use]
    pub fn with_swap_interval(mut self, swap_interval: Option<i32>) -> Self {
        self.swap_interval = swap_interval;
        self
    }

    /// Waits for the display refresh when `enabled`, otherwise presents immediately.
    #[must_use]
    pub fn with_vsync(self, enabled: bool) -> Self {
        let swap_interval = if enabled { Some(1) } else { Some(0) };
        self.with_swap_interval(swap_interval)
    }

    /// Prints a timing report to stdout once per second.
    #[must_use]
    pub fn with_show_fps(mut self, show: bool) -> Self {
        self.show_fps = show;
        self
    }

    /// Configures whether the backend should attempt to load image assets.
    #[must_use]
    pub fn with_image_loading(mut self, enabled: bool) -> Self {
        self.load_images = enabled;
        self
    }

    /// Reads the image manifest from `path` instead of `assets/manifest.toml`.
    #[must_use]
    pub fn with_manifest_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.manifest_path = Some(path.into());
        self
    }
}

/// Image keys that could not be resolved, each reported once.
#[derive(Debug, Default)]
struct MissingImages {
    reported: HashSet<String>,
}

impl MissingImages {
    fn resolve(&mut self, atlas: Option<&ImageAtlas>, key: &ImageKey) -> Option<Texture2D> {
        let texture = atlas.and_then(|atlas| atlas.texture(key));
        if texture.is_none() && atlas.is_some() && self.reported.insert(key.as_str().to_owned()) {
            warn!(key = key.as_str(), "image missing from manifest, drawing a placeholder");
        }
        texture
    }
}

/// Screen rectangle `(x, y, width, height)` for a sprite.
fn scaled_rect(position: Vec2, size: Vec2, scale: f32) -> (f32, f32, f32, f32) {
    let position = position * scale;
    let size = size * scale;
    (position.x, position.y, size.x, size.y)
}

/// Baseline origin and font size for text whose top-left corner is `position`.
fn text_placement(position: Vec2, font_size: f32, scale: f32) -> (f32, f32, f32) {
    let size = font_size * scale;
    let origin = position * scale;
    (origin.x, origin.y + size * TEXT_ASCENT, size)
}

fn draw_texture_stretched(texture: Texture2D, x: f32, y: f32, width: f32, height: f32) {
    draw_texture_ex(
        texture,
        x,
        y,
        WHITE,
        DrawTextureParams {
            dest_size: Some(MacroquadVec2::new(width, height)),
            ..DrawTextureParams::default()
        },
    );
}

fn draw_scene(
    scene: &Scene,
    scale: f32,
    atlas: Option<&ImageAtlas>,
    missing: &mut MissingImages,
) {
    if let Some(key) = &scene.background {
        if let Some(texture) = missing.resolve(atlas, key) {
            draw_texture_stretched(
                texture,
                0.0,
                0.0,
                macroquad::window::screen_width(),
                macroquad::window::screen_height(),
            );
        }
    }

    for sprite in &scene.sprites {
        match &sprite.visual {
            SpriteVisual::Image {
                key,
                size,
                fallback,
            } => {
                let (x, y, width, height) = scaled_rect(sprite.position, *size, scale);
                match missing.resolve(atlas, key) {
                    Some(texture) => draw_texture_stretched(texture, x, y, width, height),
                    None => macroquad::shapes::draw_rectangle(
                        x,
                        y,
                        width,
                        height,
                        to_macroquad_color(*fallback),
                    ),
                }
            }
            SpriteVisual::Rect { size, color } => {
                let (x, y, width, height) = scaled_rect(sprite.position, *size, scale);
                macroquad::shapes::draw_rectangle(x, y, width, height, to_macroquad_color(*color));
            }
            SpriteVisual::Text {
                content,
                font_size,
                color,
            } => {
                let (x, y, size) = text_placement(sprite.position, *font_size, scale);
                let _ = macroquad::text::draw_text(content, x, y, size, to_macroquad_color(*color));
            }
        }
    }
}

const REPORT_INTERVAL: Duration = Duration::from_secs(1);
const REPORT_HISTORY: usize = 10;

/// Frames and time accumulated over one reporting interval.
#[derive(Clone, Copy, Debug, Default)]
struct Interval {
    frames: u32,
    elapsed: Duration,
    update: Duration,
    render: Duration,
}

impl Interval {
    fn frames_per_second(&self) -> f32 {
        self.frames as f32 / self.elapsed.as_secs_f32()
    }
}

/// Summary printed once per second when `--show-fps` is set.
#[derive(Clone, Copy, Debug)]
struct TimingReport {
    fps: f32,
    recent_fps: f32,
    update: Duration,
    render: Duration,
}

impl fmt::Display for TimingReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "fps {:.1} (last {REPORT_HISTORY}s {:.1}) | update {:.2}ms | render {:.2}ms",
            self.fps,
            self.recent_fps,
            self.update.as_secs_f64() * 1_000.0,
            self.render.as_secs_f64() * 1_000.0,
        )
    }
}

/// Folds frame timings into one report per second. `recent_fps` averages
/// the last ten completed intervals.
#[derive(Debug, Default)]
struct FrameTimings {
    current: Interval,
    history: VecDeque<Interval>,
}

impl FrameTimings {
    fn record(
        &mut self,
        frame: Duration,
        update: Duration,
        render: Duration,
    ) -> Option<TimingReport> {
        self.current.frames = self.current.frames.saturating_add(1);
        self.current.elapsed += frame;
        self.current.update += update;
        self.current.render += render;
        if self.current.elapsed < REPORT_INTERVAL {
            return None;
        }

        let finished = std::mem::take(&mut self.current);
        if self.history.len() == REPORT_HISTORY {
            let _ = self.history.pop_front();
        }
        self.history.push_back(finished);

        let (frames, elapsed) = self
            .history
            .iter()
            .fold((0_u32, Duration::ZERO), |(frames, elapsed), interval| {
                (frames + interval.frames, elapsed + interval.elapsed)
            });
        Some(TimingReport {
            fps: finished.frames_per_second(),
            recent_fps: frames as f32 / elapsed.as_secs_f32(),
            update: finished.update / finished.frames,
            render: finished.render / finished.frames,
        })
    }
}

impl RenderingBackend for MacroquadBackend {
    fn run<F>(self, presentation: Presentation, mut update_scene: F) -> Result<()>
    where
        F: FnMut(Duration, FrameInput, &mut Scene) -> Result<()> + 'static,
    {
        let Self {
            swap_interval,
            show_fps,
            manifest_path,
            load_images,
        } = self;

        let (window_width, window_height) = presentation.window_size();
        let Presentation {
            window_title,
            clear_color,
            scale,
            scene,
            ..
        } = presentation;

        let mut config = macroquad::window::Conf {
            window_title,
            window_width,
            window_height,
            window_resizable: false,
            ..macroquad::window::Conf::default()
        };
        if let Some(swap_interval) = swap_interval {
            config.platform.swap_interval = Some(swap_interval);
        }

        let manifest_path = manifest_path.unwrap_or_else(ImageAtlas::default_manifest_path);
        let (outcome_sender, outcome_receiver) = mpsc::channel::<Result<()>>();

        macroquad::Window::from_config(config, async move {
            let mut scene = scene;
            let atlas = if load_images {
                match ImageAtlas::from_manifest_path(&manifest_path).with_context(|| {
                    format!("failed to load images from {}", manifest_path.display())
                }) {
                    Ok(atlas) => {
                        info!(images = atlas.len(), "image atlas ready");
                        Some(atlas)
                    }
                    Err(error) => {
                        let _ = outcome_sender.send(Err(error));
                        return;
                    }
                }
            } else {
                None
            };

            let background = to_macroquad_color(clear_color);
            let mut missing = MissingImages::default();
            let mut timings = FrameTimings::default();
            let mut fullscreen = false;

            loop {
                let input = FrameInput::new(poll_keys());
                let dt_seconds = macroquad::time::get_frame_time();
                let frame_dt = Duration::from_secs_f32(dt_seconds.max(0.0));

                let update_start = Instant::now();
                if let Err(error) = update_scene(frame_dt, input, &mut scene) {
                    let _ = outcome_sender.send(Err(error));
                    break;
                }
                let update_duration = update_start.elapsed();

                if scene.finished {
                    let _ = outcome_sender.send(Ok(()));
                    break;
                }
                if scene.toggle_fullscreen {
                    fullscreen = !fullscreen;
                    macroquad::window::set_fullscreen(fullscreen);
                }

                macroquad::window::clear_background(background);
                let render_start = Instant::now();
                draw_scene(&scene, scale, atlas.as_ref(), &mut missing);
                let render_duration = render_start.elapsed();

                let report = timings.record(frame_dt, update_duration, render_duration);
                if let Some(report) = report.filter(|_| show_fps) {
                    println!("{report}");
                }

                macroquad::window::next_frame().await;
            }
        });

        // The window can also be closed by the platform, which leaves no outcome.
        outcome_receiver.try_recv().unwrap_or(Ok(()))
    }
}

fn to_macroquad_color(color: Color) -> macroquad::color::Color {
    macroquad::color::Color::new(color.red, color.green, color.blue, color.alpha)
}
