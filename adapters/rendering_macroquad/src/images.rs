use std::{
    collections::{BTreeMap, HashMap},
    fs, io,
    path::{Path, PathBuf},
};

use anyhow::{bail, Context, Result};
use crossing_core::ImageKey;
use macroquad::texture::Texture2D;
use tracing::{debug, warn};

const SUPPORTED_MANIFEST_VERSION: u32 = 1;

/// Textures named by the image manifest.
#[derive(Debug, Default)]
pub(crate) struct ImageAtlas {
    textures: HashMap<String, Texture2D>,
}

impl ImageAtlas {
    /// Loads every image listed in the manifest at `path`.
    ///
    /// A missing manifest or image file is logged and leaves the affected
    /// keys unresolved. A manifest that exists but cannot be parsed is an
    /// error.
    pub(crate) fn from_manifest_path(path: &Path) -> Result<Self> {
        Self::from_manifest_with_loader(path, default_loader)
    }

    /// Returns the default manifest path relative to the working directory.
    #[must_use]
    pub(crate) fn default_manifest_path() -> PathBuf {
        PathBuf::from("assets/manifest.toml")
    }

    pub(crate) fn texture(&self, key: &ImageKey) -> Option<Texture2D> {
        self.textures.get(key.as_str()).copied()
    }

    pub(crate) fn len(&self) -> usize {
        self.textures.len()
    }

    fn from_manifest_with_loader(
        manifest_path: &Path,
        mut loader: impl FnMut(&Path) -> io::Result<Texture2D>,
    ) -> Result<Self> {
        let contents = match fs::read_to_string(manifest_path) {
            Ok(contents) => contents,
            Err(error) if error.kind() == io::ErrorKind::NotFound => {
                warn!(
                    path = %manifest_path.display(),
                    "image manifest not found, drawing placeholders"
                );
                return Ok(Self::default());
            }
            Err(error) => {
                return Err(error).with_context(|| {
                    format!(
                        "failed to read image manifest at {}",
                        manifest_path.display()
                    )
                })
            }
        };
        let base = manifest_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        let entries = parse_manifest(&contents, &base)?;
        Ok(Self::from_entries(entries, &mut loader))
    }

    fn from_entries(
        entries: Vec<(String, PathBuf)>,
        loader: &mut impl FnMut(&Path) -> io::Result<Texture2D>,
    ) -> Self {
        let mut textures = HashMap::with_capacity(entries.len());
        for (key, path) in entries {
            match loader(&path) {
                Ok(texture) => {
                    debug!(key = key.as_str(), path = %path.display(), "image loaded");
                    let _ = textures.insert(key, texture);
                }
                Err(error) => {
                    warn!(
                        key = key.as_str(),
                        path = %path.display(),
                        %error,
                        "image could not be loaded, drawing a placeholder"
                    );
                }
            }
        }
        Self { textures }
    }
}

fn default_loader(path: &Path) -> io::Result<Texture2D> {
    let bytes = fs::read(path)?;
    Ok(Texture2D::from_file_with_format(&bytes, None))
}

#[derive(Debug, serde::Deserialize)]
struct Manifest {
    version: u32,
    #[serde(default)]
    images: BTreeMap<String, String>,
}

fn parse_manifest(contents: &str, base_path: &Path) -> Result<Vec<(String, PathBuf)>> {
    let manifest: Manifest =
        toml::from_str(contents).context("failed to parse image manifest toml contents")?;
    if manifest.version != SUPPORTED_MANIFEST_VERSION {
        bail!(
            "unsupported image manifest version {}; expected {}",
            manifest.version,
            SUPPORTED_MANIFEST_VERSION
        );
    }

    let mut entries = Vec::with_capacity(manifest.images.len());
    for (key, relative_path) in manifest.images {
        if key.trim().is_empty() {
            bail!("image manifest contains an empty key");
        }
        entries.push((key, base_path.join(relative_path)));
    }
    Ok(entries)
}
