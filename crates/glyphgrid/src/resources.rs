//! Get-or-load caches for on-disk assets.
//!
//! Layout under the root: `assets/fonts/`, `assets/images/`,
//! `assets/shaders/`; config files are addressed relative to the root.

use std::collections::HashMap;
use std::hash::Hash;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use image::RgbaImage;
use tracing::debug;

use crate::config::Config;
use crate::error::{RenderError, Result};
#[cfg(feature = "fonts")]
use crate::face::FontFace;

type Cache<K, V> = Mutex<HashMap<K, Arc<V>>>;

#[derive(Default)]
pub struct ResourceManager {
    root: PathBuf,
    #[cfg(feature = "fonts")]
    fonts: Cache<String, fontdue::Font>,
    images: Cache<String, RgbaImage>,
    shaders: Cache<String, str>,
    configs: Cache<PathBuf, Config>,
}

impl ResourceManager {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ..Self::default()
        }
    }

    /// Root at the nearest ancestor of the current directory that has an
    /// `assets/` directory.
    pub fn discover() -> Result<Self> {
        let cwd = std::env::current_dir()?;
        match cwd.ancestors().find(|dir| dir.join("assets").is_dir()) {
            Some(root) => Ok(Self::new(root)),
            None => Err(RenderError::Resource {
                kind: "assets directory",
                path: cwd,
                reason: "no ancestor contains `assets/`".into(),
            }),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn asset_path(&self, dir: &str, name: &str) -> PathBuf {
        self.root.join("assets").join(dir).join(name)
    }

    #[cfg(feature = "fonts")]
    pub fn load_font(&self, name: &str) -> Result<Arc<fontdue::Font>> {
        let path = self.asset_path("fonts", name);
        get_or_load(&self.fonts, name.to_string(), || {
            let bytes = std::fs::read(&path).map_err(|e| resource_error("font", &path, e))?;
            fontdue::Font::from_bytes(bytes, fontdue::FontSettings::default())
                .map_err(|e| resource_error("font", &path, e))
        })
    }

    /// A face over the cached font at `size` pixels.
    #[cfg(feature = "fonts")]
    pub fn load_face(&self, name: &str, size: f32) -> Result<FontFace> {
        Ok(FontFace::new(self.load_font(name)?, size))
    }

    pub fn load_image(&self, name: &str) -> Result<Arc<RgbaImage>> {
        let path = self.asset_path("images", name);
        get_or_load(&self.images, name.to_string(), || {
            image::open(&path)
                .map(|img| img.to_rgba8())
                .map_err(|e| resource_error("image", &path, e))
        })
    }

    /// Copy of the `[x, y, width, height]` region of a cached image.
    pub fn load_sub_image(&self, name: &str, rect: [u32; 4]) -> Result<RgbaImage> {
        let image = self.load_image(name)?;
        let [x, y, w, h] = rect;
        let fits = x.checked_add(w).is_some_and(|r| r <= image.width())
            && y.checked_add(h).is_some_and(|b| b <= image.height());
        if !fits {
            return Err(RenderError::SubImageOutOfBounds {
                name: name.to_string(),
                rect,
                width: image.width(),
                height: image.height(),
            });
        }
        Ok(image::imageops::crop_imm(&*image, x, y, w, h).to_image())
    }

    pub fn load_shader(&self, name: &str) -> Result<Arc<str>> {
        let path = self.asset_path("shaders", name);
        get_or_load(&self.shaders, name.to_string(), || {
            std::fs::read_to_string(&path)
                .map(String::into_boxed_str)
                .map_err(|e| resource_error("shader", &path, e))
        })
    }

    pub fn load_config(&self, rel_path: impl AsRef<Path>) -> Result<Arc<Config>> {
        let path = self.root.join(rel_path);
        get_or_load(&self.configs, path.clone(), || {
            let text =
                std::fs::read_to_string(&path).map_err(|e| resource_error("config", &path, e))?;
            Config::from_toml_str(&text).map_err(|e| resource_error("config", &path, e))
        })
    }
}

impl std::fmt::Debug for ResourceManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceManager")
            .field("root", &self.root)
            .finish_non_exhaustive()
    }
}

fn resource_error(kind: &'static str, path: &Path, err: impl std::fmt::Display) -> RenderError {
    RenderError::Resource {
        kind,
        path: path.to_path_buf(),
        reason: err.to_string(),
    }
}

/// Loads under the cache lock, so each key is loaded at most once.
fn get_or_load<K, V, B, F>(cache: &Cache<K, V>, key: K, load: F) -> Result<Arc<V>>
where
    K: Eq + Hash + std::fmt::Debug,
    V: ?Sized,
    B: Into<Arc<V>>,
    F: FnOnce() -> Result<B>,
{
    let mut map = cache.lock().unwrap_or_else(PoisonError::into_inner);
    if let Some(hit) = map.get(&key) {
        return Ok(Arc::clone(hit));
    }
    debug!(?key, "loading resource");
    let value: Arc<V> = load()?.into();
    map.insert(key, Arc::clone(&value));
    Ok(value)
}
