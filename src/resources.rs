// src/resources.rs

//! Skin resource cache.
//!
//! Images are looked up by skin-relative path in each configured skin
//! directory in turn, decoded once and shared. Misses are remembered too,
//! so a missing file is reported once rather than every frame.

use crate::error::RenderError;
use crate::render::RenderContext;
use crate::surface::OffscreenSurface;
use log::{debug, warn};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::rc::Rc;

pub struct SkinResources {
    ctx: RenderContext,
    search_paths: Vec<PathBuf>,
    cache: HashMap<String, Option<Rc<OffscreenSurface>>>,
}

impl SkinResources {
    /// `search_paths` are tried in order; put the active skin first and the
    /// default skin last.
    pub fn new(ctx: &RenderContext, search_paths: Vec<PathBuf>) -> Self {
        Self {
            ctx: ctx.clone(),
            search_paths,
            cache: HashMap::new(),
        }
    }

    /// Full path of `relative` in the first skin directory that has it.
    pub fn resolve(&self, relative: &str) -> Option<PathBuf> {
        let relative = Path::new(relative);
        if relative.is_absolute() {
            return relative.is_file().then(|| relative.to_path_buf());
        }
        self.search_paths
            .iter()
            .map(|dir| dir.join(relative))
            .find(|candidate| candidate.is_file())
    }

    /// The image at `relative`, decoded with alpha, or `None` if no skin
    /// directory has a usable copy.
    pub fn get(&mut self, relative: &str) -> Option<Rc<OffscreenSurface>> {
        if let Some(entry) = self.cache.get(relative) {
            return entry.clone();
        }
        let loaded = match self.resolve(relative) {
            Some(path) => {
                debug!("SkinResources: loading {}", path.display());
                OffscreenSurface::from_image_file(&self.ctx, &path, 0, 0, true).map(Rc::new)
            }
            None => {
                let miss = RenderError::ResourceUnavailable(format!(
                    "'{}' not found in any skin directory",
                    relative
                ));
                warn!("SkinResources: {}", miss);
                None
            }
        };
        self.cache.insert(relative.to_string(), loaded.clone());
        loaded
    }

    /// Forgets `relative`; the next `get` reloads it. Holders of the old
    /// handle keep their copy.
    pub fn evict(&mut self, relative: &str) {
        self.cache.remove(relative);
    }

    pub fn clear(&mut self) {
        self.cache.clear();
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Color;
    use crate::image::encode_png;
    use std::fs;
    use test_log::test;

    fn write_png(dir: &Path, name: &str, color: Color) {
        let path = dir.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, encode_png(1, 1, &[color]).unwrap()).unwrap();
    }

    #[test]
    fn first_skin_directory_wins() {
        let active = tempfile::tempdir().unwrap();
        let fallback = tempfile::tempdir().unwrap();
        write_png(active.path(), "imgs/icon.png", Color::rgb(1, 1, 1));
        write_png(fallback.path(), "imgs/icon.png", Color::rgb(2, 2, 2));
        write_png(fallback.path(), "imgs/only.png", Color::rgb(3, 3, 3));

        let ctx = RenderContext::new();
        let mut res = SkinResources::new(
            &ctx,
            vec![active.path().to_path_buf(), fallback.path().to_path_buf()],
        );

        assert_eq!(
            res.get("imgs/icon.png").unwrap().pixel(0, 0),
            Some(Color::rgb(1, 1, 1))
        );
        assert_eq!(
            res.get("imgs/only.png").unwrap().pixel(0, 0),
            Some(Color::rgb(3, 3, 3))
        );
    }

    #[test]
    fn hits_are_shared_and_misses_cached() {
        let dir = tempfile::tempdir().unwrap();
        write_png(dir.path(), "a.png", Color::WHITE);
        let ctx = RenderContext::new();
        let mut res = SkinResources::new(&ctx, vec![dir.path().to_path_buf()]);

        let first = res.get("a.png").unwrap();
        let second = res.get("a.png").unwrap();
        assert!(Rc::ptr_eq(&first, &second));
        assert_eq!(ctx.texture_count(), 1);

        assert!(res.get("missing.png").is_none());
        write_png(dir.path(), "missing.png", Color::WHITE);
        assert!(res.get("missing.png").is_none(), "absence is cached");
        res.evict("missing.png");
        assert!(res.get("missing.png").is_some());
    }

    #[test]
    fn clearing_releases_unshared_textures() {
        let dir = tempfile::tempdir().unwrap();
        write_png(dir.path(), "a.png", Color::WHITE);
        write_png(dir.path(), "b.png", Color::WHITE);
        let ctx = RenderContext::new();
        let mut res = SkinResources::new(&ctx, vec![dir.path().to_path_buf()]);

        let kept = res.get("a.png").unwrap();
        res.get("b.png");
        assert_eq!(ctx.texture_count(), 2);

        res.clear();
        assert!(res.is_empty());
        assert_eq!(ctx.texture_count(), 1);
        drop(kept);
        assert_eq!(ctx.texture_count(), 0);
    }

    #[test]
    fn corrupt_file_is_a_cached_miss() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("bad.png"), b"junk").unwrap();
        let ctx = RenderContext::new();
        let mut res = SkinResources::new(&ctx, vec![dir.path().to_path_buf()]);
        assert!(res.get("bad.png").is_none());
        assert_eq!(res.len(), 1);
    }
}
