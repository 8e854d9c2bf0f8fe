use std::collections::HashMap;
use std::path::PathBuf;

use crate::engine::config::AssetPaths;
use crate::engine::loaders::{ load_scene, LoadedScene };

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Assets {
    Tnt,
    Sheep,
}

/// Imports each model at most once and hands out copies.
///
/// A failed import is remembered as missing and never retried; callers get
/// `None` and leave the widget unmounted.
pub struct AssetsManager {
    paths: AssetPaths,
    scenes: HashMap<Assets, Option<LoadedScene>>,
}

impl AssetsManager {
    pub fn new(paths: AssetPaths) -> Self {
        Self {
            paths,
            scenes: HashMap::new(),
        }
    }

    pub fn path_of(&self, asset: Assets) -> &PathBuf {
        match asset {
            Assets::Tnt => &self.paths.tnt_model,
            Assets::Sheep => &self.paths.sheep_model,
        }
    }

    /// Register an already-imported scene, bypassing the filesystem
    pub fn insert(&mut self, asset: Assets, scene: LoadedScene) {
        self.scenes.insert(asset, Some(scene));
    }

    pub fn preload(&mut self, asset: Assets) -> bool {
        if !self.scenes.contains_key(&asset) {
            let path = self.path_of(asset).clone();
            log::info!("[ASSETS] Loading {:?} from {}", asset, path.display());
            let loaded = match load_scene(&path) {
                Ok(scene) => Some(scene),
                Err(e) => {
                    log::warn!("[ASSETS] {:?} unavailable, widget stays empty: {}", asset, e);
                    None
                }
            };
            self.scenes.insert(asset, loaded);
        }
        matches!(self.scenes.get(&asset), Some(Some(_)))
    }

    pub fn get_scene_copy(&mut self, asset: Assets) -> Option<LoadedScene> {
        if !self.preload(asset) {
            return None;
        }
        let scene = self.scenes.get(&asset)?.clone();
        log::debug!("[ASSETS] Retrieved copy of {:?} from cache", asset);
        scene
    }
}
