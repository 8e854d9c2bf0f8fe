use std::fs;
use std::io::ErrorKind;
use std::path::{ Path, PathBuf };

use glam::Vec3;
use once_cell::sync::OnceCell;
use serde::{ Deserialize, Serialize };

use super::error::ConfigError;

/// Environment variable naming an alternative config file
pub const CONFIG_ENV_VAR: &str = "PORTFOLIO_CONFIG";
pub const DEFAULT_CONFIG_FILE: &str = "portfolio.json";

static SITE_CONFIG: OnceCell<SiteConfig> = OnceCell::new();

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct SiteConfig {
    pub assets: AssetPaths,
    pub phase: PhaseConfig,
    pub tnt: TntConfig,
    pub sheep: SheepConfig,
    /// Fixed seed for leg offsets and flourish timing; drawn from the OS when absent
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetPaths {
    pub tnt_model: PathBuf,
    pub sheep_model: PathBuf,
}

impl Default for AssetPaths {
    fn default() -> Self {
        Self {
            tnt_model: PathBuf::from("assets/models/TNT.gltf"),
            sheep_model: PathBuf::from("assets/models/Sheep.gltf"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhaseConfig {
    /// Seconds between the TNT click and the portfolio reveal
    pub fuse_delay: f32,
}

impl Default for PhaseConfig {
    fn default() -> Self {
        Self { fuse_delay: 1.5 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub position: [f32; 3],
    pub fov_degrees: f32,
}

impl CameraConfig {
    pub fn position(&self) -> Vec3 {
        Vec3::from_array(self.position)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TntConfig {
    pub camera: CameraConfig,
    pub base_scale: f32,
    pub yaw: f32,
    /// Scale multiplier reached at the end of the fuse
    pub fuse_swell: f32,
}

impl Default for TntConfig {
    fn default() -> Self {
        Self {
            camera: CameraConfig { position: [0.0, 0.5, 5.0], fov_degrees: 40.0 },
            base_scale: 0.26,
            yaw: 0.4,
            fuse_swell: 1.2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SheepConfig {
    pub camera: CameraConfig,
    pub base_scale: f32,
    pub entrance_duration: f32,
    /// Fraction of `base_scale` the entrance starts from
    pub entrance_min_scale: f32,
    pub special_interval_min: f32,
    pub special_interval_jitter: f32,
    pub special_duration: f32,
    pub idle_bob_amplitude: f32,
    pub idle_bob_speed: f32,
    pub hop_height: f32,
    pub wiggle_amplitude: f32,
    pub body_blend: f32,
    pub head_blend: f32,
    pub look_distance: f32,
    pub model_faces_positive_z: bool,
    pub initial_cursor: [f32; 2],
}

impl Default for SheepConfig {
    fn default() -> Self {
        Self {
            camera: CameraConfig { position: [0.0, 0.0, 5.0], fov_degrees: 35.0 },
            base_scale: 0.4,
            entrance_duration: 0.8,
            entrance_min_scale: 0.5,
            special_interval_min: 8.0,
            special_interval_jitter: 2.0,
            special_duration: 0.6,
            idle_bob_amplitude: 0.02,
            idle_bob_speed: 1.5,
            hop_height: 0.15,
            wiggle_amplitude: 0.15,
            body_blend: 0.08,
            head_blend: 0.18,
            look_distance: 10.0,
            model_faces_positive_z: true,
            initial_cursor: [-0.5, 0.0],
        }
    }
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self { position: [0.0, 0.0, 5.0], fov_degrees: 50.0 }
    }
}

impl SiteConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read a config file. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        match fs::read_to_string(path) {
            Ok(json) => Self::from_json(&json),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                log::info!("[CONFIG] {} not found, using defaults", path.display());
                Ok(Self::default())
            }
            Err(source) => Err(ConfigError::Io { path: path.to_path_buf(), source }),
        }
    }

    /// Path named by `PORTFOLIO_CONFIG`, else `portfolio.json`
    pub fn default_path() -> PathBuf {
        std::env::var_os(CONFIG_ENV_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE))
    }

    /// Install the process-wide config. Only the first call wins.
    pub fn install(config: SiteConfig) -> &'static SiteConfig {
        if SITE_CONFIG.set(config).is_err() {
            log::warn!("[CONFIG] config already installed, keeping the first one");
        }
        Self::global()
    }

    pub fn global() -> &'static SiteConfig {
        SITE_CONFIG.get_or_init(SiteConfig::default)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_json_gives_defaults() {
        let config = SiteConfig::from_json("{}").unwrap();
        assert_eq!(config, SiteConfig::default());
        assert_eq!(config.phase.fuse_delay, 1.5);
        assert_eq!(config.sheep.body_blend, 0.08);
        assert_eq!(config.sheep.head_blend, 0.18);
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config = SiteConfig::from_json(
            r#"{ "sheep": { "base_scale": 0.5 }, "assets": { "sheep_model": "m/sheep.glb" } }"#
        ).unwrap();
        assert_eq!(config.sheep.base_scale, 0.5);
        assert_eq!(config.sheep.special_duration, 0.6);
        assert_eq!(config.assets.sheep_model, PathBuf::from("m/sheep.glb"));
        assert_eq!(config.assets.tnt_model, AssetPaths::default().tnt_model);
        assert_eq!(config.seed, None);
    }

    #[test]
    fn seed_is_optional() {
        let config = SiteConfig::from_json(r#"{ "seed": 42 }"#).unwrap();
        assert_eq!(config.seed, Some(42));
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(matches!(SiteConfig::from_json("{ nope"), Err(ConfigError::Json(_))));
    }

    #[test]
    fn missing_file_is_not_an_error() {
        let config = SiteConfig::load(Path::new("definitely/not/here.json")).unwrap();
        assert_eq!(config, SiteConfig::default());
    }
}
