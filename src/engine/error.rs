use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while importing a model or preparing it for the GPU
#[derive(Error, Debug)]
pub enum SceneError {
    #[error("glTF import failed for {path}: {source}")]
    Import {
        path: PathBuf,
        #[source]
        source: gltf::Error,
    },

    #[error("no scene found in {0}")]
    MissingScene(PathBuf),

    #[error("primitive on node '{node}' has no positions")]
    MissingPositions { node: String },

    #[error("GL resource creation failed: {0}")]
    Gl(String),

    #[error("{stage} shader error: {log}")]
    Shader { stage: &'static str, log: String },
}

/// Errors raised while reading the site configuration file
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("could not read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),
}

pub type SceneResult<T> = std::result::Result<T, SceneError>;
