pub mod components;
pub mod config;
pub mod error;
pub mod loaders;
pub mod managers;
pub mod rendering;
pub mod systems;
pub mod utils;

// Re-export all commonly used items for easy access
pub use components::*;
pub use config::SiteConfig;
pub use error::{ ConfigError, SceneError, SceneResult };
pub use managers::*;
pub use systems::*;
pub use utils::*;
