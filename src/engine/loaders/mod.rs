pub mod gltf_loader;

pub use gltf_loader::{ load_scene, load_scene_from_slice, LoadedScene };
