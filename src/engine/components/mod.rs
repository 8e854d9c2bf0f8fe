pub mod camera;
pub mod material;
pub mod mesh;
pub mod scene_graph;
pub mod transform;

pub use camera::Camera;
pub use material::Material;
pub use mesh::Mesh;
pub use scene_graph::{ ancestor_chain, traverse, NodeId, SceneGraph, SceneNode, SceneTree };
pub use transform::Transform;
