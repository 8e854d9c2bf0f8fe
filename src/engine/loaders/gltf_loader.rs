use std::path::Path;

use glam::Vec3;
use gltf::buffer::Data;

use crate::engine::components::{ Material, Mesh, NodeId, SceneGraph, Transform };
use crate::engine::error::{ SceneError, SceneResult };

/// A model imported into its own scene graph
#[derive(Debug, Clone)]
pub struct LoadedScene {
    pub graph: SceneGraph,
    /// Node standing in for the glTF scene itself; every imported node hangs below it
    pub scene_root: NodeId,
}

pub fn load_scene(path: &Path) -> SceneResult<LoadedScene> {
    let (document, buffers, _images) = gltf::import(path).map_err(|source| SceneError::Import {
        path: path.to_path_buf(),
        source,
    })?;
    build_scene(&document, &buffers, path)
}

/// Import from an in-memory .glb or self-contained .gltf
pub fn load_scene_from_slice(bytes: &[u8], label: &str) -> SceneResult<LoadedScene> {
    let (document, buffers, _images) = gltf::import_slice(bytes).map_err(|source| SceneError::Import {
        path: label.into(),
        source,
    })?;
    build_scene(&document, &buffers, Path::new(label))
}

fn build_scene(document: &gltf::Document, buffers: &[Data], path: &Path) -> SceneResult<LoadedScene> {
    let scene = document
        .default_scene()
        .or_else(|| document.scenes().next())
        .ok_or_else(|| SceneError::MissingScene(path.to_path_buf()))?;

    let mut graph = SceneGraph::new();
    graph.materials = document.materials().map(|m| extract_material(&m)).collect();
    let default_material = graph.materials.len();
    graph.materials.push(Material::default());

    let scene_root = graph.add_node(scene.name().unwrap_or("Scene"), None, Transform::identity());
    for node in scene.nodes() {
        add_node(&mut graph, buffers, &node, scene_root, default_material)?;
    }

    log::info!(
        "[ASSETS] Imported {}: {} nodes, {} meshes, {} materials",
        path.display(),
        graph.len(),
        graph.meshes.len(),
        graph.materials.len()
    );

    Ok(LoadedScene { graph, scene_root })
}

fn add_node(
    graph: &mut SceneGraph,
    buffers: &[Data],
    node: &gltf::Node,
    parent: NodeId,
    default_material: usize
) -> SceneResult<()> {
    let (t, r, s) = node.transform().decomposed();
    let name = node.name().unwrap_or("");
    let id = graph.add_node(name, Some(parent), Transform::from_decomposed(t, r, s));

    if let Some(mesh) = node.mesh() {
        for primitive in mesh.primitives() {
            if primitive.mode() != gltf::mesh::Mode::Triangles {
                log::debug!("[ASSETS] Skipping non-triangle primitive on '{}'", name);
                continue;
            }
            let material = primitive.material().index().unwrap_or(default_material);
            let extracted = extract_mesh(buffers, &primitive, name, material)?;
            graph.attach_mesh(id, extracted);
        }
    }

    for child in node.children() {
        add_node(graph, buffers, &child, id, default_material)?;
    }
    Ok(())
}

fn extract_mesh(buffers: &[Data], primitive: &gltf::Primitive, node_name: &str, material: usize) -> SceneResult<Mesh> {
    let reader = primitive.reader(|buffer| buffers.get(buffer.index()).map(|data| data.0.as_slice()));

    let positions: Vec<[f32; 3]> = reader
        .read_positions()
        .ok_or_else(|| SceneError::MissingPositions { node: node_name.to_string() })?
        .collect();
    let normals: Option<Vec<[f32; 3]>> = reader.read_normals().map(|n| n.collect());
    let indices: Option<Vec<u32>> = reader.read_indices().map(|i| i.into_u32().collect());

    Ok(Mesh::new(positions, normals, indices, material))
}

fn extract_material(material: &gltf::Material) -> Material {
    let pbr = material.pbr_metallic_roughness();
    let [r, g, b, a] = pbr.base_color_factor();

    let mut mat = Material::new(material.name().unwrap_or("unnamed"), Vec3::new(r, g, b));
    mat.opacity = a;
    mat.transparent = material.alpha_mode() == gltf::material::AlphaMode::Blend;
    mat.metallic_factor = pbr.metallic_factor();
    mat.roughness_factor = pbr.roughness_factor();
    mat.double_sided = material.double_sided();
    mat.emissive = Vec3::from_array(material.emissive_factor());
    mat
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::components::SceneTree;
    use pretty_assertions::assert_eq;

    const RIG: &str = r#"{
        "asset": { "version": "2.0" },
        "scene": 0,
        "scenes": [ { "name": "Sheep", "nodes": [0] } ],
        "nodes": [
            { "name": "Body", "children": [1, 2], "translation": [0.0, 1.0, 0.0] },
            { "name": "Head", "children": [3] },
            { "name": "Leg_Front" },
            { "name": "Ear_L", "rotation": [0.0, 0.0, 0.0, 1.0] }
        ]
    }"#;

    #[test]
    fn nodes_hang_below_the_scene_root() {
        let loaded = load_scene_from_slice(RIG.as_bytes(), "rig.gltf").unwrap();
        let graph = &loaded.graph;
        assert_eq!(graph.node_name(loaded.scene_root), "Sheep");
        assert_eq!(graph.len(), 5);

        let body = graph.find_by_name("Body").unwrap();
        let ear = graph.find_by_name("Ear_L").unwrap();
        assert_eq!(graph.parent_of(body), Some(loaded.scene_root));
        assert_eq!(graph.parent_of(ear), graph.find_by_name("Head"));
        assert!(graph.world_position(ear).abs_diff_eq(Vec3::Y, 1e-6));
        // Only the fallback material exists
        assert_eq!(graph.materials.len(), 1);
    }

    #[test]
    fn double_sided_materials_keep_their_back_faces() {
        let source = r#"{
            "asset": { "version": "2.0" },
            "scenes": [ { "nodes": [0] } ],
            "nodes": [ { "name": "Patch" } ],
            "materials": [
                { "name": "Grass", "doubleSided": true },
                { "name": "Wool" }
            ]
        }"#;
        let loaded = load_scene_from_slice(source.as_bytes(), "mats.gltf").unwrap();
        let materials = &loaded.graph.materials;
        assert_eq!(materials[0].name, "Grass");
        assert!(!materials[0].culls_back_faces());
        assert!(materials[1].culls_back_faces());
        assert!(materials[2].culls_back_faces());
    }

    #[test]
    fn garbage_is_an_import_error() {
        let err = load_scene_from_slice(b"not a model", "junk.gltf").unwrap_err();
        assert!(matches!(err, SceneError::Import { .. }));
    }

    #[test]
    fn missing_file_is_an_import_error() {
        let err = load_scene(Path::new("no/such/model.gltf")).unwrap_err();
        assert!(matches!(err, SceneError::Import { .. }));
    }
}
