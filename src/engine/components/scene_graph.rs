use glam::{ Mat4, Quat, Vec3 };

use super::material::Material;
use super::mesh::Mesh;
use super::transform::Transform;
use crate::engine::utils::math::Aabb;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

/// Read-only view of a node hierarchy: names, parent links and children.
///
/// Classification and ancestor searches are written against this trait so
/// they run the same on a loaded [`SceneGraph`] and on hand-built test trees.
pub trait SceneTree {
    type Id: Copy + Eq;

    fn node_name(&self, id: Self::Id) -> &str;
    fn parent_of(&self, id: Self::Id) -> Option<Self::Id>;
    fn children_of(&self, id: Self::Id) -> Vec<Self::Id>;
}

/// Pre-order depth-first walk starting at (and including) `root`
pub fn traverse<T: SceneTree>(tree: &T, root: T::Id) -> Vec<T::Id> {
    let mut order = Vec::new();
    let mut stack = vec![root];
    while let Some(id) = stack.pop() {
        order.push(id);
        let children = tree.children_of(id);
        stack.extend(children.into_iter().rev());
    }
    order
}

/// `id`, its parent, its grandparent ... up to the root
pub fn ancestor_chain<T: SceneTree>(tree: &T, id: T::Id) -> Vec<T::Id> {
    let mut chain = vec![id];
    let mut current = id;
    while let Some(parent) = tree.parent_of(current) {
        chain.push(parent);
        current = parent;
    }
    chain
}

#[derive(Debug, Clone, PartialEq)]
pub struct SceneNode {
    pub name: String,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    pub transform: Transform,
    /// Indices into `SceneGraph::meshes`
    pub meshes: Vec<usize>,
}

/// Arena-backed node hierarchy with the meshes and materials it references
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SceneGraph {
    nodes: Vec<SceneNode>,
    pub meshes: Vec<Mesh>,
    pub materials: Vec<Material>,
}

impl SceneGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_node(&mut self, name: impl Into<String>, parent: Option<NodeId>, transform: Transform) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(SceneNode {
            name: name.into(),
            parent,
            children: Vec::new(),
            transform,
            meshes: Vec::new(),
        });
        if let Some(parent) = parent {
            self.nodes[parent.0].children.push(id);
        }
        id
    }

    /// Insert a new node between `child` and its parent
    pub fn wrap_in_group(&mut self, child: NodeId, name: impl Into<String>, transform: Transform) -> NodeId {
        let old_parent = self.nodes[child.0].parent;
        let group = self.add_node(name, old_parent, transform);
        if let Some(parent) = old_parent {
            self.nodes[parent.0].children.retain(|c| *c != child);
        }
        self.nodes[child.0].parent = Some(group);
        self.nodes[group.0].children.push(child);
        group
    }

    pub fn attach_mesh(&mut self, node: NodeId, mesh: Mesh) -> usize {
        let index = self.meshes.len();
        self.meshes.push(mesh);
        self.nodes[node.0].meshes.push(index);
        index
    }

    pub fn node(&self, id: NodeId) -> &SceneNode {
        &self.nodes[id.0]
    }

    pub fn transform_mut(&mut self, id: NodeId) -> &mut Transform {
        &mut self.nodes[id.0].transform
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.nodes.len()).map(NodeId)
    }

    pub fn find_by_name(&self, name: &str) -> Option<NodeId> {
        self.node_ids().find(|id| self.nodes[id.0].name == name)
    }

    pub fn world_matrix(&self, id: NodeId) -> Mat4 {
        let mut matrix = self.nodes[id.0].transform.matrix();
        let mut current = self.nodes[id.0].parent;
        while let Some(parent) = current {
            matrix = self.nodes[parent.0].transform.matrix() * matrix;
            current = self.nodes[parent.0].parent;
        }
        matrix
    }

    pub fn world_position(&self, id: NodeId) -> Vec3 {
        self.world_matrix(id).w_axis.truncate()
    }

    pub fn world_rotation(&self, id: NodeId) -> Quat {
        let (_, rotation, _) = self.world_matrix(id).to_scale_rotation_translation();
        rotation
    }

    /// Every (node, mesh index) pair under `root`, in traversal order
    pub fn mesh_instances(&self, root: NodeId) -> Vec<(NodeId, usize)> {
        traverse(self, root)
            .into_iter()
            .flat_map(|id| self.nodes[id.0].meshes.iter().map(move |m| (id, *m)))
            .collect()
    }

    /// Indices of the materials used by meshes under `root`, deduplicated
    pub fn materials_under(&self, root: NodeId) -> Vec<usize> {
        let mut used: Vec<usize> = self
            .mesh_instances(root)
            .into_iter()
            .map(|(_, mesh)| self.meshes[mesh].material)
            .filter(|m| *m < self.materials.len())
            .collect();
        used.sort_unstable();
        used.dedup();
        used
    }

    /// World-space bounds of all meshes under `root`
    pub fn world_bounds(&self, root: NodeId) -> Option<Aabb> {
        self.mesh_instances(root)
            .into_iter()
            .filter_map(|(node, mesh)| self.meshes[mesh].world_bounds(self.world_matrix(node)))
            .reduce(|a, b| a.union(&b))
    }
}

impl SceneTree for SceneGraph {
    type Id = NodeId;

    fn node_name(&self, id: NodeId) -> &str {
        &self.nodes[id.0].name
    }

    fn parent_of(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    fn children_of(&self, id: NodeId) -> Vec<NodeId> {
        self.nodes[id.0].children.clone()
    }
}
