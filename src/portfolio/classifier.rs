use std::f32::consts::TAU;

use rand::Rng;

use crate::engine::components::{ ancestor_chain, traverse, SceneTree };

/// Named sub-nodes of a loaded model, found by case-insensitive substring match
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeClassification<Id> {
    pub heads: Vec<Id>,
    pub ears: Vec<Id>,
    pub legs: Vec<Id>,
}

impl<Id> Default for NodeClassification<Id> {
    fn default() -> Self {
        Self { heads: Vec::new(), ears: Vec::new(), legs: Vec::new() }
    }
}

/// Per-leg idle sway: `sin(t * speed + phase) * amplitude`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LegOffset {
    pub phase: f32,
    pub speed: f32,
    pub amplitude: f32,
}

impl LegOffset {
    pub fn swing(&self, time: f32) -> f32 {
        (time * self.speed + self.phase).sin() * self.amplitude
    }
}

/// Everything the animator needs to know about a model, computed once per load
#[derive(Debug, Clone, PartialEq)]
pub struct RigInfo<Id> {
    pub classification: NodeClassification<Id>,
    pub head_rig: Option<Id>,
    pub leg_offsets: Vec<LegOffset>,
}

/// Walk the tree below `root` and sort nodes into heads, ears and legs.
///
/// A node may land in more than one list ("EarLeg" is both). Unnamed nodes
/// match nothing.
pub fn classify_nodes<T: SceneTree>(tree: &T, root: T::Id) -> NodeClassification<T::Id> {
    let mut classification = NodeClassification::default();
    for id in traverse(tree, root) {
        let name = tree.node_name(id).to_lowercase();
        if name.is_empty() {
            continue;
        }
        if name.contains("head") {
            classification.heads.push(id);
        }
        if name.contains("ear") {
            classification.ears.push(id);
        }
        if name.contains("leg") {
            classification.legs.push(id);
        }
    }
    classification
}

/// Deepest node that is an ancestor-or-self of every node in `nodes`.
///
/// Walks the first node's chain outward and returns the first entry present
/// in every other chain. `None` for an empty set or disjoint trees.
pub fn lowest_common_ancestor<T: SceneTree>(tree: &T, nodes: &[T::Id]) -> Option<T::Id> {
    let (first, rest) = nodes.split_first()?;
    let chains: Vec<Vec<T::Id>> = rest
        .iter()
        .map(|id| ancestor_chain(tree, *id))
        .collect();

    ancestor_chain(tree, *first)
        .into_iter()
        .find(|candidate| chains.iter().all(|chain| chain.contains(candidate)))
}

/// Node the head-tracking targets: the common ancestor of the first head and
/// every ear, unless that is the scene root, in which case the first head.
pub fn head_rig<T: SceneTree>(tree: &T, scene_root: T::Id, classification: &NodeClassification<T::Id>) -> Option<T::Id> {
    let head = classification.heads.first().copied();
    let candidates: Vec<T::Id> = head.into_iter().chain(classification.ears.iter().copied()).collect();

    match lowest_common_ancestor(tree, &candidates) {
        Some(rig) if rig != scene_root => Some(rig),
        _ => head,
    }
}

/// One random sway per leg: phase in [0, 2π), speed in [1.5, 2), amplitude in [0.06, 0.1)
pub fn generate_leg_offsets<R: Rng>(count: usize, rng: &mut R) -> Vec<LegOffset> {
    (0..count)
        .map(|_| LegOffset {
            phase: rng.random::<f32>() * TAU,
            speed: 1.5 + rng.random::<f32>() * 0.5,
            amplitude: 0.06 + rng.random::<f32>() * 0.04,
        })
        .collect()
}

/// Classify, pick the head rig and roll leg offsets in one go
pub fn build_rig<T: SceneTree, R: Rng>(tree: &T, scene_root: T::Id, rng: &mut R) -> RigInfo<T::Id> {
    let classification = classify_nodes(tree, scene_root);
    let head_rig = head_rig(tree, scene_root, &classification);
    let leg_offsets = generate_leg_offsets(classification.legs.len(), rng);

    log::info!(
        "[SHEEP] Classified {} head, {} ear, {} leg nodes; head rig {}",
        classification.heads.len(),
        classification.ears.len(),
        classification.legs.len(),
        if head_rig.is_some() { "found" } else { "missing" }
    );

    RigInfo { classification, head_rig, leg_offsets }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    /// Flat parent-pointer tree for exercising the algorithms without a scene graph
    struct Tree {
        nodes: Vec<(&'static str, Option<usize>)>,
    }

    impl SceneTree for Tree {
        type Id = usize;

        fn node_name(&self, id: usize) -> &str {
            self.nodes[id].0
        }

        fn parent_of(&self, id: usize) -> Option<usize> {
            self.nodes[id].1
        }

        fn children_of(&self, id: usize) -> Vec<usize> {
            (0..self.nodes.len()).filter(|c| self.nodes[*c].1 == Some(id)).collect()
        }
    }

    // 0 Scene
    // └ 1 Body
    //   ├ 2 Neck
    //   │ ├ 3 HeadMesh
    //   │ ├ 4 Ear_L
    //   │ └ 5 ear_r
    //   ├ 6 LegFront
    //   └ 7 leg_back
    fn sheep() -> Tree {
        Tree {
            nodes: vec![
                ("Scene", None),
                ("Body", Some(0)),
                ("Neck", Some(1)),
                ("HeadMesh", Some(2)),
                ("Ear_L", Some(2)),
                ("ear_r", Some(2)),
                ("LegFront", Some(1)),
                ("leg_back", Some(1)),
            ],
        }
    }

    #[test]
    fn classification_ignores_case() {
        let c = classify_nodes(&sheep(), 0);
        assert_eq!(c.heads, vec![3]);
        assert_eq!(c.ears, vec![4, 5]);
        assert_eq!(c.legs, vec![6, 7]);
    }

    #[test]
    fn siblings_share_their_parent() {
        // A -> B -> root, C -> B -> root
        let tree = Tree { nodes: vec![("root", None), ("B", Some(0)), ("A", Some(1)), ("C", Some(1))] };
        assert_eq!(lowest_common_ancestor(&tree, &[2, 3]), Some(1));
    }

    #[test]
    fn a_node_is_its_own_ancestor() {
        let tree = sheep();
        assert_eq!(lowest_common_ancestor(&tree, &[2, 4]), Some(2));
        assert_eq!(lowest_common_ancestor(&tree, &[6]), Some(6));
    }

    #[test]
    fn disjoint_trees_have_no_common_ancestor() {
        let tree = Tree { nodes: vec![("a", None), ("b", Some(0)), ("c", None), ("d", Some(2))] };
        assert_eq!(lowest_common_ancestor(&tree, &[1, 3]), None);
        assert_eq!(lowest_common_ancestor(&tree, &[]), None);
    }

    #[test]
    fn head_rig_is_the_common_ancestor_of_head_and_ears() {
        let tree = sheep();
        let c = classify_nodes(&tree, 0);
        assert_eq!(head_rig(&tree, 0, &c), Some(2));
    }

    #[test]
    fn scene_root_is_never_the_head_rig() {
        // Head and ear only meet at the scene root
        let tree = Tree { nodes: vec![("Scene", None), ("Head", Some(0)), ("Ear", Some(0))] };
        let c = classify_nodes(&tree, 0);
        assert_eq!(head_rig(&tree, 0, &c), Some(1));
    }

    #[test]
    fn no_head_and_no_ears_means_no_rig() {
        let tree = Tree { nodes: vec![("Scene", None), ("Body", Some(0)), ("Tail", Some(1))] };
        let c = classify_nodes(&tree, 0);
        assert_eq!(c, NodeClassification::default());
        assert_eq!(head_rig(&tree, 0, &c), None);
    }

    #[test]
    fn ears_without_a_head_still_find_their_parent() {
        let tree = Tree { nodes: vec![("Scene", None), ("Skull", Some(0)), ("EarL", Some(1)), ("EarR", Some(1))] };
        let c = classify_nodes(&tree, 0);
        assert_eq!(head_rig(&tree, 0, &c), Some(1));
    }

    #[test]
    fn leg_offsets_fall_in_range() {
        let mut rng = StdRng::seed_from_u64(7);
        let offsets = generate_leg_offsets(64, &mut rng);
        assert_eq!(offsets.len(), 64);
        for o in offsets {
            assert!((0.0..TAU).contains(&o.phase), "phase {}", o.phase);
            assert!((1.5..2.0).contains(&o.speed), "speed {}", o.speed);
            assert!((0.06..0.1).contains(&o.amplitude), "amplitude {}", o.amplitude);
        }
    }

    #[test]
    fn one_offset_per_leg() {
        let mut rng = StdRng::seed_from_u64(1);
        let rig = build_rig(&sheep(), 0, &mut rng);
        assert_eq!(rig.leg_offsets.len(), rig.classification.legs.len());
        assert_eq!(rig.head_rig, Some(2));
    }
}
