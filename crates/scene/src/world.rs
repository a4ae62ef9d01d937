use crate::components::{Light, NodeKind, Transform};
use crate::node::NodeId;
use foundation::bounds::Aabb3;
use foundation::handles::Handle;
use foundation::math::Mat4;

pub const SCENE_ROOT_NAME: &str = "Scene";
/// Group that model loaders wrap an imported scene in.
pub const MODEL_ROOT_NAME: &str = "modelRoot";

/// Scene graph stored as parallel per-node columns.
///
/// Index 0 is always the scene root (a group named [`SCENE_ROOT_NAME`]).
/// Nodes are never removed; a model reload builds a fresh `World`.
#[derive(Debug)]
pub struct World {
    names: Vec<String>,
    kinds: Vec<NodeKind>,
    transforms: Vec<Transform>,
    visible: Vec<bool>,
    parents: Vec<Option<NodeId>>,
    children: Vec<Vec<NodeId>>,
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

impl World {
    pub fn new() -> Self {
        Self {
            names: vec![SCENE_ROOT_NAME.to_string()],
            kinds: vec![NodeKind::Group],
            transforms: vec![Transform::identity()],
            visible: vec![true],
            parents: vec![None],
            children: vec![Vec::new()],
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId(Handle::new(0, 0))
    }

    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() <= 1
    }

    pub fn contains(&self, node: NodeId) -> bool {
        self.slot(node).is_some()
    }

    /// Column index of `node`; `None` for handles this world never issued.
    fn slot(&self, node: NodeId) -> Option<usize> {
        let index = node.index() as usize;
        (node.generation() == 0 && index < self.kinds.len()).then_some(index)
    }

    /// Appends a node as the last child of `parent`.
    ///
    /// An unknown parent attaches the node to the scene root.
    pub fn spawn(&mut self, parent: NodeId, name: impl Into<String>, kind: NodeKind) -> NodeId {
        let parent = if self.contains(parent) {
            parent
        } else {
            tracing::warn!("spawn: unknown parent {parent}, attaching to scene root");
            self.root()
        };

        let id = NodeId(Handle::new(self.kinds.len() as u32, 0));
        self.names.push(name.into());
        self.kinds.push(kind);
        self.transforms.push(Transform::identity());
        self.visible.push(true);
        self.parents.push(Some(parent));
        self.children.push(Vec::new());
        self.children[parent.index() as usize].push(id);
        id
    }

    pub fn spawn_group(&mut self, parent: NodeId, name: impl Into<String>) -> NodeId {
        self.spawn(parent, name, NodeKind::Group)
    }

    pub fn set_transform(&mut self, node: NodeId, transform: Transform) {
        if let Some(slot) = self.slot(node).and_then(|i| self.transforms.get_mut(i)) {
            *slot = transform;
        }
    }

    pub fn set_visible(&mut self, node: NodeId, visible: bool) {
        if let Some(slot) = self.slot(node).and_then(|i| self.visible.get_mut(i)) {
            *slot = visible;
        }
    }

    pub fn name(&self, node: NodeId) -> Option<&str> {
        self.slot(node).map(|i| self.names[i].as_str())
    }

    pub fn kind(&self, node: NodeId) -> Option<&NodeKind> {
        self.slot(node).map(|i| &self.kinds[i])
    }

    pub fn transform(&self, node: NodeId) -> Option<Transform> {
        self.slot(node).map(|i| self.transforms[i])
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.slot(node).and_then(|i| self.parents[i])
    }

    pub fn children(&self, node: NodeId) -> &[NodeId] {
        self.slot(node)
            .map(|i| self.children[i].as_slice())
            .unwrap_or(&[])
    }

    /// Depth-first pre-order walk of `start` and all its descendants,
    /// children visited in insertion order.
    pub fn traverse(&self, start: NodeId) -> Traverse<'_> {
        let stack = if self.contains(start) {
            vec![start]
        } else {
            Vec::new()
        };
        Traverse { world: self, stack }
    }

    /// First node named `name` in a walk from the scene root.
    pub fn find_by_name(&self, name: &str) -> Option<NodeId> {
        self.traverse(self.root())
            .find(|&node| self.name(node) == Some(name))
    }

    /// The loaded model: the node named [`MODEL_ROOT_NAME`], else the most
    /// recently added group or mesh directly under the scene root.
    pub fn model_root(&self) -> Option<NodeId> {
        self.find_by_name(MODEL_ROOT_NAME).or_else(|| {
            self.children(self.root())
                .iter()
                .rev()
                .copied()
                .find(|&n| matches!(self.kind(n), Some(NodeKind::Group | NodeKind::Mesh(_))))
        })
    }

    /// Mesh descendants of `start` (including `start` itself), in traversal order.
    pub fn meshes_under(&self, start: NodeId) -> Vec<NodeId> {
        self.traverse(start)
            .filter(|&node| self.kind(node).is_some_and(NodeKind::is_mesh))
            .collect()
    }

    pub fn lights(&self) -> Vec<(NodeId, Light)> {
        self.traverse(self.root())
            .filter_map(|node| match self.kind(node) {
                Some(NodeKind::Light(light)) => Some((node, *light)),
                _ => None,
            })
            .collect()
    }

    /// Local-to-world matrix: the product of every ancestor's local transform.
    pub fn world_matrix(&self, node: NodeId) -> Mat4 {
        let mut m = Mat4::IDENTITY;
        let mut cur = Some(node);
        while let Some(n) = cur {
            let Some(t) = self.transform(n) else { break };
            m = t.matrix * m;
            cur = self.parent(n);
        }
        m
    }

    /// False when the node or any ancestor is hidden.
    pub fn is_visible_in_hierarchy(&self, node: NodeId) -> bool {
        let mut cur = Some(node);
        while let Some(n) = cur {
            if !self.slot(n).is_some_and(|i| self.visible[i]) {
                return false;
            }
            cur = self.parent(n);
        }
        true
    }

    /// World-space bounds of every mesh in the subtree rooted at `node`.
    ///
    /// Each mesh contributes its local bounds transformed by its world matrix.
    pub fn world_bounds(&self, node: NodeId) -> Aabb3 {
        let mut bounds = Aabb3::empty();
        if !self.contains(node) {
            return bounds;
        }

        let parent_world = self
            .parent(node)
            .map(|p| self.world_matrix(p))
            .unwrap_or(Mat4::IDENTITY);
        let mut stack = vec![(node, parent_world)];
        while let Some((n, parent_world)) = stack.pop() {
            let local = self.transform(n).unwrap_or_default().matrix;
            let world = parent_world * local;
            if let Some(geometry) = self.kind(n).and_then(NodeKind::geometry) {
                bounds = bounds.union(&geometry.bounds.transformed(&world));
            }
            for &child in self.children(n) {
                stack.push((child, world));
            }
        }
        bounds
    }

    /// Union of [`World::world_bounds`] over `nodes`.
    pub fn union_bounds(&self, nodes: &[NodeId]) -> Aabb3 {
        nodes
            .iter()
            .fold(Aabb3::empty(), |acc, &n| acc.union(&self.world_bounds(n)))
    }
}

pub struct Traverse<'a> {
    world: &'a World,
    stack: Vec<NodeId>,
}

impl Iterator for Traverse<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack
            .extend(self.world.children(node).iter().rev().copied());
        Some(node)
    }
}
