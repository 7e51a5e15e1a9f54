use glam::{Mat4, Quat, Vec2, Vec3};
use slotmap::{SlotMap, new_key_type};

new_key_type! {
    /// Arena key of a node inside an [`ImportedScene`].
    pub struct NodeKey;
}

/// A node of the imported transform hierarchy.
///
/// Nodes carry no component data. Meshes reference nodes through
/// [`SceneBone`] bindings and animations reference them by name.
#[derive(Debug, Clone)]
pub struct SceneNode {
    pub name: String,
    /// Transform relative to the parent node.
    pub transform: Mat4,
    pub(crate) parent: Option<NodeKey>,
    pub(crate) children: Vec<NodeKey>,
}

impl SceneNode {
    #[must_use]
    pub fn new(name: impl Into<String>, transform: Mat4) -> Self {
        Self {
            name: name.into(),
            transform,
            parent: None,
            children: Vec::new(),
        }
    }

    #[inline]
    #[must_use]
    pub fn parent(&self) -> Option<NodeKey> {
        self.parent
    }

    /// Children in the order the source file lists them.
    #[inline]
    #[must_use]
    pub fn children(&self) -> &[NodeKey] {
        &self.children
    }
}

/// One `(vertex, weight)` entry of a bone binding.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VertexWeight {
    pub vertex: u32,
    pub weight: f32,
}

/// A node bound as a bone by a mesh.
#[derive(Debug, Clone)]
pub struct SceneBone {
    /// The node whose transform drives this bone.
    pub node: NodeKey,
    /// Root node of the skeleton this bone belongs to.
    pub armature: NodeKey,
    /// Mesh bind space to bone space.
    pub offset_matrix: Mat4,
    pub weights: Vec<VertexWeight>,
}

/// Triangle-list geometry plus its bone bindings.
#[derive(Debug, Clone, Default)]
pub struct SceneMesh {
    pub name: String,
    pub positions: Vec<Vec3>,
    /// Same length as `positions`.
    pub normals: Vec<Vec3>,
    /// Same length as `positions`.
    pub uvs: Vec<Vec2>,
    pub indices: Vec<u32>,
    pub material: Option<usize>,
    pub bones: Vec<SceneBone>,
}

impl SceneMesh {
    #[inline]
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    #[inline]
    #[must_use]
    pub fn has_bones(&self) -> bool {
        !self.bones.is_empty()
    }
}

/// Texture references of a material, as paths relative to the scene file.
#[derive(Debug, Clone, Default)]
pub struct SceneMaterial {
    pub name: String,
    pub diffuse_textures: Vec<String>,
    pub specular_textures: Vec<String>,
}

/// Timestamped sample, time expressed in ticks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Key<T> {
    pub time: f64,
    pub value: T,
}

impl<T> Key<T> {
    #[inline]
    pub fn new(time: f64, value: T) -> Self {
        Self { time, value }
    }
}

/// Keyframes of one node inside one animation.
#[derive(Debug, Clone, Default)]
pub struct NodeChannel {
    pub node_name: String,
    pub position_keys: Vec<Key<Vec3>>,
    pub scale_keys: Vec<Key<Vec3>>,
    pub rotation_keys: Vec<Key<Quat>>,
}

#[derive(Debug, Clone, Default)]
pub struct SceneAnimation {
    pub name: String,
    pub ticks_per_second: f64,
    pub duration_ticks: f64,
    pub channels: Vec<NodeChannel>,
}

/// Generic in-memory scene produced by a [`SceneImporter`](crate::import::SceneImporter).
#[derive(Debug, Clone, Default)]
pub struct ImportedScene {
    pub nodes: SlotMap<NodeKey, SceneNode>,
    pub root: Option<NodeKey>,
    pub meshes: Vec<SceneMesh>,
    pub materials: Vec<SceneMaterial>,
    pub animations: Vec<SceneAnimation>,
}

impl ImportedScene {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a detached node.
    pub fn create_node(&mut self, name: impl Into<String>, transform: Mat4) -> NodeKey {
        self.nodes.insert(SceneNode::new(name, transform))
    }

    /// Creates a node and attaches it under `parent` in one step.
    pub fn create_child(&mut self, parent: NodeKey, name: impl Into<String>, transform: Mat4) -> NodeKey {
        let key = self.create_node(name, transform);
        self.attach(key, parent);
        key
    }

    pub fn set_root(&mut self, root: NodeKey) {
        self.root = Some(root);
    }

    /// Moves `child` under `parent`, appending it to the parent's child list.
    pub fn attach(&mut self, child: NodeKey, parent: NodeKey) {
        if child == parent {
            log::warn!("Cannot attach node to itself!");
            return;
        }
        if !self.nodes.contains_key(parent) {
            log::error!("Parent node not found during attach!");
            return;
        }

        let old_parent = self.nodes.get(child).and_then(|n| n.parent);
        if let Some(p) = old_parent
            && let Some(n) = self.nodes.get_mut(p)
            && let Some(i) = n.children.iter().position(|&x| x == child)
        {
            n.children.remove(i);
        }

        if let Some(p) = self.nodes.get_mut(parent) {
            p.children.push(child);
        }
        if let Some(c) = self.nodes.get_mut(child) {
            c.parent = Some(parent);
        }
    }

    #[inline]
    #[must_use]
    pub fn node(&self, key: NodeKey) -> Option<&SceneNode> {
        self.nodes.get(key)
    }

    /// Finds the first node with the given name, in arena order.
    #[must_use]
    pub fn find_node(&self, name: &str) -> Option<NodeKey> {
        self.nodes
            .iter()
            .find_map(|(key, node)| (node.name == name).then_some(key))
    }

    /// Walks from `key` (inclusive) up to the top of its tree.
    pub fn ancestors(&self, key: NodeKey) -> Ancestors<'_> {
        Ancestors {
            scene: self,
            next: self.nodes.contains_key(key).then_some(key),
        }
    }
}

/// Iterator returned by [`ImportedScene::ancestors`].
pub struct Ancestors<'a> {
    scene: &'a ImportedScene,
    next: Option<NodeKey>,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeKey;

    fn next(&mut self) -> Option<NodeKey> {
        let current = self.next?;
        self.next = self.scene.node(current).and_then(SceneNode::parent);
        Some(current)
    }
}
