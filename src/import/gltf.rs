use base64::Engine as _;
use glam::{Mat4, Quat, Vec2, Vec3};
use gltf::animation::Interpolation;
use gltf::animation::util::ReadOutputs;
use rustc_hash::{FxHashMap, FxHashSet};

use crate::errors::{Result, SinewError};
use crate::import::scene::{
    ImportedScene, Key, NodeChannel, NodeKey, SceneAnimation, SceneBone, SceneMaterial,
    SceneMesh, SceneNode, VertexWeight,
};
use crate::import::{Dependencies, SceneImporter};
use crate::settings::LoaderSettings;

/// Name of the synthetic node the default scene's roots are attached under.
pub const GLTF_ROOT_NAME: &str = "gltf_root";

/// glTF 2.0 (`.gltf` + `.glb`) adapter.
///
/// Buffers are resolved from the GLB binary chunk, from base64 `data:` URIs,
/// or from external files listed by [`SceneImporter::dependencies`].
/// Image URIs are kept as texture paths and never read here.
#[derive(Debug, Clone, Copy, Default)]
pub struct GltfImporter;

impl GltfImporter {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    fn parse(bytes: &[u8]) -> Result<gltf::Gltf> {
        Ok(gltf::Gltf::from_slice(bytes)?)
    }
}

impl SceneImporter for GltfImporter {
    fn name(&self) -> &str {
        "glTF"
    }

    fn dependencies(&self, bytes: &[u8]) -> Result<Vec<String>> {
        let gltf = Self::parse(bytes)?;
        Ok(gltf
            .buffers()
            .filter_map(|buffer| match buffer.source() {
                gltf::buffer::Source::Uri(uri) if !is_data_uri(uri) => Some(uri.to_string()),
                _ => None,
            })
            .collect())
    }

    fn import(
        &self,
        bytes: &[u8],
        dependencies: &Dependencies,
        settings: &LoaderSettings,
    ) -> Result<ImportedScene> {
        let gltf = Self::parse(bytes)?;
        let buffers = load_buffers(&gltf, dependencies)?;
        GltfLoader::new(&gltf, &buffers, settings).load()
    }
}

// ============================================================================
// Buffers
// ============================================================================

fn is_data_uri(uri: &str) -> bool {
    uri.starts_with("data:")
}

fn decode_data_uri(uri: &str) -> Result<Vec<u8>> {
    let (header, payload) = uri
        .split_once(',')
        .ok_or_else(|| SinewError::DataUri(format!("missing ',' separator in {uri:.32}...")))?;
    if !header.ends_with(";base64") {
        return Err(SinewError::DataUri(format!(
            "only base64 data URIs are supported, got header '{header}'"
        )));
    }
    Ok(base64::engine::general_purpose::STANDARD.decode(payload)?)
}

fn load_buffers(gltf: &gltf::Gltf, dependencies: &Dependencies) -> Result<Vec<Vec<u8>>> {
    let mut buffer_data = Vec::new();
    for buffer in gltf.buffers() {
        let data = match buffer.source() {
            gltf::buffer::Source::Bin => gltf
                .blob
                .clone()
                .ok_or_else(|| SinewError::SceneLoad("Missing GLB binary chunk".into()))?,
            gltf::buffer::Source::Uri(uri) if is_data_uri(uri) => decode_data_uri(uri)?,
            gltf::buffer::Source::Uri(uri) => dependencies
                .get(uri)
                .cloned()
                .ok_or_else(|| SinewError::AssetNotFound(uri.to_string()))?,
        };
        if data.len() < buffer.length() {
            return Err(SinewError::SceneLoad(format!(
                "buffer {} holds {} bytes while {} were declared",
                buffer.index(),
                data.len(),
                buffer.length()
            )));
        }
        buffer_data.push(data);
    }
    Ok(buffer_data)
}

// ============================================================================
// Loader
// ============================================================================

/// Joints of one glTF skin, resolved to scene nodes.
struct SkinInfo {
    joints: Vec<NodeKey>,
    offsets: Vec<Mat4>,
    armature: NodeKey,
}

struct GltfLoader<'a> {
    gltf: &'a gltf::Gltf,
    buffers: &'a [Vec<u8>],
    settings: &'a LoaderSettings,
    scene: ImportedScene,
    // glTF node index -> scene node
    node_mapping: Vec<NodeKey>,
}

impl<'a> GltfLoader<'a> {
    fn new(gltf: &'a gltf::Gltf, buffers: &'a [Vec<u8>], settings: &'a LoaderSettings) -> Self {
        Self {
            gltf,
            buffers,
            settings,
            scene: ImportedScene::new(),
            node_mapping: Vec::with_capacity(gltf.nodes().count()),
        }
    }

    fn load(mut self) -> Result<ImportedScene> {
        self.load_nodes();
        self.load_materials();
        let skins = self.load_skins();
        self.load_meshes(&skins);
        self.load_animations();

        log::debug!(
            "glTF import: {} nodes, {} meshes, {} materials, {} animations",
            self.scene.nodes.len(),
            self.scene.meshes.len(),
            self.scene.materials.len(),
            self.scene.animations.len()
        );
        Ok(self.scene)
    }

    fn buffer_data(&self, buffer: &gltf::Buffer<'_>) -> Option<&'a [u8]> {
        self.buffers.get(buffer.index()).map(Vec::as_slice)
    }

    /// Step 1: every node, then the hierarchy, then the synthetic root.
    fn load_nodes(&mut self) {
        for node in self.gltf.nodes() {
            let name = node
                .name()
                .map_or_else(|| format!("Node_{}", node.index()), str::to_string);
            let transform = Mat4::from_cols_array_2d(&node.transform().matrix());
            let key = self.scene.create_node(name, transform);
            self.node_mapping.push(key);
        }

        for node in self.gltf.nodes() {
            let parent = self.node_mapping[node.index()];
            for child in node.children() {
                self.scene.attach(self.node_mapping[child.index()], parent);
            }
        }

        let root = self.scene.create_node(GLTF_ROOT_NAME, Mat4::IDENTITY);
        self.scene.set_root(root);
        if let Some(default_scene) = self.gltf.default_scene().or_else(|| self.gltf.scenes().next()) {
            for node in default_scene.nodes() {
                self.scene.attach(self.node_mapping[node.index()], root);
            }
        }
    }

    fn load_materials(&mut self) {
        for material in self.gltf.materials() {
            let mut scene_material = SceneMaterial {
                name: material
                    .name()
                    .map_or_else(|| format!("Material_{}", self.scene.materials.len()), str::to_string),
                ..SceneMaterial::default()
            };

            if let Some(info) = material.pbr_metallic_roughness().base_color_texture()
                && let Some(uri) = image_uri(&info.texture())
            {
                scene_material.diffuse_textures.push(uri);
            }

            if let Some(specular) = material.specular()
                && let Some(info) = specular.specular_texture()
                && let Some(uri) = image_uri(&info.texture())
            {
                scene_material.specular_textures.push(uri);
            }

            self.scene.materials.push(scene_material);
        }
    }

    /// Step 3: joints, inverse bind matrices and the armature of every skin.
    fn load_skins(&self) -> Vec<Option<SkinInfo>> {
        self.gltf
            .skins()
            .map(|skin| {
                let joints: Vec<NodeKey> = skin
                    .joints()
                    .map(|node| self.node_mapping[node.index()])
                    .collect();
                if joints.is_empty() {
                    log::warn!("Skin {} declares no joints, ignoring it", skin.index());
                    return None;
                }

                let reader = skin.reader(|buffer| self.buffer_data(&buffer));
                let mut offsets: Vec<Mat4> = reader
                    .read_inverse_bind_matrices()
                    .map(|iter| iter.map(|m| Mat4::from_cols_array_2d(&m)).collect())
                    .unwrap_or_default();
                if offsets.len() != joints.len() {
                    if !offsets.is_empty() {
                        log::warn!(
                            "Skin {}: {} inverse bind matrices for {} joints, padding with identity",
                            skin.index(),
                            offsets.len(),
                            joints.len()
                        );
                    }
                    offsets.resize(joints.len(), Mat4::IDENTITY);
                }

                let joint_set: FxHashSet<NodeKey> = joints.iter().copied().collect();
                let root_joint = skin
                    .skeleton()
                    .map(|node| self.node_mapping[node.index()])
                    .filter(|key| joint_set.contains(key))
                    .or_else(|| {
                        joints.iter().copied().find(|&key| {
                            self.scene
                                .node(key)
                                .and_then(SceneNode::parent)
                                .is_none_or(|parent| !joint_set.contains(&parent))
                        })
                    })
                    .unwrap_or(joints[0]);

                // The armature is the first ancestor of the root joint that is not a joint itself.
                let armature = self
                    .scene
                    .ancestors(root_joint)
                    .find(|key| !joint_set.contains(key))
                    .unwrap_or(root_joint);

                Some(SkinInfo {
                    joints,
                    offsets,
                    armature,
                })
            })
            .collect()
    }

    /// Step 4: one scene mesh per triangle primitive of every mesh-bearing node.
    fn load_meshes(&mut self, skins: &[Option<SkinInfo>]) {
        for node in self.gltf.nodes() {
            let Some(mesh) = node.mesh() else {
                continue;
            };
            let skin = node
                .skin()
                .and_then(|skin| skins.get(skin.index()))
                .and_then(Option::as_ref);

            for primitive in mesh.primitives() {
                if primitive.mode() != gltf::mesh::Mode::Triangles {
                    log::warn!(
                        "Mesh '{}' primitive {} is not a triangle list, skipping it",
                        mesh.name().unwrap_or("unnamed"),
                        primitive.index()
                    );
                    continue;
                }
                if let Some(scene_mesh) = self.load_primitive(&mesh, &primitive, skin) {
                    self.scene.meshes.push(scene_mesh);
                }
            }
        }
    }

    fn load_primitive(
        &self,
        mesh: &gltf::Mesh<'_>,
        primitive: &gltf::Primitive<'_>,
        skin: Option<&SkinInfo>,
    ) -> Option<SceneMesh> {
        let reader = primitive.reader(|buffer| self.buffer_data(&buffer));

        let positions: Vec<Vec3> = reader
            .read_positions()
            .map(|iter| iter.map(Vec3::from_array).collect())
            .unwrap_or_default();
        let vertex_count = positions.len();
        if vertex_count == 0 {
            return None;
        }

        let mut normals: Vec<Vec3> = reader
            .read_normals()
            .map(|iter| iter.map(Vec3::from_array).collect())
            .unwrap_or_default();
        normals.resize(vertex_count, Vec3::ZERO);

        let flip = self.settings.flip_uvs;
        let mut uvs: Vec<Vec2> = reader
            .read_tex_coords(0)
            .map(|coords| {
                coords
                    .into_f32()
                    .map(|[u, v]| if flip { Vec2::new(u, 1.0 - v) } else { Vec2::new(u, v) })
                    .collect()
            })
            .unwrap_or_default();
        uvs.resize(vertex_count, Vec2::ZERO);

        let indices: Vec<u32> = reader
            .read_indices()
            .map_or_else(|| (0..vertex_count as u32).collect(), |iter| iter.into_u32().collect());

        let mut bones = Vec::new();
        if let Some(skin) = skin {
            // Every JOINTS_n / WEIGHTS_n set, so a vertex may end up with more than four contributions.
            let mut per_joint: Vec<Vec<VertexWeight>> = vec![Vec::new(); skin.joints.len()];
            let mut set = 0;
            while let (Some(joints), Some(weights)) = (reader.read_joints(set), reader.read_weights(set)) {
                for (vertex, (joint_ids, joint_weights)) in
                    joints.into_u16().zip(weights.into_f32()).enumerate()
                {
                    for (joint, weight) in joint_ids.into_iter().zip(joint_weights) {
                        if weight <= 0.0 {
                            continue;
                        }
                        if let Some(list) = per_joint.get_mut(usize::from(joint)) {
                            list.push(VertexWeight {
                                vertex: vertex as u32,
                                weight,
                            });
                        } else {
                            log::warn!("Vertex {vertex} references joint {joint} outside its skin");
                        }
                    }
                }
                set += 1;
            }

            bones = skin
                .joints
                .iter()
                .zip(&skin.offsets)
                .zip(per_joint)
                .map(|((&node, &offset_matrix), weights)| SceneBone {
                    node,
                    armature: skin.armature,
                    offset_matrix,
                    weights,
                })
                .collect();
        }

        Some(SceneMesh {
            name: mesh
                .name()
                .map_or_else(|| format!("Mesh_{}", mesh.index()), str::to_string),
            positions,
            normals,
            uvs,
            indices,
            material: primitive.material().index(),
            bones,
        })
    }

    /// Step 5: channels grouped per target node, all in seconds.
    fn load_animations(&mut self) {
        for anim in self.gltf.animations() {
            let mut channels: Vec<NodeChannel> = Vec::new();
            let mut rests: Vec<([f32; 3], [f32; 4], [f32; 3])> = Vec::new();
            let mut slots: FxHashMap<usize, usize> = FxHashMap::default();
            let mut duration = 0.0_f64;

            for channel in anim.channels() {
                let target = channel.target();
                let target_node = target.node();
                let reader = channel.reader(|buffer| self.buffer_data(&buffer));

                let Some(inputs) = reader.read_inputs() else {
                    log::warn!("Animation channel without input times, skipping it");
                    continue;
                };
                let times: Vec<f64> = inputs.map(f64::from).collect();
                if let Some(&last) = times.last() {
                    duration = duration.max(last);
                }

                let cubic = match channel.sampler().interpolation() {
                    Interpolation::Linear => false,
                    Interpolation::Step => {
                        log::debug!("Step interpolation is sampled linearly");
                        false
                    }
                    Interpolation::CubicSpline => {
                        log::debug!("Cubic spline interpolation is sampled linearly between its keyframe values");
                        true
                    }
                };

                let slot = *slots.entry(target_node.index()).or_insert_with(|| {
                    let key = self.node_mapping[target_node.index()];
                    let node_name = self
                        .scene
                        .node(key)
                        .map(|n| n.name.clone())
                        .unwrap_or_default();
                    channels.push(NodeChannel {
                        node_name,
                        ..NodeChannel::default()
                    });
                    rests.push(target_node.transform().decomposed());
                    channels.len() - 1
                });
                let node_channel = &mut channels[slot];

                match reader.read_outputs() {
                    Some(ReadOutputs::Translations(iter)) => {
                        node_channel.position_keys = keyed(&times, iter.map(Vec3::from_array), cubic);
                    }
                    Some(ReadOutputs::Rotations(iter)) => {
                        node_channel.rotation_keys =
                            keyed(&times, iter.into_f32().map(Quat::from_array), cubic);
                    }
                    Some(ReadOutputs::Scales(iter)) => {
                        node_channel.scale_keys = keyed(&times, iter.map(Vec3::from_array), cubic);
                    }
                    Some(ReadOutputs::MorphTargetWeights(_)) => {
                        log::debug!("Morph target weights are not animated, skipping channel");
                    }
                    None => log::warn!("Animation channel without output values, skipping it"),
                }
            }

            // A node present in the clip holds its rest value on every track it does not animate.
            for (channel, (t, r, s)) in channels.iter_mut().zip(rests) {
                if channel.position_keys.is_empty() {
                    channel.position_keys.push(Key::new(0.0, Vec3::from_array(t)));
                }
                if channel.rotation_keys.is_empty() {
                    channel.rotation_keys.push(Key::new(0.0, Quat::from_array(r)));
                }
                if channel.scale_keys.is_empty() {
                    channel.scale_keys.push(Key::new(0.0, Vec3::from_array(s)));
                }
            }

            let name = anim
                .name()
                .map_or_else(|| format!("Animation_{}", anim.index()), str::to_string);
            self.scene.animations.push(SceneAnimation {
                name,
                ticks_per_second: 1.0,
                duration_ticks: duration,
                channels,
            });
        }
    }
}

fn image_uri(texture: &gltf::Texture<'_>) -> Option<String> {
    match texture.source().source() {
        gltf::image::Source::Uri { uri, .. } if !is_data_uri(uri) => Some(uri.to_string()),
        _ => {
            log::debug!("Texture {} is embedded and cannot be referenced by path", texture.index());
            None
        }
    }
}

/// Zips sample times with output values. Cubic-spline outputs are stored as
/// `(in_tangent, value, out_tangent)` triples; only the values are kept.
fn keyed<T>(times: &[f64], values: impl Iterator<Item = T>, cubic: bool) -> Vec<Key<T>> {
    let values: Vec<T> = if cubic {
        values.skip(1).step_by(3).collect()
    } else {
        values.collect()
    };
    times
        .iter()
        .zip(values)
        .map(|(&time, value)| Key::new(time, value))
        .collect()
}
