//! glTF 2.0 document builder.
//!
//! Flattens a [`SceneAsset`] below its synthetic root into a `gltf_json`
//! root plus one binary buffer, then packs it as GLB or embedded JSON.

use std::collections::BTreeMap;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use glam::{Quat, Vec3};
use gltf::json as gj;
use rustc_hash::FxHashMap;

use crate::animation::{AnimationClip, InterpolationMode, TargetPath, TrackData};
use crate::errors::{Result, StudioError};
use crate::scene::mesh::{BoundingBox, Mesh, Primitive};
use crate::scene::transform::Transform;
use crate::scene::{MeshKey, NodeHandle, SceneAsset, SkinKey};

const GLB_MAGIC: u32 = 0x4654_6C67; // "glTF"
const GLB_VERSION: u32 = 2;
const CHUNK_JSON: u32 = 0x4E4F_534A; // "JSON"
const CHUNK_BIN: u32 = 0x004E_4942; // "BIN\0"

// ---------------------------------------------------------------------------
// Export context
// ---------------------------------------------------------------------------

pub(super) struct ExportContext {
    root: gj::Root,
    buffer_data: Vec<u8>,

    node_map: FxHashMap<NodeHandle, u32>,
    mesh_map: FxHashMap<MeshKey, u32>,
    skin_map: FxHashMap<SkinKey, u32>,
}

impl ExportContext {
    pub(super) fn new(generator: &str) -> Self {
        let mut root = gj::Root::default();
        root.asset = gj::Asset {
            generator: Some(generator.to_string()),
            version: "2.0".into(),
            ..Default::default()
        };

        Self {
            root,
            buffer_data: Vec::new(),
            node_map: FxHashMap::default(),
            mesh_map: FxHashMap::default(),
            skin_map: FxHashMap::default(),
        }
    }

    // -- Step 1: Meshes ------------------------------------------------------

    pub(super) fn build_meshes(&mut self, asset: &SceneAsset) {
        for (key, mesh) in &asset.meshes {
            let idx = self.root.meshes.len() as u32;
            let gltf_mesh = self.build_mesh(mesh);
            self.root.meshes.push(gltf_mesh);
            self.mesh_map.insert(key, idx);
        }
    }

    fn build_mesh(&mut self, mesh: &Mesh) -> gj::Mesh {
        let primitives = mesh
            .primitives
            .iter()
            .map(|primitive| self.build_primitive(primitive))
            .collect();

        gj::Mesh {
            name: mesh.name.clone(),
            primitives,
            weights: (!mesh.default_weights.is_empty()).then(|| mesh.default_weights.clone()),
            extensions: None,
            extras: gj::Extras::default(),
        }
    }

    fn build_primitive(&mut self, primitive: &Primitive) -> gj::mesh::Primitive {
        let vertex_count = primitive.vertex_count() as u32;
        let mut attributes = BTreeMap::new();

        let position_acc = self.push_vec3_positions(&primitive.positions);
        attributes.insert(
            gj::validation::Checked::Valid(gj::mesh::Semantic::Positions),
            gj::Index::new(position_acc),
        );

        if let Some(normals) = &primitive.normals {
            let acc = self.push_attribute(
                bytemuck::cast_slice(normals),
                vertex_count,
                gj::accessor::ComponentType::F32,
                gj::accessor::Type::Vec3,
            );
            attributes.insert(
                gj::validation::Checked::Valid(gj::mesh::Semantic::Normals),
                gj::Index::new(acc),
            );
        }

        if let Some(uvs) = &primitive.uvs {
            let acc = self.push_attribute(
                bytemuck::cast_slice(uvs),
                vertex_count,
                gj::accessor::ComponentType::F32,
                gj::accessor::Type::Vec2,
            );
            attributes.insert(
                gj::validation::Checked::Valid(gj::mesh::Semantic::TexCoords(0)),
                gj::Index::new(acc),
            );
        }

        if let (Some(joints), Some(weights)) = (&primitive.joints, &primitive.weights) {
            let joints_acc = self.push_attribute(
                bytemuck::cast_slice(joints),
                vertex_count,
                gj::accessor::ComponentType::U16,
                gj::accessor::Type::Vec4,
            );
            let weights_acc = self.push_attribute(
                bytemuck::cast_slice(weights),
                vertex_count,
                gj::accessor::ComponentType::F32,
                gj::accessor::Type::Vec4,
            );
            attributes.insert(
                gj::validation::Checked::Valid(gj::mesh::Semantic::Joints(0)),
                gj::Index::new(joints_acc),
            );
            attributes.insert(
                gj::validation::Checked::Valid(gj::mesh::Semantic::Weights(0)),
                gj::Index::new(weights_acc),
            );
        }

        let indices = primitive.indices.as_ref().map(|indices| {
            let view_idx = self.push_buffer_view(
                bytemuck::cast_slice(indices),
                Some(gj::buffer::Target::ElementArrayBuffer),
            );
            gj::Index::new(self.push_accessor(
                view_idx,
                indices.len() as u32,
                gj::accessor::ComponentType::U32,
                gj::accessor::Type::Scalar,
                None,
                None,
            ))
        });

        let targets = if primitive.morph_targets.is_empty() {
            None
        } else {
            Some(
                primitive
                    .morph_targets
                    .iter()
                    .map(|target| gj::mesh::MorphTarget {
                        positions: Some(gj::Index::new(
                            self.push_vec3_positions(&target.positions),
                        )),
                        normals: target.normals.as_ref().map(|normals| {
                            gj::Index::new(self.push_attribute(
                                bytemuck::cast_slice(normals),
                                normals.len() as u32,
                                gj::accessor::ComponentType::F32,
                                gj::accessor::Type::Vec3,
                            ))
                        }),
                        tangents: None,
                    })
                    .collect(),
            )
        };

        gj::mesh::Primitive {
            attributes,
            extensions: None,
            extras: gj::Extras::default(),
            indices,
            material: None,
            mode: gj::validation::Checked::Valid(primitive.mode),
            targets,
        }
    }

    // -- Step 2: Nodes -------------------------------------------------------

    /// Flattens the hierarchy below the asset root in pre-order and returns
    /// the indices of the top-level nodes.
    ///
    /// The user's edit of the root transform is folded into each top-level
    /// node, since the root itself is not written.
    pub(super) fn build_nodes(&mut self, asset: &SceneAsset) -> Vec<u32> {
        let bake = asset.has_root_edit().then(|| asset.root_edit_matrix());

        let mut top_level = Vec::with_capacity(asset.top_level_nodes().len());
        for &handle in asset.top_level_nodes() {
            let idx = self.flatten_node(asset, handle);
            if let Some(edit) = bake {
                let mut transform = Transform::new();
                transform.apply_local_matrix(edit * local_transform(asset, handle).local_matrix());
                write_trs(&mut self.root.nodes[idx as usize], &transform);
            }
            top_level.push(idx);
        }
        top_level
    }

    fn flatten_node(&mut self, asset: &SceneAsset, handle: NodeHandle) -> u32 {
        let my_index = self.root.nodes.len() as u32;
        self.root.nodes.push(gj::Node::default());
        self.node_map.insert(handle, my_index);

        let Some(node) = asset.node(handle) else {
            return my_index;
        };

        let children: Vec<gj::Index<gj::Node>> = node
            .children()
            .iter()
            .map(|&child| gj::Index::new(self.flatten_node(asset, child)))
            .collect();

        let mut gltf_node = gj::Node {
            name: Some(node.name.clone()),
            children: (!children.is_empty()).then_some(children),
            mesh: node
                .mesh
                .and_then(|key| self.mesh_map.get(&key))
                .map(|&i| gj::Index::new(i)),
            weights: (node.mesh.is_some() && !node.morph_weights.is_empty())
                .then(|| node.morph_weights.to_vec()),
            ..gj::Node::default()
        };
        write_trs(&mut gltf_node, &node.transform);

        self.root.nodes[my_index as usize] = gltf_node;
        my_index
    }

    // -- Step 3: Skins -------------------------------------------------------

    pub(super) fn build_skins(&mut self, asset: &SceneAsset) {
        for (key, skin) in &asset.skins {
            let joints: Vec<gj::Index<gj::Node>> = skin
                .joints
                .iter()
                .filter_map(|joint| self.node_map.get(joint))
                .map(|&i| gj::Index::new(i))
                .collect();
            if joints.len() != skin.joints.len() {
                log::warn!("Skin {key:?} references nodes outside the asset, skipped");
                continue;
            }

            let inverse_bind_matrices = (skin.inverse_bind_matrices.len() == joints.len()).then(|| {
                let view_idx = self
                    .push_buffer_view(bytemuck::cast_slice(&skin.inverse_bind_matrices), None);
                gj::Index::new(self.push_accessor(
                    view_idx,
                    skin.inverse_bind_matrices.len() as u32,
                    gj::accessor::ComponentType::F32,
                    gj::accessor::Type::Mat4,
                    None,
                    None,
                ))
            });

            let idx = self.root.skins.len() as u32;
            self.root.skins.push(gj::Skin {
                name: skin.name.clone(),
                inverse_bind_matrices,
                joints,
                skeleton: skin
                    .skeleton
                    .and_then(|s| self.node_map.get(&s))
                    .map(|&i| gj::Index::new(i)),
                extensions: None,
                extras: gj::Extras::default(),
            });
            self.skin_map.insert(key, idx);
        }

        for (handle, &node_idx) in &self.node_map {
            if let Some(skin_idx) = asset
                .node(*handle)
                .and_then(|n| n.skin)
                .and_then(|key| self.skin_map.get(&key))
            {
                self.root.nodes[node_idx as usize].skin = Some(gj::Index::new(*skin_idx));
            }
        }
    }

    // -- Step 4: Animations --------------------------------------------------

    /// Writes one glTF animation per clip, in order.
    ///
    /// Tracks are written against the first node carrying the track's node
    /// name. Tracks whose node is missing are dropped with a warning. A clip
    /// left without channels is skipped, since glTF requires at least one.
    pub(super) fn build_animations<'c>(
        &mut self,
        asset: &SceneAsset,
        clips: impl IntoIterator<Item = &'c AnimationClip>,
    ) {
        for clip in clips {
            let mut channels = Vec::new();
            let mut samplers = Vec::new();

            for track in &clip.tracks {
                let Some(node_idx) = asset
                    .find_node_by_name(&track.meta.node_name)
                    .and_then(|handle| self.node_map.get(&handle).copied())
                else {
                    log::warn!(
                        "Clip '{}': node '{}' not found, dropping {} track",
                        clip.name,
                        track.meta.node_name,
                        track.meta.target.as_str()
                    );
                    continue;
                };

                let times = track.data.times();
                let ts_view = self.push_buffer_view(bytemuck::cast_slice(times), None);
                let ts_min = times.iter().copied().reduce(f32::min).unwrap_or(0.0);
                let ts_max = times.iter().copied().reduce(f32::max).unwrap_or(0.0);
                let ts_acc = self.push_accessor(
                    ts_view,
                    times.len() as u32,
                    gj::accessor::ComponentType::F32,
                    gj::accessor::Type::Scalar,
                    Some(json_f32_array(&[ts_min])),
                    Some(json_f32_array(&[ts_max])),
                );

                let val_acc = self.push_track_values(&track.data);

                let sampler_idx = samplers.len() as u32;
                samplers.push(gj::animation::Sampler {
                    input: gj::Index::new(ts_acc),
                    output: gj::Index::new(val_acc),
                    interpolation: gj::validation::Checked::Valid(map_interpolation(
                        track.data.interpolation(),
                    )),
                    extensions: None,
                    extras: gj::Extras::default(),
                });

                channels.push(gj::animation::Channel {
                    sampler: gj::Index::new(sampler_idx),
                    target: gj::animation::Target {
                        node: gj::Index::new(node_idx),
                        path: gj::validation::Checked::Valid(map_target(track.meta.target)),
                        extensions: None,
                        extras: gj::Extras::default(),
                    },
                    extensions: None,
                    extras: gj::Extras::default(),
                });
            }

            if channels.is_empty() {
                log::warn!("Clip '{}' drives no exported node, not written", clip.name);
                continue;
            }

            self.root.animations.push(gj::Animation {
                name: Some(clip.name.clone()),
                channels,
                samplers,
                extensions: None,
                extras: gj::Extras::default(),
            });
        }
    }

    fn push_track_values(&mut self, data: &TrackData) -> u32 {
        let (bytes, count, type_): (Vec<u8>, usize, gj::accessor::Type) = match data {
            TrackData::Vector3(t) => (
                bytemuck::cast_slice::<Vec3, u8>(&t.values).to_vec(),
                t.values.len(),
                gj::accessor::Type::Vec3,
            ),
            TrackData::Quaternion(t) => (
                bytemuck::cast_slice::<Quat, u8>(&t.values).to_vec(),
                t.values.len(),
                gj::accessor::Type::Vec4,
            ),
            TrackData::MorphWeights(t) => {
                // Every keyframe must carry the same number of weights.
                let stride = t.values.iter().map(|w| w.len()).max().unwrap_or(0);
                let flat: Vec<f32> = t
                    .values
                    .iter()
                    .flat_map(|w| (0..stride).map(|i| w.weights.get(i).copied().unwrap_or(0.0)))
                    .collect();
                (
                    bytemuck::cast_slice::<f32, u8>(&flat).to_vec(),
                    flat.len(),
                    gj::accessor::Type::Scalar,
                )
            }
        };

        let view_idx = self.push_buffer_view(&bytes, None);
        self.push_accessor(
            view_idx,
            count as u32,
            gj::accessor::ComponentType::F32,
            type_,
            None,
            None,
        )
    }

    // -- Step 5: Scene -------------------------------------------------------

    pub(super) fn build_scene(&mut self, name: &str, top_level: Vec<u32>) {
        self.root.scenes.push(gj::Scene {
            name: Some(name.to_string()),
            nodes: top_level.into_iter().map(gj::Index::new).collect(),
            extensions: None,
            extras: gj::Extras::default(),
        });
        self.root.scene = Some(gj::Index::new(0));
    }

    // -- Buffer/accessor helpers ---------------------------------------------

    fn align_buffer(&mut self) {
        let padding = (4 - (self.buffer_data.len() % 4)) % 4;
        self.buffer_data.extend(std::iter::repeat_n(0u8, padding));
    }

    fn push_buffer_view(&mut self, data: &[u8], target: Option<gj::buffer::Target>) -> u32 {
        self.align_buffer();
        let offset = self.buffer_data.len();
        self.buffer_data.extend_from_slice(data);

        let view_idx = self.root.buffer_views.len() as u32;
        self.root.buffer_views.push(gj::buffer::View {
            buffer: gj::Index::new(0),
            byte_offset: Some(gj::validation::USize64(offset as u64)),
            byte_length: gj::validation::USize64(data.len() as u64),
            byte_stride: None,
            target: target.map(gj::validation::Checked::Valid),
            name: None,
            extensions: None,
            extras: gj::Extras::default(),
        });

        view_idx
    }

    fn push_accessor(
        &mut self,
        buffer_view: u32,
        count: u32,
        component_type: gj::accessor::ComponentType,
        type_: gj::accessor::Type,
        min: Option<gj::Value>,
        max: Option<gj::Value>,
    ) -> u32 {
        let acc_idx = self.root.accessors.len() as u32;
        self.root.accessors.push(gj::Accessor {
            buffer_view: Some(gj::Index::new(buffer_view)),
            byte_offset: Some(gj::validation::USize64(0)),
            count: gj::validation::USize64(u64::from(count)),
            component_type: gj::validation::Checked::Valid(gj::accessor::GenericComponentType(
                component_type,
            )),
            type_: gj::validation::Checked::Valid(type_),
            min,
            max,
            normalized: false,
            name: None,
            sparse: None,
            extensions: None,
            extras: gj::Extras::default(),
        });
        acc_idx
    }

    fn push_attribute(
        &mut self,
        data: &[u8],
        count: u32,
        component_type: gj::accessor::ComponentType,
        type_: gj::accessor::Type,
    ) -> u32 {
        let view_idx = self.push_buffer_view(data, Some(gj::buffer::Target::ArrayBuffer));
        self.push_accessor(view_idx, count, component_type, type_, None, None)
    }

    /// POSITION accessors must carry min/max.
    fn push_vec3_positions(&mut self, positions: &[Vec3]) -> u32 {
        let view_idx = self.push_buffer_view(
            bytemuck::cast_slice(positions),
            Some(gj::buffer::Target::ArrayBuffer),
        );
        let (min, max) = match BoundingBox::from_points(positions) {
            Some(bounds) => (
                Some(json_f32_array(&bounds.min.to_array())),
                Some(json_f32_array(&bounds.max.to_array())),
            ),
            None => (None, None),
        };
        self.push_accessor(
            view_idx,
            positions.len() as u32,
            gj::accessor::ComponentType::F32,
            gj::accessor::Type::Vec3,
            min,
            max,
        )
    }

    // -- Output --------------------------------------------------------------

    /// Serializes the document, with the buffer either left for a GLB `BIN`
    /// chunk or embedded as a base64 data URI.
    fn finalize(&mut self, embed_buffer: bool) -> Result<gj::Value> {
        if !self.buffer_data.is_empty() {
            self.align_buffer();
            self.root.buffers.push(gj::Buffer {
                byte_length: gj::validation::USize64(self.buffer_data.len() as u64),
                name: None,
                uri: embed_buffer.then(|| {
                    format!(
                        "data:application/octet-stream;base64,{}",
                        BASE64.encode(&self.buffer_data)
                    )
                }),
                extensions: None,
                extras: gj::Extras::default(),
            });
        }

        let mut value = serde_json::to_value(&self.root)
            .map_err(|e| StudioError::Encode(format!("JSON serialization failed: {e}")))?;

        // Empty arrays are skipped by the serializer; the animation list is
        // always written so consumers can tell "no clips" from "not exported".
        if let Some(object) = value.as_object_mut() {
            object
                .entry("animations")
                .or_insert_with(|| gj::Value::Array(Vec::new()));
        }

        Ok(value)
    }

    pub(super) fn to_gltf_json(mut self) -> Result<String> {
        let value = self.finalize(true)?;
        serde_json::to_string_pretty(&value)
            .map_err(|e| StudioError::Encode(format!("JSON serialization failed: {e}")))
    }

    pub(super) fn to_glb(mut self) -> Result<Vec<u8>> {
        let value = self.finalize(false)?;
        let json_bytes = serde_json::to_vec(&value)
            .map_err(|e| StudioError::Encode(format!("JSON serialization failed: {e}")))?;

        let json_pad = (4 - (json_bytes.len() % 4)) % 4;
        let json_chunk_len = json_bytes.len() + json_pad;

        // Already 4-byte aligned by `finalize`.
        let bin_chunk_len = self.buffer_data.len();

        let has_bin = !self.buffer_data.is_empty();
        let total_length = 12 + 8 + json_chunk_len + if has_bin { 8 + bin_chunk_len } else { 0 };
        let total_u32 = u32::try_from(total_length)
            .map_err(|_| StudioError::Encode(format!("GLB too large: {total_length} bytes")))?;

        let mut glb = Vec::with_capacity(total_length);

        // Header
        glb.extend_from_slice(&GLB_MAGIC.to_le_bytes());
        glb.extend_from_slice(&GLB_VERSION.to_le_bytes());
        glb.extend_from_slice(&total_u32.to_le_bytes());

        // JSON chunk
        glb.extend_from_slice(&(json_chunk_len as u32).to_le_bytes());
        glb.extend_from_slice(&CHUNK_JSON.to_le_bytes());
        glb.extend_from_slice(&json_bytes);
        glb.extend(std::iter::repeat_n(b' ', json_pad));

        // BIN chunk
        if has_bin {
            glb.extend_from_slice(&(bin_chunk_len as u32).to_le_bytes());
            glb.extend_from_slice(&CHUNK_BIN.to_le_bytes());
            glb.extend_from_slice(&self.buffer_data);
        }

        Ok(glb)
    }
}

// ---------------------------------------------------------------------------
// Helper functions
// ---------------------------------------------------------------------------

fn local_transform(asset: &SceneAsset, handle: NodeHandle) -> Transform {
    asset.node(handle).map(|n| n.transform).unwrap_or_default()
}

fn write_trs(node: &mut gj::Node, t: &Transform) {
    let is_identity = t.is_identity(0.0);
    node.translation = (!is_identity).then(|| t.position.to_array());
    node.rotation =
        (!is_identity).then(|| gj::scene::UnitQuaternion(t.rotation.normalize().to_array()));
    node.scale = (!is_identity).then(|| t.scale.to_array());
}

fn map_interpolation(interp: InterpolationMode) -> gj::animation::Interpolation {
    match interp {
        InterpolationMode::Linear => gj::animation::Interpolation::Linear,
        InterpolationMode::Step => gj::animation::Interpolation::Step,
        InterpolationMode::CubicSpline => gj::animation::Interpolation::CubicSpline,
    }
}

fn map_target(target: TargetPath) -> gj::animation::Property {
    match target {
        TargetPath::Translation => gj::animation::Property::Translation,
        TargetPath::Rotation => gj::animation::Property::Rotation,
        TargetPath::Scale => gj::animation::Property::Scale,
        TargetPath::Weights => gj::animation::Property::MorphTargetWeights,
    }
}

/// Build a JSON array of f32 values (for accessor min/max).
fn json_f32_array(values: &[f32]) -> gj::Value {
    gj::Value::Array(values.iter().map(|&v| gj::Value::from(f64::from(v))).collect())
}
