use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use glam::{Mat4, Quat, Vec2, Vec3, Vec4};

use crate::animation::MorphWeightData;
use crate::animation::binding::TargetPath;
use crate::animation::clip::{AnimationClip, Track, TrackData, TrackMeta};
use crate::animation::tracks::{InterpolationMode, KeyframeTrack};
use crate::errors::{Result, StudioError};
use crate::scene::mesh::{Mesh, MorphTarget, Primitive};
use crate::scene::node::Node;
use crate::scene::skeleton::Skin;
use crate::scene::{MeshKey, NodeHandle, SceneAsset, SkinKey};

/// A parsed glTF document together with its resolved buffer bytes.
pub(crate) struct DecodedGltf {
    pub document: gltf::Document,
    pub buffers: Vec<Vec<u8>>,
}

impl DecodedGltf {
    /// Parses GLB or self-contained `.gltf` bytes.
    ///
    /// Buffers must be embedded: either the GLB `BIN` chunk or a base64
    /// `data:` URI. References to external files are rejected because only
    /// the selected file's bytes are available.
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        let gltf::Gltf { document, blob } = gltf::Gltf::from_slice(bytes)?;

        let mut buffers = Vec::with_capacity(document.buffers().len());
        for buffer in document.buffers() {
            let data = match buffer.source() {
                gltf::buffer::Source::Bin => blob
                    .clone()
                    .ok_or_else(|| StudioError::Decode("Missing GLB binary chunk".into()))?,
                gltf::buffer::Source::Uri(uri) => decode_data_uri(uri)?,
            };
            if data.len() < buffer.length() {
                return Err(StudioError::Decode(format!(
                    "Buffer {} holds {} bytes, {} declared",
                    buffer.index(),
                    data.len(),
                    buffer.length()
                )));
            }
            buffers.push(data);
        }

        Ok(Self { document, buffers })
    }

    fn buffer(&self, buffer: &gltf::Buffer<'_>) -> Option<&[u8]> {
        self.buffers.get(buffer.index()).map(Vec::as_slice)
    }
}

fn decode_data_uri(uri: &str) -> Result<Vec<u8>> {
    let payload = uri
        .strip_prefix("data:")
        .and_then(|rest| rest.split_once(";base64,"))
        .map(|(_, data)| data)
        .ok_or_else(|| {
            StudioError::Decode(format!("External buffer reference '{uri}' is not supported"))
        })?;

    BASE64
        .decode(payload)
        .map_err(|e| StudioError::Decode(format!("Invalid base64 buffer: {e}")))
}

/// Builds a [`SceneAsset`] from a decoded document.
///
/// Nodes are created first, then linked into the hierarchy, then skins and
/// meshes are attached, and finally animations are read.
pub(crate) struct GltfLoader<'a> {
    gltf: &'a DecodedGltf,
    asset: SceneAsset,
    // glTF node index -> NodeHandle
    node_mapping: Vec<NodeHandle>,
    // glTF mesh index -> MeshKey
    mesh_mapping: Vec<Option<MeshKey>>,
}

impl<'a> GltfLoader<'a> {
    pub fn load(gltf: &'a DecodedGltf, name: &str, display_scale: f32) -> Result<SceneAsset> {
        let document = &gltf.document;

        let mut loader = Self {
            gltf,
            asset: SceneAsset::new(name, display_scale),
            node_mapping: Vec::with_capacity(document.nodes().len()),
            mesh_mapping: vec![None; document.meshes().len()],
        };

        let required: Vec<_> = document.extensions_required().collect();
        if !required.is_empty() {
            log::warn!("glTF requires unsupported extensions: {required:?}");
        }

        // Step 1: nodes and transforms
        for node in document.nodes() {
            let handle = loader.create_node_shallow(&node);
            loader.node_mapping.push(handle);
        }

        // Step 2: hierarchy
        for node in document.nodes() {
            let parent = loader.node_mapping[node.index()];
            for child in node.children() {
                loader.asset.attach(loader.node_mapping[child.index()], parent);
            }
        }

        let root = loader.asset.root();
        if let Some(scene) = document.default_scene().or_else(|| document.scenes().next()) {
            for node in scene.nodes() {
                loader.asset.attach(loader.node_mapping[node.index()], root);
            }
        }
        // Nodes outside the scene still belong to the asset.
        for &handle in &loader.node_mapping {
            if loader.asset.node(handle).is_some_and(|n| n.parent().is_none()) {
                log::debug!("Node {handle:?} is not part of the scene, attaching to the root");
                loader.asset.attach(handle, root);
            }
        }

        // Step 3: skins and meshes
        let skin_keys = loader.load_skins();
        for node in document.nodes() {
            loader.bind_node_mesh_and_skin(&node, &skin_keys)?;
        }

        // Step 4: animations
        let clips = load_animations(gltf);
        loader.asset.clips.append(clips);

        log::info!(
            "Loaded asset '{}': {} nodes, {} meshes, {} clips",
            name,
            loader.asset.node_count(),
            loader.asset.meshes.len(),
            loader.asset.clips.len()
        );

        Ok(loader.asset)
    }

    fn create_node_shallow(&mut self, node: &gltf::Node) -> NodeHandle {
        let name = node_name(node);
        let handle = self.asset.create_node(Node::new(name));

        if let Some(engine_node) = self.asset.node_mut(handle) {
            let (t, r, s) = node.transform().decomposed();
            engine_node.transform.position = Vec3::from_array(t);
            engine_node.transform.rotation = Quat::from_array(r);
            engine_node.transform.scale = Vec3::from_array(s);
        }

        handle
    }

    fn load_skins(&mut self) -> Vec<SkinKey> {
        let mut keys = Vec::new();

        let gltf = self.gltf;
        for skin in gltf.document.skins() {
            let reader = skin.reader(|buffer| gltf.buffer(&buffer));
            let inverse_bind_matrices: Vec<Mat4> = reader
                .read_inverse_bind_matrices()
                .map(|iter| iter.map(|m| Mat4::from_cols_array_2d(&m)).collect())
                .unwrap_or_default();

            let joints: Vec<NodeHandle> = skin
                .joints()
                .map(|node| self.node_mapping[node.index()])
                .collect();

            let mut engine_skin = Skin::new(joints, inverse_bind_matrices);
            engine_skin.name = skin.name().map(str::to_string);
            engine_skin.skeleton = skin.skeleton().map(|node| self.node_mapping[node.index()]);

            keys.push(self.asset.skins.insert(engine_skin));
        }

        keys
    }

    fn bind_node_mesh_and_skin(&mut self, node: &gltf::Node, skin_keys: &[SkinKey]) -> Result<()> {
        let handle = self.node_mapping[node.index()];

        if let Some(mesh) = node.mesh() {
            let key = match self.mesh_mapping[mesh.index()] {
                Some(key) => key,
                None => {
                    let engine_mesh = self.build_mesh(&mesh)?;
                    let key = self.asset.meshes.insert(engine_mesh);
                    self.mesh_mapping[mesh.index()] = Some(key);
                    key
                }
            };

            let target_count = self.asset.meshes[key].morph_target_count();
            let defaults = self.asset.meshes[key].default_weights.clone();
            if let Some(engine_node) = self.asset.node_mut(handle) {
                engine_node.mesh = Some(key);
                let weights = node.weights().map_or(defaults, <[f32]>::to_vec);
                engine_node
                    .set_morph_weights(&MorphWeightData::from_slice(&weights), target_count);
            }
        }

        if let Some(skin) = node.skin()
            && let Some(engine_node) = self.asset.node_mut(handle)
        {
            engine_node.skin = skin_keys.get(skin.index()).copied();
        }

        Ok(())
    }

    fn build_mesh(&self, mesh: &gltf::Mesh) -> Result<Mesh> {
        let gltf = self.gltf;
        let mut primitives = Vec::with_capacity(mesh.primitives().len());

        for primitive in mesh.primitives() {
            let reader = primitive.reader(|buffer| gltf.buffer(&buffer));

            let positions: Vec<Vec3> = reader
                .read_positions()
                .ok_or_else(|| {
                    StudioError::Decode(format!(
                        "Mesh {} primitive {} has no POSITION attribute",
                        mesh.index(),
                        primitive.index()
                    ))
                })?
                .map(Vec3::from_array)
                .collect();
            let vertex_count = positions.len();

            let mut engine_primitive = Primitive::new(positions);
            engine_primitive.mode = primitive.mode();
            engine_primitive.normals = reader
                .read_normals()
                .map(|iter| iter.map(Vec3::from_array).collect());
            engine_primitive.uvs = reader
                .read_tex_coords(0)
                .map(|iter| iter.into_f32().map(Vec2::from_array).collect());
            engine_primitive.joints = reader.read_joints(0).map(|iter| iter.into_u16().collect());
            engine_primitive.weights = reader
                .read_weights(0)
                .map(|iter| iter.into_f32().map(Vec4::from_array).collect());
            engine_primitive.indices = reader.read_indices().map(|iter| iter.into_u32().collect());

            engine_primitive.morph_targets = reader
                .read_morph_targets()
                .map(|(positions, normals, _tangents)| MorphTarget {
                    positions: positions.map_or_else(
                        || vec![Vec3::ZERO; vertex_count],
                        |iter| iter.map(Vec3::from_array).collect(),
                    ),
                    normals: normals.map(|iter| iter.map(Vec3::from_array).collect()),
                })
                .collect();

            primitives.push(engine_primitive);
        }

        Ok(Mesh {
            name: mesh.name().map(str::to_string),
            primitives,
            default_weights: mesh.weights().map(<[f32]>::to_vec).unwrap_or_default(),
        })
    }
}

fn node_name(node: &gltf::Node) -> String {
    node.name()
        .map_or_else(|| format!("Node_{}", node.index()), str::to_string)
}

/// Reads every animation of the document, in document order.
///
/// Channels whose sampler data cannot be read are skipped with a warning;
/// the clip itself is kept.
pub(crate) fn load_animations(gltf: &DecodedGltf) -> Vec<AnimationClip> {
    let mut animations = Vec::new();

    for anim in gltf.document.animations() {
        let mut tracks = Vec::new();

        for (channel_index, channel) in anim.channels().enumerate() {
            let reader = channel.reader(|buffer| gltf.buffer(&buffer));
            let target = channel.target();
            let node_name = node_name(&target.node());

            let (Some(inputs), Some(outputs)) = (reader.read_inputs(), reader.read_outputs()) else {
                log::warn!(
                    "Animation {}: channel {} has unreadable sampler data, skipped",
                    anim.index(),
                    channel_index
                );
                continue;
            };
            let times: Vec<f32> = inputs.collect();

            let interpolation = match channel.sampler().interpolation() {
                gltf::animation::Interpolation::Linear => InterpolationMode::Linear,
                gltf::animation::Interpolation::Step => InterpolationMode::Step,
                gltf::animation::Interpolation::CubicSpline => InterpolationMode::CubicSpline,
            };

            let (target_path, data) = match outputs {
                gltf::animation::util::ReadOutputs::Translations(iter) => (
                    TargetPath::Translation,
                    TrackData::Vector3(KeyframeTrack::new(
                        times,
                        iter.map(Vec3::from_array).collect(),
                        interpolation,
                    )),
                ),
                gltf::animation::util::ReadOutputs::Rotations(iter) => (
                    TargetPath::Rotation,
                    TrackData::Quaternion(KeyframeTrack::new(
                        times,
                        iter.into_f32().map(Quat::from_array).collect(),
                        interpolation,
                    )),
                ),
                gltf::animation::util::ReadOutputs::Scales(iter) => (
                    TargetPath::Scale,
                    TrackData::Vector3(KeyframeTrack::new(
                        times,
                        iter.map(Vec3::from_array).collect(),
                        interpolation,
                    )),
                ),
                gltf::animation::util::ReadOutputs::MorphTargetWeights(iter) => {
                    let flat: Vec<f32> = iter.into_f32().collect();
                    let values_per_key = match interpolation {
                        InterpolationMode::CubicSpline => 3,
                        _ => 1,
                    };
                    let value_count = times.len() * values_per_key;
                    let stride = if value_count == 0 { 0 } else { flat.len() / value_count };

                    let values = if stride == 0 {
                        vec![MorphWeightData::default(); value_count]
                    } else {
                        flat.chunks_exact(stride).map(MorphWeightData::from_slice).collect()
                    };

                    (
                        TargetPath::Weights,
                        TrackData::MorphWeights(KeyframeTrack::new(times, values, interpolation)),
                    )
                }
            };

            tracks.push(Track {
                meta: TrackMeta {
                    node_name,
                    target: target_path,
                },
                data,
            });
        }

        let name = anim
            .name()
            .map_or_else(|| format!("Animation_{}", anim.index()), str::to_string);
        animations.push(AnimationClip::new(name, tracks));
    }

    animations
}
