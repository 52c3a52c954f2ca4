use std::sync::atomic::{AtomicU64, Ordering};

use slotmap::SlotMap;

use crate::animation::clip::{AnimationClip, ClipId, ClipKey};

static NEXT_REGISTRY: AtomicU64 = AtomicU64::new(1);

/// Ordered list of the clips attached to an asset.
///
/// Clips keep a stable [`ClipId`] for their lifetime. The order is the
/// display order: decode order for the clips that came with the asset,
/// followed by merged clips in the order they were appended.
///
/// Every registry tags its ids, so an id handed out by one registry never
/// resolves in another, including the registry of a replacement asset.
///
/// Names are free text and may repeat.
#[derive(Debug)]
pub struct ClipRegistry {
    tag: u64,
    clips: SlotMap<ClipKey, AnimationClip>,
    order: Vec<ClipId>,
}

impl Default for ClipRegistry {
    fn default() -> Self {
        Self {
            tag: NEXT_REGISTRY.fetch_add(1, Ordering::Relaxed),
            clips: SlotMap::with_key(),
            order: Vec::new(),
        }
    }
}

impl ClipRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn key(&self, id: ClipId) -> Option<ClipKey> {
        (id.registry == self.tag).then_some(id.key)
    }

    /// Appends clips at the end, preserving their order, and returns their ids.
    pub fn append(&mut self, clips: impl IntoIterator<Item = AnimationClip>) -> Vec<ClipId> {
        clips.into_iter().map(|clip| self.push(clip)).collect()
    }

    pub fn push(&mut self, clip: AnimationClip) -> ClipId {
        let id = ClipId {
            registry: self.tag,
            key: self.clips.insert(clip),
        };
        self.order.push(id);
        id
    }

    /// Renames a clip. Any string is accepted, the empty string included.
    /// Returns `false` when `id` no longer refers to a clip.
    pub fn rename(&mut self, id: ClipId, name: impl Into<String>) -> bool {
        match self.get_mut(id) {
            Some(clip) => {
                clip.name = name.into();
                true
            }
            None => false,
        }
    }

    /// Removes a clip, keeping the relative order of the rest.
    pub fn remove(&mut self, id: ClipId) -> Option<AnimationClip> {
        let key = self.key(id)?;
        let clip = self.clips.remove(key)?;
        self.order.retain(|&other| other != id);
        Some(clip)
    }

    #[inline]
    #[must_use]
    pub fn get(&self, id: ClipId) -> Option<&AnimationClip> {
        self.clips.get(self.key(id)?)
    }

    #[inline]
    pub fn get_mut(&mut self, id: ClipId) -> Option<&mut AnimationClip> {
        let key = self.key(id)?;
        self.clips.get_mut(key)
    }

    #[inline]
    #[must_use]
    pub fn contains(&self, id: ClipId) -> bool {
        self.get(id).is_some()
    }

    /// Clips in display order.
    pub fn iter(&self) -> impl Iterator<Item = (ClipId, &AnimationClip)> + '_ {
        self.order.iter().map(|&id| (id, &self.clips[id.key]))
    }

    /// Clips in display order, for rendering the editable list.
    #[must_use]
    pub fn list(&self) -> Vec<&AnimationClip> {
        self.iter().map(|(_, clip)| clip).collect()
    }

    #[must_use]
    pub fn ids(&self) -> &[ClipId] {
        &self.order
    }

    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.iter().map(|(_, clip)| clip.name.as_str()).collect()
    }

    /// Display position of `id`.
    #[must_use]
    pub fn position(&self, id: ClipId) -> Option<usize> {
        self.order.iter().position(|&other| other == id)
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
