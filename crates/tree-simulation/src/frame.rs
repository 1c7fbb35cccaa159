//! Render surface contract
//!
//! The engine pushes one batch of instances per particle group every frame.
//! `Instance` is plain old data so a renderer can upload it as-is.

use bytemuck::{Pod, Zeroable};
use glam::{Quat, Vec3};

/// Per-particle transform handed to the renderer
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct Instance {
    pub position: [f32; 3],
    pub scale: f32,
    /// Orientation quaternion (x, y, z, w)
    pub rotation: [f32; 4],
}

impl Instance {
    pub fn new(position: Vec3, scale: f32, rotation: Quat) -> Self {
        Self {
            position: position.to_array(),
            scale,
            rotation: rotation.to_array(),
        }
    }

    pub fn position(&self) -> Vec3 {
        Vec3::from_array(self.position)
    }

    pub fn rotation(&self) -> Quat {
        Quat::from_array(self.rotation)
    }
}

/// The four particle groups, each drawn with its own treatment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BatchKind {
    Foliage,
    OrnamentsRed,
    OrnamentsGold,
    PhotoCards,
}

impl BatchKind {
    pub const ALL: [BatchKind; 4] = [
        BatchKind::Foliage,
        BatchKind::OrnamentsRed,
        BatchKind::OrnamentsGold,
        BatchKind::PhotoCards,
    ];

    fn index(self) -> usize {
        match self {
            BatchKind::Foliage => 0,
            BatchKind::OrnamentsRed => 1,
            BatchKind::OrnamentsGold => 2,
            BatchKind::PhotoCards => 3,
        }
    }
}

/// Anything that accepts a frame's worth of instance batches
pub trait RenderSurface {
    /// Replace the contents of `kind` with `instances` for this frame
    fn submit(&mut self, kind: BatchKind, instances: &[Instance]);
}

/// CPU-side surface holding the latest batch of every group
#[derive(Debug, Default, Clone)]
pub struct FrameBuffers {
    batches: [Vec<Instance>; 4],
    frames: u64,
}

impl FrameBuffers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn batch(&self, kind: BatchKind) -> &[Instance] {
        &self.batches[kind.index()]
    }

    pub fn instance_count(&self) -> usize {
        self.batches.iter().map(Vec::len).sum()
    }

    /// Number of foliage submissions seen, i.e. frames pushed
    pub fn frames(&self) -> u64 {
        self.frames
    }
}

impl RenderSurface for FrameBuffers {
    fn submit(&mut self, kind: BatchKind, instances: &[Instance]) {
        let batch = &mut self.batches[kind.index()];
        batch.clear();
        batch.extend_from_slice(instances);
        if kind == BatchKind::Foliage {
            self.frames += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn instance_is_tightly_packed() {
        assert_eq!(std::mem::size_of::<Instance>(), 32);
    }

    #[test]
    fn submit_replaces_previous_batch() {
        let mut buffers = FrameBuffers::new();
        let a = Instance::new(Vec3::ONE, 1.0, Quat::IDENTITY);
        buffers.submit(BatchKind::OrnamentsGold, &[a, a, a]);
        buffers.submit(BatchKind::OrnamentsGold, &[a]);
        assert_eq!(buffers.batch(BatchKind::OrnamentsGold).len(), 1);
        assert!(buffers.batch(BatchKind::PhotoCards).is_empty());
        assert_eq!(buffers.instance_count(), 1);
    }
}
