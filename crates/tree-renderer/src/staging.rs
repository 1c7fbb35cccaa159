//! CPU staging of the GPU instance buffer

use bytemuck::{Pod, Zeroable};
use tree_simulation::{BatchKind, Instance, RenderSurface};

use crate::palette::BatchStyle;

/// Instance layout read by `tree.wgsl`
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct GpuInstance {
    pub position: [f32; 3],
    pub scale: f32,
    pub rotation: [f32; 4],
    pub color: [f32; 4],
    pub accent: [f32; 4],
    pub kind: u32,
    pub _padding: [u32; 3],
}

impl GpuInstance {
    pub fn new(instance: &Instance, style: &BatchStyle) -> Self {
        Self {
            position: instance.position,
            scale: instance.scale,
            rotation: instance.rotation,
            color: style.color,
            accent: style.accent,
            kind: style.sprite as u32,
            _padding: [0; 3],
        }
    }
}

/// Render surface that styles each batch and packs them for upload
#[derive(Debug, Default)]
pub struct InstanceStaging {
    batches: [Vec<GpuInstance>; 4],
}

impl InstanceStaging {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(kind: BatchKind) -> usize {
        match kind {
            BatchKind::Foliage => 0,
            BatchKind::OrnamentsRed => 1,
            BatchKind::OrnamentsGold => 2,
            BatchKind::PhotoCards => 3,
        }
    }

    pub fn batch(&self, kind: BatchKind) -> &[GpuInstance] {
        &self.batches[Self::slot(kind)]
    }

    pub fn len(&self) -> usize {
        self.batches.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Concatenate all batches into `out`, foliage first
    pub fn pack_into(&self, out: &mut Vec<GpuInstance>) {
        out.clear();
        for batch in &self.batches {
            out.extend_from_slice(batch);
        }
    }
}

impl RenderSurface for InstanceStaging {
    fn submit(&mut self, kind: BatchKind, instances: &[Instance]) {
        let style = BatchStyle::for_batch(kind);
        let batch = &mut self.batches[Self::slot(kind)];
        batch.clear();
        batch.extend(instances.iter().map(|instance| GpuInstance::new(instance, &style)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::palette::SpriteKind;
    use glam::{Quat, Vec3};

    #[test]
    fn gpu_instance_matches_shader_stride() {
        assert_eq!(std::mem::size_of::<GpuInstance>(), 80);
    }

    #[test]
    fn submit_styles_and_replaces() {
        let mut staging = InstanceStaging::new();
        let leaf = Instance::new(Vec3::new(1.0, 2.0, 3.0), 0.1, Quat::IDENTITY);
        let card = Instance::new(Vec3::ZERO, 1.0, Quat::from_rotation_y(1.0));

        staging.submit(BatchKind::Foliage, &[leaf, leaf]);
        staging.submit(BatchKind::PhotoCards, &[card]);
        staging.submit(BatchKind::Foliage, &[leaf]);

        assert_eq!(staging.len(), 2);
        let packed_leaf = staging.batch(BatchKind::Foliage)[0];
        assert_eq!(packed_leaf.position, [1.0, 2.0, 3.0]);
        assert_eq!(packed_leaf.kind, SpriteKind::Sparkle as u32);
        assert_eq!(
            staging.batch(BatchKind::PhotoCards)[0].rotation,
            card.rotation
        );
    }

    #[test]
    fn packs_in_batch_order() {
        let mut staging = InstanceStaging::new();
        let at = |x: f32| Instance::new(Vec3::splat(x), 0.3, Quat::IDENTITY);
        staging.submit(BatchKind::PhotoCards, &[at(3.0)]);
        staging.submit(BatchKind::OrnamentsGold, &[at(2.0)]);
        staging.submit(BatchKind::Foliage, &[at(0.0)]);
        staging.submit(BatchKind::OrnamentsRed, &[at(1.0)]);

        let mut packed = Vec::new();
        staging.pack_into(&mut packed);
        let xs: Vec<f32> = packed.iter().map(|g| g.position[0]).collect();
        assert_eq!(xs, vec![0.0, 1.0, 2.0, 3.0]);
    }
}
