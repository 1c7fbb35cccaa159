//! Convergence engine
//!
//! Runs inside the per-frame callback. Each frame it reads the state signal
//! once, moves every particle a fraction of the way toward the selected
//! endpoint, and pushes the resulting transforms to a render surface.
//!
//! The step is an exponential approach: `current = lerp(current, goal, k)`
//! with `k = dt * rate * speed` clamped to [0, 1]. Distance to the goal
//! shrinks by `1 - k` per step and never reaches zero in finite time unless
//! `k` hits 1.

use crate::frame::{BatchKind, Instance, RenderSurface};
use crate::params::{ConvergenceParams, convergence_factor};
use crate::signal::{StateSignal, TreeState};
use glam::{EulerRot, Quat, Vec2, Vec3};
use tree_particles::{Particle, ParticleSet};

/// Foliage keeps a scalar blend per particle; position is derived from it
struct FoliageGroup {
    particles: Vec<Particle>,
    blend: Vec<f32>,
    instances: Vec<Instance>,
}

impl FoliageGroup {
    fn new(particles: Vec<Particle>) -> Self {
        let count = particles.len();
        Self {
            particles,
            blend: vec![0.0; count],
            instances: Vec::with_capacity(count),
        }
    }

    fn position(&self, index: usize) -> Option<Vec3> {
        let p = self.particles.get(index)?;
        let blend = self.blend[index];
        Some(p.chaos_position().lerp(p.target_position(), blend))
    }

    fn advance(&mut self, dt: f32, rate: f32, goal: f32) {
        for (p, blend) in self.particles.iter().zip(self.blend.iter_mut()) {
            let k = convergence_factor(dt, rate, p.speed());
            *blend += (goal - *blend) * k;
        }
    }

    fn rebuild(&mut self) {
        self.instances.clear();
        for (p, blend) in self.particles.iter().zip(&self.blend) {
            let position = p.chaos_position().lerp(p.target_position(), *blend);
            self.instances
                .push(Instance::new(position, p.size(), Quat::IDENTITY));
        }
    }
}

/// Ornaments track positions directly and spin as a group
struct OrnamentCluster {
    kind: BatchKind,
    particles: Vec<Particle>,
    current: Vec<Vec3>,
    /// Euler angles around X and Y
    spin: Vec2,
    instances: Vec<Instance>,
}

impl OrnamentCluster {
    fn new(kind: BatchKind, particles: Vec<Particle>) -> Self {
        let current = particles.iter().map(Particle::chaos_position).collect();
        let count = particles.len();
        Self {
            kind,
            particles,
            current,
            spin: Vec2::ZERO,
            instances: Vec::with_capacity(count),
        }
    }

    fn advance(&mut self, dt: f32, params: &ConvergenceParams, state: TreeState) {
        for (p, current) in self.particles.iter().zip(self.current.iter_mut()) {
            let goal = endpoint(p, state);
            let k = convergence_factor(dt, params.ornament_rate, p.speed());
            *current = current.lerp(goal, k);
        }
        // Spin regardless of state
        self.spin += Vec2::splat(dt * params.ornament_spin);
    }

    fn rebuild(&mut self) {
        let rotation = Quat::from_euler(EulerRot::XYZ, self.spin.x, self.spin.y, 0.0);
        self.instances.clear();
        for (p, current) in self.particles.iter().zip(&self.current) {
            self.instances
                .push(Instance::new(*current, p.size(), rotation));
        }
    }
}

/// Photo cards face the trunk once formed and tumble while scattered
struct CardGroup {
    particles: Vec<Particle>,
    current: Vec<Vec3>,
    euler: Vec<Vec3>,
    instances: Vec<Instance>,
}

impl CardGroup {
    fn new(particles: Vec<Particle>) -> Self {
        let current = particles.iter().map(Particle::chaos_position).collect();
        let count = particles.len();
        Self {
            particles,
            current,
            euler: vec![Vec3::ZERO; count],
            instances: Vec::with_capacity(count),
        }
    }

    fn advance(&mut self, dt: f32, params: &ConvergenceParams, state: TreeState) {
        let cards = self
            .particles
            .iter()
            .zip(self.current.iter_mut())
            .zip(self.euler.iter_mut());

        for ((p, current), euler) in cards {
            let goal = endpoint(p, state);
            let k = convergence_factor(dt, params.card_rate, p.speed());
            *current = current.lerp(goal, k);

            match state {
                TreeState::Formed => {
                    // Look at the trunk at the card's own height
                    let to_axis = Vec3::new(-current.x, 0.0, -current.z);
                    if to_axis.length_squared() > 1e-8 {
                        *euler = Vec3::new(0.0, to_axis.x.atan2(to_axis.z), 0.0);
                    }
                }
                TreeState::Chaos => {
                    let tumble = dt * params.card_tumble;
                    euler.x += tumble;
                    euler.z += tumble;
                }
            }
        }
    }

    fn rebuild(&mut self) {
        self.instances.clear();
        let cards = self.particles.iter().zip(&self.current).zip(&self.euler);
        for ((p, current), euler) in cards {
            let rotation = Quat::from_euler(EulerRot::XYZ, euler.x, euler.y, euler.z);
            self.instances
                .push(Instance::new(*current, p.size(), rotation));
        }
    }
}

fn endpoint(particle: &Particle, state: TreeState) -> Vec3 {
    match state {
        TreeState::Formed => particle.target_position(),
        TreeState::Chaos => particle.chaos_position(),
    }
}

/// What a single frame did
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameReport {
    pub state: TreeState,
    /// Delta actually applied after clamping
    pub dt: f32,
    pub instances: usize,
}

pub struct ConvergenceEngine {
    params: ConvergenceParams,
    foliage: FoliageGroup,
    ornaments: [OrnamentCluster; 2],
    cards: CardGroup,
    elapsed: f32,
    last_state: Option<TreeState>,
}

impl ConvergenceEngine {
    /// Take ownership of the particle set; every particle starts at its
    /// chaos position.
    pub fn new(set: ParticleSet, params: ConvergenceParams) -> Self {
        let ParticleSet {
            foliage,
            ornaments_red,
            ornaments_gold,
            photo_cards,
        } = set;

        Self {
            params,
            foliage: FoliageGroup::new(foliage),
            ornaments: [
                OrnamentCluster::new(BatchKind::OrnamentsRed, ornaments_red),
                OrnamentCluster::new(BatchKind::OrnamentsGold, ornaments_gold),
            ],
            cards: CardGroup::new(photo_cards),
            elapsed: 0.0,
            last_state: None,
        }
    }

    /// Seconds of simulated time applied so far
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    pub fn particle_count(&self) -> usize {
        self.foliage.particles.len()
            + self.ornaments.iter().map(|o| o.particles.len()).sum::<usize>()
            + self.cards.particles.len()
    }

    /// The per-frame callback: read the signal, advance, push to the surface
    pub fn frame<S: RenderSurface + ?Sized>(
        &mut self,
        dt: f32,
        signal: &StateSignal,
        surface: &mut S,
    ) -> FrameReport {
        let state = signal.get();
        let dt = self.advance(dt, state);
        let instances = self.write_to(surface);
        FrameReport {
            state,
            dt,
            instances,
        }
    }

    /// Move every particle toward the endpoint selected by `state`.
    /// Returns the delta actually applied.
    pub fn advance(&mut self, dt: f32, state: TreeState) -> f32 {
        if self.last_state != Some(state) {
            log::debug!("Converging toward {}", state);
            self.last_state = Some(state);
        }

        let dt = self.params.clamp_delta(dt);
        let goal_blend = match state {
            TreeState::Formed => 1.0,
            TreeState::Chaos => 0.0,
        };

        self.foliage
            .advance(dt, self.params.foliage_rate, goal_blend);
        for cluster in &mut self.ornaments {
            cluster.advance(dt, &self.params, state);
        }
        self.cards.advance(dt, &self.params, state);

        self.elapsed += dt;
        dt
    }

    /// Push the current transforms of every group. Returns the instance count.
    pub fn write_to<S: RenderSurface + ?Sized>(&mut self, surface: &mut S) -> usize {
        self.foliage.rebuild();
        surface.submit(BatchKind::Foliage, &self.foliage.instances);

        for cluster in &mut self.ornaments {
            cluster.rebuild();
            surface.submit(cluster.kind, &cluster.instances);
        }

        self.cards.rebuild();
        surface.submit(BatchKind::PhotoCards, &self.cards.instances);

        self.particle_count()
    }

    /// Current position of the `index`-th particle of a group
    pub fn position(&self, kind: BatchKind, index: usize) -> Option<Vec3> {
        match kind {
            BatchKind::Foliage => self.foliage.position(index),
            BatchKind::OrnamentsRed => self.ornaments[0].current.get(index).copied(),
            BatchKind::OrnamentsGold => self.ornaments[1].current.get(index).copied(),
            BatchKind::PhotoCards => self.cards.current.get(index).copied(),
        }
    }

    /// Foliage blend factor, 0 at chaos and 1 at the tree
    pub fn foliage_blend(&self, index: usize) -> Option<f32> {
        self.foliage.blend.get(index).copied()
    }
}
