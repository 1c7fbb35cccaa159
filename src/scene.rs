//! Everything a frame does before drawing
//!
//! Order per frame: pick up a finished greeting, check for the tree forming,
//! advance the particles, then move the camera.

use anyhow::{Context, Result};
use std::sync::Arc;
use tree_control::{
    GestureBackend, GestureReadout, GreetingGenerator, GreetingService, SceneControls,
    SharedGesture, TransitionWatcher,
};
use tree_particles::ParticleSet;
use tree_renderer::{Camera, CameraRig, InstanceStaging};
use tree_simulation::{ConvergenceEngine, StateSignal, TreeState};

use crate::config::AppConfig;

/// Outcome of one scene frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneFrame {
    pub state: TreeState,
    pub instances: usize,
    /// A greeting request went out this frame
    pub greeting_requested: bool,
}

pub struct TreeScene {
    engine: ConvergenceEngine,
    staging: InstanceStaging,
    controls: SceneControls,
    greeting: GreetingService,
    watcher: TransitionWatcher,
    rig: CameraRig,
    camera: Camera,
}

impl TreeScene {
    pub fn new(
        config: &AppConfig,
        backend: Box<dyn GestureBackend>,
        generator: Arc<dyn GreetingGenerator>,
        width: u32,
        height: u32,
    ) -> Result<Self> {
        let set = ParticleSet::build(&config.scene).context("failed to generate the tree")?;

        let signal = StateSignal::new(config.control.initial_state);
        let mut controls = SceneControls::new(
            signal,
            SharedGesture::new(),
            backend,
            config.control.poll_interval(),
        );
        controls.start(config.control.start_manual);

        Ok(Self {
            engine: ConvergenceEngine::new(set, config.convergence),
            staging: InstanceStaging::new(),
            controls,
            greeting: GreetingService::new(generator, config.control.greeting.clone()),
            watcher: TransitionWatcher::new(),
            rig: CameraRig::default(),
            camera: Camera::new(width, height),
        })
    }

    pub fn frame(&mut self, dt: f32) -> SceneFrame {
        self.greeting.poll();

        let state = self.controls.signal().get();
        let greeting_requested = self.watcher.observe(state);
        if greeting_requested {
            self.greeting.request();
        }

        let report = self
            .engine
            .frame(dt, self.controls.signal(), &mut self.staging);

        let readout = self.readout();
        let hand = (readout.hand_detected && !self.controls.is_manual())
            .then_some(readout.hand_position);
        self.rig.follow(&mut self.camera, report.dt, self.engine.elapsed(), hand);

        SceneFrame {
            state: report.state,
            instances: report.instances,
            greeting_requested,
        }
    }

    pub fn staging(&self) -> &InstanceStaging {
        &self.staging
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.camera.resize(width, height);
    }

    /// Scene time in seconds, drives wind sway and idle drift
    pub fn time(&self) -> f32 {
        self.engine.elapsed()
    }

    pub fn controls(&self) -> &SceneControls {
        &self.controls
    }

    pub fn controls_mut(&mut self) -> &mut SceneControls {
        &mut self.controls
    }

    pub fn greeting(&self) -> &GreetingService {
        &self.greeting
    }

    pub fn readout(&self) -> GestureReadout {
        self.controls.readout().snapshot()
    }
}
