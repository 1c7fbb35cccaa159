//! Gesture and manual control of the scene state

use serde::Deserialize;
use std::time::Duration;
use tree_simulation::{StateSignal, TreeState};

use crate::gesture::{GestureClassifier, GestureError, SharedGesture, VideoSource};
use crate::greeting::GreetingTexts;
use crate::poller::{GesturePoller, PollerHandle};

/// Which gesture backend the app connects to
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendChoice {
    /// Cursor and keyboard stand in for the hand
    #[default]
    Simulated,
    /// Manual control only
    None,
}

/// Where greetings come from
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GeneratorChoice {
    #[default]
    PhraseBook,
    /// No generator, the unconfigured fallback is shown
    None,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct ControlConfig {
    pub poll_interval_ms: u64,
    pub backend: BackendChoice,
    /// State the signal holds before any producer writes it
    pub initial_state: TreeState,
    /// Start with the gesture pipeline off
    pub start_manual: bool,
    pub generator: GeneratorChoice,
    pub greeting: GreetingTexts,
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 100,
            backend: BackendChoice::default(),
            initial_state: TreeState::Formed,
            start_manual: false,
            generator: GeneratorChoice::default(),
            greeting: GreetingTexts::default(),
        }
    }
}

impl ControlConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }
}

/// Source of a video feed plus recogniser. Connecting acquires the
/// resources; they are released when the poller holding them stops.
pub trait GestureBackend: Send {
    fn name(&self) -> &str;

    fn connect(
        &mut self,
    ) -> Result<(Box<dyn VideoSource>, Box<dyn GestureClassifier>), GestureError>;
}

/// Owns both producers of the scene state
pub struct SceneControls {
    signal: StateSignal,
    readout: SharedGesture,
    backend: Box<dyn GestureBackend>,
    poller: Option<PollerHandle>,
    manual: bool,
    poll_interval: Duration,
}

impl SceneControls {
    /// Controls start in manual mode until [`SceneControls::start`]
    pub fn new(
        signal: StateSignal,
        readout: SharedGesture,
        backend: Box<dyn GestureBackend>,
        poll_interval: Duration,
    ) -> Self {
        Self {
            signal,
            readout,
            backend,
            poller: None,
            manual: true,
            poll_interval,
        }
    }

    /// Enter the requested mode. Gesture mode falls back to manual if the
    /// backend cannot be reached.
    pub fn start(&mut self, manual: bool) {
        self.set_manual_mode(manual);
    }

    pub fn set_manual_mode(&mut self, manual: bool) {
        if manual {
            self.stop_gestures();
            self.manual = true;
        } else if self.poller.is_none() {
            self.manual = !self.start_gestures();
        }
    }

    /// Flip between gesture and manual control, returning the new manual flag
    pub fn toggle_manual_mode(&mut self) -> bool {
        self.set_manual_mode(!self.manual);
        self.manual
    }

    pub fn scatter(&self) {
        self.command(TreeState::Chaos);
    }

    pub fn form(&self) {
        self.command(TreeState::Formed);
    }

    fn command(&self, state: TreeState) {
        let previous = self.signal.set(state);
        log::debug!("Manual command {previous} -> {state}");
    }

    pub fn is_manual(&self) -> bool {
        self.manual
    }

    /// True while the poller thread is alive
    pub fn gestures_active(&self) -> bool {
        self.poller.as_ref().is_some_and(PollerHandle::is_running)
    }

    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    pub fn signal(&self) -> &StateSignal {
        &self.signal
    }

    pub fn readout(&self) -> &SharedGesture {
        &self.readout
    }

    fn start_gestures(&mut self) -> bool {
        let spawned = self.backend.connect().and_then(|(video, classifier)| {
            GesturePoller::new(video, classifier, self.readout.clone(), self.signal.clone())
                .spawn(self.poll_interval)
        });

        match spawned {
            Ok(handle) => {
                log::info!("✓ Gesture control via {} backend", self.backend.name());
                self.poller = Some(handle);
                true
            }
            Err(err) => {
                log::error!("Gesture recognition unavailable, falling back to manual: {err}");
                false
            }
        }
    }

    fn stop_gestures(&mut self) {
        if let Some(mut poller) = self.poller.take() {
            poller.stop();
            self.readout.clear();
            log::info!("Gesture control stopped");
        }
    }
}

/// Reports entry into FORMED from frame-by-frame observations
#[derive(Debug, Default, Clone)]
pub struct TransitionWatcher {
    last: Option<TreeState>,
}

impl TransitionWatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// True when `state` is FORMED and the previous observation was not,
    /// including the very first observation.
    pub fn observe(&mut self, state: TreeState) -> bool {
        let entered = state == TreeState::Formed && self.last != Some(TreeState::Formed);
        self.last = Some(state);
        entered
    }
}
