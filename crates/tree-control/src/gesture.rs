//! Gesture vocabulary and the shared readout
//!
//! The recogniser itself is an external collaborator reached through
//! [`VideoSource`] and [`GestureClassifier`]. This module only maps what it
//! reports onto the scene state and the hand position used for framing.

use glam::Vec2;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use thiserror::Error;
use tree_simulation::{StateSignal, TreeState};

#[derive(Debug, Error)]
pub enum GestureError {
    #[error("gesture backend unavailable: {0}")]
    Unavailable(String),

    #[error("video source failed: {0}")]
    Video(String),

    #[error("recognition failed: {0}")]
    Recognition(String),

    #[error("failed to start gesture poller")]
    Spawn(#[from] std::io::Error),
}

/// Fixed gesture vocabulary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum GestureCategory {
    OpenPalm,
    ClosedFist,
    #[default]
    NoGesture,
}

impl GestureCategory {
    /// Map a recogniser label; anything outside the vocabulary is `NoGesture`
    pub fn from_label(label: &str) -> Self {
        match label {
            "Open_Palm" => GestureCategory::OpenPalm,
            "Closed_Fist" => GestureCategory::ClosedFist,
            _ => GestureCategory::NoGesture,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            GestureCategory::OpenPalm => "Open_Palm",
            GestureCategory::ClosedFist => "Closed_Fist",
            GestureCategory::NoGesture => "None",
        }
    }

    /// Scene state this gesture asks for, if any
    pub fn target_state(self) -> Option<TreeState> {
        match self {
            GestureCategory::OpenPalm => Some(TreeState::Chaos),
            GestureCategory::ClosedFist => Some(TreeState::Formed),
            GestureCategory::NoGesture => None,
        }
    }
}

impl fmt::Display for GestureCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Normalised hand landmark, image coordinates in [0, 1]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Landmark {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

/// One captured video frame
#[derive(Debug, Clone, PartialEq, Default)]
pub struct VideoFrame {
    /// Media time of the frame, used to skip frames already classified
    pub timestamp_ms: f64,
    pub width: u32,
    pub height: u32,
    /// Packed RGBA8, may be empty for synthetic sources
    pub pixels: Vec<u8>,
}

/// Result of one successful classification with a hand in view
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Recognition {
    pub category: GestureCategory,
    pub landmarks: Vec<Landmark>,
}

/// Latest frame provider (webcam or a stand-in)
pub trait VideoSource: Send {
    /// Most recent frame, or `None` while the video is not ready
    fn latest_frame(&mut self) -> Option<VideoFrame>;
}

/// Gesture recogniser
pub trait GestureClassifier: Send {
    /// `Ok(None)` means no hand in view
    fn recognize(
        &mut self,
        frame: &VideoFrame,
        timestamp_ms: u64,
    ) -> Result<Option<Recognition>, GestureError>;
}

/// Average of the landmark coordinates remapped from [0, 1] to [-1, 1]
pub fn hand_centroid(landmarks: &[Landmark]) -> Option<Vec2> {
    if landmarks.is_empty() {
        return None;
    }

    let sum = landmarks
        .iter()
        .fold(Vec2::ZERO, |acc, l| acc + Vec2::new(l.x, l.y));
    let average = sum / landmarks.len() as f32;
    Some((average - Vec2::splat(0.5)) * 2.0)
}

/// What the presentation layer knows about the hand
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GestureReadout {
    pub hand_detected: bool,
    pub gesture: GestureCategory,
    /// Centroid in [-1, 1], only used for camera framing
    pub hand_position: Vec2,
}

impl GestureReadout {
    /// Fold one classifier result into the readout. Missing fields keep
    /// their previous values.
    pub fn apply(&mut self, recognition: Option<&Recognition>) {
        match recognition {
            Some(recognition) => {
                self.hand_detected = true;
                self.gesture = recognition.category;
                if let Some(centroid) = hand_centroid(&recognition.landmarks) {
                    self.hand_position = centroid;
                }
            }
            None => self.hand_detected = false,
        }
    }
}

/// Cloneable handle to the readout shared between the poller and the frame loop
#[derive(Debug, Clone, Default)]
pub struct SharedGesture {
    inner: Arc<Mutex<GestureReadout>>,
}

impl SharedGesture {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, GestureReadout> {
        // A panicking writer can only leave a stale readout behind
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn snapshot(&self) -> GestureReadout {
        *self.lock()
    }

    pub fn apply(&self, recognition: Option<&Recognition>) {
        self.lock().apply(recognition);
    }

    pub fn clear(&self) {
        *self.lock() = GestureReadout::default();
    }
}

/// Apply a classifier result to the readout and the signal.
///
/// Returns the state written, if the gesture asked for one.
pub fn dispatch(
    recognition: Option<&Recognition>,
    readout: &SharedGesture,
    signal: &StateSignal,
) -> Option<TreeState> {
    readout.apply(recognition);

    let state = recognition.and_then(|r| r.category.target_state())?;
    let previous = signal.set(state);
    if previous != state {
        log::debug!("Gesture switched scene {previous} -> {state}");
    }
    Some(state)
}
