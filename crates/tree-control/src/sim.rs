//! Simulated gesture backend
//!
//! Stands in for a webcam and recogniser: the window feeds the cursor and
//! held keys into a [`SimulatedHand`], and the classifier reports them back
//! as if a hand had been seen. It goes through the same poller as a real
//! backend would.

use glam::Vec2;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;

use crate::controls::GestureBackend;
use crate::gesture::{
    GestureCategory, GestureClassifier, GestureError, Landmark, Recognition, VideoFrame,
    VideoSource,
};

/// Simulated capture rate
const FRAME_INTERVAL_MS: f64 = 1000.0 / 30.0;

/// Landmarks per simulated hand, same as a real hand model
const LANDMARKS: usize = 21;
const HAND_SPREAD: f32 = 0.04;

#[derive(Debug, Clone, Copy, PartialEq)]
struct HandState {
    /// Cursor in normalised image coordinates
    cursor: Vec2,
    in_view: bool,
    pose: GestureCategory,
}

impl Default for HandState {
    fn default() -> Self {
        Self {
            cursor: Vec2::splat(0.5),
            in_view: false,
            pose: GestureCategory::NoGesture,
        }
    }
}

/// Cloneable input handle written by the window, read by the classifier
#[derive(Debug, Clone, Default)]
pub struct SimulatedHand {
    state: Arc<Mutex<HandState>>,
}

impl SimulatedHand {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HandState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Cursor position in [0, 1] × [0, 1], origin top left
    pub fn set_cursor(&self, position: Vec2) {
        self.lock().cursor = position.clamp(Vec2::ZERO, Vec2::ONE);
    }

    /// Whether the cursor is over the window, i.e. the hand is in frame
    pub fn set_in_view(&self, in_view: bool) {
        self.lock().in_view = in_view;
    }

    pub fn hold(&self, pose: GestureCategory) {
        self.lock().pose = pose;
    }

    /// Release `pose` if it is the one held
    pub fn release(&self, pose: GestureCategory) {
        let mut state = self.lock();
        if state.pose == pose {
            state.pose = GestureCategory::NoGesture;
        }
    }

    fn recognition(&self) -> Option<Recognition> {
        let state = *self.lock();
        if !state.in_view {
            return None;
        }

        // Ring of points around the cursor so the centroid lands on it
        let landmarks = (0..LANDMARKS)
            .map(|i| {
                let angle = i as f32 / LANDMARKS as f32 * std::f32::consts::TAU;
                let offset = Vec2::from_angle(angle) * HAND_SPREAD;
                Landmark::new(state.cursor.x + offset.x, state.cursor.y + offset.y, 0.0)
            })
            .collect();

        Some(Recognition {
            category: state.pose,
            landmarks,
        })
    }
}

/// Frame clock at a fixed capture rate, with no pixel data
struct SyntheticVideo {
    started: Instant,
}

impl VideoSource for SyntheticVideo {
    fn latest_frame(&mut self) -> Option<VideoFrame> {
        let elapsed_ms = self.started.elapsed().as_secs_f64() * 1000.0;
        let frame_index = (elapsed_ms / FRAME_INTERVAL_MS).floor();
        Some(VideoFrame {
            timestamp_ms: frame_index * FRAME_INTERVAL_MS,
            ..VideoFrame::default()
        })
    }
}

struct SimulatedClassifier {
    hand: SimulatedHand,
}

impl GestureClassifier for SimulatedClassifier {
    fn recognize(
        &mut self,
        _frame: &VideoFrame,
        _timestamp_ms: u64,
    ) -> Result<Option<Recognition>, GestureError> {
        Ok(self.hand.recognition())
    }
}

pub struct SimulatedBackend {
    hand: SimulatedHand,
}

impl SimulatedBackend {
    pub fn new(hand: SimulatedHand) -> Self {
        Self { hand }
    }
}

impl GestureBackend for SimulatedBackend {
    fn name(&self) -> &str {
        "simulated"
    }

    fn connect(
        &mut self,
    ) -> Result<(Box<dyn VideoSource>, Box<dyn GestureClassifier>), GestureError> {
        let video = SyntheticVideo {
            started: Instant::now(),
        };
        let classifier = SimulatedClassifier {
            hand: self.hand.clone(),
        };
        Ok((Box::new(video), Box::new(classifier)))
    }
}

/// Backend that never connects, leaving only manual control
#[derive(Debug, Clone, Copy, Default)]
pub struct NoBackend;

impl GestureBackend for NoBackend {
    fn name(&self) -> &str {
        "none"
    }

    fn connect(
        &mut self,
    ) -> Result<(Box<dyn VideoSource>, Box<dyn GestureClassifier>), GestureError> {
        Err(GestureError::Unavailable("no gesture backend configured".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gesture::hand_centroid;

    #[test]
    fn hand_out_of_view_is_not_recognized() {
        let hand = SimulatedHand::new();
        hand.hold(GestureCategory::OpenPalm);
        assert_eq!(hand.recognition(), None);
    }

    #[test]
    fn centroid_follows_cursor() {
        let hand = SimulatedHand::new();
        hand.set_in_view(true);
        hand.set_cursor(Vec2::new(0.75, 0.25));

        let recognition = hand.recognition().unwrap();
        assert_eq!(recognition.landmarks.len(), LANDMARKS);
        let centroid = hand_centroid(&recognition.landmarks).unwrap();
        assert!(
            centroid.abs_diff_eq(Vec2::new(0.5, -0.5), 1e-4),
            "centroid {centroid:?}"
        );
    }

    #[test]
    fn release_only_drops_the_held_pose() {
        let hand = SimulatedHand::new();
        hand.set_in_view(true);
        hand.hold(GestureCategory::ClosedFist);
        hand.release(GestureCategory::OpenPalm);
        assert_eq!(hand.recognition().unwrap().category, GestureCategory::ClosedFist);

        hand.release(GestureCategory::ClosedFist);
        assert_eq!(hand.recognition().unwrap().category, GestureCategory::NoGesture);
    }

    #[test]
    fn synthetic_video_repeats_within_a_frame() {
        let mut video = SyntheticVideo {
            started: Instant::now(),
        };
        let a = video.latest_frame().unwrap().timestamp_ms;
        let b = video.latest_frame().unwrap().timestamp_ms;
        // Two reads microseconds apart share a frame unless a boundary fell between
        assert!(b == a || b - a <= FRAME_INTERVAL_MS + 1e-9);
    }

    #[test]
    fn no_backend_refuses_to_connect() {
        assert!(matches!(
            NoBackend.connect(),
            Err(GestureError::Unavailable(_))
        ));
    }
}
