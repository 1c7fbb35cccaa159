//! Window title HUD and frame timing

use std::collections::VecDeque;
use std::time::{Duration, Instant};
use tree_control::GestureReadout;
use tree_simulation::TreeState;

const TITLE: &str = "Luxury Holiday Tree";

/// Rolling frame time average over the last 100 frames
pub struct FrameStats {
    frame_times: VecDeque<f32>,
    last_frame_time: Instant,
}

impl FrameStats {
    pub fn new() -> Self {
        Self {
            frame_times: VecDeque::with_capacity(100),
            last_frame_time: Instant::now(),
        }
    }

    /// Mark a new frame, returning seconds since the previous one
    pub fn tick(&mut self) -> f32 {
        let now = Instant::now();
        let dt = (now - self.last_frame_time).as_secs_f32();
        self.last_frame_time = now;
        self.record(dt);
        dt
    }

    fn record(&mut self, dt: f32) {
        self.frame_times.push_back(dt * 1000.0);
        if self.frame_times.len() > 100 {
            self.frame_times.pop_front();
        }
    }

    pub fn fps(&self) -> f32 {
        if self.frame_times.is_empty() {
            return 0.0;
        }
        let avg_frame_time = self.frame_times.iter().sum::<f32>() / self.frame_times.len() as f32;
        if avg_frame_time > 0.0 {
            1000.0 / avg_frame_time
        } else {
            0.0
        }
    }
}

/// What the HUD shows this frame
pub struct HudInfo<'a> {
    pub state: TreeState,
    /// Greeting, or the loading line while one is being generated
    pub greeting: &'a str,
    pub manual: bool,
    pub sensor_active: bool,
    /// Name of the gesture backend feeding the sensor
    pub backend: &'a str,
    pub readout: GestureReadout,
    pub fps: f32,
}

pub fn title(info: &HudInfo<'_>) -> String {
    let message = match (info.state, info.manual) {
        (TreeState::Formed, _) => format!("\"{}\"", info.greeting),
        (TreeState::Chaos, true) => "[F] form  [C] scatter  [G] gestures".to_string(),
        (TreeState::Chaos, false) => "Close your hand to form the tree".to_string(),
    };

    let sensor = if info.manual || !info.sensor_active {
        "Manual".to_string()
    } else if info.readout.hand_detected {
        format!("Sensor ({}): {}", info.backend, info.readout.gesture)
    } else {
        format!("Sensor ({}): no hand", info.backend)
    };

    format!(
        "{TITLE} | {} | {message} | {sensor} | {:.0} FPS",
        info.state, info.fps
    )
}

/// Pushes the title to the window only when it changed, and at most once
/// per `interval`
pub struct TitleRefresh {
    interval: Duration,
    shown: String,
    last_update: Option<Instant>,
}

impl TitleRefresh {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            shown: String::new(),
            last_update: None,
        }
    }

    /// Returns the title to set, or `None` to leave the window alone
    pub fn update(&mut self, now: Instant, title: String) -> Option<&str> {
        if title == self.shown {
            return None;
        }
        if let Some(last) = self.last_update {
            if now.duration_since(last) < self.interval {
                return None;
            }
        }
        self.shown = title;
        self.last_update = Some(now);
        Some(&self.shown)
    }
}
