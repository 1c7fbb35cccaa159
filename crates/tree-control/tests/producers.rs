use glam::{Vec2, Vec3};
use std::thread;
use std::time::{Duration, Instant};
use tree_control::{
    GestureCategory, GestureClassifier, GestureError, GesturePoller, Recognition, SceneControls,
    SharedGesture, SimulatedBackend, SimulatedHand, TickOutcome, VideoFrame, VideoSource,
};
use tree_particles::{OrnamentGroup, Particle, ParticleKind, ParticleSet};
use tree_simulation::{
    BatchKind, ConvergenceEngine, ConvergenceParams, FrameBuffers, StateSignal, TreeState,
};

fn wait_for(mut condition: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + Duration::from_secs(5);
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        thread::sleep(Duration::from_millis(2));
    }
    false
}

struct EveryCall(f64);

impl VideoSource for EveryCall {
    fn latest_frame(&mut self) -> Option<VideoFrame> {
        self.0 += 1.0;
        Some(VideoFrame {
            timestamp_ms: self.0,
            ..VideoFrame::default()
        })
    }
}

struct Broken;

impl GestureClassifier for Broken {
    fn recognize(
        &mut self,
        _frame: &VideoFrame,
        timestamp_ms: u64,
    ) -> Result<Option<Recognition>, GestureError> {
        Err(GestureError::Recognition(format!("inference error at {timestamp_ms}")))
    }
}

#[test]
fn classifier_failure_never_reaches_the_engine() {
    let ornament = Particle::new(
        0,
        Vec3::ZERO,
        Vec3::new(10.0, 0.0, 0.0),
        0.3,
        1.0,
        ParticleKind::Ornament {
            group: OrnamentGroup::Gold,
        },
    )
    .unwrap();
    let set = ParticleSet {
        ornaments_gold: vec![ornament],
        ..ParticleSet::default()
    };
    let mut engine = ConvergenceEngine::new(set, ConvergenceParams::uniform(1.0));
    let mut surface = FrameBuffers::new();

    let signal = StateSignal::new(TreeState::Chaos);
    let mut poller = GesturePoller::new(
        Box::new(EveryCall(0.0)),
        Box::new(Broken),
        SharedGesture::new(),
        signal.clone(),
    );

    for _ in 0..10 {
        assert_eq!(poller.tick(), TickOutcome::Failed);
        engine.frame(0.1, &signal, &mut surface);
    }

    assert_eq!(signal.get(), TreeState::Chaos);
    assert_eq!(signal.write_count(), 0);
    assert_eq!(surface.frames(), 10);
    assert_eq!(engine.position(BatchKind::OrnamentsGold, 0), Some(Vec3::ZERO));
}

#[test]
fn simulated_hand_drives_the_scene() {
    let hand = SimulatedHand::new();
    let signal = StateSignal::new(TreeState::Formed);
    let readout = SharedGesture::new();
    let mut controls = SceneControls::new(
        signal.clone(),
        readout.clone(),
        Box::new(SimulatedBackend::new(hand.clone())),
        Duration::from_millis(5),
    );
    controls.start(false);
    assert!(controls.gestures_active());

    hand.set_in_view(true);
    hand.set_cursor(Vec2::new(1.0, 0.5));
    hand.hold(GestureCategory::OpenPalm);
    assert!(wait_for(|| signal.get() == TreeState::Chaos), "open palm never scattered");

    let seen = readout.snapshot();
    assert!(seen.hand_detected);
    assert!(seen.hand_position.abs_diff_eq(Vec2::new(1.0, 0.0), 1e-3));

    hand.release(GestureCategory::OpenPalm);
    hand.hold(GestureCategory::ClosedFist);
    assert!(wait_for(|| signal.get() == TreeState::Formed), "fist never formed");

    hand.set_in_view(false);
    assert!(wait_for(|| !readout.snapshot().hand_detected));
}

#[test]
fn manual_mode_silences_the_hand() {
    let hand = SimulatedHand::new();
    let signal = StateSignal::new(TreeState::Formed);
    let mut controls = SceneControls::new(
        signal.clone(),
        SharedGesture::new(),
        Box::new(SimulatedBackend::new(hand.clone())),
        Duration::from_millis(5),
    );
    controls.start(false);
    controls.set_manual_mode(true);

    hand.set_in_view(true);
    hand.hold(GestureCategory::OpenPalm);
    thread::sleep(Duration::from_millis(50));
    assert_eq!(signal.get(), TreeState::Formed);

    controls.scatter();
    assert_eq!(signal.get(), TreeState::Chaos);
}
