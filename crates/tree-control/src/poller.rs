//! Periodic gesture classification
//!
//! The poller owns the video source and the classifier. Each tick it
//! classifies the newest frame at most once and writes the result into the
//! shared readout and the state signal. Nothing that goes wrong inside a tick
//! leaves the poller: errors and panics are logged and dropped.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use tree_simulation::{StateSignal, TreeState};

use crate::gesture::{
    GestureCategory, GestureClassifier, GestureError, SharedGesture, VideoSource, dispatch,
};

/// Shared cancellation flag
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

/// What a single tick did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Video not ready yet
    NotReady,
    /// Newest frame was already classified
    Stale,
    /// Hand in view; `state` is what was written to the signal, if anything
    Recognized {
        gesture: GestureCategory,
        state: Option<TreeState>,
    },
    NoHand,
    /// Classifier failed or panicked, nothing was written
    Failed,
}

pub struct GesturePoller {
    source: Box<dyn VideoSource>,
    classifier: Box<dyn GestureClassifier>,
    readout: SharedGesture,
    signal: StateSignal,
    last_frame: Option<f64>,
    clock: Instant,
}

impl GesturePoller {
    pub fn new(
        source: Box<dyn VideoSource>,
        classifier: Box<dyn GestureClassifier>,
        readout: SharedGesture,
        signal: StateSignal,
    ) -> Self {
        Self {
            source,
            classifier,
            readout,
            signal,
            last_frame: None,
            clock: Instant::now(),
        }
    }

    /// Classify the newest frame, if there is one we have not seen
    pub fn tick(&mut self) -> TickOutcome {
        let Some(frame) = self.source.latest_frame() else {
            return TickOutcome::NotReady;
        };

        if self.last_frame == Some(frame.timestamp_ms) {
            return TickOutcome::Stale;
        }
        // Marked before inference so a failing frame is not retried
        self.last_frame = Some(frame.timestamp_ms);

        let now_ms = self.clock.elapsed().as_millis() as u64;
        let classifier = &mut self.classifier;
        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            classifier.recognize(&frame, now_ms)
        }));

        match result {
            Ok(Ok(Some(recognition))) => {
                let state = dispatch(Some(&recognition), &self.readout, &self.signal);
                TickOutcome::Recognized {
                    gesture: recognition.category,
                    state,
                }
            }
            Ok(Ok(None)) => {
                dispatch(None, &self.readout, &self.signal);
                TickOutcome::NoHand
            }
            Ok(Err(err)) => {
                log::debug!("Dropped gesture frame at {}ms: {err}", frame.timestamp_ms);
                TickOutcome::Failed
            }
            Err(_) => {
                log::debug!(
                    "Gesture classifier panicked at {}ms, frame dropped",
                    frame.timestamp_ms
                );
                TickOutcome::Failed
            }
        }
    }

    /// Move the poller onto its own thread, ticking every `interval`
    pub fn spawn(mut self, interval: Duration) -> Result<PollerHandle, GestureError> {
        let token = CancelToken::new();
        let thread_token = token.clone();

        let thread = thread::Builder::new()
            .name("gesture-poller".into())
            .spawn(move || {
                while !thread_token.is_cancelled() {
                    self.tick();
                    thread::park_timeout(interval);
                }
                log::debug!("Gesture poller exited");
            })?;

        log::info!("✓ Gesture poller running every {}ms", interval.as_millis());
        Ok(PollerHandle {
            token,
            thread: Some(thread),
        })
    }
}

/// Running poller; stopping or dropping it joins the thread, which releases
/// the video source and classifier.
pub struct PollerHandle {
    token: CancelToken,
    thread: Option<JoinHandle<()>>,
}

impl PollerHandle {
    pub fn is_running(&self) -> bool {
        self.thread
            .as_ref()
            .is_some_and(|thread| !thread.is_finished())
    }

    pub fn stop(&mut self) {
        self.token.cancel();
        if let Some(thread) = self.thread.take() {
            thread.thread().unpark();
            if thread.join().is_err() {
                log::warn!("Gesture poller thread panicked");
            }
        }
    }
}

impl Drop for PollerHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gesture::{Landmark, Recognition, VideoFrame};
    use std::collections::VecDeque;
    use std::sync::atomic::AtomicUsize;

    /// Hands out a fresh frame per call, or repeats `fixed` when set
    struct CountingSource {
        next: f64,
        fixed: Option<f64>,
        ready: bool,
    }

    impl CountingSource {
        fn fresh() -> Self {
            Self {
                next: 0.0,
                fixed: None,
                ready: true,
            }
        }
    }

    impl VideoSource for CountingSource {
        fn latest_frame(&mut self) -> Option<VideoFrame> {
            if !self.ready {
                return None;
            }
            let timestamp_ms = self.fixed.unwrap_or_else(|| {
                self.next += 33.0;
                self.next
            });
            Some(VideoFrame {
                timestamp_ms,
                ..VideoFrame::default()
            })
        }
    }

    enum Step {
        Hand(GestureCategory),
        Nothing,
        Fail,
        Panic,
    }

    struct ScriptedClassifier {
        steps: VecDeque<Step>,
        calls: Arc<AtomicUsize>,
    }

    impl ScriptedClassifier {
        fn new(steps: impl IntoIterator<Item = Step>) -> (Self, Arc<AtomicUsize>) {
            let calls = Arc::new(AtomicUsize::new(0));
            let classifier = Self {
                steps: steps.into_iter().collect(),
                calls: calls.clone(),
            };
            (classifier, calls)
        }
    }

    impl GestureClassifier for ScriptedClassifier {
        fn recognize(
            &mut self,
            _frame: &VideoFrame,
            _timestamp_ms: u64,
        ) -> Result<Option<Recognition>, GestureError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.steps.pop_front().unwrap_or(Step::Nothing) {
                Step::Hand(category) => Ok(Some(Recognition {
                    category,
                    landmarks: vec![Landmark::new(0.5, 0.5, 0.0)],
                })),
                Step::Nothing => Ok(None),
                Step::Fail => Err(GestureError::Recognition("model returned garbage".into())),
                Step::Panic => panic!("inference blew up"),
            }
        }
    }

    fn poller(
        source: CountingSource,
        steps: impl IntoIterator<Item = Step>,
        signal: &StateSignal,
    ) -> (GesturePoller, SharedGesture, Arc<AtomicUsize>) {
        let (classifier, calls) = ScriptedClassifier::new(steps);
        let readout = SharedGesture::new();
        let poller = GesturePoller::new(
            Box::new(source),
            Box::new(classifier),
            readout.clone(),
            signal.clone(),
        );
        (poller, readout, calls)
    }

    #[test]
    fn recognized_gesture_writes_signal() {
        let signal = StateSignal::new(TreeState::Formed);
        let (mut poller, readout, _) = poller(
            CountingSource::fresh(),
            [Step::Hand(GestureCategory::OpenPalm)],
            &signal,
        );

        assert_eq!(
            poller.tick(),
            TickOutcome::Recognized {
                gesture: GestureCategory::OpenPalm,
                state: Some(TreeState::Chaos),
            }
        );
        assert_eq!(signal.get(), TreeState::Chaos);
        assert!(readout.snapshot().hand_detected);
    }

    #[test]
    fn failing_classifier_leaves_signal_untouched() {
        let signal = StateSignal::new(TreeState::Chaos);
        let (mut poller, readout, _) = poller(
            CountingSource::fresh(),
            [Step::Hand(GestureCategory::OpenPalm), Step::Fail],
            &signal,
        );
        poller.tick();
        let before = readout.snapshot();
        let writes = signal.write_count();

        assert_eq!(poller.tick(), TickOutcome::Failed);
        assert_eq!(signal.get(), TreeState::Chaos);
        assert_eq!(signal.write_count(), writes);
        assert_eq!(readout.snapshot(), before);
    }

    #[test]
    fn panicking_classifier_is_contained() {
        let signal = StateSignal::new(TreeState::Formed);
        let (mut poller, _, calls) = poller(
            CountingSource::fresh(),
            [Step::Panic, Step::Hand(GestureCategory::OpenPalm)],
            &signal,
        );

        assert_eq!(poller.tick(), TickOutcome::Failed);
        assert_eq!(signal.get(), TreeState::Formed);

        // Still usable afterwards
        poller.tick();
        assert_eq!(signal.get(), TreeState::Chaos);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn stale_frame_is_not_reclassified() {
        let signal = StateSignal::default();
        let source = CountingSource {
            fixed: Some(1000.0),
            ..CountingSource::fresh()
        };
        let (mut poller, _, calls) = poller(source, [Step::Nothing, Step::Nothing], &signal);

        assert_eq!(poller.tick(), TickOutcome::NoHand);
        assert_eq!(poller.tick(), TickOutcome::Stale);
        assert_eq!(poller.tick(), TickOutcome::Stale);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn waits_for_video() {
        let signal = StateSignal::default();
        let source = CountingSource {
            ready: false,
            ..CountingSource::fresh()
        };
        let (mut poller, _, calls) = poller(source, [], &signal);

        assert_eq!(poller.tick(), TickOutcome::NotReady);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn stop_joins_and_halts_polling() {
        let signal = StateSignal::new(TreeState::Formed);
        let (poller, _, calls) = poller(
            CountingSource::fresh(),
            [Step::Fail, Step::Panic, Step::Hand(GestureCategory::OpenPalm)],
            &signal,
        );

        let mut handle = poller.spawn(Duration::from_millis(1)).unwrap();
        let deadline = Instant::now() + Duration::from_secs(5);
        while calls.load(Ordering::SeqCst) < 3 && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(1));
        }
        assert!(handle.is_running());

        handle.stop();
        assert!(!handle.is_running());
        let after_stop = calls.load(Ordering::SeqCst);
        thread::sleep(Duration::from_millis(20));
        assert_eq!(calls.load(Ordering::SeqCst), after_stop);
        assert_eq!(signal.get(), TreeState::Chaos);
    }

    #[test]
    fn drop_releases_the_thread() {
        let signal = StateSignal::default();
        let (poller, _, calls) = poller(CountingSource::fresh(), [], &signal);

        // A long interval: only the unpark in stop() can end the wait promptly
        let handle = poller.spawn(Duration::from_secs(60)).unwrap();
        let started = Instant::now();
        drop(handle);
        assert!(started.elapsed() < Duration::from_secs(5));

        let after_drop = calls.load(Ordering::SeqCst);
        thread::sleep(Duration::from_millis(20));
        assert_eq!(calls.load(Ordering::SeqCst), after_drop);
    }
}
