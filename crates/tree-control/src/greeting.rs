//! Greeting shown when the tree forms
//!
//! Generation runs on a worker thread and reports back over a channel that
//! the frame loop drains with `try_recv`, so a slow generator never stalls
//! rendering. Failures turn into fixed fallback lines.

use rand::seq::IndexedRandom;
use serde::Deserialize;
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GreetingError {
    #[error("greeting generator is not configured")]
    NotConfigured,

    #[error("greeting generation failed: {0}")]
    Generation(String),
}

/// Fixed lines around the generated greeting
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct GreetingTexts {
    /// Shown before the first request
    pub initial: String,
    /// Shown while a request is in flight
    pub loading: String,
    /// Used when no generator is configured
    pub unconfigured: String,
    /// Used when generation fails
    pub failed: String,
}

impl Default for GreetingTexts {
    fn default() -> Self {
        Self {
            initial: "The magic of the season awaits your command.".into(),
            loading: "Consulting the best minds...".into(),
            unconfigured: "May your holidays be filled with golden moments and emerald dreams."
                .into(),
            failed: "Experience the grandeur of the ultimate holiday season.".into(),
        }
    }
}

/// Produces one short greeting per call. Called off the render thread.
pub trait GreetingGenerator: Send + Sync {
    fn generate(&self) -> Result<String, GreetingError>;
}

/// Local generator picking from a fixed set of lines
#[derive(Clone, Debug)]
pub struct PhraseBook {
    phrases: Vec<String>,
}

impl PhraseBook {
    pub fn new(phrases: Vec<String>) -> Self {
        Self { phrases }
    }
}

impl Default for PhraseBook {
    fn default() -> Self {
        Self::new(Vec::from(
            [
                "The most golden Christmas ever, believe me.",
                "Tremendous holidays for tremendous people.",
                "Winning in emerald and gold, all season long.",
                "A magnificent season, the greatest anyone has seen.",
                "Only the finest cheer, polished to a golden shine.",
            ]
            .map(String::from),
        ))
    }
}

impl GreetingGenerator for PhraseBook {
    fn generate(&self) -> Result<String, GreetingError> {
        self.phrases
            .choose(&mut rand::rng())
            .map(|phrase| phrase.trim().to_string())
            .ok_or_else(|| GreetingError::Generation("phrase book is empty".into()))
    }
}

/// Stand-in used when no generator is available
#[derive(Clone, Copy, Debug, Default)]
pub struct Unconfigured;

impl GreetingGenerator for Unconfigured {
    fn generate(&self) -> Result<String, GreetingError> {
        Err(GreetingError::NotConfigured)
    }
}

pub struct GreetingService {
    generator: Arc<dyn GreetingGenerator>,
    texts: GreetingTexts,
    text: String,
    pending: Option<Receiver<Result<String, GreetingError>>>,
}

impl GreetingService {
    pub fn new(generator: Arc<dyn GreetingGenerator>, texts: GreetingTexts) -> Self {
        Self {
            generator,
            text: texts.initial.clone(),
            texts,
            pending: None,
        }
    }

    /// Start a new request. A request already in flight is abandoned and its
    /// result ignored.
    pub fn request(&mut self) {
        let (tx, rx) = mpsc::channel();
        let generator = Arc::clone(&self.generator);

        let spawned = thread::Builder::new()
            .name("greeting".into())
            .spawn(move || {
                // Receiver may be gone if a newer request replaced it
                let _ = tx.send(generator.generate());
            });

        match spawned {
            Ok(_) => self.pending = Some(rx),
            Err(err) => {
                log::warn!("Could not start greeting worker: {err}");
                self.pending = None;
                self.text = self.texts.failed.clone();
            }
        }
    }

    /// Pick up a finished request. Returns true when the text changed.
    pub fn poll(&mut self) -> bool {
        let Some(rx) = &self.pending else {
            return false;
        };

        let result = match rx.try_recv() {
            Ok(result) => result,
            Err(TryRecvError::Empty) => return false,
            Err(TryRecvError::Disconnected) => {
                Err(GreetingError::Generation("worker exited without a result".into()))
            }
        };
        self.pending = None;

        self.text = match result {
            Ok(text) => text,
            Err(GreetingError::NotConfigured) => {
                log::warn!("Greeting generator not configured, using fallback");
                self.texts.unconfigured.clone()
            }
            Err(err) => {
                log::warn!("{err}");
                self.texts.failed.clone()
            }
        };
        true
    }

    pub fn is_loading(&self) -> bool {
        self.pending.is_some()
    }

    /// Text to show right now
    pub fn display_text(&self) -> &str {
        if self.is_loading() {
            &self.texts.loading
        } else {
            &self.text
        }
    }

    /// Last settled greeting, ignoring any request in flight
    pub fn current(&self) -> &str {
        &self.text
    }
}
