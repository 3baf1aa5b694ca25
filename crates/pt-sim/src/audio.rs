//! Audio collaborator contract and the sample data handed to the engine.

use crate::error::SimResult;
use pt_project::SoundConfig;
use std::sync::Arc;

/// One loaded engine loop.
#[derive(Clone, Debug, PartialEq)]
pub struct Sample {
    pub name: String,
    /// Engine speed the loop was recorded at
    pub rpm: f64,
    pub volume: f64,
    pub data: Arc<[u8]>,
}

/// Loaded samples, in configuration order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SampleSet {
    samples: Vec<Sample>,
}

impl SampleSet {
    pub fn new(samples: Vec<Sample>) -> Self {
        Self { samples }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Sample> {
        self.samples.iter()
    }

    pub fn as_slice(&self) -> &[Sample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Drop every buffer.
    pub fn clear(&mut self) {
        self.samples.clear();
    }

    /// Total bytes held across all buffers.
    pub fn byte_len(&self) -> usize {
        self.samples.iter().map(|s| s.data.len()).sum()
    }
}

/// Audio playback collaborator.
///
/// `init` is the only suspending operation in the whole stepper. Until it
/// resolves and `is_active` reports true, the stepper never applies sounds.
#[allow(async_fn_in_trait)]
pub trait AudioBackend {
    async fn init(&mut self, sounds: &SoundConfig) -> SimResult<()>;

    /// Release playback resources. Must be safe to call repeatedly.
    fn dispose(&mut self);

    fn samples(&self) -> &SampleSet;

    /// True while a playback context is open.
    fn is_active(&self) -> bool;
}

/// Audio backend that loads nothing and never opens a playback context.
#[derive(Clone, Debug, Default)]
pub struct SilentAudio {
    samples: SampleSet,
}

impl AudioBackend for SilentAudio {
    async fn init(&mut self, _sounds: &SoundConfig) -> SimResult<()> {
        Ok(())
    }

    fn dispose(&mut self) {}

    fn samples(&self) -> &SampleSet {
        &self.samples
    }

    fn is_active(&self) -> bool {
        false
    }
}
