//! Audio backend that loads engine loops from disk.

use crate::error::ComponentError;
use pt_project::SoundConfig;
use pt_sim::{AudioBackend, Sample, SampleSet, SimResult};

/// Holds every configured engine loop in memory.
///
/// Becomes active once all files have loaded. A failed load leaves the bank
/// empty and inactive.
#[derive(Clone, Debug, Default)]
pub struct SampleBank {
    samples: SampleSet,
    active: bool,
}

impl SampleBank {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AudioBackend for SampleBank {
    async fn init(&mut self, sounds: &SoundConfig) -> SimResult<()> {
        self.dispose();

        let mut loaded = Vec::with_capacity(sounds.samples.len());
        for def in &sounds.samples {
            let data = tokio::fs::read(&def.path)
                .await
                .map_err(|source| ComponentError::SampleIo {
                    path: def.path.clone(),
                    source,
                })?;
            tracing::trace!(name = %def.name, bytes = data.len(), "sample loaded");
            loaded.push(Sample {
                name: def.name.clone(),
                rpm: def.rpm,
                volume: def.volume,
                data: data.into(),
            });
        }

        self.samples = SampleSet::new(loaded);
        self.active = true;
        tracing::debug!(
            samples = self.samples.len(),
            bytes = self.samples.byte_len(),
            "sample bank loaded"
        );
        Ok(())
    }

    fn dispose(&mut self) {
        self.samples.clear();
        self.active = false;
    }

    fn samples(&self) -> &SampleSet {
        &self.samples
    }

    fn is_active(&self) -> bool {
        self.active
    }
}
