//! Fixed-step host loop and frame recording.

use crate::audio::AudioBackend;
use crate::dashboard::FrameOutput;
use crate::error::{SimError, SimResult};
use crate::model::{DrivetrainModel, EngineModel};
use crate::vehicle::Vehicle;
use pt_core::timing::{AccumulatingTimer, Timer};

/// Options for a headless session.
#[derive(Clone, Debug)]
pub struct SessionOptions {
    /// Frame duration (seconds)
    pub dt: f64,
    /// Session length (seconds)
    pub t_end: f64,
    /// Maximum number of frames (safety limit)
    pub max_frames: usize,
    /// Record every N-th frame (decimation)
    pub record_every: usize,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            dt: 1.0 / 60.0,
            t_end: 10.0,
            max_frames: 100_000,
            record_every: 1,
        }
    }
}

/// Recorded frames, stamped with the time at the end of each frame.
#[derive(Clone, Debug, Default)]
pub struct SessionRecord {
    pub t: Vec<f64>,
    pub frames: Vec<FrameOutput>,
}

impl SessionRecord {
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn last(&self) -> Option<&FrameOutput> {
        self.frames.last()
    }

    pub fn peak_rpm(&self) -> f64 {
        self.frames.iter().map(|f| f.rpm).fold(0.0, f64::max)
    }

    pub fn peak_speed_mph(&self) -> f64 {
        self.frames.iter().map(|f| f.speed_mph).fold(0.0, f64::max)
    }
}

/// Drive `vehicle` from t = 0 for `ceil(t_end / dt)` frames.
///
/// `driver` runs before every frame with the frame's start time so it can set
/// throttle, clutch or gear. Frame `k` starts at `k * dt`, which avoids
/// accumulating round-off in the clock.
pub fn run_session<E, D, A, F>(
    vehicle: &mut Vehicle<E, D, A>,
    opts: &SessionOptions,
    mut driver: F,
) -> SimResult<SessionRecord>
where
    E: EngineModel,
    D: DrivetrainModel,
    A: AudioBackend,
    F: FnMut(&mut Vehicle<E, D, A>, f64),
{
    if opts.dt <= 0.0 || !opts.dt.is_finite() {
        return Err(SimError::InvalidArg {
            what: "dt must be positive",
        });
    }
    if opts.t_end < 0.0 || !opts.t_end.is_finite() {
        return Err(SimError::InvalidArg {
            what: "t_end must be non-negative",
        });
    }
    if opts.max_frames == 0 {
        return Err(SimError::InvalidArg {
            what: "max_frames must be positive",
        });
    }
    if opts.record_every == 0 {
        return Err(SimError::InvalidArg {
            what: "record_every must be positive",
        });
    }

    let planned = (opts.t_end / opts.dt - 1e-9).ceil().max(0.0) as usize;
    let frames = planned.min(opts.max_frames);
    if planned > opts.max_frames {
        tracing::warn!(
            planned,
            max_frames = opts.max_frames,
            "session truncated by frame limit"
        );
    }

    let mut record = SessionRecord::default();
    let mut last = None;
    let frame_timer = AccumulatingTimer::new();

    for frame in 0..frames {
        let t = frame as f64 * opts.dt;
        driver(vehicle, t);

        let timer = Timer::start("frame");
        let out = vehicle.update(t, opts.dt);
        if let Some(elapsed_s) = timer.stop() {
            frame_timer.record(elapsed_s);
        }

        if (frame + 1) % opts.record_every == 0 {
            record.t.push(t + opts.dt);
            record.frames.push(out);
            last = None;
        } else {
            last = Some((t + opts.dt, out));
        }
    }

    // Always record the final frame
    if let Some((t, out)) = last {
        record.t.push(t);
        record.frames.push(out);
    }

    tracing::debug!(
        frames,
        recorded = record.len(),
        peak_rpm = record.peak_rpm(),
        "session finished"
    );
    frame_timer.log_summary("frame");
    Ok(record)
}
