use std::collections::VecDeque;

/// Number of samples the average frame rate is calculated from.
pub const AVG_FRAME_RATE_SAMPLES: usize = 16;

/// Frame clock owned by the sketch context. Perceived time can be sped
/// up, slowed down or paused through the time scale without touching the
/// underlying render loop.
#[derive(Debug)]
pub struct Clock {
    delta_ms: f64,
    time_scale: f64,
    millis: f64,
    real_millis: f64,
    frame_count: u64,
    target_frame_rate: Option<f64>,
    frame_rates: VecDeque<f64>,
}

impl Default for Clock {
    fn default() -> Self {
        Self {
            delta_ms: 0.0,
            time_scale: 1.0,
            millis: 0.0,
            real_millis: 0.0,
            frame_count: 0,
            target_frame_rate: None,
            frame_rates: VecDeque::with_capacity(AVG_FRAME_RATE_SAMPLES),
        }
    }
}

impl Clock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advances the clock by the raw delta reported by the render loop.
    /// Called exactly once per draw tick.
    pub fn update(&mut self, raw_delta_ms: f64) {
        self.delta_ms = raw_delta_ms;
        self.real_millis += raw_delta_ms;
        self.millis += self.delta_time();
        self.frame_count += 1;

        if raw_delta_ms > 0.0 {
            self.frame_rates.push_back(1000.0 / raw_delta_ms);
            if self.frame_rates.len() > AVG_FRAME_RATE_SAMPLES {
                self.frame_rates.pop_front();
            }
        }
    }

    /// Milliseconds between the previous two frames, modified by the
    /// time scale.
    pub fn delta_time(&self) -> f64 {
        self.delta_ms * self.time_scale
    }

    /// Actual milliseconds between the previous two frames.
    pub fn real_delta_time(&self) -> f64 {
        self.delta_ms
    }

    pub fn delta_time_secs(&self) -> f64 {
        self.delta_time() * 0.001
    }

    pub fn real_delta_time_secs(&self) -> f64 {
        self.real_delta_time() * 0.001
    }

    /// Milliseconds since the start of the sketch, modified by the time
    /// scale.
    pub fn millis(&self) -> f64 {
        self.millis
    }

    /// Actual milliseconds since the start of the sketch.
    pub fn real_millis(&self) -> f64 {
        self.real_millis
    }

    /// Frames since the start of the sketch.
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Instantaneous frame rate of the previous frame.
    pub fn frame_rate(&self) -> f64 {
        if self.delta_ms > 0.0 {
            1000.0 / self.delta_ms
        } else {
            0.0
        }
    }

    /// Average frame rate over the retained samples, or 0 while no frame
    /// has been measured.
    pub fn avg_frame_rate(&self) -> f64 {
        if self.frame_rates.is_empty() {
            return 0.0;
        }
        self.frame_rates.iter().sum::<f64>() / self.frame_rates.len() as f64
    }

    pub fn time_scale(&self) -> f64 {
        self.time_scale
    }

    /// Scales `delta_time` and the accumulation of `millis`. A scale of 0
    /// pauses perceived time.
    pub fn set_time_scale(&mut self, value: f64) {
        self.time_scale = value;
    }

    pub fn target_frame_rate(&self) -> Option<f64> {
        self.target_frame_rate
    }

    /// Frame-rate hint consumed by the application loop.
    pub fn set_target_frame_rate(&mut self, fps: f64) {
        self.target_frame_rate = Some(fps);
    }

    /// Re-baselines scaled time onto real time. Called once when the
    /// rendering surfaces come up so preload time is not counted.
    pub fn synchronize_millis(&mut self) {
        self.millis = self.real_millis;
    }
}
