/// Linear parameter ramp feeding the oscillator's per-sample inputs
///
/// While the value holds still the ramp hands out a single value for the
/// whole block. When the target moves it glides linearly over a fixed number
/// of samples and hands out one value per sample until it lands.
pub struct ParamRamp {
    current: f32,
    target: f32,
    /// Fixed step size per sample for linear glide
    step: f32,
    samples_left: usize,
    ramp_samples: usize,
    /// Values repeat with this period; glides take the short way round
    period: Option<f32>,
    /// Pre-allocated per-sample values, one slot per frame of the largest block
    buffer: Vec<f32>,
}

impl ParamRamp {
    pub fn new(initial: f32, ramp_samples: usize, max_block: usize) -> Self {
        Self {
            current: initial,
            target: initial,
            step: 0.0,
            samples_left: 0,
            ramp_samples,
            period: None,
            buffer: vec![initial; max_block.max(1)],
        }
    }

    /// Ramp for a periodic value such as a phase angle
    /// Values stay in [0, period) and glides follow the shorter arc.
    pub fn circular(initial: f32, ramp_samples: usize, max_block: usize, period: f32) -> Self {
        Self {
            period: Some(period),
            ..Self::new(initial, ramp_samples, max_block)
        }
    }

    /// Value at the start of the next block
    pub fn current(&self) -> f32 {
        self.current
    }

    pub fn is_ramping(&self) -> bool {
        self.samples_left > 0
    }

    /// Start gliding towards a new target
    pub fn set_target(&mut self, value: f32) {
        if value == self.target {
            return;
        }
        self.target = value;

        if self.ramp_samples == 0 {
            self.current = value;
            self.step = 0.0;
            self.samples_left = 0;
        } else {
            let mut distance = value - self.current;
            if let Some(period) = self.period {
                let half = period / 2.0;
                distance = (distance + half).rem_euclid(period) - half;
            }
            self.step = distance / self.ramp_samples as f32;
            self.samples_left = self.ramp_samples;
        }
    }

    /// Values for the next `frames` samples
    /// Returns a single value when nothing changes during the block,
    /// otherwise exactly `frames` values. `frames` is capped at the
    /// pre-allocated size.
    pub fn next_block(&mut self, frames: usize) -> &[f32] {
        let frames = frames.min(self.buffer.len());

        if self.samples_left == 0 || frames == 0 {
            self.buffer[0] = self.current;
            return &self.buffer[..1];
        }

        for slot in self.buffer[..frames].iter_mut() {
            *slot = self.current;
            if self.samples_left > 0 {
                self.samples_left -= 1;
                self.current += self.step;
                if let Some(period) = self.period {
                    self.current = self.current.rem_euclid(period);
                    if self.current >= period {
                        self.current = 0.0;
                    }
                }
                // Snap to target when done
                if self.samples_left == 0 {
                    self.current = self.target;
                }
            }
        }

        &self.buffer[..frames]
    }
}
