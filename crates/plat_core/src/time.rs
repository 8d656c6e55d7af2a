use std::time::Instant;

const FPS_SAMPLE_COUNT: usize = 60;

/// Fixed-timestep frame clock for the host loop.
///
/// Wall-clock time feeds an accumulator; the host drains it in `fixed_dt`
/// slices with `should_step`, so the simulation always sees the same dt
/// regardless of display rate.
pub struct FrameClock {
    pub fixed_dt: f32,
    pub max_frame_time: f32,
    accumulator: f32,
    pub total_time: f64,
    pub step_count: u64,
    pub frame_count: u64,
    pub steps_this_frame: u32,
    pub real_dt: f32,
    last_instant: Instant,

    frame_samples: [f32; FPS_SAMPLE_COUNT],
    sample_index: usize,
    pub smoothed_fps: f32,
}

impl FrameClock {
    pub fn new(fixed_dt: f32) -> Self {
        Self {
            fixed_dt,
            max_frame_time: 0.25,
            accumulator: 0.0,
            total_time: 0.0,
            step_count: 0,
            frame_count: 0,
            steps_this_frame: 0,
            real_dt: 0.0,
            last_instant: Instant::now(),
            frame_samples: [fixed_dt; FPS_SAMPLE_COUNT],
            sample_index: 0,
            smoothed_fps: 1.0 / fixed_dt,
        }
    }

    /// Measure wall-clock time since the previous frame and feed it in.
    pub fn begin_frame(&mut self) {
        let now = Instant::now();
        let real_dt = now.duration_since(self.last_instant).as_secs_f32();
        self.last_instant = now;
        self.feed(real_dt);
    }

    /// Feed an explicit frame duration. Durations above `max_frame_time` are
    /// capped so a stall cannot queue an unbounded number of steps.
    pub fn feed(&mut self, real_dt: f32) {
        self.real_dt = real_dt;
        if self.real_dt > self.max_frame_time {
            log::warn!(
                "Frame took {:.1}ms, capping to {:.0}ms",
                self.real_dt * 1000.0,
                self.max_frame_time * 1000.0
            );
            self.real_dt = self.max_frame_time;
        }

        self.accumulator += self.real_dt;
        self.steps_this_frame = 0;
        self.frame_count += 1;

        self.frame_samples[self.sample_index] = self.real_dt;
        self.sample_index = (self.sample_index + 1) % FPS_SAMPLE_COUNT;
        let avg_dt = self.frame_samples.iter().sum::<f32>() / FPS_SAMPLE_COUNT as f32;
        self.smoothed_fps = if avg_dt > 0.0 { 1.0 / avg_dt } else { 0.0 };
    }

    pub fn should_step(&mut self) -> bool {
        if self.accumulator >= self.fixed_dt {
            self.accumulator -= self.fixed_dt;
            self.total_time += f64::from(self.fixed_dt);
            self.step_count += 1;
            self.steps_this_frame += 1;
            true
        } else {
            false
        }
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new(1.0 / 60.0)
    }
}
