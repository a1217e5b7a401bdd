use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Number of frame marks kept for the smoothed fps readout.
const FPS_WINDOW: usize = 60;

/// Frame clock: provides the previous frametime for egui's animation step,
/// a smoothed fps readout, and optional tail-of-frame sleeping to hold a
/// fixed framerate.
pub struct Framepacer {
    frame_start: Instant,
    frametime: f32,
    marks: VecDeque<Instant>,
}

impl Framepacer {
    pub fn new() -> Self {
        Self {
            frame_start: Instant::now(),
            frametime: 1.0 / 60.0,
            marks: VecDeque::with_capacity(FPS_WINDOW),
        }
    }

    /// Seconds the previous frame took.
    pub fn frametime(&self) -> f32 {
        self.frametime
    }

    /// Framerate averaged over the recent frame window.
    pub fn fps(&self) -> f32 {
        let (Some(first), Some(last)) = (self.marks.front(), self.marks.back()) else {
            return 0.0;
        };

        let elapsed = last.duration_since(*first).as_secs_f32();
        if elapsed <= f32::EPSILON {
            return 0.0;
        }

        (self.marks.len() - 1) as f32 / elapsed
    }

    pub fn begin_frame(&mut self) {
        self.frame_start = Instant::now();
        if self.marks.len() == FPS_WINDOW {
            self.marks.pop_front();
        }
        self.marks.push_back(self.frame_start);
    }

    /// Close the frame, sleeping away the remainder when a target framerate
    /// is set. Sleeps slightly short of the target and spins the rest, since
    /// `thread::sleep` only promises a minimum.
    pub fn end_frame(&mut self, target_framerate: Option<u32>) {
        if let Some(rate) = target_framerate.filter(|rate| *rate > 0) {
            const ACCURACY: f32 = 0.0001; // 100 microseconds
            let limit = 1.0 / rate as f32;
            let sleep_time = limit - self.frame_start.elapsed().as_secs_f32() - ACCURACY;

            if sleep_time > 0.0 {
                std::thread::sleep(Duration::from_secs_f32(sleep_time));
            }
            while self.frame_start.elapsed().as_secs_f32() < limit {
                std::thread::yield_now();
            }
        }

        self.frametime = self.frame_start.elapsed().as_secs_f32();
    }
}
