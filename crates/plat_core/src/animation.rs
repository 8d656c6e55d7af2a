//! Strip-based sprite animation.
//!
//! An `Animation` cycles through `frame_count` equally sized frames of a
//! sprite strip over `duration` seconds and loops forever. It reports
//! `is_done` once a full cycle has played, which callers use to detect the
//! end of one-shot effects such as impacts and deaths.
//!
//! An `AnimationSet` groups the clips an entity can play, keyed by a small
//! caller-defined enum, and tracks which one is active. With no active clip
//! the entity is drawn with a fixed static frame instead.

use serde::Deserialize;

use crate::timer::Timer;

/// Clip timing as authored in configuration files.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
pub struct ClipSpec {
    pub frames: u32,
    pub duration_ms: u32,
}

impl ClipSpec {
    pub const fn new(frames: u32, duration_ms: u32) -> Self {
        Self {
            frames,
            duration_ms,
        }
    }

    pub fn validate(&self, name: &str) -> Result<(), String> {
        if self.frames == 0 {
            return Err(format!(
                "Animation validation failed: clip '{name}' has no frames"
            ));
        }
        if self.duration_ms == 0 {
            return Err(format!(
                "Animation validation failed: clip '{name}' has zero duration"
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Animation {
    frame_count: u32,
    timer: Timer,
}

impl Animation {
    pub fn new(frame_count: u32, duration: f32) -> Self {
        Self {
            frame_count: frame_count.max(1),
            timer: Timer::new(duration),
        }
    }

    pub fn from_spec(spec: ClipSpec) -> Self {
        Self::new(spec.frames, spec.duration_ms as f32 / 1000.0)
    }

    pub fn step(&mut self, dt: f32) {
        self.timer.step(dt);
    }

    pub fn current_frame(&self) -> u32 {
        let frame_time = self.timer.duration() / self.frame_count as f32;
        if frame_time <= 0.0 {
            return 0;
        }
        let frame = (self.timer.elapsed() / frame_time).floor() as u32;
        frame.min(self.frame_count - 1)
    }

    pub fn frame_count(&self) -> u32 {
        self.frame_count
    }

    pub fn is_done(&self) -> bool {
        self.timer.is_timed_out()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnimationSet<K> {
    clips: Vec<(K, Animation)>,
    active: Option<K>,
    static_frame: u32,
}

impl<K: Copy + PartialEq> AnimationSet<K> {
    pub fn new() -> Self {
        Self {
            clips: Vec::new(),
            active: None,
            static_frame: 0,
        }
    }

    pub fn with_clip(mut self, key: K, animation: Animation) -> Self {
        self.insert(key, animation);
        self
    }

    pub fn insert(&mut self, key: K, animation: Animation) {
        if let Some(slot) = self.clips.iter_mut().find(|(k, _)| *k == key) {
            slot.1 = animation;
        } else {
            self.clips.push((key, animation));
        }
    }

    /// Make `key` the active clip. Switching does not rewind the clip.
    /// Returns false (and leaves the set unchanged) if the clip is unknown.
    pub fn play(&mut self, key: K) -> bool {
        if self.get(key).is_none() {
            return false;
        }
        self.active = Some(key);
        true
    }

    /// Stop animating and draw `frame` of the current texture from now on.
    pub fn freeze(&mut self, frame: u32) {
        self.active = None;
        self.static_frame = frame;
    }

    pub fn active(&self) -> Option<K> {
        self.active
    }

    pub fn get(&self, key: K) -> Option<&Animation> {
        self.clips.iter().find(|(k, _)| *k == key).map(|(_, a)| a)
    }

    pub fn active_animation(&self) -> Option<&Animation> {
        self.active.and_then(|key| self.get(key))
    }

    pub fn step(&mut self, dt: f32) {
        let Some(key) = self.active else {
            return;
        };
        if let Some((_, animation)) = self.clips.iter_mut().find(|(k, _)| *k == key) {
            animation.step(dt);
        }
    }

    /// Frame to draw: the active clip's frame, or the static frame.
    pub fn current_frame(&self) -> u32 {
        self.active_animation()
            .map(Animation::current_frame)
            .unwrap_or(self.static_frame)
    }

    pub fn is_active_done(&self) -> bool {
        self.active_animation().is_some_and(Animation::is_done)
    }
}

impl<K: Copy + PartialEq> Default for AnimationSet<K> {
    fn default() -> Self {
        Self::new()
    }
}
