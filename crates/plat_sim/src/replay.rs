use plat_core::input::{InputState, Key};
use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::world::{SimStatus, Simulation};

/// Scripted input: each frame lists the keys held for `repeat` fixed steps.
#[derive(Debug, Deserialize, Clone)]
pub struct ReplaySequence {
    #[serde(default = "default_dt")]
    pub fixed_dt: f32,
    pub frames: Vec<ReplayFrame>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ReplayFrame {
    #[serde(default)]
    pub keys: Vec<Key>,
    #[serde(default = "default_repeat")]
    pub repeat: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplayResult {
    pub steps: u64,
    pub status: SimStatus,
}

impl ReplaySequence {
    pub fn expanded_frames(&self) -> Vec<&[Key]> {
        let mut out = Vec::new();
        for frame in &self.frames {
            for _ in 0..frame.repeat.max(1) {
                out.push(frame.keys.as_slice());
            }
        }
        out
    }

    /// Drive `sim` step by step until the script ends or the simulation stops.
    pub fn run(&self, sim: &mut Simulation) -> ReplayResult {
        let mut input = InputState::new();
        let mut steps = 0;
        for keys in self.expanded_frames() {
            input.set_held(keys);
            let status = sim.step(&input, self.fixed_dt);
            input.end_frame();
            steps += 1;
            if status != SimStatus::Continue {
                return ReplayResult { steps, status };
            }
        }
        ReplayResult {
            steps,
            status: SimStatus::Continue,
        }
    }
}

pub fn load_replay_from_path(path: &Path) -> Result<ReplaySequence, String> {
    let raw =
        fs::read_to_string(path).map_err(|e| format!("Failed to read {}: {e}", path.display()))?;
    let replay: ReplaySequence = serde_json::from_str(&raw)
        .map_err(|e| format!("Failed to parse replay JSON {}: {e}", path.display()))?;
    validate_replay(&replay)?;
    Ok(replay)
}

fn validate_replay(replay: &ReplaySequence) -> Result<(), String> {
    if replay.fixed_dt <= 0.0 {
        return Err("Replay validation failed: fixed_dt must be > 0".to_string());
    }
    if replay.frames.is_empty() {
        return Err("Replay validation failed: frames list is empty".to_string());
    }
    Ok(())
}

const fn default_dt() -> f32 {
    1.0 / 60.0
}

const fn default_repeat() -> u32 {
    1
}
