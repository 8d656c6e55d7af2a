pub mod bullets;
pub mod camera;
pub mod catalog;
pub mod collision;
pub mod config;
pub mod entity;
pub mod geometry;
pub mod level;
pub mod render;
pub mod replay;
pub mod update;
pub mod world;

pub use config::{load_config_from_path, SimConfig, SimContext};
pub use level::{load_level_from_path, LevelFile};
pub use render::FrameView;
pub use replay::{load_replay_from_path, ReplaySequence};
pub use world::{SimStatus, Simulation};
