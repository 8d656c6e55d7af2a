pub mod animation;
pub mod input;
pub mod time;
pub mod timer;

pub use animation::{Animation, AnimationSet, ClipSpec};
pub use input::{InputState, Key};
pub use time::FrameClock;
pub use timer::Timer;
