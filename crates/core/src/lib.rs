#![forbid(unsafe_code)]

pub mod achievements;
pub mod distractor;
pub mod model;
pub mod random;
pub mod round;
pub mod scoring;
pub mod source;
pub mod time;

pub use time::Clock;
