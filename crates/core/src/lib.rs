#![forbid(unsafe_code)]

pub mod countdown;
pub mod error;
pub mod guard;
pub mod model;
pub mod session;
pub mod time;
pub mod variant;

pub use time::Clock;
