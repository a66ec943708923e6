//! lapse Core - Fundamental types and primitives
//!
//! This crate defines the types shared by every lapse crate:
//! - Tick arithmetic over wrapping unsigned counters (`Tick`)
//! - The injected "read current tick" capability (`TimeSource`)
//! - Timer lifecycle states and error classification

pub mod tick;
pub mod source;
pub mod state;
pub mod error;

pub use tick::*;
pub use source::*;
pub use state::*;
pub use error::*;
