//! Caller-side policies layered on top of the courier.

pub mod retry;
pub mod surface;

pub use retry::*;
pub use surface::*;
