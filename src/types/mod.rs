//! Records read from the upstream on every refresh cycle.
mod asset;
pub use asset::*;

mod health;
pub use health::*;

mod pool;
pub use pool::*;

mod score;
pub use score::*;
