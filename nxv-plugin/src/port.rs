//! Best-effort unique port per environment.
//!
//! No reservation and no bind check: collisions are possible and surface as a
//! registry startup failure. The range is wide enough that parallel CI shards
//! rarely meet.

use std::ops::Range;

use rand::Rng;

pub const PORT_RANGE: Range<u16> = 20_000..60_000;

/// Draw a port from [`PORT_RANGE`] using the thread-local RNG.
pub fn unique_port() -> u16 {
    unique_port_with(&mut rand::thread_rng())
}

pub fn unique_port_with<R: Rng + ?Sized>(rng: &mut R) -> u16 {
    rng.gen_range(PORT_RANGE)
}
