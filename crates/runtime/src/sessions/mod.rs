//! Live session storage with per-session mutual exclusion.

mod archive;
mod registry;

pub use registry::{Lookup, SessionRegistry, SessionSlot};
