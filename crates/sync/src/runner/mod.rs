//! Poll-driven scheduler runner.
//!
//! Split into focused submodules:
//! - `core`: SyncScheduler struct, constructors, accessors, and the trait impl
//! - `execution`: the `poll` drain loop
//! - `scheduling`: task registration and bulk cancellation

mod core;
mod execution;
mod scheduling;

pub use self::core::SyncScheduler;
