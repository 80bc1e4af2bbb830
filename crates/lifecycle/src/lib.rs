//! `minigen-lifecycle` -- the job lifecycle state machine.
//!
//! [`JobLifecycleController`] owns one job session at a time: it
//! submits a job built from a preset, polls its status on an interval,
//! fetches the result once the status is terminal, and publishes a
//! [`LifecycleState`] snapshot through a `watch` channel for whatever
//! front end is rendering it.  All timers and fetches are torn down
//! through a single [`CancellationToken`], so teardown is one call
//! rather than handle bookkeeping.

pub mod config;
pub mod controller;
pub mod state;

mod poll;

pub use config::PollConfig;
pub use controller::JobLifecycleController;
pub use state::LifecycleState;
