//! Embassy async tasks
//!
//! Each task runs independently and communicates via channels/signals.

pub mod link;

pub use link::{link_task, Link};
