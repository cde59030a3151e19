//! Configuration types
//!
//! Everything that distinguishes one emulated sensor from another is
//! fixed at construction: the device profile and the link timing.

pub mod link;
pub mod modes;
pub mod profile;

pub use link::{LinkConfig, ProfileParseError};
pub use modes::AdvertisedMode;
pub use profile::{DeviceProfile, IdentityBlock, Pacing, SensorIdentity};
