//! Turns an installed version profile into a runnable process invocation.
//!
//! The pipeline resolves the profile's inheritance chain, locates dependency
//! archives on disk, stages native binaries and substitutes both argument
//! template protocols, ending in a `(executable, argv)` value. Downloading,
//! authentication and process spawning stay outside this crate; the narrow
//! [`fetch::fetch_and_store`] collaborator is provided for install phases
//! that run beforehand.

pub mod error;
pub mod events;
pub mod fetch;
pub mod launch;

pub use error::LaunchError;
pub use events::{EventSink, LaunchEvent};
pub use launch::{
    prepare_command, prepare_command_with, DirProfileStore, LaunchCommand, LaunchSpec, Platform,
    PreparedLaunch, ProfileStore, VersionProfile,
};
