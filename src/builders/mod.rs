//! Concrete per-ecosystem builders.
//!
//! Each module implements [`crate::builder::Builder`] for one build tool
//! ecosystem, overriding exactly the phases that ecosystem has a default
//! action for. The actual tool invocations are opaque external processes
//! assembled and run through [`crate::exec`]; get-source and patch
//! delegate to the shared default actions in [`crate::source`] and
//! [`crate::patch`].

pub mod bazel;
pub mod cmake;
pub mod maven;
pub mod pip;

pub use bazel::BazelBuilder;
pub use cmake::CmakeBuilder;
pub use maven::MavenBuilder;
pub use pip::PipBuilder;
