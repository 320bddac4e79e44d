//! Test utilities for xcgen unit tests.
//!
//! Provides builders for BuildTargets and Projects so tests can describe a
//! build graph in a few lines.
//!
//! # Example
//!
//! ```rust,ignore
//! use xcgen::test_support::{ProjectBuilder, TargetBuilder};
//!
//! let project = ProjectBuilder::new("App")
//!     .target(TargetBuilder::new("core", "Core").build())
//!     .target(TargetBuilder::new("app", "App").app().depends_on("core").build())
//!     .build();
//! ```

pub mod fixtures;

pub use fixtures::{ProjectBuilder, TargetBuilder};
