//! External converter integration.
//!
//! All pixel work is delegated to an external program (ImageMagick's
//! `convert` by default). This module only knows how to describe a
//! conversion and run a command line.
//!
//! The module is split into:
//! - **Parameters**: [`Quality`] and [`ConvertParams`], what to produce
//! - **Backend**: [`CommandRunner`] trait + the shared process types
//! - **System**: [`SystemRunner`], the `std::process` implementation
//! - **Operations**: template expansion and outcome classification

pub mod backend;
pub mod operations;
mod params;
pub mod system;

pub use backend::{CommandOutput, CommandRunner, Invocation, RunError};
pub use operations::{convert, plan_conversion};
pub use params::{ConvertParams, Quality};
pub use system::SystemRunner;
