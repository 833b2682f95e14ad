//! bindpack CLI library.
//!
//! The binary is a thin wrapper: argument parsing lives in [`cli`], tracing
//! setup in [`tracing`], and the build step in [`build`].

pub mod build;
pub mod cli;
pub mod tracing;
