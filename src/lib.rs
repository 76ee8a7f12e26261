//! cicache - git-backed CI run cache and coverage gate
//!
//! Records successful test and deploy runs in a git repository so later
//! builds of the same commits can skip them, and holds builds to the
//! coverage baseline recorded for the trunk branch.

pub mod action;
pub mod cache;
pub mod ci;
pub mod cli;
pub mod config;
pub mod coverage;
pub mod error;
pub mod git;
pub mod guard;
pub mod journal;
pub mod ui;

pub use error::{CicacheError, CicacheResult};
