//! Command implementations

pub mod classify;
pub mod completions;
pub mod custom;
pub mod init;
pub mod part;
pub mod solid;
pub mod validate;
