//! Command-line front end for edgestore

pub mod backend;
pub mod cli;
pub mod commands;
pub mod logging;
