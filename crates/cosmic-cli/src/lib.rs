//! Library side of the `cosmic` command line tool.

pub mod config;
pub mod logging;
pub mod pipeline;
