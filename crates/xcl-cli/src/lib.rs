//! Library side of the xclusion CLI: logging setup and run orchestration.

pub mod logging;
pub mod pipeline;
