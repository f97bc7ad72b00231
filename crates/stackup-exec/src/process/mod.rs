//! Process Supervisor.
//!
//! Starts external processes detached into their own process group, captures
//! their output in memory, and stops the whole group on request.
mod group;
mod output;
mod run;
mod spec;
mod supervisor;

pub use output::OutputBuffer;
pub use run::{ProcessOutput, run};
pub use spec::ProcessSpec;
pub use supervisor::{SupervisedProcess, start};
