mod error;
pub use error::ExecError;

mod utils;

pub mod process;
pub use process::{
    OutputBuffer, ProcessOutput, ProcessSpec, SupervisedProcess, run, start,
};
