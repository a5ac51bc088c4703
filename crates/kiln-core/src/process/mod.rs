//! External command execution and liveness probing.

pub mod probe;
pub mod runner;

pub use probe::{DelayProbe, LivenessProbe, ProbeReport};
pub use runner::{
    CommandOutput, CommandRunner, CommandSpec, SystemRunner, npm_program, python_program,
    require_success,
};
