//! Binary-side orchestration: input, progress UI, run and exit code.

pub(crate) mod exit_handler;
pub(crate) mod input_processor;
pub(crate) mod progress_manager;
pub(crate) mod runtime;
