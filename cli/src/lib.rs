pub mod pipeline;
pub mod vopt_commands;
