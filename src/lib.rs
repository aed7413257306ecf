pub mod args;
pub mod commands;
pub mod policy;
pub mod result;
pub mod session;
pub mod tpm;
