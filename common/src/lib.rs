//! Pieces shared by the `bluegreen` binary and anything else that needs to read its
//! configuration files or handle the stack passphrase.

pub mod config;
pub mod constants;
pub mod secrets;

pub use secrets::Secret;
