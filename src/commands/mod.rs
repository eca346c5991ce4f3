// ABOUTME: Command module aggregator for the gantry CLI.
// ABOUTME: Re-exports the init, release, and preflight command handlers.

mod init;
mod locate;
mod preflight;
mod release;
mod runtime_connection;

pub use init::init;
pub use preflight::preflight;
pub use release::release;
