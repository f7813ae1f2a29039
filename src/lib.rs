pub mod checks;
pub mod cli;
pub mod collect;
pub mod config;
pub mod env;
pub mod extract;
pub mod http;
pub mod orchestrator;
pub mod report;
pub mod transport;
pub mod util;
