use clap::Parser;
use groq_health::{cli, orchestrator::RunStatus};

fn main() {
    let args = cli::Args::parse();
    let status = match cli::dispatch(args) {
        Ok(status) => status,
        Err(err) => {
            eprintln!("ERROR: {err:#}");
            RunStatus::Misconfigured
        }
    };
    std::process::exit(status.code());
}
