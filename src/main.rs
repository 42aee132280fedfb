use clap::Parser;
use vidrate::cli::{Cli, run};

fn main() {
    let cli = Cli::parse();
    vidrate::logging::init(cli.log_level.as_deref());

    if let Err(e) = run(cli) {
        eprintln!("vidrate: error: {e:#}");
        std::process::exit(1);
    }
}
