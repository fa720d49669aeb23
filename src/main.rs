use bftape::commands::run::{self, RunArgs};
use clap::Parser;
use std::env;

#[derive(Parser, Debug)]
#[command(name = "bftape", disable_help_flag = true)]
struct Cli {
    #[command(flatten)]
    run: RunArgs,
}

fn main() {
    // We still pull the program name for help rendering consistency
    let program = env::args().next().unwrap_or_else(|| String::from("bftape"));

    bftape::logging::init();

    let cli = Cli::parse();
    let code = run::run(&program, cli.run);

    std::process::exit(code);
}
