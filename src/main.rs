use clap::Parser;
use mitx_processor::cli::{args::Args, commands};
use std::process;

fn main() {
    // Parse command line arguments
    let args = Args::parse();

    // Run the conversion; the report is printed by the command itself
    match commands::run(args) {
        Ok(_summary) => {
            process::exit(0);
        }
        Err(error) => {
            eprintln!("Error: {:#}", error);
            process::exit(1);
        }
    }
}
