use clap::Parser;

use avrctl::cli::Cli;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    avrctl::runtime::run(Cli::parse())
}
