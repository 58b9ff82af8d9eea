#![deny(warnings)]

mod cli;

fn main() -> anyhow::Result<()> {
    cli::run_cli()
}
