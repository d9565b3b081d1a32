// mox CLI entry point
use std::path::Path;
use std::process;

use anyhow::Result;
use clap::Parser;

use mox_cli::{
    check_program, get_version, load_program, render_bindings, render_calls, render_report,
    render_stores, Cli, Commands,
};

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Check {
            input,
            emit_bindings,
            emit_calls,
            emit_stores,
        } => {
            let program = load_program(Path::new(&input))?;
            let analysis = check_program(&program);

            print!("{}", render_report(&analysis));
            if emit_bindings {
                print!("{}", render_bindings(&analysis));
            }
            if emit_calls {
                print!("{}", render_calls(&analysis));
            }
            if emit_stores {
                print!("{}", render_stores(&analysis));
            }

            if analysis.has_errors() {
                process::exit(1);
            }
        }
        Commands::Version => {
            println!("mox {}", get_version());
        }
    }

    Ok(())
}
