use std::process::ExitCode;

use twscan_core::Catalog;

use crate::cli::UniverseArgs;
use crate::error::CliError;

pub fn run(args: &UniverseArgs, catalog: &Catalog) -> Result<ExitCode, CliError> {
    let universe = catalog.universe();

    for code in &universe {
        if args.names {
            println!("{code}\t{}", catalog.display_name(code));
        } else {
            println!("{code}");
        }
    }
    eprintln!("{} instruments", universe.len());

    Ok(ExitCode::SUCCESS)
}
