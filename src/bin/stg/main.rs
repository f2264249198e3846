//! # Stg
//!
//! This binary runs STG source files to completion, or traces their
//! execution step by step.

extern crate stg_machine;

mod cli;

use cli::*;

use std::{error::Error, fs};

use log::{error, info};
use stg_machine::{compiler::compile, driver, parser::parse_program, pretty};

fn main() -> Result<(), Box<dyn Error>> {
    let args = Cli::init();

    simple_logger::init_with_level((&args.verbosity).into()).unwrap();

    match args.command {
        Commands::Run(run_args) => run(run_args),
        Commands::Trace(run_args) => trace(run_args),
    }
}

fn read_program(file: &std::path::Path) -> Result<stg_machine::ast::Program, Box<dyn Error>> {
    let file = fs::canonicalize(file)?;
    info!("loading '{}'", file.to_string_lossy());
    let source = fs::read_to_string(&file)?;
    Ok(parse_program(&source)?)
}

fn run(args: RunArgs) -> Result<(), Box<dyn Error>> {
    let program = read_program(&args.file)?;
    let state = compile(&program)?;

    match driver::run_to_final(state) {
        Ok(final_state) => {
            println!("{:?}", final_state.code);
            Ok(())
        }
        Err(err) => {
            error!("{err}");
            std::process::exit(1);
        }
    }
}

fn trace(args: RunArgs) -> Result<(), Box<dyn Error>> {
    let program = read_program(&args.file)?;
    let state = compile(&program)?.with_tracing();

    let (states, error) = driver::trace_run(state);
    print!("{}", pretty::format_trace(&states));

    if let Some(err) = error {
        error!("{err}");
        std::process::exit(1);
    }
    Ok(())
}
