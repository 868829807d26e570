//! Entrypoint for the CLI.
use std::{env, error::Error, fs, process};

use minic::compile;

static USAGE: &str = "usage: minicc <source_file>";

fn main() {
    simple_logger::SimpleLogger::new().env().init().unwrap();

    if let Err(error) = run() {
        eprintln!("{error}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    let mut args = env::args().skip(1);
    let (Some(path), None) = (args.next(), args.next()) else {
        return Err(USAGE.into());
    };

    let source = fs::read_to_string(&path)?;
    let code = compile(&source)?;
    print!("{code}");

    Ok(())
}
