use std::env;
use std::fs::File;
use std::io::{self, Write};
use std::path::Path;
use std::process;

use masm::{assemble, Error};

fn print_usage() {
    println!("Usage:");
    println!("  Runs both passes: masm <input file> <intermediate file> <output file>");
    println!("  Run pass #1:      masm -p1 <input file> <intermediate file>");
    println!("  Run pass #2:      masm -p2 <intermediate file> <output file>");
    println!("Append -log <file name> after any option to save log output to a text file.");
}

fn run() -> i32 {
    let args: Vec<String> = env::args().collect();
    if args.len() != 4 && args.len() != 6 {
        print_usage();
        return 0;
    }

    let (input, intermediate, output) = match args[1].as_str() {
        "-p1" => (Some(args[2].as_str()), args[3].as_str(), None),
        "-p2" => (None, args[2].as_str(), Some(args[3].as_str())),
        _ => (
            Some(args[1].as_str()),
            args[2].as_str(),
            Some(args[3].as_str()),
        ),
    };

    let mut log: Box<dyn Write> = if args.len() == 6 {
        if args[4] != "-log" {
            print_usage();
            return 0;
        }
        match File::create(&args[5]) {
            Ok(file) => Box::new(file),
            Err(_) => {
                eprintln!("Error: unable to open output file: {}", args[5]);
                return 1;
            }
        }
    } else {
        Box::new(io::stderr())
    };

    let result = assemble(
        input.map(Path::new),
        Path::new(intermediate),
        output.map(Path::new),
        &mut log,
    );

    let code = match result {
        Ok(()) => {
            let _ = writeln!(log, "Assembly operation completed successfully!");
            0
        }
        Err(Error::Assembly(_)) => {
            let _ = writeln!(
                log,
                "One or more errors encountered during assembly operation."
            );
            1
        }
        Err(err) => {
            let _ = writeln!(log, "{}", err);
            1
        }
    };

    if args.len() == 6 {
        println!("Results saved to {}", args[5]);
    }

    code
}

fn main() {
    process::exit(run());
}
