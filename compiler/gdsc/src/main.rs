//! GDScript Syntax Tree CLI
//!
//! Lossless parsing, rendering and incremental reparsing of `.gd` files.

use gdsc::commands::{check_file, parse_file, parse_options, render_file, reparse_files, CliOptions};

fn main() {
    gdsc::init_tracing();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        return;
    }

    let command = &args[1];

    match command.as_str() {
        "parse" => {
            let (options, paths) = options_or_exit(&args[2..]);
            let [path] = paths.as_slice() else {
                eprintln!("Usage: gdsc parse <file.gd> [options]");
                std::process::exit(1);
            };
            parse_file(path, &options);
        }
        "check" => {
            let (options, paths) = options_or_exit(&args[2..]);
            if paths.is_empty() {
                eprintln!("Usage: gdsc check <file.gd>... [options]");
                std::process::exit(1);
            }
            check_file(&paths, &options);
        }
        "render" => {
            let (options, paths) = options_or_exit(&args[2..]);
            let [path] = paths.as_slice() else {
                eprintln!("Usage: gdsc render <file.gd> [--canonical] [options]");
                std::process::exit(1);
            };
            render_file(path, &options);
        }
        "reparse" => {
            let (options, paths) = options_or_exit(&args[2..]);
            let [old, new] = paths.as_slice() else {
                eprintln!("Usage: gdsc reparse <old.gd> <new.gd> [options]");
                eprintln!();
                eprintln!("Parses <old.gd>, reparses it incrementally into <new.gd> and");
                eprintln!("checks the result against a full parse of <new.gd>.");
                std::process::exit(1);
            };
            reparse_files(old, new, &options);
        }
        "help" | "--help" | "-h" => {
            print_usage();
        }
        "version" | "--version" | "-v" => {
            println!("gdsc {}", env!("CARGO_PKG_VERSION"));
        }
        _ => {
            eprintln!("Unknown command: {command}");
            eprintln!();
            print_usage();
            std::process::exit(1);
        }
    }
}

fn options_or_exit(args: &[String]) -> (CliOptions, Vec<String>) {
    match parse_options(args) {
        Ok(parsed) => parsed,
        Err(msg) => {
            eprintln!("error: {msg}");
            std::process::exit(1);
        }
    }
}

fn print_usage() {
    println!("gdsc (lossless GDScript syntax trees)");
    println!();
    println!("Usage: gdsc <command> [options]");
    println!();
    println!("Commands:");
    println!("  parse <file.gd>          Parse and print the syntax tree");
    println!("  check <file.gd>...       List text the parser could not place");
    println!("  render <file.gd>         Print the file back from its tree");
    println!("  reparse <old> <new>      Reparse incrementally and report reuse");
    println!("  help                     Show this help message");
    println!("  version                  Show version information");
    println!();
    println!("Options:");
    println!("  --indent-size=<n>        Spaces per indentation level (default: 4)");
    println!("  --no-space-indent        Only tabs count as indentation");
    println!("  --max-depth=<n|none>     Nested reading states limit (default: 64)");
    println!("  --max-frames=<n|none>    Recursive frames limit (default: 512)");
    println!("  --buffer-size=<n>        Read chunk size in bytes (default: 4096)");
    println!("  --canonical              Render without carriage returns");
    println!();
    println!("Environment:");
    println!("  RUST_LOG=gds_parse=debug Show parser and reparse decisions");
    println!();
    println!("Examples:");
    println!("  gdsc parse player.gd");
    println!("  gdsc check scripts/*.gd");
    println!("  gdsc render player.gd --canonical");
    println!("  gdsc reparse before.gd after.gd");
}
