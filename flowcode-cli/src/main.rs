//! FlowCode CLI — load, check, and execute FlowCode programs.
//!
//! Exit codes:
//! - 0: success (or the program's own `EXIT` code, 0-49)
//! - 10: argument/usage misuse
//! - 11: unreadable source or input file
//! - 31/32: malformed source text
//! - 52: semantic error (labels, variables)
//! - 53-58: runtime errors
//! - 99: internal error

mod commands;

use std::process;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() {
    // Diagnostics go to stderr so WRITE output stays byte-exact; silent
    // unless RUST_LOG is set.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("off")),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        process::exit(10);
    }

    let status = match args[1].as_str() {
        "run" => commands::run(&args[2..]),
        "check" => commands::check(&args[2..]),
        "dump" => commands::dump(&args[2..]),
        "--help" | "-h" | "help" => {
            print_usage();
            0
        }
        other => {
            eprintln!("error: unknown command '{other}'");
            eprintln!();
            print_usage();
            10
        }
    };

    process::exit(status);
}

fn print_usage() {
    eprintln!("Usage: flowcode <command> [args]");
    eprintln!();
    eprintln!("Commands:");
    eprintln!("  run [--source FILE] [--input FILE]   Execute a program");
    eprintln!("                                       (omitted file is read from stdin;");
    eprintln!("                                        at least one must be named)");
    eprintln!("  check <file>                         Load and validate a program");
    eprintln!("  dump <file>                          Print the canonical listing");
}
