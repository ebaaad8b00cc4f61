//! dbm command line
//!
//! ```text
//! dbm <file>            interactive shell
//! dbm <file> "SQL"      run one statement
//! ```

use std::{
    io::{self, BufRead, Write},
    path::PathBuf,
    process::ExitCode,
};

use clap::Parser;
use dbm::{Database, StatementResult, execute};
use tracing::error;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "dbm", version, about = "Embedded single-file relational store")]
struct Args {
    /// Database file, `.dbm` is appended when missing
    file: PathBuf,

    /// Statement to run instead of starting the shell
    sql: Vec<String>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose);

    let mut path = args.file;
    if !path.to_string_lossy().contains(".dbm") {
        path.as_mut_os_string().push(".dbm");
    }

    let mut db = match Database::open(&path) {
        Ok(db) => db,
        Err(err) => {
            eprintln!("Fatal: cannot open '{}': {}", path.display(), err);
            return ExitCode::FAILURE;
        }
    };
    println!(
        "dbm v{}  db={}  tables={}",
        env!("CARGO_PKG_VERSION"),
        db.catalog().name,
        db.catalog().tables.len()
    );

    if args.sql.is_empty() {
        if let Err(err) = repl(&mut db) {
            error!(%err, "reading input failed");
        }
    } else {
        print_result(&execute(&mut db, &args.sql.join(" ")));
    }

    let code = match db.save() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("ERROR: {}", err);
            ExitCode::FAILURE
        }
    };
    println!("Goodbye.");
    code
}

fn init_logging(verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(if verbose { "dbm=debug" } else { "dbm=warn" })
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .without_time()
        .init();
}

/// Reads statements until `quit`, `exit` or end of input. A statement runs
/// once a line contains `;`, or right away for SHOW, VACUUM and DESC.
fn repl(db: &mut Database) -> io::Result<()> {
    println!("Type SQL (end with ;) or 'quit'.\n");
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    let mut buf = String::new();

    loop {
        print!("{}", if buf.is_empty() { "db> " } else { "... " });
        io::stdout().flush()?;

        let Some(line) = lines.next().transpose()? else {
            break;
        };
        let line = line.trim();
        if line.eq_ignore_ascii_case("quit") || line.eq_ignore_ascii_case("exit") {
            break;
        }
        if line.is_empty() {
            continue;
        }

        buf.push_str(line);
        buf.push(' ');
        let upper = buf.to_ascii_uppercase();
        if line.contains(';')
            || upper.starts_with("SHOW")
            || upper.starts_with("VACUUM")
            || upper.starts_with("DESC")
        {
            print_result(&execute(db, &buf));
            buf.clear();
        }
    }
    Ok(())
}

fn print_result(result: &StatementResult) {
    if !result.is_success() {
        eprintln!("ERROR: {}", result.message());
        return;
    }
    let Some(columns) = result.columns() else {
        println!("OK: {}", result.message());
        return;
    };

    let widths = columns
        .iter()
        .enumerate()
        .map(|(j, c)| {
            (0..result.row_count())
                .map(|i| result.cell(i, j).chars().count())
                .fold(c.name.chars().count(), usize::max)
        })
        .collect::<Vec<_>>();

    let rule = widths
        .iter()
        .fold(String::from("+"), |acc, w| acc + &"-".repeat(w + 2) + "+");
    let line = |cells: Vec<&str>| {
        cells
            .iter()
            .zip(&widths)
            .fold(String::from("|"), |acc, (cell, w)| acc + &format!(" {:<w$} |", cell, w = *w))
    };

    println!("{}", rule);
    println!("{}", line(columns.iter().map(|c| c.name.as_str()).collect()));
    println!("{}", rule);
    for i in 0..result.row_count() {
        println!("{}", line((0..columns.len()).map(|j| result.cell(i, j)).collect()));
    }
    println!("{}", rule);
    println!("{}", result.message());
}
