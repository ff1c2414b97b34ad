use std::fs::File;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::process;

use anyhow::{Context, Result};
use clap::error::ErrorKind;
use clap::Parser as ClapParser;
use clap::Subcommand;
use env_logger::Builder;
use log::{debug, info};
use memmap2::Mmap;

use rox::ast_printer::AstPrinter;
use rox::error::{Diagnostics, Status};
use rox::parser::Parser;
use rox::scanner::Scanner;
use rox::token::Token;
use rox::Lox;

const EXIT_USAGE: i32 = 64;
const EXIT_STATIC_ERROR: i32 = 65;
const EXIT_RUNTIME_ERROR: i32 = 70;

#[derive(ClapParser, Debug)]
#[command(version, about = "Lox language interpreter", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    commands: Commands,

    /// Enable logging to app.log
    #[arg(long, global = true)]
    log: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Tokenizes input from a file, printing each token
    Tokenize {
        filename: PathBuf,

        /// Print the token list as JSON instead of one token per line
        #[arg(long)]
        json: bool,
    },

    /// Parses input from a file as a single expression and prints its AST
    Parse { filename: PathBuf },

    /// Evaluates input from a file as a single expression and prints the result
    Evaluate { filename: PathBuf },

    /// Runs a Lox program from a file, or starts a prompt when no file is given
    Run { filename: Option<PathBuf> },
}

/// Maps `filename` and checks that it is UTF-8.
fn read_file(filename: &Path) -> Result<String> {
    info!("Reading file: {:?}", filename);

    let file = File::open(filename).with_context(|| format!("Failed to open file {:?}", filename))?;

    let len = file
        .metadata()
        .with_context(|| format!("Failed to stat file {:?}", filename))?
        .len();

    if len == 0 {
        return Ok(String::new());
    }

    // SAFETY: the mapping is read once and copied out before returning; the
    // file is not expected to change while we hold it.
    let map = unsafe { Mmap::map(&file) }.with_context(|| format!("Failed to map file {:?}", filename))?;

    let source = std::str::from_utf8(&map)
        .with_context(|| format!("File {:?} is not valid UTF-8", filename))?
        .to_owned();

    info!("Read {} bytes from {:?}", source.len(), filename);

    Ok(source)
}

fn init_logger() -> Result<()> {
    let log_file = File::create("app.log").context("Failed to create app.log")?;

    Builder::new()
        .format(|buf, record| {
            let module = record
                .module_path()
                .unwrap_or("<unnamed>")
                .strip_prefix("rox::")
                .unwrap_or(record.module_path().unwrap_or("<unnamed>"));
            writeln!(
                buf,
                "[{}:{}] - {}",
                module,
                record.line().unwrap_or(0),
                record.args()
            )
        })
        .target(env_logger::Target::Pipe(Box::new(log_file)))
        .filter(None, log::LevelFilter::Debug) // Default to Debug, override with RUST_LOG
        .parse_default_env()
        .init();

    info!("Logger initialized, writing to app.log");
    Ok(())
}

/// Print everything collected so far to stderr.
fn emit(diagnostics: &mut Diagnostics) {
    for e in diagnostics.take() {
        debug!("Reporting: {}", e);
        eprintln!("{}", e);
    }
}

fn exit_code(status: Status) -> i32 {
    match status {
        Status::Clean => 0,
        Status::StaticError => EXIT_STATIC_ERROR,
        Status::RuntimeError => EXIT_RUNTIME_ERROR,
    }
}

fn tokenize(filename: &Path, json: bool) -> Result<i32> {
    info!("Running Tokenize subcommand");

    let source = read_file(filename)?;
    let mut tokens: Vec<Token> = Vec::new();
    let mut tokenized = true;

    for result in Scanner::new(&source) {
        match result {
            Ok(token) => {
                if !json {
                    println!("{}", token);
                }
                tokens.push(token);
            }

            Err(e) => {
                tokenized = false;
                eprintln!("{}", e);
            }
        }
    }

    if json {
        let rendered = serde_json::to_string_pretty(&tokens).context("Failed to serialize tokens")?;
        println!("{}", rendered);
    }

    if !tokenized {
        debug!("Tokenization failed, exiting with code {}", EXIT_STATIC_ERROR);
        return Ok(EXIT_STATIC_ERROR);
    }

    Ok(0)
}

fn parse(filename: &Path) -> Result<i32> {
    info!("Running Parse subcommand");

    let source = read_file(filename)?;
    let mut diagnostics = Diagnostics::new();

    let tokens = rox::scanner::scan_tokens(&source, &mut diagnostics);
    let expr = Parser::new(tokens).parse_expression(&mut diagnostics);

    match expr {
        Some(expr) if !diagnostics.had_error() => {
            let ast = AstPrinter::print(&expr);
            debug!("AST: {}", ast);
            println!("{}", ast);
            Ok(0)
        }

        _ => {
            emit(&mut diagnostics);
            Ok(EXIT_STATIC_ERROR)
        }
    }
}

fn evaluate(filename: &Path) -> Result<i32> {
    info!("Running Evaluate subcommand");

    let source = read_file(filename)?;
    let mut diagnostics = Diagnostics::new();
    let mut lox = Lox::new();

    if let Some(value) = lox.evaluate(&source, &mut diagnostics) {
        debug!("Evaluated to: {}", value);
        println!("{}", value);
    }

    let status = diagnostics.status();
    emit(&mut diagnostics);

    Ok(exit_code(status))
}

fn run_file(filename: &Path) -> Result<i32> {
    info!("Running Run subcommand");

    let source = read_file(filename)?;
    debug!("Provided input:\n{}", source);

    let mut diagnostics = Diagnostics::new();
    let status = Lox::new().run(&source, &mut diagnostics);
    emit(&mut diagnostics);

    info!("Run finished with {:?}", status);

    Ok(exit_code(status))
}

/// Read-eval-print loop.  Definitions persist across lines; errors only
/// affect the line that caused them.
fn run_prompt() -> Result<i32> {
    info!("Starting interactive prompt");

    let mut lox = Lox::new().repl(true);
    let mut diagnostics = Diagnostics::new();
    let stdin = io::stdin();
    let mut line = String::new();

    loop {
        print!("> ");
        io::stdout().flush().context("Failed to flush prompt")?;

        line.clear();
        let read = stdin
            .lock()
            .read_line(&mut line)
            .context("Failed to read from stdin")?;

        if read == 0 {
            println!();
            break;
        }

        lox.run(&line, &mut diagnostics);
        emit(&mut diagnostics);
        diagnostics.reset();
    }

    Ok(0)
}

fn main() -> Result<()> {
    let args: Cli = match Cli::try_parse() {
        Ok(args) => args,
        Err(e) => match e.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => e.exit(),
            _ => {
                let _ = e.print();
                process::exit(EXIT_USAGE);
            }
        },
    };

    if args.log {
        init_logger()?;
    } else {
        env_logger::Builder::new()
            .filter_level(log::LevelFilter::Off)
            .init();
    }

    info!("CLI arguments: {:?}", args);

    let code = match &args.commands {
        Commands::Tokenize { filename, json } => tokenize(filename, *json)?,
        Commands::Parse { filename } => parse(filename)?,
        Commands::Evaluate { filename } => evaluate(filename)?,
        Commands::Run { filename: Some(filename) } => run_file(filename)?,
        Commands::Run { filename: None } => run_prompt()?,
    };

    if code != 0 {
        debug!("Exiting with code {}", code);
        process::exit(code);
    }

    Ok(())
}
