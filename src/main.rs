use std::{
    fs,
    path::{Path, PathBuf},
};

use clap::Parser;
use log::LevelFilter;
use simple_logger::SimpleLogger;

use forthchan::bytecode::MachineCode;
use forthchan::bytecode::disasm::print_code;
use forthchan::frontend::lexer::{Lexer, Span};
use forthchan::frontend::token_dumper::TokenDumper;
use forthchan::runtime::{MachineConfig, Termination, simulate};
use forthchan::translator::translate;

#[derive(Parser)]
#[command(name = "forthchan")]
#[command(about = "Forth-dialect translator and stack machine simulator")]
struct CliArgs {
    /// Source file, or a machine-code image when --image is given.
    file: PathBuf,
    /// Read the input schedule from a file.
    #[arg(long, conflicts_with = "input_text")]
    input: Option<PathBuf>,
    /// Use the given text as the input schedule.
    #[arg(long)]
    input_text: Option<String>,
    /// Show tokens only.
    #[arg(long)]
    tokens: bool,
    #[arg(long)]
    no_color: bool,
    #[arg(long)]
    pretty: bool,
    /// Print the machine code listing instead of running it.
    #[arg(long)]
    disasm: bool,
    /// Write the machine code image to a file instead of running it.
    #[arg(long, value_name = "IMAGE")]
    emit: Option<PathBuf>,
    /// Treat FILE as a machine code image written by --emit.
    #[arg(long)]
    image: bool,
    /// Print every executed instruction with the data stack after it.
    #[arg(long)]
    trace: bool,
    /// Maximum number of executed instructions.
    #[arg(long, default_value_t = 1_000_000)]
    limit: u64,
    /// Maximum number of machine ticks.
    #[arg(long)]
    max_ticks: Option<u64>,
    /// Maximum number of cells on the data stack.
    #[arg(long, default_value_t = 256)]
    data_stack: usize,
    /// Maximum number of nested do loops.
    #[arg(long, default_value_t = 32)]
    loop_stack: usize,
    /// Maximum number of cells on the return stack.
    #[arg(long, default_value_t = 256)]
    return_stack: usize,
    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() {
    let args = CliArgs::parse();

    let level = match args.verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    if let Err(e) = SimpleLogger::new().with_level(level).init() {
        eprintln!("Failed to initialise logging: {}", e);
    }

    if args.tokens {
        let source = read_source(&args.file);
        dump_tokens(&source, args.no_color, args.pretty);
        return;
    }

    let code = if args.image {
        load_image(&args.file)
    } else {
        let source = read_source(&args.file);
        match translate(&source) {
            Ok(code) => code,
            Err(e) => {
                eprintln!("{}: {}", e.stage(), e);
                if let Some(excerpt) = source_excerpt(&source, e.span()) {
                    eprintln!("{}", excerpt);
                }
                std::process::exit(1);
            }
        }
    };

    if args.disasm || args.emit.is_some() {
        if args.disasm {
            print_code(&code);
        }
        if let Some(path) = &args.emit {
            write_image(&code, path);
        }
        return;
    }

    let input = read_input(&args);
    let config = MachineConfig::default()
        .with_data_stack(args.data_stack)
        .with_loop_stack(args.loop_stack)
        .with_return_stack(args.return_stack)
        .with_max_instructions(Some(args.limit))
        .with_max_ticks(args.max_ticks)
        .with_trace(args.trace);

    let report = simulate(&code, &input, &config);

    for record in &report.trace {
        eprintln!("{}", record);
    }

    println!("{}", report.output_text());
    println!("instr_counter: {} ticks: {}", report.instructions, report.ticks);

    match &report.termination {
        Termination::Halted => {}
        Termination::Fault { error, .. } => {
            eprintln!("{}", report.termination);
            if error.is_internal() {
                eprintln!("  note: the machine code is malformed; re-translate the source");
            }
            std::process::exit(2);
        }
        Termination::LimitExceeded(_) => {
            eprintln!("{}", report.termination);
            std::process::exit(3);
        }
    }
}

fn read_source(path: &Path) -> String {
    match fs::read_to_string(path) {
        Ok(source) => source,
        Err(e) => {
            eprintln!("Failed to read '{}': {}", path.display(), e);
            std::process::exit(1);
        }
    }
}

/// The source line at `span` with a caret under the column.
fn source_excerpt(source: &str, span: Span) -> Option<String> {
    let line = source.lines().nth(span.line.checked_sub(1)?)?;
    let pad = " ".repeat(span.col.saturating_sub(1));
    Some(format!("  {}\n  {}^", line, pad))
}

fn read_input(args: &CliArgs) -> String {
    if let Some(text) = &args.input_text {
        return text.clone();
    }
    match &args.input {
        Some(path) => read_source(path),
        None => String::new(),
    }
}

fn load_image(path: &Path) -> MachineCode {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) => {
            eprintln!("Failed to read '{}': {}", path.display(), e);
            std::process::exit(1);
        }
    };
    match MachineCode::from_bytes(&bytes) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    }
}

fn write_image(code: &MachineCode, path: &Path) {
    let bytes = match code.to_bytes() {
        Ok(bytes) => bytes,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    };
    if let Err(e) = fs::write(path, bytes) {
        eprintln!("Failed to write '{}': {}", path.display(), e);
        std::process::exit(1);
    }
}

fn dump_tokens(source: &str, no_color: bool, pretty: bool) {
    let mut lexer = Lexer::new(source);

    match lexer.tokenize() {
        Ok(tokens) => {
            let mut dumper = TokenDumper::new();

            if no_color {
                dumper = dumper.no_color();
            }
            if pretty {
                dumper = dumper.pretty();
            }

            dumper.dump(&tokens);
        }
        Err(e) => {
            eprintln!("Lexer error: {}", e);
            std::process::exit(1);
        }
    }
}
