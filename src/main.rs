//! Runic CLI: run a script, evaluate an expression, or start the REPL.

use std::env;
use std::fs;
use std::path::Path;
use std::process;

use colored::Colorize;

use runic::bytecode::VmOptions;
use runic::lexer::Scanner;
use runic::repl::Repl;
use runic::{InterpretResult, VM};

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Exit code for a malformed command line.
const EXIT_USAGE: i32 = 64;
/// Exit code for a script that cannot be read.
const EXIT_IO: i32 = 74;

/// CLI command to execute.
enum Command {
    /// Run a script file
    Run { file: String },
    /// Evaluate a string
    Eval { code: String },
    /// Start the REPL
    Repl,
    /// Print usage and exit
    Help,
    /// Print the version and exit
    Version,
}

/// CLI options parsed from arguments.
struct Options {
    command: Command,
    disassemble: bool,
    trace: bool,
    tokens: bool,
}

impl Options {
    fn vm_options(&self) -> VmOptions {
        VmOptions::default()
            .with_trace(self.trace)
            .with_disassemble(self.disassemble)
    }
}

fn print_usage() {
    eprintln!("Runic {} - bytecode expression interpreter", VERSION);
    eprintln!();
    eprintln!("Usage: runic [options] [script.rn]");
    eprintln!("       runic [options] -e <expression>");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  -e <code>       Evaluate an expression and print the result");
    eprintln!("  --disassemble   Print the compiled bytecode before running");
    eprintln!("  --trace         Print the stack and each instruction as it executes");
    eprintln!("  --tokens        Print the scanned tokens instead of running");
    eprintln!("  --version, -V   Show version");
    eprintln!("  --help, -h      Show this help message");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  RUNIC_LOG       Log filter (error, warn, info, debug, trace)");
    eprintln!();
    eprintln!("Examples:");
    eprintln!("  runic                       Start interactive REPL");
    eprintln!("  runic sum.rn                Run a script file");
    eprintln!("  runic -e '(2 + 3) * 4'      Evaluate an expression");
    eprintln!("  runic --trace -e '-2 + 3'   Evaluate with an execution trace");
}

fn usage_error(message: &str) -> ! {
    eprintln!("{} {}", "error:".red().bold(), message);
    print_usage();
    process::exit(EXIT_USAGE);
}

fn parse_args(args: &[String]) -> Result<Options, String> {
    let mut options = Options {
        command: Command::Repl,
        disassemble: false,
        trace: false,
        tokens: false,
    };
    let mut command_set = false;

    let mut i = 0;
    while i < args.len() {
        let arg = &args[i];
        match arg.as_str() {
            "--help" | "-h" => {
                options.command = Command::Help;
                return Ok(options);
            }
            "--version" | "-V" => {
                options.command = Command::Version;
                return Ok(options);
            }
            "--disassemble" => options.disassemble = true,
            "--trace" => options.trace = true,
            "--tokens" => options.tokens = true,
            "-e" => {
                i += 1;
                let Some(code) = args.get(i) else {
                    return Err("-e requires an expression".to_string());
                };
                if command_set {
                    return Err("only one script or expression may be given".to_string());
                }
                options.command = Command::Eval { code: code.clone() };
                command_set = true;
            }
            flag if flag.starts_with('-') && flag != "-" => {
                return Err(format!("unknown option '{}'", flag));
            }
            file => {
                if command_set {
                    return Err("only one script or expression may be given".to_string());
                }
                options.command = Command::Run {
                    file: file.to_string(),
                };
                command_set = true;
            }
        }
        i += 1;
    }

    if options.tokens && !command_set {
        return Err("--tokens needs a script or an -e expression".to_string());
    }

    Ok(options)
}

fn init_logging() {
    let env = env_logger::Env::new().filter_or("RUNIC_LOG", "warn");
    env_logger::Builder::from_env(env).init();
}

fn main() {
    init_logging();
    let args: Vec<String> = env::args().skip(1).collect();
    let options = parse_args(&args).unwrap_or_else(|message| usage_error(&message));

    match &options.command {
        Command::Help => print_usage(),
        Command::Version => println!("runic {}", VERSION),
        Command::Repl => run_repl(&options),
        Command::Run { file } => run_file(file, &options),
        Command::Eval { code } => run_source(code, &options),
    }
}

fn run_file(path: &str, options: &Options) {
    let source = match fs::read_to_string(Path::new(path)) {
        Ok(source) => source,
        Err(e) => {
            eprintln!("{} could not read '{}': {}", "error:".red().bold(), path, e);
            process::exit(EXIT_IO);
        }
    };
    run_source(&source, options);
}

fn run_source(source: &str, options: &Options) {
    if options.tokens {
        dump_tokens(source);
        return;
    }

    let result = VM::new().with_options(options.vm_options()).interpret(source);
    if result != InterpretResult::Ok {
        process::exit(result.exit_code());
    }
}

fn dump_tokens(source: &str) {
    let mut line = 0;
    for token in Scanner::new(source) {
        if token.line != line {
            print!("{:4} ", token.line);
            line = token.line;
        } else {
            print!("   | ");
        }
        println!("{:<12} '{}'", format!("{:?}", token.kind), token.lexeme);
    }
}

fn run_repl(options: &Options) {
    let mut repl = Repl::new(options.vm_options());
    if let Err(e) = repl.run() {
        eprintln!("{} {}", "error:".red().bold(), e);
        process::exit(EXIT_IO);
    }
}
