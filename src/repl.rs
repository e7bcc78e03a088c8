//! Interactive prompt: each line is compiled and run as one expression.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use colored::Colorize;

use crate::bytecode::{InterpretResult, VmOptions, VM};

const HISTORY_FILE: &str = ".runic_history";
const HISTORY_LIMIT: usize = 500;

/// What the REPL should do with one line of input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplAction {
    Skip,
    Quit,
    Help,
    ToggleTrace,
    ToggleDisassemble,
    Evaluate(String),
}

impl ReplAction {
    pub fn parse(line: &str) -> ReplAction {
        match line.trim() {
            "" => ReplAction::Skip,
            "exit" | ".exit" | "quit" | ".quit" => ReplAction::Quit,
            ".help" => ReplAction::Help,
            ".trace" => ReplAction::ToggleTrace,
            ".disassemble" => ReplAction::ToggleDisassemble,
            source => ReplAction::Evaluate(source.to_string()),
        }
    }
}

pub struct Repl {
    vm: VM,
    history: Vec<String>,
    history_file: PathBuf,
}

impl Repl {
    pub fn new(options: VmOptions) -> Self {
        let mut repl = Self {
            vm: VM::new().with_options(options),
            history: Vec::new(),
            history_file: Self::get_history_path(),
        };
        repl.load_history();
        repl
    }

    fn get_history_path() -> PathBuf {
        if let Some(home) = dirs::home_dir() {
            home.join(HISTORY_FILE)
        } else {
            PathBuf::from(HISTORY_FILE)
        }
    }

    fn load_history(&mut self) {
        if let Ok(content) = std::fs::read_to_string(&self.history_file) {
            self.history = content
                .lines()
                .filter(|line| !line.trim().is_empty())
                .map(str::to_string)
                .collect();
        }
    }

    fn save_history(&self) {
        let start = self.history.len().saturating_sub(HISTORY_LIMIT);
        let content = self.history[start..].join("\n");
        if let Err(e) = std::fs::write(&self.history_file, content) {
            log::warn!(
                "could not save history to {}: {}",
                self.history_file.display(),
                e
            );
        }
    }

    pub fn run(&mut self) -> io::Result<()> {
        println!("{} {}", "Runic".bold(), env!("CARGO_PKG_VERSION"));
        println!("Type {} for available commands.\n", ".help".cyan());

        let stdin = io::stdin();
        let mut lines = stdin.lock().lines();

        loop {
            print!("{} ", ">".green().bold());
            io::stdout().flush()?;

            let Some(line) = lines.next().transpose()? else {
                println!();
                break;
            };

            match ReplAction::parse(&line) {
                ReplAction::Skip => continue,
                ReplAction::Quit => break,
                ReplAction::Help => Self::print_help(),
                ReplAction::ToggleTrace => {
                    let options = self.vm.options();
                    self.vm.set_options(options.with_trace(!options.trace));
                    Self::print_toggle("trace", !options.trace);
                }
                ReplAction::ToggleDisassemble => {
                    let options = self.vm.options();
                    self.vm
                        .set_options(options.with_disassemble(!options.disassemble));
                    Self::print_toggle("disassemble", !options.disassemble);
                }
                ReplAction::Evaluate(source) => {
                    self.history.push(source.clone());
                    let result = self.vm.interpret(&source);
                    if result != InterpretResult::Ok {
                        log::debug!("repl line finished with {:?}", result);
                    }
                }
            }
        }

        self.save_history();
        println!("Goodbye!");
        Ok(())
    }

    fn print_help() {
        println!("{}", "Commands:".bold());
        println!("  .help         Show this message");
        println!("  .trace        Toggle instruction tracing");
        println!("  .disassemble  Toggle bytecode listing before each run");
        println!("  .exit         Leave the REPL (also: exit, quit, Ctrl-D)");
        println!();
        println!("Anything else is evaluated as an expression, e.g. {}", "(1 + 2) * 3".cyan());
    }

    fn print_toggle(name: &str, enabled: bool) {
        let state = if enabled { "on".green() } else { "off".red() };
        println!("{} {}", name, state);
    }
}
