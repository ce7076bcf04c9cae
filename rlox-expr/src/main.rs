use std::{
    io::{BufRead, Write},
    path::{Path, PathBuf},
    process::exit,
};

use clap::Parser;
use log::debug;
use rlox_expr::{ast_printer::ast_to_string, exit_code, Lox};

/// Evaluates Lox expressions from a script or an interactive prompt.
#[derive(Parser, Debug)]
#[command(name = "rlox", version, about, long_about = None)]
struct Args {
    /// Print the parsed expression tree instead of evaluating it.
    #[arg(long)]
    ast: bool,

    /// Script to run. Starts a prompt when left out.
    script: Option<PathBuf>,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(err) => {
            // --help and --version also come through here, on stdout
            let code = if err.use_stderr() {
                exit_code::USAGE
            } else {
                exit_code::SUCCESS
            };
            let _ = err.print();
            exit(code);
        }
    };
    debug!("{args:?}");

    let mut driver = Driver {
        lox: Lox::new(),
        print_ast: args.ast,
    };
    let code = match args.script {
        Some(path) => driver.run_file(&path),
        None => driver.run_prompt(),
    };
    exit(code);
}

struct Driver {
    lox: Lox,
    print_ast: bool,
}

impl Driver {
    fn run_file(&mut self, path: &Path) -> i32 {
        let source = match std::fs::read_to_string(path) {
            Ok(source) => source,
            Err(err) => {
                eprintln!("failed to open {}: {err}", path.display());
                return exit_code::IO_ERR;
            }
        };
        self.run(&source);
        self.lox.exit_code()
    }

    fn run_prompt(&mut self) -> i32 {
        let stdin = std::io::stdin();
        let mut reader = stdin.lock();
        loop {
            print!("> ");
            let _ = std::io::stdout().flush();

            let mut line = String::new();
            match reader.read_line(&mut line) {
                Ok(0) => {
                    println!("Received EOF, exiting.");
                    break;
                }
                Ok(_) => {}
                Err(err) => {
                    eprintln!("failed to read line: {err}");
                    return exit_code::IO_ERR;
                }
            }

            self.run(&line);
            self.lox.reporter_mut().reset();
        }
        exit_code::SUCCESS
    }

    fn run(&mut self, source: &str) {
        if self.print_ast {
            if let Some(expr) = self.lox.parse(source) {
                println!("{}", ast_to_string(&expr));
            }
        } else if let Some(value) = self.lox.run(source) {
            println!("{value}");
        }

        for diagnostic in self.lox.reporter_mut().drain() {
            eprintln!("{diagnostic}");
        }
    }
}
