// ABOUTME: Command-line entry point: runs a script file or starts the REPL

mod config;

use clap::Parser;
use config::{VERSION, WELCOME_MESSAGE, WELCOME_SUBTITLE};
use lisp_llm_sandbox::engine::Engine;
use lisp_llm_sandbox::value::Expr;
use rustyline::error::ReadlineError;
use rustyline::{Config, DefaultEditor, Editor};
use std::path::PathBuf;

/// An R7RS-subset Scheme interpreter
#[derive(Parser, Debug)]
#[command(name = "lisp-llm-sandbox")]
#[command(version = VERSION)]
#[command(about = "An R7RS-subset Scheme interpreter")]
struct CliArgs {
    /// Script file to execute (if omitted, starts the REPL)
    #[arg(value_name = "FILE")]
    script: Option<PathBuf>,

    /// Skip loading the bundled prelude (core/match/streams)
    #[arg(long = "no-prelude")]
    no_prelude: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();

    let engine = if args.no_prelude {
        Engine::new_without_prelude()
    } else {
        Engine::new()
    };

    if let Some(script_path) = args.script {
        if let Some(dir) = script_path.parent().filter(|d| !d.as_os_str().is_empty()) {
            engine.set_cwd(dir);
        }
        run_script(&engine, &script_path)?;
        return Ok(());
    }

    run_repl(&engine)
}

/// Reads a script file and evaluates each top-level form in order. Scripts
/// don't print their results; use `display`/`write` for output.
fn run_script(engine: &Engine, path: &PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    let source = std::fs::read_to_string(path)
        .map_err(|e| format!("Cannot read script file {}: {}", path.display(), e))?;

    engine
        .eval(&source)
        .map_err(|e| format!("{}", e))?;

    Ok(())
}

fn run_repl(engine: &Engine) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::builder().auto_add_history(true).build();
    let mut rl: Editor<(), _> = DefaultEditor::with_config(config)
        .map_err(|e| format!("Failed to initialize REPL: {}", e))?;

    let history_file = ".scheme_history";
    let _ = rl.load_history(history_file);

    println!("{}", WELCOME_MESSAGE);
    println!("{}", WELCOME_SUBTITLE);

    loop {
        let readline = rl.readline("scheme> ");

        match readline {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                if trimmed == "(quit)" {
                    println!("Goodbye!");
                    break;
                }

                // `(exit n)` is a real builtin (spec §5) and terminates the
                // process from inside `engine.eval` itself; it never returns here.
                match engine.eval(&line) {
                    Ok(Expr::Void) => {}
                    Ok(result) => println!("=> {}", result),
                    Err(e) => eprintln!("Error: {}", e),
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("^C");
                continue;
            }
            Err(ReadlineError::Eof) => {
                println!("\nGoodbye!");
                break;
            }
            Err(err) => {
                eprintln!("Error: {}", err);
                break;
            }
        }
    }

    let _ = rl.save_history(history_file);
    Ok(())
}
