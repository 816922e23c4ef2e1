use std::{env, io, process};

use rocks_lang::{Rocks, EXIT_USAGE};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().collect();

    match args.len() {
        n if n > 2 => {
            eprintln!("Usage: rocks [script]");
            process::exit(EXIT_USAGE);
        }
        2 => {
            let mut stdout = io::stdout();
            let mut rocks = Rocks::new(&mut stdout);
            rocks.run_file(&args[1]);
        }
        _ => run_prompt(),
    }
}

/// An interactive REPL with line editing and a persistent history file
/// under the user's home directory (falls back to an in-memory-only
/// session if the home directory can't be located).
fn run_prompt() {
    let history_path = home::home_dir().map(|home| home.join(".rocks_history"));

    let mut editor = DefaultEditor::new().expect("failed to initialize the line editor");
    if let Some(path) = &history_path {
        let _ = editor.load_history(path);
    }

    let mut stdout = io::stdout();
    let mut rocks = Rocks::new(&mut stdout);

    loop {
        match editor.readline("> ") {
            Ok(line) => {
                let _ = editor.add_history_entry(line.as_str());
                let _ = rocks.run(&line);
            }
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => break,
            Err(err) => {
                eprintln!("readline error: {err}");
                break;
            }
        }
    }

    if let Some(path) = &history_path {
        let _ = editor.save_history(path);
    }
}
