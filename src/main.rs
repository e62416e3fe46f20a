use std::io::Write;

use pagetuple::{
    executor::{binary_reader::BinaryTupleReader, tuple_reader::TupleReader},
    storage::inspect::dump_pages,
    types::error::ReaderError,
};
use rustyline::{DefaultEditor, Result, error::ReadlineError};
use tracing_subscriber::EnvFilter;

const DEFAULT_FILE: &str = "tuples.bin";
const HISTORY_FILE: &str = ".pagetuple_history";

fn print_help() {
    println!(
        r#"
Available commands:
  next [n], n [n]  - Read the next n tuples (default 1)
  seek <index>     - Rewind to an already read tuple index
  rewind           - Rewind to the first tuple
  index            - Show the index of the next tuple
  dump             - Print every page of the file
  help, h          - Show this help message
  clear, ctrl + l  - Clear the screen
  exit, quit, q    - Exit the inspector
"#
    );
}

fn read_tuples(reader: &mut BinaryTupleReader, count: usize) -> std::result::Result<(), ReaderError> {
    for _ in 0..count {
        let index = reader.current_index();
        match reader.read()? {
            Some(tuple) => println!("[{}] {}", index, tuple),
            None => {
                println!("(end of file after {} tuples)", reader.current_index());
                break;
            }
        }
    }
    Ok(())
}

fn run_command(reader: &mut BinaryTupleReader, command: &str) -> std::result::Result<bool, ReaderError> {
    let mut parts = command.split_whitespace();
    let Some(name) = parts.next() else {
        return Ok(true);
    };
    let argument = parts.next();

    match name.to_lowercase().as_str() {
        "exit" | "quit" | "q" => {
            println!("Goodbye!");
            return Ok(false);
        }
        "help" | "h" => print_help(),
        "clear" => {
            print!("\x1B[2J\x1B[1;1H");
            std::io::stdout().flush()?;
        }
        "next" | "n" => {
            let count = match argument.map(str::parse::<usize>) {
                None => 1,
                Some(Ok(count)) => count,
                Some(Err(_)) => {
                    println!("Usage: next [n]");
                    return Ok(true);
                }
            };
            read_tuples(reader, count)?;
        }
        "seek" => match argument.map(str::parse::<u64>) {
            Some(Ok(index)) => {
                reader.reset_to(index)?;
                println!("Next tuple is {}", reader.current_index());
            }
            _ => println!("Usage: seek <index>"),
        },
        "rewind" => {
            reader.reset()?;
            println!("Rewound to the first tuple");
        }
        "index" => println!(
            "Next tuple: {} ({} pages fetched{})",
            reader.current_index(),
            reader.pages_fetched(),
            if reader.is_end_of_file() { ", end of file" } else { "" }
        ),
        "dump" => {
            let headers = dump_pages(reader.path(), &mut std::io::stdout().lock())?;
            println!("{} pages", headers.len());
        }
        other => println!("Unknown command '{}', type 'help'", other),
    }

    Ok(true)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let path = std::env::args().nth(1).unwrap_or_else(|| DEFAULT_FILE.to_string());
    let mut reader = match BinaryTupleReader::open(&path) {
        Ok(reader) => reader,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };
    println!("pagetuple inspector on {} (type 'help')", path);

    let mut rl = DefaultEditor::new()?;
    let _ = rl.load_history(HISTORY_FILE);

    loop {
        match rl.readline("pagetuple> ") {
            Ok(line) => {
                let command = line.trim();
                if command.is_empty() {
                    continue;
                }
                rl.add_history_entry(command)?;
                match run_command(&mut reader, command) {
                    Ok(true) => {}
                    Ok(false) => break,
                    Err(e) => println!("Error: {}", e),
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("Interrupted");
                break;
            }
            Err(ReadlineError::Eof) => {
                println!("EOF");
                break;
            }
            Err(err) => {
                println!("Error: {:?}", err);
                break;
            }
        }
    }

    let _ = rl.save_history(HISTORY_FILE);
    if let Err(e) = reader.close() {
        eprintln!("Error: {}", e);
    }
    Ok(())
}
