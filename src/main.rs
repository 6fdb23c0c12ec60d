use crossword_reader::crossword::codec::{puzzle_io, state_io};
use crossword_reader::{Crossword, Direction, FormatKind, Result, crossword::read_puzzle_with};
use std::env;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::process;

fn write_file(out: &str, write: impl FnOnce(&mut BufWriter<File>) -> Result<()>) -> Result<()> {
    let mut writer = BufWriter::new(File::create(out)?);
    write(&mut writer)?;
    writer.flush()?;
    Ok(())
}

fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    let idx = args.iter().position(|arg| arg == flag)?;
    match args.get(idx + 1) {
        Some(value) => Some(value),
        None => {
            eprintln!("ERROR: {} flag requires an argument.", flag);
            process::exit(1);
        }
    }
}

fn print_words(crossword: &Crossword, direction: Direction, limit: usize) {
    let words = crossword.words(direction);
    println!("\n{} ({} words):", direction, words.len());
    for word in words.iter().take(limit) {
        let answer: String = word.cells().iter().map(|c| c.chars()).collect();
        println!("  {:>3}. {} [{}]", word.number(), word.hint().unwrap_or(""), answer);
    }
    if words.len() > limit {
        println!("  ... and {} more", words.len() - limit);
    }
}

fn main() {
    env_logger::init();
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        eprintln!(
            "Usage: {} <puzzle-file> [--format <NAME>] [--encoding <LABEL>] [--key <0000-9999>] \
             [--save <OUT>] [--dump-state <OUT>]",
            args[0]
        );
        process::exit(1);
    }

    let path = &args[1];
    let input = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) => {
            eprintln!("ERROR: Failed to read {}: {}", path, e);
            process::exit(1);
        }
    };

    let kind = match flag_value(&args, "--format") {
        Some(name) => FormatKind::from_name(name).unwrap_or_else(|| {
            eprintln!("ERROR: Unknown format '{}'", name);
            process::exit(1);
        }),
        None => FormatKind::sniff(&input)
            .or_else(|| FormatKind::from_extension(path))
            .unwrap_or_else(|| {
                eprintln!("ERROR: Cannot tell the format of {}; pass --format", path);
                process::exit(1);
            }),
    };

    let key = flag_value(&args, "--key").map(|value| {
        value.parse::<u16>().unwrap_or_else(|_| {
            eprintln!("ERROR: Invalid key '{}'. Expected a number from 0 to 9999", value);
            process::exit(1);
        })
    });
    let encoding = flag_value(&args, "--encoding");

    println!("Reading {} puzzle: {}", kind.name(), path);
    println!("{}", "=".repeat(60));

    let crossword = match read_puzzle_with(kind, &input, encoding, key) {
        Ok(crossword) => crossword,
        Err(e) => {
            eprintln!("\nERROR: Failed to read puzzle");
            eprintln!("  {}", e);
            process::exit(1);
        }
    };

    println!("\nPuzzle Information:");
    println!("  Title: {}", crossword.title().unwrap_or("(untitled)"));
    if let Some(author) = crossword.author() {
        println!("  Author: {}", author);
    }
    if let Some(copyright) = crossword.copyright() {
        println!("  Copyright: {}", copyright);
    }
    if let Some(description) = crossword.description() {
        println!("  Description: {}", description);
    }
    println!("  Size: {}x{}", crossword.width(), crossword.height());
    println!("  Squares: {}", crossword.square_count());
    println!("  Hash: {}", crossword.hash());

    print_words(&crossword, Direction::Across, 10);
    print_words(&crossword, Direction::Down, 10);

    if let Some(out) = flag_value(&args, "--save") {
        let result = write_file(out, |w| puzzle_io::write_crossword(w, &crossword));
        match result {
            Ok(()) => println!("\nSaved puzzle to {}", out),
            Err(e) => {
                eprintln!("ERROR: Failed to save puzzle: {}", e);
                process::exit(1);
            }
        }
    }

    if let Some(out) = flag_value(&args, "--dump-state") {
        let mut state = crossword.new_state();
        let result = crossword
            .update_state_statistics(&mut state)
            .and_then(|()| write_file(out, |w| state_io::write_state(w, &state)));
        match result {
            Ok(()) => println!("Wrote empty progress to {}", out),
            Err(e) => {
                eprintln!("ERROR: Failed to write progress: {}", e);
                process::exit(1);
            }
        }
    }
}
