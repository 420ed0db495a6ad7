//! CLI for xlprotect - locks/unlocks XLSX cells and sheet protection
//!
//! Usage:
//!   xlprotect_cli protect <book.xlsx> [--rows 2,7] [--cols B,AA] [--password X] [--no-formulas]
//!   xlprotect_cli unprotect <book.xlsx> [--password X]
//!
//! Omitted flags fall back to the stored preferences (user_data.json),
//! which are updated on exit regardless of the operation outcome.

#![allow(clippy::exit)]
#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::indexing_slicing)]

use std::env;
use std::process;

use xlprotect::prefs::{Preferences, DEFAULT_PREFS_FILE};
use xlprotect::selection::{parse_column_list, parse_row_list};
use xlprotect::{protect, unprotect, ProtectRequest, UnprotectRequest};

fn usage() -> ! {
    eprintln!(
        "Usage:\n  \
         xlprotect_cli protect <book.xlsx> [--rows 2,7] [--cols B,AA] [--password X] [--no-formulas]\n  \
         xlprotect_cli unprotect <book.xlsx> [--password X]"
    );
    process::exit(1);
}

fn main() {
    let args: Vec<String> = env::args().skip(1).collect();
    if args.len() < 2 {
        usage();
    }

    let command = args[0].as_str();
    let file_path = args[1].clone();

    let mut prefs = Preferences::load(DEFAULT_PREFS_FILE);

    let mut rows = prefs.row_nums.clone();
    let mut cols = prefs.col_letters.clone();
    let mut password = prefs.password.clone();
    let mut protect_formulas = prefs.protect_formulas;

    let mut i = 2;
    while i < args.len() {
        match args[i].as_str() {
            "--rows" if i + 1 < args.len() => {
                rows = args[i + 1].clone();
                i += 2;
            }
            "--cols" if i + 1 < args.len() => {
                cols = args[i + 1].clone();
                i += 2;
            }
            "--password" if i + 1 < args.len() => {
                password = args[i + 1].clone();
                i += 2;
            }
            "--no-formulas" => {
                protect_formulas = false;
                i += 1;
            }
            other => {
                eprintln!("Unknown argument: {other}");
                usage();
            }
        }
    }

    // Remember this run's inputs for the next one
    prefs.file_path = file_path.clone();
    prefs.row_nums = rows.clone();
    prefs.col_letters = cols.clone();
    prefs.password = password.clone();
    prefs.protect_formulas = protect_formulas;

    let result = match command {
        "protect" => parse_row_list(&rows)
            .map(|row_nums| {
                ProtectRequest::new()
                    .with_rows(row_nums)
                    .with_columns(parse_column_list(&cols))
                    .with_password(&password)
                    .protect_formulas(protect_formulas)
            })
            .and_then(|request| protect(&file_path, &request)),
        "unprotect" => {
            let request = UnprotectRequest::new().with_password(&password);
            unprotect(&file_path, &request)
        }
        _ => usage(),
    };

    // Preferences are saved regardless of the operation outcome
    if let Err(e) = prefs.save(DEFAULT_PREFS_FILE) {
        eprintln!("Warning: could not save preferences: {e}");
    }

    match result {
        Ok(()) => {
            println!("{command}ed: {file_path}");
        }
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    }
}
