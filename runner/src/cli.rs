// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#![deny(clippy::all, clippy::pedantic)]

use clap::error::ErrorKind;
use clap::{arg, crate_version, value_parser, ArgAction, Command};
use std::{ffi::OsString, path::PathBuf};

/// # Errors
/// Returns an error if the arguments are invalid.
/// # Panics
/// Panics if the arguments cannot be read.
pub fn main<I, T>(args: Option<I>) -> Result<(), String>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cmd = Command::new("circuit-runner")
        .args(&[
            arg!(-f --file <PATH> "(Required) Path to the circuit description file to run")
                .value_parser(value_parser!(PathBuf))
                .required(true),
            arg!(-u --upto <NUM> "Evaluate only the columns before this index")
                .value_parser(value_parser!(usize)),
            arg!(-s --steps "Print statistics after every column instead of only the final state")
                .action(ArgAction::SetTrue),
        ])
        .version(crate_version!());
    let matches = match args {
        Some(args) => cmd.try_get_matches_from(args),
        None => cmd.try_get_matches(),
    };
    match matches {
        Err(e) => {
            let msg = e.to_string();
            match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                    eprint!("{msg}");
                    Ok(())
                }
                _ => Err(msg),
            }
        }
        Ok(matches) => crate::run_file(
            matches
                .get_one::<PathBuf>("file")
                .expect("File path is required"),
            matches.get_one::<usize>("upto").copied(),
            matches.get_flag("steps"),
            &mut std::io::stdout(),
        ),
    }
}
