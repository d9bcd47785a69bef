// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2025 Daniel Negri
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

use clap::Parser;
use csv::{QuoteStyle, ReaderBuilder, Terminator, Trim, WriterBuilder};
use ride_dispatch::{DispatchConfig, Dispatcher, Outcome};
use std::fs::File;
use std::io::{BufReader, Read, Write};
use std::path::PathBuf;
use std::process;
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Ride Dispatch - Run a ride dispatch command file
///
/// Reads one command per line and writes one result line per command that
/// produces output to stdout.
#[derive(Parser, Debug)]
#[command(name = "ride-dispatch")]
#[command(about = "A ride dispatch engine that processes command files", long_about = None)]
struct Args {
    /// Path to the command file
    ///
    /// Example line: START_RIDE RIDE-001 1 R1
    #[arg(value_name = "FILE")]
    input: PathBuf,

    /// Drivers strictly closer than this are listed by MATCH
    #[arg(long, default_value_t = DispatchConfig::MATCH_RADIUS)]
    match_radius: f64,

    /// Maximum number of drivers listed by MATCH
    #[arg(long, default_value_t = DispatchConfig::MATCH_LIMIT)]
    match_limit: usize,

    /// Write a CSV report of every ride to this file after the run
    #[arg(long, value_name = "FILE")]
    ledger: Option<PathBuf>,

    /// Log why commands were rejected (overridden by RUST_LOG)
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn config(&self) -> DispatchConfig {
        DispatchConfig {
            match_radius: self.match_radius,
            match_limit: self.match_limit,
            ..DispatchConfig::default()
        }
    }
}

fn main() {
    let args = Args::parse();
    init_logging(args.verbose);

    let file = match File::open(&args.input) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Error opening file '{}': {}", args.input.display(), e);
            process::exit(1);
        }
    };

    let stdout = std::io::stdout().lock();
    let dispatcher = match process_commands(BufReader::new(file), stdout, args.config()) {
        Ok(dispatcher) => dispatcher,
        Err(e) => {
            eprintln!("Error processing commands: {}", e);
            process::exit(1);
        }
    };

    if let Some(path) = &args.ledger {
        let written = File::create(path)
            .map_err(csv::Error::from)
            .and_then(|file| write_ledger(&dispatcher, file));
        if let Err(e) = written {
            eprintln!("Error writing ledger '{}': {}", path.display(), e);
            process::exit(1);
        }
    }
}

/// Logs go to stderr so stdout carries only result lines.
fn init_logging(verbose: bool) {
    let default = if verbose {
        "ride_dispatch=debug"
    } else {
        "ride_dispatch=warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
}

/// Runs every command from `reader`, writing result lines to `writer` as
/// they are produced.
///
/// Lines are split on spaces; repeated spaces and blank lines are ignored.
/// A line that fails to decode as UTF-8 is answered with `INVALID_COMMAND`
/// and processing continues.
///
/// # Example
///
/// ```text
/// ADD_DRIVER D1 0 0
/// ADD_RIDER R1 2 2
/// MATCH R1
/// ```
///
/// # Errors
///
/// Returns a CSV error if reading the input or writing the output fails.
pub fn process_commands<R: Read, W: Write>(
    reader: R,
    writer: W,
    config: DispatchConfig,
) -> Result<Dispatcher, csv::Error> {
    let mut dispatcher = Dispatcher::with_config(config);

    let mut rdr = ReaderBuilder::new()
        .delimiter(b' ')
        .has_headers(false)
        .flexible(true) // Commands take different numbers of arguments
        .quoting(false)
        .trim(Trim::All) // Tolerate tabs and CRLF line endings
        .from_reader(reader);

    let mut wtr = WriterBuilder::new()
        .delimiter(b' ')
        .flexible(true)
        .quote_style(QuoteStyle::Never)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(writer);

    for result in rdr.records() {
        let outcome = match result {
            Ok(record) => {
                let tokens: Vec<&str> = record.iter().filter(|field| !field.is_empty()).collect();
                if tokens.is_empty() {
                    continue;
                }
                dispatcher.execute_line(tokens.as_slice())
            }
            Err(e) if e.is_io_error() => return Err(e),
            Err(e) => {
                debug!(error = %e, "undecodable line");
                Outcome::InvalidCommand
            }
        };

        if let Some(record) = outcome.to_record() {
            wtr.write_record(&record)?;
        }
    }

    wtr.flush()?;
    Ok(dispatcher)
}

/// Write every ride, in start order, as CSV.
///
/// # CSV Format
///
/// Columns: `ride, rider, driver, phase, destination_x, destination_y, elapsed, fare`
///
/// ```csv
/// ride,rider,driver,phase,destination_x,destination_y,elapsed,fare
/// RIDE-001,R1,D1,BILLED,3.0,15.0,30.0,233.71
/// RIDE-002,R2,D3,ACTIVE,,,,
/// ```
///
/// # Errors
///
/// Returns a CSV error if writing fails.
pub fn write_ledger<W: Write>(dispatcher: &Dispatcher, writer: W) -> Result<(), csv::Error> {
    let mut wtr = csv::Writer::from_writer(writer);

    for ride in dispatcher.ledger().rides() {
        wtr.serialize(ride.summary())?;
    }

    wtr.flush()?;
    Ok(())
}
