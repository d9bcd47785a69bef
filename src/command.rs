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

//! Command parsing and result formatting.
//!
//! Each input line is a command name followed by its arguments:
//!
//! | Command | Arguments |
//! |---------|-----------|
//! | `ADD_DRIVER` | id x y |
//! | `ADD_RIDER` | id x y |
//! | `MATCH` | rider |
//! | `START_RIDE` | ride n rider |
//! | `STOP_RIDE` | ride x y time |
//! | `BILL` | ride |
//!
//! Coordinates and time are finite floats in any notation `f64` accepts.
//! `n` is any integer; range checks happen when the ride starts.
//! Extra trailing arguments are ignored.

use crate::base::{DriverId, Position, RideId, RiderId};
use crate::error::CommandError;
use crate::ride::Bill;
use std::fmt;
use std::num::IntErrorKind;

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    AddDriver {
        driver_id: DriverId,
        position: Position,
    },
    AddRider {
        rider_id: RiderId,
        position: Position,
    },
    Match {
        rider_id: RiderId,
    },
    StartRide {
        ride_id: RideId,
        n: i64,
        rider_id: RiderId,
    },
    StopRide {
        ride_id: RideId,
        destination: Position,
        elapsed: f64,
    },
    Bill {
        ride_id: RideId,
    },
}

impl Command {
    /// Parses a tokenised line. The first token is the command name.
    ///
    /// # Errors
    ///
    /// - [`CommandError::UnknownCommand`] - unrecognised or missing command name.
    /// - [`CommandError::MissingArgument`] - too few arguments.
    /// - [`CommandError::InvalidNumber`] - a numeric argument does not parse.
    pub fn parse<S: AsRef<str>>(tokens: &[S]) -> Result<Self, CommandError> {
        let Some((name, args)) = tokens.split_first() else {
            return Err(CommandError::UnknownCommand(String::new()));
        };
        let args: Vec<&str> = args.iter().map(AsRef::as_ref).collect();

        match name.as_ref() {
            "ADD_DRIVER" => {
                let [id, x, y] = arguments::<3>("ADD_DRIVER", &args)?;
                Ok(Self::AddDriver {
                    driver_id: DriverId::from(id),
                    position: Position::new(finite("x", x)?, finite("y", y)?),
                })
            }
            "ADD_RIDER" => {
                let [id, x, y] = arguments::<3>("ADD_RIDER", &args)?;
                Ok(Self::AddRider {
                    rider_id: RiderId::from(id),
                    position: Position::new(finite("x", x)?, finite("y", y)?),
                })
            }
            "MATCH" => {
                let [rider] = arguments::<1>("MATCH", &args)?;
                Ok(Self::Match {
                    rider_id: RiderId::from(rider),
                })
            }
            "START_RIDE" => {
                let [ride, n, rider] = arguments::<3>("START_RIDE", &args)?;
                Ok(Self::StartRide {
                    ride_id: RideId::from(ride),
                    n: rank(n)?,
                    rider_id: RiderId::from(rider),
                })
            }
            "STOP_RIDE" => {
                let [ride, x, y, time] = arguments::<4>("STOP_RIDE", &args)?;
                Ok(Self::StopRide {
                    ride_id: RideId::from(ride),
                    destination: Position::new(finite("x", x)?, finite("y", y)?),
                    elapsed: finite("time", time)?,
                })
            }
            "BILL" => {
                let [ride] = arguments::<1>("BILL", &args)?;
                Ok(Self::Bill {
                    ride_id: RideId::from(ride),
                })
            }
            other => Err(CommandError::UnknownCommand(other.to_owned())),
        }
    }
}

fn arguments<'a, const N: usize>(
    command: &'static str,
    args: &[&'a str],
) -> Result<[&'a str; N], CommandError> {
    args.get(..N)
        .and_then(|slice| <[&str; N]>::try_from(slice).ok())
        .ok_or(CommandError::MissingArgument {
            command,
            expected: N,
            found: args.len(),
        })
}

fn invalid(field: &'static str, value: &str) -> CommandError {
    CommandError::InvalidNumber {
        field,
        value: value.to_owned(),
    }
}

/// Parses a driver rank. Integers too large for `i64` saturate so they are
/// still reported as out of range rather than malformed.
fn rank(value: &str) -> Result<i64, CommandError> {
    match value.parse::<i64>() {
        Ok(n) => Ok(n),
        Err(e) => match e.kind() {
            IntErrorKind::PosOverflow => Ok(i64::MAX),
            IntErrorKind::NegOverflow => Ok(i64::MIN),
            _ => Err(invalid("n", value)),
        },
    }
}

fn finite(field: &'static str, value: &str) -> Result<f64, CommandError> {
    value
        .parse::<f64>()
        .ok()
        .filter(|parsed| parsed.is_finite())
        .ok_or_else(|| invalid(field, value))
}

/// Result of executing one command.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Nothing is written.
    Silent,
    DriversMatched(Vec<DriverId>),
    NoDriversAvailable,
    RideStarted(RideId),
    RideStopped(RideId),
    Billed(Bill),
    InvalidRide,
    InvalidRider,
    InvalidCommand,
}

impl Outcome {
    /// Output fields for this outcome, or `None` if nothing is written.
    pub fn to_record(&self) -> Option<Vec<String>> {
        let record = match self {
            Self::Silent => return None,
            Self::DriversMatched(drivers) => std::iter::once("DRIVERS_MATCHED".to_owned())
                .chain(drivers.iter().map(ToString::to_string))
                .collect(),
            Self::NoDriversAvailable => vec!["NO_DRIVERS_AVAILABLE".to_owned()],
            Self::RideStarted(ride_id) => vec!["RIDE_STARTED".to_owned(), ride_id.to_string()],
            Self::RideStopped(ride_id) => vec!["RIDE_STOPPED".to_owned(), ride_id.to_string()],
            Self::Billed(bill) => vec![
                "BILL".to_owned(),
                bill.ride_id.to_string(),
                bill.driver_id.to_string(),
                format!("{:.2}", bill.amount),
            ],
            Self::InvalidRide => vec!["INVALID_RIDE".to_owned()],
            Self::InvalidRider => vec!["INVALID_RIDER".to_owned()],
            Self::InvalidCommand => vec!["INVALID_COMMAND".to_owned()],
        };
        Some(record)
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_record() {
            Some(record) => f.write_str(&record.join(" ")),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn parse_add_driver() {
        let command = Command::parse(&["ADD_DRIVER", "D1", "0", "-2.5"]).unwrap();
        assert_eq!(
            command,
            Command::AddDriver {
                driver_id: DriverId::from("D1"),
                position: Position::new(0.0, -2.5),
            }
        );
    }

    #[test]
    fn parse_start_ride() {
        let command = Command::parse(&["START_RIDE", "RIDE-001", "2", "R1"]).unwrap();
        assert_eq!(
            command,
            Command::StartRide {
                ride_id: RideId::from("RIDE-001"),
                n: 2,
                rider_id: RiderId::from("R1"),
            }
        );
    }

    #[test]
    fn parse_stop_ride_keeps_fractional_time() {
        let command = Command::parse(&["STOP_RIDE", "RIDE-001", "3", "15", "30.5"]).unwrap();
        assert_eq!(
            command,
            Command::StopRide {
                ride_id: RideId::from("RIDE-001"),
                destination: Position::new(3.0, 15.0),
                elapsed: 30.5,
            }
        );
    }

    #[test]
    fn time_accepts_any_float_notation() {
        for (value, expected) in [("1e2", 100.0), ("2.5E1", 25.0), (".5", 0.5), ("-3", -3.0)] {
            let command = Command::parse(&["STOP_RIDE", "RIDE-1", "0", "0", value]).unwrap();
            assert!(
                matches!(command, Command::StopRide { elapsed, .. } if elapsed == expected),
                "{value}"
            );
        }
        assert_eq!(
            Command::parse(&["STOP_RIDE", "RIDE-1", "0", "0", "inf"]),
            Err(CommandError::InvalidNumber {
                field: "time",
                value: "inf".into()
            })
        );
    }

    #[test]
    fn rank_keeps_sign_and_saturates() {
        let rank_of = |n: &str| match Command::parse(&["START_RIDE", "RIDE-1", n, "R1"]) {
            Ok(Command::StartRide { n, .. }) => Some(n),
            _ => None,
        };
        assert_eq!(rank_of("-1"), Some(-1));
        assert_eq!(rank_of("0"), Some(0));
        assert_eq!(rank_of("+3"), Some(3));
        assert_eq!(rank_of("99999999999999999999999"), Some(i64::MAX));
        assert_eq!(rank_of("-99999999999999999999999"), Some(i64::MIN));
        assert_eq!(rank_of("two"), None);
    }

    #[test]
    fn extra_arguments_are_ignored() {
        let command = Command::parse(&["BILL", "RIDE-001", "extra"]).unwrap();
        assert_eq!(
            command,
            Command::Bill {
                ride_id: RideId::from("RIDE-001")
            }
        );
    }

    #[test]
    fn unknown_command_is_rejected() {
        assert_eq!(
            Command::parse(&["TELEPORT", "R1"]),
            Err(CommandError::UnknownCommand("TELEPORT".into()))
        );
        assert_eq!(
            Command::parse::<&str>(&[]),
            Err(CommandError::UnknownCommand(String::new()))
        );
    }

    #[test]
    fn command_names_are_case_sensitive() {
        assert!(matches!(
            Command::parse(&["match", "R1"]),
            Err(CommandError::UnknownCommand(_))
        ));
    }

    #[test]
    fn missing_arguments_are_rejected() {
        assert_eq!(
            Command::parse(&["ADD_RIDER", "R1", "4"]),
            Err(CommandError::MissingArgument {
                command: "ADD_RIDER",
                expected: 3,
                found: 2
            })
        );
    }

    #[test]
    fn malformed_numbers_are_rejected() {
        assert_eq!(
            Command::parse(&["ADD_DRIVER", "D1", "zero", "0"]),
            Err(CommandError::InvalidNumber {
                field: "x",
                value: "zero".into()
            })
        );
        assert_eq!(
            Command::parse(&["START_RIDE", "RIDE-1", "1.5", "R1"]),
            Err(CommandError::InvalidNumber {
                field: "n",
                value: "1.5".into()
            })
        );
        assert_eq!(
            Command::parse(&["STOP_RIDE", "RIDE-1", "1", "1", "soon"]),
            Err(CommandError::InvalidNumber {
                field: "time",
                value: "soon".into()
            })
        );
    }

    #[test]
    fn non_finite_coordinates_are_rejected() {
        for value in ["NaN", "inf", "-infinity"] {
            assert_eq!(
                Command::parse(&["ADD_RIDER", "R1", value, "0"]),
                Err(CommandError::InvalidNumber {
                    field: "x",
                    value: value.into()
                })
            );
        }
    }

    #[test]
    fn outcome_lines() {
        let matched = Outcome::DriversMatched(vec![DriverId::from("D1"), DriverId::from("D3")]);
        assert_eq!(matched.to_string(), "DRIVERS_MATCHED D1 D3");
        assert_eq!(Outcome::NoDriversAvailable.to_string(), "NO_DRIVERS_AVAILABLE");
        assert_eq!(
            Outcome::RideStarted(RideId::from("RIDE-1")).to_string(),
            "RIDE_STARTED RIDE-1"
        );
        assert_eq!(
            Outcome::RideStopped(RideId::from("RIDE-1")).to_string(),
            "RIDE_STOPPED RIDE-1"
        );
        assert_eq!(Outcome::InvalidRide.to_string(), "INVALID_RIDE");
        assert_eq!(Outcome::InvalidRider.to_string(), "INVALID_RIDER");
        assert_eq!(Outcome::InvalidCommand.to_string(), "INVALID_COMMAND");
        assert_eq!(Outcome::Silent.to_record(), None);
    }

    #[test]
    fn bill_amount_always_has_two_decimals() {
        let bill = Outcome::Billed(Bill {
            ride_id: RideId::from("RIDE-1"),
            driver_id: DriverId::from("D1"),
            amount: dec!(60),
        });
        assert_eq!(bill.to_string(), "BILL RIDE-1 D1 60.00");
    }
}
