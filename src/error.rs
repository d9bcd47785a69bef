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

//! Error types for dispatch operations and command parsing.

use crate::base::{DriverId, RideId, RiderId};
use thiserror::Error;

/// Dispatch processing errors.
///
/// Each variant is an internal reason code. At the command boundary several
/// of them collapse into the same uniform signal (see [`DispatchError::signal`]).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    /// A driver with this ID is already registered
    #[error("driver {0} already registered")]
    DuplicateDriver(DriverId),

    /// A rider with this ID is already registered
    #[error("rider {0} already registered")]
    DuplicateRider(RiderId),

    /// Referenced rider does not exist
    #[error("rider {0} not found")]
    UnknownRider(RiderId),

    /// Referenced driver does not exist
    #[error("driver {0} not found")]
    UnknownDriver(DriverId),

    /// Referenced ride does not exist
    #[error("ride {0} not found")]
    UnknownRide(RideId),

    /// Ride ID has already been used
    #[error("ride {0} already exists")]
    DuplicateRide(RideId),

    /// Requested driver rank is outside `1..=max`
    #[error("driver rank {requested} outside 1..={max}")]
    SelectionOutOfRange { requested: i64, max: usize },

    /// Fewer available drivers than the requested rank
    #[error("requested driver rank {requested} but only {available} available")]
    InsufficientDrivers { requested: usize, available: usize },

    /// Ride has not been stopped yet
    #[error("ride {0} has not been stopped")]
    RideNotStopped(RideId),

    /// Ride has already been billed and is closed
    #[error("ride {0} already billed")]
    RideAlreadyBilled(RideId),

    /// Fare arithmetic exceeded the representable range
    #[error("fare out of range")]
    FareOutOfRange,
}

/// Uniform externally visible failure signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    /// Nothing is emitted.
    Silent,
    InvalidRide,
}

impl DispatchError {
    /// Maps the reason code to the signal emitted at the command boundary.
    ///
    /// Duplicate registrations are ignored silently; the ride commands report
    /// every failure as `INVALID_RIDE`. `MATCH` reports its only failure, an
    /// unknown rider, as `INVALID_RIDER` without going through this mapping.
    pub fn signal(&self) -> Signal {
        match self {
            Self::DuplicateDriver(_) | Self::DuplicateRider(_) => Signal::Silent,
            _ => Signal::InvalidRide,
        }
    }
}

/// Errors raised while turning an input line into a command.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// Command name is not recognised
    #[error("unknown command {0:?}")]
    UnknownCommand(String),

    /// Fewer arguments than the command requires
    #[error("{command} expects {expected} arguments, found {found}")]
    MissingArgument {
        command: &'static str,
        expected: usize,
        found: usize,
    },

    /// Argument could not be parsed as a number
    #[error("invalid {field}: {value:?}")]
    InvalidNumber { field: &'static str, value: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_messages() {
        assert_eq!(
            DispatchError::DuplicateDriver(DriverId::from("D1")).to_string(),
            "driver D1 already registered"
        );
        assert_eq!(
            DispatchError::UnknownRider(RiderId::from("R9")).to_string(),
            "rider R9 not found"
        );
        assert_eq!(
            DispatchError::SelectionOutOfRange { requested: 6, max: 5 }.to_string(),
            "driver rank 6 outside 1..=5"
        );
        assert_eq!(
            DispatchError::InsufficientDrivers {
                requested: 3,
                available: 1
            }
            .to_string(),
            "requested driver rank 3 but only 1 available"
        );
        assert_eq!(
            DispatchError::RideNotStopped(RideId::from("RIDE-1")).to_string(),
            "ride RIDE-1 has not been stopped"
        );
        assert_eq!(
            CommandError::MissingArgument {
                command: "BILL",
                expected: 1,
                found: 0
            }
            .to_string(),
            "BILL expects 1 arguments, found 0"
        );
        assert_eq!(
            CommandError::InvalidNumber {
                field: "x",
                value: "abc".into()
            }
            .to_string(),
            "invalid x: \"abc\""
        );
    }

    #[test]
    fn duplicates_are_silent() {
        assert_eq!(
            DispatchError::DuplicateRider(RiderId::from("R1")).signal(),
            Signal::Silent
        );
        assert_eq!(
            DispatchError::DuplicateDriver(DriverId::from("D1")).signal(),
            Signal::Silent
        );
    }

    #[test]
    fn ride_failures_share_one_signal() {
        let failures = [
            DispatchError::DuplicateRide(RideId::from("R")),
            DispatchError::UnknownRider(RiderId::from("R")),
            DispatchError::SelectionOutOfRange {
                requested: -1,
                max: 5,
            },
            DispatchError::InsufficientDrivers {
                requested: 2,
                available: 1,
            },
            DispatchError::UnknownRide(RideId::from("R")),
            DispatchError::RideNotStopped(RideId::from("R")),
        ];
        for failure in failures {
            assert_eq!(failure.signal(), Signal::InvalidRide, "{failure}");
        }
    }

    #[test]
    fn errors_are_cloneable() {
        let error = DispatchError::FareOutOfRange;
        let cloned = error.clone();
        assert_eq!(error, cloned);
    }
}
