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

//! # Ride Dispatch
//!
//! This library provides a ride dispatch engine: it registers drivers and
//! riders, matches riders to nearby available drivers, runs each ride through
//! its lifecycle (start, stop, bill) and computes fares.
//!
//! ## Core Components
//!
//! - [`Dispatcher`]: Context object owning all state and executing commands
//! - [`Registry`]: Drivers and riders keyed by ID
//! - [`RideLedger`]: Rides keyed by ID, driving the ride state machine
//! - [`matcher`]: Distance ranking of available drivers
//! - [`fare`]: Fare calculation with two-stage rounding
//! - [`Command`] / [`Outcome`]: Parsed input lines and the lines they produce
//!
//! ## Example
//!
//! ```
//! use ride_dispatch::{Dispatcher, DriverId, Position, RideId, RiderId};
//! use rust_decimal_macros::dec;
//!
//! let mut dispatcher = Dispatcher::new();
//! dispatcher.add_driver(DriverId::from("D1"), Position::new(0.0, 0.0)).unwrap();
//! dispatcher.add_rider(RiderId::from("R1"), Position::new(2.0, 2.0)).unwrap();
//!
//! let matched = dispatcher.match_rider(&RiderId::from("R1")).unwrap();
//! assert_eq!(matched, vec![DriverId::from("D1")]);
//!
//! let ride = RideId::from("RIDE-001");
//! dispatcher.start_ride(ride.clone(), 1, RiderId::from("R1")).unwrap();
//! dispatcher.stop_ride(&ride, Position::new(3.0, 15.0), 30.0).unwrap();
//!
//! let bill = dispatcher.bill(&ride).unwrap();
//! assert_eq!(bill.amount, dec!(233.71));
//! ```
//!
//! ## Thread Safety
//!
//! [`Dispatcher`] is single-owner and not safe for concurrent mutation.
//! Wrap it in a [`SharedDispatcher`] to issue commands from several threads.

mod base;
pub mod command;
pub mod config;
mod engine;
pub mod error;
pub mod fare;
pub mod geometry;
pub mod matcher;
pub mod registry;
pub mod ride;

pub use base::{DriverId, Position, RideId, RiderId};
pub use command::{Command, Outcome};
pub use config::DispatchConfig;
pub use engine::{Dispatcher, SharedDispatcher};
pub use error::{CommandError, DispatchError};
pub use fare::Tariff;
pub use registry::{Driver, DriverStatus, Registry, Rider};
pub use ride::{Bill, Ride, RideLedger, RidePhase, RideSummary};
