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

//! Command dispatcher.
//!
//! The [`Dispatcher`] owns the [`Registry`] and the [`RideLedger`] and routes
//! each command to them, one at a time.
//!
//! # Failure handling
//!
//! Every failure is confined to its command. Duplicate registrations are
//! ignored, ride failures of any kind are reported uniformly as
//! `INVALID_RIDE`, and lines that do not parse are `INVALID_COMMAND`. The
//! specific reason is logged at debug level.
//!
//! # Thread Safety
//!
//! [`Dispatcher`] mutates through `&mut self` and has no internal locking.
//! [`SharedDispatcher`] serialises whole commands behind one mutex.

use crate::base::{DriverId, Position, RideId, RiderId};
use crate::command::{Command, Outcome};
use crate::config::DispatchConfig;
use crate::error::{DispatchError, Signal};
use crate::matcher;
use crate::registry::Registry;
use crate::ride::{Bill, RideLedger};
use parking_lot::Mutex;
use tracing::{debug, trace};

/// Dispatch context holding every driver, rider and ride.
#[derive(Debug, Default)]
pub struct Dispatcher {
    config: DispatchConfig,
    registry: Registry,
    ledger: RideLedger,
}

impl Dispatcher {
    /// Creates a dispatcher with the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: DispatchConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &DispatchConfig {
        &self.config
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn ledger(&self) -> &RideLedger {
        &self.ledger
    }

    /// Parses and executes one tokenised input line.
    pub fn execute_line<S: AsRef<str>>(&mut self, tokens: &[S]) -> Outcome {
        match Command::parse(tokens) {
            Ok(command) => self.execute(command),
            Err(e) => {
                debug!(error = %e, "rejected command");
                Outcome::InvalidCommand
            }
        }
    }

    /// Executes a command and returns what should be reported.
    ///
    /// | Command | Success | Failure |
    /// |---------|---------|---------|
    /// | AddDriver / AddRider | silent | silent (duplicate) |
    /// | Match | `DRIVERS_MATCHED ...` or `NO_DRIVERS_AVAILABLE` | `INVALID_RIDER` |
    /// | StartRide | `RIDE_STARTED` | `INVALID_RIDE` |
    /// | StopRide | `RIDE_STOPPED` | `INVALID_RIDE` |
    /// | Bill | `BILL ride driver amount` | `INVALID_RIDE` |
    pub fn execute(&mut self, command: Command) -> Outcome {
        let result = match command {
            Command::AddDriver {
                driver_id,
                position,
            } => self.add_driver(driver_id, position).map(|()| Outcome::Silent),
            Command::AddRider { rider_id, position } => {
                self.add_rider(rider_id, position).map(|()| Outcome::Silent)
            }
            Command::Match { rider_id } => match self.match_rider(&rider_id) {
                Ok(drivers) if drivers.is_empty() => Ok(Outcome::NoDriversAvailable),
                Ok(drivers) => Ok(Outcome::DriversMatched(drivers)),
                Err(e) => {
                    debug!(error = %e, "match rejected");
                    return Outcome::InvalidRider;
                }
            },
            Command::StartRide {
                ride_id,
                n,
                rider_id,
            } => self
                .start_ride(ride_id.clone(), n, rider_id)
                .map(|_| Outcome::RideStarted(ride_id)),
            Command::StopRide {
                ride_id,
                destination,
                elapsed,
            } => self
                .stop_ride(&ride_id, destination, elapsed)
                .map(|()| Outcome::RideStopped(ride_id)),
            Command::Bill { ride_id } => self.bill(&ride_id).map(Outcome::Billed),
        };

        result.unwrap_or_else(|e| {
            debug!(error = %e, "command rejected");
            match e.signal() {
                Signal::Silent => Outcome::Silent,
                Signal::InvalidRide => Outcome::InvalidRide,
            }
        })
    }

    /// Registers a driver. See [`Registry::add_driver`].
    pub fn add_driver(&mut self, id: DriverId, position: Position) -> Result<(), DispatchError> {
        self.registry.add_driver(id.clone(), position)?;
        trace!(driver = %id, %position, "driver registered");
        Ok(())
    }

    /// Registers a rider. See [`Registry::add_rider`].
    pub fn add_rider(&mut self, id: RiderId, position: Position) -> Result<(), DispatchError> {
        self.registry.add_rider(id.clone(), position)?;
        trace!(rider = %id, %position, "rider registered");
        Ok(())
    }

    /// Lists nearby available drivers. See [`matcher::match_rider`].
    pub fn match_rider(&self, rider_id: &RiderId) -> Result<Vec<DriverId>, DispatchError> {
        matcher::match_rider(&self.registry, rider_id, &self.config)
    }

    /// Starts a ride with the `n`th closest driver. See [`RideLedger::start`].
    pub fn start_ride(
        &mut self,
        ride_id: RideId,
        n: i64,
        rider_id: RiderId,
    ) -> Result<DriverId, DispatchError> {
        let driver_id = self.ledger.start(
            &mut self.registry,
            ride_id.clone(),
            n,
            rider_id,
            &self.config,
        )?;
        trace!(ride = %ride_id, driver = %driver_id, "ride started");
        Ok(driver_id)
    }

    /// Stops a ride. See [`RideLedger::stop`].
    pub fn stop_ride(
        &mut self,
        ride_id: &RideId,
        destination: Position,
        elapsed: f64,
    ) -> Result<(), DispatchError> {
        self.ledger
            .stop(&mut self.registry, ride_id, destination, elapsed)?;
        trace!(ride = %ride_id, %destination, elapsed, "ride stopped");
        Ok(())
    }

    /// Bills a stopped ride. See [`RideLedger::bill`].
    pub fn bill(&mut self, ride_id: &RideId) -> Result<Bill, DispatchError> {
        let bill = self.ledger.bill(&self.registry, ride_id, &self.config)?;
        trace!(ride = %ride_id, amount = %bill.amount, "ride billed");
        Ok(bill)
    }
}

/// A [`Dispatcher`] that can be shared between threads.
///
/// One lock guards the whole dispatcher, so each command runs to completion
/// before the next one starts and no driver can be bound twice.
#[derive(Debug, Default)]
pub struct SharedDispatcher {
    inner: Mutex<Dispatcher>,
}

impl SharedDispatcher {
    pub fn new(dispatcher: Dispatcher) -> Self {
        Self {
            inner: Mutex::new(dispatcher),
        }
    }

    pub fn execute(&self, command: Command) -> Outcome {
        self.inner.lock().execute(command)
    }

    pub fn execute_line<S: AsRef<str>>(&self, tokens: &[S]) -> Outcome {
        self.inner.lock().execute_line(tokens)
    }

    /// Runs `f` with shared access to the dispatcher while holding the lock.
    pub fn read<R>(&self, f: impl FnOnce(&Dispatcher) -> R) -> R {
        f(&self.inner.lock())
    }

    pub fn into_inner(self) -> Dispatcher {
        self.inner.into_inner()
    }
}
