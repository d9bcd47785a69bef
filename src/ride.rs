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

//! Ride ledger.
//!
//! Rides follow a state machine:
//! - (unstarted) → [`Active`] (via start, binds the nth-closest available driver)
//! - [`Active`] → [`Stopped`] (via stop, releases the driver)
//! - [`Stopped`] → [`Billed`] (via bill, fixes the fare)
//!
//! A stopped ride may be stopped again, overwriting its destination and
//! elapsed time. Billing a billed ride returns the stored bill. Billed rides
//! are closed to further stops.
//!
//! [`Active`]: RidePhase::Active
//! [`Stopped`]: RidePhase::Stopped
//! [`Billed`]: RidePhase::Billed

use crate::base::{DriverId, Position, RideId, RiderId};
use crate::config::DispatchConfig;
use crate::error::DispatchError;
use crate::fare::compute_fare;
use crate::geometry::distance;
use crate::matcher::rank_available;
use crate::registry::{DriverStatus, Registry};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::HashMap;
use std::collections::hash_map::Entry;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RidePhase {
    Active,
    Stopped,
    Billed,
}

/// A ride bound to one rider and one driver.
#[derive(Debug, Clone, PartialEq)]
pub struct Ride {
    id: RideId,
    rider_id: RiderId,
    driver_id: DriverId,
    destination: Option<Position>,
    elapsed: Option<f64>,
    fare: Option<Decimal>,
    phase: RidePhase,
}

impl Ride {
    pub fn id(&self) -> &RideId {
        &self.id
    }

    pub fn rider_id(&self) -> &RiderId {
        &self.rider_id
    }

    pub fn driver_id(&self) -> &DriverId {
        &self.driver_id
    }

    pub fn destination(&self) -> Option<Position> {
        self.destination
    }

    pub fn elapsed(&self) -> Option<f64> {
        self.elapsed
    }

    /// Fare fixed by the first bill.
    pub fn fare(&self) -> Option<Decimal> {
        self.fare
    }

    pub fn phase(&self) -> RidePhase {
        self.phase
    }

    pub fn summary(&self) -> RideSummary {
        RideSummary {
            ride: self.id.clone(),
            rider: self.rider_id.clone(),
            driver: self.driver_id.clone(),
            phase: self.phase,
            destination_x: self.destination.map(|p| p.x),
            destination_y: self.destination.map(|p| p.y),
            elapsed: self.elapsed,
            fare: self.fare,
        }
    }
}

/// Flat ride record for reports.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RideSummary {
    pub ride: RideId,
    pub rider: RiderId,
    pub driver: DriverId,
    pub phase: RidePhase,
    pub destination_x: Option<f64>,
    pub destination_y: Option<f64>,
    pub elapsed: Option<f64>,
    pub fare: Option<Decimal>,
}

/// Fare owed for a ride.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Bill {
    pub ride_id: RideId,
    pub driver_id: DriverId,
    pub amount: Decimal,
}

/// Ledger of rides indexed by ride ID, remembering creation order.
#[derive(Debug, Default)]
pub struct RideLedger {
    rides: HashMap<RideId, Ride>,
    order: Vec<RideId>,
}

impl RideLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a ride with the `n`th closest available driver (1-indexed).
    ///
    /// The ranking covers every available driver regardless of the match
    /// radius. The chosen driver becomes unavailable.
    ///
    /// # Errors
    ///
    /// - [`DispatchError::DuplicateRide`] - ride ID already used.
    /// - [`DispatchError::UnknownRider`] - rider not registered.
    /// - [`DispatchError::SelectionOutOfRange`] - `n` outside `1..=max_selection`.
    /// - [`DispatchError::InsufficientDrivers`] - fewer than `n` available drivers.
    pub fn start(
        &mut self,
        registry: &mut Registry,
        ride_id: RideId,
        n: i64,
        rider_id: RiderId,
        config: &DispatchConfig,
    ) -> Result<DriverId, DispatchError> {
        let entry = match self.rides.entry(ride_id) {
            Entry::Occupied(entry) => {
                return Err(DispatchError::DuplicateRide(entry.key().clone()));
            }
            Entry::Vacant(entry) => entry,
        };
        let rider = registry
            .rider(&rider_id)
            .ok_or_else(|| DispatchError::UnknownRider(rider_id.clone()))?;
        let rank = usize::try_from(n)
            .ok()
            .filter(|rank| (1..=config.max_selection).contains(rank))
            .ok_or(DispatchError::SelectionOutOfRange {
                requested: n,
                max: config.max_selection,
            })?;

        let ranked = rank_available(registry, rider.position());
        let available = ranked.len();
        let driver_id = ranked
            .into_iter()
            .nth(rank - 1)
            .map(|candidate| candidate.driver_id)
            .ok_or(DispatchError::InsufficientDrivers {
                requested: rank,
                available,
            })?;

        registry.set_driver_status(&driver_id, DriverStatus::Unavailable)?;

        let ride_id = entry.key().clone();
        entry.insert(Ride {
            id: ride_id.clone(),
            rider_id,
            driver_id: driver_id.clone(),
            destination: None,
            elapsed: None,
            fare: None,
            phase: RidePhase::Active,
        });
        self.order.push(ride_id);
        Ok(driver_id)
    }

    /// Stops a ride at `destination` after `elapsed` time units.
    ///
    /// Stopping an active ride releases its driver. Stopping an already
    /// stopped ride only overwrites the destination and elapsed time.
    ///
    /// # Errors
    ///
    /// - [`DispatchError::UnknownRide`] - ride not in the ledger.
    /// - [`DispatchError::RideAlreadyBilled`] - ride is closed.
    pub fn stop(
        &mut self,
        registry: &mut Registry,
        ride_id: &RideId,
        destination: Position,
        elapsed: f64,
    ) -> Result<(), DispatchError> {
        let ride = self
            .rides
            .get_mut(ride_id)
            .ok_or_else(|| DispatchError::UnknownRide(ride_id.clone()))?;

        match ride.phase {
            RidePhase::Billed => return Err(DispatchError::RideAlreadyBilled(ride_id.clone())),
            RidePhase::Active => {
                registry.set_driver_status(&ride.driver_id, DriverStatus::Available)?;
            }
            RidePhase::Stopped => {}
        }

        ride.destination = Some(destination);
        ride.elapsed = Some(elapsed);
        ride.phase = RidePhase::Stopped;
        Ok(())
    }

    /// Bills a stopped ride.
    ///
    /// The distance runs from the rider's registered position to the ride's
    /// destination. The first bill fixes the fare and closes the ride; later
    /// bills return the same amount.
    ///
    /// # Errors
    ///
    /// - [`DispatchError::UnknownRide`] - ride not in the ledger.
    /// - [`DispatchError::RideNotStopped`] - ride is still active.
    /// - [`DispatchError::FareOutOfRange`] - fare overflowed.
    pub fn bill(
        &mut self,
        registry: &Registry,
        ride_id: &RideId,
        config: &DispatchConfig,
    ) -> Result<Bill, DispatchError> {
        let ride = self
            .rides
            .get_mut(ride_id)
            .ok_or_else(|| DispatchError::UnknownRide(ride_id.clone()))?;

        let amount = match (ride.phase, ride.fare) {
            (RidePhase::Billed, Some(fare)) => fare,
            _ => {
                let (Some(destination), Some(elapsed)) = (ride.destination, ride.elapsed) else {
                    return Err(DispatchError::RideNotStopped(ride_id.clone()));
                };
                let rider = registry
                    .rider(&ride.rider_id)
                    .ok_or_else(|| DispatchError::UnknownRider(ride.rider_id.clone()))?;
                let fare = compute_fare(
                    distance(rider.position(), destination),
                    elapsed,
                    &config.tariff,
                )?;
                ride.fare = Some(fare);
                ride.phase = RidePhase::Billed;
                fare
            }
        };

        Ok(Bill {
            ride_id: ride.id.clone(),
            driver_id: ride.driver_id.clone(),
            amount,
        })
    }

    pub fn ride(&self, id: &RideId) -> Option<&Ride> {
        self.rides.get(id)
    }

    /// Returns rides in the order they were started.
    pub fn rides(&self) -> impl Iterator<Item = &Ride> {
        self.order.iter().filter_map(|id| self.rides.get(id))
    }

    pub fn len(&self) -> usize {
        self.rides.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rides.is_empty()
    }
}
