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

//! Driver and rider registry.
//!
//! Drivers and riders are registered once and never removed. A second
//! registration with an existing ID is rejected without touching the stored
//! record.
//!
//! # Example
//!
//! ```
//! use ride_dispatch::{DispatchError, DriverId, Position, Registry};
//!
//! let mut registry = Registry::new();
//! registry.add_driver(DriverId::from("D1"), Position::new(0.0, 0.0)).unwrap();
//!
//! let again = registry.add_driver(DriverId::from("D1"), Position::new(9.0, 9.0));
//! assert_eq!(again, Err(DispatchError::DuplicateDriver(DriverId::from("D1"))));
//! assert_eq!(registry.driver_count(), 1);
//! ```

use crate::base::{DriverId, Position, RiderId};
use crate::error::DispatchError;
use serde::Serialize;
use std::collections::HashMap;
use std::collections::hash_map::Entry;

/// Whether a driver can take a new ride.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DriverStatus {
    Available,
    Unavailable,
}

//  Available ──start ride──► Unavailable ──stop ride──► Available
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Driver {
    id: DriverId,
    position: Position,
    status: DriverStatus,
}

impl Driver {
    fn new(id: DriverId, position: Position) -> Self {
        Self {
            id,
            position,
            status: DriverStatus::Available,
        }
    }

    pub fn id(&self) -> &DriverId {
        &self.id
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn status(&self) -> DriverStatus {
        self.status
    }

    pub fn is_available(&self) -> bool {
        self.status == DriverStatus::Available
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Rider {
    id: RiderId,
    position: Position,
}

impl Rider {
    pub fn id(&self) -> &RiderId {
        &self.id
    }

    pub fn position(&self) -> Position {
        self.position
    }
}

/// Registry of drivers and riders, keyed by ID.
///
/// Not synchronised: mutation needs `&mut self`. Share it between threads only
/// behind external locking such as [`crate::SharedDispatcher`].
#[derive(Debug, Default)]
pub struct Registry {
    drivers: HashMap<DriverId, Driver>,
    riders: HashMap<RiderId, Rider>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an available driver.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::DuplicateDriver`] if the ID is taken. The stored
    /// driver is left unchanged.
    pub fn add_driver(&mut self, id: DriverId, position: Position) -> Result<(), DispatchError> {
        match self.drivers.entry(id) {
            Entry::Occupied(entry) => Err(DispatchError::DuplicateDriver(entry.key().clone())),
            Entry::Vacant(entry) => {
                let id = entry.key().clone();
                entry.insert(Driver::new(id, position));
                Ok(())
            }
        }
    }

    /// Registers a rider.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::DuplicateRider`] if the ID is taken.
    pub fn add_rider(&mut self, id: RiderId, position: Position) -> Result<(), DispatchError> {
        match self.riders.entry(id) {
            Entry::Occupied(entry) => Err(DispatchError::DuplicateRider(entry.key().clone())),
            Entry::Vacant(entry) => {
                let id = entry.key().clone();
                entry.insert(Rider { id, position });
                Ok(())
            }
        }
    }

    pub fn driver(&self, id: &DriverId) -> Option<&Driver> {
        self.drivers.get(id)
    }

    pub fn rider(&self, id: &RiderId) -> Option<&Rider> {
        self.riders.get(id)
    }

    /// Returns an iterator over all drivers in arbitrary order.
    pub fn drivers(&self) -> impl Iterator<Item = &Driver> {
        self.drivers.values()
    }

    /// Returns an iterator over drivers that can take a ride.
    pub fn available_drivers(&self) -> impl Iterator<Item = &Driver> {
        self.drivers.values().filter(|driver| driver.is_available())
    }

    pub fn driver_count(&self) -> usize {
        self.drivers.len()
    }

    pub fn rider_count(&self) -> usize {
        self.riders.len()
    }

    /// Flips a driver's availability. Only the ride ledger calls this.
    pub(crate) fn set_driver_status(
        &mut self,
        id: &DriverId,
        status: DriverStatus,
    ) -> Result<(), DispatchError> {
        let driver = self
            .drivers
            .get_mut(id)
            .ok_or_else(|| DispatchError::UnknownDriver(id.clone()))?;
        driver.status = status;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_driver_is_available() {
        let mut registry = Registry::new();
        registry
            .add_driver(DriverId::from("D1"), Position::new(1.0, 2.0))
            .unwrap();

        let driver = registry.driver(&DriverId::from("D1")).unwrap();
        assert_eq!(driver.status(), DriverStatus::Available);
        assert_eq!(driver.position(), Position::new(1.0, 2.0));
    }

    #[test]
    fn set_driver_status_flips_availability() {
        let mut registry = Registry::new();
        let id = DriverId::from("D1");
        registry.add_driver(id.clone(), Position::new(0.0, 0.0)).unwrap();

        registry
            .set_driver_status(&id, DriverStatus::Unavailable)
            .unwrap();
        assert!(!registry.driver(&id).unwrap().is_available());
        assert_eq!(registry.available_drivers().count(), 0);

        registry.set_driver_status(&id, DriverStatus::Available).unwrap();
        assert!(registry.driver(&id).unwrap().is_available());
    }

    #[test]
    fn set_status_of_unknown_driver_fails() {
        let mut registry = Registry::new();
        let result = registry.set_driver_status(&DriverId::from("D9"), DriverStatus::Available);
        assert_eq!(result, Err(DispatchError::UnknownDriver(DriverId::from("D9"))));
    }

    #[test]
    fn status_serializes_in_screaming_case() {
        let json = serde_json::to_string(&DriverStatus::Unavailable).unwrap();
        assert_eq!(json, "\"UNAVAILABLE\"");
    }
}
