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

//! Proximity matching of riders to available drivers.
//!
//! Drivers are ranked by straight-line distance from the rider, closest first,
//! with ties broken by ascending driver ID. `MATCH` cuts this ranking at the
//! match radius and limit; `START_RIDE` picks from the full ranking.
//!
//! IDs compare byte-wise, not by locale collation: every uppercase ASCII
//! letter sorts before every lowercase one, so `D2` ranks ahead of `d1`.

use crate::base::{DriverId, Position, RiderId};
use crate::config::DispatchConfig;
use crate::error::DispatchError;
use crate::geometry::distance;
use crate::registry::Registry;
use std::cmp::Ordering;

/// An available driver and its distance from the rider.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub driver_id: DriverId,
    pub distance: f64,
}

impl Candidate {
    fn rank(&self, other: &Self) -> Ordering {
        self.distance
            .total_cmp(&other.distance)
            .then_with(|| self.driver_id.cmp(&other.driver_id))
    }
}

/// Ranks every available driver by distance from `origin`.
pub fn rank_available(registry: &Registry, origin: Position) -> Vec<Candidate> {
    let mut candidates: Vec<Candidate> = registry
        .available_drivers()
        .map(|driver| Candidate {
            driver_id: driver.id().clone(),
            distance: distance(origin, driver.position()),
        })
        .collect();
    candidates.sort_by(Candidate::rank);
    candidates
}

/// Returns up to `config.match_limit` available drivers strictly within
/// `config.match_radius` of the rider, closest first.
///
/// An empty list means no driver is available nearby.
///
/// # Errors
///
/// Returns [`DispatchError::UnknownRider`] if the rider is not registered.
pub fn match_rider(
    registry: &Registry,
    rider_id: &RiderId,
    config: &DispatchConfig,
) -> Result<Vec<DriverId>, DispatchError> {
    let rider = registry
        .rider(rider_id)
        .ok_or_else(|| DispatchError::UnknownRider(rider_id.clone()))?;

    Ok(rank_available(registry, rider.position())
        .into_iter()
        .take_while(|candidate| candidate.distance < config.match_radius)
        .take(config.match_limit)
        .map(|candidate| candidate.driver_id)
        .collect())
}
