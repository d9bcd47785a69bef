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

//! Fare calculation.
//!
//! ```text
//! distance_fare = per_distance * fixed(distance)
//! subtotal      = base + distance_fare + per_time * elapsed
//! tax           = tax_rate * fixed(subtotal)
//! fare          = fixed(subtotal + tax)
//! ```
//!
//! Rates, subtotal and tax are carried in `f64`. `fixed` rounds the exact
//! binary value of an `f64` to cents, half away from zero, so a subtotal
//! stored as `50.84499...` rounds down even though it prints as `50.845`.
//! Both intermediate roundings are part of the tariff: rounding only the
//! final amount gives different results.
//!
//! # Example
//!
//! ```
//! use ride_dispatch::fare::{Tariff, compute_fare};
//! use rust_decimal_macros::dec;
//!
//! let fare = compute_fare(170f64.sqrt(), 30.0, &Tariff::default()).unwrap();
//! assert_eq!(fare, dec!(233.71));
//! ```

use crate::error::DispatchError;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Rates applied to a ride.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct Tariff {
    /// Flat charge per ride.
    pub base: f64,
    /// Charge per unit of distance.
    pub per_distance: f64,
    /// Charge per unit of elapsed time.
    pub per_time: f64,
    /// Service tax applied to the rounded subtotal.
    pub tax_rate: f64,
}

impl Tariff {
    pub const BASE: f64 = 50.0;
    pub const PER_DISTANCE: f64 = 6.5;
    pub const PER_TIME: f64 = 2.0;
    pub const TAX_RATE: f64 = 0.2;
}

impl Default for Tariff {
    fn default() -> Self {
        Self {
            base: Self::BASE,
            per_distance: Self::PER_DISTANCE,
            per_time: Self::PER_TIME,
            tax_rate: Self::TAX_RATE,
        }
    }
}

const FARE_PRECISION: u32 = 2;

/// Rounds the exact value of `value` to cents, always keeping two decimal places.
fn fixed(value: f64) -> Result<Decimal, DispatchError> {
    let exact = Decimal::from_f64_retain(value).ok_or(DispatchError::FareOutOfRange)?;
    let mut cents =
        exact.round_dp_with_strategy(FARE_PRECISION, RoundingStrategy::MidpointAwayFromZero);
    cents.rescale(FARE_PRECISION);
    Ok(cents)
}

/// Rounds `value` to cents and reads the result back as the nearest `f64`.
fn fixed_f64(value: f64) -> Result<f64, DispatchError> {
    fixed(value)?
        .to_string()
        .parse()
        .map_err(|_| DispatchError::FareOutOfRange)
}

/// Computes the fare for a ride of `distance` units that took `elapsed` time units.
///
/// # Errors
///
/// Returns [`DispatchError::FareOutOfRange`] if the distance or any
/// intermediate amount is not finite or does not fit a `Decimal`.
pub fn compute_fare(
    distance: f64,
    elapsed: f64,
    tariff: &Tariff,
) -> Result<Decimal, DispatchError> {
    let distance_fare = tariff.per_distance * fixed_f64(distance)?;
    let subtotal = tariff.base + distance_fare + tariff.per_time * elapsed;
    let tax = tariff.tax_rate * fixed_f64(subtotal)?;

    fixed(subtotal + tax)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn fare(distance: f64, elapsed: f64) -> Decimal {
        compute_fare(distance, elapsed, &Tariff::default()).unwrap()
    }

    #[test]
    fn default_tariff_rates() {
        let tariff = Tariff::default();
        assert_eq!(tariff.base, 50.0);
        assert_eq!(tariff.per_distance, 6.5);
        assert_eq!(tariff.per_time, 2.0);
        assert_eq!(tariff.tax_rate, 0.2);
    }

    #[test]
    fn zero_ride_costs_base_plus_tax() {
        let amount = fare(0.0, 0.0);
        assert_eq!(amount, dec!(60.00));
        assert_eq!(amount.to_string(), "60.00");
    }

    #[test]
    fn reference_ride_fare() {
        // (2, 2) -> (3, 15): sqrt(170) = 13.0384 -> 13.04
        let amount = fare(170f64.sqrt(), 30.0);
        assert_eq!(amount, dec!(233.71));
        assert_eq!(format!("{amount:.2}"), "233.71");
    }

    #[test]
    fn diagonal_ride_fares() {
        // (0, 0) -> (2, 2): sqrt(8) = 2.828 -> 2.83
        let diagonal = 8f64.sqrt();
        assert_eq!(fare(diagonal, 0.0), dec!(82.07));
        assert_eq!(fare(diagonal, 5.0), dec!(94.07));
        assert_eq!(fare(diagonal, 1.0), dec!(84.47));
    }

    #[test]
    fn distance_is_rounded_before_pricing() {
        // 0.125 -> 0.13, but 6.5 * 0.13 is stored as 0.84499..., so the
        // subtotal 50.84499... is taxed as 50.84: 50.845 + 10.168 = 61.013.
        assert_eq!(fare(0.125, 0.0), dec!(61.01));
    }

    #[test]
    fn distance_rounding_uses_exact_binary_value() {
        // 1.005 is stored just below the midpoint.
        assert_eq!(fare(1.005, 0.0), dec!(67.80));
    }

    #[test]
    fn subtotal_is_rounded_before_tax() {
        // Subtotal 50.065 is stored as 50.06499... and taxed as 50.06:
        // 50.065 + 10.012 = 60.077.
        assert_eq!(fare(0.01, 0.0), dec!(60.08));
    }

    #[test]
    fn fractional_time_is_priced() {
        assert_eq!(fare(0.0, 1.5), dec!(63.60));
        assert_eq!(fare(0.0, 100.0), dec!(300.00));
    }

    #[test]
    fn non_finite_distance_is_rejected() {
        let tariff = Tariff::default();
        assert_eq!(
            compute_fare(f64::INFINITY, 0.0, &tariff),
            Err(DispatchError::FareOutOfRange)
        );
        assert_eq!(
            compute_fare(f64::NAN, 0.0, &tariff),
            Err(DispatchError::FareOutOfRange)
        );
    }

    #[test]
    fn overflowing_time_is_rejected() {
        let tariff = Tariff::default();
        assert_eq!(
            compute_fare(0.0, f64::MAX, &tariff),
            Err(DispatchError::FareOutOfRange)
        );
        assert_eq!(
            compute_fare(0.0, 1e30, &tariff),
            Err(DispatchError::FareOutOfRange)
        );
    }

    #[test]
    fn custom_tariff_is_applied() {
        let tariff = Tariff {
            base: 10.0,
            per_distance: 1.0,
            per_time: 0.0,
            tax_rate: 0.0,
        };
        assert_eq!(compute_fare(5.0, 100.0, &tariff).unwrap(), dec!(15));
    }
}
