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

//! Dispatch configuration.

use crate::fare::Tariff;

/// Tunables for matching, driver selection and billing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DispatchConfig {
    /// Drivers strictly closer than this are candidates for `MATCH`.
    pub match_radius: f64,
    /// Maximum number of drivers returned by `MATCH`.
    pub match_limit: usize,
    /// Highest driver rank `START_RIDE` accepts.
    pub max_selection: usize,
    pub tariff: Tariff,
}

impl DispatchConfig {
    pub const MATCH_RADIUS: f64 = 5.0;
    pub const MATCH_LIMIT: usize = 5;
    pub const MAX_SELECTION: usize = 5;
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            match_radius: Self::MATCH_RADIUS,
            match_limit: Self::MATCH_LIMIT,
            max_selection: Self::MAX_SELECTION,
            tariff: Tariff::default(),
        }
    }
}
