// hgdb-legup - LegUp to hgdb debug database converter
// Copyright (C) 2024 Zhuo Zhang and Wuqi Zhang
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

//! hgdb-legup Common - Shared functionality for hgdb-legup components
//!
//! This crate provides the data model shared by the conversion engine and the
//! `inspect2hgdb` binary: raw FSM state locations, validated source locations,
//! breakpoint records with their fire conditions, the error taxonomy and the
//! logging setup.

/// Data model for state locations, source locations and breakpoints
pub mod types;

/// Fire condition rendering over the current FSM state
pub mod condition;
/// Error taxonomy for conversion runs
pub mod error;
/// Logging setup and utilities for consistent logging across hgdb-legup components
pub mod logging;

pub use condition::*;
pub use error::*;
pub use logging::*;
pub use types::*;
