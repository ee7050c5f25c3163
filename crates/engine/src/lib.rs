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

//! hgdb-legup Engine
//!
//! Turns the FSM state to source line mapping recorded by LegUp into hgdb
//! breakpoints. The pipeline has three stages:
//!
//! 1. [`extract`](mod@extract) reads `(state_id, filename, line_number)` rows from the debug
//!    database into an in-memory sequence of [`StateLocation`]s.
//! 2. [`synthesize`](mod@synthesize) groups them by source location and builds one
//!    [`Breakpoint`] per location, guarded by `cur_state == ..` clauses.
//! 3. [`writer`](mod@writer) stores the breakpoints into hgdb's `breakpoint` table.
//!
//! [`Converter`] drives the three stages from a [`ConvertConfig`].
//!
//! [`StateLocation`]: hgdb_legup_common::StateLocation
//! [`Breakpoint`]: hgdb_legup_common::Breakpoint

pub mod config;
pub use config::*;

pub mod pipeline;
pub use pipeline::*;

pub mod extract;
pub use extract::*;

pub mod synthesize;
pub use synthesize::*;

pub mod test_utils;

pub mod writer;
pub use writer::*;
