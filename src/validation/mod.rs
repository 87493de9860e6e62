// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Brush validation: structural checks and randomized construction

pub mod checks;
pub mod fuzzer;

pub use checks::{check_round_trip, check_topology, RoundTripReport, TopologyProblem, TopologyReport};
pub use fuzzer::{same_solid, FuzzCase, FuzzFailure, Fuzzer, FuzzerConfig};
