// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! CLI subsystem for the brush kernel

pub mod input;
pub mod reporter;

pub use input::{
    load_planes, parse_planes, validate_file, BrushSummary, FileValidation, PlaneInput,
};
pub use reporter::Reporter;
