// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! CLI output reporter with colored formatting

use crate::brush::Brush;
use crate::geometry::DropReason;
use crate::validation::{RoundTripReport, TopologyReport};
use colored::*;
use std::time::Duration;

/// CLI reporter for formatted output
pub struct Reporter;

impl Reporter {
    /// Report a built brush
    pub fn report_brush(file: &str, brush: &Brush, duration: Duration) {
        println!("\n{}", "━".repeat(80).bright_black());
        println!("{} {}", "Brush:".bold(), file.cyan());
        println!("{}", "━".repeat(80).bright_black());

        let geometry = brush.geometry();
        println!(
            "  {} {}",
            "Planes:".bright_black(),
            brush.planes().len().to_string().cyan()
        );
        println!(
            "  {} {} / {} / {}",
            "V / E / F:".bright_black(),
            geometry.vertex_count().to_string().cyan(),
            geometry.edge_count().to_string().cyan(),
            geometry.face_count().to_string().cyan()
        );
        let bounds = brush.logical_bounds();
        println!(
            "  {} ({:.3}, {:.3}, {:.3}) .. ({:.3}, {:.3}, {:.3})",
            "Bounds:".bright_black(),
            bounds.min.x,
            bounds.min.y,
            bounds.min.z,
            bounds.max.x,
            bounds.max.y,
            bounds.max.z
        );
        println!("  {} {:.3}", "Volume:".bright_black(), brush.volume());

        for dropped in &brush.build_report().dropped {
            let reason = match dropped.reason {
                DropReason::Duplicate { of } => format!("duplicate of plane {}", of),
                DropReason::NoVertices => "does not touch the solid".to_string(),
                DropReason::TooFewVertices(n) => format!("touches the solid at {} vertices", n),
            };
            println!(
                "  {} plane {} {}",
                "Dropped:".yellow(),
                dropped.index,
                reason.bright_black()
            );
        }

        println!(
            "  {} {}",
            "Time:".bright_black(),
            Self::format_duration(duration).yellow()
        );
        println!("{}", "━".repeat(80).bright_black());
    }

    /// Report validation checks for one brush
    pub fn report_validation(file: &str, topology: &TopologyReport, round_trip: &RoundTripReport, ok: bool) {
        if ok {
            println!("{} {}", "✅".green(), file.green());
            return;
        }
        println!("{} {}", "❌".red(), file.red().bold());
        for problem in &topology.problems {
            println!("    {}", problem.to_string().bright_black());
        }
        if round_trip.original != round_trip.rebuilt {
            println!(
                "    {} {:?} vs {:?}",
                "round trip changed V/E/F:".bright_black(),
                round_trip.original,
                round_trip.rebuilt
            );
        }
    }

    /// Report fuzzing totals
    pub fn report_fuzz(passed: usize, failed: usize, duration: Duration) {
        println!("\n{}", "Fuzzing:".bold());
        println!(
            "  {} {} | {} {} | {} {}",
            "Passed:".bright_black(),
            passed.to_string().green(),
            "Failed:".bright_black(),
            if failed == 0 {
                failed.to_string().green()
            } else {
                failed.to_string().red()
            },
            "Time:".bright_black(),
            Self::format_duration(duration).yellow()
        );
    }

    /// Report error
    pub fn report_error(message: &str) {
        eprintln!("\n{} {}", "❌ Error:".red().bold(), message);
    }

    /// Report warning
    pub fn report_warning(message: &str) {
        println!("\n{} {}", "⚠️  Warning:".yellow().bold(), message);
    }

    /// Format duration for display
    fn format_duration(duration: Duration) -> String {
        let micros = duration.as_micros();

        if micros < 1_000 {
            format!("{}µs", micros)
        } else if micros < 1_000_000 {
            format!("{:.2}ms", micros as f64 / 1_000.0)
        } else {
            format!("{:.2}s", micros as f64 / 1_000_000.0)
        }
    }

    /// Print success message
    pub fn success(message: &str) {
        println!("{} {}", "✅".green(), message.green());
    }
}
