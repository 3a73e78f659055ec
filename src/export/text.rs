use std::io::Write;
use std::path::Path;

use super::ExportError;
use crate::models::OptimizationResult;

/// Format seconds as h:mm:ss
pub fn format_duration(seconds: f64) -> String {
    let total = seconds.max(0.0).round() as u64;
    format!("{}:{:02}:{:02}", total / 3600, (total % 3600) / 60, total % 60)
}

/// Write a pacing plan as a human-readable report
pub fn write_plan_report<W: Write>(result: &OptimizationResult, out: &mut W) -> std::io::Result<()> {
    let metrics = &result.metrics;

    writeln!(out, "=")?;
    writeln!(out, "PACING PLAN")?;
    writeln!(out, "=")?;
    writeln!(out)?;

    writeln!(out, "RIDE SUMMARY")?;
    writeln!(out, "-")?;
    writeln!(out, "Distance: {:.2} km", metrics.total_distance_km)?;
    writeln!(out, "Estimated Time: {}", format_duration(metrics.total_time))?;
    writeln!(out, "Average Speed: {:.1} km/h", metrics.avg_speed)?;
    writeln!(out, "Segments: {}", result.segments.len())?;
    writeln!(out)?;

    writeln!(out, "EFFORT")?;
    writeln!(out, "-")?;
    writeln!(out, "Average Power: {:.0} W", metrics.avg_power)?;
    writeln!(out, "Normalized Power: {:.0} W", metrics.normalized_power)?;
    writeln!(out, "Intensity Factor: {:.2}", metrics.intensity_factor)?;
    writeln!(out, "Variability Index: {:.2}", metrics.variability_index)?;
    writeln!(out, "Training Stress Score: {:.0}", metrics.training_stress_score)?;
    writeln!(out, "Work: {:.0} kJ", metrics.total_work_kj)?;
    writeln!(out)?;

    writeln!(out, "W' RESERVE")?;
    writeln!(out, "-")?;
    writeln!(out, "Lowest Balance: {:.0} J ({:.0}%)", metrics.min_w_balance, metrics.w_prime_percent)?;
    writeln!(out, "Segments Held at Base Power: {}", metrics.overridden_segments)?;
    writeln!(out)?;

    writeln!(out, "SEGMENTS")?;
    writeln!(out, "-")?;
    writeln!(
        out,
        "{:>4} {:>8} {:>7} {:>8} {:>7} {:>9} {:>8}",
        "#", "km", "grade%", "wind", "watts", "W' bal", "elapsed"
    )?;
    for (index, planned) in result.segments.iter().enumerate() {
        writeln!(
            out,
            "{:>4} {:>8.2} {:>7.1} {:>8.1} {:>7.0} {:>9.0} {:>8}{}",
            index + 1,
            planned.segment.cumulative_distance / 1000.0,
            planned.segment.gradient_percent(),
            planned.headwind,
            planned.optimized_power,
            planned.w_balance,
            format_duration(planned.elapsed_time),
            if planned.overridden { " *" } else { "" }
        )?;
    }

    if metrics.overridden_segments > 0 {
        writeln!(out)?;
        writeln!(out, "* held at base power to protect W'")?;
    }

    Ok(())
}

/// Export a pacing plan to a text report file
pub fn export_plan_report<P: AsRef<Path>>(
    result: &OptimizationResult,
    output_path: P,
) -> Result<(), ExportError> {
    let mut file = std::fs::File::create(output_path)?;
    write_plan_report(result, &mut file)?;
    Ok(())
}
