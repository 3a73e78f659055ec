use std::io::Write;
use std::path::Path;

use super::ExportError;
use crate::models::OptimizationResult;

/// Export a full pacing plan to JSON format
pub fn export_plan<P: AsRef<Path>>(
    result: &OptimizationResult,
    output_path: P,
) -> Result<(), ExportError> {
    export_json(result, output_path)
}

/// Export any serializable data structure to JSON
pub fn export_json<T, P>(data: &T, output_path: P) -> Result<(), ExportError>
where
    T: serde::Serialize,
    P: AsRef<Path>,
{
    let json_data = serde_json::to_string_pretty(data)
        .map_err(|e| ExportError::SerializationError(e.to_string()))?;

    let mut file = std::fs::File::create(output_path)?;
    file.write_all(json_data.as_bytes())?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::test_support::sample_result;
    use tempfile::NamedTempFile;

    #[test]
    fn test_export_plan() {
        let result = sample_result();
        let temp_file = NamedTempFile::new().unwrap();

        export_plan(&result, temp_file.path()).unwrap();

        let content = std::fs::read_to_string(temp_file.path()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&content).unwrap();

        assert_eq!(value["metrics"]["overridden_segments"], 1);
        // segment fields sit beside the plan fields
        assert_eq!(value["segments"][1]["gradient"], 0.05);
        assert_eq!(value["segments"][1]["overridden"], true);

        let parsed: OptimizationResult = serde_json::from_str(&content).unwrap();
        assert_eq!(parsed.segments.len(), result.segments.len());
        assert_eq!(parsed.segments[0].segment.distance, 100.0);
        assert_eq!(parsed.metrics.overridden_segments, 1);
    }
}
