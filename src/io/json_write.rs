use std::fs;
use std::path::Path;

use crate::error::Result;
use crate::model::AggregateResult;

/// Writes the aggregate as indented JSON, creating the parent folder first.
///
/// Any previous file at `path` is replaced.
pub fn write_aggregate(path: &Path, aggregate: &AggregateResult) -> Result<()> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let json_string = serde_json::to_string_pretty(aggregate)?;
    fs::write(path, json_string)?;
    Ok(())
}

/// Loads a document previously produced by [`write_aggregate`].
pub fn read_aggregate(path: &Path) -> Result<AggregateResult> {
    let data = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&data)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SubjectData;
    use tempfile::tempdir;

    fn sample() -> AggregateResult {
        let mut aggregate = AggregateResult::new();
        aggregate
            .entry("Class_XI".to_string())
            .or_default()
            .insert("Maths".to_string(), SubjectData::new("Maths", "Class_XI"));
        aggregate
    }

    #[test]
    fn creates_missing_folder_and_overwrites() {
        let dir = tempdir().expect("temporary directory");
        let path = dir.path().join(".tmp").join("debug_data.json");

        write_aggregate(&path, &AggregateResult::new()).expect("first write");
        write_aggregate(&path, &sample()).expect("second write");

        let written = fs::read_to_string(&path).expect("output read");
        assert!(written.starts_with("{\n  \"Class_XI\": {\n    \"Maths\": {"));
        assert_eq!(read_aggregate(&path).expect("output parsed"), sample());
    }
}
