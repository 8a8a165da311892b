use tracing::{error, info, instrument};

use crate::aggregate::Aggregator;
use crate::config::Config;
use crate::error::Result;
use crate::io::excel_read;
use crate::io::json_write;
use crate::io::walk;
use crate::model::AggregateResult;

/// Walks the data tree, aggregates every readable subject, and writes the
/// document to the configured output file.
#[instrument(
    level = "info",
    skip_all,
    fields(data_dir = %config.data_dir.display(), output = %config.output_file.display())
)]
pub fn run(config: &Config) -> Result<AggregateResult> {
    let aggregate = extract(config)?;
    json_write::write_aggregate(&config.output_file, &aggregate)?;
    info!(
        "Done. Parsed data saved to {}",
        config.output_file.display()
    );
    Ok(aggregate)
}

/// Builds the aggregate without touching the output file.
///
/// Workbooks that cannot be read are logged and contribute nothing; failures
/// to walk the tree itself are returned.
pub fn extract(config: &Config) -> Result<AggregateResult> {
    info!("Scanning data directory: {}", config.data_dir.display());
    let mut aggregator = Aggregator::new();

    for source in walk::walk(&config.data_dir)? {
        let source = source?;
        info!("Processing: {} / {}", source.class_name, source.subject_name);

        match excel_read::read_subject(&source, config.blank_rows) {
            Ok(subject) => aggregator.insert(subject),
            Err(err) => {
                let file_name = source
                    .path
                    .file_name()
                    .map(|name| name.to_string_lossy().into_owned())
                    .unwrap_or_default();
                error!(file = %source.path.display(), "Failed to read {file_name}: {err}");
            }
        }
    }

    info!(subject_count = aggregator.subject_count(), "data directory scanned");
    Ok(aggregator.into_result())
}
