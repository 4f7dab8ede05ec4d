use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

use crate::error::{Result, ResultExt};

/// One CSV row keyed by the header row
pub type Country = BTreeMap<String, String>;

/// Parse a CSV document with a header row into one record per row
pub fn parse_countries<R: Read>(reader: R) -> Result<Vec<Country>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let countries = reader
        .deserialize::<Country>()
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(countries)
}

/// Read and parse the country list at `path`
pub async fn load_countries(path: &Path) -> Result<Vec<Country>> {
    let data = tokio::fs::read(path)
        .await
        .with_context(|| format!("failed to read {}", path.display()))?;
    parse_countries(data.as_slice())
}
