use crate::core::{RawRow, Storage};
use crate::utils::error::{Result, SyncError};
use std::collections::HashMap;

/// Header names every price manifest must carry.
pub const REQUIRED_COLUMNS: [&str; 8] = [
    "input",
    "id",
    "type",
    "territory",
    "price",
    "start",
    "end",
    "price_point_id",
];

pub struct ManifestLoader<S: Storage> {
    storage: S,
}

impl<S: Storage> ManifestLoader<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    /// 讀取 CSV 並回傳依檔案順序排列的原始列
    pub async fn load(&self, path: &str) -> Result<Vec<RawRow>> {
        tracing::info!("📁 Reading price manifest: {}", path);

        let data = self.storage.read_file(path).await.map_err(|e| match e {
            SyncError::IoError(io) if io.kind() == std::io::ErrorKind::NotFound => {
                SyncError::ManifestNotFound {
                    path: path.to_string(),
                }
            }
            other => other,
        })?;

        let rows = parse_manifest(&data)?;
        tracing::info!("📊 Read {} manifest rows", rows.len());
        Ok(rows)
    }
}

pub fn parse_manifest(data: &[u8]) -> Result<Vec<RawRow>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(data);

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').to_string())
        .collect();

    let missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|column| !headers.iter().any(|h| h == *column))
        .map(|column| column.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(SyncError::MissingColumnError { columns: missing });
    }

    let mut rows = Vec::new();
    for (index, record) in reader.records().enumerate() {
        let record = record?;
        // 以檔案行號為準（減去標題行），空白行也會計入
        let row = record
            .position()
            .map(|pos| pos.line().saturating_sub(1) as usize)
            .unwrap_or(index + 1);
        if record.iter().all(|field| field.is_empty()) {
            continue;
        }

        let fields: HashMap<String, String> = headers
            .iter()
            .zip(record.iter())
            .map(|(header, value)| (header.clone(), value.to_string()))
            .collect();

        rows.push(RawRow { row, fields });
    }

    Ok(rows)
}
