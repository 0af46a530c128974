//! Crop Catalog Loading and Storage
//!
//! Crop records are owned by an external store. This module defines the record
//! schema, loads catalogs from CSV/Parquet (Polars) or JSON (serde_json), and
//! provides the `CropStore` seam the service layer talks to, with an
//! in-memory implementation.

use crate::error::{EngineError, EngineResult};
use crate::questionnaire::TechnicalValues;
use anyhow::{Context, Result};
use polars::prelude::*;
use rustc_hash::FxHasher;
use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};
use std::path::Path;
use std::sync::{Mutex, RwLock};

/// One crop's growing requirements
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Crop {
    pub id: String,
    pub name: String,

    /// Soil pH range
    pub ph_min: f64,
    pub ph_max: f64,

    /// Annual rainfall range (mm/year)
    pub rain_min: f64,
    pub rain_max: f64,

    /// Mean temperature range (°C)
    pub temp_min: f64,
    pub temp_max: f64,

    /// "Low" / "Medium" / "High"
    pub sun_requirement: String,

    /// Free-text texture, e.g. "Loam" or "Clay Loam"
    pub soil_type: String,

    /// "Low" / "Medium" / "High"
    pub irrigation_need: String,

    #[serde(default)]
    pub description: Option<String>,
}

impl Crop {
    /// Reject records whose numeric ranges are inverted or non-finite
    pub fn validate(&self, row: usize) -> EngineResult<()> {
        let ranges = [
            ("ph", self.ph_min, self.ph_max),
            ("rain", self.rain_min, self.rain_max),
            ("temp", self.temp_min, self.temp_max),
        ];
        for (label, min, max) in ranges {
            if !min.is_finite() || !max.is_finite() {
                return Err(EngineError::InvalidCrop {
                    row,
                    reason: format!("{} range of '{}' is not numeric", label, self.name),
                });
            }
            if min > max {
                return Err(EngineError::InvalidCrop {
                    row,
                    reason: format!(
                        "{} range of '{}' is inverted ({} > {})",
                        label, self.name, min, max
                    ),
                });
            }
        }
        Ok(())
    }
}

// ============================================================================
// Catalog loading
// ============================================================================

/// Load a crop catalog, choosing the reader from the file extension
/// (`.csv`, `.parquet`, `.json`)
pub fn load_catalog(path: &Path) -> Result<Vec<Crop>> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    let crops = match extension.as_str() {
        "csv" => load_catalog_csv(path)?,
        "parquet" => load_catalog_parquet(path)?,
        "json" => load_catalog_json(path)?,
        other => anyhow::bail!("Unsupported catalog format '{}': {:?}", other, path),
    };

    for (row, crop) in crops.iter().enumerate() {
        crop.validate(row)?;
    }

    tracing::info!("Loaded {} crops from {:?}", crops.len(), path);
    Ok(crops)
}

fn load_catalog_csv(path: &Path) -> Result<Vec<Crop>> {
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .try_into_reader_with_file_path(Some(path.into()))
        .with_context(|| format!("Failed to create CSV reader: {:?}", path))?
        .finish()
        .with_context(|| "Failed to load crops CSV")?;

    crops_from_frame(&df)
}

fn load_catalog_parquet(path: &Path) -> Result<Vec<Crop>> {
    let df = LazyFrame::scan_parquet(path, Default::default())
        .with_context(|| format!("Failed to scan parquet: {:?}", path))?
        .collect()
        .with_context(|| "Failed to load crops parquet")?;

    crops_from_frame(&df)
}

fn load_catalog_json(path: &Path) -> Result<Vec<Crop>> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read catalog file: {:?}", path))?;
    serde_json::from_str(&contents).with_context(|| "Failed to parse crops JSON")
}

fn f64_column(df: &DataFrame, name: &str) -> Result<Float64Chunked> {
    let column = df
        .column(name)
        .with_context(|| format!("Column '{}' not found", name))?
        .cast(&DataType::Float64)
        .with_context(|| format!("Column '{}' is not numeric", name))?;
    Ok(column
        .f64()
        .with_context(|| format!("Column '{}' is not f64", name))?
        .clone())
}

fn str_column(df: &DataFrame, name: &str) -> Result<StringChunked> {
    let column = df
        .column(name)
        .with_context(|| format!("Column '{}' not found", name))?
        .cast(&DataType::String)
        .with_context(|| format!("Column '{}' cannot be read as text", name))?;
    Ok(column
        .str()
        .with_context(|| format!("Column '{}' is not string type", name))?
        .clone())
}

/// Convert a crop table into records; `description` is optional
pub fn crops_from_frame(df: &DataFrame) -> Result<Vec<Crop>> {
    let ids = str_column(df, "id")?;
    let names = str_column(df, "name")?;
    let ph_min = f64_column(df, "ph_min")?;
    let ph_max = f64_column(df, "ph_max")?;
    let rain_min = f64_column(df, "rain_min")?;
    let rain_max = f64_column(df, "rain_max")?;
    let temp_min = f64_column(df, "temp_min")?;
    let temp_max = f64_column(df, "temp_max")?;
    let sun = str_column(df, "sun_requirement")?;
    let soil = str_column(df, "soil_type")?;
    let irrigation = str_column(df, "irrigation_need")?;
    let descriptions = if df.get_column_names().iter().any(|c| c.as_str() == "description") {
        Some(str_column(df, "description")?)
    } else {
        None
    };

    let missing = |row: usize, field: &str| EngineError::InvalidCrop {
        row,
        reason: format!("missing value for '{}'", field),
    };

    let mut crops = Vec::with_capacity(df.height());
    for idx in 0..df.height() {
        crops.push(Crop {
            id: ids.get(idx).ok_or_else(|| missing(idx, "id"))?.to_string(),
            name: names.get(idx).ok_or_else(|| missing(idx, "name"))?.to_string(),
            ph_min: ph_min.get(idx).ok_or_else(|| missing(idx, "ph_min"))?,
            ph_max: ph_max.get(idx).ok_or_else(|| missing(idx, "ph_max"))?,
            rain_min: rain_min.get(idx).ok_or_else(|| missing(idx, "rain_min"))?,
            rain_max: rain_max.get(idx).ok_or_else(|| missing(idx, "rain_max"))?,
            temp_min: temp_min.get(idx).ok_or_else(|| missing(idx, "temp_min"))?,
            temp_max: temp_max.get(idx).ok_or_else(|| missing(idx, "temp_max"))?,
            sun_requirement: sun.get(idx).ok_or_else(|| missing(idx, "sun_requirement"))?.to_string(),
            soil_type: soil.get(idx).ok_or_else(|| missing(idx, "soil_type"))?.to_string(),
            irrigation_need: irrigation
                .get(idx)
                .ok_or_else(|| missing(idx, "irrigation_need"))?
                .to_string(),
            description: descriptions
                .as_ref()
                .and_then(|d| d.get(idx))
                .filter(|d| !d.is_empty())
                .map(|d| d.to_string()),
        });
    }

    Ok(crops)
}

/// Content hash of a catalog, order-sensitive
///
/// Used to key cached rankings so a changed catalog never serves stale results.
pub fn catalog_fingerprint(crops: &[Crop]) -> u64 {
    let mut hasher = FxHasher::default();
    crops.len().hash(&mut hasher);
    for crop in crops {
        crop.id.hash(&mut hasher);
        crop.name.hash(&mut hasher);
        for bound in [
            crop.ph_min,
            crop.ph_max,
            crop.rain_min,
            crop.rain_max,
            crop.temp_min,
            crop.temp_max,
        ] {
            bound.to_bits().hash(&mut hasher);
        }
        crop.sun_requirement.hash(&mut hasher);
        crop.soil_type.hash(&mut hasher);
        crop.irrigation_need.hash(&mut hasher);
    }
    hasher.finish()
}

// ============================================================================
// Store
// ============================================================================

/// Row written to the `user_inputs` table for each recommendation request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserInputRecord {
    pub ph_value: f64,
    pub rain_value: f64,
    pub temp_value: f64,
    pub sun_value: f64,
    pub irrigation_value: f64,
    pub soil_type: String,
}

impl From<&TechnicalValues> for UserInputRecord {
    fn from(values: &TechnicalValues) -> Self {
        Self {
            ph_value: values.ph,
            rain_value: values.rain,
            temp_value: values.temp,
            sun_value: values.sun,
            irrigation_value: values.irrigation,
            soil_type: values.soil.clone(),
        }
    }
}

/// External crop/answer store
pub trait CropStore: Send + Sync {
    /// Full crop table, in catalog order
    fn fetch_crops(&self) -> EngineResult<Vec<Crop>>;

    /// Insert one submitted set of technical values
    fn record_user_input(&self, record: UserInputRecord) -> EngineResult<()>;
}

/// In-process store seeded from a catalog file or a crop list
#[derive(Debug, Default)]
pub struct InMemoryCropStore {
    crops: RwLock<Vec<Crop>>,
    user_inputs: Mutex<Vec<UserInputRecord>>,
}

impl InMemoryCropStore {
    pub fn new(crops: Vec<Crop>) -> Self {
        Self {
            crops: RwLock::new(crops),
            user_inputs: Mutex::new(Vec::new()),
        }
    }

    pub fn from_catalog(path: &Path) -> Result<Self> {
        Ok(Self::new(load_catalog(path)?))
    }

    /// Replace the catalog contents
    pub fn replace_crops(&self, crops: Vec<Crop>) -> EngineResult<()> {
        let mut guard = self
            .crops
            .write()
            .map_err(|_| EngineError::Store("crop table lock poisoned".to_string()))?;
        *guard = crops;
        Ok(())
    }

    /// Snapshot of every recorded submission
    pub fn user_inputs(&self) -> EngineResult<Vec<UserInputRecord>> {
        self.user_inputs
            .lock()
            .map(|guard| guard.clone())
            .map_err(|_| EngineError::Store("user_inputs lock poisoned".to_string()))
    }
}

impl CropStore for InMemoryCropStore {
    fn fetch_crops(&self) -> EngineResult<Vec<Crop>> {
        self.crops
            .read()
            .map(|guard| guard.clone())
            .map_err(|_| EngineError::Store("crop table lock poisoned".to_string()))
    }

    fn record_user_input(&self, record: UserInputRecord) -> EngineResult<()> {
        self.user_inputs
            .lock()
            .map_err(|_| EngineError::Store("user_inputs lock poisoned".to_string()))?
            .push(record);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const CSV: &str = "\
id,name,ph_min,ph_max,rain_min,rain_max,temp_min,temp_max,sun_requirement,soil_type,irrigation_need,description
rice,Rice,5.5,6.5,1500,3000,22,32,High,Clay,High,Paddy rice
maize,Maize,5.8,7.0,600,1200,18,30,High,Loam,Medium,
";

    fn write_temp(suffix: &str, contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_csv_catalog() {
        let file = write_temp(".csv", CSV);
        let crops = load_catalog(file.path()).unwrap();

        assert_eq!(crops.len(), 2);
        assert_eq!(crops[0].name, "Rice");
        assert_eq!(crops[0].rain_min, 1500.0);
        assert_eq!(crops[0].description.as_deref(), Some("Paddy rice"));
        assert_eq!(crops[1].soil_type, "Loam");
        assert_eq!(crops[1].description, None);
    }

    #[test]
    fn test_load_json_catalog() {
        let json = r#"[{
            "id": "tea", "name": "Tea",
            "ph_min": 4.5, "ph_max": 5.5,
            "rain_min": 1500, "rain_max": 3000,
            "temp_min": 13, "temp_max": 28,
            "sun_requirement": "Medium", "soil_type": "Loam", "irrigation_need": "Medium"
        }]"#;
        let file = write_temp(".json", json);
        let crops = load_catalog(file.path()).unwrap();
        assert_eq!(crops.len(), 1);
        assert_eq!(crops[0].ph_max, 5.5);
        assert!(crops[0].description.is_none());
    }

    fn write_parquet(mut df: DataFrame) -> tempfile::NamedTempFile {
        let file = tempfile::Builder::new().suffix(".parquet").tempfile().unwrap();
        let out = std::fs::File::create(file.path()).unwrap();
        ParquetWriter::new(out).finish(&mut df).unwrap();
        file
    }

    #[test]
    fn test_load_parquet_catalog() {
        let df = df!(
            "id" => ["tea", "rice"],
            "name" => ["Tea", "Rice"],
            "ph_min" => [4.5, 5.0],
            "ph_max" => [5.5, 6.5],
            "rain_min" => [1500i64, 1500],
            "rain_max" => [3000i64, 3000],
            "temp_min" => [13.0, 20.0],
            "temp_max" => [28.0, 35.0],
            "sun_requirement" => ["Medium", "High"],
            "soil_type" => ["Loam", "Clay"],
            "irrigation_need" => ["Medium", "High"],
            "description" => [Some("Acid-loving bush"), None]
        )
        .unwrap();
        let file = write_parquet(df);

        let crops = load_catalog(file.path()).unwrap();
        assert_eq!(crops.len(), 2);
        assert_eq!(crops[0].name, "Tea");
        assert_eq!(crops[0].rain_max, 3000.0);
        assert_eq!(crops[0].description.as_deref(), Some("Acid-loving bush"));
        assert_eq!(crops[1].soil_type, "Clay");
        assert_eq!(crops[1].description, None);
    }

    #[test]
    fn test_load_parquet_catalog_without_description() {
        let df = df!(
            "id" => ["maize"],
            "name" => ["Maize"],
            "ph_min" => [5.5],
            "ph_max" => [7.5],
            "rain_min" => [500.0],
            "rain_max" => [1200.0],
            "temp_min" => [18.0],
            "temp_max" => [30.0],
            "sun_requirement" => ["High"],
            "soil_type" => ["Loam"],
            "irrigation_need" => ["Medium"]
        )
        .unwrap();
        let file = write_parquet(df);

        let crops = load_catalog(file.path()).unwrap();
        assert_eq!(crops.len(), 1);
        assert_eq!(crops[0].ph_max, 7.5);
        assert!(crops[0].description.is_none());
    }

    #[test]
    fn test_catalog_fingerprint_tracks_contents() {
        let file = write_temp(".csv", CSV);
        let crops = load_catalog(file.path()).unwrap();

        let original = catalog_fingerprint(&crops);
        assert_eq!(original, catalog_fingerprint(&crops.clone()));

        let mut changed = crops.clone();
        changed[0].rain_max = 2800.0;
        assert_ne!(original, catalog_fingerprint(&changed));

        let reordered: Vec<Crop> = crops.iter().rev().cloned().collect();
        assert_ne!(original, catalog_fingerprint(&reordered));
        assert_ne!(original, catalog_fingerprint(&[]));
    }

    #[test]
    fn test_replace_crops_visible_to_fetch() {
        let store = InMemoryCropStore::new(Vec::new());
        let file = write_temp(".csv", CSV);
        store.replace_crops(load_catalog(file.path()).unwrap()).unwrap();
        assert_eq!(store.fetch_crops().unwrap().len(), 2);

        store.replace_crops(Vec::new()).unwrap();
        assert!(store.fetch_crops().unwrap().is_empty());
    }

    #[test]
    fn test_rejects_inverted_range() {
        let csv = "\
id,name,ph_min,ph_max,rain_min,rain_max,temp_min,temp_max,sun_requirement,soil_type,irrigation_need
bad,Bad,7.0,5.0,600,1200,18,30,High,Loam,Medium
";
        let file = write_temp(".csv", csv);
        assert!(load_catalog(file.path()).is_err());
    }

    #[test]
    fn test_rejects_missing_column() {
        let csv = "id,name,ph_min\nx,X,5.0\n";
        let file = write_temp(".csv", csv);
        assert!(load_catalog(file.path()).is_err());
    }

    #[test]
    fn test_rejects_unknown_extension() {
        let file = write_temp(".xml", "<crops/>");
        assert!(load_catalog(file.path()).is_err());
    }

    #[test]
    fn test_in_memory_store_records_inputs() {
        let store = InMemoryCropStore::new(Vec::new());
        assert!(store.fetch_crops().unwrap().is_empty());

        let values = TechnicalValues::default();
        store.record_user_input(UserInputRecord::from(&values)).unwrap();

        let inputs = store.user_inputs().unwrap();
        assert_eq!(inputs.len(), 1);
        assert_eq!(inputs[0].soil_type, "Loam");
        assert_eq!(inputs[0].rain_value, 1500.0);
    }
}
