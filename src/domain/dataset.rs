//! The shared in-memory dataset backing every editor window
//!
//! All open windows and the annotation engine borrow one dataset through a
//! `SharedDataset` reference; the window registry is the component that
//! hands it out. Replacing the dataset is a single reference swap and does
//! not by itself invalidate open windows (see `WindowRegistry::set_dataset`).

use anyhow::Context;
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::collections::HashMap;
use std::path::Path;
use std::rc::Rc;

use super::geometry::{Crs, Point};

/// Shared handle to the active dataset
///
/// Single UI thread, shared by reference, never copied.
pub type SharedDataset = Rc<RefCell<Dataset>>;

/// Wrap a dataset for sharing across windows and the annotation engine
pub fn shared(dataset: Dataset) -> SharedDataset {
    Rc::new(RefCell::new(dataset))
}

/// Data category a record belongs to
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StructureKind {
    StreamGage,
    Diversion,
    Reservoir,
    InstreamFlow,
    Well,
    Plan,
    StreamEstimate,
    OperationalRight,
    DelayTable,
    ClimateStation,
}

impl StructureKind {
    /// All categories, in dataset component order
    pub const ALL: [StructureKind; 10] = [
        StructureKind::StreamGage,
        StructureKind::Diversion,
        StructureKind::Reservoir,
        StructureKind::InstreamFlow,
        StructureKind::Well,
        StructureKind::Plan,
        StructureKind::StreamEstimate,
        StructureKind::OperationalRight,
        StructureKind::DelayTable,
        StructureKind::ClimateStation,
    ];

    /// Human-readable category name
    pub fn label(self) -> &'static str {
        match self {
            StructureKind::StreamGage => "stream gage",
            StructureKind::Diversion => "diversion",
            StructureKind::Reservoir => "reservoir",
            StructureKind::InstreamFlow => "instream flow",
            StructureKind::Well => "well",
            StructureKind::Plan => "plan",
            StructureKind::StreamEstimate => "stream estimate",
            StructureKind::OperationalRight => "operational right",
            StructureKind::DelayTable => "delay table",
            StructureKind::ClimateStation => "climate station",
        }
    }
}

/// Geo-located shape of a record, when the dataset carries one
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeoShape {
    /// Position in the shape's native coordinate reference
    pub position: Point,
    /// Native CRS; `None` means "use the request's fallback CRS"
    pub crs: Option<Crs>,
}

/// One record of the dataset
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeoRecord {
    pub id: String,
    pub name: String,
    pub kind: StructureKind,
    /// Spatial data is optional; records without it simply never
    /// produce map anchors
    #[serde(default)]
    pub shape: Option<GeoShape>,
}

impl GeoRecord {
    /// Create a record without spatial data
    pub fn new(id: impl Into<String>, name: impl Into<String>, kind: StructureKind) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind,
            shape: None,
        }
    }

    /// Attach a geo-located shape
    pub fn with_shape(mut self, position: Point, crs: Option<Crs>) -> Self {
        self.shape = Some(GeoShape { position, crs });
        self
    }
}

/// Serialized form of a dataset file (demo JSON format)
#[derive(Serialize, Deserialize)]
struct DatasetFile {
    name: String,
    records: Vec<GeoRecord>,
}

/// The active in-memory dataset
#[derive(Debug)]
pub struct Dataset {
    name: String,
    components: HashMap<StructureKind, Vec<GeoRecord>>,
    /// id -> (kind, index into that kind's component list)
    index: HashMap<String, (StructureKind, usize)>,
    created: DateTime<Local>,
    modified: DateTime<Local>,
    dirty: bool,
}

impl Dataset {
    /// Create an empty dataset
    pub fn new(name: impl Into<String>) -> Self {
        let now = Local::now();
        Self {
            name: name.into(),
            components: HashMap::new(),
            index: HashMap::new(),
            created: now,
            modified: now,
            dirty: false,
        }
    }

    /// Dataset name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// When this dataset was created or loaded
    pub fn created(&self) -> DateTime<Local> {
        self.created
    }

    /// When this dataset was last modified
    pub fn modified(&self) -> DateTime<Local> {
        self.modified
    }

    /// Whether there are unsaved modifications
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Main-window title line: name, dirty marker, last-modified time
    pub fn title(&self) -> String {
        let marker = if self.dirty { " *" } else { "" };
        format!(
            "{}{} ({})",
            self.name,
            marker,
            self.modified.format("%Y-%m-%d %H:%M")
        )
    }

    /// Records of one data category (the component list an editor displays)
    pub fn component(&self, kind: StructureKind) -> &[GeoRecord] {
        self.components.get(&kind).map_or(&[], Vec::as_slice)
    }

    /// Look up a record anywhere in the dataset by identifier
    pub fn lookup(&self, id: &str) -> Option<&GeoRecord> {
        let (kind, i) = self.index.get(id)?;
        self.components.get(kind)?.get(*i)
    }

    /// Insert a record into its category's component list
    ///
    /// A record with a duplicate id replaces the existing one in place.
    pub fn insert(&mut self, record: GeoRecord) {
        if let Some(&(kind, i)) = self.index.get(&record.id) {
            if kind == record.kind {
                if let Some(list) = self.components.get_mut(&kind) {
                    list[i] = record;
                    self.touch();
                    return;
                }
            }
            log::warn!(
                "record {} moved category ({} -> {}); dataset index rebuilt",
                record.id,
                kind.label(),
                record.kind.label()
            );
            let stale_id = record.id.clone();
            self.remove(&stale_id);
        }
        let list = self.components.entry(record.kind).or_default();
        self.index
            .insert(record.id.clone(), (record.kind, list.len()));
        list.push(record);
        self.touch();
    }

    /// Remove a record by id; no-op when absent
    pub fn remove(&mut self, id: &str) {
        let Some((kind, i)) = self.index.remove(id) else {
            return;
        };
        if let Some(list) = self.components.get_mut(&kind) {
            list.remove(i);
            // Reindex the records that shifted down
            for (j, rec) in list.iter().enumerate().skip(i) {
                self.index.insert(rec.id.clone(), (kind, j));
            }
        }
        self.touch();
    }

    /// Total record count across all categories
    pub fn len(&self) -> usize {
        self.components.values().map(Vec::len).sum()
    }

    /// Whether the dataset holds no records
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Mark the dataset modified
    pub fn touch(&mut self) {
        self.modified = Local::now();
        self.dirty = true;
    }

    /// Load a dataset from the demo JSON format
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read dataset file {}", path.display()))?;
        let file: DatasetFile = serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse dataset file {}", path.display()))?;
        let mut dataset = Dataset::new(file.name);
        for record in file.records {
            dataset.insert(record);
        }
        dataset.dirty = false;
        log::info!(
            "Loaded dataset '{}' with {} records",
            dataset.name,
            dataset.len()
        );
        Ok(dataset)
    }

    /// Save the dataset in the demo JSON format and clear the dirty flag
    pub fn save(&mut self, path: &Path) -> anyhow::Result<()> {
        let file = DatasetFile {
            name: self.name.clone(),
            records: StructureKind::ALL
                .iter()
                .flat_map(|&kind| self.component(kind).iter().cloned())
                .collect(),
        };
        let text = serde_json::to_string_pretty(&file)?;
        std::fs::write(path, text)
            .with_context(|| format!("Failed to write dataset file {}", path.display()))?;
        self.dirty = false;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Dataset {
        let mut d = Dataset::new("test basin");
        d.insert(
            GeoRecord::new("09152500", "Gunnison River gage", StructureKind::StreamGage)
                .with_shape(Point::new(-108.0, 38.7), Some(Crs::new("EPSG:4326"))),
        );
        d.insert(GeoRecord::new(
            "510848",
            "Highline Canal",
            StructureKind::Diversion,
        ));
        d
    }

    #[test]
    fn test_insert_and_lookup() {
        let d = sample();
        assert_eq!(d.len(), 2);
        assert_eq!(d.component(StructureKind::StreamGage).len(), 1);
        assert_eq!(d.lookup("510848").unwrap().name, "Highline Canal");
        assert!(d.lookup("nope").is_none());
    }

    #[test]
    fn test_insert_replaces_duplicate_id() {
        let mut d = sample();
        d.insert(GeoRecord::new(
            "510848",
            "Highline Canal (renamed)",
            StructureKind::Diversion,
        ));
        assert_eq!(d.len(), 2);
        assert_eq!(d.lookup("510848").unwrap().name, "Highline Canal (renamed)");
    }

    #[test]
    fn test_remove_reindexes() {
        let mut d = sample();
        d.insert(GeoRecord::new(
            "510849",
            "Second Canal",
            StructureKind::Diversion,
        ));
        d.remove("510848");
        assert_eq!(d.lookup("510849").unwrap().name, "Second Canal");
        assert!(d.lookup("510848").is_none());
    }

    #[test]
    fn test_title_dirty_marker() {
        let mut d = Dataset::new("basin");
        assert!(!d.title().contains('*'));
        d.touch();
        assert!(d.is_dirty());
        assert!(d.title().contains('*'));
    }

    #[test]
    fn test_json_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("basin.json");
        let mut d = sample();
        d.save(&path).unwrap();
        assert!(!d.is_dirty());

        let loaded = Dataset::load(&path).unwrap();
        assert_eq!(loaded.name(), "test basin");
        assert_eq!(loaded.len(), 2);
        assert!(!loaded.is_dirty());
        let gage = loaded.lookup("09152500").unwrap();
        assert_eq!(gage.shape.as_ref().unwrap().crs, Some(Crs::new("EPSG:4326")));
    }
}
