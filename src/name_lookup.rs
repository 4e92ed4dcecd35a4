//src/name_lookup.rs

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use ahash::AHashMap;
use flate2::read::MultiGzDecoder;

use crate::error::TaxonomyError;
use crate::types::TaxId;

/// The default name class used by lineage resolution.
pub const SCIENTIFIC_NAME: &str = "scientific name";

/// Capability to resolve a taxid to an organism name. Implemented by
/// whatever backs the name data (a flat file here, a relational database in
/// a full deployment). A miss is an `Option::None`, never an error.
pub trait NameLookup {
    fn get_organism_name(&self, taxid: TaxId, name_class: &str) -> Option<String>;

    fn scientific_name(&self, taxid: TaxId) -> Option<String> {
        self.get_organism_name(taxid, SCIENTIFIC_NAME)
    }
}

/// In-memory name table parsed from lines of
/// `taxid<TAB>name<TAB>name_class`; the name class defaults to
/// `"scientific name"` when the third field is absent.
#[derive(Debug, Clone, Default)]
pub struct FlatNameTable {
    // taxid -> [(name_class, name)]
    names: AHashMap<TaxId, Vec<(String, String)>>,
}

impl FlatNameTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads a name table file; `.gz` files are decompressed on the fly.
    /// Malformed lines are skipped.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, TaxonomyError> {
        let path = path.as_ref();
        let f = File::open(path)?;

        let is_gz = path
            .extension()
            .map(|ext| ext == "gz")
            .unwrap_or(false);
        let reader: Box<dyn BufRead> = if is_gz {
            Box::new(BufReader::new(MultiGzDecoder::new(f)))
        } else {
            Box::new(BufReader::new(f))
        };

        let mut table = Self::new();
        for line in reader.lines() {
            let line = line?;
            let mut fields = line.split('\t');
            let taxid = match fields.next().and_then(|s| s.trim().parse::<TaxId>().ok()) {
                Some(t) => t,
                None => continue,
            };
            let name = match fields.next() {
                Some(n) if !n.trim().is_empty() => n.trim(),
                _ => continue,
            };
            let class = fields.next().map(str::trim).unwrap_or(SCIENTIFIC_NAME);
            table.insert(taxid, class, name);
        }

        log::info!("loaded name table: {} taxa", table.names.len());
        Ok(table)
    }

    pub fn insert(&mut self, taxid: TaxId, name_class: &str, name: &str) {
        self.names
            .entry(taxid)
            .or_default()
            .push((name_class.to_string(), name.to_string()));
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl NameLookup for FlatNameTable {
    fn get_organism_name(&self, taxid: TaxId, name_class: &str) -> Option<String> {
        self.names.get(&taxid).and_then(|entries| {
            entries
                .iter()
                .find(|(class, _)| class == name_class)
                .map(|(_, name)| name.clone())
        })
    }
}
