//src/taxdb.rs

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use flate2::read::MultiGzDecoder;

use crate::error::TaxonomyError;
use crate::types::{ParentMap, TaxId};

/// A parsed node table: the child -> parent map plus the root taxid.
///
/// The root is the unique self-parenting entry (`parent(root) == root`).
#[derive(Debug, Clone)]
pub struct NodeTable {
    pub parent_map: ParentMap,
    pub root: TaxId,
}

/// Parses a taxonomy node table in the format:
/// ```text
/// <child_taxid> <parent_taxid>
/// ```
/// one pair per line, whitespace separated. Files ending in `.gz` are
/// decompressed on the fly.
pub fn parse_nodes<P: AsRef<Path>>(path: P) -> Result<NodeTable, TaxonomyError> {
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

    let mut lines = Vec::new();
    for line in reader.lines() {
        lines.push(line?);
    }
    parse_node_records(lines.iter().map(|s| s.as_str()))
}

/// Core of the loader, shared by the file path and by tests: builds a
/// `NodeTable` from raw record lines.
///
/// Fails fast on the first malformed line; a partially loaded tree is never
/// returned. Exactly one self-parenting line must be present.
pub fn parse_node_records<'a, I>(lines: I) -> Result<NodeTable, TaxonomyError>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut parent_map: ParentMap = ParentMap::new();
    let mut root: Option<TaxId> = None;

    for (idx, raw) in lines.into_iter().enumerate() {
        let line_no = idx + 1;
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }

        let mut fields = line.split_whitespace();
        let child = parse_field(fields.next(), line_no, raw)?;
        let parent = parse_field(fields.next(), line_no, raw)?;
        if fields.next().is_some() {
            return Err(TaxonomyError::MalformedRecord {
                line: line_no,
                content: raw.to_string(),
            });
        }

        if child == parent {
            if let Some(first) = root {
                return Err(TaxonomyError::DuplicateRoot {
                    first,
                    second: child,
                });
            }
            root = Some(child);
        }
        parent_map.insert(child, parent);
    }

    let root = root.ok_or(TaxonomyError::MissingRoot)?;
    log::info!(
        "loaded node table: {} taxa, root={}",
        parent_map.len(),
        root
    );

    Ok(NodeTable { parent_map, root })
}

fn parse_field(
    field: Option<&str>,
    line_no: usize,
    raw: &str,
) -> Result<TaxId, TaxonomyError> {
    field
        .and_then(|s| s.parse::<TaxId>().ok())
        .ok_or_else(|| TaxonomyError::MalformedRecord {
            line: line_no,
            content: raw.to_string(),
        })
}
