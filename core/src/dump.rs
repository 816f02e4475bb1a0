//! The glyph repository ("dump"): every glyph of a GlyphWiki snapshot, keyed
//! by name.
//!
//! Two textual forms are understood:
//!
//! - `*.csv`: the first line is the snapshot timestamp, then one
//!   `name,related,data` line per glyph.
//! - anything else (`dump_newest_only.txt`): a two-line table header, then
//!   `name | related | data` lines. The timestamp is the file mtime.
//!
//! Lines with the wrong number of fields are skipped in both forms.

use std::path::Path;
use std::time::UNIX_EPOCH;

use ahash::AHashMap;
use once_cell::unsync::OnceCell;
use tracing::debug;

use crate::error::{Error, Result};
use crate::kage::KageData;

/// One glyph record. Stroke data is parsed on first access.
#[derive(Debug)]
pub struct DumpEntry {
    pub name: String,
    pub related: String,
    pub gdata: String,
    kage: OnceCell<KageData>,
}

impl DumpEntry {
    pub fn new(
        name: impl Into<String>,
        related: impl Into<String>,
        gdata: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            related: related.into(),
            gdata: gdata.into(),
            kage: OnceCell::new(),
        }
    }

    pub fn kage(&self) -> &KageData {
        self.kage.get_or_init(|| KageData::parse(&self.gdata))
    }

    /// Name of the aliased glyph, without `@revision`.
    pub fn entity_name(&self) -> Option<&str> {
        self.kage().entity_name()
    }

    pub fn is_alias(&self) -> bool {
        self.entity_name().is_some()
    }
}

/// Immutable name-keyed glyph collection.
#[derive(Debug)]
pub struct Dump {
    entries: AHashMap<String, DumpEntry>,
    timestamp: f64,
    alias_index: OnceCell<AHashMap<String, Vec<String>>>,
}

impl Dump {
    /// Build a dump from `(name, related, data)` triples. Later duplicates win.
    pub fn from_entries<I, N, R, D>(entries: I, timestamp: f64) -> Self
    where
        I: IntoIterator<Item = (N, R, D)>,
        N: Into<String>,
        R: Into<String>,
        D: Into<String>,
    {
        let entries = entries
            .into_iter()
            .map(|(name, related, gdata)| {
                let entry = DumpEntry::new(name, related, gdata);
                (entry.name.clone(), entry)
            })
            .collect();
        Self {
            entries,
            timestamp,
            alias_index: OnceCell::new(),
        }
    }

    /// Load a snapshot file, choosing the form by extension.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        let dump = if path.extension().is_some_and(|ext| ext == "csv") {
            Self::parse_csv(&content).ok_or_else(|| Error::SnapshotHeader {
                path: path.to_path_buf(),
            })?
        } else {
            let modified = std::fs::metadata(path)
                .and_then(|meta| meta.modified())
                .map_err(|e| Error::io(path, e))?;
            let timestamp = modified
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_secs_f64())
                .unwrap_or(0.0);
            Self::parse_table(&content, timestamp)
        };
        debug!(path = %path.display(), glyphs = dump.len(), "loaded dump");
        Ok(dump)
    }

    /// Parse the CSV form. `None` if the timestamp line is malformed.
    pub fn parse_csv(content: &str) -> Option<Self> {
        let mut lines = content.lines();
        let timestamp: f64 = lines.next()?.trim().parse().ok()?;
        let rows = lines.filter_map(|line| {
            let row: Vec<&str> = line.split(',').collect();
            match row.as_slice() {
                [name, related, gdata] => Some((*name, *related, *gdata)),
                _ => None,
            }
        });
        Some(Self::from_entries(rows, timestamp))
    }

    /// Parse the pipe-table form; the two header lines are skipped.
    pub fn parse_table(content: &str, timestamp: f64) -> Self {
        let rows = content.lines().skip(2).filter_map(|line| {
            let row: Vec<&str> = line.split('|').map(str::trim).collect();
            match row.as_slice() {
                [name, related, gdata] => Some((*name, *related, *gdata)),
                _ => None,
            }
        });
        Self::from_entries(rows, timestamp)
    }

    pub fn timestamp(&self) -> f64 {
        self.timestamp
    }

    pub fn get(&self, name: &str) -> Option<&DumpEntry> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> impl Iterator<Item = &DumpEntry> {
        self.entries.values()
    }

    /// All glyph names in lexicographic order.
    pub fn sorted_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Entity name of `name`: the alias target, or `name` itself.
    pub fn entity_name_of<'a>(&'a self, name: &'a str) -> &'a str {
        self.get(name)
            .and_then(DumpEntry::entity_name)
            .unwrap_or(name)
    }

    /// `[entity, aliases...]` for an entity; `[name]` when nothing aliases it.
    pub fn alias_of<'a>(&'a self, name: &'a str) -> Vec<&'a str> {
        let index = self.alias_index.get_or_init(|| self.build_alias_index());
        match index.get(name) {
            Some(names) => names.iter().map(String::as_str).collect(),
            None => vec![name],
        }
    }

    fn build_alias_index(&self) -> AHashMap<String, Vec<String>> {
        let mut index: AHashMap<String, Vec<String>> = AHashMap::new();
        for name in self.sorted_names() {
            if let Some(entity) = self.get(name).and_then(DumpEntry::entity_name) {
                if entity == name {
                    continue;
                }
                index
                    .entry(entity.to_string())
                    .or_insert_with(|| vec![entity.to_string()])
                    .push(name.to_string());
            }
        }
        debug!(entities = index.len(), "built alias index");
        index
    }
}
