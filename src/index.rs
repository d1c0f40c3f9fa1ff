//! Object index persistence: parsing, serialization, and ordering enforcement.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use serde::{Deserialize, Serialize};

use crate::builder::BuildReport;
use crate::error::Error;
use crate::types::ObjectKind;

/// Name of the object index written at the build root.
pub const INDEX_FILE: &str = ".polyglot.index";

/// A single declared object in the index.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct IndexEntry {
    /// Stable fragment identifier for links to the declaration.
    pub anchor: String,
    /// Documentation file declaring the object.
    pub document: PathBuf,
    /// Domain prefix, e.g. `go`.
    pub domain: String,
    /// Kind of object.
    pub kind: ObjectKind,
    /// One-based line of the directive.
    pub line: u32,
    /// Canonical (qualified) name.
    pub name: String,
    /// Raw signature as written.
    pub signature: String,
}

impl IndexEntry {
    /// Sort key: one object per (domain, kind, name).
    fn key(&self) -> (&str, ObjectKind, &str) {
        return (&self.domain, self.kind, &self.name);
    }
}

impl Ord for IndexEntry {
    /// Compare entries by (domain, kind, name) for deterministic ordering.
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        return self.key().cmp(&other.key());
    }
}

impl PartialOrd for IndexEntry {
    /// Delegate to `Ord` implementation.
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        return Some(self.cmp(other));
    }
}

/// The index as a whole. Entries are sorted by (domain, kind, name) and
/// unique on that key. Constructed only via `ObjectIndex::from_report()` or
/// `ObjectIndex::parse()`, both of which enforce that.
#[derive(Debug, Serialize, Deserialize)]
pub struct ObjectIndex {
    /// The ordered list of declared objects.
    pub entries: Vec<IndexEntry>,
}

impl ObjectIndex {
    /// Find an object by its full key.
    pub fn find(&self, domain: &str, kind: ObjectKind, name: &str) -> Option<&IndexEntry> {
        return self
            .entries
            .binary_search_by(|e| return e.key().cmp(&(domain, kind, name)))
            .ok()
            .and_then(|idx| return self.entries.get(idx));
    }

    /// Build the index from a finished build. When an object was declared
    /// more than once, the last declaration wins, matching the registry.
    /// `:no-index:` declarations are left out.
    pub fn from_report(report: &BuildReport) -> Self {
        let mut latest: BTreeMap<(String, ObjectKind, String), IndexEntry> = BTreeMap::new();
        for declaration in report.declarations.iter().filter(|d| return d.indexed) {
            let domain = declaration.domain.prefix().to_string();
            let kind = declaration.record.kind;
            let entry = IndexEntry {
                anchor: anchor_for(&domain, kind, &declaration.name),
                document: declaration.location.document.clone(),
                domain: domain.clone(),
                kind,
                line: declaration.location.line,
                name: declaration.name.clone(),
                signature: declaration.signature.clone(),
            };
            latest.insert((domain, kind, declaration.name.clone()), entry);
        }
        return Self { entries: latest.into_values().collect() };
    }

    /// Parse an index from TOML content.
    ///
    /// # Errors
    ///
    /// Returns `Error::TomlDe` if the content is not valid TOML,
    /// or `Error::IndexCorrupt` if entries are not strictly sorted.
    pub fn parse(content: &str) -> Result<Self, Error> {
        let index: Self = toml::from_str(content)?;
        enforce_index_entry_ordering(&index.entries)?;
        return Ok(index);
    }

    /// Read and parse an index from disk.
    ///
    /// # Errors
    ///
    /// Returns `Error::IndexNotFound` if the file doesn't exist,
    /// `Error::Io` for other read failures,
    /// `Error::TomlDe` if the content is invalid TOML,
    /// or `Error::IndexCorrupt` if entries are not sorted.
    pub fn read(path: &Path) -> Result<Self, Error> {
        let content = match std::fs::read_to_string(path) {
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(Error::IndexNotFound { path: path.to_path_buf() });
            },
            Err(e) => return Err(Error::Io(e)),
            Ok(c) => c,
        };
        return Self::parse(&content);
    }

    /// Serialize to TOML.
    ///
    /// # Errors
    ///
    /// Returns `Error::TomlSer` if serialization fails.
    pub fn serialize(&self) -> Result<String, Error> {
        return Ok(toml::to_string_pretty(self)?);
    }

    /// Write the index to disk.
    ///
    /// # Errors
    ///
    /// Returns `Error::TomlSer` if serialization fails,
    /// or `Error::Io` if the file cannot be written.
    pub fn write(&self, path: &Path) -> Result<(), Error> {
        let content = self.serialize()?;
        std::fs::write(path, content)?;
        return Ok(());
    }
}

/// Bytes of a name that are percent-encoded in an anchor. Letters, digits,
/// `_`, `-` and `.` stay readable; every separator such as `::`, `#`, `/` or
/// `\` is encoded, so distinct names never share an anchor.
const ANCHOR_ESCAPES: &AsciiSet = &NON_ALPHANUMERIC.remove(b'_').remove(b'-').remove(b'.');

/// Fragment identifier for an object: `{domain}-{kind}-{name}` with the name
/// percent-encoded.
pub fn anchor_for(domain: &str, kind: ObjectKind, name: &str) -> String {
    return format!("{domain}-{kind}-{}", utf8_percent_encode(name, ANCHOR_ESCAPES));
}

/// Validate that index entries are strictly sorted.
///
/// # Errors
///
/// Returns `Error::IndexCorrupt` if any adjacent pair is out of order or repeated.
fn enforce_index_entry_ordering(entries: &[IndexEntry]) -> Result<(), Error> {
    for window in entries.windows(2) {
        let (Some(first), Some(second)) = (window.first(), window.get(1)) else {
            return Err(Error::IndexCorrupt {
                reason: "window underflow".to_string(),
            });
        };
        if first >= second {
            return Err(Error::IndexCorrupt {
                reason: format!(
                    "entries not sorted: {}:{} {} >= {}:{} {}",
                    first.domain, first.kind, first.name, second.domain, second.kind, second.name,
                ),
            });
        }
    }
    return Ok(());
}
