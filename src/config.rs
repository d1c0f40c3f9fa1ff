use std::path::{Path, PathBuf};

use crate::domain::Domain;
use crate::error::Error;

/// Name of the project config file at the build root.
pub const CONFIG_FILE: &str = ".polyglot.toml";

/// Project configuration loaded from `.polyglot.toml`.
/// Include/exclude patterns are path prefixes applied to documentation files.
pub struct Config {
    /// Active domains. `None` means every registered domain.
    domains: Option<Vec<Domain>>,
    /// Path prefixes that must not be scanned.
    exclude: Vec<String>,
    /// Path prefixes to scan; empty scans everything.
    include: Vec<String>,
}

/// Raw TOML structure for `.polyglot.toml`.
#[derive(serde::Deserialize)]
struct PolyglotTomlConfig {
    /// Active domain prefixes.
    domains: Option<Vec<String>>,
    /// Excluded path prefixes.
    #[serde(default)]
    exclude: Vec<String>,
    /// Included path prefixes.
    #[serde(default)]
    include: Vec<String>,
}

impl Config {
    /// Domains whose directives are recognized in this build.
    pub fn active_domains(&self) -> Vec<Domain> {
        return self.domains.clone().unwrap_or_else(|| return Domain::ALL.to_vec());
    }

    /// Whether `domain` is active in this build.
    pub fn is_active(&self, domain: Domain) -> bool {
        return self.domains.as_ref().is_none_or(|d| return d.contains(&domain));
    }

    /// Load config from `.polyglot.toml` in the given root directory.
    /// Returns a default that scans everything with every domain active if
    /// the file doesn't exist. A file that exists but is malformed is an
    /// error, never a silent fallback.
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` if reading fails (other than not-found),
    /// `Error::TomlDe` if the TOML is malformed,
    /// or `Error::UnknownDomain` if a listed domain isn't registered.
    pub fn load(root: &Path) -> Result<Self, Error> {
        let path = root.join(CONFIG_FILE);
        let content = match std::fs::read_to_string(&path) {
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::scan_everything_by_default()),
            Err(e) => return Err(Error::Io(e)),
            Ok(c) => c,
        };
        return Self::parse(&content);
    }

    /// Parse config from TOML content.
    ///
    /// # Errors
    ///
    /// Returns `Error::TomlDe` if the TOML is malformed,
    /// or `Error::UnknownDomain` if a listed domain isn't registered.
    pub fn parse(content: &str) -> Result<Self, Error> {
        let raw: PolyglotTomlConfig = toml::from_str(content)?;
        let domains = match raw.domains {
            None => None,
            Some(prefixes) => Some(resolve_domain_prefixes(&prefixes)?),
        };
        return Ok(Self { domains, exclude: raw.exclude, include: raw.include });
    }

    /// Default config that includes everything and excludes nothing.
    const fn scan_everything_by_default() -> Self {
        return Self { domains: None, exclude: Vec::new(), include: Vec::new() };
    }

    /// Check whether a documentation file path should be scanned.
    ///
    /// A path is included if no include patterns are set (scan everything),
    /// or if the path starts with at least one include pattern.
    /// An included path is then excluded if it starts with any exclude pattern.
    pub fn should_scan(&self, relative_path: &str) -> bool {
        let included = self.include.is_empty()
            || self.include.iter().any(|p| return relative_path.starts_with(p.as_str()));

        if !included {
            return false;
        }

        return !self.exclude.iter().any(|p| return relative_path.starts_with(p.as_str()));
    }
}

/// Resolve configured prefixes to domains, dropping repeats.
///
/// # Errors
///
/// Returns `Error::UnknownDomain` for the first unregistered prefix.
fn resolve_domain_prefixes(prefixes: &[String]) -> Result<Vec<Domain>, Error> {
    let mut domains = Vec::with_capacity(prefixes.len());
    for prefix in prefixes {
        let domain = Domain::from_prefix(prefix).ok_or_else(|| {
            return Error::UnknownDomain { prefix: prefix.clone() };
        })?;
        if !domains.contains(&domain) {
            domains.push(domain);
        }
    }
    return Ok(domains);
}

// ── Config file editing ───────────────────────────────────────────────

/// Add a domain to the `domains` list. A missing list already activates
/// every domain, so there is nothing to add.
///
/// # Errors
///
/// Returns `Error::UnknownDomain` for unregistered prefixes,
/// `Error::ParseFailed` if the config can't be parsed, or `Error::Io` on write failure.
pub fn enable_domain(root: &Path, prefix: &str) -> Result<bool, Error> {
    let domain = Domain::from_prefix(prefix).ok_or_else(|| {
        return Error::UnknownDomain { prefix: prefix.to_string() };
    })?;
    let (config_path, mut doc) = read_config_doc(root)?;

    if !doc.contains_key("domains") {
        return Ok(false);
    }
    let domains = domains_array(&mut doc, &config_path)?;
    if domains.iter().any(|v| return v.as_str() == Some(domain.prefix())) {
        return Ok(false);
    }
    domains.push(domain.prefix());

    std::fs::write(&config_path, doc.to_string())?;
    return Ok(true);
}

/// Remove a domain from the `domains` list. When no list exists yet, every
/// domain was active, so the list is materialized without `prefix`.
///
/// # Errors
///
/// Returns `Error::UnknownDomain` for unregistered prefixes,
/// `Error::ParseFailed` if the config can't be parsed, or `Error::Io` on write failure.
pub fn disable_domain(root: &Path, prefix: &str) -> Result<bool, Error> {
    let domain = Domain::from_prefix(prefix).ok_or_else(|| {
        return Error::UnknownDomain { prefix: prefix.to_string() };
    })?;
    let (config_path, mut doc) = read_config_doc(root)?;

    if !doc.contains_key("domains") {
        let mut all = toml_edit::Array::new();
        for other in Domain::ALL.into_iter().filter(|d| return *d != domain) {
            all.push(other.prefix());
        }
        doc["domains"] = toml_edit::value(all);
        std::fs::write(&config_path, doc.to_string())?;
        return Ok(true);
    }

    let domains = domains_array(&mut doc, &config_path)?;
    let before = domains.len();
    domains.retain(|v| return v.as_str() != Some(domain.prefix()));
    if domains.len() == before {
        return Ok(false);
    }

    std::fs::write(&config_path, doc.to_string())?;
    return Ok(true);
}

/// Borrow the `domains` array of a config document.
///
/// # Errors
///
/// Returns `Error::ParseFailed` if `domains` is not an array.
fn domains_array<'a>(
    doc: &'a mut toml_edit::DocumentMut,
    config_path: &Path,
) -> Result<&'a mut toml_edit::Array, Error> {
    return doc
        .get_mut("domains")
        .and_then(toml_edit::Item::as_array_mut)
        .ok_or_else(|| {
            return Error::ParseFailed {
                file: config_path.to_path_buf(),
                reason: "`domains` must be an array of strings".to_string(),
            };
        });
}

/// Parse `.polyglot.toml` into a format-preserving document.
/// Returns an empty document if the file doesn't exist.
///
/// # Errors
///
/// Returns `Error::Io` on read failure or `Error::ParseFailed` on parse failure.
fn read_config_doc(root: &Path) -> Result<(PathBuf, toml_edit::DocumentMut), Error> {
    let config_path = root.join(CONFIG_FILE);
    let content = match std::fs::read_to_string(&config_path) {
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
        Err(e) => return Err(Error::Io(e)),
        Ok(c) => c,
    };

    let doc: toml_edit::DocumentMut = content.parse().map_err(|e: toml_edit::TomlError| {
        return Error::ParseFailed {
            file: config_path.clone(),
            reason: e.to_string(),
        };
    })?;

    return Ok((config_path, doc));
}

#[cfg(test)]
#[allow(clippy::missing_panics_doc)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_activates_everything() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(dir.path()).unwrap();
        assert_eq!(config.active_domains().len(), Domain::ALL.len());
        assert!(config.should_scan("docs/index.rst"));
    }

    #[test]
    fn include_and_exclude_prefixes() {
        let config = Config::parse("include = [\"docs/\"]\nexclude = [\"docs/old/\"]\n").unwrap();
        assert!(config.should_scan("docs/api.rst"));
        assert!(!config.should_scan("docs/old/api.rst"));
        assert!(!config.should_scan("README.md"));
    }

    #[test]
    fn listed_domains_restrict_activity() {
        let config = Config::parse("domains = [\"go\", \"rb\", \"go\"]\n").unwrap();
        assert_eq!(config.active_domains(), vec![Domain::Go, Domain::Ruby]);
        assert!(!config.is_active(Domain::Sql));
    }

    #[test]
    fn unknown_domain_is_rejected() {
        let err = Config::parse("domains = [\"cobol\"]\n").err().unwrap();
        assert!(matches!(err, Error::UnknownDomain { prefix } if prefix == "cobol"));
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), "domains = [").unwrap();
        assert!(matches!(Config::load(dir.path()), Err(Error::TomlDe(_))));
    }

    #[test]
    fn enable_preserves_other_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, "# docs only\ninclude = [\"docs/\"]\n").unwrap();

        assert!(!enable_domain(dir.path(), "go").unwrap());
        assert!(disable_domain(dir.path(), "go").unwrap());
        assert!(enable_domain(dir.path(), "go").unwrap());
        assert!(!enable_domain(dir.path(), "go").unwrap());

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("# docs only"));
        let config = Config::parse(&content).unwrap();
        assert_eq!(config.active_domains().len(), Domain::ALL.len());
        assert!(config.should_scan("docs/a.rst"));
    }

    #[test]
    fn disable_without_list_keeps_the_rest() {
        let dir = tempfile::tempdir().unwrap();
        assert!(disable_domain(dir.path(), "sql").unwrap());

        let config = Config::load(dir.path()).unwrap();
        assert!(!config.is_active(Domain::Sql));
        assert!(config.is_active(Domain::Go));
        assert_eq!(config.active_domains().len(), Domain::ALL.len().saturating_sub(1));
    }

    #[test]
    fn disable_absent_domain_is_a_no_op() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), "domains = [\"go\"]\n").unwrap();
        assert!(!disable_domain(dir.path(), "rb").unwrap());
        assert!(disable_domain(dir.path(), "go").unwrap());
        assert!(Config::load(dir.path()).unwrap().active_domains().is_empty());
    }
}
