//! Core CLI commands for polyglot: build, check, parse, lookup, domain.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use serde::Serialize;

use crate::builder::{self, BuildReport};
use crate::config;
use crate::diagnostics;
use crate::domain::{DirectiveSpec, Domain};
use crate::error;
use crate::grammar::Parsers;
use crate::index::{INDEX_FILE, ObjectIndex};
use crate::namespace::NamespaceContext;
use crate::scanner::{self, DirectivePatterns};
use crate::types::SignatureRecord;

/// JSON shape of `polyglot parse --json`.
#[derive(Serialize)]
struct ParsedJson<'a> {
    /// Canonical (qualified) name.
    canonical: &'a str,
    /// Domain prefix.
    domain: &'a str,
    /// Parsed signature parts.
    record: &'a SignatureRecord,
}

/// Scan, parse and register everything, write the index.
///
/// # Errors
///
/// Returns errors from config loading, scanning, or index writing.
/// Bad directives are reported, not returned.
pub fn build() -> Result<ExitCode, error::Error> {
    let root = PathBuf::from(".");
    let report = run_build(&root)?;

    let index = ObjectIndex::from_report(&report);
    index.write(&root.join(INDEX_FILE))?;
    print_report(&report);
    let count = index.entries.len();
    eprintln!("Wrote {count} objects to {INDEX_FILE}");

    return Ok(exit_code_for(&report));
}

/// Scan, parse and register everything without writing the index.
///
/// # Errors
///
/// Returns errors from config loading or scanning.
pub fn check() -> Result<ExitCode, error::Error> {
    let root = PathBuf::from(".");
    let report = run_build(&root)?;
    print_report(&report);
    return Ok(exit_code_for(&report));
}

/// Remove a domain from the active set in `.polyglot.toml`.
///
/// # Errors
///
/// Returns errors from config editing.
pub fn disable(prefix: &str) -> Result<(), error::Error> {
    let root = PathBuf::from(".");
    if config::disable_domain(&root, prefix)? {
        eprintln!("Disabled domain: {prefix}");
    } else {
        eprintln!("Domain already inactive: {prefix}");
    }
    return Ok(());
}

/// List registered domains and their directives.
pub fn domains(json: bool) {
    return crate::info::run(json);
}

/// Add a domain back to the active set in `.polyglot.toml`.
///
/// # Errors
///
/// Returns errors from config editing.
pub fn enable(prefix: &str) -> Result<(), error::Error> {
    let root = PathBuf::from(".");
    if config::enable_domain(&root, prefix)? {
        eprintln!("Enabled domain: {prefix}");
    } else {
        eprintln!("Domain already active: {prefix}");
    }
    return Ok(());
}

/// Build exit code: errors (2) > duplicate warnings (1) > clean (0).
pub fn exit_code_for(report: &BuildReport) -> ExitCode {
    if !report.failures.is_empty() {
        return ExitCode::from(2);
    } else if !report.duplicates.is_empty() {
        return ExitCode::from(1);
    } else {
        return ExitCode::SUCCESS;
    }
}

/// Find where an object is declared, using the index from the last build.
///
/// # Errors
///
/// Returns `Error::IndexNotFound` before the first build,
/// `Error::ObjectNotFound` if nothing matches, or directive parse errors.
pub fn lookup(directive: &str, name: &str, json: bool) -> Result<(), error::Error> {
    let root = PathBuf::from(".");
    let (domain, spec) = split_directive(directive)?;
    let index = ObjectIndex::read(&root.join(INDEX_FILE))?;

    let Some(entry) = index.find(domain.prefix(), spec.kind, name) else {
        return Err(error::Error::ObjectNotFound {
            domain: domain.prefix().to_string(),
            kind: spec.kind.to_string(),
            name: name.to_string(),
        });
    };

    if json {
        // serde_json::to_string_pretty won't fail on this structure.
        let out = serde_json::to_string_pretty(entry).unwrap_or_default();
        println!("{out}");
    } else {
        println!("{}:{}#{}", entry.document.display(), entry.line, entry.anchor);
        println!("    {}", entry.signature);
    }
    return Ok(());
}

/// Parse a single signature the way a build would and print the parts.
///
/// # Errors
///
/// Returns directive parse errors or `Error::MalformedSignature`.
pub fn parse(directive: &str, signature: &str, namespace: Option<&str>, json: bool) -> Result<(), error::Error> {
    let (domain, spec) = split_directive(directive)?;
    let parsers = Parsers::compile()?;
    let mut context = NamespaceContext::default();
    if let Some(ns) = namespace {
        context.enter(ns);
    }

    let (canonical, record) = builder::describe(&parsers, domain, spec, signature, &context)?;

    if json {
        let parsed = ParsedJson { canonical: &canonical, domain: domain.prefix(), record: &record };
        // serde_json::to_string_pretty won't fail on this structure.
        let out = serde_json::to_string_pretty(&parsed).unwrap_or_default();
        println!("{out}");
        return Ok(());
    }

    println!("name        {canonical}");
    println!("kind        {}:{}", domain.prefix(), record.kind);
    print_optional("receiver", record.receiver.as_deref());
    print_optional("namespace", record.namespace.as_deref());
    print_optional("parameters", record.parameters.as_deref());
    print_optional("returns", record.return_type.as_deref());
    return Ok(());
}

/// Print a labelled value only when present.
fn print_optional(label: &str, value: Option<&str>) {
    if let Some(v) = value {
        println!("{label:<12}{v}");
    }
    return;
}

/// Print every failure and duplicate as a diagnostic, then a summary line.
fn print_report(report: &BuildReport) {
    for failure in &report.failures {
        diagnostics::print_markdown(&diagnostics::render_failure(failure));
        eprintln!();
    }
    for duplicate in &report.duplicates {
        diagnostics::print_markdown(&diagnostics::render_duplicate(duplicate));
        eprintln!();
    }

    if report.registry.is_empty() && report.failures.is_empty() {
        eprintln!("No object directives found. Write them as `.. go:function:: ...` in .rst/.md/.txt files.");
    }

    let mut per_domain: BTreeMap<&str, usize> = BTreeMap::new();
    for (key, _) in report.registry.entries() {
        let count = per_domain.entry(key.domain.prefix()).or_default();
        *count = count.saturating_add(1);
    }
    for (prefix, count) in &per_domain {
        eprintln!("  {prefix:<6}{count}");
    }

    let objects = report.registry.len();
    let warnings = report.duplicates.len();
    let errors = report.failures.len();
    eprintln!("{objects} objects, {warnings} warnings, {errors} errors");
    return;
}

/// Load config, scan the documentation, and run one build.
///
/// # Errors
///
/// Returns errors from config loading, pattern compilation, or scanning.
pub fn run_build(root: &Path) -> Result<BuildReport, error::Error> {
    let config = config::Config::load(root)?;
    let patterns = DirectivePatterns::compile()?;
    let parsers = Parsers::compile()?;

    let occurrences = scanner::scan(root, &config, &patterns)?;
    tracing::info!(directives = occurrences.len(), "scan complete");
    return Ok(builder::build(&config, &parsers, &occurrences));
}

/// Split `domain:directive` into a registered domain and directive.
///
/// # Errors
///
/// Returns `Error::ParseFailed` without a colon, `Error::UnknownDomain`,
/// or `Error::UnknownDirective`.
fn split_directive(input: &str) -> Result<(Domain, &'static DirectiveSpec), error::Error> {
    let Some((prefix, directive)) = input.split_once(':') else {
        return Err(error::Error::ParseFailed {
            file: PathBuf::from(input),
            reason: "expected domain:directive format, e.g. go:function".to_string(),
        });
    };
    let domain = Domain::from_prefix(prefix).ok_or_else(|| {
        return error::Error::UnknownDomain { prefix: prefix.to_string() };
    })?;
    let spec = domain.directive_named(directive).ok_or_else(|| {
        return error::Error::UnknownDirective {
            domain: prefix.to_string(),
            directive: directive.to_string(),
        };
    })?;
    return Ok((domain, spec));
}

#[cfg(test)]
#[allow(clippy::missing_panics_doc)]
mod tests {
    use super::*;
    use crate::types::ObjectKind;

    #[test]
    fn splits_known_directive() {
        let (domain, spec) = split_directive("rb:method").unwrap();
        assert_eq!(domain, Domain::Ruby);
        assert_eq!(spec.kind, ObjectKind::Method);
    }

    #[test]
    fn rejects_bad_directive_strings() {
        assert!(matches!(split_directive("function"), Err(error::Error::ParseFailed { .. })));
        assert!(matches!(split_directive("py:function"), Err(error::Error::UnknownDomain { .. })));
        assert!(matches!(split_directive("go:view"), Err(error::Error::UnknownDirective { .. })));
    }

    #[test]
    fn run_build_reads_config_and_documents() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(config::CONFIG_FILE), "domains = [\"go\"]\n").unwrap();
        std::fs::write(
            dir.path().join("api.rst"),
            ".. go:package:: io\n\n.. go:type:: Reader\n\n.. sql:table:: users\n",
        )
        .unwrap();

        let report = run_build(dir.path()).unwrap();
        assert_eq!(report.registry.len(), 2);
        assert!(report.registry.lookup(Domain::Go, ObjectKind::Type, "io.Reader").is_some());
        assert!(report.failures.is_empty());
        assert!(report.duplicates.is_empty());
    }
}
