//! Build traversal: parse every directive in document order, qualify its
//! name with the active namespace, and register it.

use crate::config::Config;
use crate::domain::{DirectiveSpec, Domain};
use crate::error::Error;
use crate::grammar::{Grammar, Parsers};
use crate::namespace::NamespaceContext;
use crate::registry::ObjectRegistry;
use crate::types::{ObjectKind, Occurrence, SignatureRecord, SourceLocation};

/// One successfully processed directive.
#[derive(Debug, Clone)]
pub struct Declaration {
    /// Domain the directive belongs to.
    pub domain: Domain,
    /// Whether the object was registered; `false` under `:no-index:`.
    pub indexed: bool,
    /// Where the directive appears.
    pub location: SourceLocation,
    /// Canonical name: the registry key and on-page anchor text.
    pub name: String,
    /// Parsed signature parts.
    pub record: SignatureRecord,
    /// Raw signature text as written.
    pub signature: String,
}

/// A directive that could not be processed. Fatal for that directive only.
#[derive(Debug)]
pub struct DirectiveFailure {
    /// Why the directive was rejected.
    pub error: Error,
    /// Where the directive appears.
    pub location: SourceLocation,
}

/// The same object declared twice in one build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateWarning {
    /// Domain of the object.
    pub domain: Domain,
    /// The earlier declaration, which the registry no longer points at.
    pub first: SourceLocation,
    /// Kind of the object.
    pub kind: ObjectKind,
    /// Canonical name of the object.
    pub name: String,
    /// The later declaration, which wins.
    pub second: SourceLocation,
}

/// Everything one build produced.
#[derive(Debug, Default)]
pub struct BuildReport {
    /// Processed directives in traversal order.
    pub declarations: Vec<Declaration>,
    /// Duplicate declarations, in the order they were detected.
    pub duplicates: Vec<DuplicateWarning>,
    /// Rejected directives, in traversal order.
    pub failures: Vec<DirectiveFailure>,
    /// Final registry state.
    pub registry: ObjectRegistry,
}

/// Drives a single build. State lives for exactly one build and is
/// mutated only in traversal order.
pub struct Builder<'a> {
    /// Project configuration deciding which domains are active.
    config: &'a Config,
    /// The active namespace. Shared by every document in the build.
    context: NamespaceContext,
    /// Compiled signature grammars.
    parsers: &'a Parsers,
    /// Accumulated results.
    report: BuildReport,
}

impl<'a> Builder<'a> {
    /// The namespace active at this point in the traversal.
    pub const fn context(&self) -> &NamespaceContext {
        return &self.context;
    }

    /// Consume the builder and return what it produced.
    pub fn finish(self) -> BuildReport {
        return self.report;
    }

    /// Start a build with an empty namespace and registry.
    pub fn new(config: &'a Config, parsers: &'a Parsers) -> Self {
        return Self {
            config,
            context: NamespaceContext::default(),
            parsers,
            report: BuildReport::default(),
        };
    }

    /// Process one directive. Directives of unknown or inactive domains belong
    /// to someone else and are skipped silently.
    pub fn process(&mut self, occurrence: &Occurrence) {
        let Some(domain) = Domain::from_prefix(&occurrence.prefix) else {
            tracing::debug!(prefix = %occurrence.prefix, "not a registered domain");
            return;
        };
        if !self.config.is_active(domain) {
            tracing::debug!(domain = domain.prefix(), "domain inactive");
            return;
        }
        let Some(spec) = domain.directive_named(&occurrence.directive) else {
            self.report.failures.push(DirectiveFailure {
                error: Error::UnknownDirective {
                    domain: domain.prefix().to_string(),
                    directive: occurrence.directive.clone(),
                },
                location: occurrence.location.clone(),
            });
            return;
        };

        let (name, record) = match describe(self.parsers, domain, spec, &occurrence.signature, &self.context) {
            Err(error) => {
                tracing::debug!(location = %occurrence.location, %error, "directive rejected");
                self.report.failures.push(DirectiveFailure { error, location: occurrence.location.clone() });
                return;
            },
            Ok(described) => described,
        };

        if spec.introduces_namespace {
            self.context.enter(&name);
        }

        if occurrence.no_index {
            tracing::debug!(location = %occurrence.location, name = %name, "not indexed");
        } else {
            self.register(domain, spec.kind, &name, &occurrence.location);
        }
        self.report.declarations.push(Declaration {
            domain,
            indexed: !occurrence.no_index,
            location: occurrence.location.clone(),
            name,
            record,
            signature: occurrence.signature.clone(),
        });
    }

    /// Record the declaration and note a duplicate if the key was taken by
    /// another document. A repeat within one document silently replaces it.
    fn register(&mut self, domain: Domain, kind: ObjectKind, name: &str, location: &SourceLocation) {
        let previous = self.report.registry.register(domain, kind, name, location.clone());
        tracing::debug!(domain = domain.prefix(), %kind, name, %location, "registered");

        if let Some(first) = previous.filter(|first| return first.document != location.document) {
            tracing::warn!(
                "duplicate {}:{kind} `{name}` at {location}, other instance at {first}",
                domain.prefix()
            );
            self.report.duplicates.push(DuplicateWarning {
                domain,
                first,
                kind,
                name: name.to_string(),
                second: location.clone(),
            });
        }
    }
}

/// Run a whole build over directives already in traversal order.
pub fn build(config: &Config, parsers: &Parsers, occurrences: &[Occurrence]) -> BuildReport {
    let mut builder = Builder::new(config, parsers);
    for occurrence in occurrences {
        builder.process(occurrence);
    }
    tracing::debug!(namespace = ?builder.context().current(), "traversal finished");
    return builder.finish();
}

/// Parse one signature and compute its canonical name under `context`.
/// Namespace-introducing directives are named by their literal argument.
///
/// # Errors
///
/// Returns `Error::MalformedSignature` if the signature does not fit the
/// directive's grammar.
pub fn describe(
    parsers: &Parsers,
    domain: Domain,
    spec: &DirectiveSpec,
    signature: &str,
    context: &NamespaceContext,
) -> Result<(String, SignatureRecord), Error> {
    let mut record = parsers.parse(spec.grammar, spec.kind, signature, context)?;
    if spec.introduces_namespace {
        record.namespace = None;
        return Ok((record.name.clone(), record));
    }
    let name = canonical_name(domain, spec, &record, context);
    return Ok((name, record));
}

/// Join the active namespace to the local name with the directive's separator.
/// Members are named after their owner: `Widget#size`.
fn canonical_name(
    domain: Domain,
    spec: &DirectiveSpec,
    record: &SignatureRecord,
    context: &NamespaceContext,
) -> String {
    let local = match (spec.grammar, &record.receiver) {
        (Grammar::Member, Some(owner)) => format!("{owner}#{}", record.name),
        _ => record.name.clone(),
    };
    return context.qualify(&local, domain.separator_for(spec));
}

#[cfg(test)]
#[allow(clippy::missing_panics_doc)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    fn occurrence(document: &str, line: u32, directive: &str, signature: &str) -> Occurrence {
        let (prefix, directive) = directive.split_once(':').unwrap();
        return Occurrence {
            directive: directive.to_string(),
            location: SourceLocation { document: PathBuf::from(document), line },
            no_index: false,
            prefix: prefix.to_string(),
            signature: signature.to_string(),
        };
    }

    fn run(config: &Config, occurrences: &[Occurrence]) -> BuildReport {
        let parsers = Parsers::compile().unwrap();
        return build(config, &parsers, occurrences);
    }

    fn names(report: &BuildReport) -> Vec<&str> {
        return report.declarations.iter().map(|d| d.name.as_str()).collect();
    }

    fn all_domains() -> Config {
        return Config::parse("").unwrap();
    }

    #[test]
    fn qualifies_members_with_each_language_separator() {
        let cases = [
            ("go:package", "http", "go:function", "Get(url string)", "http.Get"),
            ("rust:module", "io", "rust:function", "fn read(buf: &mut [u8]) -> usize", "io::read"),
            ("php:namespace", "App", "php:function", "boot()", "App\\boot"),
            ("erl:module", "lists", "erl:function", "reverse(List)", "lists:reverse"),
            ("rb:class", "String", "rb:method", "upcase()", "String#upcase"),
        ];
        for (scope, namespace, member, signature, expected) in cases {
            let report = run(&all_domains(), &[
                occurrence("a.rst", 1, scope, namespace),
                occurrence("a.rst", 2, member, signature),
            ]);
            assert!(report.failures.is_empty(), "{member}: {:?}", report.failures);
            assert_eq!(names(&report), vec![namespace, expected]);
        }
    }

    #[test]
    fn go_method_is_registered_under_package() {
        let report = run(&all_domains(), &[
            occurrence("net.rst", 1, "go:package", "net/http"),
            occurrence("net.rst", 4, "go:function", "func (s *Server) Handle(req *Request) error"),
        ]);
        let handle = report.declarations.get(1).unwrap();
        assert_eq!(handle.name, "net/http.Handle");
        assert_eq!(handle.record.receiver.as_deref(), Some("s *Server"));
        assert_eq!(handle.record.namespace.as_deref(), Some("net/http"));
        assert!(report.registry.lookup(Domain::Go, ObjectKind::Function, "net/http.Handle").is_some());
    }

    #[test]
    fn property_is_named_after_its_owner() {
        let report = run(&all_domains(), &[
            occurrence("ui.rst", 1, "swift:module", "UIKit"),
            occurrence("ui.rst", 2, "swift:property", "Widget#size: Int"),
        ]);
        assert_eq!(names(&report), vec!["UIKit", "UIKit.Widget#size"]);
    }

    #[test]
    fn members_without_namespace_stay_bare() {
        let report = run(&all_domains(), &[occurrence("a.rst", 1, "c:function", "int open(const char *path)")]);
        assert!(report.failures.is_empty());
        assert_eq!(names(&report), vec!["open"]);
    }

    #[test]
    fn nested_scope_replaces_outer_namespace() {
        let report = run(&all_domains(), &[
            occurrence("a.rst", 1, "rb:module", "Net"),
            occurrence("a.rst", 2, "rb:class", "HTTP"),
            occurrence("a.rst", 3, "rb:constant", "VERSION"),
        ]);
        assert_eq!(names(&report), vec!["Net", "HTTP", "HTTP::VERSION"]);
    }

    #[test]
    fn namespace_carries_across_documents() {
        let report = run(&all_domains(), &[
            occurrence("a.rst", 1, "go:package", "io"),
            occurrence("b.rst", 1, "go:type", "Reader"),
        ]);
        assert_eq!(names(&report), vec!["io", "io.Reader"]);
    }

    #[test]
    fn duplicate_warns_once_and_later_wins() {
        let report = run(&all_domains(), &[
            occurrence("a.rst", 3, "sql:table", "users"),
            occurrence("b.rst", 9, "sql:table", "users"),
        ]);
        assert_eq!(report.duplicates.len(), 1);
        let warning = report.duplicates.first().unwrap();
        assert_eq!(warning.first.document, PathBuf::from("a.rst"));
        assert_eq!(warning.second.document, PathBuf::from("b.rst"));
        let winner = report.registry.lookup(Domain::Sql, ObjectKind::Table, "users").unwrap();
        assert_eq!(winner.document, PathBuf::from("b.rst"));
        assert_eq!(report.registry.len(), 1);
    }

    #[test]
    fn repeat_within_one_document_replaces_without_warning() {
        let report = run(&all_domains(), &[
            occurrence("a.rst", 3, "sql:table", "users"),
            occurrence("a.rst", 9, "sql:table", "users"),
        ]);
        assert!(report.duplicates.is_empty());
        let winner = report.registry.lookup(Domain::Sql, ObjectKind::Table, "users").unwrap();
        assert_eq!(winner.line, 9);
        assert_eq!(report.registry.len(), 1);
    }

    #[test]
    fn no_index_describes_without_registering() {
        let mut hidden = occurrence("b.rst", 2, "sql:table", "users");
        hidden.no_index = true;
        let report = run(&all_domains(), &[occurrence("a.rst", 1, "sql:table", "users"), hidden]);
        assert!(report.duplicates.is_empty());
        assert_eq!(report.declarations.len(), 2);
        let winner = report.registry.lookup(Domain::Sql, ObjectKind::Table, "users").unwrap();
        assert_eq!(winner.document, PathBuf::from("a.rst"));
    }

    #[test]
    fn no_index_scope_still_sets_namespace() {
        let mut scope = occurrence("a.rst", 1, "go:package", "io");
        scope.no_index = true;
        let report = run(&all_domains(), &[scope, occurrence("a.rst", 2, "go:type", "Reader")]);
        assert_eq!(names(&report), vec!["io", "io.Reader"]);
        assert_eq!(report.registry.len(), 1);
    }

    #[test]
    fn malformed_signature_fails_only_that_directive() {
        let report = run(&all_domains(), &[
            occurrence("a.rst", 1, "go:package", "io"),
            occurrence("a.rst", 2, "go:function", "Read"),
            occurrence("a.rst", 3, "go:function", "Write(p []byte) (int, error)"),
        ]);
        assert_eq!(report.failures.len(), 1);
        let failure = report.failures.first().unwrap();
        assert_eq!(failure.location.line, 2);
        assert!(matches!(failure.error, Error::MalformedSignature { .. }));
        assert_eq!(names(&report), vec!["io", "io.Write"]);
    }

    #[test]
    fn unknown_directive_of_active_domain_fails() {
        let report = run(&all_domains(), &[occurrence("a.rst", 1, "go:trigger", "on_insert")]);
        assert_eq!(report.failures.len(), 1);
        assert!(matches!(
            &report.failures.first().unwrap().error,
            Error::UnknownDirective { domain, directive } if domain == "go" && directive == "trigger"
        ));
    }

    #[test]
    fn foreign_and_inactive_domains_are_skipped() {
        let config = Config::parse("domains = [\"go\"]\n").unwrap();
        let report = run(&config, &[
            occurrence("a.rst", 1, "py:function", "spam()"),
            occurrence("a.rst", 2, "sql:table", "users"),
            occurrence("a.rst", 3, "go:type", "Reader"),
        ]);
        assert!(report.failures.is_empty());
        assert_eq!(names(&report), vec!["Reader"]);
    }

    #[test]
    fn failed_scope_leaves_namespace_untouched() {
        let parsers = Parsers::compile().unwrap();
        let config = all_domains();
        let mut builder = Builder::new(&config, &parsers);
        builder.process(&occurrence("a.rst", 1, "go:package", "io"));
        builder.process(&occurrence("a.rst", 2, "go:package", "   "));
        assert_eq!(builder.context().current(), Some("io"));
        let report = builder.finish();
        assert_eq!(report.failures.len(), 1);
    }
}
