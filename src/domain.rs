//! Directive registration table: which directives each language domain
//! provides, and how each one parses and qualifies its signature.

use crate::grammar::Grammar;
use crate::types::ObjectKind;

/// How one directive of one domain behaves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirectiveSpec {
    /// Grammar used to parse the signature.
    pub grammar: Grammar,
    /// Whether the directive replaces the active namespace.
    pub introduces_namespace: bool,
    /// Kind of object the directive declares.
    pub kind: ObjectKind,
    /// Separator override; `None` uses the domain default.
    pub separator: Option<&'static str>,
}

impl DirectiveSpec {
    /// A member directive joined with a separator other than the domain default.
    const fn joined(kind: ObjectKind, grammar: Grammar, separator: &'static str) -> Self {
        return Self { grammar, introduces_namespace: false, kind, separator: Some(separator) };
    }

    /// An ordinary member directive.
    const fn member(kind: ObjectKind, grammar: Grammar) -> Self {
        return Self { grammar, introduces_namespace: false, kind, separator: None };
    }

    /// A namespace-introducing directive. Its signature is the bare namespace token.
    const fn scope(kind: ObjectKind) -> Self {
        return Self { grammar: Grammar::Name, introduces_namespace: true, kind, separator: None };
    }
}

/// C: headers and free functions.
const C: &[DirectiveSpec] = &[
    DirectiveSpec::member(ObjectKind::Constant, Grammar::Name),
    DirectiveSpec::member(ObjectKind::Function, Grammar::Call),
    DirectiveSpec::member(ObjectKind::Header, Grammar::Name),
    DirectiveSpec::member(ObjectKind::Type, Grammar::Name),
];

/// C#: assemblies, namespaces and classes.
const CSHARP: &[DirectiveSpec] = &[
    DirectiveSpec::member(ObjectKind::Assembly, Grammar::Name),
    DirectiveSpec::scope(ObjectKind::Class),
    DirectiveSpec::member(ObjectKind::Constant, Grammar::Name),
    DirectiveSpec::member(ObjectKind::Method, Grammar::Call),
    DirectiveSpec::scope(ObjectKind::Namespace),
    DirectiveSpec::member(ObjectKind::Property, Grammar::Member),
];

/// Elixir: modules and functions.
const ELIXIR: &[DirectiveSpec] = &[
    DirectiveSpec::member(ObjectKind::Function, Grammar::Call),
    DirectiveSpec::scope(ObjectKind::Module),
];

/// Erlang: modules and functions, joined with `:`.
const ERLANG: &[DirectiveSpec] = &[
    DirectiveSpec::member(ObjectKind::Function, Grammar::Call),
    DirectiveSpec::scope(ObjectKind::Module),
];

/// Go: packages, functions with optional receivers, types and channels.
const GO: &[DirectiveSpec] = &[
    DirectiveSpec::member(ObjectKind::Channel, Grammar::Name),
    DirectiveSpec::member(ObjectKind::Constant, Grammar::Name),
    DirectiveSpec::member(ObjectKind::Function, Grammar::Call),
    DirectiveSpec::scope(ObjectKind::Package),
    DirectiveSpec::member(ObjectKind::Type, Grammar::Name),
];

/// Kotlin: packages, classes, functions and properties.
const KOTLIN: &[DirectiveSpec] = &[
    DirectiveSpec::scope(ObjectKind::Class),
    DirectiveSpec::member(ObjectKind::Function, Grammar::Call),
    DirectiveSpec::scope(ObjectKind::Package),
    DirectiveSpec::member(ObjectKind::Property, Grammar::Member),
];

/// Common Lisp: ASDF systems, packages and functions, joined with `:`.
const LISP: &[DirectiveSpec] = &[
    DirectiveSpec::member(ObjectKind::Constant, Grammar::Name),
    DirectiveSpec::member(ObjectKind::Function, Grammar::Call),
    DirectiveSpec::scope(ObjectKind::Package),
    DirectiveSpec::member(ObjectKind::System, Grammar::Name),
];

/// PHP: namespaces joined with `\`.
const PHP: &[DirectiveSpec] = &[
    DirectiveSpec::member(ObjectKind::Class, Grammar::Name),
    DirectiveSpec::member(ObjectKind::Constant, Grammar::Name),
    DirectiveSpec::member(ObjectKind::Function, Grammar::Call),
    DirectiveSpec::scope(ObjectKind::Namespace),
];

/// Ruby: modules and classes joined with `::`, instance methods with `#`.
const RUBY: &[DirectiveSpec] = &[
    DirectiveSpec::scope(ObjectKind::Class),
    DirectiveSpec::member(ObjectKind::Constant, Grammar::Name),
    DirectiveSpec::joined(ObjectKind::Method, Grammar::Call, "#"),
    DirectiveSpec::scope(ObjectKind::Module),
];

/// Rust: crates, modules and items joined with `::`.
const RUST: &[DirectiveSpec] = &[
    DirectiveSpec::member(ObjectKind::Constant, Grammar::Name),
    DirectiveSpec::member(ObjectKind::Function, Grammar::Call),
    DirectiveSpec::member(ObjectKind::Library, Grammar::Name),
    DirectiveSpec::scope(ObjectKind::Module),
    DirectiveSpec::member(ObjectKind::Type, Grammar::Name),
];

/// SQL: schema objects and routines.
const SQL: &[DirectiveSpec] = &[
    DirectiveSpec::member(ObjectKind::Function, Grammar::Relational),
    DirectiveSpec::scope(ObjectKind::Schema),
    DirectiveSpec::member(ObjectKind::Table, Grammar::Name),
    DirectiveSpec::member(ObjectKind::Trigger, Grammar::Name),
    DirectiveSpec::member(ObjectKind::View, Grammar::Name),
];

/// Swift: modules, classes, functions and properties.
const SWIFT: &[DirectiveSpec] = &[
    DirectiveSpec::scope(ObjectKind::Class),
    DirectiveSpec::member(ObjectKind::Constant, Grammar::Name),
    DirectiveSpec::member(ObjectKind::Function, Grammar::Call),
    DirectiveSpec::scope(ObjectKind::Module),
    DirectiveSpec::member(ObjectKind::Property, Grammar::Member),
];

/// A language domain. Each registers a fixed set of directives under its prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Domain {
    /// C (`c:`).
    C,
    /// C# (`cs:`).
    CSharp,
    /// Elixir (`ex:`).
    Elixir,
    /// Erlang (`erl:`).
    Erlang,
    /// Go (`go:`).
    Go,
    /// Kotlin (`kt:`).
    Kotlin,
    /// Common Lisp (`cl:`).
    Lisp,
    /// PHP (`php:`).
    Php,
    /// Ruby (`rb:`).
    Ruby,
    /// Rust (`rust:`).
    Rust,
    /// SQL (`sql:`).
    Sql,
    /// Swift (`swift:`).
    Swift,
}

impl Domain {
    /// Every registered domain.
    pub const ALL: [Self; 12] = [
        Self::C,
        Self::CSharp,
        Self::Elixir,
        Self::Erlang,
        Self::Go,
        Self::Kotlin,
        Self::Lisp,
        Self::Php,
        Self::Ruby,
        Self::Rust,
        Self::Sql,
        Self::Swift,
    ];

    /// Look up the spec for `kind`, if this domain registers it.
    pub fn directive(self, kind: ObjectKind) -> Option<&'static DirectiveSpec> {
        return self.directives().iter().find(|d| return d.kind == kind);
    }

    /// Look up a directive by name, e.g. `function`.
    pub fn directive_named(self, name: &str) -> Option<&'static DirectiveSpec> {
        return ObjectKind::from_directive(name).and_then(|kind| return self.directive(kind));
    }

    /// All directives registered by this domain.
    pub const fn directives(self) -> &'static [DirectiveSpec] {
        return match self {
            Self::C => C,
            Self::CSharp => CSHARP,
            Self::Elixir => ELIXIR,
            Self::Erlang => ERLANG,
            Self::Go => GO,
            Self::Kotlin => KOTLIN,
            Self::Lisp => LISP,
            Self::Php => PHP,
            Self::Ruby => RUBY,
            Self::Rust => RUST,
            Self::Sql => SQL,
            Self::Swift => SWIFT,
        };
    }

    /// Resolve a directive prefix such as `go` or `rb`.
    pub fn from_prefix(prefix: &str) -> Option<Self> {
        return Self::ALL.into_iter().find(|d| return d.prefix() == prefix);
    }

    /// Human-readable language name.
    pub const fn label(self) -> &'static str {
        return match self {
            Self::C => "C",
            Self::CSharp => "C#",
            Self::Elixir => "Elixir",
            Self::Erlang => "Erlang",
            Self::Go => "Go",
            Self::Kotlin => "Kotlin",
            Self::Lisp => "Common Lisp",
            Self::Php => "PHP",
            Self::Ruby => "Ruby",
            Self::Rust => "Rust",
            Self::Sql => "SQL",
            Self::Swift => "Swift",
        };
    }

    /// Directive prefix, the part before the colon.
    pub const fn prefix(self) -> &'static str {
        return match self {
            Self::C => "c",
            Self::CSharp => "cs",
            Self::Elixir => "ex",
            Self::Erlang => "erl",
            Self::Go => "go",
            Self::Kotlin => "kt",
            Self::Lisp => "cl",
            Self::Php => "php",
            Self::Ruby => "rb",
            Self::Rust => "rust",
            Self::Sql => "sql",
            Self::Swift => "swift",
        };
    }

    /// Default separator between a namespace and a member name.
    pub const fn separator(self) -> &'static str {
        return match self {
            Self::C | Self::CSharp | Self::Elixir | Self::Go | Self::Kotlin | Self::Sql | Self::Swift => ".",
            Self::Erlang | Self::Lisp => ":",
            Self::Php => "\\",
            Self::Ruby | Self::Rust => "::",
        };
    }

    /// Separator for a directive, honoring its override.
    pub fn separator_for(self, spec: &DirectiveSpec) -> &'static str {
        return spec.separator.unwrap_or_else(|| return self.separator());
    }
}
