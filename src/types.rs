/// Core domain types for polyglot declarations and their locations.
use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Position of a directive in a documentation file.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SourceLocation {
    /// Documentation file containing the directive, relative to the build root.
    pub document: PathBuf,
    /// One-based line number of the directive.
    pub line: u32,
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        return write!(f, "{}:{}", self.document.display(), self.line);
    }
}

/// Every kind of object a directive can declare. The set is closed; each
/// domain registers the subset that makes sense for its language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectKind {
    /// A .NET assembly.
    Assembly,
    /// A typed communication channel.
    Channel,
    /// A class or object type.
    Class,
    /// A named constant.
    Constant,
    /// A free function or procedure.
    Function,
    /// A C header file.
    Header,
    /// A linkable library or crate.
    Library,
    /// A method attached to a class.
    Method,
    /// A module.
    Module,
    /// A namespace.
    Namespace,
    /// A package.
    Package,
    /// A typed member of a class.
    Property,
    /// A database schema.
    Schema,
    /// A build system definition (ASDF system).
    System,
    /// A database table.
    Table,
    /// A database trigger.
    Trigger,
    /// A type declaration.
    Type,
    /// A database view.
    View,
}

impl ObjectKind {
    /// Every kind, in directive-name order.
    pub const ALL: [Self; 18] = [
        Self::Assembly,
        Self::Channel,
        Self::Class,
        Self::Constant,
        Self::Function,
        Self::Header,
        Self::Library,
        Self::Method,
        Self::Module,
        Self::Namespace,
        Self::Package,
        Self::Property,
        Self::Schema,
        Self::System,
        Self::Table,
        Self::Trigger,
        Self::Type,
        Self::View,
    ];

    /// The directive name for this kind, e.g. `function`.
    pub const fn as_str(self) -> &'static str {
        return match self {
            Self::Assembly => "assembly",
            Self::Channel => "channel",
            Self::Class => "class",
            Self::Constant => "constant",
            Self::Function => "function",
            Self::Header => "header",
            Self::Library => "library",
            Self::Method => "method",
            Self::Module => "module",
            Self::Namespace => "namespace",
            Self::Package => "package",
            Self::Property => "property",
            Self::Schema => "schema",
            Self::System => "system",
            Self::Table => "table",
            Self::Trigger => "trigger",
            Self::Type => "type",
            Self::View => "view",
        };
    }

    /// Parse a directive name back into a kind.
    pub fn from_directive(name: &str) -> Option<Self> {
        return Self::ALL.into_iter().find(|k| return k.as_str() == name);
    }
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        return f.write_str(self.as_str());
    }
}

/// A directive found in a documentation file, before its signature is parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Occurrence {
    /// Directive name after the colon, e.g. `function`.
    pub directive: String,
    /// Where the directive appears.
    pub location: SourceLocation,
    /// Set by a `:no-index:` option: describe the object but keep it out of the registry.
    pub no_index: bool,
    /// Domain prefix before the colon, e.g. `go`.
    pub prefix: String,
    /// Raw signature text following the directive marker.
    pub signature: String,
}

/// Parsed result of one declaration. Produced and consumed within a single
/// directive invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SignatureRecord {
    /// Kind of object declared.
    pub kind: ObjectKind,
    /// Local (unqualified) name as written in the signature.
    pub name: String,
    /// Active namespace at parse time, if any.
    pub namespace: Option<String>,
    /// Raw parameter list, verbatim and unsplit.
    pub parameters: Option<String>,
    /// Method receiver, or the owning type of a property.
    pub receiver: Option<String>,
    /// Return or value type annotation.
    pub return_type: Option<String>,
}
