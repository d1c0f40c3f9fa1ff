/// Crate-level error types for polyglot diagnostics.
use std::path::PathBuf;

/// All errors in polyglot carry enough context to produce a useful diagnostic
/// without a debugger. Each variant names the file, directive, or signature at fault.
#[allow(clippy::error_impl_error, reason = "crate-internal error type in binary")]
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The object index exists but cannot be trusted.
    #[error("index corrupt: {reason}")]
    IndexCorrupt {
        /// Description of the corruption.
        reason: String,
    },

    /// Expected object index does not exist on disk.
    #[error("index not found: {}", path.display())]
    IndexNotFound {
        /// Path to the missing index.
        path: PathBuf,
    },

    /// Underlying I/O error from the filesystem.
    #[error("io: {0}")]
    Io(
        /// The wrapped I/O error.
        #[from]
        std::io::Error,
    ),

    /// A signature does not have the shape its grammar requires.
    #[error("malformed {grammar} signature: `{signature}`")]
    MalformedSignature {
        /// Name of the grammar that rejected the signature.
        grammar: &'static str,
        /// The raw signature text.
        signature: String,
    },

    /// No object with this key was found in the index.
    #[error("object not found: {domain}:{kind} `{name}`")]
    ObjectNotFound {
        /// Domain prefix of the lookup.
        domain: String,
        /// Directive name of the lookup.
        kind: String,
        /// Qualified name that was searched for.
        name: String,
    },

    /// A config or directive argument could not be parsed.
    #[error("parse failed: {}: {reason}", file.display())]
    ParseFailed {
        /// File (or pseudo-path) that failed to parse.
        file: PathBuf,
        /// Description of the parse failure.
        reason: String,
    },

    /// A built-in signature pattern failed to compile.
    #[error("pattern: {0}")]
    Pattern(
        /// The wrapped regex compilation error.
        #[from]
        regex::Error,
    ),

    /// TOML deserialization failed.
    #[error("toml deserialize: {0}")]
    TomlDe(
        /// The wrapped TOML deserialization error.
        #[from]
        toml::de::Error,
    ),

    /// TOML serialization failed.
    #[error("toml serialize: {0}")]
    TomlSer(
        /// The wrapped TOML serialization error.
        #[from]
        toml::ser::Error,
    ),

    /// A domain exists but does not register this directive.
    #[error("unknown directive: {domain}:{directive}")]
    UnknownDirective {
        /// Domain prefix, e.g. `go`.
        domain: String,
        /// Directive name that the domain does not register.
        directive: String,
    },

    /// No domain is registered under this prefix.
    #[error("unknown domain: `{prefix}`")]
    UnknownDomain {
        /// The unrecognized prefix.
        prefix: String,
    },

    /// The filesystem watcher could not be started.
    #[error("watch: {reason}")]
    Watch {
        /// Description of the watcher failure.
        reason: String,
    },
}
