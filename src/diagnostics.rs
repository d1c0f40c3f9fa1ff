use std::fmt::Write as _;

use crate::builder::{DirectiveFailure, DuplicateWarning};
use crate::domain::Domain;
use crate::error::Error;

/// ANSI bold.
const BOLD: &str = "\x1b[1m";
/// ANSI reset.
const RESET: &str = "\x1b[0m";

/// Print a rendered markdown block to stderr with bold headings.
pub fn print_markdown(md: &str) {
    for line in md.lines() {
        if line.starts_with('#') {
            eprintln!("{BOLD}{line}{RESET}");
        } else {
            eprintln!("{line}");
        }
    }
}

/// Render an error as valid markdown and print it to stderr.
pub fn print_error(e: &Error) {
    print_markdown(&render_error(e));
}

/// Render a rejected directive: where it is, then what is wrong with it.
pub fn render_failure(failure: &DirectiveFailure) -> String {
    let mut out = render_error(&failure.error);
    let _ = write!(out, "\n## Location\n\n    {}\n", failure.location);
    return out;
}

/// Render a duplicate declaration warning naming both locations.
pub fn render_duplicate(warning: &DuplicateWarning) -> String {
    return format!(
        "\
# Warning: Duplicate Object Description

{}:{} `{}` is declared at `{}` and again at `{}`.
The later declaration is used for cross-references.

## Fix

Keep one declaration and mark the other with `:no-index:`, or rename it.
",
        warning.domain.prefix(),
        warning.kind,
        warning.name,
        warning.first,
        warning.second,
    );
}

/// Render an error as a structured markdown diagnostic.
///
/// Each variant produces a block with what happened and how to fix it.
pub fn render_error(e: &Error) -> String {
    return match e {
        Error::IndexNotFound { .. } => render_index_not_found(),
        Error::MalformedSignature { grammar, signature } => render_malformed_signature(grammar, signature),
        Error::ObjectNotFound { domain, kind, name } => render_object_not_found(domain, kind, name),
        Error::UnknownDirective { domain, directive } => render_unknown_directive(domain, directive),
        Error::UnknownDomain { prefix } => render_unknown_domain(prefix),
        _ => render_generic(e),
    };
}

/// Variants that need no more than a heading and the message.
fn render_generic(e: &Error) -> String {
    return match e {
        Error::IndexCorrupt { reason } => format!("\
# Error: Index Corrupt

{reason}

## Fix

Regenerate the index:

    polyglot build
"),

        Error::Io(e) => format!("\
# Error: I/O

{e}
"),

        Error::ParseFailed { file, reason } => format!("\
# Error: Parse Failed

Could not parse `{}`: {reason}
", file.display()),

        Error::Pattern(e) => format!("\
# Error: Invalid Pattern

{e}
"),

        Error::TomlDe(e) => format!("\
# Error: Invalid TOML

{e}
"),

        Error::TomlSer(e) => format!("\
# Error: TOML Serialization

{e}
"),

        // Already handled in render_error, but need exhaustive match.
        _ => format!("\
# Error

{e}
"),
    };
}

/// Expected shape for each grammar, shown next to a rejected signature.
fn grammar_example(grammar: &str) -> &'static str {
    return match grammar {
        "call" => "[modifiers] [keyword] [(receiver)] name(parameters) [return type]",
        "member" => "Owner#member: Type",
        "relational call" => "name(parameters) [RETURNS type]",
        _ => "name",
    };
}

fn render_index_not_found() -> String {
    return "\
# Error: Index Not Found

`.polyglot.index` does not exist.

## Fix

Run `polyglot build` to scan the documentation and write the index:

    polyglot build
"
    .to_string();
}

fn render_malformed_signature(grammar: &str, signature: &str) -> String {
    let expected = grammar_example(grammar);
    return format!(
        "\
# Error: Malformed Signature

`{signature}` does not match the {grammar} grammar.

## Expected

    {expected}
"
    );
}

fn render_object_not_found(domain: &str, kind: &str, name: &str) -> String {
    return format!(
        "\
# Error: Object Not Found

No {domain}:{kind} named `{name}` is in `.polyglot.index`.

## Fix

Names are qualified with their namespace. Rebuild the index if the
documentation changed:

    polyglot build
"
    );
}

fn render_unknown_directive(domain: &str, directive: &str) -> String {
    let mut out = format!(
        "\
# Error: Unknown Directive

The `{domain}` domain has no `{directive}` directive.
"
    );

    if let Some(registered) = Domain::from_prefix(domain) {
        out.push_str("\n## Available directives\n\n");
        for spec in registered.directives() {
            let _ = writeln!(out, "- `{domain}:{}`", spec.kind);
        }
    }
    return out;
}

fn render_unknown_domain(prefix: &str) -> String {
    let mut out = format!(
        "\
# Error: Unknown Domain

No domain is registered under `{prefix}`.

## Registered domains

"
    );
    for domain in Domain::ALL {
        let _ = writeln!(out, "- `{}` ({})", domain.prefix(), domain.label());
    }
    return out;
}
