//! Signature grammars: decompose a one-line directive signature into its parts.

use regex::Regex;

use crate::error::Error;
use crate::namespace::NamespaceContext;
use crate::types::{ObjectKind, SignatureRecord};

/// Shape of a signature. Each directive in the domain table picks one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Grammar {
    /// `[modifiers] [keyword] [(receiver)] [ret] name(params) [ret]`
    Call,
    /// `owner#member: type`
    Member,
    /// The whole signature is the name.
    Name,
    /// `name(params) [RETURNS] [ret]`, as written for query-language routines.
    Relational,
}

impl Grammar {
    /// Short label used in diagnostics.
    pub const fn label(self) -> &'static str {
        return match self {
            Self::Call => "call",
            Self::Member => "member",
            Self::Name => "name",
            Self::Relational => "relational call",
        };
    }
}

/// Visibility and declaration modifiers written before a call signature.
/// None of them is ever part of the name or the return type.
const CALL_MODIFIERS: &str = concat!(
    r"(?:(?:pub(?:\s*\([^()]*\))?|public|private|protected|internal|fileprivate|",
    r"static|override|open|final|suspend|async|unsafe|inline|virtual|abstract|sealed|",
    r"extern(?:\s+\x22[^\x22]*\x22)?)\s+)*",
);

/// Function keyword, with the qualifiers that may only appear next to it.
/// `const` counts only here: in C it belongs to the return type.
const CALL_KEYWORD: &str = concat!(
    r"(?:(?:const\s+)?(?:async\s+)?(?:unsafe\s+)?(?:extern\s+(?:\x22[^\x22]*\x22\s+)?)?",
    r"(?:function|defun|defp|func|def|fun|fn)\s+)?",
);

/// Compiled patterns for every grammar. Build once per run with [`Parsers::compile`].
pub struct Parsers {
    /// Head of a call signature up to and including the opening parenthesis.
    call_head: Regex,
    /// Complete member signature.
    member: Regex,
    /// Head of a relational call signature.
    relational_head: Regex,
}

impl Parsers {
    /// Compile the built-in signature patterns.
    ///
    /// # Errors
    ///
    /// Returns `Error::Pattern` if a pattern fails to compile.
    pub fn compile() -> Result<Self, Error> {
        return Ok(Self {
            call_head: Regex::new(&format!(
                r"^\s*{CALL_MODIFIERS}{CALL_KEYWORD}(?:\((?P<receiver>[^()]*)\)\s*)?(?P<lead>[^()]*?[\s*&]+)?(?P<name>[^\s()*&]+)\s*\(",
            ))?,
            member: Regex::new(
                r"^\s*(?P<owner>[^#:\s]+)\s*#\s*(?P<member>[^#:\s]+)\s*:\s*(?P<type>\S.*?)\s*$",
            )?,
            relational_head: Regex::new(r"^\s*(?P<name>[^\s()]+)\s*\(")?,
        });
    }

    /// Parse a signature with the given grammar. The active namespace is
    /// recorded on the result but never folded into `name`.
    ///
    /// # Errors
    ///
    /// Returns `Error::MalformedSignature` when the signature lacks the
    /// delimiters its grammar requires.
    pub fn parse(
        &self,
        grammar: Grammar,
        kind: ObjectKind,
        signature: &str,
        context: &NamespaceContext,
    ) -> Result<SignatureRecord, Error> {
        let mut record = match grammar {
            Grammar::Call => self.parse_call(kind, signature),
            Grammar::Member => self.parse_member(kind, signature),
            Grammar::Name => parse_name(kind, signature),
            Grammar::Relational => self.parse_relational(kind, signature),
        }
        .ok_or_else(|| {
            return Error::MalformedSignature {
                grammar: grammar.label(),
                signature: signature.to_string(),
            };
        })?;
        record.namespace = context.current().map(str::to_string);
        return Ok(record);
    }

    /// Match `[modifiers] [keyword] [(receiver)] [ret] name(params) [ret]`. A type written
    /// before the name (C style) is the return annotation only when nothing
    /// follows the parameters.
    fn parse_call(&self, kind: ObjectKind, signature: &str) -> Option<SignatureRecord> {
        let caps = self.call_head.captures(signature)?;
        let head = caps.get(0)?;
        let name = caps.name("name")?.as_str().to_string();
        let receiver = caps
            .name("receiver")
            .map(|r| return r.as_str().trim().to_string())
            .filter(|r| return !r.is_empty());

        let tail = signature.get(head.end()..)?;
        let (params, rest) = split_balanced_parameters(tail)?;
        let return_type = non_empty(strip_return_marker(rest))
            .or_else(|| return caps.name("lead").and_then(|lead| return non_empty(lead.as_str())));

        return Some(SignatureRecord {
            kind,
            name,
            namespace: None,
            parameters: non_empty(params),
            receiver,
            return_type,
        });
    }

    /// Match `owner#member: type`.
    fn parse_member(&self, kind: ObjectKind, signature: &str) -> Option<SignatureRecord> {
        let caps = self.member.captures(signature)?;
        return Some(SignatureRecord {
            kind,
            name: caps.name("member")?.as_str().to_string(),
            namespace: None,
            parameters: None,
            receiver: Some(caps.name("owner")?.as_str().to_string()),
            return_type: Some(caps.name("type")?.as_str().to_string()),
        });
    }

    /// Match `name(params) [RETURNS] [ret]`.
    fn parse_relational(&self, kind: ObjectKind, signature: &str) -> Option<SignatureRecord> {
        let caps = self.relational_head.captures(signature)?;
        let head = caps.get(0)?;
        let name = caps.name("name")?.as_str().to_string();

        let tail = signature.get(head.end()..)?;
        let (params, rest) = split_balanced_parameters(tail)?;
        let rest = rest.trim();
        let rest = match rest.get(..7) {
            Some(word) if word.eq_ignore_ascii_case("returns") => rest.get(7..).unwrap_or(""),
            _ => rest,
        };

        return Some(SignatureRecord {
            kind,
            name,
            namespace: None,
            parameters: non_empty(params),
            receiver: None,
            return_type: non_empty(rest),
        });
    }
}

/// Trimmed `Some(text)` unless the text is blank.
fn non_empty(text: &str) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    return Some(trimmed.to_string());
}

/// The whole signature is the name.
fn parse_name(kind: ObjectKind, signature: &str) -> Option<SignatureRecord> {
    let name = non_empty(signature)?;
    return Some(SignatureRecord {
        kind,
        name,
        namespace: None,
        parameters: None,
        receiver: None,
        return_type: None,
    });
}

/// Split text following an opening parenthesis into the parameter list and
/// whatever follows the matching close. Nested parentheses are kept verbatim.
fn split_balanced_parameters(tail: &str) -> Option<(&str, &str)> {
    let mut depth = 0_u32;
    for (idx, ch) in tail.char_indices() {
        match ch {
            '(' => depth = depth.saturating_add(1),
            ')' if depth == 0 => {
                let params = tail.get(..idx)?;
                let rest = tail.get(idx.saturating_add(1)..)?;
                return Some((params, rest));
            },
            ')' => depth = depth.saturating_sub(1),
            _ => {},
        }
    }
    return None;
}

/// Drop a leading `->` or `:` return marker.
fn strip_return_marker(rest: &str) -> &str {
    let rest = rest.trim_start();
    return rest
        .strip_prefix("->")
        .or_else(|| return rest.strip_prefix(':'))
        .unwrap_or(rest);
}

#[cfg(test)]
#[allow(clippy::missing_panics_doc)]
mod tests {
    use super::*;

    fn parse(grammar: Grammar, signature: &str) -> Result<SignatureRecord, Error> {
        let parsers = Parsers::compile().unwrap();
        return parsers.parse(grammar, ObjectKind::Function, signature, &NamespaceContext::default());
    }

    #[test]
    fn go_method_with_receiver() {
        let record = parse(Grammar::Call, "func (s *Server) Handle(req *Request) error").unwrap();
        assert_eq!(record.receiver.as_deref(), Some("s *Server"));
        assert_eq!(record.name, "Handle");
        assert_eq!(record.parameters.as_deref(), Some("req *Request"));
        assert_eq!(record.return_type.as_deref(), Some("error"));
    }

    #[test]
    fn call_without_receiver_or_return() {
        let record = parse(Grammar::Call, "Close()").unwrap();
        assert_eq!(record.receiver, None);
        assert_eq!(record.name, "Close");
        assert_eq!(record.parameters, None);
        assert_eq!(record.return_type, None);
    }

    #[test]
    fn call_keeps_parameters_verbatim() {
        let record = parse(Grammar::Call, "Walk(root string, fn func(path string) error) (int, error)").unwrap();
        assert_eq!(record.parameters.as_deref(), Some("root string, fn func(path string) error"));
        assert_eq!(record.return_type.as_deref(), Some("(int, error)"));
    }

    #[test]
    fn call_strips_arrow_and_colon_markers() {
        let rust = parse(Grammar::Call, "fn parse(input: &str) -> Result<Ast, Error>").unwrap();
        assert_eq!(rust.name, "parse");
        assert_eq!(rust.return_type.as_deref(), Some("Result<Ast, Error>"));

        let kotlin = parse(Grammar::Call, "fun render(width: Int): String").unwrap();
        assert_eq!(kotlin.name, "render");
        assert_eq!(kotlin.return_type.as_deref(), Some("String"));
    }

    #[test]
    fn call_with_leading_return_type() {
        let record = parse(Grammar::Call, "char *strdup(const char *s)").unwrap();
        assert_eq!(record.name, "strdup");
        assert_eq!(record.parameters.as_deref(), Some("const char *s"));
        assert_eq!(record.return_type.as_deref(), Some("char *"));

        let record = parse(Grammar::Call, "int open(const char *path)").unwrap();
        assert_eq!(record.name, "open");
        assert_eq!(record.return_type.as_deref(), Some("int"));
    }

    #[test]
    fn rust_visibility_and_qualifiers_are_skipped() {
        let record = parse(Grammar::Call, "pub(crate) fn helper(x: u8)").unwrap();
        assert_eq!(record.name, "helper");
        assert_eq!(record.parameters.as_deref(), Some("x: u8"));
        assert_eq!(record.return_type, None);

        let record = parse(Grammar::Call, "pub fn close(self)").unwrap();
        assert_eq!(record.name, "close");
        assert_eq!(record.return_type, None);

        let record = parse(Grammar::Call, "async fn fetch(url: &str) -> Response").unwrap();
        assert_eq!(record.name, "fetch");
        assert_eq!(record.return_type.as_deref(), Some("Response"));

        let record = parse(Grammar::Call, "pub const unsafe extern \"C\" fn raw(ptr: *mut u8)").unwrap();
        assert_eq!(record.name, "raw");
        assert_eq!(record.parameters.as_deref(), Some("ptr: *mut u8"));
        assert_eq!(record.return_type, None);
    }

    #[test]
    fn swift_and_kotlin_modifiers_are_skipped() {
        let record = parse(Grammar::Call, "static func make() -> Widget").unwrap();
        assert_eq!(record.name, "make");
        assert_eq!(record.return_type.as_deref(), Some("Widget"));

        let record = parse(Grammar::Call, "override suspend fun load(id: Long): Item").unwrap();
        assert_eq!(record.name, "load");
        assert_eq!(record.return_type.as_deref(), Some("Item"));
    }

    #[test]
    fn csharp_modifiers_leave_only_the_return_type() {
        let record = parse(Grammar::Call, "public static int Add(int a, int b)").unwrap();
        assert_eq!(record.name, "Add");
        assert_eq!(record.parameters.as_deref(), Some("int a, int b"));
        assert_eq!(record.return_type.as_deref(), Some("int"));

        let record = parse(Grammar::Call, "protected internal virtual void Reset()").unwrap();
        assert_eq!(record.name, "Reset");
        assert_eq!(record.return_type.as_deref(), Some("void"));
    }

    #[test]
    fn c_const_stays_in_the_return_type() {
        let record = parse(Grammar::Call, "const char *getenv(const char *name)").unwrap();
        assert_eq!(record.name, "getenv");
        assert_eq!(record.return_type.as_deref(), Some("const char *"));

        let record = parse(Grammar::Call, "static inline int max(int a, int b)").unwrap();
        assert_eq!(record.name, "max");
        assert_eq!(record.return_type.as_deref(), Some("int"));
    }

    #[test]
    fn modifier_words_still_work_as_names() {
        let record = parse(Grammar::Call, "open(path string)").unwrap();
        assert_eq!(record.name, "open");
        let record = parse(Grammar::Call, "func final(x int)").unwrap();
        assert_eq!(record.name, "final");
    }

    #[test]
    fn call_name_is_not_split_on_separators() {
        let record = parse(Grammar::Call, "Net::HTTP.get(uri)").unwrap();
        assert_eq!(record.name, "Net::HTTP.get");
    }

    #[test]
    fn call_without_parentheses_fails() {
        let err = parse(Grammar::Call, "func Handle").unwrap_err();
        assert!(matches!(err, Error::MalformedSignature { grammar: "call", .. }));
        assert!(parse(Grammar::Call, "Handle(req").is_err());
    }

    #[test]
    fn member_signature() {
        let record = parse(Grammar::Member, "Widget#size: Int").unwrap();
        assert_eq!(record.receiver.as_deref(), Some("Widget"));
        assert_eq!(record.name, "size");
        assert_eq!(record.return_type.as_deref(), Some("Int"));
    }

    #[test]
    fn member_requires_hash_then_colon() {
        assert!(parse(Grammar::Member, "Widget.size: Int").is_err());
        assert!(parse(Grammar::Member, "Widget#size Int").is_err());
        assert!(parse(Grammar::Member, "size: Int#Widget").is_err());
    }

    #[test]
    fn relational_strips_returns_keyword() {
        let record = parse(Grammar::Relational, "total_due(customer_id integer) RETURNS numeric").unwrap();
        assert_eq!(record.name, "total_due");
        assert_eq!(record.parameters.as_deref(), Some("customer_id integer"));
        assert_eq!(record.return_type.as_deref(), Some("numeric"));
        assert_eq!(record.receiver, None);
    }

    #[test]
    fn relational_return_is_optional() {
        let record = parse(Grammar::Relational, "refresh_totals()").unwrap();
        assert_eq!(record.return_type, None);
        assert_eq!(record.parameters, None);
    }

    #[test]
    fn name_grammar_takes_whole_signature() {
        let record = parse(Grammar::Name, "  net/http  ").unwrap();
        assert_eq!(record.name, "net/http");
        assert!(parse(Grammar::Name, "   ").is_err());
    }

    #[test]
    fn namespace_recorded_but_not_folded_into_name() {
        let parsers = Parsers::compile().unwrap();
        let mut context = NamespaceContext::default();
        context.enter("http");
        let record = parsers.parse(Grammar::Call, ObjectKind::Function, "Get(url string)", &context).unwrap();
        assert_eq!(record.namespace.as_deref(), Some("http"));
        assert_eq!(record.name, "Get");
    }
}
