use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::config;
use crate::domain::Domain;
use crate::index::{INDEX_FILE, ObjectIndex};

/// Output the domain reference document and the state of the current project.
pub fn run(json: bool) {
    let root = PathBuf::from(".");
    let state = gather_state(&root);

    if json {
        print_json(&state);
    } else {
        print_markdown(&state);
    }
}

// ── State gathering ───────────────────────────────────────────────────

/// What the current directory looks like to polyglot.
struct CurrentState {
    /// Prefixes of the domains the config activates, if the config loads.
    active: Option<Vec<&'static str>>,
    /// Whether `.polyglot.toml` exists.
    config_found: bool,
    /// Object count of `.polyglot.index`, if readable.
    index_entries: Option<usize>,
}

fn gather_state(root: &Path) -> CurrentState {
    let config_found = root.join(config::CONFIG_FILE).exists();
    let index_entries = ObjectIndex::read(&root.join(INDEX_FILE)).ok().map(|i| return i.entries.len());
    let active = config::Config::load(root)
        .ok()
        .map(|c| return c.active_domains().into_iter().map(Domain::prefix).collect());

    return CurrentState { active, config_found, index_entries };
}

/// Exit codes shared by `build`, `check` and `watch`.
const EXIT_CODES: [(u8, &str); 4] = [
    (0, "Clean build"),
    (1, "Duplicate object descriptions found"),
    (2, "Rejected directives found"),
    (3, "Runtime error"),
];

// ── Markdown output ───────────────────────────────────────────────────

fn print_markdown(state: &CurrentState) {
    let version = env!("CARGO_PKG_VERSION");
    print_markdown_header(version);
    print_markdown_domains();
    print_markdown_state(state);
    println!();
    print_markdown_exit_codes();
}

fn print_markdown_header(version: &str) {
    print!(
        "\
# polyglot {version}

Object descriptions for documentation in many languages. Directives declare
functions, types and namespaces; polyglot parses their signatures and builds
a cross-reference index.

## Directive Syntax

    .. go:function:: func (r *Reader) Read(p []byte) (n int, err error)
    ```{{rb:method}} Net::HTTP#get(path)
    .. sql:table:: users
       :no-index:

## Workflow

    polyglot build                    Scan docs, register objects, write {INDEX_FILE}
    polyglot check                    Same as build without writing the index
    polyglot parse <d:dir> <sig>      Show how a signature is parsed
    polyglot lookup <d:dir> <name>    Find where an object is declared
    polyglot domain enable <prefix>   Activate a domain in {cfg}
    polyglot domain disable <prefix>  Deactivate a domain in {cfg}
    polyglot watch                    Rebuild on every documentation change

",
        cfg = config::CONFIG_FILE,
    );
}

fn print_markdown_domains() {
    println!("## Domains\n");
    println!("| Prefix | Language | Separator | Directives |");
    println!("|--------|----------|-----------|------------|");
    for domain in Domain::ALL {
        let directives = domain
            .directives()
            .iter()
            .map(|d| {
                let marker = if d.introduces_namespace { "*" } else { "" };
                return format!("{}{marker}", d.kind);
            })
            .collect::<Vec<_>>()
            .join(", ");
        println!("| `{}` | {} | `{}` | {directives} |", domain.prefix(), domain.label(), domain.separator());
    }
    println!("\n`*` sets the namespace for the directives that follow.\n");
}

fn print_markdown_state(state: &CurrentState) {
    println!("## Current State\n");
    if state.config_found {
        println!("Config:  {} (found)", config::CONFIG_FILE);
    } else {
        println!("Config:  {} (not found)", config::CONFIG_FILE);
    }

    match state.index_entries {
        Some(n) => println!("Index:   {INDEX_FILE} ({n} objects)"),
        None => println!("Index:   {INDEX_FILE} (not found)"),
    }

    match &state.active {
        Some(active) if active.is_empty() => println!("Active:  (none)"),
        Some(active) => println!("Active:  {}", active.join(", ")),
        None => println!("Active:  (config invalid)"),
    }
}

fn print_markdown_exit_codes() {
    println!("## Exit Codes\n");
    println!("| Code | Meaning |");
    println!("|------|---------|");
    for (code, meaning) in EXIT_CODES {
        println!("| {code}    | {meaning} |");
    }
}

// ── JSON output ───────────────────────────────────────────────────────

#[derive(Serialize)]
struct InfoJson {
    current_state: StateJson,
    domains: Vec<DomainJson>,
    exit_codes: Vec<ExitCodeInfo>,
    version: String,
}

#[derive(Serialize)]
struct DomainJson {
    directives: Vec<DirectiveJson>,
    language: String,
    prefix: String,
    separator: String,
}

#[derive(Serialize)]
struct DirectiveJson {
    grammar: String,
    introduces_namespace: bool,
    name: String,
    separator: String,
}

#[derive(Serialize)]
struct ExitCodeInfo {
    code: u8,
    meaning: String,
}

#[derive(Serialize)]
struct StateJson {
    active_domains: Option<Vec<String>>,
    config_found: bool,
    index_entries: Option<usize>,
}

fn domain_json(domain: Domain) -> DomainJson {
    return DomainJson {
        directives: domain
            .directives()
            .iter()
            .map(|d| {
                return DirectiveJson {
                    grammar: d.grammar.label().to_string(),
                    introduces_namespace: d.introduces_namespace,
                    name: d.kind.to_string(),
                    separator: domain.separator_for(d).to_string(),
                };
            })
            .collect(),
        language: domain.label().to_string(),
        prefix: domain.prefix().to_string(),
        separator: domain.separator().to_string(),
    };
}

fn print_json(state: &CurrentState) {
    let info = InfoJson {
        current_state: StateJson {
            active_domains: state
                .active
                .as_ref()
                .map(|a| return a.iter().map(|p| return (*p).to_string()).collect()),
            config_found: state.config_found,
            index_entries: state.index_entries,
        },
        domains: Domain::ALL.into_iter().map(domain_json).collect(),
        exit_codes: EXIT_CODES
            .into_iter()
            .map(|(code, meaning)| return ExitCodeInfo { code, meaning: meaning.to_string() })
            .collect(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    };

    // serde_json::to_string_pretty won't fail on this structure.
    let json = serde_json::to_string_pretty(&info).unwrap_or_default();
    println!("{json}");
}
