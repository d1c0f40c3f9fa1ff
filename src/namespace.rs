//! The namespace context threaded through a build.

/// The most recently entered namespace. Entering a namespace replaces the
/// previous one outright; there is no stack and nothing is restored on exit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NamespaceContext {
    /// Literal argument of the last namespace-introducing directive.
    current: Option<String>,
}

impl NamespaceContext {
    /// The active namespace, if one has been entered.
    pub fn current(&self) -> Option<&str> {
        return self.current.as_deref();
    }

    /// Make `namespace` the active namespace, discarding any previous one.
    pub fn enter(&mut self, namespace: &str) {
        self.current = Some(namespace.to_string());
    }

    /// Join the active namespace to `local` with the language separator.
    /// Returns `local` unchanged when no namespace is active.
    pub fn qualify(&self, local: &str, separator: &str) -> String {
        return match &self.current {
            None => local.to_string(),
            Some(namespace) => format!("{namespace}{separator}{local}"),
        };
    }
}
