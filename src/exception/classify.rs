use crate::exception::failure::{FailureKind, ParsingFailure};
use std::sync::Arc;

/// Prefix the JSON binding layer uses when a target type cannot be built.
pub const NO_SUITABLE_CONSTRUCTOR: &str = "No suitable constructor found";

/// Fault attribution for a [`ParsingFailure`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// The service is at fault. Answer with an opaque 500.
    ServerDefect,
    /// The request body is at fault. Answer with a sanitized 400.
    ClientError,
}

/// Decides whether a deserialization message points at a developer mistake
/// rather than a malformed request.
pub trait DeveloperMisuse: Send + Sync + 'static {
    fn is_developer_misuse(&self, message: &str) -> bool;
}

impl<F> DeveloperMisuse for F
where
    F: Fn(&str) -> bool + Send + Sync + 'static,
{
    fn is_developer_misuse(&self, message: &str) -> bool {
        self(message)
    }
}

/// Matches messages starting with any of a list of prefixes
#[derive(Debug, Clone)]
pub struct PrefixMatcher {
    prefixes: Vec<String>,
}

impl Default for PrefixMatcher {
    fn default() -> Self {
        Self {
            prefixes: vec![NO_SUITABLE_CONSTRUCTOR.to_string()],
        }
    }
}

impl PrefixMatcher {
    /// A matcher with no prefixes at all
    pub fn empty() -> Self {
        Self {
            prefixes: Vec::new(),
        }
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefixes.push(prefix.into());
        self
    }

    pub fn with_prefixes<I, S>(self, prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        prefixes
            .into_iter()
            .fold(self, |matcher, prefix| matcher.with_prefix(prefix))
    }

    pub fn prefixes(&self) -> &[String] {
        &self.prefixes
    }
}

impl DeveloperMisuse for PrefixMatcher {
    fn is_developer_misuse(&self, message: &str) -> bool {
        self.prefixes
            .iter()
            .any(|prefix| message.starts_with(prefix.as_str()))
    }
}

/// Assigns a [`Classification`] to every parsing failure
#[derive(Clone)]
pub struct Classifier {
    misuse: Arc<dyn DeveloperMisuse>,
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new(PrefixMatcher::default())
    }
}

impl Classifier {
    pub fn new(misuse: impl DeveloperMisuse) -> Self {
        Self {
            misuse: Arc::new(misuse),
        }
    }

    /// First match wins:
    /// 1. generation failures are always the service's fault;
    /// 2. deserialization failures the misuse predicate recognizes are too;
    /// 3. everything else is blamed on the request.
    pub fn classify(&self, failure: &ParsingFailure) -> Classification {
        if failure.kind() == FailureKind::Generation {
            return Classification::ServerDefect;
        }

        match failure.message() {
            Some(message) if self.misuse.is_developer_misuse(message) => {
                Classification::ServerDefect
            }
            _ => Classification::ClientError,
        }
    }
}
