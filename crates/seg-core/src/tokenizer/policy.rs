//! Handling of input no grapheme covers.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use tracing::debug;

use super::TokenizeError;

/// Maps unmatched input (one code point when called by the trie parser) to
/// its replacement, or fails the tokenization.
pub type ErrorHandler = Arc<dyn Fn(&str) -> Result<String, TokenizeError> + Send + Sync>;

/// Which error handler a tokenization call uses.
#[derive(Clone)]
pub enum ErrorPolicy {
    /// Fail on the first unmatched code point.
    Strict,
    /// Emit the replacement marker.
    Replace,
    /// Drop the code point.
    Ignore,
    Custom(ErrorHandler),
}

impl ErrorPolicy {
    pub fn custom<F>(f: F) -> Self
    where
        F: Fn(&str) -> Result<String, TokenizeError> + Send + Sync + 'static,
    {
        ErrorPolicy::Custom(Arc::new(f))
    }
}

impl fmt::Debug for ErrorPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorPolicy::Strict => f.write_str("Strict"),
            ErrorPolicy::Replace => f.write_str("Replace"),
            ErrorPolicy::Ignore => f.write_str("Ignore"),
            ErrorPolicy::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown error policy: {0} (expected strict, replace or ignore)")]
pub struct UnknownPolicy(pub String);

impl FromStr for ErrorPolicy {
    type Err = UnknownPolicy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "strict" => Ok(ErrorPolicy::Strict),
            "replace" => Ok(ErrorPolicy::Replace),
            "ignore" => Ok(ErrorPolicy::Ignore),
            _ => Err(UnknownPolicy(s.to_string())),
        }
    }
}

pub fn strict() -> ErrorHandler {
    Arc::new(|c: &str| {
        debug!(grapheme = c, "invalid grapheme");
        Err(TokenizeError::InvalidGrapheme(c.to_string()))
    })
}

pub fn replace(marker: String) -> ErrorHandler {
    Arc::new(move |c: &str| {
        debug!(grapheme = c, "replacing grapheme");
        Ok(marker.clone())
    })
}

pub fn ignore() -> ErrorHandler {
    Arc::new(|c: &str| {
        debug!(grapheme = c, "ignoring grapheme");
        Ok(String::new())
    })
}

/// The three named handlers of a tokenizer.
#[derive(Clone)]
pub(crate) struct ErrorHandlers {
    pub strict: ErrorHandler,
    pub replace: ErrorHandler,
    pub ignore: ErrorHandler,
}

impl ErrorHandlers {
    pub fn new(marker: String) -> Self {
        Self {
            strict: strict(),
            replace: replace(marker),
            ignore: ignore(),
        }
    }

    pub fn resolve<'a>(&'a self, policy: &'a ErrorPolicy) -> &'a ErrorHandler {
        match policy {
            ErrorPolicy::Strict => &self.strict,
            ErrorPolicy::Replace => &self.replace,
            ErrorPolicy::Ignore => &self.ignore,
            ErrorPolicy::Custom(handler) => handler,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_from_str() {
        assert!(matches!(
            "strict".parse::<ErrorPolicy>(),
            Ok(ErrorPolicy::Strict)
        ));
        assert!(matches!(
            "replace".parse::<ErrorPolicy>(),
            Ok(ErrorPolicy::Replace)
        ));
        assert!(matches!(
            "ignore".parse::<ErrorPolicy>(),
            Ok(ErrorPolicy::Ignore)
        ));
        assert!("Strict".parse::<ErrorPolicy>().is_err());
    }

    #[test]
    fn test_named_handlers() {
        let handlers = ErrorHandlers::new("?".to_string());
        assert_eq!((handlers.replace)("x").unwrap(), "?");
        assert_eq!((handlers.ignore)("x").unwrap(), "");
        assert!(matches!(
            (handlers.strict)("x"),
            Err(TokenizeError::InvalidGrapheme(ref c)) if c == "x"
        ));
    }

    #[test]
    fn test_resolve_custom() {
        let handlers = ErrorHandlers::new("?".to_string());
        let policy = ErrorPolicy::custom(|c| Ok(format!("<{c}>")));
        assert_eq!(handlers.resolve(&policy)("x").unwrap(), "<x>");
        assert_eq!(format!("{policy:?}"), "Custom(..)");
    }
}
