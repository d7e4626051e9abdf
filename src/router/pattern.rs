use crate::error::RegistrationError;
use smallvec::SmallVec;
use std::borrow::Cow;
use std::fmt;

/// Number of captures kept inline before spilling to the heap.
pub const MAX_INLINE_CAPTURES: usize = 4;

/// Wildcard captures in path order.
pub type Captures = SmallVec<[String; MAX_INLINE_CAPTURES]>;

/// One path segment of a compiled route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Literal(String),
    Wildcard,
}

impl Token {
    #[must_use]
    pub fn literal(text: impl Into<String>) -> Self {
        Token::Literal(text.into())
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Literal(s) => f.write_str(s),
            Token::Wildcard => f.write_str("*"),
        }
    }
}

/// Verb plus a fixed number of path tokens.
///
/// A request matches only when it has exactly as many path segments as the
/// pattern has tokens. There are no variable-length wildcards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutePattern {
    verb: String,
    tokens: Vec<Token>,
}

impl RoutePattern {
    #[must_use]
    pub fn new(verb: impl Into<String>, tokens: Vec<Token>) -> Self {
        Self {
            verb: verb.into(),
            tokens,
        }
    }

    /// Parse a route spec such as `"POST /servers/*/action"`.
    ///
    /// The text is split on `/`; the first part is the verb with at most one
    /// trailing space removed. `*` parts become wildcards.
    pub fn parse(spec: &str) -> Result<Self, RegistrationError> {
        let mut parts = spec.split('/');
        let head = parts.next().unwrap_or_default();
        let verb = head.strip_suffix(' ').unwrap_or(head);
        if verb.is_empty() || verb.contains(' ') {
            return Err(RegistrationError::InvalidRouteSpec(spec.to_string()));
        }
        let tokens: Vec<Token> = parts
            .map(|p| {
                if p == "*" {
                    Token::Wildcard
                } else {
                    Token::literal(p)
                }
            })
            .collect();
        if tokens.is_empty() {
            return Err(RegistrationError::InvalidRouteSpec(spec.to_string()));
        }
        Ok(Self::new(verb, tokens))
    }

    #[must_use]
    pub fn verb(&self) -> &str {
        &self.verb
    }

    #[must_use]
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Number of wildcard tokens, i.e. the capture count of a match.
    #[must_use]
    pub fn arity(&self) -> usize {
        self.tokens
            .iter()
            .filter(|t| matches!(t, Token::Wildcard))
            .count()
    }

    /// Match a request against this pattern.
    ///
    /// `segments` is the request path with its leading `/` removed, split on
    /// `/` and percent-decoded (see [`split_path`]). Verb and literals compare
    /// ASCII case-insensitively.
    #[must_use]
    pub fn matches<T: AsRef<str>>(&self, method: &str, segments: &[T]) -> Option<Captures> {
        if segments.len() != self.tokens.len() {
            return None;
        }
        if !self.verb.eq_ignore_ascii_case(method) {
            return None;
        }
        let mut captures = Captures::new();
        for (token, segment) in self.tokens.iter().zip(segments) {
            let segment = segment.as_ref();
            match token {
                Token::Wildcard => captures.push(segment.to_string()),
                Token::Literal(lit) => {
                    if !lit.eq_ignore_ascii_case(segment) {
                        return None;
                    }
                }
            }
        }
        Some(captures)
    }
}

impl fmt::Display for RoutePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.verb)?;
        f.write_str(" ")?;
        for token in &self.tokens {
            write!(f, "/{token}")?;
        }
        Ok(())
    }
}

/// Split a request path into segments the way patterns expect them.
///
/// `/` yields a single empty segment, `/a/b` yields `["a", "b"]`.
///
/// Each segment is percent-decoded after the split, so `a%2Fb` stays one
/// segment holding `a/b`. A segment whose escapes do not decode to UTF-8 is
/// kept as sent.
#[must_use]
pub fn split_path(path: &str) -> SmallVec<[Cow<'_, str>; 8]> {
    path.strip_prefix('/')
        .unwrap_or(path)
        .split('/')
        .map(|segment| urlencoding::decode(segment).unwrap_or(Cow::Borrowed(segment)))
        .collect()
}
