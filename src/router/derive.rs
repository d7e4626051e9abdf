//! Method name to route derivation.
//!
//! ```text
//! AppleBanana   => Apple/Banana
//! Apple_Banana  => Apple/*/Banana
//! AppleBanana_  => Apple/Banana/*
//! Apple_Banana_ => Apple/*/Banana/*
//! ```

use super::pattern::Token;

/// Default separator marking a wildcard in a method name.
pub const DEFAULT_SEPARATOR: &str = "_";

/// Verb prefixes recognised when no verb set is configured.
pub const DEFAULT_VERBS: [&str; 4] = ["Get", "Post", "Put", "Delete"];

/// Derive path tokens from a method name whose verb prefix is already stripped.
///
/// An empty separator disables wildcards: the whole name is segmented.
#[must_use]
pub fn derive_pattern(name: &str, sep: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut rest = name;
    while !rest.is_empty() {
        let Some(pos) = (!sep.is_empty()).then(|| rest.find(sep)).flatten() else {
            push_segments(&mut tokens, rest);
            return tokens;
        };
        if pos > 0 {
            push_segments(&mut tokens, &rest[..pos]);
        }
        tokens.push(Token::Wildcard);
        rest = &rest[pos + sep.len()..];
    }
    tokens
}

/// Split `text` before every ASCII uppercase letter except the first character.
fn push_segments(tokens: &mut Vec<Token>, text: &str) {
    let mut last = 0;
    for (i, c) in text.char_indices().skip(1) {
        if c.is_ascii_uppercase() {
            tokens.push(Token::literal(&text[last..i]));
            last = i;
        }
    }
    tokens.push(Token::literal(&text[last..]));
}

/// Leading verb of a method name: one uppercase ASCII letter followed by the
/// run of lowercase ASCII letters after it.
///
/// Something must follow the verb, so `PostFoo_Bar` gives `Post` while
/// `Post` alone, `Postfoo` and `postFoo` give `None`.
#[must_use]
pub fn verb_prefix(name: &str) -> Option<&str> {
    let mut chars = name.char_indices();
    match chars.next() {
        Some((_, c)) if c.is_ascii_uppercase() => {}
        _ => return None,
    }
    let (end, _) = chars.find(|(_, c)| !c.is_ascii_lowercase())?;
    Some(&name[..end])
}
