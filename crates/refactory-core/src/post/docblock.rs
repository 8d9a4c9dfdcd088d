//! Class-name tokens inside docblocks.

use std::sync::LazyLock;

use regex::{Captures, Regex};

/// A class-like token, optionally fully qualified. Group 1 captures a `$`
/// or `@` prefix so variables and tags can be told apart from types.
static CLASS_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([$@]?)(\\?[A-Za-z_][A-Za-z0-9_]*(?:\\[A-Za-z_][A-Za-z0-9_]*)*)")
        .expect("class token pattern is valid")
});

/// Class-like tokens of a docblock, skipping `$variables` and `@tags`.
pub fn class_tokens(doc: &str) -> impl Iterator<Item = &str> {
    CLASS_TOKEN
        .captures_iter(doc)
        .filter(|caps| caps[1].is_empty())
        .filter_map(|caps| caps.get(2))
        .map(|token| token.as_str())
}

/// `true` for `\A\B`-style tokens: fully qualified with a namespace.
pub fn is_qualified_fqn(token: &str) -> bool {
    token
        .strip_prefix('\\')
        .is_some_and(|rest| rest.contains('\\'))
}

/// Replace class-like tokens for which `f` returns `Some`.
///
/// Returns `None` when nothing changed.
pub fn rewrite_class_tokens<F>(doc: &str, mut f: F) -> Option<String>
where
    F: FnMut(&str) -> Option<String>,
{
    let mut changed = false;
    let rewritten = CLASS_TOKEN.replace_all(doc, |caps: &Captures| {
        if !caps[1].is_empty() {
            return caps[0].to_string();
        }
        match f(&caps[2]) {
            Some(replacement) => {
                changed = true;
                replacement
            }
            None => caps[0].to_string(),
        }
    });
    let rewritten = rewritten.into_owned();
    changed.then_some(rewritten)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_class_tokens_skip_variables_and_tags() {
        let tokens: Vec<_> = class_tokens("@param \\App\\User $user the user").collect();
        assert_eq!(tokens, vec!["\\App\\User", "the", "user"]);
    }

    #[test]
    fn test_rewrite_only_reports_changes() {
        let doc = "@return \\App\\User";
        assert_eq!(rewrite_class_tokens(doc, |_| None), None);

        let rewritten = rewrite_class_tokens(doc, |token| {
            (token == "\\App\\User").then(|| "User".to_string())
        });
        assert_eq!(rewritten.as_deref(), Some("@return User"));
    }

    #[test]
    fn test_is_qualified_fqn() {
        assert!(is_qualified_fqn("\\App\\User"));
        assert!(!is_qualified_fqn("\\DateTime"));
        assert!(!is_qualified_fqn("App\\User"));
    }
}
