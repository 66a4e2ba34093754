//! Reference and name resolution adapter.
//!
//! Wraps a [`ScopeManager`] to answer the binding questions a rewrite asks
//! before it introduces or renames a variable.

use std::collections::BTreeSet;

use tessel_syntax::{NodeId, NodeKind, ScopeId, ScopeManager, SyntaxTree};
use tracing::{debug, trace};

use crate::config::EngineConfig;

/// Candidates tried before giving up on `preferred`.
const MAX_NAME_CANDIDATES: usize = 32;

const RESERVED_WORDS: &[&str] = &[
    "arguments", "await", "break", "case", "catch", "class", "const", "continue", "debugger",
    "default", "delete", "do", "else", "enum", "eval", "export", "extends", "false", "finally",
    "for", "function", "if", "implements", "import", "in", "instanceof", "interface", "let",
    "new", "null", "package", "private", "protected", "public", "return", "static", "super",
    "switch", "this", "throw", "true", "try", "typeof", "undefined", "var", "void", "while",
    "with", "yield",
];

/// Returns whether `name` is a reserved word or a restricted binding name.
#[must_use]
pub fn is_reserved_word(name: &str) -> bool {
    RESERVED_WORDS.contains(&name)
}

/// Returns whether `name` can be written as a binding identifier.
#[must_use]
pub fn is_valid_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    let starts_well = chars
        .next()
        .is_some_and(|first| first.is_alphabetic() || first == '_' || first == '$');
    starts_well
        && chars.all(|ch| ch.is_alphanumeric() || ch == '_' || ch == '$')
        && !is_reserved_word(name)
}

/// Name queries over one document's scope table.
#[derive(Debug, Clone, Copy)]
pub struct NameResolver<'a> {
    tree: &'a SyntaxTree,
    scopes: &'a ScopeManager,
    config: &'a EngineConfig,
}

impl<'a> NameResolver<'a> {
    /// Creates a resolver over `tree` and its scope table.
    ///
    /// `config` supplies the fallback identifier used when no name can be
    /// derived from the preferred one.
    #[must_use]
    pub const fn new(
        tree: &'a SyntaxTree,
        scopes: &'a ScopeManager,
        config: &'a EngineConfig,
    ) -> Self {
        Self {
            tree,
            scopes,
            config,
        }
    }

    /// Returns whether `identifier` is a reference with no local binding in
    /// any enclosing scope.
    ///
    /// Identifiers in non-reference positions, such as property keys or
    /// declarations, are not global references.
    #[must_use]
    pub fn is_global_reference(&self, identifier: NodeId) -> bool {
        self.tree.is(identifier, NodeKind::Identifier)
            && self
                .scopes
                .reference_for(identifier)
                .is_some_and(|reference| reference.resolved().is_none())
    }

    /// Returns whether a binding with the identifier's name is visible from
    /// its position, hiding any global of the same name.
    #[must_use]
    pub fn is_shadowed(&self, identifier: NodeId) -> bool {
        let Some(name) = self.tree.name(identifier) else {
            return false;
        };
        let scope = self.scopes.scope_of(self.tree, identifier);
        self.scopes.resolve(scope, name).is_some()
    }

    /// Returns `scope` and all of its nested scopes.
    #[must_use]
    pub fn get_scopes(&self, scope: ScopeId) -> Vec<ScopeId> {
        self.scopes.descendants(scope)
    }

    /// Returns whether `name` is free in `scope`: it does not resolve from
    /// the scope upward and is neither declared nor referenced anywhere
    /// inside it.
    #[must_use]
    pub fn is_name_free(&self, name: &str, scope: ScopeId) -> bool {
        if self.scopes.resolve(scope, name).is_some() {
            return false;
        }
        !self.get_scopes(scope).into_iter().any(|inner| {
            self.scopes.variables(inner).any(|variable| variable.name() == name)
                || self
                    .scopes
                    .references(inner)
                    .any(|reference| self.tree.name(reference.identifier()) == Some(name))
        })
    }

    /// Returns a name based on `preferred` that is free in every scope of
    /// `in_scopes` and accepted by `is_safe`.
    ///
    /// Reserved words get a `_` suffix first. When `preferred` cannot be
    /// made a valid identifier, the configured fallback identifier is used
    /// as the base instead. Candidates are tried by appending `_`; after
    /// a bounded number of attempts the fallback identifier is returned
    /// as is, free or not.
    #[must_use]
    pub fn get_available_name(
        &self,
        preferred: &str,
        in_scopes: &[ScopeId],
        is_safe: impl Fn(&str) -> bool,
    ) -> String {
        let fallback = self.config.fallback_identifier();
        let mut candidate = base_name(preferred)
            .or_else(|| base_name(fallback))
            .unwrap_or_else(|| "_".to_owned());
        let scopes: BTreeSet<ScopeId> = in_scopes.iter().copied().collect();
        let is_free = |name: &str| scopes.iter().all(|scope| self.is_name_free(name, *scope));
        for _ in 0..MAX_NAME_CANDIDATES {
            if is_safe(&candidate) && is_free(&candidate) {
                if candidate != preferred {
                    debug!(preferred, chosen = candidate.as_str(), "picked alternative name");
                }
                return candidate;
            }
            trace!(candidate = candidate.as_str(), "name is taken");
            candidate.push('_');
        }
        debug!(preferred, fallback, "no free name found");
        fallback.to_owned()
    }
}

fn base_name(name: &str) -> Option<String> {
    if is_valid_identifier(name) {
        return Some(name.to_owned());
    }
    let suffixed = format!("{name}_");
    is_valid_identifier(&suffixed).then_some(suffixed)
}

const UNCOUNTABLE: &[&str] = &[
    "data", "metadata", "information", "series", "species", "news", "equipment", "sheep", "fish",
    "deer", "aircraft", "media", "status", "bus", "gas", "alias",
];

const IRREGULAR: &[(&str, &str)] = &[
    ("children", "child"),
    ("people", "person"),
    ("men", "man"),
    ("women", "woman"),
    ("mice", "mouse"),
    ("geese", "goose"),
    ("feet", "foot"),
    ("teeth", "tooth"),
    ("indices", "index"),
    ("vertices", "vertex"),
    ("matrices", "matrix"),
    ("analyses", "analysis"),
    ("criteria", "criterion"),
    ("leaves", "leaf"),
    ("knives", "knife"),
    ("lives", "life"),
    ("wives", "wife"),
    ("halves", "half"),
    ("wolves", "wolf"),
    ("shelves", "shelf"),
    ("caches", "cache"),
];

/// Nouns ending in `ie`, whose plural must not become `-y`.
const IE_NOUNS: &[&str] = &[
    "movie", "cookie", "zombie", "calorie", "rookie", "hoodie", "selfie", "goalie", "brownie",
    "pixie", "genie", "smoothie", "prairie", "sortie", "auntie", "birdie", "newbie", "freebie",
    "lie", "pie", "tie", "die", "magpie", "necktie", "veggie", "budgie", "eerie", "coterie",
];

/// Returns the singular form of the last word of a camelCase or snake_case
/// name, such as `"userIds"` to `"userId"`.
///
/// Returns `None` when the name does not end in a recognizable plural.
#[must_use]
pub fn singular(name: &str) -> Option<String> {
    let word_start = last_word_start(name)?;
    let (prefix, word) = name.split_at(word_start);
    let capitalized = word.chars().next().is_some_and(char::is_uppercase);
    let lower = word.to_lowercase();
    let singular_word = singular_word(&lower)?;
    let rendered = if capitalized {
        capitalize(&singular_word)
    } else {
        singular_word
    };
    Some(format!("{prefix}{rendered}"))
}

/// Finds where the trailing `[A-Z]?[a-z]+` word starts.
fn last_word_start(name: &str) -> Option<usize> {
    let lower_run = name
        .char_indices()
        .rev()
        .take_while(|(_, ch)| ch.is_ascii_lowercase())
        .last()
        .map(|(index, _)| index)?;
    let before = name.get(..lower_run)?.chars().next_back();
    Some(match before {
        Some(ch) if ch.is_ascii_uppercase() => lower_run.saturating_sub(1),
        _ => lower_run,
    })
}

fn singular_word(word: &str) -> Option<String> {
    if UNCOUNTABLE.contains(&word) {
        return None;
    }
    if let Some((_, single)) = IRREGULAR.iter().find(|(plural, _)| *plural == word) {
        return Some((*single).to_owned());
    }
    if let Some(stem) = word.strip_suffix("ies") {
        if let Some(single) = word.strip_suffix('s').filter(|single| IE_NOUNS.contains(single)) {
            return Some(single.to_owned());
        }
        // Unknown `-ies` words after a vowel are left alone.
        let consonant_stem =
            stem.len() > 1 && stem.ends_with(|last: char| !"aeiou".contains(last));
        return consonant_stem.then(|| format!("{stem}y"));
    }
    for suffix in ["sses", "shes", "ches", "xes", "zzes"] {
        if let Some(stem) = word.strip_suffix(suffix) {
            let kept = suffix.get(..suffix.len().saturating_sub(2)).unwrap_or_default();
            return Some(format!("{stem}{kept}"));
        }
    }
    if word.ends_with("ss") || word.ends_with("us") || word.ends_with("is") {
        return None;
    }
    word.strip_suffix('s')
        .filter(|stem| stem.len() > 1)
        .map(str::to_owned)
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}
