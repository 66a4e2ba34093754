//! Script dialects and their grammars.

use std::path::Path;
use std::str::FromStr;

use strum::{Display, EnumIter, IntoEnumIterator, IntoStaticStr};
use thiserror::Error;

/// A JavaScript dialect the host model can read.
///
/// Plain JavaScript goes through the TSX grammar, which accepts JSX and is
/// a superset of what `.js` files contain in practice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, EnumIter, IntoStaticStr)]
#[strum(serialize_all = "lowercase")]
pub enum Language {
    /// `.js`, `.mjs`, `.cjs` and `.jsx` files.
    #[default]
    JavaScript,
    /// `.ts`, `.mts` and `.cts` files.
    TypeScript,
    /// `.tsx` files.
    Tsx,
}

/// Extensions, lower case and without the dot.
const EXTENSIONS: [(&str, Language); 8] = [
    ("js", Language::JavaScript),
    ("mjs", Language::JavaScript),
    ("cjs", Language::JavaScript),
    ("jsx", Language::JavaScript),
    ("ts", Language::TypeScript),
    ("mts", Language::TypeScript),
    ("cts", Language::TypeScript),
    ("tsx", Language::Tsx),
];

impl Language {
    /// Looks up a file extension, ignoring case.
    ///
    /// ```
    /// use tessel_syntax::Language;
    ///
    /// assert_eq!(Language::from_extension("MJS"), Some(Language::JavaScript));
    /// assert_eq!(Language::from_extension("json"), None);
    /// ```
    #[must_use]
    pub fn from_extension(extension: &str) -> Option<Self> {
        EXTENSIONS
            .iter()
            .find(|(known, _)| known.eq_ignore_ascii_case(extension))
            .map(|(_, language)| *language)
    }

    /// Looks up the extension of `path`.
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        Self::from_extension(path.extension()?.to_str()?)
    }

    /// Returns the grammar used to parse this dialect.
    #[must_use]
    pub fn tree_sitter_language(self) -> tree_sitter::Language {
        let grammar = match self {
            Self::TypeScript => tree_sitter_typescript::LANGUAGE_TYPESCRIPT,
            Self::JavaScript | Self::Tsx => tree_sitter_typescript::LANGUAGE_TSX,
        };
        grammar.into()
    }
}

/// A language name that [`Language::from_str`] does not know.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unsupported language: '{name}'")]
pub struct LanguageParseError {
    name: String,
}

impl LanguageParseError {
    /// Returns the rejected name, trimmed and lower-cased.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl FromStr for Language {
    type Err = LanguageParseError;

    /// Accepts the display name or the short extension form, in any case.
    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let name = input.trim().to_ascii_lowercase();
        Self::iter()
            .find(|language| <&'static str>::from(*language) == name)
            .or_else(|| Self::from_extension(&name))
            .ok_or(LanguageParseError { name })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("jsx", Some(Language::JavaScript))]
    #[case("CJS", Some(Language::JavaScript))]
    #[case("mts", Some(Language::TypeScript))]
    #[case("tsx", Some(Language::Tsx))]
    #[case("json", None)]
    #[case("", None)]
    fn extensions_map_to_dialects(#[case] extension: &str, #[case] expected: Option<Language>) {
        assert_eq!(Language::from_extension(extension), expected);
    }

    #[rstest]
    #[case("src/rules/prefer-spread.js", Some(Language::JavaScript))]
    #[case("types/index.d.ts", Some(Language::TypeScript))]
    #[case("Makefile", None)]
    fn paths_map_to_dialects(#[case] path: &str, #[case] expected: Option<Language>) {
        assert_eq!(Language::from_path(Path::new(path)), expected);
    }

    #[rstest]
    #[case("javascript", Language::JavaScript)]
    #[case(" TypeScript ", Language::TypeScript)]
    #[case("ts", Language::TypeScript)]
    #[case("JSX", Language::JavaScript)]
    fn names_parse(#[case] input: &str, #[case] expected: Language) {
        assert_eq!(input.parse::<Language>(), Ok(expected));
    }

    #[test]
    fn display_round_trips_through_from_str() {
        for language in Language::iter() {
            assert_eq!(language.to_string().parse::<Language>(), Ok(language));
        }
    }

    #[test]
    fn unknown_names_are_reported_normalized() {
        let err = " Python ".parse::<Language>().expect_err("python");
        assert_eq!(err.name(), "python");
    }
}
