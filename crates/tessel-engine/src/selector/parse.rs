//! Recursive-descent parser for the selector grammar.
//!
//! ```text
//! selector  := "*" | head? item*
//! head      := name
//! item      := attribute | ":matches(" list ")" | ":not(" list ")"
//! list      := element ("," element)*
//! element   := name | attribute | ":matches(" list ")" | ":not(" list ")"
//! attribute := "[" path op value "]"
//! ```

use std::str::FromStr;

use super::ast::{AttributeValue, Clause, Comparison, Selector};
use crate::error::SelectorError;

impl Selector {
    /// Parses a selector string.
    ///
    /// # Errors
    ///
    /// Returns a [`SelectorError`] describing the first malformed construct.
    pub fn parse(source: &str) -> Result<Self, SelectorError> {
        let mut cursor = Cursor::new(source);
        cursor.skip_whitespace();
        if cursor.eat('*') {
            cursor.skip_whitespace();
            cursor.expect_end()?;
            return Ok(Self::new(None, Vec::new()));
        }
        let head = cursor.peek().filter(|ch| is_name_start(*ch)).map(|_| cursor.name());
        let mut clauses = Vec::new();
        while cursor.peek().is_some() {
            clauses.push(cursor.item()?);
        }
        Ok(Self { head, clauses })
    }
}

impl FromStr for Selector {
    type Err = SelectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

fn is_name_start(ch: char) -> bool {
    ch.is_ascii_alphabetic() || ch == '_' || ch == '$'
}

fn is_path_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || matches!(ch, '_' | '$' | '.')
}

struct Cursor<'s> {
    source: &'s str,
    offset: usize,
}

impl<'s> Cursor<'s> {
    const fn new(source: &'s str) -> Self {
        Self { source, offset: 0 }
    }

    fn rest(&self) -> &'s str {
        self.source.get(self.offset..).unwrap_or_default()
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.offset = self.offset.saturating_add(ch.len_utf8());
        Some(ch)
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn eat_str(&mut self, expected: &str) -> bool {
        if self.rest().starts_with(expected) {
            self.offset = self.offset.saturating_add(expected.len());
            true
        } else {
            false
        }
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.bump();
        }
    }

    fn unexpected(&self, expected: &'static str) -> SelectorError {
        match self.peek() {
            Some(found) => SelectorError::UnexpectedChar {
                found,
                offset: self.offset,
                expected,
            },
            None => SelectorError::UnexpectedEnd { expected },
        }
    }

    fn expect(&mut self, expected: char, description: &'static str) -> Result<(), SelectorError> {
        if self.eat(expected) {
            Ok(())
        } else {
            Err(self.unexpected(description))
        }
    }

    fn expect_end(&self) -> Result<(), SelectorError> {
        match self.peek() {
            None => Ok(()),
            Some(_) => Err(self.unexpected("end of selector")),
        }
    }

    fn take_while(&mut self, predicate: impl Fn(char) -> bool) -> &'s str {
        let start = self.offset;
        while self.peek().is_some_and(&predicate) {
            self.bump();
        }
        self.source.get(start..self.offset).unwrap_or_default()
    }

    fn name(&mut self) -> String {
        self.take_while(|ch| ch.is_ascii_alphanumeric() || ch == '_' || ch == '$')
            .to_owned()
    }

    fn item(&mut self) -> Result<Clause, SelectorError> {
        match self.peek() {
            Some('[') => self.attribute(),
            Some(':') => self.pseudo(),
            _ => Err(self.unexpected("'[' or ':'")),
        }
    }

    fn element(&mut self) -> Result<Clause, SelectorError> {
        self.skip_whitespace();
        let clause = match self.peek() {
            Some(ch) if is_name_start(ch) => Clause::Type(self.name()),
            _ => self.item()?,
        };
        self.skip_whitespace();
        Ok(clause)
    }

    fn pseudo(&mut self) -> Result<Clause, SelectorError> {
        self.expect(':', "':'")?;
        let negated = if self.eat_str("matches(") {
            false
        } else if self.eat_str("not(") {
            true
        } else {
            return Err(self.unexpected("'matches(' or 'not('"));
        };
        let mut clauses = vec![self.element()?];
        while self.eat(',') {
            clauses.push(self.element()?);
        }
        self.expect(')', "')'")?;
        Ok(if negated {
            Clause::Not(clauses)
        } else {
            Clause::any(clauses)
        })
    }

    fn attribute(&mut self) -> Result<Clause, SelectorError> {
        self.expect('[', "'['")?;
        self.skip_whitespace();
        let path_text = self.take_while(is_path_char);
        if path_text.is_empty() || path_text.split('.').any(str::is_empty) {
            return Err(self.unexpected("attribute path"));
        }
        let path = path_text.split('.').map(str::to_owned).collect();
        self.skip_whitespace();
        let op = self.comparison()?;
        self.skip_whitespace();
        let value = self.value()?;
        self.skip_whitespace();
        self.expect(']', "']'")?;
        Ok(Clause::Attribute { path, op, value })
    }

    fn comparison(&mut self) -> Result<Comparison, SelectorError> {
        let op = [
            ("!=", Comparison::NotEq),
            (">=", Comparison::Ge),
            ("<=", Comparison::Le),
            ("=", Comparison::Eq),
            (">", Comparison::Gt),
            ("<", Comparison::Lt),
        ]
        .into_iter()
        .find(|(text, _)| self.rest().starts_with(text));
        match op {
            Some((text, comparison)) => {
                self.offset = self.offset.saturating_add(text.len());
                Ok(comparison)
            }
            None => Err(self.unexpected("comparison operator")),
        }
    }

    fn value(&mut self) -> Result<AttributeValue, SelectorError> {
        if self.eat('"') {
            return self.string();
        }
        let text = self.take_while(|ch| ch.is_ascii_alphanumeric() || ch == '-' || ch == '_');
        match text {
            "" => Err(self.unexpected("attribute value")),
            "true" => Ok(AttributeValue::Bool(true)),
            "false" => Ok(AttributeValue::Bool(false)),
            _ => text
                .parse::<i64>()
                .map(AttributeValue::Num)
                .map_err(|_| SelectorError::InvalidValue {
                    value: text.to_owned(),
                }),
        }
    }

    fn string(&mut self) -> Result<AttributeValue, SelectorError> {
        let mut value = String::new();
        loop {
            match self.bump() {
                Some('"') => return Ok(AttributeValue::Str(value)),
                Some('\\') => match self.bump() {
                    Some(escaped) => value.push(escaped),
                    None => return Err(SelectorError::UnexpectedEnd { expected: "'\"'" }),
                },
                Some(ch) => value.push(ch),
                None => return Err(SelectorError::UnexpectedEnd { expected: "'\"'" }),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("*")]
    #[case("CallExpression")]
    #[case(r#"CallExpression[callee.type="Identifier"][callee.name="require"]"#)]
    #[case(r#":matches(CallExpression, NewExpression)[arguments.length>=1]"#)]
    #[case(r#"MemberExpression[optional!=true][computed=false]:not([object.name="a\\b"], ThisExpression)"#)]
    #[case("CallExpression[arguments.length<=-2]")]
    fn rendering_round_trips(#[case] source: &str) {
        let selector = Selector::parse(source).expect("parse");
        assert_eq!(selector.to_string(), source);
        assert_eq!(Selector::parse(&selector.to_string()), Ok(selector));
    }

    #[test]
    fn single_element_matches_degenerates() {
        let selector = Selector::parse(r#"CallExpression:matches([callee.name="a"])"#).expect("parse");
        assert_eq!(selector.to_string(), r#"CallExpression[callee.name="a"]"#);
    }

    #[rstest]
    #[case("CallExpression[", SelectorError::UnexpectedEnd { expected: "attribute path" })]
    #[case("CallExpression[a~1]", SelectorError::UnexpectedChar { found: '~', offset: 16, expected: "comparison operator" })]
    #[case("CallExpression[a=maybe]", SelectorError::InvalidValue { value: "maybe".to_owned() })]
    #[case(r#"CallExpression[a="x]"#, SelectorError::UnexpectedEnd { expected: "'\"'" })]
    #[case("CallExpression:has(x)", SelectorError::UnexpectedChar { found: 'h', offset: 15, expected: "'matches(' or 'not('" })]
    fn malformed_selectors_are_rejected(#[case] source: &str, #[case] expected: SelectorError) {
        assert_eq!(Selector::parse(source), Err(expected));
    }
}
