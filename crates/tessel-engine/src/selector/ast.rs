//! Selector syntax tree and its canonical rendering.

use std::fmt;

/// Comparison operator of an attribute clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Comparison {
    /// `=`
    Eq,
    /// `!=`
    NotEq,
    /// `>`
    Gt,
    /// `>=`
    Ge,
    /// `<`
    Lt,
    /// `<=`
    Le,
}

impl Comparison {
    /// Returns the operator as written in a selector.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::NotEq => "!=",
            Self::Gt => ">",
            Self::Ge => ">=",
            Self::Lt => "<",
            Self::Le => "<=",
        }
    }

    /// Returns whether this operator compares numbers.
    #[must_use]
    pub const fn is_numeric(self) -> bool {
        matches!(self, Self::Gt | Self::Ge | Self::Lt | Self::Le)
    }
}

/// Right-hand side of an attribute clause.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AttributeValue {
    /// A double-quoted string.
    Str(String),
    /// An integer.
    Num(i64),
    /// `true` or `false`.
    Bool(bool),
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Str(value) => {
                f.write_str("\"")?;
                for ch in value.chars() {
                    if matches!(ch, '"' | '\\') {
                        f.write_str("\\")?;
                    }
                    write!(f, "{ch}")?;
                }
                f.write_str("\"")
            }
            Self::Num(value) => write!(f, "{value}"),
            Self::Bool(value) => write!(f, "{value}"),
        }
    }
}

/// One condition of a compound selector.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Clause {
    /// The node type is the given ESTree name.
    Type(String),
    /// `[path op value]`.
    Attribute {
        /// Dotted attribute path, e.g. `["callee", "name"]`.
        path: Vec<String>,
        /// Comparison operator.
        op: Comparison,
        /// Value compared against.
        value: AttributeValue,
    },
    /// `:matches(a, b)`: at least one holds.
    Matches(Vec<Clause>),
    /// `:not(a, b)`: none holds.
    Not(Vec<Clause>),
}

impl Clause {
    /// Builds an attribute clause from a dotted path.
    #[must_use]
    pub fn attribute(path: &[&str], op: Comparison, value: AttributeValue) -> Self {
        Self::Attribute {
            path: path.iter().map(|segment| (*segment).to_owned()).collect(),
            op,
            value,
        }
    }

    /// Builds `[path="value"]`.
    #[must_use]
    pub fn equals(path: &[&str], value: impl Into<String>) -> Self {
        Self::attribute(path, Comparison::Eq, AttributeValue::Str(value.into()))
    }

    /// Builds an OR of `clauses`; a single clause stands for itself.
    #[must_use]
    pub fn any(mut clauses: Vec<Self>) -> Self {
        if clauses.len() == 1
            && let Some(only) = clauses.pop()
        {
            return only;
        }
        Self::Matches(clauses)
    }

    /// Returns a copy with `prefix` prepended to every attribute path.
    #[must_use]
    pub fn prefixed(&self, prefix: &str) -> Self {
        match self {
            Self::Type(name) => Self::attribute(
                &[prefix, "type"],
                Comparison::Eq,
                AttributeValue::Str(name.clone()),
            ),
            Self::Attribute { path, op, value } => Self::Attribute {
                path: std::iter::once(prefix.to_owned())
                    .chain(path.iter().cloned())
                    .collect(),
                op: *op,
                value: value.clone(),
            },
            Self::Matches(clauses) => {
                Self::Matches(clauses.iter().map(|clause| clause.prefixed(prefix)).collect())
            }
            Self::Not(clauses) => {
                Self::Not(clauses.iter().map(|clause| clause.prefixed(prefix)).collect())
            }
        }
    }
}

fn write_list(f: &mut fmt::Formatter<'_>, name: &str, clauses: &[Clause]) -> fmt::Result {
    write!(f, ":{name}(")?;
    for (index, clause) in clauses.iter().enumerate() {
        if index > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{clause}")?;
    }
    f.write_str(")")
}

impl fmt::Display for Clause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Type(name) => f.write_str(name),
            Self::Attribute { path, op, value } => {
                write!(f, "[{}{}{value}]", path.join("."), op.as_str())
            }
            Self::Matches(clauses) => match clauses.as_slice() {
                [only] => write!(f, "{only}"),
                _ => write_list(f, "matches", clauses),
            },
            Self::Not(clauses) => write_list(f, "not", clauses),
        }
    }
}

/// A compound selector: an optional node-type head followed by clauses that
/// must all hold.
///
/// # Example
///
/// ```
/// use tessel_engine::selector::{Clause, Selector};
///
/// let selector = Selector::new(Some("CallExpression"), vec![
///     Clause::equals(&["callee", "type"], "Identifier"),
/// ]);
/// assert_eq!(selector.to_string(), r#"CallExpression[callee.type="Identifier"]"#);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Selector {
    pub(crate) head: Option<String>,
    pub(crate) clauses: Vec<Clause>,
}

impl Selector {
    /// Creates a selector.
    #[must_use]
    pub fn new(head: Option<&str>, clauses: Vec<Clause>) -> Self {
        Self {
            head: head.map(str::to_owned),
            clauses,
        }
    }

    /// Returns the node-type head, if any.
    #[must_use]
    pub fn head(&self) -> Option<&str> {
        self.head.as_deref()
    }

    /// Returns the clauses.
    #[must_use]
    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.head, self.clauses.is_empty()) {
            (None, true) => f.write_str("*"),
            (head, _) => {
                if let Some(name) = head {
                    f.write_str(name)?;
                }
                for clause in &self.clauses {
                    write!(f, "{clause}")?;
                }
                Ok(())
            }
        }
    }
}
