//! Parenthesization and precedence oracle.
//!
//! [`needs_parens`] decides whether an expression moved into a new syntactic
//! position must be wrapped to keep its meaning. The remaining functions
//! measure the redundant parentheses a user wrote around a node.

use std::ops::Range;

use strum::{Display, EnumString};
use tessel_syntax::{Field, NodeId, NodeKind, SourceCode, SyntaxTree, Token};

/// Logical operator of the expression receiving an operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
pub enum LogicalOperator {
    /// `&&`
    #[strum(serialize = "&&")]
    And,
    /// `||`
    #[strum(serialize = "||")]
    Or,
    /// `??`
    #[strum(serialize = "??")]
    Coalesce,
}

/// Operand slot of a binary or logical expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    /// The left operand.
    Left,
    /// The right operand.
    Right,
}

/// Prefix operator of the unary expression receiving an argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
#[expect(missing_docs, reason = "variants are named after their operators")]
pub enum UnaryOperator {
    #[strum(serialize = "-")]
    Minus,
    #[strum(serialize = "+")]
    Plus,
    #[strum(serialize = "!")]
    Not,
    #[strum(serialize = "~")]
    BitNot,
    #[strum(serialize = "typeof")]
    Typeof,
    #[strum(serialize = "void")]
    Void,
    #[strum(serialize = "delete")]
    Delete,
}

/// Destination position of an expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParenContext {
    /// `X()`
    CallCallee,
    /// `new X()`
    NewCallee,
    /// `X.prop`
    MemberObject,
    /// `...X`
    SpreadArgument,
    /// One side of `a && b`, `a || b` or `a ?? b`.
    LogicalOperand {
        /// Operator of the receiving expression.
        operator: LogicalOperator,
        /// Side the node will occupy.
        side: Side,
    },
    /// `await X`
    AwaitArgument,
    /// `-X`, `!X`, `typeof X` and friends.
    UnaryArgument {
        /// Operator of the receiving expression.
        operator: UnaryOperator,
    },
}

/// Kinds that bind looser than any unary operator.
fn is_loose(kind: NodeKind) -> bool {
    matches!(
        kind,
        NodeKind::SequenceExpression
            | NodeKind::YieldExpression
            | NodeKind::ArrowFunctionExpression
            | NodeKind::ConditionalExpression
            | NodeKind::AssignmentExpression
            | NodeKind::LogicalExpression
            | NodeKind::BinaryExpression
            | NodeKind::TSAsExpression
            | NodeKind::TSSatisfiesExpression
    )
}

/// Returns whether `node` must be wrapped in parentheses when its text is
/// placed at `context`.
#[must_use]
pub fn needs_parens(
    tree: &SyntaxTree,
    source: &SourceCode,
    node: NodeId,
    context: ParenContext,
) -> bool {
    let kind = tree.kind(node);
    match context {
        ParenContext::CallCallee => {
            is_loose(kind)
                || matches!(
                    kind,
                    NodeKind::UnaryExpression | NodeKind::UpdateExpression | NodeKind::AwaitExpression
                )
                || (kind == NodeKind::NewExpression && !is_new_with_parentheses(tree, source, node))
                || has_optional_link(tree, node)
        }
        ParenContext::NewCallee => {
            is_loose(kind)
                || matches!(
                    kind,
                    NodeKind::UnaryExpression
                        | NodeKind::UpdateExpression
                        | NodeKind::AwaitExpression
                        | NodeKind::ImportExpression
                )
                || (kind == NodeKind::NewExpression && !is_new_with_parentheses(tree, source, node))
                || contains_call_in_chain(tree, node)
                || has_optional_link(tree, node)
        }
        ParenContext::MemberObject => {
            is_loose(kind)
                || matches!(
                    kind,
                    NodeKind::UnaryExpression | NodeKind::UpdateExpression | NodeKind::AwaitExpression
                )
                || (kind == NodeKind::NewExpression && !is_new_with_parentheses(tree, source, node))
                || is_decimal_integer(tree, node)
                || has_optional_link(tree, node)
        }
        ParenContext::SpreadArgument => kind == NodeKind::SequenceExpression,
        ParenContext::AwaitArgument => is_loose(kind),
        ParenContext::LogicalOperand { operator, side } => {
            logical_operand_needs_parens(tree, node, operator, side)
        }
        ParenContext::UnaryArgument { operator } => {
            is_loose(kind) || merges_with_sign(tree, source, node, operator)
        }
    }
}

fn logical_operand_needs_parens(
    tree: &SyntaxTree,
    node: NodeId,
    outer: LogicalOperator,
    side: Side,
) -> bool {
    let kind = tree.kind(node);
    if kind != NodeKind::LogicalExpression {
        return matches!(
            kind,
            NodeKind::SequenceExpression
                | NodeKind::YieldExpression
                | NodeKind::ArrowFunctionExpression
                | NodeKind::ConditionalExpression
                | NodeKind::AssignmentExpression
        );
    }
    let Some(inner) = tree[node]
        .operator()
        .and_then(|operator| operator.parse::<LogicalOperator>().ok())
    else {
        return true;
    };
    match (outer, inner) {
        (LogicalOperator::Coalesce, LogicalOperator::Coalesce)
        | (LogicalOperator::And, LogicalOperator::And)
        | (LogicalOperator::Or, LogicalOperator::Or) => side == Side::Right,
        (LogicalOperator::Coalesce, _) | (_, LogicalOperator::Coalesce) => true,
        (LogicalOperator::Or, LogicalOperator::And) => false,
        (LogicalOperator::And, LogicalOperator::Or) => true,
    }
}

/// `- -a` must not collapse into `--a`.
fn merges_with_sign(
    tree: &SyntaxTree,
    source: &SourceCode,
    node: NodeId,
    operator: UnaryOperator,
) -> bool {
    let sign = match operator {
        UnaryOperator::Minus => '-',
        UnaryOperator::Plus => '+',
        _ => return false,
    };
    matches!(
        tree.kind(node),
        NodeKind::UnaryExpression | NodeKind::UpdateExpression
    ) && source
        .slice(tree.range(node))
        .starts_with(sign)
}

/// Returns whether a `new` expression was written with an argument list.
#[must_use]
pub fn is_new_with_parentheses(tree: &SyntaxTree, source: &SourceCode, node: NodeId) -> bool {
    if !tree.field_list(node, Field::Arguments).is_empty() {
        return true;
    }
    let range = tree.range(node);
    let tokens = source.tokens_in(range);
    match tokens {
        [_, _, .., open, close] => open.is_opening_paren() && close.is_closing_paren(),
        _ => false,
    }
}

fn is_decimal_integer(tree: &SyntaxTree, node: NodeId) -> bool {
    tree.is(node, NodeKind::Literal)
        && tree[node]
            .raw()
            .is_some_and(|raw| {
                raw.starts_with(|first: char| first.is_ascii_digit())
                    && raw.bytes().all(|byte| byte.is_ascii_digit() || byte == b'_')
            })
}

/// Walks the callee/object chain looking for an optional link.
fn has_optional_link(tree: &SyntaxTree, node: NodeId) -> bool {
    chain(tree, node).any(|link| tree[link].is_optional())
}

fn contains_call_in_chain(tree: &SyntaxTree, node: NodeId) -> bool {
    chain(tree, node).any(|link| tree.is(link, NodeKind::CallExpression))
}

fn chain(tree: &SyntaxTree, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
    std::iter::successors(Some(node), move |current| match tree.kind(*current) {
        NodeKind::CallExpression => tree.field(*current, Field::Callee),
        NodeKind::MemberExpression => tree.field(*current, Field::Object),
        NodeKind::TSNonNullExpression => tree.field(*current, Field::Expression),
        _ => None,
    })
    .filter(|link| tree.get(*link).is_some())
    .filter(move |link| {
        matches!(
            tree.kind(*link),
            NodeKind::CallExpression | NodeKind::MemberExpression
        )
    })
}

/// One pair of redundant parentheses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParenPair {
    /// Range of the `(` token.
    pub open: Range<usize>,
    /// Range of the `)` token.
    pub close: Range<usize>,
}

/// Redundant parentheses around a node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParenthesesInfo {
    /// Pairs from innermost to outermost.
    pub pairs: Vec<ParenPair>,
    /// Range of the node itself.
    pub bare: Range<usize>,
    /// Range including every pair.
    pub outer: Range<usize>,
}

impl ParenthesesInfo {
    /// Returns the number of pairs.
    #[must_use]
    pub fn count(&self) -> usize {
        self.pairs.len()
    }
}

/// Returns the start of the `(` that belongs to the parent's own syntax,
/// such as the only argument of a call or the test of an `if`.
fn syntax_paren_start(tree: &SyntaxTree, source: &SourceCode, node: NodeId) -> Option<usize> {
    let parent = tree.parent(node)?;
    let role = tree.role(node)?;
    let first_open_after = |offset: usize| {
        source
            .tokens_in(offset..tree.range(node).start)
            .iter()
            .find(|token| token.is_opening_paren())
            .map(|token| token.range.start)
    };
    match (tree.kind(parent), role) {
        (NodeKind::CallExpression | NodeKind::NewExpression, Field::Arguments) => {
            if tree.field_list(parent, Field::Arguments).len() != 1 {
                return None;
            }
            let callee = tree.field(parent, Field::Callee)?;
            first_open_after(tree.range(callee).end)
        }
        (NodeKind::ImportExpression, Field::Source)
        | (NodeKind::IfStatement | NodeKind::WhileStatement, Field::Test)
        | (NodeKind::SwitchStatement, Field::Discriminant)
        | (NodeKind::WithStatement, Field::Object) => first_open_after(tree.range(parent).start),
        (NodeKind::DoWhileStatement, Field::Test) => {
            let body = tree.field(parent, Field::Body)?;
            first_open_after(tree.range(body).end)
        }
        _ => None,
    }
}

/// Returns the redundant parentheses around `node`.
///
/// Walks outward while the surrounding tokens are `(` and `)`, skipping
/// only whitespace and comments. Parentheses that belong to the parent's
/// syntax are not counted.
#[must_use]
pub fn parentheses_info(tree: &SyntaxTree, source: &SourceCode, node: NodeId) -> ParenthesesInfo {
    let bare = tree.range(node);
    let syntax_paren = syntax_paren_start(tree, source, node);
    let mut outer = bare.clone();
    let mut pairs = Vec::new();
    while let (Some(open), Some(close)) = (
        source.token_before(outer.start),
        source.token_after(outer.end),
    ) {
        if !is_pair(open, close) || Some(open.range.start) == syntax_paren {
            break;
        }
        pairs.push(ParenPair {
            open: open.range.clone(),
            close: close.range.clone(),
        });
        outer = open.range.start..close.range.end;
    }
    ParenthesesInfo { pairs, bare, outer }
}

fn is_pair(open: &Token, close: &Token) -> bool {
    open.is_opening_paren() && close.is_closing_paren()
}

/// Returns the range of `node` including redundant parentheses.
#[must_use]
pub fn parenthesized_range(tree: &SyntaxTree, source: &SourceCode, node: NodeId) -> Range<usize> {
    parentheses_info(tree, source, node).outer
}

/// Returns the text of `node` including redundant parentheses.
#[must_use]
pub fn parenthesized_text<'s>(tree: &SyntaxTree, source: &'s SourceCode, node: NodeId) -> &'s str {
    source.slice(parenthesized_range(tree, source, node))
}

/// Returns how many pairs of redundant parentheses surround `node`.
#[must_use]
pub fn parentheses_count(tree: &SyntaxTree, source: &SourceCode, node: NodeId) -> usize {
    parentheses_info(tree, source, node).count()
}

/// Returns whether `node` is wrapped in at least one redundant pair.
#[must_use]
pub fn is_parenthesized(tree: &SyntaxTree, source: &SourceCode, node: NodeId) -> bool {
    parentheses_count(tree, source, node) > 0
}
