use super::Value;
use ahash::AHashSet;
use std::fmt;

/// The Abstract Syntax Tree of a parsed route condition.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Expression {
    // Logical
    Not(Box<Expression>),
    And(Box<Expression>, Box<Expression>),
    Or(Box<Expression>, Box<Expression>),

    // Comparison
    Equal(Box<Expression>, Box<Expression>),
    NotEqual(Box<Expression>, Box<Expression>),
    GreaterThan(Box<Expression>, Box<Expression>),
    GreaterThanOrEqual(Box<Expression>, Box<Expression>),
    SmallerThan(Box<Expression>, Box<Expression>),
    SmallerThanOrEqual(Box<Expression>, Box<Expression>),
    Contains(Box<Expression>, Box<Expression>),

    // Leaf nodes
    Literal(Value),
    Variable(String),
}

impl Expression {
    /// Collects every dotted variable path the expression reads.
    pub fn variables(&self, paths: &mut AHashSet<String>) {
        match self {
            Expression::Variable(path) => {
                paths.insert(path.clone());
            }
            Expression::And(l, r)
            | Expression::Or(l, r)
            | Expression::Equal(l, r)
            | Expression::NotEqual(l, r)
            | Expression::GreaterThan(l, r)
            | Expression::GreaterThanOrEqual(l, r)
            | Expression::SmallerThan(l, r)
            | Expression::SmallerThanOrEqual(l, r)
            | Expression::Contains(l, r) => {
                l.variables(paths);
                r.variables(paths);
            }
            Expression::Not(v) => v.variables(paths),
            Expression::Literal(_) => {}
        }
    }

    /// Symbol of a binary operator, as written in conditions.
    pub fn symbol(&self) -> Option<&'static str> {
        let symbol = match self {
            Expression::And(..) => "&&",
            Expression::Or(..) => "||",
            Expression::Equal(..) => "==",
            Expression::NotEqual(..) => "!=",
            Expression::GreaterThan(..) => ">",
            Expression::GreaterThanOrEqual(..) => ">=",
            Expression::SmallerThan(..) => "<",
            Expression::SmallerThanOrEqual(..) => "<=",
            Expression::Contains(..) => "contains",
            Expression::Not(_) => "!",
            Expression::Literal(_) | Expression::Variable(_) => return None,
        };
        Some(symbol)
    }
}

/// Renders a literal the way it would be written in a condition.
pub(crate) fn literal_source(value: &Value) -> String {
    match value {
        Value::String(s) => format!("'{}'", s),
        Value::List(items) => format!(
            "[{}]",
            items.iter().map(literal_source).collect::<Vec<_>>().join(", ")
        ),
        other => other.to_string(),
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Literal(v) => write!(f, "{}", literal_source(v)),
            Expression::Variable(path) => write!(f, "{}", path),
            Expression::Not(v) => write!(f, "!({})", v),
            Expression::And(l, r)
            | Expression::Or(l, r)
            | Expression::Equal(l, r)
            | Expression::NotEqual(l, r)
            | Expression::GreaterThan(l, r)
            | Expression::GreaterThanOrEqual(l, r)
            | Expression::SmallerThan(l, r)
            | Expression::SmallerThanOrEqual(l, r)
            | Expression::Contains(l, r) => {
                let symbol = self.symbol().unwrap_or("?");
                write!(f, "({} {} {})", l, symbol, r)
            }
        }
    }
}
