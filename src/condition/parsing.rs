use crate::ast::{Expression, Value};
use crate::error::ConditionError;

/// Maximum nesting of parentheses and `!` before parsing gives up.
pub const MAX_NESTING: usize = 32;

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Path(String),
    Number(f64),
    Str(String),
    Bool(bool),
    Null,
    Op(&'static str),
    Not,
    And,
    Or,
    LParen,
    RParen,
}

impl Token {
    fn describe(&self) -> String {
        match self {
            Token::Path(p) => p.clone(),
            Token::Number(n) => Value::Number(*n).to_string(),
            Token::Str(s) => format!("'{}'", s),
            Token::Bool(b) => b.to_string(),
            Token::Null => "null".to_string(),
            Token::Op(op) => op.to_string(),
            Token::Not => "!".to_string(),
            Token::And => "&&".to_string(),
            Token::Or => "||".to_string(),
            Token::LParen => "(".to_string(),
            Token::RParen => ")".to_string(),
        }
    }
}

/// Splits a condition into tokens, each paired with its byte offset.
fn tokenize(source: &str) -> Result<Vec<(Token, usize)>, ConditionError> {
    let chars: Vec<(usize, char)> = source.char_indices().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let (pos, c) = chars[i];
        let peek = chars.get(i + 1).map(|&(_, c)| c);

        match c {
            c if c.is_whitespace() => i += 1,
            '(' => {
                tokens.push((Token::LParen, pos));
                i += 1;
            }
            ')' => {
                tokens.push((Token::RParen, pos));
                i += 1;
            }
            '&' if peek == Some('&') => {
                tokens.push((Token::And, pos));
                i += 2;
            }
            '|' if peek == Some('|') => {
                tokens.push((Token::Or, pos));
                i += 2;
            }
            '=' if peek == Some('=') => {
                tokens.push((Token::Op("=="), pos));
                i += 2;
            }
            '!' if peek == Some('=') => {
                tokens.push((Token::Op("!="), pos));
                i += 2;
            }
            '!' => {
                tokens.push((Token::Not, pos));
                i += 1;
            }
            '>' | '<' => {
                let op = match (c, peek) {
                    ('>', Some('=')) => ">=",
                    ('<', Some('=')) => "<=",
                    ('>', _) => ">",
                    _ => "<",
                };
                tokens.push((Token::Op(op), pos));
                i += op.len();
            }
            '\'' | '"' => {
                let quote = c;
                let mut literal = String::new();
                let mut j = i + 1;
                let mut closed = false;
                while j < chars.len() {
                    let (_, ch) = chars[j];
                    if ch == '\\' && j + 1 < chars.len() {
                        literal.push(chars[j + 1].1);
                        j += 2;
                        continue;
                    }
                    if ch == quote {
                        closed = true;
                        break;
                    }
                    literal.push(ch);
                    j += 1;
                }
                if !closed {
                    return Err(ConditionError::UnterminatedString(pos));
                }
                tokens.push((Token::Str(literal), pos));
                i = j + 1;
            }
            c if c.is_ascii_digit()
                || (c == '-' && peek.is_some_and(|p| p.is_ascii_digit()))
                || (c == '.' && peek.is_some_and(|p| p.is_ascii_digit())) =>
            {
                let mut j = i + 1;
                while j < chars.len() && (chars[j].1.is_ascii_digit() || chars[j].1 == '.') {
                    j += 1;
                }
                let end = chars.get(j).map_or(source.len(), |&(p, _)| p);
                let text = &source[pos..end];
                let number = text
                    .parse::<f64>()
                    .map_err(|_| ConditionError::UnexpectedToken {
                        found: text.to_string(),
                        position: pos,
                        expected: "a number".to_string(),
                    })?;
                tokens.push((Token::Number(number), pos));
                i = j;
            }
            c if c.is_alphabetic() || c == '_' || c == '$' => {
                let mut j = i + 1;
                while j < chars.len() {
                    let ch = chars[j].1;
                    if ch.is_alphanumeric() || ch == '_' || ch == '.' || ch == '-' || ch == '$' {
                        j += 1;
                    } else {
                        break;
                    }
                }
                let end = chars.get(j).map_or(source.len(), |&(p, _)| p);
                let word = &source[pos..end];
                let token = match word {
                    "true" => Token::Bool(true),
                    "false" => Token::Bool(false),
                    "null" => Token::Null,
                    "contains" => Token::Op("contains"),
                    "and" | "AND" => Token::And,
                    "or" | "OR" => Token::Or,
                    _ => Token::Path(word.trim_end_matches('.').to_string()),
                };
                tokens.push((token, pos));
                i = j;
            }
            other => {
                return Err(ConditionError::UnexpectedCharacter {
                    found: other,
                    position: pos,
                });
            }
        }
    }

    Ok(tokens)
}

/// Recursive-descent parser for the condition language.
///
/// ```text
/// or         := and ( "||" and )*
/// and        := unary ( "&&" unary )*
/// unary      := "!" unary | comparison
/// comparison := atom ( OP atom )?
/// atom       := "(" or ")" | literal | path
/// ```
struct ConditionParser {
    tokens: Vec<(Token, usize)>,
    position: usize,
    depth: usize,
}

impl ConditionParser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.position).map(|(t, _)| t)
    }

    fn advance(&mut self) -> Option<(Token, usize)> {
        let token = self.tokens.get(self.position).cloned();
        self.position += 1;
        token
    }

    fn enter(&mut self) -> Result<(), ConditionError> {
        self.depth += 1;
        if self.depth > MAX_NESTING {
            return Err(ConditionError::TooDeep(MAX_NESTING));
        }
        Ok(())
    }

    fn parse_or(&mut self) -> Result<Expression, ConditionError> {
        let mut left = self.parse_and()?;
        while self.peek() == Some(&Token::Or) {
            self.advance();
            let right = self.parse_and()?;
            left = Expression::Or(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<Expression, ConditionError> {
        let mut left = self.parse_unary()?;
        while self.peek() == Some(&Token::And) {
            self.advance();
            let right = self.parse_unary()?;
            left = Expression::And(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<Expression, ConditionError> {
        if self.peek() == Some(&Token::Not) {
            self.advance();
            self.enter()?;
            let inner = self.parse_unary()?;
            self.depth -= 1;
            return Ok(Expression::Not(Box::new(inner)));
        }
        self.parse_comparison()
    }

    fn parse_comparison(&mut self) -> Result<Expression, ConditionError> {
        let left = self.parse_atom()?;
        let op = match self.peek() {
            Some(Token::Op(op)) => *op,
            _ => return Ok(left),
        };
        self.advance();
        let right = self.parse_atom()?;
        let (l, r) = (Box::new(left), Box::new(right));
        Ok(match op {
            "==" => Expression::Equal(l, r),
            "!=" => Expression::NotEqual(l, r),
            ">" => Expression::GreaterThan(l, r),
            ">=" => Expression::GreaterThanOrEqual(l, r),
            "<" => Expression::SmallerThan(l, r),
            "<=" => Expression::SmallerThanOrEqual(l, r),
            _ => Expression::Contains(l, r),
        })
    }

    fn parse_atom(&mut self) -> Result<Expression, ConditionError> {
        let (token, position) = self
            .advance()
            .ok_or_else(|| ConditionError::UnexpectedEnd("a value or variable".to_string()))?;
        match token {
            Token::LParen => {
                self.enter()?;
                let inner = self.parse_or()?;
                self.depth -= 1;
                match self.advance() {
                    Some((Token::RParen, _)) => Ok(inner),
                    Some((other, position)) => Err(ConditionError::UnexpectedToken {
                        found: other.describe(),
                        position,
                        expected: "')'".to_string(),
                    }),
                    None => Err(ConditionError::UnexpectedEnd("')'".to_string())),
                }
            }
            Token::Path(path) => Ok(Expression::Variable(path)),
            Token::Number(n) => Ok(Expression::Literal(Value::Number(n))),
            Token::Str(s) => Ok(Expression::Literal(Value::String(s))),
            Token::Bool(b) => Ok(Expression::Literal(Value::Bool(b))),
            Token::Null => Ok(Expression::Literal(Value::Null)),
            other => Err(ConditionError::UnexpectedToken {
                found: other.describe(),
                position,
                expected: "a value or variable".to_string(),
            }),
        }
    }
}

/// Parses a condition string into an expression tree.
pub fn parse_condition(source: &str) -> Result<Expression, ConditionError> {
    let tokens = tokenize(source)?;
    if tokens.is_empty() {
        return Err(ConditionError::Empty);
    }

    let mut parser = ConditionParser {
        tokens,
        position: 0,
        depth: 0,
    };
    let expression = parser.parse_or()?;

    if let Some((token, position)) = parser.advance() {
        return Err(ConditionError::UnexpectedToken {
            found: token.describe(),
            position,
            expected: "end of condition".to_string(),
        });
    }
    Ok(expression)
}
