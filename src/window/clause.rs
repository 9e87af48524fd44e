//! Window clause reader.
//!
//! Reads `OVER (PARTITION BY dept ORDER BY salary DESC NULLS FIRST ROWS ...)`
//! into a [`WindowShape`] and resolves that shape against a result schema to
//! produce an [`OrderSpec`]. Frame clauses are recognized only so the ORDER BY
//! list knows where to stop and so constraint checks can see the frame unit.

use super::spec::{Direction, NullsPlacement, OrderSpec, SortKey};
use crate::error::{ErrorCode, OracleResult};
use crate::model::Schema;
use serde::Serialize;

/// Frame unit of a window frame clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FrameUnit {
    /// ROWS frame.
    Rows,
    /// RANGE frame.
    Range,
    /// GROUPS frame.
    Groups,
}

/// One ORDER BY term as written, before resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderTerm {
    /// Column name as written (quotes removed).
    pub column: String,
    /// Sort direction.
    pub direction: Direction,
    /// Explicit null placement, if the clause has one.
    pub nulls: Option<NullsPlacement>,
}

/// Structure of a window clause, independent of any schema.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WindowShape {
    /// PARTITION BY columns.
    pub partition_by: Vec<String>,
    /// ORDER BY terms in clause order.
    pub order_by: Vec<OrderTerm>,
    /// Frame unit, if a frame clause is present.
    pub frame: Option<FrameUnit>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Word(String),
    Ident(String),
    Comma,
    Open,
    Close,
    Other(char),
}

impl Token {
    fn is_keyword(&self, keyword: &str) -> bool {
        matches!(self, Token::Word(w) if w.eq_ignore_ascii_case(keyword))
    }

    fn frame_unit(&self) -> Option<FrameUnit> {
        match self {
            Token::Word(w) if w.eq_ignore_ascii_case("ROWS") => Some(FrameUnit::Rows),
            Token::Word(w) if w.eq_ignore_ascii_case("RANGE") => Some(FrameUnit::Range),
            Token::Word(w) if w.eq_ignore_ascii_case("GROUPS") => Some(FrameUnit::Groups),
            _ => None,
        }
    }

    fn describe(&self) -> String {
        match self {
            Token::Word(w) | Token::Ident(w) => w.clone(),
            Token::Comma => ",".to_string(),
            Token::Open => "(".to_string(),
            Token::Close => ")".to_string(),
            Token::Other(c) => c.to_string(),
        }
    }
}

fn malformed(reason: impl Into<String>) -> ErrorCode {
    ErrorCode::E302_MalformedWindow(reason.into())
}

fn tokenize(clause: &str) -> OracleResult<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut chars = clause.chars().peekable();

    while let Some(&c) = chars.peek() {
        match c {
            c if c.is_whitespace() => {
                chars.next();
            }
            ',' => {
                chars.next();
                tokens.push(Token::Comma);
            }
            '(' => {
                chars.next();
                tokens.push(Token::Open);
            }
            ')' => {
                chars.next();
                tokens.push(Token::Close);
            }
            '"' | '`' | '[' => {
                chars.next();
                let close = if c == '[' { ']' } else { c };
                let mut name = String::new();
                loop {
                    match chars.next() {
                        Some(ch) if ch == close => break,
                        Some(ch) => name.push(ch),
                        None => return Err(malformed(format!("unterminated identifier '{}'", name))),
                    }
                }
                tokens.push(Token::Ident(name));
            }
            c if c.is_alphanumeric() || c == '_' => {
                let mut word = String::new();
                while let Some(&ch) = chars.peek() {
                    if ch.is_alphanumeric() || ch == '_' || ch == '.' {
                        word.push(ch);
                        chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push(Token::Word(word));
            }
            other => {
                chars.next();
                tokens.push(Token::Other(other));
            }
        }
    }

    Ok(tokens)
}

/// Strip a leading `OVER` and one pair of enclosing parentheses.
fn window_body(tokens: &[Token]) -> OracleResult<&[Token]> {
    let mut body = tokens;
    if body.first().is_some_and(|t| t.is_keyword("OVER")) {
        body = &body[1..];
    }
    if body.first() == Some(&Token::Open) {
        if body.last() != Some(&Token::Close) {
            return Err(malformed("unbalanced parentheses"));
        }
        body = &body[1..body.len() - 1];
    }
    Ok(body)
}

struct ShapeParser<'a> {
    tokens: &'a [Token],
    pos: usize,
}

impl<'a> ShapeParser<'a> {
    fn peek(&self) -> Option<&'a Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<&'a Token> {
        let token = self.tokens.get(self.pos);
        self.pos += 1;
        token
    }

    fn eat_keyword(&mut self, keyword: &str) -> bool {
        if self.peek().is_some_and(|t| t.is_keyword(keyword)) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect_keyword(&mut self, keyword: &str) -> OracleResult<()> {
        if self.eat_keyword(keyword) {
            Ok(())
        } else {
            Err(malformed(format!("expected {}", keyword)))
        }
    }

    fn column_name(&mut self) -> OracleResult<String> {
        match self.next() {
            Some(Token::Ident(name)) => Ok(name.clone()),
            Some(Token::Word(word)) => {
                // Qualified names resolve by their last component.
                Ok(word.rsplit('.').next().unwrap_or(word).to_string())
            }
            Some(other) => Err(malformed(format!(
                "expected column name, found '{}'",
                other.describe()
            ))),
            None => Err(malformed("expected column name, found end of clause")),
        }
    }

    fn at_clause_boundary(&self) -> bool {
        match self.peek() {
            None => true,
            Some(t) => t.is_keyword("ORDER") || t.frame_unit().is_some(),
        }
    }

    fn parse(mut self) -> OracleResult<WindowShape> {
        let mut shape = WindowShape::default();

        if self.eat_keyword("PARTITION") {
            self.expect_keyword("BY")?;
            loop {
                shape.partition_by.push(self.column_name()?);
                if self.peek() == Some(&Token::Comma) {
                    self.pos += 1;
                    continue;
                }
                if self.at_clause_boundary() {
                    break;
                }
                return Err(malformed(format!(
                    "unsupported PARTITION BY term near '{}'",
                    self.peek().map(Token::describe).unwrap_or_default()
                )));
            }
        }

        if self.eat_keyword("ORDER") {
            self.expect_keyword("BY")?;
            loop {
                shape.order_by.push(self.order_term()?);
                match self.peek() {
                    Some(Token::Comma) => {
                        self.pos += 1;
                    }
                    None => break,
                    Some(t) if t.frame_unit().is_some() => break,
                    Some(t) => {
                        return Err(malformed(format!(
                            "unsupported ORDER BY term near '{}'",
                            t.describe()
                        )))
                    }
                }
            }
        }

        match self.peek() {
            None => {}
            Some(t) => match t.frame_unit() {
                Some(unit) => shape.frame = Some(unit),
                None => {
                    return Err(malformed(format!(
                        "unexpected '{}' in window clause",
                        t.describe()
                    )))
                }
            },
        }

        Ok(shape)
    }

    fn order_term(&mut self) -> OracleResult<OrderTerm> {
        let column = self.column_name()?;

        let direction = if self.eat_keyword("DESC") {
            Direction::Desc
        } else {
            self.eat_keyword("ASC");
            Direction::Asc
        };

        let nulls = if self.eat_keyword("NULLS") {
            if self.eat_keyword("FIRST") {
                Some(NullsPlacement::First)
            } else if self.eat_keyword("LAST") {
                Some(NullsPlacement::Last)
            } else {
                return Err(malformed("NULLS must be followed by FIRST or LAST"));
            }
        } else {
            None
        };

        Ok(OrderTerm {
            column,
            direction,
            nulls,
        })
    }
}

/// Read the structure of a window clause.
///
/// Accepts the clause with or without the leading `OVER` and parentheses.
pub fn parse_shape(clause: &str) -> OracleResult<WindowShape> {
    let tokens = tokenize(clause)?;
    let body = window_body(&tokens)?;
    ShapeParser {
        tokens: body,
        pos: 0,
    }
    .parse()
}

impl WindowShape {
    /// Resolve column names against `schema`.
    ///
    /// PARTITION BY, when present, must name exactly the schema's column 0.
    pub fn resolve(&self, schema: &Schema) -> OracleResult<OrderSpec> {
        match self.partition_by.as_slice() {
            [] => {}
            [single] => match schema.index_of(single) {
                Some(0) => {}
                Some(_) => return Err(ErrorCode::E303_PartitionNotLeading(single.clone())),
                None => return Err(ErrorCode::E301_UnknownColumn(single.clone())),
            },
            many => return Err(ErrorCode::E303_PartitionNotLeading(many.join(", "))),
        }

        let mut keys = Vec::with_capacity(self.order_by.len());
        for term in &self.order_by {
            let column = schema
                .index_of(&term.column)
                .ok_or_else(|| ErrorCode::E301_UnknownColumn(term.column.clone()))?;
            keys.push(SortKey {
                column,
                direction: term.direction,
                nulls: term.nulls.unwrap_or_default(),
            });
        }

        Ok(OrderSpec::new(keys))
    }
}

impl OrderSpec {
    /// Build an order spec from a window clause and the result schema.
    pub fn from_window_clause(clause: &str, schema: &Schema) -> OracleResult<Self> {
        let spec = parse_shape(clause)?.resolve(schema)?;
        spec.validate(schema)?;
        Ok(spec)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema() -> Schema {
        Schema::new(["dept", "salary", "age", "wf_result"]).unwrap()
    }

    #[test]
    fn test_full_clause() {
        let spec = OrderSpec::from_window_clause(
            "OVER (PARTITION BY dept ORDER BY salary DESC, age ASC NULLS FIRST)",
            &schema(),
        )
        .unwrap();
        assert_eq!(
            spec.keys(),
            &[SortKey::desc(1), SortKey::asc(2).nulls_first()]
        );
    }

    #[test]
    fn test_frame_terminates_order_by() {
        let shape =
            parse_shape("over (partition by dept order by age rows between 1 preceding and current row)")
                .unwrap();
        assert_eq!(shape.partition_by, vec!["dept".to_string()]);
        assert_eq!(shape.order_by.len(), 1);
        assert_eq!(shape.frame, Some(FrameUnit::Rows));
    }

    #[test]
    fn test_bare_order_by() {
        let spec = OrderSpec::from_window_clause("ORDER BY \"salary\"", &schema()).unwrap();
        assert_eq!(spec.keys(), &[SortKey::asc(1)]);
    }

    #[test]
    fn test_partition_only() {
        let spec = OrderSpec::from_window_clause("OVER (PARTITION BY dept)", &schema()).unwrap();
        assert!(spec.keys().is_empty());
    }

    #[test]
    fn test_partition_must_lead() {
        assert!(matches!(
            OrderSpec::from_window_clause("OVER (PARTITION BY salary)", &schema()),
            Err(ErrorCode::E303_PartitionNotLeading(_))
        ));
        assert!(matches!(
            OrderSpec::from_window_clause("OVER (PARTITION BY dept, age)", &schema()),
            Err(ErrorCode::E303_PartitionNotLeading(_))
        ));
    }

    #[test]
    fn test_unknown_column() {
        assert!(matches!(
            OrderSpec::from_window_clause("OVER (PARTITION BY dept ORDER BY bonus)", &schema()),
            Err(ErrorCode::E301_UnknownColumn(name)) if name == "bonus"
        ));
    }

    #[test]
    fn test_expression_rejected() {
        assert!(matches!(
            parse_shape("OVER (ORDER BY salary + 1)"),
            Err(ErrorCode::E302_MalformedWindow(_))
        ));
        assert!(matches!(
            parse_shape("OVER (ORDER BY salary NULLS)"),
            Err(ErrorCode::E302_MalformedWindow(_))
        ));
        assert!(matches!(
            parse_shape("OVER (ORDER BY salary"),
            Err(ErrorCode::E302_MalformedWindow(_))
        ));
    }

    #[test]
    fn test_qualified_names() {
        let spec =
            OrderSpec::from_window_clause("OVER (PARTITION BY t1.dept ORDER BY t1.age DESC)", &schema())
                .unwrap();
        assert_eq!(spec.keys(), &[SortKey::desc(2)]);
    }
}
