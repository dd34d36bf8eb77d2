//! Parser for the canonical predicate syntax.
//!
//! Inverse of the `Display` impls in [`crate::refine`]: any predicate
//! printed by the canonical printer parses back to a syntactically equal
//! value. Machine consumers use this to echo goals and hint templates back
//! into structured form.

use num_bigint::BigInt;

use crate::refine::{ArithOp, CompareOp, Predicate, Term};

/// Error produced when predicate text does not match the canonical grammar.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("invalid predicate at offset {offset}: {message}")]
pub struct PredParseError {
    pub offset: usize,
    pub message: String,
}

/// Parse a predicate in canonical syntax.
pub fn parse_predicate(input: &str) -> Result<Predicate, PredParseError> {
    let tokens = lex(input)?;
    let mut parser = Parser { tokens, pos: 0 };
    let pred = parser.pred()?;
    parser.expect_end()?;
    Ok(pred)
}

/// Parse a term in canonical syntax.
pub fn parse_term(input: &str) -> Result<Term, PredParseError> {
    let tokens = lex(input)?;
    let mut parser = Parser { tokens, pos: 0 };
    let term = parser.term()?;
    parser.expect_end()?;
    Ok(term)
}

#[derive(Clone, Debug, PartialEq)]
enum Token {
    Ident(String),
    Int(BigInt),
    Str(String),
    Sym(&'static str),
}

struct Spanned {
    token: Token,
    offset: usize,
}

fn err(offset: usize, message: impl Into<String>) -> PredParseError {
    PredParseError {
        offset,
        message: message.into(),
    }
}

fn lex(input: &str) -> Result<Vec<Spanned>, PredParseError> {
    let bytes = input.as_bytes();
    let mut tokens = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        let c = bytes[i] as char;
        if c.is_ascii_whitespace() {
            i += 1;
            continue;
        }
        let start = i;
        if c.is_ascii_alphabetic() || c == '_' {
            while i < bytes.len() && ((bytes[i] as char).is_ascii_alphanumeric() || bytes[i] == b'_')
            {
                i += 1;
            }
            tokens.push(Spanned {
                token: Token::Ident(input[start..i].to_string()),
                offset: start,
            });
        } else if c.is_ascii_digit() || (c == '-' && bytes.get(i + 1).is_some_and(u8::is_ascii_digit) && starts_literal(&tokens)) {
            i += 1;
            while i < bytes.len() && (bytes[i] as char).is_ascii_digit() {
                i += 1;
            }
            let value = BigInt::parse_bytes(input[start..i].as_bytes(), 10)
                .ok_or_else(|| err(start, "invalid integer literal"))?;
            tokens.push(Spanned {
                token: Token::Int(value),
                offset: start,
            });
        } else if c == '"' {
            i += 1;
            let mut value = String::new();
            loop {
                match bytes.get(i) {
                    None => return Err(err(start, "unterminated string literal")),
                    Some(b'"') => {
                        i += 1;
                        break;
                    }
                    Some(b'\\') => {
                        let escaped = bytes
                            .get(i + 1)
                            .ok_or_else(|| err(i, "dangling escape"))?;
                        value.push(match escaped {
                            b'n' => '\n',
                            b't' => '\t',
                            other => *other as char,
                        });
                        i += 2;
                    }
                    Some(other) => {
                        value.push(*other as char);
                        i += 1;
                    }
                }
            }
            tokens.push(Spanned {
                token: Token::Str(value),
                offset: start,
            });
        } else {
            let two = input.get(i..i + 2);
            let sym = match two {
                Some(s @ ("&&" | "||" | "==" | "!=" | "<=" | ">=")) => {
                    i += 2;
                    match s {
                        "&&" => "&&",
                        "||" => "||",
                        "==" => "==",
                        "!=" => "!=",
                        "<=" => "<=",
                        _ => ">=",
                    }
                }
                _ => {
                    i += 1;
                    match c {
                        '(' => "(",
                        ')' => ")",
                        ',' => ",",
                        '.' => ".",
                        '!' => "!",
                        '<' => "<",
                        '>' => ">",
                        '+' => "+",
                        '-' => "-",
                        '*' => "*",
                        '/' => "/",
                        '%' => "%",
                        other => return Err(err(start, format!("unexpected character `{other}`"))),
                    }
                }
            };
            tokens.push(Spanned {
                token: Token::Sym(sym),
                offset: start,
            });
        }
    }
    Ok(tokens)
}

/// A leading `-` starts a negative literal only where a term may begin.
fn starts_literal(tokens: &[Spanned]) -> bool {
    match tokens.last() {
        None => true,
        Some(spanned) => matches!(
            spanned.token,
            Token::Sym("(" | "," | "&&" | "||" | "!" | "==" | "!=" | "<" | "<=" | ">" | ">=" | "+" | "-" | "*" | "/" | "%")
        ),
    }
}

struct Parser {
    tokens: Vec<Spanned>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|s| &s.token)
    }

    fn offset(&self) -> usize {
        self.tokens.get(self.pos).map_or(usize::MAX, |s| s.offset)
    }

    fn bump(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).map(|s| s.token.clone());
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn eat_sym(&mut self, sym: &str) -> bool {
        if self.peek() == Some(&Token::Sym(sym_static(sym))) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect_sym(&mut self, sym: &str) -> Result<(), PredParseError> {
        if self.eat_sym(sym) {
            Ok(())
        } else {
            Err(err(self.offset(), format!("expected `{sym}`")))
        }
    }

    fn expect_end(&self) -> Result<(), PredParseError> {
        if self.pos == self.tokens.len() {
            Ok(())
        } else {
            Err(err(self.offset(), "trailing input"))
        }
    }

    fn pred(&mut self) -> Result<Predicate, PredParseError> {
        let mut lhs = self.and_pred()?;
        while self.eat_sym("||") {
            let rhs = self.and_pred()?;
            lhs = Predicate::or(lhs, rhs);
        }
        Ok(lhs)
    }

    fn and_pred(&mut self) -> Result<Predicate, PredParseError> {
        let mut lhs = self.unary_pred()?;
        while self.eat_sym("&&") {
            let rhs = self.unary_pred()?;
            lhs = Predicate::and(lhs, rhs);
        }
        Ok(lhs)
    }

    fn unary_pred(&mut self) -> Result<Predicate, PredParseError> {
        if self.eat_sym("!") {
            return Ok(Predicate::not(self.unary_pred()?));
        }
        self.atom_pred()
    }

    fn atom_pred(&mut self) -> Result<Predicate, PredParseError> {
        match self.peek() {
            Some(Token::Ident(name)) if name == "true" => {
                self.pos += 1;
                // A bare `true` is the constant; `true == x` never prints.
                Ok(Predicate::True)
            }
            Some(Token::Ident(name)) if name == "false" => {
                self.pos += 1;
                Ok(Predicate::False)
            }
            Some(Token::Ident(name)) if name == "unknown" => {
                self.pos += 1;
                self.expect_sym("(")?;
                let source = match self.bump() {
                    Some(Token::Str(s)) => s,
                    _ => return Err(err(self.offset(), "expected string in unknown(..)")),
                };
                self.expect_sym(")")?;
                Ok(Predicate::Unknown(source))
            }
            Some(Token::Sym("(")) => {
                // Either a parenthesized predicate or a parenthesized term;
                // try the predicate reading first and backtrack.
                let saved = self.pos;
                self.pos += 1;
                if let Ok(inner) = self.pred() {
                    if self.eat_sym(")") && !self.at_compare_or_arith() {
                        return Ok(inner);
                    }
                }
                self.pos = saved;
                self.compare()
            }
            _ => self.compare(),
        }
    }

    /// After closing a predicate paren, a comparison or arithmetic operator
    /// means the paren actually belonged to a term.
    fn at_compare_or_arith(&self) -> bool {
        matches!(
            self.peek(),
            Some(Token::Sym(
                "==" | "!=" | "<" | "<=" | ">" | ">=" | "+" | "-" | "*" | "/" | "%" | "."
            ))
        )
    }

    fn compare(&mut self) -> Result<Predicate, PredParseError> {
        let lhs = self.term()?;
        let op = match self.peek() {
            Some(Token::Sym(sym)) => CompareOp::parse(sym),
            _ => None,
        };
        match op {
            Some(op) => {
                self.pos += 1;
                let rhs = self.term()?;
                Ok(Predicate::Compare(op, lhs, rhs))
            }
            None => match lhs {
                // A bare call in predicate position is an uninterpreted
                // named predicate.
                Term::Call(name, args) => Ok(Predicate::Call(name, args)),
                _ => Err(err(self.offset(), "expected comparison operator")),
            },
        }
    }

    fn term(&mut self) -> Result<Term, PredParseError> {
        let mut lhs = self.factor()?;
        loop {
            let op = match self.peek() {
                Some(Token::Sym("+")) => ArithOp::Add,
                Some(Token::Sym("-")) => ArithOp::Sub,
                _ => break,
            };
            self.pos += 1;
            let rhs = self.factor()?;
            lhs = Term::binop(op, lhs, rhs);
        }
        Ok(lhs)
    }

    fn factor(&mut self) -> Result<Term, PredParseError> {
        let mut lhs = self.primary()?;
        loop {
            let op = match self.peek() {
                Some(Token::Sym("*")) => ArithOp::Mul,
                Some(Token::Sym("/")) => ArithOp::Div,
                Some(Token::Sym("%")) => ArithOp::Rem,
                _ => break,
            };
            self.pos += 1;
            let rhs = self.primary()?;
            lhs = Term::binop(op, lhs, rhs);
        }
        Ok(lhs)
    }

    fn primary(&mut self) -> Result<Term, PredParseError> {
        let offset = self.offset();
        let mut base = match self.bump() {
            Some(Token::Int(value)) => Term::Int(value),
            Some(Token::Str(value)) => Term::Str(value),
            Some(Token::Ident(name)) if name == "true" => Term::Bool(true),
            Some(Token::Ident(name)) if name == "false" => Term::Bool(false),
            Some(Token::Ident(name)) => {
                if self.eat_sym("(") {
                    let mut args = Vec::new();
                    if !self.eat_sym(")") {
                        loop {
                            args.push(self.term()?);
                            if self.eat_sym(")") {
                                break;
                            }
                            self.expect_sym(",")?;
                        }
                    }
                    Term::Call(name, args)
                } else {
                    Term::Var(name)
                }
            }
            Some(Token::Sym("(")) => {
                let inner = self.term()?;
                self.expect_sym(")")?;
                inner
            }
            _ => return Err(err(offset, "expected term")),
        };
        while self.eat_sym(".") {
            match self.bump() {
                Some(Token::Ident(field)) => base = Term::Field(Box::new(base), field),
                _ => return Err(err(self.offset(), "expected field name after `.`")),
            }
        }
        Ok(base)
    }
}

fn sym_static(sym: &str) -> &'static str {
    match sym {
        "&&" => "&&",
        "||" => "||",
        "==" => "==",
        "!=" => "!=",
        "<=" => "<=",
        ">=" => ">=",
        "(" => "(",
        ")" => ")",
        "," => ",",
        "." => ".",
        "!" => "!",
        "<" => "<",
        ">" => ">",
        "+" => "+",
        "-" => "-",
        "*" => "*",
        "/" => "/",
        "%" => "%",
        _ => "",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn round_trip(pred: &Predicate) {
        let printed = pred.to_string();
        let reparsed = parse_predicate(&printed)
            .unwrap_or_else(|e| panic!("failed to reparse `{printed}`: {e}"));
        assert_eq!(&reparsed, pred, "round trip of `{printed}`");
    }

    #[test]
    fn parses_simple_comparison() {
        let pred = parse_predicate("x > 0").unwrap();
        assert_eq!(
            pred,
            Predicate::compare(CompareOp::Gt, Term::var("x"), Term::int(0))
        );
    }

    #[test]
    fn parses_arithmetic() {
        let pred = parse_predicate("x + 1 > 0").unwrap();
        assert_eq!(
            pred,
            Predicate::compare(
                CompareOp::Gt,
                Term::binop(ArithOp::Add, Term::var("x"), Term::int(1)),
                Term::int(0)
            )
        );
    }

    #[test]
    fn parses_logical_structure() {
        let pred = parse_predicate("x > 0 && x < 10 || y == 1").unwrap();
        assert_eq!(
            pred,
            Predicate::or(
                Predicate::and(
                    Predicate::compare(CompareOp::Gt, Term::var("x"), Term::int(0)),
                    Predicate::compare(CompareOp::Lt, Term::var("x"), Term::int(10)),
                ),
                Predicate::compare(CompareOp::Eq, Term::var("y"), Term::int(1)),
            )
        );
    }

    #[test]
    fn parses_negative_literals() {
        let pred = parse_predicate("x >= -5").unwrap();
        assert_eq!(
            pred,
            Predicate::compare(CompareOp::Ge, Term::var("x"), Term::int(-5))
        );
    }

    #[test]
    fn round_trips_canonical_forms() {
        round_trip(&Predicate::True);
        round_trip(&Predicate::False);
        round_trip(&Predicate::Unknown("opaque cast".to_string()));
        round_trip(&Predicate::compare(
            CompareOp::Le,
            Term::binop(
                ArithOp::Mul,
                Term::binop(ArithOp::Add, Term::var("x"), Term::int(1)),
                Term::int(2),
            ),
            Term::var("y"),
        ));
        round_trip(&Predicate::not(Predicate::or(
            Predicate::compare(CompareOp::Eq, Term::var("a"), Term::int(0)),
            Predicate::Call("sorted".to_string(), vec![Term::var("xs")]),
        )));
        round_trip(&Predicate::and(
            Predicate::compare(
                CompareOp::Gt,
                Term::Call("len".to_string(), vec![Term::var("arr")]),
                Term::int(0),
            ),
            Predicate::compare(
                CompareOp::Ne,
                Term::Field(Box::new(Term::var("p")), "count".to_string()),
                Term::int(0),
            ),
        ));
        // Right-nested And needs parens and must survive.
        round_trip(&Predicate::and(
            Predicate::True,
            Predicate::and(Predicate::False, Predicate::True),
        ));
    }

    #[test]
    fn rejects_garbage() {
        assert!(parse_predicate("x >").is_err());
        assert!(parse_predicate("&& y").is_err());
        assert!(parse_predicate("x > 0 extra").is_err());
    }
}
