//! Análisis sintáctico.
//!
//! Descenso recursivo con un solo token de lookahead. La gramática es
//! pequeña: un programa es `ERWACHE` seguido de sentencias, y las
//! expresiones tienen tres niveles de precedencia (comparación, suma y
//! producto), todos asociativos a la izquierda.
//!
//! Los fines de línea solo separan sentencias; el parser los descarta
//! donde sea que puedan aparecer entre ellas.

use std::{
    fmt::{self, Display},
    iter::Peekable,
    slice,
};

use thiserror::Error;

use crate::{
    lex::{Keyword, Token},
    source::Located,
};

use runtime::value::SLOTS;

/// Árbol sintáctico de un programa completo.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ast(pub Vec<Located<Statement>>);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Statement {
    /// `VERNEINUNG`
    Halt,

    /// `DING n = expr`
    Assign { slot: Slot, value: Expr },

    /// `VORSTELLUNG expr`
    Output(Expr),

    /// `WILLE n`
    Input(Slot),

    /// `WENN expr DANN ... [SONST ...] ENDE`
    If {
        condition: Expr,
        body: Vec<Located<Statement>>,
        otherwise: Vec<Located<Statement>>,
    },

    /// `SOLANGE expr ... ENDE`
    While {
        condition: Expr,
        body: Vec<Located<Statement>>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    Number(u32),
    Text(String),
    Slot(Slot),
    Binary(Box<Expr>, BinOp, Box<Expr>),
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Equal,
    NotEqual,
    Less,
    LessOrEqual,
    Greater,
    GreaterOrEqual,
}

/// Índice de casilla `DING`, ya validado.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Slot(u8);

impl Slot {
    pub fn new(index: u32) -> Option<Self> {
        (index < SLOTS as u32).then(|| Slot(index as u8))
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl BinOp {
    pub fn is_comparison(self) -> bool {
        use BinOp::*;
        matches!(self, Equal | NotEqual | Less | LessOrEqual | Greater | GreaterOrEqual)
    }

    fn symbol(self) -> &'static str {
        use BinOp::*;

        match self {
            Add => "+",
            Sub => "-",
            Mul => "*",
            Div => "/",
            Mod => "MOD",
            Equal => "=",
            NotEqual => "!=",
            Less => "<",
            LessOrEqual => "<=",
            Greater => ">",
            GreaterOrEqual => ">=",
        }
    }
}

impl Display for Expr {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Number(number) => write!(fmt, "{}", number),
            Expr::Text(text) => write!(fmt, "{:?}", text),
            Expr::Slot(slot) => write!(fmt, "DING {}", slot.0),
            Expr::Binary(left, op, right) => write!(fmt, "{} {} {}", left, op.symbol(), right),
        }
    }
}

#[non_exhaustive]
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ParserError {
    #[error("Program must begin with ERWACHE")]
    MissingErwache,

    #[error("Expected {0}, found {1} instead")]
    UnexpectedToken(Token, Token),

    #[error("Unexpected token: {0}")]
    ExpectedStatement(Token),

    #[error("Expected slot number after {0}")]
    ExpectedSlot(Keyword),

    #[error("DING slot must be 0-7, got {0}")]
    SlotOutOfRange(u32),

    #[error("Expected expression, got: {0}")]
    ExpectedExpr(Token),

    #[error("Expected ENDE to close {0} block")]
    Unclosed(Keyword),

    #[error("Abrupt end of program")]
    UnexpectedEof,
}

/// Construye el árbol sintáctico a partir de un flujo de tokens.
pub fn parse(tokens: &[Located<Token>]) -> Result<Ast, Located<ParserError>> {
    let mut parser = Parser {
        tokens: tokens.iter().peekable(),
        last_line: 0,
    };

    parser.program()
}

struct Parser<'a> {
    tokens: Peekable<slice::Iter<'a, Located<Token>>>,
    last_line: u32,
}

type Parse<T> = Result<T, Located<ParserError>>;

impl<'a> Parser<'a> {
    fn program(&mut self) -> Parse<Ast> {
        self.skip_newlines();
        if self.peek() != Some(&Token::Keyword(Keyword::Erwache)) {
            return self.fail(ParserError::MissingErwache);
        }

        self.next()?;

        let mut statements = Vec::new();
        loop {
            self.skip_newlines();

            match self.peek() {
                None | Some(Token::Eof) => break,

                // Lo que sigue a un VERNEINUNG de nivel superior nunca se ejecuta
                Some(Token::Keyword(Keyword::Verneinung)) => {
                    statements.push(self.statement()?);
                    break;
                }

                _ => statements.push(self.statement()?),
            }
        }

        Ok(Ast(statements))
    }

    /// Sentencias hasta `ENDE`, `SONST` o después de `VERNEINUNG`.
    fn block(&mut self) -> Parse<Vec<Located<Statement>>> {
        let mut statements = Vec::new();

        loop {
            self.skip_newlines();

            match self.peek() {
                None
                | Some(Token::Eof)
                | Some(Token::Keyword(Keyword::Ende))
                | Some(Token::Keyword(Keyword::Sonst)) => break Ok(statements),

                _ => {
                    let statement = self.statement()?;
                    let halts = statement.val() == &Statement::Halt;

                    statements.push(statement);
                    if halts {
                        break Ok(statements);
                    }
                }
            }
        }
    }

    fn statement(&mut self) -> Parse<Located<Statement>> {
        let (line, token) = self.next()?.split();

        let statement = match token {
            Token::Keyword(Keyword::Verneinung) => Statement::Halt,

            Token::Keyword(Keyword::Ding) => {
                let slot = self.slot(Keyword::Ding)?;
                self.expect(Token::Equal)?;
                let value = self.expr()?;

                Statement::Assign { slot, value }
            }

            Token::Keyword(Keyword::Vorstellung) => Statement::Output(self.expr()?),
            Token::Keyword(Keyword::Wille) => Statement::Input(self.slot(Keyword::Wille)?),

            Token::Keyword(Keyword::Wenn) => {
                let condition = self.expr()?;
                self.keyword(Keyword::Dann)?;

                let body = self.block()?;

                self.skip_newlines();
                let otherwise = if self.peek() == Some(&Token::Keyword(Keyword::Sonst)) {
                    self.next()?;
                    self.block()?
                } else {
                    Vec::new()
                };

                self.close(Keyword::Wenn)?;
                Statement::If {
                    condition,
                    body,
                    otherwise,
                }
            }

            Token::Keyword(Keyword::Solange) => {
                let condition = self.expr()?;
                let body = self.block()?;

                self.close(Keyword::Solange)?;
                Statement::While { condition, body }
            }

            token => return Err(Located::at(ParserError::ExpectedStatement(token), line)),
        };

        Ok(Located::at(statement, line))
    }

    fn slot(&mut self, after: Keyword) -> Parse<Slot> {
        match self.peek() {
            Some(&Token::Number(index)) => {
                let (line, _) = self.next()?.split();
                Slot::new(index).ok_or_else(|| Located::at(ParserError::SlotOutOfRange(index), line))
            }

            _ => self.fail(ParserError::ExpectedSlot(after)),
        }
    }

    fn expr(&mut self) -> Parse<Expr> {
        self.comparison()
    }

    fn comparison(&mut self) -> Parse<Expr> {
        self.binary(Self::additive, |token| match token {
            Token::Equal => Some(BinOp::Equal),
            Token::NotEqual => Some(BinOp::NotEqual),
            Token::Greater => Some(BinOp::Greater),
            Token::Less => Some(BinOp::Less),
            Token::GreaterOrEqual => Some(BinOp::GreaterOrEqual),
            Token::LessOrEqual => Some(BinOp::LessOrEqual),
            _ => None,
        })
    }

    fn additive(&mut self) -> Parse<Expr> {
        self.binary(Self::multiplicative, |token| match token {
            Token::Plus => Some(BinOp::Add),
            Token::Minus => Some(BinOp::Sub),
            _ => None,
        })
    }

    fn multiplicative(&mut self) -> Parse<Expr> {
        self.binary(Self::primary, |token| match token {
            Token::Times => Some(BinOp::Mul),
            Token::Slash => Some(BinOp::Div),
            Token::Keyword(Keyword::Mod) => Some(BinOp::Mod),
            _ => None,
        })
    }

    /// Secuencia asociativa a la izquierda de operandos y operadores de
    /// un mismo nivel de precedencia.
    fn binary<F, O>(&mut self, mut operand: F, operator: O) -> Parse<Expr>
    where
        F: FnMut(&mut Self) -> Parse<Expr>,
        O: Fn(&Token) -> Option<BinOp>,
    {
        let mut left = operand(self)?;

        while let Some(op) = self.peek().and_then(&operator) {
            self.next()?;
            let right = operand(self)?;
            left = Expr::Binary(Box::new(left), op, Box::new(right));
        }

        Ok(left)
    }

    fn primary(&mut self) -> Parse<Expr> {
        match self.peek() {
            Some(&Token::Number(number)) => {
                self.next()?;
                Ok(Expr::Number(number))
            }

            Some(Token::Text(_)) => match self.next()?.into_inner() {
                Token::Text(text) => Ok(Expr::Text(text)),
                _ => self.fail(ParserError::UnexpectedEof),
            },

            Some(Token::Keyword(Keyword::Ding)) => {
                self.next()?;
                Ok(Expr::Slot(self.slot(Keyword::Ding)?))
            }

            Some(token) => self.fail(ParserError::ExpectedExpr(token.clone())),

            None => self.fail(ParserError::UnexpectedEof),
        }
    }

    fn close(&mut self, block: Keyword) -> Parse<()> {
        self.skip_newlines();
        match self.peek() {
            Some(Token::Keyword(Keyword::Ende)) => {
                self.next()?;
                Ok(())
            }

            _ => self.fail(ParserError::Unclosed(block)),
        }
    }

    fn skip_newlines(&mut self) {
        while self.peek() == Some(&Token::Newline) {
            self.tokens.next();
        }
    }

    fn keyword(&mut self, keyword: Keyword) -> Parse<()> {
        self.expect(Token::Keyword(keyword))
    }

    fn expect(&mut self, token: Token) -> Parse<()> {
        match self.peek() {
            Some(found) if *found == token => {
                self.next()?;
                Ok(())
            }

            Some(found) => self.fail(ParserError::UnexpectedToken(token, found.clone())),

            None => self.fail(ParserError::UnexpectedEof),
        }
    }

    fn peek(&mut self) -> Option<&'a Token> {
        self.tokens.peek().map(|&token| token.val())
    }

    /// Consume un token. El token de fin de archivo nunca se consume.
    fn next(&mut self) -> Parse<Located<Token>> {
        let token = match self.tokens.peek() {
            Some(&token) => token,
            None => return self.fail(ParserError::UnexpectedEof),
        };

        self.last_line = token.line();
        if *token.val() == Token::Eof {
            return Err(token.clone().map(ParserError::ExpectedStatement));
        }

        self.tokens.next();
        Ok(token.clone())
    }

    /// Falla en la línea del siguiente token, o la del último si ya no hay.
    fn fail<T>(&mut self, error: ParserError) -> Parse<T> {
        let line = self
            .tokens
            .peek()
            .map(|token| token.line())
            .unwrap_or(self.last_line);

        Err(Located::at(error, line))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lex::Lexer;

    fn parse_str(source: &str) -> Result<Ast, Located<ParserError>> {
        let tokens = Lexer::new(source).try_exhaustive().unwrap();
        parse(&tokens)
    }

    #[test]
    fn precedence_and_associativity() {
        let Ast(statements) = parse_str("ERWACHE\nVORSTELLUNG 1 + 2 * 3 - 4 > 0").unwrap();

        assert_eq!(
            statements[0].val(),
            &Statement::Output(Expr::Binary(
                Box::new(Expr::Binary(
                    Box::new(Expr::Binary(
                        Box::new(Expr::Number(1)),
                        BinOp::Add,
                        Box::new(Expr::Binary(
                            Box::new(Expr::Number(2)),
                            BinOp::Mul,
                            Box::new(Expr::Number(3)),
                        )),
                    )),
                    BinOp::Sub,
                    Box::new(Expr::Number(4)),
                )),
                BinOp::Greater,
                Box::new(Expr::Number(0)),
            ))
        );
    }

    #[test]
    fn expr_display_is_flat() {
        let Ast(statements) = parse_str("ERWACHE\nDING 0 = DING 1 MOD 3 + \"x\"").unwrap();

        match statements[0].val() {
            Statement::Assign { value, .. } => assert_eq!(value.to_string(), "DING 1 MOD 3 + \"x\""),
            other => panic!("unexpected statement: {:?}", other),
        }
    }

    #[test]
    fn missing_expression_is_reported_at_its_line() {
        let error = parse_str("ERWACHE\n\nVORSTELLUNG").unwrap_err();
        assert_eq!(error.split(), (3, ParserError::ExpectedExpr(Token::Newline)));
    }
}
