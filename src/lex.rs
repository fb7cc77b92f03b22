//! Análisis léxico.
//!
//! # Tokenización
//! Esta es la primera fase del intérprete. Descompone el código fuente,
//! línea por línea, en unidades léxicas denominadas tokens. Los espacios
//! en blanco y los comentarios se descartan durante esta operación. Cada
//! token emitido está asociado a la línea donde ocurre, lo cual permite
//! rastrear errores de fases posteriores.
//!
//! # Reglas importantes del lenguaje
//! - Los comentarios inician con `;` y terminan con la línea, excepto
//!   cuando `;` aparece dentro de un string.
//! - El lenguaje es case-insensitive en cuanto a palabras clave, por lo
//!   cual `SOLANGE`, `solange` y `SoLaNgE` resultan en [`Keyword::Solange`].
//! - No existen identificadores. Una palabra que no es palabra clave es
//!   un literal de texto, tal y como si estuviera entre comillas.
//! - Los strings no pueden extenderse más allá de una línea.
//! - Las líneas con al menos un token terminan en [`Token::Newline`].
//!
//! # Errores
//! El lexer es capaz de recuperarse de condiciones de error al descartar
//! el resto de la línea donde ocurren. Esto permite reportar más de un
//! error por ejecución, pero no el avance a las demás fases.

use crate::source::Located;
use std::{
    fmt::{self, Display},
    iter::{Enumerate, Peekable},
    str::{Chars, FromStr, Split},
};

use thiserror::Error;

// Case-insensitive
pub use unicase::Ascii as NoCase;

/// Literal entero máximo.
const INT_MAX: u32 = u32::MAX;

/// Error de escaneo.
#[non_exhaustive]
#[derive(Error, Debug, PartialEq, Eq)]
pub enum LexerError {
    /// Carácter desconocido o inesperado en el flujo de entrada.
    #[error("Unexpected character: {0:?}")]
    BadChar(char),

    /// La línea terminó antes de cerrar un string.
    #[error("Unterminated string")]
    UnterminatedString,

    /// Una constante entera se encuentra fuera de rango.
    #[error("Integer literal overflow, valid range is [0, {INT_MAX}]")]
    IntOverflow,
}

/// Objeto resultante del análisis léxico.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// Palabra clave.
    Keyword(Keyword),

    /// Literal de entero.
    Number(u32),

    /// Literal de texto, con o sin comillas.
    Text(String),

    /// `=`
    Equal,

    /// `!=`
    NotEqual,

    /// `>`
    Greater,

    /// `<`
    Less,

    /// `>=`
    GreaterOrEqual,

    /// `<=`
    LessOrEqual,

    /// `+`
    Plus,

    /// `-`
    Minus,

    /// `*`
    Times,

    /// `/`
    Slash,

    /// Fin de una línea no vacía.
    Newline,

    /// Fin del código fuente.
    Eof,
}

impl Display for Token {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        use Token::*;

        match self {
            Keyword(keyword) => write!(fmt, "keyword `{}`", keyword),
            Number(integer) => write!(fmt, "literal `{}`", integer),
            Text(text) => write!(fmt, "text {:?}", text),
            Equal => fmt.write_str("`=`"),
            NotEqual => fmt.write_str("`!=`"),
            Greater => fmt.write_str("`>`"),
            Less => fmt.write_str("`<`"),
            GreaterOrEqual => fmt.write_str("`>=`"),
            LessOrEqual => fmt.write_str("`<=`"),
            Plus => fmt.write_str("`+`"),
            Minus => fmt.write_str("`-`"),
            Times => fmt.write_str("`*`"),
            Slash => fmt.write_str("`/`"),
            Newline => fmt.write_str("end of line"),
            Eof => fmt.write_str("end of file"),
        }
    }
}

/// Una palabra clave.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Keyword {
    Erwache,
    Verneinung,
    Ding,
    Vorstellung,
    Wille,
    Wenn,
    Dann,
    Sonst,
    Solange,
    Ende,
    Mod,
}

const KEYWORDS: &[(NoCase<&str>, Keyword)] = &[
    (NoCase::new("ERWACHE"),     Keyword::Erwache),
    (NoCase::new("VERNEINUNG"),  Keyword::Verneinung),
    (NoCase::new("DING"),        Keyword::Ding),
    (NoCase::new("VORSTELLUNG"), Keyword::Vorstellung),
    (NoCase::new("WILLE"),       Keyword::Wille),
    (NoCase::new("WENN"),        Keyword::Wenn),
    (NoCase::new("DANN"),        Keyword::Dann),
    (NoCase::new("SONST"),       Keyword::Sonst),
    (NoCase::new("SOLANGE"),     Keyword::Solange),
    (NoCase::new("ENDE"),        Keyword::Ende),
    (NoCase::new("MOD"),         Keyword::Mod),
];

impl Display for Keyword {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (name, _) = KEYWORDS
            .iter()
            .find(|(_, keyword)| keyword == self)
            .ok_or(fmt::Error)?;

        fmt.pad(name)
    }
}

impl FromStr for Keyword {
    type Err = ();

    fn from_str(string: &str) -> Result<Self, Self::Err> {
        KEYWORDS
            .iter()
            .find(|&&(name, _)| name == NoCase::new(string))
            .map(|&(_, keyword)| keyword)
            .ok_or(())
    }
}

/// Máquina de estados para análisis léxico.
///
/// Un lexer puede encontrarse en uno de diversos estados. La
/// salida del lexer, así como su siguiente estado, se define
/// a partir de tanto su estado actual como el siguiente carácter
/// encontrado en la línea actual. El fin de una línea se trata
/// como un carácter más.
pub struct Lexer<'a> {
    lines: Enumerate<Split<'a, char>>,
    line: Peekable<Chars<'a>>,
    line_number: u32,
    line_has_tokens: bool,
    state: State,
}

/// Posibles estados del lexer.
enum State {
    /// Estado que ocurre antes de encontrar el inicio de un token.
    Start,

    /// Estado de error. Se descarta el resto de la línea.
    Error,

    /// Estado de completitud; siempre emite el token incluido y
    /// pasa a [`State::Start`].
    Complete(Token),

    /// Comentario de línea.
    Comment,

    /// Se encontró `!`, debe seguir `=`.
    Bang,

    /// Se encontró `>`, puede seguir `=`.
    RightAngle,

    /// Se encontró `<`, puede seguir `=`.
    LeftAngle,

    /// Constante entera.
    ///
    /// Este estado incluirá dígitos en el token mientras que
    /// el siguiente carácter sea un dígito.
    Integer(u32),

    /// Término que puede ser una palabra clave o un texto sin comillas.
    Word(String),

    /// Literal de texto entre comillas.
    Str { text: String, escape: bool },

    /// Ya se emitió [`Token::Eof`].
    Done,
}

impl<'a> Lexer<'a> {
    /// Crea un lexer en estado inicial a partir de un código fuente.
    pub fn new(source: &'a str) -> Self {
        Lexer {
            lines: source.split('\n').enumerate(),
            line: "".chars().peekable(),
            line_number: 0,
            line_has_tokens: false,
            state: State::Start,
        }
    }

    /// Reduce la entrada a sea una secuencia conocida de tokens
    /// infalibles o una secuencia de errores.
    ///
    /// En caso de que ocurra al menos un error, el lexer dejará
    /// de buscar tokens exitosos y comenzará a acumular solamente
    /// errores.
    pub fn try_exhaustive(mut self) -> Result<Vec<Located<Token>>, Vec<Located<LexerError>>> {
        let mut tokens = Vec::new();

        while let Some(result) = self.next() {
            match result {
                Ok(token) => tokens.push(token),
                Err(error) => {
                    drop(tokens);

                    let mut errors = vec![error];
                    errors.extend(self.filter_map(Result::err));

                    return Err(errors);
                }
            }
        }

        Ok(tokens)
    }

    /// Intenta construir un siguiente token.
    fn lex(&mut self) -> Result<Option<Token>, LexerError> {
        use State::*;

        loop {
            let next_char = self.line.peek().copied();

            // Switch table principal, determina cambios de estado
            // y de salida del lexer a partir de combinaciones del
            // estado actual y el siguiente carácter
            match (&mut self.state, next_char) {
                (Done, _) => return Ok(None),

                // Condiciones de error: se descarta la línea donde
                // ocurrió el error. Al llegar al final de la línea
                // el lexer se recupera y reinicia.
                (Error, None) => self.state = Start,
                (Error, Some(_)) => (),

                // Fin de línea: se cierra la línea actual con un
                // `Newline` si hubo tokens y se avanza a la siguiente
                (Start, None) if self.line_has_tokens => {
                    self.line_has_tokens = false;
                    return Ok(Some(Token::Newline));
                }

                (Start, None) => match self.lines.next() {
                    Some((index, line)) => {
                        self.line = line.strip_suffix('\r').unwrap_or(line).chars().peekable();
                        self.line_number = index as u32 + 1;
                        continue;
                    }

                    None => {
                        self.state = Done;
                        return Ok(Some(Token::Eof));
                    }
                },

                // Tokens triviales
                (Start, Some('=')) => self.state = Complete(Token::Equal),
                (Start, Some('+')) => self.state = Complete(Token::Plus),
                (Start, Some('-')) => self.state = Complete(Token::Minus),
                (Start, Some('*')) => self.state = Complete(Token::Times),
                (Start, Some('/')) => self.state = Complete(Token::Slash),
                (Start, Some('!')) => self.state = Bang,
                (Start, Some('>')) => self.state = RightAngle,
                (Start, Some('<')) => self.state = LeftAngle,
                (Start, Some(';')) => self.state = Comment,

                (Start, Some('"')) => {
                    self.state = Str {
                        text: String::new(),
                        escape: false,
                    }
                }

                // Palabras clave y textos sin comillas
                (Start, Some(c)) if c.is_ascii_alphabetic() || c == '_' => {
                    self.state = Word(c.to_string())
                }

                // Inicio de una constante numérica. No se consume
                // el dígito, ya que esta lógica ya está implementada
                // en el respectivo caso para un estado de constante
                // entera. Por tanto, la constante es inicialmente cero.
                (Start, Some(c)) if c.is_ascii_digit() => {
                    self.state = Integer(0);
                    continue;
                }

                // Espacios en blanco y caracteres inesperados
                (Start, Some(c)) if c.is_ascii_whitespace() => (),
                (Start, Some(c)) => {
                    self.line.next();
                    return Err(LexerError::BadChar(c));
                }

                // Emisión retardada de tokens cualesquiera
                (Complete(token), _) => {
                    let token = std::mem::replace(token, Token::Eof);
                    self.state = Start;
                    return Ok(Some(token));
                }

                // Los comentarios descartan el resto de la línea
                (Comment, Some(_)) => (),
                (Comment, None) => self.state = Start,

                // Operadores de dos caracteres
                (Bang, Some('=')) => self.state = Complete(Token::NotEqual),
                (Bang, _) => return Err(LexerError::BadChar('!')),
                (RightAngle, Some('=')) => self.state = Complete(Token::GreaterOrEqual),
                (RightAngle, _) => return self.emit(Token::Greater),
                (LeftAngle, Some('=')) => self.state = Complete(Token::LessOrEqual),
                (LeftAngle, _) => return self.emit(Token::Less),

                // Acumulación dígito por dígito de constantes enteras
                (Integer(accumulated), Some(digit)) if digit.is_ascii_digit() => {
                    let digit = digit as u32 - '0' as u32;

                    match accumulated
                        .checked_mul(10)
                        .and_then(|n| n.checked_add(digit))
                    {
                        Some(result) => *accumulated = result,
                        None => return Err(LexerError::IntOverflow),
                    }
                }

                // Si sigue algo que no es un dígito, la constante ha terminado
                (Integer(integer), _) => {
                    let integer = *integer;
                    return self.emit(Token::Number(integer));
                }

                // Extensión de términos
                (Word(word), Some(c)) if c.is_ascii_alphanumeric() || c == '_' => word.push(c),

                // Si sigue algo que no puede formar parte del término, ha terminado
                (Word(word), _) => {
                    let token = match Keyword::from_str(word) {
                        Ok(keyword) => Token::Keyword(keyword),
                        Err(()) => Token::Text(std::mem::take(word)),
                    };

                    return self.emit(token);
                }

                // Strings, con secuencias de escape
                (Str { .. }, None) => return Err(LexerError::UnterminatedString),

                (Str { text, escape }, Some(c)) if *escape => {
                    text.push(match c {
                        'n' => '\n',
                        't' => '\t',
                        c => c,
                    });

                    *escape = false;
                }

                (Str { escape, .. }, Some('\\')) => *escape = true,
                (Str { text, .. }, Some('"')) => self.state = Complete(Token::Text(std::mem::take(text))),
                (Str { text, .. }, Some(c)) => text.push(c),
            }

            // Si no hubo `continue` ni retorno, aquí se consume el
            // carácter que se observó con lookahead anteriormente
            self.line.next();
        }
    }

    /// Emite un token sin consumir el carácter actual.
    fn emit(&mut self, token: Token) -> Result<Option<Token>, LexerError> {
        self.state = State::Start;
        Ok(Some(token))
    }
}

impl Iterator for Lexer<'_> {
    type Item = Result<Located<Token>, Located<LexerError>>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.lex() {
            Ok(None) => None,
            Ok(Some(token)) => {
                if !matches!(token, Token::Newline | Token::Eof) {
                    self.line_has_tokens = true;
                }

                Some(Ok(Located::at(token, self.line_number)))
            }

            Err(error) => {
                self.state = State::Error;
                self.line_has_tokens = false;

                Some(Err(Located::at(error, self.line_number)))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(source: &str) -> Vec<Token> {
        Lexer::new(source)
            .try_exhaustive()
            .unwrap()
            .into_iter()
            .map(Located::into_inner)
            .collect()
    }

    #[test]
    fn two_char_operators_win() {
        use Token::*;

        assert_eq!(
            tokens("!= >= <= = > <"),
            [NotEqual, GreaterOrEqual, LessOrEqual, Equal, Greater, Less, Newline, Eof]
        );
    }

    #[test]
    fn keywords_ignore_case_and_words_become_text() {
        assert_eq!(
            tokens("solange Hallo mod"),
            [
                Token::Keyword(Keyword::Solange),
                Token::Text("Hallo".into()),
                Token::Keyword(Keyword::Mod),
                Token::Newline,
                Token::Eof,
            ]
        );
    }

    #[test]
    fn escapes_in_strings() {
        assert_eq!(
            tokens(r#""a\tb\n\"c\"\\ \q""#)[0],
            Token::Text("a\tb\n\"c\"\\ q".into())
        );
    }

    #[test]
    fn comment_marker_inside_string_is_text() {
        assert_eq!(
            tokens("\"hello; world\" ; gone"),
            [Token::Text("hello; world".into()), Token::Newline, Token::Eof]
        );
    }

    #[test]
    fn blank_and_comment_lines_have_no_newline() {
        let located = Lexer::new("; nada\n\n42\n").try_exhaustive().unwrap();
        let lines: Vec<_> = located.iter().map(Located::line).collect();

        assert_eq!(lines, [3, 3, 4]);
        assert_eq!(located[0].val(), &Token::Number(42));
        assert_eq!(located[2].val(), &Token::Eof);
    }

    #[test]
    fn errors_are_collected_per_line() {
        let errors = Lexer::new("\"open\n42 ?\n99999999999").try_exhaustive().unwrap_err();
        let errors: Vec<_> = errors.into_iter().map(Located::split).collect();

        assert_eq!(
            errors,
            [
                (1, LexerError::UnterminatedString),
                (2, LexerError::BadChar('?')),
                (3, LexerError::IntOverflow),
            ]
        );
    }

    #[test]
    fn lone_bang_is_rejected() {
        let errors = Lexer::new("1 ! 2").try_exhaustive().unwrap_err();
        assert_eq!(errors[0].val(), &LexerError::BadChar('!'));
    }
}
