//! Errores del toolchain y su presentación.
//!
//! Cada fase define su propio tipo de error, siempre acompañado de la
//! línea donde ocurre. [`Error`] los unifica para la API de la
//! biblioteca, mientras que [`Diagnostics`] los presenta al usuario
//! junto con la línea de código fuente ofensora.

use crate::{lex::LexerError, parse::ParserError, source::Located};
use runtime::{AsmError, Fault};

use std::{
    error,
    fmt::{self, Display},
    io,
};

use thiserror::Error;

/// Falla de cualquier fase.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum Error {
    /// Uno o más errores léxicos. Nunca está vacío.
    #[error("{}", .0.first().map(ToString::to_string).unwrap_or_default())]
    Lexer(Vec<Located<LexerError>>),

    #[error("{0}")]
    Parser(Located<ParserError>),

    #[error("{0}")]
    Asm(Located<AsmError>),

    #[error("{0}")]
    Fault(Located<Fault>),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl Error {
    /// Línea del (primer) error, o `0` si no es atribuible.
    pub fn line(&self) -> u32 {
        match self {
            Error::Lexer(errors) => errors.first().map_or(0, Located::line),
            Error::Parser(error) => error.line(),
            Error::Asm(error) => error.line(),
            Error::Fault(error) => error.line(),
            Error::Io(_) => 0,
        }
    }
}

impl From<Vec<Located<LexerError>>> for Error {
    fn from(errors: Vec<Located<LexerError>>) -> Self {
        Error::Lexer(errors)
    }
}

impl From<Located<ParserError>> for Error {
    fn from(error: Located<ParserError>) -> Self {
        Error::Parser(error)
    }
}

impl From<Located<AsmError>> for Error {
    fn from(error: Located<AsmError>) -> Self {
        Error::Asm(error)
    }
}

impl From<Located<Fault>> for Error {
    fn from(error: Located<Fault>) -> Self {
        Error::Fault(error)
    }
}

mod sealed {
    pub trait Sealed {}
}

pub trait LocatedError: sealed::Sealed {
    fn source(&self) -> &dyn error::Error;
    fn line(&self) -> u32;
}

/// Reporte de errores al estilo de `rustc`.
pub struct Diagnostics {
    kind: &'static str,
    origin: Option<(String, String)>,
    errors: Vec<Box<dyn 'static + LocatedError>>,
}

impl Diagnostics {
    pub fn kind(self, kind: &'static str) -> Self {
        Diagnostics { kind, ..self }
    }

    /// Asocia el nombre y contenido del archivo, para citar líneas.
    pub fn origin(self, name: &str, text: &str) -> Self {
        Diagnostics {
            origin: Some((name.to_owned(), text.to_owned())),
            ..self
        }
    }
}

impl Default for Diagnostics {
    fn default() -> Self {
        Diagnostics {
            kind: "error",
            origin: None,
            errors: Default::default(),
        }
    }
}

impl<E: 'static + LocatedError> From<E> for Diagnostics {
    fn from(error: E) -> Self {
        Diagnostics {
            errors: vec![Box::new(error)],
            ..Default::default()
        }
    }
}

impl<E: 'static + LocatedError> From<Vec<E>> for Diagnostics {
    fn from(errors: Vec<E>) -> Self {
        let errors = errors
            .into_iter()
            .map(|error| {
                let error: Box<dyn LocatedError> = Box::new(error);
                error
            })
            .collect();

        Diagnostics {
            errors,
            ..Default::default()
        }
    }
}

impl From<Error> for Diagnostics {
    fn from(error: Error) -> Self {
        match error {
            Error::Lexer(errors) => Diagnostics::from(errors).kind("Lexical error"),
            Error::Parser(error) => Diagnostics::from(error).kind("Syntax error"),
            Error::Asm(error) => Diagnostics::from(error).kind("Assembly error"),
            Error::Fault(error) => Diagnostics::from(error).kind("Runtime error"),
            Error::Io(error) => Diagnostics::from(Located::nowhere(error)).kind("I/O error"),
        }
    }
}

impl Display for Diagnostics {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Diagnostics {
            kind,
            origin,
            errors,
        } = self;

        if errors.is_empty() {
            return writeln!(fmt, "No errors were reported");
        }

        for error in errors {
            writeln!(fmt, "{}: {}", kind, error.source())?;

            let line_number = error.line();
            let quoted = origin.as_ref().and_then(|(name, text)| {
                let line = text.lines().nth(line_number.checked_sub(1)? as usize)?;
                Some((name, line))
            });

            match quoted {
                Some((name, line)) => {
                    let digits = line_number.to_string().chars().count();

                    writeln!(fmt, " --> {}:{}", name, line_number)?;
                    writeln!(fmt, "{:digits$} |", "", digits = digits)?;
                    writeln!(fmt, "{} | {}", line_number, line)?;
                }

                None if line_number > 0 => writeln!(fmt, " --> line {}", line_number)?,
                None => (),
            }

            writeln!(fmt)?;
        }

        let error_or_errors = if errors.len() == 1 { "error" } else { "errors" };
        writeln!(fmt, "{} {} reported", errors.len(), error_or_errors)
    }
}

impl<E: error::Error> sealed::Sealed for Located<E> {}

impl<E: error::Error> LocatedError for Located<E> {
    fn source(&self) -> &dyn error::Error {
        self.as_ref()
    }

    fn line(&self) -> u32 {
        Located::line(self)
    }
}
