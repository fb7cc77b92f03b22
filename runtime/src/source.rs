//! Rastreo de líneas originales en código fuente.
//!
//! Tanto los tokens de WELT como las instrucciones de GRUND recuerdan
//! la línea de la que provienen, lo cual permite señalar el punto
//! exacto en donde ocurre un error. La línea `0` se reserva para
//! errores que no pueden atribuirse a ninguna línea en particular.

use std::fmt::{self, Display};

/// Un objeto cualquiera con una línea original asociada.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Located<T> {
    line: u32,
    value: T,
}

impl<T> Located<T> {
    /// Obtiene el valor.
    pub fn val(&self) -> &T {
        &self.value
    }

    /// Obtiene la línea, comenzando desde 1.
    pub fn line(&self) -> u32 {
        self.line
    }

    /// Descarta la línea y toma ownership del valor.
    pub fn into_inner(self) -> T {
        self.value
    }

    /// Descompone y toma ownership de las dos partes.
    pub fn split(self) -> (u32, T) {
        (self.line, self.value)
    }

    /// Construye a partir de un valor y una línea.
    pub fn at(value: T, line: u32) -> Self {
        Located { value, line }
    }

    /// Construye un valor sin línea atribuible.
    pub fn nowhere(value: T) -> Self {
        Located::at(value, 0)
    }

    /// Transforma el valor con la misma línea.
    pub fn map<U, F>(self, map: F) -> Located<U>
    where
        F: FnOnce(T) -> U,
    {
        Located {
            value: map(self.value),
            line: self.line,
        }
    }
}

impl<T> AsRef<T> for Located<T> {
    fn as_ref(&self) -> &T {
        &self.value
    }
}

impl<T: Display> Display for Located<T> {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.value.fmt(fmt)
    }
}

/// Elimina un comentario de línea (`;`) que no se encuentre dentro de
/// un literal de string.
///
/// Las comillas escapadas dentro de un string no lo terminan.
pub fn strip_comment(line: &str) -> &str {
    let mut in_string = false;
    let mut escaped = false;

    for (index, c) in line.char_indices() {
        match c {
            _ if escaped => escaped = false,
            '\\' if in_string => escaped = true,
            '"' => in_string = !in_string,
            ';' if !in_string => return &line[..index],
            _ => (),
        }
    }

    line
}
