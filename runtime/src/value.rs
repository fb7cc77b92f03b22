//! Valores de la máquina y memoria de 8 casillas.
//!
//! Cada casilla (o registro) contiene un byte sin signo o un texto.
//! Los valores numéricos siempre se guardan ya reducidos al rango
//! `[0, 255]`; los textos nunca se reducen.

use crate::error::Fault;
use std::fmt::{self, Display};

/// Tamaño de la palabra de máquina.
pub const WORD_SIZE: i128 = 256;

/// Cantidad de casillas `DING` o registros `rN`.
pub const SLOTS: usize = 8;

/// Contenido de una casilla de memoria.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Value {
    Number(u8),
    Text(String),
}

/// Memoria completa, tanto de WELT como de GRUND.
pub type Memory = [Value; SLOTS];

/// Residuo de POST del arranque: así encuentra la memoria todo programa
/// cuando no se le da otra.
pub fn default_memory() -> Memory {
    [0, 0, 0, 4, 0, 0, 0, 97].map(Value::Number)
}

/// Construye una memoria a partir de una secuencia arbitraria de valores.
///
/// Las casillas faltantes se llenan con `0` y las sobrantes se descartan.
pub fn memory_from<I>(values: I) -> Memory
where
    I: IntoIterator<Item = Value>,
{
    let mut memory: Memory = Default::default();
    for (slot, value) in memory.iter_mut().zip(values) {
        *slot = value;
    }

    memory
}

/// Reduce un entero cualquiera a un byte, con aritmética modular.
pub fn wrap(value: i128) -> u8 {
    value.rem_euclid(WORD_SIZE) as u8
}

impl Value {
    /// Construye un valor numérico ya reducido.
    pub fn number(value: i128) -> Self {
        Value::Number(wrap(value))
    }

    /// Interpreta una línea de entrada del usuario.
    ///
    /// Si el texto es un entero se guarda como número, si no como texto
    /// crudo. Una línea vacía es el número `0`.
    pub fn from_input(text: String) -> Self {
        match parse_number(&text) {
            Some(number) => Value::number(number),
            None => Value::Text(text),
        }
    }

    /// Valor numérico, si existe una interpretación numérica.
    pub fn as_number(&self) -> Option<i128> {
        match self {
            Value::Number(number) => Some(*number as i128),
            Value::Text(text) => parse_number(text),
        }
    }

    /// Coerción estricta a número.
    pub fn to_number(&self) -> Result<i128, Fault> {
        self.as_number()
            .ok_or_else(|| Fault::NotANumber(self.to_string()))
    }

    pub fn is_text(&self) -> bool {
        matches!(self, Value::Text(_))
    }

    /// Un número es verdadero si no es cero, un texto si no es vacío.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Number(number) => *number != 0,
            Value::Text(text) => !text.is_empty(),
        }
    }

    /// Valor booleano como número `1` o `0`.
    pub fn truth(condition: bool) -> Self {
        Value::Number(condition as u8)
    }
}

fn parse_number(text: &str) -> Option<i128> {
    match text.trim() {
        "" => Some(0),
        digits => digits.parse::<i64>().ok().map(i128::from),
    }
}

impl Default for Value {
    fn default() -> Self {
        Value::Number(0)
    }
}

impl From<u8> for Value {
    fn from(number: u8) -> Self {
        Value::Number(number)
    }
}

impl From<&str> for Value {
    fn from(text: &str) -> Self {
        Value::Text(text.to_owned())
    }
}

impl From<String> for Value {
    fn from(text: String) -> Self {
        Value::Text(text)
    }
}

impl Display for Value {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(number) => number.fmt(fmt),
            Value::Text(text) => fmt.write_str(text),
        }
    }
}
