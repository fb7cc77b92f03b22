//! Errores de ejecución y de ensamblado.

use std::io;
use thiserror::Error;

/// Falla fatal durante la ejecución de un programa.
///
/// Ambos intérpretes (el de WELT y la máquina de GRUND) comparten esta
/// taxonomía. Toda falla termina la ejecución de inmediato; las salidas
/// ya emitidas se conservan, pero la memoria final no es válida.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum Fault {
    /// Error de E/S originado por la consola al solicitar entrada.
    #[error("Input error")]
    Input(#[from] io::Error),

    /// Se excedió el límite de iteraciones de un ciclo o de pasos de máquina.
    #[error("SYSTEM OVERHEAT: Exceeded maximum of {0} iterations")]
    Overheat(u32),

    #[error("DIVISION BY ZERO: CRT flickering")]
    DivisionByZero,

    #[error("MODULO BY ZERO: Faint smell of smoke")]
    ModuloByZero,

    /// Un valor de texto no numérico se usó como número.
    #[error("Cannot use {0:?} as a number -- DING contains non-numeric data")]
    NotANumber(String),

    #[error("Ring buffer underflow: nothing to pop")]
    RingUnderflow,

    #[error("Undefined label: {0}")]
    UndefinedLabel(String),

    #[error("Undefined data reference: {0}")]
    UndefinedData(String),

    #[error("Missing operand at position {0}")]
    MissingOperand(usize),

    #[error("Expected register operand at position {0}")]
    ExpectedRegister(usize),

    #[error("Cannot use label as value: {0}")]
    LabelAsValue(String),

    #[error("Jump requires a label operand")]
    ExpectedLabel,
}

/// Error de análisis de un listado GRUND.
#[non_exhaustive]
#[derive(Error, Debug, PartialEq, Eq)]
pub enum AsmError {
    #[error("Invalid data entry: {0}")]
    InvalidDataEntry(String),

    #[error("Unknown opcode: {0}")]
    UnknownOpcode(String),

    #[error("Invalid operand: {0}")]
    InvalidOperand(String),

    #[error("Register out of range: {0}")]
    RegisterOutOfRange(String),

    #[error("Undefined data reference: {0}")]
    UndefinedData(String),
}
