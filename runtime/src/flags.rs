//! Banderas de condición y unidad aritmética.
//!
//! El acarreo es global a toda la ejecución: toda operación aritmética lo
//! consume (sumando 1 a su resultado si está activo) y lo vuelve a fijar
//! según su propio desbordamiento. Las comparaciones y la concatenación de
//! texto no lo tocan.

use crate::{
    error::Fault,
    value::{wrap, WORD_SIZE},
};

use bitflags::bitflags;

bitflags! {
    /// Banderas de la máquina.
    pub struct Flags: u8 {
        /// Desbordamiento de la última operación aritmética.
        const CARRY = 0x01;

        /// Resultado de `pav`: ambos operandos son iguales.
        const EQUAL = 0x02;

        /// Resultado de `pav`: el primer operando es mayor.
        const GREATER = 0x04;
    }
}

/// Operación aritmética binaria.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ArithOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
}

impl Flags {
    /// Evalúa una operación aritmética con acarreo de entrada y de salida.
    ///
    /// La división es entera con redondeo hacia abajo; el módulo conserva
    /// el signo del dividendo.
    pub fn arith(&mut self, op: ArithOp, left: i128, right: i128) -> Result<u8, Fault> {
        let mut raw = match op {
            ArithOp::Add => left + right,
            ArithOp::Sub => left - right,
            ArithOp::Mul => left * right,

            ArithOp::Div if right == 0 => return Err(Fault::DivisionByZero),
            ArithOp::Div => floor_div(left, right),

            ArithOp::Mod if right == 0 => return Err(Fault::ModuloByZero),
            ArithOp::Mod => left % right,
        };

        if self.contains(Flags::CARRY) {
            raw += 1;
        }

        self.set(Flags::CARRY, raw >= WORD_SIZE || raw < 0);
        Ok(wrap(raw))
    }

    /// Fija las banderas de comparación.
    pub fn compare(&mut self, equal: bool, greater: bool) {
        self.set(Flags::EQUAL, equal);
        self.set(Flags::GREATER, greater);
    }

    pub fn carry(&self) -> bool {
        self.contains(Flags::CARRY)
    }
}

fn floor_div(left: i128, right: i128) -> i128 {
    let quotient = left / right;
    if left % right != 0 && (left < 0) != (right < 0) {
        quotient - 1
    } else {
        quotient
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overflow_sets_carry_and_wraps() {
        let mut flags = Flags::empty();
        assert_eq!(flags.arith(ArithOp::Add, 255, 1).unwrap(), 0);
        assert!(flags.carry());
    }

    #[test]
    fn carry_biases_next_operation_then_clears() {
        let mut flags = Flags::CARRY;
        assert_eq!(flags.arith(ArithOp::Add, 3, 4).unwrap(), 8);
        assert!(!flags.carry());
    }

    #[test]
    fn negative_result_wraps_and_carries() {
        let mut flags = Flags::empty();
        assert_eq!(flags.arith(ArithOp::Sub, 5, 10).unwrap(), 251);
        assert!(flags.carry());
    }

    #[test]
    fn division_and_modulo() {
        let mut flags = Flags::empty();
        assert_eq!(flags.arith(ArithOp::Div, 7, 2).unwrap(), 3);
        assert_eq!(flags.arith(ArithOp::Mod, 17, 5).unwrap(), 2);
        assert_eq!(floor_div(-7, 2), -4);
    }

    #[test]
    fn zero_divisors_are_distinct_faults() {
        let mut flags = Flags::empty();
        assert!(matches!(flags.arith(ArithOp::Div, 1, 0), Err(Fault::DivisionByZero)));
        assert!(matches!(flags.arith(ArithOp::Mod, 1, 0), Err(Fault::ModuloByZero)));
    }

    #[test]
    fn compare_leaves_carry_alone() {
        let mut flags = Flags::CARRY;
        flags.compare(true, false);
        assert!(flags.carry());
        assert!(flags.contains(Flags::EQUAL));
        assert!(!flags.contains(Flags::GREATER));
    }
}
