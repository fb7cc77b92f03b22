//! Registros de trabajo.
//!
//! Un operando que ya vive en una casilla se usa en su propio registro.
//! Todo lo demás se calcula en [`SCRATCH`] (operando izquierdo) o en
//! [`SCRATCH2`] (operando derecho). Calcular un operando derecho compuesto
//! destruye `r7`, por lo cual un izquierdo que vive ahí se preserva en el
//! ring mientras tanto.

use super::Context;
use crate::parse::Expr;
use runtime::asm::{Opcode::*, Reg};
use std::io;

/// Registro de trabajo principal.
pub const SCRATCH: Reg = Reg(7);

/// Registro de trabajo secundario.
pub const SCRATCH2: Reg = Reg(6);

impl Context {
    /// Ubica un operando en un registro, calculándolo en `target` si no
    /// es una casilla.
    pub(super) fn operand(&mut self, expr: &Expr, target: Reg) -> io::Result<Reg> {
        match expr {
            Expr::Slot(slot) => Ok(super::reg(*slot)),
            _ => {
                self.expr(expr, target)?;
                Ok(target)
            }
        }
    }

    pub(super) fn operands(&mut self, left: &Expr, right: &Expr) -> io::Result<(Reg, Reg)> {
        let left = self.operand(left, SCRATCH)?;

        let spill = left == SCRATCH && matches!(right, Expr::Binary(..));
        if spill {
            emit!(self, Tin, "{}", SCRATCH)?;
        }

        let right = self.operand(right, SCRATCH2)?;
        if spill {
            emit!(self, Tab, "{}", SCRATCH)?;
        }

        Ok((left, right))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::Slot;

    fn listing(context: Context) -> Vec<String> {
        String::from_utf8(context.code)
            .unwrap()
            .lines()
            .map(|line| line.trim().to_owned())
            .collect()
    }

    #[test]
    fn slot_operands_stay_in_their_registers() {
        let mut context = Context::default();
        let regs = context
            .operands(&Expr::Slot(Slot::new(2).unwrap()), &Expr::Number(5))
            .unwrap();

        assert_eq!(regs, (Reg(2), SCRATCH2));
        assert_eq!(listing(context), ["tar  r6, 5"]);
    }

    #[test]
    fn compound_right_operand_preserves_left() {
        use crate::parse::BinOp;

        let mut context = Context::default();
        let left = Expr::Number(8);
        let right = Expr::Binary(Box::new(Expr::Number(2)), BinOp::Mul, Box::new(Expr::Number(3)));

        let regs = context.operands(&left, &right).unwrap();
        assert_eq!(regs, (SCRATCH, SCRATCH2));

        assert_eq!(
            listing(context),
            [
                "tar  r7, 8",
                "tin  r7",
                "tar  r7, 2",
                "tar  r6, 3",
                "mur  r6, r7, r6",
                "tab  r7",
            ]
        );
    }
}
