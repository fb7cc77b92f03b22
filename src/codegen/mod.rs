//! Generación de código GRUND.
//!
//! # Listado
//! El compilador traduce un [`Ast`] de WELT a un listado textual de
//! ensamblador DAS-8, listo para [`runtime::asm::parse`]. El listado
//! inicia con un bloque de comentarios, seguido de una sección `.data`
//! (solo si hay constantes de texto) y finalmente la sección `.code`.
//!
//! # Registros
//! Las casillas `DING n` se asignan directamente a los registros `rn`.
//! Los registros `r7` y `r6` se usan además como registros de trabajo
//! para operandos intermedios; ver [`regs`]. Cuando ambos están ocupados
//! se recurre al ring.
//!
//! # Saltos
//! No existen instrucciones de salto negado. Las condiciones de `WENN` y
//! `SOLANGE` saltan a la etiqueta de falso ya sea directamente o mediante
//! una etiqueta de escape que se salta un `rav` incondicional.

use crate::parse::{Ast, BinOp, Expr, Slot, Statement};
use crate::source::Located;

use log::debug;
use runtime::{
    asm::{self, Opcode::*, Reg},
    value::Value,
};

use std::{
    collections::HashMap,
    fmt::{self, Display},
    io::{self, Write},
};

mod regs;

use regs::SCRATCH;

/// Etiqueta local del listado, `.L<n>`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Label(u32);

impl Display for Label {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(fmt, ".L{}", self.0)
    }
}

/// Llave de una constante de texto en la sección `.data`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
struct DataKey(usize);

impl Display for DataKey {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(fmt, "s{}", self.0)
    }
}

/// Compila un programa y escribe el listado completo.
pub fn emit<W: Write>(ast: &Ast, name: Option<&str>, output: &mut W) -> io::Result<()> {
    let mut context = Context::default();

    let Ast(statements) = ast;
    context.block(statements)?;

    debug!(
        "Emitted {} labels and {} data entries",
        context.next_label,
        context.strings.len()
    );

    writeln!(output, "; === GRUND (DAS-8 Q4) ===")?;
    if let Some(name) = name {
        writeln!(output, "; source: {}", name)?;
    }

    writeln!(output, "; compiled by welt {}", env!("CARGO_PKG_VERSION"))?;
    writeln!(output)?;

    if !context.strings.is_empty() {
        writeln!(output, ".data")?;
        for (index, text) in context.strings.iter().enumerate() {
            writeln!(output, "  {}: \"{}\"", DataKey(index), asm::escape(text))?;
        }

        writeln!(output)?;
    }

    writeln!(output, ".code")?;
    output.write_all(&context.code)
}

#[derive(Default)]
struct Context {
    code: Vec<u8>,
    strings: Vec<String>,
    interned: HashMap<String, DataKey>,
    next_label: u32,
    comment: Option<String>,
}

impl Context {
    fn block(&mut self, statements: &[Located<Statement>]) -> io::Result<()> {
        for statement in statements {
            self.statement(statement.val())?;
        }

        Ok(())
    }

    fn statement(&mut self, statement: &Statement) -> io::Result<()> {
        match statement {
            Statement::Halt => {
                self.annotate("VERNEINUNG");
                emit!(self, Nov)
            }

            Statement::Assign { slot, value } => {
                self.annotate(format_args!("DING {} = {}", slot.index(), value));
                self.expr(value, reg(*slot))
            }

            Statement::Output(value) => {
                self.annotate(format_args!("VORSTELLUNG {}", value));

                let source = self.operand(value, SCRATCH)?;
                emit!(self, Mav, "{}", source)
            }

            Statement::Input(slot) => {
                self.annotate(format_args!("WILLE {}", slot.index()));
                emit!(self, Vir, "{}", reg(*slot))
            }

            Statement::If {
                condition,
                body,
                otherwise,
            } => {
                let otherwise_label = self.label();
                let end = if otherwise.is_empty() {
                    otherwise_label
                } else {
                    self.label()
                };

                self.annotate(format_args!("WENN {}", condition));
                self.branch_unless(condition, otherwise_label)?;
                self.block(body)?;

                if !otherwise.is_empty() {
                    emit!(self, Rav, "{}", end)?;
                    self.set_label(otherwise_label)?;
                    self.block(otherwise)?;
                }

                self.set_label(end)
            }

            Statement::While { condition, body } => {
                let (start, end) = (self.label(), self.label());

                self.set_label(start)?;
                self.annotate(format_args!("SOLANGE {}", condition));
                self.branch_unless(condition, end)?;
                self.block(body)?;

                emit!(self, Rav, "{}", start)?;
                self.set_label(end)
            }
        }
    }

    /// Calcula una expresión dentro de un registro específico.
    fn expr(&mut self, expr: &Expr, target: Reg) -> io::Result<()> {
        match expr {
            Expr::Number(number) => emit!(self, Tar, "{}, {}", target, number),
            Expr::Slot(slot) => emit!(self, Tar, "{}, {}", target, reg(*slot)),

            Expr::Text(text) => {
                let key = self.intern(text);
                emit!(self, Tar, "{}, {}", target, key)
            }

            Expr::Binary(left, op, right) => self.binary(left, *op, right, target),
        }
    }

    fn binary(&mut self, left: &Expr, op: BinOp, right: &Expr, target: Reg) -> io::Result<()> {
        if let Some(text) = concat(left, op, right) {
            let key = self.intern(&text);
            return emit!(self, Tar, "{}, {}", target, key);
        }

        let (left, right) = self.operands(left, right)?;
        match op {
            BinOp::Add => emit!(self, Kur, "{}, {}, {}", target, left, right),
            BinOp::Sub => emit!(self, Sur, "{}, {}, {}", target, left, right),
            BinOp::Mul => emit!(self, Mur, "{}, {}, {}", target, left, right),
            BinOp::Div => emit!(self, Dur, "{}, {}, {}", target, left, right),
            BinOp::Mod => emit!(self, Rur, "{}, {}, {}", target, left, right),
            comparison => self.comparison(comparison, target, left, right),
        }
    }

    /// Materializa una comparación como `1` o `0`.
    fn comparison(&mut self, op: BinOp, target: Reg, left: Reg, right: Reg) -> io::Result<()> {
        let end = self.label();
        let (hit, miss) = if op == BinOp::NotEqual { (0, 1) } else { (1, 0) };

        self.compare(op, left, right)?;
        emit!(self, Tar, "{}, {}", target, hit)?;

        match op {
            BinOp::Equal | BinOp::NotEqual => emit!(self, Rev, "{}", end)?,
            BinOp::Greater | BinOp::Less => emit!(self, Rgv, "{}", end)?,
            _ => {
                emit!(self, Rgv, "{}", end)?;
                emit!(self, Rev, "{}", end)?;
            }
        }

        emit!(self, Tar, "{}, {}", target, miss)?;
        self.set_label(end)
    }

    /// Salta a `otherwise` si la condición es falsa.
    fn branch_unless(&mut self, condition: &Expr, otherwise: Label) -> io::Result<()> {
        let (left, op, right) = match condition {
            Expr::Binary(left, op, right) if op.is_comparison() => (left, *op, right),

            _ => {
                let value = self.operand(condition, SCRATCH)?;
                emit!(self, Pav, "{}, 0", value)?;
                return emit!(self, Rev, "{}", otherwise);
            }
        };

        let (left, right) = self.operands(left, right)?;
        self.compare(op, left, right)?;

        match op {
            BinOp::NotEqual => emit!(self, Rev, "{}", otherwise),
            BinOp::Equal => self.skip_unless(&[Rev], otherwise),
            BinOp::Greater | BinOp::Less => self.skip_unless(&[Rgv], otherwise),
            _ => self.skip_unless(&[Rgv, Rev], otherwise),
        }
    }

    /// `pav` con los operandos invertidos para `<` y `<=`, de modo que
    /// toda comparación se resuelva con las banderas de igual y mayor.
    fn compare(&mut self, op: BinOp, left: Reg, right: Reg) -> io::Result<()> {
        match op {
            BinOp::Less | BinOp::LessOrEqual => emit!(self, Pav, "{}, {}", right, left),
            _ => emit!(self, Pav, "{}, {}", left, right),
        }
    }

    fn skip_unless(&mut self, jumps: &[asm::Opcode], otherwise: Label) -> io::Result<()> {
        let skip = self.label();
        for &jump in jumps {
            emit!(self, jump, "{}", skip)?;
        }

        emit!(self, Rav, "{}", otherwise)?;
        self.set_label(skip)
    }

    fn label(&mut self) -> Label {
        let label = Label(self.next_label);
        self.next_label += 1;

        label
    }

    fn set_label(&mut self, label: Label) -> io::Result<()> {
        writeln!(self.code, "{}:", label)
    }

    /// Comentario para la siguiente instrucción emitida.
    fn annotate(&mut self, comment: impl Display) {
        self.comment = Some(comment.to_string());
    }

    fn instruction(&mut self, text: String) -> io::Result<()> {
        match self.comment.take() {
            Some(comment) => writeln!(self.code, "  {:24}; {}", text, comment),
            None => writeln!(self.code, "  {}", text),
        }
    }

    fn intern(&mut self, text: &str) -> DataKey {
        if let Some(&key) = self.interned.get(text) {
            return key;
        }

        let key = DataKey(self.strings.len());
        self.strings.push(text.to_owned());
        self.interned.insert(text.to_owned(), key);

        key
    }
}

fn reg(slot: Slot) -> Reg {
    Reg(slot.index() as u8)
}

/// Valor conocido en tiempo de compilación, si lo hay.
fn constant(expr: &Expr) -> Option<Value> {
    match expr {
        Expr::Number(number) => Some(Value::number((*number).into())),
        Expr::Text(text) => Some(Value::from(text.as_str())),
        Expr::Slot(_) => None,
        Expr::Binary(left, op, right) => concat(left, *op, right).map(Value::Text),
    }
}

/// Concatenación de constantes, resuelta durante la compilación.
fn concat(left: &Expr, op: BinOp, right: &Expr) -> Option<String> {
    if op != BinOp::Add {
        return None;
    }

    let (left, right) = (constant(left)?, constant(right)?);
    (left.is_text() || right.is_text()).then(|| format!("{}{}", left, right))
}
