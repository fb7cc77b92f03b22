//! Intérprete directo de árboles sintácticos WELT.
//!
//! Recorre el [`Ast`] sentencia por sentencia sobre una memoria de 8
//! casillas. Todo el estado que sobrevive entre sentencias (la bandera
//! de acarreo, la pantalla y el contador global) vive en [`Interpreter`],
//! de modo que cada ejecución es independiente de cualquier otra.

use crate::{
    parse::{Ast, BinOp, Expr, Statement},
    source::Located,
};

use log::{debug, trace};
use runtime::{
    console::{Console, Odometer, Screen, NO_HALT_NOTICE},
    error::Fault,
    flags::{ArithOp, Flags},
    machine::MAX_ITERATIONS,
    value::{Memory, Value},
};

enum Flow {
    Continue,
    Halt,
}

struct Interpreter<C> {
    memory: Memory,
    flags: Flags,
    screen: Screen,
    odometer: Odometer,
    console: C,
}

/// Ejecuta un programa WELT y retorna la memoria final.
pub fn run<C: Console>(ast: &Ast, console: C, memory: Memory) -> Result<Memory, Located<Fault>> {
    let mut interpreter = Interpreter {
        memory,
        flags: Flags::empty(),
        screen: Screen::default(),
        odometer: Odometer::default(),
        console,
    };

    let Ast(statements) = ast;
    match interpreter.block(statements)? {
        Flow::Halt => debug!("Program halted"),
        Flow::Continue => {
            debug!("Program ended without halting");
            interpreter.console.output(NO_HALT_NOTICE);
        }
    }

    Ok(interpreter.memory)
}

impl<C: Console> Interpreter<C> {
    fn block(&mut self, statements: &[Located<Statement>]) -> Result<Flow, Located<Fault>> {
        for statement in statements {
            if let Flow::Halt = self.statement(statement)? {
                return Ok(Flow::Halt);
            }
        }

        Ok(Flow::Continue)
    }

    fn statement(&mut self, statement: &Located<Statement>) -> Result<Flow, Located<Fault>> {
        let line = statement.line();
        let at = |fault: Fault| Located::at(fault, line);

        trace!("{:>4}: {:?}", line, statement.val());

        match statement.val() {
            Statement::Halt => return Ok(Flow::Halt),

            Statement::Assign { slot, value } => {
                self.memory[slot.index()] = self.eval(value).map_err(at)?;
            }

            Statement::Output(value) => {
                let text = self.eval(value).map_err(at)?.to_string();
                self.screen.show(&mut self.console, text);
            }

            Statement::Input(slot) => {
                let input = self.console.input().map_err(|error| at(error.into()))?;
                self.memory[slot.index()] = Value::from_input(input);
            }

            Statement::If {
                condition,
                body,
                otherwise,
            } => {
                let branch = if self.eval(condition).map_err(at)?.is_truthy() {
                    body
                } else {
                    otherwise
                };

                return self.block(branch);
            }

            Statement::While { condition, body } => {
                let mut iterations = 0;

                while self.eval(condition).map_err(at)?.is_truthy() {
                    iterations += 1;
                    if iterations > MAX_ITERATIONS {
                        debug!("Loop at line {} overheated", line);
                        return Err(at(Fault::Overheat(MAX_ITERATIONS)));
                    }

                    self.odometer.tick(&mut self.console);
                    if let Flow::Halt = self.block(body)? {
                        return Ok(Flow::Halt);
                    }
                }
            }
        }

        Ok(Flow::Continue)
    }

    fn eval(&mut self, expr: &Expr) -> Result<Value, Fault> {
        let (left, op, right) = match expr {
            Expr::Number(number) => return Ok(Value::number((*number).into())),
            Expr::Text(text) => return Ok(Value::from(text.as_str())),
            Expr::Slot(slot) => return Ok(self.memory[slot.index()].clone()),
            Expr::Binary(left, op, right) => (left, *op, right),
        };

        let left = self.eval(left)?;
        let right = self.eval(right)?;

        let value = match op {
            BinOp::Add if left.is_text() || right.is_text() => {
                Value::Text(format!("{}{}", left, right))
            }

            BinOp::Equal => Value::truth(left == right),
            BinOp::NotEqual => Value::truth(left != right),

            BinOp::Less => Value::truth(left.to_number()? < right.to_number()?),
            BinOp::LessOrEqual => Value::truth(left.to_number()? <= right.to_number()?),
            BinOp::Greater => Value::truth(left.to_number()? > right.to_number()?),
            BinOp::GreaterOrEqual => Value::truth(left.to_number()? >= right.to_number()?),

            BinOp::Add => self.arith(ArithOp::Add, &left, &right)?,
            BinOp::Sub => self.arith(ArithOp::Sub, &left, &right)?,
            BinOp::Mul => self.arith(ArithOp::Mul, &left, &right)?,
            BinOp::Div => self.arith(ArithOp::Div, &left, &right)?,
            BinOp::Mod => self.arith(ArithOp::Mod, &left, &right)?,
        };

        Ok(value)
    }

    fn arith(&mut self, op: ArithOp, left: &Value, right: &Value) -> Result<Value, Fault> {
        let (left, right) = (left.to_number()?, right.to_number()?);
        Ok(Value::Number(self.flags.arith(op, left, right)?))
    }
}
