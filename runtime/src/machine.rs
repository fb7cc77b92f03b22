//! La máquina DAS-8.
//!
//! Ejecuta un [`Program`] ya analizado, una instrucción a la vez, hasta
//! encontrar `nov`, salir del final del programa, fallar o agotar el
//! límite global de pasos. A diferencia del intérprete de WELT, este
//! límite no se reinicia por ciclo: cuenta toda la ejecución.

use crate::{
    asm::{Instruction, Opcode, Operand, Program, Reg},
    console::{Console, Odometer, Screen, NO_HALT_NOTICE},
    error::Fault,
    flags::{ArithOp, Flags},
    ring::Ring,
    source::Located,
    value::{Memory, Value},
};

use log::{debug, trace};

/// Iteraciones permitidas a un ciclo `SOLANGE`.
pub const MAX_ITERATIONS: u32 = 1818;

/// Pasos permitidos a una ejecución completa de la máquina.
pub const MAX_STEPS: u32 = MAX_ITERATIONS * 8;

enum Step {
    Next,
    Jump(usize),
    Halt,
}

struct Machine<'p, C> {
    program: &'p Program,
    registers: Memory,
    ring: Ring,
    flags: Flags,
    screen: Screen,
    odometer: Odometer,
    console: C,
}

/// Ejecuta un programa GRUND y retorna los registros finales.
///
/// Las fallas de ejecución se reportan en la línea de la instrucción que
/// las causó, excepto el sobrecalentamiento, que no es atribuible a
/// ninguna línea en particular.
pub fn run<C: Console>(
    program: &Program,
    console: C,
    registers: Memory,
) -> Result<Memory, Located<Fault>> {
    let mut machine = Machine {
        program,
        registers,
        ring: Ring::default(),
        flags: Flags::empty(),
        screen: Screen::default(),
        odometer: Odometer::default(),
        console,
    };

    machine.run()?;
    Ok(machine.registers)
}

impl<C: Console> Machine<'_, C> {
    fn run(&mut self) -> Result<(), Located<Fault>> {
        let program = self.program;
        let instructions = program.instructions();

        let mut pc = 0;
        let mut steps = 0;

        while let Some(instruction) = instructions.get(pc) {
            steps += 1;
            self.odometer.tick(&mut self.console);

            if steps > MAX_STEPS {
                debug!("Machine overheated at pc={}", pc);
                return Err(Located::nowhere(Fault::Overheat(MAX_STEPS)));
            }

            trace!("{:04}: {}", pc, instruction);

            let step = self
                .execute(instruction)
                .map_err(|fault| Located::at(fault, instruction.line))?;

            pc = match step {
                Step::Next => pc + 1,
                Step::Jump(target) => target,
                Step::Halt => {
                    debug!("Machine halted after {} steps", steps);
                    return Ok(());
                }
            };
        }

        debug!("Machine ran off the end after {} steps", steps);
        self.console.output(NO_HALT_NOTICE);

        Ok(())
    }

    fn execute(&mut self, instruction: &Instruction) -> Result<Step, Fault> {
        use Opcode::*;

        match instruction.opcode {
            Nov => return Ok(Step::Halt),

            Tar | Tir => {
                let target = register(instruction, 0)?;
                self.registers[target.index()] = self.fetch(instruction, 1)?;
            }

            Tin => {
                let source = register(instruction, 0)?;
                let value = self.registers[source.index()].clone();

                for event in self.ring.push(value) {
                    debug!("Ring event: {:?}", event);
                    self.console.event(event);
                }
            }

            Tab => {
                let target = register(instruction, 0)?;
                self.registers[target.index()] = self.ring.pop()?;
            }

            Mav => {
                let source = register(instruction, 0)?;
                let text = self.registers[source.index()].to_string();
                self.screen.show(&mut self.console, text);
            }

            Vir => {
                let target = register(instruction, 0)?;
                let line = self.console.input()?;
                self.registers[target.index()] = Value::from_input(line);
            }

            Mak => {
                let carry = if self.flags.carry() { "1" } else { "0" };
                self.console.output(carry);
            }

            Pav => {
                let left = self.fetch(instruction, 0)?;
                let right = self.fetch(instruction, 1)?;

                let (equal, greater) = match (left.as_number(), right.as_number()) {
                    (Some(left), Some(right)) => (left == right, left > right),
                    _ => (left == right, left.to_string() > right.to_string()),
                };

                self.flags.compare(equal, greater);
            }

            Kur => self.arith(instruction, ArithOp::Add)?,
            Sur => self.arith(instruction, ArithOp::Sub)?,
            Mur => self.arith(instruction, ArithOp::Mul)?,
            Dur => self.arith(instruction, ArithOp::Div)?,
            Rur => self.arith(instruction, ArithOp::Mod)?,

            Rav => return self.jump(instruction, true),
            Rev => return self.jump(instruction, self.flags.contains(Flags::EQUAL)),
            Rgv => return self.jump(instruction, self.flags.contains(Flags::GREATER)),
        }

        Ok(Step::Next)
    }

    /// Lee un operando de valor. Los inmediatos se reducen a un byte.
    fn fetch(&self, instruction: &Instruction, position: usize) -> Result<Value, Fault> {
        match instruction.operands.get(position) {
            None => Err(Fault::MissingOperand(position)),
            Some(Operand::Register(reg)) => Ok(self.registers[reg.index()].clone()),
            Some(Operand::Immediate(value)) => Ok(Value::number(*value as i128)),
            Some(Operand::Label(name)) => Err(Fault::LabelAsValue(name.clone())),

            Some(Operand::Data(key)) => self
                .program
                .data(key)
                .map(Value::from)
                .ok_or_else(|| Fault::UndefinedData(key.clone())),
        }
    }

    fn arith(&mut self, instruction: &Instruction, op: ArithOp) -> Result<(), Fault> {
        let target = register(instruction, 0)?;
        let left = &self.registers[register(instruction, 1)?.index()];
        let right = &self.registers[register(instruction, 2)?.index()];

        let result = if op == ArithOp::Add && (left.is_text() || right.is_text()) {
            Value::Text(format!("{}{}", left, right))
        } else {
            let (left, right) = (left.to_number()?, right.to_number()?);
            Value::Number(self.flags.arith(op, left, right)?)
        };

        self.registers[target.index()] = result;
        Ok(())
    }

    fn jump(&self, instruction: &Instruction, taken: bool) -> Result<Step, Fault> {
        if !taken {
            return Ok(Step::Next);
        }

        match instruction.operands.first() {
            Some(Operand::Label(name)) => self
                .program
                .label(name)
                .map(Step::Jump)
                .ok_or_else(|| Fault::UndefinedLabel(name.clone())),

            _ => Err(Fault::ExpectedLabel),
        }
    }
}

fn register(instruction: &Instruction, position: usize) -> Result<Reg, Fault> {
    match instruction.operands.get(position) {
        Some(Operand::Register(reg)) => Ok(*reg),
        _ => Err(Fault::ExpectedRegister(position)),
    }
}
