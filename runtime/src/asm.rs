//! Análisis de listados GRUND.
//!
//! # Formato
//! Un listado se compone de una sección `.data` opcional, con entradas de
//! la forma `s0: "texto"`, y una sección `.code` con una instrucción o una
//! etiqueta por línea. El encabezado `.code` es opcional: la primera
//! etiqueta u operación reconocida inicia implícitamente la sección de
//! código. Los comentarios comienzan con `;` fuera de un string.
//!
//! # Errores
//! Operaciones desconocidas, operandos inválidos y referencias a datos
//! inexistentes son fatales en tiempo de análisis. Las etiquetas, en
//! cambio, se resuelven al momento de saltar.

use crate::{
    error::AsmError,
    source::{strip_comment, Located},
};

use log::debug;
use std::{
    collections::HashMap,
    fmt::{self, Display},
    str::FromStr,
};

use unicase::Ascii as NoCase;

/// Un registro `r0`-`r7`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Reg(pub u8);

impl Reg {
    /// Cantidad de registros de la máquina.
    pub const COUNT: u8 = 8;

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl Display for Reg {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Reg(number) = self;
        write!(formatter, "r{}", number)
    }
}

/// Código de operación.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Opcode {
    /// `mav rN`: emite un registro.
    Mav,
    /// `vir rN`: lee una entrada a un registro.
    Vir,
    /// `mak`: emite el estado del acarreo.
    Mak,
    /// `pav a, b`: compara y fija banderas.
    Pav,
    /// `tar rN, x`: carga un valor a un registro.
    Tar,
    /// `tir rN, x`: carga indirecta, por ahora idéntica a `tar`.
    Tir,
    /// `tin rN`: empuja al ring.
    Tin,
    /// `tab rN`: retira del ring.
    Tab,
    Kur,
    Sur,
    Mur,
    Dur,
    /// `rur d, a, b`: residuo de `a / b`.
    Rur,
    /// `rav .l`: salto incondicional.
    Rav,
    /// `rev .l`: salto si igual.
    Rev,
    /// `rgv .l`: salto si mayor.
    Rgv,
    /// `nov`: detiene la máquina.
    Nov,
}

const OPCODES: &[(NoCase<&str>, Opcode)] = &[
    (NoCase::new("mav"), Opcode::Mav),
    (NoCase::new("vir"), Opcode::Vir),
    (NoCase::new("mak"), Opcode::Mak),
    (NoCase::new("pav"), Opcode::Pav),
    (NoCase::new("tar"), Opcode::Tar),
    (NoCase::new("tir"), Opcode::Tir),
    (NoCase::new("tin"), Opcode::Tin),
    (NoCase::new("tab"), Opcode::Tab),
    (NoCase::new("kur"), Opcode::Kur),
    (NoCase::new("sur"), Opcode::Sur),
    (NoCase::new("mur"), Opcode::Mur),
    (NoCase::new("dur"), Opcode::Dur),
    (NoCase::new("rur"), Opcode::Rur),
    (NoCase::new("rav"), Opcode::Rav),
    (NoCase::new("rev"), Opcode::Rev),
    (NoCase::new("rgv"), Opcode::Rgv),
    (NoCase::new("nov"), Opcode::Nov),
];

impl FromStr for Opcode {
    type Err = ();

    fn from_str(string: &str) -> Result<Self, Self::Err> {
        OPCODES
            .iter()
            .find(|&&(name, _)| name == NoCase::new(string))
            .map(|&(_, opcode)| opcode)
            .ok_or(())
    }
}

impl Display for Opcode {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (name, _) = OPCODES
            .iter()
            .find(|(_, opcode)| opcode == self)
            .ok_or(fmt::Error)?;

        fmt.pad(name)
    }
}

/// Operando de una instrucción.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Operand {
    Register(Reg),
    Immediate(i64),
    Label(String),
    Data(String),
}

impl FromStr for Operand {
    type Err = AsmError;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        let lower = token.to_ascii_lowercase();
        let digits = |rest: &str| !rest.is_empty() && rest.bytes().all(|b| b.is_ascii_digit());

        if let Some(index) = lower.strip_prefix('r').filter(|rest| rest.len() == 1 && digits(rest)) {
            let index: u8 = index.parse().map_err(|_| AsmError::InvalidOperand(token.into()))?;
            return if index < Reg::COUNT {
                Ok(Operand::Register(Reg(index)))
            } else {
                Err(AsmError::RegisterOutOfRange(token.into()))
            };
        }

        if token.starts_with('.') {
            Ok(Operand::Label(token.into()))
        } else if lower.strip_prefix('s').map_or(false, digits) {
            Ok(Operand::Data(lower))
        } else {
            token
                .parse()
                .map(Operand::Immediate)
                .map_err(|_| AsmError::InvalidOperand(token.into()))
        }
    }
}

impl Display for Operand {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Register(reg) => reg.fmt(fmt),
            Operand::Immediate(value) => value.fmt(fmt),
            Operand::Label(name) | Operand::Data(name) => fmt.write_str(name),
        }
    }
}

/// Instrucción ya decodificada.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Instruction {
    pub opcode: Opcode,
    pub operands: Vec<Operand>,
    pub line: u32,
}

impl Display for Instruction {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(fmt, "{}", self.opcode)?;
        for (index, operand) in self.operands.iter().enumerate() {
            let separator = if index == 0 { " " } else { ", " };
            write!(fmt, "{}{}", separator, operand)?;
        }

        Ok(())
    }
}

/// Programa GRUND completo.
#[derive(Debug, Default)]
pub struct Program {
    data: HashMap<String, String>,
    instructions: Vec<Instruction>,
    labels: HashMap<String, usize>,
}

impl Program {
    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    /// Índice de instrucción que corresponde a una etiqueta.
    pub fn label(&self, name: &str) -> Option<usize> {
        self.labels.get(name).copied()
    }

    /// Constante de texto asociada a una llave de datos.
    pub fn data(&self, key: &str) -> Option<&str> {
        self.data.get(key).map(String::as_str)
    }
}

#[derive(Copy, Clone, PartialEq, Eq)]
enum Section {
    None,
    Data,
    Code,
}

/// Analiza un listado GRUND completo.
pub fn parse(source: &str) -> Result<Program, Located<AsmError>> {
    let mut program = Program::default();
    let mut section = Section::None;

    for (index, raw) in source.lines().enumerate() {
        let line_number = index as u32 + 1;
        let line = strip_comment(raw).trim();

        match line {
            "" => continue,
            ".data" => section = Section::Data,
            ".code" => section = Section::Code,

            _ if section == Section::Data => {
                let (key, value) =
                    data_entry(line).ok_or_else(|| invalid_entry(line, line_number))?;

                program.data.insert(key, value);
            }

            _ => {
                let is_label = line.ends_with(':');
                if section == Section::None {
                    let first = line.split_whitespace().next().unwrap_or_default();
                    if (is_label && line.starts_with('.')) || Opcode::from_str(first).is_ok() {
                        section = Section::Code;
                    } else {
                        continue;
                    }
                }

                if is_label {
                    let name = line[..line.len() - 1].trim();
                    program.labels.insert(name.to_owned(), program.instructions.len());
                } else {
                    let instruction = instruction(line, line_number)?;
                    program.instructions.push(instruction);
                }
            }
        }
    }

    // Segunda pasada: toda referencia a datos debe existir
    for instruction in &program.instructions {
        for operand in &instruction.operands {
            if let Operand::Data(key) = operand {
                if !program.data.contains_key(key) {
                    let error = AsmError::UndefinedData(key.clone());
                    return Err(Located::at(error, instruction.line));
                }
            }
        }
    }

    debug!(
        "Parsed GRUND listing: {} instructions, {} labels, {} data entries",
        program.instructions.len(),
        program.labels.len(),
        program.data.len()
    );

    Ok(program)
}

fn invalid_entry(line: &str, line_number: u32) -> Located<AsmError> {
    Located::at(AsmError::InvalidDataEntry(line.into()), line_number)
}

fn instruction(line: &str, line_number: u32) -> Result<Instruction, Located<AsmError>> {
    let mut parts = line
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|part| !part.is_empty());

    let mnemonic = parts.next().unwrap_or_default();
    let opcode = Opcode::from_str(mnemonic).map_err(|_| {
        let error = AsmError::UnknownOpcode(mnemonic.to_ascii_lowercase());
        Located::at(error, line_number)
    })?;

    let operands = parts
        .map(Operand::from_str)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|error| Located::at(error, line_number))?;

    Ok(Instruction {
        opcode,
        operands,
        line: line_number,
    })
}

/// Descompone `llave: "texto"`, resolviendo escapes.
fn data_entry(line: &str) -> Option<(String, String)> {
    let (key, rest) = line.split_once(':')?;
    let key = key.trim();
    if key.is_empty() || !key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return None;
    }

    let quoted = rest.trim().strip_prefix('"')?.strip_suffix('"')?;

    let mut value = String::with_capacity(quoted.len());
    let mut chars = quoted.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => value.push(match chars.next()? {
                'n' => '\n',
                't' => '\t',
                other => other,
            }),

            // Una comilla sin escapar terminaría el string antes de tiempo
            '"' => return None,
            c => value.push(c),
        }
    }

    Some((key.to_owned(), value))
}

/// Escapa un texto para una entrada de `.data`.
pub fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len() + 2);
    for c in text.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '"' => escaped.push_str("\\\""),
            '\n' => escaped.push_str("\\n"),
            '\t' => escaped.push_str("\\t"),
            c => escaped.push(c),
        }
    }

    escaped
}
