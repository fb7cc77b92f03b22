//! Toolchain de WELT y GRUND.
//!
//! # WELT
//! Cada programa deriva de un único archivo de código fuente. Este
//! archivo se somete primero a análisis léxico en [`lex`], de lo cual
//! se obtiene un flujo de tokens. El flujo de tokens se dispone en un
//! AST por medio de análisis sintáctico en [`parse`]. El árbol puede
//! ejecutarse directamente con el intérprete de [`interpret`] o bien
//! compilarse a un listado GRUND en [`codegen`].
//!
//! # GRUND
//! El ensamblador y la máquina DAS-8 viven en el crate `runtime`, junto
//! con todo el modelo compartido: valores, banderas, ring, pantalla y
//! consola. Ambas rutas de ejecución producen las mismas salidas para
//! programas que no dependen de sus diferencias documentadas.
//!
//! # Uso
//! ```
//! use welt::{run_welt, Scripted};
//!
//! let mut console = Scripted::new();
//! run_welt("ERWACHE\nVORSTELLUNG 6 * 7\nVERNEINUNG", &mut console, None).unwrap();
//!
//! assert_eq!(console.outputs(), ["42"]);
//! ```

#[macro_use]
mod macros;

pub mod codegen;
pub mod error;
pub mod interpret;
pub mod lex;
pub mod parse;

pub use runtime::source;

pub use error::{Diagnostics, Error};
pub use runtime::{value::default_memory, Console, Event, Memory, Scripted, Value};

use lex::{Lexer, Token};
use parse::Ast;
use runtime::{asm, machine};
use source::Located;

use log::debug;

/// Análisis léxico completo, reportando todos los errores a la vez.
pub fn tokenize(source: &str) -> Result<Vec<Located<Token>>, Error> {
    Ok(Lexer::new(source).try_exhaustive()?)
}

pub fn parse_program(source: &str) -> Result<Ast, Error> {
    let tokens = tokenize(source)?;
    debug!("Lexed {} tokens", tokens.len());

    let ast = parse::parse(&tokens)?;
    debug!("Parsed {} top-level statements", ast.0.len());

    Ok(ast)
}

/// Ejecuta un programa WELT con el intérprete directo.
///
/// Sin memoria inicial se usa [`default_memory`].
pub fn run_welt<C: Console>(
    source: &str,
    console: C,
    memory: Option<Memory>,
) -> Result<Memory, Error> {
    let ast = parse_program(source)?;
    Ok(interpret::run(&ast, console, memory.unwrap_or_else(default_memory))?)
}

/// Compila un programa WELT a un listado GRUND.
pub fn compile_welt(source: &str, name: Option<&str>) -> Result<String, Error> {
    let ast = parse_program(source)?;

    let mut listing = Vec::new();
    codegen::emit(&ast, name, &mut listing)?;

    Ok(String::from_utf8_lossy(&listing).into_owned())
}

/// Ensambla y ejecuta un listado GRUND en la máquina DAS-8.
pub fn run_grund<C: Console>(
    source: &str,
    console: C,
    registers: Option<Memory>,
) -> Result<Memory, Error> {
    let program = asm::parse(source)?;
    debug!("Assembled {} instructions", program.instructions().len());

    Ok(machine::run(&program, console, registers.unwrap_or_else(default_memory))?)
}

/// Compila un programa WELT y lo ejecuta en la máquina DAS-8.
pub fn run_compiled<C: Console>(
    source: &str,
    console: C,
    registers: Option<Memory>,
) -> Result<Memory, Error> {
    let listing = compile_welt(source, None)?;
    run_grund(&listing, console, registers)
}

/// Ejecuta un programa WELT sin salidas visibles y retorna la memoria
/// que deja, para usarla como memoria inicial de otras ejecuciones.
pub fn boot_memory(source: &str) -> Result<Memory, Error> {
    run_welt(source, Scripted::new(), None)
}
