//! Núcleo de ejecución compartido por WELT y GRUND.
//!
//! # Propósito
//! Tanto el intérprete de WELT como la máquina DAS-8 operan sobre el mismo
//! modelo: 8 casillas que contienen bytes o textos, una bandera de acarreo
//! que persiste durante toda la ejecución, una pantalla con persistencia
//! de fósforo y un contador global de iteraciones. Esta biblioteca
//! implementa ese modelo una sola vez, así como el ensamblador y la
//! máquina de GRUND.
//!
//! # Anfitrión
//! Nada en esta biblioteca toca stdin, stdout o variables globales. Toda
//! interacción con el exterior ocurre a través de un [`Console`] provisto
//! por quien ejecuta el programa. Dos ejecuciones simultáneas son por lo
//! tanto completamente independientes.
//!
//! # Uso
//! ```
//! use runtime::{asm, machine, value, Scripted};
//!
//! let program = asm::parse(".code\ntar r0, 42\nmav r0\nnov").unwrap();
//! let mut console = Scripted::new();
//! machine::run(&program, &mut console, value::default_memory()).unwrap();
//!
//! assert_eq!(console.outputs(), ["42"]);
//! ```

pub mod asm;
pub mod console;
pub mod error;
pub mod flags;
pub mod machine;
pub mod ring;
pub mod source;
pub mod value;

pub use console::{Console, Event, Scripted};
pub use error::{AsmError, Fault};
pub use source::Located;
pub use value::{Memory, Value};
