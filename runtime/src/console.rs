//! Interfaz con el anfitrión.
//!
//! Ningún intérprete escribe a stdout ni lee de stdin por su cuenta.
//! Toda entrada, salida y notificación cosmética pasa por un [`Console`]
//! que el llamador inyecta. Esta es también la única frontera de
//! suspensión: [`Console::input()`] puede bloquear cuanto sea necesario.

use log::debug;
use std::{collections::VecDeque, io};

/// Iteraciones totales tras las cuales el sistema se impacienta.
pub const RESTLESS_AT: u64 = 1024;

/// Iteraciones totales tras las cuales el sistema sufre.
pub const SUFFERING_AT: u64 = 4096;

/// Aviso para programas que terminan sin `VERNEINUNG` (o sin `nov`).
pub const NO_HALT_NOTICE: &str = "Programm endete ohne Verneinung.";

/// Interjección al alcanzar [`RESTLESS_AT`].
pub const RESTLESS_MESSAGE: &str = "...";

/// Interjección al alcanzar [`SUFFERING_AT`].
pub const SUFFERING_MESSAGE: &str = "Alles Leben ist Leiden.";

/// Notificación cosmética.
///
/// Ningún evento detiene la ejecución; consumirlos es opcional.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Se alcanzaron [`RESTLESS_AT`] iteraciones totales.
    Restless,

    /// Se alcanzaron [`SUFFERING_AT`] iteraciones totales.
    Suffering,

    /// Se escribió sobre un ring lleno.
    RingOverflow { pointer: usize },

    /// El ring lleva un ciclo completo de escrituras desbordadas.
    RingSpin,

    /// El puntero del ring volvió a cero.
    RingCycle,
}

/// Capacidades de E/S que un intérprete requiere de su anfitrión.
pub trait Console {
    /// Emite un valor ya convertido a texto.
    fn output(&mut self, text: &str);

    /// Bloquea hasta obtener una línea de entrada.
    fn input(&mut self) -> io::Result<String>;

    /// Recibe una notificación cosmética.
    fn event(&mut self, _event: Event) {}
}

impl<C: Console + ?Sized> Console for &mut C {
    fn output(&mut self, text: &str) {
        (**self).output(text)
    }

    fn input(&mut self) -> io::Result<String> {
        (**self).input()
    }

    fn event(&mut self, event: Event) {
        (**self).event(event)
    }
}

/// Consola con entradas preparadas de antemano.
///
/// Registra toda salida y todo evento. Cuando se agotan las entradas,
/// responde con un texto vacío.
#[derive(Debug, Default)]
pub struct Scripted {
    inputs: VecDeque<String>,
    outputs: Vec<String>,
    events: Vec<Event>,
}

impl Scripted {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn with_inputs<I, S>(inputs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Scripted {
            inputs: inputs.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    pub fn outputs(&self) -> &[String] {
        &self.outputs
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn into_outputs(self) -> Vec<String> {
        self.outputs
    }
}

impl Console for Scripted {
    fn output(&mut self, text: &str) {
        self.outputs.push(text.to_owned());
    }

    fn input(&mut self) -> io::Result<String> {
        Ok(self.inputs.pop_front().unwrap_or_default())
    }

    fn event(&mut self, event: Event) {
        self.events.push(event);
    }
}

/// Persistencia de fósforo.
///
/// Si un texto de más de un carácter se emite dos veces seguidas, la
/// segunda copia pierde el carácter en la posición `(n - 1) mod 5`. Tras
/// una corrupción se olvida el historial, por lo que una tercera copia
/// sale intacta.
#[derive(Debug, Default)]
pub struct Screen {
    last: String,
}

impl Screen {
    pub fn show<C: Console + ?Sized>(&mut self, console: &mut C, text: String) {
        let length = text.chars().count();

        let text = if length > 1 && text == self.last {
            let drop = (length - 1) % 5;
            self.last.clear();

            text.chars()
                .enumerate()
                .filter_map(|(index, c)| (index != drop).then(|| c))
                .collect()
        } else {
            self.last.clone_from(&text);
            text
        };

        console.output(&text);
    }
}

/// Contador global de iteraciones.
///
/// Emite una sola vez cada una de las interjecciones del sistema.
#[derive(Debug, Default)]
pub struct Odometer {
    total: u64,
}

impl Odometer {
    pub fn tick<C: Console + ?Sized>(&mut self, console: &mut C) {
        self.total += 1;

        let (message, event) = match self.total {
            RESTLESS_AT => (RESTLESS_MESSAGE, Event::Restless),
            SUFFERING_AT => (SUFFERING_MESSAGE, Event::Suffering),
            _ => return,
        };

        debug!("Odometer reached {} iterations", self.total);
        console.output(message);
        console.event(event);
    }
}
