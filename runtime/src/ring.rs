//! El Ring: búfer circular de 4 casillas.
//!
//! La DAS-8 no tiene pila de llamadas. El compilador usa el ring para
//! guardar valores intermedios cuando se queda sin registros de trabajo.
//! Escribir sobre un ring lleno no es un error: se pierde el valor más
//! antiguo y se reporta un evento.

use crate::{console::Event, error::Fault, value::Value};

/// Capacidad del ring.
pub const RING_SIZE: usize = 4;

#[derive(Debug, Default)]
pub struct Ring {
    slots: [Value; RING_SIZE],
    pointer: usize,
    count: usize,
    total_pushes: u64,
    overflow_streak: usize,
}

impl Ring {
    /// Empuja un valor, retornando los eventos que esto provoca.
    pub fn push(&mut self, value: Value) -> impl Iterator<Item = Event> {
        let overflow = self.count >= RING_SIZE;
        let (overflow, spin) = if overflow {
            self.overflow_streak += 1;
            (
                Some(Event::RingOverflow {
                    pointer: self.pointer,
                }),
                (self.overflow_streak >= RING_SIZE).then(|| Event::RingSpin),
            )
        } else {
            self.overflow_streak = 0;
            (None, None)
        };

        self.slots[self.pointer] = value;
        self.pointer = (self.pointer + 1) % RING_SIZE;
        self.count = (self.count + 1).min(RING_SIZE);
        self.total_pushes += 1;

        let cycle = (self.total_pushes >= RING_SIZE as u64 && self.pointer == 0)
            .then(|| Event::RingCycle);

        overflow.into_iter().chain(spin).chain(cycle)
    }

    /// Retira el valor más reciente.
    pub fn pop(&mut self) -> Result<Value, Fault> {
        if self.count == 0 {
            return Err(Fault::RingUnderflow);
        }

        self.pointer = (self.pointer + RING_SIZE - 1) % RING_SIZE;
        self.count -= 1;

        Ok(std::mem::take(&mut self.slots[self.pointer]))
    }

    /// Cantidad de valores vivos.
    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}
