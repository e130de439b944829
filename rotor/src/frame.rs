//! The synthesized first-run frame.
//!
//! A task that has never run is resumed through the same path as a preempted one, so its stack
//! must already hold what the context-switch trap and the exception return pop. The frame is 16
//! words: the 8 registers the hardware stacks on exception entry, below them the 8 the trap saves
//! by hand (R4-R7 first, then R8-R11, the order an ARMv6-M compatible `push` sequence produces).
//!
//! ```text
//!   top of stack (high address)
//!   L-1   xPSR       0x0100_0000 (Thumb)
//!   L-2   PC         entry
//!   L-3   LR         task_finished
//!   L-4   R12
//!   L-5   R3
//!   L-6   R2
//!   L-7   R1
//!   L-8   R0         argument
//!   L-9   R7
//!   L-10  R6
//!   L-11  R5
//!   L-12  R4
//!   L-13  R11
//!   L-14  R10
//!   L-15  R9
//!   L-16  R8         <- saved stack pointer
//! ```

use crate::Error;

/// Number of machine words in a frame.
pub const FRAME_WORDS: usize = 16;
pub const FRAME_BYTES: usize = FRAME_WORDS * core::mem::size_of::<usize>();

/// xPSR with only the Thumb bit set.
pub const INITIAL_XPSR: usize = 0x0100_0000;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Register {
    /// R0-R12 by number
    General(u8),
    Lr,
    Pc,
    Xpsr,
}

use Register::{General, Lr, Pc, Xpsr};

/// Register held by each word of the frame, lowest address first.
pub const LAYOUT: [Register; FRAME_WORDS] = [
    General(8),
    General(9),
    General(10),
    General(11),
    General(4),
    General(5),
    General(6),
    General(7),
    General(0),
    General(1),
    General(2),
    General(3),
    General(12),
    Lr,
    Pc,
    Xpsr,
];

impl Register {
    /// Distance of this register's slot from the end of the stack (1 is the topmost word).
    pub fn offset_from_top(self) -> usize {
        let index = LAYOUT
            .iter()
            .position(|r| *r == self)
            .unwrap_or_else(|| unreachable!());
        FRAME_WORDS - index
    }
}

#[derive(Clone, Debug)]
pub struct InitialFrame {
    pub entry: usize,
    pub finished: usize,
    pub argument: usize,
    /// Base of the diagnostic tags, `None` leaves the spare registers zeroed
    pub tag_base: Option<usize>,
}

impl InitialFrame {
    fn value_of(&self, register: Register) -> usize {
        match register {
            Xpsr => INITIAL_XPSR,
            Pc => self.entry,
            Lr => self.finished,
            General(0) => self.argument,
            General(n) => self.tag_base.map_or(0, |base| base + n as usize),
        }
    }

    /// Writes the frame into the topmost `FRAME_WORDS` words of `stack`.
    ///
    /// Returns the index of the lowest frame word, which is where the saved stack pointer points.
    pub fn write_to(&self, stack: &mut [usize]) -> Result<usize, Error> {
        let bottom = stack
            .len()
            .checked_sub(FRAME_WORDS)
            .ok_or(Error::InvalidParam)?;

        for (word, register) in stack[bottom..].iter_mut().zip(LAYOUT) {
            *word = self.value_of(register);
        }

        Ok(bottom)
    }
}
