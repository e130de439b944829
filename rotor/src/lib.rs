//! Minimal preemptive multitasking for single-core microcontrollers.
//!
//! A fixed set of tasks, each with its own stack, is scheduled round-robin.
//! A periodic timer interrupt (the preemption tick) picks the next task and
//! pends a lowest-priority trap which performs the actual register save and
//! restore. Tasks never yield; they run until preempted.
//!
//! This crate is the architecture-independent part. The processor-specific
//! handlers live in a port crate such as `rotor-cortex-m`.
//!
//! ```ignore
//! rotor::init()?;
//! rotor::add_task(blink, 0, STACK1.init(Stack::new()))?;
//! rotor::add_task(blink, 1, STACK2.init(Stack::new()))?;
//! rotor::start(0x8FFFF)?;
//! ```

#![cfg_attr(not(test), no_std)]

#[macro_use]
mod log_wrapper;

pub mod arch;
pub mod config;
pub mod frame;
pub mod kernel;
pub mod table;
pub mod task;

pub use config::{KernelConfig, MAX_TASKS};
pub use kernel::{add_task, current_task, init, init_with_config, start, task_count, ticks};
pub use task::{Stack, StackAllocation, TaskEntry, TaskState, task_finished};

pub use portable_atomic;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// Operation called out of order (before `init`, `init` twice, after `start`)
    WrongState,
    /// The task table is full
    NoMem,
    /// The timer rejected the tick interval, or a stack is too small
    InvalidParam,
}
