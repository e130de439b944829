//! Interface for architecture-dependent functions implemented in separate crates.

use crate::task::TaskEntry;

unsafe extern "Rust" {
    /// INTERNAL USE ONLY
    ///
    /// Gives the context-switch trap the lowest and the tick the highest priority, then programs
    /// the periodic timer without starting it. Returns `false` if the timer cannot count
    /// `tick_interval`.
    pub unsafe fn _rotor_setup(tick_interval: u32) -> bool;
    /// INTERNAL USE ONLY
    pub unsafe fn _rotor_pend_switch();
    /// INTERNAL USE ONLY
    ///
    /// Moves to the unprivileged thread mode on the process stack at `stack_pointer`, starts the
    /// timer and calls `entry(argument)` with the finished trap as its return address.
    pub unsafe fn _rotor_launch(stack_pointer: usize, entry: TaskEntry, argument: usize) -> !;
}
