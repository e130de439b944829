//! Task descriptors and stacks.

use crate::frame::FRAME_BYTES;

/// Entry point of a task. Receives the argument given at registration.
///
/// A task is expected to run forever. If it returns, it lands in [`task_finished`].
pub type TaskEntry = extern "C" fn(argument: usize);

/// Lifecycle of a task as seen by the scheduler.
///
/// ```text
///   NeverRun --(bootstrap or first switch)--> Running <--(switch)--> Suspended
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TaskState {
    /// The stack holds the synthesized frame
    NeverRun,
    Running,
    /// The stack holds the registers saved by the last context switch
    Suspended,
}

/// Saved state of one task.
#[derive(Clone, Debug)]
pub struct TaskDescriptor {
    pub(crate) saved_stack_pointer: usize,
    pub(crate) entry: TaskEntry,
    pub(crate) argument: usize,
    pub(crate) stack_bottom: usize,
    pub(crate) stack_top: usize,
    pub(crate) state: TaskState,
}

impl TaskDescriptor {
    pub fn saved_stack_pointer(&self) -> usize {
        self.saved_stack_pointer
    }

    pub fn entry(&self) -> TaskEntry {
        self.entry
    }

    pub fn argument(&self) -> usize {
        self.argument
    }

    /// Address range of the stack given at registration.
    pub fn stack_range(&self) -> core::ops::Range<usize> {
        self.stack_bottom..self.stack_top
    }

    pub fn state(&self) -> TaskState {
        self.state
    }

    /// Whether a full frame saved at `sp` lies inside this task's stack.
    pub(crate) fn holds_frame_at(&self, sp: usize) -> bool {
        sp >= self.stack_bottom && sp + FRAME_BYTES <= self.stack_top
    }
}

/// Trait for a `'static` buffer usable as a task stack.
pub trait StackAllocation {
    fn into_words(self) -> &'static mut [usize];
}

/// Stack of `N` machine words, aligned at 8 bytes as AAPCS requires.
///
/// Keep `N` even so that the top of the stack stays 8-byte aligned.
#[repr(C, align(8))]
pub struct Stack<const N: usize>([usize; N]);

impl<const N: usize> Stack<N> {
    pub const fn new() -> Self {
        Self([0; N])
    }
}

impl<const N: usize> Default for Stack<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> StackAllocation for &'static mut Stack<N> {
    fn into_words(self) -> &'static mut [usize] {
        &mut self.0
    }
}

impl<const N: usize> StackAllocation for &'static mut [usize; N] {
    fn into_words(self) -> &'static mut [usize] {
        self
    }
}

impl StackAllocation for &'static mut [usize] {
    fn into_words(self) -> &'static mut [usize] {
        self
    }
}

/// Landing point of a task whose entry function returned.
///
/// Every synthesized frame uses this as the link register. It never returns and the task's slot
/// keeps being scheduled; the slot just spins here.
pub extern "C" fn task_finished() -> ! {
    if let Ok(id) = crate::kernel::current_task() {
        warn!("Task #{} returned", id);
    }

    loop {
        core::hint::spin_loop();
    }
}
