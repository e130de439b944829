//! Fixed-capacity task table and the round-robin cursor.
//!
//! Everything here is plain safe code working on indices. The interrupt handlers reach the
//! table through the kernel singleton in [`crate::kernel`].

use heapless::Vec;

use crate::{
    Error, MAX_TASKS,
    frame::{FRAME_BYTES, InitialFrame},
    task::{TaskDescriptor, TaskEntry, TaskState, task_finished},
};

/// Scheduling decision made by a preemption tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Switch {
    pub from: usize,
    pub to: usize,
}

/// What the bootstrap needs to enter the first task.
#[derive(Clone, Debug)]
pub struct Launch {
    pub task: usize,
    /// Top of the task's stack, just above the synthesized frame
    pub stack_pointer: usize,
    pub entry: TaskEntry,
    pub argument: usize,
}

#[derive(Debug)]
pub struct TaskTable {
    tasks: Vec<TaskDescriptor, MAX_TASKS>,
    /// Round-robin cursor
    current: usize,
    /// Task whose registers are on the CPU (or about to be saved)
    running: usize,
    /// Task the pending switch will restore
    next: usize,
}

impl TaskTable {
    pub const fn new() -> Self {
        Self {
            tasks: Vec::new(),
            current: 0,
            running: 0,
            next: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&TaskDescriptor> {
        self.tasks.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &TaskDescriptor> {
        self.tasks.iter()
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn running(&self) -> usize {
        self.running
    }

    pub fn next(&self) -> usize {
        self.next
    }

    /// Appends a task and synthesizes its first-run frame at the top of `stack`.
    ///
    /// Only `stack` and the new descriptor are written. Returns the index of the task.
    pub fn register(
        &mut self,
        entry: TaskEntry,
        argument: usize,
        stack: &mut [usize],
        register_tags: bool,
    ) -> Result<usize, Error> {
        // The last slot is kept as a guard
        if self.tasks.len() >= MAX_TASKS - 1 {
            return Err(Error::NoMem);
        }

        let index = self.tasks.len();
        let frame = InitialFrame {
            entry: entry as usize,
            finished: (task_finished as extern "C" fn() -> !) as usize,
            argument,
            tag_base: register_tags.then_some((index + 1) * 1000),
        };
        let bottom = frame.write_to(stack)?;

        let range = stack.as_mut_ptr_range();
        let descriptor = TaskDescriptor {
            saved_stack_pointer: stack[bottom..].as_ptr() as usize,
            entry,
            argument,
            stack_bottom: range.start as usize,
            stack_top: range.end as usize,
            state: TaskState::NeverRun,
        };

        self.tasks
            .push(descriptor)
            .or(Err(Error::NoMem))?;

        Ok(index)
    }

    /// Marks the task at the cursor as running without going through a context switch.
    ///
    /// The bootstrap calls the entry directly, so the stack pointer handed out skips the frame.
    pub fn launch(&mut self) -> Option<Launch> {
        let index = self.current;
        let task = self.tasks.get_mut(index)?;
        task.state = TaskState::Running;
        self.running = index;
        self.next = index;

        Some(Launch {
            task: index,
            stack_pointer: task.saved_stack_pointer + FRAME_BYTES,
            entry: task.entry,
            argument: task.argument,
        })
    }

    /// Preemption tick: moves the cursor to the next task in registration order.
    ///
    /// `running` is left to the trap. Outside a switch it equals the cursor anyway, and a tick
    /// landing in the middle of a switch must not redirect where the outgoing registers go.
    pub fn advance(&mut self) -> Option<Switch> {
        if self.tasks.is_empty() {
            return None;
        }

        let from = self.current;
        self.current = (self.current + 1) % self.tasks.len();
        self.next = self.current;

        Some(Switch {
            from,
            to: self.current,
        })
    }

    /// Context-switch trap: stores the outgoing stack pointer and returns the incoming one.
    pub fn switch(&mut self, outgoing_sp: usize) -> usize {
        let outgoing = &mut self.tasks[self.running];
        debug_assert!(
            outgoing.holds_frame_at(outgoing_sp),
            "Stack pointer {:#X} outside the stack of task #{}",
            outgoing_sp,
            self.running
        );
        outgoing.saved_stack_pointer = outgoing_sp;
        outgoing.state = TaskState::Suspended;

        let incoming = &mut self.tasks[self.next];
        incoming.state = TaskState::Running;
        self.running = self.next;

        incoming.saved_stack_pointer
    }
}

impl Default for TaskTable {
    fn default() -> Self {
        Self::new()
    }
}
