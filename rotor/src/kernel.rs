//! The kernel singleton and its entry points.
//!
//! ```text
//! main()
//!   ├─► init()          create the empty task table (once)
//!   ├─► add_task() ×N   register tasks, synthesize their first frames
//!   └─► start()         program the timer, enter task #0 (no return)
//!
//! timer interrupt (highest priority)     handle_tick()      advance the cursor, pend the trap
//! switch trap (lowest priority)          switch_context()   swap saved stack pointers
//! ```

use core::{cell::RefCell, convert::Infallible, sync::atomic::Ordering};

use critical_section::Mutex;
use portable_atomic::{AtomicBool, AtomicU32, AtomicUsize};

use crate::{
    Error, KernelConfig, arch,
    table::{Launch, TaskTable},
    task::{StackAllocation, TaskEntry},
};

static KERNEL: Mutex<RefCell<Option<KernelState>>> = Mutex::new(RefCell::new(None));

// Mirrors of kernel state readable without a critical section. Tasks run unprivileged and
// cannot mask interrupts, so they must not borrow `KERNEL`.
static INITIALIZED: AtomicBool = AtomicBool::new(false);
static TASK_COUNT: AtomicUsize = AtomicUsize::new(0);
static RUNNING: AtomicUsize = AtomicUsize::new(0);
static TICKS: AtomicU32 = AtomicU32::new(0);

#[derive(Debug)]
struct KernelState {
    table: TaskTable,
    config: KernelConfig,
    started: bool,
}

/// Initializes the kernel with the default [`KernelConfig`].
pub fn init() -> Result<(), Error> {
    init_with_config(KernelConfig::default())
}

/// Initializes the kernel. Fails with `WrongState` if it was already initialized.
pub fn init_with_config(config: KernelConfig) -> Result<(), Error> {
    critical_section::with(|cs| {
        let mut state = KERNEL.borrow_ref_mut(cs);
        if state.is_some() {
            // Never re-zero a table that may already be running
            return Err(Error::WrongState);
        }

        *state = Some(KernelState {
            table: TaskTable::new(),
            config,
            started: false,
        });
        INITIALIZED.store(true, Ordering::SeqCst);

        Ok(())
    })?;

    info!("Kernel initialized");

    Ok(())
}

/// Registers a task. Tasks are scheduled in the order they are added.
///
/// The stack must hold at least the 16-word initial frame. Returns the task index.
pub fn add_task<S: StackAllocation>(
    entry: TaskEntry,
    argument: usize,
    stack: S,
) -> Result<usize, Error> {
    let stack = stack.into_words();
    let range = stack.as_ptr_range();

    let task_id = critical_section::with(|cs| {
        let mut state = KERNEL.borrow_ref_mut(cs);
        let Some(state) = state.as_mut() else {
            return Err(Error::WrongState);
        };
        if state.started {
            return Err(Error::WrongState);
        }

        let task_id = state
            .table
            .register(entry, argument, stack, state.config.register_tags)?;
        TASK_COUNT.store(state.table.len(), Ordering::SeqCst);

        Ok(task_id)
    })?;

    info!("Task #{} registered", task_id);
    debug!(
        "Stack from={:X} to={:X}",
        range.start as usize,
        range.end as usize
    );

    Ok(task_id)
}

/// Starts the scheduler and enters the first registered task.
///
/// Only returns on failure: `WrongState` if the kernel is not initialized or has no task,
/// `InvalidParam` if the timer cannot count `tick_interval` (in timer clock cycles).
pub fn start(tick_interval: u32) -> Result<Infallible, Error> {
    let launch = prepare_start(tick_interval)?;

    info!(
        "Kernel started (tick interval {}), entering task #{}",
        tick_interval,
        launch.task
    );

    unsafe { arch::_rotor_launch(launch.stack_pointer, launch.entry, launch.argument) }
}

/// Everything `start` does before leaving the kernel's own context.
pub(crate) fn prepare_start(tick_interval: u32) -> Result<Launch, Error> {
    critical_section::with(|cs| {
        let mut state = KERNEL.borrow_ref_mut(cs);
        let Some(state) = state.as_mut() else {
            return Err(Error::WrongState);
        };
        if state.started || state.table.is_empty() {
            return Err(Error::WrongState);
        }

        if !unsafe { arch::_rotor_setup(tick_interval) } {
            return Err(Error::InvalidParam);
        }

        let launch = state.table.launch().ok_or(Error::WrongState)?;
        RUNNING.store(launch.task, Ordering::SeqCst);
        state.started = true;

        Ok(launch)
    })
}

/// Preemption tick. Called by the port from the periodic timer interrupt.
///
/// Picks the next task and pends the context-switch trap. Saved registers are left alone.
pub fn handle_tick() {
    let switch = critical_section::with(|cs| {
        let mut state = KERNEL.borrow_ref_mut(cs);
        let state = state.as_mut()?;
        if !state.started {
            return None;
        }

        state.table.advance()
    });

    if let Some(switch) = switch {
        // The tick handler is the only writer
        TICKS.store(TICKS.load(Ordering::Relaxed).wrapping_add(1), Ordering::Relaxed);

        trace!("Tick: task #{} -> task #{}", switch.from, switch.to);

        unsafe {
            arch::_rotor_pend_switch();
        }
    }
}

/// Safe half of the context-switch trap.
///
/// The port's trap handler calls this with the outgoing task's stack pointer after pushing the
/// registers the hardware did not save, and continues with the returned incoming one.
pub extern "C" fn switch_context(outgoing_sp: usize) -> usize {
    let (incoming_sp, running) = critical_section::with(|cs| {
        let mut state = KERNEL.borrow_ref_mut(cs);
        let Some(state) = state.as_mut() else {
            panic!("Kernel not initialized")
        };

        let incoming_sp = state.table.switch(outgoing_sp);
        (incoming_sp, state.table.running())
    });
    RUNNING.store(running, Ordering::SeqCst);

    trace!(
        "Context switch: outgoing_sp = {:X}, incoming_sp = {:X}",
        outgoing_sp,
        incoming_sp
    );

    incoming_sp
}

fn ensure_initialized() -> Result<(), Error> {
    if INITIALIZED.load(Ordering::SeqCst) {
        Ok(())
    } else {
        Err(Error::WrongState)
    }
}

/// Number of registered tasks. Safe to call from tasks.
pub fn task_count() -> Result<usize, Error> {
    ensure_initialized()?;
    Ok(TASK_COUNT.load(Ordering::SeqCst))
}

/// Index of the task currently on the CPU. Safe to call from tasks.
pub fn current_task() -> Result<usize, Error> {
    ensure_initialized()?;
    Ok(RUNNING.load(Ordering::SeqCst))
}

/// Preemption ticks since `start`, wrapping.
pub fn ticks() -> u32 {
    TICKS.load(Ordering::Relaxed)
}
