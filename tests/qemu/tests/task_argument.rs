//! Test of the first-run context: argument in R0, unprivileged thread mode on the process stack,
//! and the task's own stack memory

#![no_std]
#![no_main]

mod panic_handler;
mod utils;

use core::{
    ops::Range,
    sync::atomic::{AtomicU32, AtomicUsize, Ordering},
};

use cortex_m::register::control::{self, Npriv, Spsel};
use rotor::{Stack, add_task, current_task, task_count};
use semihosting::{println, process::ExitCode};
use static_cell::StaticCell;

const TASKS: usize = 3;
const ARGUMENTS: [usize; TASKS] = [0xA0, 0xB1_B1B1, usize::MAX];

static STACKS: [StaticCell<Stack<1024>>; TASKS] = [const { StaticCell::new() }; TASKS];
static STACK_STARTS: [AtomicUsize; TASKS] = [const { AtomicUsize::new(0) }; TASKS];
static STACK_ENDS: [AtomicUsize; TASKS] = [const { AtomicUsize::new(0) }; TASKS];

static CHECKED: AtomicU32 = AtomicU32::new(0);

#[cortex_m_rt::entry]
fn main() -> ! {
    utils::init_kernel();

    for (id, stack) in STACKS.iter().enumerate() {
        let stack = stack.init(Stack::new());
        let start = stack as *const Stack<1024> as usize;
        STACK_STARTS[id].store(start, Ordering::SeqCst);
        STACK_ENDS[id].store(start + size_of::<Stack<1024>>(), Ordering::SeqCst);

        add_task(task, ARGUMENTS[id], stack).unwrap();
    }

    utils::start();
}

extern "C" fn task(argument: usize) {
    let id = current_task().unwrap();

    if argument != ARGUMENTS[id] {
        fail(id, "argument", argument);
    }

    let control = control::read();
    if control.npriv() != Npriv::Unprivileged {
        fail(id, "privilege", control.bits() as usize);
    }
    if control.spsel() != Spsel::Psp {
        fail(id, "stack selection", control.bits() as usize);
    }

    let local = 0u32;
    let address = core::hint::black_box(&local) as *const u32 as usize;
    let stack = Range {
        start: STACK_STARTS[id].load(Ordering::SeqCst),
        end: STACK_ENDS[id].load(Ordering::SeqCst),
    };
    if !stack.contains(&address) {
        fail(id, "stack address", address);
    }

    if task_count() != Ok(TASKS) {
        fail(id, "task count", task_count().unwrap_or(0));
    }

    let checked = CHECKED.fetch_or(1 << id, Ordering::SeqCst) | (1 << id);
    if checked == (1 << TASKS) - 1 {
        ExitCode::SUCCESS.exit_process();
    }

    loop {
        core::hint::spin_loop();
    }
}

fn fail(id: usize, what: &str, value: usize) -> ! {
    println!("task #{}: unexpected {} ({:#X})", id, what, value);
    ExitCode::FAILURE.exit_process();
}
