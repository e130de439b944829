//! Test of the rotation order: every tick hands the CPU to the next task in registration order

#![no_std]
#![no_main]

mod panic_handler;
mod utils;

use core::sync::atomic::{AtomicUsize, Ordering};

use rotor::{Stack, add_task, ticks};
use semihosting::{print, println, process::ExitCode};
use static_cell::StaticCell;

const TASKS: usize = 3;
const SLICES: usize = 30;

static STACKS: [StaticCell<Stack<1024>>; TASKS] = [const { StaticCell::new() }; TASKS];

/// Task seen running in each time slice, indexed by the tick count
static SLICE_OWNERS: [AtomicUsize; SLICES] = [const { AtomicUsize::new(usize::MAX) }; SLICES];

#[cortex_m_rt::entry]
fn main() -> ! {
    utils::init_kernel();

    for (id, stack) in STACKS.iter().enumerate() {
        let task_id = add_task(task, id, stack.init(Stack::new())).unwrap();
        assert_eq!(task_id, id);
    }

    utils::start();
}

extern "C" fn task(id: usize) {
    loop {
        // The tick that advances the count also takes the CPU away, so the slice is still ours
        // even if we get preempted before the store
        let slice = ticks() as usize;
        if slice < SLICES {
            SLICE_OWNERS[slice].store(id, Ordering::SeqCst);
        } else if slice >= SLICES + TASKS {
            check();
        }
    }
}

fn check() -> ! {
    let in_order = SLICE_OWNERS
        .iter()
        .enumerate()
        .all(|(slice, owner)| owner.load(Ordering::SeqCst) == slice % TASKS);

    if in_order {
        ExitCode::SUCCESS.exit_process();
    }

    for owner in SLICE_OWNERS.iter() {
        print!("{} ", owner.load(Ordering::SeqCst));
    }
    println!("");
    ExitCode::FAILURE.exit_process();
}
