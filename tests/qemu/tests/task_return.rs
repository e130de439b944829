//! Test of a task returning from its entry function: it stays parked while the others keep
//! getting their time slices

#![no_std]
#![no_main]

mod panic_handler;
mod utils;

use core::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use rotor::{Stack, add_task, ticks};
use semihosting::{println, process::ExitCode};
use static_cell::StaticCell;

static RETURNING_STACK: StaticCell<Stack<1024>> = StaticCell::new();
static COUNTING_STACK: StaticCell<Stack<1024>> = StaticCell::new();
static WATCHING_STACK: StaticCell<Stack<1024>> = StaticCell::new();

static RETURNED: AtomicBool = AtomicBool::new(false);
static COUNTER: AtomicU32 = AtomicU32::new(0);

#[cortex_m_rt::entry]
fn main() -> ! {
    utils::init_kernel();

    add_task(returning, 0, RETURNING_STACK.init(Stack::new())).unwrap();
    add_task(counting, 0, COUNTING_STACK.init(Stack::new())).unwrap();
    add_task(watching, 0, WATCHING_STACK.init(Stack::new())).unwrap();

    utils::start();
}

extern "C" fn returning(_: usize) {
    RETURNED.store(true, Ordering::SeqCst);
}

extern "C" fn counting(_: usize) {
    loop {
        COUNTER.fetch_add(1, Ordering::SeqCst);
    }
}

extern "C" fn watching(_: usize) {
    wait_ticks(10);
    let before = COUNTER.load(Ordering::SeqCst);
    wait_ticks(10);
    let after = COUNTER.load(Ordering::SeqCst);

    if !RETURNED.load(Ordering::SeqCst) {
        println!("first task never ran");
        ExitCode::FAILURE.exit_process();
    }
    if after == before {
        println!("counting task stalled at {}", after);
        ExitCode::FAILURE.exit_process();
    }

    ExitCode::SUCCESS.exit_process();
}

fn wait_ticks(count: u32) {
    let start = ticks();
    while ticks().wrapping_sub(start) < count {
        core::hint::spin_loop();
    }
}
