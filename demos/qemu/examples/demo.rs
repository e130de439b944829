//! Three "LEDs" blinking at their own pace, each driven by its own task.
//!
//! Run with `cargo run --example demo`.

#![no_std]
#![no_main]

use core::sync::atomic::{AtomicBool, Ordering};

use log::{error, info};
use panic_semihosting as _;
use rotor::{Error, KernelConfig, Stack, add_task};
use static_cell::StaticCell;

static LOGGER: Logger = Logger;

struct Led {
    name: &'static str,
    /// Busy-wait iterations between toggles
    delay: u32,
}

static LEDS: [Led; 3] = [
    Led { name: "blue", delay: 0x10_0000 },
    Led { name: "red", delay: 0x20_0000 },
    Led { name: "orange", delay: 0x10_0000 },
];
static LED_STATES: [AtomicBool; 3] = [const { AtomicBool::new(false) }; 3];

static STACKS: [StaticCell<Stack<1024>>; 3] = [const { StaticCell::new() }; 3];

/// Context switch roughly every 50 ms at 12 MHz
const TICK_INTERVAL: u32 = 0x8FFFF;

#[cortex_m_rt::entry]
fn main() -> ! {
    log::set_logger(&LOGGER).unwrap();
    log::set_max_level(log::LevelFilter::Info);

    info!("Started");

    let peripherals = cortex_m::Peripherals::take().unwrap();
    trap(rotor_cortex_m::init(
        peripherals.SYST,
        peripherals.SCB,
        KernelConfig::default(),
    ));

    for (led, stack) in STACKS.iter().enumerate() {
        trap(add_task(blink, led, stack.init(Stack::new())));
    }

    let started = trap(rotor::start(TICK_INTERVAL));
    match started {}
}

extern "C" fn blink(led: usize) {
    let Led { name, delay } = &LEDS[led];

    loop {
        let on = !LED_STATES[led].fetch_xor(true, Ordering::Relaxed);
        info!("{} {}", name, if on { "on" } else { "off" });

        busy_wait(*delay);
    }
}

fn busy_wait(iterations: u32) {
    for _ in 0..iterations {
        cortex_m::asm::nop();
    }
}

/// Halts on any kernel error
fn trap<T>(result: Result<T, Error>) -> T {
    match result {
        Ok(value) => value,
        Err(err) => {
            error!("Kernel error: {:?}", err);
            loop {
                cortex_m::asm::nop();
            }
        }
    }
}

struct Logger;

impl log::Log for Logger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &log::Record) {
        if self.enabled(record.metadata()) {
            cortex_m_semihosting::hprintln!("[{}] {}: {}", record.level(), record.target(), record.args())
        }
    }

    fn flush(&self) {}
}
