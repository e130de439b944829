use rotor::KernelConfig;

/// SysTick reload for the tests, in core clock cycles (12 MHz on lm3s6965evb)
pub const TICK_INTERVAL: u32 = 12_000;

pub fn init_kernel() {
    let peripherals = cortex_m::Peripherals::take().unwrap();
    rotor_cortex_m::init(peripherals.SYST, peripherals.SCB, KernelConfig::default()).unwrap();
}

/// Enters task #0. Only returns here if the kernel refused to start.
pub fn start() -> ! {
    let Err(error) = rotor::start(TICK_INTERVAL);
    panic!("start failed: {:?}", error);
}
