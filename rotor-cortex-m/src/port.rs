use cortex_m::peripheral::{SCB, SYST, scb::SystemHandler, syst::SystClkSource};
use rotor::{Error, KernelConfig, TaskEntry};

use crate::systick;

/// ENABLE bit of the SysTick control and status register
const SYST_CSR_ENABLE: u32 = 1 << 0;

/// Lowest possible priority
const PENDSV_PRIORITY: u8 = 0xFF;
/// Highest possible priority
const SYSTICK_PRIORITY: u8 = 0x00;

/// Safely initializes the kernel.
///
/// Takes SysTick and SCB so that nothing else reconfigures the timer or the exception priorities
/// the scheduler relies on.
pub fn init(_syst: SYST, _scb: SCB, config: KernelConfig) -> Result<(), Error> {
    rotor::init_with_config(config)
}

/// Context switching procedure
///
/// Uses only ARMv6-M instructions, so that every supported core stores the same 16-word layout:
/// R8-R11 at the lowest addresses, then R4-R7, then the hardware-saved frame.
#[unsafe(no_mangle)]
#[unsafe(naked)]
extern "C" fn PendSV() {
    // Registers {R0-R3, R12, LR, PC, xPSR} are saved in the process stack by the hardware
    core::arch::naked_asm!(
        "cpsid i",      // Keep the tick out while MSP points into a task stack

        "mrs r0, psp",  // Read the process stack pointer (PSP, because the SP is MSP now)

        "mov r1, sp",   // Temporarily save SP (MSP) in R1
        "mov sp, r0",   // Set SP (MSP) to the loaded PSP value

        "push {{r4-r7}}", // Save the lower half of the remaining registers in the process stack
        // Copy the higher half of the remaining registers into the lower half
        "mov r4, r8",
        "mov r5, r9",
        "mov r6, r10",
        "mov r7, r11",
        "push {{r4-r7}}", // Save the copied registers values in the process stack

        "mov r0, sp",   // Outgoing stack pointer, first argument of `switch_context`

        "mov sp, r1",   // Restore the value of original SP (MSP)

        "push {{r3, lr}}",  // Save EXC_RETURN (R3 only keeps the main stack 8-byte aligned)
        "bl {switch_context}",  // R0 becomes the incoming stack pointer
        "pop {{r2, r3}}",   // EXC_RETURN into R3

        "mov r1, sp",   // Temporarily save SP (MSP) in R1
        "mov sp, r0",   // Set SP (MSP) to the returned PSP value

        "pop {{r4-r7}}",  // Load the values of R8-R11 from the process stack to R4-R7
        // Restore R8-R11 from the loaded values
        "mov r8, r4",
        "mov r9, r5",
        "mov r10, r6",
        "mov r11, r7",
        "pop {{r4-r7}}",    // Restore R4-R7 from the process stack

        "mov r0, sp",   // Stack pointer just above the manually saved registers
        "mov sp, r1",   // Restore the value of original SP (MSP)

        "msr psp, r0",  // Set the PSP to the value of R0

        "cpsie i",
        "bx r3",    // Exit the exception handler by jumping to EXC_RETURN
        switch_context = sym rotor::kernel::switch_context,
    );
    // Hardware restores registers R0-R3, R12, LR, PC and xPSR from the new stack
}

#[cortex_m_rt::exception]
fn SysTick() {
    rotor::kernel::handle_tick();
}

/// INTERNAL USE ONLY
#[unsafe(no_mangle)]
pub fn _rotor_setup(tick_interval: u32) -> bool {
    let Some(reload) = systick::reload_value(tick_interval) else {
        return false;
    };

    let peripherals = unsafe { cortex_m::Peripherals::steal() };
    let mut scb = peripherals.SCB;
    let mut syst = peripherals.SYST;

    // On armv6m `set_priority` is not atomic
    critical_section::with(|_| unsafe {
        // The trap only runs once every other handler, including the tick, has finished
        scb.set_priority(SystemHandler::PendSV, PENDSV_PRIORITY);
        scb.set_priority(SystemHandler::SysTick, SYSTICK_PRIORITY);
    });

    // Configure the SysTick timer. `_rotor_launch` starts it.
    syst.disable_counter();
    syst.set_clock_source(SystClkSource::Core);
    syst.set_reload(reload);
    syst.clear_current();
    syst.enable_interrupt();

    true
}

/// INTERNAL USE ONLY
#[unsafe(no_mangle)]
pub fn _rotor_pend_switch() {
    SCB::set_pendsv();
}

/// INTERNAL USE ONLY
#[unsafe(no_mangle)]
pub fn _rotor_launch(stack_pointer: usize, entry: TaskEntry, argument: usize) -> ! {
    let finished = rotor::task_finished as extern "C" fn() -> !;
    let syst_csr = SYST::PTR as usize;
    let csr_value = unsafe { (*SYST::PTR).csr.read() } | SYST_CSR_ENABLE;

    // The timer starts only after thread mode runs on the PSP, so a tick arriving before the
    // privilege drop already saves a consistent context for task #0.
    unsafe {
        core::arch::asm!(
            "msr psp, r1",      // Process stack = top of the first task's stack
            "movs r1, #2",      // CONTROL.SPSEL: thread mode uses PSP
            "msr control, r1",
            "isb",
            "str r3, [r2]",     // Start the SysTick counter
            "movs r1, #3",      // CONTROL.nPRIV | CONTROL.SPSEL
            "msr control, r1",
            "isb",
            "mov lr, r5",       // Returning from the entry lands in the finished trap
            "bx r4",            // entry(argument), R0 already holds the argument
            in("r0") argument,
            in("r1") stack_pointer,
            in("r2") syst_csr,
            in("r3") csr_value,
            in("r4") entry as usize,
            in("r5") finished as usize,
            options(noreturn),
        );
    }
}
