//! Reports the panic over semihosting and fails the test. Linked by `mod panic_handler;`.

use core::panic::PanicInfo;

use semihosting::{println, process::ExitCode};

#[panic_handler]
fn panic_handler(info: &PanicInfo<'_>) -> ! {
    println!("{:?}", info);
    ExitCode::FAILURE.exit_process();
}
