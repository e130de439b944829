//! Cortex-M specific code for rotor
//!
//! SysTick is the preemption tick and PendSV is the context-switch trap. Tasks run in unprivileged
//! thread mode on the process stack (PSP); the kernel and both handlers use the main stack (MSP).
//!
//! Supports ARMv6-M and ARMv7-M without floating point registers (`thumbv6m-none-eabi`,
//! `thumbv7m-none-eabi`, `thumbv7em-none-eabi`). The trap saves 16 words per task, which leaves no
//! room for the extended FPU frame.

#![cfg_attr(not(test), no_std)]

#[cfg(all(target_arch = "arm", target_abi = "eabihf"))]
compile_error!("rotor-cortex-m does not save FPU registers, use a soft-float (`eabi`) target");

#[cfg(target_arch = "arm")]
mod port;
#[cfg_attr(not(target_arch = "arm"), allow(dead_code))]
mod systick;

#[cfg(target_arch = "arm")]
pub use port::init;
