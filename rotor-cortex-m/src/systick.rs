/// Largest value of the 24-bit SysTick reload register.
pub(crate) const MAX_RELOAD: u32 = 0x00FF_FFFF;

/// Reload value for an interrupt every `tick_interval` core clock cycles.
///
/// Accepts the same range as CMSIS `SysTick_Config`.
pub(crate) fn reload_value(tick_interval: u32) -> Option<u32> {
    let reload = tick_interval.checked_sub(1)?;
    (reload <= MAX_RELOAD).then_some(reload)
}
