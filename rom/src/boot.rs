use core::panic::PanicInfo;

use crate::{board, main};

#[panic_handler]
fn panic(_panic: &PanicInfo<'_>) -> ! {
    board::halt()
}

unsafe extern "C" {
    pub unsafe fn reset_entry();

    pub unsafe fn null_interrupt();

    pub unsafe fn timer1_a0_isr();

    unsafe static __data_load: u8;
    unsafe static mut __data_start: u8;
    unsafe static mut __data_end: u8;

    unsafe static mut __bss_start: u8;
    unsafe static mut __bss_end: u8;
}

#[inline(always)]
unsafe fn init_data_and_bss() {
    unsafe {
        // Copy .data from flash to RAM
        let mut src = &__data_load as *const u8;
        let mut dst = &raw mut __data_start as *mut u8;
        let end = &raw mut __data_end as *mut u8;
        while dst < end {
            dst.write_volatile(src.read_volatile());
            src = src.add(1);
            dst = dst.add(1);
        }

        // Zero .bss
        let mut bss = &raw mut __bss_start as *mut u8;
        let bss_end = &raw mut __bss_end as *mut u8;
        while bss < bss_end {
            bss.write_volatile(0);
            bss = bss.add(1);
        }
    }
}

/// 0xFFE0..=0xFFFE, lowest priority first.
#[unsafe(link_section = ".vector_table")]
#[unsafe(no_mangle)]
pub static _VECTOR_TABLE: [unsafe extern "C" fn(); 16] = [
    null_interrupt, // 0xFFE0 unused
    null_interrupt, // 0xFFE2 unused
    null_interrupt, // 0xFFE4 PORT1
    null_interrupt, // 0xFFE6 PORT2
    null_interrupt, // 0xFFE8 unused
    null_interrupt, // 0xFFEA ADC10
    null_interrupt, // 0xFFEC USCIAB0TX
    null_interrupt, // 0xFFEE USCIAB0RX
    null_interrupt, // 0xFFF0 TIMER0_A1
    null_interrupt, // 0xFFF2 TIMER0_A0
    null_interrupt, // 0xFFF4 WDT
    null_interrupt, // 0xFFF6 COMPARATORA
    null_interrupt, // 0xFFF8 TIMER1_A1
    timer1_a0_isr,  // 0xFFFA TIMER1_A0
    null_interrupt, // 0xFFFC NMI
    reset_entry,    // 0xFFFE RESET
];

#[unsafe(no_mangle)]
unsafe extern "C" fn __boot() {
    unsafe {
        board::hold_watchdog();
        init_data_and_bss();
    }
    main()
}
