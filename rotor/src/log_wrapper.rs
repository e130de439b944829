#[macro_export]
macro_rules! dispatch_log {
    ( $level:ident, $( $arg:expr ),+ ) => {
        {
            #[cfg(feature = "log")]
            log::$level!( $( $arg ),+ );
            #[cfg(feature = "defmt")]
            defmt::$level!( $( $arg ),+ );
            #[cfg(not(any(feature = "log", feature = "defmt")))]
            {
                let _ = ( $( &($arg) ),+ );
            }
        }
    };
}

#[macro_export]
macro_rules! info {
    ( $( $arg:expr ),+ ) => { $crate::dispatch_log!(info, $( $arg ),+ ) };
}

#[macro_export]
macro_rules! warn {
    ( $( $arg:expr ),+ ) => { $crate::dispatch_log!(warn, $( $arg ),+ ) };
}

#[macro_export]
macro_rules! debug {
    ( $( $arg:expr ),+ ) => { $crate::dispatch_log!(debug, $( $arg ),+ ) };
}

#[macro_export]
macro_rules! trace {
    ( $( $arg:expr ),+ ) => { $crate::dispatch_log!(trace, $( $arg ),+ ) };
}
