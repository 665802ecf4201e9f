//! Console log macros for the flight computer.
//!
//! Every line carries a coloured level tag and the UTC wall-clock time. The console is
//! the only output that is guaranteed to work on the pad, so these macros never fail.

#[doc(hidden)]
#[macro_export]
macro_rules! __console_line {
    ($colour:literal, $tag:literal, $($arg:tt)*) => {
        println!(
            concat!("\x1b[", $colour, "m", $tag, "[{}]\x1b[0m {}"),
            chrono::Utc::now().format("%H:%M:%S"),
            format!($($arg)*)
        )
    };
}

#[macro_export]
macro_rules! info {
    ($($arg:tt)*) => { $crate::__console_line!("32", "[INFO] ", $($arg)*) };
}

#[macro_export]
macro_rules! log {
    ($($arg:tt)*) => { $crate::__console_line!("33", "[LOG]  ", $($arg)*) };
}

#[macro_export]
macro_rules! warn {
    ($($arg:tt)*) => { $crate::__console_line!("35", "[WARN] ", $($arg)*) };
}

#[macro_export]
macro_rules! error {
    ($($arg:tt)*) => { $crate::__console_line!("31", "[ERROR]", $($arg)*) };
}

/// Stage changes. Always printed, independent of the logging mode.
#[macro_export]
macro_rules! stage {
    ($($arg:tt)*) => { $crate::__console_line!("1;34", "[STAGE]", $($arg)*) };
}

/// Per-iteration diagnostics, only printed when `LOG_FLIGHT_EVENTS` is set.
#[macro_export]
macro_rules! event {
    ($($arg:tt)*) => {
        if std::env::var("LOG_FLIGHT_EVENTS").is_ok() {
            $crate::__console_line!("36", "[EVENT]", $($arg)*)
        }
    };
}

/// Telemetry rows in transient mode. Printed bare so the console stream stays parseable.
#[macro_export]
macro_rules! telemetry {
    ($($arg:tt)*) => { println!($($arg)*) };
}
