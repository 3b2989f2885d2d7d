//! `tangotool` building blocks: word sources backed by local files and the
//! network, plus the subcommand implementations.

/// Unwrap `$result` or print the message to stderr and exit with status 1.
macro_rules! die {
    ($result:expr, $($arg:tt)*) => {
        $result.unwrap_or_else(|e| {
            eprintln!($($arg)*, e);
            std::process::exit(1);
        })
    };
}

pub mod commands {
    pub mod config_ops;
    pub mod drill_ops;
    pub mod revision_ops;
    pub mod source_ops;
}
pub mod word_source;
