use std::cell::RefCell;

/// Compile-time tree configuration.
pub trait ConfigT {
    /// Emit a trace line for every rotation / splay step.
    const DEBUG: bool;
    /// Re-validate the full structural invariant after every mutation.
    const CHECK_INVARIANTS: bool;
}

pub struct StandardConfig {}
pub struct CheckedConfig {}
pub struct CheckedConfigDebug {}

impl ConfigT for StandardConfig {
    const DEBUG: bool = false;
    const CHECK_INVARIANTS: bool = false;
}

impl ConfigT for CheckedConfig {
    const DEBUG: bool = false;
    const CHECK_INVARIANTS: bool = true;
}

impl ConfigT for CheckedConfigDebug {
    const DEBUG: bool = true;
    const CHECK_INVARIANTS: bool = true;
}

/// Optional sink for `debug!` output, injected at construction time.
pub type DebugWriter = Option<RefCell<Box<dyn std::fmt::Write>>>;

#[macro_export]
macro_rules! debug {
    ($writer:expr, $($arg:tt)+) => {
        if Config::DEBUG {
            match $writer {
                Some(ref w) => {
                    use std::fmt::Write as _;
                    let _ = writeln!(w.borrow_mut(), $($arg)+);
                }
                None => {
                    eprintln!($($arg)+);
                }
            }
        }
    };

    ($($arg:tt)+) => {
        if Config::DEBUG {
            eprintln!($($arg)+);
        }
    };
}
