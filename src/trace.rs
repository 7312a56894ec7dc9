use std::cell::RefCell;
use std::fmt::Write;
use std::rc::Rc;

/// Cloneable in-memory sink for `debug!` traces. Hand one clone to a tree via
/// `new_with_debug_writer` and keep the other to inspect what was written.
#[derive(Clone)]
pub struct TraceBuffer(Rc<RefCell<String>>);

impl Write for TraceBuffer {
    fn write_str(&mut self, s: &str) -> Result<(), std::fmt::Error> {
        self.0.borrow_mut().write_str(s)
    }
}

impl TraceBuffer {
    pub fn new() -> Self {
        TraceBuffer(Rc::new(RefCell::new(String::new())))
    }

    pub fn contents(&self) -> std::cell::Ref<'_, String> {
        self.0.borrow()
    }

    /// Drain the buffer, returning everything written since the last take.
    pub fn take(&self) -> String {
        std::mem::take(&mut *self.0.borrow_mut())
    }
}

impl Default for TraceBuffer {
    fn default() -> Self {
        TraceBuffer::new()
    }
}
