use std::sync::{Mutex, MutexGuard};

static BUFFER: Mutex<Option<Vec<String>>> = Mutex::new(None);

fn buffer() -> MutexGuard<'static, Option<Vec<String>>> {
    // A panic while holding the lock leaves plain strings behind; still usable
    BUFFER.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Start holding warnings back. Used while the TUI owns the terminal.
pub fn activate() {
    *buffer() = Some(Vec::new());
}

/// Stop buffering and return everything collected.
pub fn drain() -> Vec<String> {
    buffer().take().unwrap_or_default()
}

/// Stop buffering and print the held warnings to stderr.
pub fn flush() {
    for msg in drain() {
        eprintln!("{}", msg);
    }
}

/// Emit a warning: stored while buffering is active, printed otherwise.
pub fn warn(msg: String) {
    let mut guard = buffer();
    if let Some(buf) = guard.as_mut() {
        buf.push(msg);
    } else {
        drop(guard);
        eprintln!("{}", msg);
    }
}

/// `eprintln!` that respects the stderr buffer.
#[macro_export]
macro_rules! buffered_eprintln {
    ($($arg:tt)*) => {
        $crate::stderr_buffer::warn(format!($($arg)*))
    };
}
