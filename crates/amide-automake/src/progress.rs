use crossbeam_channel::Sender;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Coarse progress checkpoints emitted while a parse is running.
///
/// Events fire before the corresponding work begins; there is no ordering
/// guarantee beyond that, and callers must not rely on any particular event
/// count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseStatus {
    /// A `Makefile.am` is about to be parsed.
    File { file: PathBuf, directory: PathBuf },
    /// A directory is about to be scanned for source files.
    Directory { directory: PathBuf },
}

/// Cancellation handle shared between a running parse and its callers.
///
/// The token is the only parser state that may be touched from another
/// thread while `parse()` is in flight. Cancellation is one-way: once set,
/// the flag stays set and the parse fails at its next checkpoint.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    pub fn is_canceled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}

/// Best-effort status fan-out; a dropped receiver never blocks the parse.
#[derive(Debug, Clone, Default)]
pub(crate) struct StatusSink {
    sender: Option<Sender<ParseStatus>>,
}

impl StatusSink {
    pub(crate) fn attach(&mut self, sender: Sender<ParseStatus>) {
        self.sender = Some(sender);
    }

    pub(crate) fn emit(&self, status: ParseStatus) {
        if let Some(sender) = &self.sender {
            let _ = sender.send(status);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::unbounded;
    use std::thread;

    #[test]
    fn cancel_is_visible_across_clones_and_threads() {
        let token = CancelToken::new();
        assert!(!token.is_canceled());

        let clone = token.clone();
        let handle = thread::spawn(move || clone.cancel());
        handle.join().expect("cancel thread panicked");

        assert!(token.is_canceled());
    }

    #[test]
    fn sink_without_sender_is_silent() {
        let sink = StatusSink::default();
        sink.emit(ParseStatus::Directory {
            directory: PathBuf::from("somewhere"),
        });
    }

    #[test]
    fn sink_ignores_dropped_receiver() {
        let (sender, receiver) = unbounded();
        let mut sink = StatusSink::default();
        sink.attach(sender);
        drop(receiver);
        sink.emit(ParseStatus::Directory {
            directory: PathBuf::from("somewhere"),
        });
    }

    #[test]
    fn sink_delivers_events() {
        let (sender, receiver) = unbounded();
        let mut sink = StatusSink::default();
        sink.attach(sender);
        sink.emit(ParseStatus::File {
            file: PathBuf::from("Makefile.am"),
            directory: PathBuf::from("."),
        });
        assert_eq!(receiver.len(), 1);
    }
}
