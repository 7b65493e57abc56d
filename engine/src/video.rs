//! Video frames from the binary stream.
//!
//! Every frame gets a transient handle from a `FrameSink` (a file, a texture, an object URL…).
//! The `FrameSlot` holds the one being displayed and releases it right before the next one is
//! created, and on drop.  A handle is never released twice and never leaks.
//!

use std::fmt::{Debug, Display, Formatter};

use eyre::Result;
use tracing::trace;

/// Opaque reference to a displayable frame.
///
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct FrameHandle(pub String);

impl Display for FrameHandle {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Where frames end up.
///
pub trait FrameSink {
    /// Turn raw frame bytes into a handle.
    fn create(&mut self, data: &[u8]) -> Result<FrameHandle>;
    /// Free the resources behind `handle`.
    fn release(&mut self, handle: FrameHandle);
}

pub struct FrameSlot {
    sink: Box<dyn FrameSink>,
    current: Option<FrameHandle>,
}

impl Debug for FrameSlot {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameSlot")
            .field("current", &self.current)
            .finish()
    }
}

impl FrameSlot {
    pub fn new(sink: Box<dyn FrameSink>) -> Self {
        FrameSlot {
            sink,
            current: None,
        }
    }

    /// Replace the current frame with a new one made from `data`.
    ///
    pub fn present(&mut self, data: &[u8]) -> Result<&FrameHandle> {
        if let Some(old) = self.current.take() {
            trace!("release {old}");
            self.sink.release(old);
        }
        let handle = self.sink.create(data)?;
        Ok(self.current.insert(handle))
    }

    pub fn current(&self) -> Option<&FrameHandle> {
        self.current.as_ref()
    }
}

impl Drop for FrameSlot {
    fn drop(&mut self) {
        if let Some(last) = self.current.take() {
            trace!("release {last} on drop");
            self.sink.release(last);
        }
    }
}

/// Sink that keeps nothing, used when no frame output is configured.
///
#[derive(Debug, Default)]
pub struct NullSink {
    count: u64,
}

impl FrameSink for NullSink {
    fn create(&mut self, data: &[u8]) -> Result<FrameHandle> {
        self.count += 1;
        Ok(FrameHandle(format!("frame-{}-{}", self.count, data.len())))
    }

    fn release(&mut self, _handle: FrameHandle) {}
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::rc::Rc;

    use eyre::eyre;

    use super::*;

    #[derive(Debug, Default)]
    struct Ledger {
        ops: Vec<String>,
        live: HashMap<FrameHandle, usize>,
    }

    /// Counts creations and releases, refuses empty frames.
    ///
    #[derive(Debug, Default)]
    struct Counting {
        next: usize,
        ledger: Rc<RefCell<Ledger>>,
    }

    impl FrameSink for Counting {
        fn create(&mut self, data: &[u8]) -> Result<FrameHandle> {
            if data.is_empty() {
                return Err(eyre!("empty frame"));
            }
            self.next += 1;
            let h = FrameHandle(format!("f{}", self.next));
            let mut l = self.ledger.borrow_mut();
            l.ops.push(format!("create {h}"));
            l.live.insert(h.clone(), 1);
            Ok(h)
        }

        fn release(&mut self, handle: FrameHandle) {
            let mut l = self.ledger.borrow_mut();
            l.ops.push(format!("release {handle}"));
            let n = l.live.get_mut(&handle).expect("unknown handle");
            assert_eq!(1, *n, "{handle} released twice");
            *n = 0;
        }
    }

    #[test]
    fn test_release_before_next_create() {
        let ledger = Rc::new(RefCell::new(Ledger::default()));
        {
            let mut slot = FrameSlot::new(Box::new(Counting {
                next: 0,
                ledger: ledger.clone(),
            }));
            assert_eq!(&FrameHandle("f1".into()), slot.present(b"jpeg1").unwrap());
            slot.present(b"jpeg2").unwrap();
            slot.present(b"jpeg3").unwrap();
            assert_eq!(Some(&FrameHandle("f3".into())), slot.current());
        }

        let l = ledger.borrow();
        assert_eq!(
            vec![
                "create f1",
                "release f1",
                "create f2",
                "release f2",
                "create f3",
                "release f3"
            ],
            l.ops
        );
        assert!(l.live.values().all(|n| *n == 0));
    }

    #[test]
    fn test_failed_create_leaves_nothing_to_release() {
        let ledger = Rc::new(RefCell::new(Ledger::default()));
        {
            let mut slot = FrameSlot::new(Box::new(Counting {
                next: 0,
                ledger: ledger.clone(),
            }));
            slot.present(b"jpeg1").unwrap();
            assert!(slot.present(b"").is_err());
            assert!(slot.current().is_none());
        }
        assert_eq!(vec!["create f1", "release f1"], ledger.borrow().ops);
    }

    #[test]
    fn test_null_sink() {
        let mut slot = FrameSlot::new(Box::<NullSink>::default());
        let h = slot.present(&[0xff, 0xd8, 0xff]).unwrap();
        assert_eq!("frame-1-3", h.to_string());
    }
}
