//! All about `Stats`.

use std::fmt::{Display, Formatter};
use std::ops::Add;

use serde::Serialize;

/// Counters kept by the stream supervisors and the dashboard.
///
/// - `pkts`: messages received
/// - `bytes`: payload bytes received
/// - `reconnect`: reconnection attempts
/// - `frames`: video frames presented
/// - `applied`: records merged into the store
/// - `dropped`: records rejected
/// - `err`: transport or backend errors
///
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Stats {
    pub pkts: u64,
    pub bytes: u64,
    pub reconnect: usize,
    pub frames: u64,
    pub applied: u64,
    pub dropped: u64,
    pub err: u32,
}

impl Display for Stats {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "pkts={} bytes={} reconnect={} frames={} applied={} dropped={} errors={}",
            self.pkts,
            self.bytes,
            self.reconnect,
            self.frames,
            self.applied,
            self.dropped,
            self.err
        )
    }
}

impl Add for Stats {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Stats {
            pkts: self.pkts + rhs.pkts,
            bytes: self.bytes + rhs.bytes,
            reconnect: self.reconnect + rhs.reconnect,
            frames: self.frames + rhs.frames,
            applied: self.applied + rhs.applied,
            dropped: self.dropped + rhs.dropped,
            err: self.err + rhs.err,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_add() {
        let a = Stats {
            pkts: 10,
            bytes: 1000,
            reconnect: 1,
            ..Default::default()
        };
        let b = Stats {
            pkts: 5,
            frames: 3,
            err: 2,
            ..Default::default()
        };
        let c = a + b;

        assert_eq!(15, c.pkts);
        assert_eq!(1000, c.bytes);
        assert_eq!(1, c.reconnect);
        assert_eq!(3, c.frames);
        assert_eq!(2, c.err);
    }

    #[test]
    fn test_stats_display() {
        let s = Stats::default();
        assert_eq!(
            "pkts=0 bytes=0 reconnect=0 frames=0 applied=0 dropped=0 errors=0",
            s.to_string()
        );
    }
}
