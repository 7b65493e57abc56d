//! Stream supervision.
//!
//! A `Supervisor` keeps one stream connected forever: when the connection fails or closes, it
//! waits `RECONNECT_DELAY` and tries again, no backoff and no retry cap.  Everything received is
//! forwarded as an `Event`, and outbound commands (data stream only) are written as they come.
//!
//! The transport is behind the `Connector`/`Link` pair so that the loop can be tested with a
//! fake one and tokio's paused clock.  The wait is cancelled by the shutdown channel.
//!

use std::future::pending;
use std::time::Duration;

use tokio::sync::mpsc::{Sender, UnboundedReceiver};
use tokio::sync::watch;
use tokio::time::sleep;
use tracing::{debug, info, trace, warn};

use crate::{Channel, Event, LinkState, Stats, StreamError};

/// Fixed delay between two connection attempts.
pub const RECONNECT_DELAY: Duration = Duration::from_secs(3);

/// One message from a link.
///
#[derive(Clone, Debug, PartialEq)]
pub enum Incoming {
    Text(String),
    Binary(Vec<u8>),
}

/// An established connection.
///
#[allow(async_fn_in_trait)]
pub trait Link {
    /// Next message, `None` when the remote closed the connection.
    async fn recv(&mut self) -> Option<Result<Incoming, StreamError>>;
    async fn send(&mut self, text: String) -> Result<(), StreamError>;
}

/// Something able to open a `Link`.
///
#[allow(async_fn_in_trait)]
pub trait Connector {
    type Link: Link;

    async fn connect(&mut self) -> Result<Self::Link, StreamError>;
    /// Where we connect to, for logging.
    fn target(&self) -> String;
}

/// Why a session ended.
///
#[derive(Debug, PartialEq)]
enum Exit {
    /// Connection lost, try again.
    Lost,
    /// Shutdown requested or nobody listening anymore.
    Stop,
}

pub struct Supervisor<C: Connector> {
    channel: Channel,
    connector: C,
    events: Sender<Event>,
    outbound: Option<UnboundedReceiver<String>>,
    shutdown: watch::Receiver<bool>,
    delay: Duration,
    stats: Stats,
}

/// Wait for the next outbound message, forever if there is no outbound channel.
///
async fn next_out(rx: &mut Option<UnboundedReceiver<String>>) -> Option<String> {
    match rx {
        Some(rx) => rx.recv().await,
        None => pending().await,
    }
}

impl<C: Connector> Supervisor<C> {
    pub fn new(
        channel: Channel,
        connector: C,
        events: Sender<Event>,
        shutdown: watch::Receiver<bool>,
    ) -> Self {
        Supervisor {
            channel,
            connector,
            events,
            outbound: None,
            shutdown,
            delay: RECONNECT_DELAY,
            stats: Stats::default(),
        }
    }

    /// Write everything received on `rx` to the link.
    ///
    pub fn with_outbound(mut self, rx: UnboundedReceiver<String>) -> Self {
        self.outbound = Some(rx);
        self
    }

    /// Connect, pump, wait, repeat.  Only returns on shutdown.
    ///
    #[tracing::instrument(skip(self), fields(channel = %self.channel))]
    pub async fn run(mut self) -> Stats {
        let mut attempt = 0usize;

        loop {
            if *self.shutdown.borrow() {
                break;
            }
            if attempt > 0 {
                self.stats.reconnect += 1;
            }
            attempt += 1;

            trace!("connecting to {}", self.connector.target());
            let res = tokio::select! {
                res = self.connector.connect() => res,
                _ = self.shutdown.changed() => break,
            };

            match res {
                Ok(link) => {
                    info!("{} stream connected", self.channel);
                    if !self.notify(LinkState::Up).await {
                        break;
                    }
                    if self.pump(link).await == Exit::Stop {
                        break;
                    }
                    if !self.notify(LinkState::Down).await {
                        break;
                    }
                }
                Err(e) => {
                    warn!("{e}");
                    self.stats.err += 1;
                }
            }

            info!("reconnecting in {}s", self.delay.as_secs());
            tokio::select! {
                _ = sleep(self.delay) => (),
                _ = self.shutdown.changed() => break,
            }
        }
        debug!("{} supervisor done: {}", self.channel, self.stats);
        self.stats
    }

    /// Move messages both ways until the link goes away.
    ///
    async fn pump(&mut self, mut link: C::Link) -> Exit {
        loop {
            tokio::select! {
                msg = link.recv() => {
                    let ev = match msg {
                        Some(Ok(Incoming::Text(text))) => {
                            self.stats.pkts += 1;
                            self.stats.bytes += text.len() as u64;
                            Event::Text(text)
                        }
                        Some(Ok(Incoming::Binary(data))) => {
                            self.stats.pkts += 1;
                            self.stats.bytes += data.len() as u64;
                            Event::Frame(data)
                        }
                        Some(Err(e)) => {
                            warn!("{e}");
                            self.stats.err += 1;
                            return Exit::Lost;
                        }
                        None => {
                            info!("{} stream closed by remote", self.channel);
                            return Exit::Lost;
                        }
                    };
                    if self.events.send(ev).await.is_err() {
                        return Exit::Stop;
                    }
                }
                out = next_out(&mut self.outbound) => {
                    match out {
                        Some(text) => {
                            trace!("out: {text}");
                            if let Err(e) = link.send(text).await {
                                warn!("{e}");
                                self.stats.err += 1;
                                return Exit::Lost;
                            }
                        }
                        None => {
                            debug!("outbound channel closed");
                            self.outbound = None;
                        }
                    }
                }
                _ = self.shutdown.changed() => return Exit::Stop,
            }
        }
    }

    /// Tell the dashboard, `false` if it is gone.
    ///
    async fn notify(&self, state: LinkState) -> bool {
        self.events
            .send(Event::Link(self.channel, state))
            .await
            .is_ok()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::collections::VecDeque;
    use std::rc::Rc;

    use tokio::sync::mpsc::{channel, unbounded_channel};
    use tokio::time::Instant;

    use super::*;

    /// What the next connection attempt does.
    ///
    enum Script {
        Fail,
        /// Deliver these, then close (or stay open if `hold`)
        Session { incoming: Vec<Incoming>, hold: bool },
    }

    #[derive(Default)]
    struct Shared {
        attempts: Vec<Instant>,
        sent: Vec<String>,
    }

    struct Fake {
        script: VecDeque<Script>,
        shared: Rc<RefCell<Shared>>,
    }

    struct FakeLink {
        incoming: VecDeque<Incoming>,
        hold: bool,
        shared: Rc<RefCell<Shared>>,
    }

    impl Link for FakeLink {
        async fn recv(&mut self) -> Option<Result<Incoming, StreamError>> {
            match self.incoming.pop_front() {
                Some(m) => Some(Ok(m)),
                None if self.hold => pending().await,
                None => None,
            }
        }

        async fn send(&mut self, text: String) -> Result<(), StreamError> {
            self.shared.borrow_mut().sent.push(text);
            Ok(())
        }
    }

    impl Connector for Fake {
        type Link = FakeLink;

        async fn connect(&mut self) -> Result<FakeLink, StreamError> {
            self.shared.borrow_mut().attempts.push(Instant::now());
            match self.script.pop_front() {
                Some(Script::Session { incoming, hold }) => Ok(FakeLink {
                    incoming: incoming.into(),
                    hold,
                    shared: self.shared.clone(),
                }),
                _ => Err(StreamError::Connect(self.target(), "refused".into())),
            }
        }

        fn target(&self) -> String {
            "fake://locations".into()
        }
    }

    fn fake(script: Vec<Script>) -> (Fake, Rc<RefCell<Shared>>) {
        let shared = Rc::new(RefCell::new(Shared::default()));
        (
            Fake {
                script: script.into(),
                shared: shared.clone(),
            },
            shared,
        )
    }

    #[tokio::test(start_paused = true)]
    async fn test_reconnect_after_fixed_delay() {
        let (conn, shared) = fake(vec![
            Script::Fail,
            Script::Fail,
            Script::Session {
                incoming: vec![Incoming::Text("hello".into())],
                hold: false,
            },
        ]);
        let (tx, mut rx) = channel(16);
        let (stop, shutdown) = watch::channel(false);

        let sup = Supervisor::new(Channel::Data, conn, tx, shutdown);
        let (stats, events) = tokio::join!(sup.run(), async move {
            let mut seen = vec![];
            while let Some(ev) = rx.recv().await {
                let done = matches!(ev, Event::Link(_, LinkState::Down));
                seen.push(ev);
                if done {
                    break;
                }
            }
            stop.send(true).unwrap();
            seen
        });

        let shared = shared.borrow();
        let attempts = &shared.attempts;
        assert_eq!(3, attempts.len());
        assert_eq!(RECONNECT_DELAY, attempts[1] - attempts[0]);
        assert_eq!(RECONNECT_DELAY, attempts[2] - attempts[1]);

        assert_eq!(3, events.len());
        assert!(matches!(events[0], Event::Link(Channel::Data, LinkState::Up)));
        assert!(matches!(&events[1], Event::Text(t) if t == "hello"));

        assert_eq!(2, stats.reconnect);
        assert_eq!(2, stats.err);
        assert_eq!(1, stats.pkts);
        assert_eq!(5, stats.bytes);
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_cancels_wait() {
        let (conn, shared) = fake(vec![]);
        let (tx, _rx) = channel(16);
        let (stop, shutdown) = watch::channel(false);

        let start = Instant::now();
        let sup = Supervisor::new(Channel::Video, conn, tx, shutdown);
        let (stats, _) = tokio::join!(sup.run(), async move {
            sleep(Duration::from_millis(500)).await;
            stop.send(true).unwrap();
        });

        assert!(start.elapsed() < RECONNECT_DELAY);
        assert_eq!(1, shared.borrow().attempts.len());
        assert_eq!(1, stats.err);
    }

    #[tokio::test(start_paused = true)]
    async fn test_keeps_trying_forever() {
        let (conn, shared) = fake(vec![]);
        let (tx, _rx) = channel(16);
        let (stop, shutdown) = watch::channel(false);

        let sup = Supervisor::new(Channel::Data, conn, tx, shutdown);
        let (stats, _) = tokio::join!(sup.run(), async move {
            sleep(RECONNECT_DELAY * 100 + Duration::from_millis(1)).await;
            stop.send(true).unwrap();
        });

        assert_eq!(101, shared.borrow().attempts.len());
        assert_eq!(100, stats.reconnect);
    }

    #[tokio::test(start_paused = true)]
    async fn test_outbound_forwarded() {
        let (conn, shared) = fake(vec![Script::Session {
            incoming: vec![Incoming::Binary(vec![0xff, 0xd8])],
            hold: true,
        }]);
        let (tx, mut rx) = channel(16);
        let (out_tx, out_rx) = unbounded_channel();
        let (stop, shutdown) = watch::channel(false);

        out_tx.send(r##"{"drone_id":"D1","action":"RTL"}"##.to_string()).unwrap();

        let sup = Supervisor::new(Channel::Data, conn, tx, shutdown).with_outbound(out_rx);
        let (stats, frame) = tokio::join!(sup.run(), async move {
            let mut frame = None;
            while let Some(ev) = rx.recv().await {
                if let Event::Frame(data) = ev {
                    frame = Some(data);
                    break;
                }
            }
            sleep(Duration::from_millis(10)).await;
            stop.send(true).unwrap();
            frame
        });

        assert_eq!(Some(vec![0xff, 0xd8]), frame);
        assert_eq!(
            vec![r##"{"drone_id":"D1","action":"RTL"}"##.to_string()],
            shared.borrow().sent
        );
        assert_eq!(0, stats.reconnect);
        drop(out_tx);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stops_when_dashboard_gone() {
        let (conn, shared) = fake(vec![Script::Session {
            incoming: vec![Incoming::Text("a".into())],
            hold: true,
        }]);
        let (tx, rx) = channel(16);
        let (_stop, shutdown) = watch::channel(false);
        drop(rx);

        let stats = Supervisor::new(Channel::Data, conn, tx, shutdown).run().await;

        assert_eq!(1, shared.borrow().attempts.len());
        assert_eq!(0, stats.pkts);
    }
}
