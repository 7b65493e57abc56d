//! The event loop.
//!
//! Three futures on the same (single-threaded) runtime: the data stream supervisor, the optional
//! video stream supervisor and the dashboard task consuming their events in arrival order.  Detail
//! fetches are spawned and come back through the same event channel.
//!

use fleetwatch_common::Preferences;
use tokio::sync::mpsc::{channel, unbounded_channel, Receiver, Sender, UnboundedReceiver};
use tokio::sync::watch;
use tracing::{debug, info, trace};

use crate::{
    BackendClient, Channel, Dashboard, Effect, Event, FrameSink, Stats, Supervisor, Surface,
    WsConnector,
};

/// Size of the event queue between the streams and the dashboard.
const EVENTS: usize = 256;

pub struct Runner<S: Surface> {
    dashboard: Dashboard<S>,
    backend: Option<BackendClient>,
    data: String,
    video: Option<String>,
    tx: Sender<Event>,
    rx: Receiver<Event>,
    outbound: UnboundedReceiver<String>,
    shutdown: watch::Receiver<bool>,
}

impl<S: Surface> Runner<S> {
    /// Dashboard drawing on `surface`, fed from the data stream at `data`.
    ///
    pub fn new(surface: S, data: &str, shutdown: watch::Receiver<bool>) -> Self {
        let (out_tx, outbound) = unbounded_channel();
        let (tx, rx) = channel(EVENTS);
        Runner {
            dashboard: Dashboard::new(surface, out_tx),
            backend: None,
            data: data.to_string(),
            video: None,
            tx,
            rx,
            outbound,
            shutdown,
        }
    }

    pub fn with_video(mut self, url: &str) -> Self {
        self.video = Some(url.to_string());
        self
    }

    pub fn with_backend(mut self, backend: BackendClient) -> Self {
        self.backend = Some(backend);
        self
    }

    pub fn with_prefs(mut self, prefs: Preferences) -> Self {
        self.dashboard = self.dashboard.with_prefs(prefs);
        self
    }

    pub fn with_frames(mut self, sink: Box<dyn FrameSink>) -> Self {
        self.dashboard = self.dashboard.with_frames(sink);
        self
    }

    /// Where to send user actions from.
    ///
    pub fn events(&self) -> Sender<Event> {
        self.tx.clone()
    }

    /// Run until shutdown, returns the dashboard and the accumulated stats.
    ///
    #[tracing::instrument(skip(self), fields(data = %self.data))]
    pub async fn run(self) -> (Dashboard<S>, Stats) {
        let Runner {
            mut dashboard,
            backend,
            data,
            video,
            tx,
            mut rx,
            outbound,
            mut shutdown,
        } = self;

        let data = Supervisor::new(
            Channel::Data,
            WsConnector::new(&data),
            tx.clone(),
            shutdown.clone(),
        )
        .with_outbound(outbound);
        let video = video.map(|url| {
            Supervisor::new(
                Channel::Video,
                WsConnector::new(&url),
                tx.clone(),
                shutdown.clone(),
            )
        });

        let video = async move {
            match video {
                Some(sup) => sup.run().await,
                None => Stats::default(),
            }
        };

        let ui = async {
            loop {
                tokio::select! {
                    ev = rx.recv() => match ev {
                        Some(ev) => handle(&mut dashboard, ev, backend.as_ref(), &tx),
                        None => break,
                    },
                    _ = shutdown.changed() => break,
                }
            }

            // Whatever is already queued still gets processed
            //
            while let Ok(ev) = rx.try_recv() {
                handle(&mut dashboard, ev, backend.as_ref(), &tx);
            }
            info!("dashboard done: {}", dashboard.stats());
        };

        let (ds, vs, _) = tokio::join!(data.run(), video, ui);
        let stats = ds + vs + dashboard.stats().clone();
        (dashboard, stats)
    }
}

/// One event through the dashboard, then run its effects.
///
fn handle<S: Surface>(
    dashboard: &mut Dashboard<S>,
    ev: Event,
    backend: Option<&BackendClient>,
    tx: &Sender<Event>,
) {
    trace!("event: {ev:?}");
    for fx in dashboard.handle(ev) {
        match fx {
            Effect::FetchDetail(id) => match backend {
                Some(backend) => fetch_detail(backend.clone(), id, tx.clone()),
                None => debug!("no backend, no details for {id}"),
            },
        }
    }
}

/// Fetch officer details in the background, the result comes back as an event.
///
fn fetch_detail(backend: BackendClient, id: String, tx: Sender<Event>) {
    tokio::spawn(async move {
        let result = backend
            .officer_details(&id)
            .await
            .map_err(|e| e.to_string());
        if tx.send(Event::Detail { id, result }).await.is_err() {
            debug!("dashboard gone, detail dropped");
        }
    });
}
