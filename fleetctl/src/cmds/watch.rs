//! `watch`: the live dashboard.
//!
//! Everything runs on the current thread: the engine `Runner` (streams and dashboard) next to
//! the console.  `quit` on the console or `^C` stops it all.
//!

use std::future::pending;
use std::io;

use eyre::Result;
use tokio::signal;
use tokio::sync::watch;
use tracing::{debug, info, trace, warn};

use fleetwatch_common::{ConfigFile, Preferences};
use fleetwatch_engine::{BackendClient, NullSink, Runner, Stats};

use crate::{console, Config, FileSink, TermSurface, WatchOpts};

#[tracing::instrument(skip(cfg))]
pub async fn watch(cfg: &ConfigFile<Config>, opts: &WatchOpts) -> Result<Stats> {
    let inner = cfg.inner();
    let base = opts.base.as_deref().unwrap_or(&inner.base_url);

    let data = inner.data_url(base)?;
    let video = if opts.no_video {
        None
    } else {
        inner.video_url(base)?
    };
    info!("data stream {data}, video stream {video:?}");

    let prefs = Preferences::load(&inner.prefs_file(&cfg.config_path()));
    let backend = BackendClient::new(base)?;

    let (stop, shutdown) = watch::channel(false);

    let mut runner = Runner::new(TermSurface::new(io::stdout()), &data, shutdown)
        .with_backend(backend)
        .with_prefs(prefs);

    if let Some(url) = &video {
        runner = runner.with_video(url);
        runner = match &inner.frames {
            Some(dir) => runner.with_frames(Box::new(FileSink::new(dir)?)),
            None => runner.with_frames(Box::new(NullSink::default())),
        };
    }

    let events = runner.events();

    // Console or ^C, whichever comes first.  A closed `stdin` leaves only ^C.
    //
    let control = async move {
        let quit = async {
            match console(events).await {
                Ok(true) => debug!("quit from console"),
                Ok(false) => {
                    debug!("console closed");
                    pending::<()>().await
                }
                Err(e) => {
                    warn!("console: {e}");
                    pending::<()>().await
                }
            }
        };

        tokio::select! {
            _ = quit => (),
            _ = signal::ctrl_c() => info!("interrupted"),
        }
        trace!("shutting down");
        let _ = stop.send(true);
    };

    let ((_, stats), _) = tokio::join!(runner.run(), control);
    Ok(stats)
}
