//! The `Dashboard` ties everything together.
//!
//! It owns the store, the render adapter, the selection and the dispatch state, and is driven
//! one `Event` at a time by a single task.  Nothing in here is shared or locked.
//!
//! Anything that needs to go out asynchronously (detail fetches) is returned as an `Effect` for
//! the caller to run, the result comes back later as another `Event`.
//!

use std::fmt::{Debug, Formatter};

use strum::EnumString;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info, trace, warn};

use fleetwatch_common::{MapTheme, Position, Preferences};
use fleetwatch_formats::{Action, Command, OfficerDetail};

use crate::{
    Arming, DronePanel, EntityKind, EntityStore, FrameSink, FrameSlot, OfficerPanel, Panel,
    RenderAdapter, Selection, Stats, Surface, Visibility, RECONNECT_DELAY,
};

/// Our two streams.
///
#[derive(Clone, Copy, Debug, EnumString, Eq, PartialEq, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum Channel {
    Data,
    Video,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum LinkState {
    Up,
    Down,
}

/// What the user can do.
///
#[derive(Clone, Debug, PartialEq)]
pub enum UserAction {
    SelectDrone(String),
    SelectOfficer(String),
    DeselectDrone,
    DeselectOfficer,
    Send(Action),
    ArmTarget,
    ArmEmergency,
    Disarm,
    Click(Position),
    Filter(Visibility),
    Theme(MapTheme),
}

/// Everything the dashboard task reacts to.
///
#[derive(Debug)]
pub enum Event {
    /// Text message from the data stream
    Text(String),
    /// Binary message from the video stream
    Frame(Vec<u8>),
    Link(Channel, LinkState),
    /// Result of a detail fetch
    Detail {
        id: String,
        result: Result<OfficerDetail, String>,
    },
    User(UserAction),
}

/// Work for the caller.
///
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Effect {
    FetchDetail(String),
}

pub struct Dashboard<S: Surface> {
    pub(crate) store: EntityStore,
    pub(crate) render: RenderAdapter<S>,
    pub(crate) selection: Selection,
    pub(crate) arming: Arming,
    pub(crate) outbox: UnboundedSender<String>,
    pub(crate) prefs: Option<Preferences>,
    pub(crate) frames: Option<FrameSlot>,
    pub(crate) stats: Stats,
}

impl<S: Surface> Debug for Dashboard<S> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dashboard")
            .field("store", &self.store)
            .field("selection", &self.selection)
            .field("arming", &self.arming)
            .field("filter", &self.render.filter())
            .field("stats", &self.stats)
            .finish()
    }
}

impl<S: Surface> Dashboard<S> {
    /// Empty dashboard, commands go into `outbox`.
    ///
    pub fn new(surface: S, outbox: UnboundedSender<String>) -> Self {
        Dashboard {
            store: EntityStore::new(),
            render: RenderAdapter::new(surface),
            selection: Selection::default(),
            arming: Arming::default(),
            outbox,
            prefs: None,
            frames: None,
            stats: Stats::default(),
        }
    }

    /// Use persisted preferences, the saved theme is applied right away.
    ///
    pub fn with_prefs(mut self, prefs: Preferences) -> Self {
        self.render.surface_mut().set_theme(prefs.theme());
        self.prefs = Some(prefs);
        self
    }

    /// Send video frames through `sink`.
    ///
    pub fn with_frames(mut self, sink: Box<dyn FrameSink>) -> Self {
        self.frames = Some(FrameSlot::new(sink));
        self
    }

    /// Process one event.
    ///
    pub fn handle(&mut self, ev: Event) -> Vec<Effect> {
        match ev {
            Event::Text(text) => {
                let _ = self.handle_text(&text);
                vec![]
            }
            Event::Frame(data) => {
                self.present_frame(&data);
                vec![]
            }
            Event::Link(channel, state) => {
                self.link_changed(channel, state);
                vec![]
            }
            Event::Detail { id, result } => {
                self.apply_detail(&id, result);
                vec![]
            }
            Event::User(action) => self.apply(action),
        }
    }

    /// Process one user action.
    ///
    #[tracing::instrument(skip(self))]
    pub fn apply(&mut self, action: UserAction) -> Vec<Effect> {
        match action {
            UserAction::SelectDrone(id) => self.select_drone(&id),
            UserAction::SelectOfficer(id) => return self.select_officer(&id),
            UserAction::DeselectDrone => self.deselect_drone(),
            UserAction::DeselectOfficer => self.deselect_officer(),
            UserAction::Send(action) => {
                let _ = self.send_action(action);
            }
            UserAction::ArmTarget => self.arm(Arming::SetTarget),
            UserAction::ArmEmergency => self.arm(Arming::Emergency),
            UserAction::Disarm => self.arm(Arming::Idle),
            UserAction::Click(pos) => {
                let _ = self.map_click(pos);
            }
            UserAction::Filter(filter) => self.render.set_filter(filter),
            UserAction::Theme(theme) => self.set_theme(theme),
        }
        vec![]
    }

    /// Select a drone, the officer selection goes away.
    ///
    pub fn select_drone(&mut self, id: &str) {
        let stale = self.selection.drone().is_some_and(|prev| prev != id);
        if let Some(previous) = self.selection.select(EntityKind::Drone, id) {
            self.render.surface_mut().hide_panel(previous);
        }
        match self.store.drone(id) {
            Some(drone) => {
                let panel = Panel::Drone(DronePanel::from(drone));
                let surface = self.render.surface_mut();
                surface.focus(drone.position);
                surface.show_panel(&panel);
            }
            None => {
                debug!("drone {id} not seen yet");
                if stale {
                    self.render.surface_mut().hide_panel(EntityKind::Drone);
                }
            }
        }
    }

    /// Select an officer and ask for a detail fetch.
    ///
    pub fn select_officer(&mut self, id: &str) -> Vec<Effect> {
        let stale = self.selection.officer().is_some_and(|prev| prev != id);
        if let Some(previous) = self.selection.select(EntityKind::Officer, id) {
            self.render.surface_mut().hide_panel(previous);
        }
        match self.store.officer(id) {
            Some(officer) => {
                let panel = Panel::Officer(OfficerPanel::from(officer));
                let surface = self.render.surface_mut();
                surface.focus(officer.position);
                surface.show_panel(&panel);
            }
            None => {
                debug!("officer {id} not seen yet");
                if stale {
                    self.render.surface_mut().hide_panel(EntityKind::Officer);
                }
            }
        }
        vec![Effect::FetchDetail(id.to_string())]
    }

    pub fn deselect_drone(&mut self) {
        if self.selection.deselect(EntityKind::Drone) {
            self.render.surface_mut().hide_panel(EntityKind::Drone);
        }
    }

    pub fn deselect_officer(&mut self) {
        if self.selection.deselect(EntityKind::Officer) {
            self.render.surface_mut().hide_panel(EntityKind::Officer);
        }
    }

    /// Redraw the panel of `kind`/`id` if it is the current selection.
    ///
    pub(crate) fn refresh_panel(&mut self, kind: EntityKind, id: &str) {
        if !self.selection.is_selected(kind, id) {
            return;
        }
        let panel = match kind {
            EntityKind::Drone => self.store.drone(id).map(|d| Panel::Drone(d.into())),
            EntityKind::Officer => self.store.officer(id).map(|o| Panel::Officer(o.into())),
        };
        if let Some(panel) = panel {
            trace!("refresh panel {kind} {id}");
            self.render.surface_mut().show_panel(&panel);
        }
    }

    /// Merge a detail fetch result.  On failure we keep showing what we have.
    ///
    #[tracing::instrument(skip(self, result))]
    pub fn apply_detail(&mut self, id: &str, result: Result<OfficerDetail, String>) {
        match result {
            Ok(detail) => {
                if self.store.enrich_officer(id, &detail) {
                    if let Some(officer) = self.store.officer(id) {
                        self.render.reflect_officer(officer);
                    }
                    self.refresh_panel(EntityKind::Officer, id);
                } else if self.selection.is_selected(EntityKind::Officer, id) {
                    debug!("officer {id} not on the map yet, showing details only");
                    let panel = Panel::Officer(OfficerPanel::from(&detail));
                    self.render.surface_mut().show_panel(&panel);
                } else {
                    debug!("details for unknown officer {id} kept for later");
                }
            }
            Err(e) => {
                self.stats.err += 1;
                if self.store.officer(id).is_some() {
                    warn!("details for {id} unavailable ({e}), using cached data");
                    self.refresh_panel(EntityKind::Officer, id);
                } else {
                    self.render
                        .surface_mut()
                        .notify(&format!("Could not load details for officer {id}: {e}"));
                }
            }
        }
    }

    /// Change and persist the map theme.
    ///
    #[tracing::instrument(skip(self))]
    pub fn set_theme(&mut self, theme: MapTheme) {
        self.render.surface_mut().set_theme(theme);
        if let Some(prefs) = self.prefs.as_mut() {
            if let Err(e) = prefs.set_theme(theme) {
                warn!("can not save theme: {e}");
            }
        }
    }

    fn present_frame(&mut self, data: &[u8]) {
        self.stats.frames += 1;
        if let Some(slot) = self.frames.as_mut() {
            match slot.present(data) {
                Ok(handle) => self.render.surface_mut().show_frame(handle),
                Err(e) => {
                    self.stats.err += 1;
                    warn!("bad frame: {e}");
                }
            }
        }
    }

    fn link_changed(&mut self, channel: Channel, state: LinkState) {
        info!("{channel} stream {state}");
        let surface = self.render.surface_mut();
        match state {
            LinkState::Up => surface.notify(&format!("{channel} stream connected")),
            LinkState::Down => surface.notify(&format!(
                "{channel} stream lost, reconnecting in {}s",
                RECONNECT_DELAY.as_secs()
            )),
        }
    }

    /// Fire-and-forget, a closed channel is only logged.
    ///
    pub(crate) fn send(&mut self, cmd: &Command) {
        match serde_json::to_string(cmd) {
            Ok(json) => {
                debug!("send {json}");
                if self.outbox.send(json).is_err() {
                    warn!("data stream is gone, command for {} dropped", cmd.drone_id());
                }
            }
            Err(e) => warn!("can not encode command: {e}"),
        }
    }

    pub fn store(&self) -> &EntityStore {
        &self.store
    }

    pub fn render(&self) -> &RenderAdapter<S> {
        &self.render
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn arming(&self) -> Arming {
        self.arming
    }

    pub fn stats(&self) -> &Stats {
        &self.stats
    }

    pub fn surface(&self) -> &S {
        self.render.surface()
    }

    pub fn surface_mut(&mut self) -> &mut S {
        self.render.surface_mut()
    }
}
