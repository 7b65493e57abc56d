//! The Render Adapter.
//!
//! Projects store records onto markers and panels.  It owns one `Marker` per (kind, id) and only
//! talks to the outside world through the `Surface` trait, so the map itself can be anything:
//! a terminal, a log, a recording for tests.
//!
//! Existing markers are always moved/restyled in place, never recreated.
//!

use std::collections::BTreeMap;

use serde::Serialize;
use strum::{EnumString, VariantNames};
use tracing::trace;

use fleetwatch_common::{MapTheme, Position};

use crate::{BatteryState, Drone, EntityKind, FrameHandle, Officer, Panel};

/// Initials used when an officer has no name.
pub const DEFAULT_INITIALS: &str = "OF";

/// Everything the dashboard needs from a map and its panels.
///
pub trait Surface {
    /// A new marker, not attached yet.
    fn add_marker(&mut self, marker: &Marker);
    fn move_marker(&mut self, key: &MarkerKey, position: Position);
    fn restyle_marker(&mut self, key: &MarkerKey, style: &MarkerStyle);
    /// Make the marker visible on the map.
    fn attach(&mut self, key: &MarkerKey);
    fn detach(&mut self, key: &MarkerKey);
    /// Move the camera.
    fn focus(&mut self, position: Position);
    fn show_panel(&mut self, panel: &Panel);
    fn hide_panel(&mut self, kind: EntityKind);
    /// Transient notification.
    fn notify(&mut self, msg: &str);
    /// Blocking alert, the user has to acknowledge it.
    fn alert(&mut self, msg: &str);
    fn set_theme(&mut self, theme: MapTheme);
    /// Display the latest video frame.
    fn show_frame(&mut self, frame: &FrameHandle);
}

#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct MarkerKey {
    pub kind: EntityKind,
    pub id: String,
}

impl MarkerKey {
    pub fn drone(id: &str) -> Self {
        MarkerKey {
            kind: EntityKind::Drone,
            id: id.to_string(),
        }
    }

    pub fn officer(id: &str) -> Self {
        MarkerKey {
            kind: EntityKind::Officer,
            id: id.to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum MarkerStyle {
    Drone { battery: BatteryState },
    Officer { initials: String, online: bool, sos: bool },
}

impl From<&Drone> for MarkerStyle {
    fn from(d: &Drone) -> Self {
        MarkerStyle::Drone {
            battery: BatteryState::from_level(d.battery),
        }
    }
}

impl From<&Officer> for MarkerStyle {
    fn from(o: &Officer) -> Self {
        MarkerStyle::Officer {
            initials: initials(o.name.as_deref()),
            online: o.is_online,
            sos: o.sos.is_some(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Marker {
    pub key: MarkerKey,
    pub position: Position,
    pub style: MarkerStyle,
    pub attached: bool,
}

/// Which kinds of markers are on the map.
///
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    EnumString,
    Eq,
    PartialEq,
    Serialize,
    strum::Display,
    VariantNames,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Visibility {
    #[default]
    All,
    Drones,
    Officers,
}

impl Visibility {
    pub fn includes(&self, kind: EntityKind) -> bool {
        matches!(
            (self, kind),
            (Visibility::All, _)
                | (Visibility::Drones, EntityKind::Drone)
                | (Visibility::Officers, EntityKind::Officer)
        )
    }
}

/// First letter of every name token, uppercased, at most two of them.
///
pub fn initials(name: Option<&str>) -> String {
    let s: String = name
        .unwrap_or_default()
        .split_whitespace()
        .filter_map(|t| t.chars().next())
        .flat_map(char::to_uppercase)
        .take(2)
        .collect();
    if s.is_empty() {
        DEFAULT_INITIALS.to_string()
    } else {
        s
    }
}

#[derive(Debug)]
pub struct RenderAdapter<S: Surface> {
    surface: S,
    markers: BTreeMap<MarkerKey, Marker>,
    filter: Visibility,
}

impl<S: Surface> RenderAdapter<S> {
    pub fn new(surface: S) -> Self {
        RenderAdapter {
            surface,
            markers: BTreeMap::new(),
            filter: Visibility::default(),
        }
    }

    pub fn reflect_drone(&mut self, drone: &Drone) {
        self.reflect(MarkerKey::drone(&drone.id), drone.position, drone.into());
    }

    pub fn reflect_officer(&mut self, officer: &Officer) {
        self.reflect(
            MarkerKey::officer(&officer.id),
            officer.position,
            officer.into(),
        );
    }

    #[tracing::instrument(skip(self, style))]
    fn reflect(&mut self, key: MarkerKey, position: Position, style: MarkerStyle) {
        match self.markers.get_mut(&key) {
            Some(marker) => {
                if marker.position != position {
                    marker.position = position;
                    self.surface.move_marker(&key, position);
                }
                if marker.style != style {
                    self.surface.restyle_marker(&key, &style);
                    marker.style = style;
                }
            }
            None => {
                trace!("new marker");
                let attached = self.filter.includes(key.kind);
                let marker = Marker {
                    key: key.clone(),
                    position,
                    style,
                    attached,
                };
                self.surface.add_marker(&marker);
                if attached {
                    self.surface.attach(&key);
                }
                self.markers.insert(key, marker);
            }
        }
    }

    /// Walk all markers and attach/detach them according to `filter`.
    ///
    #[tracing::instrument(skip(self))]
    pub fn set_filter(&mut self, filter: Visibility) {
        self.filter = filter;
        for (key, marker) in self.markers.iter_mut() {
            let wanted = filter.includes(key.kind);
            if wanted && !marker.attached {
                self.surface.attach(key);
            } else if !wanted && marker.attached {
                self.surface.detach(key);
            }
            marker.attached = wanted;
        }
    }

    pub fn filter(&self) -> Visibility {
        self.filter
    }

    pub fn marker(&self, key: &MarkerKey) -> Option<&Marker> {
        self.markers.get(key)
    }

    pub fn markers(&self) -> impl Iterator<Item = &Marker> {
        self.markers.values()
    }

    /// Keys of the markers currently on the map.
    ///
    pub fn attached(&self) -> Vec<MarkerKey> {
        self.markers
            .values()
            .filter(|m| m.attached)
            .map(|m| m.key.clone())
            .collect()
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }
}
