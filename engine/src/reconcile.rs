//! The Reconciliation Engine.
//!
//! Validates and normalizes every inbound message before it reaches the store, then has the
//! render adapter reflect the change and refreshes the panel of the selected entity.
//!
//! A snapshot is nothing more than a batch of individual updates, each validated on its own.
//! Nothing here ever fails: bad records are logged, counted and dropped.
//!

use tracing::{debug, trace, warn};

use fleetwatch_common::Position;
use fleetwatch_formats::{DroneMsg, Envelope, LastLocation, OfficerMsg, SosAlert, SosCancel};

use crate::{Dashboard, Drone, EntityKind, OfficerUpdate, Rejection, Sos, Surface, Upsert};

/// What happened to one record.
///
#[derive(Clone, Debug, PartialEq)]
pub enum Outcome {
    Applied {
        kind: EntityKind,
        id: String,
        created: bool,
    },
    Rejected(Rejection),
    Ignored(&'static str),
}

/// Find a usable position: top-level `lat`/`lng` first, then `last_location`.  Both coordinates
/// must come from the same place and be in range.
///
pub fn locate(
    lat: Option<f64>,
    lng: Option<f64>,
    nested: Option<&LastLocation>,
) -> Option<Position> {
    let pair = |lat: Option<f64>, lng: Option<f64>| match (lat, lng) {
        (Some(lat), Some(lng)) => Some(Position::new(lat, lng)),
        _ => None,
    };

    pair(lat, lng)
        .filter(Position::is_valid)
        .or_else(|| nested.and_then(|l| pair(l.lat, l.lng)).filter(Position::is_valid))
}

/// Empty identifiers are as good as none.
///
#[inline]
fn ident(id: Option<String>) -> Option<String> {
    id.filter(|s| !s.trim().is_empty())
}

impl<S: Surface> Dashboard<S> {
    /// Process one text message from the data stream.
    ///
    #[tracing::instrument(skip_all)]
    pub fn handle_text(&mut self, text: &str) -> Vec<Outcome> {
        let env: Envelope = match serde_json::from_str(text) {
            Ok(env) => env,
            Err(e) => return vec![self.reject(Rejection::Malformed(e.to_string()))],
        };
        trace!("got {}", env.kind());

        match env {
            Envelope::Snapshot(snap) => {
                debug!(
                    "snapshot with {} drones and {} officers",
                    snap.drones.len(),
                    snap.officers.len()
                );
                let mut res = Vec::with_capacity(snap.drones.len() + snap.officers.len());
                for v in snap.drones {
                    let r = match serde_json::from_value::<DroneMsg>(v) {
                        Ok(m) => self.apply_drone(m),
                        Err(e) => self.reject(Rejection::Malformed(e.to_string())),
                    };
                    res.push(r);
                }
                for v in snap.officers {
                    let r = match serde_json::from_value::<OfficerMsg>(v) {
                        Ok(m) => self.apply_officer(m),
                        Err(e) => self.reject(Rejection::Malformed(e.to_string())),
                    };
                    res.push(r);
                }
                res
            }
            Envelope::LocationUpdate(m) => vec![self.apply_drone(m)],
            Envelope::OfficerLocationUpdate(m) => vec![self.apply_officer(m)],
            Envelope::OfficerSosAlert(a) => vec![self.apply_sos(a)],
            Envelope::OfficerSosCancelled(c) => vec![self.cancel_sos(c)],
            Envelope::Unknown => {
                debug!("ignoring message of unknown type");
                vec![Outcome::Ignored("unknown message type")]
            }
        }
    }

    /// Drones need an identifier and a position, the record then replaces the stored one.
    ///
    fn apply_drone(&mut self, m: DroneMsg) -> Outcome {
        let Some(id) = ident(m.drone_id) else {
            return self.reject(Rejection::MissingId(EntityKind::Drone));
        };
        let Some(position) = locate(m.lat, m.lng, m.last_location.as_ref()) else {
            return self.reject(Rejection::NoPosition(EntityKind::Drone, id));
        };

        // Nested telemetry (speed, alt…) is kept unless also given at top-level
        //
        let mut telemetry = m.telemetry;
        if let Some(loc) = m.last_location {
            for (k, v) in loc.rest {
                telemetry.entry(k).or_insert(v);
            }
        }

        let drone = Drone {
            id: id.clone(),
            position,
            battery: m.battery,
            telemetry,
        };
        let created = self.store.upsert_drone(drone) == Upsert::Created;
        if let Some(drone) = self.store.drone(&id) {
            self.render.reflect_drone(drone);
        }
        self.refresh_panel(EntityKind::Drone, &id);
        self.applied(EntityKind::Drone, id, created)
    }

    /// Officers are merged, a new one needs a position.
    ///
    fn apply_officer(&mut self, m: OfficerMsg) -> Outcome {
        let Some(id) = ident(m.officer_id) else {
            return self.reject(Rejection::MissingId(EntityKind::Officer));
        };
        let upd = OfficerUpdate {
            position: locate(m.lat, m.lng, m.last_location.as_ref()),
            name: m.officer_name,
            badge: m.badge_number,
            rank: m.rank,
            station: m.station_name,
            district: m.district,
            mobile: m.mobile_number,
            photo: m.photo_path,
            is_online: m.is_online,
            last_seen: m.last_seen.or(m.timestamp),
        };
        match self.store.upsert_officer(&id, upd) {
            Some(res) => self.officer_changed(id, res == Upsert::Created),
            None => self.reject(Rejection::NoPosition(EntityKind::Officer, id)),
        }
    }

    /// SOS from the field.  The alert is raised even when we can not place the officer.
    ///
    fn apply_sos(&mut self, a: SosAlert) -> Outcome {
        let Some(id) = ident(a.officer_id) else {
            return self.reject(Rejection::MissingId(EntityKind::Officer));
        };

        let who = match (&a.officer_name, &a.badge_number) {
            (Some(name), Some(badge)) => format!("{name} ({badge})"),
            (Some(name), None) => name.clone(),
            _ => id.clone(),
        };
        let kind = a.emergency_type.as_deref().unwrap_or("emergency");
        let msg = match &a.message_text {
            Some(text) => format!("SOS from {who}: {kind}, {text}"),
            None => format!("SOS from {who}: {kind}"),
        };
        self.render.surface_mut().alert(&msg);

        let upd = OfficerUpdate {
            position: locate(a.lat, a.lng, None),
            name: a.officer_name,
            badge: a.badge_number,
            ..Default::default()
        };
        let Some(res) = self.store.upsert_officer(&id, upd) else {
            return self.reject(Rejection::UnknownOfficer(id));
        };
        let sos = Sos {
            emergency_type: a.emergency_type,
            message: a.message_text,
            audio_url: a.audio_url,
            triggered_at: a.triggered_at,
            nearby: a.nearby_officers,
        };
        self.store.set_sos(&id, Some(sos));
        self.officer_changed(id, res == Upsert::Created)
    }

    fn cancel_sos(&mut self, c: SosCancel) -> Outcome {
        let Some(id) = ident(c.officer_id) else {
            return self.reject(Rejection::MissingId(EntityKind::Officer));
        };
        if !self.store.set_sos(&id, None) {
            return self.reject(Rejection::UnknownOfficer(id));
        }
        let msg = match c.reason {
            Some(reason) => format!("SOS from {id} cancelled: {reason}"),
            None => format!("SOS from {id} cancelled"),
        };
        self.render.surface_mut().notify(&msg);
        self.officer_changed(id, false)
    }

    fn officer_changed(&mut self, id: String, created: bool) -> Outcome {
        if let Some(officer) = self.store.officer(&id) {
            self.render.reflect_officer(officer);
        }
        self.refresh_panel(EntityKind::Officer, &id);
        self.applied(EntityKind::Officer, id, created)
    }

    fn applied(&mut self, kind: EntityKind, id: String, created: bool) -> Outcome {
        self.stats.applied += 1;
        Outcome::Applied { kind, id, created }
    }

    fn reject(&mut self, why: Rejection) -> Outcome {
        warn!("dropped: {why}");
        self.stats.dropped += 1;
        Outcome::Rejected(why)
    }
}
