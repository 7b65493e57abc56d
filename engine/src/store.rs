//! The Entity Store.
//!
//! In-memory last-known state for both kinds of entities, keyed by their identifier.  It starts
//! empty, is never persisted and nothing is ever removed from it.
//!
//! Drones are replaced wholesale on every update.  Officers are merged field by field: a field
//! absent from an update never erases what we already know.
//!

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::{Map, Value};
use strum::EnumString;
use tracing::trace;

use fleetwatch_common::Position;
use fleetwatch_formats::OfficerDetail;

/// The two kinds of tracked entities.
///
#[derive(
    Clone, Copy, Debug, EnumString, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize, strum::Display,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum EntityKind {
    Drone,
    Officer,
}

/// Whether an upsert created the entity.
///
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Upsert {
    Created,
    Updated,
}

/// Last known state of a drone.
///
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Drone {
    pub id: String,
    pub position: Position,
    /// Percentage, 0-100
    pub battery: Option<f64>,
    /// Everything else the drone reported (`nickname`, `speed`, `alt`, `heading`…)
    pub telemetry: Map<String, Value>,
}

impl Drone {
    /// Telemetry value as a string, for display.
    ///
    pub fn telemetry_str(&self, key: &str) -> Option<String> {
        self.telemetry.get(key).and_then(|v| match v {
            Value::Null => None,
            Value::String(s) => Some(s.clone()),
            v => Some(v.to_string()),
        })
    }
}

/// Active SOS raised by an officer.
///
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Sos {
    pub emergency_type: Option<String>,
    pub message: Option<String>,
    pub audio_url: Option<String>,
    pub triggered_at: Option<String>,
    pub nearby: Vec<String>,
}

/// Last known state of an officer.
///
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Officer {
    pub id: String,
    pub name: Option<String>,
    pub badge: Option<String>,
    pub rank: Option<String>,
    pub station: Option<String>,
    pub district: Option<String>,
    pub mobile: Option<String>,
    pub photo: Option<String>,
    pub email: Option<String>,
    pub status: Option<String>,
    pub is_online: bool,
    pub last_seen: Option<String>,
    pub position: Position,
    pub sos: Option<Sos>,
}

/// Partial officer record, every `None` means "not in this message".
///
#[derive(Clone, Debug, Default, PartialEq)]
pub struct OfficerUpdate {
    pub position: Option<Position>,
    pub name: Option<String>,
    pub badge: Option<String>,
    pub rank: Option<String>,
    pub station: Option<String>,
    pub district: Option<String>,
    pub mobile: Option<String>,
    pub photo: Option<String>,
    pub is_online: Option<bool>,
    pub last_seen: Option<String>,
}

/// Overwrite only when the incoming value is present.
///
#[inline]
fn merge<T>(field: &mut Option<T>, value: Option<T>) {
    if value.is_some() {
        *field = value;
    }
}

impl Officer {
    fn new(id: &str, position: Position, upd: OfficerUpdate) -> Self {
        Officer {
            id: id.to_string(),
            name: upd.name,
            badge: upd.badge,
            rank: upd.rank,
            station: upd.station,
            district: upd.district,
            mobile: upd.mobile,
            photo: upd.photo,
            email: None,
            status: None,
            is_online: upd.is_online.unwrap_or(false),
            last_seen: upd.last_seen,
            position,
            sos: None,
        }
    }

    /// Field-level merge of a partial update.
    ///
    pub fn merge(&mut self, upd: OfficerUpdate) {
        if let Some(position) = upd.position {
            self.position = position;
        }
        if let Some(online) = upd.is_online {
            self.is_online = online;
        }
        merge(&mut self.name, upd.name);
        merge(&mut self.badge, upd.badge);
        merge(&mut self.rank, upd.rank);
        merge(&mut self.station, upd.station);
        merge(&mut self.district, upd.district);
        merge(&mut self.mobile, upd.mobile);
        merge(&mut self.photo, upd.photo);
        merge(&mut self.last_seen, upd.last_seen);
    }

    /// Merge a backend detail record.  Detail fields win over cached ones, live fields
    /// (position, online flag, last seen) are never touched.
    ///
    pub fn enrich(&mut self, detail: &OfficerDetail) {
        merge(&mut self.name, detail.full_name.clone());
        merge(&mut self.badge, detail.badge_number.clone());
        merge(&mut self.rank, detail.rank.clone());
        merge(&mut self.station, detail.station_name.clone());
        merge(&mut self.district, detail.district.clone());
        merge(&mut self.mobile, detail.mobile_number.clone());
        merge(&mut self.photo, detail.photo_path.clone());
        merge(&mut self.email, detail.official_email.clone());
        merge(&mut self.status, detail.status.clone());
    }
}

#[derive(Debug, Default)]
pub struct EntityStore {
    drones: BTreeMap<String, Drone>,
    officers: BTreeMap<String, Officer>,
    /// Details fetched before the officer showed up on the stream
    details: BTreeMap<String, OfficerDetail>,
}

impl EntityStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the drone record wholesale.
    ///
    #[tracing::instrument(skip(self, drone), fields(id = %drone.id))]
    pub fn upsert_drone(&mut self, drone: Drone) -> Upsert {
        match self.drones.insert(drone.id.clone(), drone) {
            Some(_) => Upsert::Updated,
            None => {
                trace!("new drone");
                Upsert::Created
            }
        }
    }

    /// Merge an officer update.  A new officer needs a position, without one nothing is stored
    /// and `None` is returned.
    ///
    #[tracing::instrument(skip(self, upd))]
    pub fn upsert_officer(&mut self, id: &str, upd: OfficerUpdate) -> Option<Upsert> {
        if let Some(officer) = self.officers.get_mut(id) {
            officer.merge(upd);
            return Some(Upsert::Updated);
        }
        let position = upd.position?;
        trace!("new officer");
        let mut officer = Officer::new(id, position, upd);
        if let Some(detail) = self.details.remove(id) {
            trace!("applying earlier details");
            officer.enrich(&detail);
        }
        self.officers.insert(id.to_string(), officer);
        Some(Upsert::Created)
    }

    /// Merge the detail record fetched for `id` into that officer.  For an officer not seen yet
    /// the record is kept and merged on creation, `false` is returned.
    ///
    #[tracing::instrument(skip(self, detail))]
    pub fn enrich_officer(&mut self, id: &str, detail: &OfficerDetail) -> bool {
        match self.officers.get_mut(id) {
            Some(officer) => {
                officer.enrich(detail);
                true
            }
            None => {
                self.details.insert(id.to_string(), detail.clone());
                false
            }
        }
    }

    /// Set or clear the SOS state of a known officer.
    ///
    pub fn set_sos(&mut self, id: &str, sos: Option<Sos>) -> bool {
        match self.officers.get_mut(id) {
            Some(officer) => {
                officer.sos = sos;
                true
            }
            None => false,
        }
    }

    pub fn drone(&self, id: &str) -> Option<&Drone> {
        self.drones.get(id)
    }

    pub fn officer(&self, id: &str) -> Option<&Officer> {
        self.officers.get(id)
    }

    pub fn drones(&self) -> impl Iterator<Item = &Drone> {
        self.drones.values()
    }

    pub fn officers(&self) -> impl Iterator<Item = &Officer> {
        self.officers.values()
    }

    pub fn len(&self, kind: EntityKind) -> usize {
        match kind {
            EntityKind::Drone => self.drones.len(),
            EntityKind::Officer => self.officers.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.drones.is_empty() && self.officers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    fn drone(id: &str, lat: f64, lng: f64, battery: Option<f64>) -> Drone {
        Drone {
            id: id.to_string(),
            position: Position::new(lat, lng),
            battery,
            telemetry: Map::new(),
        }
    }

    fn located(lat: f64, lng: f64) -> OfficerUpdate {
        OfficerUpdate {
            position: Some(Position::new(lat, lng)),
            ..Default::default()
        }
    }

    #[test]
    fn test_store_starts_empty() {
        let s = EntityStore::new();
        assert!(s.is_empty());
        assert!(s.drone("D1").is_none());
        assert!(s.officer("O1").is_none());
    }

    #[test]
    fn test_drone_full_replacement() {
        let mut s = EntityStore::new();

        let mut first = drone("D1", 19.1, 77.3, Some(80.));
        first.telemetry.insert("nickname".into(), json!("hawk"));
        assert_eq!(Upsert::Created, s.upsert_drone(first));

        let second = drone("D1", 19.2, 77.4, None);
        assert_eq!(Upsert::Updated, s.upsert_drone(second.clone()));

        // No retention at all
        //
        assert_eq!(Some(&second), s.drone("D1"));
        assert_eq!(1, s.len(EntityKind::Drone));
    }

    #[test]
    fn test_officer_needs_position_to_be_created() {
        let mut s = EntityStore::new();

        let upd = OfficerUpdate {
            name: Some("Asha Rao".into()),
            ..Default::default()
        };
        assert_eq!(None, s.upsert_officer("O1", upd));
        assert!(s.officer("O1").is_none());
    }

    #[test]
    fn test_officer_partial_update_keeps_identity() {
        let mut s = EntityStore::new();

        let mut upd = located(19.2, 77.4);
        upd.name = Some("Asha Rao".into());
        upd.badge = Some("B-42".into());
        upd.is_online = Some(true);
        assert_eq!(Some(Upsert::Created), s.upsert_officer("O1", upd));

        let upd = OfficerUpdate {
            is_online: Some(false),
            ..Default::default()
        };
        assert_eq!(Some(Upsert::Updated), s.upsert_officer("O1", upd));

        let o = s.officer("O1").unwrap();
        assert_eq!(Some("Asha Rao".to_string()), o.name);
        assert_eq!(Some("B-42".to_string()), o.badge);
        assert!(!o.is_online);
        assert_eq!(Position::new(19.2, 77.4), o.position);
    }

    #[test]
    fn test_enrich_keeps_live_fields() {
        let mut s = EntityStore::new();

        let mut upd = located(19.2, 77.4);
        upd.name = Some("A. Rao".into());
        upd.is_online = Some(true);
        upd.last_seen = Some("2024-03-01T10:00:00".into());
        s.upsert_officer("O1", upd);

        // Newer location arrives before the detail fetch completes
        //
        s.upsert_officer("O1", located(19.3, 77.5));

        let detail = OfficerDetail {
            officer_id: "O1".into(),
            full_name: Some("Asha Rao".into()),
            rank: Some("Inspector".into()),
            photo_path: Some("static/uploads/photos/o1.jpg".into()),
            ..Default::default()
        };
        assert!(s.enrich_officer("O1", &detail));

        let o = s.officer("O1").unwrap();
        assert_eq!(Some("Asha Rao".to_string()), o.name);
        assert_eq!(Some("Inspector".to_string()), o.rank);
        assert_eq!(Position::new(19.3, 77.5), o.position);
        assert!(o.is_online);
        assert_eq!(Some("2024-03-01T10:00:00".to_string()), o.last_seen);
    }

    #[test]
    fn test_enrich_unknown_officer() {
        let mut s = EntityStore::new();
        let detail = OfficerDetail {
            officer_id: "O9".into(),
            ..Default::default()
        };
        assert!(!s.enrich_officer("O9", &detail));
        assert!(s.is_empty());
    }

    #[test]
    fn test_early_details_applied_on_creation() {
        let mut s = EntityStore::new();
        let detail = OfficerDetail {
            officer_id: "O7".into(),
            full_name: Some("Meera Iyer".into()),
            rank: Some("Sub-Inspector".into()),
            ..Default::default()
        };
        assert!(!s.enrich_officer("O7", &detail));

        // No position, still nothing
        //
        assert_eq!(None, s.upsert_officer("O7", OfficerUpdate::default()));

        let upd = OfficerUpdate {
            is_online: Some(true),
            ..located(19.2, 77.1)
        };
        assert_eq!(Some(Upsert::Created), s.upsert_officer("O7", upd));

        let o = s.officer("O7").unwrap();
        assert_eq!(Some("Meera Iyer".to_string()), o.name);
        assert_eq!(Some("Sub-Inspector".to_string()), o.rank);
        assert_eq!(Position::new(19.2, 77.1), o.position);
        assert!(o.is_online);
    }

    #[test]
    fn test_sos_set_and_clear() {
        let mut s = EntityStore::new();
        s.upsert_officer("O1", located(1., 2.));

        assert!(s.set_sos("O1", Some(Sos::default())));
        assert!(s.officer("O1").unwrap().sos.is_some());
        assert!(s.set_sos("O1", None));
        assert!(s.officer("O1").unwrap().sos.is_none());
        assert!(!s.set_sos("O2", None));
    }

    #[test]
    fn test_telemetry_str() {
        let mut d = drone("D1", 1., 2., None);
        d.telemetry.insert("nickname".into(), json!("hawk"));
        d.telemetry.insert("speed".into(), json!(3.5));
        d.telemetry.insert("alt".into(), Value::Null);

        assert_eq!(Some("hawk".to_string()), d.telemetry_str("nickname"));
        assert_eq!(Some("3.5".to_string()), d.telemetry_str("speed"));
        assert_eq!(None, d.telemetry_str("alt"));
        assert_eq!(None, d.telemetry_str("heading"));
    }

    fn arb_update() -> impl Strategy<Value = OfficerUpdate> {
        (
            proptest::option::of("[A-Z][a-z]{1,8}( [A-Z][a-z]{1,8})?"),
            proptest::option::of("B-[0-9]{1,4}"),
            proptest::option::of(any::<bool>()),
            proptest::option::of((-80.0..80.0f64, -170.0..170.0f64)),
        )
            .prop_map(|(name, badge, is_online, pos)| OfficerUpdate {
                position: pos.map(Position::from),
                name,
                badge,
                is_online,
                ..Default::default()
            })
    }

    proptest! {
        #[test]
        fn prop_officer_fields_are_never_erased(updates in proptest::collection::vec(arb_update(), 1..20)) {
            let mut s = EntityStore::new();
            s.upsert_officer("O1", located(0., 0.));

            let mut name = None;
            let mut badge = None;
            let mut online = false;
            let mut position = Position::new(0., 0.);
            for upd in updates {
                if upd.name.is_some() { name = upd.name.clone(); }
                if upd.badge.is_some() { badge = upd.badge.clone(); }
                if let Some(o) = upd.is_online { online = o; }
                if let Some(p) = upd.position { position = p; }
                s.upsert_officer("O1", upd);
            }

            let o = s.officer("O1").unwrap();
            prop_assert_eq!(&name, &o.name);
            prop_assert_eq!(&badge, &o.badge);
            prop_assert_eq!(online, o.is_online);
            prop_assert_eq!(position, o.position);
        }
    }
}
