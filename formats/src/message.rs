//! Messages received on the structured-data stream (`/ws/locations`).
//!
//! Every message is a JSON object with a `type` discriminator.  A `snapshot` is sent right
//! after connecting and carries the full set of known entities, then incremental updates follow.
//!

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Top-level message.
///
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Envelope {
    /// Full state at connection time.
    Snapshot(Snapshot),
    /// Drone position/telemetry, `status` carries the same fields.
    #[serde(alias = "status")]
    LocationUpdate(DroneMsg),
    /// Officer position and/or presence, `officer_status` carries the same fields.
    #[serde(alias = "officer_status")]
    OfficerLocationUpdate(OfficerMsg),
    /// An officer triggered an SOS.
    OfficerSosAlert(SosAlert),
    /// An SOS has been cancelled.
    OfficerSosCancelled(SosCancel),
    /// Anything we do not know about.
    #[serde(other)]
    Unknown,
}

impl Envelope {
    /// Name of the message kind, for logging.
    ///
    pub fn kind(&self) -> &'static str {
        match self {
            Envelope::Snapshot(_) => "snapshot",
            Envelope::LocationUpdate(_) => "location_update",
            Envelope::OfficerLocationUpdate(_) => "officer_location_update",
            Envelope::OfficerSosAlert(_) => "officer_sos_alert",
            Envelope::OfficerSosCancelled(_) => "officer_sos_cancelled",
            Envelope::Unknown => "unknown",
        }
    }
}

/// Snapshot records are kept raw so that each one can be validated on its own; a single bad
/// record must not take the whole batch with it.
///
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct Snapshot {
    #[serde(default)]
    pub drones: Vec<Value>,
    #[serde(default)]
    pub officers: Vec<Value>,
}

/// Location as stored by the backend, nested under `last_location`.
///
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct LastLocation {
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    /// `speed`, `alt`, `heading`, `accuracy`, `timestamp`…
    #[serde(flatten)]
    pub rest: Map<String, Value>,
}

/// Drone update, either incremental or from a snapshot.
///
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct DroneMsg {
    pub drone_id: Option<String>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub battery: Option<f64>,
    pub last_location: Option<LastLocation>,
    /// Any other telemetry field (`nickname`, `is_live`, `speed`, `alt`…)
    #[serde(flatten)]
    pub telemetry: Map<String, Value>,
}

/// Officer update, either incremental or from a snapshot.
///
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct OfficerMsg {
    pub officer_id: Option<String>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub last_location: Option<LastLocation>,
    pub officer_name: Option<String>,
    pub badge_number: Option<String>,
    pub rank: Option<String>,
    pub station_name: Option<String>,
    pub district: Option<String>,
    pub mobile_number: Option<String>,
    pub photo_path: Option<String>,
    pub is_online: Option<bool>,
    pub timestamp: Option<String>,
    pub last_seen: Option<String>,
    pub accuracy: Option<f64>,
}

/// SOS raised by an officer from the field application.
///
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct SosAlert {
    pub officer_id: Option<String>,
    pub officer_name: Option<String>,
    pub badge_number: Option<String>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    /// `high_emergency`, `audio_message` or `text_message`
    pub emergency_type: Option<String>,
    pub message_text: Option<String>,
    pub audio_url: Option<String>,
    pub audio_duration: Option<f64>,
    pub triggered_at: Option<String>,
    #[serde(default)]
    pub nearby_officers: Vec<String>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct SosCancel {
    pub officer_id: Option<String>,
    pub reason: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_drone_location_update() {
        let s = r##"{"type":"location_update","drone_id":"D1","lat":19.1,"lng":77.3,"battery":15,"speed":3.5}"##;
        let m: Envelope = serde_json::from_str(s).unwrap();

        match m {
            Envelope::LocationUpdate(d) => {
                assert_eq!(Some("D1".to_string()), d.drone_id);
                assert_eq!(Some(19.1), d.lat);
                assert_eq!(Some(77.3), d.lng);
                assert_eq!(Some(15.0), d.battery);
                assert_eq!(Some(&Value::from(3.5)), d.telemetry.get("speed"));
                assert!(!d.telemetry.contains_key("type"));
            }
            _ => panic!("wrong kind"),
        }
    }

    #[rstest]
    #[case(r##"{"type":"status","drone_id":"D1","is_live":false}"##, "location_update")]
    #[case(r##"{"type":"officer_status","officer_id":"O1","is_online":true}"##, "officer_location_update")]
    #[case(r##"{"type":"officer_location_update","officer_id":"O1"}"##, "officer_location_update")]
    #[case(r##"{"type":"snapshot","drones":[],"officers":[]}"##, "snapshot")]
    #[case(r##"{"type":"snapshot"}"##, "snapshot")]
    #[case(r##"{"type":"officer_sos_alert","officer_id":"O1"}"##, "officer_sos_alert")]
    #[case(r##"{"type":"officer_sos_cancelled","officer_id":"O1","reason":"ok"}"##, "officer_sos_cancelled")]
    #[case(r##"{"type":"weather","wind":12}"##, "unknown")]
    fn test_envelope_kind(#[case] s: &str, #[case] kind: &str) {
        let m: Envelope = serde_json::from_str(s).unwrap();
        assert_eq!(kind, m.kind());
    }

    #[test]
    fn test_officer_nested_location() {
        let s = r##"{"type":"officer_location_update","officer_id":"O1","officer_name":"Asha Rao","last_location":{"lat":19.2,"lng":77.4,"accuracy":5.0},"is_online":true}"##;
        let m: Envelope = serde_json::from_str(s).unwrap();

        let Envelope::OfficerLocationUpdate(o) = m else {
            panic!("wrong kind");
        };
        assert_eq!(None, o.lat);
        let loc = o.last_location.unwrap();
        assert_eq!(Some(19.2), loc.lat);
        assert_eq!(Some(77.4), loc.lng);
        assert!(loc.rest.contains_key("accuracy"));
    }

    #[test]
    fn test_snapshot_keeps_raw_records() {
        let s = r##"{"type":"snapshot","drones":[{"drone_id":"D1","last_location":{"lat":1.0,"lng":2.0}},{"bogus":true}],"officers":[{"officer_id":"O1"}]}"##;
        let Envelope::Snapshot(snap) = serde_json::from_str(s).unwrap() else {
            panic!("wrong kind");
        };
        assert_eq!(2, snap.drones.len());
        assert_eq!(1, snap.officers.len());
    }

    #[test]
    fn test_missing_type_is_an_error() {
        let s = r##"{"drone_id":"D1","lat":1.0,"lng":2.0}"##;
        assert!(serde_json::from_str::<Envelope>(s).is_err());
    }
}
