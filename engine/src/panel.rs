//! Detail panels for the selected entity.
//!
//! Panels are plain snapshots of a store record, rebuilt on every refresh.  Rendering them is
//! left to the `Surface`, `rows()` gives a generic label/value view.
//!

use serde::Serialize;
use strum::EnumString;

use fleetwatch_common::Position;
use fleetwatch_formats::OfficerDetail;

use crate::{initials, Drone, EntityKind, Officer};

/// Below this percentage the battery indicator is in the low state.
pub const LOW_BATTERY: f64 = 20.;

#[derive(
    Clone, Copy, Debug, Default, EnumString, Eq, PartialEq, Serialize, strum::Display,
)]
#[strum(serialize_all = "lowercase")]
pub enum BatteryState {
    Low,
    Ok,
    #[default]
    Unknown,
}

impl BatteryState {
    pub fn from_level(level: Option<f64>) -> Self {
        match level {
            Some(l) if l < LOW_BATTERY => BatteryState::Low,
            Some(_) => BatteryState::Ok,
            None => BatteryState::Unknown,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DronePanel {
    pub id: String,
    pub nickname: Option<String>,
    pub position: Position,
    pub battery: Option<f64>,
    pub battery_state: BatteryState,
    pub speed: Option<String>,
    pub alt: Option<String>,
    pub heading: Option<String>,
    pub live: Option<String>,
}

impl From<&Drone> for DronePanel {
    fn from(d: &Drone) -> Self {
        DronePanel {
            id: d.id.clone(),
            nickname: d.telemetry_str("nickname"),
            position: d.position,
            battery: d.battery,
            battery_state: BatteryState::from_level(d.battery),
            speed: d.telemetry_str("speed"),
            alt: d.telemetry_str("alt"),
            heading: d.telemetry_str("heading"),
            live: d.telemetry_str("is_live"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct OfficerPanel {
    pub id: String,
    pub initials: String,
    pub name: Option<String>,
    pub badge: Option<String>,
    pub rank: Option<String>,
    pub station: Option<String>,
    pub district: Option<String>,
    pub mobile: Option<String>,
    pub email: Option<String>,
    pub photo: Option<String>,
    pub online: bool,
    pub last_seen: Option<String>,
    /// Absent until the first positioned update
    pub position: Option<Position>,
    pub sos: Option<String>,
}

impl From<&Officer> for OfficerPanel {
    fn from(o: &Officer) -> Self {
        OfficerPanel {
            id: o.id.clone(),
            initials: initials(o.name.as_deref()),
            name: o.name.clone(),
            badge: o.badge.clone(),
            rank: o.rank.clone(),
            station: o.station.clone(),
            district: o.district.clone(),
            mobile: o.mobile.clone(),
            email: o.email.clone(),
            photo: o.photo.clone(),
            online: o.is_online,
            last_seen: o.last_seen.clone(),
            position: Some(o.position),
            sos: o.sos.as_ref().map(|s| {
                s.emergency_type
                    .clone()
                    .unwrap_or_else(|| "emergency".to_string())
            }),
        }
    }
}

/// Officer we only know from the backend, no live data yet.
///
impl From<&OfficerDetail> for OfficerPanel {
    fn from(d: &OfficerDetail) -> Self {
        OfficerPanel {
            id: d.officer_id.clone(),
            initials: initials(d.full_name.as_deref()),
            name: d.full_name.clone(),
            badge: d.badge_number.clone(),
            rank: d.rank.clone(),
            station: d.station_name.clone(),
            district: d.district.clone(),
            mobile: d.mobile_number.clone(),
            email: d.official_email.clone(),
            photo: d.photo_path.clone(),
            online: false,
            last_seen: None,
            position: None,
            sos: None,
        }
    }
}

/// One of the two panels.
///
#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum Panel {
    Drone(DronePanel),
    Officer(OfficerPanel),
}

#[inline]
fn opt(v: &Option<String>) -> String {
    v.clone().unwrap_or_else(|| "-".to_string())
}

impl Panel {
    pub fn kind(&self) -> EntityKind {
        match self {
            Panel::Drone(_) => EntityKind::Drone,
            Panel::Officer(_) => EntityKind::Officer,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            Panel::Drone(p) => &p.id,
            Panel::Officer(p) => &p.id,
        }
    }

    /// Label/value pairs in display order, absent values shown as `-`.
    ///
    pub fn rows(&self) -> Vec<(&'static str, String)> {
        match self {
            Panel::Drone(p) => vec![
                ("Drone", p.id.clone()),
                ("Nickname", opt(&p.nickname)),
                ("Position", p.position.to_string()),
                (
                    "Battery",
                    match p.battery {
                        Some(b) => format!("{:.0}% ({})", b, p.battery_state),
                        None => "-".to_string(),
                    },
                ),
                ("Speed", opt(&p.speed)),
                ("Altitude", opt(&p.alt)),
                ("Heading", opt(&p.heading)),
                ("Live", opt(&p.live)),
            ],
            Panel::Officer(p) => vec![
                ("Officer", p.id.clone()),
                ("Initials", p.initials.clone()),
                ("Name", opt(&p.name)),
                ("Badge", opt(&p.badge)),
                ("Rank", opt(&p.rank)),
                ("Station", opt(&p.station)),
                ("District", opt(&p.district)),
                ("Mobile", opt(&p.mobile)),
                ("Email", opt(&p.email)),
                ("Photo", opt(&p.photo)),
                (
                    "Status",
                    if p.online { "online" } else { "offline" }.to_string(),
                ),
                ("Last seen", opt(&p.last_seen)),
                ("Position", p.position.map_or("-".to_string(), |pos| pos.to_string())),
                ("SOS", opt(&p.sos)),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::{json, Map};

    #[rstest]
    #[case(Some(15.), BatteryState::Low)]
    #[case(Some(19.9), BatteryState::Low)]
    #[case(Some(20.), BatteryState::Ok)]
    #[case(Some(100.), BatteryState::Ok)]
    #[case(None, BatteryState::Unknown)]
    fn test_battery_state(#[case] level: Option<f64>, #[case] state: BatteryState) {
        assert_eq!(state, BatteryState::from_level(level));
    }

    #[test]
    fn test_drone_panel() {
        let mut telemetry = Map::new();
        telemetry.insert("nickname".into(), json!("hawk"));
        let d = Drone {
            id: "D1".into(),
            position: Position::new(19.1, 77.3),
            battery: Some(15.),
            telemetry,
        };
        let p = Panel::Drone(DronePanel::from(&d));

        assert_eq!(EntityKind::Drone, p.kind());
        assert_eq!("D1", p.id());
        let rows = p.rows();
        assert_eq!(("Nickname", "hawk".to_string()), rows[1]);
        assert_eq!(("Battery", "15% (low)".to_string()), rows[3]);
        assert_eq!(("Speed", "-".to_string()), rows[4]);
    }

    #[test]
    fn test_officer_panel_from_detail() {
        let d = OfficerDetail {
            officer_id: "O7".into(),
            full_name: Some("Meera Iyer".into()),
            rank: Some("Sub-Inspector".into()),
            ..Default::default()
        };
        let p = Panel::Officer(OfficerPanel::from(&d));

        assert_eq!("O7", p.id());
        let rows = p.rows();
        assert_eq!(("Initials", "MI".to_string()), rows[1]);
        assert_eq!(("Rank", "Sub-Inspector".to_string()), rows[4]);
        assert_eq!(("Status", "offline".to_string()), rows[10]);
        assert_eq!(("Position", "-".to_string()), rows[12]);
    }
}
