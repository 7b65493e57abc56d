//! Commands sent back to the drones through the structured-data stream.
//!

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use strum::EnumString;

use fleetwatch_common::Position;

/// Simple actions addressed to a single drone.
///
#[derive(
    Clone, Copy, Debug, Deserialize, EnumString, Eq, PartialEq, Serialize, strum::Display,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
pub enum Action {
    /// Return to launch
    Rtl,
    /// Land where it is
    Land,
}

/// Navigation actions, carrying a target.
///
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize, strum::Display)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum GotoKind {
    Goto,
    EmergencyGoto,
}

/// Outbound command, serialized as a flat JSON object.
///
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Command {
    Action {
        drone_id: String,
        action: Action,
        timestamp: String,
    },
    Goto {
        drone_id: String,
        action: GotoKind,
        target_lat: f64,
        target_lng: f64,
    },
}

impl Command {
    /// Named action, stamped with the current time.
    ///
    pub fn action(drone_id: &str, action: Action) -> Self {
        Command::Action {
            drone_id: drone_id.to_string(),
            action,
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }

    /// Go to `target`.
    ///
    pub fn goto(drone_id: &str, kind: GotoKind, target: Position) -> Self {
        Command::Goto {
            drone_id: drone_id.to_string(),
            action: kind,
            target_lat: target.lat,
            target_lng: target.lng,
        }
    }

    pub fn drone_id(&self) -> &str {
        match self {
            Command::Action { drone_id, .. } | Command::Goto { drone_id, .. } => drone_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    #[test]
    fn test_action_command_shape() {
        let c = Command::action("D1", Action::Rtl);
        let v: Value = serde_json::to_value(&c).unwrap();

        assert_eq!(json!("D1"), v["drone_id"]);
        assert_eq!(json!("RTL"), v["action"]);
        assert!(v["timestamp"].is_string());
        assert_eq!(3, v.as_object().unwrap().len());
    }

    #[test]
    fn test_goto_command_shape() {
        let c = Command::goto("D2", GotoKind::EmergencyGoto, Position::new(19.1, 77.3));
        let v: Value = serde_json::to_value(&c).unwrap();

        assert_eq!(
            json!({"drone_id": "D2", "action": "EMERGENCY_GOTO", "target_lat": 19.1, "target_lng": 77.3}),
            v
        );
        assert_eq!("D2", c.drone_id());
    }

    #[test]
    fn test_action_parse() {
        assert_eq!(Action::Land, "land".parse::<Action>().unwrap());
        assert_eq!(Action::Rtl, "RTL".parse::<Action>().unwrap());
        assert!("fly".parse::<Action>().is_err());
    }
}
