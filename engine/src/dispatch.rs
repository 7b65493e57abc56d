//! Command dispatch.
//!
//! Named actions go to the selected drone.  Go-to commands need a target, given by the next map
//! click after arming: either for the selected drone (`SetTarget`) or for whichever drone is the
//! nearest to the click (`Emergency`).  Arming only lasts for one click.
//!

use std::mem;

use tracing::{debug, info};

use fleetwatch_common::Position;
use fleetwatch_formats::{Action, Command, GotoKind};

use crate::{Dashboard, DispatchError, Drone, Surface};

/// What the next map click will do.
///
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum Arming {
    #[default]
    Idle,
    SetTarget,
    Emergency,
}

/// Nearest drone to `target` with its distance in meters.  Ties go to the first one seen.
///
pub fn nearest_drone<'a>(
    drones: impl IntoIterator<Item = &'a Drone>,
    target: Position,
) -> Option<(&'a Drone, f64)> {
    drones.into_iter().fold(None, |best, d| {
        let dist = d.position.haversine_distance(&target);
        match best {
            Some((_, b)) if b <= dist => best,
            _ => Some((d, dist)),
        }
    })
}

impl<S: Surface> Dashboard<S> {
    /// Send `action` to the selected drone.
    ///
    #[tracing::instrument(skip(self))]
    pub fn send_action(&mut self, action: Action) -> Result<Command, DispatchError> {
        let Some(id) = self.selection.drone().map(String::from) else {
            return Err(self.refuse(DispatchError::NoDroneSelected));
        };
        let cmd = Command::action(&id, action);
        self.send(&cmd);
        self.render
            .surface_mut()
            .notify(&format!("{action} sent to {id}"));
        Ok(cmd)
    }

    /// Arm (or disarm) the next map click.
    ///
    pub fn arm(&mut self, mode: Arming) {
        debug!("arming: {mode}");
        self.arming = mode;
        let msg = match mode {
            Arming::Idle => return,
            Arming::SetTarget => "Click on the map to set the target",
            Arming::Emergency => "Click on the map to dispatch the nearest drone",
        };
        self.render.surface_mut().notify(msg);
    }

    /// Map click.  Returns the command sent, if any.
    ///
    #[tracing::instrument(skip(self))]
    pub fn map_click(&mut self, at: Position) -> Result<Option<Command>, DispatchError> {
        match mem::take(&mut self.arming) {
            Arming::Idle => Ok(None),
            Arming::SetTarget => {
                let Some(id) = self.selection.drone().map(String::from) else {
                    return Err(self.refuse(DispatchError::NoDroneSelected));
                };
                let cmd = Command::goto(&id, GotoKind::Goto, at);
                self.send(&cmd);
                self.render
                    .surface_mut()
                    .notify(&format!("{id} going to {at}"));
                Ok(Some(cmd))
            }
            Arming::Emergency => {
                let nearest =
                    nearest_drone(self.store.drones(), at).map(|(d, dist)| (d.id.clone(), dist));
                let Some((id, dist)) = nearest else {
                    return Err(self.refuse(DispatchError::EmptyFleet));
                };
                info!("emergency dispatch of {id}, {dist:.0} m away");
                let cmd = Command::goto(&id, GotoKind::EmergencyGoto, at);
                self.send(&cmd);
                self.render.surface_mut().notify(&format!(
                    "Emergency dispatch: {id} ({:.2} km away)",
                    dist / 1000.
                ));
                Ok(Some(cmd))
            }
        }
    }

    /// Dispatch errors are blocking alerts.
    ///
    fn refuse(&mut self, e: DispatchError) -> DispatchError {
        self.render.surface_mut().alert(&e.to_string());
        e
    }
}
