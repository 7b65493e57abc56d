//! `admin` sub-commands: the registration approval workflow.
//!

use eyre::Result;
use tabled::builder::Builder;
use tabled::settings::Style;
use tracing::{info, trace};

use fleetwatch_engine::BackendClient;
use fleetwatch_formats::RegistrationRequest;

use crate::{AdminOpts, AdminSubCommand};

/// Placeholder for fields the backend did not fill.
const NONE: &str = "-";

/// Pending requests as a table.
///
pub fn requests_table(reqs: &[RegistrationRequest]) -> String {
    let header = vec!["ID", "Name", "Rank", "Badge", "Station", "District", "Created"];

    let mut builder = Builder::default();
    builder.push_record(header);

    for r in reqs {
        let row = [
            Some(&r.request_id),
            r.full_name.as_ref(),
            r.rank.as_ref(),
            r.badge_number.as_ref(),
            r.station_name.as_ref(),
            r.district.as_ref(),
            r.created_at.as_ref(),
        ]
        .map(|f| f.map_or(NONE.to_string(), String::clone));
        builder.push_record(row);
    }

    let table = builder.build().with(Style::rounded()).to_string();
    format!("{} pending request(s):\n{}", reqs.len(), table)
}

#[tracing::instrument(skip(client))]
pub async fn admin(client: &BackendClient, opts: &AdminOpts) -> Result<()> {
    match &opts.subcmd {
        // Handle `admin list`
        //
        AdminSubCommand::List => {
            trace!("admin list");

            let reqs = client.pending_requests().await?;
            println!("{}", requests_table(&reqs));
        }

        // Handle `admin approve ID`
        //
        AdminSubCommand::Approve(aopts) => {
            trace!("admin approve");

            let res = client.approve(&aopts.id).await?;
            info!("request {} {}", aopts.id, res.status);
            println!("Request {} approved, officer ID is {}", aopts.id, res.officer_id);
        }
    }
    Ok(())
}
