//! `officer ID`: the full record as the backend knows it.
//!

use eyre::Result;
use tabled::builder::Builder;
use tabled::settings::Style;
use tracing::trace;

use fleetwatch_engine::BackendClient;
use fleetwatch_formats::OfficerDetail;

use crate::OfficerOpts;

pub fn officer_table(d: &OfficerDetail) -> String {
    let fields = [
        ("Officer", Some(&d.officer_id)),
        ("Name", d.full_name.as_ref()),
        ("Rank", d.rank.as_ref()),
        ("Badge", d.badge_number.as_ref()),
        ("Service ID", d.service_id.as_ref()),
        ("Station", d.station_name.as_ref()),
        ("District", d.district.as_ref()),
        ("State", d.state.as_ref()),
        ("Mobile", d.mobile_number.as_ref()),
        ("Email", d.official_email.as_ref()),
        ("Status", d.status.as_ref()),
        ("Photo", d.photo_path.as_ref()),
    ];

    let mut builder = Builder::default();
    for (name, value) in fields {
        builder.push_record([name.to_string(), value.map_or("-".to_string(), String::clone)]);
    }
    builder.build().with(Style::rounded()).to_string()
}

#[tracing::instrument(skip(client))]
pub async fn officer(client: &BackendClient, opts: &OfficerOpts) -> Result<()> {
    trace!("officer {}", opts.id);

    let detail = client.officer_details(&opts.id).await?;
    println!("{}", officer_table(&detail));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_officer_table() {
        let d = OfficerDetail {
            officer_id: "POL-1A2B3C".into(),
            full_name: Some("Asha Rao".into()),
            rank: Some("Inspector".into()),
            ..OfficerDetail::default()
        };

        let t = officer_table(&d);
        assert!(t.contains("POL-1A2B3C"));
        assert!(t.contains("Asha Rao"));
        assert!(t.contains("Inspector"));
        assert!(t.contains("Mobile"));
    }
}
