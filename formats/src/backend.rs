//! Request/response bodies for the backend REST calls.
//!

use serde::{Deserialize, Serialize};

/// `GET /api/officer/{id}/details`
///
/// Combines the officer record with its approved registration, hence all the optional fields.
///
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct OfficerDetail {
    pub officer_id: String,
    pub full_name: Option<String>,
    pub mobile_number: Option<String>,
    pub badge_number: Option<String>,
    pub status: Option<String>,
    pub rank: Option<String>,
    pub station_name: Option<String>,
    pub district: Option<String>,
    pub state: Option<String>,
    pub official_email: Option<String>,
    pub photo_path: Option<String>,
    pub service_id: Option<String>,
    pub dob: Option<String>,
}

/// One pending registration.
///
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct RegistrationRequest {
    pub request_id: String,
    pub full_name: Option<String>,
    pub mobile_number: Option<String>,
    pub official_email: Option<String>,
    pub badge_number: Option<String>,
    pub rank: Option<String>,
    pub station_name: Option<String>,
    pub district: Option<String>,
    pub state: Option<String>,
    pub service_id: Option<String>,
    pub status: Option<String>,
    pub created_at: Option<String>,
    pub pdf_path: Option<String>,
}

/// `GET /api/admin/requests`
///
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct PendingRequests {
    #[serde(default)]
    pub requests: Vec<RegistrationRequest>,
}

/// `POST /api/admin/approve/{id}`
///
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct Approval {
    pub status: String,
    pub officer_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_officer_detail_partial() {
        let s = r##"{"officer_id":"POL-ABC123","full_name":"Asha Rao","mobile_number":"9000000000","badge_number":"B-42","status":"Active"}"##;
        let d: OfficerDetail = serde_json::from_str(s).unwrap();

        assert_eq!("POL-ABC123", d.officer_id);
        assert_eq!(Some("Asha Rao".to_string()), d.full_name);
        assert_eq!(None, d.photo_path);
    }

    #[test]
    fn test_pending_requests_ignores_extra_fields() {
        let s = r##"{"requests":[{"_id":"65f0","request_id":"r1","full_name":"Vikram","biometric_enabled":false}]}"##;
        let p: PendingRequests = serde_json::from_str(s).unwrap();

        assert_eq!(1, p.requests.len());
        assert_eq!("r1", p.requests[0].request_id);
    }

    #[test]
    fn test_approval() {
        let s = r##"{"status":"approved","officer_id":"POL-1A2B3C"}"##;
        let a: Approval = serde_json::from_str(s).unwrap();
        assert_eq!("POL-1A2B3C", a.officer_id);
    }
}
