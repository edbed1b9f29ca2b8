use serde::Deserialize;

/// One `(health centre, specialty)` pair. Every key in the cartesian product
/// of the configured lists is queried exactly once per run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct JobKey {
    pub health_centre_id: i64,
    pub specialty_id: i64,
}

/// Body of a successful login response.
#[derive(Debug, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub customer_id: String,
}

/// One open appointment slot as returned by the availability endpoint.
///
/// Slots keep the server's order; they are never re-sorted.
#[derive(Debug, Clone, Deserialize)]
pub struct AvailabilitySlot {
    pub availability_id: String,
    pub date_time: String,
    pub format_name: String,
    #[serde(rename = "doctor_full_name")]
    pub doctor_name: String,
    pub location_name: String,
    pub consultation_name: String,
}
