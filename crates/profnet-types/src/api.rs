use chrono::NaiveDate;

// -- Auth --

#[derive(Debug, Clone)]
pub struct RegisterRequest {
    pub user_id: String,
    pub password: String,
    pub email: String,
}

#[derive(Debug, Clone)]
pub struct LoginRequest {
    pub user_id: String,
    pub password: String,
}

// -- Profile --

#[derive(Debug, Clone)]
pub struct NewWorkExperience {
    pub company: String,
    pub role: String,
    pub location: String,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
}

#[derive(Debug, Clone)]
pub struct NewEducationDetail {
    pub institution: String,
    pub major: String,
    pub degree: String,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
}

// -- Connections --

/// Why a connection request was allowed through the gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    /// Fewer than the threshold of accepted connections: anyone may be asked.
    BelowThreshold,
    /// Enough connections, and the target is within three hops.
    WithinReach,
}
