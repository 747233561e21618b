use crate::{
    data::{DataType, student::Student},
    error::RosterResult,
    state::RosterState,
};
use axum::{Json, extract::State};
use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Serialize, Debug)]
pub struct Health {
    pub status: &'static str,
    pub timestamp: DateTime<Utc>,
    pub student_count: i64,
}

pub async fn get_health(State(state): State<RosterState>) -> RosterResult<Json<Health>> {
    let student_count = Student::count(&mut *state.get_connection().await?).await?;

    Ok(Json(Health {
        status: "ok",
        timestamp: Utc::now(),
        student_count,
    }))
}
