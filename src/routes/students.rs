use crate::{
    data::{
        DataType,
        student::{Student, StudentFields, ValidStudent},
    },
    error::{InvalidBodySnafu, MissingStudentSnafu, RosterResult},
    routes::parse_id,
    state::RosterState,
};
use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
};
use snafu::{OptionExt, ResultExt};

///shared with the page handlers so both go through the same checks
pub async fn create_student(state: &RosterState, fields: StudentFields) -> RosterResult<Student> {
    let to_be_added = ValidStudent::try_from(fields)?;
    let student = Student::insert_into_database(to_be_added, &mut *state.get_connection().await?).await?;
    info!(id = student.id, "Created student");
    Ok(student)
}

///a bad body is reported before an unknown id
pub async fn update_student(state: &RosterState, id: i64, fields: StudentFields) -> RosterResult<Student> {
    let replacement = ValidStudent::try_from(fields)?;
    let student = Student::update_in_database(id, replacement, &mut *state.get_connection().await?)
        .await?
        .context(MissingStudentSnafu { id: id.to_string() })?;
    info!(id, "Updated student");
    Ok(student)
}

pub async fn remove_student(state: &RosterState, id: i64) -> RosterResult<Student> {
    let student = Student::remove_from_database(id, &mut *state.get_connection().await?)
        .await?
        .context(MissingStudentSnafu { id: id.to_string() })?;
    info!(id, "Deleted student");
    Ok(student)
}

pub async fn find_student(state: &RosterState, id: i64) -> RosterResult<Student> {
    Student::get_from_db_by_id(id, &mut *state.get_connection().await?)
        .await?
        .context(MissingStudentSnafu { id: id.to_string() })
}

pub async fn all_students(state: &RosterState) -> RosterResult<Vec<Student>> {
    Student::get_all(&mut *state.get_connection().await?).await
}

pub async fn get_students(State(state): State<RosterState>) -> RosterResult<Json<Vec<Student>>> {
    Ok(Json(all_students(&state).await?))
}

pub async fn get_student(
    State(state): State<RosterState>,
    Path(id): Path<String>,
) -> RosterResult<Json<Student>> {
    Ok(Json(find_student(&state, parse_id(&id)?).await?))
}

pub async fn post_student(
    State(state): State<RosterState>,
    body: Result<Json<StudentFields>, JsonRejection>,
) -> RosterResult<(StatusCode, Json<Student>)> {
    let Json(fields) = body.context(InvalidBodySnafu)?;
    let student = create_student(&state, fields).await?;
    Ok((StatusCode::CREATED, Json(student)))
}

pub async fn put_student(
    State(state): State<RosterState>,
    Path(id): Path<String>,
    body: Result<Json<StudentFields>, JsonRejection>,
) -> RosterResult<Json<Student>> {
    let Json(fields) = body.context(InvalidBodySnafu)?;
    Ok(Json(update_student(&state, parse_id(&id)?, fields).await?))
}

pub async fn delete_student(
    State(state): State<RosterState>,
    Path(id): Path<String>,
) -> RosterResult<Json<Student>> {
    Ok(Json(remove_student(&state, parse_id(&id)?).await?))
}
