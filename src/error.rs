use crate::data::student::AGE_RANGE;
use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
};
use serde_json::json;
use snafu::Snafu;
use std::num::ParseIntError;

pub type RosterResult<T> = Result<T, RosterError>;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum RosterError {
    #[snafu(display("Error opening database"))]
    OpenDatabase { source: sqlx::Error },
    #[snafu(display("Error getting db connection"))]
    GetDatabaseConnection { source: sqlx::Error },
    #[snafu(display("Error making SQL query"))]
    MakeQuery { source: sqlx::Error },
    #[snafu(display("Error migrating DB schema"))]
    Migrate { source: sqlx::migrate::MigrateError },
    #[snafu(display("Unable to retrieve env var `{}`", name))]
    BadEnvVar {
        source: dotenvy::Error,
        name: &'static str,
    },
    #[snafu(display("Unable to parse IP port {:?}", original))]
    ParsePort {
        source: ParseIntError,
        original: String,
    },
    #[snafu(display("Unable to listen on {}", address))]
    BindListener {
        source: std::io::Error,
        address: String,
    },
    #[snafu(display("Error serving app"))]
    Serve { source: std::io::Error },
    #[snafu(display("Missing required fields: {}", fields.join(", ")))]
    MissingFields { fields: Vec<&'static str> },
    #[snafu(display("Age must be a whole number, got {:?}", original))]
    InvalidAge {
        source: ParseIntError,
        original: String,
    },
    #[snafu(display(
        "Age must be between {} and {}, got {}",
        AGE_RANGE.start(),
        AGE_RANGE.end(),
        age
    ))]
    AgeOutOfRange { age: i64 },
    #[snafu(display("Invalid request body: {}", source.body_text()))]
    InvalidBody { source: JsonRejection },
    #[snafu(display("Unable to find student with ID: {}", id))]
    MissingStudent { id: String },
    #[snafu(display("Route {} {} not found", method, path))]
    RouteNotFound { method: Method, path: String },
    #[snafu(display("Unhandled error: {}", message))]
    Unhandled { message: String },
}

impl RosterError {
    #[allow(clippy::match_same_arms)]
    pub const fn status_code(&self) -> StatusCode {
        const ISE: StatusCode = StatusCode::INTERNAL_SERVER_ERROR; //internal server error
        const NF: StatusCode = StatusCode::NOT_FOUND; //not found
        const BI: StatusCode = StatusCode::BAD_REQUEST; //bad input

        match self {
            Self::OpenDatabase { .. } | Self::GetDatabaseConnection { .. } => ISE,
            Self::MakeQuery { .. } | Self::Migrate { .. } => ISE,
            Self::BadEnvVar { .. } | Self::ParsePort { .. } => ISE,
            Self::BindListener { .. } | Self::Serve { .. } => ISE,
            Self::MissingFields { .. } => BI,
            Self::InvalidAge { .. } | Self::AgeOutOfRange { .. } => BI,
            Self::InvalidBody { .. } => BI,
            Self::MissingStudent { .. } => NF,
            Self::RouteNotFound { .. } => NF,
            Self::Unhandled { .. } => ISE,
        }
    }
}

impl IntoResponse for RosterError {
    fn into_response(self) -> Response {
        let status_code = self.status_code();

        // server-side detail stays in the logs
        let message = if status_code.is_server_error() {
            error!(?self, "Error!");
            "Internal server error".to_string()
        } else {
            warn!(%self, "Rejected request");
            self.to_string()
        };

        (status_code, Json(json!({ "error": message }))).into_response()
    }
}
