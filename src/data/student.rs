use crate::{
    data::DataType,
    error::{
        AgeOutOfRangeSnafu, InvalidAgeSnafu, MakeQuerySnafu, MissingFieldsSnafu, RosterError,
        RosterResult,
    },
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use snafu::{ResultExt, ensure};
use sqlx::SqliteConnection;
use std::ops::RangeInclusive;

pub const AGE_RANGE: RangeInclusive<i64> = 1..=120;
pub const GENDER_CHOICES: [&str; 3] = ["Male", "Female", "Other"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct Student {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub age: i64,
    pub gender: String,
    pub created_at: DateTime<Utc>,
}

///what a client sends - anything can be missing, and age can come through as a string
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StudentFields {
    pub name: Option<String>,
    pub email: Option<String>,
    pub age: Option<RawAge>,
    pub gender: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawAge {
    Number(i64),
    Text(String),
}

impl RawAge {
    fn is_blank(&self) -> bool {
        matches!(self, Self::Text(text) if text.trim().is_empty())
    }

    fn coerce(self) -> RosterResult<i64> {
        match self {
            Self::Number(age) => Ok(age),
            Self::Text(text) => text
                .trim()
                .parse()
                .context(InvalidAgeSnafu { original: text }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidStudent {
    pub name: String,
    pub email: String,
    pub age: i64,
    pub gender: String,
}

impl TryFrom<StudentFields> for ValidStudent {
    type Error = RosterError;

    fn try_from(fields: StudentFields) -> RosterResult<Self> {
        fn present(text: Option<String>) -> Option<String> {
            text.map(|text| text.trim().to_string())
                .filter(|text| !text.is_empty())
        }

        let name = present(fields.name);
        let email = present(fields.email);
        let age = fields.age.filter(|age| !age.is_blank());
        let gender = present(fields.gender);

        let (name, email, age, gender) = match (name, email, age, gender) {
            (Some(name), Some(email), Some(age), Some(gender)) => (name, email, age, gender),
            (name, email, age, gender) => {
                let fields: Vec<&'static str> = [
                    ("name", name.is_none()),
                    ("email", email.is_none()),
                    ("age", age.is_none()),
                    ("gender", gender.is_none()),
                ]
                .into_iter()
                .filter_map(|(field, missing)| missing.then_some(field))
                .collect();
                return MissingFieldsSnafu { fields }.fail();
            }
        };

        let age = age.coerce()?;
        ensure!(AGE_RANGE.contains(&age), AgeOutOfRangeSnafu { age });

        Ok(Self {
            name,
            email,
            age,
            gender,
        })
    }
}

impl DataType for Student {
    type Id = i64;
    type FormForAdding = ValidStudent;

    async fn get_from_db_by_id(id: Self::Id, conn: &mut SqliteConnection) -> RosterResult<Option<Self>> {
        sqlx::query_as::<_, Self>("SELECT * FROM student_details WHERE id = ?")
            .bind(id)
            .fetch_optional(conn)
            .await
            .context(MakeQuerySnafu)
    }

    async fn get_all(conn: &mut SqliteConnection) -> RosterResult<Vec<Self>> {
        sqlx::query_as::<_, Self>("SELECT * FROM student_details ORDER BY id DESC")
            .fetch_all(conn)
            .await
            .context(MakeQuerySnafu)
    }

    async fn count(conn: &mut SqliteConnection) -> RosterResult<i64> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM student_details")
            .fetch_one(conn)
            .await
            .context(MakeQuerySnafu)
    }

    async fn insert_into_database(
        to_be_added: Self::FormForAdding,
        conn: &mut SqliteConnection,
    ) -> RosterResult<Self> {
        let ValidStudent {
            name,
            email,
            age,
            gender,
        } = to_be_added;

        sqlx::query_as::<_, Self>(
            "INSERT INTO student_details (name, email, age, gender) VALUES (?, ?, ?, ?) RETURNING *",
        )
        .bind(name)
        .bind(email)
        .bind(age)
        .bind(gender)
        .fetch_one(conn)
        .await
        .context(MakeQuerySnafu)
    }

    async fn update_in_database(
        id: Self::Id,
        replacement: Self::FormForAdding,
        conn: &mut SqliteConnection,
    ) -> RosterResult<Option<Self>> {
        let ValidStudent {
            name,
            email,
            age,
            gender,
        } = replacement;

        //created_at is left alone
        sqlx::query_as::<_, Self>(
            "UPDATE student_details SET name = ?, email = ?, age = ?, gender = ? WHERE id = ? RETURNING *",
        )
        .bind(name)
        .bind(email)
        .bind(age)
        .bind(gender)
        .bind(id)
        .fetch_optional(conn)
        .await
        .context(MakeQuerySnafu)
    }

    async fn remove_from_database(id: Self::Id, conn: &mut SqliteConnection) -> RosterResult<Option<Self>> {
        sqlx::query_as::<_, Self>("DELETE FROM student_details WHERE id = ? RETURNING *")
            .bind(id)
            .fetch_optional(conn)
            .await
            .context(MakeQuerySnafu)
    }
}
