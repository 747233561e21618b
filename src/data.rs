use crate::error::RosterResult;
use sqlx::SqliteConnection;

pub mod student;

///every operation touches at most one row, in a single statement
pub trait DataType: Sized {
    type Id;
    type FormForAdding;

    async fn get_from_db_by_id(id: Self::Id, conn: &mut SqliteConnection) -> RosterResult<Option<Self>>;
    async fn get_all(conn: &mut SqliteConnection) -> RosterResult<Vec<Self>>;
    async fn count(conn: &mut SqliteConnection) -> RosterResult<i64>;
    async fn insert_into_database(
        to_be_added: Self::FormForAdding,
        conn: &mut SqliteConnection,
    ) -> RosterResult<Self>;
    ///`None` if nothing had that id
    async fn update_in_database(
        id: Self::Id,
        replacement: Self::FormForAdding,
        conn: &mut SqliteConnection,
    ) -> RosterResult<Option<Self>>;
    ///returns the row as it was just before it was removed
    async fn remove_from_database(id: Self::Id, conn: &mut SqliteConnection) -> RosterResult<Option<Self>>;
}
