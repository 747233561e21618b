use crate::{
    config::RuntimeConfiguration,
    error::{GetDatabaseConnectionSnafu, MigrateSnafu, OpenDatabaseSnafu, RosterResult},
};
use maud::{DOCTYPE, Markup, html};
use snafu::ResultExt;
use sqlx::{
    Pool, Sqlite,
    pool::PoolConnection,
    sqlite::SqlitePoolOptions,
};
use std::time::Duration;

#[derive(Clone, Debug)]
pub struct RosterState {
    pool: Pool<Sqlite>,
    config: RuntimeConfiguration,
}

impl RosterState {
    pub async fn new(options: SqlitePoolOptions, config: RuntimeConfiguration) -> RosterResult<Self> {
        let db_config = config.db_config();

        let connect_options = db_config
            .connect_options()?
            .create_if_missing(true)
            .busy_timeout(Duration::from_secs(5));

        let options = if db_config.is_in_memory() {
            options
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None::<Duration>)
                .max_lifetime(None::<Duration>)
        } else {
            options
        };

        let pool = options
            .connect_with(connect_options)
            .await
            .context(OpenDatabaseSnafu)?;

        sqlx::migrate!().run(&pool).await.context(MigrateSnafu)?;
        info!(path = %db_config.get_db_path(), "Database ready");

        Ok(Self { pool, config })
    }

    #[cfg(test)]
    pub async fn in_memory() -> Self {
        Self::new(SqlitePoolOptions::new(), RuntimeConfiguration::in_memory())
            .await
            .expect("unable to open in-memory database")
    }

    #[allow(clippy::unused_self)]
    pub fn render(&self, markup: Markup) -> Markup {
        html! {
            (DOCTYPE)
            html {
                head {
                    meta charset="UTF-8" {}
                    meta name="viewport" content="width=device-width, initial-scale=1.0" {}
                    script src="https://unpkg.com/htmx.org@2.0.4" integrity="sha384-HGfztofotfshcF7+8n44JQL2oJmowVChPTg48S+jvZoztPfvwD79OC/LTtG6dMp+" crossorigin="anonymous" {}
                    script src="https://cdn.jsdelivr.net/npm/@tailwindcss/browser@4" {}
                    title { "Student Records" }
                }
                body class="bg-gray-900 min-h-screen flex flex-col items-center py-8 text-white" {
                    (markup)
                }
            }
        }
    }

    pub const fn config(&self) -> &RuntimeConfiguration {
        &self.config
    }

    pub async fn get_connection(&self) -> RosterResult<PoolConnection<Sqlite>> {
        self.pool
            .acquire()
            .await
            .context(GetDatabaseConnectionSnafu)
    }

    pub async fn sensible_shutdown(&self) {
        self.pool.close().await;
        info!("Database pool closed");
    }
}
