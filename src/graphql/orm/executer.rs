use async_trait::async_trait;
use futures::channel::mpsc;
use futures::stream::{self, BoxStream};
use futures::{FutureExt, SinkExt, StreamExt, future};
use sqlx::SqlitePool;

use super::builder::EntityQuery;
use super::traits::{DatabaseEntity, FromSqlRow};
use crate::error::{PagingError, PagingResult};
use crate::paging::{QueryExecuter, StepName};

/// Decoded rows buffered ahead of a slow stream consumer.
const STREAM_BUFFER: usize = 64;

/// Runs [`EntityQuery`] windows against a SQLite pool.
#[derive(Debug, Clone)]
pub struct SqliteExecuter {
    pool: SqlitePool,
}

impl SqliteExecuter {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn fetch_all<E>(&self, query: &EntityQuery<E>, step: StepName<'_>) -> PagingResult<Vec<E>>
    where
        E: DatabaseEntity + FromSqlRow,
    {
        let sql = query.build_sql();
        tracing::debug!(step = %step, sql = %sql, "Executing entity query");

        let mut q = sqlx::query(&sql);
        for value in query.values() {
            q = value.bind_to_query(q);
        }

        let rows = q.fetch_all(&self.pool).await?;
        rows.iter()
            .map(E::from_row)
            .collect::<Result<Vec<_>, _>>()
            .map_err(PagingError::from)
    }
}

#[async_trait]
impl<E> QueryExecuter<EntityQuery<E>> for SqliteExecuter
where
    E: DatabaseEntity + FromSqlRow + 'static,
{
    async fn to_list(&self, query: EntityQuery<E>, step: StepName<'_>) -> PagingResult<Vec<E>> {
        self.fetch_all(&query, step).await
    }

    async fn count(&self, query: EntityQuery<E>, step: StepName<'_>) -> PagingResult<i64> {
        let sql = query.build_count_sql();
        tracing::debug!(step = %step, sql = %sql, "Executing count query");

        let mut q = sqlx::query_scalar::<_, i64>(&sql);
        for value in query.values() {
            q = value.bind_to_scalar(q);
        }

        Ok(q.fetch_one(&self.pool).await?)
    }

    fn stream<'a>(&'a self, query: EntityQuery<E>, step: StepName<'a>) -> BoxStream<'a, PagingResult<E>>
    where
        EntityQuery<E>: 'a,
    {
        // The row cursor borrows the SQL text, so it is driven inside a future
        // that owns both and hands decoded rows over a bounded channel.
        let (mut tx, rx) = mpsc::channel::<PagingResult<E>>(STREAM_BUFFER);
        let producer = async move {
            let sql = query.build_sql();
            tracing::debug!(step = %step, sql = %sql, "Streaming entity query");

            let mut q = sqlx::query(&sql);
            for value in query.values() {
                q = value.bind_to_query(q);
            }

            let mut rows = q.fetch(&self.pool);
            while let Some(row) = rows.next().await {
                let item = row
                    .and_then(|row| E::from_row(&row))
                    .map_err(PagingError::from);
                let failed = item.is_err();
                if tx.send(item).await.is_err() || failed {
                    break;
                }
            }
        };

        stream::select(
            rx,
            producer
                .into_stream()
                .filter_map(|()| future::ready(None::<PagingResult<E>>)),
        )
        .boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graphql::orm::traits::{DatabaseFilter, DatabaseOrderBy, SqlValue};
    use crate::paging::{ComputationFlags, PageWindowRequest, Queryable, assemble_connection};
    use futures::TryStreamExt;
    use pretty_assertions::assert_eq;
    use sqlx::Row;
    use sqlx::sqlite::{SqlitePoolOptions, SqliteRow};

    #[derive(Debug, Clone, PartialEq)]
    struct Book {
        id: i64,
        title: String,
        year: i64,
    }

    impl DatabaseEntity for Book {
        const TABLE_NAME: &'static str = "books";
        const PRIMARY_KEY: &'static str = "id";
        const DEFAULT_SORT: &'static str = "year";

        fn column_names() -> &'static [&'static str] {
            &["id", "title", "year"]
        }
    }

    impl FromSqlRow for Book {
        fn from_row(row: &SqliteRow) -> Result<Self, sqlx::Error> {
            Ok(Book {
                id: row.try_get("id")?,
                title: row.try_get("title")?,
                year: row.try_get("year")?,
            })
        }
    }

    struct PublishedAfter(Option<i64>);

    impl DatabaseFilter for PublishedAfter {
        fn to_sql_conditions(&self) -> (Vec<String>, Vec<SqlValue>) {
            match self.0 {
                Some(year) => (vec!["year > ?".to_string()], vec![SqlValue::Int(year)]),
                None => (Vec::new(), Vec::new()),
            }
        }

        fn is_empty(&self) -> bool {
            self.0.is_none()
        }
    }

    struct TitleDesc;

    impl DatabaseOrderBy for TitleDesc {
        fn to_sql_order(&self) -> Option<String> {
            Some("title DESC".to_string())
        }
    }

    async fn setup() -> SqliteExecuter {
        // A single connection keeps every query on the same in-memory database.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();

        sqlx::query("CREATE TABLE books (id INTEGER PRIMARY KEY, title TEXT NOT NULL, year INTEGER NOT NULL)")
            .execute(&pool)
            .await
            .unwrap();

        // Years repeat so ordering has to fall back to the primary key.
        let books = [
            (1, "Dune", 1965),
            (2, "Neuromancer", 1984),
            (3, "Hyperion", 1989),
            (4, "Snow Crash", 1992),
            (5, "Foundation", 1951),
            (6, "Count Zero", 1984),
        ];
        for (id, title, year) in books {
            sqlx::query("INSERT INTO books (id, title, year) VALUES (?, ?, ?)")
                .bind(id)
                .bind(title)
                .bind(year)
                .execute(&pool)
                .await
                .unwrap();
        }

        SqliteExecuter::new(pool)
    }

    fn ids(books: &[&Book]) -> Vec<i64> {
        books.iter().map(|b| b.id).collect()
    }

    #[tokio::test]
    async fn test_to_list_and_count_respect_window() {
        let executer = setup().await;
        let query = EntityQuery::<Book>::new();

        let all = executer.to_list(query.clone(), "all".into()).await.unwrap();
        assert_eq!(
            all.iter().map(|b| b.id).collect::<Vec<_>>(),
            vec![5, 1, 2, 6, 3, 4]
        );

        let window = executer
            .to_list(query.clone().skip(2).take(2), "window".into())
            .await
            .unwrap();
        assert_eq!(window.iter().map(|b| b.id).collect::<Vec<_>>(), vec![2, 6]);

        assert_eq!(executer.count(query.clone(), "count".into()).await.unwrap(), 6);
        assert_eq!(
            executer
                .count(query.skip(4).take(10), "count".into())
                .await
                .unwrap(),
            2
        );
    }

    #[tokio::test]
    async fn test_stream_yields_same_rows() {
        let executer = setup().await;
        let query = EntityQuery::<Book>::new().order_by(&TitleDesc).take(3);

        let streamed: Vec<Book> = executer
            .stream(query.clone(), "stream".into())
            .try_collect()
            .await
            .unwrap();
        let listed = executer.to_list(query, "list".into()).await.unwrap();
        assert_eq!(streamed, listed);
        assert_eq!(streamed[0].title, "Snow Crash");
    }

    #[tokio::test]
    async fn test_stream_can_stop_early() {
        let executer = setup().await;
        let first_two: Vec<Book> = executer
            .stream(EntityQuery::<Book>::new(), "stream".into())
            .take(2)
            .try_collect()
            .await
            .unwrap();
        assert_eq!(first_two.iter().map(|b| b.id).collect::<Vec<_>>(), vec![5, 1]);
    }

    #[tokio::test]
    async fn test_stream_surfaces_decode_errors() {
        #[derive(Debug)]
        struct BadBook;

        impl DatabaseEntity for BadBook {
            const TABLE_NAME: &'static str = "books";
            const PRIMARY_KEY: &'static str = "id";
            const DEFAULT_SORT: &'static str = "id";

            fn column_names() -> &'static [&'static str] {
                &["id"]
            }
        }

        impl FromSqlRow for BadBook {
            fn from_row(row: &SqliteRow) -> Result<Self, sqlx::Error> {
                row.try_get::<String, _>("missing").map(|_| BadBook)
            }
        }

        let executer = setup().await;
        let result: PagingResult<Vec<BadBook>> = executer
            .stream(EntityQuery::<BadBook>::new(), "stream".into())
            .try_collect()
            .await;
        assert!(matches!(result, Err(PagingError::Source(_))));
    }

    #[tokio::test]
    async fn test_connection_over_filtered_table() {
        let executer = setup().await;
        let query = EntityQuery::<Book>::new().filter(&PublishedAfter(Some(1960)));

        let conn = assemble_connection(
            &executer,
            query.clone(),
            PageWindowRequest::first(2).with_after(1),
            ComputationFlags::all(),
        )
        .await
        .unwrap();

        // Filtered order: Dune(1), Neuromancer(2), Count Zero(6), Hyperion(3), Snow Crash(4)
        assert_eq!(ids(&conn.nodes()), vec![6, 3]);
        assert_eq!(conn.total_count, Some(5));
        assert!(conn.page_info.has_previous_page);
        assert!(conn.page_info.has_next_page);
        assert_eq!(conn.page_info.start_cursor.as_deref(), Some("2"));
        assert_eq!(conn.page_info.end_cursor.as_deref(), Some("3"));

        let last = assemble_connection(
            &executer,
            query,
            PageWindowRequest::last(2).with_before(4),
            ComputationFlags::edges(),
        )
        .await
        .unwrap();
        assert_eq!(ids(&last.nodes()), vec![6, 3]);
        assert!(last.page_info.has_previous_page);
        // Bounded by `before`, rows past it are not reported.
        assert!(!last.page_info.has_next_page);
        assert_eq!(last.total_count, None);
    }

    #[tokio::test]
    async fn test_empty_filter_is_ignored() {
        let executer = setup().await;
        let query = EntityQuery::<Book>::new().filter(&PublishedAfter(None));
        assert_eq!(executer.count(query, "count".into()).await.unwrap(), 6);
    }
}
