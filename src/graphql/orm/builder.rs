//! SQL query builder for paged entity lists
//!
//! Builds parameterized SQL via sqlx. Filters and ordering are applied by the
//! resolver; the paginator then narrows the window through [`Queryable`].

use std::fmt;
use std::marker::PhantomData;

use super::traits::{DatabaseEntity, DatabaseFilter, DatabaseOrderBy, OrderDirection, SqlValue};
use crate::paging::Queryable;

/// An ordered, filtered query over one entity table.
pub struct EntityQuery<E> {
    _phantom: PhantomData<fn() -> E>,
    where_clauses: Vec<String>,
    values: Vec<SqlValue>,
    order_clauses: Vec<String>,
    limit: Option<i64>,
    offset: i64,
}

impl<E: DatabaseEntity> EntityQuery<E> {
    pub fn new() -> Self {
        Self {
            _phantom: PhantomData,
            where_clauses: Vec::new(),
            values: Vec::new(),
            order_clauses: Vec::new(),
            limit: None,
            offset: 0,
        }
    }

    /// Add a filter to the query.
    pub fn filter<F: DatabaseFilter>(mut self, filter: &F) -> Self {
        if !filter.is_empty() {
            let (conditions, values) = filter.to_sql_conditions();
            self.where_clauses
                .extend(conditions.into_iter().map(|c| format!("({c})")));
            self.values.extend(values);
        }
        self
    }

    /// Add a raw WHERE condition with a single `?` placeholder.
    pub fn where_clause(mut self, condition: &str, value: SqlValue) -> Self {
        self.where_clauses.push(format!("({condition})"));
        self.values.push(value);
        self
    }

    /// Add sorting to the query. Later calls add lower-priority sort keys.
    pub fn order_by<O: DatabaseOrderBy>(mut self, order: &O) -> Self {
        if let Some(order_sql) = order.to_sql_order() {
            self.order_clauses.push(order_sql);
        }
        self
    }

    /// Sort on a single column, e.g. from a GraphQL `SortDirection` argument.
    pub fn sort_by(mut self, column: &str, direction: OrderDirection) -> Self {
        self.order_clauses
            .push(format!("{column} {}", direction.to_sql()));
        self
    }

    pub fn values(&self) -> &[SqlValue] {
        &self.values
    }

    fn where_sql(&self) -> String {
        if self.where_clauses.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", self.where_clauses.join(" AND "))
        }
    }

    /// ORDER BY clause, always ending with the primary key.
    fn order_sql(&self) -> String {
        let mut keys: Vec<String> = if self.order_clauses.is_empty() {
            vec![format!("{} {}", E::DEFAULT_SORT, E::DEFAULT_SORT_DIR.to_sql())]
        } else {
            self.order_clauses
                .iter()
                .flat_map(|clause| clause.split(','))
                .map(|key| key.trim().to_string())
                .filter(|key| !key.is_empty())
                .collect()
        };

        let has_primary_key = keys
            .iter()
            .any(|key| key.split_whitespace().next() == Some(E::PRIMARY_KEY));
        if !has_primary_key {
            keys.push(format!("{} {}", E::PRIMARY_KEY, OrderDirection::Asc.to_sql()));
        }

        format!(" ORDER BY {}", keys.join(", "))
    }

    fn window_sql(&self) -> String {
        match (self.limit, self.offset) {
            (None, 0) => String::new(),
            (Some(limit), 0) => format!(" LIMIT {limit}"),
            // SQLite only accepts OFFSET after a LIMIT
            (None, offset) => format!(" LIMIT -1 OFFSET {offset}"),
            (Some(limit), offset) => format!(" LIMIT {limit} OFFSET {offset}"),
        }
    }

    /// Build the SELECT statement.
    pub fn build_sql(&self) -> String {
        format!(
            "{}{}{}{}",
            E::select_sql(),
            self.where_sql(),
            self.order_sql(),
            self.window_sql()
        )
    }

    /// Build a COUNT statement over the same rows [`EntityQuery::build_sql`]
    /// would return.
    pub fn build_count_sql(&self) -> String {
        if self.limit.is_none() && self.offset == 0 {
            return format!("SELECT COUNT(*) FROM {}{}", E::TABLE_NAME, self.where_sql());
        }
        format!(
            "SELECT COUNT(*) FROM (SELECT {} FROM {}{}{}{})",
            E::PRIMARY_KEY,
            E::TABLE_NAME,
            self.where_sql(),
            self.order_sql(),
            self.window_sql()
        )
    }
}

impl<E: DatabaseEntity> Default for EntityQuery<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> Clone for EntityQuery<E> {
    fn clone(&self) -> Self {
        Self {
            _phantom: PhantomData,
            where_clauses: self.where_clauses.clone(),
            values: self.values.clone(),
            order_clauses: self.order_clauses.clone(),
            limit: self.limit,
            offset: self.offset,
        }
    }
}

impl<E> fmt::Debug for EntityQuery<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityQuery")
            .field("where_clauses", &self.where_clauses)
            .field("values", &self.values)
            .field("order_clauses", &self.order_clauses)
            .field("limit", &self.limit)
            .field("offset", &self.offset)
            .finish()
    }
}

impl<E: DatabaseEntity> Queryable for EntityQuery<E> {
    type Item = E;

    fn skip(mut self, count: i64) -> Self {
        let count = count.max(0);
        self.offset = self.offset.saturating_add(count);
        self.limit = self.limit.map(|limit| (limit - count).max(0));
        self
    }

    fn take(mut self, count: i64) -> Self {
        let count = count.max(0);
        self.limit = Some(self.limit.map_or(count, |limit| limit.min(count)));
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    struct Book;

    impl DatabaseEntity for Book {
        const TABLE_NAME: &'static str = "books";
        const PRIMARY_KEY: &'static str = "id";
        const DEFAULT_SORT: &'static str = "title";

        fn column_names() -> &'static [&'static str] {
            &["id", "title", "year"]
        }
    }

    struct ByYear(OrderDirection);

    impl DatabaseOrderBy for ByYear {
        fn to_sql_order(&self) -> Option<String> {
            Some(format!("year {}", self.0.to_sql()))
        }
    }

    #[test]
    fn test_default_order_gets_primary_key_tiebreaker() {
        let query = EntityQuery::<Book>::new();
        assert_eq!(
            query.build_sql(),
            "SELECT id, title, year FROM books ORDER BY title ASC, id ASC"
        );
    }

    #[test]
    fn test_sort_by_stacks_keys() {
        let sql = EntityQuery::<Book>::new()
            .sort_by("year", OrderDirection::Desc)
            .sort_by("title", OrderDirection::Asc)
            .build_sql();
        assert!(sql.ends_with("ORDER BY year DESC, title ASC, id ASC"), "{sql}");
    }

    #[test]
    fn test_explicit_primary_key_order_is_not_duplicated() {
        struct ById;
        impl DatabaseOrderBy for ById {
            fn to_sql_order(&self) -> Option<String> {
                Some("id DESC".to_string())
            }
        }

        let sql = EntityQuery::<Book>::new().order_by(&ById).build_sql();
        assert!(sql.ends_with("ORDER BY id DESC"), "{sql}");
    }

    #[test]
    fn test_window_composition() {
        let query = EntityQuery::<Book>::new()
            .order_by(&ByYear(OrderDirection::Desc))
            .skip(3)
            .take(5);
        assert_eq!(
            query.build_sql(),
            "SELECT id, title, year FROM books ORDER BY year DESC, id ASC LIMIT 5 OFFSET 3"
        );

        let narrowed = query.clone().take(10).skip(2);
        assert_eq!((narrowed.limit, narrowed.offset), (Some(3), 5));

        let skip_only = EntityQuery::<Book>::new().skip(4);
        assert!(skip_only.build_sql().ends_with("LIMIT -1 OFFSET 4"));
    }

    #[test]
    fn test_count_sql() {
        let query = EntityQuery::<Book>::new().where_clause("year > ?", SqlValue::Int(1990));
        assert_eq!(
            query.build_count_sql(),
            "SELECT COUNT(*) FROM books WHERE (year > ?)"
        );
        assert_eq!(query.values(), &[SqlValue::Int(1990)]);

        let windowed = query.take(2).build_count_sql();
        assert!(windowed.starts_with("SELECT COUNT(*) FROM (SELECT id FROM books"));
        assert!(windowed.ends_with("LIMIT 2)"));
    }
}
