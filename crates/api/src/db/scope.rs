//! Active-scope query building.
//!
//! Soft-deleted rows carry a non-null `deleted_at`. [`ActiveQuery`] is the
//! only way repositories build reads, counts, aggregates, updates and
//! soft-deletes: its `WHERE` clause always starts with the active predicate,
//! and further conditions are appended with `AND`.

use sqlx::{Encode, Postgres, QueryBuilder, Type};

/// Predicate that selects rows which have not been soft-deleted.
pub const ACTIVE_PREDICATE: &str = "deleted_at IS NULL";

/// A statement restricted to active rows.
pub struct ActiveQuery<'args> {
    builder: QueryBuilder<'args, Postgres>,
}

impl<'args> ActiveQuery<'args> {
    /// Start a statement from a fixed head such as `SELECT ... FROM stores`.
    #[must_use]
    pub fn new(head: &str) -> Self {
        Self::with_head(|builder| {
            builder.push(head);
        })
    }

    /// Start a statement whose head needs bound parameters, e.g. the `SET`
    /// list of an `UPDATE`.
    #[must_use]
    pub fn with_head(head: impl FnOnce(&mut QueryBuilder<'args, Postgres>)) -> Self {
        let mut builder = QueryBuilder::new("");
        head(&mut builder);
        builder.push(" WHERE ").push(ACTIVE_PREDICATE);
        Self { builder }
    }

    /// Append `AND <column> = $n`.
    pub fn and_eq<T>(&mut self, column: &str, value: T) -> &mut Self
    where
        T: 'args + Encode<'args, Postgres> + Type<Postgres>,
    {
        self.and_cmp(column, "=", value)
    }

    /// Append `AND <column> <op> $n` for a comparison operator.
    pub fn and_cmp<T>(&mut self, column: &str, op: &str, value: T) -> &mut Self
    where
        T: 'args + Encode<'args, Postgres> + Type<Postgres>,
    {
        self.builder
            .push(" AND ")
            .push(column)
            .push(' ')
            .push(op)
            .push(' ')
            .push_bind(value);
        self
    }

    /// Append raw SQL after the `WHERE` clause (ordering, grouping, `RETURNING`).
    pub fn push(&mut self, sql: &str) -> &mut Self {
        self.builder.push(sql);
        self
    }

    /// Append a bound parameter after the `WHERE` clause.
    pub fn push_bind<T>(&mut self, value: T) -> &mut Self
    where
        T: 'args + Encode<'args, Postgres> + Type<Postgres>,
    {
        self.builder.push_bind(value);
        self
    }

    /// Append `LIMIT $n OFFSET $m`.
    pub fn paginate(&mut self, limit: i64, offset: i64) -> &mut Self {
        self.push(" LIMIT ")
            .push_bind(limit)
            .push(" OFFSET ")
            .push_bind(offset)
    }

    /// Finish building and hand back the underlying builder.
    #[must_use]
    pub fn into_builder(self) -> QueryBuilder<'args, Postgres> {
        self.builder
    }

    /// The SQL text built so far.
    #[must_use]
    pub fn sql(&self) -> &str {
        self.builder.sql()
    }
}

/// Build a `LIKE` pattern matching `needle` anywhere, with wildcards escaped.
#[must_use]
pub fn contains_pattern(needle: &str) -> String {
    let mut pattern = String::with_capacity(needle.len() + 2);
    pattern.push('%');
    for c in needle.chars() {
        if matches!(c, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_active_predicate_always_present() {
        let query = ActiveQuery::new("SELECT id FROM stores");
        assert_eq!(query.sql(), "SELECT id FROM stores WHERE deleted_at IS NULL");
    }

    #[test]
    fn test_conditions_are_and_composed() {
        let mut query = ActiveQuery::new("SELECT id FROM products");
        query
            .and_eq("category", "Books".to_owned())
            .and_cmp("price", ">=", 10_i64);
        assert_eq!(
            query.sql(),
            "SELECT id FROM products WHERE deleted_at IS NULL AND category = $1 AND price >= $2"
        );
    }

    #[test]
    fn test_head_binds_come_before_scope() {
        let mut query = ActiveQuery::with_head(|builder| {
            builder
                .push("UPDATE products SET updated_at = NOW(), name = ")
                .push_bind("Desk".to_owned());
        });
        query.and_eq("id", 7_i64).push(" RETURNING id");
        assert_eq!(
            query.sql(),
            "UPDATE products SET updated_at = NOW(), name = $1 WHERE deleted_at IS NULL AND id = $2 RETURNING id"
        );
    }

    #[test]
    fn test_paginate_binds_limit_and_offset() {
        let mut query = ActiveQuery::new("SELECT id FROM stores");
        query.push(" ORDER BY created_at, id").paginate(10, 20);
        assert_eq!(
            query.sql(),
            "SELECT id FROM stores WHERE deleted_at IS NULL ORDER BY created_at, id LIMIT $1 OFFSET $2"
        );
    }

    #[test]
    fn test_contains_pattern_escapes_wildcards() {
        assert_eq!(contains_pattern("Pro"), "%Pro%");
        assert_eq!(contains_pattern("100%"), "%100\\%%");
        assert_eq!(contains_pattern("a_b"), "%a\\_b%");
        assert_eq!(contains_pattern("c:\\"), "%c:\\\\%");
    }
}
