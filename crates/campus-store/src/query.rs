use campus_common::Collection;
use rusqlite::{Connection, params_from_iter, types::Value as SqlValue};
use tracing::debug;

/// Equality conditions on top-level string fields, all of which must match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filter {
    conditions: Vec<(String, String)>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn eq(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.conditions.push((field.into(), value.into()));
        self
    }
}

pub(crate) struct FindQuery {
    stmt_str: String,
    bindings: Vec<SqlValue>,
}

impl FindQuery {
    pub(crate) fn new(
        database: &str,
        collection: Collection,
        filter: &Filter,
        limit: Option<u64>,
    ) -> Self {
        let mut query = Self {
            stmt_str: "select id, body from documents where database = ? and collection = ?"
                .to_owned(),
            bindings: vec![
                SqlValue::Text(database.to_owned()),
                SqlValue::Text(collection.as_str().to_owned()),
            ],
        };

        for (field, value) in &filter.conditions {
            query.add_filter(
                " and json_extract(body, ?) = ?",
                [
                    SqlValue::Text(json_path(field)),
                    SqlValue::Text(value.clone()),
                ],
            );
        }

        // sqlite treats a negative limit as "no limit".
        let limit = limit.map_or(-1, |n| i64::try_from(n).unwrap_or(i64::MAX));
        query.add_filter(" order by seq limit ?", [SqlValue::Integer(limit)]);

        query
    }

    fn add_filter<const N: usize>(&mut self, filter: &str, bindings: [SqlValue; N]) {
        self.stmt_str.push_str(filter);
        self.bindings.extend(bindings);
    }

    pub(crate) fn execute(&self, db: &Connection) -> Result<Vec<(String, String)>, rusqlite::Error> {
        debug!("{:?}", self.stmt_str);
        let mut statement = db.prepare(&self.stmt_str)?;

        statement
            .query_map(params_from_iter(self.bindings.iter()), |row| {
                Ok((row.get(0)?, row.get(1)?))
            })?
            .collect()
    }
}

fn json_path(field: &str) -> String {
    format!("$.\"{}\"", field.replace('"', "\\\""))
}
