use serde::{Deserialize, Serialize};

use super::GatewayError;

/// Sort direction for the single-field ordering a query may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn to_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }

    pub fn to_postgrest(&self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }
}

/// Exact-match equality on one column. Values travel as text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter {
    pub column: String,
    pub value: String,
}

impl Filter {
    pub fn eq(column: impl Into<String>, value: impl ToString) -> Self {
        Self {
            column: column.into(),
            value: value.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub column: String,
    pub direction: SortDirection,
}

/// How an embedded table relates to the row it is nested under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Relation {
    /// Child rows carry `foreign_key` pointing at the parent's `id`. Renders as a list.
    HasMany { foreign_key: String },
    /// The parent carries `foreign_key` pointing at the child's `id`. Renders as an object or null.
    BelongsTo { foreign_key: String },
}

/// A related table nested under a key of the parent row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Embed {
    table: String,
    alias: Option<String>,
    relation: Relation,
    columns: Vec<String>,
    embeds: Vec<Embed>,
}

impl Embed {
    pub fn has_many(table: impl Into<String>, foreign_key: impl Into<String>) -> Self {
        Self::new(table, Relation::HasMany { foreign_key: foreign_key.into() })
    }

    pub fn belongs_to(table: impl Into<String>, foreign_key: impl Into<String>) -> Self {
        Self::new(table, Relation::BelongsTo { foreign_key: foreign_key.into() })
    }

    fn new(table: impl Into<String>, relation: Relation) -> Self {
        Self {
            table: table.into(),
            alias: None,
            relation,
            columns: vec![],
            embeds: vec![],
        }
    }

    /// Key the nested rows are returned under (defaults to the table name).
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    pub fn columns(mut self, columns: &[&str]) -> Self {
        self.columns = columns.iter().map(|c| c.to_string()).collect();
        self
    }

    pub fn embed(mut self, embed: Embed) -> Self {
        self.embeds.push(embed);
        self
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn key(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.table)
    }

    pub fn relation(&self) -> &Relation {
        &self.relation
    }

    pub fn projection(&self) -> &[String] {
        &self.columns
    }

    pub fn embeds(&self) -> &[Embed] {
        &self.embeds
    }

    fn validate(&self) -> Result<(), GatewayError> {
        validate_identifier(&self.table)?;
        validate_identifier(self.key())?;
        match &self.relation {
            Relation::HasMany { foreign_key } | Relation::BelongsTo { foreign_key } => {
                validate_identifier(foreign_key)?
            }
        }
        for column in &self.columns {
            validate_identifier(column)?;
        }
        for child in &self.embeds {
            child.validate()?;
        }
        Ok(())
    }

    /// PostgREST resource embedding, e.g. `exercise:exercises!exercise_id(*)`.
    fn to_postgrest(&self) -> String {
        let inner = postgrest_select(&self.columns, &self.embeds);
        match &self.relation {
            Relation::HasMany { .. } if self.alias.is_none() => format!("{}({})", self.table, inner),
            Relation::HasMany { .. } => format!("{}:{}({})", self.key(), self.table, inner),
            Relation::BelongsTo { foreign_key } => {
                format!("{}:{}!{}({})", self.key(), self.table, foreign_key, inner)
            }
        }
    }

    /// Correlated subquery producing the nested JSON for one parent row.
    fn to_sql(&self, parent: &str, aliases: &mut usize) -> String {
        let alias = next_alias(aliases);
        let mut select = sql_projection(&alias, &self.columns);
        for child in &self.embeds {
            select.push_str(", ");
            select.push_str(&child.to_sql(&alias, aliases));
        }
        let table = quote(&self.table);
        let key = quote(self.key());

        match &self.relation {
            Relation::HasMany { foreign_key } => format!(
                "COALESCE((SELECT json_agg(row_to_json(s)) FROM (SELECT {select} FROM {table} {alias} WHERE {alias}.{fk} = {parent}.\"id\") s), '[]'::json) AS {key}",
                fk = quote(foreign_key),
            ),
            Relation::BelongsTo { foreign_key } => format!(
                "(SELECT row_to_json(s) FROM (SELECT {select} FROM {table} {alias} WHERE {alias}.\"id\" = {parent}.{fk}) s) AS {key}",
                fk = quote(foreign_key),
            ),
        }
    }
}

/// Rendered SQL with its positional text parameters.
#[derive(Debug, Clone)]
pub struct SqlResult {
    pub query: String,
    pub params: Vec<String>,
}

/// A read against one table: projection, equality filters, optional ordering
/// and limit, and nested embeds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    table: String,
    columns: Vec<String>,
    filters: Vec<Filter>,
    order: Option<Order>,
    limit: Option<u32>,
    embeds: Vec<Embed>,
}

impl Query {
    pub fn table(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            columns: vec![],
            filters: vec![],
            order: None,
            limit: None,
            embeds: vec![],
        }
    }

    pub fn columns(mut self, columns: &[&str]) -> Self {
        self.columns = columns.iter().map(|c| c.to_string()).collect();
        self
    }

    pub fn eq(mut self, column: impl Into<String>, value: impl ToString) -> Self {
        self.filters.push(Filter::eq(column, value));
        self
    }

    pub fn order(mut self, column: impl Into<String>, direction: SortDirection) -> Self {
        self.order = Some(Order {
            column: column.into(),
            direction,
        });
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn embed(mut self, embed: Embed) -> Self {
        self.embeds.push(embed);
        self
    }

    pub fn table_name(&self) -> &str {
        &self.table
    }

    pub fn projection(&self) -> &[String] {
        &self.columns
    }

    pub fn filters(&self) -> &[Filter] {
        &self.filters
    }

    pub fn ordering(&self) -> Option<&Order> {
        self.order.as_ref()
    }

    pub fn max_rows(&self) -> Option<u32> {
        self.limit
    }

    pub fn embeds(&self) -> &[Embed] {
        &self.embeds
    }

    pub fn validate(&self) -> Result<(), GatewayError> {
        validate_identifier(&self.table)?;
        for column in &self.columns {
            validate_identifier(column)?;
        }
        validate_filters(&self.filters)?;
        if let Some(order) = &self.order {
            validate_identifier(&order.column)?;
            // The SQL backend re-sorts the projected rows, so the key must be among them
            if !self.columns.is_empty() && !self.columns.contains(&order.column) {
                return Err(GatewayError::InvalidQuery(format!(
                    "order column {} is not selected",
                    order.column
                )));
            }
        }
        for embed in &self.embeds {
            embed.validate()?;
        }
        Ok(())
    }

    /// Query-string pairs for a PostgREST `GET /rest/v1/{table}`.
    pub fn to_postgrest_params(&self) -> Vec<(String, String)> {
        let mut params = vec![(
            "select".to_string(),
            postgrest_select(&self.columns, &self.embeds),
        )];
        params.extend(postgrest_filters(&self.filters));
        if let Some(order) = &self.order {
            params.push((
                "order".to_string(),
                format!("{}.{}", order.column, order.direction.to_postgrest()),
            ));
        }
        if let Some(limit) = self.limit {
            params.push(("limit".to_string(), limit.to_string()));
        }
        params
    }

    /// `SELECT row_to_json(r) AS row FROM (...) r`, one JSON object per row.
    ///
    /// The inner ORDER BY picks the rows LIMIT keeps; the outer one fixes the
    /// order the rows come back in.
    pub fn to_sql(&self) -> SqlResult {
        let mut aliases = 0usize;
        let root = next_alias(&mut aliases);

        let mut select = sql_projection(&root, &self.columns);
        for embed in &self.embeds {
            select.push_str(", ");
            select.push_str(&embed.to_sql(&root, &mut aliases));
        }

        let (where_clause, params) = sql_where(&root, &self.filters, 0);

        let inner = [
            format!("SELECT {}", select),
            format!("FROM {} {}", quote(&self.table), root),
            where_clause,
            self.order
                .as_ref()
                .map(|o| format!("ORDER BY {}.{} {}", root, quote(&o.column), o.direction.to_sql()))
                .unwrap_or_default(),
            self.limit.map(|l| format!("LIMIT {}", l)).unwrap_or_default(),
        ]
        .into_iter()
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

        let mut query = format!("SELECT row_to_json(r) AS row FROM ({}) r", inner);
        if let Some(order) = &self.order {
            query.push_str(&format!(" ORDER BY r.{} {}", quote(&order.column), order.direction.to_sql()));
        }

        SqlResult { query, params }
    }
}

pub fn postgrest_filters(filters: &[Filter]) -> Vec<(String, String)> {
    filters
        .iter()
        .map(|f| (f.column.clone(), format!("eq.{}", f.value)))
        .collect()
}

/// `WHERE` clause comparing each column as text; placeholders start after `offset`.
pub fn sql_where(alias: &str, filters: &[Filter], offset: usize) -> (String, Vec<String>) {
    if filters.is_empty() {
        return (String::new(), vec![]);
    }
    let mut params = Vec::with_capacity(filters.len());
    let clauses: Vec<String> = filters
        .iter()
        .map(|f| {
            params.push(f.value.clone());
            format!("{}.{}::text = ${}", alias, quote(&f.column), offset + params.len())
        })
        .collect();
    (format!("WHERE {}", clauses.join(" AND ")), params)
}

pub fn validate_filters(filters: &[Filter]) -> Result<(), GatewayError> {
    for filter in filters {
        validate_identifier(&filter.column)?;
    }
    Ok(())
}

/// Table, column and alias names: `[A-Za-z_][A-Za-z0-9_]*`.
pub fn validate_identifier(name: &str) -> Result<(), GatewayError> {
    let mut chars = name.chars();
    let valid_start = matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_');
    if !valid_start || !chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(GatewayError::InvalidQuery(format!(
            "Invalid identifier: {:?}",
            name
        )));
    }
    Ok(())
}

pub fn quote(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

fn postgrest_select(columns: &[String], embeds: &[Embed]) -> String {
    let mut parts: Vec<String> = if columns.is_empty() {
        vec!["*".to_string()]
    } else {
        columns.to_vec()
    };
    parts.extend(embeds.iter().map(Embed::to_postgrest));
    parts.join(",")
}

fn sql_projection(alias: &str, columns: &[String]) -> String {
    if columns.is_empty() {
        format!("{}.*", alias)
    } else {
        columns
            .iter()
            .map(|c| format!("{}.{}", alias, quote(c)))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

fn next_alias(aliases: &mut usize) -> String {
    let alias = format!("t{}", aliases);
    *aliases += 1;
    alias
}
