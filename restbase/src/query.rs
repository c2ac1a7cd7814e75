/// A single column filter in PostgREST horizontal-filter syntax.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter {
    Eq(String, String),
    In(String, Vec<String>),
    Gte(String, String),
    Lte(String, String),
}

impl Filter {
    pub fn as_query_pair(&self) -> (String, String) {
        match self {
            Filter::Eq(column, value) => (column.clone(), format!("eq.{value}")),
            Filter::Gte(column, value) => (column.clone(), format!("gte.{value}")),
            Filter::Lte(column, value) => (column.clone(), format!("lte.{value}")),
            Filter::In(column, values) => {
                let list = values
                    .iter()
                    .map(|v| quote_list_value(v))
                    .collect::<Vec<_>>()
                    .join(",");
                (column.clone(), format!("in.({list})"))
            }
        }
    }
}

/// Values containing reserved characters must be double-quoted inside `in.(...)`.
fn quote_list_value(value: &str) -> String {
    if value.contains([',', '(', ')', '"', ' ']) {
        format!("\"{}\"", value.replace('"', "\\\""))
    } else {
        value.to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Order {
    Ascending,
    Descending,
}

impl Order {
    fn as_str(self) -> &'static str {
        match self {
            Order::Ascending => "asc",
            Order::Descending => "desc",
        }
    }
}

/// A filtered read against one table.
///
/// Embedded relations are expressed in the select list, e.g.
/// `"*, engenheiros ( id, nome )"`, so related rows come back in the same
/// round trip.
#[derive(Debug, Clone)]
pub struct Query {
    table: String,
    select: Option<String>,
    filters: Vec<Filter>,
    order: Vec<(String, Order)>,
    limit: Option<usize>,
}

impl Query {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            select: None,
            filters: Vec::new(),
            order: Vec::new(),
            limit: None,
        }
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn select(mut self, columns: impl Into<String>) -> Self {
        self.select = Some(columns.into());
        self
    }

    pub fn eq(mut self, column: impl Into<String>, value: impl ToString) -> Self {
        self.filters
            .push(Filter::Eq(column.into(), value.to_string()));
        self
    }

    pub fn in_list<I, V>(mut self, column: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: ToString,
    {
        let values = values.into_iter().map(|v| v.to_string()).collect();
        self.filters.push(Filter::In(column.into(), values));
        self
    }

    pub fn gte(mut self, column: impl Into<String>, value: impl ToString) -> Self {
        self.filters
            .push(Filter::Gte(column.into(), value.to_string()));
        self
    }

    pub fn lte(mut self, column: impl Into<String>, value: impl ToString) -> Self {
        self.filters
            .push(Filter::Lte(column.into(), value.to_string()));
        self
    }

    /// Orderings accumulate; the first one added is the primary sort key.
    pub fn order(mut self, column: impl Into<String>, order: Order) -> Self {
        self.order.push((column.into(), order));
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn filters(&self) -> &[Filter] {
        &self.filters
    }

    pub fn as_query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::with_capacity(self.filters.len() + 3);

        if let Some(select) = &self.select {
            pairs.push(("select".to_string(), compact_select(select)));
        }

        pairs.extend(self.filters.iter().map(Filter::as_query_pair));

        if !self.order.is_empty() {
            let order = self
                .order
                .iter()
                .map(|(column, order)| format!("{}.{}", column, order.as_str()))
                .collect::<Vec<_>>()
                .join(",");
            pairs.push(("order".to_string(), order));
        }

        if let Some(limit) = self.limit {
            pairs.push(("limit".to_string(), limit.to_string()));
        }

        pairs
    }
}

/// Strip whitespace from multi-line select lists so they encode cleanly.
fn compact_select(select: &str) -> String {
    select.chars().filter(|c| !c.is_whitespace()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn in_filter_quotes_reserved_characters() {
        let filter = Filter::In(
            "status".to_string(),
            vec!["todo".to_string(), "a,b".to_string()],
        );
        assert_eq!(
            filter.as_query_pair(),
            ("status".to_string(), "in.(todo,\"a,b\")".to_string())
        );
    }

    #[test]
    fn multi_line_select_is_compacted() {
        let query = Query::new("alocacoes").select(
            r#"
            engenheiro_id,
            engenheiros ( id, nome )
            "#,
        );
        assert_eq!(
            query.as_query_pairs(),
            vec![(
                "select".to_string(),
                "engenheiro_id,engenheiros(id,nome)".to_string()
            )]
        );
    }

    #[test]
    fn orderings_are_joined_in_insertion_order() {
        let query = Query::new("apontamentos_horas")
            .order("data", Order::Descending)
            .order("created_at", Order::Descending);
        assert_eq!(
            query.as_query_pairs(),
            vec![("order".to_string(), "data.desc,created_at.desc".to_string())]
        );
    }
}
