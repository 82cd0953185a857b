//! List item query builder
//!
//! Builds the `$select` / `$expand` / `$filter` / `$top` options of a list
//! read. The query stays structured so in-memory backends can evaluate it
//! without parsing OData.

/// Filter condition on a single column
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter {
    /// `field eq 'value'`
    Eq { field: String, value: String },
}

impl Filter {
    pub fn eq(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Eq {
            field: field.into(),
            value: value.into(),
        }
    }

    /// OData text of the condition
    pub fn to_odata(&self) -> String {
        match self {
            Self::Eq { field, value } => format!("{} eq {}", field, odata_string(value)),
        }
    }
}

/// Quote a string literal for OData, doubling embedded single quotes
pub fn odata_string(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// Read query against a list
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListQuery {
    pub select: Vec<String>,
    pub expand: Vec<String>,
    pub filter: Option<Filter>,
    pub top: Option<u32>,
}

impl ListQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add projected columns (`Lookup/Field` for expanded lookups)
    pub fn select<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.select.extend(fields.into_iter().map(Into::into));
        self
    }

    /// Add an expanded lookup column
    pub fn expand(mut self, field: impl Into<String>) -> Self {
        self.expand.push(field.into());
        self
    }

    pub fn filter(mut self, filter: Filter) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn top(mut self, n: u32) -> Self {
        self.top = Some(n);
        self
    }

    /// Query string pairs in the order the REST endpoint expects them
    pub fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if !self.select.is_empty() {
            pairs.push(("$select", self.select.join(",")));
        }
        if !self.expand.is_empty() {
            pairs.push(("$expand", self.expand.join(",")));
        }
        if let Some(filter) = &self.filter {
            pairs.push(("$filter", filter.to_odata()));
        }
        if let Some(top) = self.top {
            pairs.push(("$top", top.to_string()));
        }
        pairs
    }
}
