//! Query-string construction for AccountRight requests.
//!
//! Field filters and plain parameters are serialized separately and then
//! joined, with filters first.

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    filters: Vec<(String, String)>,
    params: Vec<(String, String)>,
}

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a field filter, serialized as `filters[key]=value`.
    pub fn filter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.filters.push((key.into(), value.into()));
        self
    }

    /// Add a plain `key=value` parameter.
    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.push((key.into(), value.into()));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty() && self.params.is_empty()
    }

    /// Serialize to a query string without the leading `?`.
    ///
    /// Values are passed through as-is; percent-encoding happens when the
    /// final URL is parsed by the HTTP client.
    pub fn to_query_string(&self) -> String {
        let filters = self
            .filters
            .iter()
            .map(|(k, v)| format!("filters[{k}]={v}"))
            .collect::<Vec<_>>()
            .join("&");
        let params = self
            .params
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join("&");

        format!("{filters}&{params}").trim_matches('&').to_string()
    }

    /// Append the query string to `url`, if there is one.
    pub fn apply_to(&self, url: &str) -> String {
        if self.is_empty() {
            return url.to_string();
        }
        format!("{url}?{}", self.to_query_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_params_leave_url_untouched() {
        let query = QueryParams::new();
        assert!(query.is_empty());
        assert_eq!(query.to_query_string(), "");
        assert_eq!(query.apply_to("https://host/a"), "https://host/a");
    }

    #[test]
    fn plain_params_only_have_no_stray_separator() {
        let query = QueryParams::new()
            .param("$orderby", "Date desc")
            .param("$top", "10");
        assert_eq!(query.to_query_string(), "$orderby=Date desc&$top=10");
    }

    #[test]
    fn filters_only_have_no_stray_separator() {
        let query = QueryParams::new().filter("Status", "Open");
        assert_eq!(query.to_query_string(), "filters[Status]=Open");
    }

    #[test]
    fn filters_come_before_plain_params() {
        let query = QueryParams::new()
            .param("$orderby", "Date desc")
            .filter("Status", "Open")
            .filter("Supplier", "Acme");
        assert_eq!(
            query.apply_to("https://host/Purchase/Bill"),
            "https://host/Purchase/Bill?filters[Status]=Open&filters[Supplier]=Acme&$orderby=Date desc"
        );
    }
}
