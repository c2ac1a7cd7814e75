use url::Url;

use crate::{Query, RestbaseError};

#[derive(Debug, Clone)]
pub struct RestbaseURL(Url);

impl AsRef<str> for RestbaseURL {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl RestbaseURL {
    pub fn parse(base: &str) -> Result<Self, RestbaseError> {
        let url = Url::parse(base.trim_end_matches('/'))
            .map_err(|e| RestbaseError::Configuration(format!("invalid base url '{base}': {e}")))?;
        Ok(Self(url))
    }

    /// Append the given path to the URL.
    pub fn append_path(&self, path: &str) -> Self {
        let trimmed_url = self.0.as_str().trim_end_matches('/');
        let trimmed_path = path.trim_start_matches('/');
        // Joining two valid segments cannot produce an invalid URL.
        match Url::parse(&format!("{}/{}", trimmed_url, trimmed_path)) {
            Ok(url) => Self(url),
            Err(_) => self.clone(),
        }
    }

    /// URL of a table endpoint, e.g. `/rest/v1/projetos`.
    pub fn table(&self, table: &str) -> Self {
        self.append_path(&format!("rest/v1/{table}"))
    }

    pub fn with_query(&self, query: &Query) -> Self {
        self.with_pairs(query.as_query_pairs())
    }

    pub fn with_pairs(&self, pairs: Vec<(String, String)>) -> Self {
        let mut url = self.0.clone();
        {
            let mut serializer = url.query_pairs_mut();
            for (key, value) in pairs {
                serializer.append_pair(&key, &value);
            }
        }
        Self(url)
    }

    pub fn as_url(&self) -> &Url {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Order;

    #[test]
    fn table_url_is_joined_without_double_slashes() {
        let base = RestbaseURL::parse("https://example.supabase.co/").expect("valid url");
        assert_eq!(
            base.table("projetos").as_ref(),
            "https://example.supabase.co/rest/v1/projetos"
        );
    }

    #[test]
    fn query_is_encoded_as_postgrest_pairs() {
        let base = RestbaseURL::parse("https://example.supabase.co").expect("valid url");
        let query = Query::new("atividades")
            .select("id,status")
            .eq("projeto_id", "p1")
            .order("updated_at", Order::Descending)
            .limit(5);

        let url = base.table("atividades").with_query(&query);
        assert_eq!(
            url.as_ref(),
            "https://example.supabase.co/rest/v1/atividades?select=id%2Cstatus&projeto_id=eq.p1&order=updated_at.desc&limit=5"
        );
    }
}
