/// Ordered query parameters for one upstream request.
///
/// Insertion order is preserved on the wire; [`QueryParams::cache_key_part`]
/// sorts by key so equivalent parameter sets map to the same cache entry.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct QueryParams(Vec<(String, String)>);

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds parameters from `(key, value)` pairs.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self(
            pairs
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }

    /// Parameters for one upstream list page, with an optional search term.
    ///
    /// Blank search terms are dropped.
    pub fn page(page: usize, search: Option<&str>) -> Self {
        let mut params = Self::new().with("page", page.to_string());
        if let Some(term) = search.map(str::trim).filter(|term| !term.is_empty()) {
            params = params.with("search", term);
        }
        params
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.push((key.into(), value.into()));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn as_pairs(&self) -> &[(String, String)] {
        &self.0
    }

    /// Deterministic, order-independent rendering used in cache keys.
    ///
    /// Keys and values are form-urlencoded, so a value containing `&` or `=`
    /// never collides with a different parameter set.
    pub(crate) fn cache_key_part(&self) -> String {
        let mut pairs: Vec<&(String, String)> = self.0.iter().collect();
        pairs.sort();
        url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(pairs.into_iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .finish()
    }
}

impl From<()> for QueryParams {
    fn from(_: ()) -> Self {
        Self::default()
    }
}

impl<K, V> From<Vec<(K, V)>> for QueryParams
where
    K: Into<String>,
    V: Into<String>,
{
    fn from(pairs: Vec<(K, V)>) -> Self {
        Self::from_pairs(pairs)
    }
}

impl<K, V, const N: usize> From<[(K, V); N]> for QueryParams
where
    K: Into<String>,
    V: Into<String>,
{
    fn from(pairs: [(K, V); N]) -> Self {
        Self::from_pairs(pairs)
    }
}
