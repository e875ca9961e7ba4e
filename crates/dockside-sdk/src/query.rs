/// Flat query parameters of a request
///
/// Boolean flags are written as `key=1` when set and left out otherwise,
/// the engine treats an absent flag as false.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub(crate) struct Query {
    pairs: Vec<(String, String)>,
}

impl Query {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn flag(mut self, key: &str, value: bool) -> Self {
        if value {
            self.pairs.push((key.to_string(), String::from("1")));
        }

        self
    }

    pub(crate) fn into_pairs(self) -> Vec<(String, String)> {
        self.pairs
    }
}
