/// Key-construction helpers for the Redis-backed store.
///
/// Index keys live under `{prefix}:{collection}:idx:` and must agree with the layout the Lua
/// scripts rebuild from field names.
#[derive(Debug, Clone)]
pub struct KeyContext<'a> {
    pub prefix: &'a str,
}

impl<'a> KeyContext<'a> {
    pub fn new(prefix: &'a str) -> Self {
        Self { prefix }
    }

    pub fn document(&self, collection: &str, id: &str) -> String {
        format!("{}:{}:{}", self.prefix, collection, id)
    }

    pub fn index_prefix(&self, collection: &str) -> String {
        format!("{}:{}:idx:", self.prefix, collection)
    }

    /// Set of ids whose scalar `field` equals `value`.
    pub fn equality_index(&self, collection: &str, field: &str, value: &str) -> String {
        format!("{}eq:{}:{}", self.index_prefix(collection), field, value)
    }

    /// Set of ids whose array `field` contains `value`.
    pub fn membership_index(&self, collection: &str, field: &str, value: &str) -> String {
        format!("{}has:{}:{}", self.index_prefix(collection), field, value)
    }

    /// Set of every id in the collection.
    pub fn members(&self, collection: &str) -> String {
        format!("{}all", self.index_prefix(collection))
    }

    /// Glob matching every key owned by this prefix.
    pub fn all_pattern(&self) -> String {
        format!("{}:*", self.prefix)
    }
}
