use serde::Deserialize;

#[derive(Deserialize, Debug, Clone)]
pub struct User {
    pub key: Option<String>,
    pub name: Option<String>,
    #[serde(rename = "accountId")]
    pub account_id: Option<String>,
}

impl User {
    /// Stable identity used to key actor timelines. Changelog `from`/`to`
    /// values for the assignee field carry the same key.
    pub fn identity(&self) -> Option<&str> {
        self.key
            .as_deref()
            .or(self.name.as_deref())
            .or(self.account_id.as_deref())
    }
}
