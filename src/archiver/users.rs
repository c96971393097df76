use crate::slack::SlackApi;
use anyhow::{Context, Result};
use std::collections::HashMap;

/// Read-only user id → display name table, built once per run.
#[derive(Debug, Clone, Default)]
pub struct UserDirectory {
    names: HashMap<String, String>,
}

impl UserDirectory {
    pub fn load(api: &impl SlackApi) -> Result<Self> {
        let mut names = HashMap::new();
        let mut cursor = String::new();
        loop {
            let page = api.list_users(&cursor).context("failed to list users")?;
            for user in page.items {
                if let Some(name) = user.real_name() {
                    names.insert(user.id.clone(), name.to_string());
                } else if !user.name.is_empty() {
                    names.insert(user.id.clone(), user.name.clone());
                }
            }
            if page.next_cursor.is_empty() {
                break;
            }
            cursor = page.next_cursor;
        }
        Ok(Self { names })
    }

    #[cfg(test)]
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            names: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Unknown ids (deleted users, bots) render as the raw id.
    pub fn display_name(&self, user_id: &str) -> String {
        self.names
            .get(user_id)
            .cloned()
            .unwrap_or_else(|| user_id.to_string())
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }
}
