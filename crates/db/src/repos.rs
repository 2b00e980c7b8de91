use opsboard_core::Repo;

use crate::Db;
use crate::error::Result;
use crate::helpers::row_to_repo;

impl Db {
    pub fn list_repos(&self) -> Result<Vec<Repo>> {
        let mut stmt = self.conn().prepare(
            r#"
            SELECT id, name, default_branch, created_at
            FROM repos
            ORDER BY name ASC
            "#,
        )?;
        let rows = stmt
            .query_map([], row_to_repo)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }
}
