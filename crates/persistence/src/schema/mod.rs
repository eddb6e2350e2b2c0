//! Typed table/column descriptors and dialect-aware DDL generation.
//!
//! Each table is described once as an ordered list of typed columns plus its
//! foreign keys; `CREATE TABLE IF NOT EXISTS` text is generated per dialect
//! from the descriptor. Column names are referenced through the constants in
//! [`tables`], never through ad-hoc strings at call sites.

pub mod tables;

use crate::db::Dialect;

/// Semantic column types; each maps to a dialect-specific SQL type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Int,
    Long,
    Double,
    Bool,
    Varchar(u16),
    Text,
}

impl ColumnKind {
    fn sql_type(self, dialect: Dialect) -> String {
        match (self, dialect) {
            (ColumnKind::Int, Dialect::MySql) => "INT".into(),
            (ColumnKind::Int, Dialect::Sqlite) => "INTEGER".into(),
            (ColumnKind::Long, Dialect::MySql) => "BIGINT".into(),
            (ColumnKind::Long, Dialect::Sqlite) => "INTEGER".into(),
            (ColumnKind::Double, Dialect::MySql) => "DOUBLE".into(),
            (ColumnKind::Double, Dialect::Sqlite) => "REAL".into(),
            (ColumnKind::Bool, _) => "BOOLEAN".into(),
            (ColumnKind::Varchar(n), _) => format!("VARCHAR({n})"),
            (ColumnKind::Text, _) => "TEXT".into(),
        }
    }
}

/// One column of a table descriptor.
#[derive(Debug, Clone)]
pub struct Column {
    pub name: &'static str,
    pub kind: ColumnKind,
    pub not_null: bool,
    pub unique: bool,
    pub default: Option<&'static str>,
    /// Autoincrementing integer primary key. At most one per table.
    pub auto_id: bool,
}

impl Column {
    pub const fn new(name: &'static str, kind: ColumnKind) -> Self {
        Self {
            name,
            kind,
            not_null: true,
            unique: false,
            default: None,
            auto_id: false,
        }
    }

    pub const fn nullable(mut self) -> Self {
        self.not_null = false;
        self
    }

    pub const fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    pub const fn default(mut self, value: &'static str) -> Self {
        self.default = Some(value);
        self
    }

    /// Autoincrementing integer primary key column.
    pub const fn auto_id(name: &'static str) -> Self {
        Self {
            name,
            kind: ColumnKind::Int,
            not_null: true,
            unique: false,
            default: None,
            auto_id: true,
        }
    }

    fn definition(&self, dialect: Dialect) -> String {
        if self.auto_id {
            return match dialect {
                Dialect::MySql => format!("{} INT NOT NULL AUTO_INCREMENT", self.name),
                Dialect::Sqlite => format!("{} INTEGER PRIMARY KEY AUTOINCREMENT", self.name),
            };
        }
        let mut def = format!("{} {}", self.name, self.kind.sql_type(dialect));
        if self.not_null {
            def.push_str(" NOT NULL");
        }
        if let Some(default) = self.default {
            def.push_str(&format!(" DEFAULT {default}"));
        }
        if self.unique {
            def.push_str(" UNIQUE");
        }
        def
    }
}

/// A foreign key from one column to a referenced table's column.
#[derive(Debug, Clone)]
pub struct ForeignKey {
    pub column: &'static str,
    pub references_table: &'static str,
    pub references_column: &'static str,
}

/// Descriptor of one table: ordered columns plus foreign keys.
#[derive(Debug, Clone)]
pub struct Table {
    pub name: &'static str,
    pub columns: Vec<Column>,
    pub foreign_keys: Vec<ForeignKey>,
}

impl Table {
    pub fn new(name: &'static str, columns: Vec<Column>) -> Self {
        Self {
            name,
            columns,
            foreign_keys: Vec::new(),
        }
    }

    pub fn foreign_key(
        mut self,
        column: &'static str,
        references_table: &'static str,
        references_column: &'static str,
    ) -> Self {
        self.foreign_keys.push(ForeignKey {
            column,
            references_table,
            references_column,
        });
        self
    }

    /// Idempotent creation DDL for the given dialect.
    pub fn create_sql(&self, dialect: Dialect) -> String {
        let mut parts: Vec<String> = self
            .columns
            .iter()
            .map(|c| c.definition(dialect))
            .collect();

        // MySQL declares the autoincrement primary key separately; SQLite
        // folds it into the column definition.
        if dialect == Dialect::MySql {
            if let Some(id) = self.columns.iter().find(|c| c.auto_id) {
                parts.push(format!("PRIMARY KEY ({})", id.name));
            }
        }

        for fk in &self.foreign_keys {
            parts.push(format!(
                "FOREIGN KEY ({}) REFERENCES {}({})",
                fk.column, fk.references_table, fk.references_column
            ));
        }

        format!(
            "CREATE TABLE IF NOT EXISTS {} ({})",
            self.name,
            parts.join(", ")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_table() -> Table {
        Table::new(
            "samples",
            vec![
                Column::auto_id("id"),
                Column::new("uuid", ColumnKind::Varchar(36)).unique(),
                Column::new("date", ColumnKind::Long),
                Column::new("value", ColumnKind::Double).nullable(),
                Column::new("flag", ColumnKind::Bool).default("0"),
            ],
        )
        .foreign_key("owner_id", "owners", "id")
    }

    #[test]
    fn mysql_ddl() {
        let sql = sample_table().create_sql(Dialect::MySql);
        assert_eq!(
            sql,
            "CREATE TABLE IF NOT EXISTS samples (\
             id INT NOT NULL AUTO_INCREMENT, \
             uuid VARCHAR(36) NOT NULL UNIQUE, \
             date BIGINT NOT NULL, \
             value DOUBLE, \
             flag BOOLEAN NOT NULL DEFAULT 0, \
             PRIMARY KEY (id), \
             FOREIGN KEY (owner_id) REFERENCES owners(id))"
        );
    }

    #[test]
    fn sqlite_ddl() {
        let sql = sample_table().create_sql(Dialect::Sqlite);
        assert_eq!(
            sql,
            "CREATE TABLE IF NOT EXISTS samples (\
             id INTEGER PRIMARY KEY AUTOINCREMENT, \
             uuid VARCHAR(36) NOT NULL UNIQUE, \
             date INTEGER NOT NULL, \
             value REAL, \
             flag BOOLEAN NOT NULL DEFAULT 0, \
             FOREIGN KEY (owner_id) REFERENCES owners(id))"
        );
    }
}
