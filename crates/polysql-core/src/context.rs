//! Per-build resolver context.
//!
//! A [`Context`] is created for one statement build and carries the target
//! platform, the optional structure tree and a stack of resolver scopes.
//! Statements open a scope for their own body; sub-selects therefore see
//! the aliases of enclosing queries, while their own aliases disappear with
//! their scope.
//!
//! In [`ResolverMode::Strict`] an identifier that matches nothing raises a
//! [`ResolutionError`]. In [`ResolverMode::Virtual`] the missing table or
//! column is synthesized on first reference and remembered for the rest of
//! the build.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::trace;

use crate::error::{ResolutionError, StructureKind};
use crate::platform::Platform;
use crate::statement::{ResultColumn, ResultColumnMap, StatementType};
use crate::structure::{ColumnRef, ColumnStructure, StructureProvider, StructureRef, TableStructure};
use crate::types::DataType;

/// What happens when an identifier cannot be resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ResolverMode {
    /// Fail with a [`ResolutionError`].
    #[default]
    Strict,
    /// Synthesize placeholder structure.
    Virtual,
}

/// What an alias stands for.
#[derive(Debug, Clone, PartialEq)]
pub enum AliasTarget {
    /// A table bound with `AS alias` in FROM / JOIN.
    Table(Arc<TableStructure>),
    /// A select-list entry bound with `AS alias`.
    ResultColumn(String),
}

/// A resolved column reference.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnResolution {
    /// A table column, rendered as `qualifier.name`.
    Column {
        /// The column and its table.
        column: ColumnRef,
        /// Identifier segments that qualify the column in SQL; empty for
        /// bare columns.
        qualifier: Vec<String>,
    },
    /// A select-list alias, rendered bare.
    ResultColumn(String),
}

/// A table visible in a scope, with the segments used to qualify its
/// columns.
#[derive(Debug, Clone)]
struct ScopedTable {
    table: Arc<TableStructure>,
    qualifier: Vec<String>,
}

#[derive(Debug, Clone, Default)]
struct ResolverScope {
    pivot: Option<StructureRef>,
    tables: Vec<ScopedTable>,
    aliases: HashMap<String, AliasTarget>,
}

impl ResolverScope {
    fn pivot_table(&self) -> Option<&Arc<TableStructure>> {
        self.pivot.as_ref().and_then(StructureRef::as_table)
    }
}

fn table_matches(table: &TableStructure, namespace: Option<&str>, name: &str) -> bool {
    table.name() == name && namespace.map_or(true, |ns| table.parent_path() == Some(ns))
}

fn split_path(path: &str) -> (Option<&str>, &str) {
    match path.rsplit_once('.') {
        Some((parent, name)) => (Some(parent), name),
        None => (None, path),
    }
}

fn segments(path: &str) -> Vec<String> {
    path.split('.').map(String::from).collect()
}

/// State of one statement build.
#[derive(Debug, Clone)]
pub struct Context {
    platform: Arc<dyn Platform>,
    structure: Option<Arc<dyn StructureProvider>>,
    mode: ResolverMode,
    scopes: Vec<ResolverScope>,
    virtual_tables: HashMap<String, Arc<TableStructure>>,
    result_columns: ResultColumnMap,
    statement_type: Option<StatementType>,
}

impl Context {
    /// Creates a context without schema knowledge. Identifiers are resolved
    /// virtually.
    #[must_use]
    pub fn new(platform: Arc<dyn Platform>) -> Self {
        Self {
            platform,
            structure: None,
            mode: ResolverMode::Virtual,
            scopes: Vec::new(),
            virtual_tables: HashMap::new(),
            result_columns: ResultColumnMap::new(),
            statement_type: None,
        }
    }

    /// Creates a context resolving identifiers against a structure tree.
    #[must_use]
    pub fn with_structure(
        platform: Arc<dyn Platform>,
        structure: Arc<dyn StructureProvider>,
        mode: ResolverMode,
    ) -> Self {
        Self {
            structure: Some(structure),
            mode,
            ..Self::new(platform)
        }
    }

    /// Overrides the resolver mode.
    #[must_use]
    pub const fn mode(mut self, mode: ResolverMode) -> Self {
        self.mode = mode;
        self
    }

    /// The target platform.
    #[must_use]
    pub const fn platform(&self) -> &Arc<dyn Platform> {
        &self.platform
    }

    /// The active resolver mode.
    #[must_use]
    pub const fn resolver_mode(&self) -> ResolverMode {
        self.mode
    }

    /// Number of open scopes. The outermost statement runs at depth 1.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    /// Opens a resolver scope.
    pub fn push_resolver_context(&mut self, pivot: Option<StructureRef>) {
        self.scopes.push(ResolverScope {
            pivot,
            ..ResolverScope::default()
        });
    }

    /// Closes the innermost resolver scope, dropping its aliases.
    ///
    /// # Panics
    ///
    /// Panics if no scope is open: pushes and pops must balance.
    pub fn pop_resolver_context(&mut self) {
        assert!(
            self.scopes.pop().is_some(),
            "resolver scope stack underflow"
        );
    }

    /// Runs `f` inside a fresh scope, closing it even if `f` fails.
    ///
    /// # Errors
    ///
    /// Returns the error of `f`.
    pub fn scoped<T, E>(
        &mut self,
        pivot: Option<StructureRef>,
        f: impl FnOnce(&mut Self) -> Result<T, E>,
    ) -> Result<T, E> {
        self.push_resolver_context(pivot);
        let result = f(self);
        self.pop_resolver_context();
        result
    }

    /// Makes a table visible in the innermost scope. Columns are qualified
    /// with `alias` if given, else with the table's dotted path. The first
    /// table of a scope without a pivot becomes its pivot.
    pub fn register_table(&mut self, table: Arc<TableStructure>, alias: Option<&str>) {
        let Some(scope) = self.scopes.last_mut() else {
            return;
        };
        let qualifier = alias.map_or_else(|| segments(&table.path()), |a| vec![a.to_string()]);
        if let Some(alias) = alias {
            scope
                .aliases
                .insert(alias.to_string(), AliasTarget::Table(Arc::clone(&table)));
        }
        if scope.pivot.is_none() {
            scope.pivot = Some(StructureRef::Table(Arc::clone(&table)));
        }
        scope.tables.push(ScopedTable { table, qualifier });
    }

    /// Makes the target table of a data-modifying statement visible in the
    /// innermost scope. Its columns render unqualified.
    pub fn register_target_table(&mut self, table: Arc<TableStructure>) {
        let Some(scope) = self.scopes.last_mut() else {
            return;
        };
        if scope.pivot.is_none() {
            scope.pivot = Some(StructureRef::Table(Arc::clone(&table)));
        }
        scope.tables.push(ScopedTable {
            table,
            qualifier: Vec::new(),
        });
    }

    /// Tables registered in the innermost scope, in registration order.
    #[must_use]
    pub fn tables_in_scope(&self) -> Vec<Arc<TableStructure>> {
        self.scopes
            .last()
            .map(|scope| scope.tables.iter().map(|s| Arc::clone(&s.table)).collect())
            .unwrap_or_default()
    }

    /// Binds an alias in the innermost scope.
    pub fn set_alias(&mut self, name: impl Into<String>, target: AliasTarget) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.aliases.insert(name.into(), target);
        }
    }

    /// Returns true if `name` is bound as an alias in any open scope.
    #[must_use]
    pub fn is_alias(&self, name: &str) -> bool {
        self.alias(name).is_some()
    }

    fn alias(&self, name: &str) -> Option<&AliasTarget> {
        self.scopes.iter().rev().find_map(|s| s.aliases.get(name))
    }

    /// Resolves a dotted table path: aliases first, then tables in scope and
    /// scope pivots, then the structure tree.
    ///
    /// # Errors
    ///
    /// Returns a [`ResolutionError`] in strict mode if nothing matches.
    pub fn find_table(&mut self, path: &str) -> Result<Arc<TableStructure>, ResolutionError> {
        let (namespace, name) = split_path(path);
        if namespace.is_none() {
            if let Some(AliasTarget::Table(table)) = self.alias(name) {
                return Ok(Arc::clone(table));
            }
        }
        for scope in self.scopes.iter().rev() {
            if let Some(scoped) = scope
                .tables
                .iter()
                .find(|s| table_matches(&s.table, namespace, name))
            {
                return Ok(Arc::clone(&scoped.table));
            }
            match &scope.pivot {
                Some(StructureRef::Table(table)) if table_matches(table, namespace, name) => {
                    return Ok(Arc::clone(table));
                }
                Some(StructureRef::Namespace(ns))
                    if namespace.map_or(true, |n| n == ns.name()) =>
                {
                    if let Some(table) = ns.find_table(name) {
                        return Ok(table);
                    }
                }
                _ => {}
            }
        }
        if let Some(table) = self.virtual_tables.get(path) {
            return Ok(Arc::clone(table));
        }
        if let Some(table) = self
            .structure
            .as_ref()
            .and_then(|s| s.table(namespace, name))
        {
            return Ok(table);
        }
        if self.mode == ResolverMode::Strict {
            return Err(ResolutionError::new(StructureKind::Table, path));
        }
        let mut table = TableStructure::new(name);
        if let Some(namespace) = namespace {
            table = table.in_namespace(namespace);
        }
        let table = Arc::new(table);
        trace!(path = %path, "Synthesized virtual table");
        self.virtual_tables.insert(table.path(), Arc::clone(&table));
        Ok(table)
    }

    /// Resolves a dotted column path.
    ///
    /// A bare name is looked up among select-list aliases, then among the
    /// columns of the tables in scope, innermost scope first. A qualified
    /// name resolves its table part with [`Context::find_table`] rules.
    ///
    /// # Errors
    ///
    /// Returns a [`ResolutionError`] in strict mode if nothing matches.
    pub fn find_column(&mut self, path: &str) -> Result<ColumnResolution, ResolutionError> {
        match split_path(path) {
            (None, name) => self.find_bare_column(name),
            (Some(table_path), name) => self.find_qualified_column(path, table_path, name),
        }
    }

    fn find_bare_column(&mut self, name: &str) -> Result<ColumnResolution, ResolutionError> {
        if let Some(AliasTarget::ResultColumn(column)) = self.alias(name) {
            return Ok(ColumnResolution::ResultColumn(column.clone()));
        }
        for scope in self.scopes.iter().rev() {
            let candidates = scope.tables.iter().map(|s| (&s.table, s.qualifier.clone()));
            let pivot = scope
                .pivot_table()
                .filter(|p| !scope.tables.iter().any(|s| Arc::ptr_eq(&s.table, p)))
                .map(|p| (p, segments(&p.path())));
            for (table, qualifier) in candidates.chain(pivot) {
                if let Some(column) = table.find_column(name) {
                    return Ok(ColumnResolution::Column {
                        column: ColumnRef {
                            table: Some(Arc::clone(table)),
                            column: column.clone(),
                        },
                        qualifier,
                    });
                }
            }
        }
        if self.mode == ResolverMode::Strict {
            return Err(ResolutionError::new(StructureKind::Column, name));
        }
        let owner = self.scopes.iter().rev().find_map(|scope| {
            scope
                .tables
                .first()
                .map(|s| (Arc::clone(&s.table), s.qualifier.clone()))
                .or_else(|| {
                    scope
                        .pivot_table()
                        .map(|p| (Arc::clone(p), segments(&p.path())))
                })
        });
        match owner {
            Some((table, qualifier)) => Ok(ColumnResolution::Column {
                column: self.synthesize_column(&table, name),
                qualifier,
            }),
            None => {
                trace!(path = %name, "Synthesized virtual column without table");
                Ok(ColumnResolution::Column {
                    column: ColumnRef {
                        table: None,
                        column: ColumnStructure::new(name, DataType::UNDEFINED),
                    },
                    qualifier: Vec::new(),
                })
            }
        }
    }

    fn find_qualified_column(
        &mut self,
        path: &str,
        table_path: &str,
        name: &str,
    ) -> Result<ColumnResolution, ResolutionError> {
        let (namespace, table_name) = split_path(table_path);
        let in_scope = if let (None, Some(AliasTarget::Table(table))) =
            (namespace, self.alias(table_name))
        {
            Some((Arc::clone(table), vec![table_name.to_string()]))
        } else {
            self.scopes.iter().rev().find_map(|scope| {
                scope
                    .tables
                    .iter()
                    .find(|s| table_matches(&s.table, namespace, table_name))
                    .map(|s| (Arc::clone(&s.table), s.qualifier.clone()))
            })
        };
        let (table, qualifier) = match in_scope {
            Some(found) => found,
            None => {
                let table = self.find_table(table_path)?;
                let qualifier = segments(&table.path());
                (table, qualifier)
            }
        };
        if let Some(column) = table.find_column(name) {
            return Ok(ColumnResolution::Column {
                column: ColumnRef {
                    table: Some(Arc::clone(&table)),
                    column: column.clone(),
                },
                qualifier,
            });
        }
        if self.mode == ResolverMode::Strict {
            return Err(ResolutionError::new(StructureKind::Column, path));
        }
        Ok(ColumnResolution::Column {
            column: self.synthesize_column(&table, name),
            qualifier,
        })
    }

    /// Adds an untyped column to `table` and makes every scope see the
    /// extended table.
    fn synthesize_column(&mut self, table: &Arc<TableStructure>, name: &str) -> ColumnRef {
        let column = ColumnStructure::new(name, DataType::UNDEFINED);
        let mut extended = TableStructure::clone(table);
        extended.push_column(column.clone());
        let extended = Arc::new(extended);
        trace!(path = %format!("{}.{name}", table.path()), "Synthesized virtual column");

        for scope in &mut self.scopes {
            for scoped in &mut scope.tables {
                if Arc::ptr_eq(&scoped.table, table) {
                    scoped.table = Arc::clone(&extended);
                }
            }
            for target in scope.aliases.values_mut() {
                if matches!(target, AliasTarget::Table(t) if Arc::ptr_eq(t, table)) {
                    *target = AliasTarget::Table(Arc::clone(&extended));
                }
            }
            if matches!(&scope.pivot, Some(StructureRef::Table(t)) if Arc::ptr_eq(t, table)) {
                scope.pivot = Some(StructureRef::Table(Arc::clone(&extended)));
            }
        }
        self.virtual_tables
            .insert(extended.path(), Arc::clone(&extended));
        ColumnRef {
            table: Some(extended),
            column,
        }
    }

    /// Records a select-list entry. Ignored unless the outermost statement
    /// scope is active, so sub-select columns never leak upward.
    pub fn set_result_column(&mut self, column: ResultColumn) {
        if self.depth() == 1 {
            self.result_columns.set(column);
        }
    }

    /// Binds a select-list alias in the innermost scope.
    pub fn register_result_alias(&mut self, alias: &str) {
        self.set_alias(alias, AliasTarget::ResultColumn(alias.to_string()));
    }

    /// Records the statement type. Ignored outside the outermost scope.
    pub fn set_statement_type(&mut self, statement_type: StatementType) {
        if self.depth() == 1 {
            self.statement_type = Some(statement_type);
        }
    }

    /// Result columns recorded so far.
    #[must_use]
    pub const fn result_columns(&self) -> &ResultColumnMap {
        &self.result_columns
    }

    /// Statement type recorded so far.
    #[must_use]
    pub const fn statement_type(&self) -> Option<StatementType> {
        self.statement_type
    }
}
