//! Per-engine data type tables and the common-type converter contract

use std::collections::HashMap;

use crate::{Column, CommonKind, DbmError, PortableType, Result};

/// One native type an engine supports
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct EngineDataType {
    /// Name as the engine spells it, without parameters (`Decimal`, not `Decimal(10, 2)`)
    pub native_name: &'static str,
    /// Storage category used for literals and cross-engine comparison
    pub portable: PortableType,
    /// Logical kind this type stands for when data leaves the engine
    pub common: CommonKind,
}

impl EngineDataType {
    pub const fn new(native_name: &'static str, portable: PortableType, common: CommonKind) -> Self {
        Self {
            native_name,
            portable,
            common,
        }
    }
}

/// Name-indexed table of an engine's native types
#[derive(Debug)]
pub struct DataTypeTable {
    engine: &'static str,
    types: Vec<&'static EngineDataType>,
    by_name: HashMap<&'static str, &'static EngineDataType>,
}

impl DataTypeTable {
    /// Build a table; a later entry with a duplicate name is ignored
    pub fn new(engine: &'static str, types: &[&'static EngineDataType]) -> Self {
        let mut by_name = HashMap::with_capacity(types.len());
        let mut ordered = Vec::with_capacity(types.len());
        for &ty in types {
            if by_name.contains_key(ty.native_name) {
                tracing::warn!(engine, name = ty.native_name, "duplicate data type entry");
                continue;
            }
            by_name.insert(ty.native_name, ty);
            ordered.push(ty);
        }
        Self {
            engine,
            types: ordered,
            by_name,
        }
    }

    pub fn engine(&self) -> &'static str {
        self.engine
    }

    /// Exact, case-sensitive lookup
    pub fn get(&self, name: &str) -> Option<&'static EngineDataType> {
        self.by_name.get(name).copied()
    }

    /// Exact lookup that reports a miss as [`DbmError::UnknownDataType`]
    pub fn lookup(&self, name: &str) -> Result<&'static EngineDataType> {
        self.get(name)
            .ok_or_else(|| DbmError::unknown_data_type(self.engine, name))
    }

    /// Look up a full native type expression by its base name.
    ///
    /// `Decimal(18, 4)` and `DateTime64(3, 'UTC')` resolve to `Decimal` and
    /// `DateTime64`. Engine wrapper syntax must be normalized away first.
    pub fn resolve(&self, native_type: &str) -> Result<&'static EngineDataType> {
        let base = native_type
            .split_once('(')
            .map_or(native_type, |(base, _)| base)
            .trim();
        self.get(base)
            .ok_or_else(|| DbmError::unknown_data_type(self.engine, native_type))
    }

    /// Entries of one portable category, in declaration order
    pub fn by_portable(&self, portable: PortableType) -> Vec<&'static EngineDataType> {
        self.types
            .iter()
            .copied()
            .filter(|ty| ty.portable == portable)
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &'static EngineDataType> + '_ {
        self.types.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

/// Chooses this engine's native type for a generic logical kind.
///
/// Implementations match exhaustively on [`CommonKind`], so every kind has
/// exactly one rule per engine.
pub trait CommonTypeConverter: Send + Sync {
    fn native_type(&self, kind: CommonKind) -> &'static EngineDataType;
}

/// Re-type columns read from one engine for creation on another.
///
/// Each source type is resolved through `source` to its logical kind and then
/// placed through `target`. Parameters carry over only for fixed-width strings
/// and decimals, where both sides agree on their meaning; all others are
/// dropped. An unresolvable source type is an error rather than a silent
/// fallback.
pub fn convert_columns(
    source: &DataTypeTable,
    target: &dyn CommonTypeConverter,
    columns: &[Column],
) -> Result<Vec<Column>> {
    columns
        .iter()
        .map(|column| {
            let source_type = source.resolve(&column.data_type)?;
            let target_type = target.native_type(source_type.common);
            tracing::trace!(
                column = %column.column_name,
                from = source_type.native_name,
                to = target_type.native_name,
                "converted column type"
            );
            let params = column
                .data_type
                .find('(')
                .map(|idx| &column.data_type[idx..])
                .filter(|_| {
                    target_type.common == source_type.common
                        && matches!(source_type.common, CommonKind::Char | CommonKind::Decimal)
                });
            Ok(Column {
                data_type: format!("{}{}", target_type.native_name, params.unwrap_or("")),
                ..column.clone()
            })
        })
        .collect()
}
