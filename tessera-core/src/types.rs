// SPDX-License-Identifier: AGPL-3.0-or-later
// Tessera - Pixel-Partitioned Columnar Storage Engine
// Copyright (C) 2026 Sushanth Reddy Vanagala (https://github.com/sushanthpy)
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Column type categories and descriptors.
//!
//! A `TypeDescriptor` is immutable after construction and shared freely
//! between column writers running on different threads.

use serde::{Deserialize, Serialize};

/// Decimals up to this precision fit a single 64-bit word; wider decimals
/// take two words per value.
pub const SHORT_DECIMAL_MAX_PRECISION: u32 = 18;

/// Logical column categories dispatched on by the writer factory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Boolean,
    Byte,
    Short,
    Int,
    Long,
    Float,
    Double,
    Decimal,
    String,
    Char,
    Varchar,
    Binary,
    Varbinary,
    Date,
    Time,
    Timestamp,
    Vector,
}

impl Category {
    pub fn name(&self) -> &'static str {
        match self {
            Category::Boolean => "boolean",
            Category::Byte => "byte",
            Category::Short => "short",
            Category::Int => "int",
            Category::Long => "long",
            Category::Float => "float",
            Category::Double => "double",
            Category::Decimal => "decimal",
            Category::String => "string",
            Category::Char => "char",
            Category::Varchar => "varchar",
            Category::Binary => "binary",
            Category::Varbinary => "varbinary",
            Category::Date => "date",
            Category::Time => "time",
            Category::Timestamp => "timestamp",
            Category::Vector => "vector",
        }
    }
}

/// Immutable description of one column's logical type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeDescriptor {
    category: Category,
    precision: u32,
    scale: u32,
    max_length: u32,
    dimension: u32,
}

impl TypeDescriptor {
    pub fn new(category: Category) -> Self {
        Self {
            category,
            precision: 0,
            scale: 0,
            max_length: 0,
            dimension: 0,
        }
    }

    pub fn decimal(precision: u32, scale: u32) -> Self {
        Self {
            category: Category::Decimal,
            precision,
            scale,
            max_length: 0,
            dimension: 0,
        }
    }

    /// Length-bounded character or binary type.
    pub fn bounded(category: Category, max_length: u32) -> Self {
        Self {
            category,
            precision: 0,
            scale: 0,
            max_length,
            dimension: 0,
        }
    }

    /// Dense vector of `dimension` doubles.
    pub fn vector(dimension: u32) -> Self {
        Self {
            category: Category::Vector,
            precision: 0,
            scale: 0,
            max_length: 0,
            dimension,
        }
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn precision(&self) -> u32 {
        self.precision
    }

    pub fn scale(&self) -> u32 {
        self.scale
    }

    pub fn max_length(&self) -> u32 {
        self.max_length
    }

    pub fn dimension(&self) -> u32 {
        self.dimension
    }

    /// Short decimals are stored as one 64-bit word per value.
    pub fn is_short_decimal(&self) -> bool {
        self.category == Category::Decimal && self.precision <= SHORT_DECIMAL_MAX_PRECISION
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decimal_width_split() {
        assert!(TypeDescriptor::decimal(9, 2).is_short_decimal());
        assert!(TypeDescriptor::decimal(18, 0).is_short_decimal());
        assert!(!TypeDescriptor::decimal(19, 0).is_short_decimal());
        assert!(!TypeDescriptor::decimal(38, 10).is_short_decimal());
    }

    #[test]
    fn test_bounded_types() {
        let t = TypeDescriptor::bounded(Category::Varchar, 32);
        assert_eq!(t.category(), Category::Varchar);
        assert_eq!(t.max_length(), 32);
    }
}
