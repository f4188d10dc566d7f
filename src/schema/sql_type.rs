use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::schema::SchemaError;

/// Concrete column type tag as declared in a schema or produced by inference.
///
/// The lowercase variants follow MySQL naming; the `Integer`, `Real`,
/// `Numeric` and `Sqlite*` variants are SQLite storage classes and print in
/// upper case, the way SQLite reports them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum SqlType {
    TinyInt,
    SmallInt,
    MediumInt,
    Int,
    BigInt,
    Float,
    Double,
    Decimal,
    Char,
    Varchar,
    Text,
    Enum,
    Set,
    Date,
    DateTime,
    Timestamp,
    Time,
    Year,
    Bit,
    Blob,
    Json,
    Integer,
    Real,
    Numeric,
    SqliteText,
    SqliteBlob,
    SqliteDate,
}

/// Coarse grouping used to decide whether two concrete types may be equated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeFamily {
    Numeric,
    Text,
    Temporal,
    Binary,
    Json,
}

impl SqlType {
    pub fn family(self) -> TypeFamily {
        use SqlType::*;
        match self {
            TinyInt | SmallInt | MediumInt | Int | BigInt | Year | Integer
            | Float | Double | Decimal | Real | Numeric => TypeFamily::Numeric,
            Char | Varchar | Text | Enum | Set | SqliteText => TypeFamily::Text,
            Date | DateTime | Timestamp | Time | SqliteDate => TypeFamily::Temporal,
            Bit | Blob | SqliteBlob => TypeFamily::Binary,
            Json => TypeFamily::Json,
        }
    }

    pub fn is_numeric(self) -> bool {
        self.family() == TypeFamily::Numeric
    }

    /// Position in the promotion order
    /// `tinyint < smallint < mediumint < int < bigint < float < double < decimal < varchar`.
    /// SQLite storage classes share the slot of their MySQL counterpart.
    pub fn rank(self) -> Option<usize> {
        use SqlType::*;
        match self {
            TinyInt => Some(0),
            SmallInt => Some(1),
            MediumInt => Some(2),
            Int => Some(3),
            BigInt | Integer => Some(4),
            Float => Some(5),
            Double | Real => Some(6),
            Decimal | Numeric => Some(7),
            Varchar | SqliteText => Some(8),
            _ => None,
        }
    }

    /// The wider of two types. Pairs outside the promotion order keep the left type.
    pub fn most_general(a: SqlType, b: SqlType) -> SqlType {
        if a == b {
            return a;
        }
        match (a.rank(), b.rank()) {
            (Some(ra), Some(rb)) if rb > ra => b,
            _ => a,
        }
    }

    /// Whether a strict equation between the two types is satisfiable.
    /// Text literals compare against temporal columns.
    pub fn compatible(a: SqlType, b: SqlType) -> bool {
        use TypeFamily::*;
        a == b
            || a.family() == b.family()
            || matches!((a.family(), b.family()), (Temporal, Text) | (Text, Temporal))
    }

    pub fn name(self) -> &'static str {
        use SqlType::*;
        match self {
            TinyInt => "tinyint",
            SmallInt => "smallint",
            MediumInt => "mediumint",
            Int => "int",
            BigInt => "bigint",
            Float => "float",
            Double => "double",
            Decimal => "decimal",
            Char => "char",
            Varchar => "varchar",
            Text => "text",
            Enum => "enum",
            Set => "set",
            Date => "date",
            DateTime => "datetime",
            Timestamp => "timestamp",
            Time => "time",
            Year => "year",
            Bit => "bit",
            Blob => "blob",
            Json => "json",
            Integer => "INTEGER",
            Real => "REAL",
            Numeric => "NUMERIC",
            SqliteText => "TEXT",
            SqliteBlob => "BLOB",
            SqliteDate => "DATE",
        }
    }
}

impl FromStr for SqlType {
    type Err = SchemaError;

    /// Accepts declared column types such as `int`, `varchar(255)`,
    /// `int unsigned` or the SQLite storage classes `INTEGER`, `TEXT`.
    fn from_str(declared: &str) -> Result<Self, Self::Err> {
        use SqlType::*;
        let base = declared
            .split(['(', ' '])
            .next()
            .unwrap_or_default()
            .trim();

        let ty = match base {
            "INTEGER" => Integer,
            "REAL" => Real,
            "NUMERIC" => Numeric,
            "TEXT" => SqliteText,
            "BLOB" => SqliteBlob,
            "DATE" => SqliteDate,
            other => match other.to_ascii_lowercase().as_str() {
                "tinyint" | "bool" | "boolean" => TinyInt,
                "smallint" => SmallInt,
                "mediumint" => MediumInt,
                "int" | "integer" => Int,
                "bigint" => BigInt,
                "float" => Float,
                "double" | "real" => Double,
                "decimal" | "numeric" | "dec" => Decimal,
                "char" => Char,
                "varchar" => Varchar,
                "text" | "tinytext" | "mediumtext" | "longtext" => Text,
                "enum" => Enum,
                "set" => Set,
                "date" => Date,
                "datetime" => DateTime,
                "timestamp" => Timestamp,
                "time" => Time,
                "year" => Year,
                "bit" => Bit,
                "blob" | "tinyblob" | "mediumblob" | "longblob" | "binary" | "varbinary" => Blob,
                "json" => Json,
                _ => return Err(SchemaError::UnknownType(declared.to_string())),
            },
        };
        Ok(ty)
    }
}

impl TryFrom<String> for SqlType {
    type Error = SchemaError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<SqlType> for String {
    fn from(value: SqlType) -> Self {
        value.name().to_string()
    }
}

impl fmt::Display for SqlType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RANKED: [SqlType; 9] = [
        SqlType::TinyInt, SqlType::SmallInt, SqlType::MediumInt, SqlType::Int, SqlType::BigInt,
        SqlType::Float, SqlType::Double, SqlType::Decimal, SqlType::Varchar,
    ];

    #[test]
    fn most_general_is_commutative_and_idempotent_over_ranked_types() {
        for a in RANKED {
            assert_eq!(SqlType::most_general(a, a), a);
            for b in RANKED {
                assert_eq!(SqlType::most_general(a, b), SqlType::most_general(b, a), "{a} / {b}");
            }
        }
    }

    #[test]
    fn most_general_follows_promotion_order() {
        assert_eq!(SqlType::most_general(SqlType::Int, SqlType::Double), SqlType::Double);
        assert_eq!(SqlType::most_general(SqlType::Decimal, SqlType::Float), SqlType::Decimal);
        assert_eq!(SqlType::most_general(SqlType::BigInt, SqlType::Varchar), SqlType::Varchar);
        assert_eq!(SqlType::most_general(SqlType::Integer, SqlType::Real), SqlType::Real);
    }

    #[test]
    fn most_general_keeps_left_for_unranked_pairs() {
        assert_eq!(SqlType::most_general(SqlType::Date, SqlType::Int), SqlType::Date);
        assert_eq!(SqlType::most_general(SqlType::Json, SqlType::Blob), SqlType::Json);
    }

    #[test]
    fn parses_declared_types() {
        assert_eq!("int".parse::<SqlType>().unwrap(), SqlType::Int);
        assert_eq!("varchar(255)".parse::<SqlType>().unwrap(), SqlType::Varchar);
        assert_eq!("int unsigned".parse::<SqlType>().unwrap(), SqlType::Int);
        assert_eq!("INTEGER".parse::<SqlType>().unwrap(), SqlType::Integer);
        assert_eq!("TEXT".parse::<SqlType>().unwrap(), SqlType::SqliteText);
        assert_eq!("text".parse::<SqlType>().unwrap(), SqlType::Text);
        assert!("geometry".parse::<SqlType>().is_err());
    }

    #[test]
    fn families_decide_compatibility() {
        assert!(SqlType::compatible(SqlType::Int, SqlType::BigInt));
        assert!(SqlType::compatible(SqlType::Varchar, SqlType::Text));
        assert!(!SqlType::compatible(SqlType::Int, SqlType::Varchar));
        assert!(!SqlType::compatible(SqlType::Date, SqlType::Double));
        assert!(SqlType::compatible(SqlType::Date, SqlType::Varchar));
    }
}
