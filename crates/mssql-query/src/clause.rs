// SPDX-License-Identifier: Apache-2.0

//! Clause Builder
//!
//! Pure functions turning filter maps, order specs, column lists and row
//! caps into T-SQL fragments. Identifiers pass through untouched; values
//! are rendered as escaped literals.

use mssql_core::{FilterMap, OrderSpec, Value};

/// Longest numeric constant SQL Server accepts in fixed-point form.
const MAX_NUMERIC_DIGITS: usize = 38;

/// Format a Value as a T-SQL literal for inline predicates.
pub fn format_literal(value: &Value) -> String {
    match value {
        Value::Null => "NULL".to_string(),
        Value::Bool(b) => if *b { "1" } else { "0" }.to_string(),
        Value::Int(i) => i.to_string(),
        Value::Float(f) => format_float(*f),
        Value::Decimal(d) => d.to_string(),
        Value::Text(s) => quote_string(s),
        Value::Date(d) => quote_string(&d.format("%Y-%m-%d").to_string()),
        Value::Time(t) => quote_string(&t.format("%H:%M:%S%.f").to_string()),
        // ISO 8601 with the `T` separator is read the same under every DATEFORMAT.
        Value::Timestamp(ts) => quote_string(&ts.format("%Y-%m-%dT%H:%M:%S%.f").to_string()),
        Value::TimestampTz(ts) => quote_string(&ts.to_rfc3339()),
        Value::Bytes(b) => {
            let hex: String = b.iter().map(|byte| format!("{:02X}", byte)).collect();
            format!("0x{}", hex)
        }
    }
}

/// Single-quoted with `''` escaping; non-ASCII text gets the `N` prefix so
/// it is read as nvarchar instead of going through the database code page.
pub(crate) fn quote_string(s: &str) -> String {
    let escaped = s.replace('\'', "''");
    if s.is_ascii() {
        format!("'{}'", escaped)
    } else {
        format!("N'{}'", escaped)
    }
}

/// Exponent notation once the fixed-point form exceeds the numeric
/// constant limit; T-SQL reads `1e300` as float.
fn format_float(f: f64) -> String {
    let fixed = f.to_string();
    let digits = fixed.chars().filter(char::is_ascii_digit).count();
    if digits > MAX_NUMERIC_DIGITS {
        format!("{:e}", f)
    } else {
        fixed
    }
}

/// `WHERE a = 1 AND b IS NULL`, or `""` when there is nothing to filter on.
pub fn build_where_clause(filters: Option<&FilterMap>) -> String {
    let Some(filters) = filters.filter(|f| !f.is_empty()) else {
        return String::new();
    };

    let predicates: Vec<String> = filters
        .iter()
        .map(|(column, value)| {
            if value.is_null() {
                format!("{} IS NULL", column)
            } else {
                format!("{} = {}", column, format_literal(value))
            }
        })
        .collect();

    format!("WHERE {}", predicates.join(" AND "))
}

/// `ORDER BY a ASC, b DESC`, skipping entries with a blank sort field.
pub fn build_order_by_clause(order_by: Option<&[OrderSpec]>) -> String {
    let fragments: Vec<String> = order_by
        .unwrap_or_default()
        .iter()
        .filter_map(|spec| {
            spec.field()
                .map(|field| format!("{} {}", field, spec.direction().as_sql()))
        })
        .collect();

    if fragments.is_empty() {
        String::new()
    } else {
        format!("ORDER BY {}", fragments.join(", "))
    }
}

/// `*` for an absent or empty list, otherwise the names in the given order.
pub fn build_column_list(column_names: Option<&[String]>) -> String {
    match column_names {
        Some(names) if !names.is_empty() => names.join(", "),
        _ => "*".to_string(),
    }
}

/// `TOP n` for a positive cap, `""` otherwise.
pub fn build_top_clause(top: Option<i64>) -> String {
    match top {
        Some(n) if n > 0 => format!("TOP {}", n),
        _ => String::new(),
    }
}

/// Joins the non-empty fragments with single spaces.
pub(crate) fn join_fragments(fragments: &[&str]) -> String {
    fragments
        .iter()
        .copied()
        .filter(|f| !f.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use proptest::prelude::*;

    fn filters(entries: &[(&str, Value)]) -> FilterMap {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_format_literal() {
        assert_eq!(format_literal(&Value::Null), "NULL");
        assert_eq!(format_literal(&Value::Bool(true)), "1");
        assert_eq!(format_literal(&Value::Bool(false)), "0");
        assert_eq!(format_literal(&Value::Int(42)), "42");
        assert_eq!(format_literal(&Value::Float(3.5)), "3.5");
        assert_eq!(format_literal(&Value::from("hello")), "'hello'");
        assert_eq!(format_literal(&Value::from("it's")), "'it''s'");
        assert_eq!(format_literal(&Value::from("पुणे")), "N'पुणे'");
        assert_eq!(format_literal(&Value::from("Zoë's")), "N'Zoë''s'");
        assert_eq!(format_literal(&Value::Bytes(vec![0xDE, 0xAD])), "0xDEAD");
        assert_eq!(
            format_literal(&Value::Date(NaiveDate::from_ymd_opt(2024, 1, 31).unwrap())),
            "'2024-01-31'"
        );
    }

    #[test]
    fn extreme_floats_use_exponent_notation() {
        assert_eq!(format_literal(&Value::Float(1e300)), "1e300");
        assert_eq!(format_literal(&Value::Float(-1e300)), "-1e300");
        assert_eq!(format_literal(&Value::Float(1e-300)), "1e-300");
        assert_eq!(format_literal(&Value::Float(1234.5)), "1234.5");
        assert_eq!(format_literal(&Value::Float(0.001)), "0.001");
    }

    #[test]
    fn where_clause_prefixes_unicode_text() {
        let f = filters(&[("City", Value::from("पुणे")), ("Code", Value::from("PN"))]);
        assert_eq!(build_where_clause(Some(&f)), "WHERE City = N'पुणे' AND Code = 'PN'");
    }

    #[test]
    fn where_clause_empty_for_missing_or_empty_filters() {
        assert_eq!(build_where_clause(None), "");
        assert_eq!(build_where_clause(Some(&FilterMap::new())), "");
    }

    #[test]
    fn where_clause_joins_predicates_in_order() {
        let f = filters(&[
            ("City", Value::from("Pune")),
            ("Age", Value::Int(30)),
            ("Active", Value::Bool(true)),
            ("Manager", Value::Null),
        ]);
        assert_eq!(
            build_where_clause(Some(&f)),
            "WHERE City = 'Pune' AND Age = 30 AND Active = 1 AND Manager IS NULL"
        );
    }

    #[test]
    fn order_by_skips_blank_fields() {
        let specs = vec![
            OrderSpec::new("  ", Some("desc")),
            OrderSpec::default(),
            OrderSpec::new("Name", None),
            OrderSpec::new("Age", Some("Descending")),
        ];
        assert_eq!(
            build_order_by_clause(Some(specs.as_slice())),
            "ORDER BY Name ASC, Age DESC"
        );
    }

    #[test]
    fn order_by_empty_when_every_field_is_blank() {
        let specs = vec![OrderSpec::new("", Some("d")), OrderSpec::default()];
        assert_eq!(build_order_by_clause(Some(specs.as_slice())), "");
        assert_eq!(build_order_by_clause(None), "");
        assert_eq!(build_order_by_clause(Some(&[][..])), "");
    }

    #[test]
    fn unrecognised_direction_is_ascending() {
        let specs = vec![OrderSpec::new("Name", Some("downwards"))];
        assert_eq!(build_order_by_clause(Some(specs.as_slice())), "ORDER BY Name ASC");
    }

    #[test]
    fn column_list_defaults_to_star() {
        assert_eq!(build_column_list(None), "*");
        assert_eq!(build_column_list(Some(&[][..])), "*");
        let cols = vec!["Name".to_string(), "City".to_string()];
        assert_eq!(build_column_list(Some(cols.as_slice())), "Name, City");
    }

    #[test]
    fn top_clause() {
        assert_eq!(build_top_clause(None), "");
        assert_eq!(build_top_clause(Some(0)), "");
        assert_eq!(build_top_clause(Some(-3)), "");
        assert_eq!(build_top_clause(Some(5)), "TOP 5");
    }

    fn scalar() -> impl Strategy<Value = Value> {
        prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::Bool),
            any::<i64>().prop_map(Value::Int),
            "[a-zA-Z' ]{0,12}".prop_map(Value::Text),
        ]
    }

    proptest! {
        #[test]
        fn where_clause_has_one_predicate_per_entry(
            entries in proptest::collection::vec(("[A-Z][a-z]{0,8}", scalar()), 1..6)
        ) {
            let map: FilterMap = entries.into_iter().collect();
            let clause = build_where_clause(Some(&map));
            prop_assert!(clause.starts_with("WHERE "));

            let body = &clause["WHERE ".len()..];
            let expected: Vec<String> = map
                .iter()
                .map(|(c, v)| if v.is_null() {
                    format!("{c} IS NULL")
                } else {
                    format!("{c} = {}", format_literal(v))
                })
                .collect();
            prop_assert_eq!(body, expected.join(" AND "));
        }

        #[test]
        fn non_positive_top_is_empty(top in i64::MIN..=0) {
            prop_assert_eq!(build_top_clause(Some(top)), "");
        }

        #[test]
        fn descending_aliases_in_any_case(
            alias in prop_oneof![Just("d"), Just("desc"), Just("descending")],
            upper in proptest::collection::vec(any::<bool>(), 10)
        ) {
            let mixed: String = alias
                .chars()
                .zip(upper.iter())
                .map(|(c, up)| if *up { c.to_ascii_uppercase() } else { c })
                .collect();
            let specs = vec![OrderSpec::new("Col", Some(mixed.as_str()))];
            prop_assert!(build_order_by_clause(Some(specs.as_slice())).ends_with("DESC"));
        }
    }
}
