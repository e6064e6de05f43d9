// Module name shadows the `serde` crate — use `::serde` for the external crate.
use ::serde::{Deserialize, Deserializer, Serializer};
use chrono::{DateTime, SecondsFormat, Utc};

/// Serialize `DateTime<Utc>` as RFC 3339 with 3-digit fractional seconds.
pub fn to_rfc3339_ms<S>(dt: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    s.serialize_str(&dt.to_rfc3339_opts(SecondsFormat::Millis, true))
}

/// Serialize `Option<DateTime<Utc>>` the same way, with `None` as null.
pub fn to_rfc3339_ms_opt<S>(dt: &Option<DateTime<Utc>>, s: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match dt {
        Some(dt) => to_rfc3339_ms(dt, s),
        None => s.serialize_none(),
    }
}

/// Deserialize a field that must distinguish "absent" from "explicit null".
///
/// Pair with `#[serde(default)]`: an absent field stays `None`, an explicit
/// `null` becomes `Some(None)`, a value becomes `Some(Some(v))`.
pub fn double_option<'de, T, D>(de: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(de).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn should_format_datetime_as_rfc3339_with_millis() {
        let dt = Utc.with_ymd_and_hms(2025, 6, 14, 18, 30, 0).unwrap();
        let result = dt.to_rfc3339_opts(SecondsFormat::Millis, true);
        assert_eq!(result, "2025-06-14T18:30:00.000Z");
    }

    #[test]
    fn should_serialize_optional_datetime() {
        #[derive(::serde::Serialize)]
        struct Wrapper {
            #[serde(serialize_with = "to_rfc3339_ms_opt")]
            at: Option<DateTime<Utc>>,
        }

        let some = Wrapper {
            at: Some(Utc.with_ymd_and_hms(2025, 6, 14, 18, 30, 0).unwrap()),
        };
        assert_eq!(
            serde_json::to_string(&some).unwrap(),
            r#"{"at":"2025-06-14T18:30:00.000Z"}"#
        );

        let none = Wrapper { at: None };
        assert_eq!(serde_json::to_string(&none).unwrap(), r#"{"at":null}"#);
    }

    #[test]
    fn should_distinguish_absent_null_and_value() {
        #[derive(Debug, ::serde::Deserialize)]
        struct Wrapper {
            #[serde(default, deserialize_with = "double_option")]
            field: Option<Option<String>>,
        }

        let absent: Wrapper = serde_json::from_str("{}").unwrap();
        assert_eq!(absent.field, None);

        let null: Wrapper = serde_json::from_str(r#"{"field":null}"#).unwrap();
        assert_eq!(null.field, Some(None));

        let value: Wrapper = serde_json::from_str(r#"{"field":"x"}"#).unwrap();
        assert_eq!(value.field, Some(Some("x".to_owned())));
    }
}
