//! Serde helpers that write timestamps as RFC 3339 strings.
//!
//! Use with `#[serde(with = "crate::timestamp::rfc3339")]`, or
//! `rfc3339_option` for optional fields. Only serialization is provided.

/// Serialize an [time::OffsetDateTime] as an RFC 3339 string.
pub mod rfc3339 {
    use serde::Serializer;
    use time::{OffsetDateTime, format_description::well_known::Rfc3339};

    pub fn serialize<S>(date_time: &OffsetDateTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let formatted = date_time
            .format(&Rfc3339)
            .map_err(serde::ser::Error::custom)?;
        serializer.serialize_str(&formatted)
    }
}

/// Serialize an optional [time::OffsetDateTime] as an RFC 3339 string or null.
pub mod rfc3339_option {
    use serde::Serializer;
    use time::OffsetDateTime;

    pub fn serialize<S>(
        date_time: &Option<OffsetDateTime>,
        serializer: S,
    ) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match date_time {
            Some(date_time) => super::rfc3339::serialize(date_time, serializer),
            None => serializer.serialize_none(),
        }
    }
}
