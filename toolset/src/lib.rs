use serde::{Deserialize, Deserializer};

/// Yahoo wraps numbers as `{"raw": 1.5, "fmt": "1.50"}`, and sometimes as `{}`.
#[derive(Deserialize)]
struct RawEnvelope<T> {
    raw: Option<T>,
}

pub fn deser_raw_value<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    let envelope = Option::<RawEnvelope<T>>::deserialize(deserializer)?;
    Ok(envelope.and_then(|e| e.raw))
}

pub fn deser_null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    let value = Option::<T>::deserialize(deserializer)?;
    Ok(value.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    use super::*;

    #[derive(Deserialize)]
    struct Price {
        #[serde(default, deserialize_with = "deser_raw_value")]
        price: Option<f64>,
        #[serde(default, deserialize_with = "deser_raw_value")]
        volume: Option<i64>,
    }

    #[derive(Deserialize)]
    struct Meta {
        #[serde(default, deserialize_with = "deser_null_as_default")]
        volume: i64,
    }

    #[test]
    fn raw_envelope() {
        let p: Price =
            serde_json::from_str(r#"{"price": {"raw": 1000.5, "fmt": "1,000.50"}, "volume": {"raw": 42}}"#)
                .unwrap();
        assert_eq!(p.price, Some(1000.5));
        assert_eq!(p.volume, Some(42));
    }

    #[test]
    fn empty_or_missing_envelope() {
        let p: Price = serde_json::from_str(r#"{"price": {}}"#).unwrap();
        assert_eq!(p.price, None);
        assert_eq!(p.volume, None);

        let p: Price = serde_json::from_str(r#"{"price": null, "volume": {"raw": null}}"#).unwrap();
        assert_eq!(p.price, None);
        assert_eq!(p.volume, None);
    }

    #[test]
    fn null_number() {
        let m: Meta = serde_json::from_str(r#"{"volume": null}"#).unwrap();
        assert_eq!(m.volume, 0);
        let m: Meta = serde_json::from_str(r#"{}"#).unwrap();
        assert_eq!(m.volume, 0);
        let m: Meta = serde_json::from_str(r#"{"volume": 7}"#).unwrap();
        assert_eq!(m.volume, 7);
    }
}
