use std::collections::BTreeMap;
use std::io::Read;

use crate::io::{Format, error::Error};

/// Raw model output keyed by target id. Values are left uninterpreted; the
/// adapter validates them per target.
pub type RawPredictions = BTreeMap<String, serde_json::Value>;

pub fn read<R: Read>(reader: R) -> Result<RawPredictions, Error> {
    serde_json::from_reader(reader).map_err(|e| Error::json(Format::RawPredictions, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn values_are_kept_verbatim() {
        let raw = read(&br#"{"t1": [{"type": "mol"}], "t2": {"succ": false}}"#[..]).unwrap();
        assert_eq!(raw.len(), 2);
        assert!(raw["t1"].is_array());
        assert!(raw["t2"].is_object());
    }

    #[test]
    fn top_level_must_be_an_object() {
        let err = read(&b"[1, 2]"[..]).unwrap_err();
        assert!(matches!(err, Error::Json { format: Format::RawPredictions, .. }));
    }
}
