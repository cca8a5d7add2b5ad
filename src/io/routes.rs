use std::io::Read;

use crate::io::{Format, error::Error};
use crate::model::RouteSet;
use crate::provenance::encode_json;

pub fn read<R: Read>(reader: R) -> Result<RouteSet, Error> {
    let set: RouteSet =
        serde_json::from_reader(reader).map_err(|e| Error::json(Format::Routes, e))?;
    // re-insert so every target's routes are in rank order
    Ok(set.into_inner().into_iter().collect())
}

/// Canonical byte encoding of a route set: sorted keys, rank order, pretty
/// JSON with a trailing newline.
pub fn to_bytes(set: &RouteSet) -> Result<Vec<u8>, Error> {
    encode_json(set).map_err(|e| Error::json(Format::Routes, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chem::CanonicalForm;
    use crate::model::{Molecule, ReactionStep, Route};

    fn form(s: &str) -> CanonicalForm {
        CanonicalForm {
            canonical_id: s.into(),
            smiles: s.into(),
        }
    }

    fn sample_set() -> RouteSet {
        let tree = Molecule::synthesized(
            form("CCO"),
            ReactionStep::new(vec![Molecule::leaf(form("CC")), Molecule::leaf(form("O"))]),
        );
        let mut set = RouteSet::new();
        set.insert("t2", vec![Route::new(Molecule::leaf(form("CCN")), 1)]);
        set.insert("t1", vec![Route::new(tree.clone(), 3), Route::new(tree, 1)]);
        set
    }

    #[test]
    fn reencoding_a_parsed_artifact_reproduces_its_bytes() {
        let bytes = to_bytes(&sample_set()).unwrap();
        let parsed = read(&bytes[..]).unwrap();
        assert_eq!(parsed, sample_set());
        assert_eq!(to_bytes(&parsed).unwrap(), bytes);
    }

    #[test]
    fn targets_are_written_in_id_order() {
        let text = String::from_utf8(to_bytes(&sample_set()).unwrap()).unwrap();
        assert!(text.find("\"t1\"").unwrap() < text.find("\"t2\"").unwrap());
        assert!(text.ends_with("}\n"));
    }

    #[test]
    fn read_restores_rank_order() {
        let json = br#"{"t1": [
            {"target": {"canonical_id": "A", "display_form": "A"}, "rank": 2},
            {"target": {"canonical_id": "B", "display_form": "B"}, "rank": 1}
        ]}"#;
        let set = read(&json[..]).unwrap();
        let ranks: Vec<_> = set.get("t1").unwrap().iter().map(|r| r.rank).collect();
        assert_eq!(ranks, vec![1, 2]);
    }
}
