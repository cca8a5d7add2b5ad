use std::collections::HashSet;
use std::io::{BufRead, Read};

use crate::adapt::TargetInput;
use crate::io::{Format, error::Error};

/// Reads benchmark targets.
///
/// Accepts a JSON list of `{"id", "smiles"}` objects, a JSON object mapping
/// ids to structures, or CSV with an `id,smiles` header. Target ids must be
/// unique. CSV fields are split on every comma; quoted fields are rejected.
pub fn read<R: BufRead>(mut reader: R) -> Result<Vec<TargetInput>, Error> {
    let mut text = String::new();
    reader.read_to_string(&mut text)?;

    let targets = match text.trim_start().chars().next() {
        Some('[') => serde_json::from_str::<Vec<TargetInput>>(&text)
            .map_err(|e| Error::json(Format::Targets, e))?,
        Some('{') => serde_json::from_str::<std::collections::BTreeMap<String, String>>(&text)
            .map_err(|e| Error::json(Format::Targets, e))?
            .into_iter()
            .map(|(id, smiles)| TargetInput::new(id, smiles))
            .collect(),
        _ => read_csv(&text)?,
    };

    let mut seen = HashSet::with_capacity(targets.len());
    for target in &targets {
        if !seen.insert(target.id.as_str()) {
            return Err(Error::DuplicateTarget(target.id.clone()));
        }
    }
    Ok(targets)
}

fn read_csv(text: &str) -> Result<Vec<TargetInput>, Error> {
    let mut lines = text
        .lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty() && !line.starts_with('#'));

    let Some((header_no, header)) = lines.next() else {
        return Ok(Vec::new());
    };
    let columns: Vec<String> = header.split(',').map(|c| c.trim().to_lowercase()).collect();
    let column = |name: &str| {
        columns
            .iter()
            .position(|c| c == name)
            .ok_or_else(|| Error::parse(Format::Targets, header_no, format!("missing '{name}' column")))
    };
    let id_col = column("id")?;
    let smiles_col = column("smiles")?;

    let mut targets = Vec::new();
    for (line_no, line) in lines {
        if line.contains('"') {
            return Err(Error::parse(
                Format::Targets,
                line_no,
                "quoted CSV fields are not supported",
            ));
        }
        let fields: Vec<&str> = line.split(',').map(str::trim).collect();
        let (Some(id), Some(smiles)) = (fields.get(id_col), fields.get(smiles_col)) else {
            return Err(Error::parse(Format::Targets, line_no, "row has too few columns"));
        };
        if id.is_empty() || smiles.is_empty() {
            return Err(Error::parse(Format::Targets, line_no, "empty id or smiles"));
        }
        targets.push(TargetInput::new(*id, *smiles));
    }
    Ok(targets)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_json_list() {
        let json = br#"[{"id": "t1", "smiles": "CCO"}, {"id": "t2", "smiles": "CCN"}]"#;
        let targets = read(&json[..]).unwrap();
        assert_eq!(targets, vec![TargetInput::new("t1", "CCO"), TargetInput::new("t2", "CCN")]);
    }

    #[test]
    fn reads_json_map() {
        let targets = read(&br#"{"t2": "CCN", "t1": "CCO"}"#[..]).unwrap();
        assert_eq!(targets[0], TargetInput::new("t1", "CCO"));
        assert_eq!(targets.len(), 2);
    }

    #[test]
    fn reads_csv_with_any_column_order() {
        let csv = "# benchmark\nsmiles,id\nCCO,t1\n\nCCN, t2\n";
        let targets = read(csv.as_bytes()).unwrap();
        assert_eq!(targets, vec![TargetInput::new("t1", "CCO"), TargetInput::new("t2", "CCN")]);
    }

    #[test]
    fn csv_errors_carry_line_numbers() {
        let err = read("id,smiles\nt1,CCO\nt2\n".as_bytes()).unwrap_err();
        assert!(matches!(err, Error::Parse { line: 3, .. }));

        let err = read("name,smiles\nt1,CCO\n".as_bytes()).unwrap_err();
        assert!(matches!(err, Error::Parse { line: 1, .. }));
    }

    #[test]
    fn quoted_csv_fields_are_rejected() {
        let err = read("id,smiles\n\"t1,a\",CCO\n".as_bytes()).unwrap_err();
        assert!(matches!(err, Error::Parse { line: 2, .. }));
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let err = read("id,smiles\nt1,CCO\nt1,CCN\n".as_bytes()).unwrap_err();
        assert!(matches!(err, Error::DuplicateTarget(ref id) if id == "t1"));
    }

    #[test]
    fn empty_input_has_no_targets() {
        assert!(read("".as_bytes()).unwrap().is_empty());
    }
}
