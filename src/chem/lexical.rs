use super::{Chemistry, ChemistryError};

const SMILES_PUNCTUATION: &str = "()[]=#$:/\\@+-%.*~";

/// Text-level canonicalization with no chemical perception.
///
/// Validates the SMILES alphabet and bracket nesting, then orders the
/// dot-separated fragments. The canonical string doubles as the structural
/// key, so two inputs are identical iff they normalize to the same text.
#[derive(Debug, Clone, Copy, Default)]
pub struct LexicalChemistry;

impl LexicalChemistry {
    pub fn new() -> Self {
        Self
    }
}

impl Chemistry for LexicalChemistry {
    fn canonical_smiles(&self, raw: &str) -> Result<String, ChemistryError> {
        let smiles = raw.trim();
        if smiles.is_empty() {
            return Err(ChemistryError::Empty);
        }

        if let Some(ch) = smiles
            .chars()
            .find(|c| !c.is_ascii_alphanumeric() && !SMILES_PUNCTUATION.contains(*c))
        {
            return Err(ChemistryError::InvalidCharacter {
                smiles: smiles.to_string(),
                ch,
            });
        }

        check_brackets(smiles)?;

        let mut fragments: Vec<&str> = smiles.split('.').collect();
        if fragments.iter().any(|f| f.is_empty()) {
            return Err(ChemistryError::EmptyFragment {
                smiles: smiles.to_string(),
            });
        }
        fragments.sort_unstable();
        Ok(fragments.join("."))
    }

    fn structural_key(&self, canonical: &str) -> Result<String, ChemistryError> {
        if canonical.is_empty() {
            return Err(ChemistryError::Empty);
        }
        Ok(canonical.to_string())
    }
}

fn check_brackets(smiles: &str) -> Result<(), ChemistryError> {
    let unbalanced = || ChemistryError::UnbalancedBrackets {
        smiles: smiles.to_string(),
    };

    let mut depth = 0usize;
    let mut in_atom = false;
    for c in smiles.chars() {
        match c {
            '[' if in_atom => return Err(unbalanced()),
            '[' => in_atom = true,
            ']' if !in_atom => return Err(unbalanced()),
            ']' => in_atom = false,
            '(' | ')' if in_atom => return Err(unbalanced()),
            '(' => depth += 1,
            ')' => depth = depth.checked_sub(1).ok_or_else(unbalanced)?,
            _ => {}
        }
    }

    if depth != 0 || in_atom {
        return Err(unbalanced());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_and_orders_fragments() {
        let chem = LexicalChemistry::new();
        assert_eq!(chem.canonical_smiles("  O.CC ").unwrap(), "CC.O");
        assert_eq!(chem.canonical_smiles("CC.O").unwrap(), "CC.O");
    }

    #[test]
    fn canonicalize_uses_text_as_identity() {
        let form = LexicalChemistry.canonicalize("CCO").unwrap();
        assert_eq!(form.canonical_id, "CCO");
        assert_eq!(form.smiles, "CCO");
    }

    #[test]
    fn accepts_bracket_atoms_and_branches() {
        let chem = LexicalChemistry;
        assert!(chem.canonical_smiles("CC(=O)Oc1ccccc1C(=O)O").is_ok());
        assert!(chem.canonical_smiles("[NH4+].[Cl-]").is_ok());
        assert!(chem.canonical_smiles("C[C@H](N)C(=O)O").is_ok());
    }

    #[test]
    fn rejects_empty_input() {
        assert_eq!(LexicalChemistry.canonical_smiles("   "), Err(ChemistryError::Empty));
    }

    #[test]
    fn rejects_foreign_characters() {
        let err = LexicalChemistry.canonical_smiles("CC O").unwrap_err();
        assert!(matches!(err, ChemistryError::InvalidCharacter { ch: ' ', .. }));
        let err = LexicalChemistry.canonical_smiles("C,C").unwrap_err();
        assert!(matches!(err, ChemistryError::InvalidCharacter { ch: ',', .. }));
    }

    #[test]
    fn rejects_unbalanced_brackets() {
        for bad in ["CC(C", "CC)C(", "[NH4+", "C]", "[N(H)]", "[[N]]"] {
            assert!(
                matches!(
                    LexicalChemistry.canonical_smiles(bad),
                    Err(ChemistryError::UnbalancedBrackets { .. })
                ),
                "{bad} should be rejected"
            );
        }
    }

    #[test]
    fn rejects_empty_fragments() {
        assert!(matches!(
            LexicalChemistry.canonical_smiles("C..O"),
            Err(ChemistryError::EmptyFragment { .. })
        ));
    }
}
