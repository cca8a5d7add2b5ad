use crate::model::Molecule;

/// Order-invariant structural signature of the tree rooted at `molecule`.
///
/// A leaf's signature is its `canonical_id`; a synthesized molecule's is
/// `canonical_id(s1,s2,...)` with the reactant signatures sorted, so two
/// trees that differ only in reactant listing order share a signature.
pub fn signature(molecule: &Molecule) -> String {
    let Some(step) = &molecule.synthesis_step else {
        return molecule.canonical_id.clone();
    };
    let mut children: Vec<String> = step.reactants.iter().map(signature).collect();
    children.sort_unstable();

    let mut out = String::with_capacity(
        molecule.canonical_id.len() + 2 + children.iter().map(|c| c.len() + 1).sum::<usize>(),
    );
    out.push_str(&molecule.canonical_id);
    out.push('(');
    out.push_str(&children.join(","));
    out.push(')');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chem::CanonicalForm;
    use crate::model::ReactionStep;

    fn leaf(s: &str) -> Molecule {
        Molecule::leaf(CanonicalForm {
            canonical_id: s.to_string(),
            smiles: s.to_string(),
        })
    }

    fn made(s: &str, reactants: Vec<Molecule>) -> Molecule {
        Molecule::synthesized(
            CanonicalForm {
                canonical_id: s.to_string(),
                smiles: s.to_string(),
            },
            ReactionStep::new(reactants),
        )
    }

    #[test]
    fn leaf_signature_is_its_identity() {
        assert_eq!(signature(&leaf("CCO")), "CCO");
    }

    #[test]
    fn reactants_are_sorted() {
        assert_eq!(signature(&made("CCO", vec![leaf("O"), leaf("CC")])), "CCO(CC,O)");
        assert_eq!(signature(&made("CCO", vec![leaf("CC"), leaf("O")])), "CCO(CC,O)");
    }

    #[test]
    fn nested_permutations_share_a_signature() {
        let a = made("P", vec![made("X", vec![leaf("B"), leaf("A")]), leaf("C")]);
        let b = made("P", vec![leaf("C"), made("X", vec![leaf("A"), leaf("B")])]);
        assert_eq!(signature(&a), signature(&b));
        assert_eq!(signature(&a), "P(C,X(A,B))");
    }

    #[test]
    fn duplicate_reactants_are_kept_as_a_multiset() {
        assert_eq!(signature(&made("CCOCC", vec![leaf("CCO"), leaf("CCO")])), "CCOCC(CCO,CCO)");
        assert_ne!(
            signature(&made("CCOCC", vec![leaf("CCO"), leaf("CCO")])),
            signature(&made("CCOCC", vec![leaf("CCO")]))
        );
    }

    #[test]
    fn different_depth_differs() {
        let shallow = made("P", vec![leaf("X")]);
        let deep = made("P", vec![made("X", vec![leaf("Y")])]);
        assert_ne!(signature(&shallow), signature(&deep));
    }
}
