//! Property-based tests for the downgrade chain and the component diff.

use bom_tools::diff::component_version_diff;
use bom_tools::downgrade::{downgrade, unsupported_fields};
use bom_tools::model::{Bom, Component, ComponentType, Hash, HashAlgorithm, Scope, SpecVersion};
use proptest::prelude::*;
use std::collections::HashSet;

fn component() -> impl Strategy<Value = Component> {
    (
        prop::sample::select(ComponentType::ALL.to_vec()),
        "[a-d]",
        prop::option::of("[1-3]\\.0"),
        prop::option::of(prop::sample::select(vec![
            Scope::Required,
            Scope::Optional,
            Scope::Excluded,
        ])),
        prop::sample::subsequence(HashAlgorithm::ALL.to_vec(), 0..4),
    )
        .prop_map(|(component_type, name, version, scope, algs)| {
            let mut c = Component::new(component_type, name);
            c.version = version;
            c.scope = scope;
            c.hashes = algs.into_iter().map(|alg| Hash::new(alg, "00")).collect();
            c
        })
}

fn bom() -> impl Strategy<Value = Bom> {
    prop::collection::vec(component(), 0..8).prop_map(|components| {
        let mut bom = Bom::new();
        bom.components = components;
        bom
    })
}

fn version() -> impl Strategy<Value = SpecVersion> {
    prop::sample::select(SpecVersion::ALL.to_vec())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn downgraded_bom_fits_its_version(bom in bom(), target in version()) {
        let out = downgrade(bom, target);
        prop_assert_eq!(out.bom.spec_version, target);
        let leftovers = unsupported_fields(&out.bom, target);
        prop_assert!(leftovers.is_empty(), "{:?}", leftovers);
    }

    #[test]
    fn downgrade_steps_compose(bom in bom(), a in version(), b in version()) {
        let (high, low) = if a >= b { (a, b) } else { (b, a) };
        let direct = downgrade(bom.clone(), low);
        let first = downgrade(bom, high);
        let second = downgrade(first.bom, low);

        prop_assert_eq!(&second.bom, &direct.bom);
        let mut warnings = first.warnings;
        warnings.extend(second.warnings);
        prop_assert_eq!(warnings, direct.warnings);
    }

    #[test]
    fn canonical_downgrade_is_identity(bom in bom()) {
        let out = downgrade(bom.clone(), SpecVersion::CANONICAL);
        prop_assert_eq!(out.bom, bom);
        prop_assert!(out.warnings.is_empty());
    }

    #[test]
    fn diff_lists_every_triple_once(from in bom(), to in bom()) {
        let result = component_version_diff(&from, &to);
        let triples = |components: &[Component]| -> HashSet<(String, Option<String>)> {
            components
                .iter()
                .map(|c| (c.identity_key(), c.version.clone()))
                .collect()
        };
        let from_triples = triples(&from.components);
        let to_triples = triples(&to.components);

        let removed: Vec<_> = result.values().flat_map(|i| i.removed.clone()).collect();
        let added: Vec<_> = result.values().flat_map(|i| i.added.clone()).collect();
        let unchanged: Vec<_> = result.values().flat_map(|i| i.unchanged.clone()).collect();

        prop_assert_eq!(triples(&unchanged), &from_triples & &to_triples);
        prop_assert_eq!(triples(&removed), &from_triples - &to_triples);
        prop_assert_eq!(triples(&added), &to_triples - &from_triples);
        prop_assert_eq!(
            removed.len() + added.len() + unchanged.len(),
            from_triples.union(&to_triples).count()
        );

        for component in from.components.iter().chain(&to.components) {
            prop_assert!(result.contains_key(&component.identity_key()));
        }
    }

    #[test]
    fn diff_of_a_bom_with_itself_is_unchanged(bom in bom()) {
        let result = component_version_diff(&bom, &bom);
        prop_assert!(result.values().all(|item| !item.has_changes()));
    }
}
