use super::support::write_sop;
use agent_sop::source::SourceSpec;
use agent_sop::Resolver;
use proptest::prelude::*;
use std::collections::BTreeMap;
use tempfile::TempDir;

type SourceContents = BTreeMap<String, String>;

fn arb_source() -> impl Strategy<Value = SourceContents> {
    prop::collection::btree_map("[a-e]{1,2}", "[A-Za-z ]{1,16}", 0..6)
}

fn materialize(temp: &TempDir, sources: &[SourceContents]) -> Vec<SourceSpec> {
    sources
        .iter()
        .enumerate()
        .map(|(i, docs)| {
            let dir = temp.path().join(format!("source-{}", i));
            std::fs::create_dir_all(&dir).unwrap();
            for (name, content) in docs {
                write_sop(&dir, name, content);
            }
            SourceSpec::local(dir)
        })
        .collect()
}

fn snapshot(resolver: &Resolver, specs: &[SourceSpec]) -> Vec<(String, String, SourceSpec)> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap();
    let resolution = runtime.block_on(resolver.resolve(specs));
    assert!(resolution.diagnostics.is_empty());
    resolution
        .registry
        .all()
        .iter()
        .map(|doc| (doc.name.clone(), doc.content.clone(), doc.provenance.clone()))
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// Same sources, same registry, and every name comes from the first source offering it.
    #[test]
    fn resolution_is_deterministic_and_first_wins(
        sources in prop::collection::vec(arb_source(), 1..4),
    ) {
        let temp = TempDir::new().unwrap();
        let specs = materialize(&temp, &sources);
        let resolver = Resolver::new();

        let first = snapshot(&resolver, &specs);
        let second = snapshot(&resolver, &specs);
        prop_assert_eq!(&first, &second);

        let mut expected: Vec<(String, String, SourceSpec)> = Vec::new();
        for (docs, spec) in sources.iter().zip(&specs) {
            for (name, content) in docs {
                if !expected.iter().any(|(n, _, _)| n == name) {
                    expected.push((name.clone(), content.clone(), spec.clone()));
                }
            }
        }
        prop_assert_eq!(first, expected);
    }
}
