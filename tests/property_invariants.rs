use std::collections::BTreeSet;

use proptest::prelude::*;

use calclog::{
    core::{
        adapter::{DocumentAdapter, RelationalAdapter},
        coordinator::PersistenceCoordinator,
    },
    persist::{
        RelationalStore,
        sqlite::{SqliteDocumentStore, SqliteRelationalStore},
    },
    record::OperationRecord,
    types::{Flavor, Operand},
};

#[derive(Debug, Clone)]
struct Save {
    flavor: Flavor,
    op_idx: u8,
    result: Operand,
    arguments: Vec<Operand>,
}

const OPS: [&str; 7] = ["plus", "minus", "times", "divide", "pow", "abs", "fact"];

fn save_strategy() -> impl Strategy<Value = Save> {
    (
        prop_oneof![Just(Flavor::Independent), Just(Flavor::Stack)],
        0u8..7,
        any::<i64>(),
        prop::collection::vec(any::<i64>(), 0..4),
    )
        .prop_map(|(flavor, op_idx, result, arguments)| Save {
            flavor,
            op_idx,
            result,
            arguments,
        })
}

fn coordinator() -> PersistenceCoordinator {
    PersistenceCoordinator::new(
        RelationalAdapter::new(SqliteRelationalStore::open_in_memory().expect("rel")),
        DocumentAdapter::new(SqliteDocumentStore::open_in_memory().expect("doc")),
    )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn sequential_saves_get_ids_in_call_order_and_both_stores_agree(saves in prop::collection::vec(save_strategy(), 1..40)) {
        let coord = coordinator();
        for s in &saves {
            coord.save(s.flavor, OPS[usize::from(s.op_idx)], s.result, &s.arguments);
        }

        let rows = coord.fetch("POSTGRES");
        let expected: Vec<OperationRecord> = saves
            .iter()
            .enumerate()
            .map(|(i, s)| OperationRecord {
                id: i as i64 + 1,
                flavor: s.flavor,
                operation: OPS[usize::from(s.op_idx)].to_string(),
                result: s.result,
                arguments: s.arguments.clone(),
            })
            .collect();
        prop_assert_eq!(&rows, &expected);
        prop_assert_eq!(coord.fetch("MONGO"), expected);
    }

    #[test]
    fn next_id_is_one_past_the_largest_existing(ids in prop::collection::btree_set(1i64..10_000, 0..30)) {
        let store = SqliteRelationalStore::open_in_memory().expect("rel");
        for id in &ids {
            store
                .insert(&OperationRecord {
                    id: *id,
                    flavor: Flavor::Independent,
                    operation: "plus".to_string(),
                    result: 0,
                    arguments: vec![],
                })
                .expect("insert");
        }

        let adapter = RelationalAdapter::new(store);
        let expected = ids.iter().max().map_or(1, |max| max + 1);
        prop_assert_eq!(adapter.next_id().into_inner(), Some(expected));
    }

    #[test]
    fn flavor_filter_partitions_history(flavors in prop::collection::vec(prop_oneof![Just(Flavor::Independent), Just(Flavor::Stack)], 0..20)) {
        let coord = coordinator();
        for (i, flavor) in flavors.iter().enumerate() {
            coord.save(*flavor, "abs", i as i64, &[-(i as i64)]);
        }

        let all = coord.fetch("POSTGRES");
        let stack = calclog::core::coordinator::filter_by_flavor(all.clone(), Some("STACK"));
        let independent = calclog::core::coordinator::filter_by_flavor(all.clone(), Some("INDEPENDENT"));
        prop_assert_eq!(stack.len() + independent.len(), all.len());

        let stack_ids: BTreeSet<_> = stack.iter().map(|r| r.id).collect();
        prop_assert!(independent.iter().all(|r| !stack_ids.contains(&r.id)));
        prop_assert!(stack.iter().all(|r| r.flavor == Flavor::Stack));
    }
}
