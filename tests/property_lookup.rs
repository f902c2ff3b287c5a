/// Property-based tests for lookup and option semantics
///
/// These verify the container's invariants over generated inputs rather
/// than hand-picked scenarios.

use lodestone::{Class, Container, CreateArgs, Deps, EntryOptions, LifecycleFlag};
use proptest::prelude::*;
use std::collections::{HashMap, HashSet};

fn constructible(name: &str) -> Class {
    Class::builder(name)
        .construct(|_: &Deps, _: &CreateArgs| Ok(()))
        .build()
        .unwrap()
}

proptest! {
    // Singleton specifiers return the same reference however many times
    // they are looked up.
    #[test]
    fn singleton_lookup_is_stable(name in "[a-z]{1,12}", lookups in 2usize..6) {
        let container = Container::new();
        let specifier = format!("svc:{}", name);
        container.register_with(
            &specifier,
            constructible(&name),
            EntryOptions::new().singleton(true).instantiate(true),
        ).unwrap();

        let first = container.lookup(&specifier).unwrap();
        for _ in 1..lookups {
            let next = container.lookup(&specifier).unwrap();
            prop_assert!(first.ptr_eq(&next));
        }
    }

    // Non-singleton, instantiated specifiers are fresh on every lookup.
    #[test]
    fn non_singleton_lookup_is_fresh(name in "[a-z]{1,12}") {
        let container = Container::new();
        let specifier = format!("svc:{}", name);
        container.register_with(
            &specifier,
            constructible(&name),
            EntryOptions::new().singleton(false).instantiate(true),
        ).unwrap();

        let first = container.lookup(&specifier).unwrap();
        let second = container.lookup(&specifier).unwrap();
        prop_assert!(!first.ptr_eq(&second));
    }

    // Every registered name under a type is enumerated, exactly once.
    #[test]
    fn available_for_type_matches_registrations(
        names in prop::collection::hash_set("[a-z]{1,8}", 1..8)
    ) {
        let container = Container::new();
        for name in &names {
            container
                .register(&format!("widget:{}", name), constructible(name))
                .unwrap();
        }

        let available: HashSet<String> =
            container.available_for_type("widget").into_iter().collect();
        prop_assert_eq!(&available, &names);
        prop_assert_eq!(container.available_for_type("widget").len(), names.len());
    }

    // Loose lookup of anything unregistered is None, never an error.
    #[test]
    fn loose_lookup_never_errors_on_missing(name in "[a-z]{1,10}") {
        let container = Container::new();
        let result = container.lookup_loose(&format!("ghost:{}", name));
        prop_assert!(result.unwrap().is_none());
    }

    // get_option agrees with a reference model of the merge rules,
    // including the set_option seeding quirk, for any write sequence.
    #[test]
    fn option_merge_matches_reference_model(
        writes in prop::collection::vec(
            (any::<bool>(), any::<bool>(), any::<bool>()),
            0..12,
        )
    ) {
        let container = Container::new();
        let mut model: HashMap<&str, (Option<bool>, Option<bool>)> = HashMap::new();

        for (type_level, singleton_flag, value) in writes {
            let target = if type_level { "widget" } else { "widget:a" };
            let flag = if singleton_flag {
                LifecycleFlag::Singleton
            } else {
                LifecycleFlag::Instantiate
            };
            container.set_option(target, flag, value);

            let entry = model
                .entry(target)
                .or_insert((Some(false), Some(false)));
            if singleton_flag {
                entry.0 = Some(value);
            } else {
                entry.1 = Some(value);
            }
        }

        let pick = |entry: Option<&(Option<bool>, Option<bool>)>, singleton: bool| {
            entry.and_then(|(s, i)| if singleton { *s } else { *i })
        };
        let expect = |singleton: bool| {
            pick(model.get("widget:a"), singleton)
                .or_else(|| pick(model.get("widget"), singleton))
                .unwrap_or(singleton)
        };

        prop_assert_eq!(
            container.get_option("widget:a", LifecycleFlag::Singleton),
            expect(true)
        );
        prop_assert_eq!(
            container.get_option("widget:a", LifecycleFlag::Instantiate),
            expect(false)
        );
    }
}
