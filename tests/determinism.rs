//! ---
//! thalos_section: "15-testing-qa-runbook"
//! thalos_subsection: "integration-tests"
//! thalos_type: "source"
//! thalos_scope: "code"
//! thalos_description: "Determinism properties of the store and template engine."
//! thalos_version: "v1.0.0"
//! thalos_owner: "core"
//! ---
use thalos_core::{Context, ErrorKind, KeyValueStore, TemplateEngine};

const TEMPLATES: &[(&str, &str)] = &[
    ("greet", "Hello {name}!"),
    ("report", "{title}: {count} items ({status}) {{raw}}"),
    ("repeat", "{a}{a}{b}{a}"),
];

fn contexts() -> Vec<Context> {
    let pairs: &[&[(&str, &str)]] = &[
        &[("name", "Ada"), ("title", "Inventory"), ("count", "3"), ("status", "ok"), ("a", "x"), ("b", "y")],
        &[("name", ""), ("title", "{name}"), ("count", "0"), ("status", "ünïcode"), ("a", "}"), ("b", "{")],
    ];
    pairs
        .iter()
        .map(|entries| {
            entries
                .iter()
                .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
                .collect()
        })
        .collect()
}

fn engine() -> TemplateEngine {
    let mut engine = TemplateEngine::new();
    for (name, body) in TEMPLATES {
        engine.register_template(name, body).unwrap();
    }
    engine
}

#[test]
fn independent_engines_render_identically() {
    let mut first = engine();
    let mut second = TemplateEngine::with_history();
    for (name, body) in TEMPLATES.iter().rev() {
        second.register_template(name, body).unwrap();
    }

    for context in contexts() {
        for (name, _) in TEMPLATES {
            let a = first.generate(name, &context).unwrap();
            let b = second.generate(name, &context).unwrap();
            let again = first.generate(name, &context).unwrap();
            assert_eq!(a, b, "template {name}");
            assert_eq!(a, again, "template {name}");
        }
    }
    assert_eq!(first.list_templates(), second.list_templates());
}

#[test]
fn literal_braces_and_values_are_not_reinterpreted() {
    let engine = engine();
    let context = &contexts()[1];
    assert_eq!(
        engine.render("report", context).unwrap(),
        "{name}: 0 items (ünïcode) {raw}"
    );
    assert_eq!(engine.render("repeat", context).unwrap(), "}}{}");
}

#[test]
fn store_crud_properties_hold_for_many_keys() {
    let mut store = KeyValueStore::new();
    let keys: Vec<String> = (0..50).map(|n| format!("key_{n:02}")).collect();
    for (n, key) in keys.iter().enumerate() {
        store.create(key, format!("v{n}")).unwrap();
        assert!(store.exists(key));
        assert_eq!(store.read(key).unwrap(), format!("v{n}"));
        assert_eq!(store.create(key, "other").unwrap_err().kind(), ErrorKind::KeyConflict);
        assert_eq!(store.read(key).unwrap(), format!("v{n}"));
    }
    assert_eq!(store.list_keys(), keys);

    for key in keys.iter().step_by(2) {
        store.delete(key).unwrap();
        assert!(!store.exists(key));
        assert_eq!(store.read(key).unwrap_err().kind(), ErrorKind::KeyAbsence);
    }
    assert_eq!(store.count(), 25);
}
