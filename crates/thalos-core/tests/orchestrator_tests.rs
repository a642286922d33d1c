//! ---
//! thalos_section: "01-core-functionality"
//! thalos_subsection: "tests"
//! thalos_type: "test"
//! thalos_scope: "code"
//! thalos_description: "Lifecycle scenarios driven through the public orchestrator API."
//! thalos_version: "v1.0.0"
//! thalos_owner: "core"
//! ---
use thalos_common::config::SystemConfig;
use thalos_core::{Context, CoreError, ErrorKind, LifecycleState, Orchestrator, Subsystem};
use thalos_logging::LogContext;

fn booted() -> Orchestrator {
    let mut orchestrator = Orchestrator::new(
        SystemConfig::default(),
        LogContext::new("orchestrator").with_instance("it"),
    );
    orchestrator.boot().unwrap();
    orchestrator
}

#[test]
fn memory_round_trip_then_shutdown_revokes_access() {
    let mut orchestrator = booted();
    assert_eq!(orchestrator.status().state, LifecycleState::Operational);

    orchestrator.store_mut().unwrap().create("username", "Tony").unwrap();
    assert_eq!(orchestrator.store().unwrap().read("username").unwrap(), "Tony");

    orchestrator.shutdown().unwrap();
    assert_eq!(
        orchestrator.store().unwrap_err(),
        CoreError::SubsystemUnavailable {
            subsystem: Subsystem::Memory,
            state: LifecycleState::Shutdown,
        }
    );
}

#[test]
fn template_generation_through_orchestrator() {
    let mut orchestrator = booted();
    let engine = orchestrator.templates_mut().unwrap();
    engine.register_template("greet", "Hello {name}!").unwrap();

    let mut context = Context::new();
    context.insert("name".into(), "Ada".into());
    assert_eq!(engine.generate("greet", &context).unwrap(), "Hello Ada!");

    let err = engine.generate("greet", &Context::new()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ContextIncompleteness);
    assert_eq!(
        err,
        CoreError::MissingContext {
            template: "greet".into(),
            missing: vec!["name".into()],
        }
    );
}

#[test]
fn failed_store_operations_do_not_mutate() {
    let mut orchestrator = booted();
    let store = orchestrator.store_mut().unwrap();
    store.create("k", "v1").unwrap();

    assert_eq!(store.create("k", "v2").unwrap_err().kind(), ErrorKind::KeyConflict);
    assert_eq!(store.update("missing", "x").unwrap_err().kind(), ErrorKind::KeyAbsence);
    assert_eq!(store.create("1bad", "x").unwrap_err().kind(), ErrorKind::FormatInvalidity);

    assert_eq!(store.list_keys(), vec!["k"]);
    assert_eq!(store.read("k").unwrap(), "v1");
}

#[test]
fn each_boot_gets_fresh_subsystems() {
    let mut first = booted();
    first.store_mut().unwrap().create("only_here", "1").unwrap();
    first
        .templates_mut()
        .unwrap()
        .register_template("t", "x")
        .unwrap();

    let second = booted();
    assert_eq!(second.store().unwrap().count(), 0);
    assert!(second.templates().unwrap().list_templates().is_empty());
    assert!(first.store().unwrap().exists("only_here"));
}

#[test]
fn shared_orchestrator_serialises_access() {
    let shared = Orchestrator::default().into_shared();
    shared.lock().boot().unwrap();

    let handles: Vec<_> = (0..4)
        .map(|worker| {
            let shared = shared.clone();
            std::thread::spawn(move || {
                for n in 0..25 {
                    let key = format!("w{worker}_{n}");
                    shared.lock().store_mut().unwrap().create(&key, "v").unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(shared.lock().store().unwrap().count(), 100);
}
