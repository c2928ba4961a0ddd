use corral_kernel::hooks::{Callback, HookContext, HookRegistry, LifecycleEvent};
use corral_kernel::loader::{ModuleLoader, Namespace, Package, PackageRegistry};
use corral_domain::profile::Profile;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

#[derive(Debug, PartialEq, Eq)]
struct Widget(&'static str);

fn widget_registry() -> PackageRegistry {
    PackageRegistry::default().mount(
        "src",
        Package::with_init(|| {
            Namespace::builder("src")
                .object("first", Widget("first"))
                .module(
                    "nested",
                    Namespace::builder("nested").object("second", Widget("second")).build(),
                )
                .build()
        }),
    )
}

#[test]
fn instances_are_collected_across_depth() {
    let mut loader = ModuleLoader::new(widget_registry());
    let widgets = loader.instances_of::<Widget>("src").expect("collect widgets");
    let mut names: Vec<&str> = widgets.iter().map(|w| w.0).collect();
    names.sort_unstable();
    assert_eq!(names, ["first", "second"]);
}

#[test]
fn initializer_runs_exactly_once() {
    static RUNS: AtomicUsize = AtomicUsize::new(0);

    let registry = PackageRegistry::default().mount(
        "src",
        Package::with_init(|| {
            RUNS.fetch_add(1, Ordering::SeqCst);
            Namespace::builder("src").object("only", Widget("only")).build()
        }),
    );
    let mut loader = ModuleLoader::new(registry);

    loader.load("src").expect("first load");
    loader.load("src").expect("cached load");
    loader.instances_of::<Widget>("src").expect("collect");
    assert_eq!(RUNS.load(Ordering::SeqCst), 1, "module cache must prevent re-initialization");
}

#[test]
fn functions_first_match_wins() {
    let registry = PackageRegistry::default().mount(
        "src",
        Package::with_init(|| {
            let log = |label: &'static str| {
                Callback::plain(move || {
                    let _ = label;
                })
            };
            Namespace::builder("src")
                .function("before_startup", log("outer"))
                .module(
                    "nested",
                    Namespace::builder("nested").function("before_startup", log("inner")).build(),
                )
                .build()
        }),
    );
    let mut loader = ModuleLoader::new(registry);

    let found = loader.functions("src", &["before_startup", "on_shutdown"]).expect("discover");
    assert_eq!(found.len(), 1, "only exported names are returned");
    assert!(found.contains_key("before_startup"));
}

#[test]
fn hook_discovery_fills_only_unregistered_slots() {
    let fired = Arc::new(Mutex::new(Vec::new()));

    let discovered = {
        let fired = fired.clone();
        Callback::plain(move || fired.lock().expect("fired lock").push("discovered"))
    };
    let registry = PackageRegistry::default().mount(
        "src",
        Package::with_init(move || {
            Namespace::builder("src")
                .function("before_startup", discovered.clone())
                .function("on_shutdown", discovered.clone())
                .build()
        }),
    );
    let mut loader = ModuleLoader::new(registry);

    let explicit = {
        let fired = fired.clone();
        Callback::plain(move || fired.lock().expect("fired lock").push("explicit"))
    };
    let mut hooks = HookRegistry::default().with(LifecycleEvent::BeforeStartup, explicit);
    hooks.discover(&mut loader, "src").expect("discover hooks");

    let ctx = HookContext { profile: Profile::default() };
    hooks.fire(LifecycleEvent::BeforeStartup, &ctx).expect("explicit wins");
    hooks.fire(LifecycleEvent::OnShutdown, &ctx).expect("discovered fires");

    assert_eq!(*fired.lock().expect("fired lock"), ["explicit", "discovered"]);
}

#[test]
fn shared_module_is_visited_once() {
    let shared = Arc::new(Namespace::builder("shared").object("shared", Widget("shared")).build());
    let shared_a = shared.clone();
    let shared_b = shared;

    let registry = PackageRegistry::default().mount(
        "src",
        Package::with_init(move || {
            Namespace::builder("src")
                .module_arc("left", shared_a.clone())
                .module_arc("right", shared_b.clone())
                .build()
        }),
    );
    let mut loader = ModuleLoader::new(registry);

    let widgets = loader.instances_of::<Widget>("src").expect("collect");
    assert_eq!(widgets.len(), 1, "diamond-shaped graphs must not duplicate matches");
}
