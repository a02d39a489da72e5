//! End-to-end lifecycle tests: filesystem discovery, module evaluation,
//! switching, and event delivery, over real plugin directories.

use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use ghosthub_core::config::{PluginsConfig, SwitchingConfig};
use ghosthub_core::error::GhostError;
use ghosthub_core::events::GhostEventKind;
use ghosthub_core::manifest::GhostManifest;
use ghosthub_host::FsHostBridge;
use ghosthub_runtime::{
    CapabilitySet, ContextFactory, Ghost, GhostManager, LoadedGhost, SwitchOutcome,
    ERROR_BUTTON_TEXT,
};

fn write_plugin(root: &Path, id: &str, button: &str) {
    let dir = root.join(id);
    std::fs::create_dir(&dir).expect("mkdir");
    let manifest = format!(
        r#"{{"id":"{id}","name":"{id}","version":"1.0.0","description":"d",
           "author":"a","shortcut":"Alt+1","icon":"icon.png"}}"#
    );
    std::fs::write(dir.join("manifest.json"), manifest).expect("write manifest");
    let module = format!(
        r#"(module
            (memory (export "memory") 1)
            (data (i32.const 0) "{button}")
            (func (export "on_init"))
            (func (export "on_cleanup"))
            (func (export "on_activate"))
            (func (export "on_deactivate"))
            (func (export "on_click"))
            (func (export "get_button_text") (result i32 i32)
                i32.const 0
                i32.const {len})
        )"#,
        len = button.len()
    );
    std::fs::write(dir.join("index.wat"), module).expect("write module");
}

fn switching() -> SwitchingConfig {
    SwitchingConfig {
        settle_delay_ms: 0,
        hook_timeout_secs: 5,
        hook_fuel: 1_000_000,
    }
}

fn manager_over(root: &Path) -> GhostManager {
    let bridge = Arc::new(FsHostBridge::new(vec![root.to_path_buf()]));
    GhostManager::new(bridge, &PluginsConfig::default(), &switching()).expect("manager")
}

#[tokio::test]
async fn test_load_registers_valid_plugins_and_skips_broken_dirs() {
    let root = tempfile::tempdir().expect("tempdir");
    write_plugin(root.path(), "miku", "Talk");
    write_plugin(root.path(), "rin", "Sing");

    // Manifest but no module file: the load fails and the plugin is skipped.
    let orphan = root.path().join("orphan");
    std::fs::create_dir(&orphan).expect("mkdir");
    std::fs::write(
        orphan.join("manifest.json"),
        r#"{"id":"orphan","name":"o","version":"1","description":"d",
           "author":"a","shortcut":"","icon":""}"#,
    )
    .expect("write manifest");

    // No manifest at all: skipped at discovery.
    std::fs::create_dir(root.path().join("empty")).expect("mkdir");

    let manager = manager_over(root.path());
    assert_eq!(manager.load_all().await, 2);

    let ids: Vec<String> = manager
        .ghosts()
        .await
        .into_iter()
        .map(|g| g.manifest.id)
        .collect();
    assert_eq!(ids, vec!["miku", "rin"]);
}

#[tokio::test]
async fn test_switching_updates_button_text_and_fires_events() {
    let root = tempfile::tempdir().expect("tempdir");
    write_plugin(root.path(), "miku", "Talk");
    write_plugin(root.path(), "rin", "Sing");

    let manager = manager_over(root.path());
    manager.load_all().await;

    let events: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
    let bus = manager.bus();
    for kind in [GhostEventKind::Activate, GhostEventKind::Deactivate] {
        let events = events.clone();
        bus.subscribe(kind, move |event| {
            events
                .lock()
                .expect("events lock")
                .push(format!("{}:{}", event.kind, event.ghost_id));
        });
    }

    assert_eq!(manager.switch_to("miku").await, SwitchOutcome::Switched);
    assert_eq!(manager.button_text().await.as_deref(), Some("Talk"));

    assert_eq!(manager.switch_to("rin").await, SwitchOutcome::Switched);
    assert_eq!(manager.button_text().await.as_deref(), Some("Sing"));

    assert_eq!(
        *events.lock().expect("events lock"),
        vec!["activate:miku", "deactivate:miku", "activate:rin"]
    );
}

#[tokio::test]
async fn test_broken_module_degrades_to_stub_but_stays_selectable() {
    let root = tempfile::tempdir().expect("tempdir");
    write_plugin(root.path(), "miku", "Talk");

    let dir = root.path().join("glitch");
    std::fs::create_dir(&dir).expect("mkdir");
    std::fs::write(
        dir.join("manifest.json"),
        r#"{"id":"glitch","name":"g","version":"1","description":"d",
           "author":"a","shortcut":"","icon":""}"#,
    )
    .expect("write manifest");
    std::fs::write(dir.join("index.wat"), "(this is not wat at all").expect("write module");

    let manager = manager_over(root.path());
    assert_eq!(manager.load_all().await, 2);

    // The stub activates cleanly and reports the error marker.
    assert_eq!(manager.switch_to("glitch").await, SwitchOutcome::Switched);
    assert_eq!(
        manager.button_text().await.as_deref(),
        Some(ERROR_BUTTON_TEXT)
    );

    // And the runtime can switch away to a healthy ghost afterwards.
    assert_eq!(manager.switch_to("miku").await, SwitchOutcome::Switched);
    assert_eq!(manager.button_text().await.as_deref(), Some("Talk"));
}

#[tokio::test]
async fn test_trapping_init_hook_keeps_plugin_out_of_registry() {
    let root = tempfile::tempdir().expect("tempdir");
    write_plugin(root.path(), "miku", "Talk");

    let dir = root.path().join("crasher");
    std::fs::create_dir(&dir).expect("mkdir");
    std::fs::write(
        dir.join("manifest.json"),
        r#"{"id":"crasher","name":"c","version":"1","description":"d",
           "author":"a","shortcut":"","icon":""}"#,
    )
    .expect("write manifest");
    // Well-formed module whose on_init traps: the load is aborted and the
    // entry is never inserted.
    std::fs::write(
        dir.join("index.wat"),
        r#"(module
            (memory (export "memory") 1)
            (func (export "on_init") unreachable)
            (func (export "on_cleanup"))
            (func (export "on_activate"))
            (func (export "on_deactivate"))
            (func (export "on_click"))
            (func (export "get_button_text") (result i32 i32)
                i32.const 0
                i32.const 0)
        )"#,
    )
    .expect("write module");

    let manager = manager_over(root.path());
    assert_eq!(manager.load_all().await, 1);
    assert_eq!(manager.switch_to("crasher").await, SwitchOutcome::UnknownGhost);
    assert_eq!(manager.switch_to("miku").await, SwitchOutcome::Switched);
}

/// Ghost that records its cleanup, for observing replacement semantics.
#[derive(Debug)]
struct RecordingGhost {
    capabilities: CapabilitySet,
    cleanups: Arc<Mutex<u32>>,
}

#[async_trait]
impl Ghost for RecordingGhost {
    fn capabilities(&self) -> &CapabilitySet {
        &self.capabilities
    }

    async fn on_init(&self) -> Result<(), GhostError> {
        Ok(())
    }

    async fn on_cleanup(&self) -> Result<(), GhostError> {
        *self.cleanups.lock().expect("cleanups lock") += 1;
        Ok(())
    }

    async fn on_activate(&self) -> Result<(), GhostError> {
        Ok(())
    }

    async fn on_deactivate(&self) -> Result<(), GhostError> {
        Ok(())
    }

    async fn on_click(&self) -> Result<(), GhostError> {
        Ok(())
    }

    async fn button_text(&self) -> String {
        "old".to_string()
    }
}

#[tokio::test]
async fn test_id_collision_cleans_up_previous_ghost_before_replacement() {
    let root = tempfile::tempdir().expect("tempdir");
    write_plugin(root.path(), "miku", "Talk");

    let manager = manager_over(root.path());
    let cleanups = Arc::new(Mutex::new(0u32));
    let old = RecordingGhost {
        capabilities: CapabilitySet::new(),
        cleanups: cleanups.clone(),
    };
    manager
        .registry()
        .insert(
            LoadedGhost {
                manifest: GhostManifest {
                    id: "miku".to_string(),
                    name: "old miku".to_string(),
                    version: "0.9.0".to_string(),
                    description: String::new(),
                    author: String::new(),
                    shortcut: String::new(),
                    icon: String::new(),
                },
                ghost: Arc::new(old),
            },
            ContextFactory::new(None).create("miku"),
        )
        .await;

    assert_eq!(manager.load_all().await, 1);

    // The colliding entry was cleaned up and the new module took its place.
    assert_eq!(*cleanups.lock().expect("cleanups lock"), 1);
    manager.switch_to("miku").await;
    assert_eq!(manager.button_text().await.as_deref(), Some("Talk"));
}

#[tokio::test]
async fn test_teardown_leaves_empty_registry() {
    let root = tempfile::tempdir().expect("tempdir");
    write_plugin(root.path(), "miku", "Talk");

    let manager = manager_over(root.path());
    manager.load_all().await;
    manager.switch_to("miku").await;

    manager.teardown().await;
    assert_eq!(manager.ghosts().await.len(), 0);
    assert!(manager.current_id().await.is_none());
    assert!(manager.button_text().await.is_none());
}
