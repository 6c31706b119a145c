use desktop_app_contract::{AppInput, ApplicationDescriptor, ApplicationId, DefaultPosition, DefaultSize};
use desktop_runtime::{
    chrome::WindowGesture, AppCatalog, DesktopConfig, DesktopRuntime, DockSlotState, Position,
    Size, WorkArea,
};
use futures::executor::block_on;
use platform_host::{HostServices, MemoryPrefsStore, TOOLS_PREFS_KEY};
use pretty_assertions::assert_eq;

fn descriptor(id: &str, singleton: bool) -> ApplicationDescriptor {
    ApplicationDescriptor {
        id: ApplicationId::trusted(id),
        display_name: id.to_uppercase(),
        icon_id: String::new(),
        default_size: DefaultSize::pixels(300, 200),
        default_position: None,
        open_on_startup: false,
        singleton,
    }
}

fn runtime_with(descriptors: Vec<ApplicationDescriptor>, config: DesktopConfig) -> DesktopRuntime {
    let catalog = AppCatalog::new(descriptors).expect("catalog");
    DesktopRuntime::with_catalog(config, catalog, HostServices::offline())
}

fn stack_order(runtime: &DesktopRuntime, id: &desktop_app_contract::InstanceId) -> u64 {
    runtime.state().window(id).expect("live window").stack_order
}

#[test]
fn singleton_launched_twice_keeps_one_instance_and_raises_it() {
    let mut runtime = runtime_with(vec![descriptor("a", true)], DesktopConfig::default());
    let app = ApplicationId::trusted("a");
    let first = runtime.launch(&app).expect("first launch");
    let before = stack_order(&runtime, &first);

    let second = runtime.launch(&app).expect("second launch");
    assert_eq!(second, first);
    assert_eq!(runtime.state().windows.len(), 1);
    assert!(stack_order(&runtime, &first) > before);
}

#[test]
fn focusing_an_older_window_puts_it_on_top() {
    let mut runtime = runtime_with(
        vec![descriptor("a", false), descriptor("b", false)],
        DesktopConfig::default(),
    );
    let a = runtime.launch(&ApplicationId::trusted("a")).expect("a");
    let b = runtime.launch(&ApplicationId::trusted("b")).expect("b");
    runtime.focus(&a);

    assert!(stack_order(&runtime, &a) > stack_order(&runtime, &b));
    assert_eq!(runtime.state().focused_window().map(|w| &w.instance_id), Some(&a));
    let frames = runtime.frames();
    assert_eq!(frames.last().map(|f| &f.instance_id), Some(&a));
}

#[test]
fn focus_restores_a_minimized_window() {
    let mut runtime = runtime_with(vec![descriptor("a", false)], DesktopConfig::default());
    let a = runtime.launch(&ApplicationId::trusted("a")).expect("a");
    runtime.minimize(&a);
    assert!(runtime.frames().is_empty());
    assert_eq!(runtime.dock()[0].state, DockSlotState::RunningMinimized);

    runtime.focus(&a);
    assert!(!runtime.state().window(&a).expect("live").minimized);
    assert_eq!(runtime.dock()[0].state, DockSlotState::RunningFocused);
}

#[test]
fn closing_an_unknown_instance_changes_nothing() {
    let mut runtime = runtime_with(vec![descriptor("a", false)], DesktopConfig::default());
    runtime.launch(&ApplicationId::trusted("a")).expect("a");
    let before = runtime.state().clone();

    runtime.close(&desktop_app_contract::InstanceId::from_raw("ghost-99"));
    assert_eq!(runtime.state(), &before);
    assert_eq!(runtime.mounted_count(), 1);
}

#[test]
fn large_window_is_clamped_into_a_small_work_area() {
    let mut big = descriptor("big", false);
    big.default_size = DefaultSize::pixels(700, 500);
    big.default_position = Some(DefaultPosition { x: 50, y: 50 });
    let config = DesktopConfig {
        work_area: WorkArea {
            width: 760,
            height: 540,
        },
        ..DesktopConfig::default()
    };
    let mut runtime = runtime_with(vec![big], config);
    let id = runtime.launch(&ApplicationId::trusted("big")).expect("big");

    let window = runtime.state().window(&id).expect("live");
    assert!(window.position.x <= 52);
    assert!(window.position.y <= 32);
    assert_eq!(window.position, Position { x: 50, y: 32 });
}

#[test]
fn repeated_launches_of_a_multi_instance_app_get_distinct_ids() {
    let mut runtime = runtime_with(vec![descriptor("a", false)], DesktopConfig::default());
    let app = ApplicationId::trusted("a");
    let ids: Vec<_> = (0..3)
        .map(|_| runtime.launch(&app).expect("launch"))
        .collect();

    assert_eq!(
        ids.iter().map(|id| id.as_str()).collect::<Vec<_>>(),
        vec!["a-1", "a-2", "a-3"]
    );
    let positions: Vec<Position> = ids
        .iter()
        .map(|id| runtime.state().window(id).expect("live").position)
        .collect();
    assert_eq!(
        positions,
        vec![
            Position { x: 50, y: 50 },
            Position { x: 80, y: 80 },
            Position { x: 110, y: 110 },
        ]
    );
}

#[test]
fn instance_ids_are_not_reused_after_close() {
    let mut runtime = runtime_with(vec![descriptor("a", true)], DesktopConfig::default());
    let app = ApplicationId::trusted("a");
    let first = runtime.launch(&app).expect("first");
    runtime.close(&first);
    let second = runtime.launch(&app).expect("second");
    assert_ne!(first, second);
}

#[test]
fn boot_seeds_tools_and_opens_the_startup_apps() {
    let prefs = MemoryPrefsStore::default();
    let services = HostServices::with_prefs(prefs.clone());
    let mut runtime = DesktopRuntime::new(DesktopConfig::default(), services).expect("runtime");
    let launched = block_on(runtime.boot()).expect("boot");

    assert_eq!(
        launched.iter().map(|id| id.as_str()).collect::<Vec<_>>(),
        vec!["mindCLI-1"]
    );
    let window = runtime.state().window(&launched[0]).expect("mind cli");
    assert_eq!(window.title, "Mind-CLI");
    assert_eq!(window.position, Position { x: 50, y: 50 });
    assert_eq!(
        window.size,
        Size {
            width: 700,
            height: 500
        }
    );
    assert!(prefs.raw(TOOLS_PREFS_KEY).is_some_and(|raw| raw.contains("calculator")));
    assert_eq!(runtime.focused_input(), Some(&launched[0]));
}

#[test]
fn dock_click_launches_then_focuses() {
    let mut runtime =
        DesktopRuntime::new(DesktopConfig::default(), HostServices::offline()).expect("runtime");
    let tool_creator = ApplicationId::trusted("toolCreator");
    runtime.click_dock_slot(&tool_creator).expect("launch");
    runtime.click_dock_slot(&tool_creator).expect("focus");

    let slot = runtime
        .dock()
        .into_iter()
        .find(|slot| slot.app_id == tool_creator)
        .expect("slot");
    assert_eq!(slot.running_count, 1);
    assert_eq!(slot.aria_label(), "Tool Creator (1 window running)");
}

#[test]
fn chrome_gestures_move_and_resize_windows() {
    let mut runtime = runtime_with(
        vec![descriptor("a", false), descriptor("b", false)],
        DesktopConfig::default(),
    );
    let a = runtime.launch(&ApplicationId::trusted("a")).expect("a");
    let b = runtime.launch(&ApplicationId::trusted("b")).expect("b");

    runtime.handle_gesture(
        &a,
        WindowGesture::DragEnd {
            position: Position { x: 400, y: 300 },
        },
    );
    assert_eq!(runtime.state().window(&a).expect("a").position, Position { x: 400, y: 300 });
    assert!(stack_order(&runtime, &a) > stack_order(&runtime, &b));

    runtime.handle_gesture(
        &b,
        WindowGesture::ResizeEnd {
            position: Position { x: 10, y: 10 },
            width: "500px".into(),
            height: 120.into(),
        },
    );
    let resized = runtime.state().window(&b).expect("b");
    assert_eq!(resized.size, Size { width: 500, height: 150 });
    assert_eq!(runtime.state().focused_window().map(|w| &w.instance_id), Some(&b));

    runtime.handle_gesture(&b, WindowGesture::CloseButton);
    assert!(runtime.state().window(&b).is_none());
}

#[test]
fn tools_created_in_tool_creator_are_usable_from_mind_cli() {
    let mut runtime =
        DesktopRuntime::new(DesktopConfig::default(), HostServices::offline()).expect("runtime");
    block_on(runtime.boot()).expect("boot");
    let creator = runtime
        .launch(&ApplicationId::trusted("toolCreator"))
        .expect("tool creator");
    for (name, value) in [("toolName", "shout"), ("description", "Shouts a word")] {
        block_on(runtime.content_input(
            &creator,
            AppInput::SetField {
                name: name.to_string(),
                value: value.to_string(),
            },
        ));
    }
    block_on(runtime.content_input(&creator, AppInput::Action("submit".to_string())));

    let mind = runtime
        .launch(&ApplicationId::trusted("mindCLI"))
        .expect("mind cli");
    block_on(runtime.content_input(&mind, AppInput::Submit("help".to_string())));
    let view = runtime.content_view(&mind).expect("view");
    let help = view.lines.last().expect("reply");
    assert!(help.starts_with("AI: "));
    assert!(help.contains("- shout: Shouts a word"));
    assert!(help.contains("- calculator:"));
}

#[test]
fn dragging_past_the_edges_keeps_the_window_inside_the_work_area() {
    let mut runtime =
        DesktopRuntime::new(DesktopConfig::default(), HostServices::offline()).expect("runtime");
    let id = runtime
        .launch(&ApplicationId::trusted("missionControl"))
        .expect("mission control");

    runtime.handle_gesture(
        &id,
        WindowGesture::DragEnd {
            position: Position { x: -500, y: 5000 },
        },
    );
    let window = runtime.state().window(&id).expect("live");
    let margin = runtime.config().margin;
    let area = runtime.config().work_area;
    assert!(window.position.x >= margin);
    assert!(window.position.y >= margin);
    assert!(window.position.y + window.size.height <= area.height - margin);
    assert_eq!(window.position, Position { x: 8, y: 112 });
}
