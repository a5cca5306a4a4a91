//! End-to-end tests for the tour controller against the headless host.
//!
//! Every test runs on a paused tokio clock so the settle delay is driven
//! deterministically.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;

use dashboard_tour::config::{SettlePolicy, TourConfig};
use dashboard_tour::headless::{HeadlessDocument, HeadlessRouter, RecordingTooltip, SubscriptionEvent};
use dashboard_tour::store::{Flag, FlagStore, MemoryFlagStore};
use dashboard_tour::tour::{
    LoopPhase, Position, Rect, Side, Step, StepId, StepRegistry, TourCommand, TourController, TourDeps,
    Viewport,
};

struct Host {
    document: Arc<HeadlessDocument>,
    router: Arc<HeadlessRouter>,
    tooltip: Arc<RecordingTooltip>,
    store: Arc<MemoryFlagStore>,
}

impl Host {
    fn new() -> Self {
        Self {
            document: Arc::new(HeadlessDocument::new(Viewport::new(1024.0, 768.0))),
            router: Arc::new(HeadlessRouter::new("/")),
            tooltip: Arc::new(RecordingTooltip::default()),
            store: Arc::new(MemoryFlagStore::new()),
        }
    }

    fn controller(&self, config: TourConfig, steps: Vec<Step>) -> TourController {
        TourController::new(
            config,
            Arc::new(StepRegistry::new(steps).unwrap()),
            TourDeps {
                router: self.router.clone(),
                document: self.document.clone(),
                renderer: self.tooltip.clone(),
                store: self.store.clone(),
            },
        )
    }
}

fn steps() -> Vec<Step> {
    vec![
        Step::new("overview", "Overview", "Your numbers")
            .with_target("summary")
            .with_route("/"),
        Step::new("records", "Records", "Your table")
            .with_target("table")
            .with_route("/records"),
        Step::new("late", "Late", "Mounts later")
            .with_target("late-widget")
            .with_side(Side::Bottom)
            .with_route("/records"),
    ]
}

fn id(s: &str) -> StepId {
    StepId::from(s)
}

#[tokio::test(start_paused = true)]
async fn step_change_swaps_observer_pair_exactly_once() {
    let host = Host::new();
    host.document.mount("summary", Rect::new(100.0, 100.0, 200.0, 50.0));
    host.document.mount("table", Rect::new(300.0, 100.0, 600.0, 200.0));
    let mut tour = host.controller(TourConfig::default(), steps());

    tour.start();
    assert_eq!(tour.observer_phase(), LoopPhase::Initializing);
    assert!(tour.process_next_signal().await);
    assert_eq!(tour.observer_phase(), LoopPhase::Positioned);
    let setup_len = host.document.subscription_log().len();
    assert_eq!(setup_len, 2);

    tour.next();
    assert_eq!(host.document.live_mutation_observers(), 0);
    assert_eq!(host.document.live_resize_listeners(), 0);
    assert!(tour.process_next_signal().await);

    let log = host.document.subscription_log();
    assert_eq!(
        log[setup_len..],
        [
            SubscriptionEvent::MutationReleased,
            SubscriptionEvent::ResizeReleased,
            SubscriptionEvent::MutationObserved,
            SubscriptionEvent::ResizeObserved,
        ]
    );
    assert_eq!(host.document.max_live_observers(), 1);
    assert_eq!(tour.tooltip().unwrap().step_id, id("records"));
}

#[tokio::test(start_paused = true)]
async fn late_target_moves_tooltip_from_center_to_anchor() {
    let host = Host::new();
    let mut tour = host.controller(TourConfig::default(), steps());

    tour.go_to(&id("late"));
    tour.process_next_signal().await;

    let centered = tour.tooltip().unwrap().clone();
    assert!(!centered.anchored);
    assert_eq!(centered.side, Side::Center);
    assert_eq!(centered.position, Position { top: 274.0, left: 352.0 });

    host.document.mount("late-widget", Rect::new(100.0, 100.0, 200.0, 50.0));
    assert!(tour.process_pending() >= 1);

    let anchored = tour.tooltip().unwrap();
    assert!(anchored.anchored);
    assert_eq!(anchored.position, Position { top: 170.0, left: 40.0 });
    assert!(host.document.has_class("late-widget", "tour-highlight"));
    assert_eq!(host.document.live_mutation_observers(), 1);
}

#[tokio::test(start_paused = true)]
async fn step_change_before_settle_cancels_stale_timer() {
    let host = Host::new();
    let mut tour = host.controller(TourConfig::default(), steps());

    tour.start();
    tokio::time::sleep(Duration::from_millis(200)).await;
    tour.next();
    tokio::time::sleep(Duration::from_secs(1)).await;

    assert_eq!(tour.process_pending(), 1);
    let views = host.tooltip.views();
    assert_eq!(views.len(), 1);
    assert_eq!(views[0].step_id, id("records"));
}

#[tokio::test(start_paused = true)]
async fn previous_step_visuals_are_withdrawn_while_next_settles() {
    let host = Host::new();
    host.document.mount("summary", Rect::new(100.0, 100.0, 200.0, 50.0));
    host.document.mount("table", Rect::new(300.0, 100.0, 600.0, 200.0));
    let mut tour = host.controller(TourConfig::default(), steps());

    tour.start();
    tour.process_next_signal().await;
    assert!(host.document.has_class("summary", "tour-highlight"));
    assert_eq!(tour.tooltip().unwrap().step_id, id("overview"));

    tour.next();
    assert_eq!(tour.active_step_id(), Some(&id("records")));
    assert_eq!(tour.observer_phase(), LoopPhase::Initializing);
    assert!(tour.tooltip().is_none());
    assert!(host.tooltip.is_hidden());
    assert!(!host.document.has_class("summary", "tour-highlight"));
    assert!(!host.document.has_class("table", "tour-highlight"));

    assert!(tour.process_next_signal().await);
    assert_eq!(tour.tooltip().unwrap().step_id, id("records"));
    assert!(!host.tooltip.is_hidden());
    assert!(host.document.has_class("table", "tour-highlight"));
}

#[tokio::test(start_paused = true)]
async fn tall_target_is_not_rescrolled_by_later_mutations() {
    let host = Host::new();
    host.document.mount("summary", Rect::new(900.0, 100.0, 300.0, 1500.0));
    let mut tour = host.controller(TourConfig::default(), steps());

    tour.start();
    tour.process_next_signal().await;
    assert_eq!(host.document.scrolled_to().len(), 1);

    for n in 0..5 {
        host.document.mount(&format!("widget-{n}"), Rect::new(0.0, 0.0, 10.0, 10.0));
    }
    tour.process_pending();
    assert_eq!(host.document.scrolled_to().len(), 1);
    assert!(tour.tooltip().unwrap().anchored);
}

#[tokio::test(start_paused = true)]
async fn dismiss_before_settle_never_renders() {
    let host = Host::new();
    let mut tour = host.controller(TourConfig::default(), steps());

    tour.start();
    tour.dismiss();
    tokio::time::sleep(Duration::from_secs(1)).await;

    assert_eq!(tour.process_pending(), 0);
    assert!(host.tooltip.views().is_empty());
    assert_eq!(tour.observer_phase(), LoopPhase::Idle);
    assert!(host.store.get(Flag::OnboardingCompleted).unwrap());
}

#[tokio::test(start_paused = true)]
async fn route_sync_navigates_only_when_route_differs() {
    let host = Host::new();
    let mut tour = host.controller(TourConfig::default(), steps());

    tour.start();
    assert!(host.router.navigations().is_empty());

    tour.next();
    tour.next();
    tour.previous();
    tour.previous();

    assert_eq!(
        host.router.navigations(),
        vec!["/records".to_string(), "/".to_string()]
    );
}

#[tokio::test(start_paused = true)]
async fn navigation_failure_does_not_stop_the_tour() {
    let host = Host::new();
    host.router.fail_navigation(true);
    let mut tour = host.controller(TourConfig::default(), steps());

    tour.start();
    tour.next();
    assert_eq!(tour.active_step_id(), Some(&id("records")));

    tour.process_next_signal().await;
    let view = tour.tooltip().unwrap();
    assert_eq!(view.step_id, id("records"));
    assert!(!view.anchored);
}

#[tokio::test(start_paused = true)]
async fn navigating_only_policy_positions_same_page_steps_immediately() {
    let host = Host::new();
    host.document.mount("summary", Rect::new(100.0, 100.0, 200.0, 50.0));
    let config = TourConfig {
        settle_policy: SettlePolicy::NavigatingStepsOnly,
        ..TourConfig::default()
    };
    let mut tour = host.controller(config, steps());

    tour.start();
    assert_eq!(tour.observer_phase(), LoopPhase::Positioned);
    assert!(tour.tooltip().unwrap().anchored);

    tour.next();
    assert_eq!(tour.observer_phase(), LoopPhase::Initializing);
}

#[tokio::test(start_paused = true)]
async fn resize_repositions_tooltip() {
    let host = Host::new();
    let mut tour = host.controller(TourConfig::default(), steps());

    tour.start();
    tour.process_next_signal().await;
    assert_eq!(tour.tooltip().unwrap().position, Position { top: 274.0, left: 352.0 });

    host.document.resize(Viewport::new(800.0, 600.0));
    assert_eq!(tour.process_pending(), 1);
    assert_eq!(tour.tooltip().unwrap().position, Position { top: 190.0, left: 240.0 });
}

#[tokio::test(start_paused = true)]
async fn next_through_builtin_tour_ends_on_last_call() {
    let host = Host::new();
    let registry = StepRegistry::dashboard();
    let total = registry.len();
    let mut tour = host.controller(TourConfig::default(), registry.steps().to_vec());

    tour.start();
    for call in 1..=total {
        tour.next();
        assert_eq!(tour.is_active(), call < total, "call {call} of {total}");
    }
    assert_eq!(tour.completed_step_ids().len(), total);
    assert!(host.store.get(Flag::OnboardingCompleted).unwrap());
    assert!(host.tooltip.is_hidden());
    assert_eq!(host.document.live_mutation_observers(), 0);
}

#[tokio::test(start_paused = true)]
async fn restart_after_completion_begins_again() {
    let host = Host::new();
    host.store.set(Flag::OnboardingCompleted, true).unwrap();
    let mut tour = host.controller(TourConfig::default(), steps());
    let mut snapshots = tour.subscribe();

    tour.restart();
    let snapshot = snapshots.borrow_and_update().clone();
    assert_eq!(snapshot.active_step_id, Some(id("overview")));
    assert!(snapshot.completed_step_ids.is_empty());
    assert!(!snapshot.has_completed_tour);
    assert!(!host.store.get(Flag::OnboardingCompleted).unwrap());
}

#[tokio::test(start_paused = true)]
async fn run_processes_commands_until_channel_closes() {
    let host = Host::new();
    let mut tour = host.controller(TourConfig::default(), steps());
    let (tx, rx) = mpsc::unbounded_channel();

    tx.send(TourCommand::AcknowledgeWelcome { start_tour: true }).unwrap();
    tx.send(TourCommand::GoTo(id("late"))).unwrap();
    tx.send(TourCommand::Previous).unwrap();
    tx.send(TourCommand::Dismiss).unwrap();
    drop(tx);

    tour.run(rx).await;

    assert!(!tour.is_active());
    assert!(tour.has_completed_tour());
    assert!(host.store.get(Flag::HasSeenWelcome).unwrap());
    assert_eq!(host.document.live_mutation_observers(), 0);
}
