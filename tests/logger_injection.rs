use std::sync::{Arc, Mutex};
use std::time::Duration;

use hypersonic_arena::adapters::outbound::{init_noop_logger, MultiLogger, ScriptedAgent};
use hypersonic_arena::application::MatchRunner;
use hypersonic_arena::domains::arena::{AgentController, Game, Grid};
use hypersonic_arena::domains::logger::DomainLogger;

struct BridgeCapture {
    messages: Arc<Mutex<Vec<String>>>,
}

impl BridgeCapture {
    fn new() -> Self { Self { messages: Arc::new(Mutex::new(Vec::new())) } }
}

impl DomainLogger for BridgeCapture {
    fn info(&self, msg: &str) { self.messages.lock().unwrap().push(format!("INFO:{}", msg)); }
    fn warn(&self, msg: &str) { self.messages.lock().unwrap().push(format!("WARN:{}", msg)); }
    fn error(&self, msg: &str) { self.messages.lock().unwrap().push(format!("ERR:{}", msg)); }
}

#[tokio::test]
async fn test_runner_narrates_through_injected_logger() {
    let capture = Arc::new(BridgeCapture::new());
    let logger = capture.clone() as Arc<dyn DomainLogger>;

    let mut grid = Grid::empty(13, 11);
    grid.place_box(6, 5);
    let game = Game::new(vec!["Talker".into(), "Mute".into()], grid).unwrap();
    let controllers: Vec<Box<dyn AgentController>> = vec![
        Box::new(ScriptedAgent::new(["MOVE 0 0"])),
        Box::new(ScriptedAgent::new(Vec::<String>::new())),
    ];

    let mut runner = MatchRunner::new(game, controllers, logger)
        .unwrap()
        .with_budgets(Duration::from_millis(20), Duration::from_millis(20));
    runner.run().await.unwrap();

    let msgs = capture.messages.lock().unwrap();
    assert!(msgs.iter().any(|m| m.starts_with("INFO:") && m.contains("started with Talker, Mute")));
    assert!(msgs.iter().any(|m| m.starts_with("WARN:") && m.contains("Mute did not answer")));
    assert!(msgs.iter().any(|m| m.starts_with("WARN:") && m.contains("Mute disqualified")));
    assert!(msgs.iter().any(|m| m.starts_with("INFO:") && m.contains("Talker wins")));
}

#[tokio::test]
async fn test_multi_and_noop_logger() {
    let first = Arc::new(BridgeCapture::new());
    let second = Arc::new(BridgeCapture::new());
    let multi = MultiLogger::new(
        first.clone() as Arc<dyn DomainLogger>,
        Some(second.clone() as Arc<dyn DomainLogger>),
    );

    multi.info("one");
    multi.warn("two");
    multi.error("three");

    for capture in [&first, &second] {
        let msgs = capture.messages.lock().unwrap();
        assert_eq!(*msgs, vec!["INFO:one", "WARN:two", "ERR:three"]);
    }

    // No-op logger should accept calls and not panic
    let noop = init_noop_logger();
    noop.info("ignored");
    noop.error("ignored-err");
}
