#![allow(dead_code)]

use std::sync::Arc;

use effright::store::{MemoryAclStore, MemoryCatalog, MemoryDirectory};
use effright::{EngineConfig, RightCommand};
use effright_testkit::{RecordingAclStore, ScriptedEvaluator, TestFixture};

pub type Engine = RightCommand<
    Arc<MemoryDirectory>,
    Arc<MemoryCatalog>,
    Arc<ScriptedEvaluator>,
    Arc<RecordingAclStore<MemoryAclStore>>,
>;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

pub fn engine_with(f: &TestFixture, config: EngineConfig) -> Engine {
    init_tracing();
    RightCommand::new(
        f.directory.clone(),
        f.catalog.clone(),
        f.evaluator.clone(),
        f.store.clone(),
        config,
    )
    .unwrap()
}

pub fn engine(f: &TestFixture) -> Engine {
    engine_with(f, EngineConfig::default())
}
