//! Edits marshalled onto the world thread

use voxedit::config::EditConfig;
use voxedit::core::types::BlockPos;
use voxedit::platform::{EffectQueue, WorldDispatcher};
use voxedit::region::CuboidRegion;
use voxedit::tool::{Tool, ToolOutcome};
use voxedit::voxel::block::{ids, BlockState};
use voxedit::voxel::edit::{BlockPattern, EditSession, LocalSession};
use voxedit::voxel::world::{MemoryWorld, MemoryWorldSettings};

fn dispatcher() -> WorldDispatcher {
    let world = MemoryWorld::new(MemoryWorldSettings::default());
    WorldDispatcher::spawn(Box::new(world), 8).unwrap()
}

#[tokio::test]
async fn edit_and_undo_on_world_thread() {
    let dispatcher = dispatcher();
    let region = CuboidRegion::new(BlockPos::new(0, 20, 0), BlockPos::new(9, 20, 9));

    let outcome = dispatcher
        .run(move |world| {
            let mut session = EditSession::new(world, None);
            session.set_blocks(&region, &BlockPattern::new(BlockState::of(ids::WOOL)))?;
            Ok::<_, voxedit::core::Error>(session.finish())
        })
        .await
        .unwrap()
        .unwrap();
    assert_eq!(outcome.report.changed, 100);

    let mut local = LocalSession::new(&EditConfig::default());
    local.remember(outcome);

    let (report, block) = dispatcher
        .run(move |world| {
            let report = local.undo(world);
            (report, world.block(BlockPos::new(5, 20, 5)))
        })
        .await
        .unwrap();
    assert_eq!(report.unwrap().unwrap().restored, 100);
    assert!(block.is_air());
}

#[test]
fn tools_through_blocking_dispatch() {
    voxedit::core::logging::init();
    let dispatcher = dispatcher();
    let config = EditConfig::default();
    let tool = Tool::replacer(&config, Box::new(BlockPattern::new(BlockState::of(ids::PLANKS)))).unwrap();

    let (outcome, effects) = dispatcher
        .run_blocking(move |world| {
            let mut effects = EffectQueue::default();
            let mut session = EditSession::new(world, None);
            let placed = tool.act(&mut session, &mut effects, BlockPos::new(1, 7, 1));
            let broken = Tool::SinglePickaxe.act(&mut session, &mut effects, BlockPos::new(2, 3, 2));
            session.finish();
            ((placed, broken), effects)
        })
        .unwrap();

    assert_eq!(outcome.0.unwrap(), ToolOutcome::Changed(1));
    assert_eq!(outcome.1.unwrap(), ToolOutcome::Changed(1));
    assert_eq!(effects.len(), 1);

    let world = dispatcher.shutdown().unwrap();
    assert_eq!(world.block(BlockPos::new(1, 7, 1)), BlockState::of(ids::PLANKS));
    assert!(world.block(BlockPos::new(2, 3, 2)).is_air());
}
