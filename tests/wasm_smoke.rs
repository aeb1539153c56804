#![cfg(target_arch = "wasm32")]

use cellula_engine::api::wasm::World;
use wasm_bindgen_test::*;

#[wasm_bindgen_test]
fn world_paints_steps_and_diffs() {
    let mut world = World::new(1, 1, 7).expect("world construction");
    assert_eq!(world.width(), 32);
    assert_eq!(world.height(), 32);

    // First diff is the full visible frame.
    assert_eq!(world.collect_diff(), 32 * 32);

    assert!(world.paint(5, 0, 1, 1, 1));
    assert_eq!(world.collect_diff(), 1);

    world.step();
    assert_eq!(world.collect_diff(), 2);
}
