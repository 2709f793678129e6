#![no_main]

use libfuzzer_sys::fuzz_target;
use overlay_harness::{ModelOverlay, Operation, RealOverlay};

fuzz_target!(|ops: Vec<Operation>| {
    let mut model = ModelOverlay::new(Some(0), Some(0));
    let mut real = RealOverlay::new(Some(0), Some(0), 0);

    for op in &ops {
        let expected = model.apply(op);
        let actual = real.apply(op);

        assert_eq!(Ok(expected), actual, "divergence on {op:?}");
        assert_eq!(model.observable_state(), &real.observable_state());
        assert!(real.store().state().is_consistent());
    }
});
