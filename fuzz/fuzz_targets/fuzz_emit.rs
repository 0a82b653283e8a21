#![no_main]
use libfuzzer_sys::fuzz_target;

use ltlmon_codegen::{generate_json, generate_monitor, MonitorOptions};
use ltlmon_ir::{Automaton, Guard, PropositionTable};

/// Decode bytes into an automaton that may or may not satisfy `validate`.
fn decode(data: &[u8]) -> Option<Automaton> {
    let (&head, rest) = data.split_first()?;
    let nprops = usize::from(head % 5);
    let nstates = usize::from(head >> 5) + 1;
    let props = PropositionTable::new((0..nprops).map(|i| format!("p{i}"))).ok()?;
    let mut ba = Automaton::new(props, 1);

    let mut bytes = rest.iter().copied();
    for _ in 0..nstates {
        let b = bytes.next()?;
        ba.add_state(i32::from(b % 6) - 1, i32::from(b >> 6));
    }
    while let (Some(from), Some(to), Some(pos), Some(neg)) =
        (bytes.next(), bytes.next(), bytes.next(), bytes.next())
    {
        // Out-of-range destinations and guard bits are left for `validate` to reject.
        ba.add_transition(
            usize::from(from) % nstates,
            Guard::new(u32::from(pos), u32::from(neg)),
            usize::from(to % 9),
        );
    }
    Some(ba)
}

fuzz_target!(|data: &[u8]| {
    if let Some(ba) = decode(data) {
        let valid = ba.validate().is_ok();
        let monitor = generate_monitor(&ba, &MonitorOptions::default());
        let json = generate_json(&ba);
        assert_eq!(valid, monitor.is_ok());
        assert_eq!(valid, json.is_ok());
    }
});
