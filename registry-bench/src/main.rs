use std::hint::black_box;

use hpu_registry::{DeviceRegistry, host::HostDevice};

const NAMES: usize = 100;
const ROUNDS: usize = 100_000;

fn main() {
    let registry = DeviceRegistry::new(HostDevice::new());
    let names = (0..NAMES)
        .map(|idx| format!("layer{idx}.weight"))
        .collect::<Vec<_>>();

    let start = std::time::Instant::now();
    for _ in 0..ROUNDS {
        let name = &names[fastrand::usize(..NAMES)];
        black_box(registry.hbm_alloc(0, 4096, name).unwrap());
    }
    println!("{ROUNDS} lookups over {NAMES} names: {:?}", start.elapsed());
}
