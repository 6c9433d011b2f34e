use rehost_membrane::{AddressSpace, Allocation, FreeResult, Ptr, WORD_SIZE};
use std::sync::Arc;
use std::thread;

#[derive(Clone, Copy, Debug)]
struct XorShift64 {
    state: u64,
}

impl XorShift64 {
    fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    fn next_u64(&mut self) -> u64 {
        // xorshift64*
        let mut x = self.state;
        x ^= x >> 12;
        x ^= x << 25;
        x ^= x >> 27;
        self.state = x;
        x.wrapping_mul(0x2545_F491_4F6C_DD1D)
    }

    fn gen_range_usize(&mut self, low: usize, high_inclusive: usize) -> usize {
        assert!(low <= high_inclusive);
        let span = high_inclusive - low + 1;
        low + (self.next_u64() as usize % span)
    }
}

fn assert_disjoint(live: &[Allocation], ctx: &str) {
    for pair in live.windows(2) {
        assert!(
            pair[0].padded_end() <= pair[1].padded_start(),
            "{ctx}: {:?} overlaps {:?}",
            pair[0],
            pair[1]
        );
    }
}

#[test]
fn deterministic_sequences_keep_spans_intact() {
    const SEEDS: [u64; 4] = [1, 2, 3, 4];
    const STEPS: usize = 2_000;
    const SLOTS: usize = 32;

    for seed in SEEDS {
        let space = AddressSpace::new();
        let mut rng = XorShift64::new(seed);
        let mut slots: [Option<(Ptr, usize, u8)>; SLOTS] = [None; SLOTS];

        for step in 0..STEPS {
            let op = rng.gen_range_usize(0, 99);
            let idx = rng.gen_range_usize(0, SLOTS - 1);
            match (op, slots[idx]) {
                (0..=44, None) => {
                    let size = rng.gen_range_usize(1, 512);
                    let tag = (step % 251) as u8 + 1;
                    let p = space.allocate(size, WORD_SIZE);
                    space.fill(p, tag, size);
                    // Scribble over both pads; neighbours must not notice.
                    space.fill(p.offset(-(WORD_SIZE as isize)), 0xEE, WORD_SIZE);
                    space.fill(p.add(size), 0xEE, WORD_SIZE);
                    slots[idx] = Some((p, size, tag));
                }
                (45..=79, Some((p, size, tag))) => {
                    let bytes = space.read(p, size);
                    assert!(
                        bytes.iter().all(|&b| b == tag),
                        "seed={seed} step={step}: span content corrupted"
                    );
                }
                (80..=99, Some((p, size, _))) => {
                    assert_eq!(space.release(p), FreeResult::Freed { size });
                    assert!(space.allocation(p).is_none());
                    slots[idx] = None;
                }
                _ => {}
            }
            if step % 250 == 0 {
                assert_disjoint(&space.live(), &format!("seed={seed} step={step}"));
            }
        }

        let live = slots.iter().flatten().count();
        assert_eq!(space.live_count(), live, "seed={seed}");
    }
}

#[test]
fn concurrent_allocate_release_never_overlaps() {
    const THREADS: u64 = 8;
    const ROUNDS: usize = 400;

    let space = Arc::new(AddressSpace::new());
    let handles: Vec<_> = (0..THREADS)
        .map(|t| {
            let space = Arc::clone(&space);
            thread::spawn(move || {
                let mut rng = XorShift64::new(0x9E37_79B9 + t);
                let mut mine = Vec::new();
                for round in 0..ROUNDS {
                    if mine.is_empty() || rng.gen_range_usize(0, 2) > 0 {
                        let size = rng.gen_range_usize(1, 256);
                        let p = space.allocate(size, WORD_SIZE);
                        space.fill(p, t as u8, size);
                        mine.push((p, size));
                    } else {
                        let i = rng.gen_range_usize(0, mine.len() - 1);
                        let (p, size) = mine.swap_remove(i);
                        assert!(space.read(p, size).iter().all(|&b| b == t as u8));
                        assert_eq!(space.release(p), FreeResult::Freed { size });
                    }
                    if round % 100 == 0 {
                        assert_disjoint(&space.live(), "concurrent");
                    }
                }
                mine.len()
            })
        })
        .collect();

    let remaining: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();
    assert_eq!(space.live_count(), remaining);
    assert_disjoint(&space.live(), "final");
}

#[test]
fn interior_addresses_are_never_released() {
    let space = AddressSpace::new();
    let p = space.allocate(64, WORD_SIZE);
    for off in [1usize, 8, 63] {
        assert_eq!(space.release(p.add(off)), FreeResult::Interior { base: p });
    }
    assert_eq!(
        space.release(p.offset(-1)),
        FreeResult::Interior { base: p }
    );
    assert!(space.allocation(p).is_some());
}
