// (c) Copyright 2025 Helsing GmbH. All rights reserved.
//! Generates a reproducible editing trace for the benchmarks.
//!
//! Real edits cluster around a cursor that mostly moves forward while typing, so positions are
//! drawn as a normally distributed jump from the previous one, and a biased coin decides between
//! typing and deleting.

use rand::{SeedableRng, rngs::StdRng};
use rand_distr::{Bernoulli, Distribution, Normal};
use std::{env, fmt::Write, fs, path::Path};

const EDITS: usize = 2_000;

fn main() {
    println!("cargo::rerun-if-changed=build.rs");

    let mut rng = StdRng::seed_from_u64(0x07_5e_90);
    let jump = Normal::new(0.5, 3.0).expect("valid normal distribution");
    let typing = Bernoulli::new(0.75).expect("valid probability");

    let mut out = String::from("#[allow(dead_code)]\nconst RANDOM_EDITS: &[(bool, usize, char)] = &[\n");
    let mut cursor: f64 = 0.0;
    for i in 0..EDITS {
        cursor = (cursor + jump.sample(&mut rng)).max(0.0);
        let insert = typing.sample(&mut rng);
        let data = char::from(b'a' + (i % 26) as u8);
        writeln!(out, "    ({insert}, {}, {data:?}),", cursor.round() as usize)
            .expect("writing to a String cannot fail");
    }
    out.push_str("];\n");

    let dest = Path::new(&env::var("OUT_DIR").expect("cargo sets OUT_DIR")).join("random_edits.rs");
    fs::write(dest, out).expect("write random_edits.rs");
}
