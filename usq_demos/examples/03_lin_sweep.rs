//! Linear, per-line focused acquisition sweeping a focused 32-element
//! aperture across a 192-element array, driven through `run_loop` for a
//! fixed number of frames.

use std::cell::Cell;

use usq_dsp::{ApertureSize, ScanRequestBuilder};
use usq_demos::fixtures::open_demo_session;

fn main() {
    env_logger::init();

    let mut session = open_demo_session(2, 192);

    let centers: Vec<f64> = (1..=192).map(|e| e as f64).collect();
    let request = ScanRequestBuilder::new(1540.0, 5e6, 2)
        .rx_depth_range(0.0, 0.04)
        .build_lin(centers, ApertureSize::Scalar(32.0), 0.02);

    session.upload(&request).expect("upload failed");

    let frames_remaining = Cell::new(3u32);
    session
        .run_loop(
            || {
                let remaining = frames_remaining.get();
                if remaining == 0 {
                    false
                } else {
                    frames_remaining.set(remaining - 1);
                    true
                }
            },
            |tensor| {
                let (n_samp, n_channels, n_tx, _) = tensor.shape();
                println!("LIN frame: {n_samp} samples x {n_channels} channels x {n_tx} lines");
            },
        )
        .expect("run_loop failed");
}
