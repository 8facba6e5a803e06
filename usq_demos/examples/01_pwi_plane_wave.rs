//! Plane-wave imaging sequence: a single OEM, a 128-element array, five
//! tilted wavefronts, run for 3 repetitions.

use usq_dsp::ScanRequestBuilder;
use usq_demos::fixtures::open_demo_session;

fn main() {
    env_logger::init();

    let mut session = open_demo_session(1, 128);

    let angles: Vec<f64> = vec![-0.1, -0.05, 0.0, 0.05, 0.1];
    let request = ScanRequestBuilder::new(1540.0, 5e6, 2)
        .rx_depth_range(0.0, 0.05)
        .n_repetitions(usq_dsp::Repetitions::Count(3))
        .build_pwi(angles, 0.0, 128.0);

    session.upload(&request).expect("upload failed");
    let tensor = session.run().expect("run failed");

    let (n_samp, n_channels, n_tx, n_rep) = tensor.shape();
    println!("PWI frame: {n_samp} samples x {n_channels} channels x {n_tx} angles x {n_rep} reps");
}
