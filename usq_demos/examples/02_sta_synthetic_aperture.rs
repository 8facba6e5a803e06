//! Synthetic transmit aperture sequence: two OEMs, a 192-element array,
//! eleven small transmit sub-apertures stepped across the probe.

use usq_dsp::{ApertureSize, ScanRequestBuilder};
use usq_demos::fixtures::open_demo_session;

fn main() {
    env_logger::init();

    let mut session = open_demo_session(2, 192);

    let centers: Vec<f64> = (0..11).map(|i| (i as f64 - 5.0) * 3e-3).collect();
    let request = ScanRequestBuilder::new(1540.0, 5e6, 2)
        .rx_depth_range(0.0, 0.08)
        .build_sta(centers, ApertureSize::Scalar(32.0), -6e-3, 0.0);

    session.upload(&request).expect("upload failed");
    let tensor = session.run().expect("run failed");

    let (n_samp, n_channels, n_tx, n_rep) = tensor.shape();
    println!("STA frame: {n_samp} samples x {n_channels} channels x {n_tx} sub-apertures x {n_rep} rep");
}
