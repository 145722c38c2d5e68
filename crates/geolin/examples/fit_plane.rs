//! Fit a plane to a noisy synthetic point cloud and print the result.
//!
//! Run with: `cargo run -p geolin --example fit_plane`

use nalgebra::{Point3, Vector3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut rng = StdRng::seed_from_u64(1);
    let true_normal = Vector3::new(0.2, -0.4, 1.0).normalize();
    let origin = Point3::new(1.0, 2.0, 3.0);

    // Two in-plane directions spanning the sample patch.
    let u = true_normal.cross(&Vector3::x()).normalize();
    let v = true_normal.cross(&u);

    let points: Vec<Point3<f64>> = (0..500)
        .map(|_| {
            let s: f64 = rng.gen_range(-5.0..5.0);
            let t: f64 = rng.gen_range(-5.0..5.0);
            let noise: f64 = rng.gen_range(-0.02..0.02);
            origin + u * s + v * t + true_normal * noise
        })
        .collect();

    match geolin::fit_plane(&points, 100, 1e-12)? {
        Some(plane) => {
            println!("origin:       {:?}", plane.origin);
            println!("normal:       {:?}", plane.normal);
            println!("|cos angle|:  {:.9}", plane.normal.dot(&true_normal).abs());
            if let Some(rms) = plane.rms_distance(&points) {
                println!("rms distance: {:.6}", rms);
            }
        }
        None => println!("points do not determine a plane"),
    }
    Ok(())
}
