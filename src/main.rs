use std::io::Write;

use bvh::{BinnedSahBuilder, Builder, PlocBuilder};
use glam::vec3;
use scene::{Camera, Mesh};

const WIDTH: u32 = 1024;
const HEIGHT: u32 = 1024;

fn main() {
    let mut args = std::env::args().skip(1);
    let input = args
        .next()
        .expect("Usage: raycast <input.obj> [sah|ploc] [output.png]");
    let builder_name = args.next().unwrap_or_else(|| String::from("sah"));
    let output = args.next().unwrap_or_else(|| String::from("out.png"));

    let mesh = Mesh::load_obj(&input).expect("Could not load OBJ file.");
    assert!(!mesh.is_empty(), "No triangle was found in input OBJ file");
    println!("Loaded file with {} triangle(s)", mesh.len());

    let (bboxes, centers) = mesh.bounds_and_centers();
    let instant = std::time::Instant::now();
    let bvh = match builder_name.as_str() {
        "sah" => BinnedSahBuilder::default().build(&bboxes, &centers),
        "ploc" => PlocBuilder::default().build(&bboxes, &centers),
        other => panic!("Unknown builder: {} (expected sah or ploc)", other),
    };
    println!(
        "Built BVH with {} node(s), depth {}, in {} ms",
        bvh.nodes.len(),
        bvh.depth(),
        instant.elapsed().as_millis()
    );

    let camera = Camera::new(
        vec3(0.0, 1.0, 3.0),
        vec3(0.0, 0.0, -1.0),
        vec3(0.0, 1.0, 0.0),
    );

    let mut image = image::RgbImage::new(WIDTH, HEIGHT);
    let mut intersections = 0usize;
    print!("Rendering");
    for y in 0..HEIGHT {
        for x in 0..WIDTH {
            let u = 2.0 * x as f32 / WIDTH as f32 - 1.0;
            let v = 2.0 * y as f32 / HEIGHT as f32 - 1.0;
            let mut ray = camera.ray(u, v);

            let pixel = match bvh.traverse(&mut ray, &mesh.triangles) {
                Some(hit) => {
                    intersections += 1;
                    let i = hit.prim_index;
                    image::Rgb([
                        i.wrapping_mul(37) as u8,
                        i.wrapping_mul(91) as u8,
                        i.wrapping_mul(51) as u8,
                    ])
                }
                None => image::Rgb([0, 0, 0]),
            };
            // The camera's v axis points up; image rows grow downward.
            image.put_pixel(x, HEIGHT - 1 - y, pixel);
        }
        if y % (HEIGHT / 10) == 0 {
            print!(".");
            std::io::stdout().flush().ok();
        }
    }
    println!("\n{} intersection(s) found", intersections);

    image.save(&output).expect("Could not write output image.");
    println!("Image saved as {}", output);
}
