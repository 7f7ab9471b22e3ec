use bvh::{BinnedSahBuilder, Builder, Bvh, Hit, PlocBuilder, Primitive, Ray};
use glam::{vec3, Vec3};
use rand::prelude::*;
use scene::{Camera, Mesh, Triangle};

fn brute_force(ray: &mut Ray, triangles: &[Triangle]) -> Option<Hit> {
    let mut hit = None;
    for (i, triangle) in triangles.iter().enumerate() {
        if triangle.intersect(ray) {
            hit = Some(Hit {
                prim_index: i as u32,
            });
        }
    }
    hit
}

fn build_both(triangles: &[Triangle]) -> (Bvh, Bvh) {
    let mesh = Mesh::new(triangles.to_vec());
    let (bboxes, centers) = mesh.bounds_and_centers();
    (
        BinnedSahBuilder::default().build(&bboxes, &centers),
        PlocBuilder::default().build(&bboxes, &centers),
    )
}

fn unit_triangle(z: f32) -> Triangle {
    Triangle::new(vec3(-1.0, -1.0, z), vec3(1.0, -1.0, z), vec3(0.0, 1.0, z))
}

// Two triangles spanning the quad [min, max] in the plane picked by `axis`.
fn quad(axis: usize, level: f32, min: (f32, f32), max: (f32, f32)) -> [Triangle; 2] {
    let point = |a: f32, b: f32| match axis {
        0 => vec3(level, a, b),
        1 => vec3(a, level, b),
        _ => vec3(a, b, level),
    };
    let p00 = point(min.0, min.1);
    let p10 = point(max.0, min.1);
    let p11 = point(max.0, max.1);
    let p01 = point(min.0, max.1);
    [
        Triangle::new(p00, p10, p11),
        Triangle::new(p00, p11, p01),
    ]
}

// A closed room with two boxes inside it, 46 triangles in all.
fn cornell_box() -> Vec<Triangle> {
    let mut triangles = Vec::new();

    // Walls, floor, ceiling, back.
    triangles.extend(quad(1, 0.0, (-2.0, -2.0), (2.0, 2.0)));
    triangles.extend(quad(1, 4.0, (-2.0, -2.0), (2.0, 2.0)));
    triangles.extend(quad(0, -2.0, (0.0, -2.0), (4.0, 2.0)));
    triangles.extend(quad(0, 2.0, (0.0, -2.0), (4.0, 2.0)));
    triangles.extend(quad(2, -2.0, (-2.0, 0.0), (2.0, 4.0)));

    // Two axis-aligned boxes standing on the floor.
    for (min, max) in [
        (vec3(-1.4, 0.0, -1.2), vec3(-0.4, 2.2, -0.2)),
        (vec3(0.3, 0.0, -0.4), vec3(1.3, 1.2, 0.6)),
    ] {
        triangles.extend(quad(0, min.x, (min.y, min.z), (max.y, max.z)));
        triangles.extend(quad(0, max.x, (min.y, min.z), (max.y, max.z)));
        triangles.extend(quad(1, min.y, (min.x, min.z), (max.x, max.z)));
        triangles.extend(quad(1, max.y, (min.x, min.z), (max.x, max.z)));
        triangles.extend(quad(2, min.z, (min.x, min.y), (max.x, max.y)));
        triangles.extend(quad(2, max.z, (min.x, min.y), (max.x, max.y)));
    }

    triangles
}

fn random_triangles(seed: u64, n: usize) -> Vec<Triangle> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut point = |range: std::ops::Range<f32>| {
        vec3(
            rng.gen_range(range.clone()),
            rng.gen_range(range.clone()),
            rng.gen_range(range),
        )
    };
    (0..n)
        .map(|_| {
            let p0 = point(-10.0..10.0);
            let e1 = point(-1.0..1.0);
            let e2 = point(-1.0..1.0);
            Triangle::new(p0, p0 + e1, p0 + e2)
        })
        .collect()
}

#[test]
fn single_triangle_hit() {
    let triangles = vec![unit_triangle(0.0)];
    for bvh in {
        let (sah, ploc) = build_both(&triangles);
        [sah, ploc]
    } {
        let mut ray = Ray::with_range(vec3(0.0, 0.0, 1.0), vec3(0.0, 0.0, -1.0), 0.0, 10.0);
        let hit = bvh.traverse(&mut ray, &triangles).unwrap();
        assert_eq!(hit.prim_index, 0);
        assert!((ray.tmax - 1.0).abs() < 1.0e-6);
    }
}

#[test]
fn miss_above_triangle_keeps_tmax() {
    let triangles = vec![unit_triangle(0.0)];
    for bvh in {
        let (sah, ploc) = build_both(&triangles);
        [sah, ploc]
    } {
        let mut ray = Ray::with_range(vec3(0.0, 2.0, 1.0), vec3(0.0, 0.0, -1.0), 0.0, 10.0);
        assert!(bvh.traverse(&mut ray, &triangles).is_none());
        assert_eq!(ray.tmax, 10.0);
    }
}

#[test]
fn closest_of_two_wins() {
    let triangles = vec![unit_triangle(0.0), unit_triangle(0.5)];
    for bvh in {
        let (sah, ploc) = build_both(&triangles);
        [sah, ploc]
    } {
        let mut ray = Ray::with_range(vec3(0.0, 0.0, 2.0), vec3(0.0, 0.0, -1.0), 0.0, 10.0);
        let hit = bvh.traverse(&mut ray, &triangles).unwrap();
        assert_eq!(hit.prim_index, 1);
        assert!((ray.tmax - 1.5).abs() < 1.0e-6);
    }
}

#[test]
fn axis_aligned_ray_misses_cleanly() {
    let triangles = vec![unit_triangle(0.0)];
    for bvh in {
        let (sah, ploc) = build_both(&triangles);
        [sah, ploc]
    } {
        let mut ray = Ray::with_range(vec3(-5.0, 0.0, 2.0), vec3(1.0, 0.0, 0.0), 0.0, 100.0);
        assert!(bvh.traverse(&mut ray, &triangles).is_none());
        assert!(ray.tmax.is_finite());
        assert_eq!(ray.tmax, 100.0);
    }
}

#[test]
fn random_soup_matches_brute_force() {
    let triangles = random_triangles(11, 200);
    let (sah, ploc) = build_both(&triangles);

    let mut rng = StdRng::seed_from_u64(12);
    for _ in 0..500 {
        let origin = vec3(
            rng.gen_range(-15.0..15.0),
            rng.gen_range(-15.0..15.0),
            rng.gen_range(-15.0..15.0),
        );
        let direction = vec3(
            rng.gen_range(-1.0..1.0),
            rng.gen_range(-1.0..1.0),
            rng.gen_range(-1.0..1.0),
        );
        if direction.length() < 1.0e-3 {
            continue;
        }

        let mut reference_ray = Ray::new(origin, direction);
        let expected = brute_force(&mut reference_ray, &triangles);

        for bvh in [&sah, &ploc] {
            let mut ray = Ray::new(origin, direction);
            let hit = bvh.traverse(&mut ray, &triangles);
            assert_eq!(hit, expected);
            assert_eq!(ray.tmax, reference_ray.tmax);
        }
    }
}

#[test]
fn cornell_box_matches_brute_force() {
    let triangles = cornell_box();
    assert!(triangles.len() >= 32);
    let (sah, ploc) = build_both(&triangles);

    // Slightly off-center so no pixel ray lines up exactly with a quad seam.
    let camera = Camera::new(vec3(0.1, 1.2, 3.0), vec3(0.0, 0.0, -1.0), vec3(0.0, 1.0, 0.0));
    let (width, height) = (64, 64);

    for bvh in [&sah, &ploc] {
        let mut hits = 0usize;
        let mut expected_hits = 0usize;
        for y in 0..height {
            for x in 0..width {
                let u = 2.0 * (x as f32 + 0.5) / width as f32 - 1.0;
                let v = 2.0 * (y as f32 + 0.5) / height as f32 - 1.0;

                let mut reference_ray = camera.ray(u, v);
                let expected = brute_force(&mut reference_ray, &triangles);
                expected_hits += expected.is_some() as usize;

                let mut ray = camera.ray(u, v);
                let hit = bvh.traverse(&mut ray, &triangles);
                hits += hit.is_some() as usize;

                assert_eq!(hit, expected);
                assert_eq!(ray.tmax, reference_ray.tmax);
            }
        }
        assert_eq!(hits, expected_hits);
        assert!(hits > 0);
    }
}

#[test]
fn builders_agree_on_hits() {
    let triangles = random_triangles(21, 150);
    let (sah, ploc) = build_both(&triangles);

    let mut rng = StdRng::seed_from_u64(22);
    for _ in 0..200 {
        let origin = vec3(
            rng.gen_range(-12.0..12.0),
            rng.gen_range(-12.0..12.0),
            rng.gen_range(-12.0..12.0),
        );
        let direction = (Vec3::ZERO - origin).normalize();

        let mut sah_ray = Ray::new(origin, direction);
        let mut ploc_ray = Ray::new(origin, direction);
        assert_eq!(
            sah.traverse(&mut sah_ray, &triangles),
            ploc.traverse(&mut ploc_ray, &triangles)
        );
        assert_eq!(sah_ray.tmax, ploc_ray.tmax);
    }
}

#[test]
fn rebuilds_are_byte_identical() {
    let triangles = cornell_box();
    let mesh = Mesh::new(triangles);
    let (bboxes, centers) = mesh.bounds_and_centers();

    let sah = BinnedSahBuilder::default();
    let a = sah.build(&bboxes, &centers);
    let b = sah.build(&bboxes, &centers);
    assert_eq!(a, b);

    let ploc = PlocBuilder::default();
    let a = ploc.build(&bboxes, &centers);
    let b = ploc.build(&bboxes, &centers);
    assert_eq!(a, b);
}

#[test]
fn save_load_roundtrip_preserves_arrays() {
    let triangles = cornell_box();
    let mesh = Mesh::new(triangles);
    let (bboxes, centers) = mesh.bounds_and_centers();
    let bvh = BinnedSahBuilder::default().build(&bboxes, &centers);

    let path = std::env::temp_dir().join("raycast_bvh_roundtrip.bin");
    bvh.save(&path).unwrap();
    let restored = Bvh::load(&path).unwrap();
    std::fs::remove_file(&path).ok();

    assert_eq!(bvh, restored);
}
