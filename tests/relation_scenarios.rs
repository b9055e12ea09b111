use std::f64::consts::PI;

use approx::assert_abs_diff_eq;
use nalgebra::Point3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use spatial_reasoner::{
    basics::{Adjustment, PredicateCategories},
    context::Context,
    object::SpatialObject,
    predicate::{SpatialPredicate, SpatialTerms},
    relation::SpatialRelation,
    scene::Scene,
    sector::BBoxSector,
    settings,
};

fn cube(id: &str, x: f64, y: f64, z: f64, size: f64) -> SpatialObject {
    SpatialObject::new(id, Point3::new(x, y, z), size, size, size)
}

fn has(relations: &[SpatialRelation], predicate: SpatialPredicate) -> bool {
    relations.iter().any(|r| r.predicate == predicate)
}

fn random_box(rng: &mut StdRng, id: &str) -> SpatialObject {
    SpatialObject::new(
        id,
        Point3::new(
            rng.random_range(-4.0..4.0),
            rng.random_range(0.0..1.5),
            rng.random_range(-4.0..4.0),
        ),
        rng.random_range(0.1..2.0),
        rng.random_range(0.1..2.0),
        rng.random_range(0.1..2.0),
    )
    .with_angle(rng.random_range(-PI..PI))
}

#[test]
fn small_cube_inside_unit_cube() {
    let object = cube("box", 0.0, 0.0, 0.0, 1.0);
    let subject = cube("die", 0.0, 0.2, 0.0, 0.5);
    let relations = object.relate(&subject, &Context::default(), false, false, false);
    assert!(has(&relations, SpatialPredicate::Inside));
    assert!(!has(&relations, SpatialPredicate::Disjoint));
}

#[test]
fn cubes_far_apart() {
    let object = cube("a", 0.0, 0.0, 0.0, 1.0);
    let subject = cube("b", 4.2, 0.0, 0.0, 1.0);
    let relations = object.relate(&subject, &Context::default(), false, false, false);
    assert!(has(&relations, SpatialPredicate::Far));
    assert!(!has(&relations, SpatialPredicate::Near));
}

#[test]
fn sector_of_local_point() {
    let object = cube("a", 0.0, 0.0, 0.0, 1.1);
    let sector = object.sector_of(
        &Point3::new(1.2, 0.21, 1.4),
        &Adjustment::default(),
        false,
        None,
    );
    assert_eq!(sector, BBoxSector::AL);
    assert_eq!(sector.code(), "al");
}

#[test]
fn congruent_cube_with_jitter() {
    let object = cube("a", 0.0, 0.0, 0.0, 1.0);
    let subject = SpatialObject::new("b", Point3::new(0.0, -0.005, 0.0), 1.01, 1.01, 0.99);
    let relations = object.relate(&subject, &Context::default(), false, true, false);
    for predicate in [
        SpatialPredicate::Congruent,
        SpatialPredicate::SameCenter,
        SpatialPredicate::SameVolume,
        SpatialPredicate::SameCuboid,
    ] {
        assert!(has(&relations, predicate), "missing {}", predicate);
    }
}

#[test]
fn door_in_wall() {
    let wall = SpatialObject::building_element_from_vectors(
        "wall",
        "Wall",
        Point3::new(-2.0, 0.0, 0.0),
        Point3::new(2.0, 0.0, 0.0),
        2.3,
        0.25,
    );
    let door = SpatialObject::building_element_from_vectors(
        "door",
        "Door",
        Point3::new(0.4, 0.0, 0.0),
        Point3::new(1.3, 0.0, 0.0),
        2.05,
        0.25,
    );
    assert_abs_diff_eq!(wall.width, 4.0, epsilon = 1e-12);
    assert_abs_diff_eq!(door.position.z, -0.125, epsilon = 1e-12);

    let relations = wall.relate(&door, &Context::default(), false, false, false);
    for predicate in [
        SpatialPredicate::Near,
        SpatialPredicate::Inside,
        SpatialPredicate::In,
        SpatialPredicate::Aligned,
    ] {
        assert!(has(&relations, predicate), "missing {}", predicate);
    }
    assert!(!has(&relations, SpatialPredicate::Disjoint));
    // centers sit half a depth in front of the wall position
    let aligned = relations
        .iter()
        .find(|r| r.predicate == SpatialPredicate::Aligned)
        .unwrap();
    assert_abs_diff_eq!(aligned.delta, 0.125, epsilon = 1e-9);
}

#[test]
fn door_in_wall_through_scene() {
    let json = r#"[
        {"id": "wall", "type": "Wall", "position": [0.0, 0.0, -0.125], "width": 4.0, "height": 2.3, "depth": 0.25},
        {"id": "door", "type": "Door", "x": 0.85, "y": 0.0, "z": -0.125, "w": 0.9, "h": 2.05, "d": 0.25}
    ]"#;
    let mut scene = Scene::new();
    scene.load_from_json(json).unwrap();
    let wall = scene.index_of_id("wall").unwrap();
    let door = scene.index_of_id("door").unwrap();
    assert!(scene.does(door, SpatialPredicate::Inside, wall).unwrap());
    assert!(scene.does(wall, SpatialPredicate::Crossing, door).unwrap());
    assert!(!scene.does(door, SpatialPredicate::Far, wall).unwrap());
    let inside = scene.relations_with(wall, SpatialPredicate::Inside).unwrap()[0].clone();
    assert_eq!(
        scene.describe(&inside),
        format!("Door is inside Wall (inside Δ:{:.2} 𝜶:0.0°)", inside.delta)
    );
}

#[test]
fn exactly_one_of_near_and_far() {
    let mut rng = StdRng::seed_from_u64(7);
    let ctx = Context::default();
    for _ in 0..500 {
        let object = random_box(&mut rng, "obj");
        let subject = random_box(&mut rng, "subj");
        let relations = object.relate(&subject, &ctx, false, false, false);
        let near = has(&relations, SpatialPredicate::Near);
        let far = has(&relations, SpatialPredicate::Far);
        assert!(near != far, "{} / {}", object.desc(), subject.desc());
    }
}

#[test]
fn disjoint_when_spheres_apart() {
    let mut rng = StdRng::seed_from_u64(11);
    let ctx = Context::default();
    let mut checked = 0;
    for _ in 0..500 {
        let object = random_box(&mut rng, "obj");
        let subject = random_box(&mut rng, "subj");
        let distance = (subject.center() - object.center()).norm();
        if distance <= object.radius() + subject.radius() {
            continue;
        }
        checked += 1;
        let relations = object.relate(&subject, &ctx, false, false, false);
        let count = relations
            .iter()
            .filter(|r| r.predicate == SpatialPredicate::Disjoint)
            .count();
        assert_eq!(count, 1, "{} / {}", object.desc(), subject.desc());
    }
    assert!(checked > 100);
}

#[test]
fn proximity_is_symmetric() {
    let mut rng = StdRng::seed_from_u64(23);
    let ctx = Context::default();
    for _ in 0..300 {
        let a = random_box(&mut rng, "a");
        let b = random_box(&mut rng, "b");
        let forward = a.relate(&b, &ctx, false, false, false);
        let backward = b.relate(&a, &ctx, false, false, false);
        assert_eq!(
            has(&forward, SpatialPredicate::Near),
            has(&backward, SpatialPredicate::Near)
        );
        assert_eq!(
            has(&forward, SpatialPredicate::Far),
            has(&backward, SpatialPredicate::Far)
        );
        assert!(SpatialTerms::symmetric(SpatialPredicate::Near));
    }
}

#[test]
fn inside_inverts_to_containing() {
    let mut rng = StdRng::seed_from_u64(42);
    let ctx = Context::default();
    for _ in 0..200 {
        let outer = random_box(&mut rng, "outer");
        let scale = rng.random_range(0.3..0.6);
        let (width, height, depth) = (
            outer.width * scale,
            outer.height * rng.random_range(0.3..0.6),
            outer.depth * rng.random_range(0.3..0.6),
        );
        let position = Point3::new(
            outer.position.x,
            outer.position.y + (outer.height - height) / 2.0,
            outer.position.z,
        );
        let inner = SpatialObject::new("inner", position, width, height, depth)
            .with_angle(outer.angle);

        let relations = outer.relate(&inner, &ctx, false, false, false);
        assert!(has(&relations, SpatialPredicate::Inside));
        let relations = inner.relate(&outer, &ctx, false, false, false);
        assert!(has(&relations, SpatialPredicate::Containing));
        assert_eq!(
            SpatialTerms::inverse("inside"),
            SpatialPredicate::Containing
        );
    }
}

#[test]
fn left_and_right_of_aligned_cubes() {
    let a = cube("a", 0.0, 0.0, 0.0, 1.0);
    let b = cube("b", 3.0, 0.0, 0.0, 1.0);
    let ctx = Context::default();
    assert!(has(&a.relate(&b, &ctx, false, false, false), SpatialPredicate::Left));
    assert!(has(&b.relate(&a, &ctx, false, false, false), SpatialPredicate::Right));
    assert_eq!(SpatialTerms::inverse("left"), SpatialPredicate::Undefined);
}

#[test]
fn scene_json_round_trip_keeps_relations() {
    let mut scene = Scene::new();
    let table = SpatialObject::detected("table", "Table", 1.2, 0.75, 0.8)
        .with_angle(0.2);
    let mut cup = SpatialObject::detected("cup", "Cup", 0.08, 0.1, 0.08);
    cup.position = Point3::new(0.1, 0.76, 0.05);
    cup.set_data("color", serde_json::json!("blue"));
    scene.load(vec![table, cup]);
    scene.deduce_categories("topology connectivity similarity comparability");

    let before = scene.relate_all();
    let json = scene.to_json().unwrap();

    let mut copy = Scene::new();
    copy.deduce_categories("topology connectivity similarity comparability");
    copy.load_from_json(&json).unwrap();
    let after = copy.relate_all();

    let names = |relations: &[SpatialRelation]| {
        relations
            .iter()
            .map(|r| format!("{} {} {}", r.subject, r.predicate, r.object))
            .collect::<Vec<_>>()
    };
    assert_eq!(names(&before), names(&after));
    let cup = copy.object_with_id("cup").unwrap();
    assert_eq!(cup.data["color"], serde_json::json!("blue"));
    assert!(copy
        .relations_with(copy.index_of_id("table").unwrap(), SpatialPredicate::OnTop)
        .unwrap()
        .iter()
        .any(|r| r.subject == "cup"));
}

#[test]
fn settings_drive_the_scene() {
    let mut config = settings::load_default_config().unwrap();
    config.deduce = PredicateCategories::from_names("topology sectoriality");
    let mut scene = config.build_scene().unwrap();
    scene.load(vec![
        cube("a", 0.0, 0.0, 0.0, 1.0),
        cube("b", 1.5, 0.0, 1.5, 0.4),
    ]);
    assert!(scene.does(1, SpatialPredicate::Al, 0).unwrap());
    assert!(!scene.does(1, SpatialPredicate::On, 0).unwrap());
}
