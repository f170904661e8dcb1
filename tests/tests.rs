use std::f64::consts::{FRAC_PI_2, PI};
use std::sync::{Arc, Mutex};

use proptest::prelude::*;

use unisim::simulation::collisions::resolve_collisions;
use unisim::simulation::forces::accumulate_accels;
use unisim::{
    Body, EventKind, Impact, ImpactHandler, Milestone, NVec3, NewtonianGravity, OrbitalElements,
    PropagationMode, StellarStage, System, SystemParameters, TransitObject, TransitScope,
    MAX_ECCENTRICITY, SOLAR_LUMINOSITY, SOLAR_MASS,
};

const SECONDS_PER_YEAR: f64 = 365.25 * 24.0 * 3600.0;

/// System in simulation units (G = 1) with the given propagation mode
pub fn unit_system(mode: PropagationMode, softening: f64) -> System {
    System::with_parameters(
        "Test",
        SystemParameters {
            time_step: 1.0,
            propagation: mode,
            softening,
            g: 1.0,
            event_capacity: 64,
        },
    )
}

/// Stationary focus at the origin plus a planet on a circular orbit around it
pub fn orbit_system(elements: OrbitalElements) -> System {
    let mut sys = unit_system(PropagationMode::Analytic, 0.0);
    sys.add_object(Body::new("Focus", 1.0e6, 0.0));
    assert!(sys.add_planet(Body::new_planet("Planet", 1.0, 0.0), "Focus", elements));
    sys
}

/// Records every impact it is notified about
#[derive(Clone, Default)]
struct Recorder(Arc<Mutex<Vec<Impact>>>);

impl ImpactHandler for Recorder {
    fn on_impact(&mut self, impact: &Impact) {
        self.0.lock().unwrap().push(impact.clone());
    }
}

fn assert_vec_close(actual: &NVec3, expected: &NVec3, tol: f64) {
    assert!(
        (actual - expected).norm() <= tol,
        "expected {:?}, got {:?}",
        expected,
        actual
    );
}

// ==================================================================================
// Body tests
// ==================================================================================

#[test]
fn drift_moves_by_velocity_times_dt() {
    let mut b = Body::new("rock", 1.0, 1.0)
        .with_position(NVec3::new(1.0, 2.0, 3.0))
        .with_velocity(NVec3::new(0.5, -1.0, 2.0));

    b.tick(2.0);

    assert_vec_close(b.position(), &NVec3::new(2.0, 0.0, 7.0), 1e-12);
    assert_eq!(b.age(), 2.0);
}

#[test]
fn non_positive_dt_leaves_body_untouched() {
    let mut b = Body::new("rock", 1.0, 1.0)
        .with_position(NVec3::new(1.0, 2.0, 3.0))
        .with_velocity(NVec3::new(0.5, -1.0, 2.0));

    b.tick(0.0);
    b.tick(-5.0);
    b.apply_acceleration(&NVec3::new(1.0, 1.0, 1.0), 0.0);
    b.apply_acceleration(&NVec3::new(1.0, 1.0, 1.0), -1.0);

    assert_eq!(*b.position(), NVec3::new(1.0, 2.0, 3.0));
    assert_eq!(*b.velocity(), NVec3::new(0.5, -1.0, 2.0));
    assert_eq!(b.age(), 0.0);
}

#[test]
fn kinetic_energy_momentum_and_distance() {
    let a = Body::new("a", 4.0, 1.0).with_velocity(NVec3::new(3.0, 4.0, 0.0));
    let b = Body::new("b", 0.0, 1.0)
        .with_position(NVec3::new(0.0, 3.0, 4.0))
        .with_velocity(NVec3::new(9.0, 9.0, 9.0));

    assert!((a.kinetic_energy() - 50.0).abs() < 1e-12);
    assert_eq!(b.kinetic_energy(), 0.0);
    assert_vec_close(&a.momentum(), &NVec3::new(12.0, 16.0, 0.0), 1e-12);
    assert!((a.distance_to(&b) - 5.0).abs() < 1e-12);
    assert!((a.speed() - 5.0).abs() < 1e-12);
}

#[test]
fn negative_mass_and_radius_are_clamped() {
    let mut b = Body::new("ghost", -3.0, -1.0);
    assert_eq!(b.mass(), 0.0);
    assert_eq!(b.radius(), 0.0);
    b.set_mass(-1.0);
    b.set_radius(-2.0);
    assert_eq!(b.mass(), 0.0);
    assert_eq!(b.radius(), 0.0);
}

#[test]
fn destroyed_body_is_frozen() {
    let mut b = Body::new("doomed", 2.0, 1.0).with_velocity(NVec3::new(1.0, 0.0, 0.0));
    assert!(b.destroy("test"));
    assert!(!b.destroy("again"), "second destroy must be a no-op");
    assert_eq!(b.destruction_reason(), Some("test"));

    b.apply_acceleration(&NVec3::new(10.0, 10.0, 10.0), 1.0);
    b.tick(5.0);

    assert_eq!(*b.position(), NVec3::zeros());
    assert_eq!(*b.velocity(), NVec3::new(1.0, 0.0, 0.0));
    assert_eq!(b.age(), 0.0);
}

#[test]
fn type_tag_metadata_and_display() {
    let mut b = Body::new("  Ceres ", 9.4e20, 4.7e5);
    assert_eq!(b.name(), "Ceres");
    assert_eq!(b.type_tag(), "Body");

    b.set_type_tag("");
    assert_eq!(b.type_tag(), "Body");
    b.set_type_tag("DwarfPlanet");
    assert_eq!(b.to_string(), "DwarfPlanet Ceres");

    b.set_metadata("", serde_json::json!(1));
    b.set_metadata("discovered", serde_json::json!(1801));
    assert_eq!(b.all_metadata().len(), 1);
    assert_eq!(b.metadata("discovered"), Some(&serde_json::json!(1801)));
    assert!(b.metadata("missing").is_none());
}

// ==================================================================================
// Star tests
// ==================================================================================

fn sun() -> Body {
    Body::new_star("Sun", SOLAR_MASS, 6.957e8, SOLAR_LUMINOSITY, 5772.0, "G2V")
}

#[test]
fn solar_mass_star_lives_ten_billion_years() {
    let s = sun();
    let star = s.as_star().unwrap();
    let expected = 1.0e10 * SECONDS_PER_YEAR;
    assert!((star.main_sequence_lifetime() - expected).abs() / expected < 1e-12);
    assert_eq!(star.stage(), StellarStage::MainSequence);
}

#[test]
fn lifetime_follows_mass_changes() {
    let mut s = sun();
    let before = s.as_star().unwrap().main_sequence_lifetime();
    s.set_mass(2.0 * SOLAR_MASS);
    let after = s.as_star().unwrap().main_sequence_lifetime();
    assert!((after - before * 2f64.powf(-2.5)).abs() / after < 1e-12);

    s.set_mass(0.0);
    assert_eq!(s.as_star().unwrap().main_sequence_lifetime(), 0.0);
}

#[test]
fn stage_advances_with_age() {
    let mut s = sun();
    let life = s.as_star().unwrap().main_sequence_lifetime();

    assert_eq!(s.tick(0.5 * life), None);
    assert_eq!(s.as_star().unwrap().stage(), StellarStage::MainSequence);

    assert_eq!(
        s.tick(0.3 * life),
        Some(Milestone::StageChanged {
            from: StellarStage::MainSequence,
            to: StellarStage::Subgiant
        })
    );

    s.tick(0.3 * life);
    assert_eq!(s.as_star().unwrap().stage(), StellarStage::PostMainSequence);
}

#[test]
fn massless_star_has_unknown_stage() {
    let mut s = Body::new_star("Dud", 0.0, 1.0, 0.0, 0.0, "");
    assert_eq!(s.as_star().unwrap().stage(), StellarStage::Unknown);
    s.tick(1.0);
    assert_eq!(s.as_star().unwrap().stage(), StellarStage::Unknown);
}

#[test]
fn habitable_zone_and_emitted_energy() {
    let s = sun();
    let star = s.as_star().unwrap();
    let hz = star.habitable_zone();
    assert!((hz.inner - (1.0f64 / 1.1).sqrt()).abs() < 1e-12);
    assert!((hz.outer - (1.0f64 / 0.53).sqrt()).abs() < 1e-12);
    assert_eq!(star.emit_energy(2.0), 2.0 * SOLAR_LUMINOSITY);
    assert_eq!(star.emit_energy(-1.0), 0.0);

    let dark = Body::new_star("Dark", SOLAR_MASS, 1.0, 0.0, 0.0, "M");
    assert_eq!(dark.as_star().unwrap().habitable_zone().outer, 0.0);

    let text = s.star_description().unwrap();
    assert!(text.contains("Spectral class G2V"));
    assert!(text.contains("main-sequence"));
}

// ==================================================================================
// Orbit tests
// ==================================================================================

#[test]
fn circular_orbit_closes_after_one_period() {
    let mut sys = orbit_system(OrbitalElements::new(1000.0, 100.0));
    let start = *sys.object("Planet").unwrap().position();
    assert_vec_close(&start, &NVec3::new(1000.0, 0.0, 0.0), 1e-9);

    for _ in 0..10 {
        assert!(sys.tick(Some(10.0)));
    }

    let end = *sys.object("Planet").unwrap().position();
    assert_vec_close(&end, &start, 1e-6);
    assert!((sys.object("Planet").unwrap().age() - 100.0).abs() < 1e-9);
}

#[test]
fn quarter_period_is_a_quarter_turn() {
    let mut sys = orbit_system(OrbitalElements::new(1000.0, 100.0));
    sys.tick(Some(25.0));

    let p = sys.object("Planet").unwrap();
    assert_vec_close(p.position(), &NVec3::new(0.0, 1000.0, 0.0), 1e-6);
    let expected_speed = 2.0 * PI * 1000.0 / 100.0;
    assert!((p.speed() - expected_speed).abs() < 1e-9);
    assert!((p.orbit().unwrap().phase() - FRAC_PI_2).abs() < 1e-12);
}

#[test]
fn orientation_angles_rotate_the_orbit_plane() {
    // inclination tips +y onto +z
    let sys = orbit_system(
        OrbitalElements::new(1000.0, 100.0)
            .with_phase(FRAC_PI_2)
            .with_inclination(FRAC_PI_2),
    );
    assert_vec_close(sys.object("Planet").unwrap().position(), &NVec3::new(0.0, 0.0, 1000.0), 1e-9);

    // argument of periapsis turns within the plane
    let sys = orbit_system(OrbitalElements::new(1000.0, 100.0).with_argument_of_periapsis(FRAC_PI_2));
    assert_vec_close(sys.object("Planet").unwrap().position(), &NVec3::new(0.0, 1000.0, 0.0), 1e-9);

    // ascending node turns the whole plane about z
    let sys = orbit_system(OrbitalElements::new(1000.0, 100.0).with_ascending_node(PI));
    assert_vec_close(sys.object("Planet").unwrap().position(), &NVec3::new(-1000.0, 0.0, 0.0), 1e-9);
}

#[test]
fn eccentric_orbit_starts_at_periapsis_and_clamps() {
    let sys = orbit_system(OrbitalElements::new(1000.0, 100.0).with_eccentricity(0.5));
    assert_vec_close(sys.object("Planet").unwrap().position(), &NVec3::new(500.0, 0.0, 0.0), 1e-9);

    let sys = orbit_system(OrbitalElements::new(1000.0, 100.0).with_eccentricity(1.5));
    let e = sys.object("Planet").unwrap().orbit().unwrap().elements().eccentricity;
    assert_eq!(e, MAX_ECCENTRICITY);

    let sys = orbit_system(OrbitalElements::new(1000.0, 100.0).with_eccentricity(-0.3));
    let e = sys.object("Planet").unwrap().orbit().unwrap().elements().eccentricity;
    assert_eq!(e, 0.0);
}

#[test]
fn malformed_orbits_are_rejected_without_mutation() {
    let focus = Body::new("Focus", 1.0, 0.0);
    let mut planet = Body::new_planet("P", 1.0, 0.0).with_position(NVec3::new(7.0, 0.0, 0.0));

    assert!(!planet.set_orbit(&focus, OrbitalElements::new(0.0, 100.0)));
    assert!(!planet.set_orbit(&focus, OrbitalElements::new(1000.0, -1.0)));
    assert!(planet.orbit().is_none());
    assert_eq!(*planet.position(), NVec3::new(7.0, 0.0, 0.0));

    let mut rock = Body::new("Rock", 1.0, 0.0);
    assert!(!rock.set_orbit(&focus, OrbitalElements::new(1000.0, 100.0)));

    let mut sys = unit_system(PropagationMode::Analytic, 0.0);
    sys.add_object(Body::new_planet("P", 1.0, 0.0));
    assert!(!sys.set_orbit("P", "P", OrbitalElements::new(1000.0, 100.0)));
    assert!(!sys.set_orbit("P", "Nowhere", OrbitalElements::new(1000.0, 100.0)));
    assert!(!sys.add_planet(Body::new_planet("Q", 1.0, 0.0), "P", OrbitalElements::new(-1.0, 100.0)));
    assert!(sys.has_object("Q"), "planet stays registered when its orbit is rejected");
}

#[test]
fn detached_planet_drifts_with_its_orbit_kept() {
    let focus = Body::new("Focus", 1.0, 0.0);
    let mut planet = Body::new_planet("P", 1.0, 0.0);
    assert!(planet.set_orbit(&focus, OrbitalElements::new(1000.0, 100.0)));
    let (x0, v0) = (*planet.position(), *planet.velocity());

    planet.tick(10.0);

    assert_eq!(*planet.position(), x0 + v0 * 10.0);
    assert_eq!(planet.orbit().unwrap().phase(), 0.0);
    assert_eq!(planet.age(), 10.0);
}

#[test]
fn moving_focus_drags_its_satellite() {
    let mut sys = unit_system(PropagationMode::Analytic, 0.0);
    sys.add_object(Body::new("Focus", 1.0e6, 0.0).with_velocity(NVec3::new(10.0, 0.0, 0.0)));
    // period long enough that the phase barely moves in one tick
    sys.add_planet(Body::new_planet("Planet", 1.0, 0.0), "Focus", OrbitalElements::new(1000.0, 1.0e12));

    sys.tick(Some(1.0));

    let focus = *sys.object("Focus").unwrap().position();
    let planet = sys.object("Planet").unwrap();
    assert_vec_close(&focus, &NVec3::new(10.0, 0.0, 0.0), 1e-12);
    assert_vec_close(planet.position(), &NVec3::new(1010.0, 0.0, 0.0), 1e-6);
    assert!((planet.velocity().x - 10.0).abs() < 1e-9);
}

#[test]
fn numerical_mode_ignores_orbits() {
    let mut sys = unit_system(PropagationMode::Numerical, 0.0);
    sys.set_gravitational_constant(0.0);
    sys.add_object(Body::new("Focus", 1.0, 0.0));
    sys.add_planet(Body::new_planet("Planet", 1.0, 0.0), "Focus", OrbitalElements::new(1000.0, 100.0));

    let v = *sys.object("Planet").unwrap().velocity();
    sys.tick(Some(10.0));

    // with G = 0 the planet just drifts along its initial velocity
    let p = sys.object("Planet").unwrap();
    assert_vec_close(p.position(), &(NVec3::new(1000.0, 0.0, 0.0) + v * 10.0), 1e-9);
    assert_eq!(p.orbit().unwrap().phase(), 0.0);
}

// ==================================================================================
// Transit tests
// ==================================================================================

fn probe(travel_time: f64) -> Body {
    let t = TransitObject::new(NVec3::zeros(), NVec3::new(100.0, 0.0, 0.0), travel_time, TransitScope::Intersystem)
        .with_propulsion("ion")
        .with_shape("cylinder");
    Body::new_transit("Probe", 1000.0, 0.0, t)
}

#[test]
fn transit_interpolates_and_derives_velocity() {
    let mut p = probe(10.0);
    assert!(!p.advance_transit(4.0));

    let t = p.as_transit().unwrap();
    assert!((t.progress() - 0.4).abs() < 1e-12);
    assert_vec_close(p.position(), &NVec3::new(40.0, 0.0, 0.0), 1e-12);
    assert_vec_close(p.velocity(), &NVec3::new(10.0, 0.0, 0.0), 1e-12);
}

#[test]
fn transit_pins_to_destination_then_only_ages() {
    let mut p = probe(10.0);
    p.advance_transit(4.0);
    assert!(p.advance_transit(10.0), "overshooting step completes the trip");

    assert!(p.as_transit().unwrap().is_complete());
    assert_eq!(p.as_transit().unwrap().progress(), 1.0);
    assert_eq!(*p.position(), NVec3::new(100.0, 0.0, 0.0));
    assert_eq!(p.age(), 10.0);

    assert!(!p.advance_transit(5.0));
    assert_eq!(*p.position(), NVec3::new(100.0, 0.0, 0.0));
    assert_eq!(p.age(), 15.0);
}

#[test]
fn zero_length_transit_starts_complete() {
    let p = probe(0.0);
    let t = p.as_transit().unwrap();
    assert!(t.is_complete());
    assert_eq!(t.progress(), 1.0);
    assert_eq!(*p.position(), NVec3::new(100.0, 0.0, 0.0));
}

#[test]
fn transit_ignores_gravity_and_reports_arrival() {
    let mut sys = unit_system(PropagationMode::Numerical, 0.0);
    sys.add_object(Body::new("Heavy", 1.0e9, 0.0).with_position(NVec3::new(50.0, 10.0, 0.0)));
    let mut p = probe(10.0);
    p.as_transit_mut().unwrap().set_endpoints("Earth", "L2");
    sys.add_object(p);

    sys.tick(Some(5.0));
    let p = sys.object("Probe").unwrap();
    assert_vec_close(p.position(), &NVec3::new(50.0, 0.0, 0.0), 1e-9);
    assert_vec_close(p.velocity(), &NVec3::new(10.0, 0.0, 0.0), 1e-9);

    sys.tick(Some(5.0));
    let arrived = sys
        .recent_events(None)
        .into_iter()
        .any(|e| e.kind == EventKind::TransitArrival { object: "Probe".to_string() });
    assert!(arrived);
    assert!(sys.object("Probe").unwrap().as_transit().unwrap().description().contains("to L2"));
}

// ==================================================================================
// Gravity tests
// ==================================================================================

/// Two bodies separated along the x-axis
fn two_bodies(dist: f64, m1: f64, m2: f64) -> Vec<Body> {
    vec![
        Body::new("b1", m1, 0.0).with_position(NVec3::new(-dist / 2.0, 0.0, 0.0)),
        Body::new("b2", m2, 0.0).with_position(NVec3::new(dist / 2.0, 0.0, 0.0)),
    ]
}

#[test]
fn gravity_newton_third_law() {
    let bodies = two_bodies(1.0, 2.0, 3.0);
    let gravity = NewtonianGravity { g: 0.1, softening: 0.0 };

    let mut acc = vec![NVec3::zeros(); 2];
    accumulate_accels(&gravity, &bodies, &mut acc);

    let net = acc[0] * 2.0 + acc[1] * 3.0;
    assert!(net.norm() < 1e-12, "Net momentum not zero: {:?}", net);
    assert!(acc[0].x > 0.0, "Acceleration is not toward second body");
}

#[test]
fn gravity_inverse_square_law() {
    let gravity = NewtonianGravity { g: 0.1, softening: 0.0 };
    let mut acc_r = vec![NVec3::zeros(); 2];
    let mut acc_2r = vec![NVec3::zeros(); 2];

    accumulate_accels(&gravity, &two_bodies(1.0, 1.0, 1.0), &mut acc_r);
    accumulate_accels(&gravity, &two_bodies(2.0, 1.0, 1.0), &mut acc_2r);

    let ratio = acc_r[0].norm() / acc_2r[0].norm();
    assert!((ratio - 4.0).abs() < 1e-9, "Expected 4x, got {}", ratio);
}

#[test]
fn softening_keeps_coincident_bodies_finite() {
    let gravity = NewtonianGravity { g: 1.0, softening: 0.1 };

    for dist in [0.0, 1e-12] {
        let mut acc = vec![NVec3::zeros(); 2];
        accumulate_accels(&gravity, &two_bodies(dist, 1.0, 1.0), &mut acc);
        for a in &acc {
            assert!(a.iter().all(|c| c.is_finite()), "non-finite acceleration {:?}", a);
            assert!(a.norm() <= 1.0 / 0.01 + 1e-9);
        }
    }

    let mut sys = unit_system(PropagationMode::Numerical, 0.1);
    sys.add_object(Body::new("a", 1.0, 0.0));
    sys.add_object(Body::new("b", 1.0, 0.0));
    sys.advance(10, Some(0.1));
    for b in sys.objects() {
        assert!(b.position().iter().chain(b.velocity().iter()).all(|c| c.is_finite()));
    }
}

#[test]
fn two_body_energy_and_momentum_are_conserved() {
    let mut sys = unit_system(PropagationMode::Numerical, 0.0);
    let (big, small) = (1.0, 1.0e-3);
    let total = big + small;
    let v_rel = (total / 1.0f64).sqrt(); // circular relative speed at r = 1

    sys.add_object(Body::new("Primary", big, 0.0).with_velocity(NVec3::new(0.0, -v_rel * small / total, 0.0)));
    sys.add_object(
        Body::new("Secondary", small, 0.0)
            .with_position(NVec3::new(1.0, 0.0, 0.0))
            .with_velocity(NVec3::new(0.0, v_rel * big / total, 0.0)),
    );

    let e0 = sys.total_energy().total;
    let vcm0 = sys.center_of_mass_velocity();
    assert!(e0 < 0.0, "bound orbit must have negative energy");

    let mut worst: f64 = 0.0;
    for _ in 0..5000 {
        sys.tick(Some(1.0e-3));
        let e = sys.total_energy().total;
        worst = worst.max(((e - e0) / e0).abs());
    }

    assert!(worst < 0.01, "energy drifted by {:.4}%", worst * 100.0);
    assert_vec_close(&sys.center_of_mass_velocity(), &vcm0, 1e-12);
    assert_eq!(sys.count_objects(), 2);
}

// ==================================================================================
// Collision tests
// ==================================================================================

#[test]
fn merge_conserves_mass_and_momentum() {
    let mut bodies = vec![
        Body::new("light", 10.0, 1.0).with_velocity(NVec3::new(1.0, 0.0, 0.0)),
        Body::new("heavy", 30.0, 1.0).with_velocity(NVec3::new(0.0, 1.0, 0.0)),
    ];

    let (collisions, removed) = resolve_collisions(&mut bodies);

    assert_eq!(bodies.len(), 1);
    let survivor = &bodies[0];
    assert_eq!(survivor.name(), "heavy");
    assert_eq!(survivor.mass(), 40.0);
    assert_vec_close(survivor.velocity(), &NVec3::new(0.25, 0.75, 0.0), 1e-12);
    assert!((survivor.radius() - 2f64.cbrt()).abs() < 1e-12);

    assert_eq!(removed.len(), 1);
    assert!(removed[0].is_destroyed());
    assert_eq!(removed[0].destruction_reason(), Some("absorbed by heavy"));

    // reduced mass 7.5, |dv|^2 = 2
    assert_eq!(collisions.len(), 1);
    assert!((collisions[0].energy - 7.5).abs() < 1e-12);
    assert!((collisions[0].relative_speed - 2f64.sqrt()).abs() < 1e-12);
}

#[test]
fn collision_in_tick_notifies_both_and_logs() {
    let recorder = Recorder::default();
    let mut light = Body::new("light", 10.0, 1.0).with_velocity(NVec3::new(1.0, 0.0, 0.0));
    let mut heavy = Body::new("heavy", 30.0, 1.0).with_velocity(NVec3::new(0.0, 1.0, 0.0));
    light.set_impact_handler(recorder.clone());
    heavy.set_impact_handler(recorder.clone());

    let mut sys = unit_system(PropagationMode::Analytic, 0.0);
    sys.add_object(light);
    sys.add_object(heavy);
    assert!(sys.tick(Some(0.01)));

    assert_eq!(sys.count_objects(), 1);
    assert!(!sys.has_object("light"));
    let survivor = sys.object("heavy").unwrap();
    assert_vec_close(survivor.position(), &NVec3::new(0.0025, 0.0075, 0.0), 1e-12);
    assert_vec_close(survivor.velocity(), &NVec3::new(0.25, 0.75, 0.0), 1e-12);

    let impacts = recorder.0.lock().unwrap();
    assert_eq!(impacts.len(), 2);
    assert!(impacts.iter().any(|i| i.body == "heavy" && i.impactor == "light" && i.impactor_mass == 10.0));
    assert!(impacts.iter().any(|i| i.body == "light" && i.impactor == "heavy" && i.impactor_mass == 30.0));
    assert!(impacts.iter().all(|i| (i.energy - 7.5).abs() < 1e-12));

    match &sys.recent_events(Some(1))[0].kind {
        EventKind::Collision { objects, survivor, energy, .. } => {
            assert_eq!(objects, &["light".to_string(), "heavy".to_string()]);
            assert_eq!(survivor, "heavy");
            assert!((energy - 7.5).abs() < 1e-12);
        }
        other => panic!("expected a collision event, got {:?}", other),
    }
}

#[test]
fn equal_masses_favor_earlier_registration() {
    let mut bodies = vec![Body::new("first", 5.0, 1.0), Body::new("second", 5.0, 1.0)];
    resolve_collisions(&mut bodies);
    assert_eq!(bodies.len(), 1);
    assert_eq!(bodies[0].name(), "first");
}

#[test]
fn zero_radius_bodies_never_collide() {
    let mut bodies = vec![Body::new("a", 1.0, 0.0), Body::new("b", 1.0, 1.0)];
    let (collisions, removed) = resolve_collisions(&mut bodies);
    assert!(collisions.is_empty());
    assert!(removed.is_empty());
    assert_eq!(bodies.len(), 2);
}

#[test]
fn merges_recheck_overlap_after_earlier_merges() {
    // light + mid overlap, mid + heavy overlap; the first merge pulls mid out of heavy's reach
    let mut bodies = vec![
        Body::new("light", 9.0, 1.0).with_position(NVec3::new(-1.9, 0.0, 0.0)),
        Body::new("mid", 10.0, 1.0),
        Body::new("heavy", 100.0, 1.0).with_position(NVec3::new(1.9, 0.0, 0.0)),
    ];

    let (collisions, removed) = resolve_collisions(&mut bodies);

    assert_eq!(collisions.len(), 1);
    assert_eq!(removed.len(), 1);
    assert_eq!(removed[0].name(), "light");
    assert_eq!(bodies.len(), 2);
    assert_eq!(bodies[0].name(), "mid");
    assert_eq!(bodies[0].mass(), 19.0);
    assert_vec_close(bodies[0].position(), &NVec3::new(-0.9, 0.0, 0.0), 1e-12);
    assert_eq!(bodies[1].name(), "heavy");
    assert_eq!(bodies[1].mass(), 100.0);
}

#[test]
fn absorbing_star_keeps_primary_and_updates_lifetime() {
    let mut sys = unit_system(PropagationMode::Analytic, 0.0);
    sys.set_primary_star(Body::new_star("Small", 1.0, 1.0, 0.0, 0.0, "M"));
    sys.add_object(Body::new_star("Big", SOLAR_MASS, 1.0, 0.0, 0.0, "G"));

    sys.tick(Some(1.0));

    assert_eq!(sys.count_objects(), 1);
    let primary = sys.primary_star().unwrap();
    assert_eq!(primary.name(), "Big");
    let expected = unisim::simulation::star::estimate_main_sequence_lifetime(SOLAR_MASS + 1.0);
    assert_eq!(primary.as_star().unwrap().main_sequence_lifetime(), expected);
}

// ==================================================================================
// System tests
// ==================================================================================

#[test]
fn duplicate_registration_replaces_and_detaches() {
    let mut sys = System::new("Sys");
    assert!(sys.add_object(Body::new("X", 1.0, 0.0)).is_none());
    let old = sys.add_object(Body::new("X", 2.0, 0.0)).expect("old body returned");

    assert_eq!(old.mass(), 1.0);
    assert!(old.parent_system().is_none());
    assert_eq!(sys.count_objects(), 1);
    let current = sys.object("X").unwrap();
    assert_eq!(current.mass(), 2.0);
    assert_eq!(current.parent_system(), Some("Sys"));
    assert!(sys
        .recent_events(None)
        .iter()
        .any(|e| e.kind == EventKind::Replacement { object: "X".to_string() }));
}

#[test]
fn remove_object_detaches_and_clears_primary() {
    let mut sys = System::new("Sys");
    sys.set_primary_star(sun());
    assert_eq!(sys.primary_star().unwrap().name(), "Sun");

    let removed = sys.remove_object("Sun").unwrap();
    assert!(!removed.is_bound_to_system());
    assert!(sys.primary_star().is_none());
    assert!(sys.remove_object("Sun").is_none());
    assert_eq!(sys.count_objects(), 0);
}

#[test]
fn non_positive_ticks_are_ignored() {
    let mut sys = unit_system(PropagationMode::Analytic, 0.0);
    sys.add_object(Body::new("a", 1.0, 0.0).with_velocity(NVec3::new(1.0, 0.0, 0.0)));

    assert!(!sys.tick(Some(0.0)));
    assert!(!sys.tick(Some(-1.0)));
    assert_eq!(sys.age(), 0.0);
    assert_eq!(*sys.object("a").unwrap().position(), NVec3::zeros());

    assert!(!sys.set_time_step(0.0));
    assert_eq!(sys.time_step(), 1.0);
    assert!(!sys.set_gravity_softening_length(-1.0));
    assert_eq!(sys.gravity_softening_length(), 0.0);

    assert!(sys.set_time_step(2.0));
    assert!(sys.tick(None));
    assert_eq!(sys.age(), 2.0);
    assert_eq!(sys.advance(3, None), 3);
    assert_eq!(sys.age(), 8.0);
    assert_eq!(sys.advance(3, Some(-1.0)), 0);
}

#[test]
fn propagation_mode_switches_at_any_time() {
    let mut sys = System::new("Sys");
    assert_eq!(sys.propagation_mode(), PropagationMode::Analytic);
    sys.set_propagation_mode(PropagationMode::Numerical);
    assert_eq!(sys.propagation_mode(), PropagationMode::Numerical);
    assert!(sys.set_gravity_softening_length(0.5));
    assert_eq!(sys.gravity_softening_length(), 0.5);
}

#[test]
fn event_log_is_bounded_and_newest_first() {
    let mut sys = System::with_parameters(
        "Sys",
        SystemParameters {
            event_capacity: 3,
            ..SystemParameters::default()
        },
    );
    for i in 0..5 {
        sys.add_object(Body::new(&format!("b{i}"), 1.0, 0.0));
    }

    let events = sys.recent_events(None);
    assert_eq!(events.len(), 3);
    let names: Vec<_> = events
        .iter()
        .map(|e| match &e.kind {
            EventKind::Formation { object, .. } => object.clone(),
            other => panic!("unexpected event {:?}", other),
        })
        .collect();
    assert_eq!(names, ["b4", "b3", "b2"]);
    assert_eq!(sys.recent_events(Some(2)).len(), 2);
}

#[test]
fn center_of_mass_and_energy_report() {
    let mut sys = unit_system(PropagationMode::Analytic, 0.0);
    assert_eq!(sys.center_of_mass(), NVec3::zeros());

    sys.add_object(Body::new("a", 1.0, 0.0).with_velocity(NVec3::new(2.0, 0.0, 0.0)));
    sys.add_object(Body::new("b", 3.0, 0.0).with_position(NVec3::new(4.0, 0.0, 0.0)));
    sys.add_object(Body::new("massless", 0.0, 0.0).with_position(NVec3::new(4.0, 0.0, 0.0)));
    assert_vec_close(&sys.center_of_mass(), &NVec3::new(3.0, 0.0, 0.0), 1e-12);

    let report = sys.total_energy();
    assert!((report.kinetic - 2.0).abs() < 1e-12);
    assert!((report.potential - (-0.75)).abs() < 1e-12);
    assert!((report.total - 1.25).abs() < 1e-12);
}

#[test]
fn coincident_pairs_are_skipped_in_potential() {
    let mut sys = unit_system(PropagationMode::Analytic, 0.0);
    sys.add_object(Body::new("a", 1.0, 0.0));
    sys.add_object(Body::new("b", 1.0, 0.0));
    let report = sys.total_energy();
    assert_eq!(report.potential, 0.0);
    assert!(report.total.is_finite());
}

#[test]
fn snapshot_reports_every_body() {
    let mut sys = System::new("Sys");
    sys.set_primary_star(sun());
    sys.add_object(probe(10.0));

    let snap = sys.snapshot_state();
    assert_eq!(snap.len(), 2);
    assert_eq!(snap["Sun"].kind, "Star");
    assert_eq!(snap["Sun"].mass, SOLAR_MASS);
    assert_eq!(snap["Probe"].kind, "TransitObject");
    assert_eq!(snap["Probe"].position, [0.0, 0.0, 0.0]);
    assert_eq!(sys.planets().count(), 0);
}

#[test]
fn destroyed_bodies_drop_out_of_every_pass() {
    let mut sys = unit_system(PropagationMode::Numerical, 0.0);
    sys.add_object(Body::new("A", 1.0, 1.0));
    sys.add_object(Body::new("B", 1.0, 1.0).with_position(NVec3::new(1.0, 0.0, 0.0)));
    assert!(sys.object_mut("A").unwrap().destroy("test"));

    assert!(sys.tick(Some(0.1)));

    // no pull from A, no merge despite the overlap
    let b = sys.object("B").unwrap();
    assert_eq!(*b.velocity(), NVec3::zeros());
    assert_eq!(*b.position(), NVec3::new(1.0, 0.0, 0.0));
    assert_eq!(b.mass(), 1.0);
    assert_eq!(sys.count_objects(), 2);
    assert!(!sys
        .recent_events(None)
        .iter()
        .any(|e| matches!(e.kind, EventKind::Collision { .. })));

    assert_eq!(sys.total_energy().potential, 0.0);
    assert_eq!(sys.center_of_mass(), NVec3::new(1.0, 0.0, 0.0));
}

#[test]
fn tick_records_stage_transitions() {
    let mut sys = System::new("Sys");
    sys.set_primary_star(sun());
    let life = sys.primary_star().unwrap().as_star().unwrap().main_sequence_lifetime();

    assert!(sys.tick(Some(0.8 * life)));

    let latest = &sys.recent_events(Some(1))[0];
    assert_eq!(latest.age, 0.8 * life);
    assert_eq!(latest.age, sys.age());
    assert_eq!(
        latest.kind,
        EventKind::StageTransition {
            object: "Sun".to_string(),
            from: StellarStage::MainSequence,
            to: StellarStage::Subgiant,
        }
    );
}

#[test]
fn gravitational_parameter_uses_system_constant() {
    let mut sys = unit_system(PropagationMode::Numerical, 0.0);
    sys.add_object(Body::new("rock", 5.0, 0.0));

    assert_eq!(sys.gravitational_parameter("rock"), Some(5.0));
    assert_eq!(sys.gravitational_parameter("missing"), None);
    assert!(sys.set_gravitational_constant(2.0));
    assert_eq!(sys.gravitational_parameter("rock"), Some(10.0));
    assert_eq!(sys.object("rock").unwrap().gravitational_parameter(3.0), 15.0);
}

// ==================================================================================
// Property tests
// ==================================================================================

proptest! {
    #[test]
    fn drift_is_exact_forward_euler(
        x in prop::array::uniform3(-1.0e6f64..1.0e6),
        v in prop::array::uniform3(-1.0e3f64..1.0e3),
        dt in 1.0e-3f64..1.0e3,
    ) {
        let x = NVec3::from(x);
        let v = NVec3::from(v);
        let mut b = Body::new("p", 1.0, 0.0).with_position(x).with_velocity(v);
        b.tick(dt);
        prop_assert_eq!(*b.position(), x + v * dt);
        prop_assert_eq!(b.age(), dt);
    }

    #[test]
    fn transit_progress_is_monotone_and_bounded(
        travel_time in 1.0f64..1.0e4,
        steps in prop::collection::vec(0.0f64..5.0e3, 1..20),
    ) {
        let t = TransitObject::new(NVec3::zeros(), NVec3::new(1.0, 2.0, 3.0), travel_time, TransitScope::Intergalactic);
        let mut body = Body::new_transit("t", 1.0, 0.0, t);
        let mut last = 0.0;
        let mut total = 0.0;
        for dt in steps {
            body.advance_transit(dt);
            total += dt;
            let p = body.as_transit().unwrap().progress();
            prop_assert!(p >= last);
            prop_assert!((0.0..=1.0).contains(&p));
            last = p;
        }
        if total >= travel_time {
            prop_assert!(body.as_transit().unwrap().is_complete());
            prop_assert_eq!(*body.position(), NVec3::new(1.0, 2.0, 3.0));
        }
    }
}
