use super::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

#[test]
fn test_constant_initializers() {
    assert!(zeros(&[2, 2]).data().iter().all(|&x| x == 0.0));
    let c = constant(&[3], 0.1);
    assert_eq!(c.data(), &[0.1, 0.1, 0.1]);
}

#[test]
fn test_fan_in_and_fan_out() {
    assert_eq!(fan_in_and_fan_out(&[4, 3]).unwrap(), (4, 3));
    assert_eq!(fan_in_and_fan_out(&[5]).unwrap(), (5, 5));
    assert!(fan_in_and_fan_out(&[]).is_err());
    assert!(fan_in_and_fan_out(&[2, 2, 2]).is_err());
    assert!(fan_in_and_fan_out(&[0]).is_err());
    assert!(fan_in_and_fan_out(&[3, 0]).is_err());
}

#[test]
fn test_empty_or_infinite_bounds_are_errors() {
    let mut rng = StdRng::seed_from_u64(7);
    assert!(matches!(
        xavier_uniform(&[0], 1.0, &mut rng),
        Err(NeuroptError::UnsupportedOperation(_))
    ));
    assert!(kaiming_normal(&[0, 4], &mut rng).is_err());
    assert!(matches!(
        xavier_uniform(&[2, 2], f64::INFINITY, &mut rng),
        Err(NeuroptError::InvalidDistribution(_))
    ));
}

#[test]
fn test_xavier_uniform_respects_bound() {
    let mut rng = StdRng::seed_from_u64(7);
    let w = xavier_uniform(&[10, 20], 1.0, &mut rng).unwrap();
    let bound = (6.0_f64 / 30.0).sqrt();
    assert_eq!(w.shape(), &[10, 20]);
    assert!(w.data().iter().all(|&x| x.abs() < bound));
}

#[test]
fn test_seeded_initialisation_is_reproducible() {
    let a = kaiming_normal(&[8, 4], &mut StdRng::seed_from_u64(42)).unwrap();
    let b = kaiming_normal(&[8, 4], &mut StdRng::seed_from_u64(42)).unwrap();
    assert_eq!(a, b);
    let c = kaiming_normal(&[8, 4], &mut StdRng::seed_from_u64(43)).unwrap();
    assert_ne!(a, c);
}

#[test]
fn test_invalid_distribution_is_reported() {
    let mut rng = StdRng::seed_from_u64(0);
    assert!(matches!(
        normal(&[2], -1.0, &mut rng),
        Err(NeuroptError::InvalidDistribution(_))
    ));
    assert!(matches!(
        uniform(&[2], 0.0, &mut rng),
        Err(NeuroptError::InvalidDistribution(_))
    ));
}
