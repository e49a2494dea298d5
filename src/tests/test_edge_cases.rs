use ndarray::{array, Array1};

use crate::env::{Acrobot, EnvRegistry, Environment, MountainCar, TimeLimit};
use crate::error::Error;
use crate::game::ClassicControlWrapper;
use crate::support::DiscreteSupport;

#[test]
fn test_support_extremes() {
    let support = DiscreteSupport::new(-200, 200).unwrap();
    for value in [f32::INFINITY, 1e9, 200.0] {
        assert_eq!(support.decode(support.encode(value).view()).unwrap(), 200.0);
    }
    assert_eq!(support.decode(support.encode(f32::NEG_INFINITY).view()).unwrap(), -200.0);
    assert_eq!(support.decode(support.encode(f32::NAN).view()).unwrap(), 0.0);
}

#[test]
fn test_decode_wrong_length() {
    let support = DiscreteSupport::new(0, 3).unwrap();
    let probs: Array1<f32> = array![0.5, 0.5];
    assert!(matches!(support.decode(probs.view()), Err(Error::DimensionMismatch { .. })));
}

#[test]
fn test_game_step_after_truncation() {
    let env = Box::new(TimeLimit::new(MountainCar::new(), 6));
    let mut game = ClassicControlWrapper::new(env, 1.0, 4).unwrap();
    game.reset();

    let first = game.step(1).unwrap();
    assert_eq!(first.inner_steps, 4);
    assert_eq!(first.reward, -4.0);

    let second = game.step(1).unwrap();
    assert_eq!(second.inner_steps, 2);
    assert!(second.truncated);
    assert!(!second.terminated);
    assert!(game.is_terminal());

    assert!(matches!(game.step(0), Err(Error::Precondition(_))));
    game.reset();
    assert!(game.is_empty());
    assert!(game.step(0).is_ok());
}

#[test]
fn test_game_rejects_invalid_action() {
    let mut game = ClassicControlWrapper::new(Box::new(Acrobot::new()), 0.99, 4).unwrap();
    game.reset();
    assert!(matches!(
        game.step(3),
        Err(Error::InvalidAction { action: 3, max_actions: 3 })
    ));
    assert!(game.is_empty());
}

#[test]
fn test_registry_unknown_lists_known_ids() {
    let registry = EnvRegistry::classic_control();
    match registry.make("LunarLander-v2") {
        Err(Error::UnknownEnvironment { id, known }) => {
            assert_eq!(id, "LunarLander-v2");
            assert!(known.contains("CartPole-v1"));
            assert!(known.contains("Acrobot-v1"));
        }
        other => panic!("expected unknown environment, got {:?}", other.map(|e| e.id().to_string())),
    }
}

#[test]
fn test_zero_discount_rejected() {
    let env: Box<dyn Environment> = Box::new(MountainCar::new());
    assert!(ClassicControlWrapper::new(env, 0.0, 4).is_err());
}
