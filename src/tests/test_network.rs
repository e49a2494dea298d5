use ndarray::{Array2, Axis};

use crate::config::{ClassicControlConfig, TrainingConfig};
use crate::env::VideoConfig;
use crate::network::{MuZeroNet, NetworkSizes};

fn cartpole_network() -> (ClassicControlConfig, MuZeroNet) {
    let mut config = ClassicControlConfig::new().with_network_sizes(NetworkSizes {
        hidden_state_size: 12,
        dynamics_hidden_size: 24,
        prediction_hidden_size: 24,
    });
    config.set_game("CartPole-v1", &VideoConfig::disabled()).unwrap();
    let network = config.get_uniform_network().unwrap();
    (config, network)
}

#[test]
fn test_networks_are_independent() {
    let (config, mut first) = cartpole_network();
    let second = config.get_uniform_network().unwrap();
    let untouched = second.weights().clone();

    for layer in &mut first.weights_mut().prediction_value {
        layer.weights.fill(0.5);
        layer.biases.fill(0.5);
    }
    assert_eq!(second.weights(), &untouched);

    let obs = Array2::from_elem((1, 4), 0.1);
    let changed = first.initial_inference(obs.view()).unwrap();
    let uniform = second.initial_inference(obs.view()).unwrap();
    assert!(changed.value_logits.iter().any(|&v| v != 0.0));
    assert!(uniform.value_logits.iter().all(|&v| v == 0.0));
}

#[test]
fn test_fresh_networks_differ_in_random_layers() {
    let (config, first) = cartpole_network();
    let second = config.get_uniform_network().unwrap();
    assert_ne!(
        first.weights().representation[0].weights,
        second.weights().representation[0].weights
    );
}

#[test]
fn test_inference_matches_transform() {
    let (config, network) = cartpole_network();
    let obs = Array2::from_shape_vec((2, 4), vec![0.0, 0.1, -0.1, 0.2, 0.05, 0.0, 0.02, -0.3]).unwrap();
    let out = network.initial_inference(obs.view()).unwrap();

    let expected = config.inverse_value_transform(out.value_logits.view()).unwrap();
    assert_eq!(out.value, expected);

    let next = network.recurrent_inference(out.hidden_state.view(), &[0, 1]).unwrap();
    let reward_logits = next.reward_logits.clone().unwrap();
    let expected_reward = config.inverse_reward_transform(reward_logits.view()).unwrap();
    assert_eq!(next.reward, expected_reward);
}

#[test]
fn test_policy_depends_on_observation() {
    let (_, network) = cartpole_network();
    let obs = Array2::from_shape_vec((2, 4), vec![1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, -1.0]).unwrap();
    let out = network.initial_inference(obs.view()).unwrap();
    let rows: Vec<_> = out.policy_logits.axis_iter(Axis(0)).collect();
    assert_ne!(rows[0], rows[1]);
}
