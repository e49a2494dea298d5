#[cfg(test)]
mod property_tests {
    use muzero_classic::activations::Activation;
    use muzero_classic::layers::{DenseLayer, WeightInit};
    use muzero_classic::loss::categorical_cross_entropy;
    use muzero_classic::schedule::TemperatureSchedule;
    use muzero_classic::support::{DiscreteSupport, ScalarScaling};
    use ndarray::Array2;
    use proptest::prelude::*;

    // Strategy for generating supports with a handful to a few hundred bins
    fn support_strategy() -> impl Strategy<Value = DiscreteSupport> {
        (-300i32..=0, 0i32..=300).prop_map(|(min, max)| DiscreteSupport::new(min, max).unwrap())
    }

    // Strategy for generating a logits matrix with a matching one-hot target
    fn logits_and_targets() -> impl Strategy<Value = (Array2<f32>, Array2<f32>)> {
        (1usize..=8, 2usize..=12).prop_flat_map(|(rows, cols)| {
            (
                prop::collection::vec(-20.0f32..20.0, rows * cols),
                prop::collection::vec(0..cols, rows),
            )
                .prop_map(move |(flat, hot)| {
                    let logits = Array2::from_shape_vec((rows, cols), flat).unwrap();
                    let mut targets = Array2::zeros((rows, cols));
                    for (row, &col) in hot.iter().enumerate() {
                        targets[[row, col]] = 1.0;
                    }
                    (logits, targets)
                })
        })
    }

    proptest! {
        #[test]
        fn test_integer_round_trip(support in support_strategy(), offset in 0u32..=600) {
            let value = support.min() + (offset % support.size() as u32) as i32;
            let decoded = support.decode(support.encode(value as f32).view()).unwrap();
            prop_assert_eq!(decoded, value as f32);
        }

        #[test]
        fn test_out_of_range_clamps(support in support_strategy(), excess in 0.001f32..1e6) {
            let above = support.decode(support.encode(support.max() as f32 + excess).view()).unwrap();
            let below = support.decode(support.encode(support.min() as f32 - excess).view()).unwrap();
            prop_assert_eq!(above, support.max() as f32);
            prop_assert_eq!(below, support.min() as f32);
        }

        #[test]
        fn test_encoding_is_distribution(support in support_strategy(), value in -1000.0f32..1000.0) {
            let encoded = support.encode(value);
            prop_assert_eq!(encoded.len(), support.size());
            prop_assert!(encoded.iter().all(|&p| p >= 0.0));
            prop_assert!((encoded.sum() - 1.0).abs() < 1e-5);
            prop_assert!(encoded.iter().filter(|&&p| p > 0.0).count() <= 2);
        }

        #[test]
        fn test_in_range_decode_is_close(support in support_strategy(), t in 0.0f64..=1.0) {
            let value = (support.min() as f64 + t * (support.max() - support.min()) as f64) as f32;
            let decoded = support.decode(support.encode(value).view()).unwrap();
            prop_assert!((decoded - value).abs() < 1e-3 * (1.0 + value.abs()));
        }

        #[test]
        fn test_scaling_inverts(x in -1e4f32..1e4) {
            let scaling = ScalarScaling::muzero();
            let back = scaling.invert(scaling.apply(x));
            prop_assert!((back - x).abs() <= 1e-2 * (1.0 + x.abs()), "{} -> {}", x, back);
        }

        #[test]
        fn test_loss_rows_are_non_negative((logits, targets) in logits_and_targets()) {
            let loss = categorical_cross_entropy(logits.view(), targets.view()).unwrap();
            prop_assert_eq!(loss.len(), logits.nrows());
            prop_assert!(loss.iter().all(|&l| l >= 0.0 && l.is_finite()));
        }

        #[test]
        fn test_temperature_never_increases(total in 1usize..100_000, a in 0usize..200_000, b in 0usize..200_000) {
            let schedule = TemperatureSchedule::muzero();
            let (early, late) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(schedule.temperature(early, total) >= schedule.temperature(late, total));
        }

        #[test]
        fn test_tanh_layer_bounded(input in prop::collection::vec(-100.0f32..100.0, 1..40)) {
            let n = input.len();
            let layer = DenseLayer::new_with_init(n, 8, Activation::Tanh, WeightInit::XavierUniform);
            let batch = Array2::from_shape_vec((1, n), input).unwrap();
            let out = layer.forward_batch(batch.view()).unwrap();
            prop_assert!(out.iter().all(|&v| (-1.0..=1.0).contains(&v)));
        }
    }
}
