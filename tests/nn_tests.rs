use wordsim::{Context, WeightModel, accuracy};

#[test]
fn test_weight_matrix() {
    let ctx = Context::new();
    let model = WeightModel::new(&ctx, &[1.0, 2.0, 1.0, 1.0]);

    let m = model.weight_matrix();
    assert_eq!(m.shape(), vec![4, 4]);

    let data = m.data();
    assert_eq!(data[[0, 0]], 1.0);
    assert_eq!(data[[1, 1]], 2.0);
    assert_eq!(data[[2, 2]], 1.0);
    assert_eq!(data[[3, 3]], 1.0);
    assert_eq!(data[[0, 1]], 0.0);
    assert_eq!(data[[3, 0]], 0.0);
}

#[test]
fn test_transform_scales_features() {
    let ctx = Context::new();
    let model = WeightModel::new(&ctx, &[1.0, 2.0, 1.0, 1.0]);

    let x = ctx.tensor(&[1.0, 1.0, 1.0, 1.0], &[1, 4]);
    let y = model.transform(x);

    assert_eq!(y.shape(), vec![1, 4]);
    assert_eq!(y.data().as_slice().unwrap(), &[1.0, 2.0, 1.0, 1.0]);
}

#[test]
fn test_transform_is_linear_in_input() {
    let ctx = Context::new();
    let model = WeightModel::new(&ctx, &[0.5, 3.0, 1.0]);

    let x = ctx.tensor(&[1.0, 2.0, 4.0], &[1, 3]);
    let x_scaled = ctx.tensor(&[3.0, 6.0, 12.0], &[1, 3]);

    let y = model.transform(x).data();
    let y_scaled = model.transform(x_scaled).data();

    for j in 0..3 {
        assert_eq!(y_scaled[[0, j]], 3.0 * y[[0, j]]);
    }
}

#[test]
fn test_similarity_worked_example() {
    let ctx = Context::new();
    let host = ctx.tensor(&[1., 0., 1., 0., 1., 1., 1., 1.], &[2, 4]);
    let guest = ctx.tensor(
        &[1., 0., 1., 0., 0., 1., 0., 1., 1., 1., 1., 1., 0., 0., 0., 0.],
        &[4, 4],
    );
    let model = WeightModel::new(&ctx, &[1.0, 2.0, 1.0, 1.0]);

    let scores = model.similarity(guest, host);
    assert_eq!(scores.shape(), vec![4, 2]);
    assert_eq!(
        scores.data().as_slice().unwrap(),
        &[2.0, 2.0, 0.0, 5.0, 2.0, 7.0, 0.0, 0.0]
    );
}

#[test]
fn test_similarity_is_symmetric_in_transform() {
    let ctx = Context::new();
    let a = ctx.tensor(&[1.0, 2.0], &[1, 2]);
    let b = ctx.tensor(&[3.0, 4.0], &[1, 2]);
    let model = WeightModel::new(&ctx, &[2.0, 0.5]);

    // (Wa) . (Wb) = (Wb) . (Wa)
    let ab = model.similarity(a, b).data()[[0, 0]];
    let ba = model.similarity(b, a).data()[[0, 0]];
    assert_eq!(ab, ba);
}

#[test]
fn test_params() {
    let ctx = Context::new();
    let model = WeightModel::new(&ctx, &[1.0, 2.0, 3.0]);

    let params = model.params();
    assert_eq!(params.len(), 1);
    assert_eq!(params[0].shape(), vec![3]);
}

#[test]
fn test_random_model() {
    let ctx = Context::new();
    let model = WeightModel::random(&ctx, 6);

    assert_eq!(model.weights.shape(), vec![6]);
    for &w in model.weights.data().iter() {
        assert!((0.5..1.5).contains(&w));
    }
}

#[test]
fn test_accuracy_all_match() {
    let ctx = Context::new();
    let scores = ctx.tensor(&[0.9, 0.1, 0.2, 0.8], &[2, 2]);
    let labels = ctx.tensor(&[1.0, 0.0, 0.0, 1.0], &[2, 2]);

    assert_eq!(accuracy(scores, labels), 1.0);
}

#[test]
fn test_accuracy_none_match() {
    let ctx = Context::new();
    let scores = ctx.tensor(&[0.1, 0.9, 0.8, 0.2], &[2, 2]);
    let labels = ctx.tensor(&[1.0, 0.0, 0.0, 1.0], &[2, 2]);

    assert_eq!(accuracy(scores, labels), 0.0);
}

#[test]
fn test_accuracy_mixed() {
    let ctx = Context::new();
    let scores = ctx.tensor(&[0.9, 0.1, 0.9, 0.1], &[2, 2]);
    let labels = ctx.tensor(&[1.0, 0.0, 0.0, 1.0], &[2, 2]);

    assert_eq!(accuracy(scores, labels), 0.5);
}

#[test]
fn test_accuracy_ties_break_to_first_index() {
    let ctx = Context::new();
    // Equal scores predict column 0
    let scores = ctx.tensor(&[5.0, 5.0, 5.0, 5.0], &[2, 2]);
    let labels = ctx.tensor(&[1.0, 0.0, 0.0, 1.0], &[2, 2]);

    assert_eq!(accuracy(scores, labels), 0.5);
}
