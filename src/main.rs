use wordsim::{Adam, Context, WeightModel, accuracy};

fn main() {
    let ctx = Context::new();

    // Two host sentences, one per class: [2 sentences, 4 features]
    let host = ctx.tensor(&[1., 0., 1., 0., 1., 1., 1., 1.], &[2, 4]);

    // Four guest sentences to classify against the hosts: [4 sentences, 4 features]
    let guest = ctx.tensor(
        &[1., 0., 1., 0., 0., 1., 0., 1., 1., 1., 1., 1., 0., 0., 0., 0.],
        &[4, 4],
    );

    // One-hot targets: guest i belongs to host class j
    let labels = ctx.tensor(&[1., 0., 1., 0., 0., 1., 0., 1.], &[4, 2]);

    let model = WeightModel::new(&ctx, &[1.0, 2.0, 1.0, 1.0]);
    let mut optimizer = Adam::new(model.params());

    let scores = model.similarity(guest, host);
    let loss = scores.softmax_cross_entropy(labels).mean();
    loss.backward();
    optimizer.step();

    // Re-evaluate with the updated weights
    ctx.zero_grad();
    let scores = model.similarity(guest, host);
    let loss = scores.softmax_cross_entropy(labels).mean();
    let train_acc = accuracy(scores, labels);

    println!(
        "Loss: {:>10.4} Training Accuracy: {:.6}",
        loss.data()[[0]],
        train_acc
    );
}
