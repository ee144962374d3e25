use log::info;
use ndarray::Array2;
use rand::{rngs::SmallRng, Rng, SeedableRng};

use deep_nn::{
    a_funcs::TanH,
    data::{normalization_constants, normalize, one_hot_decode, one_hot_encode, shuffle_data},
    initializer::Xavier,
    metrics::{accuracy, confusion_matrix, f1_score},
    network::LinearBuilder,
    optimizer::AdamBuilder,
    trainer::{Trainer, TrainingConfig},
};

const CLASSES: usize = 3;
const PER_CLASS: usize = 60;

/// Three noisy blobs around distinct centers.
fn blobs(rng: &mut SmallRng) -> (Array2<f32>, Vec<usize>) {
    let centers = [(0., 4.), (4., -2.), (-4., -2.)];
    let mut x = Array2::zeros((2, CLASSES * PER_CLASS));
    let mut labels = Vec::with_capacity(CLASSES * PER_CLASS);
    for (class, (cx, cy)) in centers.iter().enumerate() {
        for i in 0..PER_CLASS {
            let col = class * PER_CLASS + i;
            x[[0, col]] = cx + rng.gen_range(-1.5, 1.5);
            x[[1, col]] = cy + rng.gen_range(-1.5, 1.5);
            labels.push(class);
        }
    }
    (x, labels)
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let mut rng = SmallRng::seed_from_u64(0);
    let (x, labels) = blobs(&mut rng);
    let y = one_hot_encode(&labels, CLASSES).ok_or_else(|| anyhow::anyhow!("bad labels"))?;

    let (mean, std) =
        normalization_constants(x.view()).ok_or_else(|| anyhow::anyhow!("no examples"))?;
    let x = normalize(x.view(), mean.view(), std.view())?;
    let (x, y) = shuffle_data(x.view(), y.view(), &mut rng)?;

    let mut network = LinearBuilder::new(2)
        .layers([8, 8, CLASSES])
        .activation(TanH)
        .init(Xavier::new(1))
        .build()?;
    network.set_dropout(0.9, 7)?;

    let config = TrainingConfig {
        iterations: 100,
        step: 10,
        batch_size: Some(32),
        seed: 7,
        ..Default::default()
    };
    let mut trainer = Trainer::builder()
        .network(network, AdamBuilder::new().l_rate(0.01))?
        .config(config)
        .build()?;
    let report = trainer.train(x.view(), y.view())?;

    let confusion = confusion_matrix(y.view(), report.predictions.view())?;
    info!("Confusion matrix:\n{}", confusion);
    info!("F1 scores: {}", f1_score(confusion.view()));
    info!(
        "Accuracy {} with final cost {}",
        accuracy(confusion.view()),
        report.cost
    );
    info!(
        "First predicted labels: {:?}",
        &one_hot_decode(report.predictions.view())[..10]
    );

    let path = trainer.network().save(std::env::temp_dir().join("classify"))?;
    info!("Model written to {}", path.display());
    Ok(())
}
