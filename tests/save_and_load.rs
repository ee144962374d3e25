use deep_nn::{
    a_funcs::Activation,
    network::{FeedForward, Network},
};
use ndarray::array;

#[test]
fn save_and_load() -> anyhow::Result<()> {
    let mut network = FeedForward::new(3, &[5, 4, 2], "tanh".parse::<Activation>()?, 11)?;
    let path = network.save(std::env::temp_dir().join("deep_nn_save_and_load"))?;
    assert_eq!(path.extension().and_then(|e| e.to_str()), Some("json"));

    let mut loaded = FeedForward::from_file(&path)?;
    std::fs::remove_file(&path)?;

    let input = array![[1., -2., 0.5], [0.3, 0., 4.], [-1., 1., 2.]];
    let correct = network.predict(input.view())?.clone();
    let prediction = loaded.predict(input.view())?.clone();

    assert_eq!(
        correct, prediction,
        "Network structure damaged during saving."
    );
    assert_eq!(network.layers(), loaded.layers());
    assert_eq!(network.activation(), loaded.activation());
    Ok(())
}

#[test]
fn load_missing_file() {
    let path = std::env::temp_dir().join("deep_nn_no_such_model.json");
    assert!(FeedForward::from_file(path).is_err());
}
