// This demo trains a small sigmoid network on XOR.

// Network and optimizer get set up from JSON. Run with RUST_LOG=debug to
// watch the optimizer take its steps.

use log::info;

use microdescent::{
  Array, DataSet, Model,
  config::{ NetworkConfig, OptimizerConfig },
  objective::{ accuracy, mean_loss, BinaryCrossEntropy },
};

const NETWORK: &str = r#"{
  "arity": 2,
  "layers": [
    { "width": 3, "activation": "tanh" },
    { "width": 1, "activation": "sigmoid" }
  ],
  "initializer": { "kind": "xavier", "seed": 42 }
}"#;

const OPTIMIZER: &str = r#"{
  "learning_rate": 0.05,
  "strategy": { "kind": "adam" }
}"#;

fn main() -> microdescent::Result<()> {
  env_logger::init();

  let data = DataSet::<f64>::from_f64(&[
    ([0.0, 0.0], [0.0]),
    ([0.0, 1.0], [1.0]),
    ([1.0, 0.0], [1.0]),
    ([1.0, 1.0], [0.0]),
  ])?;

  let mut network = NetworkConfig::from_json(NETWORK)?.build::<f64>()?;
  let mut optimizer = OptimizerConfig::from_json(OPTIMIZER)?.build::<f64>()?;

  for epoch in 0..2000 {
    optimizer.minimize(&mut network, &data, &BinaryCrossEntropy)?;
    if epoch % 200 == 0 {
      info!("Epoch {epoch}: loss {:.4}", mean_loss(&mut network, &data, &BinaryCrossEntropy)?);
    }
  }

  for sample in &data {
    let output = network.forward(sample.features())?;
    println!("{} -> {:.3} (expected {})", sample.features(), output.get(0), sample.targets().get(0));
  }
  println!("Accuracy: {}", accuracy(&mut network, &data)?);

  let probe = Array::vec(&[0.9, 0.1]);
  println!("{probe} -> {:.3}", network.evaluate(&probe)?.get(0));
  Ok(())
}
