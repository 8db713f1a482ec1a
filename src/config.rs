//! JSON configuration for optimizers and networks.
//!
//! Hyperparameters are read as host doubles and converted into the target
//! precision when a component is built. Every hyperparameter that is left
//! out falls back to the default of the corresponding strategy.
//!
//! ```json
//! {
//!   "learning_rate": 0.01,
//!   "strategy": { "kind": "adam", "beta1": 0.8 },
//!   "regularization": { "kind": "l2", "lambda": 0.001 }
//! }
//! ```

use std::{ fs, path::Path };

use log::debug;
use serde::{ Serialize, Deserialize, de::DeserializeOwned };

use crate::{
  activation::ActivationFunction,
  error::{ Error, Result },
  init::{ Constant, Gaussian, Xavier },
  network::NeuralNetwork,
  optimize::{ AdaGrad, Adam, AdamW, ExpGrad, Momentum, Nesterov, Optimizer, RMSProp, SameGrad, Strategy, Vanilla },
  regularization::Regularization,
  scalar::Number,
};


fn parse<T: DeserializeOwned>(json: &str) -> Result<T> {
  serde_json::from_str(json).map_err(|e| Error::InvalidConfig(e.to_string()) )
}

fn read<T: DeserializeOwned>(path: &Path) -> Result<T> {
  let json = fs::read_to_string(path)
    .map_err(|e| Error::InvalidConfig(format!("{}: {e}", path.display())) )?;
  let config = parse(&json)?;
  debug!("Loaded config from {}", path.display());
  Ok(config)
}

fn number<N: Number>(name: &str, value: f64) -> Result<N> {
  N::value_of(value).map_err(|e| Error::InvalidConfig(format!("{name}: {e}")) )
}

/// Replace `target` with `value`, if given.
fn override_with<N: Number>(target: &mut N, name: &str, value: Option<f64>) -> Result<()> {
  if let Some(value) = value {
    *target = number(name, value)?;
  }
  Ok(())
}

fn non_negative(name: &str, value: f64) -> Result<f64> {
  if value.is_nan() || value < 0.0 {
    return Err(Error::InvalidConfig(format!("{name} must not be negative, got {value}")))
  }
  Ok(value)
}


#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StrategyConfig {
  #[default]
  Vanilla,
  Momentum { momentum: Option<f64> },
  Nesterov { momentum: Option<f64> },
  #[serde(rename = "adagrad")]
  AdaGrad { epsilon: Option<f64> },
  #[serde(rename = "rmsprop")]
  RMSProp { decay: Option<f64>, epsilon: Option<f64> },
  Adam { beta1: Option<f64>, beta2: Option<f64>, epsilon: Option<f64> },
  #[serde(rename = "adamw")]
  AdamW {
    beta1: Option<f64>,
    beta2: Option<f64>,
    epsilon: Option<f64>,
    weight_decay: Option<f64>,
  },
  ExpGrad { growth: Option<f64>, limit: Option<f64> },
  SameGrad { increment: Option<f64>, limit: Option<f64> },
}

impl StrategyConfig {
  pub fn build<N: Number>(&self) -> Result<Box<dyn Strategy<N>>> {
    let adam = |beta1, beta2, epsilon| -> Result<Adam<N>> {
      let mut adam = Adam::default();
      override_with(&mut adam.beta1, "beta1", beta1)?;
      override_with(&mut adam.beta2, "beta2", beta2)?;
      override_with(&mut adam.epsilon, "epsilon", epsilon)?;
      Ok(adam)
    };

    let strategy: Box<dyn Strategy<N>> = match *self {
      Self::Vanilla => Box::new(Vanilla),
      Self::Momentum { momentum } => {
        let mut strategy = Momentum::default();
        override_with(&mut strategy.momentum, "momentum", momentum)?;
        Box::new(strategy)
      },
      Self::Nesterov { momentum } => {
        let mut strategy = Nesterov::default();
        override_with(&mut strategy.momentum, "momentum", momentum)?;
        Box::new(strategy)
      },
      Self::AdaGrad { epsilon } => {
        let mut strategy = AdaGrad::default();
        override_with(&mut strategy.epsilon, "epsilon", epsilon)?;
        Box::new(strategy)
      },
      Self::RMSProp { decay, epsilon } => {
        let mut strategy = RMSProp::default();
        override_with(&mut strategy.decay, "decay", decay)?;
        override_with(&mut strategy.epsilon, "epsilon", epsilon)?;
        Box::new(strategy)
      },
      Self::Adam { beta1, beta2, epsilon } => Box::new(adam(beta1, beta2, epsilon)?),
      Self::AdamW { beta1, beta2, epsilon, weight_decay } => {
        let mut strategy = AdamW::new(adam(beta1, beta2, epsilon)?, AdamW::<N>::default().weight_decay);
        override_with(&mut strategy.weight_decay, "weight_decay", weight_decay)?;
        Box::new(strategy)
      },
      Self::ExpGrad { growth, limit } => {
        let mut strategy = ExpGrad::default();
        override_with(&mut strategy.growth, "growth", growth)?;
        override_with(&mut strategy.limit, "limit", limit)?;
        Box::new(strategy)
      },
      Self::SameGrad { increment, limit } => {
        let mut strategy = SameGrad::default();
        override_with(&mut strategy.increment, "increment", increment)?;
        override_with(&mut strategy.limit, "limit", limit)?;
        Box::new(strategy)
      },
    };
    Ok(strategy)
  }
}


#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RegularizationConfig {
  #[default]
  None,
  L1 { lambda: f64 },
  L2 { lambda: f64 },
  ElasticNet { l1: f64, l2: f64 },
}

impl RegularizationConfig {
  pub fn build<N: Number>(&self) -> Result<Regularization<N>> {
    let lambda = |name: &str, value: f64| -> Result<N> { number(name, non_negative(name, value)?) };
    Ok(match *self {
      Self::None => Regularization::None,
      Self::L1 { lambda: l } => Regularization::L1(lambda("lambda", l)?),
      Self::L2 { lambda: l } => Regularization::L2(lambda("lambda", l)?),
      Self::ElasticNet { l1, l2 } => Regularization::ElasticNet {
        l1: lambda("l1", l1)?,
        l2: lambda("l2", l2)?,
      },
    })
  }
}


/// Everything needed to set up an [Optimizer].

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizerConfig {
  pub learning_rate: f64,
  #[serde(default)]
  pub strategy: StrategyConfig,
  #[serde(default)]
  pub regularization: RegularizationConfig,
}

impl OptimizerConfig {
  pub fn from_json(json: &str) -> Result<Self> {
    parse(json)
  }

  pub fn load(path: impl AsRef<Path>) -> Result<Self> {
    read(path.as_ref())
  }

  pub fn build<N: Number>(&self) -> Result<Optimizer<N, Box<dyn Strategy<N>>>> {
    if !(self.learning_rate.is_finite() && self.learning_rate > 0.0) {
      return Err(Error::InvalidConfig(format!(
        "learning rate must be positive, got {}", self.learning_rate
      )))
    }
    let learning_rate = number("learning_rate", self.learning_rate)?;
    Ok(Optimizer::new(learning_rate, self.strategy.build()?)
      .with_regularization(self.regularization.build()?))
  }
}


#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InitializerConfig {
  Xavier {
    #[serde(default)]
    seed: u64,
  },
  Gaussian {
    #[serde(default)]
    mean: f64,
    std_dev: f64,
    #[serde(default)]
    seed: u64,
  },
  Constant {
    weight: f64,
    #[serde(default)]
    bias: f64,
  },
}

impl Default for InitializerConfig {
  fn default() -> Self {
    Self::Xavier { seed: 0 }
  }
}


#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayerConfig {
  pub width: usize,
  #[serde(default)]
  pub activation: ActivationFunction,
}


/// Topology and starting parameters of a fully connected [NeuralNetwork].

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkConfig {
  pub arity: usize,
  pub layers: Vec<LayerConfig>,
  #[serde(default)]
  pub initializer: InitializerConfig,
}

impl NetworkConfig {
  pub fn from_json(json: &str) -> Result<Self> {
    parse(json)
  }

  pub fn load(path: impl AsRef<Path>) -> Result<Self> {
    read(path.as_ref())
  }

  pub fn build<N: Number>(&self) -> Result<NeuralNetwork<N>> {
    if self.arity == 0 {
      return Err(Error::InvalidConfig("a network needs at least one input".to_string()))
    }
    if self.layers.is_empty() {
      return Err(Error::InvalidConfig("a network needs at least one computed layer".to_string()))
    }
    if let Some(l) = self.layers.iter().position(|layer| layer.width == 0 ) {
      return Err(Error::InvalidConfig(format!("layer {} is empty", l + 1)))
    }

    let mut network = NeuralNetwork::new(self.arity);
    for layer in &self.layers {
      network = network.dense(layer.width, layer.activation)?;
    }

    match self.initializer {
      InitializerConfig::Xavier { seed } => network.initialize(&mut Xavier::new(seed))?,
      InitializerConfig::Gaussian { mean, std_dev, seed } => {
        network.initialize(&mut Gaussian::new(mean, non_negative("std_dev", std_dev)?, seed))?
      },
      InitializerConfig::Constant { weight, bias } => {
        network.initialize(&mut Constant::new(number("weight", weight)?, number("bias", bias)?))?
      },
    }
    Ok(network)
  }
}
