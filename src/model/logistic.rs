//! Logistic home-win model
//!
//! Architecture: Input(5) → Linear(1) → sigmoid

use std::path::Path;

use burn::module::{Module, Param};
use burn::nn::{Linear, LinearConfig};
use burn::record::{FullPrecisionSettings, NamedMpkFileRecorder, Recorder};
use burn::tensor::activation::sigmoid;
use burn::tensor::backend::Backend;
use burn::tensor::{ElementConversion, Tensor};

use crate::model::Classifier;
use crate::{EplError, FeatureVector, Result};

/// Single linear layer over the matchup features
#[derive(Module, Debug)]
pub struct LogisticModel<B: Backend> {
    linear: Linear<B>,
}

impl<B: Backend> LogisticModel<B> {
    /// Create a model with freshly initialized weights
    pub fn new(device: &B::Device) -> Self {
        LogisticModel {
            linear: LinearConfig::new(FeatureVector::DIM, 1).init(device),
        }
    }

    /// Create a model from externally fitted coefficients
    ///
    /// `weights` are in feature order (venue, opponent, day, gf, ga).
    pub fn from_coefficients(
        device: &B::Device,
        weights: [f32; FeatureVector::DIM],
        bias: f32,
    ) -> Self {
        let weight = Tensor::<B, 1>::from_floats(weights.as_slice(), device)
            .reshape([FeatureVector::DIM, 1]);
        let bias = Tensor::<B, 1>::from_floats([bias].as_slice(), device);

        let mut linear = LinearConfig::new(FeatureVector::DIM, 1).init(device);
        linear.weight = Param::from_tensor(weight);
        linear.bias = Some(Param::from_tensor(bias));

        LogisticModel { linear }
    }

    /// Forward pass
    ///
    /// # Arguments
    /// * `features` - Feature rows [batch, 5]
    ///
    /// # Returns
    /// P(home win) [batch, 1]
    pub fn forward(&self, features: Tensor<B, 2>) -> Tensor<B, 2> {
        sigmoid(self.linear.forward(features))
    }

    /// Learned weights (feature order) and bias
    pub fn coefficients(&self) -> Result<(Vec<f32>, f32)> {
        let weights = self
            .linear
            .weight
            .val()
            .into_data()
            .to_vec::<f32>()
            .map_err(|e| EplError::Model(format!("{:?}", e)))?;
        let bias = match &self.linear.bias {
            Some(b) => b.val().into_scalar().elem(),
            None => 0.0,
        };
        Ok((weights, bias))
    }

    /// Save model to `<path>.mpk`
    pub fn save(&self, path: &Path) -> Result<()>
    where
        B::FloatElem: serde::Serialize + serde::de::DeserializeOwned,
        B::IntElem: serde::Serialize + serde::de::DeserializeOwned,
    {
        let recorder = NamedMpkFileRecorder::<FullPrecisionSettings>::new();
        recorder
            .record(self.clone().into_record(), path.to_path_buf())
            .map_err(|e| EplError::Model(e.to_string()))
    }

    /// Load model from `<path>.mpk`
    pub fn load(device: &B::Device, path: &Path) -> Result<Self>
    where
        B::FloatElem: serde::Serialize + serde::de::DeserializeOwned,
        B::IntElem: serde::Serialize + serde::de::DeserializeOwned,
    {
        let recorder = NamedMpkFileRecorder::<FullPrecisionSettings>::new();
        let record = recorder
            .load(path.to_path_buf(), device)
            .map_err(|e| EplError::Model(format!("{}: {}", path.display(), e)))?;

        Ok(Self::new(device).load_record(record))
    }
}

/// [`Classifier`] backed by a [`LogisticModel`]
pub struct BurnClassifier<B: Backend> {
    model: LogisticModel<B>,
    device: B::Device,
}

impl<B: Backend> BurnClassifier<B> {
    pub fn new(model: LogisticModel<B>, device: B::Device) -> Self {
        BurnClassifier { model, device }
    }

    /// Load the classifier artifact from `<path>.mpk`
    pub fn load(device: B::Device, path: &Path) -> Result<Self>
    where
        B::FloatElem: serde::Serialize + serde::de::DeserializeOwned,
        B::IntElem: serde::Serialize + serde::de::DeserializeOwned,
    {
        let model = LogisticModel::load(&device, path)?;
        log::info!("Loaded model from {}.mpk", path.display());
        Ok(Self::new(model, device))
    }

    pub fn model(&self) -> &LogisticModel<B> {
        &self.model
    }
}

impl<B: Backend> Classifier for BurnClassifier<B> {
    fn predict_proba(&self, features: &FeatureVector) -> [f32; 2] {
        let input = Tensor::<B, 1>::from_floats(features.to_vec().as_slice(), &self.device)
            .reshape([1, FeatureVector::DIM]);
        let home_win: f32 = self.model.forward(input).into_scalar().elem();
        let home_win = home_win.clamp(0.0, 1.0);
        [1.0 - home_win, home_win]
    }
}
