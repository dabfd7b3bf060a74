use std::path::Path;

use eyre::WrapErr;
use ort::session::Session;
use ort::value::{DynValue, Tensor};
use tracing::debug;
use xaitext_core::{InputType, Result};

pub struct OnnxScorer {
    session: Session,
    input_type: InputType,
    input_name: Option<String>,
}

impl OnnxScorer {
    /// # Errors
    ///
    /// Returns an error if the ONNX session cannot be loaded or `input_name`
    /// is not one of the model's inputs.
    pub fn load(model_path: &Path, input_type: InputType, input_name: Option<String>) -> Result<Self> {
        let session = Session::builder()?
            .commit_from_file(model_path)
            .wrap_err_with(|| format!("failed to load ONNX model {}", model_path.display()))?;

        let inputs: Vec<&str> = session.inputs.iter().map(|i| i.name.as_str()).collect();
        debug!(?inputs, input_type = input_type.as_str(), "ONNX session created");
        if let Some(name) = &input_name {
            if !inputs.contains(&name.as_str()) {
                return Err(eyre::eyre!("model has no input named {name:?} (inputs: {inputs:?})"));
            }
        }

        Ok(Self {
            session,
            input_type,
            input_name,
        })
    }

    fn input_tensor(&self, ids: &[u32]) -> Result<DynValue> {
        let shape = vec![1i64, i64::try_from(ids.len())?];
        let value = match input_data(ids, self.input_type)? {
            InputData::Int64(data) => Tensor::from_array((shape, data))?.into_dyn(),
            InputData::Int32(data) => Tensor::from_array((shape, data))?.into_dyn(),
            InputData::Float32(data) => Tensor::from_array((shape, data))?.into_dyn(),
        };
        Ok(value)
    }
}

/// Token indices converted to the model's input element type.
#[derive(Debug, PartialEq)]
enum InputData {
    Int64(Vec<i64>),
    Int32(Vec<i32>),
    Float32(Vec<f32>),
}

fn input_data(ids: &[u32], input_type: InputType) -> Result<InputData> {
    Ok(match input_type {
        InputType::Int64 => InputData::Int64(ids.iter().map(|&id| i64::from(id)).collect()),
        InputType::Int32 => InputData::Int32(
            ids.iter()
                .map(|&id| i32::try_from(id).wrap_err_with(|| format!("index {id} overflows int32")))
                .collect::<Result<_>>()?,
        ),
        #[allow(clippy::cast_precision_loss)]
        InputType::Float32 => InputData::Float32(ids.iter().map(|&id| id as f32).collect()),
    })
}

impl super::scorer::Scorer for OnnxScorer {
    fn logits(&mut self, ids: &[u32]) -> Result<Vec<f32>> {
        let input = self.input_tensor(ids)?;

        let outputs = match &self.input_name {
            Some(name) => self.session.run(ort::inputs![name.as_str() => input])?,
            None => self.session.run(ort::inputs![input])?,
        };

        let logits = outputs[0].try_extract_array::<f32>()?;
        Ok(logits.iter().copied().collect())
    }
}
